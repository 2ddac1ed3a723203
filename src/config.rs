//! Configuration handling for sheetpack

use std::path::PathBuf;

/// Output encoding for exported tables
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Json,
    Xml,
    Binary,
}

impl OutputFormat {
    /// File extension of the artifacts this format writes
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Xml => "xml",
            OutputFormat::Binary => "bin",
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "xml" => Ok(OutputFormat::Xml),
            "bin" | "binary" => Ok(OutputFormat::Binary),
            _ => Err(format!("Unknown output format: {}", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

/// Configuration for an export run
#[derive(Debug, Clone)]
pub struct Config {
    /// Source workbook, CSV file, or directory of them
    pub src: PathBuf,
    /// Output directory, created if absent
    pub out_dir: PathBuf,
    /// Output format
    pub format: OutputFormat,
    /// Merge every table into one `<name>.<ext>` artifact
    pub combine: Option<String>,
    /// Only export these raw table names (empty means all)
    pub tables: Vec<String>,
    /// File extensions picked up when `src` is a directory
    pub extensions: Vec<String>,
    /// Write the run report as JSON to this path
    pub report: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            src: PathBuf::new(),
            out_dir: PathBuf::from("."),
            format: OutputFormat::default(),
            combine: None,
            tables: Vec::new(),
            extensions: vec!["xlsx".to_string(), "xlsm".to_string()],
            report: None,
        }
    }
}

impl Config {
    /// Create a new Config with source and output locations
    pub fn new(src: impl Into<PathBuf>, out_dir: impl Into<PathBuf>) -> Self {
        Self {
            src: src.into(),
            out_dir: out_dir.into(),
            ..Default::default()
        }
    }

    /// Set output format
    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    /// Merge all tables into one named artifact
    pub fn with_combine(mut self, name: impl Into<String>) -> Self {
        self.combine = Some(name.into());
        self
    }

    /// Restrict export to the named tables
    pub fn with_tables(mut self, tables: Vec<String>) -> Self {
        self.tables = tables;
        self
    }

    /// Set the extensions used for directory discovery
    pub fn with_extensions(mut self, extensions: Vec<String>) -> Self {
        self.extensions = extensions;
        self
    }

    /// Write a JSON run report
    pub fn with_report(mut self, path: impl Into<PathBuf>) -> Self {
        self.report = Some(path.into());
        self
    }

    /// Whether a raw table name passes the `tables` filter
    pub fn wants_table(&self, name: &str) -> bool {
        self.tables.is_empty() || self.tables.iter().any(|t| t == name)
    }
}
