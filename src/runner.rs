//! Export run orchestration

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{bail, Context, Result};
use indexmap::IndexSet;
use serde::Serialize;
use serde_json::{Map, Value};
use tabled::settings::Style;
use tabled::Tabled;
use tracing::{debug, info, warn};

use crate::config::{Config, OutputFormat};
use crate::engine::{Exporter, TableSummary};
use crate::model::TableTarget;
use crate::output::{
    artifact_path, combine_tables, BinaryEncoder, JsonEncoder, TableEncoder, XmlElement,
    XmlEncoder, MERGE_ROOT,
};
use crate::parser::{discover_files, ParserFactory};
use crate::progress::ProgressReporter;

/// One exported table
#[derive(Debug, Clone, Serialize, Tabled)]
pub struct TableReport {
    #[tabled(rename = "Workbook")]
    pub workbook: String,
    #[tabled(rename = "Table")]
    pub table: String,
    #[tabled(rename = "Key")]
    pub key: String,
    #[tabled(rename = "Mode")]
    pub mode: String,
    #[tabled(rename = "Fields")]
    pub fields: usize,
    #[tabled(rename = "Rows")]
    pub rows: usize,
}

impl TableReport {
    fn new(workbook: &str, summary: TableSummary) -> Self {
        Self {
            workbook: workbook.to_string(),
            table: summary.table,
            key: summary.key,
            mode: summary.mode,
            fields: summary.fields,
            rows: summary.rows,
        }
    }
}

/// A workbook or table that could not be exported
#[derive(Debug, Clone, Serialize)]
pub struct FailureReport {
    pub workbook: String,
    /// Empty when the whole workbook failed to open
    pub table: String,
    pub error: String,
}

/// Outcome of a whole run
#[derive(Debug, Clone, Default, Serialize)]
pub struct ExportReport {
    pub tables: Vec<TableReport>,
    pub failures: Vec<FailureReport>,
    /// Path of the merged or combined artifact, if one was written
    pub combined: Option<PathBuf>,
    pub elapsed_ms: u64,
}

impl ExportReport {
    pub fn total_rows(&self) -> usize {
        self.tables.iter().map(|t| t.rows).sum()
    }

    /// Render the exported tables for the terminal
    pub fn render(&self) -> String {
        tabled::Table::new(&self.tables)
            .with(Style::rounded())
            .to_string()
    }

    /// Write the report as pretty JSON
    pub fn write_json(&self, path: &Path) -> Result<()> {
        let file = File::create(path)
            .with_context(|| format!("Failed to create report: {}", path.display()))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.flush()?;
        Ok(())
    }
}

/// Run one export as described by `config`.
///
/// Workbooks or tables that fail are logged and recorded in the report; the
/// run only fails as a whole when the output directory or a merged artifact
/// cannot be written.
pub fn run_export(config: &Config, progress: &dyn ProgressReporter) -> Result<ExportReport> {
    let start = Instant::now();

    fs::create_dir_all(&config.out_dir).with_context(|| {
        format!(
            "Failed to create output directory: {}",
            config.out_dir.display()
        )
    })?;
    let sources = collect_sources(config)?;
    debug!(count = sources.len(), "source files found");

    let session = Session {
        config,
        factory: ParserFactory::new(),
        exporter: Exporter::new(progress),
        progress,
    };
    let mut report = ExportReport::default();

    match (config.format, config.combine.as_deref()) {
        (OutputFormat::Json, Some(name)) => {
            let mut root = Map::new();
            session.export_all(&sources, &mut JsonEncoder::merged(&mut root), &mut report);

            let path = artifact_path(&config.out_dir, name, "json");
            write_json_document(&path, &Value::Object(root))?;
            report.combined = Some(path);
        }
        (OutputFormat::Json, None) => {
            let mut encoder = JsonEncoder::standalone(&config.out_dir);
            session.export_all(&sources, &mut encoder, &mut report);
        }
        (OutputFormat::Xml, Some(name)) => {
            let mut root = XmlElement::new(MERGE_ROOT);
            session.export_all(&sources, &mut XmlEncoder::merged(&mut root), &mut report);

            let path = artifact_path(&config.out_dir, name, "xml");
            let file = File::create(&path)
                .with_context(|| format!("Failed to create file: {}", path.display()))?;
            root.write_document(BufWriter::new(file))?;
            report.combined = Some(path);
        }
        (OutputFormat::Xml, None) => {
            let mut encoder = XmlEncoder::standalone(&config.out_dir);
            session.export_all(&sources, &mut encoder, &mut report);
        }
        (OutputFormat::Binary, combine) => {
            let mut encoder = BinaryEncoder::new(&config.out_dir);
            session.export_all(&sources, &mut encoder, &mut report);

            if let Some(name) = combine {
                let keys = combine_keys(config, &report);
                let parts = combine_tables(&config.out_dir, name, &keys)?;
                info!(combined = %name, parts, "binary tables combined");
                report.combined = Some(artifact_path(&config.out_dir, name, "bin"));
            }
        }
    }

    report.elapsed_ms = start.elapsed().as_millis() as u64;
    info!(
        tables = report.tables.len(),
        rows = report.total_rows(),
        failures = report.failures.len(),
        elapsed_ms = report.elapsed_ms,
        "export finished"
    );
    Ok(report)
}

struct Session<'a> {
    config: &'a Config,
    factory: ParserFactory,
    exporter: Exporter<'a>,
    progress: &'a dyn ProgressReporter,
}

impl Session<'_> {
    fn export_all(
        &self,
        sources: &[PathBuf],
        encoder: &mut dyn TableEncoder,
        report: &mut ExportReport,
    ) {
        for path in sources {
            self.export_file(path, encoder, report);
        }
    }

    fn export_file(&self, path: &Path, encoder: &mut dyn TableEncoder, report: &mut ExportReport) {
        let workbook = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.progress.workbook_started(path);

        let tables = match self.factory.parse(path) {
            Ok(tables) => tables,
            Err(e) => {
                let error = format!("{:#}", e);
                warn!(path = %path.display(), error = %error, "failed to read workbook");
                report.failures.push(FailureReport {
                    workbook,
                    table: String::new(),
                    error,
                });
                return;
            }
        };

        for table in &tables {
            if !self.config.wants_table(table.name()) {
                debug!(table = table.name(), "not in table filter");
                continue;
            }
            match self.exporter.export(table.as_ref(), encoder) {
                Ok(Some(summary)) => report.tables.push(TableReport::new(&workbook, summary)),
                Ok(None) => {}
                Err(e) => report.failures.push(FailureReport {
                    workbook: workbook.clone(),
                    table: table.name().to_string(),
                    error: e.to_string(),
                }),
            }
        }
    }
}

fn collect_sources(config: &Config) -> Result<Vec<PathBuf>> {
    let src = &config.src;
    if src.is_dir() {
        discover_files(src, &config.extensions)
    } else if src.is_file() {
        Ok(vec![src.clone()])
    } else {
        bail!("Source not found: {}", src.display())
    }
}

/// Tables that go into a binary combine: the filter list when given,
/// otherwise everything exported in this run, in export order. Tables that
/// failed in this run are left out.
fn combine_keys(config: &Config, report: &ExportReport) -> Vec<String> {
    let exported: IndexSet<&str> = report.tables.iter().map(|t| t.key.as_str()).collect();
    if config.tables.is_empty() {
        return exported.into_iter().map(str::to_string).collect();
    }

    let keys: IndexSet<String> = config
        .tables
        .iter()
        .filter_map(|name| TableTarget::classify(name))
        .map(|target| target.key)
        .filter(|key| exported.contains(key.as_str()))
        .collect();
    keys.into_iter().collect()
}

fn write_json_document(path: &Path, document: &Value) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("Failed to create file: {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, document)?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::SilentProgress;

    const WEAPONS: &str = ",,\n,,\nId,Name,Damage\ni32,s,f\n1,Sword,2.5\n2,Axe,4\n";
    const CONFIG: &str = ",\n,\nSpeed,Title\nd,s\n1.5,Game\n";

    fn write_sources(dir: &Path) {
        fs::write(dir.join("Weapons.csv"), WEAPONS).unwrap();
        fs::write(dir.join("~Config.csv"), CONFIG).unwrap();
        fs::write(dir.join("~$Weapons.csv"), "locked").unwrap();
        fs::create_dir_all(dir.join("more")).unwrap();
        fs::write(dir.join("more/#Notes.csv"), "a\nb\n").unwrap();
    }

    fn read_json(path: &Path) -> Value {
        serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
    }

    fn config(src: &Path, out: &Path) -> Config {
        Config::new(src, out).with_extensions(vec!["csv".to_string()])
    }

    #[test]
    fn test_directory_to_json_files() {
        let src = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        write_sources(src.path());

        let report = run_export(&config(src.path(), out.path()), &SilentProgress).unwrap();

        let keys: Vec<_> = report.tables.iter().map(|t| t.key.as_str()).collect();
        assert_eq!(keys, vec!["Weapons", "Config"]);
        assert_eq!(report.total_rows(), 3);
        assert!(report.failures.is_empty());
        assert!(out.path().join("Weapons.json").exists());
        assert!(report.combined.is_none());

        let config = read_json(&out.path().join("Config.json"));
        assert_eq!(config, serde_json::json!({"Speed": 1.5, "Title": "Game"}));
    }

    #[test]
    fn test_single_file_object_mode() {
        let src = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let file = src.path().join("~Config.csv");
        fs::write(&file, CONFIG).unwrap();

        let report = run_export(&Config::new(&file, out.path()), &SilentProgress).unwrap();
        assert_eq!(report.tables[0].mode, "object");

        let text = fs::read_to_string(out.path().join("Config.json")).unwrap();
        let value: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value, serde_json::json!({"Speed": 1.5, "Title": "Game"}));
    }

    #[test]
    fn test_json_merge() {
        let src = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        write_sources(src.path());
        fs::write(src.path().join("Armor.csv"), ",\n,\nId,Def\ni32,i32\n5,3\n").unwrap();

        let config = config(src.path(), out.path()).with_combine("All");
        let report = run_export(&config, &SilentProgress).unwrap();

        assert_eq!(report.combined, Some(out.path().join("All.json")));
        assert!(!out.path().join("Weapons.json").exists());

        let text = fs::read_to_string(out.path().join("All.json")).unwrap();
        let value: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["Armor"]["5"]["Def"], 3);
        assert_eq!(value["Weapons"]["Items"][1]["Name"], "Axe");
    }

    #[test]
    fn test_xml_merge_root() {
        let src = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        write_sources(src.path());

        let config = config(src.path(), out.path())
            .with_format(OutputFormat::Xml)
            .with_combine("All");
        run_export(&config, &SilentProgress).unwrap();

        let text = fs::read_to_string(out.path().join("All.xml")).unwrap();
        assert!(text.contains("<Root>"));
        assert!(text.contains("<Weapons>"));
        assert!(text.contains("<Name>Sword</Name>"));
    }

    #[test]
    fn test_binary_with_filter_and_combine() {
        let src = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        write_sources(src.path());
        fs::write(src.path().join("Armor.csv"), ",\n,\nId,Def\ni32,i32\n5,3\n").unwrap();

        let config = config(src.path(), out.path())
            .with_format(OutputFormat::Binary)
            .with_tables(vec!["Weapons".to_string()])
            .with_combine("All");
        let report = run_export(&config, &SilentProgress).unwrap();

        assert_eq!(report.tables.len(), 1);
        assert!(out.path().join("Weapons.bin").exists());
        assert!(out.path().join("Weapons_key.bin").exists());
        assert!(!out.path().join("Armor.bin").exists());

        let weapons = fs::read(out.path().join("Weapons.bin")).unwrap();
        let combined = fs::read(out.path().join("All.bin")).unwrap();
        assert_eq!(combined.len(), 8 + weapons.len());
        assert_eq!(&combined[..8], &(weapons.len() as i64).to_le_bytes());
    }

    #[test]
    fn test_binary_combine_skips_failed_table() {
        let src = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        write_sources(src.path());
        let long = vec!["1"; 70_000].join(",");
        fs::write(
            src.path().join("Big.csv"),
            format!(",\n,\nId,Values\ni32,ai32\n1,\"1,2\"\n2,\"{}\"\n", long),
        )
        .unwrap();

        let config = config(src.path(), out.path())
            .with_format(OutputFormat::Binary)
            .with_tables(vec!["Big".to_string(), "Weapons".to_string()])
            .with_combine("All");
        let report = run_export(&config, &SilentProgress).unwrap();

        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].table, "Big");
        assert!(!out.path().join("Big.bin").exists());

        let weapons = fs::read(out.path().join("Weapons.bin")).unwrap();
        let combined = fs::read(out.path().join("All.bin")).unwrap();
        assert_eq!(combined.len(), 8 + weapons.len());
    }

    #[test]
    fn test_unreadable_file_is_recorded() {
        let src = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        fs::write(src.path().join("Broken.xlsx"), "not a workbook").unwrap();

        let report = run_export(&Config::new(src.path(), out.path()), &SilentProgress).unwrap();
        assert!(report.tables.is_empty());
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].workbook, "Broken.xlsx");
    }

    #[test]
    fn test_missing_source_fails() {
        let out = tempfile::tempdir().unwrap();
        let config = Config::new("/no/such/source", out.path());
        assert!(run_export(&config, &SilentProgress).is_err());
    }

    #[test]
    fn test_report_outputs() {
        let mut report = ExportReport::default();
        report.tables.push(TableReport {
            workbook: "Items.xlsx".to_string(),
            table: "Weapons".to_string(),
            key: "Weapons".to_string(),
            mode: "array".to_string(),
            fields: 3,
            rows: 2,
        });
        assert!(report.render().contains("Weapons"));

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        report.write_json(&path).unwrap();
        let value: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["tables"][0]["rows"], 2);
    }
}
