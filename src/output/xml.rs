//! XML output format

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::engine::Record;
use crate::error::{ExportError, Result};
use crate::model::{FieldSpec, TableMode, TableTarget};

use super::{artifact_path, TableEncoder};

/// Element wrapping each record of an array-mode table
pub const ITEM_ELEMENT: &str = "Item";

/// Root element of a merged document
pub const MERGE_ROOT: &str = "Root";

/// Minimal element tree: a name, optional text, ordered children
#[derive(Debug, Clone, Default, PartialEq)]
pub struct XmlElement {
    pub name: String,
    pub text: Option<String>,
    pub children: Vec<XmlElement>,
}

impl XmlElement {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: None,
            children: Vec::new(),
        }
    }

    /// First child with the given tag
    pub fn child(&self, name: &str) -> Option<&XmlElement> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Resolve a `.`-separated path below this element, reusing the first
    /// child with a matching tag at each step and creating missing ones.
    pub fn resolve_path(&mut self, path: &str) -> &mut XmlElement {
        let mut node = self;
        for segment in path.split('.').filter(|s| !s.is_empty()) {
            let index = match node.children.iter().position(|c| c.name == segment) {
                Some(index) => index,
                None => {
                    node.children.push(XmlElement::new(segment));
                    node.children.len() - 1
                }
            };
            node = &mut node.children[index];
        }
        node
    }

    /// Serialize as an indented UTF-8 document with an XML declaration
    pub fn write_document<W: Write>(&self, inner: W) -> Result<()> {
        let mut writer = Writer::new_with_indent(inner, b' ', 2);
        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;
        self.write_element(&mut writer)?;
        writer.into_inner().flush()?;
        Ok(())
    }

    fn write_element<W: Write>(&self, writer: &mut Writer<W>) -> Result<()> {
        let name = self.name.as_str();
        if self.text.is_none() && self.children.is_empty() {
            writer.write_event(Event::Empty(BytesStart::new(name)))?;
            return Ok(());
        }

        writer.write_event(Event::Start(BytesStart::new(name)))?;
        if let Some(text) = &self.text {
            writer.write_event(Event::Text(BytesText::new(text)))?;
        }
        for child in &self.children {
            child.write_element(writer)?;
        }
        writer.write_event(Event::End(BytesEnd::new(name)))?;
        Ok(())
    }
}

fn is_name_start_char(c: char) -> bool {
    matches!(c,
        ':' | 'A'..='Z' | '_' | 'a'..='z'
        | '\u{C0}'..='\u{D6}'
        | '\u{D8}'..='\u{F6}'
        | '\u{F8}'..='\u{2FF}'
        | '\u{370}'..='\u{37D}'
        | '\u{37F}'..='\u{1FFF}'
        | '\u{200C}'..='\u{200D}'
        | '\u{2070}'..='\u{218F}'
        | '\u{2C00}'..='\u{2FEF}'
        | '\u{3001}'..='\u{D7FF}'
        | '\u{F900}'..='\u{FDCF}'
        | '\u{FDF0}'..='\u{FFFD}'
        | '\u{10000}'..='\u{EFFFF}')
}

fn is_name_char(c: char) -> bool {
    is_name_start_char(c)
        || matches!(c,
            '-' | '.' | '0'..='9' | '\u{B7}'
            | '\u{300}'..='\u{36F}'
            | '\u{203F}'..='\u{2040}')
}

/// Whether `name` matches the XML `Name` production
pub fn is_xml_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if is_name_start_char(first) => chars.all(is_name_char),
        _ => false,
    }
}

fn check_name(table: &str, name: &str) -> Result<()> {
    if is_xml_name(name) {
        Ok(())
    } else {
        Err(ExportError::InvalidXmlName {
            table: table.to_string(),
            name: name.to_string(),
        })
    }
}

enum Sink<'r> {
    Standalone(PathBuf),
    Merge(&'r mut XmlElement),
}

/// XML encoder.
///
/// Each table is an element named by its key. Array-mode records are
/// `<Item>` children; grouped fields nest as `<group><name>`. Cell text is
/// written verbatim. The table key and every field path segment must be a
/// valid XML name, checked in `begin` before any record is built.
pub struct XmlEncoder<'r> {
    sink: Sink<'r>,
    table: Option<(TableTarget, XmlElement)>,
}

impl XmlEncoder<'static> {
    /// Write each table to `<out_dir>/<key>.xml`
    pub fn standalone(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            sink: Sink::Standalone(out_dir.into()),
            table: None,
        }
    }
}

impl<'r> XmlEncoder<'r> {
    /// Append each table as a child of `root`
    pub fn merged(root: &'r mut XmlElement) -> Self {
        Self {
            sink: Sink::Merge(root),
            table: None,
        }
    }
}

impl TableEncoder for XmlEncoder<'_> {
    fn begin(&mut self, target: &TableTarget, fields: &[FieldSpec]) -> Result<()> {
        check_name(&target.key, &target.key)?;
        for field in fields {
            for segment in field.path().split('.').filter(|s| !s.is_empty()) {
                check_name(&target.key, segment)?;
            }
        }
        self.table = Some((target.clone(), XmlElement::new(target.key.as_str())));
        Ok(())
    }

    fn record(&mut self, record: &Record<'_>) -> Result<()> {
        let (target, element) = self.table.as_mut().ok_or(ExportError::NoActiveTable)?;

        let parent = match target.mode {
            TableMode::Array => {
                element.children.push(XmlElement::new(ITEM_ELEMENT));
                let last = element.children.len() - 1;
                &mut element.children[last]
            }
            TableMode::Object => element,
        };

        for cell in record.cells.iter().filter(|c| !c.is_empty()) {
            let path = cell.field.path();
            if path.split('.').all(str::is_empty) {
                continue;
            }
            parent.resolve_path(&path).text = Some(cell.raw.clone());
        }
        Ok(())
    }

    fn finish(&mut self, _rows: usize) -> Result<()> {
        let (target, element) = self.table.take().ok_or(ExportError::NoActiveTable)?;

        match &mut self.sink {
            Sink::Standalone(dir) => {
                fs::create_dir_all(dir.as_path())?;
                let file = File::create(artifact_path(dir, &target.key, "xml"))?;
                element.write_document(BufWriter::new(file))?;
            }
            Sink::Merge(root) => root.children.push(element),
        }
        Ok(())
    }

    fn abort(&mut self) {
        self.table = None;
    }
}
