//! Length-prefixed binary record stream plus its schema key file
//!
//! All integers are little-endian. Strings are UTF-8 bytes preceded by
//! their byte length as a 7-bit varint (low bits first, high bit set on
//! every byte but the last).
//!
//! Key stream: `i32 field_count`, then per field `string name`, `i32 kind`.
//!
//! Data stream: `i32 rows`, `i32 rows` (the same count twice), then every
//! row's values in header order. Arrays are `u16 count` followed by the
//! elements.

use std::fs::{self, File};
use std::io::{self, BufWriter, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use byteorder::{LittleEndian, WriteBytesExt};
use tracing::{debug, warn};

use crate::engine::Record;
use crate::error::{ExportError, Result};
use crate::model::{FieldSpec, TableTarget, TypedValue};

use super::{artifact_path, TableEncoder};

/// Write a string with a 7-bit varint byte-length prefix
pub fn write_string<W: Write>(writer: &mut W, value: &str) -> io::Result<()> {
    let bytes = value.as_bytes();
    let mut len = bytes.len();
    while len >= 0x80 {
        writer.write_u8((len as u8 & 0x7F) | 0x80)?;
        len >>= 7;
    }
    writer.write_u8(len as u8)?;
    writer.write_all(bytes)
}

/// Write the schema key stream for a field list
pub fn write_key_stream<W: Write>(writer: &mut W, fields: &[FieldSpec]) -> io::Result<()> {
    writer.write_i32::<LittleEndian>(fields.len() as i32)?;
    for field in fields {
        write_string(writer, &field.name)?;
        writer.write_i32::<LittleEndian>(field.kind.code())?;
    }
    Ok(())
}

fn write_value<W: Write>(writer: &mut W, field: &FieldSpec, value: &TypedValue) -> Result<()> {
    match value {
        TypedValue::Str(s) => write_string(writer, s)?,
        TypedValue::Bool(b) => writer.write_u8(u8::from(*b))?,
        TypedValue::I8(v) => writer.write_i8(*v)?,
        TypedValue::U8(v) => writer.write_u8(*v)?,
        TypedValue::I16(v) => writer.write_i16::<LittleEndian>(*v)?,
        TypedValue::U16(v) => writer.write_u16::<LittleEndian>(*v)?,
        TypedValue::I32(v) => writer.write_i32::<LittleEndian>(*v)?,
        TypedValue::U32(v) => writer.write_u32::<LittleEndian>(*v)?,
        TypedValue::I64(v) => writer.write_i64::<LittleEndian>(*v)?,
        TypedValue::U64(v) => writer.write_u64::<LittleEndian>(*v)?,
        TypedValue::F32(v) => writer.write_f32::<LittleEndian>(*v)?,
        TypedValue::F64(v) => writer.write_f64::<LittleEndian>(*v)?,
        TypedValue::List(items) => {
            let count = u16::try_from(items.len()).map_err(|_| ExportError::ArrayTooLong {
                field: field.name.clone(),
                len: items.len(),
            })?;
            writer.write_u16::<LittleEndian>(count)?;
            for item in items {
                write_value(writer, field, item)?;
            }
        }
    }
    Ok(())
}

/// Data stream writer.
///
/// Reserves the two row-count slots on creation and patches them in
/// `finish`.
pub struct DataStream<W: Write + Seek> {
    inner: W,
    rows: usize,
}

impl<W: Write + Seek> DataStream<W> {
    pub fn new(mut inner: W) -> io::Result<Self> {
        inner.write_i32::<LittleEndian>(0)?;
        inner.write_i32::<LittleEndian>(0)?;
        Ok(Self { inner, rows: 0 })
    }

    /// Append one row's values in header order
    pub fn write_record(&mut self, record: &Record<'_>) -> Result<()> {
        for cell in &record.cells {
            write_value(&mut self.inner, cell.field, &cell.value())?;
        }
        self.rows += 1;
        Ok(())
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Patch the row counts and hand back the writer
    pub fn finish(mut self) -> io::Result<W> {
        let rows = self.rows as i32;
        self.inner.seek(SeekFrom::Start(0))?;
        self.inner.write_i32::<LittleEndian>(rows)?;
        self.inner.write_i32::<LittleEndian>(rows)?;
        self.inner.flush()?;
        Ok(self.inner)
    }
}

struct BinaryTable {
    target: TableTarget,
    fields: Vec<FieldSpec>,
    data: DataStream<BufWriter<File>>,
    /// Data is written here and renamed to `<key>.bin` once complete
    partial: PathBuf,
}

/// Writes `<key>.bin` and `<key>_key.bin` per table into a directory.
///
/// Array-of-array kinds have no binary layout; a table declaring one fails
/// in `begin` before any file is created. Rows go to `<key>.bin.part`,
/// which only becomes `<key>.bin` after the key file is written; an aborted
/// table leaves neither behind.
pub struct BinaryEncoder {
    out_dir: PathBuf,
    table: Option<BinaryTable>,
}

impl BinaryEncoder {
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
            table: None,
        }
    }

    pub fn data_path(&self, key: &str) -> PathBuf {
        artifact_path(&self.out_dir, key, "bin")
    }

    pub fn key_path(&self, key: &str) -> PathBuf {
        artifact_path(&self.out_dir, &format!("{}_key", key), "bin")
    }

    fn partial_path(&self, key: &str) -> PathBuf {
        artifact_path(&self.out_dir, key, "bin.part")
    }

    fn complete(&self, table: BinaryTable) -> Result<()> {
        let BinaryTable {
            target,
            fields,
            data,
            partial,
        } = table;
        let rows = data.rows();
        drop(data.finish()?);
        debug!(table = %target.key, rows, "data stream written");

        let mut key = BufWriter::new(File::create(self.key_path(&target.key))?);
        write_key_stream(&mut key, &fields)?;
        key.flush()?;
        drop(key);

        fs::rename(&partial, self.data_path(&target.key))?;
        Ok(())
    }
}

fn discard(partial: &Path) {
    if let Err(e) = fs::remove_file(partial) {
        if e.kind() != io::ErrorKind::NotFound {
            warn!(path = %partial.display(), error = %e, "failed to remove partial data file");
        }
    }
}

impl TableEncoder for BinaryEncoder {
    fn begin(&mut self, target: &TableTarget, fields: &[FieldSpec]) -> Result<()> {
        if let Some(field) = fields.iter().find(|f| f.kind.is_array_array()) {
            return Err(ExportError::UnsupportedKind {
                table: target.key.clone(),
                field: field.name.clone(),
                kind: field.kind,
            });
        }

        fs::create_dir_all(&self.out_dir)?;
        let partial = self.partial_path(&target.key);
        let file = File::create(&partial)?;
        let data = match DataStream::new(BufWriter::new(file)) {
            Ok(data) => data,
            Err(e) => {
                discard(&partial);
                return Err(e.into());
            }
        };
        self.table = Some(BinaryTable {
            target: target.clone(),
            fields: fields.to_vec(),
            data,
            partial,
        });
        Ok(())
    }

    fn record(&mut self, record: &Record<'_>) -> Result<()> {
        let table = self.table.as_mut().ok_or(ExportError::NoActiveTable)?;
        table.data.write_record(record)
    }

    fn finish(&mut self, _rows: usize) -> Result<()> {
        let table = self.table.take().ok_or(ExportError::NoActiveTable)?;
        let partial = table.partial.clone();
        let result = self.complete(table);
        if result.is_err() {
            discard(&partial);
        }
        result
    }

    fn abort(&mut self) {
        if let Some(table) = self.table.take() {
            let partial = table.partial.clone();
            drop(table);
            discard(&partial);
        }
    }
}

/// Concatenate already-written `<table>.bin` files into `<combined>.bin`.
///
/// Each part is preceded by its byte length as an `i64`. Tables without a
/// data file are skipped. Returns the number of parts written.
pub fn combine_tables(out_dir: &Path, combined: &str, tables: &[String]) -> Result<usize> {
    let mut out = BufWriter::new(File::create(artifact_path(out_dir, combined, "bin"))?);
    let mut written = 0;

    for table in tables {
        if table == combined {
            warn!(table = %table, "combined file shares the table's name, skipped");
            continue;
        }
        let bytes = match fs::read(artifact_path(out_dir, table, "bin")) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                warn!(table = %table, "no data file to combine");
                continue;
            }
            Err(e) => return Err(e.into()),
        };
        out.write_i64::<LittleEndian>(bytes.len() as i64)?;
        out.write_all(&bytes)?;
        written += 1;
    }

    out.flush()?;
    Ok(written)
}
