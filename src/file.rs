// src/file.rs

use std::{
    fs::File,
    io::{self, BufWriter, Write},
    path::Path,
};

use csv::WriterBuilder;

use crate::config::options::ExportFormat;
use crate::error::FlattenError;
use crate::flatten::FlatRow;
use crate::schema::Schema;

/// Create/truncate `path` and write header + rows.
/// The parent directory must already exist.
pub fn write_rows(
    path: &Path,
    schema: &Schema,
    rows: &[FlatRow],
    format: ExportFormat,
) -> Result<(), FlattenError> {
    let file = File::create(path).map_err(|e| FlattenError::io(path, e))?;
    write_table(BufWriter::new(file), schema, rows, format).map_err(|e| FlattenError::io(path, e))
}

/// Header + rows to any writer.
pub fn write_table<W: Write>(out: W, schema: &Schema, rows: &[FlatRow], format: ExportFormat) -> io::Result<()> {
    let mut w = WriterBuilder::new().delimiter(format.delim()).from_writer(out);
    w.write_record(schema.headers())?;
    for row in rows {
        w.write_record(schema.record(row))?;
    }
    w.flush()
}

/// Same bytes as [`write_table`], as a string.
pub fn to_export_string(schema: &Schema, rows: &[FlatRow], format: ExportFormat) -> io::Result<String> {
    let mut buf: Vec<u8> = Vec::new();
    write_table(&mut buf, schema, rows, format)?;
    String::from_utf8(buf).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}
