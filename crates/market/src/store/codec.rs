//! Tabular text codec.
//!
//! A collection is encoded as a header row of field names followed by one
//! comma-separated row per record. Values containing commas, quotes or line
//! breaks are quoted, so any string survives a round trip.
//!
//! Two flavours are provided:
//!
//! - [`encode`]/[`decode`] work on typed records. The record's serde shape is
//!   the schema: decimals, booleans, timestamps and enums are parsed on the
//!   way in, and a malformed value is an error rather than a silent default.
//! - [`encode_records`]/[`decode_records`] work on untyped string maps and
//!   satisfy `decode_records(encode_records(r)) == r` for records that share
//!   the same keys.

use std::collections::BTreeMap;

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

/// An untyped record: field name to raw cell text.
pub type Record = BTreeMap<String, String>;

/// Errors produced while encoding or decoding tabular text.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The text is not well-formed, or a cell does not fit the schema.
    #[error("malformed row: {0}")]
    Csv(#[from] csv::Error),

    /// Flushing the encoder failed.
    #[error("encoder flush failed: {0}")]
    Flush(#[from] std::io::Error),

    /// The encoder produced bytes that are not UTF-8.
    #[error("encoded text is not UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Encode typed records. An empty slice encodes to an empty string.
///
/// # Errors
///
/// Returns `CodecError::Csv` if a record is not flat (nested maps or
/// sequences cannot be represented as a single row).
pub fn encode<T: Serialize>(rows: &[T]) -> Result<String, CodecError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for row in rows {
        writer.serialize(row)?;
    }
    finish(writer)
}

/// Decode typed records. Empty text decodes to no records.
///
/// Columns the schema does not name are ignored; optional fields may be
/// absent from the header entirely.
///
/// # Errors
///
/// Returns `CodecError::Csv` for ragged rows or cells that do not parse as
/// the schema's field type.
pub fn decode<T: DeserializeOwned>(text: &str) -> Result<Vec<T>, CodecError> {
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }
    let mut reader = csv::Reader::from_reader(text.as_bytes());
    let rows = reader.deserialize().collect::<Result<Vec<T>, _>>()?;
    Ok(rows)
}

/// Encode untyped records.
///
/// The header is the union of all keys in first-seen order; a record
/// missing a key gets an empty cell.
///
/// # Errors
///
/// Returns `CodecError::Flush` if the in-memory writer fails.
pub fn encode_records(records: &[Record]) -> Result<String, CodecError> {
    let mut header: Vec<&str> = Vec::new();
    for record in records {
        for key in record.keys() {
            if !header.contains(&key.as_str()) {
                header.push(key);
            }
        }
    }
    if header.is_empty() {
        return Ok(String::new());
    }

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(&header)?;
    for record in records {
        writer.write_record(
            header
                .iter()
                .map(|field| record.get(*field).map_or("", String::as_str)),
        )?;
    }
    finish(writer)
}

/// Decode untyped records.
///
/// # Errors
///
/// Returns `CodecError::Csv` for ragged rows or invalid UTF-8.
pub fn decode_records(text: &str) -> Result<Vec<Record>, CodecError> {
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }
    let mut reader = csv::Reader::from_reader(text.as_bytes());
    let header = reader.headers()?.clone();
    reader
        .records()
        .map(|row| -> Result<Record, CodecError> {
            let row = row?;
            Ok(header
                .iter()
                .zip(row.iter())
                .map(|(field, value)| (field.to_owned(), value.to_owned()))
                .collect())
        })
        .collect()
}

fn finish(writer: csv::Writer<Vec<u8>>) -> Result<String, CodecError> {
    let bytes = writer.into_inner().map_err(csv::IntoInnerError::into_error)?;
    Ok(String::from_utf8(bytes)?)
}
