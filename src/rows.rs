// src/rows.rs

use crate::convert;
use crate::error::{ConversionError, Error, Result};
use chrono::{NaiveDate, NaiveDateTime};
use csv::{ReaderBuilder, StringRecord, StringRecordsIntoIter};
use std::{
    io::{BufRead, BufReader, Read},
    sync::Arc,
};
use tracing::debug;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// One data row: an ordered mapping from header name to cell text.
///
/// Headers are shared between all rows of a file. Cells stay strings here;
/// the typed accessors apply the conversions from `convert` and report
/// failures against the column name.
#[derive(Debug, Clone)]
pub struct Row {
    headers: Arc<[String]>,
    record: StringRecord,
}

impl Row {
    /// 1-based line number in the source file, for error reports.
    pub fn line(&self) -> u64 {
        self.record.position().map(|p| p.line()).unwrap_or(0)
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.headers
            .iter()
            .position(|h| h == column)
            .and_then(|i| self.record.get(i))
    }

    /// `(column, value)` pairs in header order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.headers
            .iter()
            .map(String::as_str)
            .zip(self.record.iter())
    }

    fn cell(&self, column: &'static str) -> Result<&str, ConversionError> {
        self.get(column)
            .ok_or(ConversionError::MissingColumn { column })
    }

    /// Raw cell text; an empty cell is `None`.
    pub fn text(&self, column: &'static str) -> Result<Option<String>, ConversionError> {
        let raw = self.cell(column)?;
        Ok((!raw.is_empty()).then(|| raw.to_string()))
    }

    /// Whitespace-trimmed cell text; blank after trimming is `None`.
    pub fn trimmed(&self, column: &'static str) -> Result<Option<String>, ConversionError> {
        let value = convert::trim(self.cell(column)?);
        Ok((!value.is_empty()).then_some(value))
    }

    pub fn integer(&self, column: &'static str) -> Result<Option<i64>, ConversionError> {
        self.convert(column, convert::parse_integer, |value| {
            ConversionError::InvalidInteger { column, value }
        })
    }

    pub fn date(&self, column: &'static str) -> Result<Option<NaiveDate>, ConversionError> {
        self.convert(column, convert::parse_date, |value| {
            ConversionError::InvalidDate { column, value }
        })
    }

    pub fn datetime(
        &self,
        column: &'static str,
    ) -> Result<Option<NaiveDateTime>, ConversionError> {
        self.convert(column, convert::parse_datetime, |value| {
            ConversionError::InvalidDateTime { column, value }
        })
    }

    fn convert<T>(
        &self,
        column: &'static str,
        parse: impl Fn(&str) -> Option<T>,
        fail: impl FnOnce(String) -> ConversionError,
    ) -> Result<Option<T>, ConversionError> {
        let raw = self.cell(column)?;
        if raw.trim().is_empty() {
            return Ok(None);
        }
        parse(raw).map(Some).ok_or_else(|| fail(raw.to_string()))
    }
}

/// Lazy, single-pass iterator over the data rows of a headed CSV file.
pub struct Rows<R> {
    file: String,
    headers: Arc<[String]>,
    records: StringRecordsIntoIter<BufReader<R>>,
}

impl<R: Read> Rows<R> {
    pub fn headers(&self) -> &[String] {
        &self.headers
    }
}

impl<R: Read> Iterator for Rows<R> {
    type Item = Result<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        let record = self.records.next()?;
        Some(
            record
                .map(|record| Row {
                    headers: Arc::clone(&self.headers),
                    record,
                })
                .map_err(|e| Error::parse(&self.file, e)),
        )
    }
}

/// Open a headed CSV stream.
///
/// A leading UTF-8 byte-order mark is dropped. `aliases` maps raw header
/// cells to canonical column names and is applied before anything looks at
/// the header; unmatched aliases are ignored. Duplicate header names (after
/// aliasing) are rejected.
pub fn read_rows<R: Read>(
    file: &str,
    reader: R,
    aliases: &[(&str, &str)],
) -> Result<Rows<R>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .from_reader(skip_bom(file, reader)?);

    let raw = rdr.headers().map_err(|e| Error::parse(file, e))?.clone();
    let mut headers: Vec<String> = Vec::with_capacity(raw.len());
    for cell in raw.iter() {
        let name = match aliases.iter().find(|(from, _)| *from == cell) {
            Some((_, to)) => {
                debug!(file, raw = cell, column = to, "relabelled header");
                to.to_string()
            }
            None => cell.to_string(),
        };
        if headers.contains(&name) {
            return Err(Error::DuplicateHeader {
                file: file.to_string(),
                column: name,
            });
        }
        headers.push(name);
    }

    Ok(Rows {
        file: file.to_string(),
        headers: headers.into(),
        records: rdr.into_records(),
    })
}

/// Wrap `reader` in a buffer with any UTF-8 byte-order mark consumed.
pub(crate) fn skip_bom<R: Read>(file: &str, reader: R) -> Result<BufReader<R>> {
    let mut reader = BufReader::new(reader);
    let has_bom = reader
        .fill_buf()
        .map_err(|e| Error::io(file, e))?
        .starts_with(UTF8_BOM);
    if has_bom {
        reader.consume(UTF8_BOM.len());
    }
    Ok(reader)
}
