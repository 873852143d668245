//! CSV dialect handling on top of the line reader.

use std::io::{self, Read};

use csv::{ReaderBuilder, StringRecord};

use crate::error::{IngestError, Result};

/// Delimiter and quote character of an input file.
///
/// Records are terminated by `\n` (a preceding `\r` is tolerated) and a
/// quote inside a quoted field is written twice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CsvDialect {
    pub delimiter: u8,
    pub quote: u8,
}

impl Default for CsvDialect {
    fn default() -> Self {
        Self {
            delimiter: b',',
            quote: b'"',
        }
    }
}

impl CsvDialect {
    /// Build a dialect from configuration strings; each must be exactly one
    /// ASCII character.
    pub fn new(delimiter: &str, quote: &str) -> Result<Self> {
        Ok(Self {
            delimiter: single_ascii("delimiter", delimiter)?,
            quote: single_ascii("quote", quote)?,
        })
    }
}

fn single_ascii(field: &'static str, value: &str) -> Result<u8> {
    match value.as_bytes() {
        [byte] if byte.is_ascii() => Ok(*byte),
        _ => Err(IngestError::InvalidDialect {
            field,
            value: value.to_string(),
        }),
    }
}

/// Re-joins decoded lines into a byte stream for the CSV reader.
///
/// A failure from the line source is parked here so the caller gets the
/// original [`IngestError`] back instead of a wrapped I/O error.
struct LineFeed<I> {
    lines: I,
    pending: Vec<u8>,
    pos: usize,
    error: Option<IngestError>,
}

impl<I> LineFeed<I> {
    fn take_error(&mut self) -> Option<IngestError> {
        self.error.take()
    }
}

impl<I> Read for LineFeed<I>
where
    I: Iterator<Item = Result<String>>,
{
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        while self.pos >= self.pending.len() {
            match self.lines.next() {
                Some(Ok(line)) => {
                    self.pending = line.into_bytes();
                    self.pending.push(b'\n');
                    self.pos = 0;
                }
                Some(Err(err)) => {
                    let message = err.to_string();
                    self.error = Some(err);
                    return Err(io::Error::other(message));
                }
                None => return Ok(0),
            }
        }
        let available = &self.pending[self.pos..];
        let n = available.len().min(buf.len());
        buf[..n].copy_from_slice(&available[..n]);
        self.pos += n;
        Ok(n)
    }
}

/// Lazy sequence of CSV records (as raw string fields) read from lines.
///
/// Blank lines produce no record. Records may have differing field counts;
/// width checks belong to the row parser.
pub struct CsvRecords<I> {
    reader: csv::Reader<LineFeed<I>>,
    record: StringRecord,
    done: bool,
}

impl<I> CsvRecords<I>
where
    I: Iterator<Item = Result<String>>,
{
    pub fn new(lines: impl IntoIterator<IntoIter = I>, dialect: CsvDialect) -> Self {
        let feed = LineFeed {
            lines: lines.into_iter(),
            pending: Vec::new(),
            pos: 0,
            error: None,
        };
        let reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .delimiter(dialect.delimiter)
            .quote(dialect.quote)
            .double_quote(true)
            .from_reader(feed);
        Self {
            reader,
            record: StringRecord::new(),
            done: false,
        }
    }
}

impl<I> Iterator for CsvRecords<I>
where
    I: Iterator<Item = Result<String>>,
{
    type Item = Result<Vec<String>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.reader.read_record(&mut self.record) {
            Ok(true) => Some(Ok(self.record.iter().map(str::to_string).collect())),
            Ok(false) => {
                self.done = true;
                None
            }
            Err(source) => {
                self.done = true;
                let err = self
                    .reader
                    .get_mut()
                    .take_error()
                    .unwrap_or(IngestError::Csv { source });
                Some(Err(err))
            }
        }
    }
}
