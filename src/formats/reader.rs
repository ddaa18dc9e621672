//! Streaming record reader
//!
//! Turns a line stream into parsed records of one [`Schema`]. The first
//! data line fixes the column count for the rest of the file.

use crate::core::{ConversionError, ConversionResult, LineIterator, RecordParseError};
use crate::formats::schema::{split_fields, Schema};
use std::io::BufRead;
use std::marker::PhantomData;

/// Marker that opens a UCSC track definition line
const TRACK_PREFIX: &str = "track";

/// One item produced by [`RecordReader`]
#[derive(Debug, Clone, PartialEq)]
pub enum Entry<S> {
    /// Recognized non-data line, skipped and not counted
    Header(String),
    /// A parsed data line
    Record {
        record: S,
        /// The line as read, minus its terminator
        raw: String,
        /// 1-based physical line number
        line_number: usize,
    },
}

/// Iterator over the records of a tab-delimited stream
pub struct RecordReader<R: BufRead, S: Schema> {
    lines: LineIterator<R>,
    line_number: usize,
    nitems: Option<usize>,
    done: bool,
    _schema: PhantomData<S>,
}

impl<R: BufRead, S: Schema> RecordReader<R, S> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: LineIterator::new(reader),
            line_number: 0,
            nitems: None,
            done: false,
            _schema: PhantomData,
        }
    }

    /// Physical lines consumed so far, blank lines included
    pub fn line_number(&self) -> usize {
        self.line_number
    }

    /// Column count established by the first data line
    pub fn column_count(&self) -> Option<usize> {
        self.nitems
    }

    fn malformed(&self, content: &str, source: RecordParseError) -> ConversionError {
        ConversionError::MalformedRecord {
            format: S::FORMAT,
            line: self.line_number,
            content: content.to_string(),
            source,
        }
    }

    fn parse_line(&mut self, raw: &str) -> ConversionResult<Entry<S>> {
        if raw.starts_with(TRACK_PREFIX) {
            return Ok(Entry::Header(raw.to_string()));
        }

        let fields = split_fields(raw.trim());
        let expected = *self.nitems.get_or_insert(fields.len());
        if fields.len() != expected {
            return Err(self.malformed(
                raw,
                RecordParseError::FieldCountMismatch {
                    expected,
                    found: fields.len(),
                },
            ));
        }

        let record = S::parse(&fields).map_err(|e| self.malformed(raw, e))?;
        Ok(Entry::Record {
            record,
            raw: raw.to_string(),
            line_number: self.line_number,
        })
    }
}

impl<R: BufRead, S: Schema> Iterator for RecordReader<R, S> {
    type Item = ConversionResult<Entry<S>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        loop {
            let raw = match self.lines.next_line()? {
                Ok(line) => line.to_string(),
                Err(e) => {
                    self.done = true;
                    return Some(Err(e.into()));
                }
            };
            self.line_number += 1;

            if raw.trim().is_empty() {
                continue;
            }

            let entry = self.parse_line(&raw);
            if entry.is_err() {
                self.done = true;
            }
            return Some(entry);
        }
    }
}
