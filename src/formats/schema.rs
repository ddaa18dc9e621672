//! Record schemas and merge policies
//!
//! A [`Schema`] describes one tab-delimited record type: its column names,
//! how a split line becomes a record, and how the record is written back.
//! Each schema names the [`MergePolicy`] used when two converted records
//! land on the same target interval, so one generic pipeline serves every
//! record type.

use crate::core::{MergeError, RecordParseError};
use memchr::memchr_iter;
use std::fmt::{Debug, Display};
use std::io::{self, Write};

/// Number of mandatory leading columns (chrom, start, end)
pub const LOCUS_FIELDS: usize = 3;

/// A tab-delimited record type
pub trait Schema: Sized + Clone + Debug {
    /// Short format name used in diagnostics
    const FORMAT: &'static str;

    /// Ordered column names
    const FIELDS: &'static [&'static str];

    /// Rule for combining records that share a target interval
    type Merge: MergePolicy<Self> + Default;

    /// Build a record from the columns of one line
    ///
    /// chrom/start/end are mandatory; later columns are optional.
    fn parse(fields: &[&str]) -> Result<Self, RecordParseError>;

    fn chrom(&self) -> &str;

    fn start(&self) -> u64;

    fn end(&self) -> u64;

    /// Rewrite the locus columns, leaving the payload untouched
    fn relocate(&mut self, chrom: &str, start: u64, end: u64);

    /// Write the record as tab-separated columns, without a line terminator
    fn write_to<W: Write + ?Sized>(&self, out: &mut W) -> io::Result<()>;

    /// `chrom:start-end`, for diagnostics
    fn locus(&self) -> String {
        format!("{}:{}-{}", self.chrom(), self.start(), self.end())
    }
}

/// Schema-specific merge of two records on the same interval
///
/// Implementations must be commutative: `merge(a, b) == merge(b, a)`.
pub trait MergePolicy<R> {
    fn merge(&self, existing: &R, incoming: &R) -> Result<R, MergeError>;
}

/// Split a line on tabs
pub fn split_fields(line: &str) -> Vec<&str> {
    let bytes = line.as_bytes();
    let mut fields = Vec::with_capacity(12);
    let mut start = 0;
    for tab in memchr_iter(b'\t', bytes) {
        fields.push(&line[start..tab]);
        start = tab + 1;
    }
    fields.push(&line[start..]);
    fields
}

/// Parse a non-negative integer column
pub fn parse_number(field: &'static str, value: &str) -> Result<u64, RecordParseError> {
    value.parse().map_err(|_| RecordParseError::InvalidNumber {
        field,
        value: value.to_string(),
    })
}

/// Ensure a line has the mandatory locus columns
pub fn require_locus(fields: &[&str]) -> Result<(), RecordParseError> {
    if fields.len() < LOCUS_FIELDS {
        return Err(RecordParseError::TooFewFields {
            expected: LOCUS_FIELDS,
            found: fields.len(),
        });
    }
    Ok(())
}

/// Ensure two records share chrom/start/end
pub fn require_same_locus<R: Schema>(a: &R, b: &R) -> Result<(), MergeError> {
    if a.chrom() != b.chrom() || a.start() != b.start() || a.end() != b.end() {
        return Err(MergeError::LocusMismatch {
            left: a.locus(),
            right: b.locus(),
        });
    }
    Ok(())
}

/// Ensure an optional column agrees on both sides
pub fn require_equal(
    field: &'static str,
    a: &Option<String>,
    b: &Option<String>,
) -> Result<(), MergeError> {
    if a != b {
        return Err(MergeError::FieldMismatch {
            field,
            left: a.clone().unwrap_or_default(),
            right: b.clone().unwrap_or_default(),
        });
    }
    Ok(())
}

/// Write the chrom/start/end columns
pub fn write_locus<W: Write + ?Sized>(out: &mut W, chrom: &str, start: u64, end: u64) -> io::Result<()> {
    write!(out, "{}\t{}\t{}", chrom, start, end)
}

/// Write `\tvalue` when the column is present
pub fn write_optional<W: Write + ?Sized, T: Display>(out: &mut W, value: Option<T>) -> io::Result<()> {
    if let Some(value) = value {
        write!(out, "\t{}", value)?;
    }
    Ok(())
}
