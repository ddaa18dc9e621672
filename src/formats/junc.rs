//! Splice junction (BED-like `.junc`) records
//!
//! Columns: `chrom start end name score strand extra...`. Everything past
//! the strand column is carried as one tab-joined `extra` payload.

use crate::core::{MergeError, RecordParseError};
use crate::formats::schema::{
    parse_number, require_equal, require_locus, require_same_locus, write_locus, write_optional,
    MergePolicy, Schema,
};
use std::io::{self, Write};

/// One junction line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JuncRecord {
    pub chrom: String,
    pub start: u64,
    pub end: u64,
    pub name: Option<String>,
    /// Read support; kept raw and only interpreted when merging
    pub score: Option<String>,
    pub strand: Option<String>,
    pub extra: Option<String>,
}

impl Schema for JuncRecord {
    const FORMAT: &'static str = "JUNC";
    const FIELDS: &'static [&'static str] =
        &["chrom", "start", "end", "name", "score", "strand", "extra"];

    type Merge = SumScores;

    fn parse(fields: &[&str]) -> Result<Self, RecordParseError> {
        require_locus(fields)?;
        let column = |i: usize| fields.get(i).map(|s| s.to_string());
        // `extra` swallows every column from its position on
        let tail = Self::FIELDS.len() - 1;

        Ok(Self {
            chrom: fields[0].to_string(),
            start: parse_number("start", fields[1])?,
            end: parse_number("end", fields[2])?,
            name: column(3),
            score: column(4),
            strand: column(5),
            extra: (fields.len() > tail).then(|| fields[tail..].join("\t")),
        })
    }

    fn chrom(&self) -> &str {
        &self.chrom
    }

    fn start(&self) -> u64 {
        self.start
    }

    fn end(&self) -> u64 {
        self.end
    }

    fn relocate(&mut self, chrom: &str, start: u64, end: u64) {
        self.chrom = chrom.to_string();
        self.start = start;
        self.end = end;
    }

    fn write_to<W: Write + ?Sized>(&self, out: &mut W) -> io::Result<()> {
        write_locus(out, &self.chrom, self.start, self.end)?;
        write_optional(out, self.name.as_deref())?;
        write_optional(out, self.score.as_deref())?;
        write_optional(out, self.strand.as_deref())?;
        write_optional(out, self.extra.as_deref())
    }
}

/// Junction merge: scores add up, every other column must be identical
#[derive(Debug, Clone, Copy, Default)]
pub struct SumScores;

fn parse_score(value: &Option<String>) -> Result<i64, MergeError> {
    let raw = value.as_deref().unwrap_or_default();
    raw.trim().parse().map_err(|_| MergeError::NotANumber {
        field: "score",
        value: raw.to_string(),
    })
}

impl MergePolicy<JuncRecord> for SumScores {
    fn merge(&self, a: &JuncRecord, b: &JuncRecord) -> Result<JuncRecord, MergeError> {
        require_same_locus(a, b)?;
        require_equal("name", &a.name, &b.name)?;
        require_equal("strand", &a.strand, &b.strand)?;
        require_equal("extra", &a.extra, &b.extra)?;

        let score = match (&a.score, &b.score) {
            (None, None) => None,
            _ => {
                let (left, right) = (parse_score(&a.score)?, parse_score(&b.score)?);
                let total = left.checked_add(right).ok_or_else(|| MergeError::Overflow {
                    field: "score",
                    left: left.to_string(),
                    right: right.to_string(),
                })?;
                Some(total.to_string())
            }
        };

        Ok(JuncRecord {
            score,
            ..a.clone()
        })
    }
}
