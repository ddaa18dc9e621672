//! Annotated splice-site tables (STAR `SJ.out.tab`)
//!
//! Columns: `chrom start end strand motif annotated unique_reads multimap
//! max_overhang`. Count columns are kept as written and only read as
//! numbers when two sites are merged.

use crate::core::{MergeError, RecordParseError};
use crate::formats::schema::{
    parse_number, require_equal, require_locus, require_same_locus, write_locus, write_optional,
    MergePolicy, Schema,
};
use std::io::{self, Write};
use std::str::FromStr;

/// One splice-site line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpliceSiteRecord {
    pub chrom: String,
    pub start: u64,
    pub end: u64,
    pub strand: Option<String>,
    pub motif: Option<String>,
    pub annotated: Option<String>,
    pub unique_reads: Option<String>,
    /// Mean multimapping read count over the records merged into this one
    pub multimap: Option<String>,
    pub max_overhang: Option<String>,
    /// Input records folded into this one
    records: u64,
}

impl SpliceSiteRecord {
    /// Number of input records this site was merged from
    pub fn records(&self) -> u64 {
        self.records
    }
}

impl Schema for SpliceSiteRecord {
    const FORMAT: &'static str = "TAB";
    const FIELDS: &'static [&'static str] = &[
        "chrom",
        "start",
        "end",
        "strand",
        "motif",
        "annotated",
        "unique_reads",
        "multimap",
        "max_overhang",
    ];

    type Merge = CombineSpliceSites;

    fn parse(fields: &[&str]) -> Result<Self, RecordParseError> {
        require_locus(fields)?;
        if fields.len() > Self::FIELDS.len() {
            return Err(RecordParseError::TooManyFields {
                expected: Self::FIELDS.len(),
                found: fields.len(),
            });
        }
        let column = |i: usize| fields.get(i).map(|s| s.to_string());

        Ok(Self {
            chrom: fields[0].to_string(),
            start: parse_number("start", fields[1])?,
            end: parse_number("end", fields[2])?,
            strand: column(3),
            motif: column(4),
            annotated: column(5),
            unique_reads: column(6),
            multimap: column(7),
            max_overhang: column(8),
            records: 1,
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
        write_optional(out, self.strand.as_deref())?;
        write_optional(out, self.motif.as_deref())?;
        write_optional(out, self.annotated.as_deref())?;
        write_optional(out, self.unique_reads.as_deref())?;
        write_optional(out, self.multimap.as_deref())?;
        write_optional(out, self.max_overhang.as_deref())
    }
}

/// Splice-site merge
///
/// - motif and strand must match: a different motif means a different site
/// - annotated is OR'd (`0` with `1` gives `1`); any other disagreement fails
/// - unique reads add up, multimappers are averaged, max overhang is the max
#[derive(Debug, Clone, Copy, Default)]
pub struct CombineSpliceSites;

fn merge_annotated(a: &Option<String>, b: &Option<String>) -> Result<Option<String>, MergeError> {
    match (a.as_deref(), b.as_deref()) {
        (x, y) if x == y => Ok(a.clone()),
        (Some("0"), Some("1")) | (Some("1"), Some("0")) => Ok(Some("1".to_string())),
        (x, y) => Err(MergeError::FieldMismatch {
            field: "annotated",
            left: x.unwrap_or_default().to_string(),
            right: y.unwrap_or_default().to_string(),
        }),
    }
}

fn parse_count<T: FromStr>(field: &'static str, value: &str) -> Result<T, MergeError> {
    value.trim().parse().map_err(|_| MergeError::NotANumber {
        field,
        value: value.to_string(),
    })
}

/// Combine a count column present on both sides, or absent on both
fn merge_column<F>(
    field: &'static str,
    a: &Option<String>,
    b: &Option<String>,
    combine: F,
) -> Result<Option<String>, MergeError>
where
    F: FnOnce(&str, &str) -> Result<String, MergeError>,
{
    match (a.as_deref(), b.as_deref()) {
        (Some(x), Some(y)) => combine(x, y).map(Some),
        (None, None) => Ok(None),
        (x, y) => Err(MergeError::FieldMismatch {
            field,
            left: x.unwrap_or_default().to_string(),
            right: y.unwrap_or_default().to_string(),
        }),
    }
}

fn sum_unique_reads(x: &str, y: &str) -> Result<String, MergeError> {
    let left: u64 = parse_count("unique_reads", x)?;
    let right: u64 = parse_count("unique_reads", y)?;
    left.checked_add(right)
        .map(|total| total.to_string())
        .ok_or_else(|| MergeError::Overflow {
            field: "unique_reads",
            left: x.to_string(),
            right: y.to_string(),
        })
}

fn larger_overhang(x: &str, y: &str) -> Result<String, MergeError> {
    let left: u64 = parse_count("max_overhang", x)?;
    let right: u64 = parse_count("max_overhang", y)?;
    Ok(left.max(right).to_string())
}

/// Weighted mean of two averages over `n` and `m` records
fn mean_multimap(x: &str, n: u64, y: &str, m: u64) -> Result<String, MergeError> {
    let finite = |value: &str| -> Result<f64, MergeError> {
        let parsed: f64 = parse_count("multimap", value)?;
        if parsed.is_finite() {
            Ok(parsed)
        } else {
            Err(MergeError::NotANumber {
                field: "multimap",
                value: value.to_string(),
            })
        }
    };
    let (left, right) = (finite(x)?, finite(y)?);
    let mean = (left * n as f64 + right * m as f64) / (n + m) as f64;
    if !mean.is_finite() {
        return Err(MergeError::Overflow {
            field: "multimap",
            left: x.to_string(),
            right: y.to_string(),
        });
    }
    Ok(mean.to_string())
}

impl MergePolicy<SpliceSiteRecord> for CombineSpliceSites {
    fn merge(
        &self,
        a: &SpliceSiteRecord,
        b: &SpliceSiteRecord,
    ) -> Result<SpliceSiteRecord, MergeError> {
        require_same_locus(a, b)?;
        require_equal("motif", &a.motif, &b.motif)?;
        require_equal("strand", &a.strand, &b.strand)?;

        Ok(SpliceSiteRecord {
            chrom: a.chrom.clone(),
            start: a.start,
            end: a.end,
            strand: a.strand.clone(),
            motif: a.motif.clone(),
            annotated: merge_annotated(&a.annotated, &b.annotated)?,
            unique_reads: merge_column(
                "unique_reads",
                &a.unique_reads,
                &b.unique_reads,
                sum_unique_reads,
            )?,
            multimap: merge_column("multimap", &a.multimap, &b.multimap, |x, y| {
                mean_multimap(x, a.records, y, b.records)
            })?,
            max_overhang: merge_column(
                "max_overhang",
                &a.max_overhang,
                &b.max_overhang,
                larger_overhang,
            )?,
            records: a.records + b.records,
        })
    }
}
