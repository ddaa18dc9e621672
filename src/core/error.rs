//! Error types for FastJuncLift
//!
//! Every fatal condition of a conversion run is a variant of
//! [`ConversionError`]. An unmapped record is not an error.

use thiserror::Error;

/// Structural problems with a single tab-delimited line
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordParseError {
    /// Fewer than the mandatory chrom/start/end columns
    #[error("expected at least {expected} fields, found {found}")]
    TooFewFields { expected: usize, found: usize },

    /// More columns than the record type defines
    #[error("expected at most {expected} fields, found {found}")]
    TooManyFields { expected: usize, found: usize },

    /// Column count differs from the first data line of the file
    #[error("found {found} fields, but the first record of the file has {expected}")]
    FieldCountMismatch { expected: usize, found: usize },

    /// A coordinate or count column is not a non-negative integer
    #[error("invalid integer in field '{field}': '{value}'")]
    InvalidNumber { field: &'static str, value: String },
}

/// Violations of a merge policy precondition
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MergeError {
    /// The two records do not share chrom/start/end
    #[error("records cover different intervals ({left} vs {right})")]
    LocusMismatch { left: String, right: String },

    /// A column that must agree on both sides differs
    #[error("field '{field}' differs ('{left}' vs '{right}')")]
    FieldMismatch {
        field: &'static str,
        left: String,
        right: String,
    },

    /// A column that must be summed is missing or not an integer
    #[error("field '{field}' is not an integer: '{value}'")]
    NotANumber { field: &'static str, value: String },

    /// Combining the two values does not fit the column's integer type
    #[error("field '{field}' overflows when combining '{left}' and '{right}'")]
    Overflow {
        field: &'static str,
        left: String,
        right: String,
    },
}

/// Fatal errors raised while converting a record file
#[derive(Debug, Error)]
pub enum ConversionError {
    /// Bad line structure or non-integer coordinate
    #[error("Improperly formatted {format} file, line number: {line}, line: {content} ({source})")]
    MalformedRecord {
        format: &'static str,
        line: usize,
        content: String,
        #[source]
        source: RecordParseError,
    },

    /// Diploid reverse conversion could not map a contig to exactly one index contig
    #[error(
        "Contig '{chrom}' matches {} mapping index contigs by prefix, expected exactly one{}",
        .candidates.len(),
        describe_candidates(.candidates)
    )]
    AmbiguousContig {
        chrom: String,
        candidates: Vec<String>,
    },

    /// Two converted records on the same target interval cannot be combined
    #[error("Cannot merge records at {locus} (line {line}): {source}")]
    IncompatibleMerge {
        locus: String,
        line: usize,
        #[source]
        source: MergeError,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn describe_candidates(candidates: &[String]) -> String {
    if candidates.is_empty() {
        String::new()
    } else {
        format!(" ({})", candidates.join(", "))
    }
}

/// Result type alias for conversion operations
pub type ConversionResult<T> = std::result::Result<T, ConversionError>;
