//! Chain file parsing
//!
//! Parses UCSC chain files into alignment blocks that back the
//! [`ChainIndex`](crate::core::ChainIndex) mapping oracle.
//!
//! # Chain File Format
//!
//! ```text
//! chain score tName tSize tStrand tStart tEnd qName qSize qStrand qStart qEnd id
//! size dt dq
//! size dt dq
//! size
//! ```
//!
//! UCSC "target" (t) is the assembly the records come from, so it becomes our
//! *source*; UCSC "query" (q) is the assembly we convert into, our *target*.

use crate::core::io::open_input;
use crate::core::Strand;
use std::collections::HashMap;
use std::io::BufRead;
use std::path::Path;

/// Error raised while reading a chain file
#[derive(Debug, Clone)]
pub struct ChainParseError {
    /// Human-readable error message
    pub message: String,
    /// Line number where the error occurred (1-based)
    pub line_number: Option<usize>,
    /// The kind of error that occurred
    pub kind: ChainParseErrorKind,
}

/// Specific kinds of chain parsing errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainParseErrorKind {
    InvalidHeader,
    InvalidDataLine,
    InvalidStrand,
    InvalidNumber,
    InvalidCoordinates,
    /// A data line appeared before any `chain` header
    OrphanDataLine,
    IoError,
}

impl std::fmt::Display for ChainParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.line_number {
            Some(line) => write!(f, "Line {}: {}", line, self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for ChainParseError {}

impl ChainParseError {
    fn at(kind: ChainParseErrorKind, line_number: usize, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            line_number: Some(line_number),
            kind,
        }
    }

    fn invalid_number(field: &str, value: &str, line_number: usize) -> Self {
        Self::at(
            ChainParseErrorKind::InvalidNumber,
            line_number,
            format!("Invalid {} value '{}': expected a non-negative integer", field, value),
        )
    }

    /// Check if this is a specific kind of error
    pub fn is_kind(&self, kind: ChainParseErrorKind) -> bool {
        self.kind == kind
    }
}

impl From<std::io::Error> for ChainParseError {
    fn from(e: std::io::Error) -> Self {
        Self {
            message: format!("IO error: {}", e),
            line_number: None,
            kind: ChainParseErrorKind::IoError,
        }
    }
}

fn parse_u64(field: &str, value: &str, line_number: usize) -> Result<u64, ChainParseError> {
    value
        .parse::<u64>()
        .map_err(|_| ChainParseError::invalid_number(field, value, line_number))
}

fn parse_strand(value: &str, line_number: usize) -> Result<Strand, ChainParseError> {
    match value {
        "+" => Ok(Strand::Plus),
        "-" => Ok(Strand::Minus),
        other => Err(ChainParseError::at(
            ChainParseErrorKind::InvalidStrand,
            line_number,
            format!("Invalid strand '{}', expected '+' or '-'", other),
        )),
    }
}

/// One side (source or target) of a chain header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainSide {
    pub name: String,
    pub size: u64,
    pub strand: Strand,
    pub start: u64,
    pub end: u64,
}

impl ChainSide {
    fn parse(fields: &[&str], label: &str, line_number: usize) -> Result<Self, ChainParseError> {
        let side = Self {
            name: fields[0].to_string(),
            size: parse_u64(&format!("{} size", label), fields[1], line_number)?,
            strand: parse_strand(fields[2], line_number)?,
            start: parse_u64(&format!("{} start", label), fields[3], line_number)?,
            end: parse_u64(&format!("{} end", label), fields[4], line_number)?,
        };

        if side.start > side.end {
            return Err(ChainParseError::at(
                ChainParseErrorKind::InvalidCoordinates,
                line_number,
                format!("{} start ({}) > {} end ({})", label, side.start, label, side.end),
            ));
        }
        if side.end > side.size {
            return Err(ChainParseError::at(
                ChainParseErrorKind::InvalidCoordinates,
                line_number,
                format!("{} end ({}) > {} size ({})", label, side.end, label, side.size),
            ));
        }
        Ok(side)
    }

    /// Forward-strand interval of a block starting `offset` bases into this side
    fn block(&self, offset: u64, size: u64) -> (u64, u64) {
        match self.strand {
            Strand::Plus => (offset, offset + size),
            Strand::Minus => (self.size - (offset + size), self.size - offset),
        }
    }
}

/// Parsed chain header
#[derive(Debug, Clone)]
pub struct ChainHeader {
    pub score: u64,
    pub source: ChainSide,
    pub target: ChainSide,
    pub chain_id: String,
}

impl ChainHeader {
    /// Parse a `chain ...` header line
    pub fn parse(line: &str, line_number: usize) -> Result<Self, ChainParseError> {
        let fields: Vec<&str> = line.split_whitespace().collect();

        if fields.len() < 12 || fields[0] != "chain" {
            return Err(ChainParseError::at(
                ChainParseErrorKind::InvalidHeader,
                line_number,
                format!("Expected 'chain' followed by 11+ fields, got {} fields", fields.len()),
            ));
        }

        Ok(Self {
            score: parse_u64("score", fields[1], line_number)?,
            source: ChainSide::parse(&fields[2..7], "source", line_number)?,
            target: ChainSide::parse(&fields[7..12], "target", line_number)?,
            chain_id: fields.get(12).map(|s| s.to_string()).unwrap_or_default(),
        })
    }
}

/// A single ungapped alignment block, in forward-strand coordinates
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainBlock {
    pub source_chrom: String,
    pub source_start: u64,
    pub source_end: u64,
    pub target_chrom: String,
    pub target_start: u64,
    pub target_end: u64,
    /// Relative orientation of target to source
    pub target_strand: Strand,
}

impl ChainBlock {
    /// Swap source and target, turning an A→B block into a B→A block
    pub fn invert(self) -> Self {
        Self {
            source_chrom: self.target_chrom,
            source_start: self.target_start,
            source_end: self.target_end,
            target_chrom: self.source_chrom,
            target_start: self.source_start,
            target_end: self.source_end,
            target_strand: self.target_strand,
        }
    }
}

/// Result of parsing a chain file
#[derive(Debug, Clone, Default)]
pub struct ChainFile {
    pub blocks: Vec<ChainBlock>,
    pub source_chrom_sizes: HashMap<String, u64>,
    pub target_chrom_sizes: HashMap<String, u64>,
}

impl ChainFile {
    /// Swap the direction of every block
    pub fn invert(self) -> Self {
        Self {
            blocks: self.blocks.into_iter().map(ChainBlock::invert).collect(),
            source_chrom_sizes: self.target_chrom_sizes,
            target_chrom_sizes: self.source_chrom_sizes,
        }
    }
}

/// Parse chain data from any buffered reader
pub fn parse_chain_reader<R: BufRead>(reader: R) -> Result<ChainFile, ChainParseError> {
    let mut result = ChainFile::default();
    let mut current: Option<ChainHeader> = None;
    let mut source_pos: u64 = 0;
    let mut target_pos: u64 = 0;

    for (index, line_result) in reader.lines().enumerate() {
        let line_number = index + 1;
        let line = line_result?;
        let trimmed = line.trim();

        if trimmed.is_empty() || trimmed.starts_with('#') {
            current = None;
            continue;
        }

        if trimmed.starts_with("chain") {
            let header = ChainHeader::parse(trimmed, line_number)?;
            result
                .source_chrom_sizes
                .insert(header.source.name.clone(), header.source.size);
            result
                .target_chrom_sizes
                .insert(header.target.name.clone(), header.target.size);
            source_pos = header.source.start;
            target_pos = header.target.start;
            current = Some(header);
            continue;
        }

        let header = current.as_ref().ok_or_else(|| {
            ChainParseError::at(
                ChainParseErrorKind::OrphanDataLine,
                line_number,
                "Alignment data line outside of a chain",
            )
        })?;

        let fields: Vec<&str> = trimmed.split_whitespace().collect();
        let (size, source_gap, target_gap) = match fields.as_slice() {
            [size] => (parse_u64("block size", size, line_number)?, 0, 0),
            [size, dt, dq] => (
                parse_u64("block size", size, line_number)?,
                parse_u64("source gap (dt)", dt, line_number)?,
                parse_u64("target gap (dq)", dq, line_number)?,
            ),
            _ => {
                return Err(ChainParseError::at(
                    ChainParseErrorKind::InvalidDataLine,
                    line_number,
                    format!("Expected 1 or 3 fields, got {}", fields.len()),
                ))
            }
        };
        if size == 0 {
            return Err(ChainParseError::at(
                ChainParseErrorKind::InvalidDataLine,
                line_number,
                "Block size must be greater than 0",
            ));
        }
        if source_pos + size > header.source.size || target_pos + size > header.target.size {
            return Err(ChainParseError::at(
                ChainParseErrorKind::InvalidCoordinates,
                line_number,
                "Alignment block runs past the end of its sequence",
            ));
        }

        let (source_start, source_end) = header.source.block(source_pos, size);
        let (target_start, target_end) = header.target.block(target_pos, size);
        let target_strand = if header.source.strand == header.target.strand {
            Strand::Plus
        } else {
            Strand::Minus
        };

        result.blocks.push(ChainBlock {
            source_chrom: header.source.name.clone(),
            source_start,
            source_end,
            target_chrom: header.target.name.clone(),
            target_start,
            target_end,
            target_strand,
        });

        source_pos += size + source_gap;
        target_pos += size + target_gap;
    }

    Ok(result)
}

/// Parse a chain file, handling gzip and bzip2 compression
pub fn parse_chain_file(path: &Path) -> Result<ChainFile, ChainParseError> {
    let reader = open_input(path)?;
    parse_chain_reader(reader)
}

/// Parse chain data held in memory
pub fn parse_chain_bytes(data: &[u8]) -> Result<ChainFile, ChainParseError> {
    parse_chain_reader(data)
}
