//! Core coordinate mapping functionality
//!
//! This module contains the mapping oracle contract, the chain-backed
//! index implementing it, haplotype contig resolution and I/O helpers.

mod chain;
mod error;
mod index;
pub mod io;
mod mapper;
mod resolver;

pub use chain::{
    parse_chain_bytes, parse_chain_file, parse_chain_reader, ChainBlock, ChainFile, ChainHeader,
    ChainParseError, ChainParseErrorKind, ChainSide,
};
pub use error::{ConversionError, ConversionResult, MergeError, RecordParseError};
pub use index::{ChainIndex, ChainInterval, IntervalValue};
pub use io::{create_output, detect_compression, open_input, CompressionFormat, LineIterator};
pub use mapper::{
    intersect_intervals, project_onto_target, MappingIndex, Ploidy, Segment, Strand,
    HAPLOTYPE_SUFFIXES,
};
pub use resolver::ContigResolver;
