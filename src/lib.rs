//! FastJuncLift - splice junction liftover between reference and personal genomes
//!
//! Converts splice junction (`.junc`) and annotated splice-site (STAR
//! `SJ.out.tab`) records through chain-file coordinate mappings.
//!
//! # Features
//!
//! - Haploid and diploid (`_L`/`_R` haplotype) personal genomes
//! - Forward (reference -> personal) and reverse conversion
//! - Records landing on the same target interval are merged
//! - Support for compressed inputs and chain files (gzip, bzip2)
//!
//! # Example
//!
//! ```ignore
//! use fast_junclift::{convert_file, ChainIndex, ConvertOptions, JuncRecord};
//!
//! // Load the left and right haplotype chains
//! let index = ChainIndex::from_chain_files("ref_to_L.chain".as_ref(), Some("ref_to_R.chain".as_ref()), false)?;
//!
//! // Convert, writing lifted records to a file
//! let stats = convert_file::<JuncRecord>(&index, "sample.junc".as_ref(), Some("lifted.junc".as_ref()), ConvertOptions::default())?;
//! ```

pub mod core;
pub mod formats;

// Re-export commonly used types
pub use core::{
    parse_chain_bytes, parse_chain_file, ChainBlock, ChainFile, ChainHeader, ChainIndex,
    ChainParseError, ContigResolver, ConversionError, MappingIndex, MergeError,
    Ploidy, Segment, Strand,
};
pub use formats::{
    convert_file, convert_reader, ConversionStats, ConvertOptions, JuncRecord, Schema,
    SpliceSiteRecord,
};
