//! File format adapters
//!
//! Record schemas for splice junction (`.junc`) and annotated splice-site
//! (STAR `SJ.out.tab`) files, the streaming reader and the conversion
//! pipeline shared by both.

pub mod convert;
pub mod junc;
pub mod reader;
pub mod schema;
pub mod splice_tab;

pub use convert::{
    convert_file, convert_reader, unmapped_path, ConversionKey, ConversionStats, ConvertOptions,
    Converter, DEFAULT_PROGRESS_INTERVAL,
};
pub use junc::{JuncRecord, SumScores};
pub use reader::{Entry, RecordReader};
pub use schema::{MergePolicy, Schema};
pub use splice_tab::{CombineSpliceSites, SpliceSiteRecord};
