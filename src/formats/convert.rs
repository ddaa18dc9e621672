//! Record conversion pipeline
//!
//! One generic pipeline for every [`Schema`]: each record is fanned out over
//! the index's haplotypes, mapped, keyed by its target interval and merged
//! with earlier records on the same key. Converted records are held in
//! insertion order and written once the input is exhausted, so peak memory
//! grows with the number of distinct target intervals.

use crate::core::{
    create_output, open_input, ContigResolver, ConversionError, ConversionResult, MappingIndex,
};
use crate::formats::reader::{Entry, RecordReader};
use crate::formats::schema::{MergePolicy, Schema};
use indexmap::map::Entry as Slot;
use indexmap::IndexMap;
use log::{debug, info};
use std::ffi::OsString;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

/// Default number of records between progress log lines
pub const DEFAULT_PROGRESS_INTERVAL: usize = 100_000;

/// Suffix appended to the output name for the unmapped records file
pub const UNMAPPED_SUFFIX: &str = ".unmapped";

/// Target interval a converted record lands on
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConversionKey {
    pub contig: String,
    pub start: u64,
    pub end: u64,
}

/// Run configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConvertOptions {
    /// Convert personal genome coordinates back to the reference
    pub reverse: bool,
    /// Log progress every this many records; 0 disables progress lines
    pub progress_interval: usize,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            reverse: false,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
        }
    }
}

/// Conversion statistics
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ConversionStats {
    /// Data records read
    pub total: usize,
    /// Records mapped under at least one haplotype
    pub success: usize,
    /// Records mapped under no haplotype
    pub failed: usize,
    /// Converted records folded into an existing target interval
    pub merged: usize,
}

/// Accumulates converted records of one schema for one run
pub struct Converter<'a, I: MappingIndex + ?Sized, S: Schema> {
    index: &'a I,
    options: ConvertOptions,
    resolver: ContigResolver,
    policy: S::Merge,
    results: IndexMap<ConversionKey, S>,
    stats: ConversionStats,
}

impl<'a, I: MappingIndex + ?Sized, S: Schema> Converter<'a, I, S> {
    pub fn new(index: &'a I, options: ConvertOptions) -> Self {
        Self {
            index,
            options,
            resolver: ContigResolver::new(),
            policy: S::Merge::default(),
            results: IndexMap::new(),
            stats: ConversionStats::default(),
        }
    }

    pub fn stats(&self) -> ConversionStats {
        self.stats
    }

    /// Distinct target intervals collected so far
    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Converted records in output order
    pub fn records(&self) -> impl Iterator<Item = (&ConversionKey, &S)> {
        self.results.iter()
    }

    /// Query and output contig names for one haplotype variant
    fn variant_names(&mut self, chrom: &str, suffix: &str) -> ConversionResult<(String, String)> {
        if self.index.is_haploid() {
            return Ok((chrom.to_string(), chrom.to_string()));
        }
        if self.options.reverse {
            let resolved = self.resolver.resolve(chrom, self.index.contigs())?;
            return Ok((chrom.to_string(), resolved.to_string()));
        }
        let suffixed = format!("{}{}", chrom, suffix);
        Ok((suffixed.clone(), suffixed))
    }

    /// Convert one record
    ///
    /// Returns whether any haplotype variant mapped. A record that did not
    /// map belongs in the unmapped output.
    pub fn convert_record(&mut self, record: &S, line_number: usize) -> ConversionResult<bool> {
        self.stats.total += 1;

        let query_start = record.start().saturating_sub(1);
        let query_end = record.end();
        let mut mapped = false;

        for suffix in self.index.ploidy().suffixes() {
            let (query, contig) = self.variant_names(record.chrom(), suffix)?;

            let segments = self
                .index
                .find_mappings(&query, query_start, query_end)
                .unwrap_or_default();
            match (segments.first(), segments.last()) {
                (Some(first), Some(last)) => {
                    let key = ConversionKey {
                        contig,
                        start: first.target_start + 1,
                        end: last.target_end,
                    };
                    debug!(
                        "Line {}: {}:{}-{} -> {}:{}-{}",
                        line_number,
                        query,
                        record.start(),
                        query_end,
                        key.contig,
                        key.start,
                        key.end
                    );
                    self.insert(record, key, line_number)?;
                    mapped = true;
                }
                _ => debug!("Line {}: {} unmapped on {}", line_number, record.locus(), query),
            }

            if self.options.reverse {
                break;
            }
        }

        if mapped {
            self.stats.success += 1;
        } else {
            self.stats.failed += 1;
        }

        let interval = self.options.progress_interval;
        if interval > 0 && self.stats.total % interval == 0 {
            info!(
                "Processed {} records ({} converted, {} unmapped)",
                self.stats.total, self.stats.success, self.stats.failed
            );
        }

        Ok(mapped)
    }

    fn insert(&mut self, record: &S, key: ConversionKey, line_number: usize) -> ConversionResult<()> {
        let mut converted = record.clone();
        converted.relocate(&key.contig, key.start, key.end);

        match self.results.entry(key) {
            Slot::Occupied(mut slot) => {
                let merged = self
                    .policy
                    .merge(slot.get(), &converted)
                    .map_err(|source| ConversionError::IncompatibleMerge {
                        locus: converted.locus(),
                        line: line_number,
                        source,
                    })?;
                slot.insert(merged);
                self.stats.merged += 1;
            }
            Slot::Vacant(slot) => {
                slot.insert(converted);
            }
        }
        Ok(())
    }

    /// Write every converted record, one line each, and return the run statistics
    pub fn finish<W: Write + ?Sized>(self, output: &mut W) -> ConversionResult<ConversionStats> {
        for record in self.results.values() {
            record.write_to(output)?;
            output.write_all(b"\n")?;
        }
        output.flush()?;

        info!(
            "Wrote {} {} records ({} merged)",
            self.results.len(),
            S::FORMAT,
            self.stats.merged
        );
        Ok(self.stats)
    }
}

/// Convert a record stream
///
/// Unmapped raw lines are written to `unmapped` as they are met; converted
/// records are written to `output` only after the whole input was read, so
/// a fatal error leaves `output` untouched.
pub fn convert_reader<S: Schema>(
    index: &(impl MappingIndex + ?Sized),
    input: impl BufRead,
    output: &mut (impl Write + ?Sized),
    unmapped: &mut (impl Write + ?Sized),
    options: ConvertOptions,
) -> ConversionResult<ConversionStats> {
    let mut converter = Converter::<_, S>::new(index, options);

    for entry in RecordReader::<_, S>::new(input) {
        match entry? {
            Entry::Header(line) => debug!("Skipping header line: {}", line),
            Entry::Record {
                record,
                raw,
                line_number,
            } => {
                if !converter.convert_record(&record, line_number)? {
                    writeln!(unmapped, "{}", raw)?;
                }
            }
        }
    }

    let stats = converter.finish(output)?;
    unmapped.flush()?;
    Ok(stats)
}

/// Where unmapped records go: next to the output file, or in the working
/// directory, named after the input, when converting to stdout
pub fn unmapped_path(input: &Path, output: Option<&Path>) -> PathBuf {
    let mut name: OsString = match output {
        Some(path) => path.as_os_str().to_owned(),
        None => input.file_name().unwrap_or(input.as_os_str()).to_owned(),
    };
    name.push(UNMAPPED_SUFFIX);
    PathBuf::from(name)
}

/// Convert a record file, optionally compressed
///
/// Converted records go to `output`, or stdout when `None`.
pub fn convert_file<S: Schema>(
    index: &(impl MappingIndex + ?Sized),
    input: &Path,
    output: Option<&Path>,
    options: ConvertOptions,
) -> ConversionResult<ConversionStats> {
    let unmapped = unmapped_path(input, output);
    info!(
        "Converting {} records from {} (unmapped -> {})",
        S::FORMAT,
        input.display(),
        unmapped.display()
    );

    let reader = open_input(input)?;
    let mut out = create_output(output)?;
    let mut unmap = create_output(Some(unmapped.as_path()))?;

    convert_reader::<S>(index, reader, &mut out, &mut unmap, options)
}
