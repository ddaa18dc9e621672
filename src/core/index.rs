//! Chain-backed mapping index
//!
//! Uses rust-lapper for O(log n + k) interval queries. A haploid index is
//! built from a single chain file; a diploid index from one chain file per
//! haplotype, with lookup keys carrying the `_L`/`_R` suffix.

use crate::core::chain::{parse_chain_file, ChainBlock, ChainFile, ChainParseError};
use crate::core::mapper::{
    intersect_intervals, project_onto_target, MappingIndex, Ploidy, Segment, HAPLOTYPE_SUFFIXES,
};
use crate::core::Strand;
use log::info;
use rust_lapper::{Interval, Lapper};
use std::collections::{BTreeSet, HashMap};
use std::path::Path;

/// Value stored in each interval - target mapping information
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntervalValue {
    pub target_chrom: String,
    pub target_start: u64,
    pub target_end: u64,
    pub target_strand: Strand,
}

/// Type alias for chain intervals
pub type ChainInterval = Interval<u64, IntervalValue>;

/// Interval index organized by (possibly haplotype-suffixed) source contig
pub struct ChainIndex {
    maps: HashMap<String, Lapper<u64, IntervalValue>>,
    /// Reference-side contig names, without haplotype suffix
    contigs: BTreeSet<String>,
    ploidy: Ploidy,
}

impl ChainIndex {
    /// Build a haploid index
    ///
    /// Chains describe reference -> personal. With `reverse`, blocks are
    /// inverted so that personal coordinates are mapped back onto the
    /// reference.
    pub fn haploid(chain: ChainFile, reverse: bool) -> Self {
        Self::build(vec![(chain, "")], Ploidy::Haploid, reverse)
    }

    /// Build a diploid index from the left and right haplotype chains
    pub fn diploid(left: ChainFile, right: ChainFile, reverse: bool) -> Self {
        Self::build(
            vec![(left, HAPLOTYPE_SUFFIXES[0]), (right, HAPLOTYPE_SUFFIXES[1])],
            Ploidy::Diploid,
            reverse,
        )
    }

    /// Load chain files from disk
    ///
    /// Passing a `right` chain makes the index diploid, with `left` as the
    /// first haplotype.
    pub fn from_chain_files(
        left: &Path,
        right: Option<&Path>,
        reverse: bool,
    ) -> Result<Self, ChainParseError> {
        info!("Loading chain file: {}", left.display());
        let left_chain = parse_chain_file(left)?;

        let index = match right {
            Some(right) => {
                info!("Loading chain file: {}", right.display());
                Self::diploid(left_chain, parse_chain_file(right)?, reverse)
            }
            None => Self::haploid(left_chain, reverse),
        };

        info!(
            "Mapping index is {}: {} contigs, {} intervals",
            if index.is_diploid() { "diploid" } else { "haploid" },
            index.contigs.len(),
            index.total_intervals()
        );
        Ok(index)
    }

    fn build(haplotypes: Vec<(ChainFile, &str)>, ploidy: Ploidy, reverse: bool) -> Self {
        let mut blocks_by_chrom: HashMap<String, Vec<ChainInterval>> = HashMap::new();
        let mut contigs = BTreeSet::new();

        for (chain, suffix) in haplotypes {
            // Chains run reference -> personal, whichever way we convert.
            contigs.extend(chain.source_chrom_sizes.keys().cloned());

            let chain = if reverse { chain.invert() } else { chain };
            for block in chain.blocks {
                let key = haplotype_key(&block.source_chrom, suffix);
                blocks_by_chrom.entry(key).or_default().push(to_interval(block));
            }
        }

        let maps = blocks_by_chrom
            .into_iter()
            .map(|(chrom, intervals)| (chrom, Lapper::new(intervals)))
            .collect();

        Self {
            maps,
            contigs,
            ploidy,
        }
    }

    /// Check if a lookup key exists in the index
    pub fn has_contig(&self, contig: &str) -> bool {
        self.maps.contains_key(contig)
    }

    /// Get the number of intervals for a lookup key
    pub fn interval_count(&self, contig: &str) -> usize {
        self.maps.get(contig).map(|l| l.len()).unwrap_or(0)
    }

    /// Get total number of intervals across all contigs
    pub fn total_intervals(&self) -> usize {
        self.maps.values().map(|l| l.len()).sum()
    }
}

/// Lookup key for a contig on one haplotype
///
/// Names that already carry the suffix are kept as they are, so personal
/// assemblies may name their contigs either `chr1` or `chr1_L`.
fn haplotype_key(name: &str, suffix: &str) -> String {
    if name.ends_with(suffix) {
        name.to_string()
    } else {
        format!("{}{}", name, suffix)
    }
}

fn to_interval(block: ChainBlock) -> ChainInterval {
    Interval {
        start: block.source_start,
        stop: block.source_end,
        val: IntervalValue {
            target_chrom: block.target_chrom,
            target_start: block.target_start,
            target_end: block.target_end,
            target_strand: block.target_strand,
        },
    }
}

impl MappingIndex for ChainIndex {
    fn ploidy(&self) -> Ploidy {
        self.ploidy
    }

    fn contigs(&self) -> &BTreeSet<String> {
        &self.contigs
    }

    fn find_mappings(&self, contig: &str, start: u64, end: u64) -> Option<Vec<Segment>> {
        let lapper = self.maps.get(contig)?;

        let mut segments: Vec<Segment> = lapper
            .find(start, end)
            .filter_map(|iv| {
                let (real_start, real_end) = intersect_intervals(start, end, iv.start, iv.stop)?;
                let (target_start, target_end) = project_onto_target(
                    iv.val.target_start,
                    iv.val.target_end,
                    iv.val.target_strand,
                    real_start - iv.start,
                    real_end - real_start,
                );
                Some(Segment {
                    target_contig: iv.val.target_chrom.clone(),
                    source_start: real_start,
                    source_end: real_end,
                    target_start,
                    target_end,
                })
            })
            .collect();

        if segments.is_empty() {
            return None;
        }
        segments.sort_by_key(|s| (s.target_start, s.target_end));
        Some(segments)
    }
}
