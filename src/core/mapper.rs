//! Mapping oracle contract
//!
//! The conversion pipeline only ever talks to a [`MappingIndex`]: "which
//! target segments does this source interval land on?". This module holds
//! that contract together with the small geometry helpers used by the
//! chain-backed implementation.

use std::collections::BTreeSet;

/// Haplotype suffixes appended to contig names of a diploid genome
pub const HAPLOTYPE_SUFFIXES: [&str; 2] = ["_L", "_R"];

/// Strand orientation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum Strand {
    #[default]
    Plus,
    Minus,
}

impl Strand {
    /// Convert to char
    pub fn to_char(&self) -> char {
        match self {
            Strand::Plus => '+',
            Strand::Minus => '-',
        }
    }
}

impl std::fmt::Display for Strand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_char())
    }
}

/// Number of haplotypes described by a mapping index
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ploidy {
    Haploid,
    Diploid,
}

impl Ploidy {
    /// Contig name suffixes to fan a record out over
    pub fn suffixes(&self) -> &'static [&'static str] {
        match self {
            Ploidy::Haploid => &[""],
            Ploidy::Diploid => &HAPLOTYPE_SUFFIXES,
        }
    }
}

/// One contiguous mapped block returned by a [`MappingIndex`]
///
/// Coordinates are 0-based half-open on both sides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub target_contig: String,
    pub source_start: u64,
    pub source_end: u64,
    pub target_start: u64,
    pub target_end: u64,
}

/// Coordinate mapping oracle consumed by the conversion pipeline
pub trait MappingIndex {
    /// Whether contigs come in `_L`/`_R` haplotype pairs
    fn ploidy(&self) -> Ploidy;

    fn is_diploid(&self) -> bool {
        self.ploidy() == Ploidy::Diploid
    }

    fn is_haploid(&self) -> bool {
        self.ploidy() == Ploidy::Haploid
    }

    /// Unsuffixed contig names known to the index
    fn contigs(&self) -> &BTreeSet<String>;

    /// Map `[start, end)` on `contig`
    ///
    /// Returns `None` when the interval falls entirely in unmapped
    /// sequence, otherwise a non-empty list of segments ordered by
    /// increasing target position.
    fn find_mappings(&self, contig: &str, start: u64, end: u64) -> Option<Vec<Segment>>;
}

impl<T: MappingIndex + ?Sized> MappingIndex for &T {
    fn ploidy(&self) -> Ploidy {
        (**self).ploidy()
    }

    fn contigs(&self) -> &BTreeSet<String> {
        (**self).contigs()
    }

    fn find_mappings(&self, contig: &str, start: u64, end: u64) -> Option<Vec<Segment>> {
        (**self).find_mappings(contig, start, end)
    }
}

/// Compute the intersection of two half-open intervals
///
/// # Examples
/// ```
/// use fast_junclift::core::intersect_intervals;
/// assert_eq!(intersect_intervals(0, 100, 50, 150), Some((50, 100)));
/// assert_eq!(intersect_intervals(0, 50, 50, 100), None);
/// ```
#[inline]
pub fn intersect_intervals(start1: u64, end1: u64, start2: u64, end2: u64) -> Option<(u64, u64)> {
    if start1 >= end2 || end1 <= start2 {
        return None;
    }
    Some((start1.max(start2), end1.min(end2)))
}

/// Project a sub-interval of a source block onto the block's target
///
/// `left_offset` is the distance from the source block start. On a minus
/// strand block the offset is counted back from the target end.
#[inline]
pub fn project_onto_target(
    target_start: u64,
    target_end: u64,
    strand: Strand,
    left_offset: u64,
    size: u64,
) -> (u64, u64) {
    let start = match strand {
        Strand::Plus => target_start + left_offset,
        Strand::Minus => target_end - left_offset - size,
    };
    (start, start + size)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ploidy_suffixes() {
        assert_eq!(Ploidy::Haploid.suffixes(), &[""]);
        assert_eq!(Ploidy::Diploid.suffixes(), &["_L", "_R"]);
    }

    #[test]
    fn test_strand_display() {
        assert_eq!(format!("{}", Strand::Plus), "+");
        assert_eq!(format!("{}", Strand::Minus), "-");
    }

    #[test]
    fn test_intersect_intervals() {
        assert_eq!(intersect_intervals(50, 150, 0, 100), Some((50, 100)));
        assert_eq!(intersect_intervals(0, 100, 25, 75), Some((25, 75)));
        assert_eq!(intersect_intervals(0, 100, 0, 100), Some((0, 100)));
        assert_eq!(intersect_intervals(0, 50, 100, 150), None);
        assert_eq!(intersect_intervals(0, 50, 50, 100), None);
    }

    #[test]
    fn test_project_plus_strand() {
        assert_eq!(project_onto_target(1000, 1100, Strand::Plus, 10, 20), (1010, 1030));
    }

    #[test]
    fn test_project_minus_strand() {
        // Start of the source block lines up with the end of the target block
        assert_eq!(project_onto_target(1000, 1100, Strand::Minus, 0, 10), (1090, 1100));
        assert_eq!(project_onto_target(1000, 1100, Strand::Minus, 90, 10), (1000, 1010));
    }
}
