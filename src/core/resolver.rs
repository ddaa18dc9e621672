//! Haplotype contig name resolution
//!
//! A diploid personal genome names its contigs after the reference contig
//! plus a haplotype suffix (`chr1_L`, `chr1_R`). When converting back to the
//! reference, each such name must be traced to the single index contig it
//! extends.

use crate::core::error::{ConversionError, ConversionResult};
use log::debug;
use std::collections::HashMap;

/// Resolves haplotype-suffixed contig names, caching every answer for the run
#[derive(Debug, Default)]
pub struct ContigResolver {
    cache: HashMap<String, String>,
}

impl ContigResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Find the one contig in `contigs` that is a prefix of `chrom`
    ///
    /// Zero or several candidates is an [`ConversionError::AmbiguousContig`].
    pub fn resolve<'c, I>(&mut self, chrom: &str, contigs: I) -> ConversionResult<&str>
    where
        I: IntoIterator<Item = &'c String>,
    {
        if !self.cache.contains_key(chrom) {
            let mut candidates: Vec<String> = contigs
                .into_iter()
                .filter(|contig| chrom.starts_with(contig.as_str()))
                .cloned()
                .collect();

            if candidates.len() != 1 {
                candidates.sort();
                return Err(ConversionError::AmbiguousContig {
                    chrom: chrom.to_string(),
                    candidates,
                });
            }

            let resolved = candidates.remove(0);
            debug!("Resolved contig {} -> {}", chrom, resolved);
            self.cache.insert(chrom.to_string(), resolved);
        }

        Ok(self.cache[chrom].as_str())
    }

    /// Number of distinct names resolved so far
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}
