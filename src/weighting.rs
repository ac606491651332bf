//! Weighting reduce: TF x IDF per article for one term.
//!
//! `weight = tf * ln(n / df)` where `tf` is the occurrence count of the term
//! in the article, `df` the number of distinct articles containing it and `n`
//! the corpus size.

use crate::error::{Error, Result};
use crate::index::{WeightedEntry, WeightedIndex, WordCount};
use crate::stats::Stats;
use std::collections::{BTreeMap, BTreeSet};
use std::num::NonZeroU64;

/// Number of documents in the corpus.
///
/// Only constructible from a positive count, and by the harness only after
/// the map stage has finished and its page tallies have been merged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CorpusSize(NonZeroU64);

impl CorpusSize {
    pub fn new(n: u64) -> Result<Self> {
        NonZeroU64::new(n)
            .map(Self)
            .ok_or(Error::CorpusCountUnavailable)
    }

    /// Corpus size from the finalized page count of a completed map stage
    pub fn from_stats(stats: &Stats) -> Result<Self> {
        Self::new(stats.pages)
    }

    pub fn get(&self) -> u64 {
        self.0.get()
    }
}

pub struct WeightingAggregator {
    corpus_size: CorpusSize,
}

impl WeightingAggregator {
    pub fn new(corpus_size: CorpusSize) -> Self {
        Self { corpus_size }
    }

    pub fn corpus_size(&self) -> CorpusSize {
        self.corpus_size
    }

    /// Weight every article in a term's group.
    ///
    /// Counts for distinct surface forms of the term add up; a value repeated
    /// for the same (article, surface) pair is a re-delivery and counts once.
    pub fn aggregate<I>(&self, term: &str, values: I) -> Result<WeightedIndex>
    where
        I: IntoIterator<Item = WordCount>,
    {
        let mut seen: BTreeSet<(String, String)> = BTreeSet::new();
        let mut term_frequency: BTreeMap<String, u64> = BTreeMap::new();

        for value in values {
            let tf = term_frequency.entry(value.article_id.clone()).or_insert(0);
            if seen.insert((value.article_id, value.surface)) {
                *tf += u64::from(value.count);
            }
        }

        let n = self.corpus_size.get();
        let df = term_frequency.len() as u64;
        if df > n {
            return Err(Error::DocumentFrequencyExceedsCorpus {
                term: term.to_string(),
                df,
                n,
            });
        }

        let idf = if df == 0 { 0.0 } else { (n as f64 / df as f64).ln() };
        let entries = term_frequency
            .into_iter()
            .map(|(article_id, tf)| WeightedEntry {
                article_id,
                weight: tf as f64 * idf,
            })
            .collect();

        Ok(WeightedIndex { entries })
    }
}
