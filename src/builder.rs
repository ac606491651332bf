//! Map stage: one document in, per-term partial entries out.

use crate::document::Document;
use crate::index::{WordCount, WordIndex};
use crate::markup::MarkupStripper;
use crate::stats::Stats;
use crate::tokenizer::Tokenizer;
use std::collections::BTreeMap;

/// Everything the map stage learned about one document.
///
/// Entries are keyed by surface form (original case). Both reduce paths are
/// projections of this one scan.
#[derive(Debug, Clone)]
pub struct DocumentIndex {
    pub article_id: String,
    pub by_surface: BTreeMap<String, WordIndex>,
    pub stats: Stats,
}

impl DocumentIndex {
    /// (term, positions) pairs for the positional index. Case variants of a
    /// term are separate values under the same key.
    pub fn into_positional(self) -> Vec<(String, WordIndex)> {
        self.by_surface
            .into_iter()
            .map(|(surface, index)| (surface.to_lowercase(), index))
            .collect()
    }

    /// (term, occurrence count) pairs for the weighting index
    pub fn into_counts(self) -> Vec<(String, WordCount)> {
        self.by_surface
            .into_iter()
            .map(|(surface, index)| {
                let term = surface.to_lowercase();
                let count = WordCount {
                    count: index.occurrences(),
                    article_id: index.article_id,
                    surface,
                };
                (term, count)
            })
            .collect()
    }
}

/// Positional index builder.
///
/// Holds no per-document state: every call allocates its own working map, so
/// one builder can be shared by all map workers.
pub struct IndexBuilder {
    stripper: MarkupStripper,
    tokenizer: Tokenizer,
}

impl IndexBuilder {
    pub fn new(stripper: MarkupStripper, tokenizer: Tokenizer) -> Self {
        Self {
            stripper,
            tokenizer,
        }
    }

    pub fn tokenizer(&self) -> &Tokenizer {
        &self.tokenizer
    }

    /// Plain text the tokenizer sees for a document
    pub fn plain_text(&self, doc: &Document) -> String {
        self.stripper.strip(&doc.indexable_text())
    }

    pub fn build(&self, doc: &Document) -> DocumentIndex {
        let text = self.plain_text(doc);
        let tokens = self.tokenizer.tokenize(&text);

        let mut by_surface: BTreeMap<String, WordIndex> = BTreeMap::new();
        for token in &tokens {
            by_surface
                .entry(token.surface.to_string())
                .or_insert_with(|| WordIndex::new(doc.id.clone()))
                .add_position(token.position);
        }

        let mut stats = Stats::new();
        stats.record_page(tokens.len() as u64, self.tokenizer.longest_token(&text));

        DocumentIndex {
            article_id: doc.id.clone(),
            by_surface,
            stats,
        }
    }
}

impl Default for IndexBuilder {
    fn default() -> Self {
        Self::new(MarkupStripper::new(), Tokenizer::new())
    }
}
