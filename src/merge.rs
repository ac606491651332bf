//! Positional reduce: merge every partial entry for one term.

use crate::index::{ArticleIndexMap, WordIndex};

/// Merges the grouped `WordIndex` values of a term into one
/// [`ArticleIndexMap`].
///
/// Values are taken by ownership. A grouping primitive that hands out
/// borrowed values backed by a reused decode buffer must clone each one
/// before it reaches [`IndexMerger::merge`]; aliasing such a buffer would
/// make every entry equal to the last value decoded.
#[derive(Debug, Default, Clone, Copy)]
pub struct IndexMerger;

impl IndexMerger {
    pub fn new() -> Self {
        Self
    }

    /// Single pass over the group. The result has one entry per article and
    /// does not depend on the order values arrive in; a partial delivered
    /// twice by a retried map task is absorbed.
    pub fn merge<I>(&self, values: I) -> ArticleIndexMap
    where
        I: IntoIterator<Item = WordIndex>,
    {
        let mut map = ArticleIndexMap::new();
        for index in values {
            map.insert(index);
        }
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word_index(article_id: &str, positions: &[u32]) -> WordIndex {
        WordIndex {
            article_id: article_id.to_string(),
            positions: positions.to_vec(),
        }
    }

    #[test]
    fn test_merge_one_entry_per_document() {
        let merged = IndexMerger::new().merge(vec![
            word_index("1", &[0, 3]),
            word_index("2", &[0]),
            word_index("3", &[7]),
        ]);
        assert_eq!(merged.len(), 3);
        assert_eq!(merged.get("1"), Some(&word_index("1", &[0, 3])));
        assert_eq!(merged.get("2"), Some(&word_index("2", &[0])));
    }

    #[test]
    fn test_merge_absorbs_retried_emissions() {
        let once = IndexMerger::new().merge(vec![word_index("1", &[4]), word_index("2", &[1])]);
        let twice = IndexMerger::new().merge(vec![
            word_index("2", &[1]),
            word_index("1", &[4]),
            word_index("1", &[4]),
            word_index("2", &[1]),
        ]);
        assert_eq!(once, twice);
        assert_eq!(once.to_bytes().unwrap(), twice.to_bytes().unwrap());
    }

    #[test]
    fn test_merge_is_idempotent() {
        let group = vec![word_index("b", &[2, 9]), word_index("a", &[1]), word_index("b", &[5])];
        let first = IndexMerger::new().merge(group.clone()).to_bytes().unwrap();
        let second = IndexMerger::new().merge(group).to_bytes().unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_case_variants_contribute_independently() {
        let merged = IndexMerger::new().merge(vec![word_index("1", &[0]), word_index("1", &[2, 6])]);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged.get("1").unwrap().positions, vec![0, 2, 6]);
    }
}
