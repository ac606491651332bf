use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Offsets of one word inside one article, in scan order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordIndex {
    pub article_id: String,
    pub positions: Vec<u32>,
}

impl WordIndex {
    pub fn new(article_id: String) -> Self {
        Self {
            article_id,
            positions: Vec::new(),
        }
    }

    pub fn add_position(&mut self, position: u32) {
        self.positions.push(position);
    }

    pub fn occurrences(&self) -> u32 {
        self.positions.len() as u32
    }
}

/// Occurrence count of one surface form inside one article.
///
/// The surface form (original case) tells distinct case variants apart from
/// a value that was simply emitted twice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordCount {
    pub article_id: String,
    pub surface: String,
    pub count: u32,
}

/// Per-term index: article id -> positions, one entry per article.
///
/// Backed by a `BTreeMap` so serialization order is the byte order of the
/// article ids.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleIndexMap {
    entries: BTreeMap<String, WordIndex>,
}

impl ArticleIndexMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold a partial entry in. Positions for an article already present are
    /// unioned, so the same partial inserted twice leaves the map unchanged.
    pub fn insert(&mut self, index: WordIndex) {
        match self.entries.get_mut(&index.article_id) {
            Some(existing) => {
                existing.positions.extend(index.positions);
                existing.positions.sort_unstable();
                existing.positions.dedup();
            }
            None => {
                let mut index = index;
                index.positions.sort_unstable();
                index.positions.dedup();
                self.entries.insert(index.article_id.clone(), index);
            }
        }
    }

    pub fn get(&self, article_id: &str) -> Option<&WordIndex> {
        self.entries.get(article_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &WordIndex> {
        self.entries.values()
    }

    /// Every (article, offset) pair in the map
    pub fn flatten(&self) -> Vec<(&str, u32)> {
        self.iter()
            .flat_map(|index| {
                index
                    .positions
                    .iter()
                    .map(move |&position| (index.article_id.as_str(), position))
            })
            .collect()
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(bincode::serialize(self)?)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Ok(bincode::deserialize(bytes)?)
    }
}

/// TF-IDF weight of a term in one article
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightedEntry {
    pub article_id: String,
    pub weight: f64,
}

/// Per-term weighted postings, ordered by article id
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeightedIndex {
    pub entries: Vec<WeightedEntry>,
}

impl WeightedIndex {
    pub fn get(&self, article_id: &str) -> Option<f64> {
        self.entries
            .binary_search_by(|entry| entry.article_id.as_str().cmp(article_id))
            .ok()
            .map(|i| self.entries[i].weight)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(bincode::serialize(self)?)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Ok(bincode::deserialize(bytes)?)
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
    fn test_insert_keeps_one_entry_per_article() {
        let mut map = ArticleIndexMap::new();
        map.insert(word_index("1", &[0, 3]));
        map.insert(word_index("1", &[0, 3]));
        map.insert(word_index("2", &[0]));

        assert_eq!(map.len(), 2);
        assert_eq!(map.get("1"), Some(&word_index("1", &[0, 3])));
    }

    #[test]
    fn test_case_variants_are_unioned() {
        let mut map = ArticleIndexMap::new();
        map.insert(word_index("1", &[5]));
        map.insert(word_index("1", &[0, 3]));

        assert_eq!(map.get("1").unwrap().positions, vec![0, 3, 5]);
        assert_eq!(map.flatten(), vec![("1", 0), ("1", 3), ("1", 5)]);
    }

    #[test]
    fn test_serialization_order_is_stable() {
        let mut a = ArticleIndexMap::new();
        a.insert(word_index("b", &[1]));
        a.insert(word_index("a", &[2]));

        let mut b = ArticleIndexMap::new();
        b.insert(word_index("a", &[2]));
        b.insert(word_index("b", &[1]));

        let bytes = a.to_bytes().unwrap();
        assert_eq!(bytes, b.to_bytes().unwrap());
        assert_eq!(ArticleIndexMap::from_bytes(&bytes).unwrap(), a);
    }

    #[test]
    fn test_weighted_lookup() {
        let index = WeightedIndex {
            entries: vec![
                WeightedEntry { article_id: "1".to_string(), weight: 0.5 },
                WeightedEntry { article_id: "2".to_string(), weight: 0.0 },
            ],
        };
        assert_eq!(index.get("1"), Some(0.5));
        assert_eq!(index.get("3"), None);
    }
}
