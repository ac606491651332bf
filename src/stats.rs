//! Corpus-wide diagnostic counters.
//!
//! Every worker folds its own `Stats` and the harness combines them with
//! [`Stats::merge`] once a stage is over. Nothing here feeds back into index
//! contents; the page count is only read to derive the corpus size after the
//! map stage has finished.

use serde::Serialize;
use std::fmt;

/// A word together with the measure that made it a maximum
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Extremum {
    pub word: String,
    pub measure: u64,
}

impl Extremum {
    pub fn new(word: impl Into<String>, measure: u64) -> Self {
        Self {
            word: word.into(),
            measure,
        }
    }

    /// The larger of two candidates. Equal measures resolve to the smaller
    /// word so the result does not depend on merge order.
    fn max(a: Option<Self>, b: Option<Self>) -> Option<Self> {
        match (a, b) {
            (Some(a), Some(b)) => {
                if (b.measure, std::cmp::Reverse(&b.word)) > (a.measure, std::cmp::Reverse(&a.word)) {
                    Some(b)
                } else {
                    Some(a)
                }
            }
            (a, None) => a,
            (None, b) => b,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Stats {
    /// Pages that produced a document
    pub pages: u64,
    /// Records skipped because they had no article id
    pub skipped: u64,
    /// Accepted tokens over all pages
    pub words: u64,
    /// Distinct terms written to the sink
    pub terms: u64,
    /// Longest raw token, including ones too long to index
    pub longest_token: Option<Extremum>,
    /// Term found in the most articles
    pub most_frequent_term: Option<Extremum>,
}

impl Stats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_page(&mut self, words: u64, longest_token: Option<(&str, usize)>) {
        self.pages += 1;
        self.words += words;
        let candidate = longest_token.map(|(token, len)| Extremum::new(token, len as u64));
        self.longest_token = Extremum::max(self.longest_token.take(), candidate);
    }

    pub fn record_skipped(&mut self) {
        self.skipped += 1;
    }

    pub fn record_term(&mut self, term: &str, document_frequency: u64) {
        self.terms += 1;
        let candidate = Some(Extremum::new(term, document_frequency));
        self.most_frequent_term = Extremum::max(self.most_frequent_term.take(), candidate);
    }

    /// Combine two partial tallies
    pub fn merge(self, other: Stats) -> Stats {
        Stats {
            pages: self.pages + other.pages,
            skipped: self.skipped + other.skipped,
            words: self.words + other.words,
            terms: self.terms + other.terms,
            longest_token: Extremum::max(self.longest_token, other.longest_token),
            most_frequent_term: Extremum::max(self.most_frequent_term, other.most_frequent_term),
        }
    }
}

impl fmt::Display for Stats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Total pages: {}", self.pages)?;
        writeln!(f, "Skipped records: {}", self.skipped)?;
        writeln!(f, "Total words: {}", self.words)?;
        writeln!(f, "Distinct terms: {}", self.terms)?;
        match &self.most_frequent_term {
            Some(max) => writeln!(f, "Max word occurrence pages: {} => {}", max.measure, max.word)?,
            None => writeln!(f, "Max word occurrence pages: 0")?,
        }
        match &self.longest_token {
            Some(max) => write!(f, "Max word length: {} => {}", max.measure, max.word),
            None => write!(f, "Max word length: 0"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_is_order_independent() {
        let mut a = Stats::new();
        a.record_page(3, Some(("abc", 3)));
        a.record_term("cat", 2);

        let mut b = Stats::new();
        b.record_page(5, Some(("xyz", 3)));
        b.record_skipped();
        b.record_term("dog", 2);

        let ab = a.clone().merge(b.clone());
        let ba = b.merge(a);
        assert_eq!(ab, ba);
        assert_eq!(ab.pages, 2);
        assert_eq!(ab.words, 8);
        assert_eq!(ab.skipped, 1);
        assert_eq!(ab.terms, 2);
        assert_eq!(ab.longest_token, Some(Extremum::new("abc", 3)));
        assert_eq!(ab.most_frequent_term, Some(Extremum::new("cat", 2)));
    }

    #[test]
    fn test_larger_measure_wins() {
        let mut stats = Stats::new();
        stats.record_term("rare", 1);
        stats.record_term("the", 40);
        stats.record_term("cat", 3);
        assert_eq!(stats.most_frequent_term, Some(Extremum::new("the", 40)));
    }

    #[test]
    fn test_page_without_tokens() {
        let mut stats = Stats::new();
        stats.record_page(0, None);
        assert_eq!(stats.pages, 1);
        assert!(stats.longest_token.is_none());
    }
}
