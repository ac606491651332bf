// Re-export main components
pub mod builder;
pub mod config;
pub mod document;
pub mod engine;
pub mod error;
pub mod index;
pub mod input;
pub mod markup;
pub mod merge;
pub mod stats;
pub mod storage;
pub mod tokenizer;
pub mod weighting;

// Re-export commonly used types
pub use builder::{DocumentIndex, IndexBuilder};
pub use config::JobConfig;
pub use document::Document;
pub use engine::{IndexJob, Reducer};
pub use index::{ArticleIndexMap, WeightedEntry, WeightedIndex, WordCount, WordIndex};
pub use input::RecordReader;
pub use markup::{MarkupRenderer, MarkupStripper};
pub use merge::IndexMerger;
pub use stats::Stats;
pub use storage::{IndexSink, SledSink};
pub use tokenizer::Tokenizer;
pub use weighting::{CorpusSize, WeightingAggregator};

// Re-export error types
pub use error::{Error, Result};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_workflow() -> Result<()> {
        let job = IndexJob::new(SledSink::temporary()?, &JobConfig::default())?;

        let record = "<page><title>Rust</title><id>1</id>\
            <text xml:space=\"preserve\">Rust is a '''systems''' language</text></page>";
        let stats = job.run_positional(vec![Ok(record.to_string())])?;

        assert_eq!(stats.pages, 1);
        let rust = job.sink().load_index("rust")?.unwrap();
        assert_eq!(rust.get("1").unwrap().positions, vec![0, 1]);

        Ok(())
    }
}
