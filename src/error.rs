//! Error types for the indexing jobs.

use thiserror::Error;

/// Top-level error type for wikidex operations.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O errors while reading the dump.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The sled store could not be opened or read.
    #[error("storage error: {0}")]
    Storage(#[from] sled::Error),

    /// The worker pool could not be started.
    #[error("thread pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    /// A sink value could not be encoded or decoded.
    #[error("codec error: {0}")]
    Codec(#[from] bincode::Error),

    /// The job configuration file is not valid JSON.
    #[error("config error: {0}")]
    Config(#[from] serde_json::Error),

    /// Writing the row for one term failed. Other rows are unaffected.
    #[error("sink write failed for term {term:?}: {source}")]
    SinkWrite {
        term: String,
        #[source]
        source: sled::Error,
    },

    /// Weighting was requested before a positive page count was known.
    #[error("corpus size is unavailable: the page count was not finalized or is zero")]
    CorpusCountUnavailable,

    /// A term was seen in more documents than the corpus holds.
    #[error("term {term:?} has document frequency {df} but the corpus size is {n}")]
    DocumentFrequencyExceedsCorpus { term: String, df: u64, n: u64 },
}

/// Result type for wikidex operations.
pub type Result<T> = std::result::Result<T, Error>;
