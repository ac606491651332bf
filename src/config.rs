use crate::error::Result;
use crate::input::{DEFAULT_END_TAG, DEFAULT_START_TAG};
use crate::tokenizer::MAX_TOKEN_LENGTH;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Settings shared by the positional and weighting jobs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JobConfig {
    /// Tag opening each record in the dump
    pub start_tag: String,
    /// Tag closing each record
    pub end_tag: String,
    /// Longest token, in characters, admitted to the index
    pub max_token_length: usize,
    /// Worker threads; 0 lets rayon decide
    pub threads: usize,
    /// Records handed to the map workers at a time
    pub batch_size: usize,
    /// Corpus size for weighting instead of the counted pages
    pub corpus_size: Option<u64>,
}

impl Default for JobConfig {
    fn default() -> Self {
        Self {
            start_tag: DEFAULT_START_TAG.to_string(),
            end_tag: DEFAULT_END_TAG.to_string(),
            max_token_length: MAX_TOKEN_LENGTH,
            threads: 0,
            batch_size: 1024,
            corpus_size: None,
        }
    }
}

impl JobConfig {
    /// Load from a JSON file. Missing keys keep their defaults.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }
}
