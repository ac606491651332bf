use crate::error::{Error, Result};
use crate::index::{ArticleIndexMap, WeightedIndex};
use sled::Db;
use std::path::Path;

/// Column family holding index rows
pub const CONTENT_FAMILY: &str = "content";
/// Column holding the serialized per-term index
pub const INDEX_COLUMN: &str = "index";

/// Keyed store the reduce stage writes to.
///
/// Each `put` is one atomic cell write; a failure affects only that cell.
pub trait IndexSink: Sync {
    fn put(&self, key: &[u8], family: &str, column: &str, value: &[u8]) -> Result<()>;

    fn flush(&self) -> Result<()>;
}

/// Sink backed by sled: one tree per column family, cells keyed by
/// `row \0 column`.
pub struct SledSink {
    db: Db,
}

impl SledSink {
    /// Open or create a store on disk
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let db = sled::open(path)?;
        Ok(Self { db })
    }

    /// Create an in-memory store (for testing)
    pub fn temporary() -> Result<Self> {
        let db = sled::Config::new().temporary(true).open()?;
        Ok(Self { db })
    }

    /// Read one cell back
    pub fn get(&self, key: &[u8], family: &str, column: &str) -> Result<Option<Vec<u8>>> {
        let tree = self.db.open_tree(family)?;
        Ok(tree.get(cell_key(key, column))?.map(|value| value.to_vec()))
    }

    /// Drop every row of a family so a re-run replaces earlier output
    pub fn clear_family(&self, family: &str) -> Result<()> {
        self.db.drop_tree(family)?;
        Ok(())
    }

    /// Number of cells stored in a family
    pub fn len(&self, family: &str) -> Result<usize> {
        Ok(self.db.open_tree(family)?.len())
    }

    /// Positional index row for a term
    pub fn load_index(&self, term: &str) -> Result<Option<ArticleIndexMap>> {
        self.get(term.as_bytes(), CONTENT_FAMILY, INDEX_COLUMN)?
            .map(|bytes| ArticleIndexMap::from_bytes(&bytes))
            .transpose()
    }

    /// Weighted index row for a term
    pub fn load_weights(&self, term: &str) -> Result<Option<WeightedIndex>> {
        self.get(term.as_bytes(), CONTENT_FAMILY, INDEX_COLUMN)?
            .map(|bytes| WeightedIndex::from_bytes(&bytes))
            .transpose()
    }
}

impl IndexSink for SledSink {
    fn put(&self, key: &[u8], family: &str, column: &str, value: &[u8]) -> Result<()> {
        let write = || -> std::result::Result<(), sled::Error> {
            let tree = self.db.open_tree(family)?;
            tree.insert(cell_key(key, column), value)?;
            Ok(())
        };
        write().map_err(|source| Error::SinkWrite {
            term: String::from_utf8_lossy(key).into_owned(),
            source,
        })
    }

    fn flush(&self) -> Result<()> {
        self.db.flush()?;
        Ok(())
    }
}

fn cell_key(row: &[u8], column: &str) -> Vec<u8> {
    let mut key = Vec::with_capacity(row.len() + 1 + column.len());
    key.extend_from_slice(row);
    key.push(0);
    key.extend_from_slice(column.as_bytes());
    key
}
