use crate::builder::{DocumentIndex, IndexBuilder};
use crate::config::JobConfig;
use crate::document::Document;
use crate::error::Result;
use crate::index::{WordCount, WordIndex};
use crate::markup::MarkupStripper;
use crate::merge::IndexMerger;
use crate::stats::Stats;
use crate::storage::{IndexSink, CONTENT_FAMILY, INDEX_COLUMN};
use crate::tokenizer::Tokenizer;
use crate::weighting::{CorpusSize, WeightingAggregator};
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::io;
use std::time::Instant;

/// Result of reducing one term's group
#[derive(Debug, Clone)]
pub struct Reduced {
    pub value: Vec<u8>,
    pub document_frequency: u64,
}

/// Binds a pure reduce function to the harness
pub trait Reducer: Sync {
    type Value: Send;

    fn reduce(&self, term: &str, values: Vec<Self::Value>) -> Result<Reduced>;
}

impl Reducer for IndexMerger {
    type Value = WordIndex;

    fn reduce(&self, _term: &str, values: Vec<WordIndex>) -> Result<Reduced> {
        let map = self.merge(values);
        Ok(Reduced {
            document_frequency: map.len() as u64,
            value: map.to_bytes()?,
        })
    }
}

impl Reducer for WeightingAggregator {
    type Value = WordCount;

    fn reduce(&self, term: &str, values: Vec<WordCount>) -> Result<Reduced> {
        let weighted = self.aggregate(term, values)?;
        Ok(Reduced {
            document_frequency: weighted.len() as u64,
            value: weighted.to_bytes()?,
        })
    }
}

/// Map stage output: each key with its complete value group
pub struct MapOutput<V> {
    pub groups: BTreeMap<String, Vec<V>>,
    pub stats: Stats,
}

/// One worker's share of a map batch
struct Partial<V> {
    pairs: Vec<(String, V)>,
    stats: Stats,
}

impl<V> Default for Partial<V> {
    fn default() -> Self {
        Self {
            pairs: Vec::new(),
            stats: Stats::new(),
        }
    }
}

impl<V> Partial<V> {
    fn merge(mut self, other: Partial<V>) -> Self {
        self.pairs.extend(other.pairs);
        self.stats = self.stats.merge(other.stats);
        self
    }
}

/// Local batch harness.
///
/// Map workers run over batches of records in parallel, each with its own
/// tallies. Grouping by term is the only barrier: a reduce call starts only
/// after every map batch has been folded in, so it sees the whole group.
pub struct IndexJob<S> {
    sink: S,
    builder: IndexBuilder,
    pool: rayon::ThreadPool,
    batch_size: usize,
    corpus_size: Option<u64>,
}

impl<S: IndexSink> IndexJob<S> {
    pub fn new(sink: S, config: &JobConfig) -> Result<Self> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.threads)
            .build()?;
        let builder = IndexBuilder::new(
            MarkupStripper::new(),
            Tokenizer::with_max_token_length(config.max_token_length),
        );

        Ok(Self {
            sink,
            builder,
            pool,
            batch_size: config.batch_size.max(1),
            corpus_size: config.corpus_size,
        })
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Build the positional index and write one row per term
    pub fn run_positional<I>(&self, records: I) -> Result<Stats>
    where
        I: IntoIterator<Item = io::Result<String>>,
    {
        let mapped = self.map_stage(records, DocumentIndex::into_positional)?;
        let reduced = self.reduce_stage(&IndexMerger::new(), mapped.groups)?;
        Ok(mapped.stats.merge(reduced))
    }

    /// Build the TF-IDF index and write one row per term
    pub fn run_weighting<I>(&self, records: I) -> Result<Stats>
    where
        I: IntoIterator<Item = io::Result<String>>,
    {
        let mapped = self.map_stage(records, DocumentIndex::into_counts)?;

        // Every map batch has been merged, so the page count is final here.
        let corpus_size = match self.corpus_size {
            Some(n) => CorpusSize::new(n)?,
            None => CorpusSize::from_stats(&mapped.stats)?,
        };
        tracing::info!(corpus_size = corpus_size.get(), "corpus size fixed");

        let aggregator = WeightingAggregator::new(corpus_size);
        let reduced = self.reduce_stage(&aggregator, mapped.groups)?;
        Ok(mapped.stats.merge(reduced))
    }

    /// Parse, clean and tokenize every record, then group the emitted pairs
    /// by term.
    pub fn map_stage<I, V, F>(&self, records: I, project: F) -> Result<MapOutput<V>>
    where
        I: IntoIterator<Item = io::Result<String>>,
        V: Send,
        F: Fn(DocumentIndex) -> Vec<(String, V)> + Sync,
    {
        let start = Instant::now();
        let mut groups: BTreeMap<String, Vec<V>> = BTreeMap::new();
        let mut stats = Stats::new();
        let mut records = records.into_iter();
        let mut batch = Vec::with_capacity(self.batch_size);

        loop {
            batch.clear();
            for record in records.by_ref().take(self.batch_size) {
                batch.push(record?);
            }
            if batch.is_empty() {
                break;
            }

            let partial = self.map_batch(&batch, &project);
            stats = stats.merge(partial.stats);
            for (term, value) in partial.pairs {
                groups.entry(term).or_default().push(value);
            }
            tracing::debug!(pages = stats.pages, terms = groups.len(), "map batch done");
        }

        tracing::info!(
            pages = stats.pages,
            skipped = stats.skipped,
            terms = groups.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "map stage finished"
        );
        Ok(MapOutput { groups, stats })
    }

    fn map_batch<V, F>(&self, batch: &[String], project: &F) -> Partial<V>
    where
        V: Send,
        F: Fn(DocumentIndex) -> Vec<(String, V)> + Sync,
    {
        self.pool.install(|| {
            batch
                .par_iter()
                .fold(Partial::default, |mut partial, record| {
                    match Document::parse(record) {
                        Some(doc) => {
                            let mut index = self.builder.build(&doc);
                            let doc_stats = std::mem::take(&mut index.stats);
                            partial.stats = partial.stats.merge(doc_stats);
                            partial.pairs.extend(project(index));
                        }
                        None => {
                            tracing::warn!(bytes = record.len(), "skipping record without an article id");
                            partial.stats.record_skipped();
                        }
                    }
                    partial
                })
                .reduce(Partial::default, Partial::merge)
        })
    }

    /// Reduce every group in parallel and write its row. A failed write
    /// aborts the stage with the term that failed.
    pub fn reduce_stage<R: Reducer>(&self, reducer: &R, groups: BTreeMap<String, Vec<R::Value>>) -> Result<Stats> {
        let start = Instant::now();
        let stats = self.pool.install(|| {
            groups
                .into_par_iter()
                .map(|(term, values)| -> Result<Stats> {
                    let reduced = reducer.reduce(&term, values)?;
                    self.sink
                        .put(term.as_bytes(), CONTENT_FAMILY, INDEX_COLUMN, &reduced.value)?;

                    let mut stats = Stats::new();
                    stats.record_term(&term, reduced.document_frequency);
                    Ok(stats)
                })
                .try_reduce(Stats::new, |a, b| Ok(a.merge(b)))
        })?;
        self.sink.flush()?;

        tracing::info!(
            terms = stats.terms,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "reduce stage finished"
        );
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::storage::SledSink;

    fn page(id: &str, text: &str) -> io::Result<String> {
        Ok(format!(
            "<page><title></title><id>{}</id><revision><text xml:space=\"preserve\">{}</text></revision></page>",
            id, text
        ))
    }

    #[test]
    fn test_map_stage_groups_by_term() -> Result<()> {
        let job = IndexJob::new(SledSink::temporary()?, &JobConfig::default())?;
        let records = vec![page("1", "The Cat sat."), page("2", "the dog"), Ok("<page>no id</page>".to_string())];
        let mapped = job.map_stage(records, DocumentIndex::into_positional)?;

        assert_eq!(mapped.stats.pages, 2);
        assert_eq!(mapped.stats.skipped, 1);
        assert_eq!(mapped.groups["the"].len(), 2);
        assert_eq!(mapped.groups["cat"].len(), 1);
        Ok(())
    }

    #[test]
    fn test_small_batches_see_complete_groups() -> Result<()> {
        let config = JobConfig {
            batch_size: 1,
            threads: 2,
            ..JobConfig::default()
        };
        let job = IndexJob::new(SledSink::temporary()?, &config)?;
        let records = (1..=5).map(|i| page(&i.to_string(), "shared word"));
        let stats = job.run_positional(records)?;

        assert_eq!(stats.pages, 5);
        assert_eq!(stats.terms, 2);
        assert_eq!(job.sink().load_index("shared")?.unwrap().len(), 5);
        Ok(())
    }

    #[test]
    fn test_weighting_needs_pages() {
        let job = IndexJob::new(SledSink::temporary().unwrap(), &JobConfig::default()).unwrap();
        let result = job.run_weighting(Vec::<io::Result<String>>::new());
        assert!(matches!(result, Err(Error::CorpusCountUnavailable)));
    }

    #[test]
    fn test_read_error_aborts_map_stage() {
        let job = IndexJob::new(SledSink::temporary().unwrap(), &JobConfig::default()).unwrap();
        let records = vec![page("1", "a"), Err(io::Error::new(io::ErrorKind::Other, "boom"))];
        assert!(matches!(job.run_positional(records), Err(Error::Io(_))));
    }
}
