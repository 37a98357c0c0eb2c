use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::info;
use crate::analysis::analyzer::Analyzer;
use crate::core::config::Config;
use crate::core::error::{Error, Result};
use crate::index::concurrent::ConcurrentIndex;
use crate::index::inverted::InvertedIndex;
use crate::parallel::work_queue::WorkQueue;
use crate::storage::walker::SourceWalker;
use crate::writer::index_builder::{index_file, IndexBuilding};
use crate::writer::json;

/// Builds a shared index with one work-queue task per document.
///
/// Each task indexes its document into a private [`InvertedIndex`] and then
/// merges it into the shared one, so the write lock is taken once per
/// document instead of once per word.
pub struct ParallelIndexBuilder {
    pub index: Arc<ConcurrentIndex>,
    pub analyzer: Arc<Analyzer>,
    pub walker: SourceWalker,
    pub queue: Arc<WorkQueue>,
}

impl ParallelIndexBuilder {
    pub fn new(
        index: Arc<ConcurrentIndex>,
        analyzer: Arc<Analyzer>,
        walker: SourceWalker,
        queue: Arc<WorkQueue>,
    ) -> Self {
        ParallelIndexBuilder {
            index,
            analyzer,
            walker,
            queue,
        }
    }

    pub fn from_config(config: &Config, queue: Arc<WorkQueue>) -> Result<Self> {
        let analyzer = Analyzer::standard(config.stemmer)?;
        Ok(Self::new(
            Arc::new(ConcurrentIndex::new()),
            Arc::new(analyzer),
            SourceWalker::new(&config.extensions),
            queue,
        ))
    }

    /// Shared handle to the index being built
    pub fn index(&self) -> Arc<ConcurrentIndex> {
        self.index.clone()
    }

    fn submit(&self, file: &Path, indexed: &Arc<AtomicUsize>) -> Result<()> {
        let file = file.to_path_buf();
        let index = self.index.clone();
        let analyzer = self.analyzer.clone();
        let indexed = indexed.clone();

        self.queue.execute(move || {
            let mut local = InvertedIndex::new();
            index_file(&file, &analyzer, &mut local)
                .map_err(|err| Error::new(err.kind, format!("{}: {}", file.display(), err.context)))?;
            index.merge(local);
            indexed.fetch_add(1, Ordering::Relaxed);
            Ok(())
        })
    }
}

impl IndexBuilding for ParallelIndexBuilder {
    /// Returns once every submitted document has been merged. Documents
    /// that fail to read are logged by the work queue and not counted.
    fn build(&mut self, path: &Path) -> Result<usize> {
        let indexed = Arc::new(AtomicUsize::new(0));
        let submitted = self.walker.for_each_document(path, |file| self.submit(file, &indexed));
        // Anything already queued must land before returning, even on error
        self.queue.finish();
        let submitted = submitted?;

        let documents = indexed.load(Ordering::Relaxed);
        info!(documents, submitted, words = self.index.num_words(), "index built");
        Ok(documents)
    }

    fn write_index(&self, out: &Path) -> Result<()> {
        self.index.with_read(|index| json::write_index_to_path(index, out))
    }

    fn write_counts(&self, out: &Path) -> Result<()> {
        self.index.with_read(|index| json::write_counts_to_path(index.counts(), out))
    }
}
