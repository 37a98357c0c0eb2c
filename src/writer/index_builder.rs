use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};
use crate::analysis::analyzer::Analyzer;
use crate::core::config::Config;
use crate::core::error::Result;
use crate::index::inverted::InvertedIndex;
use crate::storage::walker::{read_lines, SourceWalker};
use crate::writer::json;

/// Something that fills an index from text documents on disk
pub trait IndexBuilding {
    /// Indexes every text document at `path` (a directory, searched
    /// recursively, or a single file) and returns how many were indexed.
    fn build(&mut self, path: &Path) -> Result<usize>;

    fn write_index(&self, out: &Path) -> Result<()>;

    fn write_counts(&self, out: &Path) -> Result<()>;
}

/// Adds every stem of `file` to `index` under the file's path.
///
/// Positions run across lines, so the n-th word of the document is at
/// position n no matter which line it is on.
pub fn index_file(file: &Path, analyzer: &Analyzer, index: &mut InvertedIndex) -> Result<()> {
    let location = file.to_string_lossy();
    let mut offset = 0;

    read_lines(file, |line| {
        let tokens = analyzer.analyze(line);
        for token in &tokens {
            index.add(&token.text, &location, offset + token.position);
        }
        offset += tokens.len();
        Ok(())
    })?;

    debug!(location = %location, words = offset, "indexed document");
    Ok(())
}

/// Single-threaded builder writing straight into its own index
pub struct IndexBuilder {
    pub index: InvertedIndex,
    pub analyzer: Arc<Analyzer>,
    pub walker: SourceWalker,
}

impl IndexBuilder {
    pub fn new(analyzer: Arc<Analyzer>, walker: SourceWalker) -> Self {
        IndexBuilder {
            index: InvertedIndex::new(),
            analyzer,
            walker,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let analyzer = Analyzer::standard(config.stemmer)?;
        Ok(Self::new(Arc::new(analyzer), SourceWalker::new(&config.extensions)))
    }

    pub fn index(&self) -> &InvertedIndex {
        &self.index
    }

    pub fn into_index(self) -> InvertedIndex {
        self.index
    }
}

impl IndexBuilding for IndexBuilder {
    fn build(&mut self, path: &Path) -> Result<usize> {
        let analyzer = &self.analyzer;
        let index = &mut self.index;
        // A document that fails partway leaves nothing behind
        let documents = self.walker.for_each_document(path, |file| {
            let mut local = InvertedIndex::new();
            index_file(file, analyzer, &mut local)?;
            index.merge(local);
            Ok(())
        })?;

        info!(documents, words = self.index.num_words(), "index built");
        Ok(documents)
    }

    fn write_index(&self, out: &Path) -> Result<()> {
        json::write_index_to_path(&self.index, out)
    }

    fn write_counts(&self, out: &Path) -> Result<()> {
        json::write_counts_to_path(self.index.counts(), out)
    }
}
