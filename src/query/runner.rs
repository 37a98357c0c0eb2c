use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};
use crate::analysis::analyzer::Analyzer;
use crate::core::error::Result;
use crate::index::inverted::InvertedIndex;
use crate::query::key::QueryKey;
use crate::query::results::QueryResults;
use crate::storage::walker::SourceWalker;
use crate::writer::json;

/// Something that answers query lines against an index and keeps the
/// ranked results per canonical query
pub trait QueryProcessor {
    /// Answers one query line. Lines without any stems are ignored, and a
    /// query already answered is not searched again.
    fn process_line(&mut self, line: &str) -> Result<()>;

    /// Answers every line of every text file at `path`. Returns once all of
    /// them are in the results table.
    fn process_path(&mut self, path: &Path) -> Result<()>;

    /// Copy of the results table
    fn results(&self) -> QueryResults;

    fn write_results(&self, out: &Path) -> Result<()>;
}

/// Single-threaded query runner over a borrowed index
pub struct QueryRunner<'a> {
    index: &'a InvertedIndex,
    analyzer: Arc<Analyzer>,
    walker: SourceWalker,
    exact: bool,
    results: QueryResults,
}

impl<'a> QueryRunner<'a> {
    pub fn new(index: &'a InvertedIndex, analyzer: Arc<Analyzer>, walker: SourceWalker, exact: bool) -> Self {
        QueryRunner {
            index,
            analyzer,
            walker,
            exact,
            results: QueryResults::new(),
        }
    }

    pub fn exact(&self) -> bool {
        self.exact
    }

    /// Borrowed view of the results table
    pub fn table(&self) -> &QueryResults {
        &self.results
    }

    pub fn into_results(self) -> QueryResults {
        self.results
    }
}

fn answer(index: &InvertedIndex, analyzer: &Analyzer, exact: bool, results: &mut QueryResults, line: &str) {
    let Some(key) = QueryKey::parse(line, analyzer) else {
        return;
    };
    if results.contains(key.as_str()) {
        debug!(query = %key, "already answered");
        return;
    }

    let matches = index.search(key.words(), exact);
    debug!(query = %key, matches = matches.len(), "query answered");
    results.insert(key.into_string(), matches);
}

impl QueryProcessor for QueryRunner<'_> {
    fn process_line(&mut self, line: &str) -> Result<()> {
        answer(self.index, &self.analyzer, self.exact, &mut self.results, line);
        Ok(())
    }

    fn process_path(&mut self, path: &Path) -> Result<()> {
        let QueryRunner { index, analyzer, walker, exact, results } = self;
        walker.for_each_line(path, |line| {
            answer(index, analyzer, *exact, results, line);
            Ok(())
        })?;

        info!(queries = results.len(), exact = *exact, "queries answered");
        Ok(())
    }

    fn results(&self) -> QueryResults {
        self.results.clone()
    }

    fn write_results(&self, out: &Path) -> Result<()> {
        json::write_results_to_path(&self.results, out)
    }
}
