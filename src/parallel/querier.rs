use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use parking_lot::Mutex;
use tracing::{debug, info};
use crate::analysis::analyzer::Analyzer;
use crate::core::error::Result;
use crate::index::concurrent::ConcurrentIndex;
use crate::parallel::work_queue::WorkQueue;
use crate::query::key::QueryKey;
use crate::query::results::QueryResults;
use crate::query::runner::QueryProcessor;
use crate::storage::walker::SourceWalker;
use crate::writer::json;

#[derive(Default)]
struct ResultsTable {
    results: QueryResults,
    claimed: HashSet<String>,   // Keys some thread has started searching
}

/// State shared with the queued query tasks.
///
/// The table mutex and the index lock are never held at the same time.
struct QueryContext {
    index: Arc<ConcurrentIndex>,
    analyzer: Arc<Analyzer>,
    exact: bool,
    table: Mutex<ResultsTable>,
}

/// A key claimed for searching. Dropping it without [`Claim::keep`]
/// releases the key so a later duplicate line can retry.
struct Claim<'a> {
    table: &'a Mutex<ResultsTable>,
    key: Option<String>,
}

impl Claim<'_> {
    fn keep(mut self) {
        self.key = None;
    }
}

impl Drop for Claim<'_> {
    fn drop(&mut self) {
        if let Some(key) = self.key.take() {
            self.table.lock().claimed.remove(&key);
        }
    }
}

impl QueryContext {
    /// `None` when another task already owns `key`
    fn claim(&self, key: &str) -> Option<Claim<'_>> {
        if !self.table.lock().claimed.insert(key.to_string()) {
            return None;
        }
        Some(Claim {
            table: &self.table,
            key: Some(key.to_string()),
        })
    }

    fn answer(&self, line: &str) {
        let Some(key) = QueryKey::parse(line, &self.analyzer) else {
            return;
        };

        // First claim wins; later duplicates skip the search entirely
        let Some(claim) = self.claim(key.as_str()) else {
            debug!(query = %key, "already claimed");
            return;
        };

        let matches = self.index.search(key.words(), self.exact);
        debug!(query = %key, matches = matches.len(), "query answered");
        self.table.lock().results.insert(key.into_string(), matches);
        claim.keep();
    }
}

/// Answers query lines on a shared [`WorkQueue`], one task per line
pub struct ParallelQueryRunner {
    context: Arc<QueryContext>,
    walker: SourceWalker,
    queue: Arc<WorkQueue>,
}

impl ParallelQueryRunner {
    pub fn new(
        index: Arc<ConcurrentIndex>,
        analyzer: Arc<Analyzer>,
        walker: SourceWalker,
        queue: Arc<WorkQueue>,
        exact: bool,
    ) -> Self {
        ParallelQueryRunner {
            context: Arc::new(QueryContext {
                index,
                analyzer,
                exact,
                table: Mutex::new(ResultsTable::default()),
            }),
            walker,
            queue,
        }
    }

    pub fn exact(&self) -> bool {
        self.context.exact
    }

    /// Queues one line without waiting for it
    pub fn submit_line(&self, line: String) -> Result<()> {
        let context = self.context.clone();
        self.queue.execute(move || {
            context.answer(&line);
            Ok(())
        })
    }

    /// Blocks until every queued line has been answered
    pub fn finish(&self) {
        self.queue.finish();
    }
}

impl QueryProcessor for ParallelQueryRunner {
    /// Answers `line` on the calling thread
    fn process_line(&mut self, line: &str) -> Result<()> {
        self.context.answer(line);
        Ok(())
    }

    fn process_path(&mut self, path: &Path) -> Result<()> {
        let submitted = self.walker.for_each_line(path, |line| self.submit_line(line.to_string()));
        self.queue.finish();
        submitted?;

        info!(queries = self.context.table.lock().results.len(), exact = self.context.exact, "queries answered");
        Ok(())
    }

    fn results(&self) -> QueryResults {
        self.context.table.lock().results.clone()
    }

    fn write_results(&self, out: &Path) -> Result<()> {
        let table = self.context.table.lock();
        json::write_results_to_path(&table.results, out)
    }
}
