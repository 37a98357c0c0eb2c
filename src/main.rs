use std::path::{Path, PathBuf};
use std::sync::Arc;
use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use stemdex::analysis::analyzer::Analyzer;
use stemdex::core::config::{Config, DEFAULT_THREADS};
use stemdex::core::error::Result;
use stemdex::index::concurrent::ConcurrentIndex;
use stemdex::parallel::indexer::ParallelIndexBuilder;
use stemdex::parallel::querier::ParallelQueryRunner;
use stemdex::parallel::work_queue::WorkQueue;
use stemdex::query::runner::{QueryProcessor, QueryRunner};
use stemdex::storage::walker::SourceWalker;
use stemdex::writer::index_builder::{IndexBuilder, IndexBuilding};

#[derive(Parser, Debug)]
#[command(
    name = "stemdex",
    about = "Builds a stemmed inverted index from text files and answers ranked queries",
    version
)]
struct Cli {
    /// Text file, or directory searched recursively for text files, to index
    #[arg(long)]
    path: Option<PathBuf>,

    /// Write the inverted index as JSON
    #[arg(long, num_args = 0..=1, default_missing_value = "index.json")]
    index: Option<PathBuf>,

    /// Write per-document word counts as JSON
    #[arg(long, num_args = 0..=1, default_missing_value = "counts.json")]
    counts: Option<PathBuf>,

    /// Text file with one query per line
    #[arg(long)]
    query: Option<PathBuf>,

    /// Write query results as JSON
    #[arg(long, num_args = 0..=1, default_missing_value = "results.json")]
    results: Option<PathBuf>,

    /// Match whole words only instead of prefixes
    #[arg(long)]
    exact: bool,

    /// Build and query with this many worker threads
    #[arg(long, num_args = 0..=1, default_missing_value = "5")]
    threads: Option<String>,
}

impl Cli {
    /// Invalid thread counts fall back to the default
    fn config(&self) -> Config {
        let threads = match self.threads.as_deref() {
            None => DEFAULT_THREADS,
            Some(value) => match value.parse::<usize>() {
                Ok(threads) if threads > 0 => threads,
                _ => {
                    warn!(value, "invalid thread count, using {}", DEFAULT_THREADS);
                    DEFAULT_THREADS
                }
            },
        };

        Config::default()
            .with_concurrent(self.threads.is_some())
            .with_threads(threads)
            .with_exact(self.exact)
    }
}

fn build_step(cli: &Cli, builder: &mut dyn IndexBuilding) {
    if let Some(path) = &cli.path {
        if let Err(err) = builder.build(path) {
            error!("unable to build the index from {}: {}", path.display(), err);
        }
    }

    if let Some(out) = &cli.index {
        report(out, builder.write_index(out));
    }
    if let Some(out) = &cli.counts {
        report(out, builder.write_counts(out));
    }
}

fn query_step(cli: &Cli, runner: &mut dyn QueryProcessor) {
    if let Some(path) = &cli.query {
        if let Err(err) = runner.process_path(path) {
            error!("unable to run queries from {}: {}", path.display(), err);
        }
    }

    if let Some(out) = &cli.results {
        report(out, runner.write_results(out));
    }
}

fn report(out: &Path, outcome: Result<()>) {
    match outcome {
        Ok(()) => info!(path = %out.display(), "output written"),
        Err(err) => error!("unable to write {}: {}", out.display(), err),
    }
}

fn run(cli: &Cli, config: &Config) -> Result<()> {
    config.validate()?;
    let analyzer = Arc::new(Analyzer::standard(config.stemmer)?);
    let walker = SourceWalker::new(&config.extensions);

    if config.concurrent {
        let queue = Arc::new(WorkQueue::new(config.threads)?);
        let index = Arc::new(ConcurrentIndex::new());

        let mut builder =
            ParallelIndexBuilder::new(index.clone(), analyzer.clone(), walker.clone(), queue.clone());
        build_step(cli, &mut builder);

        let mut runner = ParallelQueryRunner::new(index, analyzer, walker, queue.clone(), config.exact);
        query_step(cli, &mut runner);

        queue.shutdown();
    } else {
        let mut builder = IndexBuilder::new(analyzer.clone(), walker.clone());
        build_step(cli, &mut builder);

        let mut runner = QueryRunner::new(builder.index(), analyzer, walker, config.exact);
        query_step(cli, &mut runner);
    }

    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = cli.config();
    info!(concurrent = config.concurrent, threads = config.threads, exact = config.exact, "starting");

    if let Err(err) = run(&cli, &config) {
        error!("{}", err);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("stemdex").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn outputs_default_their_file_names() {
        let cli = parse(&["--path", "corpus", "--index", "--counts", "--results"]);
        assert_eq!(cli.index, Some(PathBuf::from("index.json")));
        assert_eq!(cli.counts, Some(PathBuf::from("counts.json")));
        assert_eq!(cli.results, Some(PathBuf::from("results.json")));
        assert!(!cli.config().concurrent);
    }

    #[test]
    fn threads_flag_enables_concurrency() {
        let config = parse(&["--threads"]).config();
        assert!(config.concurrent);
        assert_eq!(config.threads, DEFAULT_THREADS);

        let config = parse(&["--threads", "3", "--exact"]).config();
        assert_eq!(config.threads, 3);
        assert!(config.exact);
    }

    #[test]
    fn bad_thread_counts_fall_back() {
        assert_eq!(parse(&["--threads", "0"]).config().threads, DEFAULT_THREADS);
        assert_eq!(parse(&["--threads", "many"]).config().threads, DEFAULT_THREADS);
    }
}
