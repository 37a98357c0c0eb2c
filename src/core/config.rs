use rust_stemmers::Algorithm;
use crate::core::error::{Error, Result};

/// Worker count used when none (or an invalid one) is supplied
pub const DEFAULT_THREADS: usize = 5;

#[derive(Debug, Clone)]
pub struct Config {
    pub threads: usize,                 // Workers in the shared WorkQueue
    pub concurrent: bool,               // Use the parallel builder and query runner
    pub exact: bool,                    // Exact vs partial (prefix) search
    pub stemmer: Algorithm,             // Must match between build and query time
    pub extensions: Vec<String>,        // Recognised text extensions, no leading dot
}

impl Default for Config {
    fn default() -> Self {
        Config {
            threads: DEFAULT_THREADS,
            concurrent: false,
            exact: false,
            stemmer: Algorithm::English,
            extensions: vec!["txt".to_string(), "text".to_string()],
        }
    }
}

impl Config {
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    pub fn with_concurrent(mut self, concurrent: bool) -> Self {
        self.concurrent = concurrent;
        self
    }

    pub fn with_exact(mut self, exact: bool) -> Self {
        self.exact = exact;
        self
    }

    pub fn with_stemmer(mut self, stemmer: Algorithm) -> Self {
        self.stemmer = stemmer;
        self
    }

    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extensions = extensions
            .into_iter()
            .map(|ext| ext.into().trim_start_matches('.').to_lowercase())
            .collect();
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.threads == 0 {
            return Err(Error::invalid_argument("threads must be at least 1"));
        }
        if self.extensions.is_empty() {
            return Err(Error::invalid_argument("at least one text extension is required"));
        }
        Ok(())
    }
}
