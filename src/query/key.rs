use std::collections::BTreeSet;
use std::fmt;
use crate::analysis::analyzer::Analyzer;

/// Canonical form of a query line: its distinct stems, sorted.
///
/// Two lines with the same stems in any order or multiplicity share one key,
/// and one entry in the results table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QueryKey {
    words: BTreeSet<String>,
    text: String,       // Words joined by single spaces
}

impl QueryKey {
    /// None when nothing in `line` survives analysis
    pub fn parse(line: &str, analyzer: &Analyzer) -> Option<Self> {
        Self::from_words(analyzer.query_words(line))
    }

    pub fn from_words(words: BTreeSet<String>) -> Option<Self> {
        if words.is_empty() {
            return None;
        }

        let text = words.iter().map(String::as_str).collect::<Vec<_>>().join(" ");
        Some(QueryKey { words, text })
    }

    pub fn words(&self) -> impl Iterator<Item = &str> {
        self.words.iter().map(String::as_str)
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn into_string(self) -> String {
        self.text
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}
