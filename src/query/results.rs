use std::collections::BTreeMap;
use crate::search::results::SearchResult;

/// Ranked results per canonical query, ordered by query text
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryResults {
    entries: BTreeMap<String, Vec<SearchResult>>,
}

impl QueryResults {
    pub fn new() -> Self {
        QueryResults::default()
    }

    /// Stores `results` under `query`, replacing any earlier entry
    pub fn insert(&mut self, query: String, results: Vec<SearchResult>) {
        self.entries.insert(query, results);
    }

    pub fn get(&self, query: &str) -> Option<&[SearchResult]> {
        self.entries.get(query).map(Vec::as_slice)
    }

    pub fn contains(&self, query: &str) -> bool {
        self.entries.contains_key(query)
    }

    pub fn queries(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[SearchResult])> {
        self.entries
            .iter()
            .map(|(query, results)| (query.as_str(), results.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
