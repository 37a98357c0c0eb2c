use std::collections::{BTreeSet, HashMap};
use crate::index::inverted::InvertedIndex;
use crate::search::results::SearchResult;

/// Collects one SearchResult per location while matching words are fed in
struct ResultCollector<'a> {
    index: &'a InvertedIndex,
    lookup: HashMap<&'a str, usize>,
    results: Vec<SearchResult>,
}

impl<'a> ResultCollector<'a> {
    fn new(index: &'a InvertedIndex) -> Self {
        ResultCollector {
            index,
            lookup: HashMap::new(),
            results: Vec::new(),
        }
    }

    /// Every location under `word` accumulates that word's position count
    fn collect(&mut self, word: &str) {
        let index = self.index;
        let Some(postings) = index.words.get(word) else {
            return;
        };

        for (location, positions) in postings {
            let total = index.counts.get(location).copied().unwrap_or(positions.len());
            let slot = *self.lookup.entry(location.as_str()).or_insert_with(|| {
                self.results.push(SearchResult::new(location.clone()));
                self.results.len() - 1
            });
            self.results[slot].update(positions.len(), total);
        }
    }

    fn finish(mut self) -> Vec<SearchResult> {
        self.results.sort();
        self.results
    }
}

impl InvertedIndex {
    /// Ranked search over stemmed query words.
    ///
    /// `exact` matches only identical words; otherwise every indexed word
    /// starting with a query word matches.
    pub fn search<I, S>(&self, queries: I, exact: bool) -> Vec<SearchResult>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        if exact {
            self.exact_search(queries)
        } else {
            self.partial_search(queries)
        }
    }

    pub fn exact_search<I, S>(&self, queries: I) -> Vec<SearchResult>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let matched: BTreeSet<&str> = queries
            .into_iter()
            .filter_map(|query| self.words.get_key_value(query.as_ref()))
            .map(|(word, _)| word.as_str())
            .collect();

        self.rank(matched)
    }

    pub fn partial_search<I, S>(&self, queries: I) -> Vec<SearchResult>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        // A word reached through two overlapping prefixes still counts once
        let mut matched: BTreeSet<&str> = BTreeSet::new();
        for query in queries {
            matched.extend(self.words_with_prefix(query.as_ref()));
        }

        self.rank(matched)
    }

    fn rank(&self, matched: BTreeSet<&str>) -> Vec<SearchResult> {
        let mut collector = ResultCollector::new(self);
        for word in matched {
            collector.collect(word);
        }
        collector.finish()
    }
}
