use std::cmp::Ordering;
use crate::core::types::Location;

/// One matched location for one query
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    pub location: Location,
    pub count: usize,   // Matched positions summed over matching words
    pub score: f64,     // count / total words in location
}

impl SearchResult {
    pub fn new(location: Location) -> Self {
        SearchResult {
            location,
            count: 0,
            score: 0.0,
        }
    }

    /// Adds `matches` positions and rescales against the location's size
    pub fn update(&mut self, matches: usize, total_words: usize) {
        self.count += matches;
        self.score = self.count as f64 / total_words as f64;
    }
}

/// Case-insensitive comparison by lowercased characters
pub fn compare_ignore_case(a: &str, b: &str) -> Ordering {
    a.chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase))
}

// Scores are count / total with total >= 1, never NaN
impl Eq for SearchResult {}

impl PartialOrd for SearchResult {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Ranking order: score descending, count descending, location ascending
/// ignoring case, then raw location so the order is total.
impl Ord for SearchResult {
    fn cmp(&self, other: &Self) -> Ordering {
        other.score.total_cmp(&self.score)
            .then_with(|| other.count.cmp(&self.count))
            .then_with(|| compare_ignore_case(&self.location, &other.location))
            .then_with(|| self.location.cmp(&other.location))
    }
}
