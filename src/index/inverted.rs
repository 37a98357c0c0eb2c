use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::fmt;
use std::ops::Bound;
use crate::core::types::{Location, Position, PositionSet, Postings};

/// Inverted index structure
///
/// word -> location -> positions, plus the total word count of every
/// location. The count of a location is the highest position ever recorded
/// for it, so it never decreases and is independent of insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InvertedIndex {
    pub(crate) words: BTreeMap<String, Postings>,
    pub(crate) counts: BTreeMap<Location, usize>,
}

impl InvertedIndex {
    pub fn new() -> Self {
        InvertedIndex {
            words: BTreeMap::new(),
            counts: BTreeMap::new(),
        }
    }

    /// Records `word` at `position` in `location`.
    ///
    /// Returns false if the triple was already present, in which case
    /// nothing changes.
    pub fn add(&mut self, word: &str, location: &str, position: Position) -> bool {
        debug_assert!(position > 0, "positions are 1-based");

        let positions = self.words
            .entry(word.to_string())
            .or_default()
            .entry(location.to_string())
            .or_default();

        if !positions.insert(position) {
            return false;
        }

        let count = self.counts.entry(location.to_string()).or_insert(0);
        *count = (*count).max(position);
        true
    }

    /// Absorbs `other` into this index.
    ///
    /// Same result as replaying every (word, location, position) of `other`
    /// through [`add`](Self::add): positions are unioned and counts take the
    /// maximum per location.
    pub fn merge(&mut self, other: InvertedIndex) {
        for (word, other_postings) in other.words {
            match self.words.entry(word) {
                Entry::Vacant(entry) => {
                    entry.insert(other_postings);
                }
                Entry::Occupied(mut entry) => {
                    let postings = entry.get_mut();
                    for (location, other_positions) in other_postings {
                        match postings.entry(location) {
                            Entry::Vacant(slot) => {
                                slot.insert(other_positions);
                            }
                            Entry::Occupied(mut slot) => {
                                slot.get_mut().extend(other_positions);
                            }
                        }
                    }
                }
            }
        }

        for (location, other_count) in other.counts {
            let count = self.counts.entry(location).or_insert(0);
            *count = (*count).max(other_count);
        }
    }

    /// Indexed words in ascending order
    pub fn words(&self) -> impl Iterator<Item = &str> {
        self.words.keys().map(String::as_str)
    }

    /// Words with their postings, ascending by word
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Postings)> {
        self.words.iter().map(|(word, postings)| (word.as_str(), postings))
    }

    /// Words sharing `prefix`, ascending, found by a bounded range scan
    pub fn words_with_prefix<'a, 'p>(&'a self, prefix: &'p str) -> impl Iterator<Item = &'a str> {
        self.words
            .range::<str, _>((Bound::Included(prefix), Bound::Unbounded))
            .map(|(word, _)| word.as_str())
            .take_while(move |word| word.starts_with(prefix))
    }

    pub fn counts(&self) -> &BTreeMap<Location, usize> {
        &self.counts
    }

    pub fn count(&self, location: &str) -> Option<usize> {
        self.counts.get(location).copied()
    }

    pub fn postings(&self, word: &str) -> Option<&Postings> {
        self.words.get(word)
    }

    /// Locations containing `word`, ascending
    pub fn locations(&self, word: &str) -> impl Iterator<Item = &str> {
        self.words
            .get(word)
            .into_iter()
            .flat_map(|postings| postings.keys().map(String::as_str))
    }

    pub fn positions(&self, word: &str, location: &str) -> Option<&PositionSet> {
        self.words.get(word).and_then(|postings| postings.get(location))
    }

    pub fn has_word(&self, word: &str) -> bool {
        self.words.contains_key(word)
    }

    pub fn has_location(&self, word: &str, location: &str) -> bool {
        self.positions(word, location).is_some()
    }

    pub fn has_position(&self, word: &str, location: &str, position: Position) -> bool {
        self.positions(word, location)
            .is_some_and(|positions| positions.contains(&position))
    }

    pub fn num_words(&self) -> usize {
        self.words.len()
    }

    pub fn num_locations(&self) -> usize {
        self.counts.len()
    }

    /// Total (word, location, position) triples
    pub fn num_positions(&self) -> usize {
        self.words
            .values()
            .flat_map(|postings| postings.values())
            .map(PositionSet::len)
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

impl fmt::Display for InvertedIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (word, postings)) in self.words.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}={{", word)?;
            for (j, (location, positions)) in postings.iter().enumerate() {
                if j > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}={:?}", location, positions)?;
            }
            write!(f, "}}")?;
        }
        write!(f, "}}")
    }
}
