use std::cell::UnsafeCell;
use std::collections::BTreeMap;
use std::fmt;
use crate::core::types::{Location, Position, PositionSet};
use crate::index::inverted::InvertedIndex;
use crate::parallel::lock::ReadWriteLock;
use crate::search::results::SearchResult;

/// Thread-safe wrapper around an [`InvertedIndex`].
///
/// Mutations take the write lock, everything else the read lock. Results are
/// identical to calling the wrapped index directly. Accessors return owned
/// copies because borrowed views cannot outlive the read lock.
pub struct ConcurrentIndex {
    lock: ReadWriteLock,
    index: UnsafeCell<InvertedIndex>,
}

// SAFETY: every access to `index` goes through `read` or `write`, which hold
// the matching half of `lock` for the whole borrow. Only private closures run
// under the write lock, so a `&mut` never coexists with another reference.
unsafe impl Sync for ConcurrentIndex {}

impl ConcurrentIndex {
    pub fn new() -> Self {
        Self::from_index(InvertedIndex::new())
    }

    pub fn from_index(index: InvertedIndex) -> Self {
        ConcurrentIndex {
            lock: ReadWriteLock::new(),
            index: UnsafeCell::new(index),
        }
    }

    fn read<R>(&self, f: impl FnOnce(&InvertedIndex) -> R) -> R {
        let _guard = self.lock.read();
        // SAFETY: read lock held, no writer can hold `&mut` concurrently
        f(unsafe { &*self.index.get() })
    }

    fn write<R>(&self, f: impl FnOnce(&mut InvertedIndex) -> R) -> R {
        let _guard = self.lock.write();
        // SAFETY: write lock held and `f` never re-enters this wrapper
        f(unsafe { &mut *self.index.get() })
    }

    pub fn add(&self, word: &str, location: &str, position: Position) -> bool {
        self.write(|index| index.add(word, location, position))
    }

    /// Absorbs a privately built index in a single write-lock hold
    pub fn merge(&self, other: InvertedIndex) {
        self.write(|index| index.merge(other))
    }

    pub fn search<I, S>(&self, queries: I, exact: bool) -> Vec<SearchResult>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.read(|index| index.search(queries, exact))
    }

    pub fn exact_search<I, S>(&self, queries: I) -> Vec<SearchResult>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.read(|index| index.exact_search(queries))
    }

    pub fn partial_search<I, S>(&self, queries: I) -> Vec<SearchResult>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.read(|index| index.partial_search(queries))
    }

    /// Runs `f` against the index under the read lock.
    ///
    /// Calling a mutating method of this wrapper from `f` deadlocks.
    pub fn with_read<R>(&self, f: impl FnOnce(&InvertedIndex) -> R) -> R {
        self.read(f)
    }

    pub fn words(&self) -> Vec<String> {
        self.read(|index| index.words().map(str::to_string).collect())
    }

    pub fn counts(&self) -> BTreeMap<Location, usize> {
        self.read(|index| index.counts().clone())
    }

    pub fn count(&self, location: &str) -> Option<usize> {
        self.read(|index| index.count(location))
    }

    pub fn locations(&self, word: &str) -> Vec<Location> {
        self.read(|index| index.locations(word).map(str::to_string).collect())
    }

    pub fn positions(&self, word: &str, location: &str) -> Option<PositionSet> {
        self.read(|index| index.positions(word, location).cloned())
    }

    pub fn has_word(&self, word: &str) -> bool {
        self.read(|index| index.has_word(word))
    }

    pub fn has_location(&self, word: &str, location: &str) -> bool {
        self.read(|index| index.has_location(word, location))
    }

    pub fn has_position(&self, word: &str, location: &str, position: Position) -> bool {
        self.read(|index| index.has_position(word, location, position))
    }

    pub fn num_words(&self) -> usize {
        self.read(InvertedIndex::num_words)
    }

    pub fn num_locations(&self) -> usize {
        self.read(InvertedIndex::num_locations)
    }

    pub fn num_positions(&self) -> usize {
        self.read(InvertedIndex::num_positions)
    }

    pub fn is_empty(&self) -> bool {
        self.read(InvertedIndex::is_empty)
    }

    /// Point-in-time copy of the whole index
    pub fn snapshot(&self) -> InvertedIndex {
        self.read(InvertedIndex::clone)
    }

    pub fn into_inner(self) -> InvertedIndex {
        self.index.into_inner()
    }
}

impl Default for ConcurrentIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl From<InvertedIndex> for ConcurrentIndex {
    fn from(index: InvertedIndex) -> Self {
        Self::from_index(index)
    }
}

impl fmt::Display for ConcurrentIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.read(|index| fmt::Display::fmt(index, f))
    }
}

impl fmt::Debug for ConcurrentIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.read(|index| f.debug_struct("ConcurrentIndex").field("index", index).finish())
    }
}
