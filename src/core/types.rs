use std::collections::{BTreeMap, BTreeSet};

/// Document identifier (normally the file path as given to the builder)
pub type Location = String;

/// 1-based offset of a word within a location's token stream
pub type Position = usize;

/// Ascending, duplicate-free positions of one word in one location
pub type PositionSet = BTreeSet<Position>;

/// location -> positions for a single word
pub type Postings = BTreeMap<Location, PositionSet>;
