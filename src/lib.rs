pub mod core;
pub mod storage;
pub mod analysis;
pub mod index;
pub mod search;
pub mod query;
pub mod writer;
pub mod parallel;

/*
┌──────────────────────────────────────────────────────────────────────────────┐
│                             STEMDEX ARCHITECTURE                             │
└──────────────────────────────────────────────────────────────────────────────┘

┌─────────────────────────────── INPUT ────────────────────────────────────────┐
│                                                                              │
│  SourceWalker (storage/walker.rs)                                            │
│    for_each_document(path, f)   text files under a directory, or one file    │
│    for_each_line(path, f)       every line of those files                    │
│                                                                              │
│  Analyzer (analysis/analyzer.rs)                                             │
│    RegexTokenizer ──> LowercaseFilter ──> StemmerFilter(Config::stemmer)     │
│                                                                              │
└──────────────────────────────────────────────────────────────────────────────┘
                                      │
                                      ▼
┌─────────────────────────────── INDEX ────────────────────────────────────────┐
│                                                                              │
│  InvertedIndex (index/inverted.rs)                                           │
│    words:  BTreeMap<word, BTreeMap<location, BTreeSet<position>>>            │
│    counts: BTreeMap<location, highest position>                              │
│    add / merge / exact_search / partial_search                               │
│                                                                              │
│  ConcurrentIndex (index/concurrent.rs)                                       │
│    ReadWriteLock + InvertedIndex   add, merge: write lock                    │
│                                    search, accessors: read lock              │
│                                                                              │
└──────────────────────────────────────────────────────────────────────────────┘
                                      │
              ┌───────────────────────┴───────────────────────┐
              ▼                                               ▼
┌──────── SEQUENTIAL ────────────────┐      ┌──────── PARALLEL ──────────────────┐
│                                    │      │                                    │
│  IndexBuilder   (writer/)          │      │  ParallelIndexBuilder              │
│    index_file into own index       │      │    one task per document:          │
│                                    │      │    private index, then one merge   │
│  QueryRunner    (query/)           │      │                                    │
│    QueryKey -> search -> table     │      │  ParallelQueryRunner               │
│                                    │      │    one task per line, claimed keys │
│                                    │      │                                    │
│                                    │      │  WorkQueue (shared via Arc)        │
└────────────────────────────────────┘      └────────────────────────────────────┘
              │                                               │
              └───────────────────────┬───────────────────────┘
                                      ▼
┌─────────────────────────────── OUTPUT ───────────────────────────────────────┐
│                                                                              │
│  writer/json.rs   counts.json   index.json   results.json                    │
│                                                                              │
└──────────────────────────────────────────────────────────────────────────────┘
*/
