use std::fs;
use std::path::Path;
use std::process::Command;
use std::sync::Arc;
use serde_json::Value;
use tempfile::TempDir;
use stemdex::analysis::analyzer::Analyzer;
use stemdex::core::config::Config;
use stemdex::index::concurrent::ConcurrentIndex;
use stemdex::parallel::indexer::ParallelIndexBuilder;
use stemdex::parallel::querier::ParallelQueryRunner;
use stemdex::parallel::work_queue::WorkQueue;
use stemdex::query::runner::{QueryProcessor, QueryRunner};
use stemdex::storage::walker::SourceWalker;
use stemdex::writer::index_builder::{IndexBuilder, IndexBuilding};
use stemdex::writer::json;

fn write_corpus(root: &Path) {
    fs::create_dir_all(root.join("animals/wild")).unwrap();
    fs::write(root.join("A.txt"), "fox runs").unwrap();
    fs::write(root.join("B.txt"), "fox jumps fox").unwrap();
    fs::write(
        root.join("animals/wild/wolves.TXT"),
        "Wolves hunt in packs.\nA wolf's howl carries far;\nfoxes avoid the wolves.\n",
    )
    .unwrap();
    fs::write(root.join("animals/notes.text"), "The quick brown fox jumped over 3 lazy dogs!").unwrap();
    fs::write(root.join("animals/ignored.md"), "fox fox fox fox").unwrap();
    // Invalid UTF-8 fails while reading lines
    fs::write(root.join("animals/broken.txt"), [0x66, 0x6f, 0x78, 0x20, 0xff, 0xfe, 0x0a]).unwrap();
}

fn write_queries(path: &Path) {
    fs::write(
        path,
        "fox\nFoxes!\n\nwolf howl\nhowls wolf\nju\nla do\nqu br\nzebra\n1234\n",
    )
    .unwrap();
}

#[test]
fn documented_example_ranks_by_score() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("A.txt"), "fox runs").unwrap();
    fs::write(dir.path().join("B.txt"), "fox jumps fox").unwrap();

    let config = Config::default();
    let mut builder = IndexBuilder::from_config(&config).unwrap();
    assert_eq!(builder.build(dir.path()).unwrap(), 2);

    let results = builder.index().exact_search(["fox"]);
    let a = dir.path().join("A.txt").to_string_lossy().into_owned();
    let b = dir.path().join("B.txt").to_string_lossy().into_owned();

    assert_eq!(results.len(), 2);
    assert_eq!((results[0].location.as_str(), results[0].count), (b.as_str(), 2));
    assert!((results[0].score - 2.0 / 3.0).abs() < 1e-12);
    assert_eq!((results[1].location.as_str(), results[1].count), (a.as_str(), 1));
    assert_eq!(results[1].score, 0.5);
}

#[test]
fn broken_documents_do_not_stop_the_build() {
    let dir = TempDir::new().unwrap();
    write_corpus(dir.path());

    let mut builder = IndexBuilder::from_config(&Config::default()).unwrap();
    assert_eq!(builder.build(dir.path()).unwrap(), 4);

    let index = builder.index();
    assert_eq!(index.num_locations(), 4);
    assert!(index.has_word("wolv") || index.has_word("wolf"));
    assert!(index.words().all(|word| !word.is_empty()));
}

#[test]
fn parallel_and_sequential_runs_agree() {
    let dir = TempDir::new().unwrap();
    write_corpus(dir.path());
    let query_dir = TempDir::new().unwrap();
    let queries = query_dir.path().join("queries.txt");
    write_queries(&queries);

    for exact in [true, false] {
        let config = Config::default().with_exact(exact).with_threads(4);

        let mut builder = IndexBuilder::from_config(&config).unwrap();
        builder.build(dir.path()).unwrap();
        let analyzer = Arc::new(Analyzer::standard(config.stemmer).unwrap());
        let walker = SourceWalker::new(&config.extensions);
        let mut runner = QueryRunner::new(builder.index(), analyzer.clone(), walker.clone(), exact);
        runner.process_path(&queries).unwrap();

        let queue = Arc::new(WorkQueue::new(config.threads).unwrap());
        let shared = Arc::new(ConcurrentIndex::new());
        let mut parallel_builder =
            ParallelIndexBuilder::new(shared.clone(), analyzer.clone(), walker.clone(), queue.clone());
        assert_eq!(parallel_builder.build(dir.path()).unwrap(), 4);
        let mut parallel_runner = ParallelQueryRunner::new(shared.clone(), analyzer, walker, queue.clone(), exact);
        parallel_runner.process_path(&queries).unwrap();

        assert_eq!(shared.snapshot(), *builder.index());
        assert_eq!(parallel_runner.results(), runner.results());
        // "fox" and "Foxes!" share a key, as do the two wolf lines
        assert_eq!(runner.results().len(), 6);
        assert_eq!(queue.failures(), 1);

        queue.shutdown();
    }
}

#[test]
fn json_outputs_parse_back() {
    let dir = TempDir::new().unwrap();
    write_corpus(dir.path());
    let query_dir = TempDir::new().unwrap();
    let queries = query_dir.path().join("queries.txt");
    write_queries(&queries);
    let out = TempDir::new().unwrap();

    let config = Config::default();
    let mut builder = IndexBuilder::from_config(&config).unwrap();
    builder.build(dir.path()).unwrap();
    builder.write_index(&out.path().join("index.json")).unwrap();
    builder.write_counts(&out.path().join("counts.json")).unwrap();

    let analyzer = Arc::new(Analyzer::standard(config.stemmer).unwrap());
    let mut runner = QueryRunner::new(builder.index(), analyzer, SourceWalker::new(&config.extensions), false);
    runner.process_path(&queries).unwrap();
    runner.write_results(&out.path().join("results.json")).unwrap();

    let counts: Value = serde_json::from_str(&fs::read_to_string(out.path().join("counts.json")).unwrap()).unwrap();
    let a = dir.path().join("A.txt").to_string_lossy().into_owned();
    assert_eq!(counts[&a], 2);

    let index: Value = serde_json::from_str(&fs::read_to_string(out.path().join("index.json")).unwrap()).unwrap();
    assert_eq!(index["run"][&a], serde_json::json!([2]));

    let text = fs::read_to_string(out.path().join("results.json")).unwrap();
    let results: Value = serde_json::from_str(&text).unwrap();
    let fox = results["fox"].as_array().unwrap();
    assert_eq!(fox.len(), 4);
    assert!(fox[0].get("where").is_some());
    assert!(results["zebra"].as_array().unwrap().is_empty());
    assert!(text.contains("\"score\": 0.50000000"));
}

#[test]
fn driver_runs_every_step() {
    let dir = TempDir::new().unwrap();
    write_corpus(dir.path());
    let query_dir = TempDir::new().unwrap();
    let queries = query_dir.path().join("queries.txt");
    write_queries(&queries);
    let out = TempDir::new().unwrap();

    for threads in [None, Some("3")] {
        let mut command = Command::new(env!("CARGO_BIN_EXE_stemdex"));
        command
            .current_dir(out.path())
            .arg("--path")
            .arg(dir.path())
            .arg("--query")
            .arg(&queries)
            .args(["--index", "--counts", "--results"]);
        if let Some(threads) = threads {
            command.args(["--threads", threads]);
        }

        let status = command.status().unwrap();
        assert!(status.success());

        for name in ["index.json", "counts.json", "results.json"] {
            let text = fs::read_to_string(out.path().join(name)).unwrap();
            let value: Value = serde_json::from_str(&text).unwrap();
            assert!(value.is_object(), "{}", name);
        }
    }
}

#[test]
fn driver_writes_empty_results_without_queries() {
    let out = TempDir::new().unwrap();
    let status = Command::new(env!("CARGO_BIN_EXE_stemdex"))
        .current_dir(out.path())
        .arg("--results")
        .status()
        .unwrap();

    assert!(status.success());
    assert_eq!(fs::read_to_string(out.path().join("results.json")).unwrap(), "{\n}");
}

#[test]
fn rendered_results_are_stable() {
    let dir = TempDir::new().unwrap();
    write_corpus(dir.path());
    let query_dir = TempDir::new().unwrap();
    let queries = query_dir.path().join("queries.txt");
    write_queries(&queries);

    let render = || {
        let config = Config::default();
        let mut builder = IndexBuilder::from_config(&config).unwrap();
        builder.build(dir.path()).unwrap();
        let analyzer = Arc::new(Analyzer::standard(config.stemmer).unwrap());
        let mut runner = QueryRunner::new(builder.index(), analyzer, SourceWalker::new(&config.extensions), false);
        runner.process_path(&queries).unwrap();

        let mut buffer = Vec::new();
        json::write_results(&runner.results(), &mut buffer).unwrap();
        buffer
    };

    assert_eq!(render(), render());
}
