use std::{
    path::{Path, PathBuf},
    process::{Command, Output},
};

fn fuzzdoc_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_fuzzdoc"))
}

fn run(data_dir: &Path, args: &[&str]) -> Output {
    let output = Command::new(fuzzdoc_bin())
        .args(args)
        .env("FUZZDOC_DATA_DIR", data_dir)
        .env("FUZZDOC_CORPUS_DIR", data_dir.join("docs"))
        .env_remove("FUZZDOC_LOG")
        .output()
        .expect("spawn fuzzdoc");
    assert!(
        output.status.success(),
        "fuzzdoc {args:?} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    output
}

fn stdout_json(output: &Output) -> serde_json::Value {
    serde_json::from_slice(&output.stdout).expect("stdout is JSON")
}

fn setup() -> tempfile::TempDir {
    let tmp = tempfile::tempdir().unwrap();
    let docs = tmp.path().join("docs");
    std::fs::create_dir_all(&docs).unwrap();
    std::fs::write(docs.join("a.txt"), "cat dog").unwrap();
    std::fs::write(docs.join("b.txt"), "dog bird").unwrap();
    tmp
}

#[test]
fn index_search_and_delete() {
    let tmp = setup();

    let stats = stdout_json(&run(tmp.path(), &["index", "--json"]));
    assert_eq!(stats["added"], 2);
    assert_eq!(stats["total_docs"], 2);
    assert_eq!(stats["vocab_size"], 3);
    assert!(tmp.path().join("index.json").is_file());

    let again = stdout_json(&run(tmp.path(), &["index", "--json"]));
    assert_eq!(again["added"], 0);
    assert_eq!(again["updated"], 0);
    assert_eq!(again["removed"], 0);

    let found = stdout_json(&run(tmp.path(), &["search", "dog", "--json"]));
    let ids: Vec<&str> = found["results"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["doc_id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["a.txt", "b.txt"]);

    let typo = stdout_json(&run(tmp.path(), &["search", "catt", "--json"]));
    assert_eq!(typo["result_count"], 1);
    assert_eq!(typo["results"][0]["doc_id"], "a.txt");

    let exact =
        stdout_json(&run(tmp.path(), &["search", "catt", "--no-fuzzy", "--json"]));
    assert_eq!(exact["result_count"], 0);

    std::fs::remove_file(tmp.path().join("docs").join("a.txt")).unwrap();
    let stats = stdout_json(&run(tmp.path(), &["index", "--json"]));
    assert_eq!(stats["removed"], 1);
    assert_eq!(stats["vocab_size"], 2);

    let snapshot: serde_json::Value = serde_json::from_slice(
        &std::fs::read(tmp.path().join("index.json")).unwrap(),
    )
    .unwrap();
    assert!(snapshot["inverted_index"].get("cat").is_none());
    assert_eq!(snapshot["inverted_index"]["dog"], serde_json::json!({"b.txt": 1}));
}

#[test]
fn corrupt_snapshot_is_rebuilt() {
    let tmp = setup();
    std::fs::write(tmp.path().join("index.json"), "garbage").unwrap();

    let status = stdout_json(&run(tmp.path(), &["status", "--json"]));
    assert_eq!(status["documents"], 0);
    assert!(status["load_status"].as_str().unwrap().starts_with("Reset"));

    let stats = stdout_json(&run(tmp.path(), &["index", "--json"]));
    assert_eq!(stats["added"], 2);
}

#[test]
fn full_rebuild_reindexes_everything() {
    let tmp = setup();
    run(tmp.path(), &["index"]);

    let stats = stdout_json(&run(tmp.path(), &["index", "--full", "--json"]));
    assert_eq!(stats["added"], 2);
    assert_eq!(stats["updated"], 0);
}

#[test]
fn tokenize_prints_terms() {
    let tmp = tempfile::tempdir().unwrap();
    let tokens =
        stdout_json(&run(tmp.path(), &["tokenize", "Hello, World!", "--json"]));
    assert_eq!(tokens, serde_json::json!(["hello", "world"]));
}

#[test]
fn search_on_empty_corpus_prints_no_results() {
    let tmp = tempfile::tempdir().unwrap();
    let out = run(tmp.path(), &["search", "anything"]);
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("No matching documents."));
}
