use std::fs;

use ragdb_core::types::ChunkRecord;
use ragdb_store::{IndexStore, CORPUS_FILE, MANIFEST_FILE, METADATA_FILE, VECTORS_FILE};
use ragdb_vector::FlatL2Index;
use tempfile::TempDir;

fn record(i: usize, doc: &str) -> ChunkRecord {
    ChunkRecord {
        global_index: i,
        document_id: doc.to_string(),
        filename: format!("{doc}.txt"),
        chunk_index: 0,
        word_count: 2,
        char_length: 9,
    }
}

fn sample() -> (Vec<String>, Vec<ChunkRecord>, FlatL2Index) {
    let corpus = vec!["alpha one".to_string(), "beta two".to_string()];
    let metadata = vec![record(0, "a"), record(1, "b")];
    let mut vectors = FlatL2Index::new();
    vectors.add(&[vec![1.0, 0.0, 0.0], vec![0.0, 1.0, 0.0]]).unwrap();
    (corpus, metadata, vectors)
}

#[test]
fn fresh_namespace_loads_empty_without_issues() {
    let tmp = TempDir::new().unwrap();
    let store = IndexStore::new(tmp.path().join("index"));
    assert!(!store.exists());
    let loaded = store.load();
    assert!(loaded.corpus.is_empty());
    assert!(loaded.metadata.is_empty());
    assert_eq!(loaded.vectors.count(), 0);
    assert!(loaded.manifest.is_none());
    assert!(loaded.issues.is_empty());
}

#[test]
fn save_then_load_restores_all_artifacts() {
    let tmp = TempDir::new().unwrap();
    let store = IndexStore::new(tmp.path().join("index"));
    let (corpus, metadata, vectors) = sample();

    let manifest = store.save(&corpus, &metadata, &vectors).unwrap();
    assert_eq!(manifest.generation, 1);
    assert_eq!(manifest.chunks, 2);
    assert_eq!(manifest.dim, Some(3));

    let loaded = IndexStore::new(tmp.path().join("index")).load();
    assert_eq!(loaded.corpus, corpus);
    assert_eq!(loaded.metadata, metadata);
    assert_eq!(loaded.vectors, vectors);
    assert_eq!(loaded.manifest.map(|m| m.generation), Some(1));
    assert!(loaded.issues.is_empty(), "{:?}", loaded.issues);
    let live = IndexStore::new(tmp.path().join("index")).generation_dir(1);
    assert!(live.join(CORPUS_FILE).exists());
    assert!(!live.join(format!("{CORPUS_FILE}.tmp")).exists());
}

#[test]
fn generation_increases_across_store_instances() {
    let tmp = TempDir::new().unwrap();
    let (corpus, metadata, vectors) = sample();
    IndexStore::new(tmp.path()).save(&corpus, &metadata, &vectors).unwrap();
    let reopened = IndexStore::new(tmp.path());
    assert_eq!(reopened.generation(), 1);
    let manifest = reopened.save(&corpus, &metadata, &vectors).unwrap();
    assert_eq!(manifest.generation, 2);
}

#[test]
fn misaligned_save_is_refused_and_previous_state_kept() {
    let tmp = TempDir::new().unwrap();
    let store = IndexStore::new(tmp.path());
    let (corpus, metadata, vectors) = sample();
    store.save(&corpus, &metadata, &vectors).unwrap();

    let mut longer = corpus.clone();
    longer.push("gamma three".to_string());
    assert!(store.save(&longer, &metadata, &vectors).is_err());

    let loaded = store.load();
    assert_eq!(loaded.corpus, corpus);
    assert_eq!(store.generation(), 1);
}

#[test]
fn missing_vector_artifact_degrades_to_empty_index() {
    let tmp = TempDir::new().unwrap();
    let store = IndexStore::new(tmp.path());
    let (corpus, metadata, vectors) = sample();
    store.save(&corpus, &metadata, &vectors).unwrap();
    fs::remove_file(store.generation_dir(1).join(VECTORS_FILE)).unwrap();

    let loaded = store.load();
    assert_eq!(loaded.corpus.len(), 2);
    assert_eq!(loaded.metadata.len(), 2);
    assert_eq!(loaded.vectors.count(), 0);
    assert!(!loaded.is_aligned());
    assert!(loaded.issues.iter().any(|i| i.contains(VECTORS_FILE)));
}

#[test]
fn corrupt_artifacts_are_reported_not_fatal() {
    let tmp = TempDir::new().unwrap();
    let store = IndexStore::new(tmp.path());
    let (corpus, metadata, vectors) = sample();
    store.save(&corpus, &metadata, &vectors).unwrap();
    let live = store.generation_dir(1);
    fs::write(live.join(METADATA_FILE), b"{ not json").unwrap();
    fs::write(live.join(VECTORS_FILE), b"garbage").unwrap();

    let loaded = store.load();
    assert_eq!(loaded.corpus, corpus);
    assert!(loaded.metadata.is_empty());
    assert_eq!(loaded.vectors.count(), 0);
    assert_eq!(loaded.issues.len(), 2, "{:?}", loaded.issues);
}

#[test]
fn manifest_count_disagreement_is_reported() {
    let tmp = TempDir::new().unwrap();
    let store = IndexStore::new(tmp.path());
    let (corpus, metadata, vectors) = sample();
    store.save(&corpus, &metadata, &vectors).unwrap();
    fs::write(store.generation_dir(1).join(CORPUS_FILE), br#"["alpha one"]"#).unwrap();

    let loaded = store.load();
    assert_eq!(loaded.corpus.len(), 1);
    assert!(loaded.issues.iter().any(|i| i.contains("manifest")));
    assert!(tmp.path().join(MANIFEST_FILE).exists());
}

#[test]
fn misnumbered_metadata_is_cut_at_first_gap() {
    let tmp = TempDir::new().unwrap();
    let store = IndexStore::new(tmp.path());
    let (corpus, mut metadata, vectors) = sample();
    store.save(&corpus, &metadata, &vectors).unwrap();
    metadata[1].global_index = 7;
    fs::write(store.generation_dir(1).join(METADATA_FILE), serde_json::to_vec(&metadata).unwrap()).unwrap();

    let loaded = store.load();
    assert_eq!(loaded.metadata.len(), 1);
    assert_eq!(loaded.issues.len(), 1, "{:?}", loaded.issues);
}

#[test]
fn superseded_generations_are_pruned() {
    let tmp = TempDir::new().unwrap();
    let store = IndexStore::new(tmp.path());
    let (corpus, metadata, vectors) = sample();
    store.save(&corpus, &metadata, &vectors).unwrap();
    store.save(&corpus, &metadata, &vectors).unwrap();

    assert!(!store.generation_dir(1).exists());
    assert!(store.generation_dir(2).join(VECTORS_FILE).exists());
    assert_eq!(store.load().corpus, corpus);
}

#[test]
fn failed_artifact_rename_keeps_previous_generation_live() {
    let tmp = TempDir::new().unwrap();
    let store = IndexStore::new(tmp.path());
    let (corpus, metadata, vectors) = sample();
    store.save(&corpus, &metadata, &vectors).unwrap();

    // corpus and metadata land in generation 2, then the vectors rename hits a directory
    fs::create_dir_all(store.generation_dir(2).join(VECTORS_FILE).join("occupied")).unwrap();
    let mut corpus_b = corpus.clone();
    corpus_b.push("gamma three".to_string());
    let mut metadata_b = metadata.clone();
    metadata_b.push(record(2, "c"));
    let mut vectors_b = vectors.clone();
    vectors_b.add(&[vec![0.0, 0.0, 1.0]]).unwrap();

    let err = store.save(&corpus_b, &metadata_b, &vectors_b).unwrap_err();
    assert!(matches!(err, ragdb_core::Error::Persistence { .. }), "{err}");
    assert_eq!(store.generation(), 1);
    assert!(!store.generation_dir(2).exists(), "unpublished generation is discarded");

    let reopened = IndexStore::new(tmp.path());
    assert_eq!(reopened.generation(), 1);
    let loaded = reopened.load();
    assert_eq!(loaded.corpus, corpus);
    assert_eq!(loaded.metadata, metadata);
    assert_eq!(loaded.vectors, vectors);
    assert!(loaded.issues.is_empty(), "{:?}", loaded.issues);
    let leftovers: Vec<_> = walkdir::WalkDir::new(tmp.path())
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
        .collect();
    assert!(leftovers.is_empty(), "{leftovers:?}");
}

#[test]
fn unreadable_manifest_falls_back_to_newest_generation() {
    let tmp = TempDir::new().unwrap();
    let store = IndexStore::new(tmp.path());
    let (corpus, metadata, vectors) = sample();
    store.save(&corpus, &metadata, &vectors).unwrap();
    fs::write(tmp.path().join(MANIFEST_FILE), b"not a manifest").unwrap();

    let reopened = IndexStore::new(tmp.path());
    assert_eq!(reopened.generation(), 1);
    let loaded = reopened.load();
    assert!(loaded.manifest.is_none());
    assert_eq!(loaded.corpus, corpus);
    assert!(loaded.is_aligned());
    assert!(loaded.issues.iter().any(|i| i.contains("falling back to generation 1")), "{:?}", loaded.issues);
}
