use std::fs;

use figment::providers::{Format, Toml};
use figment::Figment;
use tempfile::TempDir;

use docsearch_core::chunker::ChunkingConfig;
use docsearch_core::config::{expand_path, resolve_with_base, Config, Settings};
use docsearch_core::data_processor::DataProcessor;
use docsearch_core::error::Error;
use docsearch_core::store::{FsArtifactStore, InMemoryArtifactStore};
use docsearch_core::traits::ArtifactStore;
use docsearch_core::types::Chunk;

#[test]
fn extract_pages_keeps_source_numbering_and_skips_blank_pages() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("guide.txt");
    fs::write(&path, "  Intro page  \n\u{0c}\n   \n\u{0c}Third page\n\nwith two paragraphs\n").unwrap();

    let pages = DataProcessor::default().extract_pages(&path).expect("extract");
    assert_eq!(pages.len(), 2);
    assert_eq!(pages[0].page_number, 1);
    assert_eq!(pages[0].text, "Intro page");
    assert_eq!(pages[1].page_number, 3);
    assert!(pages[1].text.starts_with("Third page"));
    assert!(pages.iter().all(|p| p.source_name == "guide.txt"));
}

#[test]
fn extract_pages_rejects_unsupported_and_empty_documents() {
    let tmp = TempDir::new().unwrap();
    let pdf = tmp.path().join("scan.pdf");
    fs::write(&pdf, b"%PDF-1.7").unwrap();
    assert!(matches!(DataProcessor::default().extract_pages(&pdf), Err(Error::Input(_))));

    let blank = tmp.path().join("blank.txt");
    fs::write(&blank, "  \n\u{0c}\n\t").unwrap();
    assert!(matches!(DataProcessor::default().extract_pages(&blank), Err(Error::Input(_))));

    let missing = tmp.path().join("missing.txt");
    assert!(matches!(DataProcessor::default().extract_pages(&missing), Err(Error::Input(_))));
}

#[test]
fn processor_chunks_with_its_config() {
    let processor = DataProcessor::new(ChunkingConfig { chunk_size: 2, overlap: 1 });
    let pages = DataProcessor::pages_from_text("doc.txt", "AAAA BBBB.\n\nCCCC DDDD.");
    let chunks = processor.chunk_pages(&pages);
    assert_eq!(chunks.len(), 2);
    assert_eq!(chunks[1].text, "BBBB. CCCC DDDD.");
}

#[test]
fn chunk_json_uses_stable_field_names() {
    let chunk = Chunk { source_name: "a.txt".into(), page_number: 4, text: "hello".into() };
    let json = serde_json::to_value(&chunk).unwrap();
    assert_eq!(json, serde_json::json!({"source_name": "a.txt", "page_number": 4, "text": "hello"}));
}

#[test]
fn settings_defaults_and_overrides() {
    let config = Config::from_figment(
        Figment::new().merge(Toml::string("[retrieval]\ntop_k = 5\n[storage]\ndir = \"idx\"")),
        "test",
    );
    let settings = config.settings().expect("settings");
    assert_eq!(settings.retrieval.top_k, 5);
    assert_eq!(settings.retrieval.candidate_k, 8);
    assert_eq!(settings.chunking, ChunkingConfig::default());
    assert_eq!(settings.storage.dir, "idx");
    assert_eq!(config.get::<usize>("retrieval.top_k").unwrap(), 5);
}

#[test]
fn settings_validation_rejects_degenerate_values() {
    let mut s = Settings::default();
    assert!(s.validate().is_ok());
    s.chunking.overlap = s.chunking.chunk_size;
    assert!(matches!(s.validate(), Err(Error::InvalidConfig(_))));

    let mut s = Settings::default();
    s.retrieval.candidate_k = 0;
    assert!(matches!(s.validate(), Err(Error::InvalidConfig(_))));

    let prod = Config::from_figment(Figment::new().merge(Toml::string("[models]\nuse_fake = true")), "prod");
    assert!(matches!(prod.settings(), Err(Error::InvalidConfig(_))));
}

#[test]
fn relative_paths_resolve_against_base() {
    let base = std::path::Path::new("/srv/app");
    assert_eq!(resolve_with_base(base, "storage"), base.join("storage"));
    assert_eq!(resolve_with_base(base, "/var/lib/idx"), std::path::PathBuf::from("/var/lib/idx"));
    assert_eq!(expand_path("plain/dir"), std::path::PathBuf::from("plain/dir"));
}

#[test]
fn fs_store_round_trips_and_replaces_atomically() {
    let tmp = TempDir::new().unwrap();
    let store = FsArtifactStore::new(tmp.path().join("storage")).expect("store");

    assert_eq!(store.get("manifest.json").unwrap(), None);
    store.put("manifest.json", b"v1").unwrap();
    store.put("manifest.json", b"version-two").unwrap();
    assert_eq!(store.get("manifest.json").unwrap().as_deref(), Some(&b"version-two"[..]));

    // No staging files are left next to the artifact.
    let names: Vec<String> = fs::read_dir(store.dir())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    assert_eq!(names, vec!["manifest.json".to_string()]);

    store.delete("manifest.json").unwrap();
    store.delete("manifest.json").unwrap();
    assert_eq!(store.get("manifest.json").unwrap(), None);
}

#[test]
fn fs_store_rejects_path_like_keys() {
    let tmp = TempDir::new().unwrap();
    let store = FsArtifactStore::new(tmp.path()).unwrap();
    for key in ["", "..", "../escape", "nested/key", ".hidden"] {
        assert!(matches!(store.put(key, b"x"), Err(Error::Persistence { .. })), "key {key:?}");
    }
}

#[test]
fn in_memory_store_lists_keys() {
    let store = InMemoryArtifactStore::new();
    store.put("b", b"2").unwrap();
    store.put("a", b"1").unwrap();
    assert_eq!(store.keys(), vec!["a".to_string(), "b".to_string()]);
    store.delete("a").unwrap();
    assert_eq!(store.get("a").unwrap(), None);
}
