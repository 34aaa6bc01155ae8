//! Tests for BulkIngestor

use std::path::PathBuf;
use std::sync::Arc;

use tempfile::TempDir;

use guidwire::application::services::BulkIngestor;
use guidwire::infrastructure::traits::{PlainTextExtractor, RealFileSystem};

fn ingestor() -> BulkIngestor {
    guidwire::util::testing::init_test_setup();
    BulkIngestor::new(Arc::new(RealFileSystem), Arc::new(PlainTextExtractor))
}

fn write_doc(root: &TempDir, rel: &str, content: &str) -> PathBuf {
    let path = root.path().join(rel);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).ok();
    }
    std::fs::write(&path, content).expect("write doc");
    path
}

#[test]
fn given_mixed_folder_when_scanning_then_only_supported_documents_sorted() {
    let source = TempDir::new().unwrap();
    write_doc(&source, "Printers/jams.txt", "paper jam");
    write_doc(&source, "Email/outlook.docx", "binary-ish");
    write_doc(&source, "cables.txt", "loose cable");

    let documents = ingestor().scan(source.path()).unwrap();

    let rels: Vec<String> = documents
        .iter()
        .map(|d| d.rel_path.to_string_lossy().to_string())
        .collect();
    assert_eq!(rels, vec!["Printers/jams.txt", "cables.txt"]);
}

#[test]
fn given_missing_root_when_scanning_then_errors() {
    let result = ingestor().scan(&PathBuf::from("/nonexistent/path"));
    assert!(result.is_err());
}

#[test]
fn given_source_folder_when_ingesting_then_copies_extracts_and_categorizes() {
    let source = TempDir::new().unwrap();
    let content = TempDir::new().unwrap();
    write_doc(&source, "Printers/jams.txt", "clear the paper path");
    write_doc(&source, "cables.txt", "reseat the cable");

    let manifest = ingestor()
        .ingest(source.path(), content.path(), |_, _, _| {})
        .unwrap();

    assert_eq!(manifest.len(), 2);
    let jams = &manifest["Printers/jams.txt"];
    assert_eq!(jams.category, "Printers");
    assert_eq!(jams.text, "clear the paper path");
    assert_eq!(jams.hash.len(), 64);
    assert!(jams.extract_error.is_none());
    assert!(content.path().join("docs/Printers/jams.txt").exists());

    assert_eq!(manifest["cables.txt"].category, "Uncategorized");
    assert!(content.path().join("manifest.json").exists());
}

#[test]
fn given_unchanged_documents_when_reingesting_then_skipped() {
    let source = TempDir::new().unwrap();
    let content = TempDir::new().unwrap();
    write_doc(&source, "cables.txt", "reseat the cable");

    let ingestor = ingestor();
    ingestor
        .ingest(source.path(), content.path(), |_, _, _| {})
        .unwrap();

    let mut messages = Vec::new();
    ingestor
        .ingest(source.path(), content.path(), |message, _, _| {
            messages.push(message.to_string());
        })
        .unwrap();

    assert!(messages.iter().any(|m| m.starts_with("Skipping (unchanged)")));
}

#[test]
fn given_modified_document_when_reingesting_then_reindexed() {
    let source = TempDir::new().unwrap();
    let content = TempDir::new().unwrap();
    write_doc(&source, "cables.txt", "reseat the cable");

    let ingestor = ingestor();
    let first = ingestor
        .ingest(source.path(), content.path(), |_, _, _| {})
        .unwrap();

    write_doc(&source, "cables.txt", "replace the cable");
    let second = ingestor
        .ingest(source.path(), content.path(), |_, _, _| {})
        .unwrap();

    assert_ne!(first["cables.txt"].hash, second["cables.txt"].hash);
    assert_eq!(second["cables.txt"].text, "replace the cable");
}

#[test]
fn given_progress_callback_when_ingesting_then_counts_cover_all_documents() {
    let source = TempDir::new().unwrap();
    let content = TempDir::new().unwrap();
    write_doc(&source, "a.txt", "a");
    write_doc(&source, "b.txt", "b");

    let mut seen = Vec::new();
    ingestor()
        .ingest(source.path(), content.path(), |_, current, total| {
            seen.push((current, total));
        })
        .unwrap();

    assert!(seen.iter().all(|&(_, total)| total == 2));
    assert!(seen.iter().any(|&(current, _)| current == 2));
}
