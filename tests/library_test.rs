//! Tests for the library catalog service

use std::path::PathBuf;
use std::sync::Arc;

use serde_json::json;
use tempfile::TempDir;

use guidwire::application::services::ingest::{Manifest, ManifestEntry};
use guidwire::application::services::LibraryService;
use guidwire::application::ApplicationError;
use guidwire::infrastructure::traits::{AnalyzerError, DocumentAnalyzer, RealFileSystem};

/// Canned analyzer: returns a two-node tree titled after the document text,
/// an invalid tree for "broken" documents, and an error for "garbage".
struct StubAnalyzer;

impl DocumentAnalyzer for StubAnalyzer {
    fn analyze(&self, text: &str) -> Result<guidwire::domain::RawTreeDocument, AnalyzerError> {
        if text.contains("garbage") {
            return Err(AnalyzerError::InvalidResponse {
                reason: "expected value".to_string(),
                snippet: text.chars().take(20).collect(),
            });
        }
        let nodes = if text.contains("broken") {
            json!([ { "id": "start", "type": "step", "text": "Go", "next": "ghost" } ])
        } else {
            json!([
                { "id": "start", "type": "question", "text": "Seen this before?",
                  "options": [
                      { "label": "Yes", "next": "fix" },
                      { "label": "No", "next": "fix" }
                  ] },
                { "id": "fix", "type": "resolution", "text": "Apply the fix" }
            ])
        };
        Ok(serde_json::from_value(json!({
            "title": format!("Guide: {}", text.trim()),
            "description": "How to resolve it",
            "nodes": nodes
        }))
        .unwrap())
    }
}

fn manifest_entry(category: &str, text: &str) -> ManifestEntry {
    ManifestEntry {
        hash: "0".repeat(64),
        dest: PathBuf::from("docs/x.txt"),
        category: category.to_string(),
        text: text.to_string(),
        size: text.len() as u64,
        extract_error: None,
    }
}

fn service(content: &TempDir) -> LibraryService {
    LibraryService::new(Arc::new(RealFileSystem), content.path().to_path_buf())
}

#[test]
fn given_manifest_when_building_then_trees_and_catalog_written() {
    let content = TempDir::new().unwrap();
    let mut manifest = Manifest::new();
    manifest.insert(
        "Printers/jams.txt".to_string(),
        manifest_entry("Printers", "paper jams"),
    );
    manifest.insert(
        "cables.txt".to_string(),
        manifest_entry("Uncategorized", "loose cable"),
    );

    let library_path = service(&content)
        .build(&manifest, &StubAnalyzer, |_, _, _| {})
        .unwrap();

    assert_eq!(library_path, content.path().join("library.json"));
    assert!(content.path().join("trees/Printers_jams.json").exists());
    assert!(content.path().join("trees/cables.json").exists());

    let catalog = service(&content).open().unwrap();
    assert_eq!(catalog.entries.len(), 2);
    assert_eq!(catalog.categories(), vec!["Printers", "Uncategorized"]);
    let jams = catalog
        .entries
        .iter()
        .find(|e| e.tree_file == "trees/Printers_jams.json")
        .unwrap();
    assert_eq!(jams.title, "Guide: paper jams");
    assert_eq!(jams.source_doc, "docs/Printers/jams.txt");
    assert!(jams.symptoms.is_empty());
}

#[test]
fn given_failing_documents_when_building_then_skipped_but_run_continues() {
    let content = TempDir::new().unwrap();
    let mut manifest = Manifest::new();
    manifest.insert("ok.txt".to_string(), manifest_entry("A", "fine document"));
    manifest.insert("bad.txt".to_string(), manifest_entry("A", "garbage input"));
    manifest.insert("odd.txt".to_string(), manifest_entry("A", "broken tree"));
    manifest.insert("empty.txt".to_string(), manifest_entry("A", "   "));

    let mut messages = Vec::new();
    service(&content)
        .build(&manifest, &StubAnalyzer, |message, _, _| {
            messages.push(message.to_string());
        })
        .unwrap();

    let catalog = service(&content).open().unwrap();
    assert_eq!(catalog.entries.len(), 1);
    assert_eq!(catalog.entries[0].title, "Guide: fine document");
    assert!(messages.iter().any(|m| m.contains("Analysis error")));
    assert!(messages.iter().any(|m| m.contains("Validation error")));
    assert!(messages.iter().any(|m| m.contains("Skipping (no text)")));
}

#[test]
fn given_built_library_when_loading_entry_tree_then_validated_tree_returned() {
    let content = TempDir::new().unwrap();
    let mut manifest = Manifest::new();
    manifest.insert("ok.txt".to_string(), manifest_entry("A", "fine document"));
    service(&content)
        .build(&manifest, &StubAnalyzer, |_, _, _| {})
        .unwrap();
    let catalog = service(&content).open().unwrap();

    let tree = service(&content).load_tree(&catalog.entries[0]).unwrap();

    assert_eq!(tree.title, "Guide: fine document");
    assert_eq!(tree.len(), 2);
}

#[test]
fn given_company_name_when_writing_branding_then_viewer_config_written() {
    let content = TempDir::new().unwrap();

    let path = service(&content).write_branding("ForgedFiber").unwrap();

    assert_eq!(path, content.path().join("config.json"));
    let value: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(value["company_name"], "ForgedFiber");
}

#[test]
fn given_missing_catalog_when_opening_then_library_not_found() {
    let content = TempDir::new().unwrap();

    let err = service(&content).open().unwrap_err();

    assert!(matches!(err, ApplicationError::LibraryNotFound { .. }));
}

#[test]
fn given_catalog_when_searching_then_matches_title_description_and_symptoms() {
    let content = TempDir::new().unwrap();
    let mut manifest = Manifest::new();
    manifest.insert("ok.txt".to_string(), manifest_entry("A", "printer woes"));
    service(&content)
        .build(&manifest, &StubAnalyzer, |_, _, _| {})
        .unwrap();
    let catalog = service(&content).open().unwrap();

    assert_eq!(catalog.search("PRINTER").len(), 1);
    assert_eq!(catalog.search("resolve").len(), 1); // description hit
    assert!(catalog.search("unrelated").is_empty());
    assert!(catalog.search("").is_empty());
}
