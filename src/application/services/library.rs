//! Library catalog service
//!
//! A content folder bundles everything the offline viewer browses:
//! `library.json` (the catalog), `trees/` (validated tree documents), and
//! `docs/` (the ingested source documents).

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use itertools::Itertools;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::application::error_ext::IoResultExt;
use crate::application::services::ingest::{Manifest, ManifestEntry};
use crate::application::services::store::TreeStore;
use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::{DecisionTree, GraphValidator};
use crate::infrastructure::traits::{DocumentAnalyzer, FileSystem, SUPPORTED_EXTENSIONS};

/// Name of the catalog file inside a content folder.
pub const LIBRARY_FILE: &str = "library.json";

/// Name of the branding file the packaged viewer reads.
pub const BRANDING_FILE: &str = "config.json";

/// Sub-folder of a content folder holding generated tree documents.
pub const TREES_DIR: &str = "trees";

/// One browsable catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibraryEntry {
    pub title: String,
    pub description: String,
    pub category: String,
    /// Tree document path, relative to the content folder
    pub tree_file: String,
    /// Source document path, relative to the content folder
    pub source_doc: String,
    #[serde(default)]
    pub symptoms: Vec<String>,
}

/// The catalog the viewer browses and searches.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibraryCatalog {
    #[serde(default)]
    pub entries: Vec<LibraryEntry>,
}

impl LibraryCatalog {
    /// Sorted unique category names.
    pub fn categories(&self) -> Vec<String> {
        self.entries
            .iter()
            .map(|e| e.category.clone())
            .unique()
            .sorted()
            .collect()
    }

    /// Entries belonging to `category`.
    pub fn entries_for(&self, category: &str) -> Vec<&LibraryEntry> {
        self.entries
            .iter()
            .filter(|e| e.category == category)
            .collect()
    }

    /// Case-insensitive keyword search over title, description, and symptoms.
    ///
    /// A blank query matches nothing.
    pub fn search(&self, query: &str) -> Vec<&LibraryEntry> {
        if query.trim().is_empty() {
            return Vec::new();
        }
        let q = query.to_lowercase();
        self.entries
            .iter()
            .filter(|e| {
                e.title.to_lowercase().contains(&q)
                    || e.description.to_lowercase().contains(&q)
                    || e.symptoms.iter().any(|s| s.to_lowercase().contains(&q))
            })
            .collect()
    }
}

/// Builds and opens tree libraries inside a content folder.
pub struct LibraryService {
    fs: Arc<dyn FileSystem>,
    content_dir: PathBuf,
}

impl LibraryService {
    pub fn new(fs: Arc<dyn FileSystem>, content_dir: PathBuf) -> Self {
        Self { fs, content_dir }
    }

    /// Load the catalog from `library.json`.
    pub fn open(&self) -> ApplicationResult<LibraryCatalog> {
        let path = self.content_dir.join(LIBRARY_FILE);
        if !self.fs.exists(&path) {
            return Err(ApplicationError::LibraryNotFound { path });
        }
        let content = self
            .fs
            .read_to_string(&path)
            .with_path_context("read catalog", &path)?;
        serde_json::from_str(&content).map_err(|source| ApplicationError::Json { path, source })
    }

    /// Load and validate the tree document behind a catalog entry.
    pub fn load_tree(&self, entry: &LibraryEntry) -> ApplicationResult<DecisionTree> {
        let path = self.content_dir.join(&entry.tree_file);
        TreeStore::new(self.fs.clone()).load(&path)
    }

    /// Generate a tree per manifest document and write `library.json`.
    ///
    /// Documents are processed grouped by category in sorted order. Entries
    /// with blank text, analyzer failures, and validation failures are
    /// skipped with a progress message; the run continues. Returns the path
    /// of the written catalog. `progress` receives `(message, current, total)`.
    pub fn build(
        &self,
        manifest: &Manifest,
        analyzer: &dyn DocumentAnalyzer,
        mut progress: impl FnMut(&str, usize, usize),
    ) -> ApplicationResult<PathBuf> {
        let trees_dir = self.content_dir.join(TREES_DIR);
        self.fs
            .create_dir_all(&trees_dir)
            .with_path_context("create trees directory", &trees_dir)?;

        let store = TreeStore::new(self.fs.clone());
        let sanitize = Regex::new(r"[^\w\-]").unwrap();

        // Group by category so progress walks the library in browse order.
        let mut by_category: BTreeMap<&str, Vec<(&String, &ManifestEntry)>> = BTreeMap::new();
        for (rel_str, entry) in manifest {
            by_category
                .entry(entry.category.as_str())
                .or_default()
                .push((rel_str, entry));
        }

        let total: usize = by_category.values().map(Vec::len).sum();
        let mut current = 0;
        let mut entries: Vec<LibraryEntry> = Vec::new();

        for (category, docs) in &by_category {
            for (rel_str, doc) in docs {
                current += 1;

                if doc.text.trim().is_empty() {
                    progress(
                        &format!("[{category}] Skipping (no text): {rel_str}"),
                        current,
                        total,
                    );
                    continue;
                }

                progress(&format!("[{category}] Analyzing: {rel_str}"), current, total);

                let raw = match analyzer.analyze(&doc.text) {
                    Ok(raw) => raw,
                    Err(e) => {
                        progress(&format!("  ✗ Analysis error ({e})"), current, total);
                        continue;
                    }
                };
                let tree = match GraphValidator::validate(&raw) {
                    Ok(tree) => tree,
                    Err(e) => {
                        progress(&format!("  ✗ Validation error ({e})"), current, total);
                        continue;
                    }
                };

                let tree_filename = format!("{}.json", safe_stem(rel_str, &sanitize));
                store.save(&tree, &trees_dir.join(&tree_filename))?;

                entries.push(LibraryEntry {
                    title: tree.title.clone(),
                    description: tree.description.clone(),
                    category: (*category).to_string(),
                    tree_file: format!("{TREES_DIR}/{tree_filename}"),
                    source_doc: format!("docs/{rel_str}"),
                    symptoms: Vec::new(),
                });
                progress(&format!("  ✓ Tree saved: {tree_filename}"), current, total);
            }
        }

        let library_path = self.content_dir.join(LIBRARY_FILE);
        let json = serde_json::to_string_pretty(&LibraryCatalog { entries }).map_err(|source| {
            ApplicationError::Json {
                path: library_path.clone(),
                source,
            }
        })?;
        self.fs
            .write(&library_path, &json)
            .with_path_context("write catalog", &library_path)?;

        debug!("library catalog written to {}", library_path.display());
        Ok(library_path)
    }

    /// Stamp the company name into the content folder for the viewer.
    pub fn write_branding(&self, company_name: &str) -> ApplicationResult<PathBuf> {
        let path = self.content_dir.join(BRANDING_FILE);
        let json = serde_json::to_string_pretty(&serde_json::json!({
            "company_name": company_name,
        }))
        .map_err(|source| ApplicationError::Json {
            path: path.clone(),
            source,
        })?;
        self.fs
            .ensure_parent(&path)
            .with_path_context("create content directory", &path)?;
        self.fs
            .write(&path, &json)
            .with_path_context("write branding", &path)?;
        Ok(path)
    }
}

/// Filesystem-safe file stem for a relative document path.
fn safe_stem(rel_str: &str, sanitize: &Regex) -> String {
    let stem = SUPPORTED_EXTENSIONS
        .iter()
        .find_map(|ext| rel_str.strip_suffix(&format!(".{ext}")))
        .unwrap_or(rel_str);
    sanitize.replace_all(stem, "_").into_owned()
}
