//! Bulk document ingestion
//!
//! Scans a source folder for supported documents, copies them into the
//! content folder (mirroring the source structure), extracts plain text,
//! and maintains a hash-keyed manifest so unchanged documents are skipped
//! on subsequent runs.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;
use walkdir::WalkDir;

use crate::application::error_ext::IoResultExt;
use crate::application::hash::file_hash;
use crate::application::{ApplicationError, ApplicationResult};
use crate::infrastructure::traits::{FileSystem, TextExtractor, SUPPORTED_EXTENSIONS};

/// Name of the manifest file inside a content folder.
pub const MANIFEST_FILE: &str = "manifest.json";

/// Sub-folder of a content folder that mirrors the source documents.
pub const DOCS_DIR: &str = "docs";

/// Category assigned to documents that sit directly in the source root.
pub const UNCATEGORIZED: &str = "Uncategorized";

/// A source document found by a scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedDocument {
    /// Absolute-ish path to the source file
    pub path: PathBuf,
    /// Path relative to the scanned root
    pub rel_path: PathBuf,
    /// File size in bytes
    pub size: u64,
}

/// Manifest record for one ingested document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    /// SHA-256 digest of the source file at ingest time
    pub hash: String,
    /// Where the copy lives inside the content folder
    pub dest: PathBuf,
    /// Top-level source sub-folder, or [`UNCATEGORIZED`]
    pub category: String,
    /// Extracted plain text (empty when extraction failed)
    pub text: String,
    /// Source file size in bytes
    pub size: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extract_error: Option<String>,
}

/// Ingest manifest, keyed by relative source path.
pub type Manifest = BTreeMap<String, ManifestEntry>;

/// Scans source folders and maintains the content manifest.
pub struct BulkIngestor {
    fs: Arc<dyn FileSystem>,
    extractor: Arc<dyn TextExtractor>,
}

impl BulkIngestor {
    pub fn new(fs: Arc<dyn FileSystem>, extractor: Arc<dyn TextExtractor>) -> Self {
        Self { fs, extractor }
    }

    /// Find all supported documents under `root`, sorted by relative path.
    pub fn scan(&self, root: &Path) -> ApplicationResult<Vec<ScannedDocument>> {
        if !self.fs.is_dir(root) {
            return Err(ApplicationError::NotADirectory(root.to_path_buf()));
        }

        let mut documents = Vec::new();
        for entry in WalkDir::new(root).sort_by_file_name() {
            let entry = entry.with_path_context("scan", root)?;
            if !entry.file_type().is_file() {
                continue;
            }
            let extension = entry
                .path()
                .extension()
                .and_then(|e| e.to_str())
                .unwrap_or_default()
                .to_ascii_lowercase();
            if !SUPPORTED_EXTENSIONS.contains(&extension.as_str()) {
                continue;
            }

            let rel_path = entry
                .path()
                .strip_prefix(root)
                .map_err(|e| ApplicationError::OperationFailed {
                    context: format!("relativize {}", entry.path().display()),
                    source: Box::new(e),
                })?
                .to_path_buf();
            let size = entry
                .metadata()
                .with_path_context("stat", entry.path())?
                .len();

            documents.push(ScannedDocument {
                path: entry.path().to_path_buf(),
                rel_path,
                size,
            });
        }

        documents.sort_by(|a, b| a.rel_path.cmp(&b.rel_path));
        debug!("scan found {} documents under {}", documents.len(), root.display());
        Ok(documents)
    }

    /// Copy documents into `content_dir/docs/`, extract text, and update
    /// the manifest. Documents whose hash is unchanged are skipped.
    ///
    /// Extraction failures are recorded per entry without aborting the run.
    /// `progress` receives `(message, current, total)`.
    pub fn ingest(
        &self,
        root: &Path,
        content_dir: &Path,
        mut progress: impl FnMut(&str, usize, usize),
    ) -> ApplicationResult<Manifest> {
        let docs_dir = content_dir.join(DOCS_DIR);
        self.fs
            .create_dir_all(&docs_dir)
            .with_path_context("create docs directory", &docs_dir)?;

        let manifest_path = content_dir.join(MANIFEST_FILE);
        let mut manifest = self.load_manifest(&manifest_path);

        let documents = self.scan(root)?;
        let total = documents.len();

        for (idx, doc) in documents.iter().enumerate() {
            let current = idx + 1;
            let rel_str = doc.rel_path.to_string_lossy().to_string();

            let hash = file_hash(&doc.path)?;
            if manifest.get(&rel_str).map(|e| e.hash.as_str()) == Some(hash.as_str()) {
                progress(&format!("Skipping (unchanged): {rel_str}"), current, total);
                continue;
            }

            progress(&format!("Copying: {rel_str}"), current, total);
            let dest = docs_dir.join(&doc.rel_path);
            self.fs
                .ensure_parent(&dest)
                .with_path_context("create destination directory", &dest)?;
            self.fs
                .copy(&doc.path, &dest)
                .with_path_context("copy document", &doc.path)?;

            let (text, extract_error) = match self.extractor.extract(&doc.path) {
                Ok(text) => (text, None),
                Err(e) => (String::new(), Some(e.to_string())),
            };

            manifest.insert(
                rel_str.clone(),
                ManifestEntry {
                    hash,
                    dest,
                    category: category_of(&doc.rel_path),
                    text,
                    size: doc.size,
                    extract_error,
                },
            );
            progress(&format!("Indexed: {rel_str}"), current, total);
        }

        let json = serde_json::to_string_pretty(&manifest).map_err(|source| {
            ApplicationError::Json {
                path: manifest_path.clone(),
                source,
            }
        })?;
        self.fs
            .ensure_parent(&manifest_path)
            .with_path_context("create content directory", &manifest_path)?;
        self.fs
            .write(&manifest_path, &json)
            .with_path_context("write manifest", &manifest_path)?;

        Ok(manifest)
    }

    /// Load an existing manifest for incremental processing.
    ///
    /// A missing or corrupt manifest starts the run from scratch.
    pub fn load_manifest(&self, manifest_path: &Path) -> Manifest {
        if !self.fs.exists(manifest_path) {
            return Manifest::new();
        }
        self.fs
            .read_to_string(manifest_path)
            .ok()
            .and_then(|content| serde_json::from_str(&content).ok())
            .unwrap_or_default()
    }
}

/// Category of a document: its top-level sub-folder name.
fn category_of(rel_path: &Path) -> String {
    let mut components = rel_path.components();
    let first = components.next();
    match (first, components.next()) {
        (Some(folder), Some(_)) => folder.as_os_str().to_string_lossy().into_owned(),
        _ => UNCATEGORIZED.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_nested_path_when_deriving_category_then_top_folder_wins() {
        assert_eq!(category_of(Path::new("Printers/jams.txt")), "Printers");
        assert_eq!(category_of(Path::new("Printers/hp/jams.txt")), "Printers");
    }

    #[test]
    fn given_root_level_path_when_deriving_category_then_uncategorized() {
        assert_eq!(category_of(Path::new("jams.txt")), UNCATEGORIZED);
    }
}
