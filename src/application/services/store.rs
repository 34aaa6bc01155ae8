//! Tree persistence service
//!
//! Saves validated trees as pretty-printed JSON in the analyzer wire format
//! and loads them back through the validator (the validator is the only
//! constructor of a typed tree).

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use crate::application::error_ext::IoResultExt;
use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::{DecisionTree, GraphValidator, RawTreeDocument};
use crate::infrastructure::traits::FileSystem;

/// Persistence for validated decision trees.
pub struct TreeStore {
    fs: Arc<dyn FileSystem>,
}

impl TreeStore {
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self { fs }
    }

    /// Write `tree` to `path` as UTF-8 pretty-printed JSON.
    ///
    /// Parent directories are created as needed. Returns the written path.
    pub fn save(&self, tree: &DecisionTree, path: &Path) -> ApplicationResult<PathBuf> {
        let json =
            serde_json::to_string_pretty(&tree.to_raw()).map_err(|source| ApplicationError::Json {
                path: path.to_path_buf(),
                source,
            })?;

        self.fs
            .ensure_parent(path)
            .with_path_context("create parent directory", path)?;
        self.fs
            .write(path, &json)
            .with_path_context("write tree", path)?;

        debug!("saved tree '{}' to {}", tree.title, path.display());
        Ok(path.to_path_buf())
    }

    /// Read and validate the tree stored at `path`.
    pub fn load(&self, path: &Path) -> ApplicationResult<DecisionTree> {
        let content = self
            .fs
            .read_to_string(path)
            .with_path_context("read tree", path)?;

        let raw: RawTreeDocument =
            serde_json::from_str(&content).map_err(|source| ApplicationError::Json {
                path: path.to_path_buf(),
                source,
            })?;

        Ok(GraphValidator::validate(&raw)?)
    }
}
