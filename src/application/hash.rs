//! Content hashing for incremental re-processing
//!
//! Ingest manifests store a SHA-256 digest per source document so that
//! unchanged documents are skipped on subsequent runs.

use sha2::{Digest, Sha256};
use std::path::Path;

use crate::application::{ApplicationError, ApplicationResult};

/// Hex SHA-256 digest of content.
pub fn content_hash(content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content);
    hex::encode(hasher.finalize())
}

/// Hex SHA-256 digest of file contents.
pub fn file_hash(path: &Path) -> ApplicationResult<String> {
    let content = std::fs::read(path).map_err(|e| ApplicationError::OperationFailed {
        context: format!("read file for hashing: {}", path.display()),
        source: Box::new(e),
    })?;
    Ok(content_hash(&content))
}
