//! I/O boundary traits for testability
//!
//! These traits abstract external I/O operations, allowing services
//! to be tested with mock implementations.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::domain::RawTreeDocument;

/// Filesystem abstraction for testability.
pub trait FileSystem: Send + Sync {
    /// Read file contents to string.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Write string content to file.
    fn write(&self, path: &Path, content: &str) -> io::Result<()>;

    /// Check if path exists.
    fn exists(&self, path: &Path) -> bool;

    /// Check if path is a file.
    fn is_file(&self, path: &Path) -> bool;

    /// Check if path is a directory.
    fn is_dir(&self, path: &Path) -> bool;

    /// Create directory and all parent directories.
    fn create_dir_all(&self, path: &Path) -> io::Result<()>;

    /// Copy file from source to destination.
    fn copy(&self, from: &Path, to: &Path) -> io::Result<u64>;

    /// Create parent directories if needed.
    fn ensure_parent(&self, path: &Path) -> io::Result<()>;
}

/// Real filesystem implementation.
#[derive(Debug, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn write(&self, path: &Path, content: &str) -> io::Result<()> {
        std::fs::write(path, content)
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        std::fs::create_dir_all(path)
    }

    fn copy(&self, from: &Path, to: &Path) -> io::Result<u64> {
        std::fs::copy(from, to)
    }

    fn ensure_parent(&self, path: &Path) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                self.create_dir_all(parent)?;
            }
        }
        Ok(())
    }
}

/// Error extracting plain text from a document.
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("file not found: {0}")]
    NotFound(PathBuf),

    #[error("unsupported file format: '{extension}'. Supported formats are: {}",
        SUPPORTED_EXTENSIONS.join(", "))]
    UnsupportedFormat { path: PathBuf, extension: String },

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Document extensions the plain-text extractor accepts.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["txt"];

/// Extracts plain text from a document file.
///
/// Rich formats (docx, pdf, html) are handled by external tooling before
/// documents reach this system; the boundary only needs to hand over text.
pub trait TextExtractor: Send + Sync {
    fn extract(&self, path: &Path) -> Result<String, ExtractError>;
}

/// Extractor for plain-text documents.
#[derive(Debug, Default)]
pub struct PlainTextExtractor;

impl TextExtractor for PlainTextExtractor {
    fn extract(&self, path: &Path) -> Result<String, ExtractError> {
        if !path.exists() {
            return Err(ExtractError::NotFound(path.to_path_buf()));
        }

        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        if !SUPPORTED_EXTENSIONS.contains(&extension.as_str()) {
            return Err(ExtractError::UnsupportedFormat {
                path: path.to_path_buf(),
                extension,
            });
        }

        // Tolerate stray non-UTF-8 bytes rather than rejecting the document.
        let bytes = std::fs::read(path).map_err(|source| ExtractError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

/// Error from the external analyzer boundary.
#[derive(Error, Debug)]
pub enum AnalyzerError {
    #[error("no analyzer command configured (set analyzer_cmd in config or GUIDWIRE_ANALYZER_CMD)")]
    NotConfigured,

    #[error("analyzer command failed: {message}")]
    Command {
        message: String,
        exit_code: Option<i32>,
    },

    #[error("analyzer returned a response that could not be parsed as JSON: {reason}\nResponse (first 500 chars):\n{snippet}")]
    InvalidResponse { reason: String, snippet: String },
}

/// Turns extracted document text into a raw tree document.
///
/// Opaque service boundary; retry and timeout policy live with the caller's
/// dispatcher, not here.
pub trait DocumentAnalyzer: Send + Sync {
    fn analyze(&self, text: &str) -> Result<RawTreeDocument, AnalyzerError>;
}

/// Analyzer that shells out to a configured command.
///
/// The command receives the document text on stdin and must print a tree
/// document as JSON on stdout.
#[derive(Debug, Clone)]
pub struct CommandAnalyzer {
    program: String,
    args: Vec<String>,
}

impl CommandAnalyzer {
    /// Build from a whitespace-separated command line.
    pub fn from_command_line(command: &str) -> Result<Self, AnalyzerError> {
        let mut parts = command.split_whitespace().map(str::to_string);
        let program = parts.next().ok_or(AnalyzerError::NotConfigured)?;
        Ok(Self {
            program,
            args: parts.collect(),
        })
    }
}

impl DocumentAnalyzer for CommandAnalyzer {
    fn analyze(&self, text: &str) -> Result<RawTreeDocument, AnalyzerError> {
        use std::io::Write;
        use std::process::{Command, Stdio};

        let spawn = || -> io::Result<std::process::Output> {
            let mut child = Command::new(&self.program)
                .args(&self.args)
                .stdin(Stdio::piped())
                .stdout(Stdio::piped())
                .stderr(Stdio::piped())
                .spawn()?;
            if let Some(mut stdin) = child.stdin.take() {
                stdin.write_all(text.as_bytes())?;
            }
            child.wait_with_output()
        };

        let output = spawn().map_err(|e| AnalyzerError::Command {
            message: format!("{}: {}", self.program, e),
            exit_code: None,
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(AnalyzerError::Command {
                message: stderr.trim().chars().take(500).collect(),
                exit_code: output.status.code(),
            });
        }

        parse_tree_response(&String::from_utf8_lossy(&output.stdout))
    }
}

/// Parse an analyzer response into a raw tree document.
///
/// Strips surrounding markdown code fences first; models include them
/// despite instructions.
pub fn parse_tree_response(response: &str) -> Result<RawTreeDocument, AnalyzerError> {
    let body = strip_code_fences(response.trim());
    serde_json::from_str(body).map_err(|e| AnalyzerError::InvalidResponse {
        reason: e.to_string(),
        snippet: body.chars().take(500).collect(),
    })
}

fn strip_code_fences(response: &str) -> &str {
    let Some(rest) = response.strip_prefix("```") else {
        return response;
    };
    // Drop the fence line (``` or ```json), then a trailing fence if present.
    let body = match rest.split_once('\n') {
        Some((_, body)) => body,
        None => return response,
    };
    let body = body.trim_end();
    body.strip_suffix("```").map(str::trim_end).unwrap_or(body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_fenced_json_when_parsing_response_then_fences_are_stripped() {
        let response = "```json\n{\"title\": \"T\", \"nodes\": []}\n```";

        let doc = parse_tree_response(response).unwrap();

        assert_eq!(doc.title.as_deref(), Some("T"));
        assert_eq!(doc.nodes.as_deref(), Some(&[][..]));
    }

    #[test]
    fn given_bare_json_when_parsing_response_then_passes_through() {
        let doc = parse_tree_response("{\"title\": \"T\"}").unwrap();
        assert_eq!(doc.title.as_deref(), Some("T"));
    }

    #[test]
    fn given_non_json_response_when_parsing_then_error_carries_snippet() {
        let err = parse_tree_response("I could not find any workflows.").unwrap_err();

        match err {
            AnalyzerError::InvalidResponse { snippet, .. } => {
                assert!(snippet.starts_with("I could not"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn given_unsupported_extension_when_extracting_then_error_names_format() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.docx");
        std::fs::write(&path, b"x").unwrap();

        let err = PlainTextExtractor.extract(&path).unwrap_err();

        assert!(matches!(
            err,
            ExtractError::UnsupportedFormat { extension, .. } if extension == "docx"
        ));
    }

    #[test]
    fn given_txt_file_when_extracting_then_returns_contents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.txt");
        std::fs::write(&path, "hello\nworld").unwrap();

        assert_eq!(PlainTextExtractor.extract(&path).unwrap(), "hello\nworld");
    }
}
