//! Service container for dependency injection
//!
//! Wires up services with their boundary dependencies.

use std::sync::Arc;

use crate::config::Settings;
use crate::infrastructure::traits::{
    AnalyzerError, CommandAnalyzer, FileSystem, PlainTextExtractor, RealFileSystem, TextExtractor,
};

/// Container holding the shared dependencies services are built from.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Filesystem abstraction
    pub fs: Arc<dyn FileSystem>,

    /// Document text extraction boundary
    pub extractor: Arc<dyn TextExtractor>,
}

impl ServiceContainer {
    /// Create a new service container with real implementations.
    pub fn new(settings: Settings) -> Self {
        Self::with_deps(
            settings,
            Arc::new(RealFileSystem),
            Arc::new(PlainTextExtractor),
        )
    }

    /// Create a service container with custom dependencies (for testing).
    pub fn with_deps(
        settings: Settings,
        fs: Arc<dyn FileSystem>,
        extractor: Arc<dyn TextExtractor>,
    ) -> Self {
        let settings = Arc::new(settings);

        Self {
            settings,
            fs,
            extractor,
        }
    }

    /// Build the configured analyzer, if any.
    pub fn analyzer(&self) -> Result<CommandAnalyzer, AnalyzerError> {
        let command = self
            .settings
            .analyzer_cmd
            .as_deref()
            .ok_or(AnalyzerError::NotConfigured)?;
        CommandAnalyzer::from_command_line(command)
    }
}
