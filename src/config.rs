//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/guidwire/guidwire.toml`
//! 3. Environment variables: `GUIDWIRE_*` prefix

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::ApplicationError;

/// Unified configuration for guidwire.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Company name stamped into branded viewer content
    pub company_name: String,
    /// Content folder for library builds (manifest, docs, trees, catalog)
    pub content_dir: PathBuf,
    /// External analyzer command (document text on stdin, tree JSON on stdout)
    pub analyzer_cmd: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            company_name: "GuidWire".to_string(),
            content_dir: PathBuf::from("GuidWire_Content"),
            analyzer_cmd: None,
        }
    }
}

/// Raw settings for intermediate parsing (fields are Option to detect "not specified").
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub company_name: Option<String>,
    pub content_dir: Option<PathBuf>,
    pub analyzer_cmd: Option<String>,
}

/// Get the XDG config directory for guidwire.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "guidwire").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("guidwire.toml"))
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

impl Settings {
    /// Merge overlay config onto self (base): overlay wins if Some.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            company_name: overlay
                .company_name
                .clone()
                .unwrap_or_else(|| self.company_name.clone()),
            content_dir: overlay
                .content_dir
                .clone()
                .unwrap_or_else(|| self.content_dir.clone()),
            analyzer_cmd: overlay
                .analyzer_cmd
                .clone()
                .or_else(|| self.analyzer_cmd.clone()),
        }
    }

    /// Expand shell variables and tilde in path-like fields.
    ///
    /// Handles `~`, `$VAR`, and `${VAR}` syntax.
    fn expand_paths(&mut self) {
        let expanded = expand_env_vars(self.content_dir.to_string_lossy().as_ref());
        self.content_dir = PathBuf::from(expanded);
    }

    /// Load settings with layered precedence.
    pub fn load() -> Result<Self, ApplicationError> {
        // 1. Start with defaults
        let mut current = Self::default();

        // 2. Merge global config
        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                let raw = load_raw_settings(&global_path)?;
                current = current.merge_with(&raw);
            }
        }

        // 3. Apply environment variables (explicit override)
        current = Self::apply_env_overrides(current)?;

        current.expand_paths();
        Ok(current)
    }

    /// Apply GUIDWIRE_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let builder =
            Config::builder().add_source(Environment::with_prefix("GUIDWIRE").separator("__"));
        let config = builder.build().map_err(config_err)?;

        if let Ok(val) = config.get_string("company_name") {
            settings.company_name = val;
        }
        if let Ok(val) = config.get_string("content_dir") {
            settings.content_dir = PathBuf::from(val);
        }
        if let Ok(val) = config.get_string("analyzer_cmd") {
            settings.analyzer_cmd = Some(val);
        }

        Ok(settings)
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# guidwire configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/guidwire/guidwire.toml
#   Env:    GUIDWIRE_* environment variables (explicit overrides)

# Company name stamped into branded viewer content
# company_name = "GuidWire"

# Content folder for library builds (manifest, docs, trees, catalog)
# content_dir = "GuidWire_Content"

# External analyzer command. Receives the document text on stdin and must
# print a tree document as JSON on stdout.
# analyzer_cmd = "guidwire-analyze --model default"
"#
        .to_string()
    }
}

/// Expand environment variables in a path string.
///
/// Supports `$VAR`, `${VAR}`, and `~`. Uses shellexpand for robust expansion.
pub fn expand_env_vars(path: &str) -> String {
    shellexpand::full(path)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| path.to_string())
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}
