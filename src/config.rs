//! Engine configuration
//!
//! Loaded from YAML. Every field has a default, so a partial file (or no
//! file at all) is valid.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Marker and traversal settings for a search engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Class carried by every highlight marker
    pub highlight_class: String,
    /// Class added to the marker of the current match
    pub current_class: String,
    /// Element used to wrap matched text
    pub marker_tag: String,
    /// Containers whose text is never searched (script/style equivalents)
    pub hidden_tags: Vec<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            highlight_class: "termlight-highlight".to_string(),
            current_class: "termlight-current-highlight".to_string(),
            marker_tag: "span".to_string(),
            hidden_tags: vec!["script".to_string(), "style".to_string()],
        }
    }
}

impl EngineConfig {
    /// Parse configuration from YAML text
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    /// Load configuration from a YAML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load from `path`, or from the default location when `path` is None
    ///
    /// A missing default file yields the defaults; an explicitly named file
    /// must exist.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => match default_config_path() {
                Some(path) if path.exists() => Self::load(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    /// Whether a tag names a non-rendered container
    pub fn is_hidden_tag(&self, tag: &str) -> bool {
        self.hidden_tags.iter().any(|t| t.eq_ignore_ascii_case(tag))
    }
}

/// Default config location (`<config dir>/termlight/config.yaml`)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("termlight").join("config.yaml"))
}
