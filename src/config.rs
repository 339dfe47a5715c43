//! Generator Configuration
//!
//! Parses and validates the lane config, by default at
//! `.relman/relman.toml`. The config names the product, the built binary,
//! the download URL templates, and the paths of the persisted documents.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Configuration for one generator invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Product name used in archive file names.
    pub product: String,

    /// Path to the built binary to package.
    pub binary_path: PathBuf,

    /// TOML build manifest the current version is read from.
    #[serde(default = "default_build_manifest")]
    pub build_manifest: PathBuf,

    /// Download URL templates; `{version}` and `{name}` are substituted.
    /// Order is priority order: the first expanded URL is the preferred
    /// mirror.
    pub url_templates: Vec<String>,

    /// History catalog document.
    #[serde(default = "default_history_path")]
    pub history_path: PathBuf,

    /// Published manifest document.
    #[serde(default = "default_manifest_path")]
    pub manifest_path: PathBuf,

    /// Release cache document.
    #[serde(default = "default_cache_path")]
    pub release_cache_path: PathBuf,

    /// Directory where packaged archives are written (default: next to
    /// the binary).
    pub archive_dir: Option<PathBuf>,

    /// Publish directory; copies are skipped when unset or absent.
    pub publish_dir: Option<PathBuf>,

    /// Target OS string in artifact names (default: the build host).
    #[serde(default = "default_os")]
    pub os: String,

    /// Target architecture string in artifact names (default: the build
    /// host).
    #[serde(default = "default_arch")]
    pub arch: String,
}

fn default_build_manifest() -> PathBuf {
    PathBuf::from("Cargo.toml")
}

fn default_history_path() -> PathBuf {
    PathBuf::from(".relman/update_db.json")
}

fn default_manifest_path() -> PathBuf {
    PathBuf::from(".relman/update.json")
}

fn default_cache_path() -> PathBuf {
    PathBuf::from(".relman/release_cache.json")
}

fn default_os() -> String {
    std::env::consts::OS.to_string()
}

fn default_arch() -> String {
    std::env::consts::ARCH.to_string()
}

/// Errors that can occur when loading or validating the config.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    NotFound(PathBuf),

    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

impl GeneratorConfig {
    /// Default config file location.
    pub fn default_path() -> PathBuf {
        PathBuf::from(".relman/relman.toml")
    }

    /// Load and validate the config from a specific path.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse and validate config from TOML text.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: GeneratorConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Where packaged archives are written for this config.
    pub fn effective_archive_dir(&self) -> PathBuf {
        match &self.archive_dir {
            Some(dir) => dir.clone(),
            None => self
                .binary_path
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from(".")),
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.product.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "product".to_string(),
                reason: "must not be empty".to_string(),
            });
        }

        if self.url_templates.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "url_templates".to_string(),
                reason: "at least one download URL template is required".to_string(),
            });
        }

        for template in &self.url_templates {
            if template.is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: "url_templates".to_string(),
                    reason: "templates must not be empty strings".to_string(),
                });
            }
        }

        Ok(())
    }
}
