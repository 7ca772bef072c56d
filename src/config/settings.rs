use std::fs;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::util::DataDir;

pub use crate::block::DEFAULT_COPY_CHUNK_SIZE;

/// Example configuration file contents (bundled with the binary)
pub const EXAMPLE_CONFIG: &str = include_str!("config.toml.example");

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("copy_chunk_size must be greater than zero")]
    ZeroChunkSize,
}

/// Application configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Bytes copied per read when writing untouched records
    pub copy_chunk_size: usize,
    /// Trim every dump candidate to its final draw
    pub last_draw_only: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            copy_chunk_size: DEFAULT_COPY_CHUNK_SIZE,
            last_draw_only: false,
        }
    }
}

/// TOML representation of the `[rewrite]` section
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlRewriteConfig {
    pub copy_chunk_size: Option<usize>,
}

/// TOML representation of the `[candidates]` section
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlCandidatesConfig {
    pub last_draw_only: Option<bool>,
}

/// TOML representation of the config file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    pub rewrite: Option<TomlRewriteConfig>,
    pub candidates: Option<TomlCandidatesConfig>,
}

impl Config {
    /// Load `config.toml` from the data directory, merging with defaults.
    ///
    /// Writes the example config on first run. Unreadable or invalid files
    /// fall back to defaults with a warning.
    pub fn load(data_dir: &DataDir) -> Self {
        let config_file = data_dir.config_file();

        if !config_file.exists() {
            Self::create_default_config(&config_file);
        }

        match Self::load_from(&config_file) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(
                    path = %config_file.display(),
                    error = %e,
                    "Ignoring config file"
                );
                Config::default()
            }
        }
    }

    /// Load configuration from an explicit path. A missing file yields defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Config::default());
        }
        let contents = fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let toml_config: TomlConfig = toml::from_str(contents)?;
        let mut config = Config::default();

        if let Some(rewrite) = toml_config.rewrite {
            if let Some(chunk) = rewrite.copy_chunk_size {
                if chunk == 0 {
                    return Err(ConfigError::ZeroChunkSize);
                }
                config.copy_chunk_size = chunk;
            }
        }

        if let Some(candidates) = toml_config.candidates {
            if let Some(last_draw_only) = candidates.last_draw_only {
                config.last_draw_only = last_draw_only;
            }
        }

        Ok(config)
    }

    /// Create the default config file from the bundled example
    fn create_default_config(path: &Path) {
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                if let Err(e) = fs::create_dir_all(parent) {
                    tracing::debug!(error = %e, "Failed to create config directory");
                    return;
                }
            }
        }

        if let Err(e) = fs::write(path, EXAMPLE_CONFIG) {
            tracing::debug!(error = %e, "Failed to write default config");
        }
    }

    pub fn with_last_draw_only(mut self, last_draw_only: bool) -> Self {
        self.last_draw_only = last_draw_only;
        self
    }
}
