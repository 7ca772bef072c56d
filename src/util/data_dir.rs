//! The per-user directory capsplice keeps its config and logs in

use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

const DIR_NAME: &str = ".capsplice";
const CONFIG_FILE: &str = "config.toml";
const LOG_FILE: &str = "capsplice.log";

/// Resolved once per run and handed to whatever needs a path inside it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataDir {
    root: PathBuf,
}

impl DataDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// `--data-dir` when given, otherwise `~/.capsplice` (or `./.capsplice`
    /// without a home directory)
    pub fn resolve(custom: Option<PathBuf>) -> Self {
        let root = custom.unwrap_or_else(|| {
            dirs::home_dir()
                .map(|home| home.join(DIR_NAME))
                .unwrap_or_else(|| PathBuf::from(DIR_NAME))
        });
        Self::new(root)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_file(&self) -> PathBuf {
        self.root.join(CONFIG_FILE)
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.root.join("logs")
    }

    pub fn log_file(&self) -> PathBuf {
        self.logs_dir().join(LOG_FILE)
    }

    /// Open the log file for appending, creating `logs/` on first use
    pub fn open_log(&self) -> io::Result<File> {
        fs::create_dir_all(self.logs_dir())?;
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.log_file())
    }
}
