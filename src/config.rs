//! Configuration file and command-line options.

use clap::Parser;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid config file {path}: {source}")]
    Toml {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Could not determine a home directory for config and data files")]
    NoHomeDirectory,
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// A terminal to-do list that saves itself after every change.
#[derive(Debug, Clone, Default, Parser)]
#[command(name = "ttodo", version, about)]
pub struct Cli {
    /// Path to the config file
    #[arg(long, env = "TTODO_CONFIG")]
    pub config: Option<PathBuf>,

    /// Directory the item list is stored in
    #[arg(long, env = "TTODO_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long)]
    pub verbose: bool,

    /// Write logs to this file instead of the data directory
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageSettings,

    #[serde(default)]
    pub logging: LoggingSettings,

    #[serde(default)]
    pub ui: UiSettings,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageSettings {
    /// Defaults to the platform data directory.
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_level")]
    pub level: String,

    /// Defaults to `ttodo.log` inside the data directory.
    #[serde(default)]
    pub file: Option<PathBuf>,
}

fn default_level() -> String {
    "info".to_string()
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_level(),
            file: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiSettings {
    #[serde(default = "default_tick_rate_ms")]
    pub tick_rate_ms: u64,
}

/// Lower bound for `ui.tick_rate_ms`; a zero poll timeout spins the CPU.
pub const MIN_TICK_RATE_MS: u64 = 10;

fn default_tick_rate_ms() -> u64 {
    100
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            tick_rate_ms: default_tick_rate_ms(),
        }
    }
}

impl Config {
    /// Loads the config named by `--config`, or the default config file if
    /// it exists, then applies the remaining command-line overrides.
    pub fn resolve(cli: &Cli) -> Result<Self> {
        let mut config = match &cli.config {
            Some(path) => Self::load(path)?,
            None => match default_config_path() {
                Some(path) if path.exists() => Self::load(&path)?,
                _ => Self::default(),
            },
        };
        config.apply_cli(cli);
        config.ui.tick_rate_ms = config.ui.tick_rate_ms.max(MIN_TICK_RATE_MS);
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content, path)
    }

    fn parse(content: &str, path: &Path) -> Result<Self> {
        toml::from_str(content).map_err(|source| ConfigError::Toml {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(dir) = &cli.data_dir {
            self.storage.data_dir = Some(dir.clone());
        }
        if cli.verbose {
            self.logging.level = "debug".to_string();
        }
        if let Some(file) = &cli.log_file {
            self.logging.file = Some(file.clone());
        }
    }

    pub fn data_dir(&self) -> Result<PathBuf> {
        match &self.storage.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => project_dirs()
                .map(|dirs| dirs.data_dir().to_path_buf())
                .ok_or(ConfigError::NoHomeDirectory),
        }
    }

    pub fn log_file(&self) -> Result<PathBuf> {
        match &self.logging.file {
            Some(file) => Ok(file.clone()),
            None => Ok(self.data_dir()?.join("ttodo.log")),
        }
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", "ttodo")
}

pub fn default_config_path() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.config_dir().join("config.toml"))
}
