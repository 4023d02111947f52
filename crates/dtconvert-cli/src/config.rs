//! Configuration file support.

use dtconvert_data::{DataOptions, SqlOptions};
use serde::Deserialize;
use std::path::PathBuf;

/// Main configuration structure.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Default CLI options.
    pub defaults: Defaults,
    /// Settings for `csv -> sql`.
    pub sql: SqlSection,
    /// Extra directories searched for relative converter references.
    pub search_paths: Vec<PathBuf>,
    /// Register the standard external edges (document and storage).
    pub builtin_externals: bool,
    /// Additional external converters, registered after the standard set.
    pub converters: Vec<ConverterEntry>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            defaults: Defaults::default(),
            sql: SqlSection::default(),
            search_paths: Vec::new(),
            builtin_externals: true,
            converters: Vec::new(),
        }
    }
}

/// Default CLI options.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Defaults {
    /// Enable verbose output by default.
    pub verbose: bool,
    /// Enable quiet output by default.
    pub quiet: bool,
    /// Overwrite existing output files by default.
    pub force: bool,
}

/// `[sql]` section.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SqlSection {
    pub table: String,
    pub create_table: bool,
}

impl Default for SqlSection {
    fn default() -> Self {
        let options = SqlOptions::default();
        Self {
            table: options.table,
            create_table: options.create_table,
        }
    }
}

/// An external converter declared in `[[converters]]`.
#[derive(Debug, Clone, Deserialize)]
pub struct ConverterEntry {
    pub from: String,
    pub to: String,
    /// Program to run, absolute or relative to the search roots.
    pub path: PathBuf,
    #[serde(default)]
    pub description: Option<String>,
    /// The target format is a storage sink.
    #[serde(default)]
    pub sink: bool,
}

impl Config {
    /// Load config from the default location.
    pub fn load() -> Self {
        Self::load_from_path(Self::default_path())
    }

    /// Load config from a specific path.
    pub fn load_from_path(path: Option<PathBuf>) -> Self {
        let Some(path) = path else {
            return Self::default();
        };

        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(&path) {
            Ok(contents) => match toml::from_str(&contents) {
                Ok(config) => config,
                Err(e) => {
                    eprintln!("Warning: Failed to parse config file: {}", e);
                    Self::default()
                }
            },
            Err(e) => {
                eprintln!("Warning: Failed to read config file: {}", e);
                Self::default()
            }
        }
    }

    /// Get the default config file path.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("dtconvert").join("config.toml"))
    }

    /// Options for the built-in converters.
    pub fn data_options(&self) -> DataOptions {
        DataOptions {
            sql: SqlOptions::default()
                .table(self.sql.table.clone())
                .create_table(self.sql.create_table),
        }
    }
}
