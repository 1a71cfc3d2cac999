//! Config Store - loading and saving the settings document
//!
//! The configuration lives in a pretty-printed JSON file the operator can
//! edit by hand. A file that fails to parse is replaced with the built-in
//! defaults rather than aborting the plugin.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::Configuration;

/// Errors that can occur while persisting the configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("config serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Owns the active configuration and its backing file
#[derive(Debug)]
pub struct ConfigStore {
    path: PathBuf,
    config: Configuration,
    loaded: bool,
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            config: Configuration::default(),
            loaded: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn config(&self) -> &Configuration {
        &self.config
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Load the settings file, self-healing to defaults on any failure.
    pub fn load(&mut self) -> &Configuration {
        let (config, mut dirty) = match read_config(&self.path) {
            Ok(Some(config)) => (config, false),
            Ok(None) => {
                log::info!(
                    "No configuration at {}, creating one with default values",
                    self.path.display()
                );
                (Configuration::default(), true)
            }
            Err(e) => {
                log::warn!(
                    "Your configuration file contains an error ({}). Using default configuration values.",
                    e
                );
                (Configuration::default(), true)
            }
        };

        self.config = config;
        for fixed in self.config.sanitize() {
            log::warn!("Invalid configuration value reset to 0: {}", fixed);
            dirty = true;
        }
        self.loaded = true;

        if dirty {
            if let Err(e) = self.save() {
                log::warn!("Could not write configuration: {}", e);
            }
        }

        &self.config
    }

    /// Reload from disk. Same recovery rules as [`load`](Self::load).
    pub fn reload(&mut self) -> &Configuration {
        self.load()
    }

    /// Write the active configuration.
    ///
    /// Does nothing until a load has completed, so a not-yet-loaded default
    /// object can never replace a good file.
    pub fn save(&self) -> Result<(), ConfigError> {
        if !self.loaded {
            log::debug!("Skipping config save before first load");
            return Ok(());
        }

        let json = serde_json::to_string_pretty(&self.config)?;
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|source| ConfigError::Io {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }
        fs::write(&self.path, json).map_err(|source| ConfigError::Io {
            path: self.path.clone(),
            source,
        })
    }

    /// Replace the active configuration and persist it.
    pub fn set(&mut self, config: Configuration) -> Result<(), ConfigError> {
        self.config = config;
        self.save()
    }
}

/// `Ok(None)` when the file does not exist.
fn read_config(path: &Path) -> Result<Option<Configuration>, ConfigError> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    Ok(Some(serde_json::from_str(&text)?))
}
