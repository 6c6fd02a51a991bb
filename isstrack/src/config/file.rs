//! Locating and reading the INI configuration file.
//!
//! Lookup order:
//!
//! 1. An explicit path (CLI `--config`), which must exist
//! 2. `$ISSTRACK_CONFIG`, if set and non-empty
//! 3. `~/.isstrack/config.ini`
//!
//! A missing file in cases 2 and 3 is not an error: every setting has a
//! default, so a fresh install runs with no config at all.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use ini::Ini;
use thiserror::Error;

use super::settings::ConfigFile;

/// Environment variable overriding the default config file location.
pub const CONFIG_ENV_VAR: &str = "ISSTRACK_CONFIG";

/// Configuration file errors.
#[derive(Debug, Error)]
pub enum ConfigFileError {
    /// An explicitly requested file does not exist.
    #[error("Config file not found: {}", path.display())]
    NotFound { path: PathBuf },

    /// The file exists but could not be read or is not valid INI.
    #[error("Failed to read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: ini::Error,
    },

    /// A key holds a value outside its allowed range or format.
    #[error("Invalid configuration: {section}.{key} = '{value}' - {reason}")]
    InvalidValue {
        section: String,
        key: String,
        value: String,
        reason: String,
    },
}

impl ConfigFile {
    /// Load from [`config_file_path`], falling back to defaults if the file
    /// is absent.
    pub fn load() -> Result<Self, ConfigFileError> {
        Self::load_from(&config_file_path())
    }

    /// Load a file the user asked for by name. Absence is an error.
    pub fn load_required(path: &Path) -> Result<Self, ConfigFileError> {
        if !path.exists() {
            return Err(ConfigFileError::NotFound {
                path: path.to_path_buf(),
            });
        }
        Self::load_from(path)
    }

    /// Load from `path`, falling back to defaults if the file is absent.
    pub fn load_from(path: &Path) -> Result<Self, ConfigFileError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }

        let ini = Ini::load_from_file(path).map_err(|source| ConfigFileError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        super::parser::parse_ini(&ini)
    }
}

/// The isstrack home directory (`~/.isstrack`); holds config and logs.
pub fn config_directory() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".isstrack")
}

/// Config file location: `$ISSTRACK_CONFIG` or `~/.isstrack/config.ini`.
pub fn config_file_path() -> PathBuf {
    path_override(std::env::var_os(CONFIG_ENV_VAR))
        .unwrap_or_else(|| config_directory().join("config.ini"))
}

fn path_override(value: Option<OsString>) -> Option<PathBuf> {
    value.filter(|v| !v.is_empty()).map(PathBuf::from)
}
