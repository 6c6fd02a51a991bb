//! Settings structs for all configuration sections.
//!
//! The fetcher and tracker sections map directly onto the library's own
//! config structs; only logging has a settings type of its own.

use std::path::PathBuf;

use crate::fetcher::FetcherConfig;
use crate::tracker::TrackerConfig;

/// Complete application configuration loaded from config.ini.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigFile {
    /// `[primary]`, `[backup]` and `[fetcher]` sections
    pub fetcher: FetcherConfig,
    /// `[tracker]` section
    pub tracker: TrackerConfig,
    /// `[logging]` section
    pub logging: LoggingSettings,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct LoggingSettings {
    /// Directory holding the log file
    pub directory: PathBuf,
    /// Log file name
    pub file: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            directory: crate::logging::default_log_dir(),
            file: crate::logging::default_log_file().to_string(),
        }
    }
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            fetcher: FetcherConfig::default(),
            tracker: TrackerConfig::default(),
            logging: LoggingSettings::default(),
        }
    }
}
