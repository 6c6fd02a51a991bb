//! Configuration file support.
//!
//! The library takes plain config structs ([`FetcherConfig`],
//! [`TrackerConfig`]); this module fills them from an INI file so the CLI can
//! be tuned without recompiling.
//!
//! # Example
//!
//! ```ini
//! [primary]
//! url = https://api.wheretheiss.at/v1/satellites/25544
//! timeout_ms = 3000
//!
//! [fetcher]
//! circuit_cooldown_secs = 30
//!
//! [tracker]
//! update_interval_ms = 2000
//! ```
//!
//! [`FetcherConfig`]: crate::fetcher::FetcherConfig
//! [`TrackerConfig`]: crate::tracker::TrackerConfig

mod file;
mod parser;
mod settings;

pub use file::{config_directory, config_file_path, ConfigFileError, CONFIG_ENV_VAR};
pub use settings::{ConfigFile, LoggingSettings};
