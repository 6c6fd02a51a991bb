//! CLI runner for common setup and operations.
//!
//! Encapsulates config loading, logging initialization and construction of
//! the live position fetcher so command handlers stay short.

use tracing::info;

use crate::commands::common::CommonArgs;
use crate::error::CliError;
use isstrack::clock::SystemClock;
use isstrack::config::ConfigFile;
use isstrack::fetcher::{PositionFetcher, ReqwestTransport};
use isstrack::logging::{init_logging, LoggingGuard};

/// Fetcher type used by every command that talks to the network.
pub type LiveFetcher = PositionFetcher<ReqwestTransport, SystemClock>;

/// Runner that manages CLI lifecycle and common operations.
pub struct CliRunner {
    /// Logging guard - keeps logging active while runner exists
    #[allow(dead_code)]
    logging_guard: LoggingGuard,
    /// Loaded configuration file
    config: ConfigFile,
}

impl CliRunner {
    /// Create a runner, loading config and initializing logging.
    ///
    /// Loads `--config` when given (it must exist), the default location
    /// otherwise (a missing default file yields built-in defaults). `--verbose` mirrors
    /// log output to stdout; `--debug` raises the default level.
    pub fn from_args(args: &CommonArgs) -> Result<Self, CliError> {
        let config = match &args.config {
            Some(path) => ConfigFile::load_required(path)?,
            None => ConfigFile::load()?,
        };

        let logging_guard = init_logging(
            &config.logging.directory,
            &config.logging.file,
            args.verbose,
            args.debug,
        )
        .map_err(|e| CliError::LoggingInit(e.to_string()))?;

        Ok(Self {
            logging_guard,
            config,
        })
    }

    /// Get the loaded configuration.
    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    /// Log startup information for a command.
    pub fn log_startup(&self, command: &str) {
        info!("isstrack v{}", isstrack::VERSION);
        info!("isstrack CLI: {} command", command);
    }

    /// Build a fetcher for the configured endpoints.
    pub fn create_fetcher(&self) -> Result<LiveFetcher, CliError> {
        let transport = ReqwestTransport::new().map_err(CliError::Transport)?;
        info!(
            primary = %self.config.fetcher.primary.url,
            backup = %self.config.fetcher.backup.url,
            "Position fetcher created"
        );
        Ok(PositionFetcher::new(
            transport,
            SystemClock,
            self.config.fetcher.clone(),
        ))
    }
}
