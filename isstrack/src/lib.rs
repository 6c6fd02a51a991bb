//! isstrack - Resilient real-time ISS position tracking
//!
//! This library polls public ISS position APIs, masks upstream failures
//! behind a cache/demo fallback chain, smooths successive fixes into an
//! animated position stream and projects coordinates onto a Web Mercator
//! canvas.
//!
//! # High-Level API
//!
//! ```ignore
//! use isstrack::clock::SystemClock;
//! use isstrack::fetcher::{FetcherConfig, PositionFetcher, ReqwestTransport};
//! use isstrack::tracker::{PositionTracker, TrackerConfig, TrackerDaemon};
//! use tokio_util::sync::CancellationToken;
//!
//! let fetcher = PositionFetcher::new(ReqwestTransport::new()?, SystemClock, FetcherConfig::default());
//! let mut tracker = PositionTracker::new(fetcher, SystemClock, TrackerConfig::default());
//! tracker.on_position_update(|p| println!("{:.4}, {:.4}", p.latitude, p.longitude));
//!
//! let shutdown = CancellationToken::new();
//! let (handle, join) = TrackerDaemon::spawn(tracker, shutdown.clone());
//! handle.start();
//! ```

pub mod clock;
pub mod config;
pub mod fetcher;
pub mod logging;
pub mod position;
pub mod projection;
pub mod tracker;

/// Version of the isstrack library and CLI.
///
/// This is synchronized across all components in the workspace.
/// The version is defined in `Cargo.toml` and injected at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
