//! CLI command implementations.
//!
//! Each subcommand has its own module with argument definitions and handlers.
//!
//! # Command Modules
//!
//! - [`fetch`] - Single position fetch with statistics
//! - [`project`] - Mercator projection lookups
//! - [`track`] - Continuous tracking (main command)

pub mod common;
pub mod fetch;
pub mod project;
pub mod track;
