//! INI parsing logic for converting `Ini` → `ConfigFile`.
//!
//! This module contains the `parse_ini()` function and its helpers.
//! It is the single place where INI key names are mapped to struct fields.

use ini::{Ini, Properties};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use super::file::ConfigFileError;
use super::settings::ConfigFile;
use crate::fetcher::EndpointConfig;

/// Parse an `Ini` object into a `ConfigFile`.
///
/// Starts from `ConfigFile::default()` and overlays any values found in the INI.
pub(super) fn parse_ini(ini: &Ini) -> Result<ConfigFile, ConfigFileError> {
    let mut config = ConfigFile::default();

    // [primary] / [backup] sections
    if let Some(section) = ini.section(Some("primary")) {
        parse_endpoint(section, "primary", &mut config.fetcher.primary)?;
    }
    if let Some(section) = ini.section(Some("backup")) {
        parse_endpoint(section, "backup", &mut config.fetcher.backup)?;
    }

    // [fetcher] section
    if let Some(section) = ini.section(Some("fetcher")) {
        if let Some(v) = section.get("cache_max_age_secs") {
            config.fetcher.cache_max_age =
                Duration::from_secs(parse_number(v, "fetcher", "cache_max_age_secs")?);
        }
        if let Some(v) = section.get("failure_threshold") {
            let threshold: u32 = parse_number(v, "fetcher", "failure_threshold")?;
            if threshold == 0 {
                return Err(invalid("fetcher", "failure_threshold", v, "must be at least 1"));
            }
            config.fetcher.failure_threshold = threshold;
        }
        if let Some(v) = section.get("circuit_cooldown_secs") {
            config.fetcher.circuit_cooldown =
                Duration::from_secs(parse_number(v, "fetcher", "circuit_cooldown_secs")?);
        }
    }

    // [tracker] section
    if let Some(section) = ini.section(Some("tracker")) {
        if let Some(v) = section.get("update_interval_ms") {
            config.tracker.update_interval =
                parse_positive_millis(v, "tracker", "update_interval_ms")?;
        }
        if let Some(v) = section.get("animation_duration_ms") {
            config.tracker.animation_duration =
                Duration::from_millis(parse_number(v, "tracker", "animation_duration_ms")?);
        }
        if let Some(v) = section.get("max_path_length") {
            config.tracker.max_path_length = parse_number(v, "tracker", "max_path_length")?;
        }
        if let Some(v) = section.get("max_consecutive_errors") {
            let max: u32 = parse_number(v, "tracker", "max_consecutive_errors")?;
            if max == 0 {
                return Err(invalid(
                    "tracker",
                    "max_consecutive_errors",
                    v,
                    "must be at least 1",
                ));
            }
            config.tracker.max_consecutive_errors = max;
        }
        if let Some(v) = section.get("frame_interval_ms") {
            config.tracker.frame_interval =
                parse_positive_millis(v, "tracker", "frame_interval_ms")?;
        }
    }

    // [logging] section
    if let Some(section) = ini.section(Some("logging")) {
        if let Some(v) = section.get("directory") {
            let v = v.trim();
            if !v.is_empty() {
                config.logging.directory = expand_tilde(v);
            }
        }
        if let Some(v) = section.get("file") {
            let v = v.trim();
            if !v.is_empty() {
                config.logging.file = v.to_string();
            }
        }
    }

    Ok(config)
}

fn parse_endpoint(
    section: &Properties,
    name: &str,
    endpoint: &mut EndpointConfig,
) -> Result<(), ConfigFileError> {
    if let Some(v) = section.get("url") {
        let v = v.trim();
        if !(v.starts_with("http://") || v.starts_with("https://")) {
            return Err(invalid(name, "url", v, "must be an http:// or https:// URL"));
        }
        endpoint.url = v.to_string();
    }
    if let Some(v) = section.get("timeout_ms") {
        endpoint.timeout = parse_positive_millis(v, name, "timeout_ms")?;
    }
    if let Some(v) = section.get("retries") {
        endpoint.retries = parse_number(v, name, "retries")?;
    }
    if let Some(v) = section.get("retry_delay_ms") {
        endpoint.retry_delay = Duration::from_millis(parse_number(v, name, "retry_delay_ms")?);
    }
    if let Some(v) = section.get("rate_limit_ms") {
        endpoint.rate_limit = Duration::from_millis(parse_number(v, name, "rate_limit_ms")?);
    }
    Ok(())
}

fn parse_number<T: FromStr>(value: &str, section: &str, key: &str) -> Result<T, ConfigFileError> {
    value
        .trim()
        .parse()
        .map_err(|_| invalid(section, key, value, "must be a non-negative integer"))
}

fn parse_positive_millis(
    value: &str,
    section: &str,
    key: &str,
) -> Result<Duration, ConfigFileError> {
    let millis: u64 = parse_number(value, section, key)?;
    if millis == 0 {
        return Err(invalid(section, key, value, "must be greater than 0 (milliseconds)"));
    }
    Ok(Duration::from_millis(millis))
}

fn invalid(section: &str, key: &str, value: &str, reason: &str) -> ConfigFileError {
    ConfigFileError::InvalidValue {
        section: section.to_string(),
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

pub(super) fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}
