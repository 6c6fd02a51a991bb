//! Configuration for the position fetcher.

use std::time::Duration;

use serde::Serialize;

/// Default primary endpoint (flat JSON shape).
pub const DEFAULT_PRIMARY_URL: &str = "https://api.wheretheiss.at/v1/satellites/25544";

/// Default backup endpoint (legacy `iss_position` wrapper shape).
pub const DEFAULT_BACKUP_URL: &str = "http://api.open-notify.org/iss-now.json";

/// How long a cached response may be replayed.
pub const DEFAULT_CACHE_MAX_AGE: Duration = Duration::from_secs(30);

/// Consecutive failed fetch cycles before the circuit opens.
pub const DEFAULT_FAILURE_THRESHOLD: u32 = 3;

/// How long the circuit stays open.
pub const DEFAULT_CIRCUIT_COOLDOWN: Duration = Duration::from_secs(30);

/// Number of error records kept for diagnostics.
pub const DEFAULT_MAX_ERROR_RECORDS: usize = 10;

/// Which upstream endpoint a request targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Endpoint {
    Primary,
    Backup,
}

impl Endpoint {
    #[inline]
    pub(crate) fn index(self) -> usize {
        match self {
            Self::Primary => 0,
            Self::Backup => 1,
        }
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Primary => write!(f, "primary"),
            Self::Backup => write!(f, "backup"),
        }
    }
}

/// Settings for one upstream endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct EndpointConfig {
    /// URL to GET.
    pub url: String,

    /// Per-request timeout.
    pub timeout: Duration,

    /// Extra attempts on this endpoint before failing over.
    pub retries: u32,

    /// Pause between attempts on this endpoint.
    pub retry_delay: Duration,

    /// Minimum spacing between requests to this endpoint.
    pub rate_limit: Duration,
}

impl EndpointConfig {
    /// Endpoint with the given URL and timeout, no retries and no rate limit.
    pub fn new(url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            url: url.into(),
            timeout,
            retries: 0,
            retry_delay: Duration::ZERO,
            rate_limit: Duration::ZERO,
        }
    }

    pub fn with_retries(mut self, retries: u32, retry_delay: Duration) -> Self {
        self.retries = retries;
        self.retry_delay = retry_delay;
        self
    }

    pub fn with_rate_limit(mut self, rate_limit: Duration) -> Self {
        self.rate_limit = rate_limit;
        self
    }

    /// Default primary endpoint settings.
    pub fn primary() -> Self {
        Self::new(DEFAULT_PRIMARY_URL, Duration::from_secs(3))
            .with_retries(0, Duration::from_millis(1000))
            .with_rate_limit(Duration::from_millis(1000))
    }

    /// Default backup endpoint settings.
    pub fn backup() -> Self {
        Self::new(DEFAULT_BACKUP_URL, Duration::from_secs(5))
            .with_retries(0, Duration::from_millis(1500))
            .with_rate_limit(Duration::from_millis(1000))
    }
}

/// Configuration for [`super::PositionFetcher`].
#[derive(Debug, Clone, PartialEq)]
pub struct FetcherConfig {
    pub primary: EndpointConfig,
    pub backup: EndpointConfig,

    /// Maximum age of a cached position that may still be replayed.
    pub cache_max_age: Duration,

    /// Consecutive failed fetch cycles that open the circuit.
    pub failure_threshold: u32,

    /// How long the circuit stays open before closing on its own.
    pub circuit_cooldown: Duration,

    /// Size of the rolling error record buffer.
    pub max_error_records: usize,
}

impl FetcherConfig {
    /// Config with explicit endpoints and default policy.
    pub fn with_endpoints(primary: EndpointConfig, backup: EndpointConfig) -> Self {
        Self {
            primary,
            backup,
            ..Default::default()
        }
    }

    /// Settings for one endpoint.
    pub fn endpoint(&self, endpoint: Endpoint) -> &EndpointConfig {
        match endpoint {
            Endpoint::Primary => &self.primary,
            Endpoint::Backup => &self.backup,
        }
    }
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            primary: EndpointConfig::primary(),
            backup: EndpointConfig::backup(),
            cache_max_age: DEFAULT_CACHE_MAX_AGE,
            failure_threshold: DEFAULT_FAILURE_THRESHOLD,
            circuit_cooldown: DEFAULT_CIRCUIT_COOLDOWN,
            max_error_records: DEFAULT_MAX_ERROR_RECORDS,
        }
    }
}
