//! HTTP fetch configuration.

use std::time::Duration;

use crate::error::{FetchError, FetchResult};

pub const ENV_TIMEOUT_SECS: &str = "GEOMETA_FETCH_TIMEOUT_SECS";
pub const ENV_CONNECT_TIMEOUT_SECS: &str = "GEOMETA_CONNECT_TIMEOUT_SECS";
pub const ENV_MAX_BODY_BYTES: &str = "GEOMETA_MAX_BODY_BYTES";
pub const ENV_USER_AGENT: &str = "GEOMETA_USER_AGENT";

#[derive(Debug, Clone, PartialEq)]
pub struct FetchConfig {
    /// Total time allowed for one request, body included
    pub timeout: Duration,
    /// Time allowed to establish the connection
    pub connect_timeout: Duration,
    /// Larger bodies are rejected (capabilities of big services reach a few MB)
    pub max_body_bytes: usize,
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            max_body_bytes: 16 * 1024 * 1024, // 16MB
            user_agent: concat!("my-meta-maps/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl FetchConfig {
    /// Defaults overridden by `GEOMETA_*` environment variables.
    pub fn from_env() -> FetchResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns per variable name.
    ///
    /// Blank values count as unset; unparseable values are errors.
    pub fn from_lookup<L>(lookup: L) -> FetchResult<Self>
    where
        L: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(value) = lookup(ENV_TIMEOUT_SECS) {
            config.timeout = Duration::from_secs(parse_positive(ENV_TIMEOUT_SECS, &value)?);
        }
        if let Some(value) = lookup(ENV_CONNECT_TIMEOUT_SECS) {
            config.connect_timeout =
                Duration::from_secs(parse_positive(ENV_CONNECT_TIMEOUT_SECS, &value)?);
        }
        if let Some(value) = lookup(ENV_MAX_BODY_BYTES) {
            config.max_body_bytes = parse_positive(ENV_MAX_BODY_BYTES, &value)? as usize;
        }
        if let Some(value) = lookup(ENV_USER_AGENT) {
            config.user_agent = value.trim().to_string();
        }

        Ok(config)
    }
}

fn parse_positive(key: &'static str, value: &str) -> FetchResult<u64> {
    match value.trim().parse::<u64>() {
        Ok(parsed) if parsed > 0 => Ok(parsed),
        _ => Err(FetchError::InvalidConfig {
            key,
            value: value.to_string(),
        }),
    }
}
