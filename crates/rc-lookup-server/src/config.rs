//! Configuration loading and resolution.
//!
//! Every setting resolves in the same order: explicit CLI value, then the
//! matching `RC_LOOKUP_*` environment variable, then the built-in default.

use std::net::SocketAddr;
use std::time::Duration;

use rc_lookup::{RetryPolicy, VahanxSource};

use crate::error::{ServerError, ServerResult};

pub const ENV_ADDR: &str = "RC_LOOKUP_ADDR";
pub const ENV_BASE_URL: &str = "RC_LOOKUP_BASE_URL";
pub const ENV_TIMEOUT_MS: &str = "RC_LOOKUP_TIMEOUT_MS";
pub const ENV_ATTEMPTS: &str = "RC_LOOKUP_ATTEMPTS";
pub const ENV_RETRY_DELAY_MS: &str = "RC_LOOKUP_RETRY_DELAY_MS";
/// Comma-separated aggregator URL templates.
pub const ENV_AGGREGATORS: &str = "RC_LOOKUP_AGGREGATORS";

pub const DEFAULT_ADDR: &str = "0.0.0.0:5000";

/// Values given explicitly on the command line.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub addr: Option<String>,
    pub base_url: Option<String>,
    pub timeout_ms: Option<u64>,
    pub attempts: Option<u32>,
    pub retry_delay_ms: Option<u64>,
    pub aggregators: Vec<String>,
}

/// Fully resolved server settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub addr: SocketAddr,
    pub base_url: String,
    pub retry: RetryPolicy,
    pub aggregators: Vec<String>,
}

impl ServerConfig {
    /// Resolve against the process environment.
    pub fn resolve(overrides: ConfigOverrides) -> ServerResult<Self> {
        Self::resolve_with(overrides, |name| std::env::var(name).ok())
    }

    /// Resolve against an arbitrary variable lookup.
    pub fn resolve_with(
        overrides: ConfigOverrides,
        env: impl Fn(&str) -> Option<String>,
    ) -> ServerResult<Self> {
        let addr_raw = overrides
            .addr
            .or_else(|| env(ENV_ADDR))
            .unwrap_or_else(|| DEFAULT_ADDR.to_string());
        let addr = addr_raw
            .parse::<SocketAddr>()
            .map_err(|e| ServerError::invalid(ENV_ADDR, addr_raw.as_str(), e))?;

        let base_url = overrides
            .base_url
            .or_else(|| env(ENV_BASE_URL))
            .unwrap_or_else(|| VahanxSource::DEFAULT_BASE_URL.to_string());

        let defaults = RetryPolicy::default();
        let timeout_ms = resolve_number(overrides.timeout_ms, ENV_TIMEOUT_MS, &env)?
            .unwrap_or(defaults.timeout.as_millis() as u64);
        let attempts = resolve_number(overrides.attempts, ENV_ATTEMPTS, &env)?
            .unwrap_or(defaults.attempts);
        let retry_delay_ms = resolve_number(overrides.retry_delay_ms, ENV_RETRY_DELAY_MS, &env)?
            .unwrap_or(defaults.delay.as_millis() as u64);

        if attempts == 0 {
            return Err(ServerError::invalid(ENV_ATTEMPTS, "0", "must be at least 1"));
        }

        let aggregators = if overrides.aggregators.is_empty() {
            env(ENV_AGGREGATORS)
                .map(|raw| split_list(&raw))
                .unwrap_or_default()
        } else {
            overrides.aggregators
        };

        Ok(Self {
            addr,
            base_url,
            retry: RetryPolicy {
                attempts,
                delay: Duration::from_millis(retry_delay_ms),
                timeout: Duration::from_millis(timeout_ms),
            },
            aggregators,
        })
    }
}

fn resolve_number<T>(
    explicit: Option<T>,
    name: &'static str,
    env: &impl Fn(&str) -> Option<String>,
) -> ServerResult<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    if explicit.is_some() {
        return Ok(explicit);
    }
    match env(name) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| ServerError::invalid(name, raw.as_str(), e)),
        None => Ok(None),
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
