//! Configuration for the tenant resolver module.

use std::time::Duration;

use http::HeaderName;
use serde::{Deserialize, Serialize};

/// Module configuration, the `tenant_resolver` section of the server config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TenantResolverConfig {
    /// Request header carrying the tenant identifier (slug).
    pub header_name: String,

    /// How long a positive directory lookup is reused. Zero disables caching.
    #[serde(with = "humantime_serde")]
    pub cache_ttl: Duration,

    /// Upper bound on cached tenants.
    pub cache_capacity: usize,

    /// Echo the resolved slug in an `x-tenant-slug` response header.
    pub expose_context_header: bool,

    /// Length of the trial granted at registration.
    #[serde(with = "humantime_serde")]
    pub trial_period: Duration,

    /// Interval of the background job expiring lapsed trials and subscriptions.
    #[serde(with = "humantime_serde")]
    pub lapse_sweep_interval: Duration,
}

impl Default for TenantResolverConfig {
    fn default() -> Self {
        Self {
            header_name: "x-tenant-id".to_owned(),
            cache_ttl: Duration::from_secs(30),
            cache_capacity: 10_000,
            expose_context_header: false,
            trial_period: Duration::from_secs(14 * 24 * 60 * 60),
            lapse_sweep_interval: Duration::from_secs(60 * 60),
        }
    }
}

impl TenantResolverConfig {
    /// Parsed tenant header name.
    ///
    /// # Errors
    /// Returns an error if `header_name` is not a valid HTTP header name.
    pub fn header(&self) -> anyhow::Result<HeaderName> {
        HeaderName::from_bytes(self.header_name.trim().to_ascii_lowercase().as_bytes())
            .map_err(|e| anyhow::anyhow!("invalid tenant_resolver.header_name '{}': {e}", self.header_name))
    }

    /// Trial period as a chrono duration.
    ///
    /// # Errors
    /// Returns an error if the period does not fit a chrono duration.
    pub fn trial_delta(&self) -> anyhow::Result<chrono::Duration> {
        chrono::Duration::from_std(self.trial_period)
            .map_err(|e| anyhow::anyhow!("invalid tenant_resolver.trial_period: {e}"))
    }

    /// # Errors
    /// Returns an error describing the first invalid field.
    pub fn validate(&self) -> anyhow::Result<()> {
        self.header()?;
        self.trial_delta()?;
        if self.cache_capacity == 0 && !self.cache_ttl.is_zero() {
            anyhow::bail!("tenant_resolver.cache_capacity must be positive when caching is enabled");
        }
        if self.lapse_sweep_interval.is_zero() {
            anyhow::bail!("tenant_resolver.lapse_sweep_interval must be positive");
        }
        Ok(())
    }
}
