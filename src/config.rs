//! Client configuration.
//!
//! Built once and immutable afterwards; every concurrent call shares the
//! resulting client by reference. Builder options apply in order with
//! last-write-wins, so test code can prepend `.without_retry()
//! .without_rate_limit()` and still let a caller's later options override.

use std::time::Duration;

use crate::retry::RetryConfig;

/// Configuration for the HTTP client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Retry configuration. `None` disables retries.
    pub retry: Option<RetryConfig>,
    /// Sustained requests-per-second cap. `None` disables rate limiting.
    pub rate_limit: Option<u32>,
    /// Request timeout.
    pub timeout: Duration,
    /// Connection timeout.
    pub connect_timeout: Duration,
    /// Pool idle timeout.
    pub pool_idle_timeout: Duration,
    /// Maximum idle connections per host.
    pub pool_max_idle_per_host: usize,
    /// User-Agent header value.
    pub user_agent: String,
    /// Whether to enable request/response tracing.
    pub enable_tracing: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            retry: Some(RetryConfig::default()),
            rate_limit: Some(4),
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            pool_idle_timeout: Duration::from_secs(90),
            pool_max_idle_per_host: 10,
            user_agent: crate::USER_AGENT.to_string(),
            enable_tracing: true,
        }
    }
}

impl ClientConfig {
    /// Create a new client config builder.
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }
}

/// Builder for ClientConfig.
#[derive(Debug, Default)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    /// Set the retry configuration.
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.config.retry = Some(retry);
        self
    }

    /// Disable retries.
    pub fn without_retry(mut self) -> Self {
        self.config.retry = None;
        self
    }

    /// Cap sustained throughput at `rps` requests per second.
    pub fn with_rate_limit(mut self, rps: u32) -> Self {
        self.config.rate_limit = Some(rps);
        self
    }

    /// Disable client-side rate limiting.
    pub fn without_rate_limit(mut self) -> Self {
        self.config.rate_limit = None;
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set connection timeout.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = timeout;
        self
    }

    /// Set pool idle timeout.
    pub fn with_pool_idle_timeout(mut self, timeout: Duration) -> Self {
        self.config.pool_idle_timeout = timeout;
        self
    }

    /// Set maximum idle connections per host.
    pub fn with_pool_max_idle(mut self, max: usize) -> Self {
        self.config.pool_max_idle_per_host = max;
        self
    }

    /// Set custom User-Agent.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    /// Enable or disable request/response tracing.
    pub fn with_tracing(mut self, enabled: bool) -> Self {
        self.config.enable_tracing = enabled;
        self
    }

    /// Build the client configuration.
    pub fn build(self) -> ClientConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert!(config.retry.is_some());
        assert_eq!(config.rate_limit, Some(4));
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert!(config.user_agent.contains("dnsfilter-api"));
    }

    #[test]
    fn test_builder_last_write_wins() {
        let config = ClientConfig::builder()
            .without_retry()
            .without_rate_limit()
            .with_rate_limit(100)
            .with_timeout(Duration::from_secs(60))
            .with_user_agent("custom-agent/1.0")
            .build();

        assert!(config.retry.is_none());
        assert_eq!(config.rate_limit, Some(100));
        assert_eq!(config.timeout, Duration::from_secs(60));
        assert_eq!(config.user_agent, "custom-agent/1.0");
    }

    #[test]
    fn test_deterministic_test_config() {
        let config = ClientConfig::builder()
            .without_retry()
            .without_rate_limit()
            .build();

        assert!(config.retry.is_none());
        assert!(config.rate_limit.is_none());
    }
}
