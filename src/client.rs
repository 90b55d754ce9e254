//! Core HTTP transport with retry, rate limiting, and envelope unwrapping.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, instrument, warn};

use crate::config::ClientConfig;
use crate::envelope::Envelope;
use crate::error::{Error, ErrorKind, Result};
use crate::rate_limit::RateLimiter;
use crate::request::{RequestBody, RequestBuilder, RequestMethod};
use crate::retry::RetryPolicy;

/// HTTP transport with built-in retry, rate limiting, and envelope handling.
///
/// Cloning is cheap; clones share the connection pool and the rate-limiter
/// state, so every call issued through any clone counts against the same
/// throughput cap.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    inner: reqwest::Client,
    limiter: Arc<RateLimiter>,
    config: ClientConfig,
}

impl HttpTransport {
    /// Create a new transport from configuration.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let inner = reqwest::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .pool_idle_timeout(config.pool_idle_timeout)
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .user_agent(&config.user_agent)
            .gzip(true)
            .deflate(true)
            .build()
            .map_err(|e| Error::with_source(ErrorKind::Config(e.to_string()), e))?;

        let limiter = Arc::new(match config.rate_limit {
            Some(rps) => RateLimiter::per_second(rps),
            None => RateLimiter::unlimited(),
        });

        Ok(Self {
            inner,
            limiter,
            config,
        })
    }

    /// Create a transport with default configuration.
    pub fn default_transport() -> Result<Self> {
        Self::new(ClientConfig::default())
    }

    /// Get the transport configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Create a GET request builder.
    pub fn get(&self, url: impl Into<String>) -> RequestBuilder {
        RequestBuilder::new(RequestMethod::Get, url)
    }

    /// Create a POST request builder.
    pub fn post(&self, url: impl Into<String>) -> RequestBuilder {
        RequestBuilder::new(RequestMethod::Post, url)
    }

    /// Create a PUT request builder.
    pub fn put(&self, url: impl Into<String>) -> RequestBuilder {
        RequestBuilder::new(RequestMethod::Put, url)
    }

    /// Create a PATCH request builder.
    pub fn patch(&self, url: impl Into<String>) -> RequestBuilder {
        RequestBuilder::new(RequestMethod::Patch, url)
    }

    /// Create a DELETE request builder.
    pub fn delete(&self, url: impl Into<String>) -> RequestBuilder {
        RequestBuilder::new(RequestMethod::Delete, url)
    }

    /// Execute a request: permit, exchange, retries, envelope unwrap.
    ///
    /// On success the validated [`Envelope`] is returned for endpoint-level
    /// body decoding. A `success: false` envelope surfaces as
    /// [`ErrorKind::Api`] without touching `body`.
    #[instrument(skip(self, request), fields(method = ?request.method, url = %request.url))]
    pub async fn execute(&self, request: RequestBuilder) -> Result<Envelope> {
        let mut retry_policy = self
            .config
            .retry
            .as_ref()
            .map(|c| RetryPolicy::new(c.clone()));

        loop {
            self.acquire_permit(&request).await?;

            let result = match &request.cancel_token {
                Some(token) => tokio::select! {
                    _ = token.cancelled() => Err(Error::new(ErrorKind::Canceled)),
                    res = self.execute_once(&request) => res,
                },
                None => self.execute_once(&request).await,
            };

            match result {
                Ok(envelope) => return Ok(envelope),
                Err(err) if err.is_retryable() => {
                    if let Some(ref mut policy) = retry_policy {
                        if let Some(delay) = policy.next_delay(err.retry_after()) {
                            warn!(
                                attempt = policy.attempt(),
                                delay_ms = delay.as_millis(),
                                error = %err,
                                "Request failed, retrying"
                            );
                            self.backoff(delay, &request).await?;
                            continue;
                        }

                        let attempts = policy.attempt();
                        if attempts == 0 {
                            // Zero-attempt policy: surface the failure as-is.
                            return Err(err);
                        }
                        return Err(Error::with_source(
                            ErrorKind::RetriesExhausted { attempts },
                            err,
                        ));
                    }

                    // No retry policy configured.
                    return Err(err);
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// Wait for a rate-limiter permit, racing the caller's cancellation.
    async fn acquire_permit(&self, request: &RequestBuilder) -> Result<()> {
        match &request.cancel_token {
            Some(token) => tokio::select! {
                _ = token.cancelled() => Err(Error::new(ErrorKind::Canceled)),
                _ = self.limiter.acquire() => Ok(()),
            },
            None => {
                self.limiter.acquire().await;
                Ok(())
            }
        }
    }

    /// Sleep between retries, racing the caller's cancellation.
    async fn backoff(&self, delay: Duration, request: &RequestBuilder) -> Result<()> {
        match &request.cancel_token {
            Some(token) => tokio::select! {
                _ = token.cancelled() => Err(Error::new(ErrorKind::Canceled)),
                _ = tokio::time::sleep(delay) => Ok(()),
            },
            None => {
                tokio::time::sleep(delay).await;
                Ok(())
            }
        }
    }

    /// Execute a single exchange without retry logic.
    async fn execute_once(&self, request: &RequestBuilder) -> Result<Envelope> {
        let mut req = self
            .inner
            .request(request.method.to_reqwest(), &request.url);

        if let Some(ref token) = request.bearer_token {
            req = req.bearer_auth(token);
        }

        for (name, value) in &request.headers {
            req = req.header(name.as_str(), value.as_str());
        }

        if !request.query_params.is_empty() {
            req = req.query(&request.query_params);
        }

        if let Some(ref body) = request.body {
            req = match body {
                RequestBody::Json(value) => req.json(value),
                RequestBody::Form(data) => req.form(data),
            };
        }

        if self.config.enable_tracing {
            debug!(
                method = ?request.method,
                url = %request.url,
                "Sending request"
            );
        }

        let response = req.send().await?;
        let status = response.status().as_u16();

        if self.config.enable_tracing {
            if response.status().is_success() {
                debug!(status, "Response received");
            } else {
                info!(status, "Non-success response");
            }
        }

        if status == 429 {
            return Err(Error::new(ErrorKind::RateLimited {
                retry_after: retry_after_header(&response),
            }));
        }

        if matches!(status, 500 | 502 | 503 | 504) {
            return Err(Error::new(ErrorKind::Http {
                status,
                message: format!("Server error: {}", status),
                retry_after: retry_after_header(&response),
            }));
        }

        let success = (200..300).contains(&status);
        let raw = response.bytes().await?;

        if !success {
            // Error statuses usually still carry an envelope; prefer its
            // structured message over a bare status code.
            return match Envelope::parse(&raw) {
                Ok(envelope) if !envelope.success => Err(envelope.into_api_error()),
                _ => Err(Error::new(ErrorKind::Http {
                    status,
                    message: format!("HTTP {}", status),
                    retry_after: None,
                })),
            };
        }

        let envelope = Envelope::parse(&raw)?;
        if !envelope.success {
            // The provider encodes some failures as 200 OK with
            // success: false.
            return Err(envelope.into_api_error());
        }

        Ok(envelope)
    }
}

/// Parse a Retry-After header as a second count.
fn retry_after_header(response: &reqwest::Response) -> Option<Duration> {
    response
        .headers()
        .get("retry-after")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok())
        .map(Duration::from_secs)
}
