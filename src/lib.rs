//! # dnsfilter-api
//!
//! Resilient HTTP JSON client core for a DNS-filtering provider's REST API.
//!
//! This crate provides the reusable plumbing a generated endpoint binding
//! sits on top of:
//! - Wire scalar codecs for the provider's JSON quirks (booleans as `0`/`1`,
//!   Unix-second timestamps, `YYYY-MM-DD` dates, IP address literals)
//! - The `{success, body, message, errors}` response envelope, validated
//!   before any endpoint-specific decoding
//! - A transport with automatic retry (exponential backoff and jitter),
//!   client-side rate limiting, and per-request cancellation
//! - An immutable client configuration built once and shared by all calls
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  Endpoint wrappers (callers)                │
//! │  devices, profiles, rules, filters, services, analytics...  │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        ApiClient                            │
//! │  - Holds base URL + bearer token                            │
//! │  - Typed JSON methods (get_json, post_json, ...)            │
//! │  - Required-identifier validation                           │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      HttpTransport                          │
//! │  - Rate-limiter permit, retry loop, cancellation            │
//! │  - Envelope parsing and API error unwrapping                │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use dnsfilter_api::{ApiClient, ClientConfig, RetryConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), dnsfilter_api::Error> {
//!     let client = ApiClient::with_config(
//!         "https://api.example.com",
//!         std::env::var("API_TOKEN").unwrap(),
//!         ClientConfig::builder()
//!             .with_retry(RetryConfig::default().with_max_attempts(5))
//!             .with_rate_limit(10)
//!             .build(),
//!     )?;
//!
//!     let devices: DeviceList = client.get_json("/devices").await?;
//!     Ok(())
//! }
//! ```

mod api;
mod client;
mod config;
mod envelope;
mod error;
mod rate_limit;
mod request;
mod retry;
pub mod scalar;

pub use api::ApiClient;
pub use client::HttpTransport;
pub use config::{ClientConfig, ClientConfigBuilder};
pub use envelope::{Envelope, ErrorDetail};
pub use error::{Error, ErrorKind, Result};
pub use rate_limit::RateLimiter;
pub use request::{RequestBody, RequestBuilder, RequestMethod};
pub use retry::{RetryConfig, RetryPolicy};
pub use scalar::{DateOnly, IntBool, IpAddress, UnixTime};

/// User-Agent string for the client.
pub const USER_AGENT: &str = concat!("dnsfilter-api/", env!("CARGO_PKG_VERSION"));
