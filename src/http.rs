//! HTTP client for the catalog service.
//!
//! This module provides a thin wrapper around `reqwest::Client` that adds:
//! * Consistent keepalive, user agent and headers
//! * An optional overall request timeout
//! * Conversion of non-success status codes into errors
//!
//! # Example
//!
//! ```rust
//! use reelplay::{config::Config, http::Client};
//!
//! let config = Config::default();
//! let client = Client::new(&config)?;
//!
//! let request = client.get(config.catalog_url.clone());
//! let response = client.execute(request).await?;
//! ```

use std::{future::Future, time::Duration};

use futures_util::{FutureExt, TryFutureExt};
use reqwest::{
    header::{HeaderMap, HeaderValue, ACCEPT},
    Method, Url,
};

use crate::{config::Config, error::Result};

/// HTTP client with consistent configuration.
pub struct Client {
    /// Underlying client, for callers that need the raw API.
    pub inner: reqwest::Client,
}

impl Client {
    /// Duration to keep idle connections alive.
    const KEEPALIVE_TIMEOUT: Duration = Duration::from_secs(60);

    /// The catalog is plain text; say so.
    const PLAIN_TEXT: HeaderValue = HeaderValue::from_static("text/plain");

    /// Creates a new client.
    ///
    /// When `config.timeout_secs` is set, it bounds every request from
    /// connection to the end of the response body. Without it requests may
    /// wait indefinitely.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// * HTTP client creation fails
    /// * the user agent is not a valid header value
    pub fn new(config: &Config) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, Self::PLAIN_TEXT);

        let mut http_client = reqwest::Client::builder()
            .tcp_keepalive(Self::KEEPALIVE_TIMEOUT)
            .default_headers(headers)
            .user_agent(&config.user_agent);

        if let Some(timeout) = config.timeout() {
            debug!("http timeout: {timeout:?}");
            http_client = http_client.timeout(timeout);
        }

        Ok(Self {
            inner: http_client.build()?,
        })
    }

    /// Builds a request with specified method and URL.
    pub fn request<U>(&self, method: Method, url: U) -> reqwest::Request
    where
        U: Into<Url>,
    {
        reqwest::Request::new(method, url.into())
    }

    /// Builds a GET request.
    pub fn get<U>(&self, url: U) -> reqwest::Request
    where
        U: Into<Url>,
    {
        self.request(Method::GET, url)
    }

    /// Executes a request.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// * Request execution fails
    /// * Network error occurs
    /// * The response status is not a success
    pub fn execute(
        &self,
        request: reqwest::Request,
    ) -> impl Future<Output = Result<reqwest::Response>> + '_ {
        trace!("{} {}", request.method(), request.url());
        self.inner
            .execute(request)
            .map(|result| result.and_then(reqwest::Response::error_for_status))
            .map_err(Into::into)
    }
}
