use std::time::Duration;

use listify_domain::{HttpConfig, ListifyError};
use reqwest::{Client as ReqwestClient, Method, RequestBuilder, Response};
use tracing::debug;

use crate::errors::InfraError;

/// Thin wrapper over `reqwest` shared by the Spotify and Listify clients.
///
/// Retries cover transport failures and 5xx responses and only happen when
/// `max_attempts > 1`. Anything status-specific (401 replay, error bodies)
/// is left to the API clients.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: ReqwestClient,
    max_attempts: usize,
    base_backoff: Duration,
}

impl HttpClient {
    /// Start building a new HTTP client.
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::default()
    }

    /// Convenience constructor with default configuration.
    ///
    /// # Errors
    /// Returns `ListifyError::Config` if the TLS backend cannot be initialised
    pub fn new() -> Result<Self, ListifyError> {
        Self::builder().build()
    }

    /// Client configured from the `http` section of the application config.
    ///
    /// # Errors
    /// See [`HttpClient::new`]
    pub fn from_config(config: &HttpConfig) -> Result<Self, ListifyError> {
        Self::configured(config).build()
    }

    /// Builder pre-populated from the `http` section, for callers that add
    /// their own settings (such as a user agent) before building.
    pub fn configured(config: &HttpConfig) -> HttpClientBuilder {
        let builder = Self::builder().max_attempts(config.max_attempts);
        match config.timeout_secs {
            Some(secs) => builder.timeout(Duration::from_secs(secs)),
            None => builder,
        }
    }

    /// Create a request builder using the underlying reqwest client.
    pub fn request<U>(&self, method: Method, url: U) -> RequestBuilder
    where
        U: reqwest::IntoUrl,
    {
        self.client.request(method, url)
    }

    /// Send `builder`, retrying transport failures and 5xx responses while
    /// attempts remain.
    ///
    /// # Errors
    /// Returns `ListifyError::Network` when the final attempt fails at the
    /// transport level. Non-success statuses are returned as responses.
    pub async fn send(&self, builder: RequestBuilder) -> Result<Response, ListifyError> {
        let attempts = self.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            let request = builder
                .try_clone()
                .ok_or_else(|| {
                    ListifyError::Internal("streaming request bodies cannot be retried".into())
                })?
                .build()
                .map_err(|err| ListifyError::from(InfraError::from(err)))?;
            let (method, url) = (request.method().clone(), request.url().clone());
            let retries_left = attempt < attempts;

            debug!(attempt, %method, %url, "sending HTTP request");
            match self.client.execute(request).await {
                Ok(response) if response.status().is_server_error() && retries_left => {
                    debug!(attempt, %method, %url, status = %response.status(), "retrying");
                }
                Ok(response) => {
                    debug!(attempt, %method, %url, status = %response.status(), "HTTP response");
                    return Ok(response);
                }
                Err(err) if retries_left && is_transient(&err) => {
                    debug!(attempt, %method, %url, error = %err, "transport error, retrying");
                }
                Err(err) => return Err(InfraError::from(err).into()),
            }

            tokio::time::sleep(self.backoff_delay(attempt)).await;
            attempt += 1;
        }
    }

    /// Delay before retry number `retry` (1-based): the base backoff doubled
    /// per prior retry, capped at 2^8.
    fn backoff_delay(&self, retry: usize) -> Duration {
        let exponent = u32::try_from(retry.saturating_sub(1).min(8)).unwrap_or(8);
        self.base_backoff.saturating_mul(1 << exponent)
    }
}

/// Builder for [`HttpClient`].
#[derive(Debug)]
pub struct HttpClientBuilder {
    timeout: Option<Duration>,
    max_attempts: usize,
    base_backoff: Duration,
    user_agent: Option<String>,
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self {
            timeout: None,
            max_attempts: 1,
            base_backoff: Duration::from_millis(200),
            user_agent: None,
        }
    }
}

impl HttpClientBuilder {
    /// Per-request timeout; without one the transport default applies.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Configure the total number of attempts (initial try + retries).
    pub fn max_attempts(mut self, attempts: usize) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    pub fn base_backoff(mut self, backoff: Duration) -> Self {
        self.base_backoff = backoff;
        self
    }

    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// # Errors
    /// Returns `ListifyError::Config` if the reqwest client cannot be built
    pub fn build(self) -> Result<HttpClient, ListifyError> {
        let mut builder = ReqwestClient::builder().no_proxy();

        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }

        if let Some(agent) = self.user_agent {
            builder = builder.user_agent(agent);
        }

        let client = builder.build().map_err(|err| {
            ListifyError::Config(format!("failed to build HTTP client: {err}"))
        })?;

        Ok(HttpClient {
            client,
            max_attempts: self.max_attempts.max(1),
            base_backoff: self.base_backoff,
        })
    }
}

fn is_transient(err: &reqwest::Error) -> bool {
    err.is_timeout() || err.is_request() || err.is_connect()
}
