use std::time::Duration;

use async_trait::async_trait;
use campus_common::error::ErrorClassification;
use campus_core::{ApiRequest, ApiResponse, HttpMethod, HttpTransport, TransportError};
use campus_domain::ClientConfig;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, RETRY_AFTER};
use reqwest::{Client as ReqwestClient, Method};
use tracing::debug;

use crate::errors::IntoTransportError;

/// [`HttpTransport`] implementation on top of reqwest.
///
/// Performs exactly one attempt per call. Retries, refresh and
/// classification live in `campus-core`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: ReqwestClient,
}

impl ReqwestTransport {
    /// Start building a new transport.
    pub fn builder() -> ReqwestTransportBuilder {
        ReqwestTransportBuilder::default()
    }

    /// Transport with the timeouts and user agent from `config`.
    pub fn from_config(config: &ClientConfig) -> Result<Self, TransportError> {
        Self::builder()
            .connect_timeout(config.connect_timeout)
            .read_timeout(config.read_timeout)
            .user_agent(config.user_agent.clone())
            .build()
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        let method = request.method;
        debug!(%method, url = %request.url, "sending HTTP request");

        let mut builder = self.client.request(to_reqwest(method), &request.url);
        if let Some(token) = &request.bearer {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|err| {
            let error = err.into_transport();
            debug!(%method, url = %request.url, %error, severity = %error.severity(), "HTTP request failed");
            error
        })?;

        let status = response.status().as_u16();
        let retry_after = parse_retry_after(response.headers());
        let body = response.text().await.map_err(IntoTransportError::into_transport)?;
        debug!(%method, url = %request.url, status, "received HTTP response");

        let response = ApiResponse::new(status, body);
        Ok(match retry_after {
            Some(delay) => response.with_retry_after(delay),
            None => response,
        })
    }
}

/// Builder for [`ReqwestTransport`].
#[derive(Debug)]
pub struct ReqwestTransportBuilder {
    connect_timeout: Duration,
    read_timeout: Duration,
    request_timeout: Option<Duration>,
    user_agent: Option<String>,
    default_headers: Option<HeaderMap>,
}

impl Default for ReqwestTransportBuilder {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            read_timeout: Duration::from_secs(30),
            request_timeout: None,
            user_agent: None,
            default_headers: None,
        }
    }
}

impl ReqwestTransportBuilder {
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Longest wait for the next chunk of the response, headers included.
    /// Resets after every successful read.
    pub fn read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    /// Overall deadline for one attempt, from sending the request to reading
    /// the last byte of the body. Unset by default.
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    pub fn default_headers(mut self, headers: HeaderMap) -> Self {
        self.default_headers = Some(headers);
        self
    }

    pub fn build(self) -> Result<ReqwestTransport, TransportError> {
        let mut headers = self.default_headers.unwrap_or_default();
        headers.entry(ACCEPT).or_insert_with(|| HeaderValue::from_static("application/json"));

        let mut builder = ReqwestClient::builder()
            .connect_timeout(self.connect_timeout)
            .read_timeout(self.read_timeout)
            .default_headers(headers)
            .no_proxy();

        if let Some(timeout) = self.request_timeout {
            builder = builder.timeout(timeout);
        }

        if let Some(agent) = self.user_agent {
            builder = builder.user_agent(agent);
        }

        let client = builder.build().map_err(IntoTransportError::into_transport)?;
        Ok(ReqwestTransport { client })
    }
}

fn to_reqwest(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Put => Method::PUT,
        HttpMethod::Delete => Method::DELETE,
    }
}

/// Only the delta-seconds form is honoured; HTTP dates are ignored.
fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
    let value = headers.get(RETRY_AFTER)?.to_str().ok()?;
    value.trim().parse::<u64>().ok().map(Duration::from_secs)
}
