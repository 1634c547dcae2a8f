//! Page fetching: the privileged relay, its wire format, and the client that
//! talks to it.

use std::time::Duration;

use async_trait::async_trait;
use backoff::{future::retry, ExponentialBackoff, ExponentialBackoffBuilder};
use reqwest::header::USER_AGENT;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::FetchError;

pub const RELAY_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";
const FALLBACK_ERROR: &str = "Failed to fetch content";

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    #[serde(rename = "FETCH_URL")]
    FetchUrl,
}

/// Message sent to the relay.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    #[serde(rename = "type")]
    pub kind: RequestKind,
    pub url: String,
}

impl FetchRequest {
    pub fn fetch_url(url: impl Into<String>) -> Self {
        Self {
            kind: RequestKind::FetchUrl,
            url: url.into(),
        }
    }
}

/// The relay's answer; failures travel in `success`/`error`, never as HTTP
/// errors of the relay itself.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FetchResponse {
    pub fn ok(html: String) -> Self {
        Self { success: true, html: Some(html), error: None }
    }

    pub fn failed(error: String) -> Self {
        Self { success: false, html: None, error: Some(error) }
    }

    /// Content-side reading of a response.
    pub fn into_html(self) -> Result<String, FetchError> {
        match self {
            FetchResponse { success: true, html: Some(html), .. } if !html.is_empty() => Ok(html),
            FetchResponse { error, .. } => Err(FetchError::Rejected(
                error.filter(|e| !e.is_empty()).unwrap_or_else(|| FALLBACK_ERROR.to_string()),
            )),
        }
    }
}

#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch_html(&self, url: &str) -> Result<String, FetchError>;
}

#[derive(Debug, Clone, Default)]
pub struct FetchOptions {
    pub timeout: Option<Duration>,
    /// Extra attempts for transient failures. Zero disables retrying.
    pub retries: usize,
    /// First wait between attempts; the backoff default when unset.
    pub retry_interval: Option<Duration>,
}

/// Direct HTTP GET with the relay's fixed User-Agent.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    retries: usize,
    retry_interval: Option<Duration>,
}

impl HttpFetcher {
    pub fn new(options: FetchOptions) -> Result<Self, FetchError> {
        let mut builder = Client::builder();
        if let Some(timeout) = options.timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
            retries: options.retries,
            retry_interval: options.retry_interval,
        })
    }

    fn backoff(&self) -> ExponentialBackoff {
        match self.retry_interval {
            Some(interval) => ExponentialBackoffBuilder::new()
                .with_initial_interval(interval)
                .with_max_interval(interval * 4)
                .build(),
            None => ExponentialBackoff::default(),
        }
    }

    async fn get_once(&self, url: &str) -> Result<String, FetchError> {
        debug!(%url, "fetching");
        let res = self
            .client
            .get(url)
            .header(USER_AGENT, RELAY_USER_AGENT)
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            return Err(FetchError::Http {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or_default().to_string(),
            });
        }
        Ok(res.text().await?)
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch_html(&self, url: &str) -> Result<String, FetchError> {
        if self.retries == 0 {
            return self.get_once(url).await;
        }

        let mut attempt = 0;
        retry(self.backoff(), || {
            attempt += 1;
            let attempt = attempt;
            async move {
                self.get_once(url).await.map_err(|e| {
                    if e.is_transient() && attempt <= self.retries {
                        warn!(%url, attempt, error = %e, "fetch failed, retrying");
                        backoff::Error::transient(e)
                    } else {
                        backoff::Error::permanent(e)
                    }
                })
            }
        })
        .await
    }
}

/// Serves one relay request.
pub async fn handle_fetch_request<F>(fetcher: &F, request: &FetchRequest) -> FetchResponse
where
    F: PageFetcher + ?Sized,
{
    match fetcher.fetch_html(&request.url).await {
        Ok(html) => FetchResponse::ok(html),
        Err(e) => {
            warn!(url = %request.url, error = %e, "relay fetch error");
            FetchResponse::failed(e.to_string())
        }
    }
}

/// Fetches pages through a relay endpoint, the way a content script that
/// cannot cross origins would.
#[derive(Debug, Clone)]
pub struct RelayClient {
    client: Client,
    endpoint: String,
}

impl RelayClient {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl PageFetcher for RelayClient {
    async fn fetch_html(&self, url: &str) -> Result<String, FetchError> {
        let res = self
            .client
            .post(&self.endpoint)
            .json(&FetchRequest::fetch_url(url))
            .send()
            .await
            .map_err(|e| FetchError::Delivery(e.to_string()))?;

        if !res.status().is_success() {
            return Err(FetchError::Delivery(format!("relay answered {}", res.status())));
        }

        let response: FetchResponse = res
            .json()
            .await
            .map_err(|e| FetchError::Delivery(e.to_string()))?;
        response.into_html()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    struct Canned(Result<&'static str, u16>);

    #[async_trait]
    impl PageFetcher for Canned {
        async fn fetch_html(&self, _url: &str) -> Result<String, FetchError> {
            match self.0 {
                Ok(html) => Ok(html.to_string()),
                Err(status) => Err(FetchError::Http {
                    status,
                    status_text: "Not Found".into(),
                }),
            }
        }
    }

    #[test]
    fn request_wire_format() {
        let req = FetchRequest::fetch_url("https://example.com");
        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            json!({ "type": "FETCH_URL", "url": "https://example.com" })
        );
        assert!(serde_json::from_value::<FetchRequest>(json!({ "type": "OTHER", "url": "x" })).is_err());
    }

    #[test]
    fn response_reading() {
        assert_eq!(FetchResponse::ok("<p>".into()).into_html().unwrap(), "<p>");

        let err = FetchResponse::failed("HTTP 500: Internal Server Error".into())
            .into_html()
            .unwrap_err();
        assert_eq!(err.to_string(), "HTTP 500: Internal Server Error");

        let bare = FetchResponse { success: false, html: None, error: None };
        assert_eq!(bare.into_html().unwrap_err().to_string(), FALLBACK_ERROR);

        let empty = FetchResponse { success: true, html: Some(String::new()), error: None };
        assert_eq!(empty.into_html().unwrap_err().to_string(), FALLBACK_ERROR);
    }

    #[tokio::test]
    async fn relay_maps_outcomes() {
        let req = FetchRequest::fetch_url("https://example.com");

        let ok = handle_fetch_request(&Canned(Ok("<html></html>")), &req).await;
        assert_eq!(ok, FetchResponse::ok("<html></html>".into()));

        let failed = handle_fetch_request(&Canned(Err(404)), &req).await;
        assert_eq!(failed, FetchResponse::failed("HTTP 404: Not Found".into()));
    }

    #[test]
    fn only_server_errors_are_transient() {
        let client_err = FetchError::Http { status: 404, status_text: "Not Found".into() };
        let server_err = FetchError::Http { status: 503, status_text: "Service Unavailable".into() };
        assert!(!client_err.is_transient());
        assert!(server_err.is_transient());
    }
}
