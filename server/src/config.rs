use std::env;
use std::time::Duration;

use anyhow::Context;
use axum::http::{header, HeaderValue, Method};
use page_extract_cli::fetch::FetchOptions;
use tower_http::cors::CorsLayer;

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String,
    /// The only origin allowed through CORS.
    pub client_url: String,
    pub fetch: FetchOptions,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let bind_addr = var("BIND_ADDR").unwrap_or_else(|| "127.0.0.1:3000".to_string());
        let client_url = var("CLIENT_URL")
            .filter(|v| !v.is_empty())
            .context("CLIENT_URL must be set")?;

        let timeout = match var("FETCH_TIMEOUT_SECS") {
            Some(v) => Some(Duration::from_secs(
                v.parse().context("FETCH_TIMEOUT_SECS must be a number of seconds")?,
            )),
            None => None,
        };
        let retries = match var("FETCH_RETRIES") {
            Some(v) => v.parse().context("FETCH_RETRIES must be a non-negative integer")?,
            None => 0,
        };

        Ok(Self {
            bind_addr,
            client_url,
            fetch: FetchOptions {
                timeout,
                retries,
                ..FetchOptions::default()
            },
        })
    }

    pub fn cors(&self) -> anyhow::Result<CorsLayer> {
        let origin = self
            .client_url
            .parse::<HeaderValue>()
            .context("CLIENT_URL is not a valid origin")?;
        Ok(CorsLayer::new()
            .allow_origin(origin)
            .allow_methods([Method::POST, Method::GET, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE])
            .allow_credentials(true))
    }
}
