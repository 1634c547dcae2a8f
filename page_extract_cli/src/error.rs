use thiserror::Error;

/// Failures raised while pulling records out of a parsed page.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("invalid url `{url}`: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("no processor registered for host `{host}`")]
    NoProcessor { host: String },

    #[error("invalid selector `{0}`")]
    Selector(String),
}

impl ExtractError {
    /// `true` when the page simply has no site processor, as opposed to a
    /// processor that failed.
    pub fn is_no_processor(&self) -> bool {
        matches!(self, ExtractError::NoProcessor { .. })
    }
}

/// Failures of the fetch path, either direct or through the relay.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP {status}: {status_text}")]
    Http { status: u16, status_text: String },

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The relay channel itself could not deliver the exchange.
    #[error("relay delivery failed: {0}")]
    Delivery(String),

    /// The relay answered with `success: false`.
    #[error("{0}")]
    Rejected(String),
}

impl FetchError {
    /// Network errors and 5xx answers are worth another attempt.
    pub fn is_transient(&self) -> bool {
        match self {
            FetchError::Http { status, .. } => *status >= 500,
            FetchError::Transport(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            FetchError::Delivery(_) | FetchError::Rejected(_) => false,
        }
    }
}
