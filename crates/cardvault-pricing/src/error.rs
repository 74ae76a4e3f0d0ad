use thiserror::Error;

/// Errors returned by the remote pricing API client.
#[derive(Debug, Error)]
pub enum PricingError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// 429 or a gateway-class 5xx; retried until attempts run out.
    #[error("transient HTTP status {status} from {endpoint}")]
    Transient { status: u16, endpoint: String },

    #[error("unexpected HTTP status {status} from {endpoint}")]
    UnexpectedStatus { status: u16, endpoint: String },

    /// The API answered 2xx with `"status": "error"`.
    #[error("pricing API error: {0}")]
    Api(String),

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid base URL \"{base_url}\": {reason}")]
    InvalidBaseUrl { base_url: String, reason: String },
}

impl PricingError {
    /// Returns `true` for failures worth retrying after a back-off delay.
    ///
    /// Transient statuses plus network timeouts and connection failures.
    /// Everything else is permanent: retrying a 404, a malformed body, or an
    /// API-level rejection returns the same answer.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            PricingError::Transient { .. } => true,
            PricingError::Http(e) => e.is_timeout() || e.is_connect(),
            PricingError::UnexpectedStatus { .. }
            | PricingError::Api(_)
            | PricingError::Deserialize { .. }
            | PricingError::InvalidBaseUrl { .. } => false,
        }
    }
}
