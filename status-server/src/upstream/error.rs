//! Upstream client error types.

/// Errors from the transit proxy client.
///
/// Every variant is absorbed by the fetch orchestrator; nothing above that
/// layer observes these as errors.
#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    /// HTTP request failed (network error, timeout, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Rate limited by the provider (HTTP 429). Transient; serve stale.
    #[error("rate limited by transit provider")]
    RateLimited,

    /// The proxy has no provider credentials configured. Permanent until
    /// redeployed; not worth retrying per request.
    #[error("transit integration not configured")]
    NotConfigured,

    /// Provider returned an unexpected error status.
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Response body could not be parsed at all.
    #[error("JSON parse error: {message}")]
    Json {
        message: String,
        body: Option<String>,
    },
}

impl UpstreamError {
    /// Short machine-readable label for logs and diagnostics.
    pub fn label(&self) -> &'static str {
        match self {
            UpstreamError::Http(_) => "http",
            UpstreamError::RateLimited => "rate-limited",
            UpstreamError::NotConfigured => "not-configured",
            UpstreamError::Api { .. } => "api-error",
            UpstreamError::Json { .. } => "malformed",
        }
    }
}
