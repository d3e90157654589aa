use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Azure returned error (HTTP {status}): {code}: {message}")]
    Cloud {
        status: u16,
        code: String,
        message: String,
    },

    #[error("Failed to parse response: {0}")]
    Parse(String),

    #[error("Authentication failed")]
    Auth,

    #[error("Request timeout after {0} seconds")]
    Timeout(u64),

    #[error("Too many requests, rate limited")]
    RateLimited,

    #[error("Service unavailable, retry later")]
    ServiceUnavailable,

    #[error("Invalid endpoint URL: {0}")]
    InvalidEndpoint(String),

    #[error("Provisioning of {resource} ended in state {state}")]
    ProvisioningFailed { resource: String, state: String },

    #[error("Timed out waiting for {resource} to settle")]
    PollTimeout { resource: String },
}

impl ApiError {
    /// HTTP status carried by a cloud error, if this is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Cloud { status, .. } => Some(*status),
            _ => None,
        }
    }
}
