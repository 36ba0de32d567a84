use reqwest::StatusCode;
use serde_json::{json, Value};
use thiserror::Error;

/// A non-success HTTP response from either upstream API. Authentication failures, missing
/// resources, rate limiting and server errors all share this one shape.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("there was an error when fetching resources: {code} {reason}")]
pub struct UpstreamError {
    code: u16,
    reason: String,
}

impl UpstreamError {
    pub fn new(status: StatusCode) -> Self {
        Self {
            code: status.as_u16(),
            reason: status.canonical_reason().unwrap_or("Unknown").to_owned(),
        }
    }

    pub fn code(&self) -> u16 {
        self.code
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    #[error("request could not be completed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("response did not have the expected shape: {0}")]
    Decode(#[from] serde_json::Error),
}

impl FetchError {
    pub fn upstream(&self) -> Option<&UpstreamError> {
        match self {
            Self::Upstream(upstream) => Some(upstream),
            _ => None,
        }
    }

    /// Renders the error as `{"error": "<message>"}` for consumers that expect plain data.
    pub fn to_sentinel(&self) -> Value {
        json!({ "error": self.to_string() })
    }
}

/// The outcome of fetching a single resource.
pub type RemoteResource = Result<Value, FetchError>;
