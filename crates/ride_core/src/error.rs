use thiserror::Error;

/// Failures surfaced by the ride services.
///
/// Services never recover from these internally; they propagate to the caller
/// unchanged. Retrying belongs at the collaborator boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RideError {
    /// Out-of-range coordinates or a malformed request. Never retried.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// Unknown ride or driver id. Only a real backend raises this.
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },
    /// Geocoding or dispatch backend failure. The simulation never raises this.
    #[error("upstream unavailable: {0}")]
    UpstreamUnavailable(String),
}

impl RideError {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::UpstreamUnavailable(_))
    }
}

pub type Result<T> = std::result::Result<T, RideError>;
