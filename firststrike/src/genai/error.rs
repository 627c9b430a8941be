//! GenAI error types

use std::time::Duration;
use thiserror::Error;

/// Status marker the provider reports when a quota is exhausted
pub const RESOURCE_EXHAUSTED: &str = "RESOURCE_EXHAUSTED";

/// Errors that can occur during generative AI calls
#[derive(Debug, Error)]
pub enum GenAiError {
    #[error("Rate limited (429), retry after {retry_after:?}: {message}")]
    RateLimited { retry_after: Duration, message: String },

    #[error("API error {status}: {message}")]
    ApiError { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Missing API key: set the {0} environment variable")]
    MissingApiKey(String),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl GenAiError {
    /// Check whether the failure carries a quota-exhaustion signature
    ///
    /// Matches a 429 status, the RESOURCE_EXHAUSTED marker, or either string
    /// anywhere in the rendered message.
    pub fn is_quota_exhausted(&self) -> bool {
        match self {
            GenAiError::RateLimited { .. } => true,
            GenAiError::ApiError { status: 429, .. } => true,
            other => is_quota_signature(&other.to_string()),
        }
    }

    /// Check if this error is retryable
    pub fn is_retryable(&self) -> bool {
        match self {
            GenAiError::RateLimited { .. } => true,
            GenAiError::ApiError { status, .. } => *status >= 500 || *status == 408,
            GenAiError::Network(_) => true,
            GenAiError::InvalidResponse(_) => false,
            GenAiError::MissingApiKey(_) => false,
            GenAiError::Json(_) => false,
        }
    }

    /// Get the retry duration if this is a rate limit error
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            GenAiError::RateLimited { retry_after, .. } => Some(*retry_after),
            _ => None,
        }
    }
}

/// Why an auxiliary generation (recon image, audio briefing) produced nothing
///
/// Callers of the public APIs only see `None`; this keeps the distinction
/// available to logs and to any caller that wants a retry policy.
#[derive(Debug, Error)]
pub enum GenerationFailure {
    /// The model answered but carried no usable payload
    #[error("Model returned no payload")]
    NotAvailable,

    /// The call itself failed
    #[error("Generation call failed: {0}")]
    Failed(#[from] GenAiError),
}

impl GenerationFailure {
    /// Whether trying again might produce a payload
    pub fn is_retryable(&self) -> bool {
        match self {
            GenerationFailure::NotAvailable => false,
            GenerationFailure::Failed(e) => e.is_retryable(),
        }
    }
}

/// Check a failure message for the quota-exhaustion signature
pub fn is_quota_signature(message: &str) -> bool {
    message.contains("429") || message.contains(RESOURCE_EXHAUSTED)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rate_limited() -> GenAiError {
        GenAiError::RateLimited {
            retry_after: Duration::from_secs(60),
            message: "RESOURCE_EXHAUSTED".to_string(),
        }
    }

    #[test]
    fn test_is_quota_exhausted() {
        assert!(rate_limited().is_quota_exhausted());

        assert!(
            GenAiError::ApiError {
                status: 429,
                message: String::new()
            }
            .is_quota_exhausted()
        );

        // Marker inside an otherwise generic failure
        assert!(GenAiError::InvalidResponse("upstream said RESOURCE_EXHAUSTED".to_string()).is_quota_exhausted());
        assert!(GenAiError::InvalidResponse("429 Too Many Requests".to_string()).is_quota_exhausted());

        assert!(
            !GenAiError::ApiError {
                status: 503,
                message: "UNAVAILABLE".to_string()
            }
            .is_quota_exhausted()
        );
        assert!(!GenAiError::InvalidResponse("connection reset".to_string()).is_quota_exhausted());
    }

    #[test]
    fn test_rate_limited_message_carries_status() {
        assert!(is_quota_signature(&rate_limited().to_string()));
    }

    #[test]
    fn test_is_retryable() {
        assert!(rate_limited().is_retryable());

        // 5xx errors should be retryable
        assert!(
            GenAiError::ApiError {
                status: 502,
                message: "Bad gateway".to_string()
            }
            .is_retryable()
        );

        // 4xx errors should not be retryable
        assert!(
            !GenAiError::ApiError {
                status: 400,
                message: "Bad request".to_string()
            }
            .is_retryable()
        );

        assert!(!GenAiError::InvalidResponse("Bad JSON".to_string()).is_retryable());
        assert!(!GenAiError::MissingApiKey("GEMINI_API_KEY".to_string()).is_retryable());
    }

    #[test]
    fn test_generation_failure_retryability() {
        assert!(!GenerationFailure::NotAvailable.is_retryable());
        assert!(GenerationFailure::from(rate_limited()).is_retryable());
        assert!(!GenerationFailure::Failed(GenAiError::InvalidResponse("bad".to_string())).is_retryable());
    }

    #[test]
    fn test_retry_after() {
        let err = GenAiError::RateLimited {
            retry_after: Duration::from_secs(42),
            message: String::new(),
        };
        assert_eq!(err.retry_after(), Some(Duration::from_secs(42)));

        let err = GenAiError::ApiError {
            status: 500,
            message: "Server error".to_string(),
        };
        assert_eq!(err.retry_after(), None);
    }
}
