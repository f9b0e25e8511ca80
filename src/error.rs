//! Error types for query validation and the search service call

use thiserror::Error;

/// Message shown when a failure carries no usable detail
pub const GENERIC_FAILURE_MESSAGE: &str = "An error occurred during the search.";

/// Problems with the form input, detected before any request is made
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    /// Search text is empty or whitespace. Treated as a no-op, never shown.
    #[error("search text is empty")]
    EmptyText,
    #[error("Maximum pages must be greater than or equal to minimum pages.")]
    InvertedPageRange { min: u32, max: u32 },
    #[error("'{0}' is not a valid result count (10 to 100, in steps of 10)")]
    InvalidResultCount(String),
}

/// Failure talking to the search service
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Service answered with a non-success status
    #[error("search service returned HTTP {status}")]
    Http {
        status: u16,
        detail: Option<String>,
    },
    #[error("search service request timed out")]
    Timeout,
    #[error("could not reach search service: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("malformed search service response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ServiceError {
    /// Text to show the user for this failure.
    ///
    /// Only an error body from the service carries a detail worth showing;
    /// everything else gets the generic message.
    pub fn user_message(&self) -> String {
        match self {
            ServiceError::Http {
                detail: Some(detail),
                ..
            } => detail.clone(),
            _ => GENERIC_FAILURE_MESSAGE.to_string(),
        }
    }
}

impl From<reqwest::Error> for ServiceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ServiceError::Timeout
        } else {
            ServiceError::Transport(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_detail_is_user_message() {
        let err = ServiceError::Http {
            status: 429,
            detail: Some("rate limited".to_string()),
        };
        assert_eq!(err.user_message(), "rate limited");
    }

    #[test]
    fn test_missing_detail_falls_back() {
        let err = ServiceError::Http {
            status: 500,
            detail: None,
        };
        assert_eq!(err.user_message(), GENERIC_FAILURE_MESSAGE);
        assert_eq!(ServiceError::Timeout.user_message(), GENERIC_FAILURE_MESSAGE);
    }

    #[test]
    fn test_decode_error_falls_back() {
        let err: ServiceError = serde_json::from_str::<serde_json::Value>("{")
            .unwrap_err()
            .into();
        assert_eq!(err.user_message(), GENERIC_FAILURE_MESSAGE);
    }
}
