//! Client error types

use thiserror::Error;

/// Failure talking to the log endpoint
#[derive(Debug, Error)]
pub enum ClientError {
    /// Service answered with a non-success status
    #[error("{message}")]
    Request { status: u16, message: String },

    /// Request never completed
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Body did not have the expected shape
    #[error("Invalid response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ClientError {
    /// Build a status error from the response body.
    ///
    /// Uses the `detail` string when the service sent one.
    pub fn from_status(status: u16, body: &str) -> Self {
        let detail = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|v| v.get("detail").and_then(|d| d.as_str()).map(str::to_string));

        Self::Request {
            status,
            message: detail.unwrap_or_else(|| format!("Request failed (HTTP {})", status)),
        }
    }

    /// HTTP status, if the service answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Request { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network(_))
    }
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detail_message_is_used() {
        let err = ClientError::from_status(401, r#"{"detail":"Invalid authentication credentials"}"#);
        assert_eq!(err.to_string(), "Invalid authentication credentials");
        assert_eq!(err.status(), Some(401));
    }

    #[test]
    fn test_generic_message_without_detail() {
        let err = ClientError::from_status(500, "<html>oops</html>");
        assert_eq!(err.to_string(), "Request failed (HTTP 500)");

        // Validation errors carry a list, not a string
        let err = ClientError::from_status(422, r#"{"detail":[{"loc":["query","limit"]}]}"#);
        assert_eq!(err.to_string(), "Request failed (HTTP 422)");
        assert!(!err.is_network());
    }
}
