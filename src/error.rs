use thiserror::Error;

/// Failure surfaced by the HTTP adapter and everything layered on it.
///
/// Endpoint groups pass this through untouched; bindings flatten it to a
/// message string in their `error` field.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApiError {
    /// The request never produced a response (connect, DNS, timeout, reset).
    #[error("Network error: {0}")]
    Network(String),

    /// The backend answered with a non-2xx status.
    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    /// A 2xx body that could not be parsed into the expected shape.
    #[error("Failed to decode response: {0}")]
    Decode(String),

    /// Local persistence (token file, search history) failed.
    #[error("Storage error: {0}")]
    Storage(String),

    /// The owning binding was disposed before the call could run.
    #[error("Request cancelled: binding disposed")]
    Cancelled,
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    pub fn is_client_error(&self) -> bool {
        matches!(self.status(), Some(400..=499))
    }

    pub fn is_server_error(&self) -> bool {
        matches!(self.status(), Some(500..=599))
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Decode(err.to_string())
    }
}

impl From<std::io::Error> for ApiError {
    fn from(err: std::io::Error) -> Self {
        ApiError::Storage(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_classification() {
        let not_found = ApiError::Status {
            status: 404,
            message: "missing".into(),
        };
        assert!(not_found.is_not_found());
        assert!(not_found.is_client_error());
        assert!(!not_found.is_server_error());

        let boom = ApiError::Status {
            status: 503,
            message: "down".into(),
        };
        assert!(boom.is_server_error());
        assert_eq!(boom.to_string(), "HTTP 503: down");

        let net = ApiError::Network("refused".into());
        assert_eq!(net.status(), None);
        assert!(!net.is_client_error());
    }
}
