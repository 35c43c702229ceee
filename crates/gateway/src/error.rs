//! Gateway error taxonomy.

/// Generic text shown for transport failures.
pub const NETWORK_ERROR_MESSAGE: &str = "Network error - please check your internet connection";

/// Failures of a gateway call.
///
/// Holds only owned strings so results can be cloned into state snapshots.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GatewayError {
    /// `GET /dashboard` answered 404: the identity is not onboarded yet.
    #[error("dashboard not found")]
    NotFound,

    #[error("network error: {0}")]
    Network(String),

    /// Non-2xx response. `message` is the server-supplied text when present.
    #[error("server error {status}: {message}")]
    Server { status: u16, message: String },

    /// 2xx response whose body did not match the expected shape.
    #[error("unexpected response body: {0}")]
    Decode(String),

    #[error("invalid authorization header")]
    InvalidAuthHeader,
}

impl GatewayError {
    pub(crate) fn network(e: reqwest::Error) -> Self {
        GatewayError::Network(e.to_string())
    }

    /// HTTP status of a server error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            GatewayError::Server { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Text suitable for showing to the user.
    pub fn user_message(&self) -> String {
        match self {
            GatewayError::NotFound => "Resource not found".into(),
            GatewayError::Network(_) => NETWORK_ERROR_MESSAGE.into(),
            GatewayError::Server { message, .. } => message.clone(),
            GatewayError::Decode(_) => "Unexpected response from server".into(),
            GatewayError::InvalidAuthHeader => "Invalid host credentials".into(),
        }
    }

    /// True for failures a plain retry may fix.
    pub fn is_retryable(&self) -> bool {
        match self {
            GatewayError::Network(_) => true,
            GatewayError::Server { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn network_error_has_generic_message() {
        let err = GatewayError::Network("connection refused".into());
        assert_eq!(err.user_message(), NETWORK_ERROR_MESSAGE);
        assert!(err.is_retryable());
    }

    #[test]
    fn server_error_surfaces_server_text() {
        let err = GatewayError::Server {
            status: 403,
            message: "card rejected".into(),
        };
        assert_eq!(err.user_message(), "card rejected");
        assert_eq!(err.status(), Some(403));
        assert!(!err.is_retryable());
    }
}
