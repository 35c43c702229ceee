//! Narrow capability interface to the messaging host the app runs inside.

use tribute_protocol::constants::AUTH_SCHEME;

/// Failures reported by a host implementation.
#[derive(Debug, thiserror::Error)]
pub enum HostError {
    #[error("messaging host is not available")]
    Unavailable,

    #[error("failed to open {url}: {reason}")]
    OpenFailed { url: String, reason: String },
}

/// What the client needs from the host: open deep links and hand over the
/// signed identity blob used for authentication.
pub trait HostCapability: Send + Sync {
    /// Opens a URL inside (or through) the host.
    fn open_external_link(&self, url: &str) -> Result<(), HostError>;

    /// Raw init data identifying the current user, if the host provides it.
    fn read_init_data(&self) -> Option<String>;

    /// Whether a real host is present.
    fn is_available(&self) -> bool;
}

/// Host stand-in for environments without a messaging host.
///
/// Opening a link is a logged no-op and no init data is ever provided.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullHost;

impl HostCapability for NullHost {
    fn open_external_link(&self, url: &str) -> Result<(), HostError> {
        tracing::debug!(url, "no host available, ignoring external link");
        Ok(())
    }

    fn read_init_data(&self) -> Option<String> {
        None
    }

    fn is_available(&self) -> bool {
        false
    }
}

/// Builds the `Authorization` header value from the host's init data.
///
/// Returns `None` when the host has no (or only blank) init data.
pub fn auth_header_value(host: &dyn HostCapability) -> Option<String> {
    host.read_init_data()
        .filter(|data| !data.trim().is_empty())
        .map(|data| format!("{AUTH_SCHEME} {data}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedHost(Option<String>);

    impl HostCapability for FixedHost {
        fn open_external_link(&self, _url: &str) -> Result<(), HostError> {
            Ok(())
        }

        fn read_init_data(&self) -> Option<String> {
            self.0.clone()
        }

        fn is_available(&self) -> bool {
            true
        }
    }

    #[test]
    fn null_host_has_no_auth() {
        assert!(!NullHost.is_available());
        assert!(NullHost.open_external_link("https://t.me/x").is_ok());
        assert_eq!(auth_header_value(&NullHost), None);
    }

    #[test]
    fn auth_header_uses_scheme() {
        let host = FixedHost(Some("query_id=1&hash=abc".into()));
        assert_eq!(
            auth_header_value(&host).as_deref(),
            Some("TgAuth query_id=1&hash=abc")
        );
    }

    #[test]
    fn blank_init_data_is_ignored() {
        assert_eq!(auth_header_value(&FixedHost(Some("  ".into()))), None);
    }
}
