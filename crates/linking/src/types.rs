//! Linking configuration, events and read model.

use std::collections::HashSet;
use std::time::Duration;

use tokio::time::Instant;

use crate::deep_link::DeepLink;
use crate::error::LinkingError;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1500);
pub const DEFAULT_SESSION_TIMEOUT: Duration = Duration::from_secs(30);

const MIN_POLL_INTERVAL: Duration = Duration::from_secs(1);
const MAX_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Configuration for linking sessions.
///
/// Fields are only reachable through the builders, so the poll interval
/// always stays within range and the session lifetime stays fixed.
#[derive(Debug, Clone)]
pub struct LinkingConfig {
    /// Delay between channel-list polls.
    poll_interval: Duration,
    /// Lifetime of a session before it ends on its own.
    session_timeout: Duration,
    deep_link: DeepLink,
}

impl Default for LinkingConfig {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            session_timeout: DEFAULT_SESSION_TIMEOUT,
            deep_link: DeepLink::default(),
        }
    }
}

impl LinkingConfig {
    /// Sets the poll interval; accepted range is 1 to 2 seconds.
    pub fn with_poll_interval(mut self, interval: Duration) -> Result<Self, LinkingError> {
        if !(MIN_POLL_INTERVAL..=MAX_POLL_INTERVAL).contains(&interval) {
            return Err(LinkingError::InvalidPollInterval(interval));
        }
        self.poll_interval = interval;
        Ok(self)
    }

    pub fn with_deep_link(mut self, deep_link: DeepLink) -> Self {
        self.deep_link = deep_link;
        self
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    pub fn session_timeout(&self) -> Duration {
        self.session_timeout
    }

    pub fn deep_link(&self) -> &DeepLink {
        &self.deep_link
    }
}

/// Why a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndReason {
    Cancelled,
    TimedOut,
}

/// Events emitted by the coordinator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkingEvent {
    /// The deep link was opened and polling began.
    Started { session: u64 },
    /// Ownership of a new channel was verified.
    ChannelLinked { session: u64, channel_id: String },
    Ended { session: u64, reason: EndReason },
}

/// Result of `start_linking()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    Started(u64),
    AlreadyInProgress,
}

/// Snapshot of the linking session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionInfo {
    pub in_progress: bool,
    pub checked_channel_ids: HashSet<String>,
    pub started_at: Option<Instant>,
    pub deadline: Option<Instant>,
}
