//! Error types for the linking workflow.

use std::time::Duration;

use tribute_gateway::HostError;

#[derive(Debug, thiserror::Error)]
pub enum LinkingError {
    #[error("failed to open deep link: {0}")]
    Host(#[from] HostError),

    #[error("poll interval {0:?} outside the supported 1-2 s range")]
    InvalidPollInterval(Duration),
}
