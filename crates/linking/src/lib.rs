//! Channel-linking workflow.
//!
//! Opens a deep link that asks the user to add the agent to a channel, then
//! polls the channel list for a bounded time and verifies ownership of each
//! newly appeared channel exactly once per session.

pub mod coordinator;
pub mod deep_link;
pub mod error;
pub mod refresher;
pub mod types;

pub use coordinator::LinkingCoordinator;
pub use deep_link::DeepLink;
pub use error::LinkingError;
pub use refresher::DashboardRefresher;
pub use types::{EndReason, LinkingConfig, LinkingEvent, SessionInfo, StartOutcome};
