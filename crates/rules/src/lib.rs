//! Stateless business rules for the creator client.
//!
//! Every function here is pure: no I/O, no clocks except where the caller
//! passes `now` explicitly. The use-case layer runs these checks before it
//! touches the network.

pub mod channel;
pub mod error;
pub mod history;
pub mod identity;
pub mod money;
pub mod payout;

// Re-export primary types for convenience.
pub use channel::{ChannelHandle, validate_channel_username};
pub use error::RuleError;
pub use identity::DashboardAccess;
pub use money::{Currency, Money};
pub use payout::PayoutSchedule;
