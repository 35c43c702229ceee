//! Application state machine for the creator client.
//!
//! Derives "loading / onboarded / not onboarded / errored" from the
//! dashboard fetch and guarantees at most one fetch in flight.

pub mod machine;
pub mod types;

pub use machine::AppStateMachine;
pub use types::{AppState, AppStatus, RefreshOutcome};
