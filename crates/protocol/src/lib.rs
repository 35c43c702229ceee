//! Wire types shared by every layer of the creator client.
//!
//! The backend speaks JSON with a mix of kebab-case and snake_case keys;
//! the structs here carry idiomatic Rust field names and map them with
//! serde attributes so nothing above this crate sees the raw key names.

pub mod constants;
pub mod messages;
pub mod types;

// Re-export primary types for convenience.
pub use types::{Channel, DashboardSnapshot, Payment, Subscription, UserRecord};
