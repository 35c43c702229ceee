//! Creator use cases.
//!
//! Each operation runs the relevant business rule first and issues at most
//! one gateway call. A rule violation never reaches the network.

pub mod creator;
pub mod error;

pub use creator::{CreatorUseCases, DashboardFetch};
pub use error::UseCaseError;
