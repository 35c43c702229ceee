//! Remote API gateway for the creator backend.
//!
//! [`Gateway`] is the seam every higher layer talks to; [`HttpGateway`] is
//! the production implementation over `reqwest`. The messaging host the app
//! runs inside is reached only through [`HostCapability`].

pub mod client;
pub mod error;
pub mod gateway;
pub mod host;

pub use client::HttpGateway;
pub use error::GatewayError;
pub use gateway::{Gateway, GatewayFuture};
pub use host::{HostCapability, HostError, NullHost, auth_header_value};
