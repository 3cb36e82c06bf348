//! Gateway service for pinway.
//!
//! Every request runs the same three steps: validate caller input (the hash
//! codec for identifiers, non-emptiness for uploads), dispatch one call to the
//! storage node, and translate the result into a [`GatewayError`] kind or a
//! caller-facing value. Nothing is kept between requests.

pub mod error;
pub mod gateway;
pub mod health;

pub use error::{ErrorKind, GatewayError, GatewayResult};
pub use gateway::Gateway;
pub use health::NodeHealth;
