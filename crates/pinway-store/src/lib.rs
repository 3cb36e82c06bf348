//! Storage node client for pinway.
//!
//! The gateway never talks to a storage node directly. It goes through the
//! [`StorageClient`] trait, which names the handful of client-facing
//! operations the gateway needs: add, read, list children, pin, unpin, list
//! pins, and an identity probe.
//!
//! # Implementations
//!
//! - [`KuboClient`]: talks to a Kubo (go-ipfs) node over its HTTP RPC API
//! - [`InMemoryStorageClient`]: a self-contained node for tests and demos
//!
//! # Contract
//!
//! 1. Every identifier handed back was produced by the node and has passed
//!    the hash codec.
//! 2. Pinning a node pins its descendants; the result lists all of them.
//! 3. Unpinning something that is not pinned yields an empty result.
//! 4. Retries and timeouts belong to the implementation, not the caller.

pub mod config;
pub mod error;
pub mod kubo;
pub mod memory;
pub mod traits;

pub use config::NodeConfig;
pub use error::{StoreError, StoreResult};
pub use kubo::KuboClient;
pub use memory::InMemoryStorageClient;
pub use traits::StorageClient;
