//! Foundation types for pinway.
//!
//! This crate holds the hash codec and the small data model shared by every
//! other pinway crate.
//!
//! # Key Types
//!
//! - [`ContentId`]: Content identifier with a canonical base-58 text form
//! - [`ObjectLink`]: One child entry of a content-addressed node
//! - [`StoredObject`]: A named payload submitted for storage

pub mod error;
pub mod link;
pub mod object;

pub use error::TypeError;
pub use link::ObjectLink;
pub use object::{ContentId, StoredObject};
