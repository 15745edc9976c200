//! Core data models for the application
//!
//! This module contains the primary data structures used throughout the crate,
//! separated from the decoders and the reconciliation logic that operate on them.
//!
//! # Usage
//!
//! ```rust
//! use subsync::models::{Profile, ProfileKind, ProxyBean};
//!
//! // Create a new, not yet persisted profile
//! let mut profile = Profile::new(ProfileKind::VMess);
//! profile.server_address = "example.com".to_string();
//! profile.server_port = 443;
//!
//! if let ProxyBean::VMess(bean) = &mut profile.bean {
//!     bean.uuid = "b831381d-6324-4d53-ad4f-8cda48b30811".to_string();
//! }
//! assert_eq!(profile.kind(), ProfileKind::VMess);
//! ```
//!
//! A profile has two notions of equality:
//!
//! * [`Profile::same_identity`] - both values refer to the same stored record;
//! * [`Profile::content_eq`] - both values describe the same proxy, ignoring the
//!   display name.

mod group;
mod profile;

pub use group::*;
pub use profile::*;
