//! HALO Core - Fundamental types shared by every HALO crate
//!
//! This crate defines:
//! - Identifiers (ViewerId, ContentId, SessionId, MessageId)
//! - Viewer and content snapshots handed to the access policy
//! - Guardian configuration
//! - The error type and the guardian invariants

pub mod id;
pub mod models;
pub mod lenient;
pub mod config;
pub mod invariants;
pub mod error;

pub use id::*;
pub use models::*;
pub use config::*;
pub use error::*;
