//! HALO Session - the owner of a viewer's gating state
//!
//! The access policy only reads viewer snapshots. This crate is the
//! collaborator that produces them:
//! - `GatingState` is the four-state machine and its transition table
//! - `ViewerSession` holds the account, the state and the verified age
//! - `SharedSession` puts a session behind a lock so every snapshot is a
//!   whole before-or-after view

pub mod state;
pub mod session;
pub mod shared;

pub use state::*;
pub use session::*;
pub use shared::*;
