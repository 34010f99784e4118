//! HALO Safety - chat hygiene and viewer-driven moderation
//!
//! - Chat: trim and cap user text, mask blocklisted words
//! - Moderation: report streams, users and messages; block users
//! - Block lists: hide a blocked creator's content from the blocker's feeds
//!
//! Block lists only ever remove items the access policy already allowed;
//! they never make anything visible.

pub mod chat;
pub mod moderation;
pub mod blocklist;

pub use chat::*;
pub use moderation::*;
pub use blocklist::*;
