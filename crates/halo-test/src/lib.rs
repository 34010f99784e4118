//! HALO Test Harness - fixtures, fuzzing and end-to-end scenarios
//!
//! This crate provides:
//! - Catalog and viewer fixtures
//! - Session fuzzing against the guardian invariants
//! - End-to-end scenarios across session, policy and safety

pub mod fixtures;
pub mod session_fuzzer;
pub mod integration;

pub use fixtures::*;
pub use session_fuzzer::*;
pub use integration::*;
