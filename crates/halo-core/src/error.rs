//! Error types for HALO
//!
//! The access policy itself never fails; these errors belong to the
//! operations around it (date-of-birth input, session transitions,
//! moderation requests, configuration).

use thiserror::Error;

/// Core HALO errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HaloError {
    // Input errors
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    // Session errors
    #[error("Not authenticated")]
    NotAuthenticated,

    #[error("Elevated mode not permitted: viewer is not age-verified")]
    ElevatedModeNotPermitted,

    // Safety errors
    #[error("Feature disabled: {0}")]
    FeatureDisabled(&'static str),

    #[error("A viewer cannot block themselves")]
    SelfBlock,

    // Configuration errors
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl HaloError {
    /// Shorthand for [`HaloError::InvalidInput`]
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        HaloError::InvalidInput(msg.into())
    }
}

/// Result type for HALO operations
pub type HaloResult<T> = Result<T, HaloError>;
