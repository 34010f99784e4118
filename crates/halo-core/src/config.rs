//! Guardian configuration
//!
//! Plain structs with sensible defaults. Hosts either use
//! `GuardianConfig::default()` or load overrides from JSON; missing keys
//! keep their defaults.

use serde::{Deserialize, Serialize};

use crate::{HaloError, HaloResult, DEFAULT_MINIMUM_AGE};

/// Adult-mode settings
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdultModeConfig {
    /// Default threshold for restricted content and for age verification
    pub min_age: u32,
    /// Oldest age a date of birth may imply before it is rejected as invalid
    pub max_plausible_age: u32,
}

impl Default for AdultModeConfig {
    fn default() -> Self {
        AdultModeConfig {
            min_age: DEFAULT_MINIMUM_AGE,
            max_plausible_age: 120,
        }
    }
}

impl AdultModeConfig {
    pub fn validate(&self) -> HaloResult<()> {
        if self.min_age < DEFAULT_MINIMUM_AGE {
            return Err(HaloError::InvalidConfig(format!(
                "adult_mode.min_age must be at least {}, got {}",
                DEFAULT_MINIMUM_AGE, self.min_age
            )));
        }
        if self.max_plausible_age <= self.min_age {
            return Err(HaloError::InvalidConfig(format!(
                "adult_mode.max_plausible_age ({}) must exceed min_age ({})",
                self.max_plausible_age, self.min_age
            )));
        }
        Ok(())
    }
}

/// Chat and moderation settings
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SafetyConfig {
    pub enable_reporting: bool,
    pub enable_blocking: bool,
    /// Maximum length of user-entered text, in characters
    pub max_message_length: usize,
}

impl Default for SafetyConfig {
    fn default() -> Self {
        SafetyConfig {
            enable_reporting: true,
            enable_blocking: true,
            max_message_length: 500,
        }
    }
}

impl SafetyConfig {
    pub fn validate(&self) -> HaloResult<()> {
        if self.max_message_length == 0 {
            return Err(HaloError::InvalidConfig(
                "safety.max_message_length must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Top-level configuration
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuardianConfig {
    pub adult_mode: AdultModeConfig,
    pub safety: SafetyConfig,
}

impl GuardianConfig {
    /// Parse and validate a JSON configuration document
    pub fn from_json(json: &str) -> HaloResult<Self> {
        let config: GuardianConfig = serde_json::from_str(json)
            .map_err(|e| HaloError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> HaloResult<()> {
        self.adult_mode.validate()?;
        self.safety.validate()
    }
}
