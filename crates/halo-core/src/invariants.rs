//! HALO Guardian Invariants
//!
//! These are safety laws, not guidelines. Any code path that can make
//! restricted content visible must hold all of them.
//!
//! # The Five Invariants
//!
//! 1. **Open Content Is Never Gated** - unrestricted content is visible to everyone
//! 2. **Fail Closed** - missing viewer or missing age hides restricted content
//! 3. **Opt-In Is Mandatory** - verification alone never grants visibility
//! 4. **Elevation Requires Verification** - elevated mode implies age-verified
//! 5. **Login Resets Gating** - a new session starts unverified with elevated mode off
//!
//! # Usage
//!
//! ```rust
//! use halo_core::invariants::{check_all_invariants, Invariant};
//!
//! let violations = check_all_invariants(|_| Ok(()));
//! assert!(violations.is_empty());
//! assert_eq!(Invariant::all().len(), 5);
//! ```

use std::fmt;

use crate::Viewer;

/// The five guardian invariants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Invariant {
    /// GUARD-1: Open Content Is Never Gated
    ///
    /// Unrestricted content is visible to every caller, authenticated or not.
    OpenContentNeverGated = 1,

    /// GUARD-2: Fail Closed
    ///
    /// Absent viewer, absent age or malformed input resolve toward hiding.
    FailClosed = 2,

    /// GUARD-3: Opt-In Is Mandatory
    ///
    /// A verified adult with elevated mode off sees no restricted content.
    OptInMandatory = 3,

    /// GUARD-4: Elevation Requires Verification
    ///
    /// `elevated_mode_enabled` is only ever true together with
    /// `is_age_verified`. Failed verification clears both.
    ElevationRequiresVerification = 4,

    /// GUARD-5: Login Resets Gating
    ///
    /// Permission never survives a login boundary.
    LoginResetsGating = 5,
}

impl Invariant {
    /// Get the invariant code (e.g., "GUARD-1")
    pub fn code(&self) -> &'static str {
        match self {
            Invariant::OpenContentNeverGated => "GUARD-1",
            Invariant::FailClosed => "GUARD-2",
            Invariant::OptInMandatory => "GUARD-3",
            Invariant::ElevationRequiresVerification => "GUARD-4",
            Invariant::LoginResetsGating => "GUARD-5",
        }
    }

    /// Get the short name of the invariant
    pub fn name(&self) -> &'static str {
        match self {
            Invariant::OpenContentNeverGated => "Open Content Is Never Gated",
            Invariant::FailClosed => "Fail Closed",
            Invariant::OptInMandatory => "Opt-In Is Mandatory",
            Invariant::ElevationRequiresVerification => "Elevation Requires Verification",
            Invariant::LoginResetsGating => "Login Resets Gating",
        }
    }

    /// Get all invariants
    pub fn all() -> &'static [Invariant] {
        &[
            Invariant::OpenContentNeverGated,
            Invariant::FailClosed,
            Invariant::OptInMandatory,
            Invariant::ElevationRequiresVerification,
            Invariant::LoginResetsGating,
        ]
    }
}

impl fmt::Display for Invariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code(), self.name())
    }
}

/// Invariant violation error
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantViolation {
    pub invariant: Invariant,
    pub context: String,
}

impl fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "HALO Invariant Violation: {} - {}",
            self.invariant, self.context
        )
    }
}

impl std::error::Error for InvariantViolation {}

/// Assert that an invariant is satisfied, panicking if violated.
///
/// # Panics
///
/// Panics if the invariant check returns `false`.
#[track_caller]
pub fn assert_invariant<F>(invariant: Invariant, context: &str, check: F)
where
    F: FnOnce() -> bool,
{
    if !check() {
        panic!(
            "{}",
            InvariantViolation {
                invariant,
                context: context.to_string(),
            }
        );
    }
}

/// Check all invariants for a component.
///
/// Returns a list of violated invariants.
pub fn check_all_invariants<F>(mut checker: F) -> Vec<InvariantViolation>
where
    F: FnMut(Invariant) -> Result<(), String>,
{
    let mut violations = Vec::new();

    for &invariant in Invariant::all() {
        if let Err(context) = checker(invariant) {
            violations.push(InvariantViolation { invariant, context });
        }
    }

    violations
}

/// Types holding viewer gating state that can verify their own compliance.
pub trait InvariantCompliant {
    /// Returns `Ok(())` if compliant, or the list of violations.
    fn verify_invariants(&self) -> Result<(), Vec<InvariantViolation>>;
}

impl InvariantCompliant for Viewer {
    fn verify_invariants(&self) -> Result<(), Vec<InvariantViolation>> {
        // GatingFlags cannot hold elevation without verification, so only
        // the age a snapshot carries is left to check.
        let violations = check_all_invariants(|inv| match inv {
            Invariant::LoginResetsGating if !self.is_age_verified() && self.age.is_some() => {
                Err(format!("viewer {} carries an age without verification", self.id))
            }
            _ => Ok(()),
        });

        if violations.is_empty() {
            Ok(())
        } else {
            Err(violations)
        }
    }
}
