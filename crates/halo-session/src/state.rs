//! Gating state machine
//!
//! A viewer's gating flags have only four reachable combinations, so the
//! state is an enum and the flags are derived from it. `GatingState::apply`
//! is the transition table.
//!
//! ```text
//!                  login (from anywhere)
//!                         │
//!   Unauthenticated ──► Unverified ──verify ok──► Verified ◄──toggle──► Elevated
//!         ▲                 ▲                        │                    │
//!         │                 └─────verify failed──────┴────────────────────┘
//!         └──────────────────────── logout (from anywhere)
//! ```

use std::fmt;

use halo_core::{GatingFlags, HaloError, HaloResult};

/// Gating-relevant state of a viewer
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum GatingState {
    /// No authenticated viewer
    #[default]
    Unauthenticated,
    /// Logged in, not age-verified, elevated mode off
    Unverified,
    /// Age-verified, elevated mode off
    Verified,
    /// Age-verified, elevated mode on
    Elevated,
}

/// Events that move a viewer between states
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GatingEvent {
    Login,
    Logout,
    VerificationPassed,
    VerificationFailed,
    ToggleElevatedMode,
    DisableElevatedMode,
}

impl GatingState {
    /// Flags a snapshot in this state carries; `None` when unauthenticated
    pub fn flags(self) -> Option<GatingFlags> {
        match self {
            GatingState::Unauthenticated => None,
            GatingState::Unverified => Some(GatingFlags::UNVERIFIED),
            GatingState::Verified => Some(GatingFlags::VERIFIED),
            GatingState::Elevated => Some(GatingFlags::ELEVATED),
        }
    }

    #[inline]
    pub fn is_authenticated(self) -> bool {
        self != GatingState::Unauthenticated
    }

    #[inline]
    pub fn is_age_verified(self) -> bool {
        matches!(self, GatingState::Verified | GatingState::Elevated)
    }

    /// Next state for `event`, or the reason the event is not allowed here.
    ///
    /// A rejected event leaves the caller's state unchanged.
    pub fn apply(self, event: GatingEvent) -> HaloResult<GatingState> {
        use GatingEvent::*;
        use GatingState::*;

        match (self, event) {
            (_, Login) => Ok(Unverified),
            (_, Logout) => Ok(Unauthenticated),

            (Unauthenticated, VerificationPassed) => Err(HaloError::NotAuthenticated),
            (Unauthenticated, VerificationFailed) => Ok(Unauthenticated),
            (Unverified | Verified, VerificationPassed) => Ok(Verified),
            (Elevated, VerificationPassed) => Ok(Elevated),
            (_, VerificationFailed) => Ok(Unverified),

            (Unauthenticated, ToggleElevatedMode) => Err(HaloError::NotAuthenticated),
            (Unverified, ToggleElevatedMode) => Err(HaloError::ElevatedModeNotPermitted),
            (Verified, ToggleElevatedMode) => Ok(Elevated),
            (Elevated, ToggleElevatedMode) => Ok(Verified),

            (Elevated, DisableElevatedMode) => Ok(Verified),
            (state, DisableElevatedMode) => Ok(state),
        }
    }

    /// Get all states
    pub fn all() -> &'static [GatingState] {
        &[
            GatingState::Unauthenticated,
            GatingState::Unverified,
            GatingState::Verified,
            GatingState::Elevated,
        ]
    }
}

impl GatingEvent {
    /// Get all events
    pub fn all() -> &'static [GatingEvent] {
        &[
            GatingEvent::Login,
            GatingEvent::Logout,
            GatingEvent::VerificationPassed,
            GatingEvent::VerificationFailed,
            GatingEvent::ToggleElevatedMode,
            GatingEvent::DisableElevatedMode,
        ]
    }
}

impl fmt::Display for GatingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GatingState::Unauthenticated => "unauthenticated",
            GatingState::Unverified => "unverified",
            GatingState::Verified => "verified",
            GatingState::Elevated => "elevated",
        };
        f.write_str(name)
    }
}
