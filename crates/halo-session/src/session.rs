//! Viewer session - account, gating state and verified age
//!
//! Every mutation goes through the transition table in [`GatingState`].
//! The age is kept only while the viewer is verified; leaving the verified
//! states clears it.

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use halo_core::invariants::{
    assert_invariant, check_all_invariants, Invariant, InvariantCompliant, InvariantViolation,
};
use halo_core::{
    AdultModeConfig, ContentRestriction, HaloError, HaloResult, SessionId, Viewer, ViewerAccount,
};
use halo_guardian::{checked_verify_age, AccessPolicy, AgeVerification};

use crate::{GatingEvent, GatingState};

/// Gating state of one app instance's viewer
#[derive(Clone, Debug)]
pub struct ViewerSession {
    config: AdultModeConfig,
    session_id: SessionId,
    account: Option<ViewerAccount>,
    state: GatingState,
    age: Option<u32>,
}

impl Default for ViewerSession {
    fn default() -> Self {
        ViewerSession::new(AdultModeConfig::default())
    }
}

impl ViewerSession {
    /// An unauthenticated session
    pub fn new(config: AdultModeConfig) -> Self {
        ViewerSession {
            config,
            session_id: SessionId::ZERO,
            account: None,
            state: GatingState::Unauthenticated,
            age: None,
        }
    }

    #[inline]
    pub fn state(&self) -> GatingState {
        self.state
    }

    /// Identity of the current (or last) login
    #[inline]
    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    pub fn account(&self) -> Option<&ViewerAccount> {
        self.account.as_ref()
    }

    pub fn config(&self) -> &AdultModeConfig {
        &self.config
    }

    /// Start a new authentication session.
    ///
    /// Always lands in `Unverified`, whatever the previous session had.
    pub fn login(&mut self, account: ViewerAccount) -> SessionId {
        self.transition_or(GatingEvent::Login, GatingState::Unverified);
        self.session_id = self.session_id.next();
        self.age = None;
        if cfg!(debug_assertions) {
            assert_invariant(Invariant::LoginResetsGating, "login", || {
                self.state == GatingState::Unverified && self.age.is_none()
            });
        }
        info!(
            session = %self.session_id,
            viewer = %account.id,
            "viewer logged in"
        );
        self.account = Some(account);
        self.session_id
    }

    pub fn logout(&mut self) {
        self.transition_or(GatingEvent::Logout, GatingState::Unauthenticated);
        if let Some(account) = self.account.take() {
            info!(session = %self.session_id, viewer = %account.id, "viewer logged out");
        }
        self.age = None;
    }

    /// Check a date of birth against the configured threshold.
    ///
    /// Invalid input is rejected and leaves the session untouched. A failed
    /// check moves the viewer back to `Unverified`, which also switches
    /// elevated mode off.
    pub fn verify_age(&mut self, date_of_birth: NaiveDate, as_of: NaiveDate) -> HaloResult<AgeVerification> {
        if !self.state.is_authenticated() {
            return Err(HaloError::NotAuthenticated);
        }

        let verification = checked_verify_age(date_of_birth, as_of, &self.config)?;

        if verification.verified {
            self.transition(GatingEvent::VerificationPassed)?;
            self.age = Some(verification.age);
            info!(session = %self.session_id, "age verification passed");
        } else {
            self.transition(GatingEvent::VerificationFailed)?;
            self.age = None;
            warn!(session = %self.session_id, "age verification failed, elevated mode cleared");
        }

        Ok(verification)
    }

    /// Flip elevated mode. Returns whether it is now on.
    pub fn toggle_elevated_mode(&mut self) -> HaloResult<bool> {
        match self.transition(GatingEvent::ToggleElevatedMode) {
            Ok(state) => Ok(state == GatingState::Elevated),
            Err(e) => {
                warn!(
                    session = %self.session_id,
                    state = %self.state,
                    "cannot enable elevated mode: {}",
                    e
                );
                Err(e)
            }
        }
    }

    /// Switch elevated mode on; a no-op when already on
    pub fn enable_elevated_mode(&mut self) -> HaloResult<()> {
        if self.state == GatingState::Elevated {
            return Ok(());
        }
        self.toggle_elevated_mode().map(|_| ())
    }

    /// Switch elevated mode off. Always allowed.
    pub fn disable_elevated_mode(&mut self) {
        self.transition_or(GatingEvent::DisableElevatedMode, self.state);
    }

    /// Snapshot for the access policy; `None` when unauthenticated
    pub fn snapshot(&self) -> Option<Viewer> {
        let account = self.account.as_ref()?;
        let flags = self.state.flags()?;
        Some(Viewer {
            id: account.id,
            flags,
            age: if flags.is_age_verified() { self.age } else { None },
        })
    }

    fn transition(&mut self, event: GatingEvent) -> HaloResult<GatingState> {
        let to = self.state.apply(event)?;
        Ok(self.enter(event, to))
    }

    /// For events the table accepts from every state
    fn transition_or(&mut self, event: GatingEvent, fallback: GatingState) -> GatingState {
        let to = self.state.apply(event).unwrap_or(fallback);
        self.enter(event, to)
    }

    fn enter(&mut self, event: GatingEvent, to: GatingState) -> GatingState {
        let from = self.state;
        if cfg!(debug_assertions) {
            assert_invariant(Invariant::ElevationRequiresVerification, "gating transition", || {
                to != GatingState::Elevated || from.is_age_verified()
            });
        }
        if !to.is_age_verified() {
            self.age = None;
        }
        self.state = to;
        debug!(?event, %from, %to, "gating transition");
        to
    }
}

impl InvariantCompliant for ViewerSession {
    fn verify_invariants(&self) -> Result<(), Vec<InvariantViolation>> {
        let policy = AccessPolicy::from_config(&self.config);
        let snapshot = self.snapshot();
        let viewer = snapshot.as_ref();
        let restricted = ContentRestriction::RESTRICTED;

        let violations = check_all_invariants(|inv| match inv {
            Invariant::OpenContentNeverGated => {
                if policy.is_content_visible(&ContentRestriction::UNRESTRICTED, viewer) {
                    Ok(())
                } else {
                    Err(format!("open content hidden in state {}", self.state))
                }
            }
            Invariant::FailClosed => {
                if policy.is_content_visible(&restricted, None) {
                    return Err("restricted content visible without a viewer".to_string());
                }
                match viewer {
                    Some(v) if v.elevated_mode_enabled() => {
                        let ageless = Viewer { age: None, ..v.clone() };
                        if policy.is_content_visible(&restricted, Some(&ageless)) {
                            Err("restricted content visible with unknown age".to_string())
                        } else if v.age.is_none() {
                            Err("elevated without a recorded age".to_string())
                        } else {
                            Ok(())
                        }
                    }
                    _ => Ok(()),
                }
            }
            Invariant::OptInMandatory => {
                if self.state != GatingState::Elevated && policy.is_content_visible(&restricted, viewer) {
                    Err(format!("restricted content visible in state {}", self.state))
                } else {
                    Ok(())
                }
            }
            Invariant::ElevationRequiresVerification => match viewer {
                Some(v) if v.elevated_mode_enabled() && !v.is_age_verified() => {
                    Err("elevated snapshot without verification".to_string())
                }
                _ => {
                    if self.state.is_age_verified() && self.age.is_none() {
                        Err(format!("state {} without a verified age", self.state))
                    } else {
                        Ok(())
                    }
                }
            },
            Invariant::LoginResetsGating => {
                if self.state.is_authenticated() != self.account.is_some() {
                    Err(format!("state {} disagrees with account presence", self.state))
                } else if !self.state.is_age_verified() && self.age.is_some() {
                    Err(format!("age retained in state {}", self.state))
                } else {
                    Ok(())
                }
            }
        });

        if violations.is_empty() {
            Ok(())
        } else {
            Err(violations)
        }
    }
}
