//! Shared session handle
//!
//! UI threads, feed builders and navigation guards all read the same viewer.
//! Mutations take the write lock and snapshots take the read lock, so a
//! toggle racing a visibility check yields either the whole old view or the
//! whole new one.

use std::sync::Arc;

use chrono::NaiveDate;
use parking_lot::RwLock;

use halo_core::{AdultModeConfig, Gated, HaloResult, SessionId, Viewer, ViewerAccount};
use halo_guardian::{AccessPolicy, AgeVerification};

use crate::{GatingState, ViewerSession};

/// Cloneable, thread-safe handle to a [`ViewerSession`]
#[derive(Clone, Debug, Default)]
pub struct SharedSession {
    inner: Arc<RwLock<ViewerSession>>,
}

impl SharedSession {
    pub fn new(config: AdultModeConfig) -> Self {
        SharedSession::from_session(ViewerSession::new(config))
    }

    pub fn from_session(session: ViewerSession) -> Self {
        SharedSession {
            inner: Arc::new(RwLock::new(session)),
        }
    }

    /// Consistent snapshot of the viewer; `None` when unauthenticated
    pub fn snapshot(&self) -> Option<Viewer> {
        self.inner.read().snapshot()
    }

    pub fn state(&self) -> GatingState {
        self.inner.read().state()
    }

    pub fn login(&self, account: ViewerAccount) -> SessionId {
        self.inner.write().login(account)
    }

    pub fn logout(&self) {
        self.inner.write().logout()
    }

    pub fn verify_age(&self, date_of_birth: NaiveDate, as_of: NaiveDate) -> HaloResult<AgeVerification> {
        self.inner.write().verify_age(date_of_birth, as_of)
    }

    pub fn toggle_elevated_mode(&self) -> HaloResult<bool> {
        self.inner.write().toggle_elevated_mode()
    }

    pub fn enable_elevated_mode(&self) -> HaloResult<()> {
        self.inner.write().enable_elevated_mode()
    }

    pub fn disable_elevated_mode(&self) {
        self.inner.write().disable_elevated_mode()
    }

    /// Run `f` against the session under the read lock
    pub fn with<R>(&self, f: impl FnOnce(&ViewerSession) -> R) -> R {
        f(&self.inner.read())
    }

    /// Filter `items` against one snapshot taken now.
    ///
    /// The whole list is judged against the same view of the viewer; nothing
    /// is remembered for the next call.
    pub fn visible_feed<T: Gated + Clone>(&self, policy: &AccessPolicy, items: &[T]) -> Vec<T> {
        let viewer = self.snapshot();
        policy.filter_visible(items, viewer.as_ref())
    }
}
