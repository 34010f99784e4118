//! End-to-end Integration Test Suite
//!
//! Tests that follow a viewer through the whole HALO flow:
//! - Login, age verification and elevated mode
//! - Feed visibility at every gating state
//! - Block lists and moderation on top of the policy

use chrono::{DateTime, NaiveDate, Utc};

use halo_core::{AdultModeConfig, ContentItem, GuardianConfig, HaloResult, ViewerId};
use halo_guardian::{AccessPolicy, AgeGateNotice, AgeVerification};
use halo_safety::{moderated_feed, BlockList, ChatFilter, MemorySink, Moderation, ReportTarget};
use halo_session::{GatingState, SharedSession};

use crate::fixtures::{reference_date, test_account};

// ============================================================================
// SIMULATED VIEWER
// ============================================================================

/// One app instance: a shared session plus the viewer's safety tooling
pub struct SimulatedViewer {
    pub id: ViewerId,
    session: SharedSession,
    policy: AccessPolicy,
    blocks: BlockList,
    chat: ChatFilter,
    moderation: Moderation<MemorySink>,
    notices: Vec<AgeGateNotice>,
}

impl SimulatedViewer {
    pub fn new(id: u64, config: &GuardianConfig) -> HaloResult<Self> {
        let id = ViewerId::new(id);
        Ok(SimulatedViewer {
            id,
            session: SharedSession::new(config.adult_mode.clone()),
            policy: AccessPolicy::from_config(&config.adult_mode),
            blocks: BlockList::new(id),
            chat: ChatFilter::new(["spam", "scam"], &config.safety)?,
            moderation: Moderation::new(config.safety.clone(), MemorySink::new()),
            notices: Vec::new(),
        })
    }

    pub fn login(&self) {
        self.session.login(test_account(self.id.0));
    }

    pub fn logout(&self) {
        self.session.logout();
    }

    /// Verify against the reference date, recording the notice a UI would show
    pub fn verify(&mut self, date_of_birth: NaiveDate) -> HaloResult<AgeVerification> {
        let min_age = self.session.with(|s| s.config().min_age);
        match self.session.verify_age(date_of_birth, reference_date()) {
            Ok(result) => {
                if !result.verified {
                    self.notices.push(AgeGateNotice::age_requirement_not_met(min_age));
                }
                Ok(result)
            }
            Err(e) => {
                self.notices.push(AgeGateNotice::for_error(&e, min_age));
                Err(e)
            }
        }
    }

    pub fn toggle(&self) -> HaloResult<bool> {
        self.session.toggle_elevated_mode()
    }

    pub fn state(&self) -> GatingState {
        self.session.state()
    }

    pub fn session(&self) -> &SharedSession {
        &self.session
    }

    /// The feed this viewer sees right now
    pub fn feed(&self, items: &[ContentItem]) -> Vec<ContentItem> {
        let viewer = self.session.snapshot();
        moderated_feed(&self.policy, items, viewer.as_ref(), Some(&self.blocks))
    }

    pub fn block(&mut self, creator: ViewerId, at: DateTime<Utc>) -> HaloResult<()> {
        let viewer = self.session.snapshot();
        let request = self.moderation.block(viewer.as_ref(), creator, at)?;
        self.blocks.apply(&request)?;
        Ok(())
    }

    pub fn report(&self, target: ReportTarget, reason: &str, at: DateTime<Utc>) -> HaloResult<()> {
        let viewer = self.session.snapshot();
        self.moderation.report(viewer.as_ref(), target, reason, at).map(|_| ())
    }

    pub fn say(&self, message: &str) -> HaloResult<String> {
        self.chat.prepare(message)
    }

    pub fn notices(&self) -> &[AgeGateNotice] {
        &self.notices
    }

    pub fn moderation(&self) -> &Moderation<MemorySink> {
        &self.moderation
    }
}

// ============================================================================
// SCENARIOS
// ============================================================================

/// Ids visible to `viewer` at each step of a full A -> B -> C -> D -> C walk
pub fn gating_walk(
    viewer: &mut SimulatedViewer,
    items: &[ContentItem],
    date_of_birth: NaiveDate,
) -> HaloResult<Vec<(GatingState, Vec<u64>)>> {
    let ids = |v: &SimulatedViewer| v.feed(items).iter().map(|c| c.id.0).collect::<Vec<_>>();
    let mut steps = vec![(viewer.state(), ids(viewer))];

    viewer.login();
    steps.push((viewer.state(), ids(viewer)));

    viewer.verify(date_of_birth)?;
    steps.push((viewer.state(), ids(viewer)));

    if viewer.state() == GatingState::Verified {
        viewer.toggle()?;
        steps.push((viewer.state(), ids(viewer)));
        viewer.toggle()?;
        steps.push((viewer.state(), ids(viewer)));
    }

    Ok(steps)
}

/// Config used by the stock scenarios
pub fn standard_config() -> GuardianConfig {
    GuardianConfig::default()
}

/// Config with a stricter regional threshold
pub fn strict_config(min_age: u32) -> GuardianConfig {
    GuardianConfig {
        adult_mode: AdultModeConfig {
            min_age,
            ..AdultModeConfig::default()
        },
        ..GuardianConfig::default()
    }
}
