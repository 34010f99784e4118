//! Session Fuzzer - random viewer journeys checked against a reference model
//!
//! Tests:
//! - The session follows the gating transition table
//! - Elevated mode never outlives verification
//! - The access policy agrees with the session state on every step
//! - Guardian invariants hold after every action

use std::collections::HashMap;

use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use halo_core::invariants::InvariantCompliant;
use halo_core::{AdultModeConfig, ContentItem};
use halo_guardian::AccessPolicy;
use halo_session::{GatingState, ViewerSession};

use crate::fixtures::{birthday_for_age, date, mock_catalog, reference_date, test_account};

/// Fuzzer configuration
#[derive(Clone, Debug)]
pub struct FuzzerConfig {
    /// Number of actions to perform
    pub action_count: usize,
    /// Probability that a verification attempt uses an adult birthday
    pub adult_prob: f64,
    /// Probability that a verification attempt uses an impossible birthday
    pub invalid_prob: f64,
    /// Random seed
    pub seed: u64,
}

impl Default for FuzzerConfig {
    fn default() -> Self {
        FuzzerConfig {
            action_count: 1000,
            adult_prob: 0.6,
            invalid_prob: 0.1,
            seed: 42,
        }
    }
}

impl FuzzerConfig {
    /// Light fuzzing for quick tests
    pub fn light() -> Self {
        FuzzerConfig {
            action_count: 200,
            ..FuzzerConfig::default()
        }
    }

    /// Heavy fuzzing for thorough testing
    pub fn heavy() -> Self {
        FuzzerConfig {
            action_count: 20_000,
            adult_prob: 0.5,
            invalid_prob: 0.2,
            seed: 42,
        }
    }
}

/// One thing a viewer can do
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FuzzAction {
    Login,
    Logout,
    VerifyAdult,
    VerifyMinor,
    VerifyInvalid,
    Toggle,
    Enable,
    Disable,
}

impl FuzzAction {
    pub fn all() -> &'static [FuzzAction] {
        &[
            FuzzAction::Login,
            FuzzAction::Logout,
            FuzzAction::VerifyAdult,
            FuzzAction::VerifyMinor,
            FuzzAction::VerifyInvalid,
            FuzzAction::Toggle,
            FuzzAction::Enable,
            FuzzAction::Disable,
        ]
    }

    /// State the reference model expects after this action
    pub fn expected(self, from: GatingState) -> GatingState {
        use GatingState::*;

        match (self, from) {
            (FuzzAction::Login, _) => Unverified,
            (FuzzAction::Logout, _) => Unauthenticated,
            (FuzzAction::VerifyAdult, Unverified) => Verified,
            (FuzzAction::VerifyMinor, Verified | Elevated) => Unverified,
            (FuzzAction::Toggle, Verified) | (FuzzAction::Enable, Verified) => Elevated,
            (FuzzAction::Toggle, Elevated) | (FuzzAction::Disable, Elevated) => Verified,
            (_, state) => state,
        }
    }
}

/// Fuzzing result
#[derive(Debug, Default)]
pub struct FuzzResult {
    pub actions: usize,
    pub visits: HashMap<GatingState, usize>,
    pub model_mismatches: Vec<String>,
    pub policy_mismatches: Vec<String>,
    pub invariant_violations: Vec<String>,
}

impl FuzzResult {
    pub fn new() -> Self {
        FuzzResult::default()
    }

    pub fn is_valid(&self) -> bool {
        self.model_mismatches.is_empty()
            && self.policy_mismatches.is_empty()
            && self.invariant_violations.is_empty()
    }

    /// Whether every gating state was reached at least once
    pub fn visited_all_states(&self) -> bool {
        GatingState::all().iter().all(|s| self.visits.contains_key(s))
    }
}

/// Session fuzzer
pub struct SessionFuzzer {
    config: FuzzerConfig,
    session: ViewerSession,
    policy: AccessPolicy,
    catalog: Vec<ContentItem>,
    model: GatingState,
    rng: StdRng,
    next_viewer: u64,
}

impl SessionFuzzer {
    pub fn new(config: FuzzerConfig) -> Self {
        let rng = StdRng::seed_from_u64(config.seed);
        let adult_mode = AdultModeConfig::default();
        SessionFuzzer {
            config,
            policy: AccessPolicy::from_config(&adult_mode),
            session: ViewerSession::new(adult_mode),
            catalog: mock_catalog(),
            model: GatingState::Unauthenticated,
            rng,
            next_viewer: 1,
        }
    }

    fn generate_action(&mut self) -> FuzzAction {
        let roll: f64 = self.rng.gen();
        if roll < 0.3 {
            if self.rng.gen::<f64>() < self.config.invalid_prob {
                FuzzAction::VerifyInvalid
            } else if self.rng.gen::<f64>() < self.config.adult_prob {
                FuzzAction::VerifyAdult
            } else {
                FuzzAction::VerifyMinor
            }
        } else {
            let others = [
                FuzzAction::Login,
                FuzzAction::Logout,
                FuzzAction::Toggle,
                FuzzAction::Enable,
                FuzzAction::Disable,
            ];
            others[self.rng.gen_range(0..others.len())]
        }
    }

    fn birthday(&mut self, action: FuzzAction) -> NaiveDate {
        match action {
            // Old enough for every item in the catalog
            FuzzAction::VerifyAdult => birthday_for_age(self.rng.gen_range(21..90)),
            FuzzAction::VerifyMinor => birthday_for_age(self.rng.gen_range(0..18)),
            _ => date(2100, 1, 1),
        }
    }

    fn perform(&mut self, action: FuzzAction) {
        // Rejected actions are part of the journey; the model decides the outcome.
        match action {
            FuzzAction::Login => {
                self.session.login(test_account(self.next_viewer));
                self.next_viewer += 1;
            }
            FuzzAction::Logout => self.session.logout(),
            FuzzAction::VerifyAdult | FuzzAction::VerifyMinor | FuzzAction::VerifyInvalid => {
                let dob = self.birthday(action);
                let _ = self.session.verify_age(dob, reference_date());
            }
            FuzzAction::Toggle => {
                let _ = self.session.toggle_elevated_mode();
            }
            FuzzAction::Enable => {
                let _ = self.session.enable_elevated_mode();
            }
            FuzzAction::Disable => self.session.disable_elevated_mode(),
        }
    }

    fn check_policy(&self, step: usize, result: &mut FuzzResult) {
        let viewer = self.session.snapshot();
        let elevated = self.model == GatingState::Elevated;

        for item in &self.catalog {
            let visible = self.policy.is_content_visible(item, viewer.as_ref());
            let expected = !item.restricted || elevated;
            if visible != expected {
                result.policy_mismatches.push(format!(
                    "step {}: {} in state {} visible={}",
                    step, item.id, self.model, visible
                ));
            }
        }

        if self.policy.can_enable_elevated_mode(viewer.as_ref()) != self.model.is_age_verified() {
            result
                .policy_mismatches
                .push(format!("step {}: elevation permission wrong in {}", step, self.model));
        }
    }

    /// Run the fuzzer
    pub fn run(&mut self) -> FuzzResult {
        let mut result = FuzzResult::new();

        for step in 0..self.config.action_count {
            let action = self.generate_action();
            self.perform(action);
            self.model = action.expected(self.model);
            result.actions += 1;
            *result.visits.entry(self.session.state()).or_insert(0) += 1;

            if self.session.state() != self.model {
                result.model_mismatches.push(format!(
                    "step {}: {:?} left session in {}, model expects {}",
                    step,
                    action,
                    self.session.state(),
                    self.model
                ));
                // Resync so one mismatch is not reported on every later step
                self.model = self.session.state();
            }

            self.check_policy(step, &mut result);

            if let Err(violations) = self.session.verify_invariants() {
                result
                    .invariant_violations
                    .extend(violations.into_iter().map(|v| format!("step {}: {}", step, v)));
            }
        }

        result
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn any_seed_keeps_session_consistent(
            seed in any::<u64>(),
            adult_prob in 0.0f64..1.0,
            invalid_prob in 0.0f64..0.5,
        ) {
            let config = FuzzerConfig { action_count: 150, adult_prob, invalid_prob, seed };
            let result = SessionFuzzer::new(config).run();
            prop_assert!(result.is_valid(), "{:?}", result);
        }
    }
}
