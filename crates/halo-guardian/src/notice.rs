//! User-facing age gate notices
//!
//! Calm, non-punitive wording. A notice never carries the computed age,
//! the reason a specific item was hidden, or anything about other content.

use halo_core::HaloError;

/// Title and body shown by the age gate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgeGateNotice {
    pub title: &'static str,
    pub body: String,
}

impl AgeGateNotice {
    /// Verification did not reach the threshold
    pub fn age_requirement_not_met(min_age: u32) -> Self {
        AgeGateNotice {
            title: "Access Restricted",
            body: format!(
                "HALO requires users to be {}+. We look forward to seeing you in the future.",
                min_age
            ),
        }
    }

    /// The entered date could not be used
    pub fn invalid_entry() -> Self {
        AgeGateNotice {
            title: "Invalid Entry",
            body: "Please enter a valid date of birth.".to_string(),
        }
    }

    /// The caller has to sign in before the age gate applies
    pub fn sign_in_required() -> Self {
        AgeGateNotice {
            title: "Sign In Required",
            body: "Please sign in to continue.".to_string(),
        }
    }

    /// A switched-off or otherwise unavailable feature
    pub fn unavailable() -> Self {
        AgeGateNotice {
            title: "Not Available",
            body: "This option is not available right now.".to_string(),
        }
    }

    /// Notice for a failed age-gate operation.
    ///
    /// Only a refused elevation reads as an age rejection; errors the
    /// viewer's age had nothing to do with get their own wording.
    pub fn for_error(error: &HaloError, min_age: u32) -> Self {
        match error {
            HaloError::InvalidInput(_) => AgeGateNotice::invalid_entry(),
            HaloError::ElevatedModeNotPermitted => AgeGateNotice::age_requirement_not_met(min_age),
            HaloError::NotAuthenticated => AgeGateNotice::sign_in_required(),
            HaloError::FeatureDisabled(_) | HaloError::SelfBlock | HaloError::InvalidConfig(_) => {
                AgeGateNotice::unavailable()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requirement_notice_is_generic() {
        let notice = AgeGateNotice::age_requirement_not_met(18);
        assert_eq!(notice.title, "Access Restricted");
        assert!(notice.body.contains("18+"));
    }

    #[test]
    fn test_invalid_input_maps_to_invalid_entry() {
        let err = HaloError::invalid_input("date of birth is in the future");
        let notice = AgeGateNotice::for_error(&err, 18);
        assert_eq!(notice, AgeGateNotice::invalid_entry());
        // Internal detail stays out of the user-facing text
        assert!(!notice.body.contains("future"));
    }

    #[test]
    fn test_refused_elevation_maps_to_requirement() {
        let notice = AgeGateNotice::for_error(&HaloError::ElevatedModeNotPermitted, 21);
        assert!(notice.body.contains("21+"));
    }

    #[test]
    fn test_non_age_errors_never_read_as_age_rejection() {
        let notice = AgeGateNotice::for_error(&HaloError::NotAuthenticated, 18);
        assert_eq!(notice, AgeGateNotice::sign_in_required());

        for err in [
            HaloError::FeatureDisabled("blocking"),
            HaloError::SelfBlock,
            HaloError::InvalidConfig("min_age".to_string()),
        ] {
            let notice = AgeGateNotice::for_error(&err, 18);
            assert_eq!(notice, AgeGateNotice::unavailable());
            assert!(!notice.body.contains("18+"));
        }
    }
}
