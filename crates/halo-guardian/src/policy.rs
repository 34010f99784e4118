//! Access Policy - which content a viewer may see
//!
//! Restricted content is gated on three things, checked in order: an
//! authenticated viewer, elevated mode switched on, and an age that reaches
//! the item's threshold. Every missing or ambiguous input resolves to
//! hidden.

use halo_core::{AdultModeConfig, Gated, Viewer, DEFAULT_MINIMUM_AGE};

/// Why a restricted item was hidden
///
/// For logs and tests only. User-facing text must not go beyond
/// "age requirement not met".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HiddenReason {
    /// No viewer snapshot (unauthenticated caller)
    Unauthenticated,
    /// Viewer has not opted into elevated mode
    ElevatedModeOff,
    /// Elevated mode is on but the viewer's age is unknown
    AgeUnknown,
    /// Viewer is younger than the item's threshold
    BelowMinimumAge { required: u32 },
}

/// Outcome of a single visibility evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Decision {
    Visible,
    Hidden(HiddenReason),
}

impl Decision {
    #[inline]
    pub fn is_visible(self) -> bool {
        matches!(self, Decision::Visible)
    }
}

/// The content visibility policy
///
/// Holds only the default threshold; it carries no viewer state and caches
/// nothing, so one value can be shared freely across threads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessPolicy {
    default_minimum_age: u32,
}

impl Default for AccessPolicy {
    fn default() -> Self {
        AccessPolicy::new()
    }
}

impl AccessPolicy {
    /// Policy with the standard threshold of 18
    pub const fn new() -> Self {
        AccessPolicy {
            default_minimum_age: DEFAULT_MINIMUM_AGE,
        }
    }

    /// Policy using the configured default threshold, never below 18
    pub fn from_config(config: &AdultModeConfig) -> Self {
        AccessPolicy {
            default_minimum_age: config.min_age.max(DEFAULT_MINIMUM_AGE),
        }
    }

    #[inline]
    pub fn default_minimum_age(&self) -> u32 {
        self.default_minimum_age
    }

    /// Evaluate one item for one viewer
    pub fn evaluate<C: Gated + ?Sized>(&self, content: &C, viewer: Option<&Viewer>) -> Decision {
        let restriction = content.restriction();
        if !restriction.restricted {
            return Decision::Visible;
        }

        let Some(viewer) = viewer else {
            return Decision::Hidden(HiddenReason::Unauthenticated);
        };

        if !viewer.elevated_mode_enabled() {
            return Decision::Hidden(HiddenReason::ElevatedModeOff);
        }

        let required = restriction.threshold(self.default_minimum_age);
        match viewer.age {
            Some(age) if age >= required => Decision::Visible,
            Some(_) => Decision::Hidden(HiddenReason::BelowMinimumAge { required }),
            None => Decision::Hidden(HiddenReason::AgeUnknown),
        }
    }

    /// Whether `content` may be shown to `viewer`
    #[inline]
    pub fn is_content_visible<C: Gated + ?Sized>(&self, content: &C, viewer: Option<&Viewer>) -> bool {
        self.evaluate(content, viewer).is_visible()
    }

    /// Items visible to `viewer`, in their original order
    pub fn visible<'a, T: Gated>(
        &'a self,
        items: &'a [T],
        viewer: Option<&'a Viewer>,
    ) -> impl Iterator<Item = &'a T> + 'a {
        items
            .iter()
            .filter(move |item| self.is_content_visible(*item, viewer))
    }

    /// Ordered subsequence of `items` visible to `viewer`
    pub fn filter_visible<T: Gated + Clone>(&self, items: &[T], viewer: Option<&Viewer>) -> Vec<T> {
        self.visible(items, viewer).cloned().collect()
    }

    /// Whether the elevated-mode toggle may be switched on for `viewer`.
    ///
    /// Answers "is the toggle legal", not "is it on".
    #[inline]
    pub fn can_enable_elevated_mode(&self, viewer: Option<&Viewer>) -> bool {
        viewer.is_some_and(Viewer::is_age_verified)
    }

    /// Whether `viewer` may see restricted content that carries no
    /// per-item minimum age
    pub fn can_access_restricted(&self, viewer: Option<&Viewer>) -> bool {
        self.is_content_visible(&halo_core::ContentRestriction::RESTRICTED, viewer)
    }
}

const STANDARD: AccessPolicy = AccessPolicy::new();

/// [`AccessPolicy::is_content_visible`] with the standard policy
pub fn is_content_visible<C: Gated + ?Sized>(content: &C, viewer: Option<&Viewer>) -> bool {
    STANDARD.is_content_visible(content, viewer)
}

/// [`AccessPolicy::filter_visible`] with the standard policy
pub fn filter_visible<T: Gated + Clone>(items: &[T], viewer: Option<&Viewer>) -> Vec<T> {
    STANDARD.filter_visible(items, viewer)
}

/// [`AccessPolicy::can_enable_elevated_mode`] with the standard policy
pub fn can_enable_elevated_mode(viewer: Option<&Viewer>) -> bool {
    STANDARD.can_enable_elevated_mode(viewer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use halo_core::{ContentId, ContentItem, ContentRestriction, GatingFlags, ViewerId};

    fn viewer(flags: GatingFlags, age: Option<u32>) -> Viewer {
        Viewer {
            id: ViewerId::new(1),
            flags,
            age,
        }
    }

    fn catalog() -> Vec<ContentItem> {
        vec![
            ContentItem::new(ContentId::new(1), "Safe Content"),
            ContentItem::new(ContentId::new(2), "Adult Content").restricted(),
            ContentItem::new(ContentId::new(3), "Age Restricted Content").with_minimum_age(21),
        ]
    }

    fn ids(items: &[ContentItem]) -> Vec<u64> {
        items.iter().map(|c| c.id.0).collect()
    }

    #[test]
    fn test_unrestricted_visible_to_absent_viewer() {
        let open = ContentItem::new(ContentId::new(1), "open");
        assert!(is_content_visible(&open, None));
    }

    #[test]
    fn test_restricted_hidden_from_absent_viewer() {
        let adult = ContentItem::new(ContentId::new(2), "adult").restricted();
        assert_eq!(
            AccessPolicy::new().evaluate(&adult, None),
            Decision::Hidden(HiddenReason::Unauthenticated)
        );
    }

    #[test]
    fn test_verified_adult_without_opt_in_sees_nothing_restricted() {
        let v = viewer(GatingFlags::VERIFIED, Some(25));
        let adult = ContentRestriction::RESTRICTED;
        assert_eq!(
            AccessPolicy::new().evaluate(&adult, Some(&v)),
            Decision::Hidden(HiddenReason::ElevatedModeOff)
        );
    }

    #[test]
    fn test_elevated_adult_sees_restricted() {
        let v = viewer(GatingFlags::ELEVATED, Some(25));
        assert!(is_content_visible(&ContentRestriction::RESTRICTED, Some(&v)));
    }

    #[test]
    fn test_per_item_minimum_age() {
        let item = ContentRestriction::restricted_from(21);
        let nineteen = viewer(GatingFlags::ELEVATED, Some(19));
        let twenty_one = viewer(GatingFlags::ELEVATED, Some(21));

        assert_eq!(
            AccessPolicy::new().evaluate(&item, Some(&nineteen)),
            Decision::Hidden(HiddenReason::BelowMinimumAge { required: 21 })
        );
        assert!(is_content_visible(&item, Some(&twenty_one)));
    }

    #[test]
    fn test_unknown_age_fails_closed() {
        let v = viewer(GatingFlags::ELEVATED, None);
        assert_eq!(
            AccessPolicy::new().evaluate(&ContentRestriction::RESTRICTED, Some(&v)),
            Decision::Hidden(HiddenReason::AgeUnknown)
        );
    }

    #[test]
    fn test_filter_for_unauthenticated() {
        let result = filter_visible(&catalog(), None);
        assert_eq!(ids(&result), vec![1]);
    }

    #[test]
    fn test_filter_with_elevated_mode_off() {
        let v = viewer(GatingFlags::VERIFIED, Some(25));
        assert_eq!(ids(&filter_visible(&catalog(), Some(&v))), vec![1]);
    }

    #[test]
    fn test_filter_respects_item_thresholds() {
        let v = viewer(GatingFlags::ELEVATED, Some(19));
        assert_eq!(ids(&filter_visible(&catalog(), Some(&v))), vec![1, 2]);

        let v = viewer(GatingFlags::ELEVATED, Some(21));
        assert_eq!(ids(&filter_visible(&catalog(), Some(&v))), vec![1, 2, 3]);
    }

    #[test]
    fn test_visible_iterator_borrows() {
        let items = catalog();
        let v = viewer(GatingFlags::ELEVATED, Some(30));
        let policy = AccessPolicy::new();
        let titles: Vec<&str> = policy
            .visible(&items, Some(&v))
            .map(|c| c.title.as_str())
            .collect();
        assert_eq!(titles.len(), 3);
        assert_eq!(titles[0], "Safe Content");
    }

    #[test]
    fn test_can_enable_elevated_mode() {
        assert!(!can_enable_elevated_mode(None));
        assert!(!can_enable_elevated_mode(Some(&viewer(GatingFlags::UNVERIFIED, Some(40)))));
        assert!(can_enable_elevated_mode(Some(&viewer(GatingFlags::VERIFIED, None))));
        assert!(can_enable_elevated_mode(Some(&viewer(GatingFlags::ELEVATED, None))));
    }

    #[test]
    fn test_can_access_restricted() {
        let policy = AccessPolicy::new();
        assert!(!policy.can_access_restricted(None));
        assert!(!policy.can_access_restricted(Some(&viewer(GatingFlags::VERIFIED, Some(25)))));
        assert!(!policy.can_access_restricted(Some(&viewer(GatingFlags::ELEVATED, Some(17)))));
        assert!(policy.can_access_restricted(Some(&viewer(GatingFlags::ELEVATED, Some(18)))));
    }

    #[test]
    fn test_configured_default_threshold() {
        let config = AdultModeConfig {
            min_age: 21,
            ..AdultModeConfig::default()
        };
        let policy = AccessPolicy::from_config(&config);
        let v = viewer(GatingFlags::ELEVATED, Some(19));

        assert_eq!(policy.default_minimum_age(), 21);
        assert!(!policy.is_content_visible(&ContentRestriction::RESTRICTED, Some(&v)));
        // An explicit per-item threshold still wins
        assert!(policy.is_content_visible(&ContentRestriction::restricted_from(19), Some(&v)));
    }

    #[test]
    fn test_configured_threshold_never_below_legal_floor() {
        let config = AdultModeConfig {
            min_age: 16,
            ..AdultModeConfig::default()
        };
        assert_eq!(AccessPolicy::from_config(&config).default_minimum_age(), 18);
    }
}
