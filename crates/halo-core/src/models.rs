//! Viewer and content snapshots
//!
//! Both records are owned by external collaborators (the identity service
//! and the content catalog). HALO receives them as immutable snapshots and
//! evaluates every decision against the snapshot it was handed.

use serde::{Deserialize, Serialize};

use crate::lenient;
use crate::{ContentId, ViewerId};

/// Default minimum age for restricted content
pub const DEFAULT_MINIMUM_AGE: u32 = 18;

// ============================================================================
// VIEWER
// ============================================================================

/// The two gating flags of a viewer
///
/// Elevated mode can only be on for an age-verified viewer. The fields are
/// private and every constructor forces `elevated_mode` off when
/// `age_verified` is off, so no value of this type breaks that rule.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct GatingFlags {
    age_verified: bool,
    elevated_mode: bool,
}

impl GatingFlags {
    /// Not verified, elevated mode off (the state after every login)
    pub const UNVERIFIED: GatingFlags = GatingFlags {
        age_verified: false,
        elevated_mode: false,
    };

    /// Verified, elevated mode off
    pub const VERIFIED: GatingFlags = GatingFlags {
        age_verified: true,
        elevated_mode: false,
    };

    /// Verified, elevated mode on
    pub const ELEVATED: GatingFlags = GatingFlags {
        age_verified: true,
        elevated_mode: true,
    };

    /// Build flags from raw values, dropping elevated mode for unverified viewers
    #[inline]
    pub fn new(age_verified: bool, elevated_mode: bool) -> Self {
        GatingFlags {
            age_verified,
            elevated_mode: elevated_mode && age_verified,
        }
    }

    #[inline]
    pub fn is_age_verified(self) -> bool {
        self.age_verified
    }

    #[inline]
    pub fn is_elevated(self) -> bool {
        self.elevated_mode
    }
}

/// Snapshot of a viewer's gating-relevant state
///
/// An authenticated caller is represented by `Some(&Viewer)`, an
/// unauthenticated one by `None`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "ViewerSnapshot", into = "ViewerSnapshot")]
pub struct Viewer {
    pub id: ViewerId,
    pub flags: GatingFlags,
    /// Age in whole years, derived from a verified date of birth
    pub age: Option<u32>,
}

impl Viewer {
    /// A freshly authenticated viewer: not verified, elevated mode off, no age
    pub fn new(id: ViewerId) -> Self {
        Viewer {
            id,
            flags: GatingFlags::UNVERIFIED,
            age: None,
        }
    }

    pub fn with_flags(mut self, flags: GatingFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn with_age(mut self, age: u32) -> Self {
        self.age = Some(age);
        self
    }

    #[inline]
    pub fn is_age_verified(&self) -> bool {
        self.flags.is_age_verified()
    }

    #[inline]
    pub fn elevated_mode_enabled(&self) -> bool {
        self.flags.is_elevated()
    }
}

/// Wire shape of a [`Viewer`]
#[derive(Clone, Debug, Serialize, Deserialize)]
struct ViewerSnapshot {
    id: ViewerId,
    #[serde(default, deserialize_with = "lenient::permission_flag")]
    is_age_verified: bool,
    #[serde(default, deserialize_with = "lenient::permission_flag")]
    elevated_mode_enabled: bool,
    #[serde(default, deserialize_with = "lenient::viewer_age")]
    age: Option<u32>,
}

impl From<ViewerSnapshot> for Viewer {
    fn from(raw: ViewerSnapshot) -> Self {
        Viewer {
            id: raw.id,
            flags: GatingFlags::new(raw.is_age_verified, raw.elevated_mode_enabled),
            age: raw.age,
        }
    }
}

impl From<Viewer> for ViewerSnapshot {
    fn from(viewer: Viewer) -> Self {
        ViewerSnapshot {
            id: viewer.id,
            is_age_verified: viewer.flags.is_age_verified(),
            elevated_mode_enabled: viewer.flags.is_elevated(),
            age: viewer.age,
        }
    }
}

/// Account record of an authenticated user
///
/// Held by the session; the access policy never reads it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewerAccount {
    pub id: ViewerId,
    pub username: String,
    pub email: String,
}

impl ViewerAccount {
    pub fn new(id: ViewerId, username: impl Into<String>, email: impl Into<String>) -> Self {
        ViewerAccount {
            id,
            username: username.into(),
            email: email.into(),
        }
    }
}

// ============================================================================
// CONTENT
// ============================================================================

/// Restriction attributes of a piece of content
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct ContentRestriction {
    pub restricted: bool,
    /// Overrides the default threshold when present
    pub minimum_age: Option<u32>,
}

impl ContentRestriction {
    pub const UNRESTRICTED: ContentRestriction = ContentRestriction {
        restricted: false,
        minimum_age: None,
    };

    pub const RESTRICTED: ContentRestriction = ContentRestriction {
        restricted: true,
        minimum_age: None,
    };

    /// Restricted with a per-item minimum age
    pub fn restricted_from(minimum_age: u32) -> Self {
        ContentRestriction {
            restricted: true,
            minimum_age: Some(minimum_age),
        }
    }

    /// Effective age threshold given the system default
    #[inline]
    pub fn threshold(&self, default_minimum_age: u32) -> u32 {
        self.minimum_age.unwrap_or(default_minimum_age)
    }
}

/// Anything the access policy can gate
pub trait Gated {
    fn restriction(&self) -> ContentRestriction;
}

impl Gated for ContentRestriction {
    fn restriction(&self) -> ContentRestriction {
        *self
    }
}

impl<T: Gated + ?Sized> Gated for &T {
    fn restriction(&self) -> ContentRestriction {
        (**self).restriction()
    }
}

/// Catalog item: a live stream, a replay, a clip
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentItem {
    pub id: ContentId,
    #[serde(default)]
    pub title: String,
    #[serde(
        rename = "is_restricted",
        default = "lenient::restricted_by_default",
        deserialize_with = "lenient::restriction_flag"
    )]
    pub restricted: bool,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::minimum_age"
    )]
    pub minimum_age: Option<u32>,
    /// Broadcaster or uploader
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creator: Option<ViewerId>,
    #[serde(default)]
    pub is_live: bool,
}

impl ContentItem {
    /// An unrestricted item
    pub fn new(id: ContentId, title: impl Into<String>) -> Self {
        ContentItem {
            id,
            title: title.into(),
            restricted: false,
            minimum_age: None,
            creator: None,
            is_live: false,
        }
    }

    /// Mark the item as restricted (default threshold)
    pub fn restricted(mut self) -> Self {
        self.restricted = true;
        self
    }

    /// Mark the item as restricted with its own minimum age
    pub fn with_minimum_age(mut self, minimum_age: u32) -> Self {
        self.restricted = true;
        self.minimum_age = Some(minimum_age);
        self
    }

    pub fn with_creator(mut self, creator: ViewerId) -> Self {
        self.creator = Some(creator);
        self
    }

    pub fn live(mut self) -> Self {
        self.is_live = true;
        self
    }
}

impl Gated for ContentItem {
    fn restriction(&self) -> ContentRestriction {
        ContentRestriction {
            restricted: self.restricted,
            minimum_age: self.minimum_age,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gating_flags_force_elevated_off_when_unverified() {
        let flags = GatingFlags::new(false, true);
        assert!(!flags.is_age_verified());
        assert!(!flags.is_elevated());
        assert_eq!(flags, GatingFlags::UNVERIFIED);

        assert_eq!(GatingFlags::new(true, true), GatingFlags::ELEVATED);
        assert_eq!(GatingFlags::new(true, false), GatingFlags::VERIFIED);
    }

    #[test]
    fn test_new_viewer_starts_unverified() {
        let viewer = Viewer::new(ViewerId::new(1));
        assert!(!viewer.is_age_verified());
        assert!(!viewer.elevated_mode_enabled());
        assert_eq!(viewer.age, None);
    }

    #[test]
    fn test_viewer_snapshot_decoding_keeps_invariant() {
        let json = r#"{"id": 4, "is_age_verified": false, "elevated_mode_enabled": true, "age": 30}"#;
        let viewer: Viewer = serde_json::from_str(json).unwrap();
        assert!(!viewer.elevated_mode_enabled());
        assert_eq!(viewer.age, Some(30));
    }

    #[test]
    fn test_viewer_snapshot_malformed_fields() {
        let json = r#"{"id": 4, "is_age_verified": "true", "elevated_mode_enabled": 1, "age": "thirty"}"#;
        let viewer: Viewer = serde_json::from_str(json).unwrap();
        assert_eq!(viewer.flags, GatingFlags::UNVERIFIED);
        assert_eq!(viewer.age, None);
    }

    #[test]
    fn test_viewer_serializes_flat() {
        let viewer = Viewer::new(ViewerId::new(2))
            .with_flags(GatingFlags::ELEVATED)
            .with_age(22);
        let value = serde_json::to_value(&viewer).unwrap();
        assert_eq!(value["is_age_verified"], true);
        assert_eq!(value["elevated_mode_enabled"], true);
        assert_eq!(value["age"], 22);

        let back: Viewer = serde_json::from_value(value).unwrap();
        assert_eq!(back, viewer);
    }

    #[test]
    fn test_content_item_decoding() {
        let json = r#"[
            {"id": 1, "title": "Safe Content", "is_restricted": false},
            {"id": 2, "title": "Adult Content", "is_restricted": true},
            {"id": 3, "title": "Age Restricted", "is_restricted": true, "minimum_age": 21, "creator": 9}
        ]"#;
        let items: Vec<ContentItem> = serde_json::from_str(json).unwrap();
        assert_eq!(items[0].restriction(), ContentRestriction::UNRESTRICTED);
        assert_eq!(items[1].restriction(), ContentRestriction::RESTRICTED);
        assert_eq!(items[2].restriction(), ContentRestriction::restricted_from(21));
        assert_eq!(items[2].creator, Some(ViewerId::new(9)));
    }

    #[test]
    fn test_content_item_malformed_restriction_is_restricted() {
        let json = r#"{"id": 5, "is_restricted": "maybe", "minimum_age": "old"}"#;
        let item: ContentItem = serde_json::from_str(json).unwrap();
        assert!(item.restricted);
        assert_eq!(item.minimum_age, None);
    }

    #[test]
    fn test_missing_restriction_flag_only_affects_its_item() {
        let json = r#"[
            {"id": 1, "title": "open", "is_restricted": false},
            {"id": 2, "title": "no flag"},
            {"id": 3, "title": "null flag", "is_restricted": null}
        ]"#;
        let items: Vec<ContentItem> = serde_json::from_str(json).unwrap();
        let flags: Vec<bool> = items.iter().map(|c| c.restricted).collect();
        assert_eq!(flags, vec![false, true, true]);
    }

    #[test]
    fn test_restriction_threshold() {
        assert_eq!(ContentRestriction::RESTRICTED.threshold(DEFAULT_MINIMUM_AGE), 18);
        assert_eq!(ContentRestriction::restricted_from(21).threshold(18), 21);
    }

    #[test]
    fn test_builder_marks_restricted() {
        let item = ContentItem::new(ContentId::new(1), "late show").with_minimum_age(21);
        assert!(item.restricted);
        assert_eq!(item.minimum_age, Some(21));
    }
}
