//! Catalog and viewer fixtures

use chrono::{Datelike, NaiveDate};

use halo_core::{ContentId, ContentItem, Viewer, ViewerAccount, ViewerId};
use halo_session::GatingState;

/// Date used as "now" throughout the fixtures
pub fn reference_date() -> NaiveDate {
    date(2026, 10, 19)
}

/// Build a date; impossible input gives `NaiveDate::MIN`
pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or(NaiveDate::MIN)
}

/// Date of birth giving exactly `age` on the reference date
pub fn birthday_for_age(age: u32) -> NaiveDate {
    let now = reference_date();
    date(now.year() - age as i32, now.month(), now.day())
}

/// The three-item catalog: open, restricted, restricted from 21
pub fn mock_catalog() -> Vec<ContentItem> {
    vec![
        ContentItem::new(ContentId::new(1), "Safe Content"),
        ContentItem::new(ContentId::new(2), "Adult Content").restricted(),
        ContentItem::new(ContentId::new(3), "Age Restricted Content").with_minimum_age(21),
    ]
}

/// A livestream feed with creators, for moderation scenarios
pub fn live_feed() -> Vec<ContentItem> {
    vec![
        ContentItem::new(ContentId::new(100), "Morning Yoga")
            .with_creator(ViewerId::new(501))
            .live(),
        ContentItem::new(ContentId::new(101), "After Dark Talk")
            .restricted()
            .with_creator(ViewerId::new(502))
            .live(),
        ContentItem::new(ContentId::new(102), "Cocktail Hour")
            .with_minimum_age(21)
            .with_creator(ViewerId::new(503))
            .live(),
        ContentItem::new(ContentId::new(103), "Street Food Tour").with_creator(ViewerId::new(502)),
        ContentItem::new(ContentId::new(104), "Late Show Replay")
            .restricted()
            .with_creator(ViewerId::new(501)),
    ]
}

pub fn test_account(id: u64) -> ViewerAccount {
    ViewerAccount::new(
        ViewerId::new(id),
        format!("viewer{}", id),
        format!("viewer{}@example.com", id),
    )
}

/// Snapshot a viewer in `state` would present; `None` when unauthenticated
pub fn viewer_in(state: GatingState, age: Option<u32>) -> Option<Viewer> {
    let flags = state.flags()?;
    Some(Viewer {
        id: ViewerId::new(1),
        flags,
        age,
    })
}
