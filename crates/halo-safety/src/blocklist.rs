//! Per-viewer block lists

use std::collections::HashSet;

use halo_core::{ContentItem, Gated, HaloError, HaloResult, Viewer, ViewerId};
use halo_guardian::AccessPolicy;

use crate::BlockRequest;

/// Content with a known creator
pub trait Authored {
    fn creator(&self) -> Option<ViewerId>;
}

impl Authored for ContentItem {
    fn creator(&self) -> Option<ViewerId> {
        self.creator
    }
}

/// Creators one viewer has blocked
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlockList {
    owner: ViewerId,
    blocked: HashSet<ViewerId>,
}

impl BlockList {
    pub fn new(owner: ViewerId) -> Self {
        BlockList {
            owner,
            blocked: HashSet::new(),
        }
    }

    pub fn owner(&self) -> ViewerId {
        self.owner
    }

    /// Block `creator`. Returns false if already blocked.
    pub fn block(&mut self, creator: ViewerId) -> HaloResult<bool> {
        if creator == self.owner {
            return Err(HaloError::SelfBlock);
        }
        Ok(self.blocked.insert(creator))
    }

    /// Record an accepted block request for this list's owner
    pub fn apply(&mut self, request: &BlockRequest) -> HaloResult<bool> {
        if request.viewer != self.owner {
            return Err(HaloError::invalid_input(format!(
                "block request for viewer {} applied to list of {}",
                request.viewer, self.owner
            )));
        }
        self.block(request.blocked)
    }

    pub fn unblock(&mut self, creator: ViewerId) -> bool {
        self.blocked.remove(&creator)
    }

    pub fn is_blocked(&self, creator: ViewerId) -> bool {
        self.blocked.contains(&creator)
    }

    pub fn len(&self) -> usize {
        self.blocked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocked.is_empty()
    }

    /// Drop items whose creator is blocked, keeping order
    pub fn retain_unblocked<T: Authored + Clone>(&self, items: &[T]) -> Vec<T> {
        items
            .iter()
            .filter(|item| item.creator().map_or(true, |c| !self.is_blocked(c)))
            .cloned()
            .collect()
    }
}

/// The access policy first, then the viewer's block list.
///
/// The block list can only remove items from the policy's result.
pub fn moderated_feed<T>(
    policy: &AccessPolicy,
    items: &[T],
    viewer: Option<&Viewer>,
    blocks: Option<&BlockList>,
) -> Vec<T>
where
    T: Gated + Authored + Clone,
{
    let visible = policy.filter_visible(items, viewer);
    match blocks {
        Some(list) if viewer.is_some_and(|v| v.id == list.owner) => list.retain_unblocked(&visible),
        _ => visible,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use halo_core::{ContentId, GatingFlags};

    fn feed() -> Vec<ContentItem> {
        vec![
            ContentItem::new(ContentId::new(1), "cooking").with_creator(ViewerId::new(10)),
            ContentItem::new(ContentId::new(2), "late night").restricted().with_creator(ViewerId::new(11)),
            ContentItem::new(ContentId::new(3), "music").with_creator(ViewerId::new(11)),
            ContentItem::new(ContentId::new(4), "news"),
        ]
    }

    #[test]
    fn test_block_and_unblock() {
        let mut list = BlockList::new(ViewerId::new(1));
        assert_eq!(list.block(ViewerId::new(2)), Ok(true));
        assert_eq!(list.block(ViewerId::new(2)), Ok(false));
        assert_eq!(list.block(ViewerId::new(1)), Err(HaloError::SelfBlock));
        assert_eq!(list.len(), 1);
        assert!(list.unblock(ViewerId::new(2)));
        assert!(list.is_empty());
    }

    #[test]
    fn test_apply_checks_owner() {
        let mut list = BlockList::new(ViewerId::new(1));
        let request = BlockRequest {
            viewer: ViewerId::new(9),
            blocked: ViewerId::new(2),
            submitted_at: Utc::now(),
        };
        assert!(list.apply(&request).is_err());

        let request = BlockRequest {
            viewer: ViewerId::new(1),
            ..request
        };
        assert_eq!(list.apply(&request), Ok(true));
        assert!(list.is_blocked(ViewerId::new(2)));
    }

    #[test]
    fn test_retain_unblocked_keeps_order_and_anonymous_items() {
        let mut list = BlockList::new(ViewerId::new(1));
        list.block(ViewerId::new(11)).unwrap();
        let kept: Vec<u64> = list.retain_unblocked(&feed()).iter().map(|c| c.id.0).collect();
        assert_eq!(kept, vec![1, 4]);
    }

    #[test]
    fn test_moderated_feed_never_widens() {
        let policy = AccessPolicy::new();
        let viewer = Viewer::new(ViewerId::new(1))
            .with_flags(GatingFlags::ELEVATED)
            .with_age(30);
        let mut list = BlockList::new(ViewerId::new(1));
        list.block(ViewerId::new(10)).unwrap();

        let ids = |items: Vec<ContentItem>| items.iter().map(|c| c.id.0).collect::<Vec<_>>();

        assert_eq!(ids(moderated_feed(&policy, &feed(), Some(&viewer), Some(&list))), vec![2, 3, 4]);
        // Unauthenticated: the policy alone decides, restricted item stays hidden
        assert_eq!(ids(moderated_feed(&policy, &feed(), None, Some(&list))), vec![1, 3, 4]);
    }

    #[test]
    fn test_moderated_feed_ignores_foreign_lists() {
        let policy = AccessPolicy::new();
        let viewer = Viewer::new(ViewerId::new(5));
        let mut list = BlockList::new(ViewerId::new(1));
        list.block(ViewerId::new(10)).unwrap();

        let kept = moderated_feed(&policy, &feed(), Some(&viewer), Some(&list));
        assert_eq!(kept.len(), 3);
    }
}
