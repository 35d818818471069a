//! Composable query values handed to a [`NotificationStore`](crate::store::NotificationStore).
//!
//! Each query is a plain value: filters, an optional sort and an optional
//! limit. Builder methods consume and return the query so they chain.

use crate::notification::{EntityRef, Notification};
use crate::types::DbId;

/// Ordering on `created_at`, ties broken by insertion order (`id`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Oldest first.
    Earliest,
    /// Newest first.
    #[default]
    Latest,
}

impl SortOrder {
    /// Sort `records` in place.
    pub fn sort(self, records: &mut [Notification]) {
        records.sort_by(|a, b| (a.created_at, a.id).cmp(&(b.created_at, b.id)));
        if self == SortOrder::Latest {
            records.reverse();
        }
    }
}

// ---------------------------------------------------------------------------
// MemberQuery
// ---------------------------------------------------------------------------

/// Query over the members of a single group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberQuery {
    pub owner_id: DbId,
    /// `Some(true)` opened only, `Some(false)` unopened only, `None` both.
    pub opened: Option<bool>,
    /// Keep only members whose notifier has this type.
    pub notifier_type: Option<String>,
    /// Drop members whose notifier key equals this one. Members without a
    /// notifier are kept.
    pub exclude_notifier_key: Option<String>,
    pub order: Option<SortOrder>,
    pub limit: Option<usize>,
}

impl MemberQuery {
    /// All members of the group rooted at `owner_id`.
    pub fn of(owner_id: DbId) -> Self {
        Self {
            owner_id,
            opened: None,
            notifier_type: None,
            exclude_notifier_key: None,
            order: None,
            limit: None,
        }
    }

    pub fn unopened_only(mut self) -> Self {
        self.opened = Some(false);
        self
    }

    pub fn opened_only(mut self) -> Self {
        self.opened = Some(true);
        self
    }

    pub fn filtered_by_notifier_type(mut self, notifier_type: impl Into<String>) -> Self {
        self.notifier_type = Some(notifier_type.into());
        self
    }

    pub fn excluding_notifier(mut self, notifier_key: impl Into<String>) -> Self {
        self.exclude_notifier_key = Some(notifier_key.into());
        self
    }

    pub fn order_by(mut self, order: SortOrder) -> Self {
        self.order = Some(order);
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Whether `record` satisfies every filter of this query.
    pub fn matches(&self, record: &Notification) -> bool {
        if record.group_owner_id != Some(self.owner_id) {
            return false;
        }
        if let Some(opened) = self.opened {
            if record.is_opened() != opened {
                return false;
            }
        }
        if let Some(notifier_type) = &self.notifier_type {
            match &record.notifier {
                Some(notifier) if &notifier.entity_type == notifier_type => {}
                _ => return false,
            }
        }
        if let Some(excluded) = &self.exclude_notifier_key {
            if record.notifier_key().as_ref() == Some(excluded) {
                return false;
            }
        }
        true
    }
}

// ---------------------------------------------------------------------------
// FeedQuery
// ---------------------------------------------------------------------------

/// Query over the notification feed of one target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedQuery {
    pub target: EntityRef,
    pub opened: Option<bool>,
    pub key: Option<String>,
    /// Hide group members, leaving one entry per group.
    pub owners_only: bool,
    pub order: SortOrder,
    pub limit: Option<usize>,
}

impl FeedQuery {
    /// Every notification of `target`, newest first.
    pub fn for_target(target: EntityRef) -> Self {
        Self {
            target,
            opened: None,
            key: None,
            owners_only: false,
            order: SortOrder::Latest,
            limit: None,
        }
    }

    pub fn unopened_only(mut self) -> Self {
        self.opened = Some(false);
        self
    }

    /// Opened notifications, capped at `limit` like every opened read.
    pub fn opened_only(mut self, limit: usize) -> Self {
        self.opened = Some(true);
        self.limit = Some(limit);
        self
    }

    pub fn filtered_by_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn owners_only(mut self) -> Self {
        self.owners_only = true;
        self
    }

    pub fn latest(mut self) -> Self {
        self.order = SortOrder::Latest;
        self
    }

    pub fn earliest(mut self) -> Self {
        self.order = SortOrder::Earliest;
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn matches(&self, record: &Notification) -> bool {
        record.target == self.target
            && self.opened.map_or(true, |opened| record.is_opened() == opened)
            && self.key.as_ref().map_or(true, |key| &record.key == key)
            && (!self.owners_only || record.group_owner_id.is_none())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::notification::Parameters;

    fn member(id: DbId, owner: DbId, notifier: Option<EntityRef>, opened: bool) -> Notification {
        Notification {
            id,
            target: EntityRef::new("user", 1),
            notifiable: EntityRef::new("comment", id),
            notifier,
            key: "comment.reply".into(),
            group: None,
            group_owner_id: Some(owner),
            opened_at: opened.then(|| Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()),
            parameters: Parameters::new(),
            created_at: Utc.with_ymd_and_hms(2023, 12, 1, 0, 0, 0).unwrap(),
        }
    }

    #[test]
    fn member_query_filters_on_owner_and_state() {
        let m = member(2, 1, None, false);
        assert!(MemberQuery::of(1).matches(&m));
        assert!(MemberQuery::of(1).unopened_only().matches(&m));
        assert!(!MemberQuery::of(1).opened_only().matches(&m));
        assert!(!MemberQuery::of(5).matches(&m));
    }

    #[test]
    fn notifier_type_filter_drops_missing_notifier() {
        let anonymous = member(2, 1, None, false);
        let by_user = member(3, 1, Some(EntityRef::new("user", 8)), false);
        let query = MemberQuery::of(1).filtered_by_notifier_type("user");
        assert!(!query.matches(&anonymous));
        assert!(query.matches(&by_user));
    }

    #[test]
    fn exclusion_keeps_other_and_missing_notifiers() {
        let query = MemberQuery::of(1).excluding_notifier("user#8");
        assert!(!query.matches(&member(2, 1, Some(EntityRef::new("user", 8)), false)));
        assert!(query.matches(&member(3, 1, Some(EntityRef::new("user", 9)), false)));
        assert!(query.matches(&member(4, 1, None, false)));
    }

    #[test]
    fn sort_breaks_ties_by_id() {
        let mut records = vec![member(3, 1, None, false), member(2, 1, None, false)];
        SortOrder::Earliest.sort(&mut records);
        assert_eq!(records.iter().map(|r| r.id).collect::<Vec<_>>(), vec![2, 3]);
        SortOrder::Latest.sort(&mut records);
        assert_eq!(records.iter().map(|r| r.id).collect::<Vec<_>>(), vec![3, 2]);
    }

    #[test]
    fn feed_query_owners_only_hides_members() {
        let m = member(2, 1, None, false);
        let target = EntityRef::new("user", 1);
        assert!(FeedQuery::for_target(target.clone()).matches(&m));
        assert!(!FeedQuery::for_target(target.clone()).owners_only().matches(&m));
        assert!(!FeedQuery::for_target(target).filtered_by_key("other").matches(&m));
    }
}
