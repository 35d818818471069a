//! Per-group summary used when rendering a notification digest.

use serde::Serialize;

use crate::counter::ReadStateCounter;
use crate::error::CoreResult;
use crate::notification::Notification;
use crate::store::NotificationStore;
use crate::types::DbId;

/// Unread totals for one group, gathered lazily at render time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupDigest {
    pub owner_id: DbId,
    pub key: String,
    /// Unopened members, excluding the owner itself.
    pub unopened_member_count: i64,
    /// Distinct notifiers among unopened members other than the owner's.
    pub other_notifier_count: i64,
}

impl GroupDigest {
    /// Collect the counts for `owner`'s group. Issues two store queries.
    pub async fn build<S: NotificationStore>(
        counter: &ReadStateCounter<'_, S>,
        owner: &Notification,
    ) -> CoreResult<Self> {
        Ok(Self {
            owner_id: owner.id,
            key: owner.key.clone(),
            unopened_member_count: counter.unopened_member_count(owner).await?,
            other_notifier_count: counter.unopened_member_notifier_count(owner).await?,
        })
    }

    /// "alice", "alice and 1 other person", "alice and 3 other people".
    pub fn summary(&self, notifier_name: &str) -> String {
        match self.other_notifier_count {
            n if n <= 0 => notifier_name.to_string(),
            1 => format!("{notifier_name} and 1 other person"),
            n => format!("{notifier_name} and {n} other people"),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::config::NotificationConfig;
    use crate::notification::{EntityRef, NewNotification};
    use crate::store::InMemoryNotificationStore;

    fn like_from(user: &str) -> NewNotification {
        NewNotification::new(EntityRef::new("user", "me"), EntityRef::new("post", 1), "post.liked")
            .with_notifier(EntityRef::new("user", user))
    }

    fn digest(others: i64) -> GroupDigest {
        GroupDigest {
            owner_id: 1,
            key: "post.liked".into(),
            unopened_member_count: others,
            other_notifier_count: others,
        }
    }

    #[test]
    fn summary_phrasing() {
        assert_eq!(digest(0).summary("alice"), "alice");
        assert_eq!(digest(1).summary("alice"), "alice and 1 other person");
        assert_eq!(digest(3).summary("alice"), "alice and 3 other people");
    }

    #[tokio::test]
    async fn build_collects_group_counts() {
        let store = InMemoryNotificationStore::new();
        let config = NotificationConfig::default();
        let now = Utc::now();
        let owner = store.insert(&like_from("alice"), None, now).await.unwrap();
        for user in ["bob", "carol", "bob", "alice"] {
            store.insert(&like_from(user), Some(owner.id), now).await.unwrap();
        }

        let counter = ReadStateCounter::new(&store, &config);
        let digest = GroupDigest::build(&counter, &owner).await.unwrap();
        assert_eq!(digest.unopened_member_count, 4);
        assert_eq!(digest.other_notifier_count, 2);
        assert_eq!(digest.summary("alice"), "alice and 2 other people");
    }
}
