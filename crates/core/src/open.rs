//! Marking notifications as read.

use crate::error::CoreResult;
use crate::group::is_group_owner;
use crate::notification::{EntityRef, Notification};
use crate::store::{NotificationStore, OpenScope};
use crate::types::Timestamp;

/// Mark `record` opened at `opened_at`.
///
/// With `with_members`, an owner's unopened members are opened too. Records
/// that were already opened keep their original timestamp. Returns how many
/// notifications changed.
pub async fn open<S: NotificationStore>(
    store: &S,
    record: &Notification,
    opened_at: Timestamp,
    with_members: bool,
) -> CoreResult<u64> {
    let mut changed = store
        .mark_opened(&OpenScope::Record(record.id), opened_at)
        .await?;
    if with_members && is_group_owner(record) {
        changed += store
            .mark_opened(&OpenScope::GroupMembers(record.id), opened_at)
            .await?;
    }
    tracing::debug!(notification_id = record.id, changed, "Opened notification");
    Ok(changed)
}

/// Mark every unopened notification of `target` opened, optionally only
/// those with the given `key`.
pub async fn open_all_of<S: NotificationStore>(
    store: &S,
    target: &EntityRef,
    opened_at: Timestamp,
    key: Option<&str>,
) -> CoreResult<u64> {
    let scope = OpenScope::Target {
        target: target.clone(),
        key: key.map(str::to_owned),
    };
    let changed = store.mark_opened(&scope, opened_at).await?;
    tracing::debug!(
        target_key = %target.key(),
        changed,
        "Opened all notifications of target"
    );
    Ok(changed)
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use super::*;
    use crate::notification::NewNotification;
    use crate::query::FeedQuery;
    use crate::store::InMemoryNotificationStore;

    fn notice(target: i64, key: &str) -> NewNotification {
        NewNotification::new(EntityRef::new("user", target), EntityRef::new("post", 3), key)
    }

    #[tokio::test]
    async fn open_owner_with_members() {
        let store = InMemoryNotificationStore::new();
        let now = Utc::now();
        let owner = store.insert(&notice(1, "post.liked"), None, now).await.unwrap();
        store.insert(&notice(1, "post.liked"), Some(owner.id), now).await.unwrap();
        store.insert(&notice(1, "post.liked"), Some(owner.id), now).await.unwrap();

        assert_eq!(open(&store, &owner, now, true).await.unwrap(), 3);
        assert_eq!(open(&store, &owner, now, true).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn open_owner_alone_leaves_members() {
        let store = InMemoryNotificationStore::new();
        let now = Utc::now();
        let owner = store.insert(&notice(1, "post.liked"), None, now).await.unwrap();
        let member = store
            .insert(&notice(1, "post.liked"), Some(owner.id), now)
            .await
            .unwrap();

        assert_eq!(open(&store, &owner, now, false).await.unwrap(), 1);
        let member = store.find_by_id(member.id).await.unwrap().unwrap();
        assert!(member.opened_at.is_none());
    }

    #[tokio::test]
    async fn open_all_of_respects_target_and_key() {
        let store = InMemoryNotificationStore::new();
        let now = Utc::now();
        store.insert(&notice(1, "post.liked"), None, now).await.unwrap();
        store.insert(&notice(1, "comment.created"), None, now).await.unwrap();
        store.insert(&notice(2, "post.liked"), None, now).await.unwrap();
        let target = EntityRef::new("user", 1);

        assert_eq!(open_all_of(&store, &target, now, Some("post.liked")).await.unwrap(), 1);
        assert_eq!(open_all_of(&store, &target, now, None).await.unwrap(), 1);

        let other = FeedQuery::for_target(EntityRef::new("user", 2)).unopened_only();
        assert_eq!(store.query_by_target(&other).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn feed_orders_and_caps_opened() {
        let store = InMemoryNotificationStore::new();
        let start = Utc::now();
        let mut ids = Vec::new();
        for minute in 0..4 {
            let created = start + Duration::minutes(minute);
            ids.push(store.insert(&notice(1, "post.liked"), None, created).await.unwrap().id);
        }
        let target = EntityRef::new("user", 1);
        open_all_of(&store, &target, start, None).await.unwrap();

        let latest = store
            .query_by_target(&FeedQuery::for_target(target.clone()).latest())
            .await
            .unwrap();
        assert_eq!(latest.first().map(|n| n.id), ids.last().copied());

        let capped = store
            .query_by_target(&FeedQuery::for_target(target).earliest().opened_only(2))
            .await
            .unwrap();
        assert_eq!(capped.iter().map(|n| n.id).collect::<Vec<_>>(), ids[..2].to_vec());
    }
}
