//! Group membership resolution.
//!
//! A notification with no `group_owner_id` owns its group; any other
//! notification is a member of the owner it points at.

use crate::error::{CoreError, CoreResult};
use crate::notification::Notification;
use crate::query::MemberQuery;
use crate::store::NotificationStore;

pub fn is_group_owner(record: &Notification) -> bool {
    record.group_owner_id.is_none()
}

pub fn is_group_member(record: &Notification) -> bool {
    !is_group_owner(record)
}

/// Resolve the owner of `record`.
///
/// Returns `Ok(None)` for an owner. Fails with [`CoreError::NotFound`] when
/// the referenced owner no longer exists in the store.
pub async fn group_owner_of<S: NotificationStore>(
    store: &S,
    record: &Notification,
) -> CoreResult<Option<Notification>> {
    let Some(owner_id) = record.group_owner_id else {
        return Ok(None);
    };
    match store.find_by_id(owner_id).await? {
        Some(owner) => Ok(Some(owner)),
        None => {
            tracing::debug!(
                notification_id = record.id,
                owner_id,
                "Group owner reference does not resolve"
            );
            Err(CoreError::notification_not_found(owner_id))
        }
    }
}

/// Every member of the group rooted at `owner`, in store order.
pub async fn group_members_of<S: NotificationStore>(
    store: &S,
    owner: &Notification,
) -> CoreResult<Vec<Notification>> {
    store.query_by_group_owner(&MemberQuery::of(owner.id)).await
}

/// Whether `owner` has at least one member. Fetches a single row.
pub async fn group_member_exists<S: NotificationStore>(
    store: &S,
    owner: &Notification,
) -> CoreResult<bool> {
    let found = store
        .query_by_group_owner(&MemberQuery::of(owner.id).limit(1))
        .await?;
    Ok(!found.is_empty())
}

/// Size of the whole group: the owner plus all of its members.
pub async fn group_notification_count<S: NotificationStore>(
    store: &S,
    owner: &Notification,
) -> CoreResult<i64> {
    let members = store
        .count_by_group_owner(&MemberQuery::of(owner.id))
        .await?;
    Ok(members + 1)
}
