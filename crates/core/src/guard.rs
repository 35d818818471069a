//! Delete restriction for group owners.
//!
//! The core never deletes notifications itself. Callers about to delete one
//! ask [`ensure_deletable`] first; an owner that still has members is
//! vetoed unless the caller opts into cascading.

use std::convert::Infallible;

use crate::error::{CoreError, CoreResult};
use crate::group::{group_member_exists, is_group_owner};
use crate::notification::Notification;
use crate::store::NotificationStore;

/// What happens to members when their owner is deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DependentPolicy {
    /// Refuse to delete an owner that still has members.
    #[default]
    Restrict,
    /// The caller deletes members along with the owner.
    Cascade,
}

/// Always fails with [`CoreError::DeleteRestriction`].
pub fn raise_delete_restriction_error(message: impl Into<String>) -> CoreResult<Infallible> {
    Err(CoreError::DeleteRestriction(message.into()))
}

/// Check whether `record` may be deleted under `policy`.
pub async fn ensure_deletable<S: NotificationStore>(
    store: &S,
    record: &Notification,
    policy: DependentPolicy,
) -> CoreResult<()> {
    if policy == DependentPolicy::Cascade || !is_group_owner(record) {
        return Ok(());
    }
    if group_member_exists(store, record).await? {
        raise_delete_restriction_error(format!(
            "notification {} still owns group members",
            record.id
        ))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use chrono::Utc;

    use super::*;
    use crate::notification::{EntityRef, NewNotification};
    use crate::store::InMemoryNotificationStore;

    fn reply() -> NewNotification {
        NewNotification::new(
            EntityRef::new("user", 1),
            EntityRef::new("comment", 10),
            "comment.reply",
        )
    }

    #[test]
    fn raise_always_fails_with_message() {
        let result = raise_delete_restriction_error("nope");
        assert_matches!(result, Err(CoreError::DeleteRestriction(msg)) if msg == "nope");
    }

    #[tokio::test]
    async fn owner_with_members_is_restricted() {
        let store = InMemoryNotificationStore::new();
        let owner = store.insert(&reply(), None, Utc::now()).await.unwrap();
        store.insert(&reply(), Some(owner.id), Utc::now()).await.unwrap();

        let result = ensure_deletable(&store, &owner, DependentPolicy::Restrict).await;
        assert_matches!(result, Err(CoreError::DeleteRestriction(msg)) if msg.contains(&owner.id.to_string()));
    }

    #[tokio::test]
    async fn cascade_and_members_pass() {
        let store = InMemoryNotificationStore::new();
        let owner = store.insert(&reply(), None, Utc::now()).await.unwrap();
        let member = store.insert(&reply(), Some(owner.id), Utc::now()).await.unwrap();

        assert!(ensure_deletable(&store, &owner, DependentPolicy::Cascade).await.is_ok());
        assert!(ensure_deletable(&store, &member, DependentPolicy::Restrict).await.is_ok());
    }

    #[tokio::test]
    async fn lone_owner_passes() {
        let store = InMemoryNotificationStore::new();
        let owner = store.insert(&reply(), None, Utc::now()).await.unwrap();
        assert!(ensure_deletable(&store, &owner, DependentPolicy::default()).await.is_ok());
    }
}
