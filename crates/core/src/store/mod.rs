//! Notification store contract.
//!
//! The core never talks to a database directly. Every read and write goes
//! through a [`NotificationStore`], which owns persistence, indexing and any
//! retry/timeout policy. Store failures come back as
//! [`CoreError::Store`](crate::error::CoreError::Store) and are passed to the
//! caller untouched.

pub mod memory;

use std::future::Future;

use crate::error::CoreResult;
use crate::notification::{EntityRef, NewNotification, Notification};
use crate::query::{FeedQuery, MemberQuery};
use crate::types::{DbId, Timestamp};

pub use memory::InMemoryNotificationStore;

/// Which unopened notifications a [`NotificationStore::mark_opened`] call touches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpenScope {
    /// A single notification.
    Record(DbId),
    /// Every member of the group rooted at this owner.
    GroupMembers(DbId),
    /// Every notification of a target, optionally restricted to one key.
    Target {
        target: EntityRef,
        key: Option<String>,
    },
}

/// Persistence backend for notifications.
pub trait NotificationStore: Send + Sync {
    /// Fetch a notification by id.
    fn find_by_id(
        &self,
        id: DbId,
    ) -> impl Future<Output = CoreResult<Option<Notification>>> + Send;

    /// Fetch the members matching `query`, honouring its order and limit.
    fn query_by_group_owner(
        &self,
        query: &MemberQuery,
    ) -> impl Future<Output = CoreResult<Vec<Notification>>> + Send;

    /// Server-side count of the members matching `query`. The limit is ignored.
    fn count_by_group_owner(
        &self,
        query: &MemberQuery,
    ) -> impl Future<Output = CoreResult<i64>> + Send;

    /// Fetch a target's feed.
    fn query_by_target(
        &self,
        query: &FeedQuery,
    ) -> impl Future<Output = CoreResult<Vec<Notification>>> + Send;

    /// Latest unopened owner that `new` could join: same target, key,
    /// notifiable type and group, created at or after `since` when given.
    fn find_group_owner_candidate(
        &self,
        new: &NewNotification,
        since: Option<Timestamp>,
    ) -> impl Future<Output = CoreResult<Option<Notification>>> + Send;

    /// Persist a validated notification, returning the stored record.
    fn insert(
        &self,
        new: &NewNotification,
        group_owner_id: Option<DbId>,
        created_at: Timestamp,
    ) -> impl Future<Output = CoreResult<Notification>> + Send;

    /// Set `opened_at` on every still-unopened notification in `scope`.
    ///
    /// Returns the number of notifications that changed.
    fn mark_opened(
        &self,
        scope: &OpenScope,
        opened_at: Timestamp,
    ) -> impl Future<Output = CoreResult<u64>> + Send;
}
