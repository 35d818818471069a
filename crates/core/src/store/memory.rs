//! In-process [`NotificationStore`] backed by a vector.
//!
//! Used by tests and by embedders that do not need durability. Every trait
//! call bumps a counter so callers can assert how many queries ran.

use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};

use tokio::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::CoreResult;
use crate::notification::{NewNotification, Notification};
use crate::query::{FeedQuery, MemberQuery, SortOrder};
use crate::store::{NotificationStore, OpenScope};
use crate::types::{DbId, Timestamp};

#[derive(Debug, Default)]
pub struct InMemoryNotificationStore {
    records: RwLock<Vec<Notification>>,
    last_id: AtomicI64,
    queries: AtomicUsize,
}

impl InMemoryNotificationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of store calls made so far.
    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    /// Drop a record outright, returning it if it existed.
    ///
    /// Not part of the store contract; lets callers simulate rows that
    /// disappeared underneath a reference.
    pub async fn remove(&self, id: DbId) -> Option<Notification> {
        let mut records = self.write().await;
        let index = records.iter().position(|r| r.id == id)?;
        Some(records.remove(index))
    }

    async fn read(&self) -> RwLockReadGuard<'_, Vec<Notification>> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        self.records.read().await
    }

    async fn write(&self) -> RwLockWriteGuard<'_, Vec<Notification>> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        self.records.write().await
    }
}

fn finish(
    mut records: Vec<Notification>,
    order: Option<SortOrder>,
    limit: Option<usize>,
) -> Vec<Notification> {
    if let Some(order) = order {
        order.sort(&mut records);
    }
    if let Some(limit) = limit {
        records.truncate(limit);
    }
    records
}

impl NotificationStore for InMemoryNotificationStore {
    async fn find_by_id(&self, id: DbId) -> CoreResult<Option<Notification>> {
        Ok(self.read().await.iter().find(|r| r.id == id).cloned())
    }

    async fn query_by_group_owner(&self, query: &MemberQuery) -> CoreResult<Vec<Notification>> {
        let matched = self
            .read()
            .await
            .iter()
            .filter(|r| query.matches(r))
            .cloned()
            .collect();
        Ok(finish(matched, query.order, query.limit))
    }

    async fn count_by_group_owner(&self, query: &MemberQuery) -> CoreResult<i64> {
        let count = self.read().await.iter().filter(|r| query.matches(r)).count();
        Ok(count as i64)
    }

    async fn query_by_target(&self, query: &FeedQuery) -> CoreResult<Vec<Notification>> {
        let matched = self
            .read()
            .await
            .iter()
            .filter(|r| query.matches(r))
            .cloned()
            .collect();
        Ok(finish(matched, Some(query.order), query.limit))
    }

    async fn find_group_owner_candidate(
        &self,
        new: &NewNotification,
        since: Option<Timestamp>,
    ) -> CoreResult<Option<Notification>> {
        let candidate = self
            .read()
            .await
            .iter()
            .filter(|r| {
                r.group_owner_id.is_none()
                    && r.opened_at.is_none()
                    && r.target == new.target
                    && r.key == new.key
                    && r.notifiable.entity_type == new.notifiable.entity_type
                    && r.group == new.group
                    && since.map_or(true, |since| r.created_at >= since)
            })
            .max_by_key(|r| (r.created_at, r.id))
            .cloned();
        Ok(candidate)
    }

    async fn insert(
        &self,
        new: &NewNotification,
        group_owner_id: Option<DbId>,
        created_at: Timestamp,
    ) -> CoreResult<Notification> {
        let record = Notification {
            id: self.last_id.fetch_add(1, Ordering::SeqCst) + 1,
            target: new.target.clone(),
            notifiable: new.notifiable.clone(),
            notifier: new.notifier.clone(),
            key: new.key.clone(),
            group: new.group.clone(),
            group_owner_id,
            opened_at: None,
            parameters: new.parameters.clone(),
            created_at,
        };
        self.write().await.push(record.clone());
        Ok(record)
    }

    async fn mark_opened(&self, scope: &OpenScope, opened_at: Timestamp) -> CoreResult<u64> {
        let mut changed = 0;
        let mut records = self.write().await;
        for record in records.iter_mut().filter(|r| r.opened_at.is_none()) {
            let in_scope = match scope {
                OpenScope::Record(id) => record.id == *id,
                OpenScope::GroupMembers(owner_id) => record.group_owner_id == Some(*owner_id),
                OpenScope::Target { target, key } => {
                    &record.target == target && key.as_ref().map_or(true, |k| &record.key == k)
                }
            };
            if in_scope {
                record.opened_at = Some(opened_at);
                changed += 1;
            }
        }
        Ok(changed)
    }
}
