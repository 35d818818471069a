//! [`NotificationStore`] implementation over PostgreSQL.

use herald_core::error::{CoreError, CoreResult};
use herald_core::notification::{NewNotification, Notification};
use herald_core::query::{FeedQuery, MemberQuery};
use herald_core::store::{NotificationStore, OpenScope};
use herald_core::types::{DbId, Timestamp};

use crate::repositories::NotificationRepo;
use crate::DbPool;

/// Notification store backed by the `notifications` table.
///
/// Database errors are surfaced as [`CoreError::Store`] with the original
/// `sqlx::Error` as source; rows that fail to decode are reported the same
/// way. No retries are attempted here.
#[derive(Debug, Clone)]
pub struct PgNotificationStore {
    pool: DbPool,
}

impl PgNotificationStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

impl NotificationStore for PgNotificationStore {
    async fn find_by_id(&self, id: DbId) -> CoreResult<Option<Notification>> {
        let row = NotificationRepo::find_by_id(&self.pool, id)
            .await
            .map_err(CoreError::store)?;
        row.map(Notification::try_from).transpose()
    }

    async fn query_by_group_owner(&self, query: &MemberQuery) -> CoreResult<Vec<Notification>> {
        let rows = NotificationRepo::list_members(&self.pool, query)
            .await
            .map_err(CoreError::store)?;
        tracing::debug!(owner_id = query.owner_id, rows = rows.len(), "Queried group members");
        rows.into_iter().map(Notification::try_from).collect()
    }

    async fn count_by_group_owner(&self, query: &MemberQuery) -> CoreResult<i64> {
        NotificationRepo::count_members(&self.pool, query)
            .await
            .map_err(CoreError::store)
    }

    async fn query_by_target(&self, query: &FeedQuery) -> CoreResult<Vec<Notification>> {
        let rows = NotificationRepo::list_for_target(&self.pool, query)
            .await
            .map_err(CoreError::store)?;
        rows.into_iter().map(Notification::try_from).collect()
    }

    async fn find_group_owner_candidate(
        &self,
        new: &NewNotification,
        since: Option<Timestamp>,
    ) -> CoreResult<Option<Notification>> {
        let row = NotificationRepo::find_open_owner(&self.pool, new, since)
            .await
            .map_err(CoreError::store)?;
        row.map(Notification::try_from).transpose()
    }

    async fn insert(
        &self,
        new: &NewNotification,
        group_owner_id: Option<DbId>,
        created_at: Timestamp,
    ) -> CoreResult<Notification> {
        let row = NotificationRepo::create(&self.pool, new, group_owner_id, created_at)
            .await
            .map_err(CoreError::store)?;
        row.try_into()
    }

    async fn mark_opened(&self, scope: &OpenScope, opened_at: Timestamp) -> CoreResult<u64> {
        NotificationRepo::mark_opened(&self.pool, scope, opened_at)
            .await
            .map_err(CoreError::store)
    }
}
