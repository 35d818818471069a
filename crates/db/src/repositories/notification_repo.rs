//! Repository for the `notifications` table.

use herald_core::notification::NewNotification;
use herald_core::query::{FeedQuery, MemberQuery, SortOrder};
use herald_core::store::OpenScope;
use herald_core::types::{DbId, Timestamp};
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::models::notification::NotificationRow;

/// Column list for `notifications` queries.
const COLUMNS: &str = "id, target_type, target_id, notifiable_type, notifiable_id, \
     notifier_type, notifier_id, key, group_type, group_id, group_owner_id, \
     opened_at, parameters, created_at";

/// Provides reads and the narrow set of writes the core performs.
pub struct NotificationRepo;

impl NotificationRepo {
    /// Find a notification by its ID.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<NotificationRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM notifications WHERE id = $1");
        sqlx::query_as::<_, NotificationRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List group members matching `query`, honouring its order and limit.
    pub async fn list_members(
        pool: &PgPool,
        query: &MemberQuery,
    ) -> Result<Vec<NotificationRow>, sqlx::Error> {
        let mut builder = select_notifications();
        push_member_filters(&mut builder, query);
        if let Some(order) = query.order {
            push_order(&mut builder, order);
        }
        if let Some(limit) = query.limit {
            builder.push(" LIMIT ").push_bind(sql_limit(limit));
        }
        builder
            .build_query_as::<NotificationRow>()
            .fetch_all(pool)
            .await
    }

    /// Count group members matching `query`. The limit is not applied.
    pub async fn count_members(pool: &PgPool, query: &MemberQuery) -> Result<i64, sqlx::Error> {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM notifications");
        push_member_filters(&mut builder, query);
        builder.build_query_scalar::<i64>().fetch_one(pool).await
    }

    /// List a target's notifications.
    pub async fn list_for_target(
        pool: &PgPool,
        query: &FeedQuery,
    ) -> Result<Vec<NotificationRow>, sqlx::Error> {
        let mut builder = select_notifications();
        builder
            .push(" WHERE target_type = ")
            .push_bind(query.target.entity_type.clone())
            .push(" AND target_id = ")
            .push_bind(query.target.id.clone());
        push_opened_filter(&mut builder, query.opened);
        if let Some(key) = &query.key {
            builder.push(" AND key = ").push_bind(key.clone());
        }
        if query.owners_only {
            builder.push(" AND group_owner_id IS NULL");
        }
        push_order(&mut builder, query.order);
        if let Some(limit) = query.limit {
            builder.push(" LIMIT ").push_bind(sql_limit(limit));
        }
        builder
            .build_query_as::<NotificationRow>()
            .fetch_all(pool)
            .await
    }

    /// Latest unopened owner that `new` could join.
    ///
    /// Matches on target, key, notifiable type and group; `since` bounds
    /// the owner's age when given.
    pub async fn find_open_owner(
        pool: &PgPool,
        new: &NewNotification,
        since: Option<Timestamp>,
    ) -> Result<Option<NotificationRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM notifications \
             WHERE group_owner_id IS NULL AND opened_at IS NULL \
               AND target_type = $1 AND target_id = $2 \
               AND key = $3 AND notifiable_type = $4 \
               AND group_type IS NOT DISTINCT FROM $5 \
               AND group_id IS NOT DISTINCT FROM $6 \
               AND ($7::timestamptz IS NULL OR created_at >= $7) \
             ORDER BY created_at DESC, id DESC \
             LIMIT 1"
        );
        sqlx::query_as::<_, NotificationRow>(&query)
            .bind(&new.target.entity_type)
            .bind(&new.target.id)
            .bind(&new.key)
            .bind(&new.notifiable.entity_type)
            .bind(new.group.as_ref().map(|g| g.entity_type.as_str()))
            .bind(new.group.as_ref().map(|g| g.id.as_str()))
            .bind(since)
            .fetch_optional(pool)
            .await
    }

    /// Insert a notification, returning the stored row.
    pub async fn create(
        pool: &PgPool,
        new: &NewNotification,
        group_owner_id: Option<DbId>,
        created_at: Timestamp,
    ) -> Result<NotificationRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO notifications \
                (target_type, target_id, notifiable_type, notifiable_id, \
                 notifier_type, notifier_id, key, group_type, group_id, \
                 group_owner_id, parameters, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, NotificationRow>(&query)
            .bind(&new.target.entity_type)
            .bind(&new.target.id)
            .bind(&new.notifiable.entity_type)
            .bind(&new.notifiable.id)
            .bind(new.notifier.as_ref().map(|n| n.entity_type.as_str()))
            .bind(new.notifier.as_ref().map(|n| n.id.as_str()))
            .bind(&new.key)
            .bind(new.group.as_ref().map(|g| g.entity_type.as_str()))
            .bind(new.group.as_ref().map(|g| g.id.as_str()))
            .bind(group_owner_id)
            .bind(serde_json::Value::Object(new.parameters.clone()))
            .bind(created_at)
            .fetch_one(pool)
            .await
    }

    /// Set `opened_at` on every unopened notification in `scope`.
    ///
    /// Returns the number of rows updated.
    pub async fn mark_opened(
        pool: &PgPool,
        scope: &OpenScope,
        opened_at: Timestamp,
    ) -> Result<u64, sqlx::Error> {
        let result = match scope {
            OpenScope::Record(id) => {
                sqlx::query(
                    "UPDATE notifications SET opened_at = $2 \
                     WHERE id = $1 AND opened_at IS NULL",
                )
                .bind(id)
                .bind(opened_at)
                .execute(pool)
                .await?
            }
            OpenScope::GroupMembers(owner_id) => {
                sqlx::query(
                    "UPDATE notifications SET opened_at = $2 \
                     WHERE group_owner_id = $1 AND opened_at IS NULL",
                )
                .bind(owner_id)
                .bind(opened_at)
                .execute(pool)
                .await?
            }
            OpenScope::Target { target, key } => {
                sqlx::query(
                    "UPDATE notifications SET opened_at = $4 \
                     WHERE target_type = $1 AND target_id = $2 \
                       AND ($3::text IS NULL OR key = $3) \
                       AND opened_at IS NULL",
                )
                .bind(&target.entity_type)
                .bind(&target.id)
                .bind(key.as_deref())
                .bind(opened_at)
                .execute(pool)
                .await?
            }
        };
        Ok(result.rows_affected())
    }
}

/// Postgres `LIMIT` is a signed bigint; saturate rather than wrap.
fn sql_limit(limit: usize) -> i64 {
    i64::try_from(limit).unwrap_or(i64::MAX)
}

fn select_notifications() -> QueryBuilder<'static, Postgres> {
    QueryBuilder::new(format!("SELECT {COLUMNS} FROM notifications"))
}

fn push_member_filters(builder: &mut QueryBuilder<'_, Postgres>, query: &MemberQuery) {
    builder
        .push(" WHERE group_owner_id = ")
        .push_bind(query.owner_id);
    push_opened_filter(builder, query.opened);
    if let Some(notifier_type) = &query.notifier_type {
        builder
            .push(" AND notifier_type = ")
            .push_bind(notifier_type.clone());
    }
    if let Some(excluded) = &query.exclude_notifier_key {
        builder
            .push(" AND (notifier_key IS NULL OR notifier_key <> ")
            .push_bind(excluded.clone())
            .push(")");
    }
}

fn push_opened_filter(builder: &mut QueryBuilder<'_, Postgres>, opened: Option<bool>) {
    match opened {
        Some(true) => {
            builder.push(" AND opened_at IS NOT NULL");
        }
        Some(false) => {
            builder.push(" AND opened_at IS NULL");
        }
        None => {}
    }
}

fn push_order(builder: &mut QueryBuilder<'_, Postgres>, order: SortOrder) {
    builder.push(match order {
        SortOrder::Earliest => " ORDER BY created_at ASC, id ASC",
        SortOrder::Latest => " ORDER BY created_at DESC, id DESC",
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sql_limit_saturates() {
        assert_eq!(sql_limit(0), 0);
        assert_eq!(sql_limit(25), 25);
        assert_eq!(sql_limit(usize::MAX), i64::MAX);
    }
}
