//! Read-state aggregates for a notification group.
//!
//! Used to render "N others" style summaries. Nothing is cached: every call
//! re-queries the store. Opened reads are capped by a limit because opened
//! sets only grow; unopened counts are unbounded.
//!
//! All counters expect an owner. Passing a member yields 0, since no record
//! names a member as its owner.

use std::collections::HashSet;

use crate::config::NotificationConfig;
use crate::error::CoreResult;
use crate::notification::Notification;
use crate::query::MemberQuery;
use crate::store::NotificationStore;

/// Computes opened/unopened member counts against a store.
pub struct ReadStateCounter<'a, S> {
    store: &'a S,
    config: &'a NotificationConfig,
}

impl<'a, S: NotificationStore> ReadStateCounter<'a, S> {
    pub fn new(store: &'a S, config: &'a NotificationConfig) -> Self {
        Self { store, config }
    }

    /// Members of `owner`'s group that are still unopened.
    ///
    /// Runs a full server-side count on every call.
    pub async fn unopened_member_count(&self, owner: &Notification) -> CoreResult<i64> {
        let count = self
            .store
            .count_by_group_owner(&MemberQuery::of(owner.id).unopened_only())
            .await?;
        tracing::debug!(owner_id = owner.id, count, "Counted unopened members");
        Ok(count)
    }

    /// Members of `owner`'s group that have been opened, capped at `limit`.
    ///
    /// `limit` defaults to [`NotificationConfig::opened_index_limit`]. A limit
    /// of `0` returns `0` without querying. The result is exact only when it
    /// is below the limit.
    pub async fn opened_member_count(
        &self,
        owner: &Notification,
        limit: Option<usize>,
    ) -> CoreResult<i64> {
        let limit = self.resolve_limit(limit);
        if limit == 0 {
            return Ok(0);
        }
        let opened = self
            .store
            .query_by_group_owner(&MemberQuery::of(owner.id).opened_only().limit(limit))
            .await?;
        let count = opened.len().min(limit) as i64;
        tracing::debug!(owner_id = owner.id, count, limit, "Counted opened members");
        Ok(count)
    }

    /// Distinct notifiers among unopened members, not counting the owner's
    /// own notifier.
    pub async fn unopened_member_notifier_count(&self, owner: &Notification) -> CoreResult<i64> {
        let members = self
            .store
            .query_by_group_owner(&notifier_query(owner).unopened_only())
            .await?;
        Ok(distinct_notifiers(&members))
    }

    /// Distinct notifiers among opened members, not counting the owner's
    /// own notifier. Follows the same limit rules as
    /// [`opened_member_count`](Self::opened_member_count).
    pub async fn opened_member_notifier_count(
        &self,
        owner: &Notification,
        limit: Option<usize>,
    ) -> CoreResult<i64> {
        let limit = self.resolve_limit(limit);
        if limit == 0 {
            return Ok(0);
        }
        let members = self
            .store
            .query_by_group_owner(&notifier_query(owner).opened_only().limit(limit))
            .await?;
        Ok(distinct_notifiers(&members))
    }

    pub async fn unopened_member_notifier_exists(&self, owner: &Notification) -> CoreResult<bool> {
        Ok(self.unopened_member_notifier_count(owner).await? > 0)
    }

    pub async fn opened_member_notifier_exists(
        &self,
        owner: &Notification,
        limit: Option<usize>,
    ) -> CoreResult<bool> {
        Ok(self.opened_member_notifier_count(owner, limit).await? > 0)
    }

    fn resolve_limit(&self, limit: Option<usize>) -> usize {
        limit.unwrap_or(self.config.opened_index_limit)
    }
}

/// Members sharing the owner's notifier type, minus the owner's notifier.
///
/// An owner without a notifier has nothing to exclude, so all members are
/// considered.
fn notifier_query(owner: &Notification) -> MemberQuery {
    let query = MemberQuery::of(owner.id);
    match &owner.notifier {
        Some(notifier) => query
            .filtered_by_notifier_type(notifier.entity_type.clone())
            .excluding_notifier(notifier.key()),
        None => query,
    }
}

fn distinct_notifiers(members: &[Notification]) -> i64 {
    members
        .iter()
        .filter_map(Notification::notifier_key)
        .collect::<HashSet<_>>()
        .len() as i64
}
