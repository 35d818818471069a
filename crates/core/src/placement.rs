//! Write path: decide whether a new notification owns a group or joins one.

use chrono::Utc;

use crate::config::NotificationConfig;
use crate::error::CoreResult;
use crate::notification::{NewNotification, Notification};
use crate::store::NotificationStore;
use crate::types::Timestamp;

/// Places new notifications into groups.
pub struct GroupPlacement<'a, S> {
    store: &'a S,
    config: &'a NotificationConfig,
}

impl<'a, S: NotificationStore> GroupPlacement<'a, S> {
    pub fn new(store: &'a S, config: &'a NotificationConfig) -> Self {
        Self { store, config }
    }

    /// Validate and persist `new`, created now.
    pub async fn notify(&self, new: &NewNotification) -> CoreResult<Notification> {
        self.notify_at(new, Utc::now()).await
    }

    /// Validate and persist `new` with an explicit creation time.
    ///
    /// A notification without a `group` always becomes an owner. Otherwise it
    /// joins the latest unopened owner sharing its target, key, notifiable
    /// type and group, provided that owner is inside the expiry window.
    pub async fn notify_at(
        &self,
        new: &NewNotification,
        created_at: Timestamp,
    ) -> CoreResult<Notification> {
        new.validate_for_insert()?;

        let owner = match &new.group {
            Some(_) => {
                let since = self.config.group_expiry_delay.map(|delay| created_at - delay);
                self.store.find_group_owner_candidate(new, since).await?
            }
            None => None,
        };
        let group_owner_id = owner.map(|o| o.id);

        let record = self.store.insert(new, group_owner_id, created_at).await?;
        tracing::debug!(
            notification_id = record.id,
            group_owner_id = ?record.group_owner_id,
            key = %record.key,
            "Notification placed"
        );
        Ok(record)
    }
}
