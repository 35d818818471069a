//! Row model for the `notifications` table.

use herald_core::error::CoreError;
use herald_core::notification::{EntityRef, Notification, Parameters};
use herald_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A row from the `notifications` table.
#[derive(Debug, Clone, FromRow)]
pub struct NotificationRow {
    pub id: DbId,
    pub target_type: String,
    pub target_id: String,
    pub notifiable_type: String,
    pub notifiable_id: String,
    pub notifier_type: Option<String>,
    pub notifier_id: Option<String>,
    pub key: String,
    pub group_type: Option<String>,
    pub group_id: Option<String>,
    pub group_owner_id: Option<DbId>,
    pub opened_at: Option<Timestamp>,
    pub parameters: serde_json::Value,
    pub created_at: Timestamp,
}

/// Both halves of a nullable polymorphic reference, or nothing.
fn optional_ref(entity_type: Option<String>, id: Option<String>) -> Option<EntityRef> {
    match (entity_type, id) {
        (Some(entity_type), Some(id)) => Some(EntityRef { entity_type, id }),
        _ => None,
    }
}

impl TryFrom<NotificationRow> for Notification {
    type Error = CoreError;

    /// Fails with [`CoreError::Store`] when `parameters` is not a JSON object.
    fn try_from(row: NotificationRow) -> Result<Self, Self::Error> {
        let parameters: Parameters =
            serde_json::from_value(row.parameters).map_err(CoreError::store)?;
        Ok(Notification {
            id: row.id,
            target: EntityRef {
                entity_type: row.target_type,
                id: row.target_id,
            },
            notifiable: EntityRef {
                entity_type: row.notifiable_type,
                id: row.notifiable_id,
            },
            notifier: optional_ref(row.notifier_type, row.notifier_id),
            key: row.key,
            group: optional_ref(row.group_type, row.group_id),
            group_owner_id: row.group_owner_id,
            opened_at: row.opened_at,
            parameters,
            created_at: row.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use chrono::Utc;
    use serde_json::json;

    use super::*;

    fn row(parameters: serde_json::Value) -> NotificationRow {
        NotificationRow {
            id: 1,
            target_type: "user".into(),
            target_id: "1".into(),
            notifiable_type: "comment".into(),
            notifiable_id: "5".into(),
            notifier_type: Some("user".into()),
            notifier_id: None,
            key: "comment.reply".into(),
            group_type: None,
            group_id: None,
            group_owner_id: None,
            opened_at: None,
            parameters,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn object_parameters_convert() {
        let notification = Notification::try_from(row(json!({ "excerpt": "hi" }))).unwrap();
        assert_eq!(notification.parameters["excerpt"], "hi");
        assert!(notification.notifier.is_none(), "half a reference is no reference");
    }

    #[test]
    fn non_object_parameters_are_rejected() {
        let result = Notification::try_from(row(json!(["not", "an", "object"])));
        assert_matches!(result, Err(CoreError::Store(_)));
    }
}
