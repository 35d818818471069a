//! Notification record and write model.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::{CoreError, CoreResult};
use crate::types::{DbId, Timestamp};

/// Event-specific payload attached to a notification.
pub type Parameters = serde_json::Map<String, serde_json::Value>;

/// Polymorphic reference to a record owned by the surrounding application.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Validate)]
pub struct EntityRef {
    /// Type tag, e.g. `"user"` or `"comment"`.
    #[validate(length(min = 1, message = "entity type must not be empty"))]
    pub entity_type: String,
    /// Record identifier within that type.
    #[validate(length(min = 1, message = "entity id must not be empty"))]
    pub id: String,
}

impl EntityRef {
    pub fn new(entity_type: impl Into<String>, id: impl ToString) -> Self {
        Self {
            entity_type: entity_type.into(),
            id: id.to_string(),
        }
    }

    /// Composite key in the form `"<type>#<id>"`.
    pub fn key(&self) -> String {
        format!("{}#{}", self.entity_type, self.id)
    }
}

/// Position of a notification within its group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupRole {
    /// Canonical, visible notification of the group.
    Owner,
    /// Subordinate to the owner with this id.
    MemberOf(DbId),
}

/// A stored notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: DbId,
    /// Recipient.
    pub target: EntityRef,
    /// What the notification is about.
    pub notifiable: EntityRef,
    /// Who caused it, when known.
    pub notifier: Option<EntityRef>,
    /// Kind of notification, e.g. `"comment.reply"`.
    pub key: String,
    /// Entity notifications are grouped under, if grouping applies.
    pub group: Option<EntityRef>,
    /// `None` for owners, the owner's id for members.
    pub group_owner_id: Option<DbId>,
    pub opened_at: Option<Timestamp>,
    pub parameters: Parameters,
    pub created_at: Timestamp,
}

impl Notification {
    pub fn role(&self) -> GroupRole {
        match self.group_owner_id {
            None => GroupRole::Owner,
            Some(owner_id) => GroupRole::MemberOf(owner_id),
        }
    }

    pub fn is_opened(&self) -> bool {
        self.opened_at.is_some()
    }

    pub fn notifier_key(&self) -> Option<String> {
        self.notifier.as_ref().map(EntityRef::key)
    }
}

/// Data required to persist a new notification.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewNotification {
    #[validate(nested)]
    pub target: EntityRef,
    #[validate(nested)]
    pub notifiable: EntityRef,
    pub notifier: Option<EntityRef>,
    #[validate(length(min = 1, message = "key must not be empty"))]
    pub key: String,
    pub group: Option<EntityRef>,
    #[serde(default)]
    pub parameters: Parameters,
}

impl NewNotification {
    pub fn new(target: EntityRef, notifiable: EntityRef, key: impl Into<String>) -> Self {
        Self {
            target,
            notifiable,
            notifier: None,
            key: key.into(),
            group: None,
            parameters: Parameters::new(),
        }
    }

    pub fn with_notifier(mut self, notifier: EntityRef) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn with_group(mut self, group: EntityRef) -> Self {
        self.group = Some(group);
        self
    }

    pub fn with_parameter(mut self, name: impl Into<String>, value: serde_json::Value) -> Self {
        self.parameters.insert(name.into(), value);
        self
    }

    /// Check required fields, rejecting the write with
    /// [`CoreError::Validation`] on failure.
    pub fn validate_for_insert(&self) -> CoreResult<()> {
        self.validate()
            .map_err(|e| CoreError::Validation(e.to_string()))?;
        for optional in [&self.notifier, &self.group].into_iter().flatten() {
            optional
                .validate()
                .map_err(|e| CoreError::Validation(e.to_string()))?;
        }
        Ok(())
    }
}
