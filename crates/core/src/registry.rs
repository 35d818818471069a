//! Resolution of polymorphic entity references.
//!
//! Notifications point at application records through [`EntityRef`]s. The
//! application registers one [`EntityFetcher`] per entity type; the registry
//! dispatches on the type tag.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::{CoreError, CoreResult};
use crate::notification::{EntityRef, Notification};

/// Loads records of one entity type.
#[async_trait]
pub trait EntityFetcher: Send + Sync {
    /// Fetch the record with `id`, or `None` if it does not exist.
    async fn fetch(&self, id: &str) -> CoreResult<Option<serde_json::Value>>;
}

/// Fetchers keyed by entity type.
#[derive(Default, Clone)]
pub struct EntityRegistry {
    fetchers: HashMap<String, Arc<dyn EntityFetcher>>,
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `fetcher` for `entity_type`, replacing any previous one.
    pub fn register(
        &mut self,
        entity_type: impl Into<String>,
        fetcher: Arc<dyn EntityFetcher>,
    ) -> &mut Self {
        self.fetchers.insert(entity_type.into(), fetcher);
        self
    }

    pub fn is_registered(&self, entity_type: &str) -> bool {
        self.fetchers.contains_key(entity_type)
    }

    /// Fetch the record behind `reference`.
    ///
    /// An unknown type is a [`CoreError::Validation`]; a known type whose
    /// record is gone is a [`CoreError::NotFound`].
    pub async fn resolve(&self, reference: &EntityRef) -> CoreResult<serde_json::Value> {
        let fetcher = self.fetchers.get(&reference.entity_type).ok_or_else(|| {
            CoreError::Validation(format!(
                "No fetcher registered for entity type '{}'",
                reference.entity_type
            ))
        })?;
        fetcher
            .fetch(&reference.id)
            .await?
            .ok_or_else(|| CoreError::NotFound {
                entity: "entity",
                id: reference.key(),
            })
    }

    pub async fn resolve_target(&self, record: &Notification) -> CoreResult<serde_json::Value> {
        self.resolve(&record.target).await
    }

    pub async fn resolve_notifiable(
        &self,
        record: &Notification,
    ) -> CoreResult<serde_json::Value> {
        self.resolve(&record.notifiable).await
    }

    /// `Ok(None)` when the notification has no notifier.
    pub async fn resolve_notifier(
        &self,
        record: &Notification,
    ) -> CoreResult<Option<serde_json::Value>> {
        match &record.notifier {
            Some(notifier) => self.resolve(notifier).await.map(Some),
            None => Ok(None),
        }
    }
}

impl std::fmt::Debug for EntityRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut types: Vec<_> = self.fetchers.keys().collect();
        types.sort();
        f.debug_struct("EntityRegistry")
            .field("types", &types)
            .finish()
    }
}
