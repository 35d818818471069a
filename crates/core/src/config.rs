//! Notification behaviour settings.

use chrono::Duration;

use crate::error::{CoreError, CoreResult};

/// Default cap on how many opened members are fetched when counting.
pub const DEFAULT_OPENED_INDEX_LIMIT: usize = 10;

/// Settings consumed by the counter and placement logic.
///
/// Passed explicitly to every component that needs it; there is no global
/// instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationConfig {
    /// Upper bound on opened records fetched per opened-count query
    /// (default: `10`). `0` disables opened counting entirely.
    pub opened_index_limit: usize,
    /// How long an unopened owner keeps accepting new members. `None` means
    /// an unopened owner groups new notifications regardless of age.
    pub group_expiry_delay: Option<Duration>,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            opened_index_limit: DEFAULT_OPENED_INDEX_LIMIT,
            group_expiry_delay: None,
        }
    }
}

impl NotificationConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                     | Default |
    /// |-----------------------------|---------|
    /// | `HERALD_OPENED_INDEX_LIMIT` | `10`    |
    /// | `HERALD_GROUP_EXPIRY_SECS`  | unset   |
    pub fn from_env() -> CoreResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build a config from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> CoreResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let opened_index_limit = match lookup("HERALD_OPENED_INDEX_LIMIT") {
            Some(raw) => raw.trim().parse::<usize>().map_err(|_| {
                CoreError::Validation(format!(
                    "HERALD_OPENED_INDEX_LIMIT must be a non-negative integer, got '{raw}'"
                ))
            })?,
            None => DEFAULT_OPENED_INDEX_LIMIT,
        };

        let group_expiry_delay = match lookup("HERALD_GROUP_EXPIRY_SECS") {
            Some(raw) => {
                let secs = raw.trim().parse::<u32>().map_err(|_| {
                    CoreError::Validation(format!(
                        "HERALD_GROUP_EXPIRY_SECS must be a non-negative integer, got '{raw}'"
                    ))
                })?;
                Some(Duration::seconds(i64::from(secs)))
            }
            None => None,
        };

        Ok(Self {
            opened_index_limit,
            group_expiry_delay,
        })
    }

    /// Override the opened index limit.
    pub fn with_opened_index_limit(mut self, limit: usize) -> Self {
        self.opened_index_limit = limit;
        self
    }

    /// Override the group expiry window.
    pub fn with_group_expiry_delay(mut self, delay: Duration) -> Self {
        self.group_expiry_delay = Some(delay);
        self
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use assert_matches::assert_matches;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let config = NotificationConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, NotificationConfig::default());
        assert_eq!(config.opened_index_limit, 10);
        assert!(config.group_expiry_delay.is_none());
    }

    #[test]
    fn reads_overrides() {
        let config = NotificationConfig::from_lookup(lookup(&[
            ("HERALD_OPENED_INDEX_LIMIT", "25"),
            ("HERALD_GROUP_EXPIRY_SECS", " 3600 "),
        ]))
        .unwrap();
        assert_eq!(config.opened_index_limit, 25);
        assert_eq!(config.group_expiry_delay, Some(Duration::hours(1)));
    }

    #[test]
    fn rejects_garbage_limit() {
        let result =
            NotificationConfig::from_lookup(lookup(&[("HERALD_OPENED_INDEX_LIMIT", "-1")]));
        assert_matches!(result, Err(CoreError::Validation(msg)) if msg.contains("-1"));
    }

    #[test]
    fn rejects_garbage_expiry() {
        let result =
            NotificationConfig::from_lookup(lookup(&[("HERALD_GROUP_EXPIRY_SECS", "soon")]));
        assert_matches!(result, Err(CoreError::Validation(_)));
    }
}
