//! Herald notification core.
//!
//! Groups notifications under owners and aggregates their read state on top
//! of a pluggable [`NotificationStore`]:
//!
//! - [`group`]: owner/member classification and lookups.
//! - [`counter::ReadStateCounter`]: opened/unopened member and notifier counts.
//! - [`guard`]: delete restriction for owners with live members.
//! - [`placement::GroupPlacement`]: write path that assigns new notifications to groups.
//! - [`open`]: marking notifications read.
//! - [`registry::EntityRegistry`]: resolves polymorphic entity references.
//! - [`digest::GroupDigest`]: per-group summary for digests.
//!
//! The database-backed store lives in `herald-db`.

pub mod config;
pub mod counter;
pub mod digest;
pub mod error;
pub mod group;
pub mod guard;
pub mod notification;
pub mod open;
pub mod placement;
pub mod query;
pub mod registry;
pub mod store;
pub mod types;

pub use config::NotificationConfig;
pub use counter::ReadStateCounter;
pub use error::{CoreError, CoreResult};
pub use notification::{EntityRef, GroupRole, NewNotification, Notification};
pub use query::{FeedQuery, MemberQuery, SortOrder};
pub use store::{InMemoryNotificationStore, NotificationStore, OpenScope};
