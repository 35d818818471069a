/// Store-assigned notification ids. Monotonic, so they also record insertion order.
pub type DbId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
