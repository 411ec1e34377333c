use std::time::Duration;

/// Maximum number of messages the store keeps before evicting the oldest.
pub const RETENTION_LIMIT: usize = 1024;

/// Maximum number of messages returned by a single backlog read. Sessions
/// issue repeated reads until they have caught up.
pub const BACKLOG_BATCH_SIZE: usize = 256;

/// Maximum length of a message body in bytes.
pub const MAX_TEXT_LEN: usize = 1024;

/// First reconnect delay of a reliable subscriber.
pub const DEFAULT_BACKOFF_INITIAL: Duration = Duration::from_millis(50);

/// Upper bound of the reconnect delay of a reliable subscriber.
pub const DEFAULT_BACKOFF_MAX: Duration = Duration::from_secs(5);
