use chrono::{DateTime, Utc};

/// Source of the current time.
///
/// Visibility and publish-on-save never read the system clock directly.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}
