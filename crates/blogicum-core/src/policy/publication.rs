//! Publish-on-save.
//!
//! Decides `is_published` from the submitted publication date each time a
//! post is created or edited. Nothing promotes a scheduled post later on:
//! it stays unpublished until it is saved again after its date.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// How a saved post ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Publication {
    /// Public from now on.
    Published,
    /// Waiting for its date; stored with `is_published = false`.
    Scheduled,
    /// No date was given and the author did not ask to publish.
    Draft,
}

impl Publication {
    pub fn is_published(self) -> bool {
        matches!(self, Publication::Published)
    }
}

/// Resolve the stored publication date and state of a post being saved.
pub fn publish_on_save(
    pub_date: Option<DateTime<Utc>>,
    marked_published: bool,
    now: DateTime<Utc>,
) -> (DateTime<Utc>, Publication) {
    match pub_date {
        None if marked_published => (now, Publication::Published),
        None => (now, Publication::Draft),
        Some(date) if date <= now => (date, Publication::Published),
        Some(date) => (date, Publication::Scheduled),
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeDelta;

    use super::*;

    #[test]
    fn past_date_publishes_even_when_unmarked() {
        let now = Utc::now();
        let yesterday = now - TimeDelta::days(1);

        let (date, publication) = publish_on_save(Some(yesterday), false, now);

        assert_eq!(date, yesterday);
        assert_eq!(publication, Publication::Published);
        assert!(publication.is_published());
    }

    #[test]
    fn future_date_schedules_regardless_of_flag() {
        let now = Utc::now();
        let tomorrow = now + TimeDelta::days(1);

        for marked in [true, false] {
            let (date, publication) = publish_on_save(Some(tomorrow), marked, now);
            assert_eq!(date, tomorrow);
            assert_eq!(publication, Publication::Scheduled);
            assert!(!publication.is_published());
        }
    }

    #[test]
    fn date_equal_to_now_publishes() {
        let now = Utc::now();
        assert_eq!(
            publish_on_save(Some(now), false, now).1,
            Publication::Published
        );
    }

    #[test]
    fn missing_date_defaults_to_now() {
        let now = Utc::now();

        assert_eq!(
            publish_on_save(None, true, now),
            (now, Publication::Published)
        );
        assert_eq!(publish_on_save(None, false, now), (now, Publication::Draft));
    }
}
