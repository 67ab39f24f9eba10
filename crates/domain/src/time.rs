//! Timestamps.
//!
//! All times are UTC. Entity timestamps never move backwards, even when
//! the wall clock is stepped back between two updates.

use chrono::{DateTime, Utc};

/// UTC timestamp carried by entities and events.
pub type Timestamp = DateTime<Utc>;

/// Current UTC time.
#[must_use]
pub fn now() -> Timestamp {
    Utc::now()
}

/// The current time, or `previous` if the clock reads earlier than it.
#[must_use]
pub fn now_after(previous: Timestamp) -> Timestamp {
    now().max(previous)
}

#[cfg(test)]
mod tests {
    use chrono::TimeDelta;

    use super::*;

    #[test]
    fn should_return_current_time_when_previous_is_older() {
        let previous = now() - TimeDelta::hours(1);
        let ts = now_after(previous);
        assert!(ts > previous);
    }

    #[test]
    fn should_not_go_before_previous() {
        let previous = now() + TimeDelta::hours(1);
        assert_eq!(now_after(previous), previous);
    }
}
