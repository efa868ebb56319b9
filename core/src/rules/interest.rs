//! Three-day reader-interest window.

use crate::types::InterestStatus;
use chrono::{DateTime, Duration, Utc};

/// Length of the interest window.
pub const INTEREST_WINDOW_HOURS: i64 = 72;

/// Remaining time below which interest is about to drop.
pub const DROP_SOON_HOURS: i64 = 24;

/// End of the window anchored at the latest usage.
#[must_use]
pub fn interest_end_date(last_read: DateTime<Utc>) -> DateTime<Utc> {
    last_read + Duration::hours(INTEREST_WINDOW_HOURS)
}

/// Classify the relation given the latest usage `updated_date`.
#[must_use]
pub fn interest_status(last_read: Option<DateTime<Utc>>, now: DateTime<Utc>) -> InterestStatus {
    let Some(last_read) = last_read else {
        return InterestStatus::None;
    };
    let end = interest_end_date(last_read);
    if end < now {
        InterestStatus::Loss
    } else if end - now < Duration::hours(DROP_SOON_HOURS) {
        InterestStatus::DropSoon
    } else {
        InterestStatus::Active
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 5, 10, 12, 0, 0).unwrap()
    }

    #[test]
    fn never_read_is_none() {
        assert_eq!(interest_status(None, now()), InterestStatus::None);
    }

    #[test]
    fn three_and_a_half_days_ago_is_lost() {
        let last = now() - Duration::hours(84);
        assert_eq!(interest_status(Some(last), now()), InterestStatus::Loss);
    }

    #[test]
    fn window_boundary_is_inclusive() {
        let last = now() - Duration::hours(72);
        assert_eq!(interest_status(Some(last), now()), InterestStatus::DropSoon);
    }

    #[test]
    fn last_day_of_window_is_drop_soon() {
        let last = now() - Duration::hours(50);
        assert_eq!(interest_status(Some(last), now()), InterestStatus::DropSoon);
        let fresh = now() - Duration::hours(47);
        assert_eq!(interest_status(Some(fresh), now()), InterestStatus::Active);
    }

    #[test]
    fn just_revived_is_active() {
        assert_eq!(interest_status(Some(now()), now()), InterestStatus::Active);
        assert_eq!(interest_end_date(now()), now() + Duration::days(3));
    }
}
