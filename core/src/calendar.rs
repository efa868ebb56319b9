//! ISO-week calendar in the platform's local time zone.
//!
//! Weekly windows (applied-promotion slots, reader-of-prev deduplication, the
//! 6-9-path reapply cool-down) follow `YEARWEEK(t, 1)` semantics: weeks start
//! on Monday 00:00 local time and belong to the ISO year of their Thursday.
//!
//! Timestamps are stored in UTC; the calendar converts with a fixed offset.

use chrono::{
    DateTime, Datelike, Duration, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Offset,
    TimeZone, Utc, Weekday,
};

/// Default platform offset (UTC+9).
pub const DEFAULT_OFFSET_SECONDS: i32 = 9 * 3600;

/// ISO-week arithmetic anchored to a fixed UTC offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeekCalendar {
    offset: FixedOffset,
}

impl Default for WeekCalendar {
    fn default() -> Self {
        Self::from_offset_seconds(DEFAULT_OFFSET_SECONDS).unwrap_or_else(Self::utc)
    }
}

impl WeekCalendar {
    /// Create a calendar for the given offset.
    #[must_use]
    pub const fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }

    /// Calendar in UTC.
    #[must_use]
    pub fn utc() -> Self {
        Self::new(Utc.fix())
    }

    /// Calendar east of UTC by `seconds`; `None` when out of range.
    #[must_use]
    pub fn from_offset_seconds(seconds: i32) -> Option<Self> {
        FixedOffset::east_opt(seconds).map(Self::new)
    }

    /// The configured offset.
    #[must_use]
    pub const fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// Local calendar date of an instant.
    #[must_use]
    pub fn local_date(&self, at: DateTime<Utc>) -> NaiveDate {
        at.with_timezone(&self.offset).date_naive()
    }

    /// Local wall-clock time of an instant.
    #[must_use]
    pub fn local_time(&self, at: DateTime<Utc>) -> NaiveTime {
        at.with_timezone(&self.offset).time()
    }

    /// `(iso_year, iso_week)` of an instant, i.e. `YEARWEEK(at, 1)`.
    #[must_use]
    pub fn year_week(&self, at: DateTime<Utc>) -> (i32, u32) {
        let week = self.local_date(at).iso_week();
        (week.year(), week.week())
    }

    /// Whether two instants fall into the same ISO week.
    #[must_use]
    pub fn same_week(&self, a: DateTime<Utc>, b: DateTime<Utc>) -> bool {
        self.year_week(a) == self.year_week(b)
    }

    /// Monday 00:00 local of the week containing `at`, as UTC.
    #[must_use]
    pub fn week_start(&self, at: DateTime<Utc>) -> DateTime<Utc> {
        let date = self.local_date(at);
        let monday = date - Duration::days(i64::from(date.weekday().num_days_from_monday()));
        self.start_of_day(monday)
    }

    /// Exclusive end of the week containing `at` (next Monday 00:00 local).
    #[must_use]
    pub fn week_end(&self, at: DateTime<Utc>) -> DateTime<Utc> {
        self.week_start(at) + Duration::days(7)
    }

    /// `date` itself when it is a Monday, otherwise the following Monday.
    #[must_use]
    pub fn upcoming_monday(date: NaiveDate) -> NaiveDate {
        if date.weekday() == Weekday::Mon {
            return date;
        }
        let ahead = 7 - i64::from(date.weekday().num_days_from_monday());
        date + Duration::days(ahead)
    }

    /// The Monday starting the ISO week after the one containing `at`.
    #[must_use]
    pub fn next_week_monday(&self, at: DateTime<Utc>) -> NaiveDate {
        Self::upcoming_monday(self.local_date(at) + Duration::days(1))
    }

    /// Local midnight of `date`, as UTC.
    #[must_use]
    pub fn start_of_day(&self, date: NaiveDate) -> DateTime<Utc> {
        self.to_utc(date.and_time(NaiveTime::MIN))
    }

    /// Interpret a local wall-clock datetime as an instant.
    #[must_use]
    pub fn to_utc(&self, local: NaiveDateTime) -> DateTime<Utc> {
        let shifted = local - Duration::seconds(i64::from(self.offset.local_minus_utc()));
        Utc.from_utc_datetime(&shifted)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use proptest::prelude::*;

    fn kst() -> WeekCalendar {
        WeekCalendar::default()
    }

    fn at(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    #[test]
    fn iso_year_of_first_days_follows_thursday_rule() {
        // 2024-12-30 is the Monday of 2025-W01.
        let cal = WeekCalendar::utc();
        assert_eq!(cal.year_week(at("2024-12-30T10:00:00Z")), (2025, 1));
        assert_eq!(cal.year_week(at("2024-12-29T10:00:00Z")), (2024, 52));
    }

    #[test]
    fn week_boundary_is_local_monday_midnight() {
        let cal = kst();
        // Sunday 23:59 KST and Monday 00:00 KST.
        let sunday_late = at("2025-01-05T14:59:00Z");
        let monday_start = at("2025-01-05T15:00:00Z");
        assert!(!cal.same_week(sunday_late, monday_start));
        assert_eq!(cal.week_start(monday_start), monday_start);
        assert_eq!(cal.week_start(at("2025-01-08T03:00:00Z")), monday_start);
        assert_eq!(cal.week_end(monday_start), at("2025-01-12T15:00:00Z"));
    }

    #[test]
    fn upcoming_monday_keeps_monday() {
        let monday = NaiveDate::from_ymd_opt(2025, 1, 6).unwrap();
        let wednesday = NaiveDate::from_ymd_opt(2025, 1, 8).unwrap();
        let sunday = NaiveDate::from_ymd_opt(2025, 1, 12).unwrap();
        assert_eq!(WeekCalendar::upcoming_monday(monday), monday);
        assert_eq!(
            WeekCalendar::upcoming_monday(wednesday),
            NaiveDate::from_ymd_opt(2025, 1, 13).unwrap()
        );
        assert_eq!(
            WeekCalendar::upcoming_monday(sunday),
            NaiveDate::from_ymd_opt(2025, 1, 13).unwrap()
        );
    }

    #[test]
    fn next_week_monday_from_monday_skips_a_week() {
        let cal = kst();
        let monday_noon = at("2025-01-06T03:00:00Z");
        assert_eq!(
            cal.next_week_monday(monday_noon),
            NaiveDate::from_ymd_opt(2025, 1, 13).unwrap()
        );
    }

    proptest! {
        #[test]
        fn week_start_is_a_monday_in_the_same_week(secs in 1_600_000_000i64..1_900_000_000i64) {
            let cal = kst();
            let t = Utc.timestamp_opt(secs, 0).unwrap();
            let start = cal.week_start(t);
            prop_assert!(start <= t);
            prop_assert!(t < cal.week_end(t));
            prop_assert_eq!(cal.local_date(start).weekday(), Weekday::Mon);
            prop_assert!(cal.same_week(start, t));
        }
    }
}
