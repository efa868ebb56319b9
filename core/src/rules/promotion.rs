//! Promotion state machines, weekly slots and reapplication cool-downs.

use crate::ErrorCode;
use crate::calendar::WeekCalendar;
use crate::types::{
    AppliedPromotion, AppliedPromotionStatus, AppliedPromotionType, DirectPromotionStatus,
};
use chrono::{DateTime, Duration, NaiveDate, Utc};

/// System-wide cap on applied promotions turned `ing` per ISO week.
pub const APPLIED_PROMOTION_WEEKLY_CAP: i64 = 20;

/// Cool-down after a denied waiting-for-free application.
pub const WAITING_FOR_FREE_COOLDOWN_DAYS: i64 = 180;

/// Upper bound on `num_of_ticket_per_person`.
pub const MAX_TICKETS_PER_PERSON: i32 = 100;

/// Author commands on a direct promotion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectAction {
    /// pending/stop → ing
    Start,
    /// ing → stop
    Stop,
    /// ing/stop → end
    End,
}

/// Next direct-promotion status, or the rejection.
///
/// # Errors
///
/// [`ErrorCode::InvalidPromotionTransition`] when the edge does not exist.
pub const fn direct_transition(
    status: DirectPromotionStatus,
    action: DirectAction,
) -> Result<DirectPromotionStatus, ErrorCode> {
    use DirectPromotionStatus as S;
    match (status, action) {
        (S::Pending | S::Stop, DirectAction::Start) => Ok(S::Ing),
        (S::Ing, DirectAction::Stop) => Ok(S::Stop),
        (S::Ing | S::Stop, DirectAction::End) => Ok(S::End),
        _ => Err(ErrorCode::InvalidPromotionTransition),
    }
}

/// Commands on an applied promotion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppliedAction {
    /// Operator: apply → ing
    Approve,
    /// Operator: apply → deny
    Deny,
    /// Operator: ing → end
    End,
    /// Author: apply/ing → cancel
    Cancel,
}

/// Next applied-promotion status, or the rejection.
///
/// # Errors
///
/// [`ErrorCode::InvalidPromotionTransition`] when the edge does not exist.
pub const fn applied_transition(
    status: AppliedPromotionStatus,
    action: AppliedAction,
) -> Result<AppliedPromotionStatus, ErrorCode> {
    use AppliedPromotionStatus as S;
    match (status, action) {
        (S::Apply, AppliedAction::Approve) => Ok(S::Ing),
        (S::Apply, AppliedAction::Deny) => Ok(S::Deny),
        (S::Ing, AppliedAction::End) => Ok(S::End),
        (S::Apply | S::Ing, AppliedAction::Cancel) => Ok(S::Cancel),
        _ => Err(ErrorCode::InvalidPromotionTransition),
    }
}

/// Slots left this week given the number of `ing` rows created in it.
#[must_use]
pub fn remaining_slots(ing_this_week: i64) -> i64 {
    (APPLIED_PROMOTION_WEEKLY_CAP - ing_this_week).max(0)
}

/// Most recent deny date among `rows` of `kind`.
#[must_use]
pub fn latest_deny(
    rows: &[AppliedPromotion],
    kind: AppliedPromotionType,
) -> Option<DateTime<Utc>> {
    rows.iter()
        .filter(|r| r.kind == kind && r.status == AppliedPromotionStatus::Deny)
        .map(|r| r.updated_date)
        .max()
}

/// First local date on which a denied application may be resubmitted.
#[must_use]
pub fn reapply_date(
    kind: AppliedPromotionType,
    denied_at: DateTime<Utc>,
    calendar: &WeekCalendar,
) -> NaiveDate {
    match kind {
        AppliedPromotionType::SixNinePath => calendar.next_week_monday(denied_at),
        AppliedPromotionType::WaitingForFree => {
            calendar.local_date(denied_at + Duration::days(WAITING_FOR_FREE_COOLDOWN_DAYS))
        }
    }
}

/// Whether a deny at `denied_at` still blocks reapplication at `now`.
#[must_use]
pub fn in_cooldown(
    kind: AppliedPromotionType,
    denied_at: DateTime<Utc>,
    now: DateTime<Utc>,
    calendar: &WeekCalendar,
) -> bool {
    match kind {
        AppliedPromotionType::SixNinePath => calendar.same_week(denied_at, now),
        AppliedPromotionType::WaitingForFree => {
            now < denied_at + Duration::days(WAITING_FOR_FREE_COOLDOWN_DAYS)
        }
    }
}

/// Duplicate and cool-down guard for a new application of `kind`.
///
/// `rows` are the product's existing applied promotions.
///
/// # Errors
///
/// * [`ErrorCode::AlreadyAppliedPromotion`] when one is waiting for review
/// * [`ErrorCode::AppliedPromotionInProgress`] when one is running
/// * [`ErrorCode::AppliedPromotionCooldown`] inside the post-deny cool-down
pub fn check_application(
    rows: &[AppliedPromotion],
    kind: AppliedPromotionType,
    now: DateTime<Utc>,
    calendar: &WeekCalendar,
) -> Result<(), ErrorCode> {
    let same_kind = || rows.iter().filter(move |r| r.kind == kind);
    if same_kind().any(|r| r.status == AppliedPromotionStatus::Apply) {
        return Err(ErrorCode::AlreadyAppliedPromotion);
    }
    if same_kind().any(|r| r.status == AppliedPromotionStatus::Ing) {
        return Err(ErrorCode::AppliedPromotionInProgress);
    }
    if latest_deny(rows, kind).is_some_and(|denied| in_cooldown(kind, denied, now, calendar)) {
        return Err(ErrorCode::AppliedPromotionCooldown);
    }
    Ok(())
}

/// Validate the requested window and per-person ticket count.
///
/// # Errors
///
/// [`ErrorCode::InvalidPromotionRequest`] when the window is empty or the
/// count is out of range.
pub fn validate_application(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    tickets_per_person: i32,
) -> Result<(), ErrorCode> {
    if start >= end {
        return Err(ErrorCode::InvalidPromotionRequest);
    }
    validate_tickets_per_person(tickets_per_person)
}

/// Validate a per-person ticket count.
///
/// # Errors
///
/// [`ErrorCode::InvalidPromotionRequest`] outside `1..=MAX_TICKETS_PER_PERSON`.
pub const fn validate_tickets_per_person(count: i32) -> Result<(), ErrorCode> {
    if count < 1 || count > MAX_TICKETS_PER_PERSON {
        return Err(ErrorCode::InvalidPromotionRequest);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::types::{AppliedPromotionId, ProductId, UserId};
    use chrono::TimeZone;

    fn cal() -> WeekCalendar {
        WeekCalendar::default()
    }

    fn kst(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        // KST wall clock to UTC
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap() - Duration::hours(9)
    }

    fn row(
        kind: AppliedPromotionType,
        status: AppliedPromotionStatus,
        at: DateTime<Utc>,
    ) -> AppliedPromotion {
        AppliedPromotion {
            id: AppliedPromotionId(1),
            product_id: ProductId(1),
            author_id: UserId(1),
            kind,
            status,
            start_date: at,
            end_date: at + Duration::days(30),
            num_of_ticket_per_person: 1,
            created_date: at,
            updated_date: at,
        }
    }

    #[test]
    fn direct_state_machine() {
        use DirectPromotionStatus as S;
        assert_eq!(direct_transition(S::Pending, DirectAction::Start), Ok(S::Ing));
        assert_eq!(direct_transition(S::Ing, DirectAction::Stop), Ok(S::Stop));
        assert_eq!(direct_transition(S::Stop, DirectAction::Start), Ok(S::Ing));
        assert_eq!(direct_transition(S::Ing, DirectAction::End), Ok(S::End));
        assert!(direct_transition(S::End, DirectAction::Start).is_err());
        assert!(direct_transition(S::Ing, DirectAction::Start).is_err());
        assert!(direct_transition(S::Pending, DirectAction::Stop).is_err());
    }

    #[test]
    fn applied_state_machine() {
        use AppliedPromotionStatus as S;
        assert_eq!(applied_transition(S::Apply, AppliedAction::Approve), Ok(S::Ing));
        assert_eq!(applied_transition(S::Apply, AppliedAction::Deny), Ok(S::Deny));
        assert_eq!(applied_transition(S::Ing, AppliedAction::End), Ok(S::End));
        assert_eq!(applied_transition(S::Ing, AppliedAction::Cancel), Ok(S::Cancel));
        assert!(applied_transition(S::Deny, AppliedAction::Approve).is_err());
        assert!(applied_transition(S::End, AppliedAction::Cancel).is_err());
    }

    #[test]
    fn slots_never_go_negative() {
        assert_eq!(remaining_slots(0), 20);
        assert_eq!(remaining_slots(19), 1);
        assert_eq!(remaining_slots(25), 0);
    }

    #[test]
    fn pending_or_running_application_blocks_duplicate() {
        let now = kst(2025, 1, 8, 12);
        let apply = row(AppliedPromotionType::WaitingForFree, AppliedPromotionStatus::Apply, now);
        let ing = row(AppliedPromotionType::WaitingForFree, AppliedPromotionStatus::Ing, now);
        assert_eq!(
            check_application(&[apply.clone()], AppliedPromotionType::WaitingForFree, now, &cal()),
            Err(ErrorCode::AlreadyAppliedPromotion)
        );
        assert_eq!(
            check_application(&[ing], AppliedPromotionType::WaitingForFree, now, &cal()),
            Err(ErrorCode::AppliedPromotionInProgress)
        );
        // other kind does not interfere
        assert_eq!(
            check_application(&[apply], AppliedPromotionType::SixNinePath, now, &cal()),
            Ok(())
        );
    }

    #[test]
    fn six_nine_deny_blocks_until_next_monday() {
        let denied = kst(2025, 1, 7, 10); // Tuesday
        let rows = [row(AppliedPromotionType::SixNinePath, AppliedPromotionStatus::Deny, denied)];
        let sunday_night = kst(2025, 1, 12, 23);
        let monday = kst(2025, 1, 13, 0);
        assert_eq!(
            check_application(&rows, AppliedPromotionType::SixNinePath, sunday_night, &cal()),
            Err(ErrorCode::AppliedPromotionCooldown)
        );
        assert_eq!(
            check_application(&rows, AppliedPromotionType::SixNinePath, monday, &cal()),
            Ok(())
        );
        assert_eq!(
            reapply_date(AppliedPromotionType::SixNinePath, denied, &cal()),
            NaiveDate::from_ymd_opt(2025, 1, 13).unwrap()
        );
    }

    #[test]
    fn waiting_for_free_deny_blocks_for_180_days() {
        let denied = kst(2025, 1, 7, 10);
        let rows = [row(
            AppliedPromotionType::WaitingForFree,
            AppliedPromotionStatus::Deny,
            denied,
        )];
        let kind = AppliedPromotionType::WaitingForFree;
        assert!(check_application(&rows, kind, denied + Duration::days(179), &cal()).is_err());
        assert!(check_application(&rows, kind, denied + Duration::days(180), &cal()).is_ok());
    }

    #[test]
    fn application_window_and_count_are_validated() {
        let now = kst(2025, 1, 7, 10);
        assert!(validate_application(now, now + Duration::days(1), 1).is_ok());
        assert!(validate_application(now, now, 1).is_err());
        assert!(validate_application(now, now + Duration::days(1), 0).is_err());
        assert!(validate_application(now, now + Duration::days(1), 101).is_err());
    }
}
