//! Gift-box lifetime and post-claim ticket lifetime.

use crate::types::{GiftItem, PromotionType, TicketExpiration, TicketExpirationType};
use chrono::{DateTime, Duration, Utc};

/// Box lifetime when a gift has no explicit expiration date.
pub const GIFT_BOX_LIFETIME_DAYS: i64 = 7;

/// When the box stops accepting a claim; `None` for gifts that never lapse.
#[must_use]
pub fn box_expires_at(gift: &GiftItem) -> Option<DateTime<Utc>> {
    if gift.promotion_type == Some(PromotionType::WaitingForFree) {
        return None;
    }
    Some(
        gift.expiration_date
            .unwrap_or_else(|| gift.created_date + Duration::days(GIFT_BOX_LIFETIME_DAYS)),
    )
}

/// Whether the box lifetime has elapsed.
#[must_use]
pub fn is_box_expired(gift: &GiftItem, now: DateTime<Utc>) -> bool {
    box_expires_at(gift).is_some_and(|at| at < now)
}

/// Rental expiry of a ticket claimed at `received_at`.
#[must_use]
pub fn ticket_expires_at(
    policy: TicketExpiration,
    received_at: DateTime<Utc>,
) -> Option<DateTime<Utc>> {
    let value = i64::from(policy.value);
    match policy.kind {
        TicketExpirationType::None => None,
        TicketExpirationType::Days | TicketExpirationType::OnReceiveDays => {
            Some(received_at + Duration::days(value))
        }
        TicketExpirationType::Hours => Some(received_at + Duration::hours(value)),
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::types::{AcquisitionType, GiftId, OwnType, TicketType, UserId};
    use chrono::TimeZone;

    fn created() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 3, 0, 0, 0).unwrap()
    }

    fn gift(promotion: Option<PromotionType>, expiration: Option<DateTime<Utc>>) -> GiftItem {
        GiftItem {
            id: GiftId(1),
            user_id: UserId(1),
            product_id: None,
            episode_id: None,
            amount: None,
            ticket_type: TicketType::Free,
            own_type: OwnType::Rental,
            promotion_type: promotion,
            acquisition_type: AcquisitionType::Promotion,
            acquisition_id: None,
            expiration_date: expiration,
            ticket_expiration: TicketExpiration::NONE,
            received: false,
            received_date: None,
            created_date: created(),
        }
    }

    #[test]
    fn default_box_lifetime_is_seven_days_from_creation() {
        let g = gift(None, None);
        assert!(!is_box_expired(&g, created() + Duration::days(7)));
        assert!(is_box_expired(&g, created() + Duration::days(7) + Duration::seconds(1)));
    }

    #[test]
    fn explicit_expiration_wins() {
        let g = gift(Some(PromotionType::SixNinePath), Some(created() + Duration::hours(3)));
        assert!(is_box_expired(&g, created() + Duration::hours(4)));
    }

    #[test]
    fn waiting_for_free_never_lapses_in_the_box() {
        let g = gift(
            Some(PromotionType::WaitingForFree),
            Some(created() + Duration::hours(1)),
        );
        assert_eq!(box_expires_at(&g), None);
        assert!(!is_box_expired(&g, created() + Duration::days(365)));
    }

    #[test]
    fn ticket_lifetime_policies() {
        let at = created();
        assert_eq!(ticket_expires_at(TicketExpiration::NONE, at), None);
        assert_eq!(
            ticket_expires_at(TicketExpiration::days(7), at),
            Some(at + Duration::days(7))
        );
        assert_eq!(
            ticket_expires_at(TicketExpiration::hours(72), at),
            Some(at + Duration::hours(72))
        );
        assert_eq!(
            ticket_expires_at(TicketExpiration::on_receive_days(1), at),
            Some(at + Duration::days(1))
        );
    }
}
