//! Which ticket opens an episode.
//!
//! Precedence, most specific first:
//!
//! 1. episode-scoped
//! 2. product-scoped
//! 3. universal
//!
//! Within a scope rentals go before own tickets, then the earliest expiry
//! wins (unlimited last), then the oldest row.

use crate::types::{DirectPromotionId, EpisodeId, OwnType, ProductId, Ticket, TicketType};
use chrono::{DateTime, Utc};

/// Unused, unexpired, and (for promotion-gated tickets) backed by a running
/// promotion according to `promotion_live`.
pub fn is_usable<F>(ticket: &Ticket, now: DateTime<Utc>, promotion_live: F) -> bool
where
    F: Fn(DirectPromotionId) -> bool,
{
    !ticket.used && !ticket.is_expired(now) && ticket.source_promotion_id.is_none_or(promotion_live)
}

fn scope_rank(ticket: &Ticket) -> u8 {
    match (ticket.product_id, ticket.episode_id) {
        (_, Some(_)) => 0,
        (Some(_), None) => 1,
        (None, None) => 2,
    }
}

const fn own_rank(own_type: OwnType) -> u8 {
    match own_type {
        OwnType::Rental => 0,
        OwnType::Own => 1,
    }
}

/// Best ticket in `tickets` for `episode` of `product`, if any.
pub fn select_ticket<F>(
    tickets: &[Ticket],
    product: ProductId,
    episode: EpisodeId,
    now: DateTime<Utc>,
    promotion_live: F,
) -> Option<&Ticket>
where
    F: Fn(DirectPromotionId) -> bool,
{
    tickets
        .iter()
        .filter(|t| t.covers(product, episode) && is_usable(t, now, &promotion_live))
        .min_by_key(|t| {
            (
                scope_rank(t),
                own_rank(t.own_type),
                t.rental_expired_date.is_none(),
                t.rental_expired_date,
                t.id,
            )
        })
}

/// Open free tickets scoped to `product` (episode- or product-scoped).
pub fn count_free<F>(
    tickets: &[Ticket],
    product: ProductId,
    now: DateTime<Utc>,
    promotion_live: F,
) -> usize
where
    F: Fn(DirectPromotionId) -> bool,
{
    tickets
        .iter()
        .filter(|t| {
            t.product_id == Some(product)
                && t.ticket_type == TicketType::Free
                && is_usable(t, now, &promotion_live)
        })
        .count()
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::types::{AcquisitionType, ProfileId, TicketId, UserId};
    use chrono::{Duration, TimeZone};
    use proptest::prelude::*;

    const PRODUCT: ProductId = ProductId(1);
    const EPISODE: EpisodeId = EpisodeId(11);

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 6, 1, 0, 0).unwrap()
    }

    fn ticket(id: i64, product: Option<i64>, episode: Option<i64>, own: OwnType) -> Ticket {
        Ticket {
            id: TicketId(id),
            user_id: UserId(1),
            profile_id: ProfileId(1),
            product_id: product.map(ProductId),
            episode_id: episode.map(EpisodeId),
            own_type: own,
            ticket_type: TicketType::Free,
            acquisition_type: AcquisitionType::Gift,
            acquisition_id: None,
            source_promotion_id: None,
            rental_expired_date: None,
            used: false,
            use_date: None,
            created_date: now(),
        }
    }

    fn pick(tickets: &[Ticket]) -> Option<i64> {
        select_ticket(tickets, PRODUCT, EPISODE, now(), |_| true).map(|t| t.id.0)
    }

    #[test]
    fn episode_scope_beats_product_and_universal() {
        let tickets = vec![
            ticket(1, None, None, OwnType::Rental),
            ticket(2, Some(1), None, OwnType::Rental),
            ticket(3, Some(1), Some(11), OwnType::Own),
        ];
        assert_eq!(pick(&tickets), Some(3));
        assert_eq!(pick(&tickets[..2]), Some(2));
        assert_eq!(pick(&tickets[..1]), Some(1));
    }

    #[test]
    fn rental_burns_before_own_and_earliest_expiry_first() {
        let mut late = ticket(1, Some(1), None, OwnType::Rental);
        late.rental_expired_date = Some(now() + Duration::days(3));
        let mut early = ticket(2, Some(1), None, OwnType::Rental);
        early.rental_expired_date = Some(now() + Duration::hours(2));
        let own = ticket(3, Some(1), None, OwnType::Own);
        let unlimited = ticket(4, Some(1), None, OwnType::Rental);

        assert_eq!(pick(&[own.clone(), late.clone(), unlimited.clone()]), Some(1));
        assert_eq!(pick(&[own.clone(), late, early, unlimited]), Some(2));
        assert_eq!(pick(&[own]), Some(3));
    }

    #[test]
    fn expired_used_and_foreign_tickets_are_skipped() {
        let mut expired = ticket(1, Some(1), Some(11), OwnType::Rental);
        expired.rental_expired_date = Some(now() - Duration::seconds(1));
        let mut used = ticket(2, Some(1), Some(11), OwnType::Rental);
        used.used = true;
        let other_episode = ticket(3, Some(1), Some(12), OwnType::Rental);
        let other_product = ticket(4, Some(2), None, OwnType::Rental);
        assert_eq!(pick(&[expired, used, other_episode, other_product]), None);
    }

    #[test]
    fn expiry_exactly_now_is_still_usable() {
        let mut edge = ticket(1, Some(1), None, OwnType::Rental);
        edge.rental_expired_date = Some(now());
        assert_eq!(pick(&[edge]), Some(1));
    }

    #[test]
    fn tickets_from_stopped_promotion_are_not_usable() {
        let mut gated = ticket(1, Some(1), None, OwnType::Rental);
        gated.source_promotion_id = Some(DirectPromotionId(7));
        let tickets = [gated];
        assert!(select_ticket(&tickets, PRODUCT, EPISODE, now(), |_| false).is_none());
        assert!(select_ticket(&tickets, PRODUCT, EPISODE, now(), |id| id.0 == 7).is_some());
        assert_eq!(count_free(&tickets, PRODUCT, now(), |_| false), 0);
        assert_eq!(count_free(&tickets, PRODUCT, now(), |_| true), 1);
    }

    fn arb_ticket() -> impl Strategy<Value = Ticket> {
        (
            1i64..50,
            prop::option::of(1i64..3),
            prop::option::of(10i64..13),
            any::<bool>(),
            prop::option::of(-48i64..48),
            any::<bool>(),
        )
            .prop_map(|(id, product, episode, own, expiry, used)| {
                let mut t = ticket(
                    id,
                    product,
                    episode,
                    if own { OwnType::Own } else { OwnType::Rental },
                );
                t.rental_expired_date = expiry.map(|h| now() + Duration::hours(h));
                t.used = used;
                t
            })
    }

    proptest! {
        #[test]
        fn selection_is_usable_and_no_better_candidate_exists(
            tickets in prop::collection::vec(arb_ticket(), 0..12)
        ) {
            let chosen = select_ticket(&tickets, PRODUCT, EPISODE, now(), |_| true);
            let usable: Vec<&Ticket> = tickets
                .iter()
                .filter(|t| t.covers(PRODUCT, EPISODE) && is_usable(t, now(), |_| true))
                .collect();
            match chosen {
                None => prop_assert!(usable.is_empty()),
                Some(best) => {
                    prop_assert!(!best.used);
                    prop_assert!(!best.is_expired(now()));
                    for other in usable {
                        prop_assert!(scope_rank(best) <= scope_rank(other));
                    }
                }
            }
        }
    }
}
