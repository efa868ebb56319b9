//! Productbook inventory: issuing, selecting and redeeming tickets.
//!
//! Tickets born from a free-for-first gift carry `source_promotion_id`; they
//! are only usable while that promotion is `ing`. Selection and counting
//! resolve those promotions first, then defer to
//! [`ticket_selection`](webnovel_core::rules::ticket_selection).

use super::ServiceContext;
use std::collections::HashSet;
use webnovel_core::PlatformResult;
use webnovel_core::rules::ticket_selection;
use webnovel_core::store::{GiftStore, PromotionStore, TicketStore};
use webnovel_core::types::{
    AcquisitionType, DirectPromotionId, DirectPromotionStatus, EpisodeId, GiftId,
    GiftTransactionType, NewGiftTransaction, NewTicket, OwnType, ProductId, Ticket, UserId,
};

/// Append one unused ticket.
///
/// # Errors
///
/// Storage failures.
pub async fn issue<S: TicketStore>(
    tx: &mut S,
    ctx: &ServiceContext,
    ticket: NewTicket,
) -> PlatformResult<Ticket> {
    Ok(tx.insert_ticket(ticket, ctx.now).await?)
}

/// Source promotions among `tickets` that are currently running.
async fn live_promotions<S: PromotionStore>(
    tx: &mut S,
    tickets: &[Ticket],
) -> PlatformResult<HashSet<DirectPromotionId>> {
    let sources: HashSet<DirectPromotionId> =
        tickets.iter().filter_map(|t| t.source_promotion_id).collect();
    let mut live = HashSet::with_capacity(sources.len());
    for id in sources {
        if tx
            .find_direct(id)
            .await?
            .is_some_and(|p| p.status == DirectPromotionStatus::Ing)
        {
            live.insert(id);
        }
    }
    Ok(live)
}

/// Best unused ticket that opens `episode`.
///
/// # Errors
///
/// Storage failures.
pub async fn find_usable<S: TicketStore + PromotionStore>(
    tx: &mut S,
    ctx: &ServiceContext,
    user: UserId,
    product: ProductId,
    episode: EpisodeId,
) -> PlatformResult<Option<Ticket>> {
    let candidates = tx.list_candidate_tickets(user, product).await?;
    let live = live_promotions(tx, &candidates).await?;
    Ok(
        ticket_selection::select_ticket(&candidates, product, episode, ctx.now, |id| {
            live.contains(&id)
        })
        .cloned(),
    )
}

/// Redeem `ticket` for `episode`.
///
/// Product-scoped and universal tickets become bound to the episode. A
/// ticket claimed from the gift box appends a `used` gift transaction.
///
/// # Errors
///
/// Storage failures.
pub async fn consume<S: TicketStore + GiftStore>(
    tx: &mut S,
    ctx: &ServiceContext,
    mut ticket: Ticket,
    episode: EpisodeId,
) -> PlatformResult<Ticket> {
    ticket.used = true;
    ticket.use_date = Some(ctx.now);
    ticket.episode_id = Some(episode);
    tx.update_ticket(&ticket).await?;

    if ticket.acquisition_type == AcquisitionType::Gift {
        if let Some(gift) = ticket.acquisition_id {
            tx.insert_gift_transaction(
                NewGiftTransaction {
                    kind: GiftTransactionType::Used,
                    user_id: ticket.user_id,
                    giftbook_id: GiftId(gift),
                    amount: 1,
                    reason: format!("episode {episode}"),
                },
                ctx.now,
            )
            .await?;
        }
    }
    tracing::debug!(ticket_id = %ticket.id, episode_id = %episode, "Ticket consumed");
    Ok(ticket)
}

/// Open free tickets for `product`.
///
/// # Errors
///
/// Storage failures.
pub async fn count_free<S: TicketStore + PromotionStore>(
    tx: &mut S,
    ctx: &ServiceContext,
    user: UserId,
    product: ProductId,
) -> PlatformResult<usize> {
    let candidates = tx.list_candidate_tickets(user, product).await?;
    let live = live_promotions(tx, &candidates).await?;
    Ok(ticket_selection::count_free(
        &candidates,
        product,
        ctx.now,
        |id| live.contains(&id),
    ))
}

/// Whether the user holds a permanent ticket for `episode`.
///
/// # Errors
///
/// Storage failures.
pub async fn owns_episode<S: TicketStore>(
    tx: &mut S,
    user: UserId,
    episode: EpisodeId,
) -> PlatformResult<bool> {
    Ok(tx
        .list_episode_tickets(user, episode)
        .await?
        .iter()
        .any(|t| t.own_type == OwnType::Own))
}

/// Whether a redeemed rental still grants access to `episode`.
///
/// # Errors
///
/// Storage failures.
pub async fn has_open_rental<S: TicketStore + PromotionStore>(
    tx: &mut S,
    ctx: &ServiceContext,
    user: UserId,
    episode: EpisodeId,
) -> PlatformResult<bool> {
    let rentals: Vec<Ticket> = tx
        .list_episode_tickets(user, episode)
        .await?
        .into_iter()
        .filter(|t| t.own_type == OwnType::Rental && t.used && !t.is_expired(ctx.now))
        .collect();
    let live = live_promotions(tx, &rentals).await?;
    Ok(rentals
        .iter()
        .any(|t| t.source_promotion_id.is_none_or(|id| live.contains(&id))))
}

/// Every ticket of a user, newest first.
///
/// # Errors
///
/// Storage failures.
pub async fn list<S: TicketStore>(tx: &mut S, user: UserId) -> PlatformResult<Vec<Ticket>> {
    Ok(tx.list_tickets(user).await?)
}

/// Unused, unexpired tickets of a user.
///
/// # Errors
///
/// Storage failures.
pub async fn count_unused<S: TicketStore + PromotionStore>(
    tx: &mut S,
    ctx: &ServiceContext,
    user: UserId,
) -> PlatformResult<usize> {
    let tickets = tx.list_tickets(user).await?;
    let live = live_promotions(tx, &tickets).await?;
    Ok(tickets
        .iter()
        .filter(|t| ticket_selection::is_usable(t, ctx.now, |id| live.contains(&id)))
        .count())
}
