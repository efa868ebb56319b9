//! Gift box: pending gifts and their claim into the productbook.
//!
//! A gift's box lifetime and its tickets' lifetime are separate clocks. The
//! ticket clock only starts when the user receives the gift.

use super::{ServiceContext, account};
use serde::Serialize;
use webnovel_core::rules::gift_expiry;
use webnovel_core::store::{AccountStore, GiftStore, PromotionStore, TicketStore};
use webnovel_core::types::{
    AcquisitionType, DirectPromotionId, DirectPromotionStatus, GiftId, GiftItem,
    GiftTransaction, GiftTransactionType, NewGift, NewGiftTransaction, NewTicket, PromotionType,
    Ticket, UserId,
};
use webnovel_core::{DateTime, ErrorCode, PlatformResult, Utc};
use webnovel_runtime::metrics::GiftMetrics;

/// Result of a claim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GiftReceipt {
    /// Claimed gift
    pub gift_id: GiftId,
    /// Tickets moved into the productbook
    pub tickets: Vec<Ticket>,
    /// Expiry stamped on those tickets
    pub ticket_expired_date: Option<DateTime<Utc>>,
}

/// Store a pending gift. No `received` transaction is written.
///
/// # Errors
///
/// Storage failures.
pub async fn deposit<S: GiftStore>(
    tx: &mut S,
    ctx: &ServiceContext,
    gift: NewGift,
) -> PlatformResult<GiftItem> {
    Ok(tx.insert_gift(gift, ctx.now).await?)
}

/// The user's gift box.
///
/// Unreceived gifts whose box lifetime elapsed are hidden; waiting-for-free
/// gifts never lapse in the box. Received gifts stay listed as history.
///
/// # Errors
///
/// Storage failures.
pub async fn list_pending<S: GiftStore>(
    tx: &mut S,
    ctx: &ServiceContext,
    user: UserId,
) -> PlatformResult<Vec<GiftItem>> {
    Ok(tx
        .list_gifts(user)
        .await?
        .into_iter()
        .filter(|g| g.received || !gift_expiry::is_box_expired(g, ctx.now))
        .collect())
}

/// Unreceived, unexpired gifts.
///
/// # Errors
///
/// Storage failures.
pub async fn count_claimable<S: GiftStore>(
    tx: &mut S,
    ctx: &ServiceContext,
    user: UserId,
) -> PlatformResult<usize> {
    Ok(list_pending(tx, ctx, user)
        .await?
        .iter()
        .filter(|g| !g.received)
        .count())
}

/// Claim a gift into the productbook.
///
/// # Errors
///
/// * [`ErrorCode::GiftNotFound`] when missing or owned by someone else
/// * [`ErrorCode::GiftAlreadyReceived`] on a second claim
/// * [`ErrorCode::GiftExpired`] once the box lifetime elapsed
/// * [`ErrorCode::PromotionNotInProgress`] for a free-for-first gift whose
///   promotion is no longer running
pub async fn receive<S>(
    tx: &mut S,
    ctx: &ServiceContext,
    user: UserId,
    gift_id: GiftId,
) -> PlatformResult<GiftReceipt>
where
    S: GiftStore + TicketStore + PromotionStore + AccountStore,
{
    let mut gift = tx
        .find_gift(gift_id)
        .await?
        .filter(|g| g.user_id == user)
        .ok_or(ErrorCode::GiftNotFound)?;
    if gift.received {
        return Err(ErrorCode::GiftAlreadyReceived.into());
    }
    if gift_expiry::is_box_expired(&gift, ctx.now) {
        return Err(ErrorCode::GiftExpired.into());
    }

    let source_promotion = free_for_first_source(&gift);
    if let Some(promotion_id) = source_promotion {
        let running = tx
            .find_direct(promotion_id)
            .await?
            .is_some_and(|p| p.status == DirectPromotionStatus::Ing);
        if !running {
            return Err(ErrorCode::PromotionNotInProgress.into());
        }
    }

    let profile = account::default_profile(tx, user).await?;
    let expires = gift_expiry::ticket_expires_at(gift.ticket_expiration, ctx.now);
    let mut tickets = Vec::new();
    for _ in 0..gift.ticket_count() {
        let ticket = tx
            .insert_ticket(
                NewTicket {
                    user_id: user,
                    profile_id: profile.id,
                    product_id: gift.product_id,
                    episode_id: gift.episode_id,
                    own_type: gift.own_type,
                    ticket_type: gift.ticket_type,
                    acquisition_type: AcquisitionType::Gift,
                    acquisition_id: Some(gift.id.get()),
                    source_promotion_id: source_promotion,
                    rental_expired_date: expires,
                },
                ctx.now,
            )
            .await?;
        tickets.push(ticket);
    }

    gift.received = true;
    gift.received_date = Some(ctx.now);
    tx.update_gift(&gift).await?;
    tx.insert_gift_transaction(
        NewGiftTransaction {
            kind: GiftTransactionType::Received,
            user_id: user,
            giftbook_id: gift.id,
            amount: gift.ticket_count(),
            reason: gift
                .promotion_type
                .map_or_else(|| "gift".to_string(), |p| p.as_str().to_string()),
        },
        ctx.now,
    )
    .await?;

    GiftMetrics::record_received(gift.promotion_type.map_or("gift", PromotionType::as_str));
    tracing::info!(user_id = %user, gift_id = %gift.id, tickets = tickets.len(), "Gift received");

    Ok(GiftReceipt {
        gift_id: gift.id,
        tickets,
        ticket_expired_date: expires,
    })
}

/// Free-for-first gifts are gated on their promotion's live status.
fn free_for_first_source(gift: &GiftItem) -> Option<DirectPromotionId> {
    if gift.promotion_type == Some(PromotionType::FreeForFirst) {
        gift.acquisition_id.map(DirectPromotionId)
    } else {
        None
    }
}

/// Gift audit rows, newest first.
///
/// # Errors
///
/// Storage failures.
pub async fn list_transactions<S: GiftStore>(
    tx: &mut S,
    user: UserId,
    kind: Option<GiftTransactionType>,
) -> PlatformResult<Vec<GiftTransaction>> {
    Ok(tx.list_gift_transactions(user, kind).await?)
}
