//! Reader claims against running promotions.
//!
//! Each claim deposits one gift into the caller's gift box; tickets are only
//! issued when the gift is received.

use super::{ServiceContext, applied, direct, gift_with_notice};
use crate::services::catalog;
use chrono::{Duration, NaiveTime};
use webnovel_core::rules::gift_expiry::GIFT_BOX_LIFETIME_DAYS;
use webnovel_core::store::{
    CatalogStore, GiftStore, LibraryStore, NotificationStore, PromotionStore,
};
use webnovel_core::types::{
    AcquisitionType, AppliedPromotionType, DirectPromotionType, GiftItem, NewGift, OwnType,
    ProductId, PromotionType, TicketExpiration, TicketType, UserId,
};
use webnovel_core::{ErrorCode, PlatformResult};

/// Hours between two waiting-for-free claims on the same product.
pub const WAITING_FOR_FREE_RECHARGE_HOURS: i64 = 24;

/// Lifetime of a waiting-for-free ticket after receipt, in hours.
pub const WAITING_FOR_FREE_TICKET_HOURS: i32 = 72;

/// Local opening hour of the 6-9-path window (inclusive).
pub const SIX_NINE_OPEN_HOUR: u32 = 18;

/// Local closing hour of the 6-9-path window (exclusive).
pub const SIX_NINE_CLOSE_HOUR: u32 = 21;

/// First-visit gift from a running free-for-first promotion.
///
/// # Errors
///
/// * [`ErrorCode::ProductNotFound`]
/// * [`ErrorCode::PromotionNotInProgress`] when no free-for-first runs
/// * [`ErrorCode::ClaimNotAvailable`] for the author, for readers who already
///   opened the product, and for a second claim
pub async fn claim_free_for_first<S>(
    tx: &mut S,
    ctx: &ServiceContext,
    user: UserId,
    product_id: ProductId,
) -> PlatformResult<GiftItem>
where
    S: CatalogStore + PromotionStore + LibraryStore + GiftStore + NotificationStore,
{
    let product = catalog::find_product(tx, product_id).await?;
    let promotion = direct::running(tx, product_id, DirectPromotionType::FreeForFirst)
        .await?
        .ok_or(ErrorCode::PromotionNotInProgress)?;
    if product.author_id == user {
        return Err(ErrorCode::ClaimNotAvailable.into());
    }
    if !tx.list_usage(user, product_id).await?.is_empty() {
        return Err(ErrorCode::ClaimNotAvailable.into());
    }
    let already = tx
        .list_user_promotion_gifts(user, product_id, PromotionType::FreeForFirst)
        .await?
        .iter()
        .any(|g| g.acquisition_id == Some(promotion.id.get()));
    if already {
        return Err(ErrorCode::ClaimNotAvailable.into());
    }

    gift_with_notice(
        tx,
        ctx,
        &product,
        NewGift {
            user_id: user,
            product_id: Some(product_id),
            episode_id: None,
            amount: Some(promotion.num_of_ticket_per_person),
            ticket_type: TicketType::Free,
            own_type: OwnType::Rental,
            promotion_type: Some(PromotionType::FreeForFirst),
            acquisition_type: AcquisitionType::Promotion,
            acquisition_id: Some(promotion.id.get()),
            expiration_date: Some(ctx.now + Duration::days(GIFT_BOX_LIFETIME_DAYS)),
            ticket_expiration: TicketExpiration::NONE,
        },
    )
    .await
}

/// Recharging gift from a running waiting-for-free promotion, once per
/// 24 hours.
///
/// # Errors
///
/// * [`ErrorCode::ProductNotFound`]
/// * [`ErrorCode::PromotionNotInProgress`]
/// * [`ErrorCode::ClaimNotAvailable`] while the previous claim recharges
pub async fn claim_waiting_for_free<S>(
    tx: &mut S,
    ctx: &ServiceContext,
    user: UserId,
    product_id: ProductId,
) -> PlatformResult<GiftItem>
where
    S: CatalogStore + PromotionStore + GiftStore + NotificationStore,
{
    let product = catalog::find_product(tx, product_id).await?;
    let promotion = applied::running(tx, product_id, AppliedPromotionType::WaitingForFree).await?;
    let recharge_from = ctx.now - Duration::hours(WAITING_FOR_FREE_RECHARGE_HOURS);
    let recharging = tx
        .list_user_promotion_gifts(user, product_id, PromotionType::WaitingForFree)
        .await?
        .iter()
        .any(|g| g.created_date > recharge_from);
    if recharging {
        return Err(ErrorCode::ClaimNotAvailable.into());
    }

    gift_with_notice(
        tx,
        ctx,
        &product,
        NewGift {
            user_id: user,
            product_id: Some(product_id),
            episode_id: None,
            amount: Some(promotion.num_of_ticket_per_person),
            ticket_type: TicketType::Free,
            own_type: OwnType::Rental,
            promotion_type: Some(PromotionType::WaitingForFree),
            acquisition_type: AcquisitionType::Promotion,
            acquisition_id: Some(promotion.id.get()),
            expiration_date: None,
            ticket_expiration: TicketExpiration::hours(WAITING_FOR_FREE_TICKET_HOURS),
        },
    )
    .await
}

/// Evening gift from a running 6-9-path promotion: 18:00 to 21:00 local,
/// once per local day. The gift box entry lapses when the window closes.
///
/// # Errors
///
/// * [`ErrorCode::ProductNotFound`]
/// * [`ErrorCode::PromotionNotInProgress`]
/// * [`ErrorCode::ClaimNotAvailable`] outside the window or after today's
///   claim
pub async fn claim_six_nine_path<S>(
    tx: &mut S,
    ctx: &ServiceContext,
    user: UserId,
    product_id: ProductId,
) -> PlatformResult<GiftItem>
where
    S: CatalogStore + PromotionStore + GiftStore + NotificationStore,
{
    let product = catalog::find_product(tx, product_id).await?;
    let promotion = applied::running(tx, product_id, AppliedPromotionType::SixNinePath).await?;

    let open = NaiveTime::from_hms_opt(SIX_NINE_OPEN_HOUR, 0, 0).unwrap_or(NaiveTime::MIN);
    let close = NaiveTime::from_hms_opt(SIX_NINE_CLOSE_HOUR, 0, 0).unwrap_or(NaiveTime::MIN);
    let local_now = ctx.calendar.local_time(ctx.now);
    if local_now < open || local_now >= close {
        return Err(ErrorCode::ClaimNotAvailable.into());
    }

    let today = ctx.calendar.local_date(ctx.now);
    let claimed_today = tx
        .list_user_promotion_gifts(user, product_id, PromotionType::SixNinePath)
        .await?
        .iter()
        .any(|g| ctx.calendar.local_date(g.created_date) == today);
    if claimed_today {
        return Err(ErrorCode::ClaimNotAvailable.into());
    }

    gift_with_notice(
        tx,
        ctx,
        &product,
        NewGift {
            user_id: user,
            product_id: Some(product_id),
            episode_id: None,
            amount: Some(promotion.num_of_ticket_per_person),
            ticket_type: TicketType::Free,
            own_type: OwnType::Rental,
            promotion_type: Some(PromotionType::SixNinePath),
            acquisition_type: AcquisitionType::Promotion,
            acquisition_id: Some(promotion.id.get()),
            expiration_date: Some(ctx.calendar.to_utc(today.and_time(close))),
            ticket_expiration: TicketExpiration::on_receive_days(1),
        },
    )
    .await
}
