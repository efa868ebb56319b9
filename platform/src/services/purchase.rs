//! Cash purchases and episode access.

use super::{ServiceContext, account, catalog, inventory, ledger, library, notification};
use chrono::Duration;
use serde::Serialize;
use webnovel_core::rules::{CASH_RENTAL_DAYS, EPISODE_PRICE};
use webnovel_core::store::{
    AccountStore, CatalogStore, GiftStore, LedgerStore, LibraryStore, NotificationStore,
    PromotionStore, TicketStore,
};
use webnovel_core::types::{
    AcquisitionType, CashReason, Episode, EpisodeCounter, EpisodeId, NewNotification, NewTicket,
    NotificationType, OwnType, ProductCounter, ProductId, ProfileId, Ticket, TicketType, UserId,
};
use webnovel_core::{ErrorCode, PlatformResult};
use webnovel_runtime::metrics::CommerceMetrics;

/// Outcome of a bulk purchase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkPurchase {
    /// Episodes bought
    pub purchased_count: usize,
    /// Cash debited
    pub total_cash_used: i64,
    /// Free episodes skipped
    pub skipped_free_count: usize,
    /// Episodes skipped because already owned
    pub skipped_owned_count: usize,
}

/// Outcome of a sponsorship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Sponsorship {
    /// Cash donated
    pub donation_price: i64,
    /// Donor balance afterwards
    pub remaining_balance: i64,
}

/// How an episode open was granted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Access {
    /// The episode is free
    Free,
    /// The reader wrote the product
    Author,
    /// A permanent ticket is bound to the episode
    Owned,
    /// A redeemed rental is still running
    Rental,
    /// A ticket was redeemed by this open
    Ticket,
}

/// Result of opening an episode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EpisodeAccess {
    /// The episode, with the hit just recorded
    pub episode: Episode,
    /// Grant
    pub access: Access,
    /// Ticket redeemed by this open
    pub ticket: Option<Ticket>,
}

fn cash_to_u64(cash: i64) -> u64 {
    u64::try_from(cash).unwrap_or_default()
}

fn count_to_u64(count: usize) -> u64 {
    u64::try_from(count).unwrap_or(u64::MAX)
}

/// Buy every published paid episode of a product the reader does not own
/// yet, with one debit of 100 cash per episode.
///
/// With nothing left to buy the call succeeds without writing the ledger.
///
/// # Errors
///
/// * [`ErrorCode::ProductNotFound`], [`ErrorCode::ProfileNotFound`],
///   [`ErrorCode::NotResourceOwner`]
/// * [`webnovel_core::PlatformError::InsufficientFunds`] when the balance is
///   below the total
pub async fn purchase_all_episodes<S>(
    tx: &mut S,
    ctx: &ServiceContext,
    user: UserId,
    product: ProductId,
    profile: ProfileId,
) -> PlatformResult<BulkPurchase>
where
    S: AccountStore + CatalogStore + LedgerStore + TicketStore,
{
    catalog::find_product(tx, product).await?;
    let profile = account::owned_profile(tx, user, profile).await?;

    let candidates: Vec<Episode> = catalog::list_episodes(tx, product)
        .await?
        .into_iter()
        .filter(|e| e.is_paid() && e.is_published(ctx.now))
        .collect();

    // Zero while candidates are paid-only
    let mut skipped_free_count = 0;
    let mut skipped_owned_count = 0;
    let mut remaining = Vec::with_capacity(candidates.len());
    for episode in candidates {
        if !episode.is_paid() {
            skipped_free_count += 1;
        } else if inventory::owns_episode(tx, user, episode.id).await? {
            skipped_owned_count += 1;
        } else {
            remaining.push(episode);
        }
    }

    if remaining.is_empty() {
        return Ok(BulkPurchase {
            purchased_count: 0,
            total_cash_used: 0,
            skipped_free_count,
            skipped_owned_count,
        });
    }

    let required = EPISODE_PRICE * i64::try_from(remaining.len()).unwrap_or(i64::MAX / EPISODE_PRICE);
    let movement = ledger::debit(tx, ctx, user, required, CashReason::BulkPurchase, None).await?;
    for episode in &remaining {
        inventory::issue(
            tx,
            ctx,
            NewTicket {
                user_id: user,
                profile_id: profile.id,
                product_id: Some(product),
                episode_id: Some(episode.id),
                own_type: OwnType::Own,
                ticket_type: TicketType::Paid,
                acquisition_type: AcquisitionType::Purchase,
                acquisition_id: Some(movement.transaction.id),
                source_promotion_id: None,
                rental_expired_date: None,
            },
        )
        .await?;
    }

    CommerceMetrics::record_purchase("bulk", count_to_u64(remaining.len()), cash_to_u64(required));
    tracing::info!(
        user_id = %user,
        product_id = %product,
        purchased = remaining.len(),
        cash = required,
        skipped_owned = skipped_owned_count,
        "Bulk purchase completed"
    );
    Ok(BulkPurchase {
        purchased_count: remaining.len(),
        total_cash_used: required,
        skipped_free_count,
        skipped_owned_count,
    })
}

/// Donate cash to a product. The donor is debited; the author is notified
/// but not credited.
///
/// # Errors
///
/// * [`ErrorCode::InvalidDonationPrice`] unless `donation_price > 0`
/// * [`ErrorCode::ProductNotFound`], [`ErrorCode::ProfileNotFound`],
///   [`ErrorCode::NotResourceOwner`]
/// * [`webnovel_core::PlatformError::InsufficientFunds`]
pub async fn sponsor<S>(
    tx: &mut S,
    ctx: &ServiceContext,
    user: UserId,
    product: ProductId,
    profile: ProfileId,
    donation_price: i64,
    message: Option<String>,
) -> PlatformResult<Sponsorship>
where
    S: AccountStore + CatalogStore + LedgerStore + NotificationStore,
{
    if donation_price <= 0 {
        return Err(ErrorCode::InvalidDonationPrice.into());
    }
    let product = catalog::find_product(tx, product).await?;
    let profile = account::owned_profile(tx, user, profile).await?;
    let movement = ledger::debit(tx, ctx, user, donation_price, CashReason::Sponsor, None).await?;

    notification::notify(
        tx,
        ctx,
        NewNotification {
            user_id: product.author_id,
            kind: NotificationType::Sponsor,
            title: format!(
                "{} sponsored \"{}\" with {donation_price} cash",
                profile.nickname, product.title
            ),
            content: message.filter(|m| !m.trim().is_empty()),
        },
    )
    .await?;

    CommerceMetrics::record_sponsorship(cash_to_u64(donation_price));
    tracing::info!(user_id = %user, product_id = %product.id, donation_price, "Product sponsored");
    Ok(Sponsorship {
        donation_price,
        remaining_balance: movement.balance,
    })
}

/// Buy one episode for 100 cash, as a permanent ticket or a 3-day rental
/// bound to the episode.
///
/// # Errors
///
/// * [`ErrorCode::EpisodeNotFound`] for a missing or unpublished episode
/// * [`ErrorCode::NothingToPurchase`] for a free episode
/// * [`ErrorCode::EpisodeAlreadyOwned`] when a permanent ticket exists
/// * [`webnovel_core::PlatformError::InsufficientFunds`]
pub async fn purchase_episode<S>(
    tx: &mut S,
    ctx: &ServiceContext,
    user: UserId,
    profile: ProfileId,
    episode: EpisodeId,
    own_type: OwnType,
) -> PlatformResult<Ticket>
where
    S: AccountStore + CatalogStore + LedgerStore + TicketStore,
{
    let episode = catalog::find_episode(tx, episode).await?;
    if !episode.is_published(ctx.now) {
        return Err(ErrorCode::EpisodeNotFound.into());
    }
    if !episode.is_paid() {
        return Err(ErrorCode::NothingToPurchase.into());
    }
    let profile = account::owned_profile(tx, user, profile).await?;
    if inventory::owns_episode(tx, user, episode.id).await? {
        return Err(ErrorCode::EpisodeAlreadyOwned.into());
    }

    let (reason, expires) = match own_type {
        OwnType::Own => (CashReason::EpisodePurchase, None),
        OwnType::Rental => (
            CashReason::EpisodeRental,
            Some(ctx.now + Duration::days(CASH_RENTAL_DAYS)),
        ),
    };
    let movement = ledger::debit(tx, ctx, user, EPISODE_PRICE, reason, None).await?;
    let ticket = inventory::issue(
        tx,
        ctx,
        NewTicket {
            user_id: user,
            profile_id: profile.id,
            product_id: Some(episode.product_id),
            episode_id: Some(episode.id),
            own_type,
            ticket_type: TicketType::Paid,
            acquisition_type: AcquisitionType::Purchase,
            acquisition_id: Some(movement.transaction.id),
            source_promotion_id: None,
            rental_expired_date: expires,
        },
    )
    .await?;

    CommerceMetrics::record_purchase(own_type.as_str(), 1, cash_to_u64(EPISODE_PRICE));
    tracing::info!(user_id = %user, episode_id = %episode.id, own_type = %own_type, "Episode purchased");
    Ok(ticket)
}

/// Open an episode for reading.
///
/// Free episodes and the author always open. Paid episodes open on a bound
/// permanent ticket or a running redeemed rental; otherwise the best usable
/// ticket is redeemed. Every open records usage, refreshes the recent list
/// and bumps the episode and product hit counters.
///
/// # Errors
///
/// * [`ErrorCode::EpisodeNotFound`] for missing or unpublished episodes
/// * [`ErrorCode::NoUsableTicket`] when nothing grants access
pub async fn open_episode<S>(
    tx: &mut S,
    ctx: &ServiceContext,
    user: UserId,
    episode: EpisodeId,
) -> PlatformResult<EpisodeAccess>
where
    S: CatalogStore + TicketStore + GiftStore + PromotionStore + LibraryStore,
{
    let mut episode = catalog::find_episode(tx, episode).await?;
    let product = catalog::find_product(tx, episode.product_id).await?;
    let is_author = product.author_id == user;
    if !is_author && !episode.is_published(ctx.now) {
        return Err(ErrorCode::EpisodeNotFound.into());
    }

    let (access, ticket) = if !episode.is_paid() {
        (Access::Free, None)
    } else if is_author {
        (Access::Author, None)
    } else if inventory::owns_episode(tx, user, episode.id).await? {
        (Access::Owned, None)
    } else if inventory::has_open_rental(tx, ctx, user, episode.id).await? {
        (Access::Rental, None)
    } else {
        let usable = inventory::find_usable(tx, ctx, user, product.id, episode.id)
            .await?
            .ok_or(ErrorCode::NoUsableTicket)?;
        let used = inventory::consume(tx, ctx, usable, episode.id).await?;
        (Access::Ticket, Some(used))
    };

    library::record_open(tx, ctx, user, &episode).await?;
    episode.count_hit += 1;
    tx.set_episode_counter(episode.id, EpisodeCounter::Hit, episode.count_hit)
        .await?;
    tx.set_product_counter(product.id, ProductCounter::Hit, product.count_hit + 1)
        .await?;

    tracing::debug!(user_id = %user, episode_id = %episode.id, access = ?access, "Episode opened");
    Ok(EpisodeAccess {
        episode,
        access,
        ticket,
    })
}
