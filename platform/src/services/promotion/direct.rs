//! Direct promotions: one free-for-first and one reader-of-prev row per
//! product, driven by the product's author.

use super::{ServiceContext, gift_with_notice};
use crate::services::catalog;
use chrono::{Duration, NaiveDate};
use serde::Serialize;
use webnovel_core::calendar::WeekCalendar;
use webnovel_core::rules::gift_expiry::GIFT_BOX_LIFETIME_DAYS;
use webnovel_core::rules::promotion::{self, DirectAction};
use webnovel_core::store::{
    CatalogStore, GiftStore, LibraryStore, NotificationStore, PromotionStore,
};
use webnovel_core::types::{
    AcquisitionType, DirectPromotion, DirectPromotionId, DirectPromotionStatus,
    DirectPromotionType, NewDirectPromotion, NewGift, OwnType, ProductId, PromotionType,
    TicketExpiration, TicketType, UserId,
};
use webnovel_core::{DateTime, ErrorCode, PlatformResult, Utc};

/// Lifetime of reader-of-prev tickets after receipt, in days.
pub const READER_OF_PREV_TICKET_DAYS: i32 = 7;

/// Outcome of a reader-of-prev issuance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReaderOfPrevIssuance {
    /// Gifts deposited across every participating product
    pub issued_count: usize,
    /// Promotions that took part and are now ended
    pub promotion_ids: Vec<DirectPromotionId>,
}

/// Weekly issuance status of a reader-of-prev promotion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IssuanceStatus {
    /// Whether gifts went out in the current ISO week
    #[serde(rename = "issuedThisWeekYn", with = "webnovel_core::types::yn")]
    pub issued_this_week: bool,
    /// Latest issuance time
    pub last_issued_date: Option<DateTime<Utc>>,
    /// Gifts in the latest issuance
    pub last_issued_count: usize,
    /// Latest issuance time within this week
    pub this_week_issued_date: Option<DateTime<Utc>>,
    /// Gifts issued this week
    pub this_week_issued_count: usize,
    /// Next Monday (today when today is Monday)
    pub next_available_date: NaiveDate,
}

async fn owned_promotion<S: PromotionStore>(
    tx: &mut S,
    author: UserId,
    id: DirectPromotionId,
) -> PlatformResult<DirectPromotion> {
    let promotion = tx
        .find_direct(id)
        .await?
        .ok_or(ErrorCode::PromotionNotFound)?;
    if promotion.author_id != author {
        tracing::warn!(user_id = %author, promotion_id = %id, "Not the promotion's author");
        return Err(ErrorCode::NotProductAuthor.into());
    }
    Ok(promotion)
}

/// Direct promotions of a product, for its author.
///
/// # Errors
///
/// [`ErrorCode::ProductNotFound`], [`ErrorCode::NotProductAuthor`].
pub async fn list<S: CatalogStore + PromotionStore>(
    tx: &mut S,
    author: UserId,
    product: ProductId,
) -> PlatformResult<Vec<DirectPromotion>> {
    catalog::authored_product(tx, author, product).await?;
    Ok(tx.list_direct_for_product(product).await?)
}

/// The running promotion of `kind` on a product, if any.
///
/// # Errors
///
/// Storage failures.
pub async fn running<S: PromotionStore>(
    tx: &mut S,
    product: ProductId,
    kind: DirectPromotionType,
) -> PlatformResult<Option<DirectPromotion>> {
    Ok(tx
        .list_direct_for_product(product)
        .await?
        .into_iter()
        .find(|p| p.kind == kind && p.status == DirectPromotionStatus::Ing))
}

/// Save the tickets-per-person setting on both direct promotions of a
/// product.
///
/// The latest non-ended row of each type is updated; when a type has none, a
/// `pending` row is created.
///
/// # Errors
///
/// * [`ErrorCode::InvalidPromotionRequest`] for a count outside `1..=100`
/// * [`ErrorCode::ProductNotFound`], [`ErrorCode::NotProductAuthor`]
pub async fn save<S: CatalogStore + PromotionStore>(
    tx: &mut S,
    ctx: &ServiceContext,
    author: UserId,
    product: ProductId,
    num_of_ticket_per_person: i32,
) -> PlatformResult<Vec<DirectPromotion>> {
    promotion::validate_tickets_per_person(num_of_ticket_per_person)?;
    catalog::authored_product(tx, author, product).await?;
    let existing = tx.list_direct_for_product(product).await?;

    let mut saved = Vec::with_capacity(DirectPromotionType::ALL.len());
    for &kind in DirectPromotionType::ALL {
        let current = existing
            .iter()
            .filter(|p| p.kind == kind && p.status != DirectPromotionStatus::End)
            .max_by_key(|p| p.id)
            .cloned();
        let row = match current {
            Some(mut row) => {
                row.num_of_ticket_per_person = num_of_ticket_per_person;
                row.updated_date = ctx.now;
                tx.update_direct(&row).await?;
                row
            }
            None => {
                tx.insert_direct(
                    NewDirectPromotion {
                        product_id: product,
                        author_id: author,
                        kind,
                        num_of_ticket_per_person,
                    },
                    ctx.now,
                )
                .await?
            }
        };
        saved.push(row);
    }
    tracing::info!(user_id = %author, product_id = %product, num_of_ticket_per_person, "Direct promotions saved");
    Ok(saved)
}

/// Apply a start / stop / end action.
///
/// # Errors
///
/// * [`ErrorCode::PromotionNotFound`], [`ErrorCode::NotProductAuthor`]
/// * [`ErrorCode::InvalidPromotionTransition`] when the state machine refuses
pub async fn transition<S: PromotionStore>(
    tx: &mut S,
    ctx: &ServiceContext,
    author: UserId,
    id: DirectPromotionId,
    action: DirectAction,
) -> PlatformResult<DirectPromotion> {
    let mut row = owned_promotion(tx, author, id).await?;
    let from = row.status;
    row.status = promotion::direct_transition(from, action)?;
    if action == DirectAction::Start && row.start_date.is_none() {
        row.start_date = Some(ctx.now);
    }
    row.updated_date = ctx.now;
    tx.update_direct(&row).await?;
    tracing::info!(promotion_id = %id, from = %from, to = %row.status, "Direct promotion transitioned");
    Ok(row)
}

/// Gift every current bookmarker of every reader-of-prev product of the
/// author, once per ISO week, then end the participating promotions.
///
/// Calling it on an already ended promotion is a no-op.
///
/// # Errors
///
/// * [`ErrorCode::PromotionNotFound`], [`ErrorCode::NotProductAuthor`]
/// * [`ErrorCode::InvalidPromotionRequest`] when `id` is not reader-of-prev
/// * [`ErrorCode::PromotionNotInProgress`] when it is stopped
pub async fn issue_reader_of_prev<S>(
    tx: &mut S,
    ctx: &ServiceContext,
    author: UserId,
    id: DirectPromotionId,
) -> PlatformResult<ReaderOfPrevIssuance>
where
    S: CatalogStore + PromotionStore + LibraryStore + GiftStore + NotificationStore,
{
    let trigger = owned_promotion(tx, author, id).await?;
    if trigger.kind != DirectPromotionType::ReaderOfPrev {
        return Err(ErrorCode::InvalidPromotionRequest.into());
    }
    match trigger.status {
        DirectPromotionStatus::End => {
            tracing::info!(promotion_id = %id, "Reader-of-prev already issued");
            return Ok(ReaderOfPrevIssuance {
                issued_count: 0,
                promotion_ids: Vec::new(),
            });
        }
        DirectPromotionStatus::Stop => return Err(ErrorCode::PromotionNotInProgress.into()),
        DirectPromotionStatus::Pending | DirectPromotionStatus::Ing => {}
    }

    let participating: Vec<DirectPromotion> = tx
        .list_direct_for_author(author, DirectPromotionType::ReaderOfPrev)
        .await?
        .into_iter()
        .filter(|p| {
            matches!(
                p.status,
                DirectPromotionStatus::Pending | DirectPromotionStatus::Ing
            )
        })
        .collect();

    let mut issued_count = 0;
    let mut promotion_ids = Vec::with_capacity(participating.len());
    for mut row in participating {
        if let Some(product) = tx.find_product(row.product_id).await?.filter(|p| p.active) {
            for reader in tx.list_bookmarkers(product.id).await? {
                if reader == author {
                    continue;
                }
                let received_this_week = tx
                    .list_user_promotion_gifts(reader, product.id, PromotionType::ReaderOfPrev)
                    .await?
                    .iter()
                    .any(|g| ctx.calendar.same_week(g.created_date, ctx.now));
                if received_this_week {
                    continue;
                }
                gift_with_notice(
                    tx,
                    ctx,
                    &product,
                    NewGift {
                        user_id: reader,
                        product_id: Some(product.id),
                        episode_id: None,
                        amount: Some(row.num_of_ticket_per_person),
                        ticket_type: TicketType::Free,
                        own_type: OwnType::Rental,
                        promotion_type: Some(PromotionType::ReaderOfPrev),
                        acquisition_type: AcquisitionType::Promotion,
                        acquisition_id: Some(row.id.get()),
                        expiration_date: Some(ctx.now + Duration::days(GIFT_BOX_LIFETIME_DAYS)),
                        ticket_expiration: TicketExpiration::days(READER_OF_PREV_TICKET_DAYS),
                    },
                )
                .await?;
                issued_count += 1;
            }
        }

        row.status = DirectPromotionStatus::End;
        row.start_date = Some(ctx.now);
        row.updated_date = ctx.now;
        tx.update_direct(&row).await?;
        promotion_ids.push(row.id);
    }

    tracing::info!(user_id = %author, issued_count, promotions = promotion_ids.len(), "Reader-of-prev issued");
    Ok(ReaderOfPrevIssuance {
        issued_count,
        promotion_ids,
    })
}

/// Issuance history of a reader-of-prev promotion relative to this week.
///
/// # Errors
///
/// [`ErrorCode::PromotionNotFound`], [`ErrorCode::NotProductAuthor`].
pub async fn issuance_status<S: GiftStore + PromotionStore>(
    tx: &mut S,
    ctx: &ServiceContext,
    author: UserId,
    id: DirectPromotionId,
) -> PlatformResult<IssuanceStatus> {
    owned_promotion(tx, author, id).await?;
    let gifts = tx
        .list_promotion_gifts(PromotionType::ReaderOfPrev, id.get())
        .await?;

    let last_issued_date = gifts.iter().map(|g| g.created_date).max();
    let last_issued_count = last_issued_date.map_or(0, |at| {
        gifts.iter().filter(|g| g.created_date == at).count()
    });
    let this_week: Vec<DateTime<Utc>> = gifts
        .iter()
        .map(|g| g.created_date)
        .filter(|at| ctx.calendar.same_week(*at, ctx.now))
        .collect();

    Ok(IssuanceStatus {
        issued_this_week: !this_week.is_empty(),
        last_issued_date,
        last_issued_count,
        this_week_issued_date: this_week.iter().max().copied(),
        this_week_issued_count: this_week.len(),
        next_available_date: WeekCalendar::upcoming_monday(ctx.calendar.local_date(ctx.now)),
    })
}
