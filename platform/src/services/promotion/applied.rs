//! Applied promotions: author applications, operator decisions and the
//! weekly slot quota.
//!
//! Only `ing` rows created in the current ISO week count toward the cap of
//! [`APPLIED_PROMOTION_WEEKLY_CAP`]. Applications themselves never consume a
//! slot and approval does not re-check it.

use super::ServiceContext;
use crate::services::{account, catalog, notification};
use chrono::NaiveDate;
use serde::Serialize;
use webnovel_core::rules::promotion::{self, APPLIED_PROMOTION_WEEKLY_CAP, AppliedAction};
use webnovel_core::store::{CatalogStore, NotificationStore, PromotionStore};
use webnovel_core::types::{
    AppliedPromotion, AppliedPromotionId, AppliedPromotionStatus, AppliedPromotionType,
    NewAppliedPromotion, NewNotification, NotificationType, ProductId, User, UserId,
};
use webnovel_core::{DateTime, ErrorCode, PlatformResult, Utc};

/// An author's application.
#[derive(Debug, Clone)]
pub struct Application {
    /// Promotion type
    pub kind: AppliedPromotionType,
    /// Requested start
    pub start_date: DateTime<Utc>,
    /// Requested end
    pub end_date: DateTime<Utc>,
    /// Tickets each reader receives
    pub num_of_ticket_per_person: i32,
}

/// Per-type availability for the author's promotion page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeAvailability {
    /// Promotion type
    #[serde(rename = "type")]
    pub kind: AppliedPromotionType,
    /// Latest denial of this type on the product
    pub latest_deny_date: Option<DateTime<Utc>>,
    /// First local date a reapplication is accepted, after a denial
    pub reapply_date: Option<NaiveDate>,
    /// Whether an application would be accepted now
    #[serde(rename = "canApplyYn", with = "webnovel_core::types::yn")]
    pub can_apply: bool,
    /// Whether a pending or running row can be cancelled
    #[serde(rename = "canCancelYn", with = "webnovel_core::types::yn")]
    pub can_cancel: bool,
}

/// Applied promotions of one product with this week's slot information.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppliedPromotionBoard {
    /// Product
    pub product_id: ProductId,
    /// Rows still live (`apply` or `ing`)
    pub promotions: Vec<AppliedPromotion>,
    /// Slots left this week
    pub remaining_slots: i64,
    /// Availability per type
    pub availability: Vec<TypeAvailability>,
}

/// Slots left in the current ISO week.
///
/// # Errors
///
/// Storage failures.
pub async fn remaining_slots<S: PromotionStore>(
    tx: &mut S,
    ctx: &ServiceContext,
) -> PlatformResult<i64> {
    let ing = tx
        .count_ing_applied_created_between(
            ctx.calendar.week_start(ctx.now),
            ctx.calendar.week_end(ctx.now),
        )
        .await?;
    Ok(promotion::remaining_slots(ing))
}

/// Apply for a promotion on one's own product.
///
/// # Errors
///
/// * [`ErrorCode::InvalidPromotionRequest`] for an empty period or a ticket
///   count outside `1..=100`
/// * [`ErrorCode::AlreadyAppliedPromotion`],
///   [`ErrorCode::AppliedPromotionInProgress`],
///   [`ErrorCode::AppliedPromotionCooldown`]
/// * [`ErrorCode::NoAvailableAppliedPromotionSlot`] when this week's cap is
///   reached
pub async fn apply<S: CatalogStore + PromotionStore>(
    tx: &mut S,
    ctx: &ServiceContext,
    author: UserId,
    product: ProductId,
    application: Application,
) -> PlatformResult<AppliedPromotion> {
    promotion::validate_application(
        application.start_date,
        application.end_date,
        application.num_of_ticket_per_person,
    )?;
    catalog::authored_product(tx, author, product).await?;
    let rows = tx.list_applied_for_product(product).await?;
    promotion::check_application(&rows, application.kind, ctx.now, &ctx.calendar)?;

    if remaining_slots(tx, ctx).await? == 0 {
        tracing::warn!(product_id = %product, cap = APPLIED_PROMOTION_WEEKLY_CAP, "No applied promotion slots left");
        return Err(ErrorCode::NoAvailableAppliedPromotionSlot.into());
    }

    let row = tx
        .insert_applied(
            NewAppliedPromotion {
                product_id: product,
                author_id: author,
                kind: application.kind,
                start_date: application.start_date,
                end_date: application.end_date,
                num_of_ticket_per_person: application.num_of_ticket_per_person,
            },
            ctx.now,
        )
        .await?;
    tracing::info!(user_id = %author, product_id = %product, promotion_id = %row.id, kind = %row.kind, "Applied promotion requested");
    Ok(row)
}

/// Withdraw a pending or running application.
///
/// # Errors
///
/// * [`ErrorCode::PromotionNotFound`], [`ErrorCode::NotProductAuthor`]
/// * [`ErrorCode::InvalidPromotionTransition`] for a closed row
pub async fn cancel<S: PromotionStore>(
    tx: &mut S,
    ctx: &ServiceContext,
    author: UserId,
    id: AppliedPromotionId,
) -> PlatformResult<AppliedPromotion> {
    let mut row = tx
        .find_applied(id)
        .await?
        .ok_or(ErrorCode::PromotionNotFound)?;
    if row.author_id != author {
        return Err(ErrorCode::NotProductAuthor.into());
    }
    row.status = promotion::applied_transition(row.status, AppliedAction::Cancel)?;
    row.updated_date = ctx.now;
    tx.update_applied(&row).await?;
    tracing::info!(promotion_id = %id, "Applied promotion cancelled");
    Ok(row)
}

/// Operator decision: approve, deny or end.
///
/// The author is notified of approvals and denials.
///
/// # Errors
///
/// * [`ErrorCode::OperatorOnly`] unless `operator` is an editor or admin
/// * [`ErrorCode::PromotionNotFound`]
/// * [`ErrorCode::InvalidPromotionTransition`]
pub async fn decide<S>(
    tx: &mut S,
    ctx: &ServiceContext,
    operator: &User,
    id: AppliedPromotionId,
    action: AppliedAction,
) -> PlatformResult<AppliedPromotion>
where
    S: CatalogStore + PromotionStore + NotificationStore,
{
    account::require_operator(operator)?;
    if action == AppliedAction::Cancel {
        return Err(ErrorCode::InvalidPromotionTransition.into());
    }
    let mut row = tx
        .find_applied(id)
        .await?
        .ok_or(ErrorCode::PromotionNotFound)?;
    let from = row.status;
    row.status = promotion::applied_transition(from, action)?;
    row.updated_date = ctx.now;
    tx.update_applied(&row).await?;
    tracing::info!(promotion_id = %id, operator_id = %operator.id, from = %from, to = %row.status, "Applied promotion decided");

    let verdict = match action {
        AppliedAction::Approve => Some("approved"),
        AppliedAction::Deny => Some("denied"),
        AppliedAction::End | AppliedAction::Cancel => None,
    };
    if let Some(verdict) = verdict {
        let title = match tx.find_product(row.product_id).await? {
            Some(product) => format!("Your {} promotion for \"{}\" was {verdict}", row.kind, product.title),
            None => format!("Your {} promotion was {verdict}", row.kind),
        };
        notification::notify(
            tx,
            ctx,
            NewNotification {
                user_id: row.author_id,
                kind: NotificationType::Promotion,
                title,
                content: None,
            },
        )
        .await?;
    }
    Ok(row)
}

/// Operator queue, optionally filtered by status.
///
/// # Errors
///
/// [`ErrorCode::OperatorOnly`].
pub async fn queue<S: PromotionStore>(
    tx: &mut S,
    operator: &User,
    status: Option<AppliedPromotionStatus>,
) -> PlatformResult<Vec<AppliedPromotion>> {
    account::require_operator(operator)?;
    Ok(tx.list_applied(status).await?)
}

/// Types running (`ing`) on a product.
///
/// # Errors
///
/// Storage failures.
pub async fn running_kinds<S: PromotionStore>(
    tx: &mut S,
    product: ProductId,
) -> PlatformResult<Vec<AppliedPromotionType>> {
    Ok(tx
        .list_applied_for_product(product)
        .await?
        .into_iter()
        .filter(|p| p.status == AppliedPromotionStatus::Ing)
        .map(|p| p.kind)
        .collect())
}

/// The running promotion of `kind` on a product.
///
/// # Errors
///
/// [`ErrorCode::PromotionNotInProgress`] when none runs.
pub async fn running<S: PromotionStore>(
    tx: &mut S,
    product: ProductId,
    kind: AppliedPromotionType,
) -> PlatformResult<AppliedPromotion> {
    tx.list_applied_for_product(product)
        .await?
        .into_iter()
        .filter(|p| p.kind == kind && p.status == AppliedPromotionStatus::Ing)
        .max_by_key(|p| p.id)
        .ok_or_else(|| ErrorCode::PromotionNotInProgress.into())
}

/// The author's view of a product's applied promotions.
///
/// # Errors
///
/// [`ErrorCode::ProductNotFound`], [`ErrorCode::NotProductAuthor`].
pub async fn board<S: CatalogStore + PromotionStore>(
    tx: &mut S,
    ctx: &ServiceContext,
    author: UserId,
    product: ProductId,
) -> PlatformResult<AppliedPromotionBoard> {
    catalog::authored_product(tx, author, product).await?;
    let rows = tx.list_applied_for_product(product).await?;
    let remaining = remaining_slots(tx, ctx).await?;

    let availability = AppliedPromotionType::ALL
        .iter()
        .map(|&kind| {
            let latest_deny_date = promotion::latest_deny(&rows, kind);
            TypeAvailability {
                kind,
                latest_deny_date,
                reapply_date: latest_deny_date
                    .map(|denied| promotion::reapply_date(kind, denied, &ctx.calendar)),
                can_apply: remaining > 0
                    && promotion::check_application(&rows, kind, ctx.now, &ctx.calendar).is_ok(),
                can_cancel: rows.iter().any(|r| {
                    r.kind == kind
                        && matches!(
                            r.status,
                            AppliedPromotionStatus::Apply | AppliedPromotionStatus::Ing
                        )
                }),
            }
        })
        .collect();

    let promotions = rows
        .into_iter()
        .filter(|r| {
            !matches!(
                r.status,
                AppliedPromotionStatus::End
                    | AppliedPromotionStatus::Cancel
                    | AppliedPromotionStatus::Deny
            )
        })
        .collect();

    Ok(AppliedPromotionBoard {
        product_id: product,
        promotions,
        remaining_slots: remaining,
        availability,
    })
}
