//! Contract offers from content partners to authors.

use super::promotion::applied;
use super::{ServiceContext, catalog, notification};
use serde::{Deserialize, Serialize};
use webnovel_core::rules::contract;
use webnovel_core::store::{CatalogStore, ContractStore, NotificationStore, PromotionStore};
use webnovel_core::types::{
    AppliedPromotionType, ContractOffer, ContractOfferId, DirectPromotionStatus,
    DirectPromotionType, NewContractOffer, NewNotification, NotificationType, ProductId,
    ProfitType, UserId,
};
use webnovel_core::{ErrorCode, PlatformResult};

/// Terms proposed by an offerer.
#[derive(Debug, Clone, Deserialize)]
pub struct OfferTerms {
    /// Advance payment range, `"<min>~<max>"`
    pub advance_payment_range: String,
    /// Partner share in percent
    pub cp_profit_rate: i32,
    /// Author share in percent
    pub author_profit_rate: i32,
    /// Free-text message to the author
    pub message: String,
}

/// Promotions currently running on the offered product.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PromotionSummary {
    /// Free-for-first is running
    #[serde(rename = "freeForFirstYn", with = "webnovel_core::types::yn")]
    pub free_for_first: bool,
    /// Reader-of-prev is running
    #[serde(rename = "readerOfPrevYn", with = "webnovel_core::types::yn")]
    pub reader_of_prev: bool,
    /// Waiting-for-free is running
    #[serde(rename = "waitingForFreeYn", with = "webnovel_core::types::yn")]
    pub waiting_for_free: bool,
    /// 6-9-path is running
    #[serde(rename = "sixNinePathYn", with = "webnovel_core::types::yn")]
    pub six_nine_path: bool,
}

/// An offer the caller sent, with context about the target product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SentOffer {
    /// The offer
    #[serde(flatten)]
    pub offer: ContractOffer,
    /// Product title
    pub title: Option<String>,
    /// Primary genre
    pub primary_genre: Option<String>,
    /// Sub genre
    pub sub_genre: Option<String>,
    /// Keywords
    pub keywords: Vec<String>,
    /// Running promotions
    pub promotions: PromotionSummary,
}

/// Send an offer to the author of a product.
///
/// # Errors
///
/// * [`ErrorCode::InvalidContractOfferProfitRate`] unless both rates are
///   positive and sum to 100
/// * [`ErrorCode::InvalidContractOffer`] for a malformed range or message
/// * [`ErrorCode::ProductNotFound`]
/// * [`ErrorCode::CannotOfferOwnProduct`]
/// * [`ErrorCode::ContractOfferAlreadyPending`]
pub async fn create_offer<S>(
    tx: &mut S,
    ctx: &ServiceContext,
    offerer: UserId,
    product: ProductId,
    terms: OfferTerms,
) -> PlatformResult<ContractOffer>
where
    S: CatalogStore + ContractStore + NotificationStore,
{
    contract::validate_offer(
        terms.author_profit_rate,
        terms.cp_profit_rate,
        terms.advance_payment_range.trim(),
        &terms.message,
    )?;
    let product = catalog::find_product(tx, product).await?;
    if product.author_id == offerer {
        return Err(ErrorCode::CannotOfferOwnProduct.into());
    }
    if tx.find_pending_offer(product.id, offerer).await?.is_some() {
        return Err(ErrorCode::ContractOfferAlreadyPending.into());
    }

    let offer = tx
        .insert_offer(
            NewContractOffer {
                product_id: product.id,
                author_id: product.author_id,
                offerer_id: offerer,
                profit_type: ProfitType::Percent,
                author_profit: terms.author_profit_rate,
                offer_profit: terms.cp_profit_rate,
                advance_payment_range: terms.advance_payment_range.trim().to_string(),
                message: terms.message.trim().to_string(),
            },
            ctx.now,
        )
        .await?;

    notification::notify(
        tx,
        ctx,
        NewNotification {
            user_id: product.author_id,
            kind: NotificationType::ContractOffer,
            title: format!("You received a contract offer for \"{}\"", product.title),
            content: Some(offer.message.clone()),
        },
    )
    .await?;
    tracing::info!(offer_id = %offer.id, product_id = %product.id, offerer_id = %offerer, "Contract offer created");
    Ok(offer)
}

async fn answer<S>(
    tx: &mut S,
    ctx: &ServiceContext,
    author: UserId,
    id: ContractOfferId,
    accept: bool,
) -> PlatformResult<ContractOffer>
where
    S: CatalogStore + ContractStore + NotificationStore,
{
    let mut offer = tx
        .find_offer(id)
        .await?
        .ok_or(ErrorCode::ContractOfferNotFound)?;
    if offer.author_id != author {
        return Err(ErrorCode::NotOfferRecipient.into());
    }
    offer.author_accept = Some(contract::decide(&offer, accept)?);
    offer.updated_date = ctx.now;
    tx.update_offer(&offer).await?;

    if accept {
        let title = match tx.find_product(offer.product_id).await? {
            Some(product) => format!("Your contract offer for \"{}\" was accepted", product.title),
            None => "Your contract offer was accepted".to_string(),
        };
        notification::notify(
            tx,
            ctx,
            NewNotification {
                user_id: offer.offerer_id,
                kind: NotificationType::ContractOffer,
                title,
                content: None,
            },
        )
        .await?;
    }
    tracing::info!(offer_id = %id, accepted = accept, "Contract offer answered");
    Ok(offer)
}

/// Accept a pending offer; the offerer is notified.
///
/// # Errors
///
/// * [`ErrorCode::ContractOfferNotFound`]
/// * [`ErrorCode::NotOfferRecipient`] for anyone but the author
/// * [`ErrorCode::ContractOfferNotPending`]
pub async fn accept<S>(
    tx: &mut S,
    ctx: &ServiceContext,
    author: UserId,
    id: ContractOfferId,
) -> PlatformResult<ContractOffer>
where
    S: CatalogStore + ContractStore + NotificationStore,
{
    answer(tx, ctx, author, id, true).await
}

/// Reject a pending offer.
///
/// # Errors
///
/// See [`accept`].
pub async fn reject<S>(
    tx: &mut S,
    ctx: &ServiceContext,
    author: UserId,
    id: ContractOfferId,
) -> PlatformResult<ContractOffer>
where
    S: CatalogStore + ContractStore + NotificationStore,
{
    answer(tx, ctx, author, id, false).await
}

/// Offers received as an author.
///
/// # Errors
///
/// Storage failures.
pub async fn list_received<S: ContractStore>(
    tx: &mut S,
    author: UserId,
) -> PlatformResult<Vec<ContractOffer>> {
    Ok(tx.list_offers_for_author(author).await?)
}

/// Running promotions of a product.
///
/// # Errors
///
/// Storage failures.
pub async fn promotion_summary<S: PromotionStore>(
    tx: &mut S,
    product: ProductId,
) -> PlatformResult<PromotionSummary> {
    let direct = tx.list_direct_for_product(product).await?;
    let running_direct = |kind: DirectPromotionType| {
        direct
            .iter()
            .any(|p| p.kind == kind && p.status == DirectPromotionStatus::Ing)
    };
    let applied = applied::running_kinds(tx, product).await?;
    Ok(PromotionSummary {
        free_for_first: running_direct(DirectPromotionType::FreeForFirst),
        reader_of_prev: running_direct(DirectPromotionType::ReaderOfPrev),
        waiting_for_free: applied.contains(&AppliedPromotionType::WaitingForFree),
        six_nine_path: applied.contains(&AppliedPromotionType::SixNinePath),
    })
}

/// Offers sent as an offerer, with each product's genres, keywords and
/// running promotions.
///
/// # Errors
///
/// Storage failures.
pub async fn list_sent<S: CatalogStore + ContractStore + PromotionStore>(
    tx: &mut S,
    offerer: UserId,
) -> PlatformResult<Vec<SentOffer>> {
    let offers = tx.list_offers_by_offerer(offerer).await?;
    let mut sent = Vec::with_capacity(offers.len());
    for offer in offers {
        let product = tx.find_product(offer.product_id).await?;
        let promotions = promotion_summary(tx, offer.product_id).await?;
        let (title, primary_genre, sub_genre, keywords) = product.map_or_else(
            || (None, None, None, Vec::new()),
            |p| (Some(p.title), p.primary_genre, p.sub_genre, p.keywords),
        );
        sent.push(SentOffer {
            offer,
            title,
            primary_genre,
            sub_genre,
            keywords,
            promotions,
        });
    }
    Ok(sent)
}
