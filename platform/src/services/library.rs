//! Bookmarks, reading usage, interest decay and the recent list.
//!
//! Counters touched here (`product.count_bookmark`, episode and product
//! recommend counts) are recomputed from their child rows after every write,
//! inside the caller's transaction.

use super::{ServiceContext, catalog};
use serde::Serialize;
use webnovel_core::rules::interest;
use webnovel_core::rules::reaction::ReactionFlags;
use webnovel_core::store::{CatalogStore, LibraryStore};
use webnovel_core::types::{
    Bookmark, Episode, EpisodeCounter, EpisodeId, InterestStatus, ProductCounter, ProductId,
    ReactionKind, Recent, Usage, UserId,
};
use webnovel_core::{DateTime, ErrorCode, PlatformResult, Utc};

/// Bookmark state after a toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookmarkState {
    /// Product
    pub product_id: ProductId,
    /// Reconciled active bookmark count
    pub bookmark_count: i64,
    /// Whether the caller now bookmarks it
    #[serde(rename = "bookmarkYn", with = "webnovel_core::types::yn")]
    pub bookmarked: bool,
}

/// A user's interest in a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Interest {
    /// Product
    pub product_id: ProductId,
    /// Classification
    pub interest_status: InterestStatus,
    /// End of the window, when the user ever read it
    pub interest_end_date: Option<DateTime<Utc>>,
}

/// Episode reaction state after a toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EpisodeReaction {
    /// Episode
    pub episode_id: EpisodeId,
    /// Reconciled recommend count
    pub count_recommend: i64,
    /// Reconciled not-recommend count
    pub count_not_recommend: i64,
    /// Caller's recommend flag
    #[serde(rename = "recommendYn", with = "webnovel_core::types::yn")]
    pub recommend: bool,
    /// Caller's not-recommend flag
    #[serde(rename = "notRecommendYn", with = "webnovel_core::types::yn")]
    pub not_recommend: bool,
}

/// Flip the caller's bookmark on a product.
///
/// At most one active bookmark row exists per user and product.
///
/// # Errors
///
/// [`ErrorCode::ProductNotFound`].
pub async fn toggle_bookmark<S: CatalogStore + LibraryStore>(
    tx: &mut S,
    ctx: &ServiceContext,
    user: UserId,
    product: ProductId,
) -> PlatformResult<BookmarkState> {
    catalog::find_product(tx, product).await?;
    let bookmark = match tx.find_bookmark(user, product).await? {
        Some(mut existing) => {
            existing.active = !existing.active;
            existing.updated_date = ctx.now;
            existing
        }
        None => Bookmark {
            user_id: user,
            product_id: product,
            active: true,
            created_date: ctx.now,
            updated_date: ctx.now,
        },
    };
    tx.save_bookmark(&bookmark).await?;

    let bookmark_count = tx.count_active_bookmarks(product).await?;
    tx.set_product_counter(product, ProductCounter::Bookmark, bookmark_count)
        .await?;
    tracing::debug!(user_id = %user, product_id = %product, bookmarked = bookmark.active, "Bookmark toggled");
    Ok(BookmarkState {
        product_id: product,
        bookmark_count,
        bookmarked: bookmark.active,
    })
}

/// Active bookmarks of a user.
///
/// # Errors
///
/// Storage failures.
pub async fn list_bookmarks<S: LibraryStore>(
    tx: &mut S,
    user: UserId,
) -> PlatformResult<Vec<Bookmark>> {
    Ok(tx
        .list_bookmarks(user)
        .await?
        .into_iter()
        .filter(|b| b.active)
        .collect())
}

/// Whether the user currently bookmarks `product`.
///
/// # Errors
///
/// Storage failures.
pub async fn is_bookmarked<S: LibraryStore>(
    tx: &mut S,
    user: UserId,
    product: ProductId,
) -> PlatformResult<bool> {
    Ok(tx
        .find_bookmark(user, product)
        .await?
        .is_some_and(|b| b.active))
}

/// Record an episode open: upsert the usage row and move the product to the
/// front of the recent list.
///
/// # Errors
///
/// Storage failures.
pub async fn record_open<S: LibraryStore>(
    tx: &mut S,
    ctx: &ServiceContext,
    user: UserId,
    episode: &Episode,
) -> PlatformResult<Usage> {
    let usage = match tx.find_usage(user, episode.id).await? {
        Some(mut existing) => {
            existing.updated_date = ctx.now;
            existing
        }
        None => Usage {
            user_id: user,
            product_id: episode.product_id,
            episode_id: episode.id,
            recommend: false,
            not_recommend: false,
            created_date: ctx.now,
            updated_date: ctx.now,
        },
    };
    tx.save_usage(&usage).await?;
    tx.save_recent(&Recent {
        user_id: user,
        product_id: episode.product_id,
        episode_id: Some(episode.id),
        active: true,
        updated_date: ctx.now,
    })
    .await?;
    Ok(usage)
}

/// Latest usage of a product by a user.
async fn last_read<S: LibraryStore>(
    tx: &mut S,
    user: UserId,
    product: ProductId,
) -> PlatformResult<Option<DateTime<Utc>>> {
    Ok(tx
        .list_usage(user, product)
        .await?
        .iter()
        .map(|u| u.updated_date)
        .max())
}

/// Current interest classification.
///
/// # Errors
///
/// Storage failures.
pub async fn interest<S: LibraryStore>(
    tx: &mut S,
    ctx: &ServiceContext,
    user: UserId,
    product: ProductId,
) -> PlatformResult<Interest> {
    let last = last_read(tx, user, product).await?;
    Ok(Interest {
        product_id: product,
        interest_status: interest::interest_status(last, ctx.now),
        interest_end_date: last.map(interest::interest_end_date),
    })
}

/// Restart the interest window from now.
///
/// Without prior usage nothing is written and the current status is returned.
///
/// # Errors
///
/// [`ErrorCode::ProductNotFound`].
pub async fn revive<S: CatalogStore + LibraryStore>(
    tx: &mut S,
    ctx: &ServiceContext,
    user: UserId,
    product: ProductId,
) -> PlatformResult<Interest> {
    catalog::find_product(tx, product).await?;
    let touched = tx.touch_usage(user, product, ctx.now).await?;
    tracing::debug!(user_id = %user, product_id = %product, touched, "Interest revived");
    interest(tx, ctx, user, product).await
}

/// Recent list, most recent first.
///
/// # Errors
///
/// Storage failures.
pub async fn list_recent<S: LibraryStore>(tx: &mut S, user: UserId) -> PlatformResult<Vec<Recent>> {
    Ok(tx.list_recent(user).await?)
}

/// Soft-delete a product from the recent list.
///
/// # Errors
///
/// [`ErrorCode::ProductNotFound`] when the product is not in the list.
pub async fn delete_recent<S: LibraryStore>(
    tx: &mut S,
    ctx: &ServiceContext,
    user: UserId,
    product: ProductId,
) -> PlatformResult<()> {
    let mut recent = tx
        .find_recent(user, product)
        .await?
        .filter(|r| r.active)
        .ok_or(ErrorCode::ProductNotFound)?;
    recent.active = false;
    recent.updated_date = ctx.now;
    tx.save_recent(&recent).await?;
    Ok(())
}

/// Toggle the caller's recommend / not-recommend flag on an episode they
/// have opened.
///
/// # Errors
///
/// * [`ErrorCode::EpisodeNotFound`]
/// * [`ErrorCode::NoUsableTicket`] when the caller never opened the episode
pub async fn react_episode<S: CatalogStore + LibraryStore>(
    tx: &mut S,
    user: UserId,
    episode: EpisodeId,
    kind: ReactionKind,
) -> PlatformResult<EpisodeReaction> {
    let found = catalog::find_episode(tx, episode).await?;
    let mut usage = tx
        .find_usage(user, episode)
        .await?
        .ok_or(ErrorCode::NoUsableTicket)?;
    let flags = ReactionFlags {
        recommend: usage.recommend,
        not_recommend: usage.not_recommend,
    }
    .toggle(kind);
    usage.recommend = flags.recommend;
    usage.not_recommend = flags.not_recommend;
    tx.save_usage(&usage).await?;

    let (count_recommend, count_not_recommend) = tx.count_episode_reactions(episode).await?;
    tx.set_episode_counter(episode, EpisodeCounter::Recommend, count_recommend)
        .await?;
    tx.set_episode_counter(episode, EpisodeCounter::NotRecommend, count_not_recommend)
        .await?;
    let product_recommends = tx.count_product_recommends(found.product_id).await?;
    tx.set_product_counter(found.product_id, ProductCounter::Recommend, product_recommends)
        .await?;

    Ok(EpisodeReaction {
        episode_id: episode,
        count_recommend,
        count_not_recommend,
        recommend: flags.recommend,
        not_recommend: flags.not_recommend,
    })
}
