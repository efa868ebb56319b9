//! Read-side views joined from the component stores.
//!
//! Every auxiliary lookup is optional: a missing cover, genre or episode
//! leaves the field empty instead of failing the view.

use super::{ServiceContext, account, catalog, contract, giftbox, inventory, ledger, library, notification};
use serde::Serialize;
use std::collections::HashSet;
use webnovel_core::store::{
    AccountStore, CatalogStore, GiftStore, LedgerStore, LibraryStore, NotificationStore,
    PromotionStore, TicketStore,
};
use webnovel_core::types::{
    Episode, EpisodeId, InterestStatus, PriceType, Product, ProductId, ProductStatus, Profile,
    Rating, UserId,
};
use webnovel_core::{DateTime, ErrorCode, PlatformResult, Utc};

/// Hours after the last episode during which a product is flagged new.
pub const NEW_RELEASE_HOURS: i64 = 24;

/// Product page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductView {
    /// Product
    pub product_id: ProductId,
    /// Author
    pub author_id: UserId,
    /// Title
    pub title: String,
    /// Price type
    pub price_type: PriceType,
    /// Rating
    pub rating: Rating,
    /// Status
    pub status: ProductStatus,
    /// Cover image path
    pub cover_image_path: Option<String>,
    /// Primary genre
    pub primary_genre: Option<String>,
    /// Sub genre
    pub sub_genre: Option<String>,
    /// Keywords
    pub keywords: Vec<String>,
    /// First published episode
    pub first_episode_id: Option<EpisodeId>,
    /// Latest published episode
    pub latest_episode_id: Option<EpisodeId>,
    /// Number of the latest published episode
    pub latest_episode_no: Option<i32>,
    /// Published episodes
    pub total_open_episode_count: usize,
    /// Published episodes the viewer opened
    pub readed_episode_count: usize,
    /// Total episode opens
    pub count_hit: i64,
    /// Active bookmarks
    pub count_bookmark: i64,
    /// Episode recommends
    pub count_recommend: i64,
    /// Active reviews
    pub count_review: i64,
    /// Waiting-for-free is running
    #[serde(rename = "waitingForFreeYn", with = "webnovel_core::types::yn")]
    pub waiting_for_free: bool,
    /// 6-9-path is running
    #[serde(rename = "sixNinePathYn", with = "webnovel_core::types::yn")]
    pub six_nine_path: bool,
    /// An episode went out within the last day
    #[serde(rename = "newReleaseYn", with = "webnovel_core::types::yn")]
    pub new_release: bool,
    /// Any promotion is running
    #[serde(rename = "eventBadgeYn", with = "webnovel_core::types::yn")]
    pub event_badge: bool,
    /// The viewer is inside the interest window
    #[serde(rename = "interestBadgeYn", with = "webnovel_core::types::yn")]
    pub interest_badge: bool,
    /// Viewer's open free tickets usable on this product
    pub free_episode_ticket_count: usize,
    /// Viewer's interest classification
    pub interest_status: InterestStatus,
    /// End of the viewer's interest window
    pub interest_end_date: Option<DateTime<Utc>>,
    /// The viewer bookmarks this product
    #[serde(rename = "bookmarkYn", with = "webnovel_core::types::yn")]
    pub bookmarked: bool,
}

/// One row of the episode list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EpisodeItem {
    /// Episode
    #[serde(flatten)]
    pub episode: Episode,
    /// The viewer opened it before
    #[serde(rename = "readYn", with = "webnovel_core::types::yn")]
    pub read: bool,
    /// The viewer holds a permanent ticket for it
    #[serde(rename = "ownYn", with = "webnovel_core::types::yn")]
    pub owned: bool,
}

/// The caller's dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MySummary {
    /// User
    pub user_id: UserId,
    /// Cash balance
    pub balance: i64,
    /// Unused, unexpired tickets
    pub unused_ticket_count: usize,
    /// Gifts waiting in the gift box
    pub pending_gift_count: usize,
    /// Unread notifications
    pub unread_notification_count: i64,
    /// Active bookmarks
    pub bookmark_count: usize,
    /// Default profile
    pub profile: Option<Profile>,
}

fn published(episodes: Vec<Episode>, now: DateTime<Utc>) -> Vec<Episode> {
    episodes
        .into_iter()
        .filter(|e| e.is_published(now))
        .collect()
}

async fn read_episodes<S: LibraryStore>(
    tx: &mut S,
    viewer: Option<UserId>,
    product: ProductId,
) -> PlatformResult<HashSet<EpisodeId>> {
    Ok(match viewer {
        Some(viewer) => tx
            .list_usage(viewer, product)
            .await?
            .into_iter()
            .map(|u| u.episode_id)
            .collect(),
        None => HashSet::new(),
    })
}

fn is_new_release(product: &Product, now: DateTime<Utc>) -> bool {
    product
        .last_episode_date
        .is_some_and(|at| at <= now && now - at < chrono::Duration::hours(NEW_RELEASE_HOURS))
}

/// Product page for an optional viewer.
///
/// # Errors
///
/// [`webnovel_core::ErrorCode::ProductNotFound`].
pub async fn product_view<S>(
    tx: &mut S,
    ctx: &ServiceContext,
    product: ProductId,
    viewer: Option<UserId>,
) -> PlatformResult<ProductView>
where
    S: CatalogStore + LibraryStore + PromotionStore + TicketStore,
{
    let product = catalog::find_product(tx, product).await?;
    let episodes = published(catalog::list_episodes(tx, product.id).await?, ctx.now);
    let promotions = contract::promotion_summary(tx, product.id).await?;
    let read = read_episodes(tx, viewer, product.id).await?;

    let (interest, bookmarked, free_episode_ticket_count) = match viewer {
        Some(viewer) => (
            Some(library::interest(tx, ctx, viewer, product.id).await?),
            library::is_bookmarked(tx, viewer, product.id).await?,
            inventory::count_free(tx, ctx, viewer, product.id).await?,
        ),
        None => (None, false, 0),
    };
    let interest_status = interest.map_or(InterestStatus::None, |i| i.interest_status);

    Ok(ProductView {
        product_id: product.id,
        author_id: product.author_id,
        price_type: product.price_type,
        rating: product.rating,
        status: product.status,
        first_episode_id: episodes.first().map(|e| e.id),
        latest_episode_id: episodes.last().map(|e| e.id),
        latest_episode_no: episodes.last().map(|e| e.episode_no),
        total_open_episode_count: episodes.len(),
        readed_episode_count: episodes.iter().filter(|e| read.contains(&e.id)).count(),
        count_hit: product.count_hit,
        count_bookmark: product.count_bookmark,
        count_recommend: product.count_recommend,
        count_review: product.count_review,
        waiting_for_free: promotions.waiting_for_free,
        six_nine_path: promotions.six_nine_path,
        new_release: is_new_release(&product, ctx.now),
        event_badge: promotions.free_for_first
            || promotions.reader_of_prev
            || promotions.waiting_for_free
            || promotions.six_nine_path,
        interest_badge: matches!(
            interest_status,
            InterestStatus::Active | InterestStatus::DropSoon
        ),
        free_episode_ticket_count,
        interest_status,
        interest_end_date: interest.and_then(|i| i.interest_end_date),
        bookmarked,
        title: product.title,
        cover_image_path: product.cover_image_path,
        primary_genre: product.primary_genre,
        sub_genre: product.sub_genre,
        keywords: product.keywords,
    })
}

/// Published episodes in order, with the viewer's read and ownership marks.
///
/// # Errors
///
/// [`webnovel_core::ErrorCode::ProductNotFound`].
pub async fn episode_list<S>(
    tx: &mut S,
    ctx: &ServiceContext,
    product: ProductId,
    viewer: Option<UserId>,
) -> PlatformResult<Vec<EpisodeItem>>
where
    S: CatalogStore + LibraryStore + TicketStore,
{
    let product = catalog::find_product(tx, product).await?;
    let episodes = published(catalog::list_episodes(tx, product.id).await?, ctx.now);
    let read = read_episodes(tx, viewer, product.id).await?;

    let mut items = Vec::with_capacity(episodes.len());
    for episode in episodes {
        let owned = match viewer {
            Some(viewer) => inventory::owns_episode(tx, viewer, episode.id).await?,
            None => false,
        };
        items.push(EpisodeItem {
            read: read.contains(&episode.id),
            owned,
            episode,
        });
    }
    Ok(items)
}

/// Balance, ticket, gift, notification and bookmark counts of the caller.
///
/// # Errors
///
/// [`ErrorCode::UserNotFound`]; storage failures while loading the default
/// profile propagate.
pub async fn my_summary<S>(
    tx: &mut S,
    ctx: &ServiceContext,
    user: UserId,
) -> PlatformResult<MySummary>
where
    S: AccountStore
        + GiftStore
        + LedgerStore
        + LibraryStore
        + NotificationStore
        + PromotionStore
        + TicketStore,
{
    account::find_user(tx, user).await?;
    let profile = match account::default_profile(tx, user).await {
        Ok(profile) => Some(profile),
        Err(error) if error.is(ErrorCode::ProfileNotFound) => None,
        Err(error) => return Err(error),
    };
    Ok(MySummary {
        user_id: user,
        balance: ledger::balance(tx, user).await?,
        unused_ticket_count: inventory::count_unused(tx, ctx, user).await?,
        pending_gift_count: giftbox::count_claimable(tx, ctx, user).await?,
        unread_notification_count: notification::count_unread(tx, user).await?,
        bookmark_count: library::list_bookmarks(tx, user).await?.len(),
        profile,
    })
}
