//! Comments, reviews and the reactions, pins, blocks and reports on them.
//!
//! Every write recomputes the affected denormalized counters from the child
//! rows before returning: `episode.count_comment`, `comment.count_reply`,
//! `product.count_review`, and the recommend pair on the reacted content.

use super::{ServiceContext, account, catalog, notification};
use serde::Serialize;
use std::collections::HashSet;
use webnovel_core::rules::catalog::validate_content;
use webnovel_core::rules::reaction::ReactionFlags;
use webnovel_core::store::{AccountStore, CatalogStore, EngagementStore, NotificationStore};
use webnovel_core::types::{
    Block, Comment, CommentId, ContentRef, EpisodeCounter, EpisodeId, NewComment,
    NewNotification, NewReport, NewReview, NotificationType, ProductCounter, ProductId, ProfileId,
    Reaction, ReactionKind, Report, Review, ReviewId, UserId,
};
use webnovel_core::{ErrorCode, PlatformResult};

/// Reaction state after a toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReactionState {
    /// Reacted content
    #[serde(flatten)]
    pub target: ContentRef,
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

/// Pin state after a toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PinState {
    /// Pinned content
    #[serde(flatten)]
    pub target: ContentRef,
    /// Whether it is now pinned
    #[serde(rename = "displayTopYn", with = "webnovel_core::types::yn")]
    pub display_top: bool,
}

/// Block state after a toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockState {
    /// Blocked content
    #[serde(flatten)]
    pub target: ContentRef,
    /// Whether the block is in force
    #[serde(rename = "blockYn", with = "webnovel_core::types::yn")]
    pub blocked: bool,
}

/// A live comment or review.
enum Content {
    Comment(Comment),
    Review(Review),
}

impl Content {
    const fn writer(&self) -> UserId {
        match self {
            Self::Comment(c) => c.user_id,
            Self::Review(r) => r.user_id,
        }
    }

    const fn product_id(&self) -> ProductId {
        match self {
            Self::Comment(c) => c.product_id,
            Self::Review(r) => r.product_id,
        }
    }
}

async fn live_comment<S: EngagementStore>(tx: &mut S, id: CommentId) -> PlatformResult<Comment> {
    tx.find_comment(id)
        .await?
        .filter(|c| c.active)
        .ok_or_else(|| ErrorCode::CommentNotFound.into())
}

async fn live_review<S: EngagementStore>(tx: &mut S, id: ReviewId) -> PlatformResult<Review> {
    tx.find_review(id)
        .await?
        .filter(|r| r.active)
        .ok_or_else(|| ErrorCode::ReviewNotFound.into())
}

async fn load<S: EngagementStore>(tx: &mut S, target: ContentRef) -> PlatformResult<Content> {
    Ok(match target {
        ContentRef::Comment(id) => Content::Comment(live_comment(tx, id).await?),
        ContentRef::Review(id) => Content::Review(live_review(tx, id).await?),
    })
}

async fn writing_profile<S: AccountStore>(
    tx: &mut S,
    user: UserId,
    profile: Option<ProfileId>,
) -> PlatformResult<ProfileId> {
    Ok(match profile {
        Some(id) => account::owned_profile(tx, user, id).await?.id,
        None => account::default_profile(tx, user).await?.id,
    })
}

async fn reconcile_comment_counters<S: CatalogStore + EngagementStore>(
    tx: &mut S,
    episode: EpisodeId,
    parent: Option<CommentId>,
) -> PlatformResult<()> {
    let comments = tx.count_active_comments(episode).await?;
    tx.set_episode_counter(episode, EpisodeCounter::Comment, comments)
        .await?;
    if let Some(parent_id) = parent {
        if let Some(mut parent) = tx.find_comment(parent_id).await? {
            parent.count_reply = tx.count_active_replies(parent_id).await?;
            tx.update_comment(&parent).await?;
        }
    }
    Ok(())
}

/// Comment on an episode, or reply to a top-level comment.
///
/// A comment notifies the product's author; a reply notifies the parent's
/// writer. Nobody is notified about their own activity.
///
/// # Errors
///
/// * [`ErrorCode::InvalidContent`] for blank or oversized text
/// * [`ErrorCode::EpisodeNotFound`], [`ErrorCode::CommentNotFound`]
/// * [`ErrorCode::InvalidInput`] when replying to a reply or across episodes
pub async fn create_comment<S>(
    tx: &mut S,
    ctx: &ServiceContext,
    user: UserId,
    profile: Option<ProfileId>,
    episode: EpisodeId,
    parent: Option<CommentId>,
    content: &str,
) -> PlatformResult<Comment>
where
    S: AccountStore + CatalogStore + EngagementStore + NotificationStore,
{
    let content = validate_content(content)?;
    let episode = catalog::find_episode(tx, episode).await?;
    if !episode.is_published(ctx.now) {
        return Err(ErrorCode::EpisodeNotFound.into());
    }
    let product = catalog::find_product(tx, episode.product_id).await?;
    let parent = match parent {
        Some(id) => {
            let parent = live_comment(tx, id).await?;
            if parent.parent_id.is_some() || parent.episode_id != episode.id {
                return Err(ErrorCode::InvalidInput.into());
            }
            Some(parent)
        }
        None => None,
    };
    let profile_id = writing_profile(tx, user, profile).await?;

    let comment = tx
        .insert_comment(
            NewComment {
                product_id: product.id,
                episode_id: episode.id,
                user_id: user,
                profile_id,
                parent_id: parent.as_ref().map(|p| p.id),
                content,
            },
            ctx.now,
        )
        .await?;
    reconcile_comment_counters(tx, episode.id, comment.parent_id).await?;

    let (recipient, title) = match &parent {
        Some(parent) => (parent.user_id, "Someone replied to your comment".to_string()),
        None => (
            product.author_id,
            format!("New comment on \"{}\" episode {}", product.title, episode.episode_no),
        ),
    };
    if recipient != user {
        notification::notify(
            tx,
            ctx,
            NewNotification {
                user_id: recipient,
                kind: NotificationType::Comment,
                title,
                content: Some(comment.content.clone()),
            },
        )
        .await?;
    }
    tracing::debug!(user_id = %user, comment_id = %comment.id, episode_id = %episode.id, "Comment created");
    Ok(comment)
}

/// Soft-delete one's own comment.
///
/// # Errors
///
/// * [`ErrorCode::CommentNotFound`]
/// * [`ErrorCode::NotResourceOwner`]
pub async fn delete_comment<S: CatalogStore + EngagementStore>(
    tx: &mut S,
    user: UserId,
    id: CommentId,
) -> PlatformResult<()> {
    let mut comment = live_comment(tx, id).await?;
    if comment.user_id != user {
        return Err(ErrorCode::NotResourceOwner.into());
    }
    comment.active = false;
    tx.update_comment(&comment).await?;
    reconcile_comment_counters(tx, comment.episode_id, comment.parent_id).await
}

/// Blocks of `viewer` currently in force.
async fn hidden_for<S: EngagementStore>(
    tx: &mut S,
    viewer: Option<UserId>,
) -> PlatformResult<HashSet<(ContentRef, UserId)>> {
    Ok(match viewer {
        Some(viewer) => tx
            .list_active_blocks(viewer)
            .await?
            .into_iter()
            .map(|b| (b.target, b.target_user_id))
            .collect(),
        None => HashSet::new(),
    })
}

/// Live comments of an episode, pinned first, without those the viewer
/// blocked (a blocked comment hides its replies too).
///
/// # Errors
///
/// Storage failures.
pub async fn list_comments<S: EngagementStore>(
    tx: &mut S,
    viewer: Option<UserId>,
    episode: EpisodeId,
) -> PlatformResult<Vec<Comment>> {
    let hidden = hidden_for(tx, viewer).await?;
    let comments = tx.list_comments(episode).await?;
    let blocked: HashSet<CommentId> = comments
        .iter()
        .filter(|c| hidden.contains(&(ContentRef::Comment(c.id), c.user_id)))
        .map(|c| c.id)
        .collect();
    let mut visible: Vec<Comment> = comments
        .into_iter()
        .filter(|c| !blocked.contains(&c.id) && c.parent_id.is_none_or(|p| !blocked.contains(&p)))
        .collect();
    visible.sort_by_key(|c| (!c.display_top, c.created_date, c.id));
    Ok(visible)
}

/// Review a product.
///
/// # Errors
///
/// * [`ErrorCode::InvalidContent`]
/// * [`ErrorCode::ProductNotFound`]
pub async fn create_review<S>(
    tx: &mut S,
    ctx: &ServiceContext,
    user: UserId,
    profile: Option<ProfileId>,
    product: ProductId,
    content: &str,
) -> PlatformResult<Review>
where
    S: AccountStore + CatalogStore + EngagementStore,
{
    let content = validate_content(content)?;
    let product = catalog::find_product(tx, product).await?;
    let profile_id = writing_profile(tx, user, profile).await?;
    let review = tx
        .insert_review(
            NewReview {
                product_id: product.id,
                user_id: user,
                profile_id,
                content,
            },
            ctx.now,
        )
        .await?;
    let reviews = tx.count_active_reviews(product.id).await?;
    tx.set_product_counter(product.id, ProductCounter::Review, reviews)
        .await?;
    tracing::debug!(user_id = %user, review_id = %review.id, product_id = %product.id, "Review created");
    Ok(review)
}

/// Soft-delete one's own review.
///
/// # Errors
///
/// * [`ErrorCode::ReviewNotFound`]
/// * [`ErrorCode::NotResourceOwner`]
pub async fn delete_review<S: CatalogStore + EngagementStore>(
    tx: &mut S,
    user: UserId,
    id: ReviewId,
) -> PlatformResult<()> {
    let mut review = live_review(tx, id).await?;
    if review.user_id != user {
        return Err(ErrorCode::NotResourceOwner.into());
    }
    review.active = false;
    tx.update_review(&review).await?;
    let reviews = tx.count_active_reviews(review.product_id).await?;
    tx.set_product_counter(review.product_id, ProductCounter::Review, reviews)
        .await?;
    Ok(())
}

/// Live reviews of a product, pinned first, without those the viewer
/// blocked.
///
/// # Errors
///
/// Storage failures.
pub async fn list_reviews<S: EngagementStore>(
    tx: &mut S,
    viewer: Option<UserId>,
    product: ProductId,
) -> PlatformResult<Vec<Review>> {
    let hidden = hidden_for(tx, viewer).await?;
    let mut visible: Vec<Review> = tx
        .list_reviews(product)
        .await?
        .into_iter()
        .filter(|r| !hidden.contains(&(ContentRef::Review(r.id), r.user_id)))
        .collect();
    visible.sort_by_key(|r| (!r.display_top, r.created_date, r.id));
    Ok(visible)
}

/// Toggle recommend / not-recommend on a comment or review.
///
/// # Errors
///
/// [`ErrorCode::CommentNotFound`], [`ErrorCode::ReviewNotFound`].
pub async fn react<S: EngagementStore>(
    tx: &mut S,
    user: UserId,
    target: ContentRef,
    kind: ReactionKind,
) -> PlatformResult<ReactionState> {
    let content = load(tx, target).await?;
    let current = tx
        .find_reaction(user, target)
        .await?
        .filter(|r| r.active)
        .map_or(ReactionFlags::NEUTRAL, |r| ReactionFlags {
            recommend: r.recommend,
            not_recommend: r.not_recommend,
        });
    let flags = current.toggle(kind);
    tx.save_reaction(&Reaction {
        user_id: user,
        target,
        recommend: flags.recommend,
        not_recommend: flags.not_recommend,
        active: true,
    })
    .await?;

    let (count_recommend, count_not_recommend) = tx.count_reactions(target).await?;
    match content {
        Content::Comment(mut comment) => {
            comment.count_recommend = count_recommend;
            comment.count_not_recommend = count_not_recommend;
            tx.update_comment(&comment).await?;
        }
        Content::Review(mut review) => {
            review.count_recommend = count_recommend;
            review.count_not_recommend = count_not_recommend;
            tx.update_review(&review).await?;
        }
    }

    Ok(ReactionState {
        target,
        count_recommend,
        count_not_recommend,
        recommend: flags.recommend,
        not_recommend: flags.not_recommend,
    })
}

/// Toggle the author pin on a comment or review of one's own product.
///
/// # Errors
///
/// * [`ErrorCode::CommentNotFound`], [`ErrorCode::ReviewNotFound`]
/// * [`ErrorCode::NotProductAuthor`]
pub async fn toggle_pin<S: CatalogStore + EngagementStore>(
    tx: &mut S,
    user: UserId,
    target: ContentRef,
) -> PlatformResult<PinState> {
    let content = load(tx, target).await?;
    catalog::authored_product(tx, user, content.product_id()).await?;
    let display_top = match content {
        Content::Comment(mut comment) => {
            comment.display_top = !comment.display_top;
            tx.update_comment(&comment).await?;
            comment.display_top
        }
        Content::Review(mut review) => {
            review.display_top = !review.display_top;
            tx.update_review(&review).await?;
            review.display_top
        }
    };
    Ok(PinState {
        target,
        display_top,
    })
}

/// Toggle a viewer-side block of someone else's comment or review.
///
/// # Errors
///
/// * [`ErrorCode::CommentNotFound`], [`ErrorCode::ReviewNotFound`]
/// * [`ErrorCode::CannotBlockOwnContent`]
pub async fn toggle_block<S: EngagementStore>(
    tx: &mut S,
    user: UserId,
    target: ContentRef,
) -> PlatformResult<BlockState> {
    let writer = load(tx, target).await?.writer();
    if writer == user {
        return Err(ErrorCode::CannotBlockOwnContent.into());
    }
    let block = match tx.find_block(user, target).await? {
        Some(mut existing) => {
            existing.off = !existing.off;
            existing
        }
        None => Block {
            user_id: user,
            target,
            target_user_id: writer,
            off: true,
        },
    };
    tx.save_block(&block).await?;
    Ok(BlockState {
        target,
        blocked: block.off,
    })
}

/// Report someone else's comment or review, once per target.
///
/// # Errors
///
/// * [`ErrorCode::CommentNotFound`], [`ErrorCode::ReviewNotFound`]
/// * [`ErrorCode::CannotReportOwnContent`]
/// * [`ErrorCode::AlreadyReported`]
/// * [`ErrorCode::InvalidContent`] for a blank reason
pub async fn report<S: EngagementStore>(
    tx: &mut S,
    ctx: &ServiceContext,
    user: UserId,
    target: ContentRef,
    reason: &str,
) -> PlatformResult<Report> {
    let reason = validate_content(reason)?;
    if load(tx, target).await?.writer() == user {
        return Err(ErrorCode::CannotReportOwnContent.into());
    }
    if tx.find_report(user, target).await?.is_some() {
        return Err(ErrorCode::AlreadyReported.into());
    }
    let report = tx
        .insert_report(
            NewReport {
                user_id: user,
                target,
                reason,
            },
            ctx.now,
        )
        .await?;
    tracing::warn!(user_id = %user, target = target.kind(), target_id = target.raw_id(), "Content reported");
    Ok(report)
}
