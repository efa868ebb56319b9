use super::StoreResult;
use crate::types::{
    Block, Comment, CommentId, ContentRef, EpisodeId, NewComment, NewReport, NewReview,
    ProductId, Reaction, Report, Review, ReviewId, UserId,
};
use chrono::{DateTime, Utc};
use std::future::Future;

/// Comments, reviews, reactions, blocks and reports.
pub trait EngagementStore {
    /// Insert a comment or reply.
    fn insert_comment(
        &mut self,
        comment: NewComment,
        now: DateTime<Utc>,
    ) -> impl Future<Output = StoreResult<Comment>> + Send;

    /// Comment by key, including soft-deleted rows.
    fn find_comment(
        &mut self,
        id: CommentId,
    ) -> impl Future<Output = StoreResult<Option<Comment>>> + Send;

    /// Overwrite pin, live flag and counters.
    fn update_comment(&mut self, comment: &Comment)
    -> impl Future<Output = StoreResult<()>> + Send;

    /// Live comments and replies of an episode, oldest first.
    fn list_comments(
        &mut self,
        episode: EpisodeId,
    ) -> impl Future<Output = StoreResult<Vec<Comment>>> + Send;

    /// Live comments (replies included) of an episode.
    fn count_active_comments(
        &mut self,
        episode: EpisodeId,
    ) -> impl Future<Output = StoreResult<i64>> + Send;

    /// Live replies under a comment.
    fn count_active_replies(
        &mut self,
        parent: CommentId,
    ) -> impl Future<Output = StoreResult<i64>> + Send;

    /// Insert a review.
    fn insert_review(
        &mut self,
        review: NewReview,
        now: DateTime<Utc>,
    ) -> impl Future<Output = StoreResult<Review>> + Send;

    /// Review by key, including soft-deleted rows.
    fn find_review(
        &mut self,
        id: ReviewId,
    ) -> impl Future<Output = StoreResult<Option<Review>>> + Send;

    /// Overwrite pin, live flag and counters.
    fn update_review(&mut self, review: &Review) -> impl Future<Output = StoreResult<()>> + Send;

    /// Live reviews of a product, oldest first.
    fn list_reviews(
        &mut self,
        product: ProductId,
    ) -> impl Future<Output = StoreResult<Vec<Review>>> + Send;

    /// Live reviews of a product.
    fn count_active_reviews(
        &mut self,
        product: ProductId,
    ) -> impl Future<Output = StoreResult<i64>> + Send;

    /// Reaction row of a user on a target.
    fn find_reaction(
        &mut self,
        user: UserId,
        target: ContentRef,
    ) -> impl Future<Output = StoreResult<Option<Reaction>>> + Send;

    /// Upsert on (user, target).
    fn save_reaction(&mut self, reaction: &Reaction)
    -> impl Future<Output = StoreResult<()>> + Send;

    /// `(recommends, not_recommends)` over live reaction rows of a target.
    fn count_reactions(
        &mut self,
        target: ContentRef,
    ) -> impl Future<Output = StoreResult<(i64, i64)>> + Send;

    /// Block row of a viewer on a target.
    fn find_block(
        &mut self,
        user: UserId,
        target: ContentRef,
    ) -> impl Future<Output = StoreResult<Option<Block>>> + Send;

    /// Upsert on (user, target).
    fn save_block(&mut self, block: &Block) -> impl Future<Output = StoreResult<()>> + Send;

    /// Blocks in force for a viewer.
    fn list_active_blocks(
        &mut self,
        user: UserId,
    ) -> impl Future<Output = StoreResult<Vec<Block>>> + Send;

    /// Existing report of a user on a target.
    fn find_report(
        &mut self,
        user: UserId,
        target: ContentRef,
    ) -> impl Future<Output = StoreResult<Option<Report>>> + Send;

    /// Append a report.
    fn insert_report(
        &mut self,
        report: NewReport,
        now: DateTime<Utc>,
    ) -> impl Future<Output = StoreResult<Report>> + Send;
}
