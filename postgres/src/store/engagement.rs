use crate::PostgresTransaction;
use crate::error::map_sqlx_error;
use crate::rows::{self, COMMENT_COLUMNS, REVIEW_COLUMNS};
use chrono::{DateTime, Utc};
use sqlx::Row;
use webnovel_core::store::{EngagementStore, StoreResult};
use webnovel_core::types::{
    Block, Comment, CommentId, ContentRef, EpisodeId, NewComment, NewReport, NewReview,
    ProductId, Reaction, Report, Review, ReviewId, UserId, yn,
};

impl PostgresTransaction {
    async fn count(&mut self, sql: &str, key: i64) -> StoreResult<i64> {
        let row = sqlx::query(sql)
            .bind(key)
            .fetch_one(&mut *self.tx)
            .await
            .map_err(map_sqlx_error)?;
        row.try_get("n").map_err(map_sqlx_error)
    }
}

impl EngagementStore for PostgresTransaction {
    async fn insert_comment(&mut self, comment: NewComment, now: DateTime<Utc>) -> StoreResult<Comment> {
        let row = sqlx::query(&format!(
            "INSERT INTO comments (product_id, episode_id, user_id, profile_id, parent_comment_id,
                                   content, created_date)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {COMMENT_COLUMNS}"
        ))
        .bind(comment.product_id.get())
        .bind(comment.episode_id.get())
        .bind(comment.user_id.get())
        .bind(comment.profile_id.get())
        .bind(comment.parent_id.map(CommentId::get))
        .bind(&comment.content)
        .bind(now)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;
        rows::comment(&row)
    }

    async fn find_comment(&mut self, id: CommentId) -> StoreResult<Option<Comment>> {
        let row = sqlx::query(&format!("SELECT {COMMENT_COLUMNS} FROM comments WHERE id = $1"))
            .bind(id.get())
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(map_sqlx_error)?;
        rows::optional(row.as_ref(), rows::comment)
    }

    async fn update_comment(&mut self, comment: &Comment) -> StoreResult<()> {
        sqlx::query(
            "UPDATE comments
             SET display_top_yn = $2, use_yn = $3, count_recommend = $4,
                 count_not_recommend = $5, count_reply = $6
             WHERE id = $1",
        )
        .bind(comment.id.get())
        .bind(yn::to_str(comment.display_top))
        .bind(yn::to_str(comment.active))
        .bind(comment.count_recommend)
        .bind(comment.count_not_recommend)
        .bind(comment.count_reply)
        .execute(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;
        Ok(())
    }

    async fn list_comments(&mut self, episode: EpisodeId) -> StoreResult<Vec<Comment>> {
        let found = sqlx::query(&format!(
            "SELECT {COMMENT_COLUMNS} FROM comments
             WHERE episode_id = $1 AND use_yn = 'Y'
             ORDER BY created_date, id"
        ))
        .bind(episode.get())
        .fetch_all(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;
        rows::all(&found, rows::comment)
    }

    async fn count_active_comments(&mut self, episode: EpisodeId) -> StoreResult<i64> {
        self.count(
            "SELECT COUNT(*) AS n FROM comments WHERE episode_id = $1 AND use_yn = 'Y'",
            episode.get(),
        )
        .await
    }

    async fn count_active_replies(&mut self, parent: CommentId) -> StoreResult<i64> {
        self.count(
            "SELECT COUNT(*) AS n FROM comments WHERE parent_comment_id = $1 AND use_yn = 'Y'",
            parent.get(),
        )
        .await
    }

    async fn insert_review(&mut self, review: NewReview, now: DateTime<Utc>) -> StoreResult<Review> {
        let row = sqlx::query(&format!(
            "INSERT INTO reviews (product_id, user_id, profile_id, content, created_date)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {REVIEW_COLUMNS}"
        ))
        .bind(review.product_id.get())
        .bind(review.user_id.get())
        .bind(review.profile_id.get())
        .bind(&review.content)
        .bind(now)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;
        rows::review(&row)
    }

    async fn find_review(&mut self, id: ReviewId) -> StoreResult<Option<Review>> {
        let row = sqlx::query(&format!("SELECT {REVIEW_COLUMNS} FROM reviews WHERE id = $1"))
            .bind(id.get())
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(map_sqlx_error)?;
        rows::optional(row.as_ref(), rows::review)
    }

    async fn update_review(&mut self, review: &Review) -> StoreResult<()> {
        sqlx::query(
            "UPDATE reviews
             SET display_top_yn = $2, use_yn = $3, count_recommend = $4, count_not_recommend = $5
             WHERE id = $1",
        )
        .bind(review.id.get())
        .bind(yn::to_str(review.display_top))
        .bind(yn::to_str(review.active))
        .bind(review.count_recommend)
        .bind(review.count_not_recommend)
        .execute(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;
        Ok(())
    }

    async fn list_reviews(&mut self, product: ProductId) -> StoreResult<Vec<Review>> {
        let found = sqlx::query(&format!(
            "SELECT {REVIEW_COLUMNS} FROM reviews
             WHERE product_id = $1 AND use_yn = 'Y'
             ORDER BY created_date, id"
        ))
        .bind(product.get())
        .fetch_all(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;
        rows::all(&found, rows::review)
    }

    async fn count_active_reviews(&mut self, product: ProductId) -> StoreResult<i64> {
        self.count(
            "SELECT COUNT(*) AS n FROM reviews WHERE product_id = $1 AND use_yn = 'Y'",
            product.get(),
        )
        .await
    }

    async fn find_reaction(
        &mut self,
        user: UserId,
        target: ContentRef,
    ) -> StoreResult<Option<Reaction>> {
        let row = sqlx::query(
            "SELECT user_id, target_type, target_id, recommend_yn, not_recommend_yn, use_yn
             FROM reactions
             WHERE user_id = $1 AND target_type = $2 AND target_id = $3",
        )
        .bind(user.get())
        .bind(target.kind())
        .bind(target.raw_id())
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;
        rows::optional(row.as_ref(), rows::reaction)
    }

    async fn save_reaction(&mut self, reaction: &Reaction) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO reactions (user_id, target_type, target_id, recommend_yn,
                                    not_recommend_yn, use_yn)
             VALUES ($1, $2, $3, $4, $5, $6)
             ON CONFLICT (user_id, target_type, target_id)
             DO UPDATE SET recommend_yn = EXCLUDED.recommend_yn,
                           not_recommend_yn = EXCLUDED.not_recommend_yn,
                           use_yn = EXCLUDED.use_yn",
        )
        .bind(reaction.user_id.get())
        .bind(reaction.target.kind())
        .bind(reaction.target.raw_id())
        .bind(yn::to_str(reaction.recommend))
        .bind(yn::to_str(reaction.not_recommend))
        .bind(yn::to_str(reaction.active))
        .execute(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;
        Ok(())
    }

    async fn count_reactions(&mut self, target: ContentRef) -> StoreResult<(i64, i64)> {
        let row = sqlx::query(
            "SELECT COUNT(*) FILTER (WHERE recommend_yn = 'Y') AS recommends,
                    COUNT(*) FILTER (WHERE not_recommend_yn = 'Y') AS not_recommends
             FROM reactions
             WHERE target_type = $1 AND target_id = $2 AND use_yn = 'Y'",
        )
        .bind(target.kind())
        .bind(target.raw_id())
        .fetch_one(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;
        Ok((
            row.try_get("recommends").map_err(map_sqlx_error)?,
            row.try_get("not_recommends").map_err(map_sqlx_error)?,
        ))
    }

    async fn find_block(&mut self, user: UserId, target: ContentRef) -> StoreResult<Option<Block>> {
        let row = sqlx::query(
            "SELECT user_id, target_type, target_id, target_user_id, off_yn
             FROM user_blocks
             WHERE user_id = $1 AND target_type = $2 AND target_id = $3",
        )
        .bind(user.get())
        .bind(target.kind())
        .bind(target.raw_id())
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;
        rows::optional(row.as_ref(), rows::block)
    }

    async fn save_block(&mut self, block: &Block) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO user_blocks (user_id, target_type, target_id, target_user_id, off_yn)
             VALUES ($1, $2, $3, $4, $5)
             ON CONFLICT (user_id, target_type, target_id)
             DO UPDATE SET off_yn = EXCLUDED.off_yn",
        )
        .bind(block.user_id.get())
        .bind(block.target.kind())
        .bind(block.target.raw_id())
        .bind(block.target_user_id.get())
        .bind(yn::to_str(block.off))
        .execute(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;
        Ok(())
    }

    async fn list_active_blocks(&mut self, user: UserId) -> StoreResult<Vec<Block>> {
        let found = sqlx::query(
            "SELECT user_id, target_type, target_id, target_user_id, off_yn
             FROM user_blocks
             WHERE user_id = $1 AND off_yn = 'Y'",
        )
        .bind(user.get())
        .fetch_all(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;
        rows::all(&found, rows::block)
    }

    async fn find_report(&mut self, user: UserId, target: ContentRef) -> StoreResult<Option<Report>> {
        let row = sqlx::query(
            "SELECT id, user_id, target_type, target_id, reason, created_date
             FROM reports
             WHERE user_id = $1 AND target_type = $2 AND target_id = $3",
        )
        .bind(user.get())
        .bind(target.kind())
        .bind(target.raw_id())
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;
        rows::optional(row.as_ref(), rows::report)
    }

    async fn insert_report(&mut self, report: NewReport, now: DateTime<Utc>) -> StoreResult<Report> {
        let row = sqlx::query(
            "INSERT INTO reports (user_id, target_type, target_id, reason, created_date)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING id, user_id, target_type, target_id, reason, created_date",
        )
        .bind(report.user_id.get())
        .bind(report.target.kind())
        .bind(report.target.raw_id())
        .bind(&report.reason)
        .bind(now)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;
        rows::report(&row)
    }
}
