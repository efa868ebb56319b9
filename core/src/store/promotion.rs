use super::StoreResult;
use crate::types::{
    AppliedPromotion, AppliedPromotionId, AppliedPromotionStatus, DirectPromotion,
    DirectPromotionId, DirectPromotionType, NewAppliedPromotion, NewDirectPromotion, ProductId,
    UserId,
};
use chrono::{DateTime, Utc};
use std::future::Future;

/// Direct and applied promotions.
pub trait PromotionStore {
    /// Direct promotion by key.
    fn find_direct(
        &mut self,
        id: DirectPromotionId,
    ) -> impl Future<Output = StoreResult<Option<DirectPromotion>>> + Send;

    /// Direct promotions of a product, oldest first.
    fn list_direct_for_product(
        &mut self,
        product: ProductId,
    ) -> impl Future<Output = StoreResult<Vec<DirectPromotion>>> + Send;

    /// Direct promotions of one kind across an author's products.
    fn list_direct_for_author(
        &mut self,
        author: UserId,
        kind: DirectPromotionType,
    ) -> impl Future<Output = StoreResult<Vec<DirectPromotion>>> + Send;

    /// Insert a direct promotion with status `pending`.
    fn insert_direct(
        &mut self,
        promotion: NewDirectPromotion,
        now: DateTime<Utc>,
    ) -> impl Future<Output = StoreResult<DirectPromotion>> + Send;

    /// Overwrite status, count, start and updated dates.
    fn update_direct(
        &mut self,
        promotion: &DirectPromotion,
    ) -> impl Future<Output = StoreResult<()>> + Send;

    /// Applied promotion by key.
    fn find_applied(
        &mut self,
        id: AppliedPromotionId,
    ) -> impl Future<Output = StoreResult<Option<AppliedPromotion>>> + Send;

    /// Applied promotions of a product, oldest first.
    fn list_applied_for_product(
        &mut self,
        product: ProductId,
    ) -> impl Future<Output = StoreResult<Vec<AppliedPromotion>>> + Send;

    /// Applied promotions system-wide, optionally by status, oldest first.
    fn list_applied(
        &mut self,
        status: Option<AppliedPromotionStatus>,
    ) -> impl Future<Output = StoreResult<Vec<AppliedPromotion>>> + Send;

    /// `ing` rows with `from <= created_date < until`.
    fn count_ing_applied_created_between(
        &mut self,
        from: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> impl Future<Output = StoreResult<i64>> + Send;

    /// Insert an applied promotion with status `apply`.
    fn insert_applied(
        &mut self,
        promotion: NewAppliedPromotion,
        now: DateTime<Utc>,
    ) -> impl Future<Output = StoreResult<AppliedPromotion>> + Send;

    /// Overwrite status and updated date.
    fn update_applied(
        &mut self,
        promotion: &AppliedPromotion,
    ) -> impl Future<Output = StoreResult<()>> + Send;
}
