use super::StoreResult;
use crate::types::{
    GiftId, GiftItem, GiftTransaction, GiftTransactionType, NewGift, NewGiftTransaction,
    ProductId, PromotionType, UserId,
};
use chrono::{DateTime, Utc};
use std::future::Future;

/// Giftbook items and gift transactions.
pub trait GiftStore {
    /// Insert a pending gift.
    fn insert_gift(
        &mut self,
        gift: NewGift,
        now: DateTime<Utc>,
    ) -> impl Future<Output = StoreResult<GiftItem>> + Send;

    /// Gift by key.
    fn find_gift(&mut self, id: GiftId)
    -> impl Future<Output = StoreResult<Option<GiftItem>>> + Send;

    /// Overwrite the receipt columns.
    fn update_gift(&mut self, gift: &GiftItem) -> impl Future<Output = StoreResult<()>> + Send;

    /// All gifts of the user, newest first.
    fn list_gifts(&mut self, user: UserId)
    -> impl Future<Output = StoreResult<Vec<GiftItem>>> + Send;

    /// Gifts of one promotion type the user got for a product.
    fn list_user_promotion_gifts(
        &mut self,
        user: UserId,
        product: ProductId,
        promotion_type: PromotionType,
    ) -> impl Future<Output = StoreResult<Vec<GiftItem>>> + Send;

    /// Gifts produced by one promotion row (`acquisition_id`).
    fn list_promotion_gifts(
        &mut self,
        promotion_type: PromotionType,
        promotion_id: i64,
    ) -> impl Future<Output = StoreResult<Vec<GiftItem>>> + Send;

    /// Append an audit row.
    fn insert_gift_transaction(
        &mut self,
        transaction: NewGiftTransaction,
        now: DateTime<Utc>,
    ) -> impl Future<Output = StoreResult<GiftTransaction>> + Send;

    /// Audit rows of the user, newest first, optionally by type.
    fn list_gift_transactions(
        &mut self,
        user: UserId,
        kind: Option<GiftTransactionType>,
    ) -> impl Future<Output = StoreResult<Vec<GiftTransaction>>> + Send;
}
