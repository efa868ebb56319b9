use super::StoreResult;
use crate::types::{ContractOffer, ContractOfferId, NewContractOffer, ProductId, UserId};
use chrono::{DateTime, Utc};
use std::future::Future;

/// Contract offers.
pub trait ContractStore {
    /// Insert a pending offer.
    fn insert_offer(
        &mut self,
        offer: NewContractOffer,
        now: DateTime<Utc>,
    ) -> impl Future<Output = StoreResult<ContractOffer>> + Send;

    /// Offer by key.
    fn find_offer(
        &mut self,
        id: ContractOfferId,
    ) -> impl Future<Output = StoreResult<Option<ContractOffer>>> + Send;

    /// Overwrite `author_accept_yn` and the updated date.
    fn update_offer(&mut self, offer: &ContractOffer)
    -> impl Future<Output = StoreResult<()>> + Send;

    /// Pending offer from `offerer` on `product`.
    fn find_pending_offer(
        &mut self,
        product: ProductId,
        offerer: UserId,
    ) -> impl Future<Output = StoreResult<Option<ContractOffer>>> + Send;

    /// Offers received by an author, newest first.
    fn list_offers_for_author(
        &mut self,
        author: UserId,
    ) -> impl Future<Output = StoreResult<Vec<ContractOffer>>> + Send;

    /// Offers sent by an offerer, newest first.
    fn list_offers_by_offerer(
        &mut self,
        offerer: UserId,
    ) -> impl Future<Output = StoreResult<Vec<ContractOffer>>> + Send;
}
