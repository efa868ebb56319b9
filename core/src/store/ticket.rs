use super::StoreResult;
use crate::types::{EpisodeId, NewTicket, ProductId, Ticket, TicketId, UserId};
use chrono::{DateTime, Utc};
use std::future::Future;

/// Productbook tickets.
pub trait TicketStore {
    /// Append an unused ticket.
    fn insert_ticket(
        &mut self,
        ticket: NewTicket,
        now: DateTime<Utc>,
    ) -> impl Future<Output = StoreResult<Ticket>> + Send;

    /// Ticket by key.
    fn find_ticket(
        &mut self,
        id: TicketId,
    ) -> impl Future<Output = StoreResult<Option<Ticket>>> + Send;

    /// Overwrite scope and redemption columns.
    fn update_ticket(&mut self, ticket: &Ticket) -> impl Future<Output = StoreResult<()>> + Send;

    /// Unused tickets of the user scoped to `product` or universal.
    /// Expiry is not filtered here.
    fn list_candidate_tickets(
        &mut self,
        user: UserId,
        product: ProductId,
    ) -> impl Future<Output = StoreResult<Vec<Ticket>>> + Send;

    /// Every ticket bound to `episode`, used or not.
    fn list_episode_tickets(
        &mut self,
        user: UserId,
        episode: EpisodeId,
    ) -> impl Future<Output = StoreResult<Vec<Ticket>>> + Send;

    /// All tickets of the user, newest first.
    fn list_tickets(&mut self, user: UserId)
    -> impl Future<Output = StoreResult<Vec<Ticket>>> + Send;
}
