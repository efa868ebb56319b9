use crate::PostgresTransaction;
use crate::error::map_sqlx_error;
use crate::rows::{self, TICKET_COLUMNS};
use chrono::{DateTime, Utc};
use webnovel_core::store::{StoreResult, TicketStore};
use webnovel_core::types::{
    DirectPromotionId, EpisodeId, NewTicket, ProductId, Ticket, TicketId, UserId, yn,
};

impl TicketStore for PostgresTransaction {
    async fn insert_ticket(&mut self, ticket: NewTicket, now: DateTime<Utc>) -> StoreResult<Ticket> {
        let row = sqlx::query(&format!(
            "INSERT INTO tickets (user_id, profile_id, product_id, episode_id, own_type,
                                  ticket_type, acquisition_type, acquisition_id,
                                  source_promotion_id, rental_expired_date, created_date)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
             RETURNING {TICKET_COLUMNS}"
        ))
        .bind(ticket.user_id.get())
        .bind(ticket.profile_id.get())
        .bind(ticket.product_id.map(ProductId::get))
        .bind(ticket.episode_id.map(EpisodeId::get))
        .bind(ticket.own_type.as_str())
        .bind(ticket.ticket_type.as_str())
        .bind(ticket.acquisition_type.as_str())
        .bind(ticket.acquisition_id)
        .bind(ticket.source_promotion_id.map(DirectPromotionId::get))
        .bind(ticket.rental_expired_date)
        .bind(now)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;
        rows::ticket(&row)
    }

    async fn find_ticket(&mut self, id: TicketId) -> StoreResult<Option<Ticket>> {
        let row = sqlx::query(&format!("SELECT {TICKET_COLUMNS} FROM tickets WHERE id = $1"))
            .bind(id.get())
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(map_sqlx_error)?;
        rows::optional(row.as_ref(), rows::ticket)
    }

    async fn update_ticket(&mut self, ticket: &Ticket) -> StoreResult<()> {
        sqlx::query(
            "UPDATE tickets
             SET product_id = $2, episode_id = $3, rental_expired_date = $4,
                 use_yn = $5, use_date = $6
             WHERE id = $1",
        )
        .bind(ticket.id.get())
        .bind(ticket.product_id.map(ProductId::get))
        .bind(ticket.episode_id.map(EpisodeId::get))
        .bind(ticket.rental_expired_date)
        .bind(yn::to_str(ticket.used))
        .bind(ticket.use_date)
        .execute(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;
        Ok(())
    }

    async fn list_candidate_tickets(
        &mut self,
        user: UserId,
        product: ProductId,
    ) -> StoreResult<Vec<Ticket>> {
        let found = sqlx::query(&format!(
            "SELECT {TICKET_COLUMNS} FROM tickets
             WHERE user_id = $1 AND use_yn = 'N' AND (product_id = $2 OR product_id IS NULL)"
        ))
        .bind(user.get())
        .bind(product.get())
        .fetch_all(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;
        rows::all(&found, rows::ticket)
    }

    async fn list_episode_tickets(
        &mut self,
        user: UserId,
        episode: EpisodeId,
    ) -> StoreResult<Vec<Ticket>> {
        let found = sqlx::query(&format!(
            "SELECT {TICKET_COLUMNS} FROM tickets WHERE user_id = $1 AND episode_id = $2"
        ))
        .bind(user.get())
        .bind(episode.get())
        .fetch_all(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;
        rows::all(&found, rows::ticket)
    }

    async fn list_tickets(&mut self, user: UserId) -> StoreResult<Vec<Ticket>> {
        let found = sqlx::query(&format!(
            "SELECT {TICKET_COLUMNS} FROM tickets
             WHERE user_id = $1
             ORDER BY created_date DESC, id DESC"
        ))
        .bind(user.get())
        .fetch_all(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;
        rows::all(&found, rows::ticket)
    }
}
