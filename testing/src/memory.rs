//! In-memory [`Database`] for tests.
//!
//! Transactions are serialized by an async mutex: `begin` waits for the
//! previous transaction to finish. Each transaction snapshots the tables and
//! restores the snapshot when dropped without [`Transaction::commit`], which
//! gives the same all-or-nothing behaviour as the `PostgreSQL` backend.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use webnovel_core::store::{
    AccountStore, CatalogStore, ContractStore, Database, EngagementStore, GiftStore, LedgerStore,
    LibraryStore, NotificationStore, PromotionStore, StoreResult, TicketStore, Transaction,
};
use webnovel_core::types::{
    AppliedPromotion, AppliedPromotionId, AppliedPromotionStatus, Block, Bookmark, CashEntry,
    CashTransaction, Comment, CommentId, ContentRef, ContractOffer, ContractOfferId,
    DirectPromotion, DirectPromotionId, DirectPromotionStatus, DirectPromotionType, Episode,
    EpisodeCounter, EpisodeId, GiftId, GiftItem, GiftTransaction, GiftTransactionType,
    NewAppliedPromotion, NewCashTransaction, NewComment, NewContractOffer, NewDirectPromotion,
    NewEpisode, NewGift, NewGiftTransaction, NewNotification, NewProduct, NewProfile, NewReport,
    NewReview, NewTicket, NewUser, Notification, NotificationId, NotificationType, Product,
    ProductCounter, ProductId, ProductStatus, Profile, ProfileId, PromotionType, Reaction,
    Recent, Report, ReportId, Review, ReviewId, Ticket, TicketId, Usage, User, UserId,
};

/// Every table of the platform as plain vectors.
///
/// Fields are public so tests can assert on raw rows (for example that the
/// cash balance equals the sum of entries).
#[derive(Debug, Clone, Default)]
#[allow(missing_docs)]
pub struct Tables {
    pub users: Vec<User>,
    pub profiles: Vec<Profile>,
    pub products: Vec<Product>,
    pub episodes: Vec<Episode>,
    pub cash_entries: Vec<CashEntry>,
    pub cash_transactions: Vec<CashTransaction>,
    pub tickets: Vec<Ticket>,
    pub gifts: Vec<GiftItem>,
    pub gift_transactions: Vec<GiftTransaction>,
    pub bookmarks: Vec<Bookmark>,
    pub usages: Vec<Usage>,
    pub recents: Vec<Recent>,
    pub direct_promotions: Vec<DirectPromotion>,
    pub applied_promotions: Vec<AppliedPromotion>,
    pub contract_offers: Vec<ContractOffer>,
    pub comments: Vec<Comment>,
    pub reviews: Vec<Review>,
    pub reactions: Vec<Reaction>,
    pub blocks: Vec<Block>,
    pub reports: Vec<Report>,
    pub notifications: Vec<Notification>,
    pub preferences: Vec<(UserId, NotificationType, bool)>,
    sequence: i64,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.sequence += 1;
        self.sequence
    }

    /// Sum of a user's cash entries.
    #[must_use]
    pub fn cash_sum(&self, user: UserId) -> i64 {
        self.cash_entries
            .iter()
            .filter(|e| e.user_id == user)
            .map(|e| e.balance)
            .sum()
    }
}

fn upsert<T: Clone>(rows: &mut Vec<T>, row: &T, same: impl Fn(&T) -> bool) {
    match rows.iter_mut().find(|r| same(r)) {
        Some(existing) => *existing = row.clone(),
        None => rows.push(row.clone()),
    }
}

fn replace<T: Clone>(rows: &mut [T], row: &T, same: impl Fn(&T) -> bool) {
    if let Some(existing) = rows.iter_mut().find(|r| same(r)) {
        *existing = row.clone();
    }
}

fn newest_first<T>(mut rows: Vec<T>, key: impl Fn(&T) -> (DateTime<Utc>, i64)) -> Vec<T> {
    rows.sort_by_key(|r| std::cmp::Reverse(key(r)));
    rows
}

/// Shared in-memory database.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDatabase {
    tables: Arc<Mutex<Tables>>,
}

impl InMemoryDatabase {
    /// Empty database.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the committed tables.
    pub async fn snapshot(&self) -> Tables {
        self.tables.lock().await.clone()
    }
}

impl Database for InMemoryDatabase {
    type Tx = InMemoryTransaction;

    async fn begin(&self) -> StoreResult<InMemoryTransaction> {
        let guard = Arc::clone(&self.tables).lock_owned().await;
        let snapshot = guard.clone();
        Ok(InMemoryTransaction {
            guard,
            snapshot: Some(snapshot),
        })
    }
}

/// Exclusive transaction over [`Tables`].
#[derive(Debug)]
pub struct InMemoryTransaction {
    guard: OwnedMutexGuard<Tables>,
    snapshot: Option<Tables>,
}

impl InMemoryTransaction {
    fn t(&mut self) -> &mut Tables {
        &mut self.guard
    }
}

impl Drop for InMemoryTransaction {
    fn drop(&mut self) {
        if let Some(snapshot) = self.snapshot.take() {
            *self.guard = snapshot;
        }
    }
}

impl Transaction for InMemoryTransaction {
    async fn commit(mut self) -> StoreResult<()> {
        self.snapshot = None;
        Ok(())
    }
}

impl AccountStore for InMemoryTransaction {
    async fn find_user(&mut self, id: UserId) -> StoreResult<Option<User>> {
        Ok(self.t().users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_user_by_subject(&mut self, subject: &str) -> StoreResult<Option<User>> {
        Ok(self.t().users.iter().find(|u| u.subject == subject).cloned())
    }

    async fn find_user_by_email(&mut self, email: &str) -> StoreResult<Option<User>> {
        Ok(self
            .t()
            .users
            .iter()
            .find(|u| !u.deleted && u.email.as_deref() == Some(email))
            .cloned())
    }

    async fn find_verified_user_by_phone(&mut self, phone: &str) -> StoreResult<Option<User>> {
        Ok(self
            .t()
            .users
            .iter()
            .find(|u| !u.deleted && u.identity_verified && u.phone.as_deref() == Some(phone))
            .cloned())
    }

    async fn insert_user(&mut self, user: NewUser, now: DateTime<Utc>) -> StoreResult<User> {
        let t = self.t();
        let row = User {
            id: UserId(t.next_id()),
            subject: user.subject,
            role: user.role,
            identity_verified: false,
            phone: None,
            email: user.email,
            deleted: false,
            created_date: now,
        };
        t.users.push(row.clone());
        Ok(row)
    }

    async fn update_user(&mut self, user: &User) -> StoreResult<()> {
        replace(&mut self.t().users, user, |u| u.id == user.id);
        Ok(())
    }

    async fn list_profiles(&mut self, user: UserId) -> StoreResult<Vec<Profile>> {
        Ok(self
            .t()
            .profiles
            .iter()
            .filter(|p| p.user_id == user)
            .cloned()
            .collect())
    }

    async fn find_profile(&mut self, id: ProfileId) -> StoreResult<Option<Profile>> {
        Ok(self.t().profiles.iter().find(|p| p.id == id).cloned())
    }

    async fn insert_profile(
        &mut self,
        profile: NewProfile,
        now: DateTime<Utc>,
    ) -> StoreResult<Profile> {
        let t = self.t();
        let row = Profile {
            id: ProfileId(t.next_id()),
            user_id: profile.user_id,
            nickname: profile.nickname,
            free_rename_count: webnovel_core::rules::profile::FREE_RENAMES,
            paid_rename_count: 0,
            is_default: profile.is_default,
            created_date: now,
        };
        t.profiles.push(row.clone());
        Ok(row)
    }

    async fn update_profile(&mut self, profile: &Profile) -> StoreResult<()> {
        replace(&mut self.t().profiles, profile, |p| p.id == profile.id);
        Ok(())
    }
}

impl CatalogStore for InMemoryTransaction {
    async fn find_product(&mut self, id: ProductId) -> StoreResult<Option<Product>> {
        Ok(self.t().products.iter().find(|p| p.id == id).cloned())
    }

    async fn list_products_by_author(&mut self, author: UserId) -> StoreResult<Vec<Product>> {
        let rows = self
            .t()
            .products
            .iter()
            .filter(|p| p.author_id == author && p.active)
            .cloned()
            .collect();
        Ok(newest_first(rows, |p: &Product| (p.created_date, p.id.0)))
    }

    async fn insert_product(
        &mut self,
        product: NewProduct,
        now: DateTime<Utc>,
    ) -> StoreResult<Product> {
        let t = self.t();
        let row = Product {
            id: ProductId(t.next_id()),
            author_id: product.author_id,
            title: product.title,
            price_type: product.price_type,
            rating: product.rating,
            status: ProductStatus::Ongoing,
            product_type: product.product_type,
            primary_genre: product.primary_genre,
            sub_genre: product.sub_genre,
            keywords: product.keywords,
            cover_image_path: product.cover_image_path,
            count_hit: 0,
            count_bookmark: 0,
            count_recommend: 0,
            count_review: 0,
            last_episode_date: None,
            active: true,
            created_date: now,
        };
        t.products.push(row.clone());
        Ok(row)
    }

    async fn update_product(&mut self, product: &Product) -> StoreResult<()> {
        if let Some(row) = self.t().products.iter_mut().find(|p| p.id == product.id) {
            *row = Product {
                count_hit: row.count_hit,
                count_bookmark: row.count_bookmark,
                count_recommend: row.count_recommend,
                count_review: row.count_review,
                ..product.clone()
            };
        }
        Ok(())
    }

    async fn set_product_counter(
        &mut self,
        id: ProductId,
        counter: ProductCounter,
        value: i64,
    ) -> StoreResult<()> {
        if let Some(row) = self.t().products.iter_mut().find(|p| p.id == id) {
            match counter {
                ProductCounter::Hit => row.count_hit = value,
                ProductCounter::Bookmark => row.count_bookmark = value,
                ProductCounter::Recommend => row.count_recommend = value,
                ProductCounter::Review => row.count_review = value,
            }
        }
        Ok(())
    }

    async fn find_episode(&mut self, id: EpisodeId) -> StoreResult<Option<Episode>> {
        Ok(self.t().episodes.iter().find(|e| e.id == id).cloned())
    }

    async fn list_episodes(&mut self, product: ProductId) -> StoreResult<Vec<Episode>> {
        let mut rows: Vec<Episode> = self
            .t()
            .episodes
            .iter()
            .filter(|e| e.product_id == product && e.active)
            .cloned()
            .collect();
        rows.sort_by_key(|e| (e.episode_no, e.id));
        Ok(rows)
    }

    async fn insert_episode(
        &mut self,
        episode: NewEpisode,
        now: DateTime<Utc>,
    ) -> StoreResult<Episode> {
        let t = self.t();
        let row = Episode {
            id: EpisodeId(t.next_id()),
            product_id: episode.product_id,
            episode_no: episode.episode_no,
            title: episode.title,
            price_type: episode.price_type,
            open: false,
            publish_reserve_date: None,
            count_hit: 0,
            count_recommend: 0,
            count_not_recommend: 0,
            count_comment: 0,
            active: true,
            created_date: now,
        };
        t.episodes.push(row.clone());
        Ok(row)
    }

    async fn update_episode(&mut self, episode: &Episode) -> StoreResult<()> {
        if let Some(row) = self.t().episodes.iter_mut().find(|e| e.id == episode.id) {
            *row = Episode {
                count_hit: row.count_hit,
                count_recommend: row.count_recommend,
                count_not_recommend: row.count_not_recommend,
                count_comment: row.count_comment,
                ..episode.clone()
            };
        }
        Ok(())
    }

    async fn set_episode_counter(
        &mut self,
        id: EpisodeId,
        counter: EpisodeCounter,
        value: i64,
    ) -> StoreResult<()> {
        if let Some(row) = self.t().episodes.iter_mut().find(|e| e.id == id) {
            match counter {
                EpisodeCounter::Hit => row.count_hit = value,
                EpisodeCounter::Recommend => row.count_recommend = value,
                EpisodeCounter::NotRecommend => row.count_not_recommend = value,
                EpisodeCounter::Comment => row.count_comment = value,
            }
        }
        Ok(())
    }
}

impl LedgerStore for InMemoryTransaction {
    async fn balance(&mut self, user: UserId) -> StoreResult<i64> {
        Ok(self.t().cash_sum(user))
    }

    async fn insert_cash_entry(
        &mut self,
        user: UserId,
        delta: i64,
        now: DateTime<Utc>,
    ) -> StoreResult<CashEntry> {
        let t = self.t();
        let row = CashEntry {
            id: t.next_id(),
            user_id: user,
            balance: delta,
            created_date: now,
        };
        t.cash_entries.push(row.clone());
        Ok(row)
    }

    async fn insert_cash_transaction(
        &mut self,
        transaction: NewCashTransaction,
        now: DateTime<Utc>,
    ) -> StoreResult<CashTransaction> {
        let t = self.t();
        let row = CashTransaction {
            id: t.next_id(),
            from_user: transaction.from_user,
            to_user: transaction.to_user,
            amount: transaction.amount,
            reason: transaction.reason,
            created_date: now,
        };
        t.cash_transactions.push(row.clone());
        Ok(row)
    }

    async fn list_cash_transactions(&mut self, user: UserId) -> StoreResult<Vec<CashTransaction>> {
        let rows = self
            .t()
            .cash_transactions
            .iter()
            .filter(|c| c.from_user == Some(user) || c.to_user == Some(user))
            .cloned()
            .collect();
        Ok(newest_first(rows, |c: &CashTransaction| (c.created_date, c.id)))
    }
}

impl TicketStore for InMemoryTransaction {
    async fn insert_ticket(&mut self, ticket: NewTicket, now: DateTime<Utc>) -> StoreResult<Ticket> {
        let t = self.t();
        let row = Ticket {
            id: TicketId(t.next_id()),
            user_id: ticket.user_id,
            profile_id: ticket.profile_id,
            product_id: ticket.product_id,
            episode_id: ticket.episode_id,
            own_type: ticket.own_type,
            ticket_type: ticket.ticket_type,
            acquisition_type: ticket.acquisition_type,
            acquisition_id: ticket.acquisition_id,
            source_promotion_id: ticket.source_promotion_id,
            rental_expired_date: ticket.rental_expired_date,
            used: false,
            use_date: None,
            created_date: now,
        };
        t.tickets.push(row.clone());
        Ok(row)
    }

    async fn find_ticket(&mut self, id: TicketId) -> StoreResult<Option<Ticket>> {
        Ok(self.t().tickets.iter().find(|t| t.id == id).cloned())
    }

    async fn update_ticket(&mut self, ticket: &Ticket) -> StoreResult<()> {
        replace(&mut self.t().tickets, ticket, |t| t.id == ticket.id);
        Ok(())
    }

    async fn list_candidate_tickets(
        &mut self,
        user: UserId,
        product: ProductId,
    ) -> StoreResult<Vec<Ticket>> {
        Ok(self
            .t()
            .tickets
            .iter()
            .filter(|t| {
                t.user_id == user
                    && !t.used
                    && t.product_id.is_none_or(|p| p == product)
            })
            .cloned()
            .collect())
    }

    async fn list_episode_tickets(
        &mut self,
        user: UserId,
        episode: EpisodeId,
    ) -> StoreResult<Vec<Ticket>> {
        Ok(self
            .t()
            .tickets
            .iter()
            .filter(|t| t.user_id == user && t.episode_id == Some(episode))
            .cloned()
            .collect())
    }

    async fn list_tickets(&mut self, user: UserId) -> StoreResult<Vec<Ticket>> {
        let rows = self
            .t()
            .tickets
            .iter()
            .filter(|t| t.user_id == user)
            .cloned()
            .collect();
        Ok(newest_first(rows, |t: &Ticket| (t.created_date, t.id.0)))
    }
}

impl GiftStore for InMemoryTransaction {
    async fn insert_gift(&mut self, gift: NewGift, now: DateTime<Utc>) -> StoreResult<GiftItem> {
        let t = self.t();
        let row = GiftItem {
            id: GiftId(t.next_id()),
            user_id: gift.user_id,
            product_id: gift.product_id,
            episode_id: gift.episode_id,
            amount: gift.amount,
            ticket_type: gift.ticket_type,
            own_type: gift.own_type,
            promotion_type: gift.promotion_type,
            acquisition_type: gift.acquisition_type,
            acquisition_id: gift.acquisition_id,
            expiration_date: gift.expiration_date,
            ticket_expiration: gift.ticket_expiration,
            received: false,
            received_date: None,
            created_date: now,
        };
        t.gifts.push(row.clone());
        Ok(row)
    }

    async fn find_gift(&mut self, id: GiftId) -> StoreResult<Option<GiftItem>> {
        Ok(self.t().gifts.iter().find(|g| g.id == id).cloned())
    }

    async fn update_gift(&mut self, gift: &GiftItem) -> StoreResult<()> {
        replace(&mut self.t().gifts, gift, |g| g.id == gift.id);
        Ok(())
    }

    async fn list_gifts(&mut self, user: UserId) -> StoreResult<Vec<GiftItem>> {
        let rows = self
            .t()
            .gifts
            .iter()
            .filter(|g| g.user_id == user)
            .cloned()
            .collect();
        Ok(newest_first(rows, |g: &GiftItem| (g.created_date, g.id.0)))
    }

    async fn list_user_promotion_gifts(
        &mut self,
        user: UserId,
        product: ProductId,
        promotion_type: PromotionType,
    ) -> StoreResult<Vec<GiftItem>> {
        Ok(self
            .t()
            .gifts
            .iter()
            .filter(|g| {
                g.user_id == user
                    && g.product_id == Some(product)
                    && g.promotion_type == Some(promotion_type)
            })
            .cloned()
            .collect())
    }

    async fn list_promotion_gifts(
        &mut self,
        promotion_type: PromotionType,
        promotion_id: i64,
    ) -> StoreResult<Vec<GiftItem>> {
        Ok(self
            .t()
            .gifts
            .iter()
            .filter(|g| {
                g.promotion_type == Some(promotion_type) && g.acquisition_id == Some(promotion_id)
            })
            .cloned()
            .collect())
    }

    async fn insert_gift_transaction(
        &mut self,
        transaction: NewGiftTransaction,
        now: DateTime<Utc>,
    ) -> StoreResult<GiftTransaction> {
        let t = self.t();
        let row = GiftTransaction {
            id: t.next_id(),
            kind: transaction.kind,
            user_id: transaction.user_id,
            giftbook_id: transaction.giftbook_id,
            amount: transaction.amount,
            reason: transaction.reason,
            created_date: now,
        };
        t.gift_transactions.push(row.clone());
        Ok(row)
    }

    async fn list_gift_transactions(
        &mut self,
        user: UserId,
        kind: Option<GiftTransactionType>,
    ) -> StoreResult<Vec<GiftTransaction>> {
        let rows = self
            .t()
            .gift_transactions
            .iter()
            .filter(|g| g.user_id == user && kind.is_none_or(|k| g.kind == k))
            .cloned()
            .collect();
        Ok(newest_first(rows, |g: &GiftTransaction| (g.created_date, g.id)))
    }
}

impl LibraryStore for InMemoryTransaction {
    async fn find_bookmark(
        &mut self,
        user: UserId,
        product: ProductId,
    ) -> StoreResult<Option<Bookmark>> {
        Ok(self
            .t()
            .bookmarks
            .iter()
            .find(|b| b.user_id == user && b.product_id == product)
            .cloned())
    }

    async fn save_bookmark(&mut self, bookmark: &Bookmark) -> StoreResult<()> {
        upsert(&mut self.t().bookmarks, bookmark, |b| {
            b.user_id == bookmark.user_id && b.product_id == bookmark.product_id
        });
        Ok(())
    }

    async fn count_active_bookmarks(&mut self, product: ProductId) -> StoreResult<i64> {
        let count = self
            .t()
            .bookmarks
            .iter()
            .filter(|b| b.product_id == product && b.active)
            .count();
        Ok(i64::try_from(count).unwrap_or(i64::MAX))
    }

    async fn list_bookmarks(&mut self, user: UserId) -> StoreResult<Vec<Bookmark>> {
        let rows = self
            .t()
            .bookmarks
            .iter()
            .filter(|b| b.user_id == user && b.active)
            .cloned()
            .collect();
        Ok(newest_first(rows, |b: &Bookmark| (b.updated_date, b.product_id.0)))
    }

    async fn list_bookmarkers(&mut self, product: ProductId) -> StoreResult<Vec<UserId>> {
        let mut users: Vec<UserId> = self
            .t()
            .bookmarks
            .iter()
            .filter(|b| b.product_id == product && b.active)
            .map(|b| b.user_id)
            .collect();
        users.sort();
        Ok(users)
    }

    async fn find_usage(&mut self, user: UserId, episode: EpisodeId) -> StoreResult<Option<Usage>> {
        Ok(self
            .t()
            .usages
            .iter()
            .find(|u| u.user_id == user && u.episode_id == episode)
            .cloned())
    }

    async fn save_usage(&mut self, usage: &Usage) -> StoreResult<()> {
        upsert(&mut self.t().usages, usage, |u| {
            u.user_id == usage.user_id && u.episode_id == usage.episode_id
        });
        Ok(())
    }

    async fn list_usage(&mut self, user: UserId, product: ProductId) -> StoreResult<Vec<Usage>> {
        Ok(self
            .t()
            .usages
            .iter()
            .filter(|u| u.user_id == user && u.product_id == product)
            .cloned()
            .collect())
    }

    async fn touch_usage(
        &mut self,
        user: UserId,
        product: ProductId,
        now: DateTime<Utc>,
    ) -> StoreResult<u64> {
        let mut touched = 0;
        for row in self
            .t()
            .usages
            .iter_mut()
            .filter(|u| u.user_id == user && u.product_id == product)
        {
            row.updated_date = now;
            touched += 1;
        }
        Ok(touched)
    }

    async fn count_episode_reactions(&mut self, episode: EpisodeId) -> StoreResult<(i64, i64)> {
        let rows: Vec<&Usage> = self
            .guard
            .usages
            .iter()
            .filter(|u| u.episode_id == episode)
            .collect();
        Ok((
            count(rows.iter().filter(|u| u.recommend)),
            count(rows.iter().filter(|u| u.not_recommend)),
        ))
    }

    async fn count_product_recommends(&mut self, product: ProductId) -> StoreResult<i64> {
        Ok(count(
            self.t()
                .usages
                .iter()
                .filter(|u| u.product_id == product && u.recommend),
        ))
    }

    async fn find_recent(
        &mut self,
        user: UserId,
        product: ProductId,
    ) -> StoreResult<Option<Recent>> {
        Ok(self
            .t()
            .recents
            .iter()
            .find(|r| r.user_id == user && r.product_id == product)
            .cloned())
    }

    async fn save_recent(&mut self, recent: &Recent) -> StoreResult<()> {
        upsert(&mut self.t().recents, recent, |r| {
            r.user_id == recent.user_id && r.product_id == recent.product_id
        });
        Ok(())
    }

    async fn list_recent(&mut self, user: UserId) -> StoreResult<Vec<Recent>> {
        let rows = self
            .t()
            .recents
            .iter()
            .filter(|r| r.user_id == user && r.active)
            .cloned()
            .collect();
        Ok(newest_first(rows, |r: &Recent| (r.updated_date, r.product_id.0)))
    }
}

fn count<I: Iterator>(rows: I) -> i64 {
    i64::try_from(rows.count()).unwrap_or(i64::MAX)
}

impl PromotionStore for InMemoryTransaction {
    async fn find_direct(&mut self, id: DirectPromotionId) -> StoreResult<Option<DirectPromotion>> {
        Ok(self.t().direct_promotions.iter().find(|p| p.id == id).cloned())
    }

    async fn list_direct_for_product(
        &mut self,
        product: ProductId,
    ) -> StoreResult<Vec<DirectPromotion>> {
        Ok(self
            .t()
            .direct_promotions
            .iter()
            .filter(|p| p.product_id == product)
            .cloned()
            .collect())
    }

    async fn list_direct_for_author(
        &mut self,
        author: UserId,
        kind: DirectPromotionType,
    ) -> StoreResult<Vec<DirectPromotion>> {
        Ok(self
            .t()
            .direct_promotions
            .iter()
            .filter(|p| p.author_id == author && p.kind == kind)
            .cloned()
            .collect())
    }

    async fn insert_direct(
        &mut self,
        promotion: NewDirectPromotion,
        now: DateTime<Utc>,
    ) -> StoreResult<DirectPromotion> {
        let t = self.t();
        let row = DirectPromotion {
            id: DirectPromotionId(t.next_id()),
            product_id: promotion.product_id,
            author_id: promotion.author_id,
            kind: promotion.kind,
            status: DirectPromotionStatus::Pending,
            num_of_ticket_per_person: promotion.num_of_ticket_per_person,
            start_date: None,
            created_date: now,
            updated_date: now,
        };
        t.direct_promotions.push(row.clone());
        Ok(row)
    }

    async fn update_direct(&mut self, promotion: &DirectPromotion) -> StoreResult<()> {
        replace(&mut self.t().direct_promotions, promotion, |p| {
            p.id == promotion.id
        });
        Ok(())
    }

    async fn find_applied(
        &mut self,
        id: AppliedPromotionId,
    ) -> StoreResult<Option<AppliedPromotion>> {
        Ok(self.t().applied_promotions.iter().find(|p| p.id == id).cloned())
    }

    async fn list_applied_for_product(
        &mut self,
        product: ProductId,
    ) -> StoreResult<Vec<AppliedPromotion>> {
        Ok(self
            .t()
            .applied_promotions
            .iter()
            .filter(|p| p.product_id == product)
            .cloned()
            .collect())
    }

    async fn list_applied(
        &mut self,
        status: Option<AppliedPromotionStatus>,
    ) -> StoreResult<Vec<AppliedPromotion>> {
        Ok(self
            .t()
            .applied_promotions
            .iter()
            .filter(|p| status.is_none_or(|s| p.status == s))
            .cloned()
            .collect())
    }

    async fn count_ing_applied_created_between(
        &mut self,
        from: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> StoreResult<i64> {
        Ok(count(self.t().applied_promotions.iter().filter(|p| {
            p.status == AppliedPromotionStatus::Ing
                && p.created_date >= from
                && p.created_date < until
        })))
    }

    async fn insert_applied(
        &mut self,
        promotion: NewAppliedPromotion,
        now: DateTime<Utc>,
    ) -> StoreResult<AppliedPromotion> {
        let t = self.t();
        let row = AppliedPromotion {
            id: AppliedPromotionId(t.next_id()),
            product_id: promotion.product_id,
            author_id: promotion.author_id,
            kind: promotion.kind,
            status: AppliedPromotionStatus::Apply,
            start_date: promotion.start_date,
            end_date: promotion.end_date,
            num_of_ticket_per_person: promotion.num_of_ticket_per_person,
            created_date: now,
            updated_date: now,
        };
        t.applied_promotions.push(row.clone());
        Ok(row)
    }

    async fn update_applied(&mut self, promotion: &AppliedPromotion) -> StoreResult<()> {
        replace(&mut self.t().applied_promotions, promotion, |p| {
            p.id == promotion.id
        });
        Ok(())
    }
}

impl ContractStore for InMemoryTransaction {
    async fn insert_offer(
        &mut self,
        offer: NewContractOffer,
        now: DateTime<Utc>,
    ) -> StoreResult<ContractOffer> {
        let t = self.t();
        let row = ContractOffer {
            id: ContractOfferId(t.next_id()),
            product_id: offer.product_id,
            author_id: offer.author_id,
            offerer_id: offer.offerer_id,
            profit_type: offer.profit_type,
            author_profit: offer.author_profit,
            offer_profit: offer.offer_profit,
            advance_payment_range: offer.advance_payment_range,
            message: offer.message,
            author_accept: None,
            created_date: now,
            updated_date: now,
        };
        t.contract_offers.push(row.clone());
        Ok(row)
    }

    async fn find_offer(&mut self, id: ContractOfferId) -> StoreResult<Option<ContractOffer>> {
        Ok(self.t().contract_offers.iter().find(|o| o.id == id).cloned())
    }

    async fn update_offer(&mut self, offer: &ContractOffer) -> StoreResult<()> {
        replace(&mut self.t().contract_offers, offer, |o| o.id == offer.id);
        Ok(())
    }

    async fn find_pending_offer(
        &mut self,
        product: ProductId,
        offerer: UserId,
    ) -> StoreResult<Option<ContractOffer>> {
        Ok(self
            .t()
            .contract_offers
            .iter()
            .find(|o| o.product_id == product && o.offerer_id == offerer && o.author_accept.is_none())
            .cloned())
    }

    async fn list_offers_for_author(&mut self, author: UserId) -> StoreResult<Vec<ContractOffer>> {
        let rows = self
            .t()
            .contract_offers
            .iter()
            .filter(|o| o.author_id == author)
            .cloned()
            .collect();
        Ok(newest_first(rows, |o: &ContractOffer| (o.created_date, o.id.0)))
    }

    async fn list_offers_by_offerer(
        &mut self,
        offerer: UserId,
    ) -> StoreResult<Vec<ContractOffer>> {
        let rows = self
            .t()
            .contract_offers
            .iter()
            .filter(|o| o.offerer_id == offerer)
            .cloned()
            .collect();
        Ok(newest_first(rows, |o: &ContractOffer| (o.created_date, o.id.0)))
    }
}

impl EngagementStore for InMemoryTransaction {
    async fn insert_comment(&mut self, comment: NewComment, now: DateTime<Utc>) -> StoreResult<Comment> {
        let t = self.t();
        let row = Comment {
            id: CommentId(t.next_id()),
            product_id: comment.product_id,
            episode_id: comment.episode_id,
            user_id: comment.user_id,
            profile_id: comment.profile_id,
            parent_id: comment.parent_id,
            content: comment.content,
            display_top: false,
            active: true,
            count_recommend: 0,
            count_not_recommend: 0,
            count_reply: 0,
            created_date: now,
        };
        t.comments.push(row.clone());
        Ok(row)
    }

    async fn find_comment(&mut self, id: CommentId) -> StoreResult<Option<Comment>> {
        Ok(self.t().comments.iter().find(|c| c.id == id).cloned())
    }

    async fn update_comment(&mut self, comment: &Comment) -> StoreResult<()> {
        replace(&mut self.t().comments, comment, |c| c.id == comment.id);
        Ok(())
    }

    async fn list_comments(&mut self, episode: EpisodeId) -> StoreResult<Vec<Comment>> {
        let mut rows: Vec<Comment> = self
            .t()
            .comments
            .iter()
            .filter(|c| c.episode_id == episode && c.active)
            .cloned()
            .collect();
        rows.sort_by_key(|c| (c.created_date, c.id));
        Ok(rows)
    }

    async fn count_active_comments(&mut self, episode: EpisodeId) -> StoreResult<i64> {
        Ok(count(
            self.t()
                .comments
                .iter()
                .filter(|c| c.episode_id == episode && c.active),
        ))
    }

    async fn count_active_replies(&mut self, parent: CommentId) -> StoreResult<i64> {
        Ok(count(
            self.t()
                .comments
                .iter()
                .filter(|c| c.parent_id == Some(parent) && c.active),
        ))
    }

    async fn insert_review(&mut self, review: NewReview, now: DateTime<Utc>) -> StoreResult<Review> {
        let t = self.t();
        let row = Review {
            id: ReviewId(t.next_id()),
            product_id: review.product_id,
            user_id: review.user_id,
            profile_id: review.profile_id,
            content: review.content,
            display_top: false,
            active: true,
            count_recommend: 0,
            count_not_recommend: 0,
            created_date: now,
        };
        t.reviews.push(row.clone());
        Ok(row)
    }

    async fn find_review(&mut self, id: ReviewId) -> StoreResult<Option<Review>> {
        Ok(self.t().reviews.iter().find(|r| r.id == id).cloned())
    }

    async fn update_review(&mut self, review: &Review) -> StoreResult<()> {
        replace(&mut self.t().reviews, review, |r| r.id == review.id);
        Ok(())
    }

    async fn list_reviews(&mut self, product: ProductId) -> StoreResult<Vec<Review>> {
        let mut rows: Vec<Review> = self
            .t()
            .reviews
            .iter()
            .filter(|r| r.product_id == product && r.active)
            .cloned()
            .collect();
        rows.sort_by_key(|r| (r.created_date, r.id));
        Ok(rows)
    }

    async fn count_active_reviews(&mut self, product: ProductId) -> StoreResult<i64> {
        Ok(count(
            self.t()
                .reviews
                .iter()
                .filter(|r| r.product_id == product && r.active),
        ))
    }

    async fn find_reaction(&mut self, user: UserId, target: ContentRef) -> StoreResult<Option<Reaction>> {
        Ok(self
            .t()
            .reactions
            .iter()
            .find(|r| r.user_id == user && r.target == target)
            .cloned())
    }

    async fn save_reaction(&mut self, reaction: &Reaction) -> StoreResult<()> {
        upsert(&mut self.t().reactions, reaction, |r| {
            r.user_id == reaction.user_id && r.target == reaction.target
        });
        Ok(())
    }

    async fn count_reactions(&mut self, target: ContentRef) -> StoreResult<(i64, i64)> {
        let rows: Vec<&Reaction> = self
            .guard
            .reactions
            .iter()
            .filter(|r| r.target == target && r.active)
            .collect();
        Ok((
            count(rows.iter().filter(|r| r.recommend)),
            count(rows.iter().filter(|r| r.not_recommend)),
        ))
    }

    async fn find_block(&mut self, user: UserId, target: ContentRef) -> StoreResult<Option<Block>> {
        Ok(self
            .t()
            .blocks
            .iter()
            .find(|b| b.user_id == user && b.target == target)
            .cloned())
    }

    async fn save_block(&mut self, block: &Block) -> StoreResult<()> {
        upsert(&mut self.t().blocks, block, |b| {
            b.user_id == block.user_id && b.target == block.target
        });
        Ok(())
    }

    async fn list_active_blocks(&mut self, user: UserId) -> StoreResult<Vec<Block>> {
        Ok(self
            .t()
            .blocks
            .iter()
            .filter(|b| b.user_id == user && b.off)
            .cloned()
            .collect())
    }

    async fn find_report(&mut self, user: UserId, target: ContentRef) -> StoreResult<Option<Report>> {
        Ok(self
            .t()
            .reports
            .iter()
            .find(|r| r.user_id == user && r.target == target)
            .cloned())
    }

    async fn insert_report(&mut self, report: NewReport, now: DateTime<Utc>) -> StoreResult<Report> {
        let t = self.t();
        let row = Report {
            id: ReportId(t.next_id()),
            user_id: report.user_id,
            target: report.target,
            reason: report.reason,
            created_date: now,
        };
        t.reports.push(row.clone());
        Ok(row)
    }
}

impl NotificationStore for InMemoryTransaction {
    async fn insert_notification(
        &mut self,
        notification: NewNotification,
        now: DateTime<Utc>,
    ) -> StoreResult<Notification> {
        let t = self.t();
        let row = Notification {
            id: NotificationId(t.next_id()),
            user_id: notification.user_id,
            kind: notification.kind,
            title: notification.title,
            content: notification.content,
            read: false,
            created_date: now,
        };
        t.notifications.push(row.clone());
        Ok(row)
    }

    async fn list_notifications(&mut self, user: UserId) -> StoreResult<Vec<Notification>> {
        let rows = self
            .t()
            .notifications
            .iter()
            .filter(|n| n.user_id == user)
            .cloned()
            .collect();
        Ok(newest_first(rows, |n: &Notification| (n.created_date, n.id.0)))
    }

    async fn find_notification(&mut self, id: NotificationId) -> StoreResult<Option<Notification>> {
        Ok(self.t().notifications.iter().find(|n| n.id == id).cloned())
    }

    async fn mark_read(&mut self, id: NotificationId) -> StoreResult<()> {
        if let Some(row) = self.t().notifications.iter_mut().find(|n| n.id == id) {
            row.read = true;
        }
        Ok(())
    }

    async fn mark_all_read(&mut self, user: UserId) -> StoreResult<u64> {
        let mut marked = 0;
        for row in self
            .t()
            .notifications
            .iter_mut()
            .filter(|n| n.user_id == user && !n.read)
        {
            row.read = true;
            marked += 1;
        }
        Ok(marked)
    }

    async fn count_unread(&mut self, user: UserId) -> StoreResult<i64> {
        Ok(count(
            self.t()
                .notifications
                .iter()
                .filter(|n| n.user_id == user && !n.read),
        ))
    }

    async fn find_preference(
        &mut self,
        user: UserId,
        kind: NotificationType,
    ) -> StoreResult<Option<bool>> {
        Ok(self
            .t()
            .preferences
            .iter()
            .find(|(u, k, _)| *u == user && *k == kind)
            .map(|(_, _, enabled)| *enabled))
    }

    async fn save_preference(
        &mut self,
        user: UserId,
        kind: NotificationType,
        enabled: bool,
    ) -> StoreResult<()> {
        upsert(&mut self.t().preferences, &(user, kind, enabled), |(u, k, _)| {
            *u == user && *k == kind
        });
        Ok(())
    }

    async fn list_preferences(&mut self, user: UserId) -> StoreResult<Vec<(NotificationType, bool)>> {
        Ok(self
            .t()
            .preferences
            .iter()
            .filter(|(u, _, _)| *u == user)
            .map(|(_, k, enabled)| (*k, *enabled))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::test_clock;
    use webnovel_core::environment::Clock;
    use webnovel_core::types::Role;

    fn new_user(subject: &str) -> NewUser {
        NewUser {
            subject: subject.into(),
            role: Role::User,
            email: None,
        }
    }

    #[tokio::test]
    async fn committed_writes_are_visible() {
        let db = InMemoryDatabase::new();
        let now = test_clock().now();
        let mut tx = db.begin().await.unwrap();
        tx.insert_user(new_user("alice"), now).await.unwrap();
        tx.commit().await.unwrap();
        assert_eq!(db.snapshot().await.users.len(), 1);
    }

    #[tokio::test]
    async fn dropped_transaction_rolls_back() {
        let db = InMemoryDatabase::new();
        let now = test_clock().now();
        {
            let mut tx = db.begin().await.unwrap();
            let user = tx.insert_user(new_user("bob"), now).await.unwrap();
            tx.insert_cash_entry(user.id, 500, now).await.unwrap();
        }
        let tables = db.snapshot().await;
        assert!(tables.users.is_empty());
        assert!(tables.cash_entries.is_empty());
    }

    #[tokio::test]
    async fn touch_usage_reports_rows() {
        let db = InMemoryDatabase::new();
        let now = test_clock().now();
        let mut tx = db.begin().await.unwrap();
        assert_eq!(tx.touch_usage(UserId(1), ProductId(2), now).await.unwrap(), 0);
    }
}
