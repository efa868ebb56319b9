//! Command facade.
//!
//! [`Platform`] is the only place transactions begin and commit. Each method
//! reads the clock once, opens a transaction, runs one or more services in
//! it, and commits. A failed command drops its transaction, which rolls back
//! every write the services made.

use crate::services::promotion::{applied, claims, direct};
use crate::services::{
    ServiceContext, account, catalog, composer, contract, engagement, giftbox, inventory, ledger,
    library, notification, purchase,
};
use std::sync::Arc;
use std::time::Instant;
use webnovel_core::calendar::WeekCalendar;
use webnovel_core::environment::Clock;
use webnovel_core::rules::promotion::{AppliedAction, DirectAction};
use webnovel_core::store::{Database, Transaction};
use webnovel_core::types::{
    AppliedPromotion, AppliedPromotionId, AppliedPromotionStatus, Bookmark, CashTransaction,
    Comment, CommentId, ContentRef, ContractOffer, ContractOfferId, DirectPromotion,
    DirectPromotionId, Episode, EpisodeId, GiftId, GiftItem, GiftTransaction,
    GiftTransactionType, Notification, NotificationId, NotificationType, OwnType, PriceType,
    Product, ProductId, ProductStatus, Profile, ProfileId, ReactionKind, Recent, Report, Review,
    ReviewId, Role, Ticket, User, UserId,
};
use webnovel_core::{DateTime, ErrorKind, PlatformError, PlatformResult, Utc};
use webnovel_runtime::metrics::OperationMetrics;

/// Run one command in its own transaction and record its duration.
macro_rules! command {
    ($self:ident, $operation:literal, |$tx:ident, $ctx:ident| $call:expr) => {{
        let started = Instant::now();
        let $ctx = $self.context();
        let result = async {
            let mut $tx = $self.db.begin().await?;
            let value = $call.await?;
            $tx.commit().await?;
            Ok::<_, PlatformError>(value)
        }
        .await;
        OperationMetrics::record($operation, outcome(&result), started.elapsed());
        if let Err(error) = &result {
            if error.kind() == ErrorKind::Transient {
                tracing::error!(operation = $operation, error = %error, "Command failed");
            } else {
                tracing::debug!(operation = $operation, error = %error, "Command rejected");
            }
        }
        result
    }};
}

fn outcome<T>(result: &PlatformResult<T>) -> &'static str {
    match result {
        Ok(_) => "ok",
        Err(error) if error.kind() == ErrorKind::Transient => "error",
        Err(_) => "rejected",
    }
}

/// The platform's command and query surface.
pub struct Platform<D> {
    db: Arc<D>,
    clock: Arc<dyn Clock>,
    calendar: WeekCalendar,
}

impl<D> Clone for Platform<D> {
    fn clone(&self) -> Self {
        Self {
            db: Arc::clone(&self.db),
            clock: Arc::clone(&self.clock),
            calendar: self.calendar,
        }
    }
}

impl<D: Database> Platform<D> {
    /// Facade over `db`, reading time from `clock`.
    #[must_use]
    pub fn new(db: Arc<D>, clock: Arc<dyn Clock>, calendar: WeekCalendar) -> Self {
        Self {
            db,
            clock,
            calendar,
        }
    }

    /// Underlying database.
    #[must_use]
    pub fn database(&self) -> &Arc<D> {
        &self.db
    }

    /// Current time on the platform clock.
    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    fn context(&self) -> ServiceContext {
        ServiceContext::new(self.clock.now(), self.calendar)
    }

    /// Whether a transaction can be opened.
    pub async fn ready(&self) -> bool {
        match self.db.begin().await {
            Ok(tx) => tx.commit().await.is_ok(),
            Err(error) => {
                tracing::warn!(error = %error, "Readiness probe failed");
                false
            }
        }
    }

    // ----- accounts -------------------------------------------------------

    /// Map an identity-provider subject onto a user, creating it on first
    /// sight.
    ///
    /// # Errors
    ///
    /// See [`account::resolve_user`].
    pub async fn authenticate(&self, subject: &str, email: Option<&str>) -> PlatformResult<User> {
        command!(self, "authenticate", |tx, ctx| account::resolve_user(
            &mut tx, &ctx, subject, email
        ))
    }

    /// # Errors
    ///
    /// See [`account::list_profiles`].
    pub async fn list_profiles(&self, user: UserId) -> PlatformResult<Vec<Profile>> {
        command!(self, "list_profiles", |tx, _ctx| account::list_profiles(
            &mut tx, user
        ))
    }

    /// # Errors
    ///
    /// See [`account::create_profile`].
    pub async fn create_profile(&self, user: UserId, nickname: &str) -> PlatformResult<Profile> {
        command!(self, "create_profile", |tx, ctx| account::create_profile(
            &mut tx, &ctx, user, nickname
        ))
    }

    /// # Errors
    ///
    /// See [`account::set_default_profile`].
    pub async fn set_default_profile(
        &self,
        user: UserId,
        profile: ProfileId,
    ) -> PlatformResult<Profile> {
        command!(self, "set_default_profile", |tx, _ctx| {
            account::set_default_profile(&mut tx, user, profile)
        })
    }

    /// # Errors
    ///
    /// See [`account::change_nickname`].
    pub async fn change_nickname(
        &self,
        user: UserId,
        profile: ProfileId,
        nickname: &str,
    ) -> PlatformResult<Profile> {
        command!(self, "change_nickname", |tx, _ctx| account::change_nickname(
            &mut tx, user, profile, nickname
        ))
    }

    /// # Errors
    ///
    /// See [`account::verify_identity`].
    pub async fn verify_identity(&self, user: UserId, phone: &str) -> PlatformResult<User> {
        command!(self, "verify_identity", |tx, _ctx| account::verify_identity(
            &mut tx, user, phone
        ))
    }

    /// # Errors
    ///
    /// See [`account::withdraw`].
    pub async fn withdraw(&self, user: UserId) -> PlatformResult<User> {
        command!(self, "withdraw", |tx, ctx| account::withdraw(&mut tx, &ctx, user))
    }

    /// # Errors
    ///
    /// See [`account::grant_role`].
    pub async fn grant_role(&self, caller: &User, target: UserId, role: Role) -> PlatformResult<User> {
        command!(self, "grant_role", |tx, _ctx| account::grant_role(
            &mut tx, caller, target, role
        ))
    }

    // ----- catalog --------------------------------------------------------

    /// # Errors
    ///
    /// See [`catalog::create_product`].
    pub async fn create_product(
        &self,
        author: UserId,
        draft: catalog::ProductDraft,
    ) -> PlatformResult<Product> {
        command!(self, "create_product", |tx, ctx| catalog::create_product(
            &mut tx, &ctx, author, draft
        ))
    }

    /// # Errors
    ///
    /// See [`catalog::update_status`].
    pub async fn update_product_status(
        &self,
        author: UserId,
        product: ProductId,
        status: ProductStatus,
    ) -> PlatformResult<Product> {
        command!(self, "update_product_status", |tx, _ctx| {
            catalog::update_status(&mut tx, author, product, status)
        })
    }

    /// # Errors
    ///
    /// See [`catalog::create_episode`].
    pub async fn create_episode(
        &self,
        author: UserId,
        product: ProductId,
        title: &str,
        price_type: PriceType,
    ) -> PlatformResult<Episode> {
        command!(self, "create_episode", |tx, ctx| catalog::create_episode(
            &mut tx, &ctx, author, product, title, price_type
        ))
    }

    /// # Errors
    ///
    /// See [`catalog::publish_episode`].
    pub async fn publish_episode(
        &self,
        author: UserId,
        episode: EpisodeId,
        reserve: Option<DateTime<Utc>>,
    ) -> PlatformResult<Episode> {
        command!(self, "publish_episode", |tx, ctx| catalog::publish_episode(
            &mut tx, &ctx, author, episode, reserve
        ))
    }

    // ----- views ----------------------------------------------------------

    /// # Errors
    ///
    /// See [`composer::product_view`].
    pub async fn product_view(
        &self,
        product: ProductId,
        viewer: Option<UserId>,
    ) -> PlatformResult<composer::ProductView> {
        command!(self, "product_view", |tx, ctx| composer::product_view(
            &mut tx, &ctx, product, viewer
        ))
    }

    /// # Errors
    ///
    /// See [`composer::episode_list`].
    pub async fn episode_list(
        &self,
        product: ProductId,
        viewer: Option<UserId>,
    ) -> PlatformResult<Vec<composer::EpisodeItem>> {
        command!(self, "episode_list", |tx, ctx| composer::episode_list(
            &mut tx, &ctx, product, viewer
        ))
    }

    /// # Errors
    ///
    /// See [`composer::my_summary`].
    pub async fn my_summary(&self, user: UserId) -> PlatformResult<composer::MySummary> {
        command!(self, "my_summary", |tx, ctx| composer::my_summary(
            &mut tx, &ctx, user
        ))
    }

    // ----- cash and tickets -----------------------------------------------

    /// # Errors
    ///
    /// Storage failures.
    pub async fn balance(&self, user: UserId) -> PlatformResult<i64> {
        command!(self, "balance", |tx, _ctx| ledger::balance(&mut tx, user))
    }

    /// # Errors
    ///
    /// Storage failures.
    pub async fn cash_history(&self, user: UserId) -> PlatformResult<Vec<CashTransaction>> {
        command!(self, "cash_history", |tx, _ctx| ledger::history(&mut tx, user))
    }

    /// # Errors
    ///
    /// See [`ledger::grant`].
    pub async fn grant_cash(
        &self,
        admin: &User,
        target: UserId,
        amount: i64,
    ) -> PlatformResult<ledger::Movement> {
        command!(self, "grant_cash", |tx, ctx| ledger::grant(
            &mut tx, &ctx, admin, target, amount
        ))
    }

    /// # Errors
    ///
    /// Storage failures.
    pub async fn list_tickets(&self, user: UserId) -> PlatformResult<Vec<Ticket>> {
        command!(self, "list_tickets", |tx, _ctx| inventory::list(&mut tx, user))
    }

    /// # Errors
    ///
    /// See [`purchase::purchase_all_episodes`].
    pub async fn purchase_all_episodes(
        &self,
        user: UserId,
        product: ProductId,
        profile: ProfileId,
    ) -> PlatformResult<purchase::BulkPurchase> {
        command!(self, "purchase_all_episodes", |tx, ctx| {
            purchase::purchase_all_episodes(&mut tx, &ctx, user, product, profile)
        })
    }

    /// # Errors
    ///
    /// See [`purchase::sponsor`].
    pub async fn sponsor(
        &self,
        user: UserId,
        product: ProductId,
        profile: ProfileId,
        donation_price: i64,
        message: Option<String>,
    ) -> PlatformResult<purchase::Sponsorship> {
        command!(self, "sponsor", |tx, ctx| purchase::sponsor(
            &mut tx,
            &ctx,
            user,
            product,
            profile,
            donation_price,
            message
        ))
    }

    /// # Errors
    ///
    /// See [`purchase::purchase_episode`].
    pub async fn purchase_episode(
        &self,
        user: UserId,
        profile: ProfileId,
        episode: EpisodeId,
        own_type: OwnType,
    ) -> PlatformResult<Ticket> {
        command!(self, "purchase_episode", |tx, ctx| {
            purchase::purchase_episode(&mut tx, &ctx, user, profile, episode, own_type)
        })
    }

    /// # Errors
    ///
    /// See [`purchase::open_episode`].
    pub async fn open_episode(
        &self,
        user: UserId,
        episode: EpisodeId,
    ) -> PlatformResult<purchase::EpisodeAccess> {
        command!(self, "open_episode", |tx, ctx| purchase::open_episode(
            &mut tx, &ctx, user, episode
        ))
    }

    // ----- gift box -------------------------------------------------------

    /// # Errors
    ///
    /// Storage failures.
    pub async fn list_gifts(&self, user: UserId) -> PlatformResult<Vec<GiftItem>> {
        command!(self, "list_gifts", |tx, ctx| giftbox::list_pending(
            &mut tx, &ctx, user
        ))
    }

    /// # Errors
    ///
    /// See [`giftbox::receive`].
    pub async fn receive_gift(
        &self,
        user: UserId,
        gift: GiftId,
    ) -> PlatformResult<giftbox::GiftReceipt> {
        command!(self, "receive_gift", |tx, ctx| giftbox::receive(
            &mut tx, &ctx, user, gift
        ))
    }

    /// # Errors
    ///
    /// Storage failures.
    pub async fn gift_transactions(
        &self,
        user: UserId,
        kind: Option<GiftTransactionType>,
    ) -> PlatformResult<Vec<GiftTransaction>> {
        command!(self, "gift_transactions", |tx, _ctx| {
            giftbox::list_transactions(&mut tx, user, kind)
        })
    }

    // ----- library --------------------------------------------------------

    /// # Errors
    ///
    /// See [`library::toggle_bookmark`].
    pub async fn toggle_bookmark(
        &self,
        user: UserId,
        product: ProductId,
    ) -> PlatformResult<library::BookmarkState> {
        command!(self, "toggle_bookmark", |tx, ctx| library::toggle_bookmark(
            &mut tx, &ctx, user, product
        ))
    }

    /// # Errors
    ///
    /// Storage failures.
    pub async fn list_bookmarks(&self, user: UserId) -> PlatformResult<Vec<Bookmark>> {
        command!(self, "list_bookmarks", |tx, _ctx| library::list_bookmarks(
            &mut tx, user
        ))
    }

    /// # Errors
    ///
    /// See [`library::interest`].
    pub async fn interest(
        &self,
        user: UserId,
        product: ProductId,
    ) -> PlatformResult<library::Interest> {
        command!(self, "interest", |tx, ctx| async {
            catalog::find_product(&mut tx, product).await?;
            library::interest(&mut tx, &ctx, user, product).await
        })
    }

    /// # Errors
    ///
    /// See [`library::revive`].
    pub async fn revive_interest(
        &self,
        user: UserId,
        product: ProductId,
    ) -> PlatformResult<library::Interest> {
        command!(self, "revive_interest", |tx, ctx| library::revive(
            &mut tx, &ctx, user, product
        ))
    }

    /// # Errors
    ///
    /// Storage failures.
    pub async fn list_recent(&self, user: UserId) -> PlatformResult<Vec<Recent>> {
        command!(self, "list_recent", |tx, _ctx| library::list_recent(&mut tx, user))
    }

    /// # Errors
    ///
    /// See [`library::delete_recent`].
    pub async fn delete_recent(&self, user: UserId, product: ProductId) -> PlatformResult<()> {
        command!(self, "delete_recent", |tx, ctx| library::delete_recent(
            &mut tx, &ctx, user, product
        ))
    }

    /// # Errors
    ///
    /// See [`library::react_episode`].
    pub async fn react_episode(
        &self,
        user: UserId,
        episode: EpisodeId,
        kind: ReactionKind,
    ) -> PlatformResult<library::EpisodeReaction> {
        command!(self, "react_episode", |tx, _ctx| library::react_episode(
            &mut tx, user, episode, kind
        ))
    }

    // ----- direct promotions ----------------------------------------------

    /// # Errors
    ///
    /// See [`direct::list`].
    pub async fn list_direct_promotions(
        &self,
        author: UserId,
        product: ProductId,
    ) -> PlatformResult<Vec<DirectPromotion>> {
        command!(self, "list_direct_promotions", |tx, _ctx| direct::list(
            &mut tx, author, product
        ))
    }

    /// # Errors
    ///
    /// See [`direct::save`].
    pub async fn save_direct_promotions(
        &self,
        author: UserId,
        product: ProductId,
        num_of_ticket_per_person: i32,
    ) -> PlatformResult<Vec<DirectPromotion>> {
        command!(self, "save_direct_promotions", |tx, ctx| direct::save(
            &mut tx,
            &ctx,
            author,
            product,
            num_of_ticket_per_person
        ))
    }

    /// # Errors
    ///
    /// See [`direct::transition`].
    pub async fn transition_direct_promotion(
        &self,
        author: UserId,
        id: DirectPromotionId,
        action: DirectAction,
    ) -> PlatformResult<DirectPromotion> {
        command!(self, "transition_direct_promotion", |tx, ctx| {
            direct::transition(&mut tx, &ctx, author, id, action)
        })
    }

    /// # Errors
    ///
    /// See [`direct::issue_reader_of_prev`].
    pub async fn issue_reader_of_prev(
        &self,
        author: UserId,
        id: DirectPromotionId,
    ) -> PlatformResult<direct::ReaderOfPrevIssuance> {
        command!(self, "issue_reader_of_prev", |tx, ctx| {
            direct::issue_reader_of_prev(&mut tx, &ctx, author, id)
        })
    }

    /// # Errors
    ///
    /// See [`direct::issuance_status`].
    pub async fn issuance_status(
        &self,
        author: UserId,
        id: DirectPromotionId,
    ) -> PlatformResult<direct::IssuanceStatus> {
        command!(self, "issuance_status", |tx, ctx| direct::issuance_status(
            &mut tx, &ctx, author, id
        ))
    }

    // ----- applied promotions ---------------------------------------------

    /// # Errors
    ///
    /// See [`applied::apply`].
    pub async fn apply_promotion(
        &self,
        author: UserId,
        product: ProductId,
        application: applied::Application,
    ) -> PlatformResult<AppliedPromotion> {
        command!(self, "apply_promotion", |tx, ctx| applied::apply(
            &mut tx,
            &ctx,
            author,
            product,
            application
        ))
    }

    /// # Errors
    ///
    /// See [`applied::cancel`].
    pub async fn cancel_applied_promotion(
        &self,
        author: UserId,
        id: AppliedPromotionId,
    ) -> PlatformResult<AppliedPromotion> {
        command!(self, "cancel_applied_promotion", |tx, ctx| applied::cancel(
            &mut tx, &ctx, author, id
        ))
    }

    /// # Errors
    ///
    /// See [`applied::decide`].
    pub async fn decide_applied_promotion(
        &self,
        operator: &User,
        id: AppliedPromotionId,
        action: AppliedAction,
    ) -> PlatformResult<AppliedPromotion> {
        command!(self, "decide_applied_promotion", |tx, ctx| applied::decide(
            &mut tx, &ctx, operator, id, action
        ))
    }

    /// # Errors
    ///
    /// See [`applied::queue`].
    pub async fn applied_promotion_queue(
        &self,
        operator: &User,
        status: Option<AppliedPromotionStatus>,
    ) -> PlatformResult<Vec<AppliedPromotion>> {
        command!(self, "applied_promotion_queue", |tx, _ctx| applied::queue(
            &mut tx, operator, status
        ))
    }

    /// # Errors
    ///
    /// See [`applied::board`].
    pub async fn applied_promotion_board(
        &self,
        author: UserId,
        product: ProductId,
    ) -> PlatformResult<applied::AppliedPromotionBoard> {
        command!(self, "applied_promotion_board", |tx, ctx| applied::board(
            &mut tx, &ctx, author, product
        ))
    }

    /// # Errors
    ///
    /// Storage failures.
    pub async fn remaining_applied_slots(&self) -> PlatformResult<i64> {
        command!(self, "remaining_applied_slots", |tx, ctx| {
            applied::remaining_slots(&mut tx, &ctx)
        })
    }

    // ----- claims ---------------------------------------------------------

    /// # Errors
    ///
    /// See [`claims::claim_free_for_first`].
    pub async fn claim_free_for_first(
        &self,
        user: UserId,
        product: ProductId,
    ) -> PlatformResult<GiftItem> {
        command!(self, "claim_free_for_first", |tx, ctx| {
            claims::claim_free_for_first(&mut tx, &ctx, user, product)
        })
    }

    /// # Errors
    ///
    /// See [`claims::claim_waiting_for_free`].
    pub async fn claim_waiting_for_free(
        &self,
        user: UserId,
        product: ProductId,
    ) -> PlatformResult<GiftItem> {
        command!(self, "claim_waiting_for_free", |tx, ctx| {
            claims::claim_waiting_for_free(&mut tx, &ctx, user, product)
        })
    }

    /// # Errors
    ///
    /// See [`claims::claim_six_nine_path`].
    pub async fn claim_six_nine_path(
        &self,
        user: UserId,
        product: ProductId,
    ) -> PlatformResult<GiftItem> {
        command!(self, "claim_six_nine_path", |tx, ctx| {
            claims::claim_six_nine_path(&mut tx, &ctx, user, product)
        })
    }

    // ----- contract offers ------------------------------------------------

    /// # Errors
    ///
    /// See [`contract::create_offer`].
    pub async fn create_contract_offer(
        &self,
        offerer: UserId,
        product: ProductId,
        terms: contract::OfferTerms,
    ) -> PlatformResult<ContractOffer> {
        command!(self, "create_contract_offer", |tx, ctx| {
            contract::create_offer(&mut tx, &ctx, offerer, product, terms)
        })
    }

    /// # Errors
    ///
    /// See [`contract::accept`].
    pub async fn accept_contract_offer(
        &self,
        author: UserId,
        id: ContractOfferId,
    ) -> PlatformResult<ContractOffer> {
        command!(self, "accept_contract_offer", |tx, ctx| contract::accept(
            &mut tx, &ctx, author, id
        ))
    }

    /// # Errors
    ///
    /// See [`contract::reject`].
    pub async fn reject_contract_offer(
        &self,
        author: UserId,
        id: ContractOfferId,
    ) -> PlatformResult<ContractOffer> {
        command!(self, "reject_contract_offer", |tx, ctx| contract::reject(
            &mut tx, &ctx, author, id
        ))
    }

    /// # Errors
    ///
    /// Storage failures.
    pub async fn received_contract_offers(
        &self,
        author: UserId,
    ) -> PlatformResult<Vec<ContractOffer>> {
        command!(self, "received_contract_offers", |tx, _ctx| {
            contract::list_received(&mut tx, author)
        })
    }

    /// # Errors
    ///
    /// Storage failures.
    pub async fn sent_contract_offers(
        &self,
        offerer: UserId,
    ) -> PlatformResult<Vec<contract::SentOffer>> {
        command!(self, "sent_contract_offers", |tx, _ctx| contract::list_sent(
            &mut tx, offerer
        ))
    }

    // ----- engagement -----------------------------------------------------

    /// # Errors
    ///
    /// See [`engagement::create_comment`].
    pub async fn create_comment(
        &self,
        user: UserId,
        profile: Option<ProfileId>,
        episode: EpisodeId,
        parent: Option<CommentId>,
        content: &str,
    ) -> PlatformResult<Comment> {
        command!(self, "create_comment", |tx, ctx| engagement::create_comment(
            &mut tx, &ctx, user, profile, episode, parent, content
        ))
    }

    /// # Errors
    ///
    /// See [`engagement::delete_comment`].
    pub async fn delete_comment(&self, user: UserId, id: CommentId) -> PlatformResult<()> {
        command!(self, "delete_comment", |tx, _ctx| engagement::delete_comment(
            &mut tx, user, id
        ))
    }

    /// # Errors
    ///
    /// Storage failures.
    pub async fn list_comments(
        &self,
        viewer: Option<UserId>,
        episode: EpisodeId,
    ) -> PlatformResult<Vec<Comment>> {
        command!(self, "list_comments", |tx, _ctx| engagement::list_comments(
            &mut tx, viewer, episode
        ))
    }

    /// # Errors
    ///
    /// See [`engagement::create_review`].
    pub async fn create_review(
        &self,
        user: UserId,
        profile: Option<ProfileId>,
        product: ProductId,
        content: &str,
    ) -> PlatformResult<Review> {
        command!(self, "create_review", |tx, ctx| engagement::create_review(
            &mut tx, &ctx, user, profile, product, content
        ))
    }

    /// # Errors
    ///
    /// See [`engagement::delete_review`].
    pub async fn delete_review(&self, user: UserId, id: ReviewId) -> PlatformResult<()> {
        command!(self, "delete_review", |tx, _ctx| engagement::delete_review(
            &mut tx, user, id
        ))
    }

    /// # Errors
    ///
    /// Storage failures.
    pub async fn list_reviews(
        &self,
        viewer: Option<UserId>,
        product: ProductId,
    ) -> PlatformResult<Vec<Review>> {
        command!(self, "list_reviews", |tx, _ctx| engagement::list_reviews(
            &mut tx, viewer, product
        ))
    }

    /// # Errors
    ///
    /// See [`engagement::react`].
    pub async fn react(
        &self,
        user: UserId,
        target: ContentRef,
        kind: ReactionKind,
    ) -> PlatformResult<engagement::ReactionState> {
        command!(self, "react", |tx, _ctx| engagement::react(
            &mut tx, user, target, kind
        ))
    }

    /// # Errors
    ///
    /// See [`engagement::toggle_pin`].
    pub async fn toggle_pin(
        &self,
        user: UserId,
        target: ContentRef,
    ) -> PlatformResult<engagement::PinState> {
        command!(self, "toggle_pin", |tx, _ctx| engagement::toggle_pin(
            &mut tx, user, target
        ))
    }

    /// # Errors
    ///
    /// See [`engagement::toggle_block`].
    pub async fn toggle_block(
        &self,
        user: UserId,
        target: ContentRef,
    ) -> PlatformResult<engagement::BlockState> {
        command!(self, "toggle_block", |tx, _ctx| engagement::toggle_block(
            &mut tx, user, target
        ))
    }

    /// # Errors
    ///
    /// See [`engagement::report`].
    pub async fn report(
        &self,
        user: UserId,
        target: ContentRef,
        reason: &str,
    ) -> PlatformResult<Report> {
        command!(self, "report", |tx, ctx| engagement::report(
            &mut tx, &ctx, user, target, reason
        ))
    }

    // ----- notifications --------------------------------------------------

    /// # Errors
    ///
    /// Storage failures.
    pub async fn notifications(&self, user: UserId) -> PlatformResult<Vec<Notification>> {
        command!(self, "notifications", |tx, _ctx| notification::list(&mut tx, user))
    }

    /// # Errors
    ///
    /// See [`notification::mark_read`].
    pub async fn mark_notification_read(
        &self,
        user: UserId,
        id: NotificationId,
    ) -> PlatformResult<Notification> {
        command!(self, "mark_notification_read", |tx, _ctx| {
            notification::mark_read(&mut tx, user, id)
        })
    }

    /// # Errors
    ///
    /// Storage failures.
    pub async fn mark_all_notifications_read(&self, user: UserId) -> PlatformResult<u64> {
        command!(self, "mark_all_notifications_read", |tx, _ctx| {
            notification::mark_all_read(&mut tx, user)
        })
    }

    /// # Errors
    ///
    /// Storage failures.
    pub async fn notification_preferences(
        &self,
        user: UserId,
    ) -> PlatformResult<Vec<notification::Preference>> {
        command!(self, "notification_preferences", |tx, _ctx| {
            notification::list_preferences(&mut tx, user)
        })
    }

    /// # Errors
    ///
    /// Storage failures.
    pub async fn set_notification_preference(
        &self,
        user: UserId,
        kind: NotificationType,
        enabled: bool,
    ) -> PlatformResult<notification::Preference> {
        command!(self, "set_notification_preference", |tx, _ctx| {
            notification::set_preference(&mut tx, user, kind, enabled)
        })
    }
}
