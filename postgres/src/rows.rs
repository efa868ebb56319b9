//! Row decoding.
//!
//! Tags are stored as their wire strings and flags as `'Y'` / `'N'`; both are
//! parsed back here so a corrupt value is a [`StoreError::Database`], never a
//! panic.

use crate::error::map_sqlx_error;
use sqlx::postgres::PgRow;
use sqlx::{Decode, Postgres, Row, Type};
use webnovel_core::store::{StoreError, StoreResult};
use webnovel_core::types::{
    AcquisitionType, AppliedPromotion, AppliedPromotionStatus, AppliedPromotionType, Block,
    Bookmark, CashEntry, CashReason, CashTransaction, Comment, ContentRef, ContractOffer,
    DirectPromotion, DirectPromotionStatus, DirectPromotionType, Episode, GiftItem,
    GiftTransaction, GiftTransactionType, Notification, NotificationType, OwnType, PriceType,
    Product, ProductStatus, ProductType, Profile, ProfitType, PromotionType, Rating, Reaction,
    Recent, Report, Review, Role, Ticket, TicketExpiration, TicketExpirationType, TicketType,
    UnknownTag, Usage, User, yn,
};

pub const USER_COLUMNS: &str =
    "id, subject, role, identity_verified_yn, phone, email, delete_yn, created_date";

pub const PROFILE_COLUMNS: &str =
    "id, user_id, nickname, free_rename_count, paid_rename_count, default_yn, created_date";

pub const PRODUCT_COLUMNS: &str = "id, author_id, title, price_type, rating, status, \
    product_type, primary_genre, sub_genre, keywords, cover_image_path, count_hit, \
    count_bookmark, count_recommend, count_review, last_episode_date, use_yn, created_date";

pub const EPISODE_COLUMNS: &str = "id, product_id, episode_no, title, price_type, open_yn, \
    publish_reserve_date, count_hit, count_recommend, count_not_recommend, count_comment, \
    use_yn, created_date";

pub const TICKET_COLUMNS: &str = "id, user_id, profile_id, product_id, episode_id, own_type, \
    ticket_type, acquisition_type, acquisition_id, source_promotion_id, rental_expired_date, \
    use_yn, use_date, created_date";

pub const GIFT_COLUMNS: &str = "id, user_id, product_id, episode_id, amount, ticket_type, \
    own_type, promotion_type, acquisition_type, acquisition_id, expiration_date, \
    ticket_expiration_type, ticket_expiration_value, received_yn, received_date, created_date";

pub const DIRECT_COLUMNS: &str = "id, product_id, author_id, type, status, \
    num_of_ticket_per_person, start_date, created_date, updated_date";

pub const APPLIED_COLUMNS: &str = "id, product_id, author_id, type, status, start_date, \
    end_date, num_of_ticket_per_person, created_date, updated_date";

pub const OFFER_COLUMNS: &str = "id, product_id, author_id, offerer_id, profit_type, \
    author_profit, offer_profit, advance_payment_range, message, author_accept_yn, \
    created_date, updated_date";

pub const COMMENT_COLUMNS: &str = "id, product_id, episode_id, user_id, profile_id, \
    parent_comment_id, content, display_top_yn, use_yn, count_recommend, count_not_recommend, \
    count_reply, created_date";

pub const REVIEW_COLUMNS: &str = "id, product_id, user_id, profile_id, content, \
    display_top_yn, use_yn, count_recommend, count_not_recommend, created_date";

pub const NOTIFICATION_COLUMNS: &str =
    "id, user_id, noti_type, title, content, read_yn, created_date";

fn get<'r, T>(row: &'r PgRow, column: &str) -> StoreResult<T>
where
    T: Decode<'r, Postgres> + Type<Postgres>,
{
    row.try_get(column).map_err(map_sqlx_error)
}

fn flag(row: &PgRow, column: &str) -> StoreResult<bool> {
    let text: String = get(row, column)?;
    yn::from_str(text.trim())
        .ok_or_else(|| StoreError::Database(format!("{column}: expected Y or N, got {text}")))
}

fn optional_flag(row: &PgRow, column: &str) -> StoreResult<Option<bool>> {
    let text: Option<String> = get(row, column)?;
    text.map(|t| {
        yn::from_str(t.trim())
            .ok_or_else(|| StoreError::Database(format!("{column}: expected Y or N, got {t}")))
    })
    .transpose()
}

fn tag<T>(row: &PgRow, column: &str, parse: fn(&str) -> Result<T, UnknownTag>) -> StoreResult<T> {
    let text: String = get(row, column)?;
    parse(&text).map_err(|e| StoreError::Database(e.to_string()))
}

fn optional_tag<T>(
    row: &PgRow,
    column: &str,
    parse: fn(&str) -> Result<T, UnknownTag>,
) -> StoreResult<Option<T>> {
    let text: Option<String> = get(row, column)?;
    text.map(|t| parse(&t).map_err(|e| StoreError::Database(e.to_string())))
        .transpose()
}

fn id<T: From<i64>>(row: &PgRow, column: &str) -> StoreResult<T> {
    get::<i64>(row, column).map(T::from)
}

fn optional_id<T: From<i64>>(row: &PgRow, column: &str) -> StoreResult<Option<T>> {
    get::<Option<i64>>(row, column).map(|v| v.map(T::from))
}

fn content_ref(row: &PgRow) -> StoreResult<ContentRef> {
    let kind: String = get(row, "target_type")?;
    let raw: i64 = get(row, "target_id")?;
    ContentRef::from_parts(&kind, raw)
        .ok_or_else(|| StoreError::Database(format!("target_type: unknown value {kind}")))
}

pub fn user(row: &PgRow) -> StoreResult<User> {
    Ok(User {
        id: id(row, "id")?,
        subject: get(row, "subject")?,
        role: tag(row, "role", Role::parse)?,
        identity_verified: flag(row, "identity_verified_yn")?,
        phone: get(row, "phone")?,
        email: get(row, "email")?,
        deleted: flag(row, "delete_yn")?,
        created_date: get(row, "created_date")?,
    })
}

pub fn profile(row: &PgRow) -> StoreResult<Profile> {
    Ok(Profile {
        id: id(row, "id")?,
        user_id: id(row, "user_id")?,
        nickname: get(row, "nickname")?,
        free_rename_count: get(row, "free_rename_count")?,
        paid_rename_count: get(row, "paid_rename_count")?,
        is_default: flag(row, "default_yn")?,
        created_date: get(row, "created_date")?,
    })
}

pub fn product(row: &PgRow) -> StoreResult<Product> {
    let keywords: String = get(row, "keywords")?;
    Ok(Product {
        id: id(row, "id")?,
        author_id: id(row, "author_id")?,
        title: get(row, "title")?,
        price_type: tag(row, "price_type", PriceType::parse)?,
        rating: tag(row, "rating", Rating::parse)?,
        status: tag(row, "status", ProductStatus::parse)?,
        product_type: tag(row, "product_type", ProductType::parse)?,
        primary_genre: get(row, "primary_genre")?,
        sub_genre: get(row, "sub_genre")?,
        keywords: Product::parse_keywords(&keywords),
        cover_image_path: get(row, "cover_image_path")?,
        count_hit: get(row, "count_hit")?,
        count_bookmark: get(row, "count_bookmark")?,
        count_recommend: get(row, "count_recommend")?,
        count_review: get(row, "count_review")?,
        last_episode_date: get(row, "last_episode_date")?,
        active: flag(row, "use_yn")?,
        created_date: get(row, "created_date")?,
    })
}

pub fn episode(row: &PgRow) -> StoreResult<Episode> {
    Ok(Episode {
        id: id(row, "id")?,
        product_id: id(row, "product_id")?,
        episode_no: get(row, "episode_no")?,
        title: get(row, "title")?,
        price_type: tag(row, "price_type", PriceType::parse)?,
        open: flag(row, "open_yn")?,
        publish_reserve_date: get(row, "publish_reserve_date")?,
        count_hit: get(row, "count_hit")?,
        count_recommend: get(row, "count_recommend")?,
        count_not_recommend: get(row, "count_not_recommend")?,
        count_comment: get(row, "count_comment")?,
        active: flag(row, "use_yn")?,
        created_date: get(row, "created_date")?,
    })
}

pub fn cash_entry(row: &PgRow) -> StoreResult<CashEntry> {
    Ok(CashEntry {
        id: get(row, "id")?,
        user_id: id(row, "user_id")?,
        balance: get(row, "balance")?,
        created_date: get(row, "created_date")?,
    })
}

pub fn cash_transaction(row: &PgRow) -> StoreResult<CashTransaction> {
    Ok(CashTransaction {
        id: get(row, "id")?,
        from_user: optional_id(row, "from_user")?,
        to_user: optional_id(row, "to_user")?,
        amount: get(row, "amount")?,
        reason: tag(row, "reason", CashReason::parse)?,
        created_date: get(row, "created_date")?,
    })
}

pub fn ticket(row: &PgRow) -> StoreResult<Ticket> {
    Ok(Ticket {
        id: id(row, "id")?,
        user_id: id(row, "user_id")?,
        profile_id: id(row, "profile_id")?,
        product_id: optional_id(row, "product_id")?,
        episode_id: optional_id(row, "episode_id")?,
        own_type: tag(row, "own_type", OwnType::parse)?,
        ticket_type: tag(row, "ticket_type", TicketType::parse)?,
        acquisition_type: tag(row, "acquisition_type", AcquisitionType::parse)?,
        acquisition_id: get(row, "acquisition_id")?,
        source_promotion_id: optional_id(row, "source_promotion_id")?,
        rental_expired_date: get(row, "rental_expired_date")?,
        used: flag(row, "use_yn")?,
        use_date: get(row, "use_date")?,
        created_date: get(row, "created_date")?,
    })
}

pub fn gift(row: &PgRow) -> StoreResult<GiftItem> {
    Ok(GiftItem {
        id: id(row, "id")?,
        user_id: id(row, "user_id")?,
        product_id: optional_id(row, "product_id")?,
        episode_id: optional_id(row, "episode_id")?,
        amount: get(row, "amount")?,
        ticket_type: tag(row, "ticket_type", TicketType::parse)?,
        own_type: tag(row, "own_type", OwnType::parse)?,
        promotion_type: optional_tag(row, "promotion_type", PromotionType::parse)?,
        acquisition_type: tag(row, "acquisition_type", AcquisitionType::parse)?,
        acquisition_id: get(row, "acquisition_id")?,
        expiration_date: get(row, "expiration_date")?,
        ticket_expiration: TicketExpiration {
            kind: tag(row, "ticket_expiration_type", TicketExpirationType::parse)?,
            value: get(row, "ticket_expiration_value")?,
        },
        received: flag(row, "received_yn")?,
        received_date: get(row, "received_date")?,
        created_date: get(row, "created_date")?,
    })
}

pub fn gift_transaction(row: &PgRow) -> StoreResult<GiftTransaction> {
    Ok(GiftTransaction {
        id: get(row, "id")?,
        kind: tag(row, "type", GiftTransactionType::parse)?,
        user_id: id(row, "user_id")?,
        giftbook_id: id(row, "giftbook_id")?,
        amount: get(row, "amount")?,
        reason: get(row, "reason")?,
        created_date: get(row, "created_date")?,
    })
}

pub fn bookmark(row: &PgRow) -> StoreResult<Bookmark> {
    Ok(Bookmark {
        user_id: id(row, "user_id")?,
        product_id: id(row, "product_id")?,
        active: flag(row, "use_yn")?,
        created_date: get(row, "created_date")?,
        updated_date: get(row, "updated_date")?,
    })
}

pub fn usage(row: &PgRow) -> StoreResult<Usage> {
    Ok(Usage {
        user_id: id(row, "user_id")?,
        product_id: id(row, "product_id")?,
        episode_id: id(row, "episode_id")?,
        recommend: flag(row, "recommend_yn")?,
        not_recommend: flag(row, "not_recommend_yn")?,
        created_date: get(row, "created_date")?,
        updated_date: get(row, "updated_date")?,
    })
}

pub fn recent(row: &PgRow) -> StoreResult<Recent> {
    Ok(Recent {
        user_id: id(row, "user_id")?,
        product_id: id(row, "product_id")?,
        episode_id: optional_id(row, "episode_id")?,
        active: flag(row, "use_yn")?,
        updated_date: get(row, "updated_date")?,
    })
}

pub fn direct_promotion(row: &PgRow) -> StoreResult<DirectPromotion> {
    Ok(DirectPromotion {
        id: id(row, "id")?,
        product_id: id(row, "product_id")?,
        author_id: id(row, "author_id")?,
        kind: tag(row, "type", DirectPromotionType::parse)?,
        status: tag(row, "status", DirectPromotionStatus::parse)?,
        num_of_ticket_per_person: get(row, "num_of_ticket_per_person")?,
        start_date: get(row, "start_date")?,
        created_date: get(row, "created_date")?,
        updated_date: get(row, "updated_date")?,
    })
}

pub fn applied_promotion(row: &PgRow) -> StoreResult<AppliedPromotion> {
    Ok(AppliedPromotion {
        id: id(row, "id")?,
        product_id: id(row, "product_id")?,
        author_id: id(row, "author_id")?,
        kind: tag(row, "type", AppliedPromotionType::parse)?,
        status: tag(row, "status", AppliedPromotionStatus::parse)?,
        start_date: get(row, "start_date")?,
        end_date: get(row, "end_date")?,
        num_of_ticket_per_person: get(row, "num_of_ticket_per_person")?,
        created_date: get(row, "created_date")?,
        updated_date: get(row, "updated_date")?,
    })
}

pub fn contract_offer(row: &PgRow) -> StoreResult<ContractOffer> {
    Ok(ContractOffer {
        id: id(row, "id")?,
        product_id: id(row, "product_id")?,
        author_id: id(row, "author_id")?,
        offerer_id: id(row, "offerer_id")?,
        profit_type: tag(row, "profit_type", ProfitType::parse)?,
        author_profit: get(row, "author_profit")?,
        offer_profit: get(row, "offer_profit")?,
        advance_payment_range: get(row, "advance_payment_range")?,
        message: get(row, "message")?,
        author_accept: optional_flag(row, "author_accept_yn")?,
        created_date: get(row, "created_date")?,
        updated_date: get(row, "updated_date")?,
    })
}

pub fn comment(row: &PgRow) -> StoreResult<Comment> {
    Ok(Comment {
        id: id(row, "id")?,
        product_id: id(row, "product_id")?,
        episode_id: id(row, "episode_id")?,
        user_id: id(row, "user_id")?,
        profile_id: id(row, "profile_id")?,
        parent_id: optional_id(row, "parent_comment_id")?,
        content: get(row, "content")?,
        display_top: flag(row, "display_top_yn")?,
        active: flag(row, "use_yn")?,
        count_recommend: get(row, "count_recommend")?,
        count_not_recommend: get(row, "count_not_recommend")?,
        count_reply: get(row, "count_reply")?,
        created_date: get(row, "created_date")?,
    })
}

pub fn review(row: &PgRow) -> StoreResult<Review> {
    Ok(Review {
        id: id(row, "id")?,
        product_id: id(row, "product_id")?,
        user_id: id(row, "user_id")?,
        profile_id: id(row, "profile_id")?,
        content: get(row, "content")?,
        display_top: flag(row, "display_top_yn")?,
        active: flag(row, "use_yn")?,
        count_recommend: get(row, "count_recommend")?,
        count_not_recommend: get(row, "count_not_recommend")?,
        created_date: get(row, "created_date")?,
    })
}

pub fn reaction(row: &PgRow) -> StoreResult<Reaction> {
    Ok(Reaction {
        user_id: id(row, "user_id")?,
        target: content_ref(row)?,
        recommend: flag(row, "recommend_yn")?,
        not_recommend: flag(row, "not_recommend_yn")?,
        active: flag(row, "use_yn")?,
    })
}

pub fn block(row: &PgRow) -> StoreResult<Block> {
    Ok(Block {
        user_id: id(row, "user_id")?,
        target: content_ref(row)?,
        target_user_id: id(row, "target_user_id")?,
        off: flag(row, "off_yn")?,
    })
}

pub fn report(row: &PgRow) -> StoreResult<Report> {
    Ok(Report {
        id: id(row, "id")?,
        user_id: id(row, "user_id")?,
        target: content_ref(row)?,
        reason: get(row, "reason")?,
        created_date: get(row, "created_date")?,
    })
}

pub fn notification(row: &PgRow) -> StoreResult<Notification> {
    Ok(Notification {
        id: id(row, "id")?,
        user_id: id(row, "user_id")?,
        kind: tag(row, "noti_type", NotificationType::parse)?,
        title: get(row, "title")?,
        content: get(row, "content")?,
        read: flag(row, "read_yn")?,
        created_date: get(row, "created_date")?,
    })
}

pub fn preference(row: &PgRow) -> StoreResult<(NotificationType, bool)> {
    Ok((
        tag(row, "noti_type", NotificationType::parse)?,
        flag(row, "enable_yn")?,
    ))
}

/// Decode `rows` with `decode`, failing on the first bad row.
pub fn all<T>(rows: &[PgRow], decode: fn(&PgRow) -> StoreResult<T>) -> StoreResult<Vec<T>> {
    rows.iter().map(decode).collect()
}

/// Decode an optional row.
pub fn optional<T>(
    row: Option<&PgRow>,
    decode: fn(&PgRow) -> StoreResult<T>,
) -> StoreResult<Option<T>> {
    row.map(decode).transpose()
}
