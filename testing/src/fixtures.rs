//! Seeding helpers.
//!
//! Helpers write rows straight through the store traits so they work on any
//! [`Transaction`]; they bypass the services' business checks.

use chrono::{DateTime, Utc};
use webnovel_core::store::{
    AccountStore, CatalogStore, LedgerStore, PromotionStore, StoreResult, Transaction,
};
use webnovel_core::types::{
    AppliedPromotion, AppliedPromotionStatus, AppliedPromotionType, CashReason, Episode,
    NewAppliedPromotion, NewCashTransaction, NewEpisode, NewProduct, NewProfile, NewUser,
    PriceType, Product, ProductType, Profile, Rating, Role, User, UserId,
};

/// A user with their default profile.
#[derive(Debug, Clone)]
pub struct Account {
    /// User row
    pub user: User,
    /// Default profile
    pub profile: Profile,
}

/// Create a user with `role`, a default profile named after `subject`, and
/// identity verification already passed.
///
/// # Errors
///
/// Propagates store failures.
pub async fn account<T: Transaction>(
    tx: &mut T,
    subject: &str,
    role: Role,
    now: DateTime<Utc>,
) -> StoreResult<Account> {
    let mut user = tx
        .insert_user(
            NewUser {
                subject: subject.to_string(),
                role,
                email: Some(format!("{subject}@example.com")),
            },
            now,
        )
        .await?;
    user.identity_verified = true;
    tx.update_user(&user).await?;
    let profile = tx
        .insert_profile(
            NewProfile {
                user_id: user.id,
                nickname: subject.to_string(),
                is_default: true,
            },
            now,
        )
        .await?;
    Ok(Account { user, profile })
}

/// A verified reader.
///
/// # Errors
///
/// Propagates store failures.
pub async fn reader<T: Transaction>(
    tx: &mut T,
    subject: &str,
    now: DateTime<Utc>,
) -> StoreResult<Account> {
    account(tx, subject, Role::User, now).await
}

/// A verified author.
///
/// # Errors
///
/// Propagates store failures.
pub async fn author<T: Transaction>(
    tx: &mut T,
    subject: &str,
    now: DateTime<Utc>,
) -> StoreResult<Account> {
    account(tx, subject, Role::Author, now).await
}

/// A paid product owned by `author`.
///
/// # Errors
///
/// Propagates store failures.
pub async fn product<T: Transaction>(
    tx: &mut T,
    author: UserId,
    title: &str,
    now: DateTime<Utc>,
) -> StoreResult<Product> {
    tx.insert_product(
        NewProduct {
            author_id: author,
            title: title.to_string(),
            price_type: PriceType::Paid,
            rating: Rating::All,
            product_type: ProductType::Paid,
            primary_genre: Some("fantasy".into()),
            sub_genre: None,
            keywords: vec!["regression".into()],
            cover_image_path: None,
        },
        now,
    )
    .await
}

/// An open episode numbered after the product's last one.
///
/// # Errors
///
/// Propagates store failures.
pub async fn open_episode<T: Transaction>(
    tx: &mut T,
    product: &Product,
    price_type: PriceType,
    now: DateTime<Utc>,
) -> StoreResult<Episode> {
    let next_no = tx
        .list_episodes(product.id)
        .await?
        .last()
        .map_or(1, |e| e.episode_no + 1);
    let mut episode = tx
        .insert_episode(
            NewEpisode {
                product_id: product.id,
                episode_no: next_no,
                title: format!("Episode {next_no}"),
                price_type,
            },
            now,
        )
        .await?;
    episode.open = true;
    tx.update_episode(&episode).await?;
    Ok(episode)
}

/// `count` open paid episodes.
///
/// # Errors
///
/// Propagates store failures.
pub async fn paid_episodes<T: Transaction>(
    tx: &mut T,
    product: &Product,
    count: usize,
    now: DateTime<Utc>,
) -> StoreResult<Vec<Episode>> {
    let mut episodes = Vec::with_capacity(count);
    for _ in 0..count {
        episodes.push(open_episode(tx, product, PriceType::Paid, now).await?);
    }
    Ok(episodes)
}

/// Top up a user's cash.
///
/// # Errors
///
/// Propagates store failures.
pub async fn credit<T: Transaction>(
    tx: &mut T,
    user: UserId,
    amount: i64,
    now: DateTime<Utc>,
) -> StoreResult<()> {
    tx.insert_cash_entry(user, amount, now).await?;
    tx.insert_cash_transaction(
        NewCashTransaction {
            from_user: None,
            to_user: Some(user),
            amount,
            reason: CashReason::Charge,
        },
        now,
    )
    .await?;
    Ok(())
}

/// An applied promotion forced into `status`, created at `now`.
///
/// # Errors
///
/// Propagates store failures.
pub async fn applied_promotion<T: Transaction>(
    tx: &mut T,
    product: &Product,
    kind: AppliedPromotionType,
    status: AppliedPromotionStatus,
    now: DateTime<Utc>,
) -> StoreResult<AppliedPromotion> {
    let mut row = tx
        .insert_applied(
            NewAppliedPromotion {
                product_id: product.id,
                author_id: product.author_id,
                kind,
                start_date: now,
                end_date: now + chrono::Duration::days(30),
                num_of_ticket_per_person: 1,
            },
            now,
        )
        .await?;
    row.status = status;
    tx.update_applied(&row).await?;
    Ok(row)
}
