//! Cash, purchases, sponsorship and episode access through the facade.

#![allow(clippy::expect_used, clippy::unwrap_used)]

mod common;

use common::Harness;
use webnovel_core::types::{CashReason, NotificationType, OwnType, Role};
use webnovel_core::{ErrorCode, ErrorKind};
use webnovel_platform::services::purchase::Access;

#[tokio::test]
async fn bulk_purchase_buys_every_unowned_paid_episode() {
    let h = Harness::new();
    let work = h.work("author", 1, 3).await;
    let reader = h.reader("reader").await;
    h.credit(&reader, 400).await;

    let outcome = h
        .platform
        .purchase_all_episodes(reader.user.id, work.product.id, reader.profile.id)
        .await
        .unwrap();
    assert_eq!(outcome.purchased_count, 3);
    assert_eq!(outcome.total_cash_used, 300);
    assert_eq!(outcome.skipped_free_count, 0);
    assert_eq!(outcome.skipped_owned_count, 0);
    assert_eq!(h.platform.balance(reader.user.id).await.unwrap(), 100);

    let again = h
        .platform
        .purchase_all_episodes(reader.user.id, work.product.id, reader.profile.id)
        .await
        .unwrap();
    assert_eq!(again.purchased_count, 0);
    assert_eq!(again.skipped_owned_count, 3);

    let tables = h.db.snapshot().await;
    assert_eq!(tables.cash_sum(reader.user.id), 100);
    let history = h.platform.cash_history(reader.user.id).await.unwrap();
    assert_eq!(
        history
            .iter()
            .filter(|t| t.reason == CashReason::BulkPurchase)
            .count(),
        1
    );
    let tickets = h.platform.list_tickets(reader.user.id).await.unwrap();
    assert_eq!(tickets.len(), 3);
    assert!(tickets.iter().all(|t| t.own_type == OwnType::Own));
}

#[tokio::test]
async fn bulk_purchase_without_enough_cash_writes_nothing() {
    let h = Harness::new();
    let work = h.work("author", 0, 3).await;
    let reader = h.reader("reader").await;
    h.credit(&reader, 200).await;

    let error = h
        .platform
        .purchase_all_episodes(reader.user.id, work.product.id, reader.profile.id)
        .await
        .unwrap_err();
    assert_eq!(error.kind(), ErrorKind::InsufficientFunds);
    assert!(error.is(ErrorCode::InsufficientCash));

    assert_eq!(h.platform.balance(reader.user.id).await.unwrap(), 200);
    assert!(h.platform.list_tickets(reader.user.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn bulk_purchase_rejects_someone_elses_profile() {
    let h = Harness::new();
    let work = h.work("author", 0, 1).await;
    let reader = h.reader("reader").await;
    let other = h.reader("other").await;
    h.credit(&reader, 100).await;

    let error = h
        .platform
        .purchase_all_episodes(reader.user.id, work.product.id, other.profile.id)
        .await
        .unwrap_err();
    assert!(error.is(ErrorCode::NotResourceOwner));
}

#[tokio::test]
async fn sponsorship_debits_the_donor_and_notifies_the_author() {
    let h = Harness::new();
    let work = h.work("author", 0, 1).await;
    let reader = h.reader("reader").await;
    h.credit(&reader, 200).await;

    let zero = h
        .platform
        .sponsor(reader.user.id, work.product.id, reader.profile.id, 0, None)
        .await
        .unwrap_err();
    assert!(zero.is(ErrorCode::InvalidDonationPrice));

    let outcome = h
        .platform
        .sponsor(
            reader.user.id,
            work.product.id,
            reader.profile.id,
            150,
            Some("keep going".into()),
        )
        .await
        .unwrap();
    assert_eq!(outcome.remaining_balance, 50);
    assert_eq!(h.platform.balance(work.author.user.id).await.unwrap(), 0);

    let notices = h.platform.notifications(work.author.user.id).await.unwrap();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].kind, NotificationType::Sponsor);
    assert_eq!(notices[0].content.as_deref(), Some("keep going"));
}

#[tokio::test]
async fn muted_sponsor_notifications_are_not_written() {
    let h = Harness::new();
    let work = h.work("author", 0, 1).await;
    let reader = h.reader("reader").await;
    h.credit(&reader, 100).await;

    h.platform
        .set_notification_preference(work.author.user.id, NotificationType::Sponsor, false)
        .await
        .unwrap();
    h.platform
        .sponsor(reader.user.id, work.product.id, reader.profile.id, 100, None)
        .await
        .unwrap();

    assert!(h.platform.notifications(work.author.user.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn single_purchase_and_open() {
    let h = Harness::new();
    let work = h.work("author", 1, 2).await;
    let reader = h.reader("reader").await;
    h.credit(&reader, 100).await;
    let free = &work.episodes[0];
    let paid = work.paid();

    let opened = h.platform.open_episode(reader.user.id, free.id).await.unwrap();
    assert_eq!(opened.access, Access::Free);
    assert_eq!(opened.episode.count_hit, 1);

    let locked = h
        .platform
        .open_episode(reader.user.id, paid[0].id)
        .await
        .unwrap_err();
    assert!(locked.is(ErrorCode::NoUsableTicket));

    h.platform
        .purchase_episode(reader.user.id, reader.profile.id, paid[0].id, OwnType::Own)
        .await
        .unwrap();
    let owned = h.platform.open_episode(reader.user.id, paid[0].id).await.unwrap();
    assert_eq!(owned.access, Access::Owned);

    let twice = h
        .platform
        .purchase_episode(reader.user.id, reader.profile.id, paid[0].id, OwnType::Own)
        .await
        .unwrap_err();
    assert!(twice.is(ErrorCode::EpisodeAlreadyOwned));

    let broke = h
        .platform
        .purchase_episode(reader.user.id, reader.profile.id, paid[1].id, OwnType::Rental)
        .await
        .unwrap_err();
    assert_eq!(broke.kind(), ErrorKind::InsufficientFunds);

    let free_purchase = h
        .platform
        .purchase_episode(reader.user.id, reader.profile.id, free.id, OwnType::Own)
        .await
        .unwrap_err();
    assert!(free_purchase.is(ErrorCode::NothingToPurchase));
}

#[tokio::test]
async fn authors_read_their_own_paid_episodes() {
    let h = Harness::new();
    let work = h.work("author", 0, 1).await;

    let opened = h
        .platform
        .open_episode(work.author.user.id, work.episodes[0].id)
        .await
        .unwrap();
    assert_eq!(opened.access, Access::Author);
}

#[tokio::test]
async fn only_admins_grant_cash() {
    let h = Harness::new();
    let admin = h.account("admin", Role::Admin).await;
    let reader = h.reader("reader").await;

    let denied = h
        .platform
        .grant_cash(&reader.user, reader.user.id, 500)
        .await
        .unwrap_err();
    assert!(denied.is(ErrorCode::OperatorOnly));

    let movement = h
        .platform
        .grant_cash(&admin.user, reader.user.id, 500)
        .await
        .unwrap();
    assert_eq!(movement.balance, 500);
    assert_eq!(movement.transaction.reason, CashReason::Charge);

    let negative = h
        .platform
        .grant_cash(&admin.user, reader.user.id, -1)
        .await
        .unwrap_err();
    assert!(negative.is(ErrorCode::InvalidCashAmount));
}
