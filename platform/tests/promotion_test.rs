//! Direct and applied promotions, reader claims, gifts and contract offers.

#![allow(clippy::expect_used, clippy::unwrap_used)]

mod common;

use chrono::{Duration, NaiveDate};
use common::Harness;
use webnovel_core::ErrorCode;
use webnovel_core::rules::promotion::{AppliedAction, DirectAction};
use webnovel_core::store::Transaction;
use webnovel_core::types::{
    AppliedPromotionStatus, AppliedPromotionType, DirectPromotionStatus, DirectPromotionType,
    NotificationType, OwnType, PromotionType, Role, TicketExpiration,
};
use webnovel_platform::services::contract::OfferTerms;
use webnovel_platform::services::promotion::applied::Application;
use webnovel_platform::services::purchase::Access;
use webnovel_testing::fixtures;

fn application(h: &Harness, kind: AppliedPromotionType) -> Application {
    Application {
        kind,
        start_date: h.now(),
        end_date: h.now() + Duration::days(14),
        num_of_ticket_per_person: 1,
    }
}

#[tokio::test]
async fn free_for_first_tickets_follow_their_promotion() {
    let h = Harness::new();
    let work = h.work("author", 0, 2).await;
    let reader = h.reader("reader").await;
    let paid = work.paid();

    let not_running = h
        .platform
        .claim_free_for_first(reader.user.id, work.product.id)
        .await
        .unwrap_err();
    assert!(not_running.is(ErrorCode::PromotionNotInProgress));

    let saved = h
        .platform
        .save_direct_promotions(work.author.user.id, work.product.id, 2)
        .await
        .unwrap();
    assert_eq!(saved.len(), 2);
    assert!(saved.iter().all(|p| p.status == DirectPromotionStatus::Pending));
    let free_for_first = saved
        .iter()
        .find(|p| p.kind == DirectPromotionType::FreeForFirst)
        .unwrap()
        .clone();
    let started = h
        .platform
        .transition_direct_promotion(work.author.user.id, free_for_first.id, DirectAction::Start)
        .await
        .unwrap();
    assert_eq!(started.status, DirectPromotionStatus::Ing);

    let author_claim = h
        .platform
        .claim_free_for_first(work.author.user.id, work.product.id)
        .await
        .unwrap_err();
    assert!(author_claim.is(ErrorCode::ClaimNotAvailable));

    let gift = h
        .platform
        .claim_free_for_first(reader.user.id, work.product.id)
        .await
        .unwrap();
    assert_eq!(gift.amount, Some(2));
    assert_eq!(gift.own_type, OwnType::Rental);
    assert_eq!(gift.promotion_type, Some(PromotionType::FreeForFirst));

    let again = h
        .platform
        .claim_free_for_first(reader.user.id, work.product.id)
        .await
        .unwrap_err();
    assert!(again.is(ErrorCode::ClaimNotAvailable));

    let receipt = h.platform.receive_gift(reader.user.id, gift.id).await.unwrap();
    assert_eq!(receipt.tickets.len(), 2);
    assert_eq!(receipt.ticket_expired_date, None);
    assert!(
        receipt
            .tickets
            .iter()
            .all(|t| t.source_promotion_id == Some(free_for_first.id))
    );

    let twice = h
        .platform
        .receive_gift(reader.user.id, gift.id)
        .await
        .unwrap_err();
    assert!(twice.is(ErrorCode::GiftAlreadyReceived));

    let opened = h.platform.open_episode(reader.user.id, paid[0].id).await.unwrap();
    assert_eq!(opened.access, Access::Ticket);
    assert!(opened.ticket.is_some());

    h.platform
        .transition_direct_promotion(work.author.user.id, free_for_first.id, DirectAction::Stop)
        .await
        .unwrap();

    let stopped = h
        .platform
        .open_episode(reader.user.id, paid[1].id)
        .await
        .unwrap_err();
    assert!(stopped.is(ErrorCode::NoUsableTicket));
    let rental_gone = h
        .platform
        .open_episode(reader.user.id, paid[0].id)
        .await
        .unwrap_err();
    assert!(rental_gone.is(ErrorCode::NoUsableTicket));
}

#[tokio::test]
async fn direct_promotions_refuse_invalid_transitions() {
    let h = Harness::new();
    let work = h.work("author", 0, 1).await;
    let stranger = h.reader("stranger").await;

    let saved = h
        .platform
        .save_direct_promotions(work.author.user.id, work.product.id, 1)
        .await
        .unwrap();
    let row = &saved[0];

    let stop_pending = h
        .platform
        .transition_direct_promotion(work.author.user.id, row.id, DirectAction::Stop)
        .await
        .unwrap_err();
    assert!(stop_pending.is(ErrorCode::InvalidPromotionTransition));

    let not_author = h
        .platform
        .transition_direct_promotion(stranger.user.id, row.id, DirectAction::Start)
        .await
        .unwrap_err();
    assert!(not_author.is(ErrorCode::NotProductAuthor));

    let bad_count = h
        .platform
        .save_direct_promotions(work.author.user.id, work.product.id, 0)
        .await
        .unwrap_err();
    assert!(bad_count.is(ErrorCode::InvalidPromotionRequest));

    let resaved = h
        .platform
        .save_direct_promotions(work.author.user.id, work.product.id, 5)
        .await
        .unwrap();
    assert_eq!(resaved.len(), 2);
    assert!(resaved.iter().all(|p| p.num_of_ticket_per_person == 5));
    assert_eq!(
        h.platform
            .list_direct_promotions(work.author.user.id, work.product.id)
            .await
            .unwrap()
            .len(),
        2
    );
}

#[tokio::test]
async fn weekly_cap_counts_running_promotions_created_this_week() {
    let h = Harness::new();
    let mut tx = h.tx().await;
    let busy = fixtures::author(&mut tx, "busy", h.now()).await.unwrap();
    for n in 0..20 {
        let product = fixtures::product(&mut tx, busy.user.id, &format!("Serial {n}"), h.now())
            .await
            .unwrap();
        fixtures::applied_promotion(
            &mut tx,
            &product,
            AppliedPromotionType::SixNinePath,
            AppliedPromotionStatus::Ing,
            h.now(),
        )
        .await
        .unwrap();
    }
    tx.commit().await.unwrap();
    let work = h.work("author", 0, 1).await;

    assert_eq!(h.platform.remaining_applied_slots().await.unwrap(), 0);
    let full = h
        .platform
        .apply_promotion(
            work.author.user.id,
            work.product.id,
            application(&h, AppliedPromotionType::SixNinePath),
        )
        .await
        .unwrap_err();
    assert!(full.is(ErrorCode::NoAvailableAppliedPromotionSlot));

    h.clock.advance(Duration::days(7));
    assert_eq!(h.platform.remaining_applied_slots().await.unwrap(), 20);
    let row = h
        .platform
        .apply_promotion(
            work.author.user.id,
            work.product.id,
            application(&h, AppliedPromotionType::SixNinePath),
        )
        .await
        .unwrap();
    assert_eq!(row.status, AppliedPromotionStatus::Apply);
}

#[tokio::test]
async fn applied_promotion_review_and_cooldown() {
    let h = Harness::new();
    let work = h.work("author", 0, 1).await;
    let admin = h.account("admin", Role::Admin).await;
    let reader = h.reader("reader").await;
    let author = work.author.user.id;

    let empty_window = h
        .platform
        .apply_promotion(
            author,
            work.product.id,
            Application {
                end_date: h.now(),
                ..application(&h, AppliedPromotionType::WaitingForFree)
            },
        )
        .await
        .unwrap_err();
    assert!(empty_window.is(ErrorCode::InvalidPromotionRequest));

    let row = h
        .platform
        .apply_promotion(
            author,
            work.product.id,
            application(&h, AppliedPromotionType::WaitingForFree),
        )
        .await
        .unwrap();
    let duplicate = h
        .platform
        .apply_promotion(
            author,
            work.product.id,
            application(&h, AppliedPromotionType::WaitingForFree),
        )
        .await
        .unwrap_err();
    assert!(duplicate.is(ErrorCode::AlreadyAppliedPromotion));

    let not_operator = h
        .platform
        .decide_applied_promotion(&reader.user, row.id, AppliedAction::Approve)
        .await
        .unwrap_err();
    assert!(not_operator.is(ErrorCode::OperatorOnly));

    let denied = h
        .platform
        .decide_applied_promotion(&admin.user, row.id, AppliedAction::Deny)
        .await
        .unwrap();
    assert_eq!(denied.status, AppliedPromotionStatus::Deny);
    let notices = h.platform.notifications(author).await.unwrap();
    assert!(notices.iter().any(|n| n.kind == NotificationType::Promotion));

    h.clock.advance(Duration::days(30));
    let cooling = h
        .platform
        .apply_promotion(
            author,
            work.product.id,
            application(&h, AppliedPromotionType::WaitingForFree),
        )
        .await
        .unwrap_err();
    assert!(cooling.is(ErrorCode::AppliedPromotionCooldown));

    let board = h
        .platform
        .applied_promotion_board(author, work.product.id)
        .await
        .unwrap();
    let waiting = board
        .availability
        .iter()
        .find(|a| a.kind == AppliedPromotionType::WaitingForFree)
        .unwrap();
    assert!(!waiting.can_apply);
    assert!(waiting.reapply_date.is_some());
}

#[tokio::test]
async fn six_nine_denial_cools_down_until_next_week() {
    let h = Harness::new();
    let work = h.work("author", 0, 1).await;
    let admin = h.account("admin", Role::Admin).await;
    let author = work.author.user.id;

    let row = h
        .platform
        .apply_promotion(
            author,
            work.product.id,
            application(&h, AppliedPromotionType::SixNinePath),
        )
        .await
        .unwrap();
    h.platform
        .decide_applied_promotion(&admin.user, row.id, AppliedAction::Deny)
        .await
        .unwrap();

    h.clock.advance(Duration::days(2));
    let same_week = h
        .platform
        .apply_promotion(
            author,
            work.product.id,
            application(&h, AppliedPromotionType::SixNinePath),
        )
        .await
        .unwrap_err();
    assert!(same_week.is(ErrorCode::AppliedPromotionCooldown));

    h.clock.advance(Duration::days(5));
    let next_week = h
        .platform
        .apply_promotion(
            author,
            work.product.id,
            application(&h, AppliedPromotionType::SixNinePath),
        )
        .await
        .unwrap();
    let approved = h
        .platform
        .decide_applied_promotion(&admin.user, next_week.id, AppliedAction::Approve)
        .await
        .unwrap();
    assert_eq!(approved.status, AppliedPromotionStatus::Ing);

    let again = h
        .platform
        .apply_promotion(
            author,
            work.product.id,
            application(&h, AppliedPromotionType::SixNinePath),
        )
        .await
        .unwrap_err();
    assert!(again.is(ErrorCode::AppliedPromotionInProgress));
}

#[tokio::test]
async fn waiting_for_free_recharges_daily() {
    let h = Harness::new();
    let work = h.work("author", 0, 1).await;
    let reader = h.reader("reader").await;

    let idle = h
        .platform
        .claim_waiting_for_free(reader.user.id, work.product.id)
        .await
        .unwrap_err();
    assert!(idle.is(ErrorCode::PromotionNotInProgress));

    let mut tx = h.tx().await;
    fixtures::applied_promotion(
        &mut tx,
        &work.product,
        AppliedPromotionType::WaitingForFree,
        AppliedPromotionStatus::Ing,
        h.now(),
    )
    .await
    .unwrap();
    tx.commit().await.unwrap();

    let gift = h
        .platform
        .claim_waiting_for_free(reader.user.id, work.product.id)
        .await
        .unwrap();
    let recharging = h
        .platform
        .claim_waiting_for_free(reader.user.id, work.product.id)
        .await
        .unwrap_err();
    assert!(recharging.is(ErrorCode::ClaimNotAvailable));

    let receipt = h.platform.receive_gift(reader.user.id, gift.id).await.unwrap();
    assert_eq!(receipt.tickets.len(), 1);
    assert_eq!(receipt.ticket_expired_date, Some(h.now() + Duration::hours(72)));

    h.clock.advance(Duration::hours(25));
    h.platform
        .claim_waiting_for_free(reader.user.id, work.product.id)
        .await
        .unwrap();
}

#[tokio::test]
async fn six_nine_path_opens_in_the_local_evening() {
    // 19:00 local
    let h = Harness::at("2025-01-06T10:00:00Z");
    let work = h.work("author", 0, 1).await;
    let reader = h.reader("reader").await;
    let late = h.reader("late").await;

    let mut tx = h.tx().await;
    fixtures::applied_promotion(
        &mut tx,
        &work.product,
        AppliedPromotionType::SixNinePath,
        AppliedPromotionStatus::Ing,
        h.now(),
    )
    .await
    .unwrap();
    tx.commit().await.unwrap();

    let gift = h
        .platform
        .claim_six_nine_path(reader.user.id, work.product.id)
        .await
        .unwrap();
    assert_eq!(
        gift.expiration_date.map(|d| d.to_rfc3339()),
        Some("2025-01-06T12:00:00+00:00".to_string())
    );
    let second = h
        .platform
        .claim_six_nine_path(reader.user.id, work.product.id)
        .await
        .unwrap_err();
    assert!(second.is(ErrorCode::ClaimNotAvailable));

    // 22:00 local
    h.clock.advance(Duration::hours(3));
    let closed = h
        .platform
        .claim_six_nine_path(late.user.id, work.product.id)
        .await
        .unwrap_err();
    assert!(closed.is(ErrorCode::ClaimNotAvailable));

    let expired = h
        .platform
        .receive_gift(reader.user.id, gift.id)
        .await
        .unwrap_err();
    assert!(expired.is(ErrorCode::GiftExpired));
}

#[tokio::test]
async fn contract_offers_are_answered_once() {
    let h = Harness::new();
    let work = h.work("author", 0, 1).await;
    let studio = h.reader("studio").await;
    let terms = |cp, author| OfferTerms {
        advance_payment_range: "50~100".into(),
        cp_profit_rate: cp,
        author_profit_rate: author,
        message: "hi".into(),
    };

    let bad_rate = h
        .platform
        .create_contract_offer(studio.user.id, work.product.id, terms(40, 70))
        .await
        .unwrap_err();
    assert!(bad_rate.is(ErrorCode::InvalidContractOfferProfitRate));

    let own = h
        .platform
        .create_contract_offer(work.author.user.id, work.product.id, terms(30, 70))
        .await
        .unwrap_err();
    assert!(own.is(ErrorCode::CannotOfferOwnProduct));

    let offer = h
        .platform
        .create_contract_offer(studio.user.id, work.product.id, terms(30, 70))
        .await
        .unwrap();
    assert_eq!(offer.author_accept, None);
    assert_eq!(offer.advance_payment_range, "50~100");
    let notices = h.platform.notifications(work.author.user.id).await.unwrap();
    assert!(notices.iter().any(|n| n.kind == NotificationType::ContractOffer));

    let pending = h
        .platform
        .create_contract_offer(studio.user.id, work.product.id, terms(30, 70))
        .await
        .unwrap_err();
    assert!(pending.is(ErrorCode::ContractOfferAlreadyPending));

    let not_recipient = h
        .platform
        .accept_contract_offer(studio.user.id, offer.id)
        .await
        .unwrap_err();
    assert!(not_recipient.is(ErrorCode::NotOfferRecipient));

    let accepted = h
        .platform
        .accept_contract_offer(work.author.user.id, offer.id)
        .await
        .unwrap();
    assert_eq!(accepted.author_accept, Some(true));
    let answered = h
        .platform
        .reject_contract_offer(work.author.user.id, offer.id)
        .await
        .unwrap_err();
    assert!(answered.is(ErrorCode::ContractOfferNotPending));

    let sent = h.platform.sent_contract_offers(studio.user.id).await.unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].title.as_deref(), Some("The Returner"));
    let received = h
        .platform
        .received_contract_offers(work.author.user.id)
        .await
        .unwrap();
    assert_eq!(received.len(), 1);
}

#[tokio::test]
async fn reader_of_prev_gifts_each_bookmarker_once_per_week() {
    let h = Harness::new();
    let work = h.work("author", 0, 1).await;
    let author = work.author.user.id;
    let mut readers = Vec::new();
    for subject in ["r1", "r2", "r3"] {
        let reader = h.reader(subject).await;
        h.platform
            .toggle_bookmark(reader.user.id, work.product.id)
            .await
            .unwrap();
        readers.push(reader);
    }
    h.platform.toggle_bookmark(author, work.product.id).await.unwrap();

    let reader_of_prev = |saved: &[webnovel_core::types::DirectPromotion]| {
        saved
            .iter()
            .find(|p| p.kind == DirectPromotionType::ReaderOfPrev)
            .unwrap()
            .id
    };
    let saved = h
        .platform
        .save_direct_promotions(author, work.product.id, 2)
        .await
        .unwrap();
    let first_id = reader_of_prev(&saved);

    let stranger = h
        .platform
        .issue_reader_of_prev(readers[0].user.id, first_id)
        .await
        .unwrap_err();
    assert!(stranger.is(ErrorCode::NotProductAuthor));

    let first = h.platform.issue_reader_of_prev(author, first_id).await.unwrap();
    assert_eq!(first.issued_count, 3);
    assert_eq!(first.promotion_ids, vec![first_id]);
    let ended = h
        .platform
        .list_direct_promotions(author, work.product.id)
        .await
        .unwrap();
    let ended = ended.iter().find(|p| p.id == first_id).unwrap();
    assert_eq!(ended.status, DirectPromotionStatus::End);
    assert_eq!(ended.start_date, Some(h.now()));

    let gifts = h.platform.list_gifts(readers[0].user.id).await.unwrap();
    assert_eq!(gifts.len(), 1);
    assert_eq!(gifts[0].promotion_type, Some(PromotionType::ReaderOfPrev));
    assert_eq!(gifts[0].amount, Some(2));
    assert_eq!(gifts[0].ticket_expiration, TicketExpiration::days(7));
    assert_eq!(gifts[0].expiration_date, Some(h.now() + Duration::days(7)));
    assert!(h.platform.list_gifts(author).await.unwrap().is_empty());
    let notices = h.platform.notifications(readers[0].user.id).await.unwrap();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].kind, NotificationType::Promotion);

    let status = h.platform.issuance_status(author, first_id).await.unwrap();
    assert!(status.issued_this_week);
    assert_eq!(status.this_week_issued_count, 3);
    assert_eq!(status.last_issued_count, 3);
    assert_eq!(status.last_issued_date, Some(h.now()));
    assert_eq!(status.next_available_date, NaiveDate::from_ymd_opt(2025, 1, 6).unwrap());

    // Wednesday of the same week
    h.clock.advance(Duration::days(2));
    let status = h.platform.issuance_status(author, first_id).await.unwrap();
    assert!(status.issued_this_week);
    assert_eq!(status.next_available_date, NaiveDate::from_ymd_opt(2025, 1, 13).unwrap());

    let refire = h.platform.issue_reader_of_prev(author, first_id).await.unwrap();
    assert_eq!(refire.issued_count, 0);
    assert!(refire.promotion_ids.is_empty());

    let saved = h
        .platform
        .save_direct_promotions(author, work.product.id, 2)
        .await
        .unwrap();
    let second_id = reader_of_prev(&saved);
    assert_ne!(second_id, first_id);
    let same_week = h.platform.issue_reader_of_prev(author, second_id).await.unwrap();
    assert_eq!(same_week.issued_count, 0);
    assert_eq!(same_week.promotion_ids, vec![second_id]);
    assert_eq!(h.platform.list_gifts(readers[0].user.id).await.unwrap().len(), 1);

    // Following Monday
    h.clock.advance(Duration::days(5));
    let saved = h
        .platform
        .save_direct_promotions(author, work.product.id, 2)
        .await
        .unwrap();
    let third_id = reader_of_prev(&saved);
    let next_week = h.platform.issue_reader_of_prev(author, third_id).await.unwrap();
    assert_eq!(next_week.issued_count, 3);

    let status = h.platform.issuance_status(author, third_id).await.unwrap();
    assert!(status.issued_this_week);
    assert_eq!(status.this_week_issued_count, 3);
}

#[tokio::test]
async fn stopped_reader_of_prev_cannot_issue() {
    let h = Harness::new();
    let work = h.work("author", 0, 1).await;
    let author = work.author.user.id;
    let saved = h
        .platform
        .save_direct_promotions(author, work.product.id, 1)
        .await
        .unwrap();
    let id = saved
        .iter()
        .find(|p| p.kind == DirectPromotionType::ReaderOfPrev)
        .unwrap()
        .id;
    h.platform
        .transition_direct_promotion(author, id, DirectAction::Start)
        .await
        .unwrap();
    h.platform
        .transition_direct_promotion(author, id, DirectAction::Stop)
        .await
        .unwrap();

    let error = h.platform.issue_reader_of_prev(author, id).await.unwrap_err();
    assert!(error.is(ErrorCode::PromotionNotInProgress));

    let free_for_first = saved
        .iter()
        .find(|p| p.kind == DirectPromotionType::FreeForFirst)
        .unwrap()
        .id;
    let wrong_kind = h
        .platform
        .issue_reader_of_prev(author, free_for_first)
        .await
        .unwrap_err();
    assert!(wrong_kind.is(ErrorCode::InvalidPromotionRequest));
}

#[tokio::test]
async fn author_can_withdraw_an_application_and_apply_again() {
    let h = Harness::new();
    let work = h.work("author", 0, 1).await;
    let author = work.author.user.id;
    let stranger = h.reader("stranger").await;

    let applied = h
        .platform
        .apply_promotion(
            author,
            work.product.id,
            application(&h, AppliedPromotionType::WaitingForFree),
        )
        .await
        .unwrap();

    let not_theirs = h
        .platform
        .cancel_applied_promotion(stranger.user.id, applied.id)
        .await
        .unwrap_err();
    assert!(not_theirs.is(ErrorCode::NotProductAuthor));

    let cancelled = h
        .platform
        .cancel_applied_promotion(author, applied.id)
        .await
        .unwrap();
    assert_eq!(cancelled.status, AppliedPromotionStatus::Cancel);

    let twice = h
        .platform
        .cancel_applied_promotion(author, applied.id)
        .await
        .unwrap_err();
    assert!(twice.is(ErrorCode::InvalidPromotionTransition));

    let again = h
        .platform
        .apply_promotion(
            author,
            work.product.id,
            application(&h, AppliedPromotionType::WaitingForFree),
        )
        .await
        .unwrap();
    assert_eq!(again.status, AppliedPromotionStatus::Apply);
}
