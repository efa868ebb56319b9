//! Comments, reviews, reactions, moderation and the composed read models.

#![allow(clippy::expect_used, clippy::unwrap_used)]

mod common;

use chrono::Duration;
use common::Harness;
use webnovel_core::ErrorCode;
use webnovel_core::types::{ContentRef, InterestStatus, NotificationType, ReactionKind};

#[tokio::test]
async fn comments_notify_and_thread_one_level() {
    let h = Harness::new();
    let work = h.work("author", 1, 0).await;
    let reader = h.reader("reader").await;
    let episode = work.episodes[0].id;

    let blank = h
        .platform
        .create_comment(reader.user.id, None, episode, None, "   ")
        .await
        .unwrap_err();
    assert!(blank.is(ErrorCode::InvalidContent));

    let comment = h
        .platform
        .create_comment(reader.user.id, None, episode, None, "Great hook")
        .await
        .unwrap();
    assert_eq!(comment.profile_id, reader.profile.id);
    let notices = h.platform.notifications(work.author.user.id).await.unwrap();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].kind, NotificationType::Comment);

    let reply = h
        .platform
        .create_comment(
            work.author.user.id,
            None,
            episode,
            Some(comment.id),
            "Thanks for reading",
        )
        .await
        .unwrap();
    assert_eq!(reply.parent_id, Some(comment.id));
    let reader_notices = h.platform.notifications(reader.user.id).await.unwrap();
    assert_eq!(reader_notices.len(), 1);

    let nested = h
        .platform
        .create_comment(reader.user.id, None, episode, Some(reply.id), "Nested")
        .await
        .unwrap_err();
    assert!(nested.is(ErrorCode::InvalidInput));

    let listed = h.platform.list_comments(None, episode).await.unwrap();
    assert_eq!(listed.len(), 2);
    let parent = listed.iter().find(|c| c.id == comment.id).unwrap();
    assert_eq!(parent.count_reply, 1);

    let not_owner = h
        .platform
        .delete_comment(work.author.user.id, comment.id)
        .await
        .unwrap_err();
    assert!(not_owner.is(ErrorCode::NotResourceOwner));
    h.platform
        .delete_comment(work.author.user.id, reply.id)
        .await
        .unwrap();
    let after = h.platform.list_comments(None, episode).await.unwrap();
    assert_eq!(after.len(), 1);
    assert_eq!(after[0].count_reply, 0);
}

#[tokio::test]
async fn reactions_toggle_and_recount() {
    let h = Harness::new();
    let work = h.work("author", 1, 0).await;
    let reader = h.reader("reader").await;
    let critic = h.reader("critic").await;
    let comment = h
        .platform
        .create_comment(work.author.user.id, None, work.episodes[0].id, None, "Notes")
        .await
        .unwrap();
    let target = ContentRef::Comment(comment.id);

    let liked = h
        .platform
        .react(reader.user.id, target, ReactionKind::Recommend)
        .await
        .unwrap();
    assert!(liked.recommend);
    assert_eq!(liked.count_recommend, 1);

    let disliked = h
        .platform
        .react(critic.user.id, target, ReactionKind::NotRecommend)
        .await
        .unwrap();
    assert_eq!(disliked.count_recommend, 1);
    assert_eq!(disliked.count_not_recommend, 1);

    let undone = h
        .platform
        .react(reader.user.id, target, ReactionKind::Recommend)
        .await
        .unwrap();
    assert!(!undone.recommend);
    assert_eq!(undone.count_recommend, 0);
}

#[tokio::test]
async fn moderation_is_per_viewer_and_never_self_directed() {
    let h = Harness::new();
    let work = h.work("author", 1, 0).await;
    let reader = h.reader("reader").await;
    let other = h.reader("other").await;
    let review = h
        .platform
        .create_review(reader.user.id, None, work.product.id, "Slow start, great payoff")
        .await
        .unwrap();
    let target = ContentRef::Review(review.id);

    let own_block = h
        .platform
        .toggle_block(reader.user.id, target)
        .await
        .unwrap_err();
    assert!(own_block.is(ErrorCode::CannotBlockOwnContent));

    let blocked = h.platform.toggle_block(other.user.id, target).await.unwrap();
    assert!(blocked.blocked);
    assert!(
        h.platform
            .list_reviews(Some(other.user.id), work.product.id)
            .await
            .unwrap()
            .is_empty()
    );
    assert_eq!(
        h.platform
            .list_reviews(Some(work.author.user.id), work.product.id)
            .await
            .unwrap()
            .len(),
        1
    );
    let unblocked = h.platform.toggle_block(other.user.id, target).await.unwrap();
    assert!(!unblocked.blocked);

    let own_report = h
        .platform
        .report(reader.user.id, target, "spam")
        .await
        .unwrap_err();
    assert!(own_report.is(ErrorCode::CannotReportOwnContent));
    h.platform
        .report(other.user.id, target, "spoilers")
        .await
        .unwrap();
    let twice = h
        .platform
        .report(other.user.id, target, "spoilers again")
        .await
        .unwrap_err();
    assert!(twice.is(ErrorCode::AlreadyReported));

    let not_author = h.platform.toggle_pin(other.user.id, target).await.unwrap_err();
    assert!(not_author.is(ErrorCode::NotProductAuthor));
    let pinned = h
        .platform
        .toggle_pin(work.author.user.id, target)
        .await
        .unwrap();
    assert!(pinned.display_top);
}

#[tokio::test]
async fn product_view_reflects_the_viewer() {
    let h = Harness::new();
    let work = h.work("author", 2, 1).await;
    let reader = h.reader("reader").await;

    let anonymous = h.platform.product_view(work.product.id, None).await.unwrap();
    assert_eq!(anonymous.total_open_episode_count, 3);
    assert_eq!(anonymous.first_episode_id, Some(work.episodes[0].id));
    assert_eq!(anonymous.latest_episode_no, Some(3));
    assert_eq!(anonymous.interest_status, InterestStatus::None);
    assert!(!anonymous.bookmarked);
    assert!(!anonymous.event_badge);

    h.platform
        .open_episode(reader.user.id, work.episodes[0].id)
        .await
        .unwrap();
    let bookmark = h
        .platform
        .toggle_bookmark(reader.user.id, work.product.id)
        .await
        .unwrap();
    assert!(bookmark.bookmarked);
    assert_eq!(bookmark.bookmark_count, 1);

    let view = h
        .platform
        .product_view(work.product.id, Some(reader.user.id))
        .await
        .unwrap();
    assert!(view.bookmarked);
    assert_eq!(view.readed_episode_count, 1);
    assert_eq!(view.count_hit, 1);
    assert_eq!(view.count_bookmark, 1);
    assert_eq!(view.interest_status, InterestStatus::Active);
    assert!(view.interest_badge);

    let items = h
        .platform
        .episode_list(work.product.id, Some(reader.user.id))
        .await
        .unwrap();
    assert_eq!(items.len(), 3);
    assert!(items[0].read);
    assert!(!items[2].read);
    assert!(!items[2].owned);
}

#[tokio::test]
async fn my_summary_counts_everything_the_reader_holds() {
    let h = Harness::new();
    let work = h.work("author", 0, 1).await;
    let reader = h.reader("reader").await;
    h.credit(&reader, 300).await;

    h.platform
        .purchase_episode(
            reader.user.id,
            reader.profile.id,
            work.episodes[0].id,
            webnovel_core::types::OwnType::Rental,
        )
        .await
        .unwrap();
    h.platform
        .toggle_bookmark(reader.user.id, work.product.id)
        .await
        .unwrap();
    h.platform
        .sponsor(reader.user.id, work.product.id, reader.profile.id, 100, None)
        .await
        .unwrap();

    let mine = h.platform.my_summary(reader.user.id).await.unwrap();
    assert_eq!(mine.balance, 100);
    assert_eq!(mine.unused_ticket_count, 1);
    assert_eq!(mine.pending_gift_count, 0);
    assert_eq!(mine.bookmark_count, 1);
    assert_eq!(mine.profile.map(|p| p.id), Some(reader.profile.id));

    let author = h.platform.my_summary(work.author.user.id).await.unwrap();
    assert_eq!(author.unread_notification_count, 1);
}

#[tokio::test]
async fn revive_restarts_a_lapsed_interest_window() {
    let h = Harness::new();
    let work = h.work("author", 1, 0).await;
    let reader = h.reader("reader").await;
    let product = work.product.id;

    let untouched = h.platform.revive_interest(reader.user.id, product).await.unwrap();
    assert_eq!(untouched.interest_status, InterestStatus::None);
    assert_eq!(untouched.interest_end_date, None);
    let still = h.platform.interest(reader.user.id, product).await.unwrap();
    assert_eq!(still.interest_status, InterestStatus::None);

    let opened_at = h.now();
    h.platform
        .open_episode(reader.user.id, work.episodes[0].id)
        .await
        .unwrap();

    h.clock.advance(Duration::days(4));
    let lapsed = h.platform.interest(reader.user.id, product).await.unwrap();
    assert_eq!(lapsed.interest_status, InterestStatus::Loss);
    assert_eq!(lapsed.interest_end_date, Some(opened_at + Duration::days(3)));

    let revived = h.platform.revive_interest(reader.user.id, product).await.unwrap();
    assert_eq!(revived.interest_status, InterestStatus::Active);
    assert_eq!(revived.interest_end_date, Some(h.now() + Duration::days(3)));

    h.clock.advance(Duration::hours(50));
    let fading = h.platform.interest(reader.user.id, product).await.unwrap();
    assert_eq!(fading.interest_status, InterestStatus::DropSoon);
}

#[tokio::test]
async fn episode_reactions_are_exclusive_and_recounted() {
    let h = Harness::new();
    let work = h.work("author", 1, 0).await;
    let reader = h.reader("reader").await;
    let episode = work.episodes[0].id;

    let unread = h
        .platform
        .react_episode(reader.user.id, episode, ReactionKind::Recommend)
        .await
        .unwrap_err();
    assert!(unread.is(ErrorCode::NoUsableTicket));

    h.platform.open_episode(reader.user.id, episode).await.unwrap();
    let liked = h
        .platform
        .react_episode(reader.user.id, episode, ReactionKind::Recommend)
        .await
        .unwrap();
    assert!(liked.recommend);
    assert_eq!((liked.count_recommend, liked.count_not_recommend), (1, 0));
    let view = h.platform.product_view(work.product.id, None).await.unwrap();
    assert_eq!(view.count_recommend, 1);

    let disliked = h
        .platform
        .react_episode(reader.user.id, episode, ReactionKind::NotRecommend)
        .await
        .unwrap();
    assert!(!disliked.recommend);
    assert!(disliked.not_recommend);
    assert_eq!((disliked.count_recommend, disliked.count_not_recommend), (0, 1));

    let neutral = h
        .platform
        .react_episode(reader.user.id, episode, ReactionKind::NotRecommend)
        .await
        .unwrap();
    assert!(!neutral.not_recommend);
    assert_eq!((neutral.count_recommend, neutral.count_not_recommend), (0, 0));
    let view = h.platform.product_view(work.product.id, None).await.unwrap();
    assert_eq!(view.count_recommend, 0);
}

#[tokio::test]
async fn recent_list_entries_can_be_removed() {
    let h = Harness::new();
    let work = h.work("author", 1, 0).await;
    let reader = h.reader("reader").await;

    h.platform
        .open_episode(reader.user.id, work.episodes[0].id)
        .await
        .unwrap();
    let recent = h.platform.list_recent(reader.user.id).await.unwrap();
    assert_eq!(recent.len(), 1);
    assert_eq!(recent[0].product_id, work.product.id);
    assert_eq!(recent[0].episode_id, Some(work.episodes[0].id));

    h.platform
        .delete_recent(reader.user.id, work.product.id)
        .await
        .unwrap();
    assert!(h.platform.list_recent(reader.user.id).await.unwrap().is_empty());

    let gone = h
        .platform
        .delete_recent(reader.user.id, work.product.id)
        .await
        .unwrap_err();
    assert!(gone.is(ErrorCode::ProductNotFound));
}

#[tokio::test]
async fn deleting_a_review_recounts_the_product() {
    let h = Harness::new();
    let work = h.work("author", 1, 0).await;
    let reader = h.reader("reader").await;
    let stranger = h.reader("stranger").await;

    let review = h
        .platform
        .create_review(reader.user.id, None, work.product.id, "Worth the wait")
        .await
        .unwrap();
    let view = h.platform.product_view(work.product.id, None).await.unwrap();
    assert_eq!(view.count_review, 1);

    let not_theirs = h
        .platform
        .delete_review(stranger.user.id, review.id)
        .await
        .unwrap_err();
    assert!(not_theirs.is(ErrorCode::NotResourceOwner));

    h.platform.delete_review(reader.user.id, review.id).await.unwrap();
    let view = h.platform.product_view(work.product.id, None).await.unwrap();
    assert_eq!(view.count_review, 0);
    assert!(
        h.platform
            .list_reviews(None, work.product.id)
            .await
            .unwrap()
            .is_empty()
    );

    let twice = h
        .platform
        .delete_review(reader.user.id, review.id)
        .await
        .unwrap_err();
    assert!(twice.is(ErrorCode::ReviewNotFound));
}

#[tokio::test]
async fn notifications_are_marked_read_by_their_recipient() {
    let h = Harness::new();
    let work = h.work("author", 1, 0).await;
    let reader = h.reader("reader").await;
    let author = work.author.user.id;
    let episode = work.episodes[0].id;

    for content in ["First!", "Second thoughts"] {
        h.platform
            .create_comment(reader.user.id, None, episode, None, content)
            .await
            .unwrap();
    }
    let inbox = h.platform.notifications(author).await.unwrap();
    assert_eq!(inbox.len(), 2);
    assert!(inbox.iter().all(|n| n.kind == NotificationType::Comment && !n.read));

    let foreign = h
        .platform
        .mark_notification_read(reader.user.id, inbox[0].id)
        .await
        .unwrap_err();
    assert!(foreign.is(ErrorCode::NotificationNotFound));

    let read = h
        .platform
        .mark_notification_read(author, inbox[0].id)
        .await
        .unwrap();
    assert!(read.read);
    assert_eq!(h.platform.my_summary(author).await.unwrap().unread_notification_count, 1);

    assert_eq!(h.platform.mark_all_notifications_read(author).await.unwrap(), 1);
    assert_eq!(h.platform.my_summary(author).await.unwrap().unread_notification_count, 0);
    assert_eq!(h.platform.mark_all_notifications_read(author).await.unwrap(), 0);
}
