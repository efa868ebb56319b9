//! Sign-up, identity verification, profiles, renames and withdrawal.

#![allow(clippy::expect_used, clippy::unwrap_used)]

mod common;

use common::Harness;
use webnovel_core::ErrorCode;
use webnovel_core::rules::profile::FREE_RENAMES;
use webnovel_core::store::{AccountStore, Transaction};
use webnovel_core::types::{NewUser, Role};

#[tokio::test]
async fn first_sign_in_registers_a_user_with_a_default_profile() {
    let h = Harness::new();

    let user = h
        .platform
        .authenticate("oidc|alice", Some("alice@example.org"))
        .await
        .unwrap();
    assert_eq!(user.role, Role::User);
    assert!(!user.identity_verified);

    let again = h
        .platform
        .authenticate("oidc|alice", Some("alice@example.org"))
        .await
        .unwrap();
    assert_eq!(again.id, user.id);

    let profiles = h.platform.list_profiles(user.id).await.unwrap();
    assert_eq!(profiles.len(), 1);
    assert!(profiles[0].is_default);
    assert_eq!(profiles[0].nickname, format!("reader{}", user.id));
    assert_eq!(profiles[0].free_rename_count, FREE_RENAMES);

    let taken = h
        .platform
        .authenticate("oidc|mallory", Some("alice@example.org"))
        .await
        .unwrap_err();
    assert!(taken.is(ErrorCode::DuplicateEmail));
}

#[tokio::test]
async fn a_verified_phone_belongs_to_one_live_user() {
    let h = Harness::new();
    let first = h.reader("first").await;
    let second = h.reader("second").await;

    let verified = h
        .platform
        .verify_identity(first.user.id, "010-1234-5678")
        .await
        .unwrap();
    assert!(verified.identity_verified);
    assert_eq!(verified.phone.as_deref(), Some("010-1234-5678"));

    let taken = h
        .platform
        .verify_identity(second.user.id, "010-1234-5678")
        .await
        .unwrap_err();
    assert!(taken.is(ErrorCode::PhoneAlreadyVerified));

    h.platform
        .verify_identity(first.user.id, "010-1234-5678")
        .await
        .unwrap();

    let blank = h
        .platform
        .verify_identity(second.user.id, "  ")
        .await
        .unwrap_err();
    assert!(blank.is(ErrorCode::InvalidInput));

    h.platform.withdraw(first.user.id).await.unwrap();
    let released = h
        .platform
        .verify_identity(second.user.id, "010-1234-5678")
        .await
        .unwrap();
    assert_eq!(released.phone.as_deref(), Some("010-1234-5678"));
}

#[tokio::test]
async fn withdrawal_rewrites_the_email_and_closes_the_account() {
    let h = Harness::new();
    let reader = h.reader("leaving").await;

    let gone = h.platform.withdraw(reader.user.id).await.unwrap();
    assert!(gone.deleted);
    assert!(!gone.identity_verified);
    assert_eq!(gone.phone, None);
    assert_eq!(
        gone.email.as_deref(),
        Some(format!("outed;{};leaving@example.com", h.now().timestamp()).as_str())
    );

    let twice = h.platform.withdraw(reader.user.id).await.unwrap_err();
    assert!(twice.is(ErrorCode::UserNotFound));

    let sign_in = h
        .platform
        .authenticate("leaving", None)
        .await
        .unwrap_err();
    assert!(sign_in.is(ErrorCode::UserWithdrawn));

    let summary = h.platform.my_summary(reader.user.id).await.unwrap_err();
    assert!(summary.is(ErrorCode::UserNotFound));

    // The old address is free again
    let fresh = h
        .platform
        .authenticate("oidc|returning", Some("leaving@example.com"))
        .await
        .unwrap();
    assert_ne!(fresh.id, reader.user.id);
}

#[tokio::test]
async fn exactly_one_profile_is_default() {
    let h = Harness::new();
    let reader = h.reader("reader").await;
    let other = h.reader("other").await;

    let short = h
        .platform
        .create_profile(reader.user.id, "x")
        .await
        .unwrap_err();
    assert!(short.is(ErrorCode::InvalidNickname));

    let night = h
        .platform
        .create_profile(reader.user.id, "Night Owl")
        .await
        .unwrap();
    assert!(!night.is_default);

    let chosen = h
        .platform
        .set_default_profile(reader.user.id, night.id)
        .await
        .unwrap();
    assert!(chosen.is_default);

    let profiles = h.platform.list_profiles(reader.user.id).await.unwrap();
    let defaults: Vec<_> = profiles.iter().filter(|p| p.is_default).collect();
    assert_eq!(defaults.len(), 1);
    assert_eq!(defaults[0].id, night.id);

    let summary = h.platform.my_summary(reader.user.id).await.unwrap();
    assert_eq!(summary.profile.map(|p| p.id), Some(night.id));

    let foreign = h
        .platform
        .set_default_profile(other.user.id, night.id)
        .await
        .unwrap_err();
    assert!(foreign.is(ErrorCode::NotResourceOwner));
}

#[tokio::test]
async fn renames_spend_free_then_paid_then_stop() {
    let h = Harness::new();
    let reader = h.reader("reader").await;
    let other = h.reader("other").await;
    let profile = reader.profile.id;

    let first = h
        .platform
        .change_nickname(reader.user.id, profile, "Alpha")
        .await
        .unwrap();
    assert_eq!((first.free_rename_count, first.paid_rename_count), (1, 0));
    let second = h
        .platform
        .change_nickname(reader.user.id, profile, "Beta")
        .await
        .unwrap();
    assert_eq!((second.free_rename_count, second.paid_rename_count), (0, 0));

    let mut tx = h.tx().await;
    let mut bought = second.clone();
    bought.paid_rename_count = 1;
    tx.update_profile(&bought).await.unwrap();
    tx.commit().await.unwrap();

    let third = h
        .platform
        .change_nickname(reader.user.id, profile, "Gamma")
        .await
        .unwrap();
    assert_eq!((third.free_rename_count, third.paid_rename_count), (0, 0));

    let refused = h
        .platform
        .change_nickname(reader.user.id, profile, "Delta")
        .await
        .unwrap_err();
    assert!(refused.is(ErrorCode::NicknameChangeExhausted));
    let profiles = h.platform.list_profiles(reader.user.id).await.unwrap();
    assert_eq!(profiles[0].nickname, "Gamma");

    let foreign = h
        .platform
        .change_nickname(other.user.id, profile, "Hijack")
        .await
        .unwrap_err();
    assert!(foreign.is(ErrorCode::NotResourceOwner));
}

#[tokio::test]
async fn summary_of_a_user_without_profiles_has_none() {
    let h = Harness::new();
    let mut tx = h.tx().await;
    let bare = tx
        .insert_user(
            NewUser {
                subject: "bare".into(),
                role: Role::User,
                email: None,
            },
            h.now(),
        )
        .await
        .unwrap();
    tx.commit().await.unwrap();

    let summary = h.platform.my_summary(bare.id).await.unwrap();
    assert_eq!(summary.profile, None);
    assert_eq!(summary.balance, 0);
}

#[tokio::test]
async fn only_admins_grant_roles() {
    let h = Harness::new();
    let admin = h.account("admin", Role::Admin).await;
    let reader = h.reader("reader").await;

    let refused = h
        .platform
        .grant_role(&reader.user, reader.user.id, Role::Admin)
        .await
        .unwrap_err();
    assert!(refused.is(ErrorCode::OperatorOnly));

    let promoted = h
        .platform
        .grant_role(&admin.user, reader.user.id, Role::Author)
        .await
        .unwrap();
    assert_eq!(promoted.role, Role::Author);
}
