//! Users and reader profiles.

use super::ServiceContext;
use webnovel_core::rules::profile;
use webnovel_core::store::AccountStore;
use webnovel_core::types::{NewProfile, NewUser, Profile, ProfileId, Role, User, UserId};
use webnovel_core::{ErrorCode, PlatformResult};

/// Map an identity-provider subject to a live user, creating it on first use.
///
/// A new user gets role `user` and a default profile named `reader<id>`.
///
/// # Errors
///
/// * [`ErrorCode::UserWithdrawn`] when the subject belongs to a withdrawn user
/// * [`ErrorCode::DuplicateEmail`] when a new subject brings an email already
///   held by another live user
pub async fn resolve_user<S: AccountStore>(
    tx: &mut S,
    ctx: &ServiceContext,
    subject: &str,
    email: Option<&str>,
) -> PlatformResult<User> {
    if let Some(user) = tx.find_user_by_subject(subject).await? {
        if user.deleted {
            return Err(ErrorCode::UserWithdrawn.into());
        }
        return Ok(user);
    }

    if let Some(email) = email {
        if tx
            .find_user_by_email(email)
            .await?
            .is_some_and(|other| !other.deleted)
        {
            return Err(ErrorCode::DuplicateEmail.into());
        }
    }

    let user = tx
        .insert_user(
            NewUser {
                subject: subject.to_string(),
                role: Role::User,
                email: email.map(ToString::to_string),
            },
            ctx.now,
        )
        .await?;
    tx.insert_profile(
        NewProfile {
            user_id: user.id,
            nickname: format!("reader{}", user.id),
            is_default: true,
        },
        ctx.now,
    )
    .await?;
    tracing::info!(user_id = %user.id, subject, "User registered");
    Ok(user)
}

/// Live user by key.
///
/// # Errors
///
/// [`ErrorCode::UserNotFound`] when missing or withdrawn.
pub async fn find_user<S: AccountStore>(tx: &mut S, user: UserId) -> PlatformResult<User> {
    tx.find_user(user)
        .await?
        .filter(|u| !u.deleted)
        .ok_or_else(|| ErrorCode::UserNotFound.into())
}

/// The user's default profile.
///
/// # Errors
///
/// [`ErrorCode::ProfileNotFound`] when the user has none.
pub async fn default_profile<S: AccountStore>(tx: &mut S, user: UserId) -> PlatformResult<Profile> {
    tx.list_profiles(user)
        .await?
        .into_iter()
        .find(|p| p.is_default)
        .ok_or_else(|| ErrorCode::ProfileNotFound.into())
}

/// A profile that must belong to `user`.
///
/// # Errors
///
/// * [`ErrorCode::ProfileNotFound`] when missing
/// * [`ErrorCode::NotResourceOwner`] when owned by another user
pub async fn owned_profile<S: AccountStore>(
    tx: &mut S,
    user: UserId,
    profile: ProfileId,
) -> PlatformResult<Profile> {
    let found = tx
        .find_profile(profile)
        .await?
        .ok_or(ErrorCode::ProfileNotFound)?;
    if found.user_id != user {
        return Err(ErrorCode::NotResourceOwner.into());
    }
    Ok(found)
}

/// All profiles of a user.
///
/// # Errors
///
/// Storage failures.
pub async fn list_profiles<S: AccountStore>(
    tx: &mut S,
    user: UserId,
) -> PlatformResult<Vec<Profile>> {
    Ok(tx.list_profiles(user).await?)
}

/// Record a passed identity verification.
///
/// # Errors
///
/// [`ErrorCode::PhoneAlreadyVerified`] when another live user holds `phone`.
pub async fn verify_identity<S: AccountStore>(
    tx: &mut S,
    user: UserId,
    phone: &str,
) -> PlatformResult<User> {
    let phone = phone.trim();
    if phone.is_empty() {
        return Err(ErrorCode::InvalidInput.into());
    }
    let mut me = find_user(tx, user).await?;
    if tx
        .find_verified_user_by_phone(phone)
        .await?
        .is_some_and(|other| other.id != user && !other.deleted)
    {
        tracing::warn!(user_id = %user, "Phone already verified by another account");
        return Err(ErrorCode::PhoneAlreadyVerified.into());
    }
    me.identity_verified = true;
    me.phone = Some(phone.to_string());
    tx.update_user(&me).await?;
    tracing::info!(user_id = %user, "Identity verified");
    Ok(me)
}

/// Add a non-default profile.
///
/// # Errors
///
/// [`ErrorCode::InvalidNickname`] for an out-of-bounds nickname.
pub async fn create_profile<S: AccountStore>(
    tx: &mut S,
    ctx: &ServiceContext,
    user: UserId,
    nickname: &str,
) -> PlatformResult<Profile> {
    let nickname = profile::validate_nickname(nickname)?;
    find_user(tx, user).await?;
    Ok(tx
        .insert_profile(
            NewProfile {
                user_id: user,
                nickname,
                is_default: false,
            },
            ctx.now,
        )
        .await?)
}

/// Make `profile` the only default profile of `user`.
///
/// # Errors
///
/// See [`owned_profile`].
pub async fn set_default_profile<S: AccountStore>(
    tx: &mut S,
    user: UserId,
    profile: ProfileId,
) -> PlatformResult<Profile> {
    let mut chosen = owned_profile(tx, user, profile).await?;
    for mut other in tx.list_profiles(user).await? {
        let should_be_default = other.id == profile;
        if other.is_default != should_be_default {
            other.is_default = should_be_default;
            tx.update_profile(&other).await?;
        }
    }
    chosen.is_default = true;
    Ok(chosen)
}

/// Rename a profile, spending a free rename before a paid one.
///
/// # Errors
///
/// * [`ErrorCode::InvalidNickname`]
/// * [`ErrorCode::NicknameChangeExhausted`] when no renames remain
pub async fn change_nickname<S: AccountStore>(
    tx: &mut S,
    user: UserId,
    profile_id: ProfileId,
    nickname: &str,
) -> PlatformResult<Profile> {
    let nickname = profile::validate_nickname(nickname)?;
    let mut found = owned_profile(tx, user, profile_id).await?;
    let (free, paid) = profile::spend_rename(&found)?;
    found.nickname = nickname;
    found.free_rename_count = free;
    found.paid_rename_count = paid;
    tx.update_profile(&found).await?;
    Ok(found)
}

/// Withdraw a user: rewrite the email, release the verified phone and
/// soft-delete the row.
///
/// # Errors
///
/// [`ErrorCode::UserNotFound`] when already withdrawn.
pub async fn withdraw<S: AccountStore>(
    tx: &mut S,
    ctx: &ServiceContext,
    user: UserId,
) -> PlatformResult<User> {
    let mut me = find_user(tx, user).await?;
    me.email = me
        .email
        .as_deref()
        .map(|original| User::outed_email(original, ctx.now));
    me.phone = None;
    me.identity_verified = false;
    me.deleted = true;
    tx.update_user(&me).await?;
    tracing::info!(user_id = %user, "User withdrawn");
    Ok(me)
}

/// Change another user's role. Administrators only.
///
/// # Errors
///
/// * [`ErrorCode::OperatorOnly`] unless `caller` is an admin
/// * [`ErrorCode::UserNotFound`] for an unknown target
pub async fn grant_role<S: AccountStore>(
    tx: &mut S,
    caller: &User,
    target: UserId,
    role: Role,
) -> PlatformResult<User> {
    if caller.role != Role::Admin {
        return Err(ErrorCode::OperatorOnly.into());
    }
    let mut user = find_user(tx, target).await?;
    user.role = role;
    tx.update_user(&user).await?;
    tracing::info!(user_id = %target, role = %role, granted_by = %caller.id, "Role granted");
    Ok(user)
}

/// Operators run the applied-promotion queue.
///
/// # Errors
///
/// [`ErrorCode::OperatorOnly`] for everyone else.
pub fn require_operator(user: &User) -> PlatformResult<()> {
    if user.role.is_operator() {
        Ok(())
    } else {
        Err(ErrorCode::OperatorOnly.into())
    }
}
