use super::StoreResult;
use crate::types::{NewProfile, NewUser, Profile, ProfileId, User, UserId};
use chrono::{DateTime, Utc};
use std::future::Future;

/// Users and profiles.
pub trait AccountStore {
    /// User by key, including withdrawn users.
    fn find_user(&mut self, id: UserId) -> impl Future<Output = StoreResult<Option<User>>> + Send;

    /// User by identity-provider subject.
    fn find_user_by_subject(
        &mut self,
        subject: &str,
    ) -> impl Future<Output = StoreResult<Option<User>>> + Send;

    /// Live user by exact email.
    fn find_user_by_email(
        &mut self,
        email: &str,
    ) -> impl Future<Output = StoreResult<Option<User>>> + Send;

    /// Live, identity-verified user holding `phone`.
    fn find_verified_user_by_phone(
        &mut self,
        phone: &str,
    ) -> impl Future<Output = StoreResult<Option<User>>> + Send;

    /// Insert a user.
    fn insert_user(
        &mut self,
        user: NewUser,
        now: DateTime<Utc>,
    ) -> impl Future<Output = StoreResult<User>> + Send;

    /// Overwrite a user's mutable columns.
    fn update_user(&mut self, user: &User) -> impl Future<Output = StoreResult<()>> + Send;

    /// All profiles of a user, oldest first.
    fn list_profiles(
        &mut self,
        user: UserId,
    ) -> impl Future<Output = StoreResult<Vec<Profile>>> + Send;

    /// Profile by key.
    fn find_profile(
        &mut self,
        id: ProfileId,
    ) -> impl Future<Output = StoreResult<Option<Profile>>> + Send;

    /// Insert a profile.
    fn insert_profile(
        &mut self,
        profile: NewProfile,
        now: DateTime<Utc>,
    ) -> impl Future<Output = StoreResult<Profile>> + Send;

    /// Overwrite a profile's mutable columns.
    fn update_profile(&mut self, profile: &Profile)
    -> impl Future<Output = StoreResult<()>> + Send;
}
