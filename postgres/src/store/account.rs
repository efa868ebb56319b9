use crate::PostgresTransaction;
use crate::error::map_sqlx_error;
use crate::rows::{self, PROFILE_COLUMNS, USER_COLUMNS};
use chrono::{DateTime, Utc};
use webnovel_core::rules::profile::FREE_RENAMES;
use webnovel_core::store::{AccountStore, StoreResult};
use webnovel_core::types::{NewProfile, NewUser, Profile, ProfileId, User, UserId, yn};

impl AccountStore for PostgresTransaction {
    async fn find_user(&mut self, id: UserId) -> StoreResult<Option<User>> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id.get())
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(map_sqlx_error)?;
        rows::optional(row.as_ref(), rows::user)
    }

    async fn find_user_by_subject(&mut self, subject: &str) -> StoreResult<Option<User>> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE subject = $1"))
            .bind(subject)
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(map_sqlx_error)?;
        rows::optional(row.as_ref(), rows::user)
    }

    async fn find_user_by_email(&mut self, email: &str) -> StoreResult<Option<User>> {
        let row = sqlx::query(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1 AND delete_yn = 'N' LIMIT 1"
        ))
        .bind(email)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;
        rows::optional(row.as_ref(), rows::user)
    }

    async fn find_verified_user_by_phone(&mut self, phone: &str) -> StoreResult<Option<User>> {
        let row = sqlx::query(&format!(
            "SELECT {USER_COLUMNS} FROM users
             WHERE phone = $1 AND identity_verified_yn = 'Y' AND delete_yn = 'N'
             LIMIT 1"
        ))
        .bind(phone)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;
        rows::optional(row.as_ref(), rows::user)
    }

    async fn insert_user(&mut self, user: NewUser, now: DateTime<Utc>) -> StoreResult<User> {
        let row = sqlx::query(&format!(
            "INSERT INTO users (subject, role, email, created_date)
             VALUES ($1, $2, $3, $4)
             RETURNING {USER_COLUMNS}"
        ))
        .bind(&user.subject)
        .bind(user.role.as_str())
        .bind(&user.email)
        .bind(now)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;
        rows::user(&row)
    }

    async fn update_user(&mut self, user: &User) -> StoreResult<()> {
        sqlx::query(
            "UPDATE users
             SET role = $2, identity_verified_yn = $3, phone = $4, email = $5, delete_yn = $6
             WHERE id = $1",
        )
        .bind(user.id.get())
        .bind(user.role.as_str())
        .bind(yn::to_str(user.identity_verified))
        .bind(&user.phone)
        .bind(&user.email)
        .bind(yn::to_str(user.deleted))
        .execute(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;
        Ok(())
    }

    async fn list_profiles(&mut self, user: UserId) -> StoreResult<Vec<Profile>> {
        let found = sqlx::query(&format!(
            "SELECT {PROFILE_COLUMNS} FROM profiles WHERE user_id = $1 ORDER BY created_date, id"
        ))
        .bind(user.get())
        .fetch_all(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;
        rows::all(&found, rows::profile)
    }

    async fn find_profile(&mut self, id: ProfileId) -> StoreResult<Option<Profile>> {
        let row = sqlx::query(&format!("SELECT {PROFILE_COLUMNS} FROM profiles WHERE id = $1"))
            .bind(id.get())
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(map_sqlx_error)?;
        rows::optional(row.as_ref(), rows::profile)
    }

    async fn insert_profile(
        &mut self,
        profile: NewProfile,
        now: DateTime<Utc>,
    ) -> StoreResult<Profile> {
        let row = sqlx::query(&format!(
            "INSERT INTO profiles (user_id, nickname, free_rename_count, default_yn, created_date)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {PROFILE_COLUMNS}"
        ))
        .bind(profile.user_id.get())
        .bind(&profile.nickname)
        .bind(FREE_RENAMES)
        .bind(yn::to_str(profile.is_default))
        .bind(now)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;
        rows::profile(&row)
    }

    async fn update_profile(&mut self, profile: &Profile) -> StoreResult<()> {
        sqlx::query(
            "UPDATE profiles
             SET nickname = $2, free_rename_count = $3, paid_rename_count = $4, default_yn = $5
             WHERE id = $1",
        )
        .bind(profile.id.get())
        .bind(&profile.nickname)
        .bind(profile.free_rename_count)
        .bind(profile.paid_rename_count)
        .bind(yn::to_str(profile.is_default))
        .execute(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;
        Ok(())
    }
}
