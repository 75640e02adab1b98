//! Users and profiles [MB-ACC, MB-PRF]

use anicolle_common::db::{User, UserProfile};
use anicolle_common::password::{generate_salt, hash_password};
use anicolle_common::{Error, Result};
use chrono::Utc;
use sqlx::SqlitePool;

use super::conflict_on_unique;

const USER_COLUMNS: &str = "id, email, nick_name, password_hash, password_salt, is_active, \
                            is_staff, date_joined, last_login";

/// Create an active account with an empty profile
pub async fn create_user(
    pool: &SqlitePool,
    email: &str,
    nick_name: &str,
    password: &str,
) -> Result<User> {
    if find_by_email(pool, email).await?.is_some() {
        return Err(Error::Conflict(format!("email {} is already registered", email)));
    }
    if find_by_nick_name(pool, nick_name).await?.is_some() {
        return Err(Error::Conflict(format!("nick name {} is already taken", nick_name)));
    }

    let salt = generate_salt();
    let hash = hash_password(password, &salt);

    let mut tx = pool.begin().await?;

    let id: i64 = sqlx::query_scalar(
        "INSERT INTO users (email, nick_name, password_hash, password_salt, is_active, date_joined)
         VALUES (?, ?, ?, ?, 1, ?)
         RETURNING id",
    )
    .bind(email)
    .bind(nick_name)
    .bind(&hash)
    .bind(&salt)
    .bind(Utc::now())
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| conflict_on_unique(e, "email or nick name"))?;

    sqlx::query("INSERT INTO user_profiles (user_id, introduction) VALUES (?, '')")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| Error::Internal(format!("user {} vanished after insert", id)))
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>(&format!("SELECT {} FROM users WHERE id = ?", USER_COLUMNS))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(user)
}

pub async fn find_by_email(pool: &SqlitePool, email: &str) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>(&format!(
        "SELECT {} FROM users WHERE email = ?",
        USER_COLUMNS
    ))
    .bind(email)
    .fetch_optional(pool)
    .await?;
    Ok(user)
}

pub async fn find_by_nick_name(pool: &SqlitePool, nick_name: &str) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>(&format!(
        "SELECT {} FROM users WHERE nick_name = ?",
        USER_COLUMNS
    ))
    .bind(nick_name)
    .fetch_optional(pool)
    .await?;
    Ok(user)
}

pub async fn touch_last_login(pool: &SqlitePool, user_id: i64) -> Result<()> {
    sqlx::query("UPDATE users SET last_login = ? WHERE id = ?")
        .bind(Utc::now())
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn get_profile(pool: &SqlitePool, user_id: i64) -> Result<UserProfile> {
    let profile = sqlx::query_as::<_, UserProfile>(
        "SELECT user_id, introduction, icon_url FROM user_profiles WHERE user_id = ?",
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    // Accounts created outside the API may lack a profile row
    Ok(profile.unwrap_or(UserProfile {
        user_id,
        introduction: String::new(),
        icon_url: None,
    }))
}

/// Fields a user may change on their own profile
#[derive(Debug, Default, Clone)]
pub struct ProfileChanges {
    pub nick_name: Option<String>,
    pub introduction: Option<String>,
    pub icon_url: Option<String>,
}

/// Apply profile changes atomically
pub async fn update_profile(pool: &SqlitePool, user_id: i64, changes: &ProfileChanges) -> Result<()> {
    let mut tx = pool.begin().await?;

    if let Some(nick_name) = &changes.nick_name {
        sqlx::query("UPDATE users SET nick_name = ? WHERE id = ?")
            .bind(nick_name)
            .bind(user_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| conflict_on_unique(e, "nick name"))?;
    }

    if changes.introduction.is_some() || changes.icon_url.is_some() {
        sqlx::query("INSERT OR IGNORE INTO user_profiles (user_id, introduction) VALUES (?, '')")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            "UPDATE user_profiles
             SET introduction = COALESCE(?, introduction),
                 icon_url = COALESCE(?, icon_url)
             WHERE user_id = ?",
        )
        .bind(&changes.introduction)
        .bind(&changes.icon_url)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(())
}

/// Soft delete: the account can no longer log in and its sessions end
pub async fn deactivate(pool: &SqlitePool, user_id: i64) -> Result<()> {
    let mut tx = pool.begin().await?;

    let updated = sqlx::query("UPDATE users SET is_active = 0 WHERE id = ?")
        .bind(user_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

    if updated == 0 {
        return Err(Error::NotFound(format!("user {}", user_id)));
    }

    sqlx::query("DELETE FROM sessions WHERE user_id = ?")
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(())
}
