//! Login sessions
//!
//! A session is an opaque random token handed out at login and presented
//! as a bearer token. Expired rows are removed when they are next seen.

use anicolle_common::db::{Session, User};
use anicolle_common::Result;
use chrono::{Duration, Utc};
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use super::users;

pub async fn create_session(pool: &SqlitePool, user_id: i64, ttl_hours: i64) -> Result<Session> {
    let now = Utc::now();
    let session = Session {
        token: Uuid::new_v4().simple().to_string(),
        user_id,
        created_at: now,
        expires_at: now + Duration::hours(ttl_hours),
    };

    sqlx::query("INSERT INTO sessions (token, user_id, created_at, expires_at) VALUES (?, ?, ?, ?)")
        .bind(&session.token)
        .bind(session.user_id)
        .bind(session.created_at)
        .bind(session.expires_at)
        .execute(pool)
        .await?;

    Ok(session)
}

/// Resolve a token to its active user
///
/// Returns `None` for unknown or expired tokens and for deactivated users.
pub async fn find_session_user(pool: &SqlitePool, token: &str) -> Result<Option<(Session, User)>> {
    let session = sqlx::query_as::<_, Session>(
        "SELECT token, user_id, created_at, expires_at FROM sessions WHERE token = ?",
    )
    .bind(token)
    .fetch_optional(pool)
    .await?;

    let Some(session) = session else {
        return Ok(None);
    };

    if session.expires_at <= Utc::now() {
        debug!("Session for user {} expired", session.user_id);
        delete_session(pool, token).await?;
        return Ok(None);
    }

    match users::find_by_id(pool, session.user_id).await? {
        Some(user) if user.is_active => Ok(Some((session, user))),
        _ => Ok(None),
    }
}

pub async fn delete_session(pool: &SqlitePool, token: &str) -> Result<bool> {
    let deleted = sqlx::query("DELETE FROM sessions WHERE token = ?")
        .bind(token)
        .execute(pool)
        .await?
        .rows_affected();
    Ok(deleted > 0)
}

/// Remove every expired session; returns how many were removed
pub async fn purge_expired(pool: &SqlitePool) -> Result<u64> {
    let deleted = sqlx::query("DELETE FROM sessions WHERE expires_at <= ?")
        .bind(Utc::now())
        .execute(pool)
        .await?
        .rows_affected();
    Ok(deleted)
}
