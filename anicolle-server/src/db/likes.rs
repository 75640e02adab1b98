//! Like toggle [MB-LIKE]
//!
//! A like is a `(user, post)` row in `likes`; `blogs.like_num` mirrors the
//! row count. Both change in the same transaction.

use anicolle_common::{Error, Result};
use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

/// Outcome of a toggle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LikeToggle {
    /// True when the user now likes the post
    pub liked: bool,
    /// Post counter after the toggle
    pub like_num: i64,
}

/// Like the post if the user has not, otherwise remove the like
///
/// Writes come first so the transaction takes SQLite's write lock up front
/// instead of upgrading from a read lock.
pub async fn toggle_like(pool: &SqlitePool, user_id: i64, post_id: i64) -> Result<LikeToggle> {
    let mut tx = pool.begin().await?;

    let removed = sqlx::query("DELETE FROM likes WHERE user_id = ? AND post_id = ?")
        .bind(user_id)
        .bind(post_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

    let liked = if removed > 0 {
        sqlx::query("UPDATE blogs SET like_num = MAX(like_num - 1, 0) WHERE id = ?")
            .bind(post_id)
            .execute(&mut *tx)
            .await?;
        false
    } else {
        let updated = sqlx::query("UPDATE blogs SET like_num = like_num + 1 WHERE id = ?")
            .bind(post_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        if updated == 0 {
            return Err(Error::NotFound(format!("blog {}", post_id)));
        }

        sqlx::query("INSERT INTO likes (user_id, post_id, created_at) VALUES (?, ?, ?)")
            .bind(user_id)
            .bind(post_id)
            .bind(Utc::now())
            .execute(&mut *tx)
            .await?;
        true
    };

    let like_num: i64 = sqlx::query_scalar("SELECT like_num FROM blogs WHERE id = ?")
        .bind(post_id)
        .fetch_one(&mut *tx)
        .await?;

    tx.commit().await?;

    debug!("User {} toggled like on blog {}: liked={}, like_num={}", user_id, post_id, liked, like_num);
    Ok(LikeToggle { liked, like_num })
}

/// Number of like rows for a post
pub async fn count_likes(pool: &SqlitePool, post_id: i64) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM likes WHERE post_id = ?")
        .bind(post_id)
        .fetch_one(pool)
        .await?;
    Ok(count)
}

/// Whether a user currently likes a post
pub async fn has_liked(pool: &SqlitePool, user_id: i64, post_id: i64) -> Result<bool> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM likes WHERE user_id = ? AND post_id = ?")
        .bind(user_id)
        .bind(post_id)
        .fetch_one(pool)
        .await?;
    Ok(count > 0)
}
