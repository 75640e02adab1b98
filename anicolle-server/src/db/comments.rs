//! Comments and replies [MB-CMT]

use anicolle_common::db::Comment;
use anicolle_common::{Error, Result};
use chrono::Utc;
use sqlx::SqlitePool;

const COMMENT_SELECT: &str = "SELECT c.id, c.post_id, c.parent_id, c.user_id, u.nick_name, \
                              c.comment, c.created_at
                              FROM comments c LEFT JOIN users u ON u.id = c.user_id";

/// Insert a comment; `parent_id` makes it a reply
pub async fn create_comment(
    pool: &SqlitePool,
    post_id: i64,
    parent_id: Option<i64>,
    user_id: Option<i64>,
    text: &str,
) -> Result<Comment> {
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO comments (post_id, parent_id, user_id, comment, created_at)
         VALUES (?, ?, ?, ?, ?)
         RETURNING id",
    )
    .bind(post_id)
    .bind(parent_id)
    .bind(user_id)
    .bind(text)
    .bind(Utc::now())
    .fetch_one(pool)
    .await?;

    get_comment(pool, id)
        .await?
        .ok_or_else(|| Error::Internal(format!("comment {} vanished after insert", id)))
}

pub async fn get_comment(pool: &SqlitePool, id: i64) -> Result<Option<Comment>> {
    let comment = sqlx::query_as::<_, Comment>(&format!("{} WHERE c.id = ?", COMMENT_SELECT))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(comment)
}

/// Every comment on a post, oldest first
pub async fn list_for_post(pool: &SqlitePool, post_id: i64) -> Result<Vec<Comment>> {
    let comments = sqlx::query_as::<_, Comment>(&format!(
        "{} WHERE c.post_id = ? ORDER BY c.created_at ASC, c.id ASC",
        COMMENT_SELECT
    ))
    .bind(post_id)
    .fetch_all(pool)
    .await?;
    Ok(comments)
}
