//! Blog posts [MB-BLOG]

use anicolle_common::db::Blog;
use anicolle_common::{Error, Result};
use chrono::Utc;
use sqlx::SqlitePool;

use super::tags;

const BLOG_SELECT: &str = "SELECT b.id, b.user_id, u.nick_name, b.content, b.photo, b.anime_id, \
                           b.anime, b.like_num, b.posted_date
                           FROM blogs b JOIN users u ON u.id = b.user_id";

/// Newest first; id breaks ties between posts saved in the same instant
const NEWEST_FIRST: &str = "ORDER BY b.posted_date DESC, b.id DESC";

/// Editable post fields
#[derive(Debug, Clone, Default)]
pub struct BlogFields {
    pub content: String,
    pub photo: Option<String>,
    pub anime_id: Option<i64>,
    pub anime: Option<String>,
}

pub async fn count_blogs(pool: &SqlitePool) -> Result<i64> {
    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM blogs")
        .fetch_one(pool)
        .await?;
    Ok(total)
}

pub async fn list_blogs(pool: &SqlitePool, limit: i64, offset: i64) -> Result<Vec<Blog>> {
    let blogs = sqlx::query_as::<_, Blog>(&format!("{} {} LIMIT ? OFFSET ?", BLOG_SELECT, NEWEST_FIRST))
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;
    Ok(blogs)
}

pub async fn count_by_tag(pool: &SqlitePool, tag_id: i64) -> Result<i64> {
    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM blog_tags WHERE tag_id = ?")
        .bind(tag_id)
        .fetch_one(pool)
        .await?;
    Ok(total)
}

pub async fn list_by_tag(pool: &SqlitePool, tag_id: i64, limit: i64, offset: i64) -> Result<Vec<Blog>> {
    let blogs = sqlx::query_as::<_, Blog>(&format!(
        "{} JOIN blog_tags bt ON bt.blog_id = b.id WHERE bt.tag_id = ? {} LIMIT ? OFFSET ?",
        BLOG_SELECT, NEWEST_FIRST
    ))
    .bind(tag_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;
    Ok(blogs)
}

pub async fn list_by_user(pool: &SqlitePool, user_id: i64) -> Result<Vec<Blog>> {
    let blogs = sqlx::query_as::<_, Blog>(&format!("{} WHERE b.user_id = ? {}", BLOG_SELECT, NEWEST_FIRST))
        .bind(user_id)
        .fetch_all(pool)
        .await?;
    Ok(blogs)
}

pub async fn get_blog(pool: &SqlitePool, id: i64) -> Result<Option<Blog>> {
    let blog = sqlx::query_as::<_, Blog>(&format!("{} WHERE b.id = ?", BLOG_SELECT))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(blog)
}

/// Insert a post and its tags in one transaction; returns the new id
pub async fn create_blog(
    pool: &SqlitePool,
    user_id: i64,
    fields: &BlogFields,
    tag_names: &[String],
) -> Result<i64> {
    let mut tx = pool.begin().await?;

    let id: i64 = sqlx::query_scalar(
        "INSERT INTO blogs (user_id, content, photo, anime_id, anime, like_num, posted_date)
         VALUES (?, ?, ?, ?, ?, 0, ?)
         RETURNING id",
    )
    .bind(user_id)
    .bind(&fields.content)
    .bind(&fields.photo)
    .bind(fields.anime_id)
    .bind(&fields.anime)
    .bind(Utc::now())
    .fetch_one(&mut *tx)
    .await?;

    tags::attach_tags(&mut *tx, id, tag_names).await?;

    tx.commit().await?;
    Ok(id)
}

/// Update a post
///
/// `tag_names` of `None` or an empty list leaves the current tags alone;
/// otherwise the tag set is replaced.
pub async fn update_blog(
    pool: &SqlitePool,
    id: i64,
    fields: &BlogFields,
    tag_names: Option<&[String]>,
) -> Result<()> {
    let mut tx = pool.begin().await?;

    let updated = sqlx::query(
        "UPDATE blogs SET content = ?, photo = ?, anime_id = ?, anime = ? WHERE id = ?",
    )
    .bind(&fields.content)
    .bind(&fields.photo)
    .bind(fields.anime_id)
    .bind(&fields.anime)
    .bind(id)
    .execute(&mut *tx)
    .await?
    .rows_affected();

    if updated == 0 {
        return Err(Error::NotFound(format!("blog {}", id)));
    }

    if let Some(names) = tag_names.filter(|n| !n.is_empty()) {
        tags::clear_tags(&mut *tx, id).await?;
        tags::attach_tags(&mut *tx, id, names).await?;
    }

    tx.commit().await?;
    Ok(())
}

/// Delete a post; comments, likes and tag links cascade
pub async fn delete_blog(pool: &SqlitePool, id: i64) -> Result<()> {
    let deleted = sqlx::query("DELETE FROM blogs WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?
        .rows_affected();

    if deleted == 0 {
        return Err(Error::NotFound(format!("blog {}", id)));
    }
    Ok(())
}
