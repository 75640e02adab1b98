//! Tags and the blog/tag association [MB-TAG]

use anicolle_common::db::Tag;
use anicolle_common::Result;
use sqlx::{SqliteConnection, SqlitePool};

pub async fn find_by_name(pool: &SqlitePool, name: &str) -> Result<Option<Tag>> {
    let tag = sqlx::query_as::<_, Tag>("SELECT id, name FROM tags WHERE name = ?")
        .bind(name)
        .fetch_optional(pool)
        .await?;
    Ok(tag)
}

/// Reuse the tag with this exact name or create it
pub async fn get_or_create(conn: &mut SqliteConnection, name: &str) -> Result<Tag> {
    sqlx::query("INSERT INTO tags (name) VALUES (?) ON CONFLICT(name) DO NOTHING")
        .bind(name)
        .execute(&mut *conn)
        .await?;

    let tag = sqlx::query_as::<_, Tag>("SELECT id, name FROM tags WHERE name = ?")
        .bind(name)
        .fetch_one(&mut *conn)
        .await?;
    Ok(tag)
}

/// Attach names to a blog, creating missing tags
pub async fn attach_tags(conn: &mut SqliteConnection, blog_id: i64, names: &[String]) -> Result<()> {
    for name in names {
        let tag = get_or_create(&mut *conn, name).await?;
        sqlx::query("INSERT OR IGNORE INTO blog_tags (blog_id, tag_id) VALUES (?, ?)")
            .bind(blog_id)
            .bind(tag.id)
            .execute(&mut *conn)
            .await?;
    }
    Ok(())
}

/// Remove every tag link from a blog (tags themselves stay)
pub async fn clear_tags(conn: &mut SqliteConnection, blog_id: i64) -> Result<()> {
    sqlx::query("DELETE FROM blog_tags WHERE blog_id = ?")
        .bind(blog_id)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

/// Tag names on one blog, in the order they were first created
pub async fn tag_names_for_blog(pool: &SqlitePool, blog_id: i64) -> Result<Vec<String>> {
    let names: Vec<String> = sqlx::query_scalar(
        "SELECT t.name FROM tags t
         JOIN blog_tags bt ON bt.tag_id = t.id
         WHERE bt.blog_id = ?
         ORDER BY t.id",
    )
    .bind(blog_id)
    .fetch_all(pool)
    .await?;
    Ok(names)
}
