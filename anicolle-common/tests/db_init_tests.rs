//! Tests for database initialization
//!
//! [MB-DB]: the database and schema are created on first run and an
//! existing database reopens without losing rows.

use anicolle_common::db::init::{init_database, SCHEMA_VERSION};
use tempfile::TempDir;

#[tokio::test]
async fn test_database_creation_when_missing() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("nested").join("anicolle.db");
    assert!(!db_path.exists());

    let result = init_database(&db_path).await;
    assert!(result.is_ok(), "Database initialization failed: {:?}", result.err());
    assert!(db_path.exists(), "Database file was not created");
}

#[tokio::test]
async fn test_all_tables_created() {
    let dir = TempDir::new().unwrap();
    let pool = init_database(&dir.path().join("anicolle.db")).await.unwrap();

    for table in [
        "schema_version",
        "users",
        "user_profiles",
        "sessions",
        "blogs",
        "tags",
        "blog_tags",
        "comments",
        "likes",
    ] {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?")
                .bind(table)
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(count, 1, "table {} missing", table);
    }

    let version: i64 = sqlx::query_scalar("SELECT MAX(version) FROM schema_version")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(version, SCHEMA_VERSION);
}

#[tokio::test]
async fn test_database_opens_existing() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("anicolle.db");

    {
        let pool = init_database(&db_path).await.unwrap();
        sqlx::query("INSERT INTO tags (name) VALUES ('ゆるキャン△')")
            .execute(&pool)
            .await
            .unwrap();
        pool.close().await;
    }

    let pool = init_database(&db_path).await.unwrap();
    let name: String = sqlx::query_scalar("SELECT name FROM tags")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(name, "ゆるキャン△");

    let versions: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM schema_version")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(versions, 1, "reopening must not duplicate the version row");
}

#[tokio::test]
async fn test_foreign_keys_enforced() {
    let dir = TempDir::new().unwrap();
    let pool = init_database(&dir.path().join("anicolle.db")).await.unwrap();

    // No user 42 exists
    let result = sqlx::query(
        "INSERT INTO blogs (user_id, content, like_num, posted_date) VALUES (42, 'x', 0, '2024-01-01T00:00:00Z')",
    )
    .execute(&pool)
    .await;
    assert!(result.is_err(), "foreign key violation should be rejected");
}

#[tokio::test]
async fn test_unique_tag_names() {
    let dir = TempDir::new().unwrap();
    let pool = init_database(&dir.path().join("anicolle.db")).await.unwrap();

    sqlx::query("INSERT INTO tags (name) VALUES ('a')").execute(&pool).await.unwrap();
    let dup = sqlx::query("INSERT INTO tags (name) VALUES ('a')").execute(&pool).await;
    assert!(dup.is_err());
}
