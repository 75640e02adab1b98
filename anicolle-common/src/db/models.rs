//! Database models
//!
//! One struct per table row. Handlers build response bodies from these
//! rather than exposing them directly where secrets are involved (`User`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Longest post body accepted, in characters
pub const MAX_CONTENT_LEN: usize = 140;

/// Longest nick name accepted, in characters
pub const MAX_NICK_NAME_LEN: usize = 30;

#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub nick_name: String,
    pub password_hash: String,
    pub password_salt: String,
    pub is_active: bool,
    pub is_staff: bool,
    pub date_joined: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

/// User fields safe to show to anyone
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PublicUser {
    pub id: i64,
    pub nick_name: String,
    pub date_joined: DateTime<Utc>,
}

impl From<&User> for PublicUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            nick_name: user.nick_name.clone(),
            date_joined: user.date_joined,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct UserProfile {
    pub user_id: i64,
    pub introduction: String,
    pub icon_url: Option<String>,
}

#[derive(Debug, Clone, FromRow)]
pub struct Session {
    pub token: String,
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// A post row joined with its author's nick name
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Blog {
    pub id: i64,
    pub user_id: i64,
    pub nick_name: String,
    pub content: String,
    pub photo: Option<String>,
    pub anime_id: Option<i64>,
    pub anime: Option<String>,
    pub like_num: i64,
    pub posted_date: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq, Eq)]
pub struct Tag {
    pub id: i64,
    pub name: String,
}

/// A comment or reply; replies carry `parent_id`
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Comment {
    pub id: i64,
    pub post_id: i64,
    pub parent_id: Option<i64>,
    pub user_id: Option<i64>,
    pub nick_name: Option<String>,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}
