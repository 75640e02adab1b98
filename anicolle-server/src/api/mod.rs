//! HTTP API handlers for anicolle-server

pub mod accounts;
pub mod anime_search;
pub mod blogs;
pub mod comments;
pub mod health;
pub mod likes;
pub mod profiles;

pub use accounts::{login, logout, register};
pub use anime_search::{search_anime_get, search_anime_post};
pub use blogs::{
    blog_detail, create_blog, create_blog_by_anime, delete_blog, list_blogs, list_blogs_by_tag,
    update_blog,
};
pub use comments::{create_comment, create_reply};
pub use health::health_routes;
pub use likes::toggle_like;
pub use profiles::{delete_user, edit_profile, profile_detail};

use serde::Serialize;

/// Plain acknowledgement body for mutations without a payload
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
