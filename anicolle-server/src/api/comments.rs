//! Comment and reply endpoints [MB-CMT]
//!
//! Commenting does not need a login. When the request carries a valid
//! session the comment is attributed to that user.

use anicolle_common::db::Comment;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use tracing::info;

use crate::db::{blogs, comments};
use crate::error::{ApiError, ApiResult};
use crate::session::CurrentUser;
use crate::AppState;

/// Longest comment accepted, in characters
pub const MAX_COMMENT_LEN: usize = 500;

#[derive(Debug, Deserialize)]
pub struct CommentInput {
    pub comment: Option<String>,
}

fn validate_comment(input: &CommentInput) -> ApiResult<String> {
    let text = input.comment.as_deref().map(str::trim).unwrap_or_default();
    if text.is_empty() {
        return Err(ApiError::BadRequest("comment is required".to_string()));
    }
    if text.chars().count() > MAX_COMMENT_LEN {
        return Err(ApiError::BadRequest(format!(
            "comment must be at most {} characters",
            MAX_COMMENT_LEN
        )));
    }
    Ok(text.to_string())
}

/// POST /api/blogs/:id/comments
pub async fn create_comment(
    State(state): State<AppState>,
    author: Option<Extension<CurrentUser>>,
    Path(post_id): Path<i64>,
    Json(input): Json<CommentInput>,
) -> ApiResult<(StatusCode, Json<Comment>)> {
    let text = validate_comment(&input)?;

    blogs::get_blog(&state.db, post_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("blog {}", post_id)))?;

    let author_id = author.map(|Extension(user)| user.id());
    let comment = comments::create_comment(&state.db, post_id, None, author_id, &text).await?;
    info!("Comment {} added to blog {}", comment.id, post_id);

    Ok((StatusCode::CREATED, Json(comment)))
}

/// POST /api/comments/:id/replies
///
/// The reply belongs to the same post as the comment it answers.
pub async fn create_reply(
    State(state): State<AppState>,
    author: Option<Extension<CurrentUser>>,
    Path(comment_id): Path<i64>,
    Json(input): Json<CommentInput>,
) -> ApiResult<(StatusCode, Json<Comment>)> {
    let text = validate_comment(&input)?;

    let parent = comments::get_comment(&state.db, comment_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("comment {}", comment_id)))?;

    let author_id = author.map(|Extension(user)| user.id());
    let reply = comments::create_comment(&state.db, parent.post_id, Some(parent.id), author_id, &text).await?;
    info!("Reply {} added to comment {} on blog {}", reply.id, parent.id, parent.post_id);

    Ok((StatusCode::CREATED, Json(reply)))
}
