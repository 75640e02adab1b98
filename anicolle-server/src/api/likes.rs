//! Like toggle endpoint [MB-LIKE]

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::Serialize;
use tracing::info;

use crate::db::likes;
use crate::error::ApiResult;
use crate::session::CurrentUser;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct LikeResponse {
    /// The post's like counter after the toggle
    pub like: i64,
    pub liked: bool,
}

/// GET|POST /api/blogs/:id/like
///
/// Likes the post, or removes the like when the caller already likes it.
pub async fn toggle_like(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(post_id): Path<i64>,
) -> ApiResult<Json<LikeResponse>> {
    let toggle = likes::toggle_like(&state.db, current.id(), post_id).await?;
    info!(
        "User {} {} blog {} (like_num={})",
        current.id(),
        if toggle.liked { "liked" } else { "unliked" },
        post_id,
        toggle.like_num
    );

    Ok(Json(LikeResponse {
        like: toggle.like_num,
        liked: toggle.liked,
    }))
}
