//! Profile pages, profile editing and account deactivation [MB-PRF]

use anicolle_common::db::{Blog, PublicUser, UserProfile};
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::accounts::validate_nick_name;
use super::MessageResponse;
use crate::db::users::{self, ProfileChanges};
use crate::db::blogs;
use crate::error::{ApiError, ApiResult};
use crate::session::CurrentUser;
use crate::AppState;

/// Longest self introduction accepted, in characters
pub const MAX_INTRODUCTION_LEN: usize = 500;

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub user: PublicUser,
    pub profile: UserProfile,
    pub blog_list: Vec<Blog>,
}

#[derive(Debug, Deserialize)]
pub struct ProfileEditRequest {
    pub nick_name: Option<String>,
    pub introduction: Option<String>,
    pub icon_url: Option<String>,
}

/// GET /api/users/:nick_name
pub async fn profile_detail(
    State(state): State<AppState>,
    Path(nick_name): Path<String>,
) -> ApiResult<Json<ProfileResponse>> {
    let user = users::find_by_nick_name(&state.db, &nick_name)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("user {}", nick_name)))?;

    let profile = users::get_profile(&state.db, user.id).await?;
    let blog_list = blogs::list_by_user(&state.db, user.id).await?;

    Ok(Json(ProfileResponse {
        user: PublicUser::from(&user),
        profile,
        blog_list,
    }))
}

/// Resolve `nick_name` and make sure it is the caller's own account
async fn own_account(state: &AppState, current: &CurrentUser, nick_name: &str) -> ApiResult<i64> {
    let user = users::find_by_nick_name(&state.db, nick_name)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("user {}", nick_name)))?;

    if user.id != current.id() {
        return Err(ApiError::Forbidden("you can only change your own account".to_string()));
    }
    Ok(user.id)
}

/// PUT /api/users/:nick_name
pub async fn edit_profile(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(nick_name): Path<String>,
    Json(request): Json<ProfileEditRequest>,
) -> ApiResult<Json<ProfileResponse>> {
    let user_id = own_account(&state, &current, &nick_name).await?;

    let new_nick_name = request.nick_name.map(|n| n.trim().to_string());
    if let Some(n) = &new_nick_name {
        validate_nick_name(n)?;
    }
    if let Some(intro) = &request.introduction {
        if intro.chars().count() > MAX_INTRODUCTION_LEN {
            return Err(ApiError::BadRequest(format!(
                "introduction must be at most {} characters",
                MAX_INTRODUCTION_LEN
            )));
        }
    }

    let changes = ProfileChanges {
        nick_name: new_nick_name.filter(|n| *n != nick_name),
        introduction: request.introduction,
        icon_url: request.icon_url.filter(|u| !u.trim().is_empty()),
    };
    users::update_profile(&state.db, user_id, &changes).await?;
    info!("User {} updated their profile", user_id);

    let user = users::find_by_id(&state.db, user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("user {}", user_id)))?;
    profile_detail(State(state), Path(user.nick_name)).await
}

/// DELETE /api/users/:nick_name
///
/// Soft delete: the account is deactivated and its posts stay visible.
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(nick_name): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    let user_id = own_account(&state, &current, &nick_name).await?;
    users::deactivate(&state.db, user_id).await?;
    info!("User {} deactivated their account", user_id);

    Ok(Json(MessageResponse::new("account deleted")))
}
