//! Registration, login and logout [MB-ACC]

use anicolle_common::db::{PublicUser, MAX_NICK_NAME_LEN};
use anicolle_common::password::{validate_new_password, verify_password};
use axum::{extract::State, http::StatusCode, Extension, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::db::{sessions, users};
use crate::error::{ApiError, ApiResult};
use crate::session::CurrentUser;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub nick_name: String,
    pub password1: String,
    pub password2: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub user: PublicUser,
}

/// Lowercase and trim an email address for storage and lookup
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub fn validate_email(email: &str) -> Result<(), ApiError> {
    let valid = match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.') && !domain.starts_with('.'),
        None => false,
    };
    if valid && !email.chars().any(char::is_whitespace) {
        Ok(())
    } else {
        Err(ApiError::BadRequest(format!("enter a valid email address: {}", email)))
    }
}

/// Nick names appear in profile URLs
pub fn validate_nick_name(nick_name: &str) -> Result<(), ApiError> {
    let len = nick_name.chars().count();
    if len == 0 || len > MAX_NICK_NAME_LEN {
        return Err(ApiError::BadRequest(format!(
            "nick name must be 1-{} characters",
            MAX_NICK_NAME_LEN
        )));
    }
    if nick_name.contains('/') || nick_name.chars().any(char::is_whitespace) {
        return Err(ApiError::BadRequest(
            "nick name may not contain '/' or whitespace".to_string(),
        ));
    }
    Ok(())
}

/// POST /api/accounts/register
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<PublicUser>)> {
    let email = normalize_email(&request.email);
    let nick_name = request.nick_name.trim();

    validate_email(&email)?;
    validate_nick_name(nick_name)?;
    validate_new_password(&request.password1, &request.password2).map_err(ApiError::BadRequest)?;

    let user = users::create_user(&state.db, &email, nick_name, &request.password1).await?;
    info!("Registered user {} ({})", user.id, user.nick_name);

    Ok((StatusCode::CREATED, Json(PublicUser::from(&user))))
}

/// POST /api/accounts/login
///
/// Unknown email, wrong password and deactivated accounts all get the same
/// 401 so the response does not reveal which accounts exist.
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let email = normalize_email(&request.email);
    let rejected = || ApiError::Unauthorized("invalid email or password".to_string());

    let user = users::find_by_email(&state.db, &email).await?.ok_or_else(rejected)?;

    if !verify_password(&request.password, &user.password_salt, &user.password_hash) {
        warn!("Failed login for user {}", user.id);
        return Err(rejected());
    }
    if !user.is_active {
        warn!("Login attempt for inactive user {}", user.id);
        return Err(rejected());
    }

    let session = sessions::create_session(&state.db, user.id, state.session_ttl_hours).await?;
    users::touch_last_login(&state.db, user.id).await?;
    info!("User {} logged in", user.id);

    Ok(Json(LoginResponse {
        token: session.token,
        expires_at: session.expires_at,
        user: PublicUser::from(&user),
    }))
}

/// POST /api/accounts/logout
pub async fn logout(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> ApiResult<StatusCode> {
    sessions::delete_session(&state.db, &current.token).await?;
    info!("User {} logged out", current.id());
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_email() {
        assert!(validate_email("user@example.com").is_ok());
        assert!(validate_email("userexample.com").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("user@localhost").is_err());
        assert!(validate_email("us er@example.com").is_err());
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  User@Example.COM "), "user@example.com");
    }

    #[test]
    fn test_validate_nick_name() {
        assert!(validate_nick_name("haruhi").is_ok());
        assert!(validate_nick_name("涼宮ハルヒ").is_ok());
        assert!(validate_nick_name("").is_err());
        assert!(validate_nick_name("a/b").is_err());
        assert!(validate_nick_name("a b").is_err());
        assert!(validate_nick_name(&"x".repeat(MAX_NICK_NAME_LEN + 1)).is_err());
    }
}
