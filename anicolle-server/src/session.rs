//! Session middleware [MB-ACC]
//!
//! `resolve_session` runs on every request: a valid
//! `Authorization: Bearer <token>` header puts a [`CurrentUser`] into the
//! request extensions. `require_session` guards routes that need a login
//! and answers 401 when no user was resolved.

use anicolle_common::db::User;
use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::{debug, warn};

use crate::db::sessions;
use crate::error::ApiError;
use crate::AppState;

/// The logged-in user behind the current request
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub user: User,
    /// Session token the request was authenticated with
    pub token: String,
}

impl CurrentUser {
    pub fn id(&self) -> i64 {
        self.user.id
    }
}

/// Extract the bearer token from the Authorization header
pub fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

/// Attach the session user, if any, to the request
///
/// Unknown or expired tokens are not an error here; the request simply
/// continues anonymously and protected routes reject it.
pub async fn resolve_session(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    if let Some(token) = bearer_token(request.headers()) {
        match sessions::find_session_user(&state.db, &token).await {
            Ok(Some((session, user))) => {
                request.extensions_mut().insert(CurrentUser {
                    user,
                    token: session.token,
                });
            }
            Ok(None) => debug!("Ignoring unknown or expired session token"),
            Err(e) => {
                warn!("Session lookup failed: {}", e);
                return ApiError::from(e).into_response();
            }
        }
    }

    next.run(request).await
}

/// Reject requests without a resolved session
pub async fn require_session(request: Request, next: Next) -> Result<Response, ApiError> {
    if request.extensions().get::<CurrentUser>().is_none() {
        return Err(ApiError::Unauthorized("login required".to_string()));
    }
    Ok(next.run(request).await)
}
