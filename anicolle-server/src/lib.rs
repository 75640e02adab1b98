//! anicolle-server library - AniColle microblog HTTP service
//!
//! Exposes the router and state so integration tests can drive the API
//! without binding a socket.

use anicolle_common::config::ServerConfig;
use axum::Router;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tower_http::trace::TraceLayer;

pub mod anime_client;
pub mod api;
pub mod db;
pub mod error;
pub mod session;

pub use crate::error::{ApiError, ApiResult};

use crate::anime_client::AnimeClient;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Outbound anime API client [MB-ANI]
    pub anime_client: AnimeClient,
    /// Lifetime of a login session in hours
    pub session_ttl_hours: i64,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(db: SqlitePool, anime_client: AnimeClient, session_ttl_hours: i64) -> Self {
        Self {
            db,
            anime_client,
            session_ttl_hours,
            startup_time: Utc::now(),
        }
    }

    /// Build state from a loaded server configuration
    pub fn from_config(db: SqlitePool, config: &ServerConfig) -> Result<Self, ApiError> {
        let anime_client = AnimeClient::new(
            &config.anime_api_base_url,
            std::time::Duration::from_secs(config.anime_api_timeout_secs),
        )?;
        Ok(Self::new(db, anime_client, config.session_ttl_hours))
    }
}

/// Build application router
///
/// Public routes work without a session; protected routes answer 401
/// unless `resolve_session` found a valid bearer token.
pub fn build_router(state: AppState) -> Router {
    use axum::middleware;
    use axum::routing::{get, post, put};

    // Protected routes (require login)
    let protected = Router::new()
        .route("/api/accounts/logout", post(api::logout))
        .route("/api/blogs", post(api::create_blog))
        .route("/api/blogs/:id", put(api::update_blog).delete(api::delete_blog))
        .route("/api/animes/:anime/blogs", post(api::create_blog_by_anime))
        .route("/api/blogs/:id/like", get(api::toggle_like).post(api::toggle_like))
        .route("/api/users/:nick_name", put(api::edit_profile).delete(api::delete_user))
        .route_layer(middleware::from_fn(crate::session::require_session));

    // Public routes (session optional)
    let public = Router::new()
        .route("/api/accounts/register", post(api::register))
        .route("/api/accounts/login", post(api::login))
        .route("/api/blogs", get(api::list_blogs))
        .route("/api/blogs/:id", get(api::blog_detail))
        .route("/api/tags/:tag/blogs", get(api::list_blogs_by_tag))
        .route("/api/blogs/:id/comments", post(api::create_comment))
        .route("/api/comments/:id/replies", post(api::create_reply))
        .route("/api/users/:nick_name", get(api::profile_detail))
        .route("/api/anime/search", get(api::search_anime_get).post(api::search_anime_post))
        .merge(api::health_routes());

    Router::new()
        .merge(protected)
        .merge(public)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            crate::session::resolve_session,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
