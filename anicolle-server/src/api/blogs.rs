//! Blog post endpoints [MB-BLOG]

use anicolle_common::db::{Blog, MAX_CONTENT_LEN};
use anicolle_common::pagination::{calculate_pagination, parse_page, Pagination, PAGE_SIZE};
use anicolle_common::tags::{normalize_tags, validate_tag_names};
use anicolle_common::thread::{build_comment_tree, CommentNode};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::MessageResponse;
use crate::db::blogs::{self, BlogFields};
use crate::db::{comments, likes, tags};
use crate::error::{ApiError, ApiResult};
use crate::session::CurrentUser;
use crate::AppState;

/// Raw page query; invalid values are tolerated, see [`parse_page`]
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
}

/// Post body for create and update
#[derive(Debug, Default, Deserialize)]
pub struct BlogInput {
    pub content: Option<String>,
    pub photo: Option<String>,
    pub anime_id: Option<i64>,
    pub anime: Option<String>,
    /// Comma (or `、`) separated tag names
    pub tag: Option<String>,
}

/// A post in a listing
#[derive(Debug, Serialize)]
pub struct BlogSummary {
    #[serde(flatten)]
    pub blog: Blog,
    pub tags: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct BlogListResponse {
    pub blog_list: Vec<BlogSummary>,
    #[serde(flatten)]
    pub pagination: Pagination,
    /// Tag the listing is filtered by, when it exists
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct BlogDetailResponse {
    #[serde(flatten)]
    pub blog: Blog,
    pub tags: Vec<String>,
    /// Number of like rows for the post
    pub like_cnt: i64,
    /// Whether the caller likes the post; absent for anonymous callers
    #[serde(skip_serializing_if = "Option::is_none")]
    pub liked: Option<bool>,
    /// Top-level comments with their replies nested
    pub comment_list: Vec<CommentNode>,
}

#[derive(Debug, Serialize)]
pub struct BlogSavedResponse {
    pub message: String,
    pub blog: BlogDetailResponse,
}

/// Validate the post fields, trimming the content
fn validate_fields(input: &BlogInput) -> ApiResult<BlogFields> {
    let content = input.content.as_deref().map(str::trim).unwrap_or_default();
    if content.is_empty() {
        return Err(ApiError::BadRequest("content is required".to_string()));
    }
    if content.chars().count() > MAX_CONTENT_LEN {
        return Err(ApiError::BadRequest(format!(
            "content must be at most {} characters",
            MAX_CONTENT_LEN
        )));
    }

    Ok(BlogFields {
        content: content.to_string(),
        photo: input.photo.clone().filter(|p| !p.trim().is_empty()),
        anime_id: input.anime_id,
        anime: input.anime.clone().filter(|a| !a.trim().is_empty()),
    })
}

fn parse_tags(raw: Option<&str>) -> ApiResult<Vec<String>> {
    let names = normalize_tags(raw.unwrap_or_default());
    validate_tag_names(&names).map_err(ApiError::BadRequest)?;
    Ok(names)
}

async fn summarize(state: &AppState, blog_list: Vec<Blog>) -> ApiResult<Vec<BlogSummary>> {
    let mut summaries = Vec::with_capacity(blog_list.len());
    for blog in blog_list {
        let tags = tags::tag_names_for_blog(&state.db, blog.id).await?;
        summaries.push(BlogSummary { blog, tags });
    }
    Ok(summaries)
}

/// Assemble the detail body for one post
pub(crate) async fn load_detail(
    state: &AppState,
    id: i64,
    viewer: Option<&CurrentUser>,
) -> ApiResult<BlogDetailResponse> {
    let blog = blogs::get_blog(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("blog {}", id)))?;

    let tags = tags::tag_names_for_blog(&state.db, id).await?;
    let like_cnt = likes::count_likes(&state.db, id).await?;
    let liked = match viewer {
        Some(user) => Some(likes::has_liked(&state.db, user.id(), id).await?),
        None => None,
    };
    let comment_list = build_comment_tree(comments::list_for_post(&state.db, id).await?);

    Ok(BlogDetailResponse {
        blog,
        tags,
        like_cnt,
        liked,
        comment_list,
    })
}

/// Only the author (or staff) may change a post
async fn authorize_author(state: &AppState, current: &CurrentUser, id: i64) -> ApiResult<Blog> {
    let blog = blogs::get_blog(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("blog {}", id)))?;

    if blog.user_id != current.id() && !current.user.is_staff {
        return Err(ApiError::Forbidden("only the author can change this post".to_string()));
    }
    Ok(blog)
}

/// GET /api/blogs?page=N
pub async fn list_blogs(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> ApiResult<Json<BlogListResponse>> {
    let total = blogs::count_blogs(&state.db).await?;
    let pagination = calculate_pagination(total, parse_page(query.page.as_deref()), PAGE_SIZE);
    let blog_list = blogs::list_blogs(&state.db, PAGE_SIZE, pagination.offset).await?;

    Ok(Json(BlogListResponse {
        blog_list: summarize(&state, blog_list).await?,
        pagination,
        tag: None,
        message: None,
    }))
}

/// GET /api/tags/:tag/blogs?page=N
///
/// An unknown tag is not an error: the caller gets a message and the
/// unfiltered listing.
pub async fn list_blogs_by_tag(
    State(state): State<AppState>,
    Path(tag_name): Path<String>,
    Query(query): Query<PageQuery>,
) -> ApiResult<Json<BlogListResponse>> {
    let requested = parse_page(query.page.as_deref());

    let Some(tag) = tags::find_by_name(&state.db, &tag_name).await? else {
        let Json(mut response) = list_blogs(State(state), Query(query)).await?;
        response.message = Some(format!("no posts are tagged with «{}»", tag_name));
        return Ok(Json(response));
    };

    let total = blogs::count_by_tag(&state.db, tag.id).await?;
    let pagination = calculate_pagination(total, requested, PAGE_SIZE);
    let blog_list = blogs::list_by_tag(&state.db, tag.id, PAGE_SIZE, pagination.offset).await?;

    Ok(Json(BlogListResponse {
        blog_list: summarize(&state, blog_list).await?,
        pagination,
        tag: Some(tag.name),
        message: None,
    }))
}

/// GET /api/blogs/:id
pub async fn blog_detail(
    State(state): State<AppState>,
    viewer: Option<Extension<CurrentUser>>,
    Path(id): Path<i64>,
) -> ApiResult<Json<BlogDetailResponse>> {
    let viewer = viewer.map(|Extension(user)| user);
    Ok(Json(load_detail(&state, id, viewer.as_ref()).await?))
}

async fn create(
    state: &AppState,
    current: &CurrentUser,
    input: &BlogInput,
) -> ApiResult<(StatusCode, Json<BlogSavedResponse>)> {
    let fields = validate_fields(input)?;
    let tag_names = parse_tags(input.tag.as_deref())?;

    let id = blogs::create_blog(&state.db, current.id(), &fields, &tag_names).await?;
    info!("User {} created blog {} with {} tags", current.id(), id, tag_names.len());

    Ok((
        StatusCode::CREATED,
        Json(BlogSavedResponse {
            message: "saved".to_string(),
            blog: load_detail(state, id, Some(current)).await?,
        }),
    ))
}

/// POST /api/blogs
pub async fn create_blog(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(input): Json<BlogInput>,
) -> ApiResult<(StatusCode, Json<BlogSavedResponse>)> {
    create(&state, &current, &input).await
}

/// POST /api/animes/:anime/blogs
///
/// Posting from an anime search result: the title becomes the default tag
/// and the default `anime` field.
pub async fn create_blog_by_anime(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(anime): Path<String>,
    Json(mut input): Json<BlogInput>,
) -> ApiResult<(StatusCode, Json<BlogSavedResponse>)> {
    if input.tag.is_none() {
        input.tag = Some(anime.clone());
    }
    if input.anime.is_none() {
        input.anime = Some(anime);
    }
    create(&state, &current, &input).await
}

/// PUT /api/blogs/:id
///
/// Absent `photo`, `anime_id` and `anime` keep their stored values. An
/// absent or empty `tag` keeps the current tags; otherwise they are
/// replaced.
pub async fn update_blog(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(input): Json<BlogInput>,
) -> ApiResult<Json<BlogSavedResponse>> {
    let existing = authorize_author(&state, &current, id).await?;

    let mut fields = validate_fields(&input)?;
    if input.photo.is_none() {
        fields.photo = existing.photo;
    }
    if input.anime_id.is_none() {
        fields.anime_id = existing.anime_id;
    }
    if input.anime.is_none() {
        fields.anime = existing.anime;
    }

    let tag_names = parse_tags(input.tag.as_deref())?;
    blogs::update_blog(&state.db, id, &fields, Some(tag_names.as_slice())).await?;
    info!("User {} updated blog {}", current.id(), id);

    Ok(Json(BlogSavedResponse {
        message: "updated".to_string(),
        blog: load_detail(&state, id, Some(&current)).await?,
    }))
}

/// DELETE /api/blogs/:id
pub async fn delete_blog(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> ApiResult<Json<MessageResponse>> {
    authorize_author(&state, &current, id).await?;
    blogs::delete_blog(&state.db, id).await?;
    info!("User {} deleted blog {}", current.id(), id);

    Ok(Json(MessageResponse::new("deleted")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(content: Option<&str>) -> BlogInput {
        BlogInput {
            content: content.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn test_content_required() {
        assert!(validate_fields(&input(None)).is_err());
        assert!(validate_fields(&input(Some("   "))).is_err());
    }

    #[test]
    fn test_content_trimmed_and_limited() {
        let fields = validate_fields(&input(Some("  hello  "))).unwrap();
        assert_eq!(fields.content, "hello");

        let max = "あ".repeat(MAX_CONTENT_LEN);
        assert!(validate_fields(&input(Some(&max))).is_ok());
        let over = "あ".repeat(MAX_CONTENT_LEN + 1);
        assert!(validate_fields(&input(Some(&over))).is_err());
    }

    #[test]
    fn test_blank_optional_fields_become_none() {
        let fields = validate_fields(&BlogInput {
            content: Some("x".to_string()),
            photo: Some(" ".to_string()),
            anime: Some(String::new()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(fields.photo, None);
        assert_eq!(fields.anime, None);
    }

    #[test]
    fn test_parse_tags() {
        assert_eq!(parse_tags(Some("a, b、a")).unwrap(), vec!["a", "b"]);
        assert!(parse_tags(None).unwrap().is_empty());
        assert!(parse_tags(Some(&"x".repeat(200))).is_err());
    }
}
