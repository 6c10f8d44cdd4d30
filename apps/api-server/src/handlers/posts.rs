//! Post endpoints: admin authoring and public reads.

use actix_multipart::Multipart;
use actix_web::{HttpResponse, web};

use quill_core::DomainError;
use quill_core::posts::{DEFAULT_PAGE_LIMIT, DEFAULT_RELATED_LIMIT};
use quill_shared::MessageResponse;
use quill_shared::dto::{ListPostsRequest, RelatedPostsRequest, SearchQuery};

use super::submission::read_submission;
use crate::middleware::auth::Identity;
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// POST /api/post
pub async fn create(
    state: web::Data<AppState>,
    identity: Identity,
    payload: Multipart,
) -> AppResult<HttpResponse> {
    identity.require_admin()?;
    let submission = read_submission(payload, state.posts.settings().max_photo_bytes).await?;
    let post = state.posts.create(submission, identity.user_id).await?;
    Ok(HttpResponse::Ok().json(post))
}

/// GET /api/posts
pub async fn list(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let posts = state.posts.list().await?;
    Ok(HttpResponse::Ok().json(posts))
}

/// POST /api/posts-categories-tags
///
/// The JSON body is optional; counts may be numbers or numeric strings.
pub async fn list_with_taxonomy(
    state: web::Data<AppState>,
    body: web::Bytes,
) -> AppResult<HttpResponse> {
    let request = if body.iter().all(u8::is_ascii_whitespace) {
        ListPostsRequest::default()
    } else {
        serde_json::from_slice::<ListPostsRequest>(&body)
            .map_err(|e| DomainError::Validation(format!("Invalid listing request: {e}")))?
    };

    let limit = request
        .limit
        .filter(|n| *n > 0)
        .unwrap_or(DEFAULT_PAGE_LIMIT);
    let skip = request.skip.unwrap_or(0);

    let listing = state.posts.list_with_taxonomy(limit, skip).await?;
    Ok(HttpResponse::Ok().json(listing))
}

/// GET /api/post/{slug}
pub async fn read(state: web::Data<AppState>, slug: web::Path<String>) -> AppResult<HttpResponse> {
    let post = state.posts.read(&slug).await?;
    Ok(HttpResponse::Ok().json(post))
}

/// DELETE /api/post/{slug}
pub async fn remove(
    state: web::Data<AppState>,
    identity: Identity,
    slug: web::Path<String>,
) -> AppResult<HttpResponse> {
    identity.require_admin()?;
    state.posts.remove(&slug).await?;
    Ok(HttpResponse::Ok().json(MessageResponse::post_deleted()))
}

/// PUT /api/post/{slug}
pub async fn update(
    state: web::Data<AppState>,
    identity: Identity,
    slug: web::Path<String>,
    payload: Multipart,
) -> AppResult<HttpResponse> {
    identity.require_admin()?;
    let submission = read_submission(payload, state.posts.settings().max_photo_bytes).await?;
    let post = state.posts.update(&slug, submission).await?;
    Ok(HttpResponse::Ok().json(post))
}

/// GET /api/post/photo/{slug}
pub async fn photo(state: web::Data<AppState>, slug: web::Path<String>) -> AppResult<HttpResponse> {
    let photo = state.posts.photo(&slug).await?;
    Ok(HttpResponse::Ok()
        .content_type(photo.content_type)
        .body(photo.data))
}

/// POST /api/posts/related
pub async fn related(
    state: web::Data<AppState>,
    body: web::Json<RelatedPostsRequest>,
) -> AppResult<HttpResponse> {
    let request = body.into_inner();
    let limit = request
        .limit
        .filter(|n| *n > 0)
        .unwrap_or(DEFAULT_RELATED_LIMIT);

    let posts = state
        .posts
        .related(request.post.id, &request.post.category_ids(), limit)
        .await?;
    Ok(HttpResponse::Ok().json(posts))
}

/// GET /api/posts/search?search=
pub async fn search(
    state: web::Data<AppState>,
    query: web::Query<SearchQuery>,
) -> AppResult<HttpResponse> {
    let term = query.into_inner().search.unwrap_or_default();
    let posts = state.posts.search(&term).await?.unwrap_or_default();
    Ok(HttpResponse::Ok().json(posts))
}
