//! Endpoints for signed-in users managing their own posts.

use actix_multipart::Multipart;
use actix_web::{HttpResponse, web};

use quill_shared::MessageResponse;

use super::submission::read_submission;
use crate::middleware::auth::Identity;
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// POST /api/user/post
pub async fn create(
    state: web::Data<AppState>,
    identity: Identity,
    payload: Multipart,
) -> AppResult<HttpResponse> {
    let submission = read_submission(payload, state.posts.settings().max_photo_bytes).await?;
    let post = state.posts.create(submission, identity.user_id).await?;
    Ok(HttpResponse::Ok().json(post))
}

/// GET /api/{username}/posts
pub async fn list_by_user(
    state: web::Data<AppState>,
    username: web::Path<String>,
) -> AppResult<HttpResponse> {
    let posts = state.posts.list_by_user(&username).await?;
    Ok(HttpResponse::Ok().json(posts))
}

/// DELETE /api/user/post/{slug}
pub async fn remove(
    state: web::Data<AppState>,
    identity: Identity,
    slug: web::Path<String>,
) -> AppResult<HttpResponse> {
    state.posts.ensure_owner(&slug, identity.user_id).await?;
    state.posts.remove(&slug).await?;
    Ok(HttpResponse::Ok().json(MessageResponse::post_deleted()))
}

/// PUT /api/user/post/{slug}
pub async fn update(
    state: web::Data<AppState>,
    identity: Identity,
    slug: web::Path<String>,
    payload: Multipart,
) -> AppResult<HttpResponse> {
    state.posts.ensure_owner(&slug, identity.user_id).await?;
    let submission = read_submission(payload, state.posts.settings().max_photo_bytes).await?;
    let post = state.posts.update(&slug, submission).await?;
    Ok(HttpResponse::Ok().json(post))
}
