//! HTTP handlers and route configuration.

mod health;
mod posts;
mod submission;
mod user_posts;


use actix_web::{error::JsonPayloadError, web};
use quill_core::DomainError;

use crate::middleware::error::AppError;

fn json_error(err: JsonPayloadError, _req: &actix_web::HttpRequest) -> actix_web::Error {
    AppError::from(DomainError::Validation(format!("Invalid request body: {err}"))).into()
}

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .app_data(web::JsonConfig::default().error_handler(json_error))
            .route("/health", web::get().to(health::health_check))
            // Admin authoring and public reads
            .route("/post", web::post().to(posts::create))
            .route("/posts", web::get().to(posts::list))
            .route(
                "/posts-categories-tags",
                web::post().to(posts::list_with_taxonomy),
            )
            .route("/posts/related", web::post().to(posts::related))
            .route("/posts/search", web::get().to(posts::search))
            .route("/post/photo/{slug}", web::get().to(posts::photo))
            .route("/post/{slug}", web::get().to(posts::read))
            .route("/post/{slug}", web::delete().to(posts::remove))
            .route("/post/{slug}", web::put().to(posts::update))
            // Signed-in users
            .route("/user/post", web::post().to(user_posts::create))
            .route("/user/post/{slug}", web::delete().to(user_posts::remove))
            .route("/user/post/{slug}", web::put().to(user_posts::update))
            .route("/{username}/posts", web::get().to(user_posts::list_by_user)),
    );
}
