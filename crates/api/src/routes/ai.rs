use axum::routing::{get, post};
use axum::Router;

use crate::handlers::ai;
use crate::state::AppState;

/// Mount the `/api/ai` command routes.
///
/// ```text
/// GET  /api/ai, /api/ai/                      index
/// POST /api/ai/generate-article               generate_article
/// POST /api/ai/generate-blog-titles           generate_blog_titles
/// POST /api/ai/generate-images                generate_images
/// POST /api/ai/review-resume                  review_resume
/// POST /api/ai/remove-background              remove_background
/// POST /api/ai/remove-object                  remove_object
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/ai", get(ai::index))
        .route("/api/ai/", get(ai::index))
        .route("/api/ai/generate-article", post(ai::generate_article))
        .route("/api/ai/generate-blog-titles", post(ai::generate_blog_titles))
        .route("/api/ai/generate-images", post(ai::generate_images))
        .route("/api/ai/review-resume", post(ai::review_resume))
        .route("/api/ai/remove-background", post(ai::remove_background))
        .route("/api/ai/remove-object", post(ai::remove_object))
}
