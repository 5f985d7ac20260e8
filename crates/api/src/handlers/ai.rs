//! Handlers for the `/api/ai` command endpoints.
//!
//! Every command handler follows the same shape: resolve the caller, parse
//! the JSON body into a [`GenerationRequest`], then hand off to
//! [`engine::generate`]. Missing or null fields become blank or default values so
//! the engine's validation owns the error messages.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use quickai_core::generation::{
    CommandKind, GenerationOutput, GenerationRequest, SelectionPoint, DEFAULT_ARTICLE_LENGTH,
    DEFAULT_IMAGE_COUNT, DEFAULT_IMAGE_STYLE, DEFAULT_TITLE_COUNT,
};
use serde::{Deserialize, Serialize};

use crate::engine;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthCaller;
use crate::response::SuccessResponse;
use crate::state::AppState;

type GenerationResponse = AppResult<Json<SuccessResponse<GenerationOutput>>>;

// ---------------------------------------------------------------------------
// Request bodies
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct ArticleBody {
    pub prompt: Option<String>,
    pub length: Option<u32>,
}

impl From<ArticleBody> for GenerationRequest {
    fn from(body: ArticleBody) -> Self {
        GenerationRequest::Article {
            prompt: body.prompt.unwrap_or_default(),
            length: body.length.unwrap_or(DEFAULT_ARTICLE_LENGTH),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct BlogTitlesBody {
    pub prompt: Option<String>,
    pub count: Option<u32>,
}

impl From<BlogTitlesBody> for GenerationRequest {
    fn from(body: BlogTitlesBody) -> Self {
        GenerationRequest::BlogTitles {
            prompt: body.prompt.unwrap_or_default(),
            count: body.count.unwrap_or(DEFAULT_TITLE_COUNT),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ImagesBody {
    pub prompt: Option<String>,
    pub style: Option<String>,
    pub count: Option<u32>,
}

impl From<ImagesBody> for GenerationRequest {
    fn from(body: ImagesBody) -> Self {
        let style = body
            .style
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_IMAGE_STYLE.to_string());
        GenerationRequest::Images {
            prompt: body.prompt.unwrap_or_default(),
            style,
            count: body.count.unwrap_or(DEFAULT_IMAGE_COUNT),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeBody {
    pub resume_text: Option<String>,
}

impl From<ResumeBody> for GenerationRequest {
    fn from(body: ResumeBody) -> Self {
        GenerationRequest::ResumeReview {
            resume_text: body.resume_text.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveBackgroundBody {
    pub image_url: Option<String>,
}

impl From<RemoveBackgroundBody> for GenerationRequest {
    fn from(body: RemoveBackgroundBody) -> Self {
        GenerationRequest::BackgroundRemoval {
            image_url: body.image_url.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveObjectBody {
    pub image_url: Option<String>,
    #[serde(default)]
    pub selected_areas: Vec<SelectionPoint>,
}

impl From<RemoveObjectBody> for GenerationRequest {
    fn from(body: RemoveObjectBody) -> Self {
        GenerationRequest::ObjectRemoval {
            image_url: body.image_url.unwrap_or_default(),
            selected_areas: body.selected_areas,
        }
    }
}

/// Unwrap a JSON body, turning axum's rejection into our failure shape.
fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> AppResult<T> {
    payload.map(|Json(body)| body).map_err(AppError::from)
}

async fn run(state: &AppState, caller: AuthCaller, request: GenerationRequest) -> GenerationResponse {
    let AuthCaller(caller) = caller;
    let output = engine::generate(state, &caller, request).await?;
    Ok(Json(SuccessResponse::new(output)))
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/ai/generate-article
pub async fn generate_article(
    State(state): State<AppState>,
    caller: AuthCaller,
    payload: Result<Json<ArticleBody>, JsonRejection>,
) -> GenerationResponse {
    let body = json_body(payload)?;
    run(&state, caller, body.into()).await
}

/// POST /api/ai/generate-blog-titles
pub async fn generate_blog_titles(
    State(state): State<AppState>,
    caller: AuthCaller,
    payload: Result<Json<BlogTitlesBody>, JsonRejection>,
) -> GenerationResponse {
    let body = json_body(payload)?;
    run(&state, caller, body.into()).await
}

/// POST /api/ai/generate-images
pub async fn generate_images(
    State(state): State<AppState>,
    caller: AuthCaller,
    payload: Result<Json<ImagesBody>, JsonRejection>,
) -> GenerationResponse {
    let body = json_body(payload)?;
    run(&state, caller, body.into()).await
}

/// POST /api/ai/review-resume
pub async fn review_resume(
    State(state): State<AppState>,
    caller: AuthCaller,
    payload: Result<Json<ResumeBody>, JsonRejection>,
) -> GenerationResponse {
    let body = json_body(payload)?;
    run(&state, caller, body.into()).await
}

/// POST /api/ai/remove-background
pub async fn remove_background(
    State(state): State<AppState>,
    caller: AuthCaller,
    payload: Result<Json<RemoveBackgroundBody>, JsonRejection>,
) -> GenerationResponse {
    let body = json_body(payload)?;
    run(&state, caller, body.into()).await
}

/// POST /api/ai/remove-object
pub async fn remove_object(
    State(state): State<AppState>,
    caller: AuthCaller,
    payload: Result<Json<RemoveObjectBody>, JsonRejection>,
) -> GenerationResponse {
    let body = json_body(payload)?;
    run(&state, caller, body.into()).await
}

// ---------------------------------------------------------------------------
// Index
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct IndexResponse {
    pub message: &'static str,
    /// `"POST /api/ai/..."` for every command.
    pub endpoints: Vec<String>,
}

/// Path segment under `/api/ai` for each command.
pub fn endpoint_path(kind: CommandKind) -> &'static str {
    match kind {
        CommandKind::Article => "/api/ai/generate-article",
        CommandKind::BlogTitles => "/api/ai/generate-blog-titles",
        CommandKind::Images => "/api/ai/generate-images",
        CommandKind::ResumeReview => "/api/ai/review-resume",
        CommandKind::BackgroundRemoval => "/api/ai/remove-background",
        CommandKind::ObjectRemoval => "/api/ai/remove-object",
    }
}

/// GET /api/ai/ -- lists the command endpoints.
pub async fn index() -> Json<SuccessResponse<IndexResponse>> {
    let endpoints = CommandKind::ALL
        .iter()
        .map(|kind| format!("POST {}", endpoint_path(*kind)))
        .collect();

    Json(SuccessResponse::new(IndexResponse {
        message: "AI API is live",
        endpoints,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_optional_fields_take_defaults() {
        let body: ImagesBody = serde_json::from_str(r#"{"prompt":"a fox","style":"  "}"#).unwrap();

        assert_eq!(
            GenerationRequest::from(body),
            GenerationRequest::Images {
                prompt: "a fox".into(),
                style: DEFAULT_IMAGE_STYLE.into(),
                count: DEFAULT_IMAGE_COUNT,
            }
        );
    }

    #[test]
    fn camel_case_fields_are_read() {
        let body: RemoveObjectBody = serde_json::from_str(
            r#"{"imageUrl":"https://example.com/a.png","selectedAreas":[{"x":1.5,"y":2}]}"#,
        )
        .unwrap();

        assert_eq!(body.image_url.as_deref(), Some("https://example.com/a.png"));
        assert_eq!(body.selected_areas, vec![SelectionPoint { x: 1.5, y: 2.0 }]);
    }

    #[test]
    fn missing_prompt_becomes_blank() {
        let body: ArticleBody = serde_json::from_str("{}").unwrap();
        assert_eq!(
            GenerationRequest::from(body),
            GenerationRequest::Article {
                prompt: String::new(),
                length: DEFAULT_ARTICLE_LENGTH,
            }
        );
    }
}
