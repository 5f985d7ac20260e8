//! Generation commands: validation, prompt plans, and result shaping.
//!
//! A [`GenerationRequest`] is built by the HTTP layer from a JSON body and
//! runs through three steps:
//!
//! 1. [`GenerationRequest::validate`] rejects blank or out-of-range input.
//! 2. Text kinds either go to the completion provider using the
//!    [`PromptPlan`] from [`GenerationRequest::prompt_plan`] and are shaped
//!    by [`GenerationRequest::shape_completion`], or fall back to
//!    [`GenerationRequest::fallback_output`] when no provider is configured.
//! 3. Image kinds are placeholders only
//!    ([`GenerationRequest::placeholder_output`]).

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Defaults and bounds
// ---------------------------------------------------------------------------

/// Target article length in words when the request omits it.
pub const DEFAULT_ARTICLE_LENGTH: u32 = 500;
/// Upper bound on requested article length in words.
pub const MAX_ARTICLE_LENGTH: u32 = 10_000;
/// Number of blog titles requested when the request omits it.
pub const DEFAULT_TITLE_COUNT: u32 = 5;
pub const MAX_TITLE_COUNT: u32 = 20;
/// Image style used when the request omits it or sends a blank string.
pub const DEFAULT_IMAGE_STYLE: &str = "realistic";
pub const DEFAULT_IMAGE_COUNT: u32 = 1;
pub const MAX_IMAGE_COUNT: u32 = 10;

/// Number of titles produced by the fallback, independent of `count`.
pub const FALLBACK_TITLE_COUNT: u32 = 5;

const MIN_ARTICLE_TOKENS: u32 = 64;
const MAX_ARTICLE_TOKENS: u32 = 8192;

const TITLES_TEMPERATURE: f32 = 0.8;
const TITLES_MAX_TOKENS: u32 = 500;
const ARTICLE_TEMPERATURE: f32 = 0.7;
const REVIEW_TEMPERATURE: f32 = 0.3;
const REVIEW_MAX_TOKENS: u32 = 1500;

const RESUME_REVIEWER_PERSONA: &str = "You are an expert resume reviewer. Analyze the provided \
resume and give constructive feedback on: 1) Content quality, 2) Formatting, 3) Keywords \
optimization, 4) ATS compatibility, 5) Overall suggestions for improvement. Be specific and \
actionable.";

pub const BACKGROUND_REMOVED_URL: &str =
    "https://via.placeholder.com/600x400/00ff00/ffffff?text=Background+Removed";
pub const OBJECT_REMOVED_URL: &str =
    "https://via.placeholder.com/600x400/ff0000/ffffff?text=Object+Removed";

const PROMPT_REQUIRED: &str = "Prompt is required and must be a non-empty string";
const RESUME_REQUIRED: &str = "Resume text is required and must be a non-empty string";
const IMAGE_REQUIRED: &str = "Image URL is required and must be a non-empty string";

// ---------------------------------------------------------------------------
// Command kind
// ---------------------------------------------------------------------------

/// The six commands the service can execute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    Article,
    BlogTitles,
    Images,
    ResumeReview,
    BackgroundRemoval,
    ObjectRemoval,
}

impl CommandKind {
    pub const ALL: [CommandKind; 6] = [
        CommandKind::Article,
        CommandKind::BlogTitles,
        CommandKind::Images,
        CommandKind::ResumeReview,
        CommandKind::BackgroundRemoval,
        CommandKind::ObjectRemoval,
    ];

    /// Stable tag stored in the `creations.type` column.
    pub fn tag(&self) -> &'static str {
        match self {
            CommandKind::Article => "article",
            CommandKind::BlogTitles => "blog_titles",
            CommandKind::Images => "images",
            CommandKind::ResumeReview => "resume_review",
            CommandKind::BackgroundRemoval => "background_removal",
            CommandKind::ObjectRemoval => "object_removal",
        }
    }

    /// Generic message returned to the client when the kind fails upstream.
    pub fn failure_message(&self) -> &'static str {
        match self {
            CommandKind::Article => "Failed to generate article",
            CommandKind::BlogTitles => "Failed to generate blog titles",
            CommandKind::Images => "Failed to generate images",
            CommandKind::ResumeReview => "Failed to review resume",
            CommandKind::BackgroundRemoval => "Failed to remove background",
            CommandKind::ObjectRemoval => "Failed to remove object",
        }
    }
}

impl std::fmt::Display for CommandKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

// ---------------------------------------------------------------------------
// Request
// ---------------------------------------------------------------------------

/// A point the user clicked on an image, in percent of width/height.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SelectionPoint {
    pub x: f64,
    pub y: f64,
}

/// One command with its kind-specific parameters.
#[derive(Debug, Clone, PartialEq)]
pub enum GenerationRequest {
    Article {
        prompt: String,
        /// Target length in words.
        length: u32,
    },
    BlogTitles {
        prompt: String,
        count: u32,
    },
    Images {
        prompt: String,
        style: String,
        count: u32,
    },
    ResumeReview {
        resume_text: String,
    },
    BackgroundRemoval {
        image_url: String,
    },
    ObjectRemoval {
        image_url: String,
        /// Accepted for forward compatibility; the placeholder ignores them.
        selected_areas: Vec<SelectionPoint>,
    },
}

/// Everything the completion provider needs for one text command.
#[derive(Debug, Clone, PartialEq)]
pub struct PromptPlan {
    pub system: Option<String>,
    pub user: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// Convert a target article length in words into an upstream token budget.
///
/// Roughly four tokens per three words, clamped so tiny requests still get
/// a usable answer and huge ones cannot run away.
pub fn article_token_budget(length_words: u32) -> u32 {
    let tokens = (u64::from(length_words) * 4).div_ceil(3);
    tokens.clamp(u64::from(MIN_ARTICLE_TOKENS), u64::from(MAX_ARTICLE_TOKENS)) as u32
}

/// Split an upstream titles answer into one title per non-blank line.
pub fn parse_titles(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

fn require_text(value: &str, message: &str) -> Result<(), CoreError> {
    if value.trim().is_empty() {
        return Err(CoreError::Validation(message.to_string()));
    }
    Ok(())
}

fn require_range(name: &str, value: u32, max: u32) -> Result<(), CoreError> {
    if value == 0 || value > max {
        return Err(CoreError::Validation(format!(
            "{name} must be between 1 and {max}"
        )));
    }
    Ok(())
}

impl GenerationRequest {
    pub fn kind(&self) -> CommandKind {
        match self {
            GenerationRequest::Article { .. } => CommandKind::Article,
            GenerationRequest::BlogTitles { .. } => CommandKind::BlogTitles,
            GenerationRequest::Images { .. } => CommandKind::Images,
            GenerationRequest::ResumeReview { .. } => CommandKind::ResumeReview,
            GenerationRequest::BackgroundRemoval { .. } => CommandKind::BackgroundRemoval,
            GenerationRequest::ObjectRemoval { .. } => CommandKind::ObjectRemoval,
        }
    }

    /// Check required fields and numeric bounds.
    ///
    /// Must run before the quota check and before any external call.
    pub fn validate(&self) -> Result<(), CoreError> {
        match self {
            GenerationRequest::Article { prompt, length } => {
                require_text(prompt, PROMPT_REQUIRED)?;
                require_range("length", *length, MAX_ARTICLE_LENGTH)
            }
            GenerationRequest::BlogTitles { prompt, count } => {
                require_text(prompt, PROMPT_REQUIRED)?;
                require_range("count", *count, MAX_TITLE_COUNT)
            }
            GenerationRequest::Images { prompt, count, .. } => {
                require_text(prompt, PROMPT_REQUIRED)?;
                require_range("count", *count, MAX_IMAGE_COUNT)
            }
            GenerationRequest::ResumeReview { resume_text } => {
                require_text(resume_text, RESUME_REQUIRED)
            }
            GenerationRequest::BackgroundRemoval { image_url }
            | GenerationRequest::ObjectRemoval { image_url, .. } => {
                require_text(image_url, IMAGE_REQUIRED)
            }
        }
    }

    /// The upstream prompt for text kinds; `None` for placeholder kinds.
    pub fn prompt_plan(&self) -> Option<PromptPlan> {
        match self {
            GenerationRequest::Article { prompt, length } => Some(PromptPlan {
                system: None,
                user: prompt.clone(),
                temperature: ARTICLE_TEMPERATURE,
                max_tokens: article_token_budget(*length),
            }),
            GenerationRequest::BlogTitles { prompt, count } => Some(PromptPlan {
                system: Some(format!(
                    "Generate {count} catchy, SEO-friendly blog title suggestions for the given \
                     topic. Each title should be engaging and click-worthy. Return only the \
                     titles, one per line."
                )),
                user: prompt.clone(),
                temperature: TITLES_TEMPERATURE,
                max_tokens: TITLES_MAX_TOKENS,
            }),
            GenerationRequest::ResumeReview { resume_text } => Some(PromptPlan {
                system: Some(RESUME_REVIEWER_PERSONA.to_string()),
                user: format!("Please review this resume:\n\n{resume_text}"),
                temperature: REVIEW_TEMPERATURE,
                max_tokens: REVIEW_MAX_TOKENS,
            }),
            GenerationRequest::Images { .. }
            | GenerationRequest::BackgroundRemoval { .. }
            | GenerationRequest::ObjectRemoval { .. } => None,
        }
    }

    /// Turn raw upstream text into the kind's payload.
    pub fn shape_completion(&self, text: String) -> Option<GenerationOutput> {
        match self {
            GenerationRequest::Article { .. } => Some(GenerationOutput::Article { content: text }),
            GenerationRequest::BlogTitles { .. } => Some(GenerationOutput::BlogTitles {
                titles: parse_titles(&text),
            }),
            GenerationRequest::ResumeReview { .. } => {
                Some(GenerationOutput::ResumeReview { review: text })
            }
            _ => None,
        }
    }

    /// Deterministic output for text kinds when no provider is configured.
    pub fn fallback_output(&self) -> Option<GenerationOutput> {
        match self {
            GenerationRequest::Article { prompt, .. } => Some(GenerationOutput::Article {
                content: format!(
                    "Mock article for: {prompt}\n\nThis is a placeholder because no completion \
                     provider is configured."
                ),
            }),
            GenerationRequest::BlogTitles { prompt, .. } => Some(GenerationOutput::BlogTitles {
                titles: (1..=FALLBACK_TITLE_COUNT)
                    .map(|k| format!("Mock: {prompt} - Idea {k}"))
                    .collect(),
            }),
            GenerationRequest::ResumeReview { resume_text } => {
                Some(GenerationOutput::ResumeReview {
                    review: format!(
                        "Mock review for resume. Provide constructive feedback for:\n\n{resume_text}"
                    ),
                })
            }
            _ => None,
        }
    }

    /// Placeholder output for the image kinds.
    ///
    /// `now_millis` seeds the descriptor ids; the URLs depend only on the
    /// request so the same input always yields the same images.
    pub fn placeholder_output(&self, now_millis: i64) -> Option<GenerationOutput> {
        match self {
            GenerationRequest::Images {
                prompt,
                style,
                count,
            } => Some(GenerationOutput::Images {
                images: (0..*count)
                    .map(|i| ImageDescriptor {
                        id: now_millis + i64::from(i),
                        url: placeholder_image_url(style, prompt, i),
                        prompt: prompt.clone(),
                    })
                    .collect(),
            }),
            GenerationRequest::BackgroundRemoval { .. } => Some(GenerationOutput::ProcessedImage {
                processed_image_url: BACKGROUND_REMOVED_URL.to_string(),
            }),
            GenerationRequest::ObjectRemoval { .. } => Some(GenerationOutput::ProcessedImage {
                processed_image_url: OBJECT_REMOVED_URL.to_string(),
            }),
            _ => None,
        }
    }

    /// The prompt recorded in the audit log for this request.
    pub fn record_prompt(&self) -> String {
        match self {
            GenerationRequest::Article { prompt, .. }
            | GenerationRequest::BlogTitles { prompt, .. }
            | GenerationRequest::Images { prompt, .. } => prompt.clone(),
            GenerationRequest::ResumeReview { .. } => "Resume Review".to_string(),
            GenerationRequest::BackgroundRemoval { .. } => "Background Removal".to_string(),
            GenerationRequest::ObjectRemoval { .. } => "Object Removal".to_string(),
        }
    }
}

fn placeholder_image_url(style: &str, prompt: &str, index: u32) -> String {
    let mut hasher = Sha256::new();
    hasher.update(style.as_bytes());
    hasher.update([0u8]);
    hasher.update(prompt.as_bytes());
    hasher.update(index.to_le_bytes());
    let digest = format!("{:x}", hasher.finalize());
    format!("https://picsum.photos/seed/{}/512/512", &digest[..16])
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// A generated (or placeholder) image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageDescriptor {
    pub id: i64,
    pub url: String,
    pub prompt: String,
}

/// Success payload of a command, serialized as the fields that sit next to
/// `"success": true` in the response body.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum GenerationOutput {
    Article {
        content: String,
    },
    BlogTitles {
        titles: Vec<String>,
    },
    Images {
        images: Vec<ImageDescriptor>,
    },
    ResumeReview {
        review: String,
    },
    ProcessedImage {
        #[serde(rename = "processedImageUrl")]
        processed_image_url: String,
    },
}

impl GenerationOutput {
    /// Serialized content stored in the audit log.
    pub fn record_content(&self) -> String {
        match self {
            GenerationOutput::Article { content } => content.clone(),
            GenerationOutput::BlogTitles { titles } => titles.join("\n"),
            GenerationOutput::Images { images } => {
                serde_json::to_string(images).unwrap_or_else(|_| "[]".to_string())
            }
            GenerationOutput::ResumeReview { review } => review.clone(),
            GenerationOutput::ProcessedImage {
                processed_image_url,
            } => processed_image_url.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
