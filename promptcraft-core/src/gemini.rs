//! Optimization gateway over Google's Gemini generation API.
//!
//! One `generateContent` call per optimization, with a fixed system
//! instruction parameterized by the prompt category and a JSON response
//! schema declaring the expected payload shape. No streaming, no
//! retries, no timeout beyond the transport default.
//!
//! Set the `GEMINI_API_KEY` environment variable with an API key from
//! Google AI Studio, or pass one to [`PromptOptimizer::new`].

use std::env;
use std::fmt::{Debug, Formatter, Result as FmtResult};

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, error};

use crate::error::OptimizeError;
use crate::models::{Category, Improvement, OptimizationResult};

/// Environment variable for the Gemini API key
const GEMINI_API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Default model to use
const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Base URL for the Gemini API
const API_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Sampling temperature for every optimization request
const TEMPERATURE: f32 = 0.7;

// ============================================================================
// API Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    system_instruction: GeminiContent,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<ContentPart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ContentPart {
    text: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
    response_mime_type: &'static str,
    response_schema: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    candidates: Option<Vec<Candidate>>,
    error: Option<GeminiApiError>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<GeminiContent>,
}

#[derive(Debug, Deserialize)]
struct GeminiApiError {
    message: String,
}

/// The structured payload the model is instructed to return.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OptimizationPayload {
    optimized_prompt: String,
    analysis_notes: String,
    rating: i64,
    improvements: Vec<Improvement>,
}

// ============================================================================
// Gateway
// ============================================================================

/// Client for the prompt-rewriting service.
///
/// Holds no state beyond the HTTP client and endpoint configuration;
/// persistence is an explicit separate step taken by the caller after a
/// successful result.
pub struct PromptOptimizer {
    api_key: String,
    client: Client,
    base_url: String,
    model: String,
}

impl PromptOptimizer {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            client: Client::new(),
            base_url: API_BASE_URL.to_owned(),
            model: DEFAULT_MODEL.to_owned(),
        }
    }

    /// Create an optimizer from the `GEMINI_API_KEY` environment variable.
    pub fn from_env() -> Result<Self, OptimizeError> {
        let api_key = env::var(GEMINI_API_KEY_ENV).map_err(|_| OptimizeError::MissingApiKey)?;
        Ok(Self::new(api_key))
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Override the API base URL. Tests point this at a mock server.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Rewrites `prompt` for the given category.
    ///
    /// On success the returned result echoes the caller's prompt and
    /// category verbatim alongside the parsed payload fields. A payload
    /// that does not conform to the declared schema (missing field,
    /// non-JSON text, rating outside 1-5) is rejected as
    /// [`OptimizeError::InvalidResponse`] rather than passed through.
    pub async fn optimize(
        &self,
        prompt: &str,
        category: Category,
    ) -> Result<OptimizationResult, OptimizeError> {
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        );

        let request = GeminiRequest {
            contents: vec![GeminiContent {
                role: Some("user".to_owned()),
                parts: vec![ContentPart {
                    text: prompt.to_owned(),
                }],
            }],
            system_instruction: GeminiContent {
                role: None,
                parts: vec![ContentPart {
                    text: system_instruction(category),
                }],
            },
            generation_config: GenerationConfig {
                temperature: TEMPERATURE,
                response_mime_type: "application/json",
                response_schema: response_schema(),
            },
        };

        debug!(model = %self.model, category = %category, "sending optimization request to Gemini");

        let response = self.client.post(&url).json(&request).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            error!(status = %status, "Gemini API error");
            return Err(Self::map_api_error(status.as_u16(), &body));
        }

        let gemini_response: GeminiResponse = serde_json::from_str(&body).map_err(|e| {
            error!(error = %e, "failed to parse Gemini response envelope");
            OptimizeError::InvalidResponse(format!("unparseable response envelope: {e}"))
        })?;

        if let Some(api_error) = gemini_response.error {
            return Err(OptimizeError::Api {
                status: status.as_u16(),
                message: api_error.message,
            });
        }

        let text = gemini_response
            .candidates
            .as_ref()
            .and_then(|candidates| candidates.first())
            .and_then(|candidate| candidate.content.as_ref())
            .and_then(|content| content.parts.first())
            .map(|part| part.text.clone())
            .ok_or(OptimizeError::EmptyResponse)?;

        let payload: OptimizationPayload = serde_json::from_str(&text).map_err(|e| {
            error!(error = %e, "optimization payload does not match the declared schema");
            OptimizeError::InvalidResponse(format!("payload does not match schema: {e}"))
        })?;

        let rating = validate_rating(payload.rating)?;

        debug!("successfully received optimization from Gemini");

        Ok(OptimizationResult {
            original_prompt: prompt.to_owned(),
            category,
            optimized_prompt: payload.optimized_prompt,
            analysis_notes: payload.analysis_notes,
            improvements: payload.improvements,
            rating: Some(rating),
        })
    }

    /// Recover the provider's error message from an error body when
    /// possible, falling back to the raw body.
    fn map_api_error(status: u16, body: &str) -> OptimizeError {
        let message = serde_json::from_str::<GeminiResponse>(body)
            .ok()
            .and_then(|response| response.error)
            .map_or_else(|| body.to_owned(), |e| e.message);
        OptimizeError::Api { status, message }
    }
}

impl Debug for PromptOptimizer {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("PromptOptimizer")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

fn validate_rating(rating: i64) -> Result<u8, OptimizeError> {
    u8::try_from(rating)
        .ok()
        .filter(|r| (1..=5).contains(r))
        .ok_or_else(|| OptimizeError::InvalidResponse(format!("rating {rating} outside 1-5")))
}

/// Fixed rewriting instruction, parameterized only by the category.
fn system_instruction(category: Category) -> String {
    format!(
        "You are a world-class Prompt Engineering Expert. Your goal is to take a user's prompt \
         and rewrite it to be clearer, more specific, and more effective for Large Language Models.\n\
         \n\
         Category Context: {category}\n\
         \n\
         Analyze the input prompt for:\n\
         1. Ambiguity or vagueness.\n\
         2. Lack of context or constraints.\n\
         3. Missing output format specifications.\n\
         \n\
         Then, generate an optimized version that:\n\
         - Assigns a persona (if applicable).\n\
         - Clearly defines the task.\n\
         - Sets constraints and format.\n\
         - Uses precise language."
    )
}

/// Response shape declaration sent with every request. All four fields
/// are required; a response missing any of them is rejected on parse.
fn response_schema() -> serde_json::Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "optimizedPrompt": {
                "type": "STRING",
                "description": "The rewritten, optimized version of the user's prompt."
            },
            "analysisNotes": {
                "type": "STRING",
                "description": "A brief analysis of why the changes were made and how they help."
            },
            "rating": {
                "type": "INTEGER",
                "description": "A score from 1 to 5 indicating the quality of the original prompt."
            },
            "improvements": {
                "type": "ARRAY",
                "description": "A list of specific improvements made.",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "type": {
                            "type": "STRING",
                            "description": "The category of improvement (e.g., 'Clarity', 'Context')."
                        },
                        "description": {
                            "type": "STRING",
                            "description": "Details about the specific improvement."
                        }
                    },
                    "required": ["type", "description"]
                }
            }
        },
        "required": ["optimizedPrompt", "analysisNotes", "improvements", "rating"]
    })
}
