//! Plan generation through a generative-AI service.
//!
//! Generation is a single request/response exchange: the lesson PDF (inline,
//! base64) and the teacher metadata go out together with a fixed system prompt
//! and a strict response schema; a JSON plan comes back. The exchange sits
//! behind [`PlanGenerator`] so the application state machine can be driven by
//! a scripted generator in tests.
//!
//! The response is all-or-nothing. Empty text, invalid JSON and JSON that does
//! not match the [`Plan`] shape are all hard failures; no partial plan is ever
//! handed to the renderer.
//!
//! ## Gemini request shape
//!
//! ```text
//! POST {endpoint}/v1beta/models/{model}:generateContent
//! x-goog-api-key: $GEMINI_API_KEY
//!
//! systemInstruction.parts[0].text      SYSTEM_PROMPT
//! contents[0].parts[0].inlineData      { mimeType: application/pdf, data: <base64> }
//! contents[0].parts[1].text            metadata JSON + instructions
//! generationConfig.responseMimeType    application/json
//! generationConfig.responseSchema      response_schema()
//! ```

use crate::types::{Metadata, PdfFile, Plan};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde_json::{Value, json};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GenerationError {
    #[cfg(feature = "gemini")]
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("API key not set: export {0}")]
    MissingApiKey(String),
    #[error("Generation service returned {status}: {message}")]
    Server { status: u16, message: String },
    #[error("Empty response from generation service")]
    EmptyResponse,
    #[error("Malformed plan in response: {0}")]
    MalformedResponse(#[source] serde_json::Error),
    #[error("Generated days {returned:?} do not match requested days {requested:?}")]
    DayMismatch {
        requested: Vec<String>,
        returned: Vec<String>,
    },
    #[error("Metadata could not be encoded: {0}")]
    Encode(#[source] serde_json::Error),
}

/// Produces the raw response text for a generation request.
pub trait PlanGenerator {
    /// Model identifier, part of the plan cache key.
    fn model(&self) -> &str;

    fn generate(&self, metadata: &Metadata, pdf: &PdfFile) -> Result<String, GenerationError>;
}

pub const SYSTEM_PROMPT: &str = "\
You are an advanced AI Lesson Plan Generator designed specifically for Mathematics education.
Your job is to read the uploaded PDF lesson plan, extract important information, use teacher inputs, and generate an enhanced, complete, structured lesson plan.

You must:
1. Support math equations (LaTeX-friendly).
2. Generate differentiated daily plans for each selected day.
3. Improve clarity, rigor, differentiation, and alignment with CCSS.
4. Output purely JSON based on the provided schema.

Logic for Differentiation:
- High Achievers: Enrichment, non-routine problems, algebraic thinking.
- Average Students: Standard practice, step-by-step structured tasks.
- Struggling Students: Scaffolding, visuals, worked examples.

Tone:
Professional, academic, rigorous math teaching, student-centered.
";

/// User prompt text: pretty-printed metadata plus output instructions.
pub fn user_prompt(metadata: &Metadata) -> Result<String, GenerationError> {
    let metadata_json = serde_json::to_string_pretty(metadata).map_err(GenerationError::Encode)?;
    Ok(format!(
        "METADATA INPUTS:\n{metadata_json}\n\n\
         Please process the attached PDF and the metadata above to create a detailed Math Lesson Plan \
         following the defined system instructions.\n\
         Ensure strict adherence to the output JSON schema. \
         Use LaTeX for all mathematical expressions (e.g., $x^2 + 2x$).\n"
    ))
}

fn string_object(fields: &[&str]) -> Value {
    let properties: serde_json::Map<String, Value> = fields
        .iter()
        .map(|f| (f.to_string(), json!({ "type": "STRING" })))
        .collect();
    json!({
        "type": "OBJECT",
        "properties": properties,
        "required": fields,
    })
}

/// Response schema mirroring [`Plan`]. Every field is required.
pub fn response_schema() -> Value {
    let differentiation = json!({
        "type": "OBJECT",
        "properties": {
            "strategies": { "type": "ARRAY", "items": { "type": "STRING" } },
            "highAchievers": { "type": "STRING" },
            "averageStudents": { "type": "STRING" },
            "strugglingStudents": { "type": "STRING" },
        },
        "required": ["strategies", "highAchievers", "averageStudents", "strugglingStudents"],
    });

    json!({
        "type": "OBJECT",
        "properties": {
            "generalInfo": string_object(&[
                "focusSkill",
                "ccssAlignment",
                "assessmentPlanned",
                "learningIntention",
                "successCriteria",
                "materials",
                "prerequisites",
            ]),
            "dailyPlans": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "day": { "type": "STRING" },
                        "intro": string_object(&["warmUp", "review", "vocabulary", "starter"]),
                        "presentation": string_object(&["explanation", "modeling", "examples", "checkUnderstanding"]),
                        "guidedPractice": string_object(&["groupStructure", "tasks"]),
                        "independentPractice": string_object(&["tasks", "equations"]),
                        "closure": string_object(&["selfAssessment", "summary", "exitTicket"]),
                        "differentiation": differentiation,
                        "homework": string_object(&["support", "core", "challenge"]),
                    },
                    "required": [
                        "day", "intro", "presentation", "guidedPractice",
                        "independentPractice", "closure", "differentiation", "homework",
                    ],
                },
            },
        },
        "required": ["generalInfo", "dailyPlans"],
    })
}

/// Full `generateContent` request body.
pub fn request_body(metadata: &Metadata, pdf: &PdfFile) -> Result<Value, GenerationError> {
    Ok(json!({
        "systemInstruction": { "parts": [{ "text": SYSTEM_PROMPT }] },
        "contents": [{
            "role": "user",
            "parts": [
                {
                    "inlineData": {
                        "mimeType": PdfFile::MIME_TYPE,
                        "data": STANDARD.encode(&pdf.bytes),
                    }
                },
                { "text": user_prompt(metadata)? },
            ],
        }],
        "generationConfig": {
            "responseMimeType": "application/json",
            "responseSchema": response_schema(),
        },
    }))
}

/// Parse response text into a plan, rejecting empty or non-conforming text.
pub fn parse_plan(text: &str) -> Result<Plan, GenerationError> {
    if text.trim().is_empty() {
        return Err(GenerationError::EmptyResponse);
    }
    serde_json::from_str(text).map_err(GenerationError::MalformedResponse)
}

/// Run one generation and parse the result.
pub fn generate_plan(
    generator: &impl PlanGenerator,
    metadata: &Metadata,
    pdf: &PdfFile,
) -> Result<Plan, GenerationError> {
    tracing::info!(model = generator.model(), pdf = %pdf.name, "requesting lesson plan");
    let text = generator.generate(metadata, pdf)?;
    tracing::debug!(bytes = text.len(), "generation response received");
    parse_plan(&text)
}

// ============================================================================
// Gemini REST client
// ============================================================================

#[cfg(feature = "gemini")]
pub use gemini::GeminiClient;

#[cfg(feature = "gemini")]
mod gemini {
    use super::*;
    use crate::config::GenerationConfig;
    use reqwest::blocking::Client;
    use serde::Deserialize;

    /// Blocking client for the Gemini `generateContent` endpoint.
    ///
    /// No request timeout is set; a slow generation is waited out.
    #[derive(Debug, Clone)]
    pub struct GeminiClient {
        endpoint: String,
        model: String,
        api_key: String,
        client: Client,
    }

    impl GeminiClient {
        pub fn new(
            endpoint: impl Into<String>,
            model: impl Into<String>,
            api_key: impl Into<String>,
        ) -> Result<Self, GenerationError> {
            let client = Client::builder()
                .timeout(None::<std::time::Duration>)
                .build()?;
            Ok(Self {
                endpoint: endpoint.into().trim_end_matches('/').to_string(),
                model: model.into(),
                api_key: api_key.into(),
                client,
            })
        }

        /// Build a client from config, reading the key from the configured
        /// environment variable.
        pub fn from_config(config: &GenerationConfig) -> Result<Self, GenerationError> {
            let api_key = std::env::var(&config.api_key_env)
                .ok()
                .filter(|k| !k.trim().is_empty())
                .ok_or_else(|| GenerationError::MissingApiKey(config.api_key_env.clone()))?;
            Self::new(&config.endpoint, &config.model, api_key)
        }

        pub fn url(&self) -> String {
            format!(
                "{}/v1beta/models/{}:generateContent",
                self.endpoint, self.model
            )
        }
    }

    impl PlanGenerator for GeminiClient {
        fn model(&self) -> &str {
            &self.model
        }

        fn generate(&self, metadata: &Metadata, pdf: &PdfFile) -> Result<String, GenerationError> {
            let body = request_body(metadata, pdf)?;
            let response = self
                .client
                .post(self.url())
                .header("x-goog-api-key", &self.api_key)
                .json(&body)
                .send()?;

            let status = response.status();
            if !status.is_success() {
                let message = response
                    .text()
                    .unwrap_or_else(|_| "Unknown error".to_string());
                return Err(GenerationError::Server {
                    status: status.as_u16(),
                    message,
                });
            }

            let parsed: GenerateContentResponse = response.json()?;
            Ok(parsed.text())
        }
    }

    #[derive(Debug, Default, Deserialize)]
    #[serde(default, rename_all = "camelCase")]
    pub(super) struct GenerateContentResponse {
        pub candidates: Vec<Candidate>,
    }

    #[derive(Debug, Default, Deserialize)]
    #[serde(default)]
    pub(super) struct Candidate {
        pub content: Content,
    }

    #[derive(Debug, Default, Deserialize)]
    #[serde(default)]
    pub(super) struct Content {
        pub parts: Vec<Part>,
    }

    #[derive(Debug, Default, Deserialize)]
    #[serde(default)]
    pub(super) struct Part {
        pub text: Option<String>,
    }

    impl GenerateContentResponse {
        /// Concatenated text parts of the first candidate.
        pub(super) fn text(&self) -> String {
            self.candidates
                .first()
                .map(|c| {
                    c.content
                        .parts
                        .iter()
                        .filter_map(|p| p.text.as_deref())
                        .collect()
                })
                .unwrap_or_default()
        }
    }
}
