//! Generative-language client (Gemini) used for per-video popularity notes.

use serde_json::{json, Value};
use thiserror::Error;
use trend_core::{
    build_summary_prompt, normalize_model_name, select_model, VideoRecord, DEFAULT_MODEL,
    PREFERRED_MODELS,
};

use crate::{agent_for, IngestConfig};

const GENERATE_METHOD: &str = "generateContent";

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("generation request failed: {0}")]
    Transport(String),
    #[error("generation API returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("generation response could not be parsed: {0}")]
    Parse(String),
    #[error("generation response contained no text")]
    EmptyResponse,
}

/// Model listing plus text generation.
pub trait SummaryGenerator {
    /// Names (without the `models/` prefix) of models that support text generation.
    ///
    /// # Errors
    /// Returns an error when the listing call fails.
    fn list_models(&self) -> Result<Vec<String>, GenerationError>;

    /// Generate text for `prompt` with `model`.
    ///
    /// # Errors
    /// Returns an error on transport failure, a non-success status, or an empty answer.
    fn generate(&self, model: &str, prompt: &str) -> Result<String, GenerationError>;
}

pub struct GeminiClient {
    agent: ureq::Agent,
    api_key: String,
    base_url: String,
}

impl GeminiClient {
    #[must_use]
    pub fn new(api_key: impl Into<String>, config: &IngestConfig) -> Self {
        Self {
            agent: agent_for(config),
            api_key: api_key.into(),
            base_url: config.generation_base_url.trim_end_matches('/').to_string(),
        }
    }
}

impl SummaryGenerator for GeminiClient {
    fn list_models(&self) -> Result<Vec<String>, GenerationError> {
        let url = format!("{}/v1beta/models", self.base_url);
        let response = self
            .agent
            .get(&url)
            .query("key", &self.api_key)
            .call()
            .map_err(generation_error_from)?;
        let body: Value =
            response.into_json().map_err(|err| GenerationError::Parse(err.to_string()))?;
        Ok(parse_model_listing(&body))
    }

    fn generate(&self, model: &str, prompt: &str) -> Result<String, GenerationError> {
        let url = format!("{}/v1beta/models/{model}:{GENERATE_METHOD}", self.base_url);
        let request = json!({ "contents": [{ "parts": [{ "text": prompt }] }] });

        tracing::debug!(model, prompt_chars = prompt.chars().count(), "requesting generation");
        let response = self
            .agent
            .post(&url)
            .query("key", &self.api_key)
            .send_json(request)
            .map_err(generation_error_from)?;
        let body: Value =
            response.into_json().map_err(|err| GenerationError::Parse(err.to_string()))?;
        let text = parse_generation_response(&body)?;
        tracing::debug!(model, answer_chars = text.chars().count(), "generation complete");
        Ok(text)
    }
}

/// Keep the models whose supported methods include text generation.
#[must_use]
pub fn parse_model_listing(body: &Value) -> Vec<String> {
    body["models"]
        .as_array()
        .map(|models| {
            models
                .iter()
                .filter(|model| {
                    model["supportedGenerationMethods"].as_array().is_some_and(|methods| {
                        methods.iter().any(|method| method.as_str() == Some(GENERATE_METHOD))
                    })
                })
                .filter_map(|model| model["name"].as_str())
                .map(|name| normalize_model_name(name).to_string())
                .collect()
        })
        .unwrap_or_default()
}

/// Concatenate the text parts of the first candidate.
///
/// # Errors
/// Returns `EmptyResponse` when the first candidate carries no text.
pub fn parse_generation_response(body: &Value) -> Result<String, GenerationError> {
    let text = body["candidates"][0]["content"]["parts"]
        .as_array()
        .map(|parts| parts.iter().filter_map(|part| part["text"].as_str()).collect::<String>())
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(GenerationError::EmptyResponse);
    }
    Ok(text)
}

/// Pick the generation model, falling back to the default when discovery fails.
#[must_use]
pub fn discover_model(generator: &dyn SummaryGenerator) -> String {
    match generator.list_models() {
        Ok(available) => {
            let model = select_model(&available, &PREFERRED_MODELS);
            tracing::info!(
                model = %model,
                available = available.len(),
                "selected generation model"
            );
            model
        }
        Err(err) => {
            tracing::warn!(error = %err, fallback = DEFAULT_MODEL, "model discovery failed");
            DEFAULT_MODEL.to_string()
        }
    }
}

/// A generator bound to the model chosen for this run.
pub struct Summarizer<'a> {
    pub generator: &'a dyn SummaryGenerator,
    pub model: String,
}

impl<'a> Summarizer<'a> {
    /// Bind `generator` to the model picked by [`discover_model`].
    #[must_use]
    pub fn discover(generator: &'a dyn SummaryGenerator) -> Self {
        let model = discover_model(generator);
        Self { generator, model }
    }

    /// Request the popularity analysis for one record.
    ///
    /// # Errors
    /// Returns the generator's error unchanged; callers decide how to store it.
    pub fn summarize(&self, record: &VideoRecord) -> Result<String, GenerationError> {
        self.generator.generate(&self.model, &build_summary_prompt(record))
    }
}

fn generation_error_from(err: ureq::Error) -> GenerationError {
    match err {
        ureq::Error::Status(status, response) => {
            GenerationError::Status { status, body: crate::truncated_body(response) }
        }
        ureq::Error::Transport(transport) => {
            GenerationError::Transport(crate::describe_transport(&transport))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct ListingOnly(Result<Vec<String>, ()>);

    impl SummaryGenerator for ListingOnly {
        fn list_models(&self) -> Result<Vec<String>, GenerationError> {
            self.0.clone().map_err(|()| GenerationError::Transport("connection refused".into()))
        }

        fn generate(&self, _model: &str, _prompt: &str) -> Result<String, GenerationError> {
            Err(GenerationError::EmptyResponse)
        }
    }

    #[test]
    fn model_listing_keeps_generation_capable_models() {
        let body = json!({
            "models": [
                {
                    "name": "models/embedding-001",
                    "supportedGenerationMethods": ["embedContent"]
                },
                {
                    "name": "models/gemini-1.5-pro",
                    "supportedGenerationMethods": ["generateContent", "countTokens"]
                },
                { "name": "models/no-methods" },
                {
                    "name": "gemini-2.0-flash",
                    "supportedGenerationMethods": ["generateContent"]
                }
            ]
        });

        assert_eq!(parse_model_listing(&body), vec!["gemini-1.5-pro", "gemini-2.0-flash"]);
        assert!(parse_model_listing(&json!({})).is_empty());
    }

    #[test]
    fn generation_response_concatenates_parts() -> Result<(), GenerationError> {
        let body = json!({
            "candidates": [
                { "content": { "parts": [{ "text": "- Hook: a\n" }, { "text": "- Audience: b" }] } },
                { "content": { "parts": [{ "text": "ignored" }] } }
            ]
        });
        assert_eq!(parse_generation_response(&body)?, "- Hook: a\n- Audience: b");
        Ok(())
    }

    #[test]
    fn generation_response_without_text_is_empty_error() {
        let blocked = json!({ "promptFeedback": { "blockReason": "SAFETY" } });
        assert!(matches!(
            parse_generation_response(&blocked),
            Err(GenerationError::EmptyResponse)
        ));

        let blank = json!({ "candidates": [{ "content": { "parts": [{ "text": "  " }] } }] });
        assert!(matches!(parse_generation_response(&blank), Err(GenerationError::EmptyResponse)));
    }

    #[test]
    fn discovery_uses_ranked_preference() {
        let generator = ListingOnly(Ok(vec![
            "gemini-1.5-pro".to_string(),
            "gemini-1.5-flash".to_string(),
        ]));
        assert_eq!(discover_model(&generator), "gemini-1.5-flash");
    }

    #[test]
    fn discovery_failure_falls_back_to_default() {
        let generator = ListingOnly(Err(()));
        assert_eq!(discover_model(&generator), DEFAULT_MODEL);
        assert_eq!(Summarizer::discover(&generator).model, DEFAULT_MODEL);
    }
}
