//! The generation-provider boundary.
//!
//! Everything generative is behind [`GenerationProvider`]: message candidates,
//! rubric scoring, and card art. The engine never assumes a particular vendor;
//! [`HttpProvider`] is a bundled OpenAI-compatible client so the engine works
//! out of the box, and tests substitute mocks.

use async_trait::async_trait;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, warn};

use cardsmith_core::CardAnswers;

use crate::error::{EngineError, Result};
use crate::rubric::{QaDimension, QaDimensionScore};

/// A structured request for message candidates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// The wizard answers driving the message.
    pub answers: CardAnswers,
    /// 0 for the first round, 1 for the first regeneration, and so on.
    pub attempt: u32,
    /// Previously generated texts to bias away from.
    pub avoid_messages: Vec<String>,
    /// Improvement instruction for regeneration rounds.
    pub improvement_hint: Option<String>,
    /// Tone guidance assembled from vibe constraints and overlays.
    pub tone_guidance: Option<String>,
    /// Length bounds in words.
    pub min_words: usize,
    pub max_words: usize,
}

/// The number of candidates a provider is expected to return per call.
pub const CANDIDATES_PER_ROUND: usize = 4;

/// An external generative service.
///
/// Calls are plain async I/O; callers needing timeouts impose them at this
/// boundary. Errors are retryable at the caller's discretion.
#[async_trait]
pub trait GenerationProvider: Send + Sync {
    /// Generates candidate messages. Expected to return
    /// [`CANDIDATES_PER_ROUND`] strings; fewer is tolerated and padded by the
    /// orchestrator.
    async fn generate_messages(&self, request: &GenerationRequest) -> Result<Vec<String>>;

    /// Scores a message against the fixed rubric, one entry per dimension.
    async fn score_rubric(
        &self,
        message: &str,
        rubric_prompt: &str,
    ) -> Result<Vec<QaDimensionScore>>;

    /// Generates one image for a fully composed prompt, returned as base64.
    async fn generate_image(&self, prompt: &str, aspect_ratio: &str) -> Result<String>;
}

/// Image generation retry budget: 2 attempts total.
pub const IMAGE_ATTEMPTS: u32 = 2;
const IMAGE_BACKOFF: std::time::Duration = std::time::Duration::from_secs(1);

/// Calls [`GenerationProvider::generate_image`] with bounded retries.
///
/// One retry with a 1-second backoff; exhaustion is a terminal, user-facing
/// error, never a silent loop.
pub async fn generate_image_with_retry<P: GenerationProvider + ?Sized>(
    provider: &P,
    prompt: &str,
    aspect_ratio: &str,
) -> Result<String> {
    let mut last_error = None;
    for attempt in 0..IMAGE_ATTEMPTS {
        if attempt > 0 {
            tokio::time::sleep(IMAGE_BACKOFF).await;
        }
        match provider.generate_image(prompt, aspect_ratio).await {
            Ok(image) => return Ok(image),
            Err(e) => {
                warn!(attempt, error = %e, "image generation attempt failed");
                last_error = Some(e);
            }
        }
    }
    debug!(?last_error, "image generation retries exhausted");
    Err(EngineError::ImageExhausted {
        attempts: IMAGE_ATTEMPTS,
    })
}

/// Configuration for the bundled HTTP provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Base URL of an OpenAI-compatible API.
    pub base_url: String,
    /// Bearer token.
    pub api_key: String,
    /// Model used for message generation and rubric scoring.
    pub text_model: String,
    /// Model used for card art.
    pub image_model: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            api_key: String::new(),
            text_model: "gpt-4o-mini".to_string(),
            image_model: "gpt-image-1".to_string(),
            max_tokens: 1024,
            temperature: 0.8,
        }
    }
}

/// OpenAI-compatible chat/image client.
pub struct HttpProvider {
    config: ProviderConfig,
    client: reqwest::Client,
}

impl HttpProvider {
    /// Creates a provider with the given configuration.
    pub fn new(config: ProviderConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    async fn chat(&self, system: &str, user: &str) -> Result<String> {
        let body = json!({
            "model": self.config.text_model,
            "messages": [
                {"role": "system", "content": system},
                {"role": "user", "content": user},
            ],
            "max_tokens": self.config.max_tokens,
            "temperature": self.config.temperature,
        });

        let response = self
            .client
            .post(format!("{}/chat/completions", self.config.base_url))
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(EngineError::Provider(format!("{status}: {text}")));
        }

        let payload: serde_json::Value = response.json().await?;
        payload["choices"][0]["message"]["content"]
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| {
                EngineError::MalformedResponse("missing chat completion content".to_string())
            })
    }

    fn message_prompt(request: &GenerationRequest) -> String {
        let answers = &request.answers;
        let mut prompt = format!(
            "Write {CANDIDATES_PER_ROUND} distinct greeting-card messages, \
             {}-{} words each.\nOccasion: {}\nRelationship: {}\nRecipient: {}\n",
            request.min_words,
            request.max_words,
            answers.occasion,
            answers.relationship,
            answers.recipient_name,
        );
        if !answers.vibes.is_empty() {
            prompt.push_str(&format!("Vibes: {}\n", answers.vibes.join(", ")));
        }
        if !answers.personal_details.is_empty() {
            prompt.push_str(&format!("Personal details: {}\n", answers.personal_details));
        }
        if let Some(guidance) = &request.tone_guidance {
            prompt.push_str(&format!("Tone guidance: {guidance}\n"));
        }
        if let Some(hint) = &request.improvement_hint {
            prompt.push_str(&format!(
                "This is attempt {}. Improvement needed: {hint}\n",
                request.attempt
            ));
        }
        if !request.avoid_messages.is_empty() {
            prompt.push_str("Do not repeat or closely echo these earlier drafts:\n");
            for msg in &request.avoid_messages {
                prompt.push_str(&format!("- {msg}\n"));
            }
        }
        prompt.push_str("Reply with a JSON array of message strings.");
        prompt
    }
}

#[async_trait]
impl GenerationProvider for HttpProvider {
    async fn generate_messages(&self, request: &GenerationRequest) -> Result<Vec<String>> {
        let content = self
            .chat(
                "You write short, personal greeting-card messages.",
                &Self::message_prompt(request),
            )
            .await?;
        let messages: Vec<String> = serde_json::from_str(extract_json(&content))?;
        debug!(count = messages.len(), attempt = request.attempt, "generated candidates");
        Ok(messages)
    }

    async fn score_rubric(
        &self,
        message: &str,
        rubric_prompt: &str,
    ) -> Result<Vec<QaDimensionScore>> {
        let user = format!("{rubric_prompt}\n\nMessage to score:\n{message}");
        let content = self
            .chat("You are a strict greeting-card quality scorer.", &user)
            .await?;

        #[derive(Deserialize)]
        struct RawScore {
            dimension: QaDimension,
            score: u8,
            #[serde(default)]
            feedback: String,
        }

        let raw: Vec<RawScore> = serde_json::from_str(extract_json(&content))?;
        Ok(raw
            .into_iter()
            .map(|r| QaDimensionScore::new(r.dimension, r.score, r.feedback))
            .collect())
    }

    async fn generate_image(&self, prompt: &str, aspect_ratio: &str) -> Result<String> {
        let size = match aspect_ratio {
            "portrait" => "1024x1536",
            "landscape" => "1536x1024",
            _ => "1024x1024",
        };
        let body = json!({
            "model": self.config.image_model,
            "prompt": prompt,
            "size": size,
            "n": 1,
        });

        let response = self
            .client
            .post(format!("{}/images/generations", self.config.base_url))
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(EngineError::Provider(format!("{status}: {text}")));
        }

        let payload: serde_json::Value = response.json().await?;
        let encoded = payload["data"][0]["b64_json"]
            .as_str()
            .ok_or_else(|| EngineError::MalformedResponse("missing image payload".to_string()))?;

        // Reject payloads that aren't actually base64 before handing them on.
        base64::engine::general_purpose::STANDARD
            .decode(encoded)
            .map_err(|e| EngineError::MalformedResponse(format!("invalid base64 image: {e}")))?;

        Ok(encoded.to_string())
    }
}

/// Trims surrounding prose/code fences so lenient models still parse.
fn extract_json(content: &str) -> &str {
    let trimmed = content.trim();
    let start = trimmed.find(['[', '{']);
    let end = trimmed.rfind([']', '}']);
    match (start, end) {
        (Some(s), Some(e)) if e >= s => &trimmed[s..=e],
        _ => trimmed,
    }
}
