//! HTTP client for an OpenAI-compatible chat-completions endpoint.

use std::time::Duration;

use reqwest::{Client, Url};
use shelfpost_core::DetailRecord;

use crate::error::GeneratorError;
use crate::prompt::build_prompt;
use crate::types::{ChatMessage, ChatRequest, ChatResponse};

/// Everything needed to reach the model.
#[derive(Clone)]
pub struct GeneratorSettings {
    pub api_key: String,
    pub endpoint: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub timeout_secs: u64,
}

impl std::fmt::Debug for GeneratorSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeneratorSettings")
            .field("api_key", &"[redacted]")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// Single-shot chat-completions client. No retries: a failed generation
/// ends the run.
pub struct ChatClient {
    client: Client,
    endpoint: Url,
    settings: GeneratorSettings,
}

impl ChatClient {
    /// Creates a client posting to `settings.endpoint`.
    ///
    /// # Errors
    ///
    /// Returns [`GeneratorError::Http`] if the `reqwest::Client` cannot be
    /// built, or [`GeneratorError::InvalidEndpoint`] if the endpoint is not a URL.
    pub fn new(settings: GeneratorSettings) -> Result<Self, GeneratorError> {
        let endpoint = settings.endpoint.clone();
        Self::with_endpoint(settings, &endpoint)
    }

    /// Creates a client posting to `endpoint` instead of `settings.endpoint`
    /// (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Same as [`ChatClient::new`].
    pub fn with_endpoint(
        settings: GeneratorSettings,
        endpoint: &str,
    ) -> Result<Self, GeneratorError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(concat!("shelfpost/", env!("CARGO_PKG_VERSION")))
            .build()?;
        let endpoint = Url::parse(endpoint).map_err(|e| GeneratorError::InvalidEndpoint {
            endpoint: endpoint.to_owned(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            client,
            endpoint,
            settings,
        })
    }

    /// Generates review text for `record`.
    ///
    /// # Errors
    ///
    /// See [`ChatClient::complete`].
    pub async fn generate(&self, record: &DetailRecord) -> Result<String, GeneratorError> {
        let prompt = build_prompt(record);
        let text = self.complete(&prompt).await?;
        tracing::info!(
            title = %record.title,
            chars = text.chars().count(),
            "generated review"
        );
        Ok(text)
    }

    /// Sends `prompt` as a single user message and returns the trimmed reply.
    ///
    /// # Errors
    ///
    /// - [`GeneratorError::Http`] on network failure.
    /// - [`GeneratorError::Status`] on a non-2xx response.
    /// - [`GeneratorError::Deserialize`] if the body is not JSON.
    /// - [`GeneratorError::MissingContent`] if `choices[0].message.content` is absent.
    /// - [`GeneratorError::EmptyContent`] if the reply is blank.
    pub async fn complete(&self, prompt: &str) -> Result<String, GeneratorError> {
        let request = ChatRequest {
            model: &self.settings.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            max_tokens: self.settings.max_tokens,
            temperature: self.settings.temperature,
        };

        let response = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(&self.settings.api_key)
            .json(&request)
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(GeneratorError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatResponse = match serde_json::from_str(&body) {
            Ok(parsed) => parsed,
            Err(source) => return Err(GeneratorError::Deserialize { body, source }),
        };
        tracing::debug!(choices = parsed.choices.len(), "generator response parsed");

        let Some(content) = parsed.first_content() else {
            return Err(GeneratorError::MissingContent { body });
        };
        let text = content.trim();
        if text.is_empty() {
            return Err(GeneratorError::EmptyContent);
        }
        Ok(text.to_string())
    }
}
