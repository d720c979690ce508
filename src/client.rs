//! Completion client: turns a composed message pair into draft text.
//!
//! Model and sampling parameters are fixed. One provider handle is shared by
//! the whole process, created on first use and never torn down.

use std::sync::{Arc, OnceLock};

use tracing::{debug, info, warn};

use crate::config::ProviderConfig;
use crate::credentials::Credentials;
use crate::prompt::missing_sections;
use crate::providers::groq::GroqProvider;
use crate::providers::{CompletionRequest, LlmProvider, Message, ProviderError};

/// Hosted model every draft is generated with.
pub const MODEL_ID: &str = "llama-3.3-70b-versatile";
/// Sampling temperature.
pub const TEMPERATURE: f32 = 0.5;
/// Nucleus sampling cutoff.
pub const TOP_P: f32 = 0.9;
/// Maximum tokens in a draft.
pub const MAX_TOKENS: u32 = 1024;

static SHARED: OnceLock<CompletionClient> = OnceLock::new();

/// Issues single, unretried completion requests with the fixed parameters.
#[derive(Clone)]
pub struct CompletionClient {
    provider: Arc<dyn LlmProvider>,
}

impl std::fmt::Debug for CompletionClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompletionClient")
            .field("model", &self.provider.model_id())
            .finish()
    }
}

impl CompletionClient {
    /// Wrap a provider.
    pub fn new(provider: Arc<dyn LlmProvider>) -> Self {
        Self { provider }
    }

    /// Build a client backed by Groq.
    pub fn groq(config: &ProviderConfig, credentials: &Credentials) -> Self {
        let provider = GroqProvider::new(
            MODEL_ID.to_owned(),
            &config.base_url,
            credentials.api_key().map(str::to_owned),
        );
        Self::new(Arc::new(provider))
    }

    /// The request sent for `messages`.
    pub fn request_for(messages: Vec<Message>) -> CompletionRequest {
        CompletionRequest {
            messages,
            temperature: TEMPERATURE,
            top_p: TOP_P,
            max_tokens: MAX_TOKENS,
        }
    }

    /// Generate draft text for a composed message sequence.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] on any transport, authentication or
    /// provider failure, or when the first choice carries no text.
    pub async fn generate(&self, messages: Vec<Message>) -> Result<String, ProviderError> {
        debug!(
            model = self.provider.model_id(),
            messages = messages.len(),
            "requesting completion"
        );
        let response = self.provider.complete(Self::request_for(messages)).await?;

        let text = response
            .text
            .ok_or_else(|| ProviderError::Parse("completion has no text content".to_owned()))?;

        info!(
            model = %response.model,
            input_tokens = response.usage.input_tokens,
            output_tokens = response.usage.output_tokens,
            finish_reason = response.finish_reason.as_deref().unwrap_or("unknown"),
            "completion received"
        );
        let missing = missing_sections(&text);
        if !missing.is_empty() {
            warn!(?missing, "draft is missing required sections");
        }
        Ok(text)
    }
}

/// Process-wide client, built from `config` and `credentials` on the first
/// call. Later calls return the same handle and ignore their arguments.
pub fn shared_client(config: &ProviderConfig, credentials: &Credentials) -> &'static CompletionClient {
    SHARED.get_or_init(|| {
        info!(model = MODEL_ID, base_url = %config.base_url, "initialising completion client");
        CompletionClient::groq(config, credentials)
    })
}
