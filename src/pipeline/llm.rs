//! VLM interaction: send one page image, get its text back.
//!
//! [`VisionModel`] is the seam the pipeline talks to. The production
//! implementation, [`LlmVisionModel`], wraps an `edgequake-llm` provider and
//! creates it on first use, so a missing API key fails the first request
//! rather than service startup.

use crate::config::ServiceConfig;
use crate::error::ExtractError;
use crate::prompts::EXTRACTION_PROMPT;
use async_trait::async_trait;
use edgequake_llm::{ChatMessage, CompletionOptions, ImageData, LLMProvider, ProviderFactory};
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, info};

/// Extracts the text visible in a page image.
#[async_trait]
pub trait VisionModel: Send + Sync {
    /// `label` identifies the page in logs and errors (e.g. `page-03`).
    async fn extract_text(&self, label: &str, image: ImageData) -> Result<String, ExtractError>;
}

/// [`VisionModel`] backed by an `edgequake-llm` chat provider.
pub struct LlmVisionModel {
    provider_name: String,
    model: String,
    max_tokens: usize,
    provider: OnceCell<Arc<dyn LLMProvider>>,
}

impl LlmVisionModel {
    /// Provider is resolved lazily from `config.provider_name` / `config.model`.
    pub fn from_config(config: &ServiceConfig) -> Self {
        Self {
            provider_name: config.provider_name.clone(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            provider: OnceCell::new(),
        }
    }

    /// Use a pre-built provider, e.g. one wrapped in custom middleware.
    pub fn with_provider(provider: Arc<dyn LLMProvider>, config: &ServiceConfig) -> Self {
        Self {
            provider: OnceCell::new_with(Some(provider)),
            ..Self::from_config(config)
        }
    }

    async fn provider(&self) -> Result<&Arc<dyn LLMProvider>, ExtractError> {
        self.provider
            .get_or_try_init(|| async {
                info!(
                    "Initialising LLM provider '{}' with model '{}'",
                    self.provider_name, self.model
                );
                ProviderFactory::create_llm_provider(&self.provider_name, &self.model).map_err(|e| {
                    ExtractError::ProviderNotConfigured {
                        provider: self.provider_name.clone(),
                        hint: format!("{e}"),
                    }
                })
            })
            .await
    }

    fn build_options(&self) -> CompletionOptions {
        build_options(self.max_tokens)
    }
}

#[async_trait]
impl VisionModel for LlmVisionModel {
    async fn extract_text(&self, label: &str, image: ImageData) -> Result<String, ExtractError> {
        let provider = self.provider().await?;
        let messages = vec![ChatMessage::user_with_images(EXTRACTION_PROMPT, vec![image])];
        let options = self.build_options();

        let response = provider
            .chat(&messages, Some(&options))
            .await
            .map_err(|e| ExtractError::LlmApiError {
                page: label.to_string(),
                message: format!("{e}"),
            })?;

        debug!(
            "{}: {} input tokens, {} output tokens",
            label, response.prompt_tokens, response.completion_tokens
        );
        Ok(response.content)
    }
}

/// Completion options for a page request.
fn build_options(max_tokens: usize) -> CompletionOptions {
    CompletionOptions {
        max_tokens: Some(max_tokens),
        ..Default::default()
    }
}
