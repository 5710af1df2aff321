//! Exercise-name extraction: one chat completion over the PDF text.
//!
//! The call is a single attempt. A transport or API failure becomes
//! [`DemosError::ExtractionRequest`]; an answer without a usable array becomes
//! [`DemosError::ExtractionParse`]. Prompt text lives in [`crate::prompts`],
//! array recovery in [`super::postprocess`].

use crate::config::DemoConfig;
use crate::error::DemosError;
use crate::output::ExerciseName;
use crate::pipeline::postprocess::parse_exercise_list;
use crate::prompts::{extraction_prompt, DEFAULT_SYSTEM_PROMPT};
use async_trait::async_trait;
use edgequake_llm::{ChatMessage, CompletionOptions, LLMProvider, ProviderFactory};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Names plus the token usage of the call that produced them.
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    pub names: Vec<ExerciseName>,
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
}

/// Turns document text into an ordered list of exercise names.
#[async_trait]
pub trait ExerciseExtractor: Send + Sync {
    async fn extract(&self, text: &str) -> Result<Extraction, DemosError>;
}

/// Extractor backed by an `edgequake-llm` provider.
pub struct LlmExerciseExtractor {
    provider: Arc<dyn LLMProvider>,
    system_prompt: String,
    options: CompletionOptions,
}

impl LlmExerciseExtractor {
    pub fn new(provider: Arc<dyn LLMProvider>, config: &DemoConfig) -> Self {
        Self {
            provider,
            system_prompt: config
                .system_prompt
                .clone()
                .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string()),
            options: build_options(config),
        }
    }

    /// Build an extractor from the provider chain in `config`.
    pub fn from_config(config: &DemoConfig) -> Result<Self, DemosError> {
        Ok(Self::new(resolve_provider(config)?, config))
    }
}

#[async_trait]
impl ExerciseExtractor for LlmExerciseExtractor {
    async fn extract(&self, text: &str) -> Result<Extraction, DemosError> {
        let start = Instant::now();
        let messages = vec![
            ChatMessage::system(self.system_prompt.as_str()),
            ChatMessage::user(extraction_prompt(text)),
        ];

        let response = self
            .provider
            .chat(&messages, Some(&self.options))
            .await
            .map_err(|e| {
                warn!("Exercise extraction request failed: {}", e);
                DemosError::ExtractionRequest {
                    detail: e.to_string(),
                }
            })?;

        debug!(
            "Extraction: {} input tokens, {} output tokens, {:?}",
            response.prompt_tokens,
            response.completion_tokens,
            start.elapsed()
        );

        let names = parse_exercise_list(&response.content).inspect_err(|e| {
            warn!("Could not parse model response: {}", e);
        })?;
        info!("Model returned {} exercise names", names.len());

        Ok(Extraction {
            names,
            prompt_tokens: response.prompt_tokens as u64,
            completion_tokens: response.completion_tokens as u64,
        })
    }
}

/// Build `CompletionOptions` from the run config.
fn build_options(config: &DemoConfig) -> CompletionOptions {
    CompletionOptions {
        temperature: Some(config.temperature),
        max_tokens: Some(config.max_tokens),
        ..Default::default()
    }
}

/// Resolve the LLM provider, from most-specific to least-specific.
///
/// 1. **Pre-built provider** (`config.provider`), used as-is.
/// 2. **Named provider + model** (`config.provider_name`), created through
///    [`ProviderFactory::create_llm_provider`], which reads the matching API
///    key from the environment.
/// 3. **Environment pair** `EDGEQUAKE_LLM_PROVIDER` + `EDGEQUAKE_MODEL`.
/// 4. **`OPENAI_API_KEY`** present: OpenAI (or any endpoint configured for the
///    OpenAI client, such as Groq's OpenAI-compatible API).
/// 5. **Full auto-detection** via [`ProviderFactory::from_env`].
pub fn resolve_provider(config: &DemoConfig) -> Result<Arc<dyn LLMProvider>, DemosError> {
    if let Some(ref provider) = config.provider {
        return Ok(Arc::clone(provider));
    }

    if let Some(ref name) = config.provider_name {
        let model = config
            .model
            .as_deref()
            .unwrap_or_else(|| default_model_for_provider(name));
        return create_provider(name, model);
    }

    if let (Ok(prov), Ok(model)) = (
        std::env::var("EDGEQUAKE_LLM_PROVIDER"),
        std::env::var("EDGEQUAKE_MODEL"),
    ) {
        if !prov.is_empty() && !model.is_empty() {
            return create_provider(&prov, &model);
        }
    }

    if let Ok(openai_key) = std::env::var("OPENAI_API_KEY") {
        if !openai_key.is_empty() {
            let model = config.model.as_deref().unwrap_or(DEFAULT_OPENAI_MODEL);
            return create_provider("openai", model);
        }
    }

    let (llm_provider, _embedding) =
        ProviderFactory::from_env().map_err(|e| DemosError::ProviderNotConfigured {
            provider: "auto".to_string(),
            hint: format!(
                "No LLM provider could be auto-detected from environment.\n\
                Set OPENAI_API_KEY, ANTHROPIC_API_KEY, or configure a provider.\n\
                Error: {}",
                e
            ),
        })?;

    Ok(llm_provider)
}

const DEFAULT_OPENAI_MODEL: &str = "gpt-4.1-nano";

/// A text model that works with each provider when none is given.
fn default_model_for_provider(provider: &str) -> &'static str {
    match provider {
        "anthropic" => "claude-haiku-4-20250514",
        "gemini" => "gemini-2.0-flash",
        "ollama" | "lmstudio" => "llama3.2",
        _ => DEFAULT_OPENAI_MODEL,
    }
}

fn create_provider(provider_name: &str, model: &str) -> Result<Arc<dyn LLMProvider>, DemosError> {
    ProviderFactory::create_llm_provider(provider_name, model).map_err(|e| {
        DemosError::ProviderNotConfigured {
            provider: provider_name.to_string(),
            hint: format!("{e}"),
        }
    })
}
