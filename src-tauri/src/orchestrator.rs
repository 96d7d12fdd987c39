use crate::api::ProviderRegistry;
use crate::config::AppConfig;
use crate::error::{AdapterError, GenerateError};
use crate::models::{GeneratedPrompt, GenerationRequest, Provider};
use crate::state::StateHolder;
use futures::future::join_all;

pub const GENERATION_FALLBACK_ERROR: &str = "Failed to generate prompts. Please check your API key.";
pub const MISSING_KEY_ERROR: &str = "Please enter an API Key to proceed.";
pub const MISSING_INPUT_ERROR: &str = "Please fill in both Blog Title and Content.";

/// Drives generation and description requests through the provider adapters
/// and commits their outcomes to a [`StateHolder`].
#[derive(Clone)]
pub struct Generator {
    registry: ProviderRegistry,
}

impl Generator {
    pub fn new(registry: ProviderRegistry) -> Self {
        Self { registry }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(ProviderRegistry::from_settings(&config.providers))
    }

    /// Caller-side checks, run before anything touches the network.
    pub fn validate(request: &GenerationRequest) -> Result<(), GenerateError> {
        if request.api_key.trim().is_empty() {
            return Err(GenerateError::Validation(MISSING_KEY_ERROR.to_string()));
        }
        if request.title.trim().is_empty() || request.content.trim().is_empty() {
            return Err(GenerateError::Validation(MISSING_INPUT_ERROR.to_string()));
        }
        Ok(())
    }

    /// Validates the request and asks the matching adapter for pin concepts.
    pub async fn generate(&self, request: &GenerationRequest) -> Result<Vec<GeneratedPrompt>, GenerateError> {
        Self::validate(request)?;
        log::info!("Generating pin concepts with {} for '{}'", request.provider, request.title);
        let prompts = self
            .registry
            .generate_concepts(request.provider, &request.api_key, &request.title, &request.content)
            .await?;
        log::info!("{} returned {} pin concepts", request.provider, prompts.len());
        Ok(prompts)
    }

    /// Full generate flow against the session state: validate, `loading`, then `ready` or `error`.
    /// Returns the number of pins committed.
    pub async fn run_generation(&self, state: &StateHolder) -> Result<usize, String> {
        let snapshot = state.snapshot().await;
        let request = GenerationRequest {
            provider: snapshot.provider,
            api_key: snapshot.api_key,
            title: snapshot.blog_title,
            content: snapshot.blog_content,
        };

        if let Err(e) = Self::validate(&request) {
            let message = error_message(&e);
            state.set_error(message.clone()).await;
            return Err(message);
        }

        let token = state.begin_generation().await;
        match self.generate(&request).await {
            Ok(prompts) => {
                let count = prompts.len();
                state.finish_generation(token, Ok(prompts)).await;
                Ok(count)
            }
            Err(e) => {
                log::error!("Pin generation failed: {:?}", e);
                let message = error_message(&e);
                state.finish_generation(token, Err(message.clone())).await;
                Err(message)
            }
        }
    }

    async fn describe(&self, provider: Provider, api_key: &str, pin: &GeneratedPrompt) -> Result<String, AdapterError> {
        self.registry
            .generate_description(provider, api_key, &pin.seo_title, &pin.visual_style)
            .await
    }

    /// Description for the pin at `index`. A missing index is a no-op.
    pub async fn generate_one_description(&self, index: usize, state: &StateHolder) {
        let snapshot = state.snapshot().await;
        let Some((ticket, pin)) = state.mark_description_loading(index).await else {
            log::debug!("No pin at index {}, skipping description", index);
            return;
        };

        let outcome = self
            .describe(snapshot.provider, &snapshot.api_key, &pin)
            .await
            .map_err(|e| {
                log::warn!("Failed to generate description for pin {}: {}", pin.id, e);
                e.to_string()
            });
        state.apply_description(ticket, index, outcome).await;
    }

    /// One concurrent description request per pin. Each failure only affects its own pin;
    /// all outcomes are committed together once every request has resolved.
    pub async fn generate_all_descriptions(&self, state: &StateHolder) {
        let snapshot = state.snapshot().await;
        let Some((ticket, pins)) = state.mark_all_descriptions_loading().await else {
            return;
        };

        log::info!("Generating {} descriptions with {}", pins.len(), snapshot.provider);
        let provider = snapshot.provider;
        let api_key = snapshot.api_key.as_str();
        let requests = pins.iter().map(move |pin| async move {
            self.describe(provider, api_key, pin)
                .await
                .map_err(|e| {
                    log::warn!("Failed to generate description for pin {}: {}", pin.id, e);
                    e.to_string()
                })
        });
        let outcomes = join_all(requests).await;
        state.apply_descriptions(ticket, outcomes).await;
    }
}

/// The message shown to the user. Falls back to a generic one when the error carries none.
pub fn error_message(error: &GenerateError) -> String {
    let message = error.to_string();
    if message.trim().is_empty() {
        GENERATION_FALLBACK_ERROR.to_string()
    } else {
        message
    }
}
