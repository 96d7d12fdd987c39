use crate::config::{EndpointSettings, ProviderSettings};
use crate::error::AdapterError;
use crate::models::{assign_missing_ids, GeneratedPrompt, Provider};
use crate::normalize::normalize;
use crate::prompts::{concepts_prompt, description_prompt, GROQ_SYSTEM_SUFFIX, SYSTEM_PROMPT};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;

// Trait defining the interface for pin generation backends
#[async_trait]
pub trait PinApiProvider: Send + Sync {
    fn provider(&self) -> Provider;

    // Returns the normalized pin list for one blog post.
    async fn generate_concepts(
        &self,
        api_key: &str,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<Vec<GeneratedPrompt>, AdapterError>;

    // Returns the plain description text, empty when the provider sent none.
    async fn generate_description(&self, api_key: &str, prompt: &str) -> Result<String, AdapterError>;
}

/// Trims the key and rejects it when nothing is left. Runs before any request is built.
pub fn require_key(api_key: &str) -> Result<&str, AdapterError> {
    let key = api_key.trim();
    if key.is_empty() {
        return Err(AdapterError::MissingApiKey);
    }
    Ok(key)
}

// --- Shared response handling ---

/// Message for a non-2xx response: the body's `error.message` if present, else a generic one.
pub fn http_error_message(provider: Provider, status: StatusCode, body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.pointer("/error/message").and_then(Value::as_str).map(str::to_string))
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| format!("{} Error: {}", provider, status))
}

async fn read_json(provider: Provider, response: reqwest::Response) -> Result<Value, AdapterError> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|source| AdapterError::Transport { provider, source })?;

    if !status.is_success() {
        let message = http_error_message(provider, status, &body);
        log::error!("{} request failed with status {}: {}", provider, status, message);
        return Err(AdapterError::Http { provider, status: status.as_u16(), message });
    }

    serde_json::from_str(&body).map_err(|e| AdapterError::Parse { provider, detail: e.to_string() })
}

/// Runs the shape chain and turns each entry into a pin.
pub fn prompts_from_json(
    provider: Provider,
    parsed: Value,
    settings: &EndpointSettings,
) -> Result<Vec<GeneratedPrompt>, AdapterError> {
    let items = normalize(parsed, &settings.rules).ok_or(AdapterError::InvalidStructure(provider))?;

    let mut prompts = items
        .into_iter()
        .map(serde_json::from_value::<GeneratedPrompt>)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| AdapterError::Parse { provider, detail: e.to_string() })?;

    // Loading flags and descriptions are ours, never the model's.
    for prompt in prompts.iter_mut() {
        prompt.description = None;
        prompt.is_description_loading = false;
    }
    assign_missing_ids(&mut prompts);
    Ok(prompts)
}

fn parse_content(provider: Provider, content: &str) -> Result<Value, AdapterError> {
    serde_json::from_str(content).map_err(|e| AdapterError::Parse { provider, detail: e.to_string() })
}

// --- Gemini ---

// Gemini `generateContent` response text: every non-thought part of the first candidate.
pub fn gemini_text(body: &Value) -> Option<String> {
    let parts = body.pointer("/candidates/0/content/parts")?.as_array()?;
    let text: String = parts
        .iter()
        .filter(|p| !p.get("thought").and_then(Value::as_bool).unwrap_or(false))
        .filter_map(|p| p.get("text").and_then(Value::as_str))
        .collect();
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

fn gemini_response_schema() -> Value {
    json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": {
                "id": { "type": "INTEGER" },
                "overlayText": { "type": "STRING" },
                "seoTitle": { "type": "STRING" },
                "tags": { "type": "ARRAY", "items": { "type": "STRING" } },
                "visualStyle": { "type": "STRING" },
                "textColor": { "type": "STRING" },
                "fontStyle": { "type": "STRING" }
            },
            "required": ["id", "overlayText", "seoTitle", "tags", "visualStyle", "textColor", "fontStyle"]
        }
    })
}

// Schema-constrained JSON output for concepts.
fn gemini_concepts_body(system_prompt: &str, user_prompt: &str) -> Value {
    json!({
        "contents": [{ "role": "user", "parts": [{ "text": user_prompt }] }],
        "systemInstruction": { "parts": [{ "text": system_prompt }] },
        "generationConfig": {
            "responseMimeType": "application/json",
            "responseSchema": gemini_response_schema(),
        }
    })
}

fn gemini_description_body(prompt: &str) -> Value {
    json!({
        "contents": [{ "role": "user", "parts": [{ "text": prompt }] }],
    })
}

pub struct GeminiProvider {
    client: Client,
    settings: EndpointSettings,
}

impl GeminiProvider {
    pub fn new(client: Client, settings: EndpointSettings) -> Self {
        Self { client, settings }
    }

    fn request_url(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.settings.base_url.trim_end_matches('/'),
            self.settings.model
        )
    }

    async fn send(&self, api_key: &str, body: &Value) -> Result<Value, AdapterError> {
        let url = self.request_url();
        log::info!("Sending request to Gemini using model: {}", self.settings.model);
        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(body)
            .send()
            .await
            .map_err(|source| AdapterError::Transport { provider: Provider::Gemini, source })?;
        read_json(Provider::Gemini, response).await
    }
}

#[async_trait]
impl PinApiProvider for GeminiProvider {
    fn provider(&self) -> Provider {
        Provider::Gemini
    }

    async fn generate_concepts(
        &self,
        api_key: &str,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<Vec<GeneratedPrompt>, AdapterError> {
        let api_key = require_key(api_key)?;
        let body = gemini_concepts_body(system_prompt, user_prompt);
        let response = self.send(api_key, &body).await?;
        let text = gemini_text(&response).ok_or(AdapterError::EmptyResponse(Provider::Gemini))?;
        let parsed = parse_content(Provider::Gemini, &text)?;
        prompts_from_json(Provider::Gemini, parsed, &self.settings)
    }

    async fn generate_description(&self, api_key: &str, prompt: &str) -> Result<String, AdapterError> {
        let api_key = require_key(api_key)?;
        let response = self.send(api_key, &gemini_description_body(prompt)).await?;
        Ok(gemini_text(&response).unwrap_or_default())
    }
}

// --- OpenAI Compatible Provider Implementation (OpenAI, Groq) ---

#[derive(Serialize, Debug)]
struct ChatRequestBody<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
}

#[derive(Serialize, Debug)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize, Debug)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

// `choices[0].message.content`, the only field either provider's answer is read from.
pub fn chat_content(body: &Value) -> Option<String> {
    body.pointer("/choices/0/message/content")
        .and_then(Value::as_str)
        .map(str::to_string)
}

pub struct OpenAICompatibleProvider {
    client: Client,
    provider: Provider,
    settings: EndpointSettings,
    system_suffix: &'static str,
}

impl OpenAICompatibleProvider {
    pub fn openai(client: Client, settings: EndpointSettings) -> Self {
        Self { client, provider: Provider::OpenAI, settings, system_suffix: "" }
    }

    pub fn groq(client: Client, settings: EndpointSettings) -> Self {
        Self { client, provider: Provider::Groq, settings, system_suffix: GROQ_SYSTEM_SUFFIX }
    }

    // System + user messages in JSON mode.
    fn concepts_body<'a>(&'a self, system: &'a str, user: &'a str) -> ChatRequestBody<'a> {
        ChatRequestBody {
            model: &self.settings.model,
            messages: vec![
                ChatMessage { role: "system", content: system },
                ChatMessage { role: "user", content: user },
            ],
            response_format: Some(ResponseFormat { kind: "json_object" }),
            temperature: self.settings.concepts_temperature,
        }
    }

    // A single user message, plain text back.
    fn description_body<'a>(&'a self, prompt: &'a str) -> ChatRequestBody<'a> {
        ChatRequestBody {
            model: &self.settings.model,
            messages: vec![ChatMessage { role: "user", content: prompt }],
            response_format: None,
            temperature: self.settings.description_temperature,
        }
    }

    async fn send(&self, api_key: &str, body: &ChatRequestBody<'_>) -> Result<Value, AdapterError> {
        let request_url = format!("{}/chat/completions", self.settings.base_url.trim_end_matches('/'));
        log::info!(
            "Sending request to {} compatible API: {} using model: {}",
            self.provider,
            request_url,
            self.settings.model
        );
        let response = self
            .client
            .post(&request_url)
            .bearer_auth(api_key)
            .json(body)
            .send()
            .await
            .map_err(|source| AdapterError::Transport { provider: self.provider, source })?;
        read_json(self.provider, response).await
    }
}

#[async_trait]
impl PinApiProvider for OpenAICompatibleProvider {
    fn provider(&self) -> Provider {
        self.provider
    }

    async fn generate_concepts(
        &self,
        api_key: &str,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<Vec<GeneratedPrompt>, AdapterError> {
        let api_key = require_key(api_key)?;
        let system = format!("{}{}", system_prompt, self.system_suffix);
        let body = self.concepts_body(&system, user_prompt);
        let response = self.send(api_key, &body).await?;
        let content = chat_content(&response)
            .filter(|c| !c.trim().is_empty())
            .ok_or(AdapterError::EmptyResponse(self.provider))?;
        let parsed = parse_content(self.provider, &content)?;
        prompts_from_json(self.provider, parsed, &self.settings)
    }

    async fn generate_description(&self, api_key: &str, prompt: &str) -> Result<String, AdapterError> {
        let api_key = require_key(api_key)?;
        let response = self.send(api_key, &self.description_body(prompt)).await?;
        Ok(chat_content(&response).unwrap_or_default())
    }
}

// --- Dispatch ---

/// Maps each [`Provider`] to its adapter and fills in the prompt templates.
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    adapters: HashMap<Provider, Arc<dyn PinApiProvider>>,
}

impl ProviderRegistry {
    /// The three HTTP adapters sharing one connection pool.
    pub fn from_settings(settings: &ProviderSettings) -> Self {
        let client = Client::new();
        Self::default()
            .with_adapter(Arc::new(GeminiProvider::new(client.clone(), settings.gemini.clone())))
            .with_adapter(Arc::new(OpenAICompatibleProvider::openai(client.clone(), settings.openai.clone())))
            .with_adapter(Arc::new(OpenAICompatibleProvider::groq(client, settings.groq.clone())))
    }

    pub fn with_adapter(mut self, adapter: Arc<dyn PinApiProvider>) -> Self {
        self.adapters.insert(adapter.provider(), adapter);
        self
    }

    fn adapter(&self, provider: Provider) -> Result<&Arc<dyn PinApiProvider>, AdapterError> {
        self.adapters.get(&provider).ok_or(AdapterError::UnsupportedProvider(provider))
    }

    pub async fn generate_concepts(
        &self,
        provider: Provider,
        api_key: &str,
        title: &str,
        content: &str,
    ) -> Result<Vec<GeneratedPrompt>, AdapterError> {
        let api_key = require_key(api_key)?;
        let user_prompt = concepts_prompt(title, content);
        self.adapter(provider)?
            .generate_concepts(api_key, SYSTEM_PROMPT, &user_prompt)
            .await
    }

    pub async fn generate_description(
        &self,
        provider: Provider,
        api_key: &str,
        title: &str,
        visual_style: &str,
    ) -> Result<String, AdapterError> {
        let api_key = require_key(api_key)?;
        let prompt = description_prompt(title, visual_style);
        self.adapter(provider)?.generate_description(api_key, &prompt).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_keys_are_rejected() {
        assert!(matches!(require_key("   "), Err(AdapterError::MissingApiKey)));
        assert_eq!(require_key("  sk-1 ").unwrap(), "sk-1");
    }

    #[test]
    fn http_error_prefers_provider_message() {
        let body = r#"{"error": {"message": "Incorrect API key provided", "type": "invalid_request_error"}}"#;
        assert_eq!(
            http_error_message(Provider::OpenAI, StatusCode::UNAUTHORIZED, body),
            "Incorrect API key provided"
        );
        assert_eq!(
            http_error_message(Provider::Groq, StatusCode::INTERNAL_SERVER_ERROR, "<html>"),
            "Groq Error: 500 Internal Server Error"
        );
        assert_eq!(
            http_error_message(Provider::Gemini, StatusCode::FORBIDDEN, r#"{"error": {}}"#),
            "Gemini Error: 403 Forbidden"
        );
    }

    #[test]
    fn gemini_text_joins_parts_and_skips_thoughts() {
        let body = json!({
            "candidates": [{ "content": { "parts": [
                { "text": "thinking...", "thought": true },
                { "text": "[{\"id\":1," },
                { "text": "\"overlayText\":\"x\"}]" }
            ]}}]
        });
        assert_eq!(gemini_text(&body).unwrap(), r#"[{"id":1,"overlayText":"x"}]"#);
        assert_eq!(gemini_text(&json!({ "candidates": [] })), None);
    }

    #[test]
    fn chat_content_reads_first_choice() {
        let body = json!({ "choices": [{ "message": { "role": "assistant", "content": "Hi" } }] });
        assert_eq!(chat_content(&body).as_deref(), Some("Hi"));
        assert_eq!(chat_content(&json!({ "choices": [] })), None);
    }

    #[test]
    fn prompts_from_json_resets_client_side_fields() {
        let settings = ProviderSettings::default().openai;
        let parsed = json!({ "pins": [
            { "overlayText": "a", "description": "model wrote this", "isDescriptionLoading": true },
            { "id": 5, "overlayText": "b", "tags": ["#x"] }
        ]});
        let prompts = prompts_from_json(Provider::OpenAI, parsed, &settings).unwrap();
        assert_eq!(prompts.len(), 2);
        assert_eq!(prompts[0].id, 1);
        assert_eq!(prompts[0].description, None);
        assert!(!prompts[0].is_description_loading);
        assert_eq!(prompts[1].id, 5);
        assert_eq!(prompts[1].tags, vec!["#x".to_string()]);
    }

    #[test]
    fn prompts_from_json_accepts_loose_pin_fields() {
        let settings = ProviderSettings::default().openai;
        let parsed = json!({ "pins": [
            { "id": "1", "overlayText": "a", "textColor": null },
            { "id": null, "overlayText": "b", "tags": null }
        ]});
        let prompts = prompts_from_json(Provider::OpenAI, parsed, &settings).unwrap();
        assert_eq!(prompts.len(), 2);
        assert_eq!(prompts[0].id, 1);
        assert_eq!(prompts[0].text_color, "");
        assert_eq!(prompts[1].id, 2);
        assert!(prompts[1].tags.is_empty());
    }

    #[test]
    fn prompts_from_json_rejects_non_objects() {
        let settings = ProviderSettings::default().groq;
        let err = prompts_from_json(Provider::Groq, json!({ "pins": ["just text"] }), &settings).unwrap_err();
        assert!(matches!(err, AdapterError::Parse { provider: Provider::Groq, .. }));
    }

    #[test]
    fn chat_bodies_only_carry_configured_options() {
        let settings = ProviderSettings::default();
        let openai = OpenAICompatibleProvider::openai(Client::new(), settings.openai);
        let body = serde_json::to_value(openai.concepts_body("sys", "user")).unwrap();
        assert_eq!(body["response_format"]["type"], "json_object");
        assert!(body.get("temperature").is_none());

        let body = serde_json::to_value(openai.description_body("describe")).unwrap();
        assert!(body.get("response_format").is_none());
        assert_eq!(body["messages"].as_array().unwrap().len(), 1);

        let groq = OpenAICompatibleProvider::groq(Client::new(), settings.groq);
        let body = serde_json::to_value(groq.concepts_body("sys", "user")).unwrap();
        assert_eq!(body["temperature"], json!(0.5));
        let body = serde_json::to_value(groq.description_body("describe")).unwrap();
        assert_eq!(body["temperature"], json!(0.7));
    }

    #[test]
    fn gemini_description_body_has_no_schema() {
        let body = gemini_description_body("Pin Title: x");
        assert!(body.get("generationConfig").is_none());
        assert!(body.get("systemInstruction").is_none());

        let body = gemini_concepts_body("sys", "user");
        assert_eq!(body["generationConfig"]["responseSchema"]["type"], "ARRAY");
    }
}
