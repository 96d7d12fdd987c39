#![allow(dead_code)]

use pingenie_lib::config::{EndpointSettings, ProviderSettings};
use reqwest::Client;

// Ignore any proxy configured in the environment, the mock server is on localhost
pub fn client() -> Client {
    Client::builder().no_proxy().build().expect("client")
}

pub fn settings() -> ProviderSettings {
    ProviderSettings::default()
}

pub fn at(endpoint: EndpointSettings, base_url: &str) -> EndpointSettings {
    endpoint.with_base_url(base_url)
}

/// A chat-completions success body whose message content is `content`.
pub fn chat_body(content: &str) -> String {
    serde_json::json!({
        "id": "chatcmpl-1",
        "object": "chat.completion",
        "choices": [{ "index": 0, "message": { "role": "assistant", "content": content }, "finish_reason": "stop" }]
    })
    .to_string()
}

/// A Gemini `generateContent` success body with a single text part.
pub fn gemini_body(text: &str) -> String {
    serde_json::json!({
        "candidates": [{ "content": { "role": "model", "parts": [{ "text": text }] }, "finishReason": "STOP" }]
    })
    .to_string()
}

pub fn pin_json(n: usize) -> serde_json::Value {
    serde_json::json!({
        "id": n,
        "overlayText": format!("{} Cozy Cabin Ideas", 10 + n),
        "seoTitle": format!("Cozy Cabin Ideas {} | Rustic Winter Decor", n),
        "tags": ["#cabin", "#winterdecor", "#rustic"],
        "visualStyle": "Log cabin at dusk, warm window light, snow, negative space in the upper third.",
        "textColor": "#FFF8E7",
        "fontStyle": "Playfair Display Bold"
    })
}
