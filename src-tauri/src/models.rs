use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

// The AI backend selected in the UI. Serialized the way the frontend sends it ("GEMINI", ...).
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum Provider {
    #[default]
    Gemini,
    OpenAI,
    Groq,
}

impl Provider {
    pub const ALL: [Provider; 3] = [Provider::Gemini, Provider::OpenAI, Provider::Groq];

    /// Human readable name, used in error messages ("OpenAI Error: 401 ...").
    pub fn display_name(&self) -> &'static str {
        match self {
            Provider::Gemini => "Gemini",
            Provider::OpenAI => "OpenAI",
            Provider::Groq => "Groq",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

// Input for a single concept generation call. Built fresh per call, never stored.
#[derive(Clone)]
pub struct GenerationRequest {
    pub provider: Provider,
    pub api_key: String,
    pub title: String,
    pub content: String,
}

// Keep the key out of Debug output so it can't end up in a log line.
impl fmt::Debug for GenerationRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenerationRequest")
            .field("provider", &self.provider)
            .field("api_key", &"<redacted>")
            .field("title", &self.title)
            .field("content_len", &self.content.len())
            .finish()
    }
}

// A single generated pin concept.
// Chat-completion providers don't always follow the schema: missing keys and nulls
// fall back to defaults, and ids may arrive as strings.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedPrompt {
    #[serde(default, deserialize_with = "lenient_id")]
    pub id: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub overlay_text: String, // Text rendered on the image
    #[serde(default, deserialize_with = "null_as_default")]
    pub seo_title: String, // Long-tail title for search
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub visual_style: String, // Image generation prompt
    #[serde(default, deserialize_with = "null_as_default")]
    pub text_color: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub font_style: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_description_loading: bool,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// Accepts 3, 3.0, "3" and null. Anything unreadable becomes 0 and is renumbered later.
fn lenient_id<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let id = match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    };
    Ok(id.unwrap_or(0))
}

/// Fills in missing ids with the 1-based list position.
/// Updates address pins by index, so ids are informational only.
pub fn assign_missing_ids(prompts: &mut [GeneratedPrompt]) {
    for (index, prompt) in prompts.iter_mut().enumerate() {
        if prompt.id == 0 {
            prompt.id = index as i64 + 1;
        }
    }
}

// Everything the UI renders. Owned by the state holder, handed out as snapshots.
#[derive(Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct AppState {
    pub provider: Provider,
    #[serde(skip_serializing)]
    #[serde(default)]
    pub api_key: String,
    pub blog_title: String,
    pub blog_content: String,
    pub is_loading: bool,
    pub results: Vec<GeneratedPrompt>,
    pub error: Option<String>,
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState")
            .field("provider", &self.provider)
            .field("has_api_key", &!self.api_key.is_empty())
            .field("blog_title", &self.blog_title)
            .field("is_loading", &self.is_loading)
            .field("results", &self.results.len())
            .field("error", &self.error)
            .finish()
    }
}

#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum Phase {
    Idle,
    Loading,
    Ready,
    Error,
}

impl AppState {
    pub fn phase(&self) -> Phase {
        if self.is_loading {
            Phase::Loading
        } else if self.error.is_some() && self.results.is_empty() {
            Phase::Error
        } else if !self.results.is_empty() {
            Phase::Ready
        } else {
            Phase::Idle
        }
    }

    /// Mirrors the submit button: everything filled in and nothing in flight.
    pub fn can_generate(&self) -> bool {
        !self.is_loading
            && !self.api_key.trim().is_empty()
            && !self.blog_title.trim().is_empty()
            && !self.blog_content.trim().is_empty()
    }

    pub fn any_description_loading(&self) -> bool {
        self.results.iter().any(|p| p.is_description_loading)
    }
}
