use crate::models::Provider;
use crate::normalize::{FallbackPolicy, NormalizeRules};
use anyhow::{Context, Result};

// --- Environment ---

const ENV_MODE: &str = "PINGENIE_ENV";
const ENV_STRICT: &str = "PINGENIE_STRICT_NORMALIZATION";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum RunMode {
    #[default]
    Development,
    Production,
}

impl RunMode {
    pub fn parse(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "production" | "prod" => Ok(RunMode::Production),
            "development" | "dev" | "" => Ok(RunMode::Development),
            other => Err(anyhow::anyhow!(
                "Unsupported {} value '{}', expected 'production' or 'development'",
                ENV_MODE,
                other
            )),
        }
    }

    pub fn default_log_filter(&self) -> &'static str {
        match self {
            RunMode::Production => "info",
            RunMode::Development => "debug",
        }
    }
}

// --- Provider endpoints ---

/// Where and how one provider is called.
#[derive(Clone, Debug, PartialEq)]
pub struct EndpointSettings {
    pub base_url: String,
    pub model: String,
    pub concepts_temperature: Option<f64>,
    pub description_temperature: Option<f64>,
    pub rules: NormalizeRules,
}

impl EndpointSettings {
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ProviderSettings {
    pub gemini: EndpointSettings,
    pub openai: EndpointSettings,
    pub groq: EndpointSettings,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            gemini: EndpointSettings {
                base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
                model: "gemini-3-flash-preview".to_string(),
                concepts_temperature: None,
                description_temperature: None,
                // Gemini answers against a response schema, only a bare array is accepted
                rules: NormalizeRules { keys: &[], fallback: FallbackPolicy::FailLoud },
            },
            openai: EndpointSettings {
                base_url: "https://api.openai.com/v1".to_string(),
                model: "gpt-4o".to_string(),
                concepts_temperature: None,
                description_temperature: None,
                rules: NormalizeRules {
                    keys: &["prompts", "pins"],
                    fallback: FallbackPolicy::WrapSingle,
                },
            },
            groq: EndpointSettings {
                base_url: "https://api.groq.com/openai/v1".to_string(),
                model: "llama-3.3-70b-versatile".to_string(),
                concepts_temperature: Some(0.5),
                description_temperature: Some(0.7),
                rules: NormalizeRules {
                    keys: &["pins", "prompts"],
                    fallback: FallbackPolicy::FailLoud,
                },
            },
        }
    }
}

impl ProviderSettings {
    pub fn get(&self, provider: Provider) -> &EndpointSettings {
        match provider {
            Provider::Gemini => &self.gemini,
            Provider::OpenAI => &self.openai,
            Provider::Groq => &self.groq,
        }
    }

    pub fn get_mut(&mut self, provider: Provider) -> &mut EndpointSettings {
        match provider {
            Provider::Gemini => &mut self.gemini,
            Provider::OpenAI => &mut self.openai,
            Provider::Groq => &mut self.groq,
        }
    }

    /// Every provider refuses payloads without an array.
    pub fn strict(mut self) -> Self {
        for provider in Provider::ALL {
            let endpoint = self.get_mut(provider);
            endpoint.rules = endpoint.rules.clone().strict();
        }
        self
    }
}

// --- Application config ---

#[derive(Clone, Debug, Default, PartialEq)]
pub struct AppConfig {
    pub mode: RunMode,
    pub strict_normalization: bool,
    pub providers: ProviderSettings,
}

impl AppConfig {
    /// Reads `PINGENIE_ENV` and `PINGENIE_STRICT_NORMALIZATION`.
    /// API keys are never taken from the environment.
    pub fn from_env() -> Result<Self> {
        let mode = match std::env::var(ENV_MODE) {
            Ok(value) => RunMode::parse(&value)
                .with_context(|| format!("Failed to read run mode from {}", ENV_MODE))?,
            Err(_) => RunMode::default(),
        };
        let strict_normalization = match std::env::var(ENV_STRICT) {
            Ok(value) => parse_bool(&value)
                .with_context(|| format!("Failed to read {} as a boolean", ENV_STRICT))?,
            Err(_) => false,
        };
        Ok(Self::new(mode, strict_normalization))
    }

    pub fn new(mode: RunMode, strict_normalization: bool) -> Self {
        let providers = if strict_normalization {
            ProviderSettings::default().strict()
        } else {
            ProviderSettings::default()
        };
        Self { mode, strict_normalization, providers }
    }
}

fn parse_bool(value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => Err(anyhow::anyhow!("'{}' is not a boolean", other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_mode_parsing() {
        assert_eq!(RunMode::parse("production").unwrap(), RunMode::Production);
        assert_eq!(RunMode::parse(" Dev ").unwrap(), RunMode::Development);
        assert!(RunMode::parse("staging").is_err());
        assert_eq!(RunMode::Production.default_log_filter(), "info");
    }

    #[test]
    fn defaults_keep_provider_asymmetry() {
        let config = AppConfig::new(RunMode::Development, false);
        assert_eq!(config.providers.openai.rules.fallback, FallbackPolicy::WrapSingle);
        assert_eq!(config.providers.groq.rules.fallback, FallbackPolicy::FailLoud);
        assert_eq!(config.providers.groq.concepts_temperature, Some(0.5));
    }

    #[test]
    fn strict_normalization_applies_everywhere() {
        let config = AppConfig::new(RunMode::Production, true);
        for provider in Provider::ALL {
            assert_eq!(config.providers.get(provider).rules.fallback, FallbackPolicy::FailLoud);
        }
        // key order is untouched
        assert_eq!(config.providers.openai.rules.keys, &["prompts", "pins"]);
    }

    #[test]
    fn bool_parsing() {
        assert!(parse_bool("TRUE").unwrap());
        assert!(!parse_bool("off").unwrap());
        assert!(parse_bool("maybe").is_err());
    }
}
