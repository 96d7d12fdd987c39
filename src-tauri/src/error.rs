use crate::models::Provider;
use thiserror::Error;

/// Failures raised by a provider adapter. Each one ends the operation that raised it.
#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("API Key is required")]
    MissingApiKey,

    // The provider's own `error.message` when it sent one, else "<Provider> Error: <status>".
    #[error("{message}")]
    Http {
        provider: Provider,
        status: u16,
        message: String,
    },

    #[error("{provider} request failed: {source}")]
    Transport {
        provider: Provider,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to parse {provider} response as JSON: {detail}")]
    Parse { provider: Provider, detail: String },

    #[error("Empty response from {0}")]
    EmptyResponse(Provider),

    #[error("Invalid response structure from {0}")]
    InvalidStructure(Provider),

    #[error("Invalid Provider: {0} is not configured")]
    UnsupportedProvider(Provider),
}

/// Errors surfaced by the orchestrator's `generate`.
#[derive(Debug, Error)]
pub enum GenerateError {
    // Caller-side input checks, raised before any network call.
    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Adapter(#[from] AdapterError),
}
