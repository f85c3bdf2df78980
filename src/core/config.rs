use std::env;
use std::fmt;

use url::Url;

use crate::errors::StageError;

/// Model used when the operator leaves the setting unset.
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

/// Production chat-completion endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";

/// API key for the text generation service.
///
/// The key redacts itself from `Debug` output and deliberately has no
/// `Display` and no serde impls, so it cannot reach logs, error messages,
/// or serialized payloads other than the Authorization header.
#[derive(Clone)]
pub struct ApiKey(String);

impl ApiKey {
    fn new(key: String) -> Self {
        Self(key)
    }

    /// The raw key. Only the transport should call this, to build the
    /// `Authorization` header.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

/// Raw operator-facing settings, prior to validation.
///
/// Two settings are required by the stage: `api_key` (sensitive) and `model`
/// (defaulted when unset). `api_base` redirects the transport to another
/// host, e.g. a test server; unset means the production endpoint.
#[derive(Debug, Clone, Default)]
pub struct StageSettings {
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub api_base: Option<String>,
}

impl StageSettings {
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            api_key: env::var("OPENAI_API_KEY").ok(),
            model: env::var("OPENAI_MODEL").ok(),
            api_base: env::var("OPENAI_API_BASE").ok(),
        }
    }
}

/// Validated, immutable configuration.
///
/// Built once at activation and shared read-only across concurrent record
/// invocations.
#[derive(Debug, Clone)]
pub struct StageConfig {
    api_key: ApiKey,
    model: String,
    endpoint: Url,
}

impl StageConfig {
    /// Validates raw settings into an active configuration.
    ///
    /// # Errors
    ///
    /// Returns `StageError::Config` when the API key is missing or empty,
    /// when the model is set but empty, or when the endpoint derived from
    /// `api_base` does not parse as a URL. The key value itself is never
    /// included in the message.
    pub fn activate(settings: StageSettings) -> Result<Self, StageError> {
        let api_key = settings
            .api_key
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                StageError::Config("api_key is required and must be non-empty".to_string())
            })?;

        let model = match settings.model {
            None => DEFAULT_MODEL.to_string(),
            Some(model) if model.trim().is_empty() => {
                return Err(StageError::Config("model must be non-empty".to_string()));
            }
            Some(model) => model,
        };

        let endpoint = match settings.api_base {
            Some(base) => format!("{}/v1/chat/completions", base.trim_end_matches('/')),
            None => DEFAULT_ENDPOINT.to_string(),
        };
        let endpoint = Url::parse(&endpoint)
            .map_err(|e| StageError::Config(format!("api_base is not a valid URL: {e}")))?;

        Ok(Self {
            api_key: ApiKey::new(api_key),
            model,
            endpoint,
        })
    }

    #[must_use]
    pub fn api_key(&self) -> &ApiKey {
        &self.api_key
    }

    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    #[must_use]
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}
