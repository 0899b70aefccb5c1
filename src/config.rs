//! Gateway configuration.
//!
//! Built once at startup (from CLI flags and the environment, see `main.rs`) and handed to the
//! gateway, so nothing below this point reads process environment.

use secrecy::{ExposeSecret, SecretString};

use crate::constants;

/// Everything the gateway needs to call the generation API and the logging webhook.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Credential for the generation API. `None` degrades to the placeholder response.
    pub api_key: Option<SecretString>,
    /// Base URL of the OpenAI-compatible API, without a trailing `/chat/completions`.
    pub api_base: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    /// Spreadsheet webhook receiving one `LogEntry` per successful consultation.
    pub webhook_url: Option<String>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base: constants::DEFAULT_API_BASE.to_string(),
            model: constants::DEFAULT_MODEL.to_string(),
            temperature: constants::TEMPERATURE,
            max_tokens: constants::MAX_TOKENS,
            webhook_url: None,
        }
    }
}

impl GatewayConfig {
    /// Sets the credential, treating a blank value the same as an unset one.
    pub fn with_api_key(mut self, key: Option<String>) -> Self {
        self.api_key = key
            .filter(|k| !k.trim().is_empty())
            .map(SecretString::from);
        self
    }

    pub fn with_webhook_url(mut self, url: Option<String>) -> Self {
        self.webhook_url = url.filter(|u| !u.trim().is_empty());
        self
    }

    pub fn with_api_base(mut self, base: impl Into<String>) -> Self {
        self.api_base = base.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key
            .as_ref()
            .is_some_and(|k| !k.expose_secret().is_empty())
    }

    pub fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.api_base)
    }
}
