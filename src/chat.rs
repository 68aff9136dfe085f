use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::DataError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    Anthropic,
    Openai,
}

impl LlmProvider {
    pub fn api_key_var(&self) -> &'static str {
        match self {
            LlmProvider::Anthropic => "ANTHROPIC_API_KEY",
            LlmProvider::Openai => "OPENAI_API_KEY",
        }
    }
}

pub trait ChatResponder: Send + Sync {
    fn generate_response(
        &self,
        message: &str,
        context: Option<&Value>,
    ) -> Result<Option<String>, DataError>;

    fn extract_neighborhood(&self, message: &str) -> Result<Option<String>, DataError>;
}

#[derive(Debug, Clone)]
pub struct PlaceholderChat {
    provider: LlmProvider,
    api_key: Option<String>,
}

impl PlaceholderChat {
    pub fn new(provider: LlmProvider, api_key: Option<String>) -> Self {
        Self { provider, api_key }
    }

    pub fn from_lookup<F>(provider: LlmProvider, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup(provider.api_key_var()).filter(|value| !value.trim().is_empty());
        Self::new(provider, api_key)
    }

    pub fn provider(&self) -> LlmProvider {
        self.provider
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }
}

impl ChatResponder for PlaceholderChat {
    fn generate_response(
        &self,
        _message: &str,
        _context: Option<&Value>,
    ) -> Result<Option<String>, DataError> {
        debug!(provider = ?self.provider, "chat responder not implemented");
        Ok(None)
    }

    fn extract_neighborhood(&self, _message: &str) -> Result<Option<String>, DataError> {
        Ok(None)
    }
}
