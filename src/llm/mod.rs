//! Language model access
//!
//! [`CompletionTransport`] is the single capability the generator needs from a
//! model provider: submit a prompt, receive text, or fail. [`GenerationClient`]
//! adds the bounded retry on top of any transport.

mod client;
mod gemini;

pub use client::{GenerationClient, DEFAULT_MAX_ATTEMPTS};
pub use gemini::{GeminiTransport, GEMINI_API_BASE};

use crate::error::Result;
use async_trait::async_trait;

/// Environment variable holding the model API credential
pub const API_KEY_ENV: &str = "GOOGLE_API_KEY";

/// Submit a prompt to a text generation service
#[async_trait]
pub trait CompletionTransport: Send + Sync {
    /// Return the first textual content block of the model's response
    async fn complete(&self, prompt: &str) -> Result<String>;
}

/// Model endpoint configuration, passed explicitly to the transport
#[derive(Debug, Clone)]
pub struct GenerationConfig {
    /// API credential
    pub api_key: String,
    /// Model identifier (default: gemini-1.5-pro)
    pub model: String,
    /// Sampling temperature (default: 0.9)
    pub temperature: f32,
    /// Base URL of the models endpoint
    pub api_base: String,
    /// Total attempts per generation, including the first (default: 2)
    pub max_attempts: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: "gemini-1.5-pro".to_string(),
            temperature: 0.9,
            api_base: GEMINI_API_BASE.to_string(),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

impl GenerationConfig {
    /// Default configuration with the credential read from [`API_KEY_ENV`].
    ///
    /// A missing variable leaves the key empty; requests then fail at the
    /// endpoint and surface as generation errors.
    pub fn from_env() -> Self {
        let api_key = std::env::var(API_KEY_ENV).unwrap_or_default();
        if api_key.is_empty() {
            tracing::warn!("{} is not set; task generation will fail", API_KEY_ENV);
        }
        Self {
            api_key,
            ..Self::default()
        }
    }
}
