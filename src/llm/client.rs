//! Generation client with bounded retry

use super::CompletionTransport;
use crate::error::{Error, Result};
use std::sync::Arc;

/// One initial attempt plus one retry
pub const DEFAULT_MAX_ATTEMPTS: u32 = 2;

/// Generates text through a [`CompletionTransport`], retrying a fixed number of times
#[derive(Clone)]
pub struct GenerationClient {
    transport: Arc<dyn CompletionTransport>,
    max_attempts: u32,
}

impl GenerationClient {
    pub fn new(transport: Arc<dyn CompletionTransport>) -> Self {
        Self::with_max_attempts(transport, DEFAULT_MAX_ATTEMPTS)
    }

    /// A value of 0 is treated as 1.
    pub fn with_max_attempts(transport: Arc<dyn CompletionTransport>, max_attempts: u32) -> Self {
        Self {
            transport,
            max_attempts: max_attempts.max(1),
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Submit `prompt`, retrying the whole call on failure up to `max_attempts` in total.
    ///
    /// When every attempt fails the last failure is returned inside
    /// [`Error::Generation`].
    pub async fn generate(&self, prompt: &str) -> Result<String> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.transport.complete(prompt).await {
                Ok(text) => {
                    tracing::debug!(attempt, chars = text.len(), "generation succeeded");
                    return Ok(text);
                }
                Err(e) if attempt < self.max_attempts => {
                    tracing::warn!(attempt, error = %e, "generation attempt failed, retrying");
                }
                Err(e) => {
                    tracing::warn!(attempt, error = %e, "generation attempt failed, giving up");
                    return Err(Error::Generation {
                        attempts: attempt,
                        source: Box::new(e),
                    });
                }
            }
        }
    }
}
