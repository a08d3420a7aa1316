//! A stand-in responder that answers from a fixed set of replies.

use crate::error::ResponderError;
use crate::responder::Responder;
use async_trait::async_trait;
use rootcause::Report;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tracing::debug;

const REPLIES: &[&str] = &[
    "I understand what you're saying. Can you tell me more?",
    "That's an interesting perspective. Let me think about that.",
    "Based on our previous conversations, I think we should explore this further.",
    "I remember you mentioned something similar before. Let's build on that idea.",
    "Thanks for sharing that with me. I've noted it for future reference.",
    "I'm here to help you with any questions or tasks you have.",
    "Let me analyze that information and provide you with a thoughtful response.",
    "I appreciate your patience as I process this information.",
    "That's a great question. Let me provide a comprehensive answer.",
    "I'm learning from our conversation and adapting to better assist you.",
];

/// Configuration for [`CannedResponder`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CannedResponderConfig {
    /// Simulated latency before each reply, in milliseconds.
    #[serde(default = "default_latency_ms")]
    pub latency_ms: u64,
}

fn default_latency_ms() -> u64 {
    1000
}

impl Default for CannedResponderConfig {
    fn default() -> Self {
        Self {
            latency_ms: default_latency_ms(),
        }
    }
}

/// Replies with canned acknowledgements after a fixed delay, in rotation.
#[derive(Debug)]
pub struct CannedResponder {
    latency: Duration,
    next: AtomicUsize,
}

impl CannedResponder {
    /// Creates a responder from configuration.
    #[must_use]
    pub fn new(config: &CannedResponderConfig) -> Self {
        Self {
            latency: Duration::from_millis(config.latency_ms),
            next: AtomicUsize::new(0),
        }
    }
}

impl Default for CannedResponder {
    fn default() -> Self {
        Self::new(&CannedResponderConfig::default())
    }
}

#[async_trait]
impl Responder for CannedResponder {
    async fn generate(&self, prompt: &str) -> Result<String, Report<ResponderError>> {
        tokio::time::sleep(self.latency).await;
        let index = self.next.fetch_add(1, Ordering::Relaxed) % REPLIES.len();
        debug!(prompt_chars = prompt.chars().count(), index, "canned reply");
        Ok(REPLIES[index].to_string())
    }

    fn name(&self) -> &str {
        "canned"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults() {
        let config: CannedResponderConfig = serde_json::from_str("{}").expect("deserialize");
        assert_eq!(config, CannedResponderConfig::default());
        assert_eq!(config.latency_ms, 1000);
    }

    #[tokio::test(start_paused = true)]
    async fn replies_rotate() {
        let responder = CannedResponder::default();

        let first = responder.generate("one").await.unwrap();
        let second = responder.generate("two").await.unwrap();

        assert_eq!(first, REPLIES[0]);
        assert_eq!(second, REPLIES[1]);
    }

    #[tokio::test(start_paused = true)]
    async fn reply_waits_for_latency() {
        let responder = CannedResponder::new(&CannedResponderConfig { latency_ms: 250 });
        let started = tokio::time::Instant::now();

        responder.generate("hello").await.unwrap();

        assert!(started.elapsed() >= Duration::from_millis(250));
    }
}
