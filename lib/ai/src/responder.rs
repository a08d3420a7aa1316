//! Responder abstraction.
//!
//! A responder turns the user's text into an assistant reply. It is treated
//! as a black box: it may take arbitrarily long and it may fail.

use crate::error::ResponderError;
use async_trait::async_trait;
use rootcause::Report;
use std::sync::Arc;
use std::time::Duration;

/// Trait for reply generators.
#[async_trait]
pub trait Responder: Send + Sync {
    /// Generates a reply to `prompt`.
    ///
    /// # Errors
    ///
    /// Returns an error if no reply could be produced.
    async fn generate(&self, prompt: &str) -> Result<String, Report<ResponderError>>;

    /// Returns a short name for diagnostics.
    fn name(&self) -> &str;
}

#[async_trait]
impl<R: Responder + ?Sized> Responder for Arc<R> {
    async fn generate(&self, prompt: &str) -> Result<String, Report<ResponderError>> {
        (**self).generate(prompt).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// Runs `responder.generate(prompt)`, failing if it takes longer than `limit`.
///
/// # Errors
///
/// Returns the responder's own error, or [`ResponderError::Timeout`].
pub async fn generate_with_timeout<R: Responder + ?Sized>(
    responder: &R,
    prompt: &str,
    limit: Duration,
) -> Result<String, Report<ResponderError>> {
    match tokio::time::timeout(limit, responder.generate(prompt)).await {
        Ok(result) => result,
        Err(_) => Err(ResponderError::Timeout {
            after_ms: u64::try_from(limit.as_millis()).unwrap_or(u64::MAX),
        }
        .into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Echo;

    #[async_trait]
    impl Responder for Echo {
        async fn generate(&self, prompt: &str) -> Result<String, Report<ResponderError>> {
            Ok(format!("echo: {prompt}"))
        }

        fn name(&self) -> &str {
            "echo"
        }
    }

    struct Stalled;

    #[async_trait]
    impl Responder for Stalled {
        async fn generate(&self, _prompt: &str) -> Result<String, Report<ResponderError>> {
            std::future::pending::<()>().await;
            Err(ResponderError::RequestFailed {
                reason: "unreachable".to_string(),
            }
            .into())
        }

        fn name(&self) -> &str {
            "stalled"
        }
    }

    #[tokio::test]
    async fn arc_responder_delegates() {
        let responder: Arc<dyn Responder> = Arc::new(Echo);
        assert_eq!(responder.generate("hi").await.unwrap(), "echo: hi");
        assert_eq!(responder.name(), "echo");
    }

    #[tokio::test]
    async fn timeout_passes_through_fast_replies() {
        let reply = generate_with_timeout(&Echo, "ping", Duration::from_secs(1))
            .await
            .unwrap();
        assert_eq!(reply, "echo: ping");
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_fails_stalled_replies() {
        let result = generate_with_timeout(&Stalled, "ping", Duration::from_millis(500)).await;
        let err = result.unwrap_err();
        assert!(err.to_string().contains("no reply after 500ms"));
    }
}
