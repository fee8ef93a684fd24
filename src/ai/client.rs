use std::sync::Arc;
use std::time::Duration;

use super::TextGenerator;
use crate::error::GenerationError;

/// Single entry point to the generation backend.
///
/// Each call hits the backend at most once: no retries, no caching. A
/// timeout, a transport error or a blank answer all become
/// [`GenerationError`]; callers never see partial text.
#[derive(Clone)]
pub struct GenerationClient {
    backend: Arc<dyn TextGenerator>,
    timeout: Duration,
}

impl GenerationClient {
    pub fn new(backend: Arc<dyn TextGenerator>, timeout: Duration) -> Self {
        Self { backend, timeout }
    }

    pub async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        let text = tokio::time::timeout(self.timeout, self.backend.generate(prompt))
            .await
            .map_err(|_| {
                GenerationError::new(format!(
                    "{} did not answer within {}s",
                    self.backend.provider(),
                    self.timeout.as_secs()
                ))
            })??;

        if text.trim().is_empty() {
            return Err(GenerationError::new(format!(
                "{} returned an empty response",
                self.backend.provider()
            )));
        }
        Ok(text)
    }

    pub fn provider(&self) -> &'static str {
        self.backend.provider()
    }

    pub fn model(&self) -> &str {
        self.backend.model()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Echo {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl TextGenerator for Echo {
        async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(format!("notes for: {}", prompt))
        }
        fn provider(&self) -> &'static str {
            "Echo"
        }
        fn model(&self) -> &str {
            "echo-1"
        }
    }

    struct Blank;

    #[async_trait]
    impl TextGenerator for Blank {
        async fn generate(&self, _prompt: &str) -> Result<String, GenerationError> {
            Ok("   \n".to_string())
        }
        fn provider(&self) -> &'static str {
            "Blank"
        }
        fn model(&self) -> &str {
            "blank"
        }
    }

    struct Slow;

    #[async_trait]
    impl TextGenerator for Slow {
        async fn generate(&self, _prompt: &str) -> Result<String, GenerationError> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok("late".to_string())
        }
        fn provider(&self) -> &'static str {
            "Slow"
        }
        fn model(&self) -> &str {
            "slow"
        }
    }

    #[tokio::test]
    async fn identical_prompts_give_identical_output_with_one_call_each() {
        let backend = Arc::new(Echo {
            calls: AtomicUsize::new(0),
        });
        let client = GenerationClient::new(backend.clone(), Duration::from_secs(1));

        let first = client.generate("cells").await.unwrap();
        let second = client.generate("cells").await.unwrap();

        assert_eq!(first, second);
        assert_eq!(backend.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn blank_answer_is_a_failure() {
        let client = GenerationClient::new(Arc::new(Blank), Duration::from_secs(1));
        let err = client.generate("x").await.unwrap_err();
        assert!(err.cause.contains("empty"));
    }

    #[tokio::test]
    async fn slow_backend_times_out() {
        let client = GenerationClient::new(Arc::new(Slow), Duration::from_millis(20));
        let err = client.generate("x").await.unwrap_err();
        assert!(err.cause.contains("did not answer"));
    }
}
