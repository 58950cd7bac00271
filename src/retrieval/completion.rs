//! Completion generation: turning retrieved context into an answer.

use crate::llm::LlmProvider;
use crate::models::{Completion, Context};
use crate::rendering::PromptStore;
use crate::{Error, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

/// Turns a retrieved context into a completion.
#[async_trait]
pub trait CompletionGenerator: Send + Sync {
    /// Generates a completion for `query` from `context`.
    ///
    /// `system_prompt_path` and `user_prompt_path` name the prompt templates
    /// to use; how they are resolved is up to the implementation.
    ///
    /// # Errors
    ///
    /// Returns an error if prompts cannot be loaded or generation fails.
    async fn generate(
        &self,
        query: &str,
        context: &Context,
        system_prompt_path: &str,
        user_prompt_path: &str,
    ) -> Result<Completion>;
}

/// Completion generator backed by an [`LlmProvider`].
///
/// The user prompt is rendered with `question` and `context` (the context
/// serialized as JSON); the system prompt is used verbatim.
pub struct LlmCompletionGenerator {
    llm: Arc<dyn LlmProvider>,
    prompts: PromptStore,
}

impl LlmCompletionGenerator {
    /// Creates a generator.
    #[must_use]
    pub fn new(llm: Arc<dyn LlmProvider>, prompts: PromptStore) -> Self {
        Self { llm, prompts }
    }

    fn context_text(context: &Context) -> String {
        match context {
            Context::String(text) => text.clone(),
            other => other.to_string(),
        }
    }
}

#[async_trait]
impl CompletionGenerator for LlmCompletionGenerator {
    async fn generate(
        &self,
        query: &str,
        context: &Context,
        system_prompt_path: &str,
        user_prompt_path: &str,
    ) -> Result<Completion> {
        let variables: HashMap<&str, String> = [
            ("question", query.to_string()),
            ("context", Self::context_text(context)),
        ]
        .into_iter()
        .collect();

        let user_prompt = self.prompts.render(user_prompt_path, &variables).await?;
        let system_prompt = self.prompts.load(system_prompt_path).await?;

        let llm = Arc::clone(&self.llm);
        tracing::debug!(provider = llm.name(), "generating completion");
        let answer = tokio::task::spawn_blocking(move || {
            llm.complete_with_system(&system_prompt, &user_prompt)
        })
        .await
        .map_err(|e| Error::operation("generate_completion", e))??;

        Ok(Completion::String(answer))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Mutex;

    /// Echoes the prompts it receives.
    struct EchoLlm {
        calls: Mutex<Vec<(String, String)>>,
    }

    impl LlmProvider for EchoLlm {
        fn name(&self) -> &'static str {
            "echo"
        }

        fn complete(&self, prompt: &str) -> Result<String> {
            Ok(prompt.to_string())
        }

        fn complete_with_system(&self, system: &str, user: &str) -> Result<String> {
            self.calls
                .lock()
                .unwrap()
                .push((system.to_string(), user.to_string()));
            Ok(format!("answer to: {user}"))
        }
    }

    struct FailingLlm;

    impl LlmProvider for FailingLlm {
        fn name(&self) -> &'static str {
            "failing"
        }

        fn complete(&self, _prompt: &str) -> Result<String> {
            Err(Error::operation("llm", "rate limited"))
        }
    }

    fn prompt_dir() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("system.txt"), "Answer briefly.").unwrap();
        std::fs::write(dir.path().join("user.txt"), "Q={{ question }} C={{ context }}").unwrap();
        dir
    }

    #[tokio::test]
    async fn test_generate_renders_prompts() {
        let dir = prompt_dir();
        let llm = Arc::new(EchoLlm {
            calls: Mutex::new(Vec::new()),
        });
        let generator = LlmCompletionGenerator::new(llm.clone(), PromptStore::new(dir.path()));

        let completion = generator
            .generate("who?", &json!({"nodes": [1]}), "system.txt", "user.txt")
            .await
            .unwrap();

        assert_eq!(
            completion,
            json!("answer to: Q=who? C={\"nodes\":[1]}")
        );
        let calls = llm.calls.lock().unwrap();
        assert_eq!(calls[0].0, "Answer briefly.");
    }

    #[tokio::test]
    async fn test_string_context_not_quoted() {
        let dir = prompt_dir();
        let llm = Arc::new(EchoLlm {
            calls: Mutex::new(Vec::new()),
        });
        let generator = LlmCompletionGenerator::new(llm, PromptStore::new(dir.path()));

        let completion = generator
            .generate("q", &json!("plain text"), "system.txt", "user.txt")
            .await
            .unwrap();
        assert_eq!(completion, json!("answer to: Q=q C=plain text"));
    }

    #[tokio::test]
    async fn test_missing_prompt_fails() {
        let dir = prompt_dir();
        let generator =
            LlmCompletionGenerator::new(Arc::new(FailingLlm), PromptStore::new(dir.path()));

        let result = generator
            .generate("q", &json!(null), "system.txt", "absent.txt")
            .await;
        assert!(matches!(result, Err(Error::OperationFailed { operation, .. }) if operation == "load_prompt"));
    }

    #[tokio::test]
    async fn test_llm_failure_propagates() {
        let dir = prompt_dir();
        let generator =
            LlmCompletionGenerator::new(Arc::new(FailingLlm), PromptStore::new(dir.path()));

        let result = generator
            .generate("q", &json!([]), "system.txt", "user.txt")
            .await;
        assert!(result.unwrap_err().to_string().contains("rate limited"));
    }
}
