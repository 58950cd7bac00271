//! Cypher search retriever.
//!
//! Treats the query string as a Cypher statement and runs it verbatim on the
//! resolved graph backend, provided the backend speaks Cypher.

use super::{CompletionGenerator, RetrievalError, RetrievalResult, Retriever};
use crate::config::RetrievalConfig;
use crate::error_chain;
use crate::models::{Completion, Context, QueryLanguage, SearchType};
use crate::storage::GraphBackendProvider;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::instrument;

/// Retriever executing raw Cypher against the graph backend.
///
/// Without a [`CompletionGenerator`] the completion is the context itself.
pub struct CypherSearchRetriever {
    provider: Arc<dyn GraphBackendProvider>,
    user_prompt_path: String,
    system_prompt_path: String,
    generator: Option<Arc<dyn CompletionGenerator>>,
}

impl CypherSearchRetriever {
    /// Creates a retriever with the default prompt paths and pass-through
    /// completion.
    #[must_use]
    pub fn new(provider: Arc<dyn GraphBackendProvider>) -> Self {
        Self {
            provider,
            user_prompt_path: RetrievalConfig::DEFAULT_USER_PROMPT.to_string(),
            system_prompt_path: RetrievalConfig::DEFAULT_SYSTEM_PROMPT.to_string(),
            generator: None,
        }
    }

    /// Sets the prompt template paths handed to the completion generator.
    #[must_use]
    pub fn with_prompt_paths(
        mut self,
        user_prompt_path: impl Into<String>,
        system_prompt_path: impl Into<String>,
    ) -> Self {
        self.user_prompt_path = user_prompt_path.into();
        self.system_prompt_path = system_prompt_path.into();
        self
    }

    /// Enables completion synthesis.
    #[must_use]
    pub fn with_completion_generator(mut self, generator: Arc<dyn CompletionGenerator>) -> Self {
        self.generator = Some(generator);
        self
    }

    /// User prompt template path.
    #[must_use]
    pub fn user_prompt_path(&self) -> &str {
        &self.user_prompt_path
    }

    /// System prompt template path.
    #[must_use]
    pub fn system_prompt_path(&self) -> &str {
        &self.system_prompt_path
    }

    /// Returns true if completions are synthesized rather than passed through.
    #[must_use]
    pub fn generates_completions(&self) -> bool {
        self.generator.is_some()
    }
}

#[async_trait]
impl Retriever for CypherSearchRetriever {
    #[instrument(skip(self, query), fields(operation = "cypher_get_context", query_len = query.len()))]
    async fn get_context(&self, query: &str) -> RetrievalResult<Context> {
        let backend = self.provider.resolve().await.map_err(|e| {
            tracing::error!("Failed to resolve graph backend: {}", error_chain(&e));
            RetrievalError::execution("cypher search retrieval failed", e)
        })?;

        if !backend.supports_query_language(QueryLanguage::Cypher) {
            tracing::debug!(backend = %backend.kind(), "backend does not execute cypher");
            return Err(RetrievalError::unsupported(
                SearchType::Cypher,
                Some(backend.kind()),
            ));
        }

        backend.query(query).await.map_err(|e| {
            tracing::error!(
                backend = %backend.kind(),
                "Cypher query failed: {}",
                error_chain(&e)
            );
            RetrievalError::execution("cypher search retrieval failed", e)
        })
    }

    #[instrument(skip(self, query, context), fields(operation = "cypher_get_completion", has_context = context.is_some()))]
    async fn get_completion(
        &self,
        query: &str,
        context: Option<Context>,
    ) -> RetrievalResult<Completion> {
        let context = match context {
            Some(context) => context,
            None => self.get_context(query).await?,
        };

        let Some(generator) = &self.generator else {
            return Ok(context);
        };

        generator
            .generate(
                query,
                &context,
                &self.system_prompt_path,
                &self.user_prompt_path,
            )
            .await
            .map_err(|e| {
                tracing::error!("Completion generation failed: {}", error_chain(&e));
                RetrievalError::execution("cypher search completion failed", e)
            })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::models::BackendKind;
    use crate::storage::GraphBackend;
    use crate::{Error, Result};
    use serde_json::json;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Backend recording the queries it receives.
    struct SpyBackend {
        kind: BackendKind,
        capabilities: &'static [QueryLanguage],
        response: Result<Context>,
        queries: Mutex<Vec<String>>,
    }

    impl SpyBackend {
        fn cypher(response: Result<Context>) -> Self {
            Self {
                kind: BackendKind::Neo4j,
                capabilities: &[QueryLanguage::Cypher],
                response,
                queries: Mutex::new(Vec::new()),
            }
        }

        fn incapable() -> Self {
            Self {
                kind: BackendKind::InMemory,
                capabilities: &[],
                response: Ok(json!("should not run")),
                queries: Mutex::new(Vec::new()),
            }
        }

        fn query_count(&self) -> usize {
            self.queries.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl GraphBackend for SpyBackend {
        fn kind(&self) -> BackendKind {
            self.kind
        }

        fn capabilities(&self) -> &'static [QueryLanguage] {
            self.capabilities
        }

        async fn query(&self, query: &str) -> Result<Context> {
            self.queries.lock().unwrap().push(query.to_string());
            match &self.response {
                Ok(value) => Ok(value.clone()),
                Err(e) => Err(Error::operation("spy_query", e)),
            }
        }
    }

    /// Provider counting resolutions.
    struct CountingProvider {
        backend: Option<Arc<SpyBackend>>,
        resolutions: AtomicUsize,
    }

    impl CountingProvider {
        fn new(backend: Arc<SpyBackend>) -> Self {
            Self {
                backend: Some(backend),
                resolutions: AtomicUsize::new(0),
            }
        }

        fn broken() -> Self {
            Self {
                backend: None,
                resolutions: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl GraphBackendProvider for CountingProvider {
        async fn resolve(&self) -> Result<Arc<dyn GraphBackend>> {
            self.resolutions.fetch_add(1, Ordering::SeqCst);
            match &self.backend {
                Some(backend) => Ok(Arc::clone(backend) as Arc<dyn GraphBackend>),
                None => Err(Error::operation("resolve_backend", "backend unavailable")),
            }
        }
    }

    struct FixedGenerator;

    #[async_trait]
    impl CompletionGenerator for FixedGenerator {
        async fn generate(
            &self,
            query: &str,
            context: &Context,
            system_prompt_path: &str,
            user_prompt_path: &str,
        ) -> Result<Completion> {
            Ok(json!({
                "query": query,
                "context": context,
                "system": system_prompt_path,
                "user": user_prompt_path,
            }))
        }
    }

    struct FailingGenerator;

    #[async_trait]
    impl CompletionGenerator for FailingGenerator {
        async fn generate(&self, _: &str, _: &Context, _: &str, _: &str) -> Result<Completion> {
            Err(Error::operation("generate_completion", "model overloaded"))
        }
    }

    fn build(backend: &Arc<SpyBackend>) -> (CypherSearchRetriever, Arc<CountingProvider>) {
        let provider = Arc::new(CountingProvider::new(Arc::clone(backend)));
        (CypherSearchRetriever::new(provider.clone()), provider)
    }

    #[tokio::test]
    async fn test_get_context_returns_backend_result_unchanged() {
        let rows = json!([{"n.name": "Alice"}, {"n.name": "Bob"}]);
        let backend = Arc::new(SpyBackend::cypher(Ok(rows.clone())));
        let (retriever, provider) = build(&backend);

        let context = retriever
            .get_context("MATCH (n) RETURN n.name")
            .await
            .unwrap();

        assert_eq!(context, rows);
        assert_eq!(
            backend.queries.lock().unwrap().as_slice(),
            ["MATCH (n) RETURN n.name"]
        );
        assert_eq!(provider.resolutions.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_unsupported_backend_never_queried() {
        let backend = Arc::new(SpyBackend::incapable());
        let (retriever, _) = build(&backend);

        let err = retriever.get_context("MATCH (n) RETURN n").await.unwrap_err();

        assert!(matches!(
            err,
            RetrievalError::UnsupportedSearchType {
                search_type: SearchType::Cypher,
                backend: Some(BackendKind::InMemory),
            }
        ));
        assert_eq!(backend.query_count(), 0);
    }

    #[tokio::test]
    async fn test_query_failure_wrapped_with_cause() {
        let backend = Arc::new(SpyBackend::cypher(Err(Error::operation(
            "neo4j_request",
            "connection refused",
        ))));
        let (retriever, _) = build(&backend);

        let err = retriever.get_context("MATCH (n) RETURN n").await.unwrap_err();

        assert!(!err.is_unsupported());
        let cause = err.cause().unwrap();
        assert!(cause.to_string().contains("connection refused"));
    }

    #[tokio::test]
    async fn test_resolution_failure_wrapped() {
        let retriever = CypherSearchRetriever::new(Arc::new(CountingProvider::broken()));

        let err = retriever.get_context("RETURN 1").await.unwrap_err();
        assert!(matches!(err, RetrievalError::RetrievalExecution { .. }));
        assert!(err.cause().unwrap().to_string().contains("backend unavailable"));
    }

    #[tokio::test]
    async fn test_completion_with_context_skips_backend() {
        let backend = Arc::new(SpyBackend::cypher(Ok(json!([]))));
        let (retriever, provider) = build(&backend);

        let supplied = json!({"answer": 42});
        let completion = retriever
            .get_completion("RETURN 42", Some(supplied.clone()))
            .await
            .unwrap();

        assert_eq!(completion, supplied);
        assert_eq!(provider.resolutions.load(Ordering::SeqCst), 0);
        assert_eq!(backend.query_count(), 0);
    }

    #[tokio::test]
    async fn test_completion_without_context_fetches_it() {
        let rows = json!([{"total": 3}]);
        let backend = Arc::new(SpyBackend::cypher(Ok(rows.clone())));
        let (retriever, _) = build(&backend);

        let completion = retriever
            .get_completion("MATCH (n) RETURN count(n) AS total", None)
            .await
            .unwrap();

        assert_eq!(completion, rows);
        assert_eq!(backend.query_count(), 1);
    }

    #[tokio::test]
    async fn test_completion_propagates_context_error_kind() {
        let backend = Arc::new(SpyBackend::incapable());
        let (retriever, _) = build(&backend);

        let err = retriever.get_completion("RETURN 1", None).await.unwrap_err();
        assert!(err.is_unsupported());
    }

    #[tokio::test]
    async fn test_completion_uses_generator_and_prompt_paths() {
        let backend = Arc::new(SpyBackend::cypher(Ok(json!([1]))));
        let (retriever, _) = build(&backend);
        let retriever = retriever
            .with_prompt_paths("user.txt", "system.txt")
            .with_completion_generator(Arc::new(FixedGenerator));
        assert!(retriever.generates_completions());

        let completion = retriever.get_completion("RETURN 1", None).await.unwrap();

        assert_eq!(
            completion,
            json!({
                "query": "RETURN 1",
                "context": [1],
                "system": "system.txt",
                "user": "user.txt",
            })
        );
    }

    #[tokio::test]
    async fn test_generator_failure_wrapped() {
        let backend = Arc::new(SpyBackend::cypher(Ok(json!([]))));
        let (retriever, _) = build(&backend);
        let retriever = retriever.with_completion_generator(Arc::new(FailingGenerator));

        let err = retriever
            .get_completion("RETURN 1", Some(json!([])))
            .await
            .unwrap_err();

        assert!(matches!(err, RetrievalError::RetrievalExecution { .. }));
        assert!(err.cause().unwrap().to_string().contains("model overloaded"));
    }

    #[test]
    fn test_default_prompt_paths() {
        let backend = Arc::new(SpyBackend::incapable());
        let (retriever, _) = build(&backend);

        assert_eq!(retriever.user_prompt_path(), "context_for_question.txt");
        assert_eq!(retriever.system_prompt_path(), "answer_simple_question.txt");
        assert!(!retriever.generates_completions());
    }
}
