//! Search orchestration over registered retrievers.

use crate::config::GraphRecallConfig;
use crate::models::{Completion, SearchType};
use crate::retrieval::{
    CompletionGenerator, CypherSearchRetriever, RetrievalError, RetrievalResult, Retriever,
};
use crate::storage::{ConfiguredGraphProvider, GraphBackendProvider};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::instrument;

/// Dispatches searches to the retriever registered for each search type.
#[derive(Default)]
pub struct SearchService {
    retrievers: HashMap<SearchType, Arc<dyn Retriever>>,
}

impl SearchService {
    /// Creates a service with no retrievers registered.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a service from configuration.
    ///
    /// Registers a [`CypherSearchRetriever`] over a lazily resolved backend.
    /// With a `generator`, Cypher completions are synthesized; otherwise the
    /// context is returned as the completion.
    #[must_use]
    pub fn from_config(
        config: &GraphRecallConfig,
        generator: Option<Arc<dyn CompletionGenerator>>,
    ) -> Self {
        let provider: Arc<dyn GraphBackendProvider> =
            Arc::new(ConfiguredGraphProvider::new(config.graph.clone()));

        let mut cypher = CypherSearchRetriever::new(provider).with_prompt_paths(
            config.retrieval.user_prompt_path.clone(),
            config.retrieval.system_prompt_path.clone(),
        );
        if let Some(generator) = generator {
            cypher = cypher.with_completion_generator(generator);
        }

        let mut service = Self::new();
        service.register(SearchType::Cypher, Arc::new(cypher));
        service
    }

    /// Registers (or replaces) the retriever for `search_type`.
    pub fn register(&mut self, search_type: SearchType, retriever: Arc<dyn Retriever>) {
        self.retrievers.insert(search_type, retriever);
    }

    /// Returns the retriever registered for `search_type`.
    #[must_use]
    pub fn retriever(&self, search_type: SearchType) -> Option<Arc<dyn Retriever>> {
        self.retrievers.get(&search_type).cloned()
    }

    /// Search types with a registered retriever, in declaration order.
    #[must_use]
    pub fn registered_types(&self) -> Vec<SearchType> {
        SearchType::all()
            .iter()
            .copied()
            .filter(|t| self.retrievers.contains_key(t))
            .collect()
    }

    /// Runs `query` through the retriever for `search_type`.
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedSearchType` if no retriever is registered for the
    /// type, otherwise whatever the retriever returns.
    #[instrument(skip(self, query), fields(operation = "search", search_type = %search_type))]
    pub async fn search(&self, search_type: SearchType, query: &str) -> RetrievalResult<Completion> {
        let retriever = self
            .retriever(search_type)
            .ok_or_else(|| RetrievalError::unsupported(search_type, None))?;

        let completion = retriever.get_completion(query, None).await?;
        tracing::info!("Search completed");
        Ok(completion)
    }
}
