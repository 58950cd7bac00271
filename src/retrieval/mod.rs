//! Retrievers: query in, context and completion out.
//!
//! A retrieval runs in two phases:
//!
//! ```text
//! get_context(query) ── resolve backend ── capability check ── native query ──▶ Context
//! get_completion(query, context?) ── context ?? get_context(query) ── generate ──▶ Completion
//! ```
//!
//! Callers only ever observe [`RetrievalError`]; backend error types stay
//! below the retriever boundary.

mod completion;
mod cypher;
mod error;

pub use completion::{CompletionGenerator, LlmCompletionGenerator};
pub use cypher::CypherSearchRetriever;
pub use error::{RetrievalError, RetrievalResult};

use crate::models::{Completion, Context};
use async_trait::async_trait;

/// A retrieval strategy.
#[async_trait]
pub trait Retriever: Send + Sync {
    /// Retrieves the raw context for `query`.
    ///
    /// # Errors
    ///
    /// Returns [`RetrievalError`] if the search type cannot be served or the
    /// retrieval fails.
    async fn get_context(&self, query: &str) -> RetrievalResult<Context>;

    /// Produces a completion for `query`.
    ///
    /// When `context` is `None` it is obtained through
    /// [`get_context`](Self::get_context) first.
    ///
    /// # Errors
    ///
    /// Returns [`RetrievalError`] if context retrieval or generation fails.
    async fn get_completion(
        &self,
        query: &str,
        context: Option<Context>,
    ) -> RetrievalResult<Completion>;
}
