//! Graph backend and provider traits.
//!
//! A graph backend is the storage and query engine holding the knowledge
//! graph. Different backends support different query languages, so every
//! backend advertises its capability set and callers check it before sending
//! a native query.
//!
//! # Available Implementations
//!
//! | Backend | Kind | Native languages |
//! |---------|------|------------------|
//! | `InMemoryGraphBackend` | `memory` | none |
//! | `Neo4jGraphBackend` | `neo4j` | Cypher |
//!
//! # Example
//!
//! ```rust,ignore
//! use graphrecall::models::QueryLanguage;
//! use graphrecall::storage::GraphBackendProvider;
//!
//! let backend = provider.resolve().await?;
//! if backend.supports_query_language(QueryLanguage::Cypher) {
//!     let rows = backend.query("MATCH (n) RETURN count(n) AS total").await?;
//! }
//! ```

use crate::Result;
use crate::models::{BackendKind, Context, QueryLanguage};
use async_trait::async_trait;
use std::sync::Arc;

/// Trait for graph layer backends.
///
/// # Implementor Notes
///
/// - Methods use `&self` to enable sharing via `Arc<dyn GraphBackend>`
/// - `capabilities()` must be cheap and must not touch the network
/// - `query()` returns the engine's result as-is; callers treat it as opaque
#[async_trait]
pub trait GraphBackend: Send + Sync {
    /// The backend variant tag.
    fn kind(&self) -> BackendKind;

    /// Query languages this backend executes natively.
    fn capabilities(&self) -> &'static [QueryLanguage];

    /// Returns true if the backend can execute `language` natively.
    fn supports_query_language(&self, language: QueryLanguage) -> bool {
        self.capabilities().contains(&language)
    }

    /// Executes a native query and returns the raw result.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend is unreachable, rejects the query, or
    /// does not execute native queries at all.
    async fn query(&self, query: &str) -> Result<Context>;
}

/// Supplies the current graph backend handle.
///
/// Providers own backend lifecycle; retrievers only borrow the handle for
/// the duration of a call.
#[async_trait]
pub trait GraphBackendProvider: Send + Sync {
    /// Resolves the backend handle, creating it on first use if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be constructed.
    async fn resolve(&self) -> Result<Arc<dyn GraphBackend>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NoCapabilities;

    #[async_trait]
    impl GraphBackend for NoCapabilities {
        fn kind(&self) -> BackendKind {
            BackendKind::InMemory
        }

        fn capabilities(&self) -> &'static [QueryLanguage] {
            &[]
        }

        async fn query(&self, _query: &str) -> Result<Context> {
            Ok(Context::Null)
        }
    }

    struct CypherOnly;

    #[async_trait]
    impl GraphBackend for CypherOnly {
        fn kind(&self) -> BackendKind {
            BackendKind::Neo4j
        }

        fn capabilities(&self) -> &'static [QueryLanguage] {
            &[QueryLanguage::Cypher]
        }

        async fn query(&self, _query: &str) -> Result<Context> {
            Ok(Context::Null)
        }
    }

    #[test]
    fn test_supports_query_language_default() {
        assert!(!NoCapabilities.supports_query_language(QueryLanguage::Cypher));
        assert!(CypherOnly.supports_query_language(QueryLanguage::Cypher));
    }
}
