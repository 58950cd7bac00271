//! # graphrecall
//!
//! Capability-checked retrieval over knowledge graph backends.
//!
//! A retriever answers a query in two phases: it first resolves a raw
//! *context* from a graph backend, then turns that context into a
//! *completion*. Backends are resolved through an injected provider and
//! advertise the query languages they execute natively, so a retriever can
//! refuse a backend up front instead of sending it a query it cannot run.
//!
//! ## Features
//!
//! - Pluggable graph backends (in-memory, Neo4j over HTTP)
//! - Lazily resolved, process-wide backend handles
//! - Cypher retrieval with normalized error reporting
//! - Optional LLM-backed completion with file-based prompt templates
//! - Search orchestration over registered retrievers
//!
//! ## Example
//!
//! ```rust,ignore
//! use graphrecall::retrieval::{CypherSearchRetriever, Retriever};
//! use graphrecall::storage::ConfiguredGraphProvider;
//!
//! let provider = ConfiguredGraphProvider::new(config.graph.clone());
//! let retriever = CypherSearchRetriever::new(Arc::new(provider));
//! let context = retriever.get_context("MATCH (n) RETURN n LIMIT 5").await?;
//! ```

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(missing_docs)]
#![forbid(unsafe_code)]
#![allow(clippy::multiple_crate_versions)]

use thiserror::Error as ThisError;

// Module declarations
pub mod config;
pub mod llm;
pub mod models;
pub mod observability;
pub mod rendering;
pub mod retrieval;
pub mod services;
pub mod storage;

// Re-exports for convenience
pub use config::GraphRecallConfig;
pub use llm::LlmProvider;
pub use models::{BackendKind, Completion, Context, QueryLanguage, SearchType};
pub use retrieval::{CompletionGenerator, CypherSearchRetriever, RetrievalError, Retriever};
pub use services::SearchService;
pub use storage::{GraphBackend, GraphBackendProvider};

/// Error type for operations below the retriever boundary.
///
/// Backends, providers, prompt loading and LLM clients report failures with
/// this type. Retrievers never hand it to their callers directly: it is
/// wrapped into [`RetrievalError`] first.
///
/// | Variant | Raised When |
/// |---------|-------------|
/// | `InvalidInput` | Empty query, malformed config value, bad prompt path |
/// | `OperationFailed` | Transport errors, backend-reported errors, I/O failures |
/// | `Unauthorized` | The graph database or LLM API rejected the credentials |
#[derive(Debug, ThisError)]
pub enum Error {
    /// Invalid input was provided.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// An operation failed.
    #[error("operation '{operation}' failed: {cause}")]
    OperationFailed {
        /// The operation that failed.
        operation: String,
        /// The underlying cause.
        cause: String,
    },

    /// Authentication failed.
    #[error("unauthorized: {0}")]
    Unauthorized(String),
}

impl Error {
    /// Shorthand for [`Error::OperationFailed`].
    pub fn operation(operation: impl Into<String>, cause: impl ToString) -> Self {
        Self::OperationFailed {
            operation: operation.into(),
            cause: cause.to_string(),
        }
    }
}

/// Result type alias for graphrecall operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Renders an error together with its whole `source()` chain.
///
/// Transport errors (reqwest, io) keep the interesting part, such as
/// "Connection refused", in their sources rather than in `Display`.
#[must_use]
pub fn error_chain(err: &dyn std::error::Error) -> String {
    let mut rendered = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !rendered.contains(&text) {
            rendered.push_str(": ");
            rendered.push_str(&text);
        }
        source = cause.source();
    }
    rendered
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::InvalidInput("empty query".to_string());
        assert_eq!(err.to_string(), "invalid input: empty query");

        let err = Error::operation("neo4j_query", "connection refused");
        assert_eq!(
            err.to_string(),
            "operation 'neo4j_query' failed: connection refused"
        );

        let err = Error::Unauthorized("bad password".to_string());
        assert_eq!(err.to_string(), "unauthorized: bad password");
    }

    #[test]
    fn test_error_chain_includes_sources() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "connection refused");
        let outer = crate::retrieval::RetrievalError::execution(
            "query failed",
            Error::operation("send", "boom"),
        );
        assert_eq!(error_chain(&io), "connection refused");
        let rendered = error_chain(&outer);
        assert!(rendered.starts_with("query failed"));
        assert!(rendered.contains("operation 'send' failed: boom"));
    }
}
