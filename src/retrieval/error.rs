//! Errors surfaced by retrievers.

use crate::Error;
use crate::models::{BackendKind, SearchType};

/// Retrieval errors.
///
/// These are the only errors a caller of a [`Retriever`](super::Retriever)
/// observes. Backend and provider failures are wrapped into
/// `RetrievalExecution` with the original error kept as `source`.
#[derive(Debug, thiserror::Error)]
pub enum RetrievalError {
    /// The search type cannot be served, either because the resolved backend
    /// lacks the required query language or because no retriever is
    /// registered for it.
    #[error(
        "{search_type} search type not supported{}",
        .backend.map_or_else(String::new, |b| format!(" by {b} backend"))
    )]
    UnsupportedSearchType {
        /// The requested search type.
        search_type: SearchType,
        /// The backend that was resolved, if any.
        backend: Option<BackendKind>,
    },

    /// Backend resolution, query execution or completion generation failed.
    #[error("{message}")]
    RetrievalExecution {
        /// Human-readable summary.
        message: String,
        /// The originating error.
        #[source]
        source: Option<Box<Error>>,
    },
}

impl RetrievalError {
    /// Creates an execution error wrapping `source`.
    pub fn execution(message: impl Into<String>, source: Error) -> Self {
        Self::RetrievalExecution {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Creates an unsupported-search-type error.
    #[must_use]
    pub const fn unsupported(search_type: SearchType, backend: Option<BackendKind>) -> Self {
        Self::UnsupportedSearchType {
            search_type,
            backend,
        }
    }

    /// Returns true for `UnsupportedSearchType`.
    #[must_use]
    pub const fn is_unsupported(&self) -> bool {
        matches!(self, Self::UnsupportedSearchType { .. })
    }

    /// Returns the originating error of an execution failure.
    #[must_use]
    pub fn cause(&self) -> Option<&Error> {
        match self {
            Self::RetrievalExecution { source, .. } => source.as_deref(),
            Self::UnsupportedSearchType { .. } => None,
        }
    }
}

/// Result type alias for retrieval operations.
pub type RetrievalResult<T> = std::result::Result<T, RetrievalError>;
