//! Retrieval data types shared by backends, retrievers and the search service.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Raw result of executing a retrieval query against a graph backend.
///
/// Opaque to retrievers: a list of records, a mapping or a scalar depending on
/// the backend and the query.
pub type Context = serde_json::Value;

/// Final answer artifact returned to callers.
///
/// Equals the [`Context`] when no completion generator is configured.
pub type Completion = serde_json::Value;

/// Query languages a graph backend may execute natively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryLanguage {
    /// openCypher, as spoken by Neo4j, Memgraph and friends.
    Cypher,
}

impl QueryLanguage {
    /// Returns the language name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Cypher => "cypher",
        }
    }
}

impl fmt::Display for QueryLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Identifies a graph backend variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Process-local graph without a query engine.
    #[default]
    #[serde(rename = "memory")]
    InMemory,
    /// Neo4j over the HTTP transactional API.
    Neo4j,
}

impl BackendKind {
    /// Returns the backend name as used in configuration.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::InMemory => "memory",
            Self::Neo4j => "neo4j",
        }
    }

    /// Parses a backend name.
    ///
    /// Accepts the configuration names plus a few common aliases.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "memory" | "in-memory" | "inmemory" | "in_memory" => Some(Self::InMemory),
            "neo4j" => Some(Self::Neo4j),
            _ => None,
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Retrieval strategies a search can be dispatched to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchType {
    /// Raw document chunks.
    Chunks,
    /// Pre-computed summaries.
    Summaries,
    /// Entity/relationship triplets.
    Insights,
    /// Graph context routed through a language model.
    GraphCompletion,
    /// Native Cypher query executed verbatim by the backend.
    Cypher,
}

impl SearchType {
    /// Returns all search types.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Chunks,
            Self::Summaries,
            Self::Insights,
            Self::GraphCompletion,
            Self::Cypher,
        ]
    }

    /// Returns the canonical name of the search type.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Chunks => "chunks",
            Self::Summaries => "summaries",
            Self::Insights => "insights",
            Self::GraphCompletion => "graph_completion",
            Self::Cypher => "cypher",
        }
    }

    /// Parses a search type name (case-insensitive, `-` and `_` interchangeable).
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "chunks" => Some(Self::Chunks),
            "summaries" => Some(Self::Summaries),
            "insights" => Some(Self::Insights),
            "graph_completion" => Some(Self::GraphCompletion),
            "cypher" => Some(Self::Cypher),
            _ => None,
        }
    }
}

impl fmt::Display for SearchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
