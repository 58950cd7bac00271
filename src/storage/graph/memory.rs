//! In-memory graph backend.
//!
//! Provides a fast, non-persistent node/edge store for tests, demos and
//! small embedded graphs. It has no query engine: native queries are
//! rejected, and retrievers that need one refuse it up front.

use crate::models::{BackendKind, Context, QueryLanguage};
use crate::storage::traits::GraphBackend;
use crate::{Error, Result};
use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::RwLock;

/// A node with free-form properties.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphNode {
    /// Node identifier.
    pub id: String,
    /// Node properties.
    pub properties: Map<String, Value>,
}

/// A directed, labelled edge.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphEdge {
    /// Source node ID.
    pub source: String,
    /// Target node ID.
    pub target: String,
    /// Relationship name.
    pub relationship: String,
    /// Edge properties.
    pub properties: Map<String, Value>,
}

/// In-memory graph backend.
///
/// Uses `RwLock` for thread-safe access with reader-writer semantics.
/// Data is not persisted between runs.
///
/// # Example
///
/// ```rust,ignore
/// use graphrecall::storage::graph::InMemoryGraphBackend;
///
/// let backend = InMemoryGraphBackend::new();
/// backend.add_node("alice", Map::new())?;
/// backend.add_node("bob", Map::new())?;
/// backend.add_edge("alice", "bob", "knows", Map::new())?;
/// ```
#[derive(Debug, Default)]
pub struct InMemoryGraphBackend {
    nodes: RwLock<HashMap<String, GraphNode>>,
    edges: RwLock<Vec<GraphEdge>>,
}

impl InMemoryGraphBackend {
    /// Creates a new empty in-memory graph backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of nodes stored.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.read().map(|n| n.len()).unwrap_or(0)
    }

    /// Returns the number of edges stored.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.read().map(|e| e.len()).unwrap_or(0)
    }

    /// Inserts or replaces a node.
    ///
    /// # Errors
    ///
    /// Returns an error if the node ID is empty or the lock is poisoned.
    pub fn add_node(&self, id: &str, properties: Map<String, Value>) -> Result<()> {
        if id.trim().is_empty() {
            return Err(Error::InvalidInput("node id must not be empty".to_string()));
        }

        let mut nodes = self
            .nodes
            .write()
            .map_err(|_| Error::operation("add_node", "Lock poisoned"))?;

        nodes.insert(
            id.to_string(),
            GraphNode {
                id: id.to_string(),
                properties,
            },
        );
        Ok(())
    }

    /// Adds an edge between two existing nodes.
    ///
    /// An edge with the same endpoints and relationship is replaced.
    ///
    /// # Errors
    ///
    /// Returns an error if either endpoint does not exist or a lock is poisoned.
    pub fn add_edge(
        &self,
        source: &str,
        target: &str,
        relationship: &str,
        properties: Map<String, Value>,
    ) -> Result<()> {
        {
            let nodes = self
                .nodes
                .read()
                .map_err(|_| Error::operation("add_edge", "Lock poisoned"))?;
            for endpoint in [source, target] {
                if !nodes.contains_key(endpoint) {
                    return Err(Error::InvalidInput(format!("unknown node: {endpoint}")));
                }
            }
        }

        let mut edges = self
            .edges
            .write()
            .map_err(|_| Error::operation("add_edge", "Lock poisoned"))?;

        let edge = GraphEdge {
            source: source.to_string(),
            target: target.to_string(),
            relationship: relationship.to_string(),
            properties,
        };

        // Upsert on (source, target, relationship)
        if let Some(existing) = edges.iter_mut().find(|e| {
            e.source == edge.source && e.target == edge.target && e.relationship == edge.relationship
        }) {
            *existing = edge;
        } else {
            edges.push(edge);
        }
        Ok(())
    }

    /// Retrieves a node by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the lock is poisoned.
    pub fn get_node(&self, id: &str) -> Result<Option<GraphNode>> {
        let nodes = self
            .nodes
            .read()
            .map_err(|_| Error::operation("get_node", "Lock poisoned"))?;
        Ok(nodes.get(id).cloned())
    }

    /// Returns the nodes directly connected to `id`, in either direction.
    ///
    /// # Errors
    ///
    /// Returns an error if a lock is poisoned.
    pub fn neighbors(&self, id: &str) -> Result<Vec<GraphNode>> {
        let edges = self
            .edges
            .read()
            .map_err(|_| Error::operation("neighbors", "Lock poisoned"))?;
        let nodes = self
            .nodes
            .read()
            .map_err(|_| Error::operation("neighbors", "Lock poisoned"))?;

        let mut seen = Vec::new();
        for edge in edges.iter() {
            let other = if edge.source == id {
                &edge.target
            } else if edge.target == id {
                &edge.source
            } else {
                continue;
            };
            if !seen.contains(other) {
                seen.push(other.clone());
            }
        }

        Ok(seen.iter().filter_map(|n| nodes.get(n).cloned()).collect())
    }

    /// Returns all edges leaving `id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the lock is poisoned.
    pub fn outgoing_edges(&self, id: &str) -> Result<Vec<GraphEdge>> {
        let edges = self
            .edges
            .read()
            .map_err(|_| Error::operation("outgoing_edges", "Lock poisoned"))?;
        Ok(edges.iter().filter(|e| e.source == id).cloned().collect())
    }

    /// Removes all nodes and edges.
    ///
    /// # Errors
    ///
    /// Returns an error if a lock is poisoned.
    pub fn clear(&self) -> Result<()> {
        self.edges
            .write()
            .map_err(|_| Error::operation("clear", "Lock poisoned"))?
            .clear();
        self.nodes
            .write()
            .map_err(|_| Error::operation("clear", "Lock poisoned"))?
            .clear();
        Ok(())
    }
}

#[async_trait]
impl GraphBackend for InMemoryGraphBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::InMemory
    }

    fn capabilities(&self) -> &'static [QueryLanguage] {
        &[]
    }

    async fn query(&self, _query: &str) -> Result<Context> {
        Err(Error::operation(
            "memory_query",
            "the in-memory graph has no native query engine",
        ))
    }
}
