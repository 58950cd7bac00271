//! Graph storage backends.
//!
//! # Available Backends
//!
//! | Backend | Use Case | Native queries |
//! |---------|----------|----------------|
//! | [`InMemoryGraphBackend`] | Testing, small embedded graphs | none |
//! | [`Neo4jGraphBackend`] | Networked graph database | Cypher |

mod memory;
mod neo4j;

pub use memory::{GraphEdge, GraphNode, InMemoryGraphBackend};
pub use neo4j::{Neo4jGraphBackend, Neo4jHttpConfig};

// Re-export traits for convenience
pub use crate::storage::traits::graph::{GraphBackend, GraphBackendProvider};
