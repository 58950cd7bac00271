//! Graph storage: backends, backend traits and providers.
//!
//! Retrievers never construct backends themselves. They receive a
//! [`GraphBackendProvider`] and resolve the current backend per call.

pub mod graph;
mod provider;
pub mod traits;

pub use graph::{InMemoryGraphBackend, Neo4jGraphBackend};
pub use provider::{ConfiguredGraphProvider, StaticGraphProvider};
pub use traits::{GraphBackend, GraphBackendProvider};
