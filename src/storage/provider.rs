//! Graph backend providers.
//!
//! ```text
//! ConfiguredGraphProvider
//!   └── resolve() ── first call ──▶ build backend from GraphConfig ──▶ cache
//!                 └─ later calls ─▶ cached Arc<dyn GraphBackend>
//! ```

use crate::config::GraphConfig;
use crate::models::BackendKind;
use crate::storage::graph::{InMemoryGraphBackend, Neo4jGraphBackend, Neo4jHttpConfig};
use crate::storage::traits::{GraphBackend, GraphBackendProvider};
use crate::{Error, Result};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::OnceCell;

/// Provider handing out an existing backend.
///
/// Useful for embedding a backend the caller already owns, and for tests.
#[derive(Clone)]
pub struct StaticGraphProvider {
    backend: Arc<dyn GraphBackend>,
}

impl StaticGraphProvider {
    /// Wraps a backend.
    #[must_use]
    pub fn new(backend: Arc<dyn GraphBackend>) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl GraphBackendProvider for StaticGraphProvider {
    async fn resolve(&self) -> Result<Arc<dyn GraphBackend>> {
        Ok(Arc::clone(&self.backend))
    }
}

/// Provider that builds its backend from configuration on first use.
///
/// The handle is cached for the lifetime of the provider; concurrent first
/// calls construct it once.
pub struct ConfiguredGraphProvider {
    config: GraphConfig,
    backend: OnceCell<Arc<dyn GraphBackend>>,
}

impl ConfiguredGraphProvider {
    /// Creates a provider for the given configuration.
    #[must_use]
    pub fn new(config: GraphConfig) -> Self {
        Self {
            config,
            backend: OnceCell::new(),
        }
    }

    /// Returns true once the backend has been constructed.
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.backend.initialized()
    }

    fn build(config: &GraphConfig) -> Result<Arc<dyn GraphBackend>> {
        match config.provider {
            BackendKind::InMemory => Ok(Arc::new(InMemoryGraphBackend::new())),
            BackendKind::Neo4j => {
                let neo4j = &config.neo4j;
                if neo4j.url.trim().is_empty() {
                    return Err(Error::InvalidInput("neo4j url must not be empty".to_string()));
                }

                let defaults = Neo4jHttpConfig::default();
                let http = Neo4jHttpConfig {
                    timeout_ms: neo4j.timeout_ms.unwrap_or(defaults.timeout_ms),
                    connect_timeout_ms: neo4j
                        .connect_timeout_ms
                        .unwrap_or(defaults.connect_timeout_ms),
                };

                let mut backend = Neo4jGraphBackend::new(neo4j.url.clone())
                    .with_database(neo4j.database.clone())
                    .with_http_config(http);
                match (&neo4j.username, &neo4j.password) {
                    (Some(username), Some(password)) => {
                        backend = backend.with_credentials(username.clone(), password.clone());
                    },
                    (Some(_), None) => {
                        return Err(Error::InvalidInput(
                            "neo4j username set without password".to_string(),
                        ));
                    },
                    (None, Some(_)) => {
                        return Err(Error::InvalidInput(
                            "neo4j password set without username".to_string(),
                        ));
                    },
                    (None, None) => {},
                }
                Ok(Arc::new(backend))
            },
        }
    }
}

#[async_trait]
impl GraphBackendProvider for ConfiguredGraphProvider {
    async fn resolve(&self) -> Result<Arc<dyn GraphBackend>> {
        let backend = self
            .backend
            .get_or_try_init(|| async {
                tracing::info!(provider = %self.config.provider, "initializing graph backend");
                Self::build(&self.config)
            })
            .await?;
        Ok(Arc::clone(backend))
    }
}
