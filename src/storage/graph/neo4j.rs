//! Neo4j graph backend over the HTTP transactional API.
//!
//! Each query runs as a single auto-committed transaction:
//!
//! ```text
//! POST {url}/db/{database}/tx/commit
//! {"statements": [{"statement": "MATCH (n) RETURN n.name AS name", "parameters": {}}]}
//! ```
//!
//! The response rows are flattened into a JSON array of records keyed by
//! column name, e.g. `[{"name": "Alice"}, {"name": "Bob"}]`.

use crate::models::{BackendKind, Context, QueryLanguage};
use crate::storage::traits::GraphBackend;
use crate::{Error, Result, error_chain};
use async_trait::async_trait;
use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::time::Duration;

/// HTTP timeouts for the Neo4j client.
#[derive(Debug, Clone, Copy)]
pub struct Neo4jHttpConfig {
    /// Request timeout in milliseconds (0 to disable).
    pub timeout_ms: u64,
    /// Connect timeout in milliseconds (0 to disable).
    pub connect_timeout_ms: u64,
}

impl Default for Neo4jHttpConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 30_000,
            connect_timeout_ms: 3_000,
        }
    }
}

/// Neo4j backend speaking Cypher over HTTP.
pub struct Neo4jGraphBackend {
    /// Base URL, e.g. `http://localhost:7474`.
    url: String,
    /// Database name.
    database: String,
    /// Basic auth username.
    username: Option<String>,
    /// Basic auth password.
    password: Option<SecretString>,
    /// HTTP client.
    client: reqwest::Client,
}

impl Neo4jGraphBackend {
    /// Default database name.
    pub const DEFAULT_DATABASE: &'static str = "neo4j";

    /// Creates a backend for the server at `url` with default timeouts.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into().trim_end_matches('/').to_string(),
            database: Self::DEFAULT_DATABASE.to_string(),
            username: None,
            password: None,
            client: build_http_client(Neo4jHttpConfig::default()),
        }
    }

    /// Sets the database name.
    #[must_use]
    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = database.into();
        self
    }

    /// Sets basic auth credentials.
    #[must_use]
    pub fn with_credentials(mut self, username: impl Into<String>, password: SecretString) -> Self {
        self.username = Some(username.into());
        self.password = Some(password);
        self
    }

    /// Replaces the HTTP client with one using the given timeouts.
    #[must_use]
    pub fn with_http_config(mut self, config: Neo4jHttpConfig) -> Self {
        self.client = build_http_client(config);
        self
    }

    /// Returns the transaction commit endpoint.
    #[must_use]
    pub fn commit_url(&self) -> String {
        format!("{}/db/{}/tx/commit", self.url, self.database)
    }

    /// Sends one statement and returns the decoded response body.
    async fn execute(&self, statement: &str) -> Result<TransactionResponse> {
        let request = TransactionRequest {
            statements: vec![Statement {
                statement: statement.to_string(),
                parameters: Map::new(),
            }],
        };

        let mut builder = self
            .client
            .post(self.commit_url())
            .header("Accept", "application/json")
            .json(&request);

        if let Some(username) = &self.username {
            let password = self.password.as_ref().map(|p| p.expose_secret().to_string());
            builder = builder.basic_auth(username, password);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| Error::operation("neo4j_request", error_chain(&e)))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(Error::Unauthorized(format!(
                "neo4j rejected credentials ({status})"
            )));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::operation(
                "neo4j_request",
                format!("server returned status: {status} - {body}"),
            ));
        }

        response
            .json()
            .await
            .map_err(|e| Error::operation("neo4j_response", error_chain(&e)))
    }
}

#[async_trait]
impl GraphBackend for Neo4jGraphBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Neo4j
    }

    fn capabilities(&self) -> &'static [QueryLanguage] {
        &[QueryLanguage::Cypher]
    }

    async fn query(&self, query: &str) -> Result<Context> {
        if query.trim().is_empty() {
            return Err(Error::InvalidInput("query must not be empty".to_string()));
        }

        tracing::debug!(database = %self.database, "executing cypher statement");
        let response = self.execute(query).await?;
        records_from_response(response)
    }
}

/// Builds an async HTTP client with configured timeouts.
fn build_http_client(config: Neo4jHttpConfig) -> reqwest::Client {
    let mut builder = reqwest::Client::builder();
    if config.timeout_ms > 0 {
        builder = builder.timeout(Duration::from_millis(config.timeout_ms));
    }
    if config.connect_timeout_ms > 0 {
        builder = builder.connect_timeout(Duration::from_millis(config.connect_timeout_ms));
    }

    builder.build().unwrap_or_else(|err| {
        tracing::warn!("Failed to build Neo4j HTTP client: {err}");
        reqwest::Client::new()
    })
}

/// Converts a transaction response into a list of column-keyed records.
fn records_from_response(response: TransactionResponse) -> Result<Context> {
    if let Some(first) = response.errors.first() {
        let detail = response
            .errors
            .iter()
            .map(|e| format!("{}: {}", e.code, e.message))
            .collect::<Vec<_>>()
            .join("; ");
        tracing::debug!(code = %first.code, "neo4j reported statement errors");
        return Err(Error::operation("neo4j_query", detail));
    }

    let Some(result) = response.results.into_iter().next() else {
        return Ok(Value::Array(Vec::new()));
    };

    let records = result
        .data
        .into_iter()
        .map(|row| {
            let record: Map<String, Value> = result
                .columns
                .iter()
                .cloned()
                .zip(row.row.into_iter().chain(std::iter::repeat(Value::Null)))
                .collect();
            Value::Object(record)
        })
        .collect();

    Ok(Value::Array(records))
}

/// Request body for the transaction commit endpoint.
#[derive(Debug, Serialize)]
struct TransactionRequest {
    statements: Vec<Statement>,
}

/// A single Cypher statement.
#[derive(Debug, Serialize)]
struct Statement {
    statement: String,
    parameters: Map<String, Value>,
}

/// Response body of the transaction commit endpoint.
#[derive(Debug, Default, Deserialize)]
struct TransactionResponse {
    #[serde(default)]
    results: Vec<StatementResult>,
    #[serde(default)]
    errors: Vec<Neo4jError>,
}

/// Result of one statement.
#[derive(Debug, Default, Deserialize)]
struct StatementResult {
    #[serde(default)]
    columns: Vec<String>,
    #[serde(default)]
    data: Vec<DataRow>,
}

/// One result row.
#[derive(Debug, Default, Deserialize)]
struct DataRow {
    #[serde(default)]
    row: Vec<Value>,
}

/// Error reported by the server for a statement.
#[derive(Debug, Deserialize)]
struct Neo4jError {
    code: String,
    message: String,
}
