//! Configuration management.
//!
//! Configuration is layered: defaults, then an optional TOML file, then
//! environment variables.
//!
//! ```toml
//! [graph]
//! provider = "neo4j"
//!
//! [graph.neo4j]
//! url = "http://localhost:7474"
//! database = "neo4j"
//! username = "neo4j"
//! password = "secret"
//!
//! [retrieval]
//! prompts_dir = "prompts"
//! user_prompt_path = "context_for_question.txt"
//! system_prompt_path = "answer_simple_question.txt"
//!
//! [llm]
//! model = "gpt-4o-mini"
//!
//! [logging]
//! format = "json"
//! ```

use crate::models::BackendKind;
use crate::observability::LoggingSettings;
use secrecy::SecretString;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Main configuration for graphrecall.
#[derive(Debug, Clone, Default)]
pub struct GraphRecallConfig {
    /// Graph backend selection.
    pub graph: GraphConfig,
    /// Retriever settings.
    pub retrieval: RetrievalConfig,
    /// LLM provider settings.
    pub llm: LlmConfig,
    /// Logging settings.
    pub logging: LoggingSettings,
}

/// Graph backend configuration.
#[derive(Debug, Clone, Default)]
pub struct GraphConfig {
    /// Which backend variant to construct.
    pub provider: BackendKind,
    /// Neo4j connection settings (used when `provider` is `neo4j`).
    pub neo4j: Neo4jConfig,
}

/// Neo4j connection settings.
#[derive(Debug, Clone)]
pub struct Neo4jConfig {
    /// Base HTTP URL.
    pub url: String,
    /// Database name.
    pub database: String,
    /// Basic auth username. Requires `password`.
    pub username: Option<String>,
    /// Basic auth password. Requires `username`.
    pub password: Option<SecretString>,
    /// Request timeout in milliseconds.
    pub timeout_ms: Option<u64>,
    /// Connect timeout in milliseconds.
    pub connect_timeout_ms: Option<u64>,
}

impl Default for Neo4jConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:7474".to_string(),
            database: "neo4j".to_string(),
            username: None,
            password: None,
            timeout_ms: None,
            connect_timeout_ms: None,
        }
    }
}

/// Retriever configuration.
#[derive(Debug, Clone)]
pub struct RetrievalConfig {
    /// Directory prompt template paths are resolved against.
    pub prompts_dir: PathBuf,
    /// User prompt template path.
    pub user_prompt_path: String,
    /// System prompt template path.
    pub system_prompt_path: String,
}

impl RetrievalConfig {
    /// Default user prompt template.
    pub const DEFAULT_USER_PROMPT: &'static str = "context_for_question.txt";
    /// Default system prompt template.
    pub const DEFAULT_SYSTEM_PROMPT: &'static str = "answer_simple_question.txt";
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            prompts_dir: PathBuf::from("prompts"),
            user_prompt_path: Self::DEFAULT_USER_PROMPT.to_string(),
            system_prompt_path: Self::DEFAULT_SYSTEM_PROMPT.to_string(),
        }
    }
}

/// LLM provider configuration.
#[derive(Debug, Clone, Default)]
pub struct LlmConfig {
    /// Model name.
    pub model: Option<String>,
    /// API key.
    pub api_key: Option<SecretString>,
    /// Base URL of an OpenAI-compatible endpoint.
    pub base_url: Option<String>,
    /// Request timeout in milliseconds.
    pub timeout_ms: Option<u64>,
}

/// Configuration file structure (for TOML parsing).
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFile {
    /// Graph section.
    pub graph: Option<ConfigFileGraph>,
    /// Retrieval section.
    pub retrieval: Option<ConfigFileRetrieval>,
    /// LLM section.
    pub llm: Option<ConfigFileLlm>,
    /// Logging section.
    pub logging: Option<LoggingSettings>,
}

/// Graph section in config file.
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFileGraph {
    /// Backend name: "memory" or "neo4j".
    pub provider: Option<String>,
    /// Neo4j subsection.
    pub neo4j: Option<ConfigFileNeo4j>,
}

/// Neo4j subsection in config file.
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFileNeo4j {
    /// Base URL.
    pub url: Option<String>,
    /// Database name.
    pub database: Option<String>,
    /// Username.
    pub username: Option<String>,
    /// Password.
    pub password: Option<String>,
    /// Request timeout.
    pub timeout_ms: Option<u64>,
    /// Connect timeout.
    pub connect_timeout_ms: Option<u64>,
}

/// Retrieval section in config file.
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFileRetrieval {
    /// Prompt directory.
    pub prompts_dir: Option<String>,
    /// User prompt template path.
    pub user_prompt_path: Option<String>,
    /// System prompt template path.
    pub system_prompt_path: Option<String>,
}

/// LLM section in config file.
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFileLlm {
    /// Model name.
    pub model: Option<String>,
    /// API key.
    pub api_key: Option<String>,
    /// Base URL.
    pub base_url: Option<String>,
    /// Request timeout.
    pub timeout_ms: Option<u64>,
}

impl GraphRecallConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a file path, then applies environment overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from_file(path: &Path) -> crate::Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            crate::Error::operation("read_config_file", format!("{}: {e}", path.display()))
        })?;

        let mut config = Self::from_toml(&contents)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parses configuration from a TOML string without environment overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is malformed or names an unknown backend.
    pub fn from_toml(contents: &str) -> crate::Result<Self> {
        let file: ConfigFile = toml::from_str(contents)
            .map_err(|e| crate::Error::operation("parse_config_file", e))?;
        Self::from_config_file(file)
    }

    /// Loads configuration from the default location.
    ///
    /// Checks `<platform config dir>/graphrecall/config.toml`, then
    /// `~/.config/graphrecall/config.toml`. Falls back to defaults (with
    /// environment overrides) if neither exists or loads.
    #[must_use]
    pub fn load_default() -> Self {
        if let Some(base_dirs) = directories::BaseDirs::new() {
            let candidates = [
                base_dirs.config_dir().join("graphrecall").join("config.toml"),
                base_dirs
                    .home_dir()
                    .join(".config")
                    .join("graphrecall")
                    .join("config.toml"),
            ];
            for path in candidates.iter().filter(|p| p.exists()) {
                match Self::load_from_file(path) {
                    Ok(config) => return config,
                    Err(e) => tracing::warn!(path = %path.display(), "ignoring config file: {e}"),
                }
            }
        }

        let mut config = Self::default();
        config.apply_env_overrides();
        config
    }

    /// Converts a `ConfigFile` to `GraphRecallConfig`.
    fn from_config_file(file: ConfigFile) -> crate::Result<Self> {
        let mut config = Self::default();

        if let Some(graph) = file.graph {
            if let Some(provider) = graph.provider {
                config.graph.provider = parse_provider(&provider)?;
            }
            if let Some(neo4j) = graph.neo4j {
                let target = &mut config.graph.neo4j;
                if let Some(url) = neo4j.url {
                    target.url = url;
                }
                if let Some(database) = neo4j.database {
                    target.database = database;
                }
                target.username = neo4j.username;
                target.password = neo4j.password.map(SecretString::from);
                target.timeout_ms = neo4j.timeout_ms;
                target.connect_timeout_ms = neo4j.connect_timeout_ms;
            }
        }
        if let Some(retrieval) = file.retrieval {
            if let Some(dir) = retrieval.prompts_dir {
                config.retrieval.prompts_dir = PathBuf::from(dir);
            }
            if let Some(path) = retrieval.user_prompt_path {
                config.retrieval.user_prompt_path = path;
            }
            if let Some(path) = retrieval.system_prompt_path {
                config.retrieval.system_prompt_path = path;
            }
        }
        if let Some(llm) = file.llm {
            config.llm.model = llm.model;
            config.llm.api_key = llm.api_key.map(SecretString::from);
            config.llm.base_url = llm.base_url;
            config.llm.timeout_ms = llm.timeout_ms;
        }
        if let Some(logging) = file.logging {
            config.logging = logging;
        }

        Ok(config)
    }

    /// Applies overrides from process environment variables.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    /// Applies overrides from an arbitrary variable lookup.
    ///
    /// Unknown provider names are logged and ignored.
    pub fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(provider) = lookup("GRAPHRECALL_GRAPH_PROVIDER") {
            match parse_provider(&provider) {
                Ok(kind) => self.graph.provider = kind,
                Err(e) => tracing::warn!("ignoring GRAPHRECALL_GRAPH_PROVIDER: {e}"),
            }
        }
        if let Some(url) = lookup("GRAPHRECALL_NEO4J_URL") {
            self.graph.neo4j.url = url;
        }
        if let Some(database) = lookup("GRAPHRECALL_NEO4J_DATABASE") {
            self.graph.neo4j.database = database;
        }
        if let Some(username) = lookup("GRAPHRECALL_NEO4J_USERNAME") {
            self.graph.neo4j.username = Some(username);
        }
        if let Some(password) = lookup("GRAPHRECALL_NEO4J_PASSWORD") {
            self.graph.neo4j.password = Some(SecretString::from(password));
        }
        if let Some(dir) = lookup("GRAPHRECALL_PROMPTS_DIR") {
            self.retrieval.prompts_dir = PathBuf::from(dir);
        }
        if let Some(model) = lookup("GRAPHRECALL_LLM_MODEL") {
            self.llm.model = Some(model);
        }
        if let Some(base_url) = lookup("GRAPHRECALL_LLM_BASE_URL") {
            self.llm.base_url = Some(base_url);
        }
        if self.llm.api_key.is_none()
            && let Some(key) = lookup("OPENAI_API_KEY")
        {
            self.llm.api_key = Some(SecretString::from(key));
        }
        if let Some(format) = lookup("GRAPHRECALL_LOG_FORMAT") {
            self.logging.format = Some(format);
        }
        if let Some(file) = lookup("GRAPHRECALL_LOG_FILE") {
            self.logging.file = Some(PathBuf::from(file));
        }
    }
}

fn parse_provider(name: &str) -> crate::Result<BackendKind> {
    BackendKind::parse(name)
        .ok_or_else(|| crate::Error::InvalidInput(format!("unknown graph provider: {name}")))
}
