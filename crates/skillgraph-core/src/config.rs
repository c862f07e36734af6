//! Runtime configuration: TOML file with environment overrides.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use crate::error::{SkillGraphError, SkillGraphResult};

/// Config file looked up in the working directory when none is given.
pub const DEFAULT_CONFIG_FILE: &str = "skillgraph.toml";

/// Upper bound on relations requested per skill.
pub const MAX_RELATIONS_PER_SKILL: usize = 5;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SkillGraphConfig {
    pub graph: GraphConfig,
    pub records: RecordsConfig,
    pub inference: InferenceConfig,
    pub ontology: OntologyConfig,
    pub matching: MatchingConfig,
}

/// Connection settings for Neo4j.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    pub uri: String,
    pub user: String,
    pub password: String,
    pub database: String,
    pub max_connections: usize,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            uri: "bolt://localhost:7687".to_string(),
            user: "neo4j".to_string(),
            password: "skillgraph_dev".to_string(),
            database: "neo4j".to_string(),
            max_connections: 4,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RecordBackend {
    #[default]
    Redis,
    Memory,
}

/// System-of-record settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RecordsConfig {
    pub backend: RecordBackend,
    pub redis_url: String,
}

impl Default for RecordsConfig {
    fn default() -> Self {
        Self {
            backend: RecordBackend::Redis,
            redis_url: "redis://127.0.0.1:6379".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum InferenceProvider {
    #[default]
    Ollama,
    File,
}

/// Knowledge inference settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct InferenceConfig {
    pub provider: InferenceProvider,
    pub url: String,
    pub model: String,
    pub timeout_secs: u64,
    /// Seed table for the `file` provider.
    pub seed_path: Option<PathBuf>,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            provider: InferenceProvider::Ollama,
            url: "http://localhost:11434".to_string(),
            model: "llama3.1".to_string(),
            timeout_secs: 60,
            seed_path: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ExpansionMode {
    /// Expand inside the ingestion call.
    #[default]
    Inline,
    /// Hand skills to the background worker queue.
    Background,
}

/// Ontology expansion settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OntologyConfig {
    pub max_relations: usize,
    /// Pause between consecutive inference calls.
    pub call_delay_ms: u64,
    pub max_attempts: u32,
    pub initial_backoff_ms: u64,
    pub batch_deadline_secs: Option<u64>,
    pub mode: ExpansionMode,
}

impl Default for OntologyConfig {
    fn default() -> Self {
        Self {
            max_relations: MAX_RELATIONS_PER_SKILL,
            call_delay_ms: 1000,
            max_attempts: 3,
            initial_backoff_ms: 500,
            batch_deadline_secs: None,
            mode: ExpansionMode::Inline,
        }
    }
}

impl OntologyConfig {
    pub fn call_delay(&self) -> Duration {
        Duration::from_millis(self.call_delay_ms)
    }

    pub fn initial_backoff(&self) -> Duration {
        Duration::from_millis(self.initial_backoff_ms)
    }

    pub fn batch_deadline(&self) -> Option<Duration> {
        self.batch_deadline_secs.map(Duration::from_secs)
    }
}

/// Matching settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MatchingConfig {
    pub default_limit: usize,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self { default_limit: 5 }
    }
}

impl SkillGraphConfig {
    /// Load configuration.
    ///
    /// An explicit path must exist. Without one, `skillgraph.toml` in the
    /// working directory is used when present, defaults otherwise.
    /// Environment variables are applied last.
    pub fn load(path: Option<&Path>) -> SkillGraphResult<Self> {
        let mut config = match path {
            Some(p) => Self::from_file(p)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_FILE))?
            }
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        debug!(
            graph = %config.graph.uri,
            records = ?config.records.backend,
            inference = ?config.inference.provider,
            "Configuration loaded"
        );
        Ok(config)
    }

    /// Parse a TOML file without environment overrides.
    pub fn from_file(path: &Path) -> SkillGraphResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            SkillGraphError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> SkillGraphResult<Self> {
        toml::from_str(content).map_err(|e| SkillGraphError::Config(e.to_string()))
    }

    /// Override connection settings from environment-style lookups.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("NEO4J_URI") {
            self.graph.uri = v;
        }
        if let Some(v) = lookup("NEO4J_USER") {
            self.graph.user = v;
        }
        if let Some(v) = lookup("NEO4J_PASSWORD") {
            self.graph.password = v;
        }
        if let Some(v) = lookup("NEO4J_DATABASE") {
            self.graph.database = v;
        }
        if let Some(v) = lookup("REDIS_URL") {
            self.records.redis_url = v;
        }
        if let Some(v) = lookup("OLLAMA_URL") {
            self.inference.url = v;
        }
        if let Some(v) = lookup("OLLAMA_MODEL") {
            self.inference.model = v;
        }
    }

    /// Reject settings no component can work with.
    pub fn validate(&self) -> SkillGraphResult<()> {
        if self.ontology.max_relations == 0 || self.ontology.max_relations > MAX_RELATIONS_PER_SKILL {
            return Err(SkillGraphError::Config(format!(
                "ontology.max_relations must be between 1 and {}",
                MAX_RELATIONS_PER_SKILL
            )));
        }
        if self.ontology.max_attempts == 0 {
            return Err(SkillGraphError::Config("ontology.max_attempts must be at least 1".into()));
        }
        if self.inference.provider == InferenceProvider::File && self.inference.seed_path.is_none() {
            return Err(SkillGraphError::Config(
                "inference.seed_path is required for the file provider".into(),
            ));
        }
        Ok(())
    }
}
