//! Builds the engine from configuration and tears it down again.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::info;

use skillgraph_core::config::{ExpansionMode, InferenceProvider, RecordBackend};
use skillgraph_core::{FileInference, KnowledgeInference, MemoryRecordStore, RecordStore, SkillGraphConfig};
use skillgraph_graph::{ExpansionSettings, Neo4jGraphStore, SkillGraph};
use skillgraph_inference::{OllamaClient, OllamaInference};
use skillgraph_redis::RedisRecordStore;

/// Queue depth of the background expansion worker.
const WORKER_CAPACITY: usize = 64;

/// Open handles for one CLI invocation.
pub struct Runtime {
    pub engine: SkillGraph,
    graph: Arc<Neo4jGraphStore>,
    redis: Option<Arc<RedisRecordStore>>,
}

pub fn build_inference(config: &SkillGraphConfig) -> Result<Arc<dyn KnowledgeInference>> {
    let inference: Arc<dyn KnowledgeInference> = match config.inference.provider {
        InferenceProvider::Ollama => {
            let client = OllamaClient::new(
                &config.inference.url,
                &config.inference.model,
                Duration::from_secs(config.inference.timeout_secs),
            );
            Arc::new(OllamaInference::new(client))
        }
        InferenceProvider::File => {
            let path = config
                .inference
                .seed_path
                .as_deref()
                .context("inference.seed_path is required for the file provider")?;
            let table = FileInference::from_path(path)?;
            info!(skills = table.len(), path = %path.display(), "Loaded ontology seed");
            Arc::new(table)
        }
    };
    Ok(inference)
}

impl Runtime {
    /// Connect every collaborator named in `config`.
    pub async fn open(config: &SkillGraphConfig) -> Result<Self> {
        let graph = Arc::new(
            Neo4jGraphStore::open(&config.graph)
                .await
                .context("Failed to open graph store")?,
        );

        let redis = match config.records.backend {
            RecordBackend::Redis => Some(Arc::new(
                RedisRecordStore::open(&config.records.redis_url)
                    .await
                    .context("Failed to open record store")?,
            )),
            RecordBackend::Memory => None,
        };
        let records: Arc<dyn RecordStore> = match &redis {
            Some(store) => store.clone(),
            None => Arc::new(MemoryRecordStore::new()),
        };

        let inference = build_inference(config)?;
        let settings = ExpansionSettings::from_config(&config.ontology);

        let mut engine = SkillGraph::new(graph.clone(), records, inference, settings)
            .with_default_limit(config.matching.default_limit);
        if config.ontology.mode == ExpansionMode::Background {
            engine = engine.with_background_expansion(WORKER_CAPACITY);
        }

        Ok(Self { engine, graph, redis })
    }

    /// Drain queued expansion work and release connections.
    pub async fn close(self) -> Result<()> {
        self.engine.shutdown().await?;
        if let Ok(graph) = Arc::try_unwrap(self.graph) {
            graph.close();
        }
        if let Some(Ok(redis)) = self.redis.map(Arc::try_unwrap) {
            redis.close();
        }
        Ok(())
    }
}
