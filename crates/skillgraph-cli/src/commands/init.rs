//! Initialize the graph schema and check collaborators.

use anyhow::Result;
use colored::Colorize;
use std::time::Duration;

use skillgraph_core::config::{InferenceProvider, RecordBackend};
use skillgraph_core::SkillGraphConfig;
use skillgraph_graph::Neo4jGraphStore;
use skillgraph_inference::OllamaClient;
use skillgraph_redis::RedisRecordStore;

use crate::runtime::build_inference;

pub async fn execute(config: &SkillGraphConfig) -> Result<()> {
    println!("{}", "Initializing skill graph...".bold());

    // opening the store creates constraints and indexes
    let graph = Neo4jGraphStore::open(&config.graph).await?;
    println!("  {} Neo4j schema ready ({})", "✓".green(), config.graph.uri.dimmed());
    graph.close();

    match config.records.backend {
        RecordBackend::Redis => match RedisRecordStore::open(&config.records.redis_url).await {
            Ok(store) => {
                println!("  {} Redis reachable ({})", "✓".green(), config.records.redis_url.dimmed());
                store.close();
            }
            Err(e) => println!("  {} Redis unreachable: {}", "✗".red(), e),
        },
        RecordBackend::Memory => {
            println!("  {} In-memory record store (records are not persisted)", "!".yellow());
        }
    }

    match config.inference.provider {
        InferenceProvider::Ollama => {
            let client = OllamaClient::new(
                &config.inference.url,
                &config.inference.model,
                Duration::from_secs(config.inference.timeout_secs),
            );
            match client.health_check().await {
                Ok(true) => println!(
                    "  {} Ollama reachable ({}, model {})",
                    "✓".green(),
                    config.inference.url.dimmed(),
                    config.inference.model
                ),
                _ => println!(
                    "  {} Ollama unreachable at {}; ontology expansion will mark skills failed",
                    "✗".red(),
                    config.inference.url
                ),
            }
        }
        InferenceProvider::File => {
            build_inference(config)?;
            println!("  {} Ontology seed loaded", "✓".green());
        }
    }

    Ok(())
}
