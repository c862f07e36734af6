//! Neo4j connection handle.

use anyhow::{Context, Result};
use neo4rs::{ConfigBuilder, Graph, Query, Row};
use serde::de::DeserializeOwned;
use tracing::debug;

use skillgraph_core::config::GraphConfig;

/// Rows pulled per round trip.
const FETCH_SIZE: usize = 200;

/// Pooled Neo4j connection. Cloning shares the pool.
#[derive(Clone)]
pub struct GraphClient {
    graph: Graph,
}

impl GraphClient {
    /// Build the pool and run a `RETURN 1` ping, so an unreachable server
    /// fails here rather than on the first real query.
    pub async fn connect(config: &GraphConfig) -> Result<Self> {
        let neo4j_config = ConfigBuilder::default()
            .uri(&config.uri)
            .user(&config.user)
            .password(&config.password)
            .db(config.database.as_str())
            .max_connections(config.max_connections)
            .fetch_size(FETCH_SIZE)
            .build()
            .context("Invalid Neo4j settings")?;

        let graph = Graph::connect(neo4j_config)
            .await
            .with_context(|| format!("Failed to connect to Neo4j at {}", config.uri))?;
        graph
            .run(Query::new("RETURN 1".to_string()))
            .await
            .context("Neo4j is not responding to queries")?;

        debug!(uri = %config.uri, database = %config.database, "Neo4j pool ready");
        Ok(Self { graph })
    }

    /// Run a statement and discard its result.
    pub async fn execute(&self, query: Query) -> Result<()> {
        self.graph.run(query).await.context("Neo4j statement failed")
    }

    /// Run a query and collect every row.
    pub async fn query(&self, query: Query) -> Result<Vec<Row>> {
        let mut stream = self.graph.execute(query).await.context("Neo4j query failed")?;

        let mut rows = Vec::new();
        while let Some(row) = stream.next().await.context("Failed to read Neo4j row")? {
            rows.push(row);
        }
        Ok(rows)
    }

    /// `field` of the first row, if any row came back.
    pub async fn query_scalar<T: DeserializeOwned>(&self, query: Query, field: &str) -> Result<Option<T>> {
        let Some(row) = self.query(query).await?.into_iter().next() else {
            return Ok(None);
        };
        let value = row
            .get::<T>(field)
            .map_err(|e| anyhow::anyhow!("Failed to read field '{}': {:?}", field, e))?;
        Ok(Some(value))
    }

    /// Run `queries` in one transaction; any failure rolls all of them back.
    pub async fn run_in_transaction(&self, queries: Vec<Query>) -> Result<()> {
        let mut txn = self
            .graph
            .start_txn()
            .await
            .context("Failed to open Neo4j transaction")?;

        for query in queries {
            if let Err(e) = txn.run(query).await {
                txn.rollback().await.ok();
                return Err(e).context("Neo4j transaction statement failed");
            }
        }

        txn.commit().await.context("Failed to commit Neo4j transaction")
    }
}
