//! Constraints and indexes for the skill graph.

use anyhow::{Context, Result};
use neo4rs::Query;
use tracing::{debug, info};

use crate::GraphClient;

/// Named schema objects, each created with `IF NOT EXISTS`.
const SCHEMA: &[(&str, &str)] = &[
    (
        "skill_name",
        "CREATE CONSTRAINT skill_name IF NOT EXISTS FOR (s:Skill) REQUIRE s.name IS UNIQUE",
    ),
    (
        "resume_id",
        "CREATE CONSTRAINT resume_id IF NOT EXISTS FOR (r:Resume) REQUIRE r.id IS UNIQUE",
    ),
    (
        "job_id",
        "CREATE CONSTRAINT job_id IF NOT EXISTS FOR (j:Job) REQUIRE j.id IS UNIQUE",
    ),
    // expansion batches look skills up by status
    (
        "skill_status",
        "CREATE INDEX skill_status IF NOT EXISTS FOR (s:Skill) ON (s.ontology_status)",
    ),
];

/// Create every constraint and index. Idempotent.
pub async fn initialize_schema(client: &GraphClient) -> Result<()> {
    for (name, statement) in SCHEMA {
        client
            .execute(Query::new(statement.to_string()))
            .await
            .with_context(|| format!("Failed to create schema object '{}'", name))?;
        debug!(name, "Schema object ensured");
    }

    info!(objects = SCHEMA.len(), "Graph schema ready");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_statements_are_idempotent_and_named() {
        for (name, statement) in SCHEMA {
            assert!(statement.contains("IF NOT EXISTS"));
            assert!(statement.contains(name));
        }
    }
}
