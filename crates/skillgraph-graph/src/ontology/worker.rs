//! Background expansion worker.
//!
//! Ingestion hands newly seen skills to a bounded queue; one task drains it
//! and runs the expander batch by batch, so ingestion does not wait on the
//! inference service.

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use skillgraph_core::{SkillGraphError, SkillGraphResult};

use super::OntologyExpander;

/// Handle to a running expansion task.
pub struct ExpansionWorker {
    sender: mpsc::Sender<Vec<String>>,
    handle: JoinHandle<()>,
}

impl ExpansionWorker {
    /// Spawn the worker on the current tokio runtime.
    pub fn spawn(expander: OntologyExpander, capacity: usize) -> Self {
        let (sender, mut receiver) = mpsc::channel::<Vec<String>>(capacity.max(1));

        let handle = tokio::spawn(async move {
            while let Some(batch) = receiver.recv().await {
                debug!(skills = batch.len(), "Expansion batch dequeued");
                match expander.expand(&batch).await {
                    Ok(report) => info!(
                        relations = report.relations_added,
                        succeeded = report.skills_succeeded.len(),
                        failed = report.skills_failed.len(),
                        "Background expansion batch done"
                    ),
                    Err(e) => warn!(error = %e, "Background expansion batch failed"),
                }
            }
            debug!("Expansion worker stopped");
        });

        Self { sender, handle }
    }

    /// Queue a batch of skill names. Waits while the queue is full.
    pub async fn enqueue(&self, skills: Vec<String>) -> SkillGraphResult<()> {
        if skills.is_empty() {
            return Ok(());
        }
        self.sender
            .send(skills)
            .await
            .map_err(|_| SkillGraphError::external("expansion worker has stopped"))
    }

    /// Close the queue and wait for queued batches to finish.
    pub async fn shutdown(self) -> SkillGraphResult<()> {
        drop(self.sender);
        self.handle
            .await
            .map_err(|e| SkillGraphError::external(format!("expansion worker panicked: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use skillgraph_core::{FileInference, OntologyStatus, RelationCandidate};

    use super::*;
    use crate::ontology::ExpansionSettings;
    use crate::store::memory::MemoryGraphStore;
    use crate::store::GraphStore;

    #[tokio::test]
    async fn test_queued_batches_finish_before_shutdown_returns() {
        let store = Arc::new(MemoryGraphStore::new());
        let inference = FileInference::new("table").with(
            "rust",
            vec![RelationCandidate::new("rust", "systems programming", "IS_A", 0.85)],
        );
        let expander = OntologyExpander::new(store.clone(), Arc::new(inference), ExpansionSettings::immediate());

        let worker = ExpansionWorker::spawn(expander, 4);
        worker.enqueue(vec!["Rust".to_string()]).await.unwrap();
        worker.enqueue(Vec::new()).await.unwrap();
        worker.shutdown().await.unwrap();

        let skills = store.skills(&["rust".to_string()]).await.unwrap();
        assert_eq!(skills[0].ontology_status, OntologyStatus::Success);
        assert_eq!(store.counts().await.unwrap().relation_edges, 1);
    }
}
