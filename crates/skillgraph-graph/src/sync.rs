//! Record to graph synchronization.
//!
//! Mirrors canonical resumes and jobs onto graph nodes and replaces their
//! skill edges. Skills are normalized and deduplicated before they reach
//! the store.

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use skillgraph_core::{normalize_skills, JobRecord, ResumeRecord, SkillGraphError, SkillGraphResult};

use crate::model::{JobNode, ResumeNode};
use crate::store::GraphStore;

/// Result of a sync operation.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SyncResult {
    pub nodes_synced: usize,
    pub edges_written: usize,
    /// Normalized skill names linked by this sync.
    pub skills: Vec<String>,
}

impl SyncResult {
    pub fn merge(&mut self, other: &SyncResult) {
        self.nodes_synced += other.nodes_synced;
        self.edges_written += other.edges_written;
        for skill in &other.skills {
            if !self.skills.contains(skill) {
                self.skills.push(skill.clone());
            }
        }
    }
}

/// Writes records into the graph store.
#[derive(Clone)]
pub struct GraphSynchronizer {
    store: Arc<dyn GraphStore>,
}

impl GraphSynchronizer {
    pub fn new(store: Arc<dyn GraphStore>) -> Self {
        Self { store }
    }

    /// Upsert a resume node and replace its `HAS` edges.
    pub async fn sync_resume(&self, record: &ResumeRecord) -> SkillGraphResult<SyncResult> {
        if record.id.trim().is_empty() {
            return Err(SkillGraphError::validation("resume id must not be empty"));
        }

        let skills = normalize_skills(&record.skills);
        if skills.is_empty() {
            warn!(resume_id = %record.id, "Resume has no usable skills");
        }

        let node = ResumeNode::from_record(record);
        let edges = self.store.sync_resume(&node, &skills).await?;
        info!(resume_id = %record.id, skills = edges, "Resume synced");

        Ok(SyncResult {
            nodes_synced: 1,
            edges_written: edges,
            skills,
        })
    }

    /// Upsert a job node and replace its `REQUIRES` edges.
    pub async fn sync_job(&self, record: &JobRecord) -> SkillGraphResult<SyncResult> {
        if record.id.trim().is_empty() {
            return Err(SkillGraphError::validation("job id must not be empty"));
        }

        let skills = normalize_skills(&record.skills);
        if skills.is_empty() {
            warn!(job_id = %record.id, "Job has no usable skills");
        }

        let node = JobNode::from_record(record);
        let edges = self.store.sync_job(&node, &skills).await?;
        info!(job_id = %record.id, skills = edges, "Job synced");

        Ok(SyncResult {
            nodes_synced: 1,
            edges_written: edges,
            skills,
        })
    }

    pub async fn delete_resume(&self, id: &str) -> SkillGraphResult<bool> {
        let removed = self.store.delete_resume(id).await?;
        info!(resume_id = id, removed, "Resume removed from graph");
        Ok(removed)
    }

    pub async fn delete_job(&self, id: &str) -> SkillGraphResult<bool> {
        let removed = self.store.delete_job(id).await?;
        info!(job_id = id, removed, "Job removed from graph");
        Ok(removed)
    }
}
