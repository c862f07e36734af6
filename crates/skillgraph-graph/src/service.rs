//! Application facade.
//!
//! Wires the synchronizer, expander, matcher and explainer over one graph
//! store, one record store and one inference service. Ingestion stores the
//! canonical record, mirrors it into the graph, expands the new skills and
//! returns immediate matches.

use std::sync::Arc;

use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use skillgraph_core::{JobRecord, KnowledgeInference, RecordStore, ResumeRecord, SkillGraphResult};

use crate::explain::{Explainer, MatchExplanation, SkillExploration};
use crate::matching::{MatchMode, MatchingEngine, RankedApplicant, RankedJob};
use crate::model::GraphCounts;
use crate::ontology::{ExpansionReport, ExpansionSettings, ExpansionWorker, OntologyExpander};
use crate::store::GraphStore;
use crate::sync::{GraphSynchronizer, SyncResult};

/// Default number of recommendations returned after ingestion.
pub const DEFAULT_LIMIT: usize = 5;

/// What happened to the skills of an ingested record.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum ExpansionOutcome {
    /// Expanded inline before the call returned.
    Completed(ExpansionReport),
    /// Handed to the background worker.
    Queued(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IngestResumeReport {
    pub resume_id: String,
    pub sync: SyncResult,
    pub expansion: ExpansionOutcome,
    pub recommendations: Vec<RankedJob>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IngestJobReport {
    pub job_id: String,
    pub sync: SyncResult,
    pub expansion: ExpansionOutcome,
    pub applicants: Vec<RankedApplicant>,
}

/// The skill graph engine.
pub struct SkillGraph {
    graph: Arc<dyn GraphStore>,
    records: Arc<dyn RecordStore>,
    synchronizer: GraphSynchronizer,
    expander: OntologyExpander,
    matcher: MatchingEngine,
    explainer: Explainer,
    worker: Option<ExpansionWorker>,
    default_limit: usize,
}

impl SkillGraph {
    pub fn new(
        graph: Arc<dyn GraphStore>,
        records: Arc<dyn RecordStore>,
        inference: Arc<dyn KnowledgeInference>,
        settings: ExpansionSettings,
    ) -> Self {
        Self {
            synchronizer: GraphSynchronizer::new(graph.clone()),
            expander: OntologyExpander::new(graph.clone(), inference, settings),
            matcher: MatchingEngine::new(graph.clone(), records.clone()),
            explainer: Explainer::new(graph.clone()),
            graph,
            records,
            worker: None,
            default_limit: DEFAULT_LIMIT,
        }
    }

    pub fn with_default_limit(mut self, limit: usize) -> Self {
        self.default_limit = limit;
        self
    }

    /// Expand ingested skills on a background task instead of inline.
    /// Must be called inside a tokio runtime.
    pub fn with_background_expansion(mut self, capacity: usize) -> Self {
        self.worker = Some(ExpansionWorker::spawn(self.expander.clone(), capacity));
        self
    }

    /// Create graph constraints and indexes.
    pub async fn initialize(&self) -> SkillGraphResult<()> {
        self.graph.initialize().await
    }

    async fn expand_ingested(&self, skills: &[String]) -> SkillGraphResult<ExpansionOutcome> {
        match &self.worker {
            Some(worker) => {
                worker.enqueue(skills.to_vec()).await?;
                Ok(ExpansionOutcome::Queued(skills.to_vec()))
            }
            None => Ok(ExpansionOutcome::Completed(self.expander.expand(skills).await?)),
        }
    }

    /// Store a resume, mirror it into the graph, expand its skills and
    /// recommend jobs. A record without an id gets a fresh one.
    pub async fn ingest_resume(&self, mut record: ResumeRecord, mode: MatchMode) -> SkillGraphResult<IngestResumeReport> {
        if record.id.trim().is_empty() {
            record.id = Uuid::new_v4().to_string();
        }

        self.records.upsert_resume(&record).await?;
        let sync = self.synchronizer.sync_resume(&record).await?;
        let expansion = self.expand_ingested(&sync.skills).await?;
        let recommendations = self
            .matcher
            .recommend_jobs(&record.id, self.default_limit, mode)
            .await?;

        info!(resume_id = %record.id, recommendations = recommendations.len(), "Resume ingested");
        Ok(IngestResumeReport {
            resume_id: record.id,
            sync,
            expansion,
            recommendations,
        })
    }

    /// Store a job, mirror it into the graph, expand its skills and rank
    /// applicants. A record without an id gets a fresh one.
    pub async fn ingest_job(&self, mut record: JobRecord, mode: MatchMode) -> SkillGraphResult<IngestJobReport> {
        if record.id.trim().is_empty() {
            record.id = Uuid::new_v4().to_string();
        }

        self.records.upsert_job(&record).await?;
        let sync = self.synchronizer.sync_job(&record).await?;
        let expansion = self.expand_ingested(&sync.skills).await?;
        let applicants = self.matcher.eligible_applicants(&record.id, mode).await?;

        info!(job_id = %record.id, applicants = applicants.len(), "Job ingested");
        Ok(IngestJobReport {
            job_id: record.id,
            sync,
            expansion,
            applicants,
        })
    }

    /// Mirror a resume into the graph without touching the record store.
    pub async fn sync_resume(&self, record: &ResumeRecord) -> SkillGraphResult<SyncResult> {
        self.synchronizer.sync_resume(record).await
    }

    pub async fn sync_job(&self, record: &JobRecord) -> SkillGraphResult<SyncResult> {
        self.synchronizer.sync_job(record).await
    }

    /// Remove a resume from the record store and the graph. Returns
    /// whether either held it.
    pub async fn delete_resume(&self, id: &str) -> SkillGraphResult<bool> {
        let in_records = self.records.delete_resume(id).await?;
        let in_graph = self.synchronizer.delete_resume(id).await?;
        Ok(in_records || in_graph)
    }

    pub async fn delete_job(&self, id: &str) -> SkillGraphResult<bool> {
        let in_records = self.records.delete_job(id).await?;
        let in_graph = self.synchronizer.delete_job(id).await?;
        Ok(in_records || in_graph)
    }

    pub async fn recommend_jobs(
        &self,
        resume_id: &str,
        limit: Option<usize>,
        mode: MatchMode,
    ) -> SkillGraphResult<Vec<RankedJob>> {
        self.matcher
            .recommend_jobs(resume_id, limit.unwrap_or(self.default_limit), mode)
            .await
    }

    pub async fn eligible_applicants(&self, job_id: &str, mode: MatchMode) -> SkillGraphResult<Vec<RankedApplicant>> {
        self.matcher.eligible_applicants(job_id, mode).await
    }

    pub async fn explain_match(&self, resume_id: &str, job_id: &str) -> SkillGraphResult<MatchExplanation> {
        self.explainer.explain_match(resume_id, job_id).await
    }

    pub async fn explore_skill(&self, name: &str) -> SkillGraphResult<SkillExploration> {
        self.explainer.explore_skill(name).await
    }

    /// Expand the given skills inline, whatever the ingestion mode.
    pub async fn expand_ontology(&self, skills: &[String]) -> SkillGraphResult<ExpansionReport> {
        self.expander.expand(skills).await
    }

    pub async fn rebuild_ontology(&self) -> SkillGraphResult<ExpansionReport> {
        self.expander.rebuild().await
    }

    /// Re-mirror every canonical resume and job into the graph.
    pub async fn resync_all(&self) -> SkillGraphResult<SyncResult> {
        let mut total = SyncResult::default();

        for record in self.records.list_resumes().await? {
            total.merge(&self.synchronizer.sync_resume(&record).await?);
        }
        for record in self.records.list_jobs().await? {
            total.merge(&self.synchronizer.sync_job(&record).await?);
        }

        info!(
            nodes = total.nodes_synced,
            edges = total.edges_written,
            skills = total.skills.len(),
            "Full resync complete"
        );
        Ok(total)
    }

    pub async fn counts(&self) -> SkillGraphResult<GraphCounts> {
        self.graph.counts().await
    }

    /// Drain the background worker, if any.
    pub async fn shutdown(self) -> SkillGraphResult<()> {
        match self.worker {
            Some(worker) => worker.shutdown().await,
            None => Ok(()),
        }
    }
}
