//! Ontology expansion.
//!
//! Asks a knowledge inference service for related skills and categories,
//! validates the candidates and writes accepted relations into the graph.
//! Each skill carries an ontology status so batches are incremental and
//! failed skills are retried whenever they show up again.

pub mod worker;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info, warn};

use skillgraph_core::config::{OntologyConfig, MAX_RELATIONS_PER_SKILL};
use skillgraph_core::{
    normalize_skills, KnowledgeInference, OntologyStatus, RelationCandidate, SkillGraphResult, SkillRelation,
};

use crate::store::GraphStore;

pub use worker::ExpansionWorker;

/// Pacing and retry settings for one expander.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpansionSettings {
    pub max_relations: usize,
    pub call_delay: Duration,
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    pub batch_deadline: Option<Duration>,
}

impl Default for ExpansionSettings {
    fn default() -> Self {
        Self::from_config(&OntologyConfig::default())
    }
}

impl ExpansionSettings {
    pub fn from_config(config: &OntologyConfig) -> Self {
        Self {
            max_relations: config.max_relations.clamp(1, MAX_RELATIONS_PER_SKILL),
            call_delay: config.call_delay(),
            max_attempts: config.max_attempts.max(1),
            initial_backoff: config.initial_backoff(),
            batch_deadline: config.batch_deadline(),
        }
    }

    /// No pauses between calls or retries.
    pub fn immediate() -> Self {
        Self {
            call_delay: Duration::ZERO,
            initial_backoff: Duration::ZERO,
            ..Self::default()
        }
    }
}

/// Outcome of one expansion batch.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExpansionReport {
    /// Accepted relations written to the graph.
    pub relations_added: usize,
    pub skills_succeeded: Vec<String>,
    pub skills_failed: Vec<String>,
    /// Already expanded successfully; not sent to inference.
    pub skills_skipped: Vec<String>,
    /// Not reached before the batch deadline; status left untouched.
    pub skills_deferred: Vec<String>,
}

impl ExpansionReport {
    pub fn processed(&self) -> usize {
        self.skills_succeeded.len() + self.skills_failed.len()
    }
}

/// Expands skills into ontology relations.
#[derive(Clone)]
pub struct OntologyExpander {
    store: Arc<dyn GraphStore>,
    inference: Arc<dyn KnowledgeInference>,
    settings: ExpansionSettings,
}

impl OntologyExpander {
    pub fn new(store: Arc<dyn GraphStore>, inference: Arc<dyn KnowledgeInference>, settings: ExpansionSettings) -> Self {
        Self {
            store,
            inference,
            settings,
        }
    }

    /// Expand every skill in `skills` that is not yet marked `success`.
    ///
    /// Skills are processed one at a time with `call_delay` between calls.
    /// A failure for one skill only marks that skill `failed`; the batch
    /// always runs to completion or to the deadline.
    pub async fn expand(&self, skills: &[String]) -> SkillGraphResult<ExpansionReport> {
        let names = normalize_skills(skills);
        let mut report = ExpansionReport::default();
        if names.is_empty() {
            return Ok(report);
        }

        let statuses: HashMap<String, OntologyStatus> = self
            .store
            .skills(&names)
            .await?
            .into_iter()
            .map(|s| (s.name, s.ontology_status))
            .collect();

        let (pending, skipped): (Vec<String>, Vec<String>) = names
            .into_iter()
            .partition(|name| statuses.get(name).map_or(true, OntologyStatus::needs_expansion));
        report.skills_skipped = skipped;

        info!(
            pending = pending.len(),
            skipped = report.skills_skipped.len(),
            "Starting ontology expansion"
        );

        let started = Instant::now();
        for (index, skill) in pending.iter().enumerate() {
            if let Some(deadline) = self.settings.batch_deadline {
                if started.elapsed() >= deadline {
                    report.skills_deferred = pending[index..].to_vec();
                    warn!(
                        deferred = report.skills_deferred.len(),
                        "Expansion batch deadline reached"
                    );
                    break;
                }
            }
            if index > 0 && !self.settings.call_delay.is_zero() {
                tokio::time::sleep(self.settings.call_delay).await;
            }

            let added = self.expand_skill(skill).await;
            let status = if added > 0 {
                OntologyStatus::Success
            } else {
                OntologyStatus::Failed
            };
            if let Err(e) = self.store.set_skill_status(skill, status, Utc::now()).await {
                warn!(skill = %skill, error = %e, "Failed to record ontology status");
            }

            report.relations_added += added;
            match status {
                OntologyStatus::Success => report.skills_succeeded.push(skill.clone()),
                _ => report.skills_failed.push(skill.clone()),
            }
        }

        info!(
            relations = report.relations_added,
            succeeded = report.skills_succeeded.len(),
            failed = report.skills_failed.len(),
            deferred = report.skills_deferred.len(),
            "Ontology expansion finished"
        );
        Ok(report)
    }

    /// Reset every skill to `unprocessed` and expand the whole skill set.
    pub async fn rebuild(&self) -> SkillGraphResult<ExpansionReport> {
        let reset = self.store.reset_skill_statuses().await?;
        info!(skills = reset, "Ontology statuses reset");
        let names = self.store.all_skill_names().await?;
        self.expand(&names).await
    }

    /// Returns the number of relations written for `skill`.
    async fn expand_skill(&self, skill: &str) -> usize {
        let candidates = match self.infer_with_retry(skill).await {
            Ok(candidates) => candidates,
            Err(e) => {
                warn!(skill, error = %e, "Knowledge inference failed");
                return 0;
            }
        };

        let source = self.inference.source();
        let now = Utc::now();
        let mut written = 0;

        for candidate in candidates.iter().take(self.settings.max_relations) {
            let relation = match SkillRelation::from_candidate(candidate, skill, &source, now) {
                Ok(relation) => relation,
                Err(e) => {
                    debug!(skill, to = %candidate.to, reason = %e, "Relation rejected");
                    continue;
                }
            };

            match self.store.write_relation(&relation).await {
                Ok(()) => {
                    debug!(skill, to = %relation.to, relation = %relation.relation, "Relation written");
                    written += 1;
                }
                Err(e) => warn!(from = %relation.from, to = %relation.to, error = %e, "Failed to write relation"),
            }
        }

        written
    }

    async fn infer_with_retry(&self, skill: &str) -> SkillGraphResult<Vec<RelationCandidate>> {
        let mut attempt = 1;
        loop {
            match self.inference.infer_relations(skill, self.settings.max_relations).await {
                Ok(candidates) => return Ok(candidates),
                Err(e) if attempt < self.settings.max_attempts => {
                    // 1x, 2x, 4x ... the initial backoff
                    let delay = self.settings.initial_backoff * 2u32.saturating_pow(attempt - 1);
                    warn!(
                        skill,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "Inference attempt failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
