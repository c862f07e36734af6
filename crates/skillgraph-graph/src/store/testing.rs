//! Memory store wrapper that injects write failures and hides path results.

use std::collections::BTreeSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use skillgraph_core::{OntologyStatus, SkillGraphError, SkillGraphResult, SkillNode, SkillRelation};

use super::memory::MemoryGraphStore;
use super::GraphStore;
use crate::model::{GraphCounts, JobNode, MatchPath, ResumeNode, SkillLink};

#[derive(Default)]
pub struct FaultyStore {
    pub inner: MemoryGraphStore,
    /// Relation writes with this skill at either end fail.
    pub reject_relations_with: Option<String>,
    /// `match_paths` comes back empty.
    pub hide_paths: bool,
}

#[async_trait]
impl GraphStore for FaultyStore {
    async fn sync_resume(&self, node: &ResumeNode, skills: &[String]) -> SkillGraphResult<usize> {
        self.inner.sync_resume(node, skills).await
    }

    async fn sync_job(&self, node: &JobNode, skills: &[String]) -> SkillGraphResult<usize> {
        self.inner.sync_job(node, skills).await
    }

    async fn delete_resume(&self, id: &str) -> SkillGraphResult<bool> {
        self.inner.delete_resume(id).await
    }

    async fn delete_job(&self, id: &str) -> SkillGraphResult<bool> {
        self.inner.delete_job(id).await
    }

    async fn resume(&self, id: &str) -> SkillGraphResult<Option<(ResumeNode, BTreeSet<String>)>> {
        self.inner.resume(id).await
    }

    async fn job(&self, id: &str) -> SkillGraphResult<Option<(JobNode, BTreeSet<String>)>> {
        self.inner.job(id).await
    }

    async fn jobs_requiring_any(&self, skills: &[String]) -> SkillGraphResult<Vec<(JobNode, BTreeSet<String>)>> {
        self.inner.jobs_requiring_any(skills).await
    }

    async fn resumes_holding_any(&self, skills: &[String]) -> SkillGraphResult<Vec<(ResumeNode, BTreeSet<String>)>> {
        self.inner.resumes_holding_any(skills).await
    }

    async fn neighbors(&self, skills: &[String]) -> SkillGraphResult<Vec<SkillLink>> {
        self.inner.neighbors(skills).await
    }

    async fn skills(&self, names: &[String]) -> SkillGraphResult<Vec<SkillNode>> {
        self.inner.skills(names).await
    }

    async fn all_skill_names(&self) -> SkillGraphResult<Vec<String>> {
        self.inner.all_skill_names().await
    }

    async fn write_relation(&self, relation: &SkillRelation) -> SkillGraphResult<()> {
        if let Some(skill) = &self.reject_relations_with {
            if &relation.from == skill || &relation.to == skill {
                return Err(SkillGraphError::persistence(format!("write rejected for '{}'", skill)));
            }
        }
        self.inner.write_relation(relation).await
    }

    async fn set_skill_status(&self, name: &str, status: OntologyStatus, at: DateTime<Utc>) -> SkillGraphResult<()> {
        self.inner.set_skill_status(name, status, at).await
    }

    async fn reset_skill_statuses(&self) -> SkillGraphResult<usize> {
        self.inner.reset_skill_statuses().await
    }

    async fn match_paths(&self, resume_id: &str, job_id: &str, limit: usize) -> SkillGraphResult<Vec<MatchPath>> {
        if self.hide_paths {
            return Ok(Vec::new());
        }
        self.inner.match_paths(resume_id, job_id, limit).await
    }

    async fn shared_skills(&self, resume_id: &str, job_id: &str) -> SkillGraphResult<Vec<String>> {
        self.inner.shared_skills(resume_id, job_id).await
    }

    async fn counts(&self) -> SkillGraphResult<GraphCounts> {
        self.inner.counts().await
    }
}
