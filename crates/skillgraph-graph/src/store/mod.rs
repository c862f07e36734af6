//! Graph store abstraction.
//!
//! A labeled-node/typed-edge store holding `Skill`, `Resume` and `Job`
//! nodes with `HAS`, `REQUIRES`, `RELATED_TO` and `IS_A` edges. Skill names
//! passed to any method are expected to be normalized already.

pub mod memory;
pub mod neo4j;
#[cfg(test)]
pub mod testing;

use std::collections::BTreeSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use skillgraph_core::{OntologyStatus, SkillGraphResult, SkillNode, SkillRelation};

use crate::model::{GraphCounts, JobNode, MatchPath, ResumeNode, SkillLink};

/// Storage operations the synchronizer, expander, matcher and explainer need.
///
/// Relation traversal follows `RELATED_TO` edges outgoing only (they are
/// stored in both directions) and `IS_A` edges in both directions (they are
/// stored child to parent).
#[async_trait]
pub trait GraphStore: Send + Sync {
    /// Create constraints and indexes. Safe to run repeatedly.
    async fn initialize(&self) -> SkillGraphResult<()> {
        Ok(())
    }

    /// Atomically upsert the resume node, drop all of its `HAS` edges and
    /// link it to `skills` (creating missing skill nodes). Returns the
    /// number of `HAS` edges written.
    async fn sync_resume(&self, node: &ResumeNode, skills: &[String]) -> SkillGraphResult<usize>;

    /// Same as [`GraphStore::sync_resume`] for a job and its `REQUIRES` edges.
    async fn sync_job(&self, node: &JobNode, skills: &[String]) -> SkillGraphResult<usize>;

    /// Detach-delete a resume node. Returns `false` when it did not exist.
    async fn delete_resume(&self, id: &str) -> SkillGraphResult<bool>;

    /// Detach-delete a job node. Returns `false` when it did not exist.
    async fn delete_job(&self, id: &str) -> SkillGraphResult<bool>;

    /// A resume node with the skills it holds.
    async fn resume(&self, id: &str) -> SkillGraphResult<Option<(ResumeNode, BTreeSet<String>)>>;

    /// A job node with the skills it requires.
    async fn job(&self, id: &str) -> SkillGraphResult<Option<(JobNode, BTreeSet<String>)>>;

    /// Jobs requiring at least one of `skills`, each with its full requirement set.
    async fn jobs_requiring_any(&self, skills: &[String]) -> SkillGraphResult<Vec<(JobNode, BTreeSet<String>)>>;

    /// Resumes holding at least one of `skills`, each with its full skill set.
    async fn resumes_holding_any(&self, skills: &[String]) -> SkillGraphResult<Vec<(ResumeNode, BTreeSet<String>)>>;

    /// One-hop ontology edges leaving each of `skills`.
    async fn neighbors(&self, skills: &[String]) -> SkillGraphResult<Vec<SkillLink>>;

    /// Skill nodes for the given names; unknown names are omitted.
    async fn skills(&self, names: &[String]) -> SkillGraphResult<Vec<SkillNode>>;

    /// Every skill name in the graph, sorted.
    async fn all_skill_names(&self) -> SkillGraphResult<Vec<String>>;

    /// Upsert both endpoint skills and write the relation as one atomic
    /// unit. `RELATED_TO` lands as a pair of opposite edges, `IS_A` as a
    /// single child to parent edge.
    async fn write_relation(&self, relation: &SkillRelation) -> SkillGraphResult<()>;

    async fn set_skill_status(&self, name: &str, status: OntologyStatus, at: DateTime<Utc>) -> SkillGraphResult<()>;

    /// Mark every skill unprocessed. Returns the number of skills touched.
    async fn reset_skill_statuses(&self) -> SkillGraphResult<usize>;

    /// Paths of length 0 and 1 between a resume's skills and a job's
    /// requirements. Length-1 paths only target requirements the resume
    /// does not hold directly.
    async fn match_paths(&self, resume_id: &str, job_id: &str, limit: usize) -> SkillGraphResult<Vec<MatchPath>>;

    /// Skills both held by the resume and required by the job.
    async fn shared_skills(&self, resume_id: &str, job_id: &str) -> SkillGraphResult<Vec<String>>;

    async fn counts(&self) -> SkillGraphResult<GraphCounts>;
}
