//! Process-local graph store.
//!
//! Holds the whole graph behind one `RwLock`; every write operation runs
//! under a single write guard, so a sync is atomic with respect to readers.

use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use skillgraph_core::{OntologyStatus, RelationType, SkillGraphResult, SkillNode, SkillRelation};

use super::GraphStore;
use crate::model::{GraphCounts, JobNode, LinkDirection, MatchPath, ResumeNode, SkillLink};

#[derive(Debug, Clone)]
struct EdgeProps {
    confidence: f64,
    source: String,
    updated_at: String,
}

#[derive(Default)]
struct GraphState {
    skills: BTreeMap<String, SkillNode>,
    resumes: BTreeMap<String, ResumeNode>,
    jobs: BTreeMap<String, JobNode>,
    has: BTreeMap<String, BTreeSet<String>>,
    requires: BTreeMap<String, BTreeSet<String>>,
    relations: BTreeMap<(String, String, RelationType), EdgeProps>,
}

impl GraphState {
    fn merge_skill(&mut self, name: &str) {
        self.skills
            .entry(name.to_string())
            .or_insert_with(|| SkillNode::new(name));
    }

    fn link_skills(&mut self, skills: &[String]) -> BTreeSet<String> {
        for name in skills {
            self.merge_skill(name);
        }
        skills.iter().cloned().collect()
    }

    fn links_from(&self, skill: &str) -> Vec<SkillLink> {
        let mut links = Vec::new();
        for ((from, to, relation), props) in &self.relations {
            let (other, direction) = if from == skill {
                (to, LinkDirection::Outgoing)
            } else if to == skill && *relation == RelationType::IsA {
                (from, LinkDirection::Incoming)
            } else {
                continue;
            };
            links.push(SkillLink {
                skill: skill.to_string(),
                other: other.clone(),
                relation: *relation,
                direction,
                confidence: props.confidence,
                source: props.source.clone(),
                updated_at: props.updated_at.clone(),
            });
        }
        links
    }
}

/// In-memory `GraphStore`.
#[derive(Default)]
pub struct MemoryGraphStore {
    state: RwLock<GraphState>,
}

impl MemoryGraphStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl GraphStore for MemoryGraphStore {
    async fn sync_resume(&self, node: &ResumeNode, skills: &[String]) -> SkillGraphResult<usize> {
        let mut state = self.state.write().await;
        state.resumes.insert(node.id.clone(), node.clone());
        let linked = state.link_skills(skills);
        let count = linked.len();
        state.has.insert(node.id.clone(), linked);
        Ok(count)
    }

    async fn sync_job(&self, node: &JobNode, skills: &[String]) -> SkillGraphResult<usize> {
        let mut state = self.state.write().await;
        state.jobs.insert(node.id.clone(), node.clone());
        let linked = state.link_skills(skills);
        let count = linked.len();
        state.requires.insert(node.id.clone(), linked);
        Ok(count)
    }

    async fn delete_resume(&self, id: &str) -> SkillGraphResult<bool> {
        let mut state = self.state.write().await;
        state.has.remove(id);
        Ok(state.resumes.remove(id).is_some())
    }

    async fn delete_job(&self, id: &str) -> SkillGraphResult<bool> {
        let mut state = self.state.write().await;
        state.requires.remove(id);
        Ok(state.jobs.remove(id).is_some())
    }

    async fn resume(&self, id: &str) -> SkillGraphResult<Option<(ResumeNode, BTreeSet<String>)>> {
        let state = self.state.read().await;
        Ok(state.resumes.get(id).map(|node| {
            (node.clone(), state.has.get(id).cloned().unwrap_or_default())
        }))
    }

    async fn job(&self, id: &str) -> SkillGraphResult<Option<(JobNode, BTreeSet<String>)>> {
        let state = self.state.read().await;
        Ok(state.jobs.get(id).map(|node| {
            (node.clone(), state.requires.get(id).cloned().unwrap_or_default())
        }))
    }

    async fn jobs_requiring_any(&self, skills: &[String]) -> SkillGraphResult<Vec<(JobNode, BTreeSet<String>)>> {
        let state = self.state.read().await;
        Ok(state
            .requires
            .iter()
            .filter(|(_, required)| skills.iter().any(|s| required.contains(s)))
            .filter_map(|(id, required)| state.jobs.get(id).map(|node| (node.clone(), required.clone())))
            .collect())
    }

    async fn resumes_holding_any(&self, skills: &[String]) -> SkillGraphResult<Vec<(ResumeNode, BTreeSet<String>)>> {
        let state = self.state.read().await;
        Ok(state
            .has
            .iter()
            .filter(|(_, held)| skills.iter().any(|s| held.contains(s)))
            .filter_map(|(id, held)| state.resumes.get(id).map(|node| (node.clone(), held.clone())))
            .collect())
    }

    async fn neighbors(&self, skills: &[String]) -> SkillGraphResult<Vec<SkillLink>> {
        let state = self.state.read().await;
        let unique: BTreeSet<&String> = skills.iter().collect();
        Ok(unique.into_iter().flat_map(|s| state.links_from(s)).collect())
    }

    async fn skills(&self, names: &[String]) -> SkillGraphResult<Vec<SkillNode>> {
        let state = self.state.read().await;
        Ok(names.iter().filter_map(|n| state.skills.get(n).cloned()).collect())
    }

    async fn all_skill_names(&self) -> SkillGraphResult<Vec<String>> {
        Ok(self.state.read().await.skills.keys().cloned().collect())
    }

    async fn write_relation(&self, relation: &SkillRelation) -> SkillGraphResult<()> {
        let mut state = self.state.write().await;
        state.merge_skill(&relation.from);
        state.merge_skill(&relation.to);
        for edge in relation.stored_edges() {
            state.relations.insert(
                (edge.from, edge.to, edge.relation),
                EdgeProps {
                    confidence: edge.confidence,
                    source: edge.source,
                    updated_at: edge.updated_at.to_rfc3339(),
                },
            );
        }
        Ok(())
    }

    async fn set_skill_status(&self, name: &str, status: OntologyStatus, at: DateTime<Utc>) -> SkillGraphResult<()> {
        let mut state = self.state.write().await;
        if let Some(skill) = state.skills.get_mut(name) {
            skill.ontology_status = status;
            skill.last_processed_at = Some(at);
        }
        Ok(())
    }

    async fn reset_skill_statuses(&self) -> SkillGraphResult<usize> {
        let mut state = self.state.write().await;
        for skill in state.skills.values_mut() {
            skill.ontology_status = OntologyStatus::Unprocessed;
        }
        Ok(state.skills.len())
    }

    async fn match_paths(&self, resume_id: &str, job_id: &str, limit: usize) -> SkillGraphResult<Vec<MatchPath>> {
        let state = self.state.read().await;
        let (Some(held), Some(required)) = (state.has.get(resume_id), state.requires.get(job_id)) else {
            return Ok(Vec::new());
        };

        let mut paths: Vec<MatchPath> = held.intersection(required).map(|s| MatchPath::direct(s)).collect();

        let mut related: Vec<MatchPath> = Vec::new();
        for candidate in held {
            for link in state.links_from(candidate) {
                if required.contains(&link.other) && !held.contains(&link.other) {
                    related.push(MatchPath::related(candidate, &link.other, &link));
                }
            }
        }
        related.sort_by(|a, b| {
            (&a.job_skill, &a.candidate_skill).cmp(&(&b.job_skill, &b.candidate_skill))
        });

        paths.extend(related);
        paths.truncate(limit);
        Ok(paths)
    }

    async fn shared_skills(&self, resume_id: &str, job_id: &str) -> SkillGraphResult<Vec<String>> {
        let state = self.state.read().await;
        match (state.has.get(resume_id), state.requires.get(job_id)) {
            (Some(held), Some(required)) => Ok(held.intersection(required).cloned().collect()),
            _ => Ok(Vec::new()),
        }
    }

    async fn counts(&self) -> SkillGraphResult<GraphCounts> {
        let state = self.state.read().await;
        let by_status = |status: OntologyStatus| {
            state.skills.values().filter(|s| s.ontology_status == status).count()
        };
        let by_relation = |kind: RelationType| state.relations.keys().filter(|(_, _, r)| *r == kind).count();
        Ok(GraphCounts {
            skills: state.skills.len(),
            resumes: state.resumes.len(),
            jobs: state.jobs.len(),
            has_edges: state.has.values().map(BTreeSet::len).sum(),
            requires_edges: state.requires.values().map(BTreeSet::len).sum(),
            relation_edges: state.relations.len(),
            related_to_edges: by_relation(RelationType::RelatedTo),
            is_a_edges: by_relation(RelationType::IsA),
            skills_unprocessed: by_status(OntologyStatus::Unprocessed),
            skills_success: by_status(OntologyStatus::Success),
            skills_failed: by_status(OntologyStatus::Failed),
        })
    }
}
