//! Node, edge and path shapes returned by the graph store.

use serde::Serialize;

use skillgraph_core::{JobRecord, RelationType, ResumeRecord};

/// Display subset of a résumé mirrored onto its graph node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResumeNode {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub summary: String,
    pub file_ref: String,
}

impl ResumeNode {
    pub fn from_record(record: &ResumeRecord) -> Self {
        Self {
            id: record.id.clone(),
            name: record.name.clone(),
            email: record.email.clone(),
            phone: record.phone.clone(),
            summary: record.summary.clone(),
            file_ref: record.file_ref.clone().unwrap_or_default(),
        }
    }
}

/// Display subset of a job mirrored onto its graph node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobNode {
    pub id: String,
    pub title: String,
    pub link: String,
}

impl JobNode {
    pub fn from_record(record: &JobRecord) -> Self {
        Self {
            id: record.id.clone(),
            title: record.title.clone(),
            link: record.link.clone().unwrap_or_default(),
        }
    }
}

/// Direction of a relation edge relative to the skill it was reached from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkDirection {
    Outgoing,
    Incoming,
}

/// One ontology edge seen from `skill`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkillLink {
    pub skill: String,
    pub other: String,
    pub relation: RelationType,
    pub direction: LinkDirection,
    pub confidence: f64,
    pub source: String,
    pub updated_at: String,
}

/// A path of length 0 or 1 linking a held skill to a required one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchPath {
    pub candidate_skill: String,
    pub job_skill: String,
    /// `None` for a direct (length 0) match.
    pub relation: Option<RelationType>,
    pub direction: Option<LinkDirection>,
    pub confidence: Option<f64>,
}

impl MatchPath {
    pub fn direct(skill: &str) -> Self {
        Self {
            candidate_skill: skill.to_string(),
            job_skill: skill.to_string(),
            relation: None,
            direction: None,
            confidence: None,
        }
    }

    pub fn related(candidate: &str, required: &str, link: &SkillLink) -> Self {
        Self {
            candidate_skill: candidate.to_string(),
            job_skill: required.to_string(),
            relation: Some(link.relation),
            direction: Some(link.direction),
            confidence: Some(link.confidence),
        }
    }
}

/// Graph size summary.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GraphCounts {
    pub skills: usize,
    pub resumes: usize,
    pub jobs: usize,
    pub has_edges: usize,
    pub requires_edges: usize,
    /// Directed `RELATED_TO` plus `IS_A` edges.
    pub relation_edges: usize,
    pub related_to_edges: usize,
    pub is_a_edges: usize,
    pub skills_unprocessed: usize,
    pub skills_success: usize,
    pub skills_failed: usize,
}
