//! Match explanations and ontology browsing.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, warn};

use skillgraph_core::{normalize_skill, OntologyStatus, RelationType, SkillGraphError, SkillGraphResult};

use crate::model::{LinkDirection, MatchPath, SkillLink};
use crate::store::GraphStore;

/// Maximum number of paths rendered for one match.
pub const EXPLANATION_CAP: usize = 10;

/// Paths behind a resume/job match and their sentences.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchExplanation {
    pub resume_id: String,
    pub job_id: String,
    pub paths: Vec<MatchPath>,
    pub explanations: Vec<String>,
}

/// A skill and the ontology edges around it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkillExploration {
    pub skill: String,
    pub status: OntologyStatus,
    pub last_processed_at: Option<DateTime<Utc>>,
    /// Highest confidence first.
    pub relations: Vec<SkillLink>,
}

/// How a held skill relates to a required one, as a phrase.
fn relation_phrase(relation: RelationType, direction: Option<LinkDirection>) -> &'static str {
    match (relation, direction) {
        (RelationType::RelatedTo, _) => "related to",
        (RelationType::IsA, Some(LinkDirection::Incoming)) => "a broader category of",
        (RelationType::IsA, _) => "a kind of",
    }
}

/// Render one path as a sentence.
pub fn describe_path(path: &MatchPath) -> String {
    match path.relation {
        None => format!("Direct match: skill {} matches the requirement", path.candidate_skill),
        Some(relation) => format!(
            "Related match: skill {} is {} the required skill {}",
            path.candidate_skill,
            relation_phrase(relation, path.direction),
            path.job_skill
        ),
    }
}

/// Whether `candidate` should replace `kept` for the same skill pair:
/// higher confidence first, then `IS_A` over `RELATED_TO`.
fn preferred(candidate: &MatchPath, kept: &MatchPath) -> bool {
    let rank = |path: &MatchPath| (path.confidence.unwrap_or(1.0), path.relation == Some(RelationType::IsA));
    let (candidate_confidence, candidate_is_a) = rank(candidate);
    let (kept_confidence, kept_is_a) = rank(kept);
    match candidate_confidence.total_cmp(&kept_confidence) {
        std::cmp::Ordering::Greater => true,
        std::cmp::Ordering::Less => false,
        std::cmp::Ordering::Equal => candidate_is_a && !kept_is_a,
    }
}

/// One path per (held skill, required skill) pair, in first-seen order.
fn collapse_paths(paths: Vec<MatchPath>) -> Vec<MatchPath> {
    let mut kept: Vec<MatchPath> = Vec::with_capacity(paths.len());
    for path in paths {
        let existing = kept
            .iter_mut()
            .find(|k| k.candidate_skill == path.candidate_skill && k.job_skill == path.job_skill);
        match existing {
            Some(existing) => {
                if preferred(&path, existing) {
                    *existing = path;
                }
            }
            None => kept.push(path),
        }
    }
    kept
}

#[derive(Clone)]
pub struct Explainer {
    store: Arc<dyn GraphStore>,
}

impl Explainer {
    pub fn new(store: Arc<dyn GraphStore>) -> Self {
        Self { store }
    }

    /// Explain why a resume matches a job.
    ///
    /// A held skill reaching a required one over several edges yields one
    /// sentence. Returns an empty explanation when nothing relates the two. When the
    /// pair shares skills but no path could be rebuilt, a single
    /// diagnostic sentence is returned instead.
    pub async fn explain_match(&self, resume_id: &str, job_id: &str) -> SkillGraphResult<MatchExplanation> {
        if self.store.resume(resume_id).await?.is_none() {
            return Err(SkillGraphError::not_found(format!("resume '{}'", resume_id)));
        }
        if self.store.job(job_id).await?.is_none() {
            return Err(SkillGraphError::not_found(format!("job '{}'", job_id)));
        }

        let paths = collapse_paths(self.store.match_paths(resume_id, job_id, EXPLANATION_CAP).await?);

        let mut explanations: Vec<String> = Vec::new();
        for sentence in paths.iter().map(describe_path) {
            if !explanations.contains(&sentence) {
                explanations.push(sentence);
            }
        }

        if explanations.is_empty() {
            let shared = self.store.shared_skills(resume_id, job_id).await?;
            if !shared.is_empty() {
                warn!(resume_id, job_id, shared = shared.len(), "Shared skills without match paths");
                explanations.push(format!(
                    "Resume and job share {} skill(s) ({}) but no match path could be reconstructed",
                    shared.len(),
                    shared.join(", ")
                ));
            }
        }

        debug!(resume_id, job_id, paths = paths.len(), "Match explained");
        Ok(MatchExplanation {
            resume_id: resume_id.to_string(),
            job_id: job_id.to_string(),
            paths,
            explanations,
        })
    }

    /// A skill's ontology edges for browsing.
    pub async fn explore_skill(&self, name: &str) -> SkillGraphResult<SkillExploration> {
        let skill = normalize_skill(name).ok_or_else(|| SkillGraphError::validation("skill name must not be empty"))?;

        let node = self
            .store
            .skills(std::slice::from_ref(&skill))
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| SkillGraphError::not_found(format!("skill '{}'", skill)))?;

        let mut relations = self.store.neighbors(std::slice::from_ref(&skill)).await?;
        relations.sort_by(|a, b| {
            b.confidence
                .total_cmp(&a.confidence)
                .then_with(|| a.other.cmp(&b.other))
        });

        Ok(SkillExploration {
            skill,
            status: node.ontology_status,
            last_processed_at: node.last_processed_at,
            relations,
        })
    }
}
