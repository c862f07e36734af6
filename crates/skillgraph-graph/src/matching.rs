//! Resume/job matching.
//!
//! Direct score counts required skills the resume holds. Expanded score
//! adds half a point for each remaining required skill reachable from a
//! held skill through one `RELATED_TO` or `IS_A` edge.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use skillgraph_core::{RecordStore, SkillGraphError, SkillGraphResult};

use crate::store::GraphStore;

/// Weight of a skill matched through one ontology hop.
pub const RELATED_WEIGHT: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    Direct,
    #[default]
    Expanded,
}

impl MatchMode {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "direct" => Some(Self::Direct),
            "expanded" => Some(Self::Expanded),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Direct => "direct",
            Self::Expanded => "expanded",
        }
    }
}

/// Score of one resume/job pair.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MatchScore {
    pub direct: usize,
    pub related: usize,
    pub weighted_score: f64,
    /// Required skills the resume holds.
    pub matched_skills: Vec<String>,
    /// Required skills reached through one ontology edge.
    pub related_skills: Vec<String>,
}

impl MatchScore {
    pub fn is_zero(&self) -> bool {
        self.direct == 0 && self.related == 0
    }
}

/// Score a pair given the resume's held skills, the job's required skills
/// and the skills reachable in one hop from the held set.
///
/// A required skill the resume holds is counted as direct only.
pub fn score_pair(
    held: &BTreeSet<String>,
    required: &BTreeSet<String>,
    reachable: &BTreeSet<String>,
    mode: MatchMode,
) -> MatchScore {
    let matched_skills: Vec<String> = required.intersection(held).cloned().collect();
    let related_skills: Vec<String> = match mode {
        MatchMode::Direct => Vec::new(),
        MatchMode::Expanded => required
            .iter()
            .filter(|q| !held.contains(*q) && reachable.contains(*q))
            .cloned()
            .collect(),
    };

    let direct = matched_skills.len();
    let related = related_skills.len();
    MatchScore {
        direct,
        related,
        weighted_score: direct as f64 + related as f64 * RELATED_WEIGHT,
        matched_skills,
        related_skills,
    }
}

/// A job ranked for a resume.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedJob {
    pub job_id: String,
    pub title: String,
    pub description: String,
    pub link: Option<String>,
    pub skills: Vec<String>,
    #[serde(flatten)]
    pub score: MatchScore,
}

/// A resume ranked for a job.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedApplicant {
    pub resume_id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub summary: String,
    pub file_ref: Option<String>,
    pub skills: Vec<String>,
    #[serde(flatten)]
    pub score: MatchScore,
}

fn by_score_then_id(a: (&MatchScore, &str), b: (&MatchScore, &str)) -> Ordering {
    b.0.weighted_score
        .total_cmp(&a.0.weighted_score)
        .then_with(|| a.1.cmp(b.1))
}

fn non_empty(s: String) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}

/// Ranks jobs for resumes and resumes for jobs.
#[derive(Clone)]
pub struct MatchingEngine {
    store: Arc<dyn GraphStore>,
    records: Arc<dyn RecordStore>,
}

impl MatchingEngine {
    pub fn new(store: Arc<dyn GraphStore>, records: Arc<dyn RecordStore>) -> Self {
        Self { store, records }
    }

    /// One-hop neighbors of each skill, keyed by the skill.
    async fn neighbor_map(&self, skills: &BTreeSet<String>) -> SkillGraphResult<BTreeMap<String, BTreeSet<String>>> {
        let names: Vec<String> = skills.iter().cloned().collect();
        let mut map: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        for link in self.store.neighbors(&names).await? {
            map.entry(link.skill).or_default().insert(link.other);
        }
        Ok(map)
    }

    fn reachable_from(held: &BTreeSet<String>, map: &BTreeMap<String, BTreeSet<String>>) -> BTreeSet<String> {
        held.iter()
            .filter_map(|h| map.get(h))
            .flat_map(|others| others.iter().cloned())
            .collect()
    }

    /// Jobs ranked for a resume, best first, at most `limit`.
    ///
    /// Ties on score are ordered by job id.
    pub async fn recommend_jobs(&self, resume_id: &str, limit: usize, mode: MatchMode) -> SkillGraphResult<Vec<RankedJob>> {
        let (_, held) = self
            .store
            .resume(resume_id)
            .await?
            .ok_or_else(|| SkillGraphError::not_found(format!("resume '{}'", resume_id)))?;

        let reachable = match mode {
            MatchMode::Direct => BTreeSet::new(),
            MatchMode::Expanded => Self::reachable_from(&held, &self.neighbor_map(&held).await?),
        };

        let probe: Vec<String> = held.union(&reachable).cloned().collect();
        if probe.is_empty() {
            return Ok(Vec::new());
        }

        let mut ranked = Vec::new();
        for (node, required) in self.store.jobs_requiring_any(&probe).await? {
            let score = score_pair(&held, &required, &reachable, mode);
            if score.is_zero() {
                continue;
            }

            let job = match self.records.find_job(&node.id).await? {
                Some(record) => RankedJob {
                    job_id: record.id,
                    title: record.title,
                    description: record.description,
                    link: record.link,
                    skills: record.skills,
                    score,
                },
                None => {
                    debug!(job_id = %node.id, "No canonical record; using graph fields");
                    RankedJob {
                        job_id: node.id,
                        title: node.title,
                        description: String::new(),
                        link: non_empty(node.link),
                        skills: required.into_iter().collect(),
                        score,
                    }
                }
            };
            ranked.push(job);
        }

        ranked.sort_by(|a, b| by_score_then_id((&a.score, &a.job_id), (&b.score, &b.job_id)));
        ranked.truncate(limit);

        info!(resume_id, mode = mode.as_str(), results = ranked.len(), "Jobs recommended");
        Ok(ranked)
    }

    /// Resumes ranked for a job, best first.
    ///
    /// Ties on score are ordered by resume id.
    pub async fn eligible_applicants(&self, job_id: &str, mode: MatchMode) -> SkillGraphResult<Vec<RankedApplicant>> {
        let (_, required) = self
            .store
            .job(job_id)
            .await?
            .ok_or_else(|| SkillGraphError::not_found(format!("job '{}'", job_id)))?;

        // Candidates hold a required skill or a skill linked to one.
        let mut probe = required.clone();
        if mode == MatchMode::Expanded {
            for others in self.neighbor_map(&required).await?.into_values() {
                probe.extend(others);
            }
        }
        if probe.is_empty() {
            return Ok(Vec::new());
        }

        let probe: Vec<String> = probe.into_iter().collect();
        let candidates = self.store.resumes_holding_any(&probe).await?;

        let neighbors = match mode {
            MatchMode::Direct => BTreeMap::new(),
            MatchMode::Expanded => {
                let all_held: BTreeSet<String> = candidates.iter().flat_map(|(_, held)| held.iter().cloned()).collect();
                self.neighbor_map(&all_held).await?
            }
        };

        let mut ranked = Vec::new();
        for (node, held) in candidates {
            let reachable = Self::reachable_from(&held, &neighbors);
            let score = score_pair(&held, &required, &reachable, mode);
            if score.is_zero() {
                continue;
            }

            let applicant = match self.records.find_resume(&node.id).await? {
                Some(record) => RankedApplicant {
                    resume_id: record.id,
                    name: record.name,
                    email: record.email,
                    phone: record.phone,
                    summary: record.summary,
                    file_ref: record.file_ref,
                    skills: record.skills,
                    score,
                },
                None => {
                    debug!(resume_id = %node.id, "No canonical record; using graph fields");
                    RankedApplicant {
                        resume_id: node.id,
                        name: node.name,
                        email: node.email,
                        phone: node.phone,
                        summary: node.summary,
                        file_ref: non_empty(node.file_ref),
                        skills: held.into_iter().collect(),
                        score,
                    }
                }
            };
            ranked.push(applicant);
        }

        ranked.sort_by(|a, b| by_score_then_id((&a.score, &a.resume_id), (&b.score, &b.resume_id)));

        info!(job_id, mode = mode.as_str(), results = ranked.len(), "Applicants ranked");
        Ok(ranked)
    }
}

#[cfg(test)]
mod tests {
    use skillgraph_core::{JobRecord, MemoryRecordStore, RelationType, SkillRelation};

    use super::*;
    use crate::model::{JobNode, ResumeNode};
    use crate::store::memory::MemoryGraphStore;

    fn set(list: &[&str]) -> BTreeSet<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn resume_node(id: &str) -> ResumeNode {
        ResumeNode {
            id: id.to_string(),
            name: format!("Candidate {}", id),
            email: String::new(),
            phone: String::new(),
            summary: String::new(),
            file_ref: String::new(),
        }
    }

    fn job_node(id: &str) -> JobNode {
        JobNode {
            id: id.to_string(),
            title: format!("Job {}", id),
            link: String::new(),
        }
    }

    async fn relate(store: &MemoryGraphStore, from: &str, to: &str, kind: RelationType) {
        let relation = SkillRelation {
            from: from.to_string(),
            to: to.to_string(),
            relation: kind,
            confidence: 0.9,
            source: "test".to_string(),
            updated_at: chrono::Utc::now(),
        };
        store.write_relation(&relation).await.unwrap();
    }

    #[test]
    fn test_direct_score_counts_overlap() {
        let score = score_pair(&set(&["python", "sql"]), &set(&["python", "sql", "java"]), &set(&[]), MatchMode::Direct);
        assert_eq!(score.direct, 2);
        assert_eq!(score.weighted_score, 2.0);
    }

    #[test]
    fn test_expanded_score_never_double_counts() {
        let held = set(&["python", "flask"]);
        let required = set(&["python", "django"]);
        // python is reachable from flask too, but held directly
        let reachable = set(&["django", "python"]);
        let score = score_pair(&held, &required, &reachable, MatchMode::Expanded);
        assert_eq!((score.direct, score.related), (1, 1));
        assert_eq!(score.weighted_score, 1.5);
        assert_eq!(score.related_skills, vec!["django"]);
    }

    #[test]
    fn test_mode_parse() {
        assert_eq!(MatchMode::parse(" Direct "), Some(MatchMode::Direct));
        assert_eq!(MatchMode::parse("expanded"), Some(MatchMode::Expanded));
        assert_eq!(MatchMode::parse("fuzzy"), None);
        assert_eq!(MatchMode::default(), MatchMode::Expanded);
    }

    #[tokio::test]
    async fn test_recommend_ranks_and_breaks_ties_by_id() {
        let store = Arc::new(MemoryGraphStore::new());
        store.sync_resume(&resume_node("r1"), &names(&["python", "flask"])).await.unwrap();
        store.sync_job(&job_node("j-b"), &names(&["python"])).await.unwrap();
        store.sync_job(&job_node("j-a"), &names(&["python"])).await.unwrap();
        store.sync_job(&job_node("j-top"), &names(&["python", "django"])).await.unwrap();
        store.sync_job(&job_node("j-none"), &names(&["cobol"])).await.unwrap();
        relate(&store, "flask", "django", RelationType::RelatedTo).await;

        let records = Arc::new(MemoryRecordStore::new());
        records
            .upsert_job(&JobRecord {
                id: "j-top".to_string(),
                title: "Django Developer".to_string(),
                description: "Web".to_string(),
                link: Some("https://jobs.example/1".to_string()),
                skills: names(&["Python", "Django"]),
            })
            .await
            .unwrap();

        let engine = MatchingEngine::new(store, records);
        let ranked = engine.recommend_jobs("r1", 10, MatchMode::Expanded).await.unwrap();

        let ids: Vec<&str> = ranked.iter().map(|r| r.job_id.as_str()).collect();
        assert_eq!(ids, vec!["j-top", "j-a", "j-b"]);
        assert_eq!(ranked[0].score.weighted_score, 1.5);
        assert_eq!(ranked[0].title, "Django Developer");
        assert_eq!(ranked[1].title, "Job j-a");

        let limited = engine.recommend_jobs("r1", 1, MatchMode::Direct).await.unwrap();
        assert_eq!(limited.len(), 1);
        assert_eq!(limited[0].score.weighted_score, 1.0);
    }

    #[tokio::test]
    async fn test_applicants_reach_through_is_a_from_parent() {
        let store = Arc::new(MemoryGraphStore::new());
        store.sync_job(&job_node("j1"), &names(&["web framework"])).await.unwrap();
        store.sync_resume(&resume_node("r1"), &names(&["django"])).await.unwrap();
        store.sync_resume(&resume_node("r2"), &names(&["web framework"])).await.unwrap();
        store.sync_resume(&resume_node("r3"), &names(&["cobol"])).await.unwrap();
        relate(&store, "django", "web framework", RelationType::IsA).await;

        let engine = MatchingEngine::new(store, Arc::new(MemoryRecordStore::new()));
        let ranked = engine.eligible_applicants("j1", MatchMode::Expanded).await.unwrap();
        let ids: Vec<&str> = ranked.iter().map(|r| r.resume_id.as_str()).collect();
        assert_eq!(ids, vec!["r2", "r1"]);
        assert_eq!(ranked[1].score.weighted_score, 0.5);

        let direct = engine.eligible_applicants("j1", MatchMode::Direct).await.unwrap();
        assert_eq!(direct.len(), 1);
    }

    #[tokio::test]
    async fn test_missing_ids_are_not_found() {
        let engine = MatchingEngine::new(Arc::new(MemoryGraphStore::new()), Arc::new(MemoryRecordStore::new()));
        assert!(engine.recommend_jobs("nope", 5, MatchMode::Expanded).await.unwrap_err().is_not_found());
        assert!(engine.eligible_applicants("nope", MatchMode::Expanded).await.unwrap_err().is_not_found());
    }
}
