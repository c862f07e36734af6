//! End-to-end behaviour of the skill graph over in-memory stores.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use skillgraph_core::{
    JobRecord, KnowledgeInference, MemoryRecordStore, OntologyStatus, RelationCandidate, ResumeRecord,
    SkillGraphError, SkillGraphResult,
};
use skillgraph_graph::{ExpansionSettings, GraphStore, MatchMode, MemoryGraphStore, SkillGraph};

/// Scripted inference: a table of answers plus skills that always fail.
#[derive(Default)]
struct ScriptedInference {
    answers: Mutex<HashMap<String, Vec<RelationCandidate>>>,
    failing: Mutex<Vec<String>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedInference {
    fn answer(&self, skill: &str, candidates: Vec<RelationCandidate>) {
        self.answers.lock().unwrap().insert(skill.to_string(), candidates);
    }

    fn fail(&self, skill: &str) {
        self.failing.lock().unwrap().push(skill.to_string());
    }

    fn heal(&self, skill: &str) {
        self.failing.lock().unwrap().retain(|s| s != skill);
    }

    fn calls_for(&self, skill: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|s| *s == skill).count()
    }
}

#[async_trait]
impl KnowledgeInference for ScriptedInference {
    fn source(&self) -> String {
        "scripted".to_string()
    }

    async fn infer_relations(&self, skill: &str, max: usize) -> SkillGraphResult<Vec<RelationCandidate>> {
        self.calls.lock().unwrap().push(skill.to_string());
        if self.failing.lock().unwrap().iter().any(|s| s == skill) {
            return Err(SkillGraphError::external("inference unavailable"));
        }
        Ok(self
            .answers
            .lock()
            .unwrap()
            .get(skill)
            .map(|c| c.iter().take(max).cloned().collect())
            .unwrap_or_default())
    }
}

struct Fixture {
    store: Arc<MemoryGraphStore>,
    inference: Arc<ScriptedInference>,
    graph: SkillGraph,
}

fn fixture() -> Fixture {
    let store = Arc::new(MemoryGraphStore::new());
    let inference = Arc::new(ScriptedInference::default());
    let graph = SkillGraph::new(
        store.clone(),
        Arc::new(MemoryRecordStore::new()),
        inference.clone(),
        ExpansionSettings {
            max_attempts: 1,
            ..ExpansionSettings::immediate()
        },
    );
    Fixture { store, inference, graph }
}

fn resume(id: &str, skills: &[&str]) -> ResumeRecord {
    ResumeRecord {
        id: id.to_string(),
        name: format!("Candidate {}", id),
        email: format!("{}@example.com", id),
        phone: String::new(),
        summary: String::new(),
        file_ref: None,
        skills: skills.iter().map(|s| s.to_string()).collect(),
        experience: Vec::new(),
        projects: Vec::new(),
    }
}

fn job(id: &str, skills: &[&str]) -> JobRecord {
    JobRecord {
        id: id.to_string(),
        title: format!("Job {}", id),
        description: String::new(),
        link: None,
        skills: skills.iter().map(|s| s.to_string()).collect(),
    }
}

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

#[tokio::test]
async fn syncing_the_same_resume_twice_is_idempotent() {
    let f = fixture();
    let record = resume("r1", &["Python", "SQL"]);

    f.graph.sync_resume(&record).await.unwrap();
    let (_, first) = f.store.resume("r1").await.unwrap().unwrap();
    f.graph.sync_resume(&record).await.unwrap();
    let (_, second) = f.store.resume("r1").await.unwrap().unwrap();

    assert_eq!(first, second);
    assert_eq!(f.graph.counts().await.unwrap().has_edges, 2);
}

#[tokio::test]
async fn case_and_whitespace_variants_collapse_to_one_skill() {
    let f = fixture();
    f.graph.sync_resume(&resume("r1", &["PYTHON", " python "])).await.unwrap();
    f.graph.sync_job(&job("j1", &["Python"])).await.unwrap();

    assert_eq!(f.store.all_skill_names().await.unwrap(), vec!["python"]);
}

#[tokio::test]
async fn self_loops_are_never_persisted() {
    let f = fixture();
    f.inference
        .answer("python", vec![RelationCandidate::new("Python", "Python", "RELATED_TO", 0.95)]);

    let report = f.graph.expand_ontology(&names(&["python"])).await.unwrap();
    assert_eq!(report.relations_added, 0);
    assert_eq!(report.skills_failed, vec!["python"]);
    assert_eq!(f.graph.counts().await.unwrap().relation_edges, 0);
}

#[tokio::test]
async fn confidence_threshold_is_inclusive_at_point_six() {
    let f = fixture();
    f.inference.answer(
        "python",
        vec![
            RelationCandidate::new("python", "django", "RELATED_TO", 0.59),
            RelationCandidate::new("python", "flask", "RELATED_TO", 0.60),
        ],
    );

    f.graph.expand_ontology(&names(&["python"])).await.unwrap();
    let links = f.store.neighbors(&names(&["python"])).await.unwrap();
    let others: Vec<&str> = links.iter().map(|l| l.other.as_str()).collect();
    assert_eq!(others, vec!["flask"]);
}

#[tokio::test]
async fn failed_skills_are_retried_and_successful_ones_skipped() {
    let f = fixture();
    f.graph.sync_resume(&resume("r1", &["rust"])).await.unwrap();
    f.inference
        .answer("rust", vec![RelationCandidate::new("rust", "systems programming", "IS_A", 0.9)]);
    f.inference.fail("rust");

    let first = f.graph.expand_ontology(&names(&["rust"])).await.unwrap();
    assert_eq!(first.skills_failed, vec!["rust"]);
    let status = f.store.skills(&names(&["rust"])).await.unwrap()[0].ontology_status;
    assert_eq!(status, OntologyStatus::Failed);

    f.inference.heal("rust");
    let second = f.graph.expand_ontology(&names(&["rust"])).await.unwrap();
    assert_eq!(second.skills_succeeded, vec!["rust"]);

    let third = f.graph.expand_ontology(&names(&["rust"])).await.unwrap();
    assert_eq!(third.skills_skipped, vec!["rust"]);
    assert_eq!(f.inference.calls_for("rust"), 2);

    f.graph.rebuild_ontology().await.unwrap();
    assert_eq!(f.inference.calls_for("rust"), 3);
}

#[tokio::test]
async fn direct_mode_counts_shared_skills() {
    let f = fixture();
    f.graph.sync_resume(&resume("r1", &["Python", "SQL"])).await.unwrap();
    f.graph.sync_job(&job("j1", &["Python", "SQL", "Java"])).await.unwrap();

    let ranked = f.graph.recommend_jobs("r1", None, MatchMode::Direct).await.unwrap();
    assert_eq!(ranked.len(), 1);
    assert_eq!(ranked[0].score.direct, 2);
    assert_eq!(ranked[0].score.weighted_score, 2.0);
}

#[tokio::test]
async fn expanded_mode_adds_half_for_related_skills() {
    let f = fixture();
    f.inference
        .answer("flask", vec![RelationCandidate::new("Flask", "Django", "RELATED_TO", 0.9)]);
    f.graph.sync_resume(&resume("r1", &["Python", "Flask"])).await.unwrap();
    f.graph.sync_job(&job("j1", &["Python", "Django"])).await.unwrap();
    f.graph.expand_ontology(&names(&["flask"])).await.unwrap();

    let ranked = f.graph.recommend_jobs("r1", None, MatchMode::Expanded).await.unwrap();
    assert_eq!((ranked[0].score.direct, ranked[0].score.related), (1, 1));
    assert_eq!(ranked[0].score.weighted_score, 1.5);

    let applicants = f.graph.eligible_applicants("j1", MatchMode::Expanded).await.unwrap();
    assert_eq!(applicants[0].score.weighted_score, 1.5);
}

#[tokio::test]
async fn directly_held_skills_are_not_counted_again_as_related() {
    let f = fixture();
    f.inference.answer(
        "flask",
        vec![
            RelationCandidate::new("flask", "python", "IS_A", 0.9),
            RelationCandidate::new("flask", "django", "RELATED_TO", 0.9),
        ],
    );
    f.graph.sync_resume(&resume("r1", &["python", "flask", "django"])).await.unwrap();
    f.graph.sync_job(&job("j1", &["python", "django"])).await.unwrap();
    f.graph.expand_ontology(&names(&["flask"])).await.unwrap();

    let ranked = f.graph.recommend_jobs("r1", None, MatchMode::Expanded).await.unwrap();
    assert_eq!((ranked[0].score.direct, ranked[0].score.related), (2, 0));
    assert_eq!(ranked[0].score.weighted_score, 2.0);
}

#[tokio::test]
async fn one_direct_and_one_related_match_give_two_sentences() {
    let f = fixture();
    f.inference.answer(
        "flask",
        vec![RelationCandidate::new("flask", "django", "RELATED_TO", 0.9)],
    );
    f.inference.answer(
        "django",
        vec![RelationCandidate::new("django", "flask", "RELATED_TO", 0.8)],
    );
    f.graph.sync_resume(&resume("r1", &["python", "flask"])).await.unwrap();
    f.graph.sync_job(&job("j1", &["python", "django"])).await.unwrap();
    // both sides infer the same relation; the graph keeps one edge pair
    f.graph.expand_ontology(&names(&["flask", "django"])).await.unwrap();

    let explanation = f.graph.explain_match("r1", "j1").await.unwrap();
    assert_eq!(explanation.explanations.len(), 2);
    assert_eq!(
        explanation.explanations,
        vec![
            "Direct match: skill python matches the requirement",
            "Related match: skill flask is related to the required skill django",
        ]
    );
}

#[tokio::test]
async fn a_related_match_over_two_edges_gives_one_sentence() {
    let f = fixture();
    f.inference.answer(
        "flask",
        vec![RelationCandidate::new("flask", "web framework", "IS_A", 0.9)],
    );
    f.inference.answer(
        "web framework",
        vec![RelationCandidate::new("web framework", "flask", "RELATED_TO", 0.8)],
    );
    f.graph.sync_resume(&resume("r1", &["python", "flask"])).await.unwrap();
    f.graph.sync_job(&job("j1", &["python", "web framework"])).await.unwrap();
    f.graph
        .expand_ontology(&names(&["flask", "web framework"]))
        .await
        .unwrap();

    let ranked = f.graph.recommend_jobs("r1", None, MatchMode::Expanded).await.unwrap();
    assert_eq!((ranked[0].score.direct, ranked[0].score.related), (1, 1));

    let explanation = f.graph.explain_match("r1", "j1").await.unwrap();
    assert_eq!(
        explanation.explanations,
        vec![
            "Direct match: skill python matches the requirement",
            "Related match: skill flask is a kind of the required skill web framework",
        ]
    );
}

#[tokio::test]
async fn equal_scores_rank_by_id() {
    let f = fixture();
    f.graph.sync_resume(&resume("r1", &["go"])).await.unwrap();
    for id in ["j3", "j1", "j2"] {
        f.graph.sync_job(&job(id, &["go"])).await.unwrap();
    }

    let ranked = f.graph.recommend_jobs("r1", Some(10), MatchMode::Expanded).await.unwrap();
    let ids: Vec<&str> = ranked.iter().map(|r| r.job_id.as_str()).collect();
    assert_eq!(ids, vec!["j1", "j2", "j3"]);

    for id in ["rb", "ra"] {
        f.graph.sync_resume(&resume(id, &["go"])).await.unwrap();
    }
    let applicants = f.graph.eligible_applicants("j1", MatchMode::Direct).await.unwrap();
    let ids: Vec<&str> = applicants.iter().map(|r| r.resume_id.as_str()).collect();
    assert_eq!(ids, vec!["r1", "ra", "rb"]);
}

#[tokio::test]
async fn job_resync_drops_stale_requirements() {
    let f = fixture();
    f.graph.sync_resume(&resume("r1", &["java"])).await.unwrap();
    f.graph.sync_job(&job("j1", &["java", "kotlin"])).await.unwrap();
    f.graph.sync_job(&job("j1", &["kotlin"])).await.unwrap();

    assert!(f.graph.recommend_jobs("r1", None, MatchMode::Direct).await.unwrap().is_empty());
}
