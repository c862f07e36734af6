//! Neo4j-backed graph store.
//!
//! All Cypher is fixed text with `$parameters`; relation kinds pick one of
//! two prepared templates, never string interpolation.

use std::collections::BTreeSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use neo4rs::{Query, Row};
use tracing::{debug, info};

use skillgraph_core::config::GraphConfig;
use skillgraph_core::{OntologyStatus, RelationType, SkillGraphError, SkillGraphResult, SkillNode, SkillRelation};

use super::GraphStore;
use crate::client::GraphClient;
use crate::model::{GraphCounts, JobNode, LinkDirection, MatchPath, ResumeNode, SkillLink};
use crate::schema::initialize_schema;

const UPSERT_RESUME: &str = "MERGE (r:Resume {id: $id})
     SET r.name = $name,
         r.email = $email,
         r.phone = $phone,
         r.summary = $summary,
         r.file_ref = $file_ref,
         r.updated_at = $updated_at";

const PURGE_HAS: &str = "MATCH (:Resume {id: $id})-[h:HAS]->(:Skill) DELETE h";

const LINK_HAS: &str = "MATCH (r:Resume {id: $id})
     UNWIND $skills AS name
     MERGE (s:Skill {name: name})
       ON CREATE SET s.ontology_status = 'unprocessed'
     MERGE (r)-[:HAS]->(s)";

const UPSERT_JOB: &str = "MERGE (j:Job {id: $id})
     SET j.title = $title,
         j.link = $link,
         j.updated_at = $updated_at";

const PURGE_REQUIRES: &str = "MATCH (:Job {id: $id})-[q:REQUIRES]->(:Skill) DELETE q";

const LINK_REQUIRES: &str = "MATCH (j:Job {id: $id})
     UNWIND $skills AS name
     MERGE (s:Skill {name: name})
       ON CREATE SET s.ontology_status = 'unprocessed'
     MERGE (j)-[:REQUIRES]->(s)";

const DELETE_RESUME: &str = "MATCH (r:Resume {id: $id})
     WITH collect(r) AS nodes, count(r) AS found
     FOREACH (n IN nodes | DETACH DELETE n)
     RETURN found";

const DELETE_JOB: &str = "MATCH (j:Job {id: $id})
     WITH collect(j) AS nodes, count(j) AS found
     FOREACH (n IN nodes | DETACH DELETE n)
     RETURN found";

const FETCH_RESUME: &str = "MATCH (r:Resume {id: $id})
     OPTIONAL MATCH (r)-[:HAS]->(s:Skill)
     RETURN r.id AS id, r.name AS name, r.email AS email, r.phone AS phone,
            r.summary AS summary, r.file_ref AS file_ref, collect(s.name) AS skills";

const FETCH_JOB: &str = "MATCH (j:Job {id: $id})
     OPTIONAL MATCH (j)-[:REQUIRES]->(s:Skill)
     RETURN j.id AS id, j.title AS title, j.link AS link, collect(s.name) AS skills";

const JOBS_REQUIRING_ANY: &str = "MATCH (j:Job)-[:REQUIRES]->(s:Skill)
     WHERE s.name IN $names
     WITH DISTINCT j
     MATCH (j)-[:REQUIRES]->(req:Skill)
     RETURN j.id AS id, j.title AS title, j.link AS link, collect(req.name) AS skills";

const RESUMES_HOLDING_ANY: &str = "MATCH (r:Resume)-[:HAS]->(s:Skill)
     WHERE s.name IN $names
     WITH DISTINCT r
     MATCH (r)-[:HAS]->(held:Skill)
     RETURN r.id AS id, r.name AS name, r.email AS email, r.phone AS phone,
            r.summary AS summary, r.file_ref AS file_ref, collect(held.name) AS skills";

const NEIGHBORS: &str = "UNWIND $names AS name
     MATCH (s:Skill {name: name})-[e:RELATED_TO|IS_A]-(o:Skill)
     WHERE o <> s AND (type(e) = 'IS_A' OR startNode(e) = s)
     RETURN s.name AS skill, o.name AS other, type(e) AS relation,
            startNode(e) = s AS outgoing, e.confidence AS confidence,
            e.source AS source, e.updated_at AS updated_at
     ORDER BY skill, other";

const FETCH_SKILLS: &str = "UNWIND $names AS name
     MATCH (s:Skill {name: name})
     RETURN s.name AS name, s.ontology_status AS status, s.last_processed_at AS last_processed_at";

const ALL_SKILL_NAMES: &str = "MATCH (s:Skill) RETURN s.name AS name ORDER BY name";

const WRITE_IS_A: &str = "MERGE (a:Skill {name: $from})
       ON CREATE SET a.ontology_status = 'unprocessed'
     MERGE (b:Skill {name: $to})
       ON CREATE SET b.ontology_status = 'unprocessed'
     MERGE (a)-[r:IS_A]->(b)
     SET r.confidence = $confidence, r.source = $source, r.updated_at = $updated_at";

// both directions in one statement: a pair is written whole or not at all
const WRITE_RELATED_TO: &str = "MERGE (a:Skill {name: $from})
       ON CREATE SET a.ontology_status = 'unprocessed'
     MERGE (b:Skill {name: $to})
       ON CREATE SET b.ontology_status = 'unprocessed'
     MERGE (a)-[r:RELATED_TO]->(b)
     MERGE (b)-[i:RELATED_TO]->(a)
     SET r.confidence = $confidence, r.source = $source, r.updated_at = $updated_at,
         i.confidence = $confidence, i.source = $source, i.updated_at = $updated_at";

const SET_STATUS: &str = "MATCH (s:Skill {name: $name})
     SET s.ontology_status = $status, s.last_processed_at = $at";

const RESET_STATUSES: &str = "MATCH (s:Skill)
     SET s.ontology_status = 'unprocessed'
     RETURN count(s) AS reset";

const DIRECT_PATHS: &str = "MATCH (:Resume {id: $resume_id})-[:HAS]->(s:Skill)<-[:REQUIRES]-(:Job {id: $job_id})
     RETURN DISTINCT s.name AS skill
     ORDER BY skill
     LIMIT $limit";

const RELATED_PATHS: &str = "MATCH (r:Resume {id: $resume_id})-[:HAS]->(c:Skill)-[e:RELATED_TO|IS_A]-(q:Skill)<-[:REQUIRES]-(:Job {id: $job_id})
     WHERE c <> q
       AND NOT (r)-[:HAS]->(q)
       AND (type(e) = 'IS_A' OR startNode(e) = c)
     RETURN DISTINCT c.name AS candidate, q.name AS required, type(e) AS relation,
            startNode(e) = c AS outgoing, e.confidence AS confidence,
            e.source AS source, e.updated_at AS updated_at
     ORDER BY required, candidate
     LIMIT $limit";

const SHARED_SKILLS: &str = "MATCH (:Resume {id: $resume_id})-[:HAS]->(s:Skill)
     WITH collect(s.name) AS held
     MATCH (:Job {id: $job_id})-[:REQUIRES]->(q:Skill)
     WHERE q.name IN held
     RETURN q.name AS skill
     ORDER BY skill";

const COUNT_STATEMENTS: &[(&str, &str)] = &[
    ("skills", "MATCH (n:Skill) RETURN count(n) AS count"),
    ("resumes", "MATCH (n:Resume) RETURN count(n) AS count"),
    ("jobs", "MATCH (n:Job) RETURN count(n) AS count"),
    ("has", "MATCH (:Resume)-[r:HAS]->(:Skill) RETURN count(r) AS count"),
    ("requires", "MATCH (:Job)-[r:REQUIRES]->(:Skill) RETURN count(r) AS count"),
    ("related_to", "MATCH (:Skill)-[r:RELATED_TO]->(:Skill) RETURN count(r) AS count"),
    ("is_a", "MATCH (:Skill)-[r:IS_A]->(:Skill) RETURN count(r) AS count"),
];

const STATUS_COUNTS: &str = "MATCH (s:Skill)
     RETURN coalesce(s.ontology_status, 'unprocessed') AS status, count(s) AS count";

/// Fixed write template for a relation kind.
fn relation_template(kind: RelationType) -> &'static str {
    match kind {
        RelationType::IsA => WRITE_IS_A,
        RelationType::RelatedTo => WRITE_RELATED_TO,
    }
}

fn persistence(err: anyhow::Error) -> SkillGraphError {
    SkillGraphError::persistence(format!("{:#}", err))
}

fn text(row: &Row, key: &str) -> String {
    row.get::<String>(key).unwrap_or_default()
}

fn name_set(row: &Row, key: &str) -> BTreeSet<String> {
    row.get::<Vec<String>>(key).unwrap_or_default().into_iter().collect()
}

fn resume_from_row(row: &Row) -> ResumeNode {
    ResumeNode {
        id: text(row, "id"),
        name: text(row, "name"),
        email: text(row, "email"),
        phone: text(row, "phone"),
        summary: text(row, "summary"),
        file_ref: text(row, "file_ref"),
    }
}

fn job_from_row(row: &Row) -> JobNode {
    JobNode {
        id: text(row, "id"),
        title: text(row, "title"),
        link: text(row, "link"),
    }
}

fn link_from_row(row: &Row, skill_key: &str, other_key: &str) -> Option<SkillLink> {
    let relation = RelationType::parse(&text(row, "relation"))?;
    let outgoing = row.get::<bool>("outgoing").unwrap_or(true);
    Some(SkillLink {
        skill: text(row, skill_key),
        other: text(row, other_key),
        relation,
        direction: if outgoing { LinkDirection::Outgoing } else { LinkDirection::Incoming },
        confidence: row.get::<f64>("confidence").unwrap_or_default(),
        source: text(row, "source"),
        updated_at: text(row, "updated_at"),
    })
}

/// `GraphStore` on a Neo4j database.
#[derive(Clone)]
pub struct Neo4jGraphStore {
    client: GraphClient,
}

impl Neo4jGraphStore {
    /// Connect and make sure the schema exists.
    pub async fn open(config: &GraphConfig) -> SkillGraphResult<Self> {
        let client = GraphClient::connect(config).await.map_err(persistence)?;
        let store = Self::with_client(client);
        store.initialize().await?;
        info!(uri = %config.uri, "Connected graph store");
        Ok(store)
    }

    pub fn with_client(client: GraphClient) -> Self {
        Self { client }
    }

    /// Consume the store. Equivalent to dropping it: the pool closes its
    /// connections once the last clone of this store is gone, and neo4rs
    /// has no shutdown handshake to run.
    pub fn close(self) {
        debug!("Graph store closed");
    }

    async fn rows(&self, query: Query) -> SkillGraphResult<Vec<Row>> {
        self.client.query(query).await.map_err(persistence)
    }

    async fn count(&self, query: Query, field: &str) -> SkillGraphResult<usize> {
        let value: Option<i64> = self.client.query_scalar(query, field).await.map_err(persistence)?;
        Ok(value.unwrap_or(0).max(0) as usize)
    }
}

#[async_trait]
impl GraphStore for Neo4jGraphStore {
    async fn initialize(&self) -> SkillGraphResult<()> {
        initialize_schema(&self.client).await.map_err(persistence)
    }

    async fn sync_resume(&self, node: &ResumeNode, skills: &[String]) -> SkillGraphResult<usize> {
        let now = Utc::now().to_rfc3339();
        let upsert = Query::new(UPSERT_RESUME.to_string())
            .param("id", node.id.as_str())
            .param("name", node.name.as_str())
            .param("email", node.email.as_str())
            .param("phone", node.phone.as_str())
            .param("summary", node.summary.as_str())
            .param("file_ref", node.file_ref.as_str())
            .param("updated_at", now.as_str());
        let purge = Query::new(PURGE_HAS.to_string()).param("id", node.id.as_str());
        let link = Query::new(LINK_HAS.to_string())
            .param("id", node.id.as_str())
            .param("skills", skills.to_vec());

        self.client
            .run_in_transaction(vec![upsert, purge, link])
            .await
            .map_err(persistence)?;
        Ok(skills.len())
    }

    async fn sync_job(&self, node: &JobNode, skills: &[String]) -> SkillGraphResult<usize> {
        let now = Utc::now().to_rfc3339();
        let upsert = Query::new(UPSERT_JOB.to_string())
            .param("id", node.id.as_str())
            .param("title", node.title.as_str())
            .param("link", node.link.as_str())
            .param("updated_at", now.as_str());
        let purge = Query::new(PURGE_REQUIRES.to_string()).param("id", node.id.as_str());
        let link = Query::new(LINK_REQUIRES.to_string())
            .param("id", node.id.as_str())
            .param("skills", skills.to_vec());

        self.client
            .run_in_transaction(vec![upsert, purge, link])
            .await
            .map_err(persistence)?;
        Ok(skills.len())
    }

    async fn delete_resume(&self, id: &str) -> SkillGraphResult<bool> {
        let query = Query::new(DELETE_RESUME.to_string()).param("id", id);
        Ok(self.count(query, "found").await? > 0)
    }

    async fn delete_job(&self, id: &str) -> SkillGraphResult<bool> {
        let query = Query::new(DELETE_JOB.to_string()).param("id", id);
        Ok(self.count(query, "found").await? > 0)
    }

    async fn resume(&self, id: &str) -> SkillGraphResult<Option<(ResumeNode, BTreeSet<String>)>> {
        let rows = self.rows(Query::new(FETCH_RESUME.to_string()).param("id", id)).await?;
        Ok(rows.first().map(|row| (resume_from_row(row), name_set(row, "skills"))))
    }

    async fn job(&self, id: &str) -> SkillGraphResult<Option<(JobNode, BTreeSet<String>)>> {
        let rows = self.rows(Query::new(FETCH_JOB.to_string()).param("id", id)).await?;
        Ok(rows.first().map(|row| (job_from_row(row), name_set(row, "skills"))))
    }

    async fn jobs_requiring_any(&self, skills: &[String]) -> SkillGraphResult<Vec<(JobNode, BTreeSet<String>)>> {
        let query = Query::new(JOBS_REQUIRING_ANY.to_string()).param("names", skills.to_vec());
        let rows = self.rows(query).await?;
        Ok(rows.iter().map(|row| (job_from_row(row), name_set(row, "skills"))).collect())
    }

    async fn resumes_holding_any(&self, skills: &[String]) -> SkillGraphResult<Vec<(ResumeNode, BTreeSet<String>)>> {
        let query = Query::new(RESUMES_HOLDING_ANY.to_string()).param("names", skills.to_vec());
        let rows = self.rows(query).await?;
        Ok(rows.iter().map(|row| (resume_from_row(row), name_set(row, "skills"))).collect())
    }

    async fn neighbors(&self, skills: &[String]) -> SkillGraphResult<Vec<SkillLink>> {
        let query = Query::new(NEIGHBORS.to_string()).param("names", skills.to_vec());
        let rows = self.rows(query).await?;
        Ok(rows.iter().filter_map(|row| link_from_row(row, "skill", "other")).collect())
    }

    async fn skills(&self, names: &[String]) -> SkillGraphResult<Vec<SkillNode>> {
        let query = Query::new(FETCH_SKILLS.to_string()).param("names", names.to_vec());
        let rows = self.rows(query).await?;
        Ok(rows
            .iter()
            .map(|row| SkillNode {
                name: text(row, "name"),
                ontology_status: OntologyStatus::from_str(&text(row, "status")),
                last_processed_at: DateTime::parse_from_rfc3339(&text(row, "last_processed_at"))
                    .ok()
                    .map(|at| at.with_timezone(&Utc)),
            })
            .collect())
    }

    async fn all_skill_names(&self) -> SkillGraphResult<Vec<String>> {
        let rows = self.rows(Query::new(ALL_SKILL_NAMES.to_string())).await?;
        Ok(rows.iter().map(|row| text(row, "name")).collect())
    }

    async fn write_relation(&self, relation: &SkillRelation) -> SkillGraphResult<()> {
        let updated_at = relation.updated_at.to_rfc3339();
        let query = Query::new(relation_template(relation.relation).to_string())
            .param("from", relation.from.as_str())
            .param("to", relation.to.as_str())
            .param("confidence", relation.confidence)
            .param("source", relation.source.as_str())
            .param("updated_at", updated_at.as_str());

        self.client.execute(query).await.map_err(persistence)
    }

    async fn set_skill_status(&self, name: &str, status: OntologyStatus, at: DateTime<Utc>) -> SkillGraphResult<()> {
        let at = at.to_rfc3339();
        let query = Query::new(SET_STATUS.to_string())
            .param("name", name)
            .param("status", status.as_str())
            .param("at", at.as_str());
        self.client.execute(query).await.map_err(persistence)
    }

    async fn reset_skill_statuses(&self) -> SkillGraphResult<usize> {
        self.count(Query::new(RESET_STATUSES.to_string()), "reset").await
    }

    async fn match_paths(&self, resume_id: &str, job_id: &str, limit: usize) -> SkillGraphResult<Vec<MatchPath>> {
        let direct = Query::new(DIRECT_PATHS.to_string())
            .param("resume_id", resume_id)
            .param("job_id", job_id)
            .param("limit", limit as i64);
        let mut paths: Vec<MatchPath> = self
            .rows(direct)
            .await?
            .iter()
            .map(|row| MatchPath::direct(&text(row, "skill")))
            .collect();

        let related = Query::new(RELATED_PATHS.to_string())
            .param("resume_id", resume_id)
            .param("job_id", job_id)
            .param("limit", limit as i64);
        for row in self.rows(related).await? {
            if let Some(link) = link_from_row(&row, "candidate", "required") {
                paths.push(MatchPath::related(&link.skill, &link.other, &link));
            }
        }

        paths.truncate(limit);
        Ok(paths)
    }

    async fn shared_skills(&self, resume_id: &str, job_id: &str) -> SkillGraphResult<Vec<String>> {
        let query = Query::new(SHARED_SKILLS.to_string())
            .param("resume_id", resume_id)
            .param("job_id", job_id);
        let rows = self.rows(query).await?;
        Ok(rows.iter().map(|row| text(row, "skill")).collect())
    }

    async fn counts(&self) -> SkillGraphResult<GraphCounts> {
        let mut counts = GraphCounts::default();
        for (field, statement) in COUNT_STATEMENTS {
            let n = self.count(Query::new(statement.to_string()), "count").await?;
            match *field {
                "skills" => counts.skills = n,
                "resumes" => counts.resumes = n,
                "jobs" => counts.jobs = n,
                "has" => counts.has_edges = n,
                "requires" => counts.requires_edges = n,
                "related_to" => counts.related_to_edges = n,
                _ => counts.is_a_edges = n,
            }
        }
        counts.relation_edges = counts.related_to_edges + counts.is_a_edges;

        for row in self.rows(Query::new(STATUS_COUNTS.to_string())).await? {
            let n = row.get::<i64>("count").unwrap_or(0).max(0) as usize;
            match OntologyStatus::from_str(&text(&row, "status")) {
                OntologyStatus::Unprocessed => counts.skills_unprocessed += n,
                OntologyStatus::Success => counts.skills_success += n,
                OntologyStatus::Failed => counts.skills_failed += n,
            }
        }

        Ok(counts)
    }
}
