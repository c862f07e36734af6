//! # Skillgraph Graph
//!
//! Skill graph construction and querying.
//!
//! Mirrors canonical resumes and jobs into a labeled graph, expands the
//! skill ontology through a knowledge inference service, ranks
//! resume/job pairs by direct and one-hop related skills, and explains
//! individual matches.

pub mod client;
pub mod explain;
pub mod matching;
pub mod model;
pub mod ontology;
pub mod schema;
pub mod service;
pub mod store;
pub mod sync;

pub use client::GraphClient;
pub use explain::{Explainer, MatchExplanation, SkillExploration};
pub use matching::{MatchMode, MatchScore, MatchingEngine, RankedApplicant, RankedJob};
pub use model::{GraphCounts, JobNode, LinkDirection, MatchPath, ResumeNode, SkillLink};
pub use ontology::{ExpansionReport, ExpansionSettings, ExpansionWorker, OntologyExpander};
pub use service::{ExpansionOutcome, IngestJobReport, IngestResumeReport, SkillGraph};
pub use store::{memory::MemoryGraphStore, neo4j::Neo4jGraphStore, GraphStore};
pub use sync::{GraphSynchronizer, SyncResult};
