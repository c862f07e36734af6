//! Skillgraph Core Library
//!
//! Domain models, validation rules and collaborator traits shared by the
//! graph, storage and inference crates.

pub mod config;
pub mod document;
pub mod error;
pub mod inference;
pub mod record;
pub mod relation;
pub mod skill;

pub use config::SkillGraphConfig;
pub use error::{SkillGraphError, SkillGraphResult};
pub use inference::{FileInference, KnowledgeInference};
pub use record::model::{JobRecord, ResumeRecord};
pub use record::{MemoryRecordStore, RecordStore};
pub use relation::{RelationCandidate, RelationType, SkillRelation, MIN_CONFIDENCE};
pub use skill::{normalize_skill, normalize_skills, OntologyStatus, SkillNode};
