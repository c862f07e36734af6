//! Knowledge inference collaborator: skill name in, candidate relations out.

use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;

use crate::error::{SkillGraphError, SkillGraphResult};
use crate::relation::RelationCandidate;
use crate::skill::normalize_skill;

/// A service that proposes related skills and categories for a skill.
///
/// Implementations return raw candidates; validation happens in the
/// ontology expander, so a service may return anything it likes.
#[async_trait]
pub trait KnowledgeInference: Send + Sync {
    /// Label recorded as `source` on every edge this service contributes.
    fn source(&self) -> String;

    /// Propose up to `max` relations for `skill`.
    async fn infer_relations(&self, skill: &str, max: usize) -> SkillGraphResult<Vec<RelationCandidate>>;
}

/// Inference backed by a fixed table, loaded from a JSON file of the form
/// `{"flask": [{"from": "Flask", "to": "Python", "relationType": "IS_A", "confidence": 0.9}]}`.
#[derive(Debug, Clone, Default)]
pub struct FileInference {
    label: String,
    table: HashMap<String, Vec<RelationCandidate>>,
}

impl FileInference {
    /// An empty table with the given source label.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            table: HashMap::new(),
        }
    }

    /// Load a seed file. Keys are normalized on load.
    pub fn from_path(path: &Path) -> SkillGraphResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let raw: HashMap<String, Vec<RelationCandidate>> = serde_json::from_str(&content)
            .map_err(|e| SkillGraphError::parse(format!("ontology seed {}: {}", path.display(), e)))?;

        let mut inference = Self::new(format!("file:{}", path.display()));
        for (skill, candidates) in raw {
            inference = inference.with(&skill, candidates);
        }
        Ok(inference)
    }

    /// Add (or extend) the candidates for one skill.
    pub fn with(mut self, skill: &str, candidates: Vec<RelationCandidate>) -> Self {
        if let Some(key) = normalize_skill(skill) {
            self.table.entry(key).or_default().extend(candidates);
        }
        self
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

#[async_trait]
impl KnowledgeInference for FileInference {
    fn source(&self) -> String {
        self.label.clone()
    }

    async fn infer_relations(&self, skill: &str, max: usize) -> SkillGraphResult<Vec<RelationCandidate>> {
        let key = normalize_skill(skill).unwrap_or_default();
        Ok(self
            .table
            .get(&key)
            .map(|c| c.iter().take(max).cloned().collect())
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_lookup_is_normalized_and_capped() {
        let inference = FileInference::new("seed").with(
            "Flask",
            vec![
                RelationCandidate::new("flask", "python", "IS_A", 0.9),
                RelationCandidate::new("flask", "django", "RELATED_TO", 0.8),
                RelationCandidate::new("flask", "jinja", "RELATED_TO", 0.7),
            ],
        );

        let found = inference.infer_relations("  FLASK ", 2).await.unwrap();
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].to, "python");

        assert!(inference.infer_relations("cobol", 5).await.unwrap().is_empty());
        assert_eq!(inference.source(), "seed");
    }

    #[test]
    fn test_from_path_rejects_malformed_seed() {
        let dir = std::env::temp_dir().join(format!("skillgraph-seed-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("seed.json");

        std::fs::write(&path, r#"{"rust": [{"from": "rust", "to": "systems programming", "relationType": "IS_A", "confidence": 0.9}]}"#).unwrap();
        let inference = FileInference::from_path(&path).unwrap();
        assert_eq!(inference.len(), 1);

        std::fs::write(&path, r#"{"rust": "not a list"}"#).unwrap();
        assert!(matches!(FileInference::from_path(&path), Err(SkillGraphError::Parse(_))));

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
