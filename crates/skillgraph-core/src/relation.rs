//! Skill-to-skill relations and the rules for accepting inferred ones.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{SkillGraphError, SkillGraphResult};
use crate::skill::normalize_skill;

/// Relations below this confidence are never persisted.
pub const MIN_CONFIDENCE: f64 = 0.6;

/// The two ontology relation kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RelationType {
    #[serde(rename = "IS_A")]
    IsA,
    #[serde(rename = "RELATED_TO")]
    RelatedTo,
}

impl RelationType {
    /// Parse the wire/graph name. Anything other than the two known kinds is `None`.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().replace(|c: char| c == ' ' || c == '-', "_").as_str() {
            "IS_A" => Some(Self::IsA),
            "RELATED_TO" => Some(Self::RelatedTo),
            _ => None,
        }
    }

    /// Relationship type name in the graph.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::IsA => "IS_A",
            Self::RelatedTo => "RELATED_TO",
        }
    }

    /// RELATED_TO is symmetric and stored in both directions; IS_A is a
    /// hierarchy edge stored child to parent only.
    pub fn is_symmetric(&self) -> bool {
        matches!(self, Self::RelatedTo)
    }
}

impl std::fmt::Display for RelationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An unvalidated relation proposed by a knowledge inference service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationCandidate {
    pub from: String,
    pub to: String,
    #[serde(rename = "relationType")]
    pub relation_type: String,
    pub confidence: f64,
}

impl RelationCandidate {
    pub fn new(from: &str, to: &str, relation_type: &str, confidence: f64) -> Self {
        Self {
            from: from.to_string(),
            to: to.to_string(),
            relation_type: relation_type.to_string(),
            confidence,
        }
    }
}

/// A validated relation ready to be written to the graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillRelation {
    pub from: String,
    pub to: String,
    pub relation: RelationType,
    pub confidence: f64,
    pub source: String,
    pub updated_at: DateTime<Utc>,
}

impl SkillRelation {
    /// Validate a candidate produced while expanding `current_skill`.
    ///
    /// `current_skill` must already be normalized. Rejections are
    /// `SkillGraphError::Validation` carrying the reason.
    pub fn from_candidate(
        candidate: &RelationCandidate,
        current_skill: &str,
        source: &str,
        updated_at: DateTime<Utc>,
    ) -> SkillGraphResult<Self> {
        let confidence = candidate.confidence;
        if !(0.0..=1.0).contains(&confidence) {
            return Err(SkillGraphError::validation(format!(
                "confidence {} outside [0, 1]",
                confidence
            )));
        }
        if confidence < MIN_CONFIDENCE {
            return Err(SkillGraphError::validation(format!(
                "confidence {} below threshold {}",
                confidence, MIN_CONFIDENCE
            )));
        }

        let relation = RelationType::parse(&candidate.relation_type).ok_or_else(|| {
            SkillGraphError::validation(format!(
                "unsupported relation type '{}'",
                candidate.relation_type
            ))
        })?;

        let from = normalize_skill(&candidate.from)
            .ok_or_else(|| SkillGraphError::validation("empty 'from' skill"))?;
        let to = normalize_skill(&candidate.to)
            .ok_or_else(|| SkillGraphError::validation("empty 'to' skill"))?;

        if from != current_skill {
            return Err(SkillGraphError::validation(format!(
                "relation starts at '{}' but '{}' is being expanded",
                from, current_skill
            )));
        }
        if from == to {
            return Err(SkillGraphError::validation(format!("self-loop on '{}'", from)));
        }

        Ok(Self {
            from,
            to,
            relation,
            confidence,
            source: source.to_string(),
            updated_at,
        })
    }

    /// The same relation with endpoints swapped.
    pub fn inverse(&self) -> Self {
        Self {
            from: self.to.clone(),
            to: self.from.clone(),
            ..self.clone()
        }
    }

    /// The directed edges that represent this relation in storage.
    pub fn stored_edges(&self) -> Vec<SkillRelation> {
        if self.relation.is_symmetric() {
            vec![self.clone(), self.inverse()]
        } else {
            vec![self.clone()]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn accept(c: &RelationCandidate, current: &str) -> SkillGraphResult<SkillRelation> {
        SkillRelation::from_candidate(c, current, "test", Utc::now())
    }

    #[test]
    fn test_confidence_threshold_is_inclusive() {
        let below = RelationCandidate::new("Python", "Django", "RELATED_TO", 0.59);
        let at = RelationCandidate::new("Python", "Django", "RELATED_TO", 0.60);

        assert!(matches!(accept(&below, "python"), Err(SkillGraphError::Validation(_))));
        let rel = accept(&at, "python").unwrap();
        assert_eq!(rel.from, "python");
        assert_eq!(rel.to, "django");
        assert_eq!(rel.relation, RelationType::RelatedTo);
    }

    #[test]
    fn test_out_of_range_confidence_is_rejected() {
        let c = RelationCandidate::new("Python", "Django", "IS_A", 1.5);
        assert!(accept(&c, "python").is_err());
        let nan = RelationCandidate::new("Python", "Django", "IS_A", f64::NAN);
        assert!(accept(&nan, "python").is_err());
    }

    #[test]
    fn test_self_loop_is_rejected_after_normalization() {
        let c = RelationCandidate::new("Python", " PYTHON ", "RELATED_TO", 0.9);
        assert!(accept(&c, "python").is_err());
    }

    #[test]
    fn test_unknown_relation_type_is_rejected() {
        let c = RelationCandidate::new("Python", "Snake", "PART_OF", 0.9);
        assert!(accept(&c, "python").is_err());
    }

    #[test]
    fn test_relation_must_start_at_current_skill() {
        let c = RelationCandidate::new("Java", "Kotlin", "RELATED_TO", 0.9);
        assert!(accept(&c, "python").is_err());
        let blank = RelationCandidate::new("python", "  ", "RELATED_TO", 0.9);
        assert!(accept(&blank, "python").is_err());
    }

    #[test]
    fn test_relation_type_parsing_is_lenient_on_spelling() {
        assert_eq!(RelationType::parse("is_a"), Some(RelationType::IsA));
        assert_eq!(RelationType::parse("related to"), Some(RelationType::RelatedTo));
        assert_eq!(RelationType::parse("Related-To"), Some(RelationType::RelatedTo));
        assert_eq!(RelationType::parse("SUBCLASS_OF"), None);
    }

    #[test]
    fn test_symmetric_relations_store_both_directions() {
        let related = accept(&RelationCandidate::new("Flask", "Django", "RELATED_TO", 0.9), "flask").unwrap();
        let edges = related.stored_edges();
        assert_eq!(edges.len(), 2);
        assert_eq!((edges[1].from.as_str(), edges[1].to.as_str()), ("django", "flask"));

        let is_a = accept(&RelationCandidate::new("Django", "Web Framework", "IS_A", 0.8), "django").unwrap();
        assert_eq!(is_a.stored_edges().len(), 1);
    }

    #[test]
    fn test_candidate_wire_format() {
        let json = r#"{"from":"Flask","to":"Python","relationType":"IS_A","confidence":0.8}"#;
        let c: RelationCandidate = serde_json::from_str(json).unwrap();
        assert_eq!(c.relation_type, "IS_A");
        assert_eq!(c.confidence, 0.8);
    }
}
