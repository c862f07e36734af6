//! Skill nodes and name normalization.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Canonical form of a skill name: trimmed, inner whitespace collapsed to a
/// single space, lowercased.
///
/// Every node lookup or creation goes through this function so that
/// `"PYTHON"`, `" python "` and `"Python"` land on the same node.
/// Returns `None` when nothing is left after trimming.
pub fn normalize_skill(raw: &str) -> Option<String> {
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        None
    } else {
        Some(collapsed.to_lowercase())
    }
}

/// Normalize a list of skill names, dropping empties and duplicates while
/// keeping first-seen order.
pub fn normalize_skills<S: AsRef<str>>(raw: &[S]) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    raw.iter()
        .filter_map(|s| normalize_skill(s.as_ref()))
        .filter(|s| seen.insert(s.clone()))
        .collect()
}

/// Per-skill ontology processing state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OntologyStatus {
    #[default]
    Unprocessed,
    Success,
    Failed,
}

impl OntologyStatus {
    /// Parse from string. Unknown or missing values count as unprocessed.
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "success" => Self::Success,
            "failed" => Self::Failed,
            _ => Self::Unprocessed,
        }
    }

    /// Convert to string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unprocessed => "unprocessed",
            Self::Success => "success",
            Self::Failed => "failed",
        }
    }

    /// Whether an expansion batch should (re)process a skill in this state.
    ///
    /// Failed skills are retried automatically; successful ones are skipped
    /// until a rebuild resets them.
    pub fn needs_expansion(&self) -> bool {
        !matches!(self, Self::Success)
    }
}

/// A skill node as stored in the graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillNode {
    pub name: String,
    pub ontology_status: OntologyStatus,
    pub last_processed_at: Option<DateTime<Utc>>,
}

impl SkillNode {
    /// A freshly referenced skill that has never been expanded.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ontology_status: OntologyStatus::Unprocessed,
            last_processed_at: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_and_whitespace_variants_collapse() {
        assert_eq!(normalize_skill("PYTHON").as_deref(), Some("python"));
        assert_eq!(normalize_skill(" python ").as_deref(), Some("python"));
        assert_eq!(normalize_skill("Python").as_deref(), Some("python"));
        assert_eq!(
            normalize_skill("  Machine \t Learning ").as_deref(),
            Some("machine learning")
        );
    }

    #[test]
    fn test_blank_names_are_rejected() {
        assert_eq!(normalize_skill(""), None);
        assert_eq!(normalize_skill("   \n"), None);
    }

    #[test]
    fn test_normalize_skills_dedupes_in_order() {
        let skills = normalize_skills(&["SQL", "Python", " sql", "", "PYTHON", "Rust"]);
        assert_eq!(skills, vec!["sql", "python", "rust"]);
    }

    #[test]
    fn test_status_round_trip_and_retry_rule() {
        assert_eq!(OntologyStatus::from_str("FAILED"), OntologyStatus::Failed);
        assert_eq!(OntologyStatus::from_str(""), OntologyStatus::Unprocessed);
        assert_eq!(OntologyStatus::Success.as_str(), "success");

        assert!(OntologyStatus::Unprocessed.needs_expansion());
        assert!(OntologyStatus::Failed.needs_expansion());
        assert!(!OntologyStatus::Success.needs_expansion());
    }
}
