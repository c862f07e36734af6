//! Relation inference prompt and strict response decoding.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use skillgraph_core::{KnowledgeInference, RelationCandidate, SkillGraphError, SkillGraphResult};

use crate::ollama::OllamaClient;

/// The only response layout accepted from the model.
#[derive(Deserialize)]
struct RelationsResponse {
    relations: Vec<RelationCandidate>,
}

/// Build the instruction sent to the model for one skill.
pub fn relation_prompt(skill: &str, max: usize) -> String {
    format!(
        "You are building a technical skills ontology.\n\
         For the skill \"{skill}\", list at most {max} relations to other skills or skill categories.\n\
         Use relationType \"IS_A\" when \"{skill}\" is a kind of the other item \
         (for example Flask IS_A Python Web Framework), and \"RELATED_TO\" when the two \
         are commonly used together or are close alternatives.\n\
         Every relation must have \"from\" equal to \"{skill}\". Give a confidence between 0 and 1.\n\
         Respond with JSON only, exactly in this shape:\n\
         {{\"relations\": [{{\"from\": \"{skill}\", \"to\": \"...\", \"relationType\": \"IS_A\", \"confidence\": 0.9}}]}}"
    )
}

/// Decode the model output. Anything but `{"relations": [...]}` with
/// well-typed entries is an `ExternalService` error.
pub fn parse_relations(raw: &str) -> SkillGraphResult<Vec<RelationCandidate>> {
    let trimmed = raw
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim();

    let parsed: RelationsResponse = serde_json::from_str(trimmed)
        .map_err(|e| SkillGraphError::external(format!("unparsable relation payload: {}", e)))?;
    Ok(parsed.relations)
}

/// `KnowledgeInference` backed by an Ollama model.
#[derive(Clone)]
pub struct OllamaInference {
    client: OllamaClient,
}

impl OllamaInference {
    pub fn new(client: OllamaClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl KnowledgeInference for OllamaInference {
    fn source(&self) -> String {
        format!("ollama:{}", self.client.model())
    }

    async fn infer_relations(&self, skill: &str, max: usize) -> SkillGraphResult<Vec<RelationCandidate>> {
        let prompt = relation_prompt(skill, max);
        let raw = self
            .client
            .generate_json(&prompt)
            .await
            .map_err(|e| SkillGraphError::external(format!("{:#}", e)))?;

        let mut relations = parse_relations(&raw)?;
        relations.truncate(max);
        debug!(skill, count = relations.len(), "Inferred relation candidates");
        Ok(relations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_relations_accepts_fenced_json() {
        let raw = "```json\n{\"relations\": [{\"from\": \"flask\", \"to\": \"python\", \"relationType\": \"IS_A\", \"confidence\": 0.92}]}\n```";
        let relations = parse_relations(raw).unwrap();
        assert_eq!(relations.len(), 1);
        assert_eq!(relations[0].to, "python");
        assert_eq!(relations[0].relation_type, "IS_A");
    }

    #[test]
    fn test_parse_relations_rejects_other_shapes() {
        let bare_list = r#"[{"from": "flask", "to": "python", "relationType": "IS_A", "confidence": 0.9}]"#;
        assert!(matches!(parse_relations(bare_list), Err(SkillGraphError::ExternalService(_))));

        let string_confidence = r#"{"relations": [{"from": "flask", "to": "python", "relationType": "IS_A", "confidence": "high"}]}"#;
        assert!(parse_relations(string_confidence).is_err());

        assert!(parse_relations("Sure! Here are some relations").is_err());
    }

    #[test]
    fn test_empty_relation_list_is_valid() {
        assert!(parse_relations(r#"{"relations": []}"#).unwrap().is_empty());
    }

    #[test]
    fn test_prompt_mentions_skill_and_limit() {
        let prompt = relation_prompt("kubernetes", 5);
        assert!(prompt.contains("\"kubernetes\""));
        assert!(prompt.contains("at most 5"));
        assert!(prompt.contains("\"relations\""));
    }
}
