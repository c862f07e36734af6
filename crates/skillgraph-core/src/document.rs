//! Strict mapping of document parser output into canonical records.
//!
//! The parser emits one of a small set of known JSON layouts. Each layout
//! has its own serde struct and its own mapping function; a document that
//! matches none of them is a `SkillGraphError::Parse`, never a guess.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;

use crate::error::{SkillGraphError, SkillGraphResult};
use crate::record::model::{Experience, JobRecord, Project, ResumeRecord};

/// Known résumé layouts emitted by the document parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResumeSchema {
    /// `{name, email, phone, summary, skills: [..], work_experience, projects}`
    FlatV1,
    /// `{personal_information: {name, contact_details}, career_objective, skills: {category: [..]}, ..}`
    NestedV2,
}

impl ResumeSchema {
    /// Identify the layout by its discriminating keys.
    pub fn detect(value: &Value) -> SkillGraphResult<Self> {
        let obj = value
            .as_object()
            .ok_or_else(|| SkillGraphError::parse("resume document is not a JSON object"))?;

        if obj.contains_key("personal_information") {
            Ok(Self::NestedV2)
        } else if obj.get("skills").map(Value::is_array).unwrap_or(false) && obj.contains_key("name") {
            Ok(Self::FlatV1)
        } else {
            Err(SkillGraphError::parse(
                "resume document matches no known schema (expected flat v1 or nested v2)",
            ))
        }
    }
}

#[derive(Deserialize)]
struct FlatResumeV1 {
    name: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    phone: Option<String>,
    #[serde(default)]
    summary: Option<String>,
    skills: Vec<String>,
    #[serde(default)]
    work_experience: Vec<FlatExperienceV1>,
    #[serde(default)]
    projects: Vec<FlatProjectV1>,
}

#[derive(Deserialize)]
struct FlatExperienceV1 {
    title: String,
    company: String,
    #[serde(default)]
    dates: Option<String>,
}

#[derive(Deserialize)]
struct FlatProjectV1 {
    name: String,
    #[serde(default)]
    description: String,
}

#[derive(Deserialize)]
struct NestedResumeV2 {
    personal_information: PersonalInfoV2,
    #[serde(default)]
    career_objective: Option<String>,
    skills: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    professional_experience: Vec<NestedExperienceV2>,
    #[serde(default)]
    projects: Vec<NestedProjectV2>,
}

#[derive(Deserialize)]
struct PersonalInfoV2 {
    name: String,
    #[serde(default)]
    contact_details: ContactDetailsV2,
}

#[derive(Deserialize, Default)]
struct ContactDetailsV2 {
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    phone: Option<String>,
}

#[derive(Deserialize)]
struct NestedExperienceV2 {
    title: String,
    company: String,
    #[serde(default)]
    responsibilities: Vec<String>,
}

#[derive(Deserialize)]
struct NestedProjectV2 {
    title: String,
    #[serde(default)]
    details: Vec<String>,
}

/// Map parser output to a résumé record with the given id.
pub fn parse_resume_document(
    value: &Value,
    id: &str,
    file_ref: Option<String>,
) -> SkillGraphResult<ResumeRecord> {
    match ResumeSchema::detect(value)? {
        ResumeSchema::FlatV1 => {
            let doc: FlatResumeV1 = serde_json::from_value(value.clone())
                .map_err(|e| SkillGraphError::parse(format!("flat v1 resume: {}", e)))?;
            Ok(map_flat_v1(doc, id, file_ref))
        }
        ResumeSchema::NestedV2 => {
            let doc: NestedResumeV2 = serde_json::from_value(value.clone())
                .map_err(|e| SkillGraphError::parse(format!("nested v2 resume: {}", e)))?;
            Ok(map_nested_v2(doc, id, file_ref))
        }
    }
}

fn map_flat_v1(doc: FlatResumeV1, id: &str, file_ref: Option<String>) -> ResumeRecord {
    ResumeRecord {
        id: id.to_string(),
        name: doc.name.trim().to_string(),
        email: doc.email.unwrap_or_default(),
        phone: doc.phone.unwrap_or_default(),
        summary: doc.summary.unwrap_or_default(),
        file_ref,
        skills: clean_list(doc.skills),
        experience: doc
            .work_experience
            .into_iter()
            .map(|e| Experience {
                title: e.title,
                company: e.company,
                period: e.dates,
                highlights: Vec::new(),
            })
            .collect(),
        projects: doc
            .projects
            .into_iter()
            .map(|p| Project {
                name: p.name,
                description: p.description,
            })
            .collect(),
    }
}

fn map_nested_v2(doc: NestedResumeV2, id: &str, file_ref: Option<String>) -> ResumeRecord {
    let contact = doc.personal_information.contact_details;
    ResumeRecord {
        id: id.to_string(),
        name: doc.personal_information.name.trim().to_string(),
        email: contact.email.unwrap_or_default(),
        phone: contact.phone.unwrap_or_default(),
        summary: doc.career_objective.unwrap_or_default(),
        file_ref,
        skills: clean_list(doc.skills.into_values().flatten().collect()),
        experience: doc
            .professional_experience
            .into_iter()
            .map(|e| Experience {
                title: e.title,
                company: e.company,
                period: None,
                highlights: e.responsibilities,
            })
            .collect(),
        projects: doc
            .projects
            .into_iter()
            .map(|p| Project {
                name: p.title,
                description: p.details.join(" "),
            })
            .collect(),
    }
}

#[derive(Deserialize)]
struct JobDocumentV1 {
    #[serde(default)]
    title: Option<String>,
    #[serde(alias = "job_description")]
    description: String,
    #[serde(default)]
    link: Option<String>,
    skills: Vec<String>,
}

/// Map a job extraction document (`{title?, job_description, link?, skills}`)
/// to a job record with the given id.
pub fn parse_job_document(value: &Value, id: &str) -> SkillGraphResult<JobRecord> {
    let doc: JobDocumentV1 = serde_json::from_value(value.clone())
        .map_err(|e| SkillGraphError::parse(format!("job document: {}", e)))?;

    let description = doc.description.trim().to_string();
    let title = doc
        .title
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| derive_title(&description));

    Ok(JobRecord {
        id: id.to_string(),
        title,
        description,
        link: doc.link.filter(|l| !l.trim().is_empty()),
        skills: clean_list(doc.skills),
    })
}

/// First line of the description, cut at a word boundary near 80 chars.
fn derive_title(description: &str) -> String {
    let first = description.lines().next().unwrap_or("").trim();
    if first.is_empty() {
        return "Untitled Job".to_string();
    }
    if first.chars().count() <= 80 {
        return first.to_string();
    }
    let cut: String = first.chars().take(80).collect();
    let boundary = cut.rfind(' ').unwrap_or(cut.len());
    format!("{}...", &cut[..boundary])
}

fn clean_list(items: Vec<String>) -> Vec<String> {
    items
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_flat_v1_resume() {
        let doc = json!({
            "name": "Ada Lovelace",
            "email": "ada@example.com",
            "phone": "555-0100",
            "summary": "Analyst",
            "skills": ["Python", " SQL ", ""],
            "work_experience": [{"title": "Engineer", "company": "Acme", "dates": "2020-2023"}],
            "projects": [{"name": "Engine", "description": "Difference engine"}]
        });
        let record = parse_resume_document(&doc, "r1", Some("file-1".into())).unwrap();
        assert_eq!(record.name, "Ada Lovelace");
        assert_eq!(record.skills, vec!["Python", "SQL"]);
        assert_eq!(record.experience[0].period.as_deref(), Some("2020-2023"));
        assert_eq!(record.file_ref.as_deref(), Some("file-1"));
    }

    #[test]
    fn test_nested_v2_resume_flattens_skill_categories() {
        let doc = json!({
            "personal_information": {
                "name": "Grace Hopper",
                "contact_details": {"email": "grace@example.com", "phone": "555-0199"}
            },
            "career_objective": "Compilers",
            "skills": {"languages": ["COBOL"], "frameworks": ["Flask"]},
            "professional_experience": [
                {"title": "Officer", "company": "Navy", "responsibilities": ["Debugging"]}
            ],
            "projects": [{"title": "A-0", "details": ["First", "compiler"]}]
        });
        let record = parse_resume_document(&doc, "r2", None).unwrap();
        assert_eq!(record.email, "grace@example.com");
        assert_eq!(record.summary, "Compilers");
        assert_eq!(record.skills.len(), 2);
        assert!(record.skills.contains(&"COBOL".to_string()));
        assert_eq!(record.projects[0].description, "First compiler");
    }

    #[test]
    fn test_unknown_resume_shape_is_a_parse_error() {
        let doc = json!({"candidate": {"fullName": "X"}, "abilities": "python"});
        let err = parse_resume_document(&doc, "r3", None).unwrap_err();
        assert!(matches!(err, SkillGraphError::Parse(_)));

        let not_object = json!(["python"]);
        assert!(parse_resume_document(&not_object, "r3", None).is_err());
    }

    #[test]
    fn test_known_shape_with_wrong_types_is_a_parse_error() {
        let doc = json!({"name": "X", "skills": [1, 2, 3]});
        assert!(matches!(
            parse_resume_document(&doc, "r4", None),
            Err(SkillGraphError::Parse(_))
        ));
    }

    #[test]
    fn test_job_document_accepts_job_description_alias() {
        let doc = json!({
            "job_description": "Senior Rust Engineer\nWe build graph engines.",
            "skills": ["Rust", "Neo4j"]
        });
        let job = parse_job_document(&doc, "j1").unwrap();
        assert_eq!(job.title, "Senior Rust Engineer");
        assert_eq!(job.skills, vec!["Rust", "Neo4j"]);
        assert!(job.link.is_none());
    }

    #[test]
    fn test_long_job_title_is_truncated() {
        let long = format!("{} tail", "word ".repeat(30));
        let doc = json!({"description": long, "skills": []});
        let job = parse_job_document(&doc, "j2").unwrap();
        assert!(job.title.ends_with("..."));
        assert!(job.title.chars().count() <= 83);
    }

    #[test]
    fn test_job_document_without_skills_is_rejected() {
        let doc = json!({"description": "Anything"});
        assert!(matches!(parse_job_document(&doc, "j3"), Err(SkillGraphError::Parse(_))));
    }
}
