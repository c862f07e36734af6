//! Canonical resume and job records held by the system of record.

use serde::{Deserialize, Serialize};

/// A candidate's résumé as stored in the system of record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResumeRecord {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub summary: String,
    /// Reference to the original uploaded file, owned by file storage.
    pub file_ref: Option<String>,
    pub skills: Vec<String>,
    #[serde(default)]
    pub experience: Vec<Experience>,
    #[serde(default)]
    pub projects: Vec<Project>,
}

/// One position in a résumé's work history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Experience {
    pub title: String,
    pub company: String,
    pub period: Option<String>,
    #[serde(default)]
    pub highlights: Vec<String>,
}

/// A project listed on a résumé.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub name: String,
    pub description: String,
}

/// A job posting as stored in the system of record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRecord {
    pub id: String,
    pub title: String,
    pub description: String,
    pub link: Option<String>,
    pub skills: Vec<String>,
}
