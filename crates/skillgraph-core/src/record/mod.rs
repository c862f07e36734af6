//! System-of-record access for canonical resume and job documents.

pub mod model;

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::SkillGraphResult;
use model::{JobRecord, ResumeRecord};

/// Canonical document store keyed by opaque id.
///
/// The graph only mirrors identifiers and a display subset; everything
/// else is read back from here when results are enriched.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn upsert_resume(&self, record: &ResumeRecord) -> SkillGraphResult<()>;
    async fn find_resume(&self, id: &str) -> SkillGraphResult<Option<ResumeRecord>>;
    /// Returns `false` when no record with this id existed.
    async fn delete_resume(&self, id: &str) -> SkillGraphResult<bool>;
    async fn list_resumes(&self) -> SkillGraphResult<Vec<ResumeRecord>>;

    async fn upsert_job(&self, record: &JobRecord) -> SkillGraphResult<()>;
    async fn find_job(&self, id: &str) -> SkillGraphResult<Option<JobRecord>>;
    async fn delete_job(&self, id: &str) -> SkillGraphResult<bool>;
    async fn list_jobs(&self) -> SkillGraphResult<Vec<JobRecord>>;
}

/// Process-local record store.
#[derive(Default)]
pub struct MemoryRecordStore {
    resumes: RwLock<BTreeMap<String, ResumeRecord>>,
    jobs: RwLock<BTreeMap<String, JobRecord>>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn upsert_resume(&self, record: &ResumeRecord) -> SkillGraphResult<()> {
        self.resumes.write().await.insert(record.id.clone(), record.clone());
        Ok(())
    }

    async fn find_resume(&self, id: &str) -> SkillGraphResult<Option<ResumeRecord>> {
        Ok(self.resumes.read().await.get(id).cloned())
    }

    async fn delete_resume(&self, id: &str) -> SkillGraphResult<bool> {
        Ok(self.resumes.write().await.remove(id).is_some())
    }

    async fn list_resumes(&self) -> SkillGraphResult<Vec<ResumeRecord>> {
        Ok(self.resumes.read().await.values().cloned().collect())
    }

    async fn upsert_job(&self, record: &JobRecord) -> SkillGraphResult<()> {
        self.jobs.write().await.insert(record.id.clone(), record.clone());
        Ok(())
    }

    async fn find_job(&self, id: &str) -> SkillGraphResult<Option<JobRecord>> {
        Ok(self.jobs.read().await.get(id).cloned())
    }

    async fn delete_job(&self, id: &str) -> SkillGraphResult<bool> {
        Ok(self.jobs.write().await.remove(id).is_some())
    }

    async fn list_jobs(&self) -> SkillGraphResult<Vec<JobRecord>> {
        Ok(self.jobs.read().await.values().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job(id: &str) -> JobRecord {
        JobRecord {
            id: id.to_string(),
            title: "Backend Engineer".to_string(),
            description: "Build APIs".to_string(),
            link: None,
            skills: vec!["Rust".to_string()],
        }
    }

    #[tokio::test]
    async fn test_memory_store_upsert_replaces() {
        let store = MemoryRecordStore::new();
        store.upsert_job(&job("j1")).await.unwrap();

        let mut updated = job("j1");
        updated.title = "Platform Engineer".to_string();
        store.upsert_job(&updated).await.unwrap();

        let found = store.find_job("j1").await.unwrap().unwrap();
        assert_eq!(found.title, "Platform Engineer");
        assert_eq!(store.list_jobs().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_memory_store_delete_reports_existence() {
        let store = MemoryRecordStore::new();
        store.upsert_job(&job("j1")).await.unwrap();

        assert!(store.delete_job("j1").await.unwrap());
        assert!(!store.delete_job("j1").await.unwrap());
        assert!(store.find_job("j1").await.unwrap().is_none());
    }
}
