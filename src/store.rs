use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use crate::roster::{seed_students, StudentRecord};
use crate::validate::StudentDraft;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("student not found: {id}")]
    NotFound { id: String },

    /// The id is already taken. `MemoryStore` mints uuids so it only sees
    /// this on a collision; repositories that accept caller-chosen ids
    /// (imports, a persistent backend) report it through the same code.
    #[error("student already exists: {id}")]
    Duplicate { id: String },
}

/// Where student records come from. The view-model only ever sees the
/// snapshots returned by `fetch_all`.
pub trait StudentRepository {
    fn fetch_all(&self) -> Result<Vec<StudentRecord>, StoreError>;

    fn fetch_by_id(&self, id: &str) -> Result<StudentRecord, StoreError>;

    fn create(&mut self, draft: StudentDraft) -> Result<StudentRecord, StoreError>;

    fn persist_edit(&mut self, record: StudentRecord) -> Result<StudentRecord, StoreError>;

    fn len(&self) -> usize;
}

/// Process-lifetime store; everything here is gone when the sidecar exits.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Vec<StudentRecord>,
}

impl MemoryStore {
    pub fn new(records: Vec<StudentRecord>) -> Self {
        Self { records }
    }

    pub fn seeded() -> Self {
        Self::new(seed_students())
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.records.iter().position(|r| r.id == id)
    }
}

impl StudentRepository for MemoryStore {
    fn fetch_all(&self) -> Result<Vec<StudentRecord>, StoreError> {
        Ok(self.records.clone())
    }

    fn fetch_by_id(&self, id: &str) -> Result<StudentRecord, StoreError> {
        self.records
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound { id: id.to_string() })
    }

    fn create(&mut self, draft: StudentDraft) -> Result<StudentRecord, StoreError> {
        let id = Uuid::new_v4().to_string();
        if self.position(&id).is_some() {
            return Err(StoreError::Duplicate { id });
        }
        let record = draft.into_record(id);
        debug!(student_id = %record.id, "student created");
        self.records.push(record.clone());
        Ok(record)
    }

    fn persist_edit(&mut self, record: StudentRecord) -> Result<StudentRecord, StoreError> {
        let Some(idx) = self.position(&record.id) else {
            return Err(StoreError::NotFound { id: record.id });
        };
        debug!(student_id = %record.id, "student updated");
        self.records[idx] = record.clone();
        Ok(record)
    }

    fn len(&self) -> usize {
        self.records.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::{StudentProfile, StudentStatus};

    fn draft(first: &str) -> StudentDraft {
        StudentDraft {
            first_name: first.to_string(),
            last_name: "Nguyen".to_string(),
            status: StudentStatus::Lead,
            profile: StudentProfile::Adult {
                birth_date: None,
                occupation: None,
            },
            tags: Vec::new(),
            credits: 0,
            next_lesson: None,
            email: Some("an@example.com".to_string()),
            phone: None,
            notes: String::new(),
        }
    }

    #[test]
    fn create_appends_with_fresh_id() {
        let mut store = MemoryStore::seeded();
        let before = store.len();
        let a = store.create(draft("An")).expect("create");
        let b = store.create(draft("Bao")).expect("create");
        assert_ne!(a.id, b.id);
        assert_eq!(store.len(), before + 2);
        let all = store.fetch_all().expect("fetch");
        assert_eq!(all.last().map(|r| r.id.as_str()), Some(b.id.as_str()));
    }

    #[test]
    fn persist_edit_replaces_in_place() {
        let mut store = MemoryStore::seeded();
        let mut r = store.fetch_by_id("stu-004").expect("fetch");
        r.status = StudentStatus::Active;
        store.persist_edit(r).expect("edit");
        let all = store.fetch_all().expect("fetch");
        assert_eq!(all[3].id, "stu-004");
        assert_eq!(all[3].status, StudentStatus::Active);
    }

    #[test]
    fn missing_ids_report_not_found() {
        let mut store = MemoryStore::default();
        assert_eq!(
            store.fetch_by_id("nope").unwrap_err(),
            StoreError::NotFound { id: "nope".into() }
        );
        let mut r = seed_students().remove(0);
        r.id = "ghost".into();
        assert_eq!(
            store.persist_edit(r).unwrap_err(),
            StoreError::NotFound { id: "ghost".into() }
        );
    }
}
