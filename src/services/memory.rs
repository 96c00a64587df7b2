use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;
use uuid::Uuid;

use crate::models::{
    Candidate, CandidateKind, Counselor, MatchRecord, MatchStatus, PersonRecord, SupportGroup,
};
use crate::services::store::{CandidateStore, MatchStore, ProfileStore, StoreError};

/// In-memory profile and candidate directory.
///
/// Backs the lifecycle service in tests and local runs; mirrors the
/// eligibility filtering the real directory performs.
#[derive(Debug, Clone, Default)]
pub struct MemoryDirectory {
    persons: Arc<Mutex<HashMap<String, PersonRecord>>>,
    counselors: Arc<Mutex<Vec<Counselor>>>,
    groups: Arc<Mutex<Vec<SupportGroup>>>,
}

impl MemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn put_person(&self, person: PersonRecord) {
        self.persons
            .lock()
            .await
            .insert(person.person_id.clone(), person);
    }

    pub async fn put_counselor(&self, counselor: Counselor) {
        self.counselors.lock().await.push(counselor);
    }

    pub async fn put_group(&self, group: SupportGroup) {
        self.groups.lock().await.push(group);
    }
}

impl ProfileStore for MemoryDirectory {
    async fn get_person(&self, person_id: &str) -> Result<PersonRecord, StoreError> {
        self.persons
            .lock()
            .await
            .get(person_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("person {}", person_id)))
    }
}

impl CandidateStore for MemoryDirectory {
    async fn list_eligible(&self, kind: CandidateKind) -> Result<Vec<Candidate>, StoreError> {
        let pool = match kind {
            CandidateKind::Counselor => self
                .counselors
                .lock()
                .await
                .iter()
                .filter(|c| c.is_available())
                .cloned()
                .map(Candidate::Counselor)
                .collect(),
            CandidateKind::Group => self
                .groups
                .lock()
                .await
                .iter()
                .filter(|g| g.is_active() && g.has_capacity())
                .cloned()
                .map(Candidate::Group)
                .collect(),
        };
        Ok(pool)
    }

    async fn get_candidate(
        &self,
        candidate_id: &str,
        kind: CandidateKind,
    ) -> Result<Candidate, StoreError> {
        let found = match kind {
            CandidateKind::Counselor => self
                .counselors
                .lock()
                .await
                .iter()
                .find(|c| c.counselor_id == candidate_id)
                .cloned()
                .map(Candidate::Counselor),
            CandidateKind::Group => self
                .groups
                .lock()
                .await
                .iter()
                .find(|g| g.group_id == candidate_id)
                .cloned()
                .map(Candidate::Group),
        };
        found.ok_or_else(|| StoreError::NotFound(format!("candidate {}", candidate_id)))
    }
}

/// In-memory match record store enforcing the same one-pending-per-pair
/// constraint the Postgres partial unique index enforces.
#[derive(Debug, Clone, Default)]
pub struct MemoryMatchStore {
    records: Arc<Mutex<Vec<MatchRecord>>>,
}

impl MemoryMatchStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MatchStore for MemoryMatchStore {
    async fn insert(&self, record: MatchRecord) -> Result<MatchRecord, StoreError> {
        let mut records = self.records.lock().await;
        let duplicate = records.iter().any(|r| {
            r.person_id == record.person_id
                && r.candidate_id == record.candidate_id
                && r.status == MatchStatus::Pending
        });
        if duplicate {
            return Err(StoreError::DuplicatePending {
                person_id: record.person_id.clone(),
                candidate_id: record.candidate_id.clone(),
            });
        }
        records.push(record.clone());
        Ok(record)
    }

    async fn find_pending(
        &self,
        person_id: &str,
        candidate_id: &str,
    ) -> Result<Option<MatchRecord>, StoreError> {
        Ok(self
            .records
            .lock()
            .await
            .iter()
            .find(|r| {
                r.person_id == person_id
                    && r.candidate_id == candidate_id
                    && r.status == MatchStatus::Pending
            })
            .cloned())
    }

    async fn get(&self, id: Uuid) -> Result<MatchRecord, StoreError> {
        self.records
            .lock()
            .await
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("match {}", id)))
    }

    async fn list_by_person(
        &self,
        person_id: &str,
        kind: Option<CandidateKind>,
    ) -> Result<Vec<MatchRecord>, StoreError> {
        let mut matching: Vec<MatchRecord> = self
            .records
            .lock()
            .await
            .iter()
            .filter(|r| r.person_id == person_id && kind.map_or(true, |k| r.kind == k))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(matching)
    }

    async fn update(&self, record: MatchRecord) -> Result<MatchRecord, StoreError> {
        let mut records = self.records.lock().await;
        match records.iter_mut().find(|r| r.id == record.id) {
            Some(slot) => {
                *slot = record.clone();
                Ok(record)
            }
            None => Err(StoreError::NotFound(format!("match {}", record.id))),
        }
    }
}
