use thiserror::Error;
use uuid::Uuid;

use crate::models::{Candidate, CandidateKind, MatchRecord, PersonRecord};

/// Errors reported by a backing store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record not found: {0}")]
    NotFound(String),

    #[error("a pending match already exists for person {person_id} and candidate {candidate_id}")]
    DuplicatePending {
        person_id: String,
        candidate_id: String,
    },

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Read access to person records.
#[allow(async_fn_in_trait)]
pub trait ProfileStore {
    async fn get_person(&self, person_id: &str) -> Result<PersonRecord, StoreError>;
}

/// Read access to the candidate pool.
///
/// `list_eligible` returns candidates already filtered for eligibility:
/// AVAILABLE counselors, ACTIVE groups with open seats.
#[allow(async_fn_in_trait)]
pub trait CandidateStore {
    async fn list_eligible(&self, kind: CandidateKind) -> Result<Vec<Candidate>, StoreError>;

    async fn get_candidate(
        &self,
        candidate_id: &str,
        kind: CandidateKind,
    ) -> Result<Candidate, StoreError>;
}

/// Persistence for match records.
///
/// `insert` must enforce the at-most-one-pending invariant atomically and
/// report violations as [`StoreError::DuplicatePending`]; the lifecycle
/// manager's own pending check is only a fast path.
#[allow(async_fn_in_trait)]
pub trait MatchStore {
    async fn insert(&self, record: MatchRecord) -> Result<MatchRecord, StoreError>;

    async fn find_pending(
        &self,
        person_id: &str,
        candidate_id: &str,
    ) -> Result<Option<MatchRecord>, StoreError>;

    async fn get(&self, id: Uuid) -> Result<MatchRecord, StoreError>;

    /// Records for a person, newest first, optionally restricted to a kind.
    async fn list_by_person(
        &self,
        person_id: &str,
        kind: Option<CandidateKind>,
    ) -> Result<Vec<MatchRecord>, StoreError>;

    async fn update(&self, record: MatchRecord) -> Result<MatchRecord, StoreError>;
}
