use chrono::Utc;
use uuid::Uuid;

use crate::core::error::MatchError;
use crate::core::profile::ScoringProfile;
use crate::core::ranker::rank;
use crate::core::scoring::score;
use crate::models::{Candidate, CandidateKind, MatchRecord, MatchStatus, ScoredCandidate};
use crate::services::{CandidateStore, MatchStore, ProfileStore, StoreError};

/// Match lifecycle manager.
///
/// Owns the read-score-rank pipeline for recommendations and the
/// create/update/query lifecycle of match records. Generic over its three
/// stores so the whole flow can be exercised against in-memory
/// implementations.
#[derive(Debug, Clone)]
pub struct MatchService<P, C, M> {
    profiles: P,
    candidates: C,
    matches: M,
}

impl<P, C, M> MatchService<P, C, M>
where
    P: ProfileStore,
    C: CandidateStore,
    M: MatchStore,
{
    pub fn new(profiles: P, candidates: C, matches: M) -> Self {
        Self {
            profiles,
            candidates,
            matches,
        }
    }

    /// Score the eligible pool for a person and return the top shortlist.
    ///
    /// The candidate pool is a point-in-time snapshot; scores are advisory
    /// and slightly stale capacity data is acceptable.
    pub async fn recommend(
        &self,
        person_id: &str,
        kind: CandidateKind,
    ) -> Result<Vec<ScoredCandidate>, MatchError> {
        let person = self
            .profiles
            .get_person(person_id)
            .await
            .map_err(|e| not_found_as(e, || MatchError::PersonNotFound(person_id.to_string())))?;
        let profile = ScoringProfile::resolve(&person);

        let pool = self
            .candidates
            .list_eligible(kind)
            .await
            .map_err(MatchError::Store)?;

        tracing::debug!(
            "Ranking {} eligible {:?} candidates for person {}",
            pool.len(),
            kind,
            person_id
        );

        Ok(rank(&profile, pool, Utc::now()))
    }

    /// Full eligible pool for a kind, in the store's listing order.
    pub async fn list_all(&self, kind: CandidateKind) -> Result<Vec<Candidate>, MatchError> {
        self.candidates
            .list_eligible(kind)
            .await
            .map_err(MatchError::Store)
    }

    pub async fn get_candidate(
        &self,
        candidate_id: &str,
        kind: CandidateKind,
    ) -> Result<Candidate, MatchError> {
        self.candidates
            .get_candidate(candidate_id, kind)
            .await
            .map_err(|e| not_found_as(e, || MatchError::CandidateNotFound(candidate_id.to_string())))
    }

    /// Create a PENDING match request for a person and candidate.
    ///
    /// Validates existence, availability and (for groups) capacity, rejects a
    /// duplicate pending request, scores the pairing once and persists it.
    /// The store's unique-pending constraint is the authoritative guard
    /// against racing creates; the check here just fails fast.
    pub async fn create_match(
        &self,
        person_id: &str,
        candidate_id: &str,
        kind: CandidateKind,
    ) -> Result<MatchRecord, MatchError> {
        let person = self
            .profiles
            .get_person(person_id)
            .await
            .map_err(|e| not_found_as(e, || MatchError::PersonNotFound(person_id.to_string())))?;

        let candidate = self
            .candidates
            .get_candidate(candidate_id, kind)
            .await
            .map_err(|e| not_found_as(e, || MatchError::CandidateNotFound(candidate_id.to_string())))?;

        match &candidate {
            Candidate::Counselor(counselor) if !counselor.is_available() => {
                return Err(MatchError::CandidateUnavailable(candidate_id.to_string()));
            }
            Candidate::Group(group) if !group.is_active() => {
                return Err(MatchError::CandidateUnavailable(candidate_id.to_string()));
            }
            Candidate::Group(group) if !group.has_capacity() => {
                return Err(MatchError::GroupFull(candidate_id.to_string()));
            }
            _ => {}
        }

        let pending = self
            .matches
            .find_pending(person_id, candidate_id)
            .await
            .map_err(MatchError::Store)?;
        if pending.is_some() {
            return Err(MatchError::DuplicatePending(candidate_id.to_string()));
        }

        let profile = ScoringProfile::resolve(&person);
        let match_score = score(&profile, &candidate);
        let record = MatchRecord::pending(person_id, candidate_id, kind, match_score, Utc::now());

        tracing::info!(
            "Creating match request {} for person {} and {:?} {} (score {})",
            record.id,
            person_id,
            kind,
            candidate_id,
            match_score
        );

        self.matches.insert(record).await.map_err(|e| match e {
            StoreError::DuplicatePending { candidate_id, .. } => {
                MatchError::DuplicatePending(candidate_id)
            }
            other => MatchError::Store(other),
        })
    }

    /// Apply an explicit status transition to an existing match record.
    ///
    /// The stored score is never recomputed; a completion timestamp is
    /// stamped only when the new status is COMPLETED.
    pub async fn update_status(
        &self,
        match_id: Uuid,
        status: MatchStatus,
        notes: Option<String>,
        rejection_reason: Option<String>,
    ) -> Result<MatchRecord, MatchError> {
        let mut record = self
            .matches
            .get(match_id)
            .await
            .map_err(|e| not_found_as(e, || MatchError::MatchNotFound(match_id)))?;

        if !record.status.can_transition_to(status) {
            return Err(MatchError::InvalidTransition {
                from: record.status,
                to: status,
            });
        }

        let now = Utc::now();
        record.status = status;
        record.updated_at = now;
        if notes.is_some() {
            record.notes = notes;
        }
        if rejection_reason.is_some() {
            record.rejection_reason = rejection_reason;
        }
        if status == MatchStatus::Completed {
            record.completed_at = Some(now);
        }

        tracing::info!("Match {} moved to {:?}", match_id, status);

        self.matches
            .update(record)
            .await
            .map_err(|e| not_found_as(e, || MatchError::MatchNotFound(match_id)))
    }

    /// Match records for a person, newest first.
    pub async fn list_matches(
        &self,
        person_id: &str,
        kind: Option<CandidateKind>,
    ) -> Result<Vec<MatchRecord>, MatchError> {
        self.matches
            .list_by_person(person_id, kind)
            .await
            .map_err(MatchError::Store)
    }
}

/// Map a store NotFound to a domain-specific NotFound, pass the rest through.
fn not_found_as(err: StoreError, missing: impl FnOnce() -> MatchError) -> MatchError {
    match err {
        StoreError::NotFound(_) => missing(),
        other => MatchError::Store(other),
    }
}
