//! Solace Algo - matching service for the Solace bereavement support platform
//!
//! This library scores counselors and peer support groups against a bereaved
//! person's survey profile, returns a ranked shortlist, and manages the
//! lifecycle of match requests.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{
    age_bracket_on, rank, score, score_at, MatchError, MatchService, ScoringProfile,
    SHORTLIST_LIMIT,
};
pub use crate::models::{
    AgeBracket, Candidate, CandidateKind, Counselor, MatchRecord, MatchStatus, PersonRecord,
    Relationship, ScoredCandidate, Specialty, SupportGroup, SupportLevel,
};

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_library_exports() {
        // Verify that the library exports work correctly
        let birth = NaiveDate::from_ymd_opt(1990, 1, 1).unwrap();
        let today = NaiveDate::from_ymd_opt(2025, 6, 15).unwrap();
        assert_eq!(age_bracket_on(birth, today), AgeBracket::YoungAdult);
    }
}
