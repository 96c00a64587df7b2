// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    AgeBracket, Candidate, CandidateKind, Counselor, CounselorStatus, GroupStatus, MatchRecord,
    MatchStatus, PersonRecord, Relationship, ScoredCandidate, Specialty, SupportGroup,
    SupportLevel,
};
pub use requests::{CreateGroupMatchRequest, CreateMatchRequest, MatchListQuery, UpdateMatchRequest};
pub use responses::{ErrorResponse, HealthResponse, RecommendationsResponse};
