// Core algorithm exports
pub mod error;
pub mod lifecycle;
pub mod profile;
pub mod ranker;
pub mod scoring;

pub use error::MatchError;
pub use lifecycle::MatchService;
pub use profile::{age_bracket_on, age_on, ScoringProfile};
pub use ranker::{rank, SHORTLIST_LIMIT};
pub use scoring::{score, score_at};
