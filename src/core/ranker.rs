use chrono::{DateTime, Utc};

use crate::core::profile::ScoringProfile;
use crate::core::scoring::score_at;
use crate::models::{Candidate, ScoredCandidate};

/// Maximum number of entries in a recommendation shortlist.
pub const SHORTLIST_LIMIT: usize = 10;

/// Score an eligible candidate pool and return the shortlist.
///
/// The pool is expected to be pre-filtered by the candidate store (available
/// counselors, active non-full groups). Candidates are sorted by score
/// descending; the sort is stable, so ties keep the pool's original relative
/// order. At most [`SHORTLIST_LIMIT`] entries are returned.
pub fn rank(
    profile: &ScoringProfile,
    pool: Vec<Candidate>,
    now: DateTime<Utc>,
) -> Vec<ScoredCandidate> {
    let mut shortlist: Vec<ScoredCandidate> = pool
        .into_iter()
        .map(|candidate| {
            let score = score_at(profile, &candidate, now);
            ScoredCandidate { candidate, score }
        })
        .collect();

    shortlist.sort_by(|a, b| b.score.cmp(&a.score));
    shortlist.truncate(SHORTLIST_LIMIT);
    shortlist
}
