use chrono::{DateTime, Utc};

use crate::core::profile::ScoringProfile;
use crate::models::{AgeBracket, Candidate, Counselor, Relationship, Specialty, SupportGroup, SupportLevel};

/// Calculate the match score for a candidate against a normalized profile.
///
/// Counselor scoring accumulates:
/// - rating * 15 (0-75) and capped experience * 2 (0-30)
/// - relationship expertise: +40, with +10 for a lost child / +8 for a lost spouse
/// - support level coverage: +30, with +10 when the need is HIGH
/// - age bracket coverage: +25 (only when the birth date is known)
/// - a specialty bonus keyed on (specialty, relationship, bracket)
/// - spare daily capacity: (1 - load ratio) * 15
/// - review trust: +10 above 50 reviews, +5 above 20
///
/// Group scoring accumulates a base of 20, +40/+30 for relationship and age
/// bracket targeting, +15 for a comfortably-filled group and +10 for an
/// upcoming meeting.
///
/// Terms accumulate as f64 and are rounded once at the end. Attribute sets a
/// candidate failed to store readably are already empty by the time they get
/// here, so they simply contribute nothing.
pub fn score_at(profile: &ScoringProfile, candidate: &Candidate, now: DateTime<Utc>) -> i32 {
    let total = match candidate {
        Candidate::Counselor(counselor) => counselor_score(profile, counselor),
        Candidate::Group(group) => group_score(profile, group, now),
    };
    total.round() as i32
}

/// [`score_at`] against the current instant.
pub fn score(profile: &ScoringProfile, candidate: &Candidate) -> i32 {
    score_at(profile, candidate, Utc::now())
}

fn counselor_score(profile: &ScoringProfile, counselor: &Counselor) -> f64 {
    let mut score = counselor.rating * 15.0;
    score += counselor.experience_years.min(15) as f64 * 2.0;

    if let Some(relationship) = profile.relationship {
        if counselor.relationships_served.contains(&relationship) {
            score += 40.0;
            score += match relationship {
                Relationship::Child => 10.0,
                Relationship::Spouse => 8.0,
                _ => 0.0,
            };
        }
    }

    if let Some(level) = profile.support_level {
        if counselor.support_levels_served.contains(&level) {
            score += 30.0;
            if level == SupportLevel::High {
                score += 10.0;
            }
        }
    }

    if let Some(bracket) = profile.age_bracket {
        if counselor.age_brackets_served.contains(&bracket) {
            score += 25.0;
        }
    }

    if let (Some(relationship), Some(bracket)) = (profile.relationship, profile.age_bracket) {
        score += specialty_bonus(counselor.specialty, relationship, bracket);
    }

    // Favor counselors with spare daily capacity.
    score += (1.0 - counselor.workload_ratio()) * 15.0;

    if counselor.review_count > 50 {
        score += 10.0;
    } else if counselor.review_count > 20 {
        score += 5.0;
    }

    score
}

fn group_score(profile: &ScoringProfile, group: &SupportGroup, now: DateTime<Utc>) -> f64 {
    let mut score = 20.0;

    if let Some(relationship) = profile.relationship {
        if group.target_relationships.contains(&relationship) {
            score += 40.0;
        }
    }

    if let Some(bracket) = profile.age_bracket {
        if group.target_age_brackets.contains(&bracket) {
            score += 30.0;
        }
    }

    // A group that is neither empty nor nearly full is easiest to join.
    let ratio = group.membership_ratio();
    if (0.3..=0.8).contains(&ratio) {
        score += 15.0;
    }

    if group.next_meeting_at.is_some_and(|at| at > now) {
        score += 10.0;
    }

    score
}

/// Fixed specialty bonus table keyed on (specialty, relationship, bracket).
fn specialty_bonus(specialty: Specialty, relationship: Relationship, bracket: AgeBracket) -> f64 {
    let mut bonus = 0.0;

    match specialty {
        Specialty::ChildCounseling => {
            if matches!(bracket, AgeBracket::Child | AgeBracket::YoungAdult) {
                bonus += 15.0;
            }
            if relationship == Relationship::Parent {
                bonus += 10.0;
            }
        }
        Specialty::ElderlyCounseling => {
            if bracket == AgeBracket::Senior {
                bonus += 15.0;
            }
            if matches!(relationship, Relationship::Spouse | Relationship::Child) {
                bonus += 10.0;
            }
        }
        Specialty::FamilyTherapy => {
            if matches!(relationship, Relationship::Child | Relationship::Sibling) {
                bonus += 12.0;
            }
        }
        Specialty::TraumaTherapy => {
            if relationship == Relationship::Other {
                bonus += 15.0;
            }
        }
        Specialty::GriefCounseling => {
            bonus += 8.0;
        }
        Specialty::GroupTherapy => {
            bonus += 5.0;
        }
    }

    bonus
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CounselorStatus, GroupStatus};
    use chrono::Duration;

    fn counselor(specialty: Specialty) -> Counselor {
        Counselor {
            counselor_id: "c-1".to_string(),
            name: "Dr. Han".to_string(),
            specialty,
            relationships_served: vec![Relationship::Spouse, Relationship::Parent],
            support_levels_served: vec![SupportLevel::High, SupportLevel::Medium],
            age_brackets_served: vec![],
            rating: 4.9,
            review_count: 156,
            experience_years: 20,
            status: CounselorStatus::Available,
            max_clients_per_day: 8,
            current_clients_today: 2,
            introduction: None,
        }
    }

    fn group() -> SupportGroup {
        SupportGroup {
            group_id: "g-1".to_string(),
            name: "Widowed Partners Circle".to_string(),
            description: None,
            target_relationships: vec![Relationship::Spouse],
            target_age_brackets: vec![AgeBracket::MiddleAged],
            max_members: 10,
            current_members: 5,
            status: GroupStatus::Active,
            next_meeting_at: None,
            location: None,
            meeting_details: None,
        }
    }

    fn profile() -> ScoringProfile {
        ScoringProfile {
            relationship: Some(Relationship::Spouse),
            support_level: Some(SupportLevel::High),
            age_bracket: Some(AgeBracket::MiddleAged),
        }
    }

    #[test]
    fn test_counselor_reference_score() {
        // 73.5 rating + 30 experience + 40 + 8 relationship + 30 + 10 support
        // + 0 brackets + 8 grief flat + 11.25 workload + 10 reviews = 220.75
        let candidate = Candidate::Counselor(counselor(Specialty::GriefCounseling));
        assert_eq!(score_at(&profile(), &candidate, Utc::now()), 221);
    }

    #[test]
    fn test_scoring_is_deterministic() {
        let candidate = Candidate::Counselor(counselor(Specialty::GriefCounseling));
        let now = Utc::now();
        let first = score_at(&profile(), &candidate, now);
        let second = score_at(&profile(), &candidate, now);
        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_attribute_sets_contribute_zero() {
        let mut bare = counselor(Specialty::GriefCounseling);
        bare.relationships_served = vec![];
        bare.support_levels_served = vec![];

        let full = score_at(
            &profile(),
            &Candidate::Counselor(counselor(Specialty::GriefCounseling)),
            Utc::now(),
        );
        let stripped = score_at(&profile(), &Candidate::Counselor(bare), Utc::now());

        // 40 + 8 relationship and 30 + 10 support terms dropped.
        assert_eq!(full - stripped, 88);
    }

    #[test]
    fn test_unknown_birth_date_skips_age_terms() {
        let mut served = counselor(Specialty::ChildCounseling);
        served.age_brackets_served = vec![AgeBracket::Child];

        let mut no_age = profile();
        no_age.age_bracket = None;
        let with_age = ScoringProfile {
            age_bracket: Some(AgeBracket::Child),
            ..no_age
        };

        let candidate = Candidate::Counselor(served);
        // Bracket coverage (25) and the child-counseling bracket bonus (15)
        // both require a known birth date.
        let diff = score_at(&with_age, &candidate, Utc::now())
            - score_at(&no_age, &candidate, Utc::now());
        assert_eq!(diff, 40);
    }

    #[test]
    fn test_specialty_bonus_table() {
        let b = specialty_bonus;
        assert_eq!(b(Specialty::ChildCounseling, Relationship::Parent, AgeBracket::Child), 25.0);
        assert_eq!(b(Specialty::ChildCounseling, Relationship::Spouse, AgeBracket::YoungAdult), 15.0);
        assert_eq!(b(Specialty::ElderlyCounseling, Relationship::Child, AgeBracket::Senior), 25.0);
        assert_eq!(b(Specialty::ElderlyCounseling, Relationship::Spouse, AgeBracket::Child), 10.0);
        assert_eq!(b(Specialty::FamilyTherapy, Relationship::Sibling, AgeBracket::Senior), 12.0);
        assert_eq!(b(Specialty::FamilyTherapy, Relationship::Spouse, AgeBracket::Senior), 0.0);
        assert_eq!(b(Specialty::TraumaTherapy, Relationship::Other, AgeBracket::MiddleAged), 15.0);
        assert_eq!(b(Specialty::TraumaTherapy, Relationship::Spouse, AgeBracket::MiddleAged), 0.0);
        assert_eq!(b(Specialty::GriefCounseling, Relationship::Spouse, AgeBracket::Child), 8.0);
        assert_eq!(b(Specialty::GroupTherapy, Relationship::Other, AgeBracket::Senior), 5.0);
    }

    #[test]
    fn test_workload_favors_spare_capacity() {
        let idle = counselor(Specialty::GriefCounseling);
        let mut swamped = counselor(Specialty::GriefCounseling);
        swamped.current_clients_today = 8;

        let now = Utc::now();
        assert!(
            score_at(&profile(), &Candidate::Counselor(idle), now)
                > score_at(&profile(), &Candidate::Counselor(swamped), now)
        );
    }

    #[test]
    fn test_zero_capacity_does_not_divide_by_zero() {
        let mut c = counselor(Specialty::GriefCounseling);
        c.max_clients_per_day = 0;
        c.current_clients_today = 0;

        let got = score_at(&profile(), &Candidate::Counselor(c), Utc::now());
        assert!(got > 0);
    }

    #[test]
    fn test_group_full_house() {
        let now = Utc::now();
        let mut g = group();
        g.next_meeting_at = Some(now + Duration::days(3));

        // 20 base + 40 relationship + 30 bracket + 15 ratio + 10 meeting
        assert_eq!(score_at(&profile(), &Candidate::Group(g), now), 115);
    }

    #[test]
    fn test_group_past_meeting_earns_nothing() {
        let now = Utc::now();
        let mut g = group();
        g.next_meeting_at = Some(now - Duration::days(1));

        assert_eq!(score_at(&profile(), &Candidate::Group(g), now), 105);
    }

    #[test]
    fn test_group_membership_ratio_band() {
        let now = Utc::now();

        let mut sparse = group();
        sparse.current_members = 2; // 0.2, below the band
        let mut packed = group();
        packed.current_members = 9; // 0.9, above the band
        let mut comfy = group();
        comfy.current_members = 3; // 0.3, inclusive lower edge

        let base = score_at(&profile(), &Candidate::Group(sparse), now);
        assert_eq!(score_at(&profile(), &Candidate::Group(packed), now), base);
        assert_eq!(score_at(&profile(), &Candidate::Group(comfy), now), base + 15);
    }
}
