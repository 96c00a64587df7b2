// Unit tests for Solace Algo

use chrono::{NaiveDate, Utc};
use solace_algo::core::{age_bracket_on, rank, score_at, ScoringProfile, SHORTLIST_LIMIT};
use solace_algo::models::{
    AgeBracket, Candidate, Counselor, CounselorStatus, GroupStatus, Relationship, Specialty,
    SupportGroup, SupportLevel,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn reference_counselor() -> Counselor {
    Counselor {
        counselor_id: "c-ref".to_string(),
        name: "Dr. Han".to_string(),
        specialty: Specialty::GriefCounseling,
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

fn reference_profile() -> ScoringProfile {
    ScoringProfile {
        relationship: Some(Relationship::Spouse),
        support_level: Some(SupportLevel::High),
        age_bracket: Some(AgeBracket::MiddleAged),
    }
}

#[test]
fn test_age_bracket_boundaries() {
    let today = date(2025, 6, 15);

    assert_eq!(age_bracket_on(date(2007, 6, 15), today), AgeBracket::Child); // 18
    assert_eq!(age_bracket_on(date(2006, 6, 15), today), AgeBracket::YoungAdult); // 19
    assert_eq!(age_bracket_on(date(1990, 6, 15), today), AgeBracket::YoungAdult); // 35
    assert_eq!(age_bracket_on(date(1989, 6, 15), today), AgeBracket::MiddleAged); // 36
    assert_eq!(age_bracket_on(date(1970, 6, 15), today), AgeBracket::MiddleAged); // 55
    assert_eq!(age_bracket_on(date(1969, 6, 15), today), AgeBracket::Senior); // 56
}

#[test]
fn test_age_bracket_before_birthday() {
    let today = date(2025, 6, 15);

    // Would be 19 at year's end but the birthday hasn't passed: still 18.
    assert_eq!(age_bracket_on(date(2006, 9, 1), today), AgeBracket::Child);
    // Birthday exactly tomorrow.
    assert_eq!(age_bracket_on(date(2006, 6, 16), today), AgeBracket::Child);
}

#[test]
fn test_reference_counselor_scores_221() {
    // rating 4.9*15 = 73.5, exp capped at 15*2 = 30, relationship 40+8,
    // support 30+10, no bracket coverage, grief flat 8,
    // workload (1 - 2/8)*15 = 11.25, reviews > 50 = 10 -> round(220.75)
    let candidate = Candidate::Counselor(reference_counselor());
    assert_eq!(score_at(&reference_profile(), &candidate, Utc::now()), 221);
}

#[test]
fn test_scoring_is_pure() {
    let candidate = Candidate::Counselor(reference_counselor());
    let profile = reference_profile();
    let now = Utc::now();

    let scores: Vec<i32> = (0..5).map(|_| score_at(&profile, &candidate, now)).collect();
    assert!(scores.windows(2).all(|w| w[0] == w[1]));
}

#[test]
fn test_experience_is_capped_at_fifteen_years() {
    let mut veteran = reference_counselor();
    veteran.experience_years = 40;
    let mut capped = reference_counselor();
    capped.experience_years = 15;

    let now = Utc::now();
    assert_eq!(
        score_at(&reference_profile(), &Candidate::Counselor(veteran), now),
        score_at(&reference_profile(), &Candidate::Counselor(capped), now),
    );
}

#[test]
fn test_malformed_relationship_set_still_scores() {
    // A stored relationship set that fails to parse empties out instead of
    // erroring; the candidate still gets all its other terms.
    let corrupt: Counselor = serde_json::from_value(serde_json::json!({
        "counselorId": "c-corrupt",
        "name": "Dr. Seo",
        "specialty": "GRIEF_COUNSELING",
        "relationshipsServed": "{broken",
        "supportLevelsServed": ["HIGH", "MEDIUM"],
        "rating": 4.9,
        "reviewCount": 156,
        "experienceYears": 20,
        "status": "AVAILABLE",
        "maxClientsPerDay": 8,
        "currentClientsToday": 2
    }))
    .unwrap();

    let now = Utc::now();
    let corrupt_score = score_at(&reference_profile(), &Candidate::Counselor(corrupt.clone()), now);
    let valid_score = score_at(
        &reference_profile(),
        &Candidate::Counselor(reference_counselor()),
        now,
    );

    assert!(corrupt_score > 0);
    assert!(corrupt_score < valid_score);

    // And the valid twin outranks it.
    let shortlist = rank(
        &reference_profile(),
        vec![
            Candidate::Counselor(corrupt),
            Candidate::Counselor(reference_counselor()),
        ],
        now,
    );
    assert_eq!(shortlist.len(), 2);
    assert_eq!(shortlist[0].candidate.id(), "c-ref");
    assert_eq!(shortlist[1].candidate.id(), "c-corrupt");
}

#[test]
fn test_shortlist_is_bounded_and_sorted() {
    let pool: Vec<Candidate> = (0..40)
        .map(|i| {
            let mut c = reference_counselor();
            c.counselor_id = format!("c-{}", i);
            c.rating = (i % 11) as f64 / 2.0;
            Candidate::Counselor(c)
        })
        .collect();

    let shortlist = rank(&reference_profile(), pool, Utc::now());

    assert_eq!(shortlist.len(), SHORTLIST_LIMIT);
    assert!(shortlist.windows(2).all(|w| w[0].score >= w[1].score));
}

#[test]
fn test_shortlist_smaller_than_limit_for_small_pool() {
    let pool = vec![Candidate::Counselor(reference_counselor())];
    let shortlist = rank(&reference_profile(), pool, Utc::now());
    assert_eq!(shortlist.len(), 1);
}

#[test]
fn test_missing_survey_fields_zero_their_terms() {
    let blank = ScoringProfile {
        relationship: None,
        support_level: None,
        age_bracket: None,
    };

    let now = Utc::now();
    let blank_score = score_at(&blank, &Candidate::Counselor(reference_counselor()), now);

    // rating 73.5 + experience 30 + workload 11.25 + reviews 10 = 124.75
    assert_eq!(blank_score, 125);
}

#[test]
fn test_group_scoring_terms() {
    let profile = ScoringProfile {
        relationship: Some(Relationship::Child),
        support_level: Some(SupportLevel::Medium),
        age_bracket: Some(AgeBracket::YoungAdult),
    };

    let now = Utc::now();
    let group = SupportGroup {
        group_id: "g-1".to_string(),
        name: "Young Adults Together".to_string(),
        description: None,
        target_relationships: vec![Relationship::Child, Relationship::Sibling],
        target_age_brackets: vec![AgeBracket::YoungAdult],
        max_members: 20,
        current_members: 10,
        status: GroupStatus::Active,
        next_meeting_at: Some(now + chrono::Duration::days(7)),
        location: None,
        meeting_details: None,
    };

    // 20 base + 40 relationship + 30 bracket + 15 ratio (0.5) + 10 meeting
    assert_eq!(score_at(&profile, &Candidate::Group(group), now), 115);
}

#[test]
fn test_counselors_outrank_by_specialty_fit() {
    // A trauma therapist should outrank a group therapist for an OTHER
    // relationship, all else equal.
    let mut trauma = reference_counselor();
    trauma.counselor_id = "c-trauma".to_string();
    trauma.specialty = Specialty::TraumaTherapy;
    trauma.relationships_served = vec![Relationship::Other];

    let mut group_therapy = reference_counselor();
    group_therapy.counselor_id = "c-group".to_string();
    group_therapy.specialty = Specialty::GroupTherapy;
    group_therapy.relationships_served = vec![Relationship::Other];

    let profile = ScoringProfile {
        relationship: Some(Relationship::Other),
        support_level: Some(SupportLevel::High),
        age_bracket: Some(AgeBracket::MiddleAged),
    };

    let shortlist = rank(
        &profile,
        vec![
            Candidate::Counselor(group_therapy),
            Candidate::Counselor(trauma),
        ],
        Utc::now(),
    );

    assert_eq!(shortlist[0].candidate.id(), "c-trauma");
}
