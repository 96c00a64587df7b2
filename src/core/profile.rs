use chrono::{Datelike, NaiveDate, Utc};

use crate::models::{AgeBracket, PersonRecord, Relationship, SupportLevel};

/// Scoring-relevant attributes normalized out of a person record.
///
/// Every attribute is optional: an absent attribute zeroes out the scoring
/// terms that depend on it instead of failing the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoringProfile {
    pub relationship: Option<Relationship>,
    pub support_level: Option<SupportLevel>,
    pub age_bracket: Option<AgeBracket>,
}

impl ScoringProfile {
    /// Normalize a person record against today's date.
    pub fn resolve(record: &PersonRecord) -> Self {
        Self::resolve_on(record, Utc::now().date_naive())
    }

    /// Normalize a person record against an explicit reference date.
    pub fn resolve_on(record: &PersonRecord, today: NaiveDate) -> Self {
        Self {
            relationship: record.relationship,
            support_level: record.support_level,
            age_bracket: record.birth_date.map(|birth| age_bracket_on(birth, today)),
        }
    }
}

/// Age in whole years as of `today`, counting a year only once the birthday
/// has passed.
pub fn age_on(birth_date: NaiveDate, today: NaiveDate) -> i32 {
    let mut age = today.year() - birth_date.year();
    if (today.month(), today.day()) < (birth_date.month(), birth_date.day()) {
        age -= 1;
    }
    age
}

/// Classify a birth date into an age bracket as of `today`.
///
/// Boundaries are inclusive: 18 is still CHILD, 35 still YOUNG_ADULT,
/// 55 still MIDDLE_AGED.
pub fn age_bracket_on(birth_date: NaiveDate, today: NaiveDate) -> AgeBracket {
    let age = age_on(birth_date, today);
    if age <= 18 {
        AgeBracket::Child
    } else if age <= 35 {
        AgeBracket::YoungAdult
    } else if age <= 55 {
        AgeBracket::MiddleAged
    } else {
        AgeBracket::Senior
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_age_counts_whole_years() {
        let today = date(2025, 6, 15);
        assert_eq!(age_on(date(2000, 6, 15), today), 25); // birthday today
        assert_eq!(age_on(date(2000, 6, 16), today), 24); // birthday tomorrow
        assert_eq!(age_on(date(2000, 6, 14), today), 25); // birthday yesterday
        assert_eq!(age_on(date(2000, 12, 1), today), 24); // later this year
    }

    #[test]
    fn test_bracket_boundaries_are_inclusive() {
        let today = date(2025, 6, 15);

        // 18 -> CHILD, 19 -> YOUNG_ADULT
        assert_eq!(age_bracket_on(date(2007, 6, 15), today), AgeBracket::Child);
        assert_eq!(age_bracket_on(date(2006, 6, 15), today), AgeBracket::YoungAdult);

        // 35 -> YOUNG_ADULT, 36 -> MIDDLE_AGED
        assert_eq!(age_bracket_on(date(1990, 6, 15), today), AgeBracket::YoungAdult);
        assert_eq!(age_bracket_on(date(1989, 6, 15), today), AgeBracket::MiddleAged);

        // 55 -> MIDDLE_AGED, 56 -> SENIOR
        assert_eq!(age_bracket_on(date(1970, 6, 15), today), AgeBracket::MiddleAged);
        assert_eq!(age_bracket_on(date(1969, 6, 15), today), AgeBracket::Senior);
    }

    #[test]
    fn test_pre_birthday_shifts_bracket_down() {
        let today = date(2025, 6, 15);

        // Turns 19 tomorrow: still 18, still CHILD.
        assert_eq!(age_bracket_on(date(2006, 6, 16), today), AgeBracket::Child);
        // Turned 19 yesterday: YOUNG_ADULT.
        assert_eq!(age_bracket_on(date(2006, 6, 14), today), AgeBracket::YoungAdult);
    }

    #[test]
    fn test_resolve_without_birth_date() {
        let record = PersonRecord {
            person_id: "p-1".to_string(),
            name: "Jiwoo".to_string(),
            birth_date: None,
            relationship: Some(Relationship::Spouse),
            support_level: None,
        };

        let profile = ScoringProfile::resolve_on(&record, date(2025, 6, 15));
        assert_eq!(profile.relationship, Some(Relationship::Spouse));
        assert_eq!(profile.support_level, None);
        assert_eq!(profile.age_bracket, None);
    }

    #[test]
    fn test_resolve_full_record() {
        let record = PersonRecord {
            person_id: "p-2".to_string(),
            name: "Minseo".to_string(),
            birth_date: Some(date(1985, 3, 2)),
            relationship: Some(Relationship::Parent),
            support_level: Some(SupportLevel::Medium),
        };

        let profile = ScoringProfile::resolve_on(&record, date(2025, 6, 15));
        assert_eq!(profile.age_bracket, Some(AgeBracket::MiddleAged));
    }
}
