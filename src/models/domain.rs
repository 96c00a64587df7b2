use chrono::{DateTime, NaiveDate, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Relationship of the bereaved person to the deceased.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Relationship {
    Spouse,
    Child,
    Parent,
    Sibling,
    Other,
}

/// Self-reported need for psychological support.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SupportLevel {
    High,
    Medium,
    Low,
    None,
}

/// Age bracket derived from birth date; boundaries are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AgeBracket {
    Child,
    YoungAdult,
    MiddleAged,
    Senior,
}

/// Counselor specialty tag, one of six.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Specialty {
    GriefCounseling,
    FamilyTherapy,
    TraumaTherapy,
    GroupTherapy,
    ChildCounseling,
    ElderlyCounseling,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CounselorStatus {
    Available,
    Busy,
    Unavailable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GroupStatus {
    Active,
    Inactive,
    Full,
}

/// Kind of candidate a match request points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "candidate_kind", rename_all = "UPPERCASE")]
pub enum CandidateKind {
    Counselor,
    Group,
}

impl CandidateKind {
    /// Parse a client-supplied kind string, case-insensitively.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.to_uppercase().as_str() {
            "COUNSELOR" => Some(CandidateKind::Counselor),
            "GROUP" => Some(CandidateKind::Group),
            _ => None,
        }
    }
}

/// Match request status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "match_status", rename_all = "UPPERCASE")]
pub enum MatchStatus {
    Pending,
    Accepted,
    Rejected,
    Cancelled,
    Completed,
}

impl MatchStatus {
    /// Parse a client-supplied status string, case-insensitively.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.to_uppercase().as_str() {
            "PENDING" => Some(MatchStatus::Pending),
            "ACCEPTED" => Some(MatchStatus::Accepted),
            "REJECTED" => Some(MatchStatus::Rejected),
            "CANCELLED" => Some(MatchStatus::Cancelled),
            "COMPLETED" => Some(MatchStatus::Completed),
            _ => None,
        }
    }

    /// Whether a record in this status may move to `next`.
    ///
    /// PENDING fans out to every other status; ACCEPTED may still complete;
    /// REJECTED, CANCELLED and COMPLETED are terminal.
    pub fn can_transition_to(self, next: MatchStatus) -> bool {
        match self {
            MatchStatus::Pending => next != MatchStatus::Pending,
            MatchStatus::Accepted => next == MatchStatus::Completed,
            MatchStatus::Rejected | MatchStatus::Cancelled | MatchStatus::Completed => false,
        }
    }
}

/// Person record as stored by the profile directory.
///
/// The scoring-relevant attributes all come from the bereavement survey and
/// may be absent; absent attributes zero out their scoring terms.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonRecord {
    #[serde(rename = "personId")]
    pub person_id: String,
    pub name: String,
    #[serde(rename = "birthDate", default)]
    pub birth_date: Option<NaiveDate>,
    #[serde(rename = "relationshipToDeceased", default)]
    pub relationship: Option<Relationship>,
    #[serde(rename = "supportLevel", default)]
    pub support_level: Option<SupportLevel>,
}

/// Counselor candidate as stored by the candidate directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Counselor {
    #[serde(rename = "counselorId")]
    pub counselor_id: String,
    pub name: String,
    pub specialty: Specialty,
    #[serde(
        rename = "relationshipsServed",
        default,
        deserialize_with = "de_attribute_set"
    )]
    pub relationships_served: Vec<Relationship>,
    #[serde(
        rename = "supportLevelsServed",
        default,
        deserialize_with = "de_attribute_set"
    )]
    pub support_levels_served: Vec<SupportLevel>,
    #[serde(
        rename = "ageBracketsServed",
        default,
        deserialize_with = "de_attribute_set"
    )]
    pub age_brackets_served: Vec<AgeBracket>,
    #[serde(default)]
    pub rating: f64,
    #[serde(rename = "reviewCount", default)]
    pub review_count: u32,
    #[serde(rename = "experienceYears", default)]
    pub experience_years: u32,
    pub status: CounselorStatus,
    #[serde(rename = "maxClientsPerDay", default)]
    pub max_clients_per_day: u32,
    #[serde(rename = "currentClientsToday", default)]
    pub current_clients_today: u32,
    #[serde(default)]
    pub introduction: Option<String>,
}

impl Counselor {
    pub fn is_available(&self) -> bool {
        self.status == CounselorStatus::Available
    }

    /// Current daily load over capacity; capacity 0 counts as 1.
    pub fn workload_ratio(&self) -> f64 {
        self.current_clients_today as f64 / self.max_clients_per_day.max(1) as f64
    }
}

fn default_max_members() -> u32 {
    15
}

/// Peer support group candidate as stored by the candidate directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupportGroup {
    #[serde(rename = "groupId")]
    pub group_id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(
        rename = "targetRelationships",
        default,
        deserialize_with = "de_attribute_set"
    )]
    pub target_relationships: Vec<Relationship>,
    #[serde(
        rename = "targetAgeBrackets",
        default,
        deserialize_with = "de_attribute_set"
    )]
    pub target_age_brackets: Vec<AgeBracket>,
    #[serde(rename = "maxMembers", default = "default_max_members")]
    pub max_members: u32,
    #[serde(rename = "currentMembers", default)]
    pub current_members: u32,
    pub status: GroupStatus,
    #[serde(rename = "nextMeetingAt", default)]
    pub next_meeting_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(rename = "meetingDetails", default)]
    pub meeting_details: Option<String>,
}

impl SupportGroup {
    pub fn is_active(&self) -> bool {
        self.status == GroupStatus::Active
    }

    pub fn has_capacity(&self) -> bool {
        self.current_members < self.max_members
    }

    pub fn membership_ratio(&self) -> f64 {
        self.current_members as f64 / self.max_members.max(1) as f64
    }
}

/// A candidate eligible to be matched: an individual counselor or a group.
///
/// Untagged on the wire; counselor and group documents are distinguished by
/// their required fields (specialty/status vs. member counts/status).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Candidate {
    Counselor(Counselor),
    Group(SupportGroup),
}

impl Candidate {
    pub fn id(&self) -> &str {
        match self {
            Candidate::Counselor(c) => &c.counselor_id,
            Candidate::Group(g) => &g.group_id,
        }
    }

    pub fn kind(&self) -> CandidateKind {
        match self {
            Candidate::Counselor(_) => CandidateKind::Counselor,
            Candidate::Group(_) => CandidateKind::Group,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Candidate::Counselor(c) => &c.name,
            Candidate::Group(g) => &g.name,
        }
    }
}

/// A candidate annotated with its computed match score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredCandidate {
    pub candidate: Candidate,
    #[serde(rename = "matchScore")]
    pub score: i32,
}

/// Persisted match request linking a person to a candidate.
///
/// The score is computed once at creation and never recomputed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchRecord {
    pub id: Uuid,
    #[serde(rename = "personId")]
    pub person_id: String,
    #[serde(rename = "candidateId")]
    pub candidate_id: String,
    pub kind: CandidateKind,
    pub status: MatchStatus,
    #[serde(rename = "matchScore")]
    pub score: i32,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(rename = "rejectionReason", default)]
    pub rejection_reason: Option<String>,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
    #[serde(rename = "completedAt", default)]
    pub completed_at: Option<DateTime<Utc>>,
}

impl MatchRecord {
    /// Build a fresh PENDING record for a just-validated request.
    pub fn pending(
        person_id: &str,
        candidate_id: &str,
        kind: CandidateKind,
        score: i32,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            person_id: person_id.to_string(),
            candidate_id: candidate_id.to_string(),
            kind,
            status: MatchStatus::Pending,
            score,
            notes: None,
            rejection_reason: None,
            created_at: now,
            updated_at: now,
            completed_at: None,
        }
    }
}

/// Decode a stored multi-valued attribute set.
///
/// Directory documents historically serialized these as a JSON-encoded string
/// (`"[\"SPOUSE\"]"`); newer documents store a plain array. Anything that fails
/// to decode is treated as the empty set so one corrupt candidate record
/// cannot break a recommendation response.
fn decode_attribute_set<T: DeserializeOwned>(value: Value) -> Vec<T> {
    let decoded = match value {
        Value::String(raw) => serde_json::from_str(&raw),
        other => serde_json::from_value(other),
    };

    match decoded {
        Ok(items) => items,
        Err(e) => {
            tracing::warn!("Ignoring undecodable attribute set: {}", e);
            Vec::new()
        }
    }
}

fn de_attribute_set<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(decode_attribute_set(value))
}
