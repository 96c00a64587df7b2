use serde::{Deserialize, Serialize};
use validator::Validate;

/// Request to create a counselor match for the authenticated person.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateMatchRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "counselor_id", rename = "counselorId")]
    pub counselor_id: String,
}

/// Request to apply to a support group.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateGroupMatchRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "group_id", rename = "groupId")]
    pub group_id: String,
}

/// Request to move a match to a new status.
///
/// `status` arrives as a plain string and is parsed against the closed
/// status set by the handler.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateMatchRequest {
    #[validate(length(min = 1))]
    pub status: String,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default, alias = "rejection_reason", rename = "rejectionReason")]
    pub rejection_reason: Option<String>,
}

/// Query parameters for listing a person's matches.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchListQuery {
    #[serde(default)]
    pub kind: Option<String>,
}
