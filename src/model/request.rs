use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

/// Approval state of a request. Pending is the only non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema)]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
}

impl RequestStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, RequestStatus::Approved | RequestStatus::Rejected)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema)]
pub enum RequestType {
    Leave,
    Expense,
    #[serde(rename = "Remote Work")]
    #[strum(serialize = "Remote Work")]
    RemoteWork,
    Other,
}

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Request {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = "4F2A9C01BD37")]
    pub employee_id: String,

    #[schema(example = "Leave")]
    pub request_type: String,

    #[schema(example = "Two days off for a family event")]
    pub detail: String,

    /// User id of the admin/manager who approved or rejected, if any.
    #[schema(example = 2, nullable = true)]
    pub approver_id: Option<u64>,

    #[schema(example = "Pending")]
    pub status: String,

    #[schema(example = "2026-01-01T00:00:00Z", value_type = String, format = "date-time")]
    pub date_requested: DateTime<Utc>,
}

/// Approve/reject guard: re-applying the current status is a conflict,
/// every other transition from any state is allowed (a rejected request
/// can still be approved later, and vice versa).
pub fn transition_conflict(current: RequestStatus, target: RequestStatus) -> bool {
    current == target
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn pending_is_the_only_deletable_state() {
        assert!(!RequestStatus::Pending.is_terminal());
        assert!(RequestStatus::Approved.is_terminal());
        assert!(RequestStatus::Rejected.is_terminal());
    }

    #[test]
    fn reapplying_current_status_is_a_conflict() {
        assert!(transition_conflict(RequestStatus::Approved, RequestStatus::Approved));
        assert!(transition_conflict(RequestStatus::Pending, RequestStatus::Pending));
        assert!(!transition_conflict(RequestStatus::Pending, RequestStatus::Approved));
        // A rejected request may still be approved afterwards.
        assert!(!transition_conflict(RequestStatus::Rejected, RequestStatus::Approved));
    }

    #[test]
    fn remote_work_uses_spaced_spelling() {
        assert_eq!(RequestType::RemoteWork.to_string(), "Remote Work");
        assert_eq!(
            RequestType::from_str("Remote Work").unwrap(),
            RequestType::RemoteWork
        );
    }
}
