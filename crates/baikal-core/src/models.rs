//! Wire types for the groupware REST backend.
//!
//! Timestamps are kept as the ISO strings the server sends; pages group
//! and display them by string prefix.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
    #[serde(default)]
    pub department: String,
    #[serde(default)]
    pub position: String,
    #[serde(default)]
    pub role: String,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub created_at: String,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserBrief {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub department: String,
    #[serde(default)]
    pub position: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: String,
    pub user: User,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalStatus {
    Draft,
    Pending,
    Approved,
    Rejected,
    #[serde(other)]
    Other,
}

impl ApprovalStatus {
    pub const ALL: [ApprovalStatus; 4] = [
        ApprovalStatus::Draft,
        ApprovalStatus::Pending,
        ApprovalStatus::Approved,
        ApprovalStatus::Rejected,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ApprovalStatus::Draft => "초안",
            ApprovalStatus::Pending => "대기",
            ApprovalStatus::Approved => "승인",
            ApprovalStatus::Rejected => "반려",
            ApprovalStatus::Other => "기타",
        }
    }

    /// Statuses are also used for approval-line actions, which arrive as
    /// plain strings.
    pub fn from_action(action: &str) -> Self {
        match action {
            "draft" => ApprovalStatus::Draft,
            "pending" => ApprovalStatus::Pending,
            "approved" => ApprovalStatus::Approved,
            "rejected" => ApprovalStatus::Rejected,
            _ => ApprovalStatus::Other,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalLine {
    pub id: String,
    pub approver: Option<UserBrief>,
    pub order: i32,
    pub action: String,
    #[serde(default)]
    pub comment: String,
    pub acted_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Approval {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub category: String,
    pub status: ApprovalStatus,
    pub author: Option<UserBrief>,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
    #[serde(default)]
    pub approval_lines: Vec<ApprovalLine>,
}

/// Decision taken by an approver on a pending document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalAction {
    Approved,
    Rejected,
}

impl ApprovalAction {
    pub fn label(&self) -> &'static str {
        match self {
            ApprovalAction::Approved => "승인",
            ApprovalAction::Rejected => "반려",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Todo,
    InProgress,
    Done,
    #[serde(other)]
    Other,
}

impl TaskStatus {
    pub const COLUMNS: [TaskStatus; 3] = [TaskStatus::Todo, TaskStatus::InProgress, TaskStatus::Done];

    pub fn label(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "To Do",
            TaskStatus::InProgress => "진행중",
            TaskStatus::Done => "완료",
            TaskStatus::Other => "기타",
        }
    }

    /// The single forward move the board offers for a task in this column.
    pub fn next(&self) -> Option<TaskStatus> {
        match self {
            TaskStatus::Todo => Some(TaskStatus::InProgress),
            TaskStatus::InProgress => Some(TaskStatus::Done),
            TaskStatus::Done | TaskStatus::Other => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Medium,
    High,
    Urgent,
    #[serde(other)]
    Other,
}

impl Priority {
    pub fn label(&self) -> &'static str {
        match self {
            Priority::Low => "낮음",
            Priority::Medium => "보통",
            Priority::High => "높음",
            Priority::Urgent => "긴급",
            Priority::Other => "-",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub status: TaskStatus,
    pub priority: Option<Priority>,
    pub due_date: Option<String>,
    pub creator: Option<UserBrief>,
    pub assignee: Option<UserBrief>,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    #[serde(default)]
    pub location: String,
    pub creator: Option<UserBrief>,
    #[serde(default)]
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub is_pinned: bool,
    pub author: Option<UserBrief>,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

/// `YYYY-MM-DD` part of a server timestamp. Accepts both the ISO form
/// (`2025-01-02T14:00:00`) and Python's `str(datetime)` form
/// (`2025-01-02 14:00:00+00:00`) which tool results carry.
pub fn date_part(timestamp: &str) -> &str {
    timestamp
        .split(|c| c == 'T' || c == ' ')
        .next()
        .unwrap_or(timestamp)
}

/// `HH:MM` part of a server timestamp, or an empty string.
pub fn time_part(timestamp: &str) -> &str {
    let Some(idx) = timestamp.find(|c| c == 'T' || c == ' ') else {
        return "";
    };
    let time = &timestamp[idx + 1..];
    time.get(..5).unwrap_or(time)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_status_decodes_as_other() {
        let status: ApprovalStatus = serde_json::from_str(r#""archived""#).unwrap();
        assert_eq!(status, ApprovalStatus::Other);
        let status: TaskStatus = serde_json::from_str(r#""in_progress""#).unwrap();
        assert_eq!(status, TaskStatus::InProgress);
    }

    #[test]
    fn test_task_moves_forward_only() {
        assert_eq!(TaskStatus::Todo.next(), Some(TaskStatus::InProgress));
        assert_eq!(TaskStatus::InProgress.next(), Some(TaskStatus::Done));
        assert_eq!(TaskStatus::Done.next(), None);
    }

    #[test]
    fn test_timestamp_parts() {
        assert_eq!(date_part("2025-01-02T14:00:00"), "2025-01-02");
        assert_eq!(date_part("2025-01-02 14:00:00+00:00"), "2025-01-02");
        assert_eq!(time_part("2025-01-02T14:05:00Z"), "14:05");
        assert_eq!(time_part("2025-01-02 09:30:00+00:00"), "09:30");
        assert_eq!(time_part("2025-01-02"), "");
    }

    #[test]
    fn test_approval_decodes_backend_shape() {
        let json = r#"{
            "id": "a1", "title": "출장 신청서", "content": "부산 출장",
            "category": "trip", "status": "pending",
            "author": {"id": "u1", "name": "김철수", "department": "개발", "position": "대리"},
            "created_at": "2025-01-02T10:00:00", "updated_at": "2025-01-02T10:00:00",
            "approval_lines": [
                {"id": "l1", "approver": {"id": "u2", "name": "이영희", "department": "개발", "position": "팀장"},
                 "order": 1, "action": "pending", "comment": "", "acted_at": null}
            ]
        }"#;
        let approval: Approval = serde_json::from_str(json).unwrap();
        assert_eq!(approval.status, ApprovalStatus::Pending);
        assert_eq!(approval.approval_lines.len(), 1);
        assert_eq!(ApprovalStatus::from_action(&approval.approval_lines[0].action), ApprovalStatus::Pending);
    }
}
