//! The result panel: a typed view of the latest successful tool result.
//!
//! The stored panel is the raw `{type, data}` pair; [`PanelContent::parse`]
//! turns it into one of nine closed views. Unknown tags and payloads that
//! are not objects are errors the UI shows as such.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::chat::ToolResult;
use crate::models::{date_part, ApprovalStatus};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultPanel {
    #[serde(rename = "type")]
    pub kind: String,
    pub data: Value,
}

impl From<&ToolResult> for ResultPanel {
    fn from(result: &ToolResult) -> Self {
        Self {
            kind: result.kind.clone(),
            data: result.data.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResultKind {
    Approval,
    Task,
    Schedule,
    Notice,
    Users,
    Approvals,
    Tasks,
    Schedules,
    Notices,
}

impl ResultKind {
    pub const ALL: [ResultKind; 9] = [
        ResultKind::Approval,
        ResultKind::Task,
        ResultKind::Schedule,
        ResultKind::Notice,
        ResultKind::Users,
        ResultKind::Approvals,
        ResultKind::Tasks,
        ResultKind::Schedules,
        ResultKind::Notices,
    ];

    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.tag() == tag)
    }

    pub fn tag(&self) -> &'static str {
        match self {
            ResultKind::Approval => "approval",
            ResultKind::Task => "task",
            ResultKind::Schedule => "schedule",
            ResultKind::Notice => "notice",
            ResultKind::Users => "users",
            ResultKind::Approvals => "approvals",
            ResultKind::Tasks => "tasks",
            ResultKind::Schedules => "schedules",
            ResultKind::Notices => "notices",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ResultKind::Approval => "전자결재",
            ResultKind::Task => "업무",
            ResultKind::Schedule => "일정",
            ResultKind::Notice => "공지사항",
            ResultKind::Users => "사용자",
            ResultKind::Approvals => "결재 목록",
            ResultKind::Tasks => "업무 목록",
            ResultKind::Schedules => "일정 목록",
            ResultKind::Notices => "공지 목록",
        }
    }

    pub fn is_list(&self) -> bool {
        matches!(
            self,
            ResultKind::Users
                | ResultKind::Approvals
                | ResultKind::Tasks
                | ResultKind::Schedules
                | ResultKind::Notices
        )
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PanelError {
    #[error("unknown result type `{0}`")]
    UnknownKind(String),
    #[error("malformed `{kind}` result: {reason}")]
    Malformed { kind: &'static str, reason: String },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ApprovalCard {
    pub title: String,
    pub category: String,
    pub status: String,
    pub approvers: Vec<String>,
    pub content: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TaskCard {
    pub title: String,
    pub assignee: Option<String>,
    pub priority: Option<String>,
    pub due_date: Option<String>,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ScheduleCard {
    pub title: String,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub location: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct NoticeCard {
    pub title: String,
    pub content: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct UserRow {
    pub name: String,
    pub department: String,
    pub position: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ApprovalRow {
    pub title: String,
    pub status: String,
    pub created_at: Option<String>,
}

impl ApprovalRow {
    pub fn status_label(&self) -> String {
        match ApprovalStatus::from_action(&self.status) {
            ApprovalStatus::Other => self.status.clone(),
            status => status.label().to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TaskRow {
    pub title: String,
    pub status: String,
    pub priority: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ScheduleRow {
    pub title: String,
    pub start_time: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct NoticeRow {
    pub title: String,
    pub author: String,
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanelView {
    Approval(ApprovalCard),
    Task(TaskCard),
    Schedule(ScheduleCard),
    Notice(NoticeCard),
    Users(Vec<UserRow>),
    Approvals(Vec<ApprovalRow>),
    Tasks(Vec<TaskRow>),
    Schedules(Vec<ScheduleRow>),
    Notices(Vec<NoticeRow>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelContent {
    pub kind: ResultKind,
    /// Confirmation banner the tool attached, e.g. "일정 '회의'이(가) 등록되었습니다."
    pub message: Option<String>,
    pub view: PanelView,
}

impl PanelContent {
    pub fn parse(panel: &ResultPanel) -> Result<Self, PanelError> {
        let kind = ResultKind::from_tag(&panel.kind)
            .ok_or_else(|| PanelError::UnknownKind(panel.kind.clone()))?;

        let object = panel.data.as_object().ok_or_else(|| PanelError::Malformed {
            kind: kind.tag(),
            reason: "payload is not an object".to_string(),
        })?;

        let message = object
            .get("message")
            .and_then(Value::as_str)
            .filter(|m| !m.is_empty())
            .map(str::to_string);

        let view = match kind {
            ResultKind::Approval => PanelView::Approval(decode(kind, &panel.data)?),
            ResultKind::Task => PanelView::Task(decode(kind, &panel.data)?),
            ResultKind::Schedule => PanelView::Schedule(decode(kind, &panel.data)?),
            ResultKind::Notice => PanelView::Notice(decode(kind, &panel.data)?),
            ResultKind::Users => PanelView::Users(decode_list(kind, object.get("users"))?),
            ResultKind::Approvals => {
                PanelView::Approvals(decode_list(kind, object.get("approvals"))?)
            }
            ResultKind::Tasks => PanelView::Tasks(decode_list(kind, object.get("tasks"))?),
            ResultKind::Schedules => {
                PanelView::Schedules(decode_list(kind, object.get("schedules"))?)
            }
            ResultKind::Notices => PanelView::Notices(decode_list(kind, object.get("notices"))?),
        };

        Ok(Self { kind, message, view })
    }
}

fn decode<T: DeserializeOwned>(kind: ResultKind, data: &Value) -> Result<T, PanelError> {
    T::deserialize(data).map_err(|err| PanelError::Malformed {
        kind: kind.tag(),
        reason: err.to_string(),
    })
}

/// A missing list renders as empty; a present one must decode.
fn decode_list<T: DeserializeOwned>(
    kind: ResultKind,
    items: Option<&Value>,
) -> Result<Vec<T>, PanelError> {
    match items {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(items) => decode(kind, items),
    }
}

/// Labelled rows for a detail card; rows with no value are left out.
pub fn detail_rows(view: &PanelView) -> Vec<(&'static str, String)> {
    let rows: Vec<(&'static str, Option<String>)> = match view {
        PanelView::Approval(card) => vec![
            ("제목", Some(card.title.clone())),
            ("카테고리", Some(card.category.clone())),
            ("상태", Some(card.status.clone())),
            ("결재라인", Some(card.approvers.join(" → "))),
        ],
        PanelView::Task(card) => vec![
            ("제목", Some(card.title.clone())),
            ("담당자", card.assignee.clone()),
            ("우선순위", card.priority.clone()),
            ("마감일", card.due_date.clone()),
        ],
        PanelView::Schedule(card) => vec![
            ("제목", Some(card.title.clone())),
            ("시작", card.start_time.clone()),
            ("종료", card.end_time.clone()),
            ("장소", card.location.clone()),
        ],
        PanelView::Notice(card) => vec![("제목", Some(card.title.clone()))],
        _ => Vec::new(),
    };

    rows.into_iter()
        .filter_map(|(label, value)| value.filter(|v| !v.is_empty()).map(|v| (label, v)))
        .collect()
}

/// Free-text body under a detail card, with its heading.
pub fn detail_body(view: &PanelView) -> Option<(&'static str, &str)> {
    let (heading, body) = match view {
        PanelView::Approval(card) => ("내용", card.content.as_str()),
        PanelView::Task(card) => ("설명", card.description.as_str()),
        PanelView::Notice(card) => ("내용", card.content.as_str()),
        _ => return None,
    };
    (!body.is_empty()).then_some((heading, body))
}

/// Date shown beside list rows.
pub fn row_date(timestamp: Option<&String>) -> &str {
    timestamp.map(|t| date_part(t)).unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn panel(kind: &str, data: Value) -> ResultPanel {
        ResultPanel {
            kind: kind.to_string(),
            data,
        }
    }

    #[test]
    fn test_every_kind_round_trips_its_tag() {
        for kind in ResultKind::ALL {
            assert_eq!(ResultKind::from_tag(kind.tag()), Some(kind));
        }
        assert_eq!(ResultKind::from_tag("Approval"), None);
    }

    #[test]
    fn test_schedule_detail() {
        let content = PanelContent::parse(&panel(
            "schedule",
            json!({
                "title": "회의",
                "start_time": "2025-01-02T14:00:00",
                "location": "",
                "message": "일정 '회의'이(가) 등록되었습니다."
            }),
        ))
        .unwrap();

        assert_eq!(content.kind.label(), "일정");
        assert_eq!(content.message.as_deref(), Some("일정 '회의'이(가) 등록되었습니다."));
        let PanelView::Schedule(card) = &content.view else {
            panic!("expected schedule view, got {:?}", content.view);
        };
        assert_eq!(card.title, "회의");
        assert_eq!(
            detail_rows(&content.view),
            vec![
                ("제목", "회의".to_string()),
                ("시작", "2025-01-02T14:00:00".to_string()),
            ]
        );
    }

    #[test]
    fn test_approval_detail_joins_approvers() {
        let content = PanelContent::parse(&panel(
            "approval",
            json!({
                "title": "출장 신청서",
                "category": "general",
                "status": "draft",
                "approvers": ["이영희", "박민수"],
                "content": "부산 출장"
            }),
        ))
        .unwrap();
        let rows = detail_rows(&content.view);
        assert!(rows.contains(&("결재라인", "이영희 → 박민수".to_string())));
        assert_eq!(detail_body(&content.view), Some(("내용", "부산 출장")));
    }

    #[test]
    fn test_task_with_null_due_date_omits_row() {
        let content = PanelContent::parse(&panel(
            "task",
            json!({"title": "보고서", "assignee": "김철수", "priority": "high", "due_date": null, "description": ""}),
        ))
        .unwrap();
        let labels: Vec<_> = detail_rows(&content.view).into_iter().map(|(l, _)| l).collect();
        assert_eq!(labels, vec!["제목", "담당자", "우선순위"]);
        assert_eq!(detail_body(&content.view), None);
    }

    #[test]
    fn test_lists() {
        let content = PanelContent::parse(&panel(
            "approvals",
            json!({
                "approvals": [
                    {"id": "1", "title": "휴가", "status": "pending", "created_at": "2025-01-02 09:00:00+00:00"},
                    {"id": "2", "title": "구매", "status": "archived", "created_at": null}
                ],
                "message": "2건의 결재 문서가 있습니다."
            }),
        ))
        .unwrap();
        let PanelView::Approvals(rows) = content.view else {
            panic!("expected approvals list");
        };
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].status_label(), "대기");
        assert_eq!(rows[1].status_label(), "archived");
        assert_eq!(row_date(rows[0].created_at.as_ref()), "2025-01-02");
        assert_eq!(row_date(rows[1].created_at.as_ref()), "");

        let users = PanelContent::parse(&panel("users", json!({"message": "0명"}))).unwrap();
        assert_eq!(users.view, PanelView::Users(Vec::new()));
        assert!(users.kind.is_list());
    }

    #[test]
    fn test_unknown_kind_is_an_error() {
        let err = PanelContent::parse(&panel("meeting_room", json!({"title": "A"}))).unwrap_err();
        assert_eq!(err, PanelError::UnknownKind("meeting_room".to_string()));
    }

    #[test]
    fn test_non_object_payload_is_malformed() {
        let err = PanelContent::parse(&panel("notice", json!("hello"))).unwrap_err();
        assert!(matches!(err, PanelError::Malformed { kind: "notice", .. }));

        let err = PanelContent::parse(&panel("tasks", json!({"tasks": "none"}))).unwrap_err();
        assert!(matches!(err, PanelError::Malformed { kind: "tasks", .. }));
    }
}
