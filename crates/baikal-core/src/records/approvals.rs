use crate::error::Result;
use crate::models::{Approval, ApprovalAction, ApprovalStatus};
use crate::records::RecordsApi;

/// Filter tab on the approvals page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ApprovalFilter {
    #[default]
    All,
    Status(ApprovalStatus),
}

impl ApprovalFilter {
    pub const TABS: [ApprovalFilter; 5] = [
        ApprovalFilter::All,
        ApprovalFilter::Status(ApprovalStatus::Draft),
        ApprovalFilter::Status(ApprovalStatus::Pending),
        ApprovalFilter::Status(ApprovalStatus::Approved),
        ApprovalFilter::Status(ApprovalStatus::Rejected),
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ApprovalFilter::All => "전체",
            ApprovalFilter::Status(status) => status.label(),
        }
    }

    pub fn matches(&self, approval: &Approval) -> bool {
        match self {
            ApprovalFilter::All => true,
            ApprovalFilter::Status(status) => approval.status == *status,
        }
    }

    pub fn next(&self) -> Self {
        let idx = Self::TABS.iter().position(|f| f == self).unwrap_or(0);
        Self::TABS[(idx + 1) % Self::TABS.len()]
    }

    pub fn prev(&self) -> Self {
        let idx = Self::TABS.iter().position(|f| f == self).unwrap_or(0);
        Self::TABS[(idx + Self::TABS.len() - 1) % Self::TABS.len()]
    }
}

pub fn filter(approvals: &[Approval], filter: ApprovalFilter) -> Vec<&Approval> {
    approvals.iter().filter(|a| filter.matches(a)).collect()
}

pub fn count(approvals: &[Approval], filter: ApprovalFilter) -> usize {
    approvals.iter().filter(|a| filter.matches(a)).count()
}

/// Only drafts can be sent for approval.
pub fn can_submit(approval: &Approval) -> bool {
    approval.status == ApprovalStatus::Draft
}

/// Only pending documents can be approved or rejected.
pub fn can_decide(approval: &Approval) -> bool {
    approval.status == ApprovalStatus::Pending
}

pub async fn load(api: &dyn RecordsApi) -> Result<Vec<Approval>> {
    api.list_approvals().await
}

/// Move a draft to pending, then refetch the collection.
pub async fn submit(api: &dyn RecordsApi, id: &str) -> Result<Vec<Approval>> {
    api.submit_approval(id).await?;
    tracing::info!(approval = id, "approval submitted");
    load(api).await
}

/// Approve or reject a pending document, then refetch the collection.
pub async fn decide(
    api: &dyn RecordsApi,
    id: &str,
    action: ApprovalAction,
    comment: &str,
) -> Result<Vec<Approval>> {
    api.act_on_approval(id, action, comment).await?;
    tracing::info!(approval = id, ?action, "approval decided");
    load(api).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::alert_text;
    use crate::records::fake::FakeRecords;
    use std::sync::Mutex;

    fn approval(id: &str, status: ApprovalStatus) -> Approval {
        Approval {
            id: id.to_string(),
            title: format!("문서 {id}"),
            content: String::new(),
            category: "general".to_string(),
            status,
            author: None,
            created_at: "2025-01-02T09:00:00".to_string(),
            updated_at: "2025-01-02T09:00:00".to_string(),
            approval_lines: Vec::new(),
        }
    }

    fn three() -> Vec<Approval> {
        vec![
            approval("1", ApprovalStatus::Draft),
            approval("2", ApprovalStatus::Pending),
            approval("3", ApprovalStatus::Approved),
        ]
    }

    #[test]
    fn test_pending_filter_yields_one() {
        let items = three();
        let pending = filter(&items, ApprovalFilter::Status(ApprovalStatus::Pending));
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id, "2");
        assert_eq!(filter(&items, ApprovalFilter::All).len(), 3);
        assert_eq!(count(&items, ApprovalFilter::Status(ApprovalStatus::Rejected)), 0);
    }

    #[test]
    fn test_available_actions() {
        let items = three();
        assert!(can_submit(&items[0]) && !can_decide(&items[0]));
        assert!(!can_submit(&items[1]) && can_decide(&items[1]));
        assert!(!can_submit(&items[2]) && !can_decide(&items[2]));
    }

    #[test]
    fn test_tab_cycling_wraps() {
        assert_eq!(ApprovalFilter::All.prev(), ApprovalFilter::Status(ApprovalStatus::Rejected));
        assert_eq!(ApprovalFilter::Status(ApprovalStatus::Rejected).next(), ApprovalFilter::All);
        assert_eq!(ApprovalFilter::All.next().label(), "초안");
    }

    #[tokio::test]
    async fn test_submit_refetches_collection() {
        let api = FakeRecords {
            approvals: Mutex::new(three()),
            ..Default::default()
        };
        let items = submit(&api, "1").await.unwrap();
        assert_eq!(items.len(), 3);
        assert_eq!(*api.calls.lock().unwrap(), vec!["submit 1", "list approvals"]);
    }

    #[tokio::test]
    async fn test_rejected_transition_surfaces_detail_without_refetch() {
        let api = FakeRecords {
            approvals: Mutex::new(three()),
            reject_transitions: Some("Not your turn to approve".to_string()),
            ..Default::default()
        };
        let err = decide(&api, "2", ApprovalAction::Approved, "확인")
            .await
            .unwrap_err();
        assert_eq!(alert_text(&err), "Not your turn to approve");
        assert_eq!(*api.calls.lock().unwrap(), vec!["act 2 Approved 확인"]);
    }
}
