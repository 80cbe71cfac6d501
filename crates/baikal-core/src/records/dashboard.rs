use crate::models::{Approval, ApprovalStatus, Notice, Schedule, Task};
use crate::records::{tasks, RecordsApi};

/// How many items each dashboard section lists.
pub const RECENT_LIMIT: usize = 4;

#[derive(Debug, Clone, Default)]
pub struct Dashboard {
    pub approvals: Vec<Approval>,
    pub tasks: Vec<Task>,
    pub schedules: Vec<Schedule>,
    pub notices: Vec<Notice>,
}

impl Dashboard {
    /// Fetch all four collections concurrently. A failing collection shows
    /// as empty rather than failing the dashboard.
    pub async fn load(api: &dyn RecordsApi) -> Self {
        let (approvals, tasks, schedules, notices) = tokio::join!(
            api.list_approvals(),
            api.list_tasks(),
            api.list_schedules(),
            api.list_notices(),
        );

        Self {
            approvals: or_empty("approvals", approvals),
            tasks: or_empty("tasks", tasks),
            schedules: or_empty("schedules", schedules),
            notices: or_empty("notices", notices),
        }
    }

    pub fn pending_approvals(&self) -> usize {
        self.approvals
            .iter()
            .filter(|a| a.status == ApprovalStatus::Pending)
            .count()
    }

    pub fn open_tasks(&self) -> usize {
        tasks::open_count(&self.tasks)
    }

    pub fn upcoming_schedules(&self) -> usize {
        self.schedules.len()
    }

    pub fn notice_count(&self) -> usize {
        self.notices.len()
    }

    pub fn recent_approvals(&self) -> &[Approval] {
        recent(&self.approvals)
    }

    pub fn recent_tasks(&self) -> &[Task] {
        recent(&self.tasks)
    }

    pub fn recent_schedules(&self) -> &[Schedule] {
        recent(&self.schedules)
    }

    pub fn recent_notices(&self) -> &[Notice] {
        recent(&self.notices)
    }
}

fn recent<T>(items: &[T]) -> &[T] {
    &items[..items.len().min(RECENT_LIMIT)]
}

fn or_empty<T>(name: &str, result: crate::error::Result<Vec<T>>) -> Vec<T> {
    result.unwrap_or_else(|err| {
        tracing::warn!(collection = name, %err, "dashboard collection unavailable");
        Vec::new()
    })
}

/// Greeting for the local hour of day.
pub fn greeting(hour: u32) -> &'static str {
    match hour {
        0..=11 => "좋은 아침이에요",
        12..=17 => "좋은 오후에요",
        _ => "좋은 저녁이에요",
    }
}
