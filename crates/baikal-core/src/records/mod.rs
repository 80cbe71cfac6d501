//! Record collections behind the dashboard and the list pages.
//!
//! Pages always refetch the whole collection after a transition; nothing
//! here patches local data optimistically.

pub mod approvals;
pub mod dashboard;
pub mod notices;
pub mod schedules;
pub mod tasks;

use async_trait::async_trait;

use crate::error::{Error, Result};
use crate::models::{Approval, ApprovalAction, Notice, Schedule, Task, TaskStatus};

#[async_trait]
pub trait RecordsApi: Send + Sync {
    async fn list_approvals(&self) -> Result<Vec<Approval>>;
    async fn list_tasks(&self) -> Result<Vec<Task>>;
    async fn list_schedules(&self) -> Result<Vec<Schedule>>;
    async fn list_notices(&self) -> Result<Vec<Notice>>;
    async fn submit_approval(&self, id: &str) -> Result<()>;
    async fn act_on_approval(&self, id: &str, action: ApprovalAction, comment: &str) -> Result<()>;
    async fn update_task_status(&self, id: &str, status: TaskStatus) -> Result<()>;
}

/// Text for the blocking alert raised when a transition fails.
pub fn alert_text(err: &Error) -> String {
    err.detail().unwrap_or("오류").to_string()
}

#[cfg(test)]
pub(crate) mod fake {
    use std::sync::Mutex;

    use super::*;

    /// In-memory backend that records every transition call.
    #[derive(Default)]
    pub struct FakeRecords {
        pub approvals: Mutex<Vec<Approval>>,
        pub tasks: Mutex<Vec<Task>>,
        pub schedules: Vec<Schedule>,
        pub notices: Vec<Notice>,
        pub calls: Mutex<Vec<String>>,
        pub reject_transitions: Option<String>,
        pub fail_lists: bool,
    }

    impl FakeRecords {
        fn record(&self, call: String) {
            self.calls.lock().unwrap().push(call);
        }

        fn transition(&self) -> Result<()> {
            match &self.reject_transitions {
                Some(detail) => Err(Error::Server {
                    status: 400,
                    detail: Some(detail.clone()),
                }),
                None => Ok(()),
            }
        }

        fn list<T: Clone>(&self, name: &str, items: &[T]) -> Result<Vec<T>> {
            self.record(format!("list {name}"));
            if self.fail_lists {
                return Err(Error::Server { status: 500, detail: None });
            }
            Ok(items.to_vec())
        }
    }

    #[async_trait]
    impl RecordsApi for FakeRecords {
        async fn list_approvals(&self) -> Result<Vec<Approval>> {
            let items = self.approvals.lock().unwrap().clone();
            self.list("approvals", &items)
        }

        async fn list_tasks(&self) -> Result<Vec<Task>> {
            let items = self.tasks.lock().unwrap().clone();
            self.list("tasks", &items)
        }

        async fn list_schedules(&self) -> Result<Vec<Schedule>> {
            self.list("schedules", &self.schedules)
        }

        async fn list_notices(&self) -> Result<Vec<Notice>> {
            self.list("notices", &self.notices)
        }

        async fn submit_approval(&self, id: &str) -> Result<()> {
            self.record(format!("submit {id}"));
            self.transition()
        }

        async fn act_on_approval(&self, id: &str, action: ApprovalAction, comment: &str) -> Result<()> {
            self.record(format!("act {id} {action:?} {comment}"));
            self.transition()
        }

        async fn update_task_status(&self, id: &str, status: TaskStatus) -> Result<()> {
            self.record(format!("patch {id} {status:?}"));
            self.transition()?;
            if let Some(task) = self.tasks.lock().unwrap().iter_mut().find(|t| t.id == id) {
                task.status = status;
            }
            Ok(())
        }
    }
}
