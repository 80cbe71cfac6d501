use crate::error::Result;
use crate::models::{Task, TaskStatus};
use crate::records::RecordsApi;

/// Tasks in one kanban column, in server order.
pub fn column(tasks: &[Task], status: TaskStatus) -> Vec<&Task> {
    tasks.iter().filter(|t| t.status == status).collect()
}

/// Tasks not yet done, as counted on the dashboard.
pub fn open_count(tasks: &[Task]) -> usize {
    tasks.iter().filter(|t| t.status != TaskStatus::Done).count()
}

pub async fn load(api: &dyn RecordsApi) -> Result<Vec<Task>> {
    api.list_tasks().await
}

/// Set a task's status, then refetch. The board only offers forward moves
/// but the backend is the authority on what is allowed.
pub async fn move_task(api: &dyn RecordsApi, id: &str, status: TaskStatus) -> Result<Vec<Task>> {
    api.update_task_status(id, status).await?;
    tracing::info!(task = id, ?status, "task moved");
    load(api).await
}
