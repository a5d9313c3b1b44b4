//! Task operations guarded by session claims.
//!
//! Reads are narrowed in the store query so foreign rows are never
//! loaded. Mutations load the task first and then ask [`authorize`], so
//! "no such task" and "not yours" stay distinguishable.

use taskman_core::error::{TaskmanError, TaskmanResult};
use taskman_core::models::task::{CreateTask, Task, TaskPriority, TaskStatus, UpdateTask};
use taskman_core::repository::{OwnerScope, TaskRepository};
use tracing::{info, warn};
use uuid::Uuid;

use crate::access::{ADMIN_OR_OWNER, authorize, list_scope};
use crate::token::SessionClaims;

/// Caller-supplied fields for a new task; the owner comes from the
/// claim.
#[derive(Debug, Clone, Default)]
pub struct CreateTaskInput {
    pub title: String,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub due_date: Option<chrono::DateTime<chrono::Utc>>,
    pub assignee_id: Option<Uuid>,
}

pub struct TaskService<T: TaskRepository> {
    tasks: T,
}

impl<T: TaskRepository> TaskService<T> {
    pub fn new(tasks: T) -> Self {
        Self { tasks }
    }

    pub async fn create(
        &self,
        claim: &SessionClaims,
        input: CreateTaskInput,
    ) -> TaskmanResult<Task> {
        if input.title.trim().is_empty() {
            return Err(TaskmanError::Validation {
                message: "title must not be empty".into(),
            });
        }
        let owner_id = claim.subject_id()?;

        let task = self
            .tasks
            .create(CreateTask {
                owner_id,
                title: input.title,
                description: input.description,
                status: input.status.unwrap_or_default(),
                priority: input.priority.unwrap_or_default(),
                due_date: input.due_date,
                assignee_id: input.assignee_id,
            })
            .await?;

        info!(task_id = %task.id, %owner_id, "Task created");
        Ok(task)
    }

    /// Administrators see every active task, members only their own.
    pub async fn list(&self, claim: &SessionClaims) -> TaskmanResult<Vec<Task>> {
        let scope = list_scope(claim)?;
        self.tasks.list(scope).await
    }

    /// A task outside the caller's scope reads as not found.
    pub async fn get(&self, claim: &SessionClaims, id: Uuid) -> TaskmanResult<Task> {
        let scope = list_scope(claim)?;
        self.tasks
            .find_by_id(id, scope)
            .await?
            .ok_or_else(|| task_not_found(id))
    }

    pub async fn update(
        &self,
        claim: &SessionClaims,
        id: Uuid,
        input: UpdateTask,
    ) -> TaskmanResult<Task> {
        self.load_for_mutation(claim, id).await?;
        if let Some(title) = &input.title {
            if title.trim().is_empty() {
                return Err(TaskmanError::Validation {
                    message: "title must not be empty".into(),
                });
            }
        }

        let task = self
            .tasks
            .update(id, input)
            .await?
            .ok_or_else(|| task_not_found(id))?;
        info!(task_id = %id, "Task updated");
        Ok(task)
    }

    /// Soft-delete a task.
    pub async fn remove(&self, claim: &SessionClaims, id: Uuid) -> TaskmanResult<()> {
        self.load_for_mutation(claim, id).await?;
        self.tasks.soft_delete(id).await?;
        info!(task_id = %id, "Task soft-deleted");
        Ok(())
    }

    async fn load_for_mutation(&self, claim: &SessionClaims, id: Uuid) -> TaskmanResult<Task> {
        let task = self
            .tasks
            .find_by_id(id, OwnerScope::All)
            .await?
            .ok_or_else(|| task_not_found(id))?;

        let decision = authorize(Some(claim), &ADMIN_OR_OWNER, Some(task.owner_id));
        if !decision.is_allowed() {
            warn!(task_id = %id, subject = %claim.sub, "Task mutation denied");
        }
        decision.into_result()?;
        Ok(task)
    }
}

fn task_not_found(id: Uuid) -> TaskmanError {
    TaskmanError::NotFound {
        entity: "task".into(),
        id: id.to_string(),
    }
}
