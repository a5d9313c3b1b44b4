//! SurrealDB implementation of [`TaskRepository`].

use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use taskman_core::error::TaskmanResult;
use taskman_core::models::task::{CreateTask, Task, TaskPriority, TaskStatus, UpdateTask};
use taskman_core::repository::{OwnerScope, TaskRepository};
use uuid::Uuid;

use crate::error::DbError;

const ENTITY: &str = "task";

#[derive(Debug, SurrealValue)]
struct TaskRow {
    title: String,
    description: Option<String>,
    status: String,
    priority: String,
    due_date: Option<DateTime<Utc>>,
    assignee_id: Option<String>,
    owner_id: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, SurrealValue)]
struct TaskRowWithId {
    record_id: String,
    title: String,
    description: Option<String>,
    status: String,
    priority: String,
    due_date: Option<DateTime<Utc>>,
    assignee_id: Option<String>,
    owner_id: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
}

fn parse_uuid(field: &str, s: &str) -> Result<Uuid, DbError> {
    Uuid::parse_str(s).map_err(|e| DbError::decode(ENTITY, format!("invalid {field}: {e}")))
}

impl TaskRow {
    fn into_task(self, id: Uuid) -> Result<Task, DbError> {
        let status: TaskStatus = self
            .status
            .parse()
            .map_err(|e: String| DbError::decode(ENTITY, e))?;
        let priority: TaskPriority = self
            .priority
            .parse()
            .map_err(|e: String| DbError::decode(ENTITY, e))?;
        let assignee_id = self
            .assignee_id
            .as_deref()
            .map(|s| parse_uuid("assignee_id", s))
            .transpose()?;

        Ok(Task {
            id,
            title: self.title,
            description: self.description,
            status,
            priority,
            due_date: self.due_date,
            assignee_id,
            owner_id: parse_uuid("owner_id", &self.owner_id)?,
            created_at: self.created_at,
            updated_at: self.updated_at,
            deleted_at: self.deleted_at,
        })
    }
}

impl TaskRowWithId {
    fn try_into_task(self) -> Result<Task, DbError> {
        let id = parse_uuid("record id", &self.record_id)?;
        TaskRow {
            title: self.title,
            description: self.description,
            status: self.status,
            priority: self.priority,
            due_date: self.due_date,
            assignee_id: self.assignee_id,
            owner_id: self.owner_id,
            created_at: self.created_at,
            updated_at: self.updated_at,
            deleted_at: self.deleted_at,
        }
        .into_task(id)
    }
}

/// Extra `WHERE` clause for a scoped read.
fn scope_clause(scope: OwnerScope) -> &'static str {
    match scope {
        OwnerScope::All => "",
        OwnerScope::Owner(_) => " AND owner_id = $owner_id",
    }
}

fn scope_owner(scope: OwnerScope) -> Option<String> {
    match scope {
        OwnerScope::All => None,
        OwnerScope::Owner(id) => Some(id.to_string()),
    }
}

/// SurrealDB implementation of the Task repository.
#[derive(Clone)]
pub struct SurrealTaskRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealTaskRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> TaskRepository for SurrealTaskRepository<C> {
    async fn create(&self, input: CreateTask) -> TaskmanResult<Task> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('task', $id) SET \
                 title = $title, description = $description, \
                 status = $status, priority = $priority, \
                 due_date = $due_date, assignee_id = $assignee_id, \
                 owner_id = $owner_id",
            )
            .bind(("id", id_str.clone()))
            .bind(("title", input.title))
            .bind(("description", input.description))
            .bind(("status", input.status.as_str().to_string()))
            .bind(("priority", input.priority.as_str().to_string()))
            .bind(("due_date", input.due_date))
            .bind(("assignee_id", input.assignee_id.map(|u| u.to_string())))
            .bind(("owner_id", input.owner_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::from_write(e, ENTITY))?;

        let rows: Vec<TaskRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: ENTITY.into(),
            id: id_str,
        })?;

        Ok(row.into_task(id)?)
    }

    async fn list(&self, scope: OwnerScope) -> TaskmanResult<Vec<Task>> {
        let query = format!(
            "SELECT meta::id(id) AS record_id, * FROM task \
             WHERE deleted_at IS NONE{} \
             ORDER BY created_at DESC",
            scope_clause(scope)
        );

        let mut builder = self.db.query(&query);
        if let Some(owner_id) = scope_owner(scope) {
            builder = builder.bind(("owner_id", owner_id));
        }

        let mut result = builder.await.map_err(DbError::from)?;
        let rows: Vec<TaskRowWithId> = result.take(0).map_err(DbError::from)?;

        let tasks = rows
            .into_iter()
            .map(|row| row.try_into_task())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(tasks)
    }

    async fn find_by_id(&self, id: Uuid, scope: OwnerScope) -> TaskmanResult<Option<Task>> {
        let query = format!(
            "SELECT * FROM type::record('task', $id) \
             WHERE deleted_at IS NONE{}",
            scope_clause(scope)
        );

        let mut builder = self.db.query(&query).bind(("id", id.to_string()));
        if let Some(owner_id) = scope_owner(scope) {
            builder = builder.bind(("owner_id", owner_id));
        }

        let mut result = builder.await.map_err(DbError::from)?;
        let rows: Vec<TaskRow> = result.take(0).map_err(DbError::from)?;
        match rows.into_iter().next() {
            Some(row) => Ok(Some(row.into_task(id)?)),
            None => Ok(None),
        }
    }

    async fn update(&self, id: Uuid, input: UpdateTask) -> TaskmanResult<Option<Task>> {
        let mut sets = Vec::new();
        if input.title.is_some() {
            sets.push("title = $title");
        }
        if input.description.is_some() {
            sets.push("description = $description");
        }
        if input.status.is_some() {
            sets.push("status = $status");
        }
        if input.priority.is_some() {
            sets.push("priority = $priority");
        }
        if input.due_date.is_some() {
            sets.push("due_date = $due_date");
        }
        if input.assignee_id.is_some() {
            sets.push("assignee_id = $assignee_id");
        }
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE type::record('task', $id) SET {} \
             WHERE deleted_at IS NONE",
            sets.join(", ")
        );

        let mut builder = self.db.query(&query).bind(("id", id.to_string()));

        if let Some(title) = input.title {
            builder = builder.bind(("title", title));
        }
        if let Some(description) = input.description {
            builder = builder.bind(("description", description));
        }
        if let Some(status) = input.status {
            builder = builder.bind(("status", status.as_str().to_string()));
        }
        if let Some(priority) = input.priority {
            builder = builder.bind(("priority", priority.as_str().to_string()));
        }
        if let Some(due_date) = input.due_date {
            builder = builder.bind(("due_date", due_date));
        }
        if let Some(assignee_id) = input.assignee_id {
            builder = builder.bind(("assignee_id", assignee_id.map(|u| u.to_string())));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result
            .check()
            .map_err(|e| DbError::from_write(e, ENTITY))?;

        let rows: Vec<TaskRow> = result.take(0).map_err(DbError::from)?;
        match rows.into_iter().next() {
            Some(row) => Ok(Some(row.into_task(id)?)),
            None => Ok(None),
        }
    }

    async fn soft_delete(&self, id: Uuid) -> TaskmanResult<()> {
        self.db
            .query(
                "UPDATE type::record('task', $id) SET \
                 deleted_at = time::now(), updated_at = time::now() \
                 WHERE deleted_at IS NONE",
            )
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::from_write(e, ENTITY))?;

        Ok(())
    }
}
