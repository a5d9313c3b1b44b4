//! Repository trait definitions for data access abstraction.
//!
//! All repository operations are async. Lookups exclude soft-deleted
//! rows; a missing row is `Ok(None)`, not an error.

use uuid::Uuid;

use crate::error::TaskmanResult;
use crate::models::{
    account::{Account, CreateAccount, UpdateAccount},
    task::{CreateTask, Task, UpdateTask},
};

/// Narrows a read to the rows a caller may see.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OwnerScope {
    /// Every active row.
    All,
    /// Only rows owned by this account.
    Owner(Uuid),
}

impl OwnerScope {
    pub fn permits(&self, owner_id: Uuid) -> bool {
        match self {
            OwnerScope::All => true,
            OwnerScope::Owner(id) => *id == owner_id,
        }
    }
}

// ---------------------------------------------------------------------------
// Accounts
// ---------------------------------------------------------------------------

pub trait AccountRepository: Send + Sync {
    /// Insert a new account. Fails with `AlreadyExists` when the email
    /// is bound to another active account.
    fn create(&self, input: CreateAccount) -> impl Future<Output = TaskmanResult<Account>> + Send;
    fn find_by_id(&self, id: Uuid) -> impl Future<Output = TaskmanResult<Option<Account>>> + Send;
    /// Exact-match lookup among active accounts.
    fn find_by_email(
        &self,
        email: &str,
    ) -> impl Future<Output = TaskmanResult<Option<Account>>> + Send;
    fn update(
        &self,
        id: Uuid,
        input: UpdateAccount,
    ) -> impl Future<Output = TaskmanResult<Option<Account>>> + Send;
    /// Soft-delete: sets `deleted_at`, the row is kept.
    fn soft_delete(&self, id: Uuid) -> impl Future<Output = TaskmanResult<()>> + Send;
    fn list_active(&self) -> impl Future<Output = TaskmanResult<Vec<Account>>> + Send;
}

// ---------------------------------------------------------------------------
// Tasks
// ---------------------------------------------------------------------------

pub trait TaskRepository: Send + Sync {
    fn create(&self, input: CreateTask) -> impl Future<Output = TaskmanResult<Task>> + Send;
    /// Active tasks visible under `scope`, newest first.
    fn list(&self, scope: OwnerScope) -> impl Future<Output = TaskmanResult<Vec<Task>>> + Send;
    fn find_by_id(
        &self,
        id: Uuid,
        scope: OwnerScope,
    ) -> impl Future<Output = TaskmanResult<Option<Task>>> + Send;
    fn update(
        &self,
        id: Uuid,
        input: UpdateTask,
    ) -> impl Future<Output = TaskmanResult<Option<Task>>> + Send;
    fn soft_delete(&self, id: Uuid) -> impl Future<Output = TaskmanResult<()>> + Send;
}
