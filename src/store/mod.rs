//! Persistence boundary for users and tasks.
//!
//! Every [`TaskStore`] operation takes an [`OwnerId`] and applies it inside the
//! store itself (a `WHERE owner_id = ...` clause for Postgres, a predicate for the
//! in-memory backend). A caller holding a valid task id but the wrong owner gets
//! the same answer as for an id that does not exist.

pub mod memory;
pub mod postgres;
pub mod query;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{NewTask, OwnerId, Task, TaskPatch, User};

pub use memory::{MemoryTaskStore, MemoryUserStore};
pub use postgres::{PgTaskStore, PgUserStore};
pub use query::{like_pattern, Pagination, SortField, SortSpec, TaskFilter};

#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Filtered, sorted page of the owner's tasks, plus the filtered count before
    /// pagination. `sort: None` means the default order.
    async fn query(
        &self,
        owner: OwnerId,
        filter: &TaskFilter,
        sort: Option<SortSpec>,
        page: Pagination,
    ) -> Result<(Vec<Task>, i64), AppError>;

    async fn insert(&self, owner: OwnerId, new_task: &NewTask) -> Result<Task, AppError>;

    async fn find_one(&self, owner: OwnerId, id: Uuid) -> Result<Option<Task>, AppError>;

    /// Applies the supplied fields and bumps `updated_at` in one atomic step.
    /// Returns `None` if no task with this id belongs to `owner`.
    async fn update_fields(
        &self,
        owner: OwnerId,
        id: Uuid,
        patch: &TaskPatch,
    ) -> Result<Option<Task>, AppError>;

    /// Returns whether a row was removed.
    async fn delete(&self, owner: OwnerId, id: Uuid) -> Result<bool, AppError>;

    /// Open tasks whose due date is before `now`, earliest first.
    async fn find_overdue(
        &self,
        owner: OwnerId,
        now: DateTime<Utc>,
        page: Pagination,
    ) -> Result<(Vec<Task>, i64), AppError>;

    /// Tasks due in `[start, end)`, earliest first.
    async fn find_due_between(
        &self,
        owner: OwnerId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        page: Pagination,
    ) -> Result<(Vec<Task>, i64), AppError>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError>;

    async fn find_by_id(&self, id: i32) -> Result<Option<User>, AppError>;

    /// Creates an active user. Fails with `Conflict` if the email is taken.
    async fn insert(&self, email: &str, password_hash: &str) -> Result<User, AppError>;

    /// Enables or disables an account. Returns `None` for an unknown id.
    async fn set_active(&self, id: i32, is_active: bool) -> Result<Option<User>, AppError>;
}
