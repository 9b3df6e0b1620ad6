//! In-process stores used when no `DATABASE_URL` is configured, and by tests.
//!
//! Each operation takes the lock once, so a read-modify-write on a single task is
//! atomic just as the equivalent `UPDATE ... RETURNING` is in Postgres.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{Pagination, SortSpec, TaskFilter, TaskStore, UserStore};
use crate::error::AppError;
use crate::models::{NewTask, OwnerId, Task, TaskPatch, User};

#[derive(Debug, Default)]
pub struct MemoryTaskStore {
    tasks: RwLock<Vec<Task>>,
}

impl MemoryTaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Filters the owner's tasks, orders them, and cuts the requested page.
    async fn select<P>(
        &self,
        owner: OwnerId,
        predicate: P,
        order: SortSpec,
        page: Pagination,
    ) -> (Vec<Task>, i64)
    where
        P: Fn(&Task) -> bool,
    {
        let tasks = self.tasks.read().await;
        let mut matching: Vec<&Task> = tasks
            .iter()
            .filter(|task| task.owner_id == owner.get() && predicate(task))
            .collect();
        let total = matching.len() as i64;
        matching.sort_by(|a, b| order.compare(a, b));
        let rows = page
            .slice(&matching)
            .into_iter()
            .cloned()
            .collect();
        (rows, total)
    }
}

#[async_trait]
impl TaskStore for MemoryTaskStore {
    async fn query(
        &self,
        owner: OwnerId,
        filter: &TaskFilter,
        sort: Option<SortSpec>,
        page: Pagination,
    ) -> Result<(Vec<Task>, i64), AppError> {
        let order = sort.unwrap_or(SortSpec::DEFAULT);
        Ok(self
            .select(owner, |task| filter.matches(task), order, page)
            .await)
    }

    async fn insert(&self, owner: OwnerId, new_task: &NewTask) -> Result<Task, AppError> {
        let now = Utc::now();
        let task = Task {
            id: Uuid::new_v4(),
            title: new_task.title.clone(),
            description: new_task.description.clone(),
            is_done: false,
            due_date: new_task.due_date,
            tags: new_task.tags.clone(),
            created_at: now,
            updated_at: now,
            owner_id: owner.get(),
        };
        self.tasks.write().await.push(task.clone());
        log::debug!("inserted task {} for owner {}", task.id, owner.get());
        Ok(task)
    }

    async fn find_one(&self, owner: OwnerId, id: Uuid) -> Result<Option<Task>, AppError> {
        let tasks = self.tasks.read().await;
        Ok(tasks
            .iter()
            .find(|task| task.id == id && task.owner_id == owner.get())
            .cloned())
    }

    async fn update_fields(
        &self,
        owner: OwnerId,
        id: Uuid,
        patch: &TaskPatch,
    ) -> Result<Option<Task>, AppError> {
        let mut tasks = self.tasks.write().await;
        let Some(task) = tasks
            .iter_mut()
            .find(|task| task.id == id && task.owner_id == owner.get())
        else {
            return Ok(None);
        };

        if let Some(title) = &patch.title {
            task.title = title.clone();
        }
        if let Some(description) = &patch.description {
            task.description = Some(description.clone());
        }
        if let Some(is_done) = patch.is_done {
            task.is_done = is_done;
        }
        if let Some(due_date) = patch.due_date {
            task.due_date = Some(due_date);
        }
        if let Some(tags) = &patch.tags {
            task.tags = tags.clone();
        }
        task.updated_at = Utc::now();
        Ok(Some(task.clone()))
    }

    async fn delete(&self, owner: OwnerId, id: Uuid) -> Result<bool, AppError> {
        let mut tasks = self.tasks.write().await;
        let before = tasks.len();
        tasks.retain(|task| !(task.id == id && task.owner_id == owner.get()));
        Ok(tasks.len() < before)
    }

    async fn find_overdue(
        &self,
        owner: OwnerId,
        now: DateTime<Utc>,
        page: Pagination,
    ) -> Result<(Vec<Task>, i64), AppError> {
        Ok(self
            .select(
                owner,
                |task| !task.is_done && task.due_date.map_or(false, |due| due < now),
                SortSpec::BY_DUE_DATE,
                page,
            )
            .await)
    }

    async fn find_due_between(
        &self,
        owner: OwnerId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        page: Pagination,
    ) -> Result<(Vec<Task>, i64), AppError> {
        Ok(self
            .select(
                owner,
                |task| task.due_date.map_or(false, |due| due >= start && due < end),
                SortSpec::BY_DUE_DATE,
                page,
            )
            .await)
    }
}

#[derive(Debug, Default)]
struct UserTable {
    users: Vec<User>,
    next_id: i32,
}

#[derive(Debug, Default)]
pub struct MemoryUserStore {
    table: RwLock<UserTable>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let table = self.table.read().await;
        Ok(table.users.iter().find(|user| user.email == email).cloned())
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<User>, AppError> {
        let table = self.table.read().await;
        Ok(table.users.iter().find(|user| user.id == id).cloned())
    }

    async fn insert(&self, email: &str, password_hash: &str) -> Result<User, AppError> {
        let mut table = self.table.write().await;
        if table.users.iter().any(|user| user.email == email) {
            return Err(AppError::Conflict("Email already registered".into()));
        }
        table.next_id += 1;
        let user = User {
            id: table.next_id,
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            is_active: true,
            created_at: Utc::now(),
        };
        table.users.push(user.clone());
        Ok(user)
    }

    async fn set_active(&self, id: i32, is_active: bool) -> Result<Option<User>, AppError> {
        let mut table = self.table.write().await;
        Ok(table.users.iter_mut().find(|user| user.id == id).map(|user| {
            user.is_active = is_active;
            user.clone()
        }))
    }
}
