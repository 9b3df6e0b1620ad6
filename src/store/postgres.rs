use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::{like_pattern, Pagination, SortSpec, TaskFilter, TaskStore, UserStore};
use crate::error::AppError;
use crate::models::{NewTask, OwnerId, Task, TaskPatch, User};

const TASK_COLUMNS: &str =
    "id, title, description, is_done, due_date, tags, created_at, updated_at, owner_id";

const USER_COLUMNS: &str = "id, email, password_hash, is_active, created_at";

/// Which rows of the owner's tasks a paged read selects.
enum Scope<'a> {
    Filtered(&'a TaskFilter),
    Overdue(DateTime<Utc>),
    DueBetween(DateTime<Utc>, DateTime<Utc>),
}

/// Appends the `WHERE` clause. The owner condition is always first and always present.
fn push_scope(builder: &mut QueryBuilder<'_, Postgres>, owner: OwnerId, scope: &Scope<'_>) {
    builder.push(" WHERE owner_id = ").push_bind(owner.get());
    match scope {
        Scope::Filtered(filter) => {
            if let Some(is_done) = filter.is_done {
                builder.push(" AND is_done = ").push_bind(is_done);
            }
            if let Some(term) = filter.search_term() {
                builder
                    .push(" AND title ILIKE ")
                    .push_bind(like_pattern(term))
                    .push(" ESCAPE '\\'");
            }
        }
        Scope::Overdue(now) => {
            builder
                .push(" AND is_done = FALSE AND due_date < ")
                .push_bind(*now);
        }
        Scope::DueBetween(start, end) => {
            builder
                .push(" AND due_date >= ")
                .push_bind(*start)
                .push(" AND due_date < ")
                .push_bind(*end);
        }
    }
}

/// Task store backed by the `todos` table.
#[derive(Debug, Clone)]
pub struct PgTaskStore {
    pool: PgPool,
}

impl PgTaskStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn select_page(
        &self,
        owner: OwnerId,
        scope: Scope<'_>,
        order: SortSpec,
        page: Pagination,
    ) -> Result<(Vec<Task>, i64), AppError> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM todos");
        push_scope(&mut count, owner, &scope);
        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        let mut select = QueryBuilder::<Postgres>::new(format!("SELECT {} FROM todos", TASK_COLUMNS));
        push_scope(&mut select, owner, &scope);
        select
            .push(" ORDER BY ")
            .push(order.order_by_sql())
            .push(" LIMIT ")
            .push_bind(page.limit())
            .push(" OFFSET ")
            .push_bind(page.offset());
        let rows = select
            .build_query_as::<Task>()
            .fetch_all(&self.pool)
            .await?;

        log::debug!(
            "owner {} selected {} of {} tasks",
            owner.get(),
            rows.len(),
            total
        );
        Ok((rows, total))
    }
}

#[async_trait]
impl TaskStore for PgTaskStore {
    async fn query(
        &self,
        owner: OwnerId,
        filter: &TaskFilter,
        sort: Option<SortSpec>,
        page: Pagination,
    ) -> Result<(Vec<Task>, i64), AppError> {
        self.select_page(
            owner,
            Scope::Filtered(filter),
            sort.unwrap_or(SortSpec::DEFAULT),
            page,
        )
        .await
    }

    async fn insert(&self, owner: OwnerId, new_task: &NewTask) -> Result<Task, AppError> {
        let sql = format!(
            "INSERT INTO todos (id, title, description, due_date, tags, owner_id) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {}",
            TASK_COLUMNS
        );
        let task = sqlx::query_as::<_, Task>(&sql)
            .bind(Uuid::new_v4())
            .bind(&new_task.title)
            .bind(&new_task.description)
            .bind(new_task.due_date)
            .bind(&new_task.tags)
            .bind(owner.get())
            .fetch_one(&self.pool)
            .await?;
        log::debug!("inserted task {} for owner {}", task.id, owner.get());
        Ok(task)
    }

    async fn find_one(&self, owner: OwnerId, id: Uuid) -> Result<Option<Task>, AppError> {
        let sql = format!(
            "SELECT {} FROM todos WHERE id = $1 AND owner_id = $2",
            TASK_COLUMNS
        );
        let task = sqlx::query_as::<_, Task>(&sql)
            .bind(id)
            .bind(owner.get())
            .fetch_optional(&self.pool)
            .await?;
        Ok(task)
    }

    async fn update_fields(
        &self,
        owner: OwnerId,
        id: Uuid,
        patch: &TaskPatch,
    ) -> Result<Option<Task>, AppError> {
        // One statement: the row is read, patched and written atomically.
        let sql = format!(
            "UPDATE todos SET \
                 title = COALESCE($3, title), \
                 description = COALESCE($4, description), \
                 is_done = COALESCE($5, is_done), \
                 due_date = COALESCE($6, due_date), \
                 tags = COALESCE($7, tags), \
                 updated_at = NOW() \
             WHERE id = $1 AND owner_id = $2 \
             RETURNING {}",
            TASK_COLUMNS
        );
        let task = sqlx::query_as::<_, Task>(&sql)
            .bind(id)
            .bind(owner.get())
            .bind(&patch.title)
            .bind(&patch.description)
            .bind(patch.is_done)
            .bind(patch.due_date)
            .bind(&patch.tags)
            .fetch_optional(&self.pool)
            .await?;
        Ok(task)
    }

    async fn delete(&self, owner: OwnerId, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM todos WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(owner.get())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn find_overdue(
        &self,
        owner: OwnerId,
        now: DateTime<Utc>,
        page: Pagination,
    ) -> Result<(Vec<Task>, i64), AppError> {
        self.select_page(owner, Scope::Overdue(now), SortSpec::BY_DUE_DATE, page)
            .await
    }

    async fn find_due_between(
        &self,
        owner: OwnerId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        page: Pagination,
    ) -> Result<(Vec<Task>, i64), AppError> {
        self.select_page(owner, Scope::DueBetween(start, end), SortSpec::BY_DUE_DATE, page)
            .await
    }
}

/// User store backed by the `users` table.
#[derive(Debug, Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let sql = format!("SELECT {} FROM users WHERE email = $1", USER_COLUMNS);
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<User>, AppError> {
        let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn insert(&self, email: &str, password_hash: &str) -> Result<User, AppError> {
        // The UNIQUE constraint on email surfaces as `AppError::Conflict`.
        let sql = format!(
            "INSERT INTO users (email, password_hash) VALUES ($1, $2) RETURNING {}",
            USER_COLUMNS
        );
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .bind(password_hash)
            .fetch_one(&self.pool)
            .await?;
        Ok(user)
    }

    async fn set_active(&self, id: i32, is_active: bool) -> Result<Option<User>, AppError> {
        let sql = format!(
            "UPDATE users SET is_active = $2 WHERE id = $1 RETURNING {}",
            USER_COLUMNS
        );
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .bind(is_active)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }
}
