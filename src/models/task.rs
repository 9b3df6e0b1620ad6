use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::error::AppError;
use crate::store::{Pagination, SortSpec, TaskFilter};

/// Default page size for list endpoints.
pub const DEFAULT_LIMIT: i64 = 100;
/// Largest page size a caller may request.
pub const MAX_LIMIT: i64 = 1000;

/// Represents a task entity as stored in the database and returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Task {
    /// Unique identifier for the task (UUID v4).
    pub id: Uuid,
    /// The title of the task, trimmed, 3 to 100 characters.
    pub title: String,
    /// An optional description for the task.
    pub description: Option<String>,
    /// Completion flag.
    pub is_done: bool,
    /// Optional due date for the task.
    pub due_date: Option<DateTime<Utc>>,
    /// Free-form labels, in the order the owner supplied them.
    pub tags: Vec<String>,
    /// Timestamp of when the task was created.
    pub created_at: DateTime<Utc>,
    /// Timestamp of the last mutation.
    pub updated_at: DateTime<Utc>,
    /// Identifier of the user who owns the task.
    pub owner_id: i32,
}

/// Input for creating a task.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct NewTask {
    /// Must be between 3 and 100 characters once trimmed.
    #[validate(length(min = 3, max = 100))]
    pub title: String,

    /// Maximum length of 500 characters if provided.
    #[validate(length(max = 500))]
    pub description: Option<String>,

    pub due_date: Option<DateTime<Utc>>,

    #[serde(default)]
    pub tags: Vec<String>,
}

impl NewTask {
    /// Trims the title and validates every field.
    pub fn normalized(mut self) -> Result<Self, AppError> {
        self.title = normalize_title(&self.title)?;
        self.validate()?;
        Ok(self)
    }
}

/// Partial update for a task. Absent fields are left unchanged.
///
/// The same payload serves both `PUT` and `PATCH`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct TaskPatch {
    #[validate(length(min = 3, max = 100))]
    pub title: Option<String>,

    #[validate(length(max = 500))]
    pub description: Option<String>,

    pub is_done: Option<bool>,

    pub due_date: Option<DateTime<Utc>>,

    pub tags: Option<Vec<String>>,
}

impl TaskPatch {
    /// A patch that only marks the task complete.
    pub fn completion() -> Self {
        Self {
            is_done: Some(true),
            ..Self::default()
        }
    }

    /// Trims the title, if one was supplied, and validates every supplied field.
    pub fn normalized(mut self) -> Result<Self, AppError> {
        if let Some(title) = self.title.take() {
            self.title = Some(normalize_title(&title)?);
        }
        self.validate()?;
        Ok(self)
    }
}

fn normalize_title(title: &str) -> Result<String, AppError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(AppError::ValidationError("Title cannot be empty".into()));
    }
    Ok(trimmed.to_string())
}

/// Represents query parameters for filtering tasks when listing them.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct TaskQuery {
    /// Filter by completion flag; absent means both.
    pub is_done: Option<bool>,
    /// Case-insensitive substring of the title.
    pub q: Option<String>,
    /// Field name, optionally prefixed with `-` for descending. Unknown names are ignored.
    pub sort: Option<String>,
    #[serde(default = "default_limit")]
    #[validate(range(min = 1, max = 1000))]
    pub limit: i64,
    #[serde(default)]
    #[validate(range(min = 0))]
    pub offset: i64,
}

impl Default for TaskQuery {
    fn default() -> Self {
        Self {
            is_done: None,
            q: None,
            sort: None,
            limit: DEFAULT_LIMIT,
            offset: 0,
        }
    }
}

impl TaskQuery {
    /// Splits the raw parameters into what the store understands.
    pub fn into_parts(self) -> (TaskFilter, Option<SortSpec>, Pagination) {
        let sort = self.sort.as_deref().and_then(SortSpec::parse);
        let filter = TaskFilter {
            is_done: self.is_done,
            search: self.q,
        };
        (filter, sort, Pagination::new(self.limit, self.offset))
    }
}

/// Pagination-only parameters, used by the overdue and due-today views.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Validate)]
pub struct PageQuery {
    #[serde(default = "default_limit")]
    #[validate(range(min = 1, max = 1000))]
    pub limit: i64,
    #[serde(default)]
    #[validate(range(min = 0))]
    pub offset: i64,
}

impl From<PageQuery> for Pagination {
    fn from(query: PageQuery) -> Self {
        Pagination::new(query.limit, query.offset)
    }
}

fn default_limit() -> i64 {
    DEFAULT_LIMIT
}

/// One page of tasks plus the metadata needed to fetch the next one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskPage {
    pub items: Vec<Task>,
    /// Number of tasks matching the filter, ignoring limit and offset.
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}

impl TaskPage {
    pub fn new(items: Vec<Task>, total: i64, page: Pagination) -> Self {
        Self {
            items,
            total,
            limit: page.limit(),
            offset: page.offset(),
        }
    }
}
