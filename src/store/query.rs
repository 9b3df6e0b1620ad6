use std::cmp::Ordering;

use crate::models::task::{DEFAULT_LIMIT, MAX_LIMIT};
use crate::models::Task;

/// Filters applied before pagination.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFilter {
    /// Exact match on the completion flag; `None` matches both.
    pub is_done: Option<bool>,
    /// Case-insensitive substring of the title.
    pub search: Option<String>,
}

impl TaskFilter {
    /// The search term, or `None` when absent or empty.
    pub fn search_term(&self) -> Option<&str> {
        self.search.as_deref().filter(|term| !term.is_empty())
    }

    pub fn matches(&self, task: &Task) -> bool {
        if let Some(is_done) = self.is_done {
            if task.is_done != is_done {
                return false;
            }
        }
        match self.search_term() {
            Some(term) => task.title.to_lowercase().contains(&term.to_lowercase()),
            None => true,
        }
    }
}

/// Fields a listing may be sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    CreatedAt,
    UpdatedAt,
    DueDate,
    Title,
}

impl SortField {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "created_at" => Some(SortField::CreatedAt),
            "updated_at" => Some(SortField::UpdatedAt),
            "due_date" => Some(SortField::DueDate),
            "title" => Some(SortField::Title),
            _ => None,
        }
    }

    /// Column name in the `todos` table. Only these literals ever reach SQL.
    pub fn column(self) -> &'static str {
        match self {
            SortField::CreatedAt => "created_at",
            SortField::UpdatedAt => "updated_at",
            SortField::DueDate => "due_date",
            SortField::Title => "title",
        }
    }

    /// Ascending comparison approximating Postgres ordering. Titles compare
    /// case-folded first, and a missing due date sorts after every present one.
    fn compare(self, a: &Task, b: &Task) -> Ordering {
        match self {
            SortField::CreatedAt => a.created_at.cmp(&b.created_at),
            SortField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
            SortField::Title => a
                .title
                .to_lowercase()
                .cmp(&b.title.to_lowercase())
                .then_with(|| a.title.cmp(&b.title)),
            SortField::DueDate => match (a.due_date, b.due_date) {
                (Some(x), Some(y)) => x.cmp(&y),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            },
        }
    }
}

/// A parsed `sort` parameter such as `created_at` or `-due_date`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSpec {
    pub field: SortField,
    pub descending: bool,
}

impl SortSpec {
    pub const DEFAULT: SortSpec = SortSpec {
        field: SortField::CreatedAt,
        descending: false,
    };

    /// Earliest due date first; the order of the overdue and due-today views.
    pub const BY_DUE_DATE: SortSpec = SortSpec {
        field: SortField::DueDate,
        descending: false,
    };

    /// Returns `None` for names outside the allow-list. Callers treat that as
    /// "no sort requested", not as an error.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        let (name, descending) = match raw.strip_prefix('-') {
            Some(rest) => (rest, true),
            None => (raw, false),
        };
        SortField::from_name(name).map(|field| SortSpec { field, descending })
    }

    /// Total order over tasks: the sort field, then `id` in the same direction,
    /// so flipping `descending` reverses the result exactly.
    pub fn compare(&self, a: &Task, b: &Task) -> Ordering {
        let ordering = self.field.compare(a, b).then_with(|| a.id.cmp(&b.id));
        if self.descending {
            ordering.reverse()
        } else {
            ordering
        }
    }

    /// `ORDER BY` body for this ordering, built from allow-listed literals only.
    pub fn order_by_sql(&self) -> String {
        let direction = if self.descending { "DESC" } else { "ASC" };
        format!(
            "{column} {direction}, id {direction}",
            column = self.field.column()
        )
    }
}

/// A clamped limit/offset pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    limit: i64,
    offset: i64,
}

impl Pagination {
    /// Clamps `limit` to `[1, 1000]` and `offset` to `[0, ∞)`.
    pub fn new(limit: i64, offset: i64) -> Self {
        Self {
            limit: limit.clamp(1, MAX_LIMIT),
            offset: offset.max(0),
        }
    }

    pub fn limit(&self) -> i64 {
        self.limit
    }

    pub fn offset(&self) -> i64 {
        self.offset
    }

    /// Applies this page to an already ordered slice.
    pub fn slice<T: Clone>(&self, rows: &[T]) -> Vec<T> {
        rows.iter()
            .skip(self.offset as usize)
            .take(self.limit as usize)
            .cloned()
            .collect()
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(DEFAULT_LIMIT, 0)
    }
}

/// Escapes `LIKE` metacharacters and wraps the term for a substring match.
pub fn like_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for ch in term.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}
