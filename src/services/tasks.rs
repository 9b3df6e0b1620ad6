use std::sync::Arc;

use chrono::{DateTime, Duration, DurationRound, Utc};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{NewTask, OwnerId, Task, TaskPage, TaskPatch};
use crate::store::{Pagination, SortSpec, TaskFilter, TaskStore};

/// Business rules over a [`TaskStore`].
///
/// Every operation takes the caller's [`OwnerId`]. A task that does not exist and
/// a task owned by someone else produce the same `NotFoundOrForbidden`.
pub struct TaskService {
    store: Arc<dyn TaskStore>,
}

impl TaskService {
    pub fn new(store: Arc<dyn TaskStore>) -> Self {
        Self { store }
    }

    /// Validates the input and persists a new open task.
    pub async fn create(&self, owner: OwnerId, input: NewTask) -> Result<Task, AppError> {
        let input = input.normalized()?;
        self.store.insert(owner, &input).await
    }

    pub async fn get(&self, owner: OwnerId, id: Uuid) -> Result<Task, AppError> {
        self.store
            .find_one(owner, id)
            .await?
            .ok_or(AppError::NotFoundOrForbidden)
    }

    /// Applies only the fields present in `patch`.
    pub async fn update(
        &self,
        owner: OwnerId,
        id: Uuid,
        patch: TaskPatch,
    ) -> Result<Task, AppError> {
        let patch = patch.normalized()?;
        self.store
            .update_fields(owner, id, &patch)
            .await?
            .ok_or(AppError::NotFoundOrForbidden)
    }

    pub async fn complete(&self, owner: OwnerId, id: Uuid) -> Result<Task, AppError> {
        self.update(owner, id, TaskPatch::completion()).await
    }

    pub async fn delete(&self, owner: OwnerId, id: Uuid) -> Result<(), AppError> {
        if self.store.delete(owner, id).await? {
            log::debug!("owner {} deleted task {}", owner.get(), id);
            Ok(())
        } else {
            Err(AppError::NotFoundOrForbidden)
        }
    }

    pub async fn list(
        &self,
        owner: OwnerId,
        filter: TaskFilter,
        sort: Option<SortSpec>,
        page: Pagination,
    ) -> Result<TaskPage, AppError> {
        let (items, total) = self.store.query(owner, &filter, sort, page).await?;
        Ok(TaskPage::new(items, total, page))
    }

    /// Open tasks whose due date has passed.
    pub async fn overdue(&self, owner: OwnerId, page: Pagination) -> Result<TaskPage, AppError> {
        self.overdue_at(owner, Utc::now(), page).await
    }

    pub async fn overdue_at(
        &self,
        owner: OwnerId,
        now: DateTime<Utc>,
        page: Pagination,
    ) -> Result<TaskPage, AppError> {
        let (items, total) = self.store.find_overdue(owner, now, page).await?;
        Ok(TaskPage::new(items, total, page))
    }

    /// Tasks due on the current UTC calendar day, done or not.
    pub async fn due_today(&self, owner: OwnerId, page: Pagination) -> Result<TaskPage, AppError> {
        self.due_on_day_of(owner, Utc::now(), page).await
    }

    pub async fn due_on_day_of(
        &self,
        owner: OwnerId,
        instant: DateTime<Utc>,
        page: Pagination,
    ) -> Result<TaskPage, AppError> {
        let (start, end) = utc_day_bounds(instant)?;
        let (items, total) = self
            .store
            .find_due_between(owner, start, end, page)
            .await?;
        Ok(TaskPage::new(items, total, page))
    }
}

/// Midnight of `instant`'s UTC day and the following midnight.
fn utc_day_bounds(instant: DateTime<Utc>) -> Result<(DateTime<Utc>, DateTime<Utc>), AppError> {
    let start = instant
        .duration_trunc(Duration::days(1))
        .map_err(|e| AppError::InternalServerError(format!("Cannot compute day bounds: {}", e)))?;
    Ok((start, start + Duration::days(1)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryTaskStore, MemoryUserStore, UserStore};
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    async fn setup() -> (TaskService, OwnerId, OwnerId) {
        let users = MemoryUserStore::new();
        let alice = users.insert("alice@example.com", "hash").await.unwrap();
        let bob = users.insert("bob@example.com", "hash").await.unwrap();
        let service = TaskService::new(Arc::new(MemoryTaskStore::new()));
        (service, OwnerId::from(&alice), OwnerId::from(&bob))
    }

    fn titled(title: &str) -> NewTask {
        NewTask {
            title: title.to_string(),
            ..NewTask::default()
        }
    }

    #[actix_rt::test]
    async fn test_create_then_get_round_trips() {
        let (service, alice, _) = setup().await;
        let due = Utc.with_ymd_and_hms(2030, 1, 2, 3, 4, 5).unwrap();
        let created = service
            .create(
                alice,
                NewTask {
                    title: "  Plan trip ".to_string(),
                    description: Some("Book flights".to_string()),
                    due_date: Some(due),
                    tags: vec!["travel".to_string(), "family".to_string()],
                },
            )
            .await
            .unwrap();

        let fetched = service.get(alice, created.id).await.unwrap();
        assert_eq!(fetched, created);
        assert_eq!(fetched.title, "Plan trip");
        assert_eq!(fetched.description.as_deref(), Some("Book flights"));
        assert_eq!(fetched.due_date, Some(due));
        assert_eq!(fetched.tags, vec!["travel", "family"]);
        assert!(!fetched.is_done);
        assert_eq!(fetched.owner_id, alice.get());
    }

    #[actix_rt::test]
    async fn test_create_defaults() {
        let (service, alice, _) = setup().await;
        let created = service.create(alice, titled("Buy milk")).await.unwrap();
        assert!(created.tags.is_empty());
        assert!(!created.is_done);
        assert_eq!(created.description, None);
        assert_eq!(created.created_at, created.updated_at);
    }

    #[actix_rt::test]
    async fn test_create_rejects_blank_title() {
        let (service, alice, _) = setup().await;
        assert!(matches!(
            service.create(alice, titled("   ")).await,
            Err(AppError::ValidationError(_))
        ));
        let page = service
            .list(alice, TaskFilter::default(), None, Pagination::default())
            .await
            .unwrap();
        assert_eq!(page.total, 0);
    }

    #[actix_rt::test]
    async fn test_foreign_and_missing_ids_look_identical() {
        let (service, alice, bob) = setup().await;
        let task = service.create(alice, titled("Alice only")).await.unwrap();
        let missing = Uuid::new_v4();

        for id in [task.id, missing] {
            assert!(matches!(service.get(bob, id).await, Err(AppError::NotFoundOrForbidden)));
            assert!(matches!(
                service.update(bob, id, TaskPatch::completion()).await,
                Err(AppError::NotFoundOrForbidden)
            ));
            assert!(matches!(service.complete(bob, id).await, Err(AppError::NotFoundOrForbidden)));
            assert!(matches!(service.delete(bob, id).await, Err(AppError::NotFoundOrForbidden)));
        }

        let untouched = service.get(alice, task.id).await.unwrap();
        assert_eq!(untouched, task);
    }

    #[actix_rt::test]
    async fn test_partial_update_is_idempotent() {
        let (service, alice, _) = setup().await;
        let task = service
            .create(
                alice,
                NewTask {
                    title: "Original".to_string(),
                    description: Some("keep me".to_string()),
                    due_date: None,
                    tags: vec!["a".to_string()],
                },
            )
            .await
            .unwrap();

        let patch = TaskPatch {
            title: Some("Renamed".to_string()),
            ..TaskPatch::default()
        };
        let first = service.update(alice, task.id, patch.clone()).await.unwrap();
        assert_eq!(first.title, "Renamed");
        assert_eq!(first.description, task.description);
        assert_eq!(first.tags, task.tags);
        assert_eq!(first.is_done, task.is_done);
        assert_eq!(first.created_at, task.created_at);

        let second = service.update(alice, task.id, patch).await.unwrap();
        assert_eq!(
            (second.title.as_str(), &second.description, &second.tags, second.is_done),
            (first.title.as_str(), &first.description, &first.tags, first.is_done)
        );
    }

    #[actix_rt::test]
    async fn test_complete_and_reopen() {
        let (service, alice, _) = setup().await;
        let task = service.create(alice, titled("Toggle me")).await.unwrap();

        let done = service.complete(alice, task.id).await.unwrap();
        assert!(done.is_done);
        let again = service.complete(alice, task.id).await.unwrap();
        assert!(again.is_done);

        let reopened = service
            .update(
                alice,
                task.id,
                TaskPatch {
                    is_done: Some(false),
                    ..TaskPatch::default()
                },
            )
            .await
            .unwrap();
        assert!(!reopened.is_done);

        service.delete(alice, task.id).await.unwrap();
        assert!(matches!(
            service.get(alice, task.id).await,
            Err(AppError::NotFoundOrForbidden)
        ));
    }

    #[actix_rt::test]
    async fn test_list_filters_and_echoes_pagination() {
        let (service, alice, bob) = setup().await;
        service.create(alice, titled("Buy milk")).await.unwrap();
        let report = service.create(alice, titled("Finish report")).await.unwrap();
        service.complete(alice, report.id).await.unwrap();
        service.create(bob, titled("Buy more milk")).await.unwrap();

        let filter = TaskFilter {
            is_done: Some(false),
            search: Some("milk".to_string()),
        };
        let page = service
            .list(alice, filter, None, Pagination::new(10, 0))
            .await
            .unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].title, "Buy milk");
        assert_eq!((page.limit, page.offset), (10, 0));

        let page = service
            .list(alice, TaskFilter::default(), None, Pagination::new(1, 1))
            .await
            .unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.total, 2);
        assert_eq!((page.limit, page.offset), (1, 1));
    }

    #[actix_rt::test]
    async fn test_derived_views() {
        let (service, alice, bob) = setup().await;
        let now = Utc.with_ymd_and_hms(2031, 6, 15, 12, 0, 0).unwrap();
        let due = |title: &str, at: DateTime<Utc>| NewTask {
            title: title.to_string(),
            due_date: Some(at),
            ..NewTask::default()
        };

        service.create(alice, due("Yesterday", now - Duration::days(1))).await.unwrap();
        service.create(alice, due("This morning", now - Duration::hours(4))).await.unwrap();
        service.create(alice, due("Tonight", now + Duration::hours(11))).await.unwrap();
        service.create(alice, due("Tomorrow", now + Duration::hours(12))).await.unwrap();
        service.create(bob, due("Bob's morning", now - Duration::hours(1))).await.unwrap();

        let overdue = service
            .overdue_at(alice, now, Pagination::default())
            .await
            .unwrap();
        let titles: Vec<&str> = overdue.items.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["Yesterday", "This morning"]);
        assert_eq!(overdue.total, 2);

        let today = service
            .due_on_day_of(alice, now, Pagination::default())
            .await
            .unwrap();
        let titles: Vec<&str> = today.items.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["This morning", "Tonight"]);
    }

    #[test]
    fn test_utc_day_bounds() {
        let instant = Utc.with_ymd_and_hms(2031, 6, 15, 23, 59, 59).unwrap();
        let (start, end) = utc_day_bounds(instant).unwrap();
        assert_eq!(start, Utc.with_ymd_and_hms(2031, 6, 15, 0, 0, 0).unwrap());
        assert_eq!(end, Utc.with_ymd_and_hms(2031, 6, 16, 0, 0, 0).unwrap());
    }
}
