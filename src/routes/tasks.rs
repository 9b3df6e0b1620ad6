use crate::{
    auth::CurrentUser,
    error::AppError,
    models::{NewTask, PageQuery, TaskPatch, TaskQuery},
    services::TaskService,
};
use actix_web::{delete, get, patch, post, put, web, HttpResponse, Responder};
use uuid::Uuid;
use validator::Validate;

/// Lists the caller's todos.
///
/// ## Query Parameters:
/// - `is_done` (optional): Only open (`false`) or only completed (`true`) todos.
/// - `q` (optional): Case-insensitive substring of the title.
/// - `sort` (optional): `created_at`, `updated_at`, `due_date` or `title`, with a
///   leading `-` for descending. Unknown names fall back to the default order.
/// - `limit` (default 100, at most 1000) and `offset` (default 0).
///
/// ## Responses:
/// - `200 OK`: `{"items": [...], "total": n, "limit": l, "offset": o}`, where
///   `total` counts every match regardless of the page.
/// - `422 Unprocessable Entity`: `limit` or `offset` out of range.
#[get("")]
pub async fn list_todos(
    tasks: web::Data<TaskService>,
    user: CurrentUser,
    query: web::Query<TaskQuery>,
) -> Result<impl Responder, AppError> {
    let query = query.into_inner();
    query.validate()?;
    let (filter, sort, page) = query.into_parts();
    let page = tasks.list(user.owner(), filter, sort, page).await?;
    Ok(HttpResponse::Ok().json(page))
}

/// Creates a todo owned by the caller.
///
/// ## Responses:
/// - `201 Created`: The new todo, open and stamped with creation time.
/// - `422 Unprocessable Entity`: Blank or out-of-range title, or a description
///   longer than 500 characters.
#[post("")]
pub async fn create_todo(
    tasks: web::Data<TaskService>,
    user: CurrentUser,
    task_data: web::Json<NewTask>,
) -> Result<impl Responder, AppError> {
    let task = tasks.create(user.owner(), task_data.into_inner()).await?;
    Ok(HttpResponse::Created().json(task))
}

/// Open todos whose due date has passed, earliest first.
#[get("/overdue")]
pub async fn overdue_todos(
    tasks: web::Data<TaskService>,
    user: CurrentUser,
    query: web::Query<PageQuery>,
) -> Result<impl Responder, AppError> {
    query.validate()?;
    let page = tasks.overdue(user.owner(), query.into_inner().into()).await?;
    Ok(HttpResponse::Ok().json(page))
}

/// Todos due during the current UTC day.
#[get("/today")]
pub async fn todos_due_today(
    tasks: web::Data<TaskService>,
    user: CurrentUser,
    query: web::Query<PageQuery>,
) -> Result<impl Responder, AppError> {
    query.validate()?;
    let page = tasks.due_today(user.owner(), query.into_inner().into()).await?;
    Ok(HttpResponse::Ok().json(page))
}

/// Retrieves one todo.
///
/// ## Responses:
/// - `200 OK`: The todo.
/// - `404 Not Found`: No todo with this id belongs to the caller. A todo owned
///   by someone else is reported the same way.
#[get("/{id}")]
pub async fn get_todo(
    tasks: web::Data<TaskService>,
    user: CurrentUser,
    task_id: web::Path<Uuid>,
) -> Result<impl Responder, AppError> {
    let task = tasks.get(user.owner(), task_id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(task))
}

/// Updates a todo. Only the supplied fields change.
#[put("/{id}")]
pub async fn replace_todo(
    tasks: web::Data<TaskService>,
    user: CurrentUser,
    task_id: web::Path<Uuid>,
    changes: web::Json<TaskPatch>,
) -> Result<impl Responder, AppError> {
    let task = tasks
        .update(user.owner(), task_id.into_inner(), changes.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(task))
}

/// Same as `PUT`.
#[patch("/{id}")]
pub async fn patch_todo(
    tasks: web::Data<TaskService>,
    user: CurrentUser,
    task_id: web::Path<Uuid>,
    changes: web::Json<TaskPatch>,
) -> Result<impl Responder, AppError> {
    let task = tasks
        .update(user.owner(), task_id.into_inner(), changes.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(task))
}

/// Deletes a todo.
///
/// ## Responses:
/// - `204 No Content`: On successful deletion.
/// - `404 Not Found`: Absent, or owned by someone else.
#[delete("/{id}")]
pub async fn delete_todo(
    tasks: web::Data<TaskService>,
    user: CurrentUser,
    task_id: web::Path<Uuid>,
) -> Result<impl Responder, AppError> {
    tasks.delete(user.owner(), task_id.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Marks a todo done. Completing an already completed todo succeeds.
#[post("/{id}/complete")]
pub async fn complete_todo(
    tasks: web::Data<TaskService>,
    user: CurrentUser,
    task_id: web::Path<Uuid>,
) -> Result<impl Responder, AppError> {
    let task = tasks.complete(user.owner(), task_id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(task))
}
