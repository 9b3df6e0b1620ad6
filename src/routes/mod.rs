pub mod auth;
pub mod health;
pub mod tasks;

use actix_web::web;

use crate::error::AppError;

/// Routes mounted under `/api/v1`. The caller wraps the scope in `AuthMiddleware`.
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.app_data(extractor_config())
        .app_data(query_config())
        .app_data(path_config())
        .service(
            web::scope("/auth")
                .service(auth::register)
                .service(auth::login)
                .service(auth::me),
        )
        .service(
            // The fixed views come before `/{id}` so they are not parsed as ids.
            web::scope("/todos")
                .service(tasks::list_todos)
                .service(tasks::create_todo)
                .service(tasks::overdue_todos)
                .service(tasks::todos_due_today)
                .service(tasks::get_todo)
                .service(tasks::replace_todo)
                .service(tasks::patch_todo)
                .service(tasks::delete_todo)
                .service(tasks::complete_todo),
        );
}

/// Unscoped routes: the greeting and the health check.
pub fn config_public(cfg: &mut web::ServiceConfig) {
    cfg.service(health::root).service(health::health);
}

/// Malformed JSON bodies are reported like any other invalid input.
fn extractor_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .error_handler(|err, _req| AppError::ValidationError(err.to_string()).into())
}

fn query_config() -> web::QueryConfig {
    web::QueryConfig::default()
        .error_handler(|err, _req| AppError::ValidationError(err.to_string()).into())
}

/// An id that is not a UUID cannot name one of the caller's tasks.
fn path_config() -> web::PathConfig {
    web::PathConfig::default().error_handler(|_err, _req| AppError::NotFoundOrForbidden.into())
}
