#![allow(dead_code)]

use std::sync::Arc;

use actix_web::{body::MessageBody, dev::ServiceResponse, http::header, test};
use chrono::Duration;
use serde_json::json;
use todoforge::auth::CredentialManager;
use todoforge::AppServices;

pub const TEST_SECRET: &str = "integration-test-secret";

pub fn credentials() -> Arc<CredentialManager> {
    Arc::new(CredentialManager::new(TEST_SECRET, Duration::days(7), 4))
}

/// Fresh in-memory services, so every test starts from an empty store.
pub fn services() -> AppServices {
    AppServices::in_memory(credentials())
}

/// Builds the application the way `main` does, over the given `AppServices`.

macro_rules! init_app {
    ($services:expr) => {{
        let services: todoforge::AppServices = $services;
        actix_web::test::init_service(
            actix_web::App::new()
                .wrap(actix_cors::Cors::permissive())
                .wrap(actix_web::middleware::Logger::default())
                .configure(|cfg| services.register(cfg))
                .configure(todoforge::routes::config_public)
                .service(
                    actix_web::web::scope("/api/v1")
                        .wrap(todoforge::auth::AuthMiddleware)
                        .configure(todoforge::routes::config),
                ),
        )
        .await
    }};
}

pub fn bearer(token: &str) -> (header::HeaderName, String) {
    (header::AUTHORIZATION, format!("Bearer {}", token))
}

pub async fn register<S, B>(app: &S, email: &str, password: &str) -> ServiceResponse<B>
where
    S: actix_web::dev::Service<
        actix_http::Request,
        Response = ServiceResponse<B>,
        Error = actix_web::Error,
    >,
    B: MessageBody,
{
    let req = test::TestRequest::post()
        .uri("/api/v1/auth/register")
        .set_json(json!({ "email": email, "password": password }))
        .to_request();
    test::call_service(app, req).await
}

pub async fn login<S, B>(app: &S, email: &str, password: &str) -> ServiceResponse<B>
where
    S: actix_web::dev::Service<
        actix_http::Request,
        Response = ServiceResponse<B>,
        Error = actix_web::Error,
    >,
    B: MessageBody,
{
    let req = test::TestRequest::post()
        .uri("/api/v1/auth/login")
        .set_form([("username", email), ("password", password)])
        .to_request();
    test::call_service(app, req).await
}

/// Registers an account and returns a bearer token for it.
pub async fn register_and_login<S, B>(app: &S, email: &str, password: &str) -> String
where
    S: actix_web::dev::Service<
        actix_http::Request,
        Response = ServiceResponse<B>,
        Error = actix_web::Error,
    >,
    B: MessageBody,
{
    let resp = register(app, email, password).await;
    assert!(resp.status().is_success(), "registration failed: {}", resp.status());

    let resp = login(app, email, password).await;
    assert!(resp.status().is_success(), "login failed: {}", resp.status());
    let body: serde_json::Value = test::read_body_json(resp).await;
    body["access_token"]
        .as_str()
        .expect("login response carries access_token")
        .to_string()
}
