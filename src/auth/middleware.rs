use std::rc::Rc;

use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header,
    web, Error, HttpMessage, ResponseError,
};
use futures::future::{ready, LocalBoxFuture, Ready};

use crate::auth::gate::IdentityGate;
use crate::error::AppError;
use crate::models::User;

/// Routes under the protected scope that are reachable without a token.
const PUBLIC_PATHS: [&str; 2] = ["/api/v1/auth/login", "/api/v1/auth/register"];

/// Resolves the bearer token of every request through the [`IdentityGate`] and
/// stores the resulting `User` in request extensions. Requests without a valid,
/// active identity never reach a handler; they are answered here with the
/// error's own response.
pub struct AuthMiddleware;

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = AuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService {
            service: Rc::new(service),
        }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);

        if PUBLIC_PATHS.iter().any(|path| *path == req.path()) {
            return Box::pin(async move {
                service
                    .call(req)
                    .await
                    .map(ServiceResponse::map_into_left_body)
            });
        }

        let token = bearer_token(&req);
        let gate = req.app_data::<web::Data<IdentityGate>>().cloned();

        Box::pin(async move {
            match authenticate(gate, token).await {
                Ok(user) => {
                    req.extensions_mut().insert(user);
                    service
                        .call(req)
                        .await
                        .map(ServiceResponse::map_into_left_body)
                }
                Err(err) => {
                    let response = err.error_response();
                    Ok(req.into_response(response).map_into_right_body())
                }
            }
        })
    }
}

async fn authenticate(
    gate: Option<web::Data<IdentityGate>>,
    token: Option<String>,
) -> Result<User, AppError> {
    let gate = gate.ok_or_else(|| {
        AppError::InternalServerError("IdentityGate is not registered as app data".into())
    })?;
    let token = token.ok_or_else(|| AppError::Unauthorized("Missing token".into()))?;
    gate.resolve(&token).await
}

/// The credential of an `Authorization: Bearer <token>` header. The scheme is
/// matched case-insensitively.
fn bearer_token(req: &ServiceRequest) -> Option<String> {
    let value = req.headers().get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    Some(token.trim().to_string()).filter(|token| !token.is_empty())
}
