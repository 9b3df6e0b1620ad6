use crate::{
    auth::{CurrentUser, LoginForm, RegisterRequest},
    error::AppError,
    models::UserProfile,
    services::AccountService,
};
use actix_web::{get, post, web, HttpResponse, Responder};

/// Register a new user
///
/// Creates a new account and returns its public profile.
///
/// ## Responses:
/// - `201 Created`: The new `UserProfile`.
/// - `409 Conflict`: The email is already registered.
/// - `422 Unprocessable Entity`: Invalid email, or a password shorter than 6 characters.
#[post("/register")]
pub async fn register(
    accounts: web::Data<AccountService>,
    register_data: web::Json<RegisterRequest>,
) -> Result<impl Responder, AppError> {
    let user = accounts.register(register_data.into_inner()).await?;
    Ok(HttpResponse::Created().json(UserProfile::from(&user)))
}

/// Login user
///
/// Accepts form fields `username` (the email) and `password`, and returns a
/// bearer token.
///
/// ## Responses:
/// - `200 OK`: `{"access_token": ..., "token_type": "bearer"}`.
/// - `401 Unauthorized`: Unknown email or wrong password.
/// - `403 Forbidden`: The account is disabled.
#[post("/login")]
pub async fn login(
    accounts: web::Data<AccountService>,
    form: web::Form<LoginForm>,
) -> Result<impl Responder, AppError> {
    let response = accounts.login(&form.username, &form.password).await?;
    Ok(HttpResponse::Ok().json(response))
}

/// Profile of the authenticated caller.
#[get("/me")]
pub async fn me(user: CurrentUser) -> impl Responder {
    HttpResponse::Ok().json(UserProfile::from(&user.0))
}
