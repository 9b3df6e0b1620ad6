use std::sync::Arc;

use validator::Validate;

use crate::auth::{CredentialManager, RegisterRequest, TokenResponse};
use crate::error::AppError;
use crate::models::User;
use crate::store::UserStore;

/// Registration and login.
pub struct AccountService {
    users: Arc<dyn UserStore>,
    credentials: Arc<CredentialManager>,
}

impl AccountService {
    pub fn new(users: Arc<dyn UserStore>, credentials: Arc<CredentialManager>) -> Self {
        Self { users, credentials }
    }

    /// Creates an account. A duplicate email fails with `Conflict` before
    /// anything is hashed or written.
    pub async fn register(&self, request: RegisterRequest) -> Result<User, AppError> {
        request.validate()?;

        if self.users.find_by_email(&request.email).await?.is_some() {
            return Err(AppError::Conflict("Email already registered".into()));
        }

        let password_hash = self.credentials.hash(&request.password)?;
        let user = self.users.insert(&request.email, &password_hash).await?;
        log::info!("registered user {}", user.id);
        Ok(user)
    }

    /// Exchanges an email/password pair for a bearer token.
    pub async fn login(&self, email: &str, password: &str) -> Result<TokenResponse, AppError> {
        let user = match self.users.find_by_email(email).await? {
            Some(user) if self.credentials.verify(password, &user.password_hash) => user,
            _ => {
                log::warn!("failed login attempt");
                return Err(AppError::InvalidCredentials);
            }
        };

        if !user.is_active {
            return Err(AppError::AccountDisabled);
        }

        let token = self.credentials.issue_token(&user.id.to_string(), None)?;
        Ok(TokenResponse::bearer(token))
    }
}
