use std::sync::Arc;

use super::credentials::CredentialManager;
use crate::error::AppError;
use crate::models::User;
use crate::store::UserStore;

/// Turns a raw bearer token into an active [`User`].
///
/// Token checks are stateless; the only store access is the user lookup, which is
/// what lets a disabled account be refused even while its token is unexpired.
pub struct IdentityGate {
    credentials: Arc<CredentialManager>,
    users: Arc<dyn UserStore>,
}

impl IdentityGate {
    pub fn new(credentials: Arc<CredentialManager>, users: Arc<dyn UserStore>) -> Self {
        Self { credentials, users }
    }

    pub async fn resolve(&self, token: &str) -> Result<User, AppError> {
        let claims = self.credentials.verify_token(token)?;
        let user_id: i32 = claims
            .sub
            .parse()
            .map_err(|_| AppError::Unauthorized(format!("Malformed token subject {:?}", claims.sub)))?;

        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::Unauthorized(format!("Unknown token subject {}", user_id)))?;

        if !user.is_active {
            log::warn!("disabled account {} presented a valid token", user.id);
            return Err(AppError::AccountDisabled);
        }
        Ok(user)
    }
}
