use chrono::Duration;

use super::password::{hash_password, verify_password};
use super::token::{Claims, TokenSigner};
use crate::config::Config;
use crate::error::AppError;

/// Password hashing plus token issuance and verification, built once at startup
/// and shared by the account service and the identity gate.
pub struct CredentialManager {
    signer: TokenSigner,
    default_ttl: Duration,
    bcrypt_cost: u32,
}

impl CredentialManager {
    pub fn new(secret: &str, default_ttl: Duration, bcrypt_cost: u32) -> Self {
        Self {
            signer: TokenSigner::new(secret),
            default_ttl,
            bcrypt_cost,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.jwt_secret, config.token_ttl, config.bcrypt_cost)
    }

    pub fn hash(&self, password: &str) -> Result<String, AppError> {
        hash_password(password, self.bcrypt_cost)
    }

    pub fn verify(&self, password: &str, hash: &str) -> bool {
        verify_password(password, hash)
    }

    /// Issues a token for `subject`, valid for `ttl` or the configured default.
    pub fn issue_token(&self, subject: &str, ttl: Option<Duration>) -> Result<String, AppError> {
        let claims = Claims::new(subject, ttl.unwrap_or(self.default_ttl))?;
        self.signer.sign(&claims)
    }

    pub fn verify_token(&self, token: &str) -> Result<Claims, AppError> {
        self.signer.verify(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager() -> CredentialManager {
        CredentialManager::new("credential-test-secret", Duration::days(7), 4)
    }

    #[test]
    fn test_issue_uses_default_ttl() {
        let credentials = manager();
        let token = credentials.issue_token("42", None).unwrap();
        let claims = credentials.verify_token(&token).unwrap();
        assert_eq!(claims.sub, "42");
        assert_eq!(claims.exp - claims.iat, Duration::days(7).num_seconds());
    }

    #[test]
    fn test_issue_with_explicit_ttl() {
        let credentials = manager();
        let token = credentials
            .issue_token("42", Some(Duration::minutes(5)))
            .unwrap();
        let claims = credentials.verify_token(&token).unwrap();
        assert_eq!(claims.exp - claims.iat, 300);

        let expired = credentials
            .issue_token("42", Some(Duration::minutes(-1)))
            .unwrap();
        assert!(credentials.verify_token(&expired).is_err());
    }

    #[test]
    fn test_longest_configured_ttl_can_be_issued() {
        let credentials = CredentialManager::new("credential-test-secret", Duration::days(3650), 4);
        let token = credentials.issue_token("42", None).unwrap();
        assert!(credentials.verify_token(&token).is_ok());

        assert!(matches!(
            credentials.issue_token("42", Some(Duration::days(365 * 1_000_000))),
            Err(AppError::InternalServerError(_))
        ));
    }

    #[test]
    fn test_hash_and_verify() {
        let credentials = manager();
        let hash = credentials.hash("secret1").unwrap();
        assert!(credentials.verify("secret1", &hash));
        assert!(!credentials.verify("secret2", &hash));
        assert!(!credentials.verify("secret1", "not-a-bcrypt-hash"));
    }
}
