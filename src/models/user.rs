use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A user account as stored in the `users` table.
///
/// Carries the password hash, so it is deliberately not `Serialize`; use
/// [`UserProfile`] for anything that leaves the process.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i32,
    pub email: String,
    pub password_hash: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// The public view of a user, returned by registration and `/auth/me`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: i32,
    pub email: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            is_active: user.is_active,
            created_at: user.created_at,
        }
    }
}

/// The identity every task store operation is scoped by.
///
/// It has no public constructor from a bare integer: the only way to obtain one is
/// from a loaded [`User`], which in request handling means from the identity gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OwnerId(i32);

impl OwnerId {
    pub fn get(self) -> i32 {
        self.0
    }
}

impl From<&User> for OwnerId {
    fn from(user: &User) -> Self {
        OwnerId(user.id)
    }
}
