use async_trait::async_trait;
use uuid::Uuid;

use super::domain::{StoredUser, User};
use super::errors::AuthError;

/// Repository abstraction for account persistence.
#[async_trait]
pub trait AuthRepository: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<StoredUser>, AuthError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<StoredUser>, AuthError>;
    /// Insert an unverified user; fails with `Conflict` when the email is taken.
    async fn create_user(
        &self,
        email: &str,
        name: &str,
        password_hash: &str,
        verification_code: &str,
    ) -> Result<User, AuthError>;
    /// Overwrite the stored one-time code; the previous code stops working.
    async fn store_code(&self, id: Uuid, code: &str) -> Result<(), AuthError>;
    /// Flip the account to verified and clear the stored code.
    async fn mark_verified(&self, id: Uuid) -> Result<(), AuthError>;
}

/// Simple in-memory mock repository for tests and doc examples
pub mod mock {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use chrono::Utc;

    use super::*;

    #[derive(Default)]
    pub struct MockAuthRepository {
        users: Mutex<HashMap<Uuid, StoredUser>>,
    }

    #[async_trait]
    impl AuthRepository for MockAuthRepository {
        async fn find_by_email(&self, email: &str) -> Result<Option<StoredUser>, AuthError> {
            let users = self.users.lock().unwrap();
            Ok(users.values().find(|u| u.user.email.as_deref() == Some(email)).cloned())
        }

        async fn find_by_id(&self, id: Uuid) -> Result<Option<StoredUser>, AuthError> {
            let users = self.users.lock().unwrap();
            Ok(users.get(&id).cloned())
        }

        async fn create_user(
            &self,
            email: &str,
            name: &str,
            password_hash: &str,
            verification_code: &str,
        ) -> Result<User, AuthError> {
            let mut users = self.users.lock().unwrap();
            if users.values().any(|u| u.user.email.as_deref() == Some(email)) {
                return Err(AuthError::Conflict);
            }
            let user = User {
                id: Uuid::new_v4(),
                email: Some(email.to_string()),
                mobile: None,
                name: name.to_string(),
                is_verified: false,
                created_at: Utc::now(),
            };
            users.insert(user.id, StoredUser {
                user: user.clone(),
                password_hash: password_hash.to_string(),
                verification_code: Some(verification_code.to_string()),
            });
            Ok(user)
        }

        async fn store_code(&self, id: Uuid, code: &str) -> Result<(), AuthError> {
            let mut users = self.users.lock().unwrap();
            let stored = users.get_mut(&id).ok_or(AuthError::NotFound)?;
            stored.verification_code = Some(code.to_string());
            Ok(())
        }

        async fn mark_verified(&self, id: Uuid) -> Result<(), AuthError> {
            let mut users = self.users.lock().unwrap();
            let stored = users.get_mut(&id).ok_or(AuthError::NotFound)?;
            stored.user.is_verified = true;
            stored.verification_code = None;
            Ok(())
        }
    }
}
