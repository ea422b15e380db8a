use async_trait::async_trait;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};
use uuid::Uuid;

use crate::auth::domain::{StoredUser, User};
use crate::auth::errors::AuthError;
use crate::auth::repository::AuthRepository;

pub struct SeaOrmAuthRepository {
    pub db: DatabaseConnection,
}

fn to_domain(m: models::user::Model) -> StoredUser {
    StoredUser {
        user: User {
            id: m.id,
            email: m.email,
            mobile: m.mobile,
            name: m.name,
            is_verified: m.is_verified,
            created_at: m.created_at.with_timezone(&chrono::Utc),
        },
        password_hash: m.password_hash,
        verification_code: m.verification_code,
    }
}

#[async_trait]
impl AuthRepository for SeaOrmAuthRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<StoredUser>, AuthError> {
        let res = models::user::find_by_email(&self.db, email)
            .await
            .map_err(|e| AuthError::Repository(e.to_string()))?;
        Ok(res.map(to_domain))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<StoredUser>, AuthError> {
        let res = models::user::find_by_id(&self.db, id)
            .await
            .map_err(|e| AuthError::Repository(e.to_string()))?;
        Ok(res.map(to_domain))
    }

    async fn create_user(
        &self,
        email: &str,
        name: &str,
        password_hash: &str,
        verification_code: &str,
    ) -> Result<User, AuthError> {
        let existing = models::user::find_by_email(&self.db, email)
            .await
            .map_err(|e| AuthError::Repository(e.to_string()))?;
        if existing.is_some() {
            return Err(AuthError::Conflict);
        }
        let created = models::user::create(&self.db, email, name, password_hash, verification_code)
            .await
            .map_err(|e| match e {
                models::errors::ModelError::Validation(m) => AuthError::Validation(m),
                models::errors::ModelError::Db(m) => AuthError::Repository(m),
            })?;
        Ok(to_domain(created).user)
    }

    async fn store_code(&self, id: Uuid, code: &str) -> Result<(), AuthError> {
        let found = models::user::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| AuthError::Repository(e.to_string()))?
            .ok_or(AuthError::NotFound)?;
        let mut am: models::user::ActiveModel = found.into();
        am.verification_code = Set(Some(code.to_string()));
        am.update(&self.db).await.map_err(|e| AuthError::Repository(e.to_string()))?;
        Ok(())
    }

    async fn mark_verified(&self, id: Uuid) -> Result<(), AuthError> {
        let found = models::user::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| AuthError::Repository(e.to_string()))?
            .ok_or(AuthError::NotFound)?;
        let mut am: models::user::ActiveModel = found.into();
        am.is_verified = Set(true);
        am.verification_code = Set(None);
        am.update(&self.db).await.map_err(|e| AuthError::Repository(e.to_string()))?;
        Ok(())
    }
}
