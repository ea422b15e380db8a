use std::sync::Arc;

use argon2::{
    password_hash::{PasswordHasher, PasswordVerifier, SaltString},
    Argon2, PasswordHash,
};
use chrono::Utc;
use rand::rngs::OsRng;
use rand::Rng;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::attempt::attempt;
use crate::notify::Notifier;

use super::domain::{RegisterInput, Registration, User};
use super::errors::AuthError;
use super::repository::AuthRepository;

/// Account business service independent of the web framework.
pub struct AuthService<R: AuthRepository> {
    repo: Arc<R>,
    notifier: Arc<dyn Notifier>,
}

impl<R: AuthRepository> AuthService<R> {
    pub fn new(repo: Arc<R>, notifier: Arc<dyn Notifier>) -> Self {
        Self { repo, notifier }
    }

    /// Six ASCII digits drawn uniformly from the full 10^6 space.
    fn generate_code() -> String {
        format!("{:06}", rand::thread_rng().gen_range(0..1_000_000))
    }

    /// Create an unverified account and ask the notifier to deliver the
    /// one-time code. Delivery failure falls back to the operational log so
    /// the flow stays usable without a working mail setup.
    #[instrument(skip(self, input))]
    pub async fn register(&self, input: RegisterInput) -> Result<Registration, AuthError> {
        let (email, password, name) = match (input.email, input.password, input.name) {
            (Some(e), Some(p), Some(n)) if !e.is_empty() && !p.is_empty() && !n.is_empty() => (e, p, n),
            _ => return Err(AuthError::Validation("missing required fields".into())),
        };
        models::user::validate_email(&email).map_err(|e| AuthError::Validation(e.to_string()))?;
        models::user::validate_name(&name).map_err(|e| AuthError::Validation(e.to_string()))?;
        if password.len() < 8 {
            return Err(AuthError::Validation("password too short (>=8)".into()));
        }

        let code = Self::generate_code();
        let hash = hash_password(&password)?;
        let user = self.repo.create_user(&email, &name, &hash, &code).await?;

        if attempt("send verification code", self.notifier.send_verification_code(&email, &code, &name))
            .await
            .is_none()
        {
            info!(%email, %code, "verification code (delivery unavailable)");
        }
        info!(user_id = %user.id, %email, "user registered");
        Ok(Registration { user_id: user.id, requires_verification: true })
    }

    /// Redeem a one-time code. Codes are single-use: a successful
    /// verification clears the stored code.
    #[instrument(skip(self, code))]
    pub async fn verify(&self, user_id: Uuid, code: &str) -> Result<User, AuthError> {
        let stored = self.repo.find_by_id(user_id).await?.ok_or(AuthError::NotFound)?;
        if code.is_empty() || stored.verification_code.as_deref() != Some(code) {
            return Err(AuthError::Validation("invalid verification code".into()));
        }
        self.repo.mark_verified(user_id).await?;
        info!(%user_id, "user verified");
        let mut user = stored.user;
        user.is_verified = true;
        Ok(user)
    }

    /// Regenerate and re-deliver the code. The previous code becomes invalid
    /// the moment the new one is stored.
    #[instrument(skip(self))]
    pub async fn resend_code(&self, user_id: Uuid) -> Result<String, AuthError> {
        let stored = self.repo.find_by_id(user_id).await?.ok_or(AuthError::NotFound)?;
        let code = Self::generate_code();
        self.repo.store_code(user_id, &code).await?;

        let address = stored.user.email.clone().unwrap_or_default();
        if attempt("send verification code", self.notifier.send_verification_code(&address, &code, &stored.user.name))
            .await
            .is_none()
        {
            info!(%address, %code, "verification code (delivery unavailable)");
        }
        Ok(format!("Verification code sent to {address}"))
    }

    /// Authenticate by email and password. Unknown email and wrong password
    /// produce the same error so callers cannot probe for accounts.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn login(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let stored = self.repo.find_by_email(email).await?.ok_or(AuthError::InvalidCredentials)?;
        if !verify_password(&stored.password_hash, password)? {
            return Err(AuthError::InvalidCredentials);
        }
        if !stored.user.is_verified {
            return Err(AuthError::Unverified { user_id: stored.user.id });
        }

        if let Some(address) = stored.user.email.as_deref() {
            let _ = attempt("send login alert", self.notifier.send_login_alert(address, &stored.user.name, Utc::now())).await;
        }
        info!(user_id = %stored.user.id, "login");
        Ok(stored.user)
    }

    pub async fn current_user(&self, user_id: Uuid) -> Result<User, AuthError> {
        Ok(self.repo.find_by_id(user_id).await?.ok_or(AuthError::NotFound)?.user)
    }
}

fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Ok(Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AuthError::Hash(e.to_string()))?
        .to_string())
}

fn verify_password(hash: &str, password: &str) -> Result<bool, AuthError> {
    let parsed = PasswordHash::new(hash).map_err(|e| AuthError::Hash(e.to_string()))?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(AuthError::Hash(e.to_string())),
    }
}
