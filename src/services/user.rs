use std::sync::Arc;

use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::Utc;
use rand::rngs::OsRng;
use tracing::info;
use uuid::Uuid;

use crate::models::{SignupRequest, UpdateProfileRequest, User};
use crate::redis::RedisPool;
use crate::utils::{AppError, Result};

/// Account storage and credential checks.
///
/// Users live at `user:{id}` as JSON blobs, with `user_email:{email}`
/// pointing back at the id for login lookups.
pub struct UserService {
    redis: Arc<RedisPool>,
}

impl UserService {
    pub fn new(redis: Arc<RedisPool>) -> Self {
        Self { redis }
    }

    fn user_key(id: &str) -> String {
        format!("user:{}", id)
    }

    fn email_key(email: &str) -> String {
        format!("user_email:{}", email.to_lowercase())
    }

    pub async fn create_user(&self, req: &SignupRequest) -> Result<User> {
        let email = req.email.trim().to_lowercase();
        if self.redis.exists(&Self::email_key(&email)).await? {
            return Err(AppError::BadRequest(
                "An account with this email already exists".to_string(),
            ));
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4().to_string(),
            email: email.clone(),
            first_name: req.first_name.trim().to_string(),
            last_name: req.last_name.trim().to_string(),
            password_hash: hash_password(&req.password)?,
            country: req.country.trim().to_string(),
            current_country_of_resident: req.current_country_of_resident.trim().to_string(),
            how_they_heard: req.how_they_heard.trim().to_string(),
            organization: req.organization.as_ref().map(|o| o.trim().to_string()),
            what_they_do: req.what_they_do.trim().to_string(),
            profile_image_url: None,
            created_at: now,
            updated_at: now,
        };

        self.store(&user).await?;
        self.redis
            .set(&Self::email_key(&email), &user.id)
            .await?;
        info!("👤 User created: {}", user.id);
        Ok(user)
    }

    pub async fn get_user(&self, id: &str) -> Result<Option<User>> {
        let raw = self.redis.get::<String>(&Self::user_key(id)).await?;
        match raw {
            Some(json) => {
                let user: User = serde_json::from_str(&json).map_err(|e| {
                    AppError::RedisError(format!("Corrupt user record {}: {}", id, e))
                })?;
                Ok(Some(user))
            }
            None => Ok(None),
        }
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let id = self
            .redis
            .get::<String>(&Self::email_key(email.trim()))
            .await?;
        match id {
            Some(id) => self.get_user(&id).await,
            None => Ok(None),
        }
    }

    /// Verify credentials for login. The same error covers unknown email
    /// and wrong password so the endpoint cannot be used to probe accounts.
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<User> {
        let user = self
            .find_by_email(email)
            .await?
            .ok_or_else(|| AppError::Unauthorized("Invalid email or password".to_string()))?;
        verify_password(password, &user.password_hash)
            .map_err(|_| AppError::Unauthorized("Invalid email or password".to_string()))?;
        Ok(user)
    }

    pub async fn update_profile(&self, id: &str, req: &UpdateProfileRequest) -> Result<User> {
        let mut user = self
            .get_user(id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        let new_email = req.email.trim().to_lowercase();
        if new_email != user.email {
            if self.redis.exists(&Self::email_key(&new_email)).await? {
                return Err(AppError::BadRequest(
                    "An account with this email already exists".to_string(),
                ));
            }
            self.redis.del(&Self::email_key(&user.email)).await?;
            self.redis.set(&Self::email_key(&new_email), &user.id).await?;
            user.email = new_email;
        }

        user.first_name = req.first_name.trim().to_string();
        user.last_name = req.last_name.trim().to_string();
        user.country = req.country.trim().to_string();
        user.current_country_of_resident = req.current_country_of_resident.trim().to_string();
        user.how_they_heard = req.how_they_heard.trim().to_string();
        user.organization = req.organization.as_ref().map(|o| o.trim().to_string());
        user.what_they_do = req.what_they_do.trim().to_string();
        user.updated_at = Utc::now();

        self.store(&user).await?;
        Ok(user)
    }

    pub async fn change_password(
        &self,
        id: &str,
        current_password: &str,
        new_password: &str,
    ) -> Result<()> {
        let mut user = self
            .get_user(id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        verify_password(current_password, &user.password_hash)
            .map_err(|_| AppError::Unauthorized("Current password is incorrect".to_string()))?;

        user.password_hash = hash_password(new_password)?;
        user.updated_at = Utc::now();
        self.store(&user).await?;
        info!("🔑 Password changed for user {}", id);
        Ok(())
    }

    async fn store(&self, user: &User) -> Result<()> {
        let json = serde_json::to_string(user)
            .map_err(|e| AppError::InternalError(format!("Failed to serialize user: {}", e)))?;
        self.redis.set(&Self::user_key(&user.id), &json).await
    }
}

fn hash_password(password: &str) -> Result<String> {
    let argon2 = Argon2::default();
    let salt = SaltString::generate(&mut OsRng);
    Ok(argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::InternalError(format!("Failed to hash password: {}", e)))?
        .to_string())
}

fn verify_password(password: &str, hash: &str) -> Result<()> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| AppError::InternalError(format!("Failed to parse password hash: {}", e)))?;
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AppError::Unauthorized("Invalid credentials".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify_roundtrip() {
        let hash = hash_password("correct horse battery").expect("hash failed");
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("correct horse battery", &hash).is_ok());
        assert!(verify_password("wrong password", &hash).is_err());
    }

    #[test]
    fn test_distinct_salts() {
        let a = hash_password("same password").expect("hash failed");
        let b = hash_password("same password").expect("hash failed");
        assert_ne!(a, b);
    }
}
