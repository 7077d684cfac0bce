use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::utils::{AppError, Result};

/// Stored user account (the password hash never leaves the service layer)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password_hash: String,
    pub country: String,
    pub current_country_of_resident: String,
    pub how_they_heard: String,
    pub organization: Option<String>,
    pub what_they_do: String,
    pub profile_image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Wire shape for user data returned to clients
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub country: String,
    pub current_country_of_resident: String,
    pub how_they_heard: String,
    pub organization: Option<String>,
    pub what_they_do: String,
    pub profile_image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            country: user.country,
            current_country_of_resident: user.current_country_of_resident,
            how_they_heard: user.how_they_heard,
            organization: user.organization,
            what_they_do: user.what_they_do,
            profile_image_url: user.profile_image_url,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub country: String,
    pub current_country_of_resident: String,
    pub how_they_heard: String,
    pub organization: Option<String>,
    pub what_they_do: String,
}

impl SignupRequest {
    pub fn validate(&self) -> Result<()> {
        require_trimmed(&self.first_name, 50, "First name")?;
        require_trimmed(&self.last_name, 50, "Last name")?;
        validate_email(&self.email)?;
        if self.password.len() < 8 {
            return Err(AppError::ValidationError(
                "Password must be at least 8 characters".to_string(),
            ));
        }
        if self.password.len() > 100 {
            return Err(AppError::ValidationError(
                "Password must be less than 100 characters".to_string(),
            ));
        }
        require_trimmed(&self.country, 100, "Country")?;
        require_trimmed(&self.current_country_of_resident, 100, "Current country of resident")?;
        require_trimmed(&self.how_they_heard, 200, "How you heard about us")?;
        if let Some(org) = &self.organization {
            if org.trim().len() > 100 {
                return Err(AppError::ValidationError(
                    "Organization name must be less than 100 characters".to_string(),
                ));
            }
        }
        require_trimmed(&self.what_they_do, 200, "What you do")?;
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl LoginRequest {
    pub fn validate(&self) -> Result<()> {
        validate_email(&self.email)?;
        if self.password.is_empty() {
            return Err(AppError::ValidationError(
                "Password is required".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub country: String,
    pub current_country_of_resident: String,
    pub how_they_heard: String,
    pub organization: Option<String>,
    pub what_they_do: String,
}

impl UpdateProfileRequest {
    pub fn validate(&self) -> Result<()> {
        require_trimmed(&self.first_name, 50, "First name")?;
        require_trimmed(&self.last_name, 50, "Last name")?;
        validate_email(&self.email)?;
        require_trimmed(&self.country, 100, "Country")?;
        require_trimmed(&self.current_country_of_resident, 100, "Current country of resident")?;
        require_trimmed(&self.how_they_heard, 200, "How you heard about us")?;
        require_trimmed(&self.what_they_do, 200, "What you do")?;
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
    pub confirm_password: String,
}

impl ChangePasswordRequest {
    pub fn validate(&self) -> Result<()> {
        if self.current_password.is_empty() {
            return Err(AppError::ValidationError(
                "Current password is required".to_string(),
            ));
        }
        if self.new_password.len() < 8 {
            return Err(AppError::ValidationError(
                "New password must be at least 8 characters".to_string(),
            ));
        }
        if self.new_password.len() > 100 {
            return Err(AppError::ValidationError(
                "Password must be less than 100 characters".to_string(),
            ));
        }
        if self.new_password != self.confirm_password {
            return Err(AppError::ValidationError(
                "Passwords don't match".to_string(),
            ));
        }
        Ok(())
    }
}

fn require_trimmed(value: &str, max_len: usize, field: &str) -> Result<()> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::ValidationError(format!("{} is required", field)));
    }
    if trimmed.len() > max_len {
        return Err(AppError::ValidationError(format!(
            "{} must be less than {} characters",
            field, max_len
        )));
    }
    Ok(())
}

fn validate_email(email: &str) -> Result<()> {
    let valid = email
        .split_once('@')
        .map(|(local, domain)| !local.is_empty() && domain.contains('.') && !domain.starts_with('.'))
        .unwrap_or(false);
    if !valid {
        return Err(AppError::ValidationError(
            "Please enter a valid email address".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signup() -> SignupRequest {
        SignupRequest {
            first_name: "Ada".to_string(),
            last_name: "Mukamana".to_string(),
            email: "ada@example.com".to_string(),
            password: "hunter2hunter2".to_string(),
            country: "Rwanda".to_string(),
            current_country_of_resident: "Rwanda".to_string(),
            how_they_heard: "A friend".to_string(),
            organization: None,
            what_they_do: "Interpreter".to_string(),
        }
    }

    #[test]
    fn test_signup_valid() {
        assert!(signup().validate().is_ok());
    }

    #[test]
    fn test_signup_rejects_short_password() {
        let mut req = signup();
        req.password = "short".to_string();
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_signup_rejects_bad_email() {
        let mut req = signup();
        req.email = "not-an-email".to_string();
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_signup_rejects_blank_first_name() {
        let mut req = signup();
        req.first_name = "   ".to_string();
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_change_password_mismatch() {
        let req = ChangePasswordRequest {
            current_password: "oldpassword".to_string(),
            new_password: "newpassword1".to_string(),
            confirm_password: "newpassword2".to_string(),
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_user_response_has_no_password_hash() {
        let user = User {
            id: "u1".to_string(),
            email: "ada@example.com".to_string(),
            first_name: "Ada".to_string(),
            last_name: "Mukamana".to_string(),
            password_hash: "$argon2id$secret".to_string(),
            country: "Rwanda".to_string(),
            current_country_of_resident: "Rwanda".to_string(),
            how_they_heard: "A friend".to_string(),
            organization: None,
            what_they_do: "Interpreter".to_string(),
            profile_image_url: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let json = serde_json::to_string(&UserResponse::from(user)).expect("serialize failed");
        assert!(!json.contains("argon2"));
        assert!(!json.contains("passwordHash"));
        assert!(json.contains("firstName"));
    }
}
