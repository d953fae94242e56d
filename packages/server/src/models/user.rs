use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::seed::STAFF_ROLES;

use super::shared::{require_len, validate_email};

/// Request body for creating a staff account.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateUserRequest {
    pub name: String,
    #[schema(example = "editor@vitrin.example")]
    pub email: String,
    /// Plain password (6-128 characters); stored as an Argon2 hash.
    pub password: String,
    #[schema(example = "editor")]
    pub role: String,
}

pub fn validate_create_user(req: &CreateUserRequest) -> Result<(), AppError> {
    require_len("Name", &req.name, 2, 256)?;
    validate_email(&req.email)?;
    if req.password.len() < 6 || req.password.len() > 128 {
        return Err(AppError::Validation(
            "Password must be 6-128 characters".into(),
        ));
    }
    validate_role(&req.role)
}

/// Request body for changing a staff account's role.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct UpdateUserRoleRequest {
    pub role: String,
}

pub fn validate_role(role: &str) -> Result<(), AppError> {
    if !STAFF_ROLES.contains(&role) {
        return Err(AppError::Validation(format!(
            "Role must be one of: {}",
            STAFF_ROLES.join(", ")
        )));
    }
    Ok(())
}

/// Staff account as exposed to the admin UI. Never carries the password
/// hash.
#[derive(Serialize, utoipa::ToSchema)]
pub struct UserResponse {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

impl From<crate::entity::user::Model> for UserResponse {
    fn from(m: crate::entity::user::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            email: m.email,
            role: m.role,
            created_at: m.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_request() -> CreateUserRequest {
        CreateUserRequest {
            name: "New Editor".into(),
            email: "editor@vitrin.example".into(),
            password: "s3cure-pass".into(),
            role: "editor".into(),
        }
    }

    #[test]
    fn accepts_a_valid_account() {
        assert!(validate_create_user(&base_request()).is_ok());
    }

    #[test]
    fn rejects_unknown_role() {
        let mut req = base_request();
        req.role = "root".into();
        assert!(validate_create_user(&req).is_err());
    }

    #[test]
    fn rejects_short_password() {
        let mut req = base_request();
        req.password = "12345".into();
        assert!(validate_create_user(&req).is_err());
    }
}
