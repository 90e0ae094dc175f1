use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::models::usermodel::{User, UserRole};

#[derive(Validate, Debug, Clone, Serialize, Deserialize)]
pub struct RegisterUserDto {
    #[validate(length(min = 1, max = 100, message = "First name is required"))]
    pub first_name: String,

    #[validate(length(min = 1, max = 100, message = "Last name is required"))]
    pub last_name: String,

    #[validate(
        length(min = 1, message = "Email is required"),
        email(message = "Email is invalid")
    )]
    pub email: String,

    #[validate(
        length(min = 1, message = "Password is required"),
        length(min = 6, message = "Password must be at least 6 characters")
    )]
    pub password: String,

    #[validate(
        length(min = 1, message = "Confirm Password is required"),
        must_match(other = "password", message = "passwords do not match")
    )]
    #[serde(rename = "passwordConfirm")]
    pub password_confirm: String,

    #[validate(custom = "validate_registration_role")]
    pub role: UserRole,
}

fn validate_registration_role(role: &UserRole) -> Result<(), ValidationError> {
    match role {
        UserRole::Owner | UserRole::Tenant => Ok(()),
        UserRole::Admin => Err(ValidationError::new("invalid_role")),
    }
}

#[derive(Validate, Debug, Default, Clone, Serialize, Deserialize)]
pub struct LoginUserDto {
    #[validate(length(min = 1, message = "Email is required"), email(message = "Email is invalid"))]
    pub email: String,
    #[validate(
        length(min = 1, message = "Password is required"),
        length(min = 6, message = "Password must be at least 6 characters")
    )]
    pub password: String,
}

#[derive(Validate, Debug, Default, Clone, Serialize, Deserialize)]
pub struct UpdateProfileDto {
    #[validate(length(min = 1, max = 100, message = "First name must be between 1-100 characters"))]
    pub first_name: Option<String>,

    #[validate(length(min = 1, max = 100, message = "Last name must be between 1-100 characters"))]
    pub last_name: Option<String>,

    #[validate(email(message = "Email is invalid"))]
    pub email: Option<String>,
}

/// `?user_id=` used by admins to act on another user's listings.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct UserQueryDto {
    pub user_id: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FilterUserDto {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub name: String,
    pub email: String,
    pub role: String,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

impl FilterUserDto {
    pub fn filter_user(user: &User) -> Self {
        FilterUserDto {
            id: user.id,
            first_name: user.first_name.to_owned(),
            last_name: user.last_name.to_owned(),
            name: user.full_name(),
            email: user.email.to_owned(),
            role: user.role.to_str().to_string(),
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }

    pub fn filter_users(users: &[User]) -> Vec<FilterUserDto> {
        users.iter().map(FilterUserDto::filter_user).collect()
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserData {
    pub user: FilterUserDto,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserResponseDto {
    pub status: String,
    pub data: UserData,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserListResponseDto {
    pub status: String,
    pub users: Vec<FilterUserDto>,
    pub results: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserLoginResponseDto {
    pub status: String,
    pub token: String,
}

#[derive(Serialize, Deserialize)]
pub struct Response {
    pub status: &'static str,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register(role: UserRole) -> RegisterUserDto {
        RegisterUserDto {
            first_name: "Ana".into(),
            last_name: "Lopez".into(),
            email: "ana@example.com".into(),
            password: "secret123".into(),
            password_confirm: "secret123".into(),
            role,
        }
    }

    #[test]
    fn admins_cannot_self_register() {
        assert!(register(UserRole::Owner).validate().is_ok());
        assert!(register(UserRole::Tenant).validate().is_ok());
        assert!(register(UserRole::Admin).validate().is_err());
    }

    #[test]
    fn passwords_must_match() {
        let mut dto = register(UserRole::Tenant);
        dto.password_confirm = "different".into();
        let errors = dto.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("password_confirm"));
    }

    #[test]
    fn role_deserializes_from_original_labels() {
        let dto: RegisterUserDto = serde_json::from_value(serde_json::json!({
            "first_name": "Luis",
            "last_name": "Perez",
            "email": "luis@example.com",
            "password": "secret123",
            "passwordConfirm": "secret123",
            "role": "Owner"
        }))
        .unwrap();
        assert_eq!(dto.role, UserRole::Owner);
    }
}
