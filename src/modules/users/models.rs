use serde::{Deserialize, Serialize};
use shelf_db::{NewUser, User, UserPatch};
use shelf_http::AppError;
use time::OffsetDateTime;

use crate::utils::FieldValidator;

const MIN_PASSWORD_LEN: usize = 8;

/// Signup payload. Missing fields deserialize as empty so they surface as 422, not 400.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl CreateUserRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        FieldValidator::new()
            .required("name", &self.name)
            .required("email", &self.email)
            .email("email", &self.email)
            .required("password", &self.password)
            .min_len("password", &self.password, MIN_PASSWORD_LEN)
            .finish("invalid user payload")
    }

    pub fn into_new_user(self) -> NewUser {
        NewUser {
            name: self.name,
            email: self.email,
            secret: self.password,
        }
    }
}

/// Partial update; absent or empty fields keep their stored value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

impl UpdateUserRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        FieldValidator::new()
            .email("email", self.email.as_deref().unwrap_or_default())
            .min_len(
                "password",
                self.password.as_deref().unwrap_or_default(),
                MIN_PASSWORD_LEN,
            )
            .finish("invalid user payload")
    }
}

impl From<UpdateUserRequest> for UserPatch {
    fn from(request: UpdateUserRequest) -> Self {
        UserPatch {
            name: request.name,
            email: request.email,
            secret: request.password,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl LoginRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        FieldValidator::new()
            .required("email", &self.email)
            .email("email", &self.email)
            .required("password", &self.password)
            .finish("invalid login payload")
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    pub token: String,
}

/// Public view of a user. The secret never leaves the service.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct UserResponse {
    pub id: u64,
    pub name: String,
    pub email: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        UserResponse {
            id: user.id,
            name: user.name,
            email: user.email,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signup_requires_every_field() {
        let request: CreateUserRequest = serde_json::from_str("{}").unwrap();
        match request.validate().unwrap_err() {
            AppError::Validation { details, .. } => assert_eq!(details.len(), 3),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn short_password_is_rejected_on_update_only_when_present() {
        assert!(UpdateUserRequest::default().validate().is_ok());
        let request = UpdateUserRequest {
            password: Some("short".to_string()),
            ..UpdateUserRequest::default()
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn response_omits_secret() {
        let now = OffsetDateTime::now_utc();
        let response = UserResponse::from(User {
            id: 1,
            name: "alice".to_string(),
            email: "a@x.com".to_string(),
            secret: "hunter22".to_string(),
            created_at: now,
            updated_at: now,
        });
        let json = serde_json::to_value(&response).unwrap();
        assert!(json.get("secret").is_none());
        assert!(json.get("password").is_none());
        assert_eq!(json["email"], "a@x.com");
    }
}
