use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::store::User;
use crate::validate::normalize_email;

/// Body for `POST /users` and `PUT /users/:id`. Updates replace the whole record.
#[derive(Debug, Deserialize)]
pub struct UserRequest {
    pub email: String,
    pub password: String,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

impl UserRequest {
    /// Normalizes the email and rejects an empty credential.
    pub fn validated(mut self) -> AppResult<Self> {
        self.email = normalize_email(&self.email)?;
        if self.password.is_empty() {
            return Err(AppError::Validation("password is required".into()));
        }
        Ok(self)
    }
}

/// Public projection of a user. The stored credential and timestamp stay private.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct UserResponse {
    pub id: i32,
    pub email: String,
    pub is_active: bool,
}

impl From<User> for UserResponse {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            email: u.email,
            is_active: u.is_active,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::OffsetDateTime;

    #[test]
    fn response_omits_credential() {
        let user = User {
            id: 4,
            email: "leia@alderaan.org".into(),
            password: "$argon2id$v=19$secret".into(),
            is_active: false,
            created_at: OffsetDateTime::UNIX_EPOCH,
        };
        let json = serde_json::to_value(UserResponse::from(user)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "id": 4, "email": "leia@alderaan.org", "is_active": false })
        );
    }

    #[test]
    fn is_active_defaults_to_true() {
        let req: UserRequest =
            serde_json::from_str(r#"{"email":"a@b.io","password":"pw"}"#).unwrap();
        assert!(req.is_active);
    }

    #[test]
    fn empty_password_is_rejected() {
        let req = UserRequest {
            email: "a@b.io".into(),
            password: String::new(),
            is_active: true,
        };
        assert!(matches!(req.validated(), Err(AppError::Validation(_))));
    }
}
