use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Map, Value};
use thiserror::Error;
use tracing::error;

use crate::store::StoreError;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    /// Malformed or missing input.
    #[error("{0}")]
    Validation(String),

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i32 },

    #[error("{message}")]
    Duplicate {
        message: String,
        constraint: String,
    },

    #[error("{message}")]
    ForeignKey {
        message: String,
        constraint: String,
    },

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Duplicate { .. } => StatusCode::CONFLICT,
            AppError::ForeignKey { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn body(&self) -> Value {
        let mut body = Map::new();
        match self {
            AppError::Internal(_) => {
                body.insert("message".into(), json!("Internal server error"));
            }
            AppError::NotFound { entity, id } => {
                body.insert("message".into(), json!(self.to_string()));
                body.insert("entity".into(), json!(entity));
                body.insert("id".into(), json!(id));
            }
            AppError::Duplicate { constraint, .. } | AppError::ForeignKey { constraint, .. } => {
                body.insert("message".into(), json!(self.to_string()));
                body.insert("constraint".into(), json!(constraint));
            }
            AppError::Validation(_) => {
                body.insert("message".into(), json!(self.to_string()));
            }
        }
        Value::Object(body)
    }
}

fn duplicate_message(constraint: &str) -> &'static str {
    match constraint {
        "user_email_key" => "Email already registered",
        "people_uid_key" => "A person with this uid already exists",
        "planet_uid_key" => "A planet with this uid already exists",
        "uq_user_people_fav" => "This person is already a favorite of the user",
        "uq_user_planet_fav" => "This planet is already a favorite of the user",
        _ => "Duplicate value",
    }
}

fn foreign_key_message(constraint: &str) -> &'static str {
    match constraint {
        "favorite_user_id_fkey" => "Referenced user does not exist",
        "favorite_people_id_fkey" => "Referenced person does not exist",
        "favorite_planet_id_fkey" => "Referenced planet does not exist",
        _ => "Referenced row does not exist",
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { entity, id } => AppError::NotFound { entity, id },
            StoreError::Duplicate { constraint } => AppError::Duplicate {
                message: duplicate_message(&constraint).into(),
                constraint,
            },
            StoreError::ForeignKey { constraint } => AppError::ForeignKey {
                message: foreign_key_message(&constraint).into(),
                constraint,
            },
            StoreError::Check { constraint } => {
                AppError::Validation(format!("Row violates constraint {constraint}"))
            }
            StoreError::Database(e) => AppError::Internal(anyhow::Error::new(e)),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if let AppError::Internal(e) = &self {
            error!(error = %e, "request failed");
        }
        (status, Json(self.body())).into_response()
    }
}
