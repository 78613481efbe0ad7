use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use chrono::{DateTime, Utc};
use serde_json::json;
use thiserror::Error;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    /// A unique constraint rejected the write.
    #[error("Unique constraint violated: {0}")]
    Conflict(String),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Stored row is malformed: {0}")]
    Corrupt(String),
}

impl StoreError {
    /// Classify an sqlx error, lifting MySQL duplicate-key failures into `Conflict`.
    pub fn from_sqlx(e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &e {
            if db_err.code().as_deref() == Some("23000") {
                return StoreError::Conflict(db_err.message().to_string());
            }
        }
        StoreError::Database(e)
    }
}

#[derive(Debug, Error)]
pub enum AttendanceError {
    #[error("Invalid timestamp: `{0}`")]
    InvalidTimestamp(String),

    #[error("User {user_id} already checked in for the period starting {window_start}")]
    DuplicateCheckIn {
        user_id: u64,
        window_start: DateTime<Utc>,
    },

    #[error("{entity} {id} not found")]
    ReferenceNotFound { entity: &'static str, id: u64 },

    #[error("Attendance {0} not found")]
    NotFound(u64),

    #[error("Missing parameter `{0}`")]
    MissingParameter(&'static str),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ResponseError for AttendanceError {
    fn status_code(&self) -> StatusCode {
        match self {
            AttendanceError::InvalidTimestamp(_) | AttendanceError::MissingParameter(_) => {
                StatusCode::BAD_REQUEST
            }
            AttendanceError::DuplicateCheckIn { .. } => StatusCode::CONFLICT,
            AttendanceError::ReferenceNotFound { .. } | AttendanceError::NotFound(_) => {
                StatusCode::NOT_FOUND
            }
            AttendanceError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            AttendanceError::Store(e) => {
                tracing::error!(error = %e, "Storage failure");
                "Internal Server Error".to_string()
            }
            other => other.to_string(),
        };

        HttpResponse::build(self.status_code()).json(json!({ "message": message }))
    }
}

impl ResponseError for StoreError {
    fn error_response(&self) -> HttpResponse {
        tracing::error!(error = %self, "Storage failure");
        HttpResponse::InternalServerError().json(json!({ "message": "Internal Server Error" }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn taxonomy_maps_to_distinct_statuses() {
        let duplicate = AttendanceError::DuplicateCheckIn {
            user_id: 1,
            window_start: Utc::now(),
        };
        assert_eq!(duplicate.status_code(), StatusCode::CONFLICT);
        assert_eq!(
            AttendanceError::ReferenceNotFound { entity: "Shift", id: 9 }.status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(AttendanceError::NotFound(3).status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            AttendanceError::MissingParameter("user_id").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AttendanceError::InvalidTimestamp("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AttendanceError::Store(StoreError::Corrupt("role".into())).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn store_error_body_hides_details() {
        let resp = AttendanceError::Store(StoreError::Corrupt("secret".into())).error_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
