use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use derive_more::Display;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use serde_json::json;

#[derive(Debug, Display)]
#[display(fmt = "{}", message)]
pub struct ApiError {
    pub status_code: u16,
    pub message: String,
}

impl ApiError {
    pub fn new(status_code: u16, message: String) -> ApiError {
        ApiError {
            status_code,
            message,
        }
    }

    /// Duplicate key or foreign key rejection, as opposed to a generic
    /// store failure. Callers that race on unique rows check this.
    pub fn is_constraint_violation(&self) -> bool {
        self.status_code == 409
    }
}

impl From<DieselError> for ApiError {
    fn from(error: DieselError) -> ApiError {
        match error {
            DieselError::NotFound => ApiError::new(404, "Record not found".to_string()),
            DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, err) => {
                ApiError::new(409, err.message().to_string())
            }
            DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, err) => {
                ApiError::new(409, err.message().to_string())
            }
            err => ApiError::new(500, format!("Diesel error: {}", err)),
        }
    }
}

impl ResponseError for ApiError {
    fn error_response(&self) -> HttpResponse {
        let status_code = match StatusCode::from_u16(self.status_code) {
            Ok(status_code) => status_code,
            Err(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let message = match status_code.as_u16() < 500 {
            true => self.message.clone(),
            false => {
                error!("{}", self.message);
                "Internal server error".to_string()
            }
        };

        HttpResponse::build(status_code).json(json!({ "message": message }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_maps_to_404() {
        let error = ApiError::from(DieselError::NotFound);

        assert_eq!(error.status_code, 404);
        assert!(!error.is_constraint_violation());
    }

    #[test]
    fn unique_violation_maps_to_conflict() {
        let error = ApiError::from(DieselError::DatabaseError(
            DatabaseErrorKind::UniqueViolation,
            Box::new("duplicate key value violates unique constraint".to_string()),
        ));

        assert_eq!(error.status_code, 409);
        assert!(error.is_constraint_violation());
    }

    #[test]
    fn foreign_key_violation_maps_to_conflict() {
        let error = ApiError::from(DieselError::DatabaseError(
            DatabaseErrorKind::ForeignKeyViolation,
            Box::new("violates foreign key constraint".to_string()),
        ));

        assert_eq!(error.status_code, 409);
    }

    #[test]
    fn rollback_maps_to_internal_error() {
        let error = ApiError::from(DieselError::RollbackTransaction);

        assert_eq!(error.status_code, 500);
    }

    #[test]
    fn display_shows_message() {
        let error = ApiError::new(401, "Unauthorized".to_string());

        assert_eq!(format!("{}", error), "Unauthorized");
    }
}
