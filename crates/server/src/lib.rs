use api_types::{ErrorBody, ErrorResponse};
use axum::{Json, http::StatusCode, response::IntoResponse};
use engine::EngineError;

pub use recommendation::{GeminiConfig, Recommender};
pub use server::{ServerState, router, run_with_listener, spawn_with_listener};

mod admin;
mod credits;
mod health;
mod products;
mod recommendation;
mod server;
mod users;
mod validation;

#[derive(Debug)]
pub enum ServerError {
    Engine(EngineError),
    /// Malformed input rejected at the boundary.
    Generic(String),
    /// Recommendations need at least one category.
    NoCategories,
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::Validation(_) => StatusCode::BAD_REQUEST,
        EngineError::NotFound(_) => StatusCode::NOT_FOUND,
        EngineError::InvalidState(_) => StatusCode::UNPROCESSABLE_ENTITY,
        EngineError::Conflict(_) => StatusCode::CONFLICT,
        EngineError::Transient(_) => StatusCode::SERVICE_UNAVAILABLE,
        EngineError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn message_for_engine_error(err: EngineError) -> String {
    match err {
        EngineError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            "internal server error".to_string()
        }
        other => other.to_string(),
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, code, message) = match self {
            ServerError::Engine(err) => {
                let code = err.code();
                (status_for_engine_error(&err), code, message_for_engine_error(err))
            }
            ServerError::Generic(err) => (StatusCode::BAD_REQUEST, "VALIDATION_FAILED", err),
            ServerError::NoCategories => (
                StatusCode::NOT_FOUND,
                "NO_CATEGORIES",
                "no product categories available".to_string(),
            ),
        };

        let body = ErrorResponse {
            error: ErrorBody {
                code: code.to_string(),
                message,
            },
        };
        (status, Json(body)).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}

#[cfg(test)]
mod tests {
    use engine::{Conflict, InvalidState, Resource, Transient};

    use super::*;

    #[test]
    fn engine_validation_maps_to_400() {
        let res = ServerError::from(EngineError::Validation("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn engine_not_found_maps_to_404() {
        let res = ServerError::from(EngineError::NotFound(Resource::User)).into_response();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn engine_invalid_state_maps_to_422() {
        let res = ServerError::from(EngineError::InvalidState(InvalidState::PackageInactive))
            .into_response();
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn engine_conflict_maps_to_409() {
        let res = ServerError::from(EngineError::Conflict(Conflict::InsufficientPoints))
            .into_response();
        assert_eq!(res.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn engine_transient_maps_to_503() {
        let res = ServerError::from(EngineError::Transient(Transient::DeadlineExceeded))
            .into_response();
        assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn database_errors_hide_details() {
        let err = EngineError::Database(sea_orm::DbErr::Custom("secret".to_string()));
        assert_eq!(message_for_engine_error(err), "internal server error");
    }

    #[test]
    fn generic_maps_to_400() {
        let res = ServerError::Generic("bad".to_string()).into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }
}
