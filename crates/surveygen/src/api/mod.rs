mod engine;
mod questions;
mod surveys;

use std::sync::Arc;

use axum::http::StatusCode;
use axum::routing::{get, patch, post, put};
use axum::Router;
use tower_http::cors::CorsLayer;

use surveygen_core::{ServiceError, SurveyService};

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<SurveyService>,
}

pub fn create_router(service: Arc<SurveyService>) -> Router {
    let state = AppState { service };

    Router::new()
        .route("/api/templates", get(engine::list_templates))
        .route("/api/generate", post(engine::generate))
        .route("/api/rephrase", post(engine::rephrase))
        .route(
            "/api/surveys",
            get(surveys::list_surveys).post(surveys::create_survey),
        )
        .route(
            "/api/surveys/{id}",
            get(surveys::get_survey).delete(surveys::delete_survey),
        )
        .route("/api/surveys/{id}/signals", put(surveys::regenerate_survey))
        .route("/api/surveys/{id}/questions", post(surveys::add_question))
        .route("/api/surveys/{id}/deploy", post(surveys::deploy_survey))
        .route("/api/surveys/{id}/archive", post(surveys::archive_survey))
        .route("/api/questions/{id}", patch(questions::edit_question))
        .route(
            "/api/questions/{id}/regenerate",
            post(questions::regenerate_question),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Map a service failure to the response status it deserves.
pub(crate) fn service_error(e: ServiceError) -> (StatusCode, String) {
    let status = match &e {
        ServiceError::SurveyNotFound(_) | ServiceError::QuestionNotFound(_) => {
            StatusCode::NOT_FOUND
        }
        ServiceError::EmptyQuestionText | ServiceError::MissingOptions(_) => {
            StatusCode::BAD_REQUEST
        }
        ServiceError::NotEditable { .. } | ServiceError::InvalidTransition { .. } => {
            StatusCode::CONFLICT
        }
        ServiceError::Database(_) => {
            tracing::error!(error = %e, "Database failure while handling request");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    (status, e.to_string())
}

#[cfg(test)]
pub(crate) fn test_state() -> AppState {
    use surveygen_core::ServiceConfig;
    use surveygen_db::Database;

    let db = Database::open_in_memory().expect("in-memory database");
    AppState {
        service: Arc::new(SurveyService::new(Arc::new(db), ServiceConfig::default())),
    }
}
