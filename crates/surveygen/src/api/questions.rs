use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde::Deserialize;

use surveygen_db::QuestionRecord;
use surveygen_engine::Tone;

use super::{service_error, AppState};

#[derive(Debug, Deserialize)]
pub struct EditQuestionRequest {
    pub question_text: String,
}

#[derive(Debug, Deserialize)]
pub struct RegenerateQuestionRequest {
    pub tone: String,
}

pub async fn edit_question(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<EditQuestionRequest>,
) -> Result<Json<QuestionRecord>, (StatusCode, String)> {
    let question = state
        .service
        .edit_question(&id, &req.question_text)
        .map_err(service_error)?;

    Ok(Json(question))
}

/// Unknown tones are rejected before the question is read.
pub async fn regenerate_question(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<RegenerateQuestionRequest>,
) -> Result<Json<QuestionRecord>, (StatusCode, String)> {
    let tone: Tone = req
        .tone
        .parse()
        .map_err(|e: surveygen_engine::EngineError| (StatusCode::BAD_REQUEST, e.to_string()))?;

    let question = state
        .service
        .regenerate_question(&id, tone)
        .map_err(service_error)?;

    Ok(Json(question))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_state;
    use surveygen_engine::SignalSet;

    fn first_question(state: &AppState) -> QuestionRecord {
        let detail = state
            .service
            .create_survey(None, &SignalSet::new().with_use_case("Customer Satisfaction"))
            .unwrap();
        detail.questions[0].clone()
    }

    #[tokio::test]
    async fn test_edit_question_stores_text() {
        let state = test_state();
        let question = first_question(&state);

        let req = EditQuestionRequest {
            question_text: "How was it?".to_string(),
        };
        let Json(edited) = edit_question(State(state), Path(question.id.clone()), Json(req))
            .await
            .unwrap();
        assert_eq!(edited.question_text, "How was it?");
        assert_eq!(edited.options, question.options);
    }

    #[tokio::test]
    async fn test_edit_blank_text_is_400() {
        let state = test_state();
        let question = first_question(&state);

        let req = EditQuestionRequest {
            question_text: " ".to_string(),
        };
        let err = edit_question(State(state), Path(question.id), Json(req))
            .await
            .unwrap_err();
        assert_eq!(err.0, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_regenerate_question_in_casual_tone() {
        let state = test_state();
        let question = first_question(&state);

        let req = RegenerateQuestionRequest {
            tone: "casual".to_string(),
        };
        let Json(updated) = regenerate_question(State(state), Path(question.id), Json(req))
            .await
            .unwrap();
        assert_eq!(updated.question_text, "How was your experience with us?");
    }

    #[tokio::test]
    async fn test_regenerate_unknown_tone_is_400() {
        let state = test_state();
        let question = first_question(&state);

        let req = RegenerateQuestionRequest {
            tone: "formal".to_string(),
        };
        let err = regenerate_question(State(state.clone()), Path(question.id.clone()), Json(req))
            .await
            .unwrap_err();
        assert_eq!(err.0, StatusCode::BAD_REQUEST);

        let unchanged = state.service.get_survey(&question.survey_id).unwrap();
        assert_eq!(unchanged.questions[0], question);
    }

    #[tokio::test]
    async fn test_regenerate_missing_question_is_404() {
        let req = RegenerateQuestionRequest {
            tone: "concise".to_string(),
        };
        let err = regenerate_question(State(test_state()), Path("missing".to_string()), Json(req))
            .await
            .unwrap_err();
        assert_eq!(err.0, StatusCode::NOT_FOUND);
    }
}
