use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde::Deserialize;

use surveygen_core::{Deployment, SurveyDetail};
use surveygen_db::{QuestionRecord, SurveyFilter, SurveyRecord, SurveyStatus};
use surveygen_engine::{QuestionKind, SignalSet};

use super::{service_error, AppState};

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub status: Option<String>,
    pub search: Option<String>,
    pub user_id: Option<String>,
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct CreateSurveyRequest {
    pub user_id: Option<String>,
    #[serde(default)]
    pub signals: SignalSet,
}

#[derive(Debug, Deserialize)]
pub struct AddQuestionRequest {
    pub question_text: String,
    pub question_type: QuestionKind,
    #[serde(default)]
    pub options: Vec<String>,
}

pub async fn list_surveys(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<SurveyRecord>>, (StatusCode, String)> {
    let filter = build_filter(params).map_err(|e| (StatusCode::BAD_REQUEST, e))?;

    let surveys = state.service.list_surveys(&filter).map_err(service_error)?;

    Ok(Json(surveys))
}

pub async fn create_survey(
    State(state): State<AppState>,
    Json(req): Json<CreateSurveyRequest>,
) -> Result<(StatusCode, Json<SurveyDetail>), (StatusCode, String)> {
    let detail = state
        .service
        .create_survey(req.user_id, &req.signals)
        .map_err(service_error)?;

    Ok((StatusCode::CREATED, Json(detail)))
}

pub async fn get_survey(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SurveyDetail>, (StatusCode, String)> {
    let detail = state.service.get_survey(&id).map_err(service_error)?;

    Ok(Json(detail))
}

pub async fn delete_survey(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, (StatusCode, String)> {
    state.service.delete_survey(&id).map_err(service_error)?;

    Ok(StatusCode::NO_CONTENT)
}

/// The body replaces the whole signal set; omitted fields fall back to
/// defaults rather than keeping their previous values.
pub async fn regenerate_survey(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(signals): Json<SignalSet>,
) -> Result<Json<SurveyDetail>, (StatusCode, String)> {
    let detail = state
        .service
        .regenerate_survey(&id, &signals)
        .map_err(service_error)?;

    Ok(Json(detail))
}

pub async fn add_question(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<AddQuestionRequest>,
) -> Result<(StatusCode, Json<QuestionRecord>), (StatusCode, String)> {
    let question = state
        .service
        .add_question(&id, &req.question_text, req.question_type, req.options)
        .map_err(service_error)?;

    Ok((StatusCode::CREATED, Json(question)))
}

pub async fn deploy_survey(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Deployment>, (StatusCode, String)> {
    let deployment = state.service.deploy(&id).map_err(service_error)?;

    Ok(Json(deployment))
}

pub async fn archive_survey(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SurveyRecord>, (StatusCode, String)> {
    let survey = state.service.archive(&id).map_err(service_error)?;

    Ok(Json(survey))
}

fn build_filter(params: ListParams) -> Result<SurveyFilter, String> {
    let status = params
        .status
        .map(|s| s.parse::<SurveyStatus>())
        .transpose()?;

    Ok(SurveyFilter {
        status,
        user_id: params.user_id,
        search: params.search,
        limit: params.limit,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_state;

    fn engagement_request() -> CreateSurveyRequest {
        CreateSurveyRequest {
            user_id: Some("user-1".to_string()),
            signals: SignalSet::new()
                .with_industry("Technology")
                .with_use_case("Employee Engagement"),
        }
    }

    #[tokio::test]
    async fn test_create_then_get() {
        let state = test_state();
        let (status, Json(created)) =
            create_survey(State(state.clone()), Json(engagement_request()))
                .await
                .unwrap();
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created.questions.len(), 5);

        let Json(fetched) = get_survey(State(state), Path(created.survey.id.clone()))
            .await
            .unwrap();
        assert_eq!(fetched.survey.id, created.survey.id);
        assert_eq!(fetched.questions, created.questions);
    }

    #[tokio::test]
    async fn test_get_missing_survey_is_404() {
        let err = get_survey(State(test_state()), Path("missing".to_string()))
            .await
            .unwrap_err();
        assert_eq!(err.0, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_list_rejects_unknown_status() {
        let params = ListParams {
            status: Some("published".to_string()),
            search: None,
            user_id: None,
            limit: None,
        };
        let err = list_surveys(State(test_state()), Query(params))
            .await
            .unwrap_err();
        assert_eq!(err.0, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_regenerate_replaces_signals() {
        let state = test_state();
        let (_, Json(created)) = create_survey(State(state.clone()), Json(engagement_request()))
            .await
            .unwrap();

        let signals = SignalSet::new().with_use_case("Customer Satisfaction");
        let Json(regenerated) = regenerate_survey(
            State(state),
            Path(created.survey.id.clone()),
            Json(signals),
        )
        .await
        .unwrap();

        assert_eq!(regenerated.questions.len(), 3);
        assert_eq!(
            regenerated.survey.personalization_signals["industry"],
            "Business"
        );
    }

    #[tokio::test]
    async fn test_add_question_without_options_is_400() {
        let state = test_state();
        let (_, Json(created)) = create_survey(State(state.clone()), Json(engagement_request()))
            .await
            .unwrap();

        let req = AddQuestionRequest {
            question_text: "Pick one".to_string(),
            question_type: QuestionKind::MultipleChoice,
            options: vec![],
        };
        let err = add_question(State(state), Path(created.survey.id), Json(req))
            .await
            .unwrap_err();
        assert_eq!(err.0, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_deploy_then_edit_conflicts() {
        let state = test_state();
        let (_, Json(created)) = create_survey(State(state.clone()), Json(engagement_request()))
            .await
            .unwrap();
        let id = created.survey.id.clone();

        let Json(deployment) = deploy_survey(State(state.clone()), Path(id.clone()))
            .await
            .unwrap();
        assert!(deployment.share_url.ends_with(&format!("/r/{}", id)));

        let err = regenerate_survey(State(state.clone()), Path(id.clone()), Json(SignalSet::new()))
            .await
            .unwrap_err();
        assert_eq!(err.0, StatusCode::CONFLICT);

        let Json(archived) = archive_survey(State(state.clone()), Path(id.clone()))
            .await
            .unwrap();
        assert_eq!(archived.status, SurveyStatus::Archived);

        let err = deploy_survey(State(state), Path(id)).await.unwrap_err();
        assert_eq!(err.0, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_delete_then_404() {
        let state = test_state();
        let (_, Json(created)) = create_survey(State(state.clone()), Json(engagement_request()))
            .await
            .unwrap();
        let id = created.survey.id.clone();

        let status = delete_survey(State(state.clone()), Path(id.clone()))
            .await
            .unwrap();
        assert_eq!(status, StatusCode::NO_CONTENT);

        let err = delete_survey(State(state), Path(id)).await.unwrap_err();
        assert_eq!(err.0, StatusCode::NOT_FOUND);
    }
}
