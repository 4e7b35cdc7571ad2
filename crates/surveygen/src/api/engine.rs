use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Json;
use serde::{Deserialize, Serialize};

use surveygen_engine::{QuestionDraft, QuestionKind, SignalSet, Tone};

use super::AppState;

#[derive(Debug, Serialize)]
pub struct TemplateSummary {
    pub key: String,
    pub questions: usize,
    pub default: bool,
}

#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub profile: String,
    pub questions: Vec<QuestionDraft>,
}

#[derive(Debug, Deserialize)]
pub struct RephraseRequest {
    pub text: String,
    pub tone: String,
    #[serde(default = "default_kind")]
    pub question_type: QuestionKind,
}

#[derive(Debug, Serialize)]
pub struct RephraseResponse {
    pub text: String,
    pub tone: Tone,
}

fn default_kind() -> QuestionKind {
    QuestionKind::TextEntry
}

pub async fn list_templates(State(state): State<AppState>) -> Json<Vec<TemplateSummary>> {
    let registry = state.service.templates();
    let default_key = registry.default_template().key();

    let summaries = registry
        .templates()
        .iter()
        .map(|t| TemplateSummary {
            key: t.key().to_string(),
            questions: t.len(),
            default: t.key() == default_key,
        })
        .collect();

    Json(summaries)
}

pub async fn generate(
    State(state): State<AppState>,
    Json(signals): Json<SignalSet>,
) -> Json<GenerateResponse> {
    Json(GenerateResponse {
        profile: signals.profile_sentence(),
        questions: state.service.preview(&signals),
    })
}

pub async fn rephrase(
    State(state): State<AppState>,
    Json(req): Json<RephraseRequest>,
) -> Result<Json<RephraseResponse>, (StatusCode, String)> {
    let tone: Tone = req
        .tone
        .parse()
        .map_err(|e: surveygen_engine::EngineError| (StatusCode::BAD_REQUEST, e.to_string()))?;

    Ok(Json(RephraseResponse {
        text: state.service.rephrase(&req.text, req.question_type, tone),
        tone,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_state;

    #[tokio::test]
    async fn test_list_templates_marks_default() {
        let Json(templates) = list_templates(State(test_state())).await;

        assert_eq!(templates.len(), 3);
        assert_eq!(templates[0].key, "Employee Engagement");
        assert!(templates[0].default);
        assert!(templates[1..].iter().all(|t| !t.default));
    }

    #[tokio::test]
    async fn test_generate_accepts_camel_case_signals() {
        let signals: SignalSet =
            serde_json::from_str(r#"{"useCase": "Market Research", "role": "Researcher"}"#)
                .unwrap();
        let Json(response) = generate(State(test_state()), Json(signals)).await;

        assert_eq!(response.questions.len(), 3);
        assert_eq!(
            response.questions[0].question_text,
            "Which features are most important to you when choosing a product in this category?"
        );
        assert!(response.profile.starts_with("Create a survey for Researcher"));
    }

    #[tokio::test]
    async fn test_rephrase_rejects_unknown_tone() {
        let req = RephraseRequest {
            text: "Anything else?".to_string(),
            tone: "formal".to_string(),
            question_type: QuestionKind::TextEntry,
        };
        let err = rephrase(State(test_state()), Json(req)).await.unwrap_err();
        assert_eq!(err.0, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_rephrase_uses_tone_table() {
        let req = RephraseRequest {
            text: "How would you rate your overall experience with our product/service?"
                .to_string(),
            tone: "Concise".to_string(),
            question_type: QuestionKind::MultipleChoice,
        };
        let Json(response) = rephrase(State(test_state()), Json(req)).await.unwrap();
        assert_eq!(response.tone, Tone::Concise);
        assert_eq!(response.text, "Rate your overall experience");
    }
}
