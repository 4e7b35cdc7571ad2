use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use surveygen_db::{
    Database, GuardedWrite, NewSurvey, QuestionRecord, SurveyFilter, SurveyRecord, SurveyStatus,
};
use surveygen_engine::{
    QuestionDraft, QuestionKind, SignalSet, TemplateRegistry, Tone, ToneRewriter,
};

use crate::ServiceError;

/// Default host for share links.
pub const DEFAULT_SHARE_BASE_URL: &str = "https://surveymonkey.com";

/// Settings for [`SurveyService`].
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Share links are `{share_base_url}/r/{survey_id}`
    pub share_base_url: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            share_base_url: DEFAULT_SHARE_BASE_URL.to_string(),
        }
    }
}

/// A survey together with its questions in display order.
#[derive(Debug, Clone, Serialize)]
pub struct SurveyDetail {
    #[serde(flatten)]
    pub survey: SurveyRecord,
    pub questions: Vec<QuestionRecord>,
}

/// Result of deploying a survey.
#[derive(Debug, Clone, Serialize)]
pub struct Deployment {
    pub survey_id: String,
    pub share_url: String,
    pub deployed_at: DateTime<Utc>,
}

/// Runs the survey workflow: generate, edit, regenerate, deploy.
///
/// Every write goes straight to the store; nothing is cached here.
pub struct SurveyService {
    db: Arc<Database>,
    config: ServiceConfig,
    templates: TemplateRegistry,
    rewriter: ToneRewriter,
}

impl SurveyService {
    pub fn new(db: Arc<Database>, config: ServiceConfig) -> Self {
        Self {
            db,
            config,
            templates: TemplateRegistry::builtin(),
            rewriter: ToneRewriter::builtin(),
        }
    }

    /// Replace the built-in templates.
    pub fn with_templates(mut self, templates: TemplateRegistry) -> Self {
        self.templates = templates;
        self
    }

    /// Replace the built-in tone rewrites.
    pub fn with_rewriter(mut self, rewriter: ToneRewriter) -> Self {
        self.rewriter = rewriter;
        self
    }

    pub fn templates(&self) -> &TemplateRegistry {
        &self.templates
    }

    /// Generate drafts without touching the store.
    pub fn preview(&self, signals: &SignalSet) -> Vec<QuestionDraft> {
        self.templates.generate(signals)
    }

    /// Rephrase text without touching the store.
    pub fn rephrase(&self, text: &str, kind: QuestionKind, tone: Tone) -> String {
        self.rewriter.rewrite(text, kind, tone)
    }

    /// Create a draft survey and its generated questions.
    pub fn create_survey(
        &self,
        user_id: Option<String>,
        signals: &SignalSet,
    ) -> Result<SurveyDetail, ServiceError> {
        let resolved = signals.resolve();
        let new_survey = NewSurvey {
            user_id: user_id.unwrap_or_else(|| Uuid::new_v4().to_string()),
            title: format!("{} Survey", resolved.use_case),
            signals: resolved.to_map(),
        };

        let drafts = self.templates.generate(signals);
        let (survey, questions) = self.db.create_survey_with_questions(&new_survey, &drafts)?;

        info!(
            survey_id = %survey.id,
            use_case = resolved.use_case,
            questions = questions.len(),
            "Created survey"
        );

        Ok(SurveyDetail { survey, questions })
    }

    pub fn get_survey(&self, id: &str) -> Result<SurveyDetail, ServiceError> {
        let survey = self.find_survey(id)?;
        let questions = self.db.questions()?.list_for_survey(id)?;
        Ok(SurveyDetail { survey, questions })
    }

    pub fn list_surveys(&self, filter: &SurveyFilter) -> Result<Vec<SurveyRecord>, ServiceError> {
        Ok(self.db.surveys()?.list(filter)?)
    }

    /// Replace the signal set and regenerate every question.
    ///
    /// The old questions are discarded, not merged.
    pub fn regenerate_survey(
        &self,
        id: &str,
        signals: &SignalSet,
    ) -> Result<SurveyDetail, ServiceError> {
        let resolved = signals.resolve();
        let drafts = self.templates.generate(signals);

        let write = self
            .db
            .replace_survey_content(id, &resolved.to_map(), &drafts)?;
        let questions = applied(write, id)?;

        info!(
            survey_id = %id,
            use_case = resolved.use_case,
            questions = questions.len(),
            "Regenerated survey"
        );

        self.get_survey(id)
    }

    /// Store new question text verbatim.
    pub fn edit_question(
        &self,
        question_id: &str,
        text: &str,
    ) -> Result<QuestionRecord, ServiceError> {
        if text.trim().is_empty() {
            return Err(ServiceError::EmptyQuestionText);
        }

        let write = self
            .db
            .update_question_text_if_draft(question_id, |_| text.to_string())?;
        let updated = applied(write, question_id)?;
        info!(question_id, survey_id = %updated.survey_id, "Edited question");
        Ok(updated)
    }

    /// Rephrase one question in `tone`. Sibling questions and the signal set
    /// are left alone.
    pub fn regenerate_question(
        &self,
        question_id: &str,
        tone: Tone,
    ) -> Result<QuestionRecord, ServiceError> {
        let write = self.db.update_question_text_if_draft(question_id, |question| {
            let text = self
                .rewriter
                .rewrite(&question.question_text, question.question_type, tone);
            debug!(
                question_id,
                tone = %tone,
                before = %question.question_text,
                after = %text,
                "Rephrased question"
            );
            text
        })?;
        let updated = applied(write, question_id)?;
        info!(question_id, tone = %tone, "Regenerated question");
        Ok(updated)
    }

    /// Append a hand-authored question.
    pub fn add_question(
        &self,
        survey_id: &str,
        text: &str,
        kind: QuestionKind,
        options: Vec<String>,
    ) -> Result<QuestionRecord, ServiceError> {
        if text.trim().is_empty() {
            return Err(ServiceError::EmptyQuestionText);
        }

        let options: Vec<String> = options
            .into_iter()
            .map(|o| o.trim().to_string())
            .filter(|o| !o.is_empty())
            .collect();
        if kind.has_options() && options.is_empty() {
            return Err(ServiceError::MissingOptions(kind));
        }

        // The store assigns the position
        let draft = QuestionDraft::manual(text, kind, options, 0);
        let write = self.db.append_question(survey_id, &draft)?;
        let question = applied(write, survey_id)?;

        info!(
            survey_id,
            question_id = %question.id,
            order_index = question.order_index,
            "Added question"
        );
        Ok(question)
    }

    /// Publish a survey. Deploying twice returns the first deployment.
    pub fn deploy(&self, id: &str) -> Result<Deployment, ServiceError> {
        let now = Utc::now();
        let survey = match self.db.deploy_survey(id, now)? {
            GuardedWrite::Applied(survey) => survey,
            GuardedWrite::Rejected { status: from, .. } => {
                warn!(survey_id = %id, status = %from, "Refusing to deploy survey");
                return Err(ServiceError::InvalidTransition {
                    from,
                    to: SurveyStatus::Deployed,
                });
            }
            GuardedWrite::SurveyMissing | GuardedWrite::QuestionMissing => {
                return Err(ServiceError::SurveyNotFound(id.to_string()))
            }
        };

        let deployed_at = survey.deployed_at.unwrap_or(now);
        if deployed_at != now {
            debug!(survey_id = %id, "Survey already deployed");
        }

        let share_url = self.share_url(id);
        info!(survey_id = %id, %share_url, "Deployed survey");

        Ok(Deployment {
            survey_id: id.to_string(),
            share_url,
            deployed_at,
        })
    }

    /// Retire a survey. Archiving twice is a no-op.
    pub fn archive(&self, id: &str) -> Result<SurveyRecord, ServiceError> {
        let survey = self.find_survey(id)?;

        if survey.status != SurveyStatus::Archived {
            self.db
                .surveys()?
                .set_status(id, SurveyStatus::Archived, None)?;
            info!(survey_id = %id, from = %survey.status, "Archived survey");
        }

        self.find_survey(id)
    }

    pub fn delete_survey(&self, id: &str) -> Result<(), ServiceError> {
        if !self.db.surveys()?.delete(id)? {
            return Err(ServiceError::SurveyNotFound(id.to_string()));
        }
        info!(survey_id = %id, "Deleted survey");
        Ok(())
    }

    /// Public link for a survey.
    pub fn share_url(&self, id: &str) -> String {
        format!("{}/r/{}", self.config.share_base_url.trim_end_matches('/'), id)
    }

    fn find_survey(&self, id: &str) -> Result<SurveyRecord, ServiceError> {
        self.db
            .surveys()?
            .get(id)?
            .ok_or_else(|| ServiceError::SurveyNotFound(id.to_string()))
    }
}

/// Unwrap a guarded write. `id` names whatever went missing.
fn applied<T>(write: GuardedWrite<T>, id: &str) -> Result<T, ServiceError> {
    match write {
        GuardedWrite::Applied(value) => Ok(value),
        GuardedWrite::SurveyMissing => Err(ServiceError::SurveyNotFound(id.to_string())),
        GuardedWrite::QuestionMissing => Err(ServiceError::QuestionNotFound(id.to_string())),
        GuardedWrite::Rejected { survey_id, status } => {
            warn!(survey_id = %survey_id, status = %status, "Rejected edit");
            Err(ServiceError::NotEditable {
                id: survey_id,
                status,
            })
        }
    }
}
