//! Writes that only apply while a survey allows them.
//!
//! Each method checks the survey's status and writes in one transaction,
//! holding the connection lock throughout.

use chrono::{DateTime, Utc};
use rusqlite::Connection;
use std::collections::BTreeMap;

use surveygen_engine::QuestionDraft;

use crate::questions::{self, QuestionRecord};
use crate::surveys::{self, NewSurvey, SurveyRecord, SurveyStatus};
use crate::{Database, DbError};

/// Outcome of a status-guarded write. Nothing is written unless `Applied`.
#[derive(Debug, Clone, PartialEq)]
pub enum GuardedWrite<T> {
    Applied(T),
    SurveyMissing,
    QuestionMissing,
    /// The survey's status does not allow the write
    Rejected {
        survey_id: String,
        status: SurveyStatus,
    },
}

impl<T> GuardedWrite<T> {
    pub fn applied(self) -> Option<T> {
        match self {
            GuardedWrite::Applied(value) => Some(value),
            _ => None,
        }
    }
}

impl Database {
    /// Create a survey and its questions together.
    pub fn create_survey_with_questions(
        &self,
        survey: &NewSurvey,
        drafts: &[QuestionDraft],
    ) -> Result<(SurveyRecord, Vec<QuestionRecord>), DbError> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        let record = surveys::insert_survey(&tx, survey)?;
        let questions = questions::insert_drafts(&tx, &record.id, drafts)?;

        tx.commit()?;
        Ok((record, questions))
    }

    /// Swap a draft survey's signal set and its whole question collection.
    pub fn replace_survey_content(
        &self,
        survey_id: &str,
        signals: &BTreeMap<String, String>,
        drafts: &[QuestionDraft],
    ) -> Result<GuardedWrite<Vec<QuestionRecord>>, DbError> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        if let Some(blocked) = check_draft(&tx, survey_id)? {
            return Ok(blocked);
        }

        surveys::write_signals(&tx, survey_id, signals)?;
        questions::delete_for_survey(&tx, survey_id)?;
        let records = questions::insert_drafts(&tx, survey_id, drafts)?;

        tx.commit()?;
        Ok(GuardedWrite::Applied(records))
    }

    /// Append a question after the last one of a draft survey. The draft's
    /// own `order_index` is ignored.
    pub fn append_question(
        &self,
        survey_id: &str,
        draft: &QuestionDraft,
    ) -> Result<GuardedWrite<QuestionRecord>, DbError> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        if let Some(blocked) = check_draft(&tx, survey_id)? {
            return Ok(blocked);
        }

        let positioned = QuestionDraft {
            order_index: questions::next_order_index(&tx, survey_id)?,
            ..draft.clone()
        };
        let record = questions::insert_draft(&tx, survey_id, &positioned)?;

        tx.commit()?;
        Ok(GuardedWrite::Applied(record))
    }

    /// Rewrite one question of a draft survey. `rewrite` sees the stored
    /// question and returns its new text.
    pub fn update_question_text_if_draft<F>(
        &self,
        question_id: &str,
        rewrite: F,
    ) -> Result<GuardedWrite<QuestionRecord>, DbError>
    where
        F: FnOnce(&QuestionRecord) -> String,
    {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        let Some(question) = questions::get_question(&tx, question_id)? else {
            return Ok(GuardedWrite::QuestionMissing);
        };
        if let Some(blocked) = check_draft(&tx, &question.survey_id)? {
            return Ok(blocked);
        }

        let text = rewrite(&question);
        let Some(updated) = questions::update_text(&tx, question_id, &text)? else {
            return Ok(GuardedWrite::QuestionMissing);
        };

        tx.commit()?;
        Ok(GuardedWrite::Applied(updated))
    }

    /// Deploy a survey unless it is archived. A survey that is already
    /// deployed comes back unchanged.
    pub fn deploy_survey(
        &self,
        survey_id: &str,
        at: DateTime<Utc>,
    ) -> Result<GuardedWrite<SurveyRecord>, DbError> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        let Some(survey) = surveys::get_survey(&tx, survey_id)? else {
            return Ok(GuardedWrite::SurveyMissing);
        };
        match (survey.status, survey.deployed_at) {
            (SurveyStatus::Archived, _) => {
                return Ok(GuardedWrite::Rejected {
                    survey_id: survey.id,
                    status: SurveyStatus::Archived,
                })
            }
            (SurveyStatus::Deployed, Some(_)) => return Ok(GuardedWrite::Applied(survey)),
            _ => {}
        }

        surveys::set_status(&tx, survey_id, SurveyStatus::Deployed, Some(at))?;
        let deployed = surveys::get_survey(&tx, survey_id)?;

        tx.commit()?;
        Ok(deployed.map_or(GuardedWrite::SurveyMissing, GuardedWrite::Applied))
    }
}

/// `None` when the survey exists and is still a draft.
fn check_draft<T>(conn: &Connection, survey_id: &str) -> Result<Option<GuardedWrite<T>>, DbError> {
    let blocked = match surveys::get_survey(conn, survey_id)? {
        None => GuardedWrite::SurveyMissing,
        Some(survey) if survey.status != SurveyStatus::Draft => GuardedWrite::Rejected {
            survey_id: survey.id,
            status: survey.status,
        },
        Some(_) => return Ok(None),
    };
    Ok(Some(blocked))
}
