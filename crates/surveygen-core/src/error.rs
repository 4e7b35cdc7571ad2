use thiserror::Error;

use surveygen_db::{DbError, SurveyStatus};
use surveygen_engine::QuestionKind;

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Database error: {0}")]
    Database(#[from] DbError),

    #[error("Survey not found: {0}")]
    SurveyNotFound(String),

    #[error("Question not found: {0}")]
    QuestionNotFound(String),

    #[error("Question text cannot be empty")]
    EmptyQuestionText,

    #[error("A {0} question needs at least one option")]
    MissingOptions(QuestionKind),

    #[error("Survey {id} is {status} and can no longer be edited")]
    NotEditable { id: String, status: SurveyStatus },

    #[error("Cannot move survey from {from} to {to}")]
    InvalidTransition { from: SurveyStatus, to: SurveyStatus },
}

impl ServiceError {
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            ServiceError::SurveyNotFound(_) | ServiceError::QuestionNotFound(_)
        )
    }
}
