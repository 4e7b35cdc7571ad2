use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("Unknown tone: {0} (expected 'concise' or 'casual')")]
    UnknownTone(String),

    #[error("Unknown question type: {0} (expected 'multiple_choice', 'text_entry' or 'dropdown')")]
    UnknownQuestionKind(String),

    #[error("Template '{0}' has no questions")]
    EmptyTemplate(String),
}
