use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::EngineError;

/// How a question is answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKind {
    MultipleChoice,
    TextEntry,
    Dropdown,
}

impl QuestionKind {
    pub const ALL: [QuestionKind; 3] = [
        QuestionKind::MultipleChoice,
        QuestionKind::TextEntry,
        QuestionKind::Dropdown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionKind::MultipleChoice => "multiple_choice",
            QuestionKind::TextEntry => "text_entry",
            QuestionKind::Dropdown => "dropdown",
        }
    }

    /// Whether answers are picked from a list of option labels.
    pub fn has_options(&self) -> bool {
        !matches!(self, QuestionKind::TextEntry)
    }
}

impl fmt::Display for QuestionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QuestionKind {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "multiple_choice" => Ok(QuestionKind::MultipleChoice),
            "text_entry" => Ok(QuestionKind::TextEntry),
            "dropdown" => Ok(QuestionKind::Dropdown),
            _ => Err(EngineError::UnknownQuestionKind(s.to_string())),
        }
    }
}

/// A question before the store assigns it an id and owning survey.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionDraft {
    pub question_text: String,
    pub question_type: QuestionKind,
    #[serde(default)]
    pub options: Vec<String>,
    pub order_index: u32,
    /// True when the text came from the engine rather than a person
    pub ai_generated: bool,
}

impl QuestionDraft {
    /// A hand-authored question. Options are dropped for `text_entry`.
    pub fn manual(
        question_text: impl Into<String>,
        question_type: QuestionKind,
        options: Vec<String>,
        order_index: u32,
    ) -> Self {
        let options = if question_type.has_options() {
            options
        } else {
            Vec::new()
        };

        Self {
            question_text: question_text.into(),
            question_type,
            options,
            order_index,
            ai_generated: false,
        }
    }
}
