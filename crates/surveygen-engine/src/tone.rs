//! Tone rewrites for single questions.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

use crate::{EngineError, QuestionKind};

/// Style a question can be rephrased into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Concise,
    Casual,
}

impl Tone {
    pub const ALL: [Tone; 2] = [Tone::Concise, Tone::Casual];

    pub fn as_str(&self) -> &'static str {
        match self {
            Tone::Concise => "concise",
            Tone::Casual => "casual",
        }
    }
}

impl fmt::Display for Tone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tone {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "concise" => Ok(Tone::Concise),
            "casual" => Ok(Tone::Casual),
            _ => Err(EngineError::UnknownTone(s.to_string())),
        }
    }
}

lazy_static! {
    static ref CONCISE_FILLER: Regex =
        Regex::new(r"(?i)please share your thoughts\.?|at our organization")
            .expect("concise filler pattern is valid");
    static ref CASUAL_ORGANIZATION: Regex =
        Regex::new(r"(?i)our organization").expect("casual organization pattern is valid");
    static ref CASUAL_FILLER: Regex =
        Regex::new(r"(?i)please share your thoughts").expect("casual filler pattern is valid");
}

/// Exact-text rewrite tables, one per tone, with a substring fallback.
#[derive(Debug, Clone, Default)]
pub struct ToneRewriter {
    tables: HashMap<Tone, HashMap<String, String>>,
}

impl ToneRewriter {
    /// Rewrites for every built-in template question.
    pub fn builtin() -> Self {
        let mut rewriter = Self::default();
        for (tone, table) in [(Tone::Concise, CONCISE), (Tone::Casual, CASUAL)] {
            for (from, to) in table {
                rewriter = rewriter.with_rewrite(tone, *from, *to);
            }
        }
        rewriter
    }

    /// Register an exact rewrite for `tone`, replacing any previous entry.
    pub fn with_rewrite(
        mut self,
        tone: Tone,
        from: impl Into<String>,
        to: impl Into<String>,
    ) -> Self {
        self.tables
            .entry(tone)
            .or_default()
            .insert(from.into(), to.into());
        self
    }

    /// Look up an exact rewrite without falling back.
    pub fn lookup(&self, text: &str, tone: Tone) -> Option<&str> {
        self.tables
            .get(&tone)
            .and_then(|table| table.get(text))
            .map(String::as_str)
    }

    /// Rephrase `text` in `tone`.
    ///
    /// The exact table wins; otherwise the tone's filler phrases are removed
    /// and the result trimmed. `_kind` is not consulted.
    pub fn rewrite(&self, text: &str, _kind: QuestionKind, tone: Tone) -> String {
        if let Some(rewritten) = self.lookup(text, tone) {
            return rewritten.to_string();
        }

        debug!(tone = %tone, text_len = text.len(), "No exact rewrite, applying fallback");
        fallback(text, tone)
    }
}

fn fallback(text: &str, tone: Tone) -> String {
    match tone {
        Tone::Concise => CONCISE_FILLER.replace_all(text, "").trim().to_string(),
        Tone::Casual => {
            let text = CASUAL_ORGANIZATION.replace_all(text, "things");
            CASUAL_FILLER.replace_all(&text, "").trim().to_string()
        }
    }
}

const CONCISE: &[(&str, &str)] = &[
    (
        "How satisfied are you with your current role and responsibilities?",
        "Rate your satisfaction with your role",
    ),
    (
        "What motivates you most in your work? Please share your thoughts.",
        "What motivates you at work?",
    ),
    (
        "How would you rate the work-life balance at our organization?",
        "Rate your work-life balance",
    ),
    (
        "Do you feel valued and appreciated for your contributions?",
        "Do you feel valued for your work?",
    ),
    (
        "What suggestions do you have for improving team collaboration?",
        "How can we improve team collaboration?",
    ),
    (
        "How would you rate your overall experience with our product/service?",
        "Rate your overall experience",
    ),
    (
        "What did you like most about your experience?",
        "What did you like most?",
    ),
    (
        "How likely are you to recommend us to a friend or colleague?",
        "Would you recommend us?",
    ),
    (
        "Which features are most important to you when choosing a product in this category?",
        "What features matter most to you?",
    ),
    (
        "What challenges are you currently facing that our solution could address?",
        "What challenges can we help solve?",
    ),
    (
        "How often do you purchase products in this category?",
        "Purchase frequency?",
    ),
];

const CASUAL: &[(&str, &str)] = &[
    (
        "How satisfied are you with your current role and responsibilities?",
        "How are you feeling about your role these days?",
    ),
    (
        "What motivates you most in your work? Please share your thoughts.",
        "What gets you excited about coming to work?",
    ),
    (
        "How would you rate the work-life balance at our organization?",
        "How's your work-life balance going?",
    ),
    (
        "Do you feel valued and appreciated for your contributions?",
        "Do you feel like your work is appreciated?",
    ),
    (
        "What suggestions do you have for improving team collaboration?",
        "Got any ideas for how we could work better as a team?",
    ),
    (
        "How would you rate your overall experience with our product/service?",
        "How was your experience with us?",
    ),
    (
        "What did you like most about your experience?",
        "What stood out to you in a good way?",
    ),
    (
        "How likely are you to recommend us to a friend or colleague?",
        "Would you tell your friends about us?",
    ),
    (
        "Which features are most important to you when choosing a product in this category?",
        "What do you look for when shopping for something like this?",
    ),
    (
        "What challenges are you currently facing that our solution could address?",
        "What problems are you dealing with that we might help with?",
    ),
    (
        "How often do you purchase products in this category?",
        "How often do you buy stuff like this?",
    ),
];
