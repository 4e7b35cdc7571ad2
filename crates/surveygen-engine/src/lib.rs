//! # surveygen-engine
//!
//! Question generation for surveygen.
//!
//! The engine is a pure lookup over static tables. It never performs I/O and
//! holds no mutable state, so every function here can be called from any
//! thread without coordination.
//!
//! ## Key Types
//!
//! - [`SignalSet`] - Profiling signals (industry, use case, role, team type)
//! - [`QuestionDraft`] - A generated, not-yet-persisted question
//! - [`TemplateRegistry`] - Use-case keyed question templates
//! - [`ToneRewriter`] - Per-tone rewrite tables with substring fallback
//! - [`Tone`] - `concise` or `casual`
//!
//! ## Usage
//!
//! ```rust
//! use surveygen_engine::{generate_questions, regenerate_question, QuestionKind, SignalSet, Tone};
//!
//! let signals = SignalSet::new().with_use_case("Market Research");
//! let drafts = generate_questions(&signals);
//! assert_eq!(drafts.len(), 3);
//!
//! let text = regenerate_question(&drafts[2].question_text, QuestionKind::Dropdown, Tone::Concise);
//! assert_eq!(text, "Purchase frequency?");
//! ```

mod error;
mod profile;
mod question;
mod signals;
mod templates;
mod tone;

pub use error::EngineError;
pub use profile::{INDUSTRIES, ROLES, TEAM_TYPES, USE_CASES};
pub use question::{QuestionDraft, QuestionKind};
pub use signals::{
    ResolvedSignals, SignalSet, DEFAULT_INDUSTRY, DEFAULT_ROLE, DEFAULT_TEAM_TYPE,
    DEFAULT_USE_CASE,
};
pub use templates::{Template, TemplateQuestion, TemplateRegistry};
pub use tone::{Tone, ToneRewriter};

use lazy_static::lazy_static;

lazy_static! {
    static ref BUILTIN_TEMPLATES: TemplateRegistry = TemplateRegistry::builtin();
    static ref BUILTIN_REWRITER: ToneRewriter = ToneRewriter::builtin();
}

/// Generate the question set for `signals` from the built-in registry.
pub fn generate_questions(signals: &SignalSet) -> Vec<QuestionDraft> {
    BUILTIN_TEMPLATES.generate(signals)
}

/// Rephrase a single question in `tone` using the built-in rewrite tables.
///
/// `kind` is accepted so callers can pass the question through unchanged;
/// the current rewrite tables do not depend on it.
pub fn regenerate_question(current_text: &str, kind: QuestionKind, tone: Tone) -> String {
    BUILTIN_REWRITER.rewrite(current_text, kind, tone)
}

/// The built-in template registry.
pub fn builtin_templates() -> &'static TemplateRegistry {
    &BUILTIN_TEMPLATES
}
