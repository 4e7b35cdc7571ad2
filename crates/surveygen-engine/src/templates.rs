//! Use-case keyed question templates.

use tracing::debug;

use crate::signals::DEFAULT_USE_CASE;
use crate::{EngineError, QuestionDraft, QuestionKind, SignalSet};

/// One question of a template, before it gets a position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateQuestion {
    pub text: String,
    pub kind: QuestionKind,
    pub options: Vec<String>,
}

impl TemplateQuestion {
    pub fn new(text: impl Into<String>, kind: QuestionKind, options: &[&str]) -> Self {
        let options = if kind.has_options() {
            options.iter().map(|o| o.to_string()).collect()
        } else {
            Vec::new()
        };

        Self {
            text: text.into(),
            kind,
            options,
        }
    }
}

/// A fixed, ordered question sequence for one use case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    key: String,
    questions: Vec<TemplateQuestion>,
}

impl Template {
    pub fn new(
        key: impl Into<String>,
        questions: Vec<TemplateQuestion>,
    ) -> Result<Self, EngineError> {
        let key = key.into();
        if questions.is_empty() {
            return Err(EngineError::EmptyTemplate(key));
        }
        Ok(Self { key, questions })
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn questions(&self) -> &[TemplateQuestion] {
        &self.questions
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Fresh drafts numbered 0..N-1 in template order.
    pub fn drafts(&self) -> Vec<QuestionDraft> {
        self.questions
            .iter()
            .enumerate()
            .map(|(index, q)| QuestionDraft {
                question_text: q.text.clone(),
                question_type: q.kind,
                options: q.options.clone(),
                order_index: index as u32,
                ai_generated: true,
            })
            .collect()
    }
}

/// Registry from `use_case` to template.
///
/// The default template is always present and always first, so selection
/// never comes back empty-handed.
#[derive(Debug, Clone)]
pub struct TemplateRegistry {
    templates: Vec<Template>,
}

impl TemplateRegistry {
    /// The registry shipped with surveygen.
    pub fn builtin() -> Self {
        let templates = BUILTIN
            .iter()
            .map(|(key, shapes)| Template {
                key: key.to_string(),
                questions: shapes
                    .iter()
                    .map(|(text, kind, options)| TemplateQuestion::new(*text, *kind, options))
                    .collect(),
            })
            .collect();

        Self { templates }
    }

    /// Add a template, replacing any existing one with the same key.
    pub fn with_template(mut self, template: Template) -> Self {
        match self.templates.iter_mut().find(|t| t.key == template.key) {
            Some(existing) => *existing = template,
            None => self.templates.push(template),
        }
        self
    }

    /// Registered keys, default first.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.templates.iter().map(|t| t.key.as_str())
    }

    pub fn templates(&self) -> &[Template] {
        &self.templates
    }

    /// Exact, case-sensitive lookup.
    pub fn get(&self, key: &str) -> Option<&Template> {
        self.templates.iter().find(|t| t.key == key)
    }

    pub fn default_template(&self) -> &Template {
        &self.templates[0]
    }

    /// The template for `use_case`, or the default when none is registered.
    pub fn select(&self, use_case: &str) -> &Template {
        match self.get(use_case) {
            Some(template) => template,
            None => {
                debug!(use_case, "No template for use case, using default");
                self.default_template()
            }
        }
    }

    /// Generate drafts for `signals`. Only `use_case` affects the result.
    pub fn generate(&self, signals: &SignalSet) -> Vec<QuestionDraft> {
        let resolved = signals.resolve();
        let template = self.select(resolved.use_case);

        debug!(
            use_case = resolved.use_case,
            template = template.key(),
            industry = resolved.industry,
            role = resolved.role,
            team_type = resolved.team_type,
            questions = template.len(),
            "Generated question set"
        );

        template.drafts()
    }
}

impl Default for TemplateRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

type Shape = (&'static str, QuestionKind, &'static [&'static str]);

const RATING_SCALE: &[&str] = &["Excellent", "Good", "Fair", "Poor", "Very Poor"];

const EMPLOYEE_ENGAGEMENT: &[Shape] = &[
    (
        "How satisfied are you with your current role and responsibilities?",
        QuestionKind::MultipleChoice,
        &[
            "Very Satisfied",
            "Satisfied",
            "Neutral",
            "Dissatisfied",
            "Very Dissatisfied",
        ],
    ),
    (
        "What motivates you most in your work? Please share your thoughts.",
        QuestionKind::TextEntry,
        &[],
    ),
    (
        "How would you rate the work-life balance at our organization?",
        QuestionKind::Dropdown,
        RATING_SCALE,
    ),
    (
        "Do you feel valued and appreciated for your contributions?",
        QuestionKind::MultipleChoice,
        &["Always", "Often", "Sometimes", "Rarely", "Never"],
    ),
    (
        "What suggestions do you have for improving team collaboration?",
        QuestionKind::TextEntry,
        &[],
    ),
];

const CUSTOMER_SATISFACTION: &[Shape] = &[
    (
        "How would you rate your overall experience with our product/service?",
        QuestionKind::MultipleChoice,
        &["Excellent", "Good", "Average", "Poor", "Very Poor"],
    ),
    (
        "What did you like most about your experience?",
        QuestionKind::TextEntry,
        &[],
    ),
    (
        "How likely are you to recommend us to a friend or colleague?",
        QuestionKind::Dropdown,
        &[
            "Extremely Likely",
            "Very Likely",
            "Somewhat Likely",
            "Not Very Likely",
            "Not at All Likely",
        ],
    ),
];

const MARKET_RESEARCH: &[Shape] = &[
    (
        "Which features are most important to you when choosing a product in this category?",
        QuestionKind::MultipleChoice,
        &[
            "Price",
            "Quality",
            "Brand Reputation",
            "Customer Service",
            "Features",
        ],
    ),
    (
        "What challenges are you currently facing that our solution could address?",
        QuestionKind::TextEntry,
        &[],
    ),
    (
        "How often do you purchase products in this category?",
        QuestionKind::Dropdown,
        &["Daily", "Weekly", "Monthly", "Quarterly", "Annually", "Rarely"],
    ),
];

// Default first.
const BUILTIN: &[(&str, &[Shape])] = &[
    (DEFAULT_USE_CASE, EMPLOYEE_ENGAGEMENT),
    ("Customer Satisfaction", CUSTOMER_SATISFACTION),
    ("Market Research", MARKET_RESEARCH),
];
