use anyhow::{bail, Context, Result};
use clap::{Args, Subcommand, ValueEnum};
use colored::{ColoredString, Colorize};

use surveygen_core::{SurveyDetail, SurveyService};
use surveygen_db::{QuestionRecord, SurveyFilter, SurveyRecord, SurveyStatus};
use surveygen_engine::{QuestionDraft, QuestionKind, SignalSet, Tone};

use crate::config::Config;
use crate::profiler::run_profiler;

/// Signal flags shared by `new`, `regenerate` and `preview`.
#[derive(Args, Debug, Clone, Default)]
pub struct SignalArgs {
    /// Industry you work in
    #[arg(long)]
    pub industry: Option<String>,

    /// Kind of survey (selects the question template)
    #[arg(long)]
    pub use_case: Option<String>,

    /// Your role
    #[arg(long)]
    pub role: Option<String>,

    /// Solo or Team
    #[arg(long)]
    pub team_type: Option<String>,
}

impl SignalArgs {
    fn to_signal_set(&self) -> SignalSet {
        SignalSet {
            industry: self.industry.clone(),
            use_case: self.use_case.clone(),
            role: self.role.clone(),
            team_type: self.team_type.clone(),
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum SurveyCommand {
    /// Generate a new draft survey
    New {
        #[command(flatten)]
        signals: SignalArgs,

        /// Pick each signal from a menu
        #[arg(short, long)]
        interactive: bool,

        /// Owner id (a fresh id is generated if omitted)
        #[arg(long)]
        user: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List surveys, most recently updated first
    List {
        /// Filter by status
        #[arg(long, value_enum)]
        status: Option<StatusChoice>,

        /// Search survey titles
        #[arg(long)]
        search: Option<String>,

        /// Only show surveys owned by this user
        #[arg(long)]
        user: Option<String>,

        /// Maximum number of surveys
        #[arg(long)]
        limit: Option<usize>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show a survey and its questions
    Show {
        /// Survey ID (launches interactive picker if omitted)
        id: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Change signals and regenerate every question
    Regenerate {
        /// Survey ID (launches interactive picker if omitted)
        id: Option<String>,

        #[command(flatten)]
        signals: SignalArgs,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Replace a question's text
    Edit {
        /// Question ID
        question_id: String,

        /// New question text, stored as given
        text: String,
    },

    /// Rephrase one question in a different tone
    Rephrase {
        /// Question ID
        question_id: String,

        /// Target tone
        #[arg(long, value_enum)]
        tone: ToneChoice,
    },

    /// Append a hand-written question
    Add {
        /// Survey ID
        survey_id: String,

        /// Question text
        #[arg(long)]
        text: String,

        /// Answer format
        #[arg(long, value_enum, default_value = "text-entry")]
        kind: KindChoice,

        /// Answer option (repeat for each option)
        #[arg(long = "option")]
        options: Vec<String>,
    },

    /// Publish a survey and print its share link
    Deploy {
        /// Survey ID (launches interactive picker if omitted)
        id: Option<String>,

        /// Open the share link in a browser
        #[arg(long)]
        open: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Retire a survey
    Archive {
        /// Survey ID
        id: String,
    },

    /// Delete a survey and its questions
    Delete {
        /// Survey ID
        id: String,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// List question templates
    Templates {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Generate questions without saving anything
    Preview {
        #[command(flatten)]
        signals: SignalArgs,

        /// Also show every question rephrased in this tone
        #[arg(long, value_enum)]
        tone: Option<ToneChoice>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum StatusChoice {
    Draft,
    Deployed,
    Archived,
}

impl From<StatusChoice> for SurveyStatus {
    fn from(choice: StatusChoice) -> Self {
        match choice {
            StatusChoice::Draft => SurveyStatus::Draft,
            StatusChoice::Deployed => SurveyStatus::Deployed,
            StatusChoice::Archived => SurveyStatus::Archived,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ToneChoice {
    Concise,
    Casual,
}

impl From<ToneChoice> for Tone {
    fn from(choice: ToneChoice) -> Self {
        match choice {
            ToneChoice::Concise => Tone::Concise,
            ToneChoice::Casual => Tone::Casual,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum KindChoice {
    MultipleChoice,
    TextEntry,
    Dropdown,
}

impl From<KindChoice> for QuestionKind {
    fn from(choice: KindChoice) -> Self {
        match choice {
            KindChoice::MultipleChoice => QuestionKind::MultipleChoice,
            KindChoice::TextEntry => QuestionKind::TextEntry,
            KindChoice::Dropdown => QuestionKind::Dropdown,
        }
    }
}

pub fn handle_survey_command(
    command: SurveyCommand,
    service: &SurveyService,
    config: &Config,
) -> Result<()> {
    match command {
        SurveyCommand::New {
            signals,
            interactive,
            user,
            json,
        } => {
            let mut signals = config.default_signals().merged(&signals.to_signal_set());
            if interactive {
                signals = run_profiler(&signals)?;
            }
            let detail = service.create_survey(user, &signals)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&detail)?);
            } else {
                print_survey_detail(&detail);
            }
        }
        SurveyCommand::List {
            status,
            search,
            user,
            limit,
            json,
        } => {
            let filter = SurveyFilter {
                status: status.map(Into::into),
                user_id: user,
                search,
                limit,
            };
            let surveys = service.list_surveys(&filter)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&surveys)?);
            } else if surveys.is_empty() {
                println!("{}", "No surveys found.".dimmed());
            } else {
                print_surveys_table(&surveys);
            }
        }
        SurveyCommand::Show { id, json } => {
            let id = resolve_survey_id(service, id)?;
            let detail = service.get_survey(&id)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&detail)?);
            } else {
                print_survey_detail(&detail);
            }
        }
        SurveyCommand::Regenerate { id, signals, json } => {
            let id = resolve_survey_id(service, id)?;
            let current = service.get_survey(&id)?.survey.signals();
            let signals = current.merged(&signals.to_signal_set());
            let detail = service.regenerate_survey(&id, &signals)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&detail)?);
            } else {
                print_survey_detail(&detail);
            }
        }
        SurveyCommand::Edit { question_id, text } => {
            let question = service.edit_question(&question_id, &text)?;
            print_question_updated(&question);
        }
        SurveyCommand::Rephrase { question_id, tone } => {
            let question = service.regenerate_question(&question_id, tone.into())?;
            print_question_updated(&question);
        }
        SurveyCommand::Add {
            survey_id,
            text,
            kind,
            options,
        } => {
            let question = service.add_question(&survey_id, &text, kind.into(), options)?;
            println!(
                "{} Added question {} at position {}",
                "✓".bright_green(),
                question.id.dimmed(),
                question.order_index + 1
            );
        }
        SurveyCommand::Deploy { id, open, json } => {
            let id = resolve_survey_id(service, id)?;
            let deployment = service.deploy(&id)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&deployment)?);
            } else {
                println!("{} Survey deployed", "✓".bright_green());
                println!("{}  {}", "Share link:".dimmed(), deployment.share_url.bold());
                println!(
                    "{}  {}",
                    "Deployed:".dimmed(),
                    deployment.deployed_at.format("%Y-%m-%d %H:%M:%S UTC")
                );
            }

            if open {
                if let Err(e) = open::that(&deployment.share_url) {
                    eprintln!(
                        "Failed to open browser: {} (open {} manually)",
                        e, deployment.share_url
                    );
                }
            }
        }
        SurveyCommand::Archive { id } => {
            let survey = service.archive(&id)?;
            println!("{} Archived {}", "✓".bright_green(), survey.title);
        }
        SurveyCommand::Delete { id, yes } => {
            let detail = service.get_survey(&id)?;
            if !yes && !confirm_delete(&detail.survey)? {
                println!("{}", "Cancelled.".dimmed());
                return Ok(());
            }
            service.delete_survey(&id)?;
            println!("{} Deleted {}", "✓".bright_green(), detail.survey.title);
        }
        SurveyCommand::Templates { json } => {
            let templates = service.templates();

            if json {
                let summary: Vec<serde_json::Value> = templates
                    .templates()
                    .iter()
                    .map(|t| serde_json::json!({ "key": t.key(), "questions": t.len() }))
                    .collect();
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                println!("{}", "=== Templates ===".bright_blue().bold());
                let default_key = templates.default_template().key();
                for template in templates.templates() {
                    let marker = if template.key() == default_key {
                        " (default)".dimmed().to_string()
                    } else {
                        String::new()
                    };
                    println!(
                        "  {:<24} {} questions{}",
                        template.key(),
                        template.len(),
                        marker
                    );
                }
            }
        }
        SurveyCommand::Preview {
            signals,
            tone,
            json,
        } => {
            let signals = config.default_signals().merged(&signals.to_signal_set());
            let drafts = service.preview(&signals);
            let tone: Option<Tone> = tone.map(Into::into);

            if json {
                println!("{}", serde_json::to_string_pretty(&drafts)?);
            } else {
                println!("{}", signals.profile_sentence().dimmed());
                println!();
                for draft in &drafts {
                    print_draft(draft);
                    if let Some(tone) = tone {
                        let rephrased =
                            service.rephrase(&draft.question_text, draft.question_type, tone);
                        println!("     {} {}", format!("{}:", tone).dimmed(), rephrased);
                    }
                }
            }
        }
    }

    Ok(())
}

fn resolve_survey_id(service: &SurveyService, id: Option<String>) -> Result<String> {
    if let Some(id) = id {
        return Ok(id);
    }

    // Interactive picker
    let surveys = service.list_surveys(&SurveyFilter::default())?;
    if surveys.is_empty() {
        bail!("No surveys found.");
    }

    let items: Vec<String> = surveys
        .iter()
        .map(|s| {
            format!(
                "{} | {:8} | {}",
                s.updated_at.format("%Y-%m-%d %H:%M"),
                s.status.as_str(),
                s.title
            )
        })
        .collect();

    let selection = dialoguer::FuzzySelect::new()
        .with_prompt("Select a survey")
        .items(&items)
        .default(0)
        .interact()?;

    Ok(surveys[selection].id.clone())
}

fn confirm_delete(survey: &SurveyRecord) -> Result<bool> {
    dialoguer::Confirm::new()
        .with_prompt(format!("Delete \"{}\" and all of its questions?", survey.title))
        .default(false)
        .interact()
        .context("Failed to read confirmation")
}

const STATUS_WIDTH: usize = 10;

fn colored_status(status: SurveyStatus) -> ColoredString {
    paint_status(status, status.as_str())
}

/// Status padded to its table column. Padding goes on before the color so
/// escape codes never count toward the width.
fn status_cell(status: SurveyStatus) -> ColoredString {
    paint_status(status, &format!("{:<STATUS_WIDTH$}", status.as_str()))
}

fn paint_status(status: SurveyStatus, text: &str) -> ColoredString {
    match status {
        SurveyStatus::Draft => text.bright_yellow(),
        SurveyStatus::Deployed => text.bright_green(),
        SurveyStatus::Archived => text.dimmed(),
    }
}

fn print_surveys_table(surveys: &[SurveyRecord]) {
    println!(
        "{:<36} {:<STATUS_WIDTH$} {:<18} {}",
        "ID".dimmed(),
        "STATUS".dimmed(),
        "UPDATED".dimmed(),
        "TITLE".dimmed(),
    );

    for s in surveys {
        println!(
            "{:<36} {} {:<18} {}",
            s.id,
            status_cell(s.status),
            s.updated_at.format("%Y-%m-%d %H:%M").to_string(),
            s.title
        );
    }
}

fn print_survey_detail(detail: &SurveyDetail) {
    let survey = &detail.survey;

    println!("{}", format!("=== {} ===", survey.title).bright_blue().bold());
    println!("{}  {}", "ID:".dimmed(), survey.id);
    println!("{}  {}", "Status:".dimmed(), colored_status(survey.status));
    println!("{}  {}", "User:".dimmed(), survey.user_id);
    println!(
        "{}  {}",
        "Created:".dimmed(),
        survey.created_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    if let Some(deployed_at) = survey.deployed_at {
        println!(
            "{}  {}",
            "Deployed:".dimmed(),
            deployed_at.format("%Y-%m-%d %H:%M:%S UTC")
        );
    }
    println!();
    println!("{}", survey.signals().profile_sentence().dimmed());

    println!();
    println!(
        "{}",
        format!("--- Questions ({}) ---", detail.questions.len()).dimmed()
    );
    for question in &detail.questions {
        print_question(question);
    }
}

fn print_question(question: &QuestionRecord) {
    println!();
    println!(
        "  {} {}",
        format!("{}.", question.order_index + 1).bright_blue(),
        question.question_text
    );
    let provenance = if question.ai_generated { "" } else { ", manual" };
    println!(
        "     {} {}",
        format!("({}{})", question.question_type, provenance).dimmed(),
        question.id.dimmed()
    );
    for option in &question.options {
        println!("     - {}", option);
    }
}

fn print_draft(draft: &QuestionDraft) {
    println!(
        "  {} {} {}",
        format!("{}.", draft.order_index + 1).bright_blue(),
        draft.question_text,
        format!("({})", draft.question_type).dimmed()
    );
    for option in &draft.options {
        println!("     - {}", option);
    }
}

fn print_question_updated(question: &QuestionRecord) {
    println!("{} Updated question {}", "✓".bright_green(), question.id.dimmed());
    println!("  {}", question.question_text);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signal_args_keep_only_given_flags() {
        let args = SignalArgs {
            use_case: Some("Market Research".to_string()),
            ..Default::default()
        };
        let signals = args.to_signal_set();
        assert_eq!(signals.use_case.as_deref(), Some("Market Research"));
        assert!(signals.industry.is_none());
        assert!(signals.role.is_none());
    }

    #[test]
    fn test_flags_override_config_defaults() {
        let args = SignalArgs {
            role: Some("Researcher".to_string()),
            ..Default::default()
        };
        let signals = Config::default()
            .default_signals()
            .merged(&args.to_signal_set());
        assert_eq!(signals.role.as_deref(), Some("Researcher"));
        assert_eq!(signals.industry.as_deref(), Some("Technology"));
    }

    #[test]
    fn test_status_cell_pads_inside_the_color() {
        colored::control::set_override(true);
        let cell = status_cell(SurveyStatus::Draft).to_string();
        let plain = colored_status(SurveyStatus::Deployed).to_string();
        colored::control::unset_override();

        assert!(cell.starts_with("\x1b["));
        assert!(cell.ends_with("draft     \x1b[0m"));
        assert!(plain.ends_with("deployed\x1b[0m"));
    }

    #[test]
    fn test_choice_conversions() {
        assert_eq!(QuestionKind::from(KindChoice::TextEntry), QuestionKind::TextEntry);
        assert_eq!(Tone::from(ToneChoice::Casual), Tone::Casual);
        assert_eq!(
            SurveyStatus::from(StatusChoice::Archived),
            SurveyStatus::Archived
        );
    }
}
