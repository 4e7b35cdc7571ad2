//! Interactive profiler for `surveygen new --interactive`.

use anyhow::Result;
use colored::Colorize;
use dialoguer::Select;

use surveygen_engine::{SignalSet, INDUSTRIES, ROLES, TEAM_TYPES, USE_CASES};

/// Ask for each signal in turn, preselecting the current value.
pub fn run_profiler(current: &SignalSet) -> Result<SignalSet> {
    eprintln!(
        "{}",
        "Tell us about your needs to generate a personalized survey".bold()
    );

    let industry = pick(
        "What industry do you work in?",
        INDUSTRIES,
        current.industry.as_deref(),
    )?;
    let use_case = pick(
        "What type of survey do you need?",
        USE_CASES,
        current.use_case.as_deref(),
    )?;
    let role = pick("What is your role?", ROLES, current.role.as_deref())?;
    let team_type = pick(
        "Is this for you or a team?",
        TEAM_TYPES,
        current.team_type.as_deref(),
    )?;

    let signals = SignalSet::new()
        .with_industry(industry)
        .with_use_case(use_case)
        .with_role(role)
        .with_team_type(team_type);
    eprintln!("{}", signals.profile_sentence().dimmed());

    Ok(signals)
}

fn pick(prompt: &str, choices: &[&str], current: Option<&str>) -> Result<String> {
    let selection = Select::new()
        .with_prompt(prompt)
        .items(choices)
        .default(default_index(choices, current))
        .interact()?;

    Ok(choices[selection].to_string())
}

fn default_index(choices: &[&str], current: Option<&str>) -> usize {
    current
        .and_then(|value| choices.iter().position(|c| c.eq_ignore_ascii_case(value)))
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_index_matches_current_value() {
        assert_eq!(default_index(USE_CASES, Some("market research")), 2);
        assert_eq!(default_index(TEAM_TYPES, Some("Team")), 1);
    }

    #[test]
    fn test_default_index_falls_back_to_first() {
        assert_eq!(default_index(ROLES, Some("Astronaut")), 0);
        assert_eq!(default_index(INDUSTRIES, None), 0);
    }
}
