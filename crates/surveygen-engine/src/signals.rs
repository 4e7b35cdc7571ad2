use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const DEFAULT_INDUSTRY: &str = "Business";
pub const DEFAULT_USE_CASE: &str = "Employee Engagement";
pub const DEFAULT_ROLE: &str = "HR";
pub const DEFAULT_TEAM_TYPE: &str = "Team";

/// Categorical profiling inputs that parameterize generation.
///
/// Every field is optional. Defaults are applied one field at a time by
/// [`SignalSet::resolve`], so a set with only `role` still resolves the other
/// three to their own defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalSet {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,
    #[serde(default, alias = "useCase", skip_serializing_if = "Option::is_none")]
    pub use_case: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, alias = "teamType", skip_serializing_if = "Option::is_none")]
    pub team_type: Option<String>,
}

/// A [`SignalSet`] with every default filled in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedSignals<'a> {
    pub industry: &'a str,
    pub use_case: &'a str,
    pub role: &'a str,
    pub team_type: &'a str,
}

impl SignalSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_industry(mut self, industry: impl Into<String>) -> Self {
        self.industry = Some(industry.into());
        self
    }

    pub fn with_use_case(mut self, use_case: impl Into<String>) -> Self {
        self.use_case = Some(use_case.into());
        self
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }

    pub fn with_team_type(mut self, team_type: impl Into<String>) -> Self {
        self.team_type = Some(team_type.into());
        self
    }

    /// Read the four known keys from a string map. Other keys are ignored.
    ///
    /// Both the stored snake_case keys and the camelCase form-field names are
    /// recognized; snake_case wins when both are present.
    pub fn from_map(map: &BTreeMap<String, String>) -> Self {
        let pick = |keys: &[&str]| keys.iter().find_map(|k| map.get(*k).cloned());

        Self {
            industry: pick(&["industry"]),
            use_case: pick(&["use_case", "useCase"]),
            role: pick(&["role"]),
            team_type: pick(&["team_type", "teamType"]),
        }
    }

    /// Apply the per-field defaults.
    pub fn resolve(&self) -> ResolvedSignals<'_> {
        ResolvedSignals {
            industry: self.industry.as_deref().unwrap_or(DEFAULT_INDUSTRY),
            use_case: self.use_case.as_deref().unwrap_or(DEFAULT_USE_CASE),
            role: self.role.as_deref().unwrap_or(DEFAULT_ROLE),
            team_type: self.team_type.as_deref().unwrap_or(DEFAULT_TEAM_TYPE),
        }
    }

    /// A new set where every field present in `overrides` replaces ours.
    pub fn merged(&self, overrides: &SignalSet) -> SignalSet {
        SignalSet {
            industry: overrides.industry.clone().or_else(|| self.industry.clone()),
            use_case: overrides.use_case.clone().or_else(|| self.use_case.clone()),
            role: overrides.role.clone().or_else(|| self.role.clone()),
            team_type: overrides
                .team_type
                .clone()
                .or_else(|| self.team_type.clone()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.industry.is_none()
            && self.use_case.is_none()
            && self.role.is_none()
            && self.team_type.is_none()
    }

    /// One-line description of who the survey is for.
    ///
    /// Blank fields read as "professional", "your industry" and "survey".
    pub fn profile_sentence(&self) -> String {
        fn non_blank(v: &Option<String>) -> Option<&str> {
            v.as_deref().filter(|s| !s.trim().is_empty())
        }

        let role = non_blank(&self.role).unwrap_or("professional");
        let industry = non_blank(&self.industry).unwrap_or("your industry");
        let use_case = non_blank(&self.use_case).unwrap_or("survey");

        let article = match use_case.chars().next() {
            Some(c) if "aeiou".contains(c.to_ascii_lowercase()) => "an",
            _ => "a",
        };

        format!(
            "Create a survey for {} at {} creating {} {} survey.",
            role, industry, article, use_case
        )
    }
}

impl ResolvedSignals<'_> {
    /// All four signals keyed by their stored names.
    pub fn to_map(&self) -> BTreeMap<String, String> {
        BTreeMap::from([
            ("industry".to_string(), self.industry.to_string()),
            ("use_case".to_string(), self.use_case.to_string()),
            ("role".to_string(), self.role.to_string()),
            ("team_type".to_string(), self.team_type.to_string()),
        ])
    }

    pub fn to_signal_set(&self) -> SignalSet {
        SignalSet {
            industry: Some(self.industry.to_string()),
            use_case: Some(self.use_case.to_string()),
            role: Some(self.role.to_string()),
            team_type: Some(self.team_type.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_apply_per_field() {
        let signals = SignalSet::new().with_role("Executive");
        let resolved = signals.resolve();

        assert_eq!(resolved.role, "Executive");
        assert_eq!(resolved.industry, DEFAULT_INDUSTRY);
        assert_eq!(resolved.use_case, DEFAULT_USE_CASE);
        assert_eq!(resolved.team_type, DEFAULT_TEAM_TYPE);
    }

    #[test]
    fn test_empty_string_is_not_missing() {
        let signals = SignalSet::new().with_use_case("");
        assert_eq!(signals.resolve().use_case, "");
    }

    #[test]
    fn test_from_map_reads_both_key_styles() {
        let mut map = BTreeMap::new();
        map.insert("useCase".to_string(), "Market Research".to_string());
        map.insert("team_type".to_string(), "Solo".to_string());
        map.insert("favorite_color".to_string(), "green".to_string());

        let signals = SignalSet::from_map(&map);
        assert_eq!(signals.use_case.as_deref(), Some("Market Research"));
        assert_eq!(signals.team_type.as_deref(), Some("Solo"));
        assert!(signals.industry.is_none());
    }

    #[test]
    fn test_deserialize_camel_case_aliases() {
        let signals: SignalSet =
            serde_json::from_str(r#"{"useCase":"Customer Satisfaction","teamType":"Solo"}"#)
                .unwrap();
        assert_eq!(signals.use_case.as_deref(), Some("Customer Satisfaction"));
        assert_eq!(signals.team_type.as_deref(), Some("Solo"));
    }

    #[test]
    fn test_merged_prefers_overrides() {
        let current = SignalSet::new()
            .with_industry("Retail")
            .with_use_case("Market Research");
        let overrides = SignalSet::new().with_use_case("Customer Satisfaction");

        let merged = current.merged(&overrides);
        assert_eq!(merged.industry.as_deref(), Some("Retail"));
        assert_eq!(merged.use_case.as_deref(), Some("Customer Satisfaction"));
        assert!(merged.role.is_none());
    }

    #[test]
    fn test_profile_sentence_article() {
        let signals = SignalSet::new()
            .with_role("HR Manager")
            .with_industry("Technology")
            .with_use_case("Employee Engagement");
        assert_eq!(
            signals.profile_sentence(),
            "Create a survey for HR Manager at Technology creating an Employee Engagement survey."
        );

        let signals = SignalSet::new().with_use_case("Market Research");
        assert_eq!(
            signals.profile_sentence(),
            "Create a survey for professional at your industry creating a Market Research survey."
        );
    }

    #[test]
    fn test_profile_sentence_treats_whitespace_as_blank() {
        let signals = SignalSet::new()
            .with_role("  ")
            .with_industry("")
            .with_use_case("Event Feedback");
        assert_eq!(
            signals.profile_sentence(),
            "Create a survey for professional at your industry creating an Event Feedback survey."
        );
    }

    #[test]
    fn test_resolved_map_has_all_keys() {
        let map = SignalSet::new().resolve().to_map();
        assert_eq!(map.len(), 4);
        assert_eq!(map["use_case"], DEFAULT_USE_CASE);
    }
}
