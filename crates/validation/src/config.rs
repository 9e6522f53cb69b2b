use crate::error::{Result, ValidationError};
use metamark_extractor::AnnotationField;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Built-in validation rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Rule {
    IdUniqueness,
    DepsMustExist,
    NoCircularRuntimeDeps,
    RequiredFieldsPresent,
    VisibilityConsistency,
}

impl Rule {
    pub const ALL: [Self; 5] = [
        Self::IdUniqueness,
        Self::DepsMustExist,
        Self::NoCircularRuntimeDeps,
        Self::RequiredFieldsPresent,
        Self::VisibilityConsistency,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::IdUniqueness => "id-uniqueness",
            Self::DepsMustExist => "deps-must-exist",
            Self::NoCircularRuntimeDeps => "no-circular-runtime-deps",
            Self::RequiredFieldsPresent => "required-fields-present",
            Self::VisibilityConsistency => "visibility-consistency",
        }
    }
}

impl FromStr for Rule {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|rule| rule.as_str() == s.trim())
            .ok_or_else(|| ValidationError::UnknownRule(s.to_string()))
    }
}

/// How dependency targets are matched against declared ids
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TargetMatching {
    /// Target must equal an id
    Exact,
    /// Also accept a target whose last path segment, minus extension,
    /// equals an id (`../utils/format.js` resolves `format`)
    #[default]
    FinalSegment,
}

/// Validation settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Rules to run
    pub rules: Vec<Rule>,

    /// Rules whose errors are reported as warnings
    pub warn_only: Vec<Rule>,

    /// Fields checked by `required-fields-present`
    pub required_fields: Vec<AnnotationField>,

    /// Keep warnings in the report
    pub include_warnings: bool,

    pub target_matching: TargetMatching,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            rules: Rule::ALL.to_vec(),
            warn_only: Vec::new(),
            required_fields: vec![AnnotationField::Id, AnnotationField::Desc],
            include_warnings: true,
            target_matching: TargetMatching::FinalSegment,
        }
    }
}

impl ValidationConfig {
    /// Every rule downgraded to warnings
    pub fn lenient() -> Self {
        Self {
            warn_only: Rule::ALL.to_vec(),
            ..Default::default()
        }
    }

    /// Errors only, exact id matching
    pub fn strict() -> Self {
        Self {
            include_warnings: false,
            target_matching: TargetMatching::Exact,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.rules.is_empty() {
            return Err(ValidationError::invalid_config("at least one rule must be enabled"));
        }

        if self.rules.contains(&Rule::RequiredFieldsPresent) && self.required_fields.is_empty() {
            return Err(ValidationError::invalid_config(
                "required_fields must not be empty while required-fields-present is enabled",
            ));
        }

        Ok(())
    }

    #[must_use]
    pub fn is_warn_only(&self, rule: &str) -> bool {
        self.warn_only.iter().any(|r| r.as_str() == rule)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_config() {
        let config = ValidationConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.rules.len(), 5);
        assert_eq!(config.target_matching, TargetMatching::FinalSegment);
    }

    #[test]
    fn test_empty_rules_rejected() {
        let config = ValidationConfig {
            rules: Vec::new(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_parse_from_toml() {
        let config: ValidationConfig = toml::from_str(
            r#"
            rules = ["id-uniqueness", "deps-must-exist"]
            warn_only = ["deps-must-exist"]
            required_fields = ["id", "desc", "status"]
            target_matching = "exact"
            "#,
        )
        .unwrap();
        assert_eq!(config.rules, vec![Rule::IdUniqueness, Rule::DepsMustExist]);
        assert!(config.is_warn_only("deps-must-exist"));
        assert_eq!(config.required_fields.len(), 3);
        assert_eq!(config.target_matching, TargetMatching::Exact);
        assert!(config.include_warnings);
    }

    #[test]
    fn test_rule_from_str() {
        assert_eq!(
            "visibility-consistency".parse::<Rule>().unwrap(),
            Rule::VisibilityConsistency
        );
        assert!("no-such-rule".parse::<Rule>().is_err());
    }
}
