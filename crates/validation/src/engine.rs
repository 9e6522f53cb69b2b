use crate::config::ValidationConfig;
use crate::error::Result;
use crate::rules::{rule_for, RuleContext, ValidationRule};
use metamark_extractor::FileExtraction;
use metamark_graph::{Report, Severity};

/// Runs the configured rules over an extracted corpus
pub struct ValidationEngine {
    config: ValidationConfig,
    rules: Vec<Box<dyn ValidationRule>>,
}

impl ValidationEngine {
    pub fn new(config: ValidationConfig) -> Result<Self> {
        config.validate()?;
        let rules = config.rules.iter().map(|rule| rule_for(*rule)).collect();
        Ok(Self { config, rules })
    }

    #[must_use]
    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }

    /// Validate every record of `corpus`. Violations are data; this never fails.
    pub fn validate(&self, corpus: &[FileExtraction]) -> Report {
        let records = corpus.iter().flat_map(|file| file.records.iter()).collect();
        let ctx = RuleContext::new(records, &self.config);

        let mut issues = Vec::new();
        for rule in &self.rules {
            let found = rule.check(&ctx);
            log::debug!("{}: {} issue(s)", rule.rule().as_str(), found.len());
            issues.extend(found);
        }

        for issue in &mut issues {
            if issue.severity == Severity::Error && self.config.is_warn_only(&issue.rule) {
                issue.severity = Severity::Warning;
            }
        }
        if !self.config.include_warnings {
            issues.retain(|issue| issue.severity == Severity::Error);
        }

        let report = Report::from_issues(issues);
        log::info!(
            "Validation {}: {} errors, {} warnings",
            if report.passed { "passed" } else { "failed" },
            report.errors.len(),
            report.warnings.len()
        );
        report
    }
}

impl Default for ValidationEngine {
    fn default() -> Self {
        let config = ValidationConfig::default();
        let rules = config.rules.iter().map(|rule| rule_for(*rule)).collect();
        Self { config, rules }
    }
}
