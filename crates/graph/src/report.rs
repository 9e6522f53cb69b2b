use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

impl Severity {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
        }
    }
}

/// One finding from a validation pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    pub rule: String,
    pub severity: Severity,
    pub message: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotation_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
}

impl Issue {
    pub fn error(rule: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(rule, Severity::Error, message)
    }

    pub fn warning(rule: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(rule, Severity::Warning, message)
    }

    fn new(rule: impl Into<String>, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            rule: rule.into(),
            severity,
            message: message.into(),
            annotation_id: None,
            file_path: None,
            line: None,
        }
    }

    #[must_use]
    pub fn with_annotation(mut self, id: impl Into<String>) -> Self {
        self.annotation_id = Some(id.into());
        self
    }

    /// Attach a source location
    #[must_use]
    pub fn at(mut self, file_path: impl Into<String>, line: Option<usize>) -> Self {
        self.file_path = Some(file_path.into());
        self.line = line;
        self
    }
}

/// Outcome of a validation pass; passes when there are no errors
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub errors: Vec<Issue>,
    pub warnings: Vec<Issue>,
    pub passed: bool,
}

impl Report {
    /// Partition issues by severity, keeping their relative order
    pub fn from_issues(issues: impl IntoIterator<Item = Issue>) -> Self {
        let (errors, warnings): (Vec<_>, Vec<_>) = issues
            .into_iter()
            .partition(|issue| issue.severity == Severity::Error);
        Self {
            passed: errors.is_empty(),
            errors,
            warnings,
        }
    }

    #[must_use]
    pub fn issue_count(&self) -> usize {
        self.errors.len() + self.warnings.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_passes_with_only_warnings() {
        let report = Report::from_issues([
            Issue::warning("missing-description", "no desc").with_annotation("a"),
            Issue::warning("unresolved-dependency", "ghost"),
        ]);
        assert!(report.passed);
        assert_eq!(report.warnings.len(), 2);

        let failing = Report::from_issues([Issue::error("circular-dependency", "a -> a")]);
        assert!(!failing.passed);
        assert_eq!(failing.issue_count(), 1);
    }

    #[test]
    fn test_issue_serializes_camel_case() {
        let issue = Issue::error("id-uniqueness", "dup").at("src/a.js", Some(3));
        let json = serde_json::to_value(&issue).unwrap();
        assert_eq!(json["filePath"], "src/a.js");
        assert_eq!(json["severity"], "error");
        assert!(json.get("annotationId").is_none());
    }
}
