use crate::suggest::{normalize, suggest_annotation, Suggestion};
use metamark_extractor::is_source_path;
use metamark_graph::Database;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Advisory result of the pre-commit check; never blocks a commit
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrecommitReport {
    /// Source files that were checked
    pub checked: usize,
    /// Source files with no compiled annotation, with a proposed block each
    pub unannotated: Vec<Suggestion>,
}

impl PrecommitReport {
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.unannotated.is_empty()
    }
}

/// Report candidate source files that have no entry in `db`
pub fn precommit_check<S: AsRef<str>>(paths: &[S], db: &Database) -> PrecommitReport {
    let annotated: HashSet<&str> = db
        .iter()
        .filter_map(|entry| entry.file_path.as_deref())
        .collect();

    let mut report = PrecommitReport::default();
    for path in paths.iter().map(AsRef::as_ref) {
        if !is_source_path(path) {
            continue;
        }
        report.checked += 1;
        if !annotated.contains(normalize(path).as_str()) {
            report.unannotated.push(suggest_annotation(path, db));
        }
    }

    if !report.is_clean() {
        log::info!(
            "{} of {} staged source files have no annotation",
            report.unannotated.len(),
            report.checked
        );
    }
    report
}
