use crate::config::TargetMatching;
use metamark_extractor::AnnotationRecord;
use std::collections::HashMap;

/// Maps dependency targets back to declaring records
pub(crate) struct TargetResolver<'a> {
    by_id: HashMap<&'a str, &'a AnnotationRecord>,
    matching: TargetMatching,
}

impl<'a> TargetResolver<'a> {
    /// First declaration of each id wins
    pub fn new(records: &[&'a AnnotationRecord], matching: TargetMatching) -> Self {
        let mut by_id = HashMap::new();
        for record in records {
            if let Some(id) = record.id() {
                by_id.entry(id).or_insert(*record);
            }
        }
        Self { by_id, matching }
    }

    /// Record a target refers to, if any
    pub fn resolve(&self, target: &str) -> Option<&'a AnnotationRecord> {
        if let Some(record) = self.by_id.get(target) {
            return Some(*record);
        }
        match self.matching {
            TargetMatching::Exact => None,
            TargetMatching::FinalSegment => {
                let segment = final_segment(target);
                let stem = is_path_shaped(target).then(|| file_stem(segment));
                self.by_id
                    .get(segment)
                    .or_else(|| stem.and_then(|stem| self.by_id.get(stem)))
                    .copied()
            }
        }
    }
}

/// Last path segment of a target
pub(crate) fn final_segment(target: &str) -> &str {
    target.rsplit(['/', '\\']).next().unwrap_or(target)
}

/// Segment with its extension removed
pub(crate) fn file_stem(segment: &str) -> &str {
    match segment.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => segment,
    }
}

/// Targets that look like file paths rather than ids
pub(crate) fn is_path_shaped(target: &str) -> bool {
    target.contains('/') || target.contains('\\') || target.starts_with('.')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_final_segment() {
        assert_eq!(final_segment("../utils/format.js"), "format.js");
        assert_eq!(final_segment("lib\\parser.rs"), "parser.rs");
        assert_eq!(final_segment("plain-id"), "plain-id");
        assert_eq!(file_stem("format.js"), "format");
        assert_eq!(file_stem(".env"), ".env");
    }

    #[test]
    fn test_path_shaped() {
        assert!(is_path_shaped("./helpers"));
        assert!(is_path_shaped("src/a.ts"));
        assert!(!is_path_shaped("auth.session"));
    }
}
