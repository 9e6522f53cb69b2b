//! Embedded-object pass: `__mm = { ... }` / `__mm: { ... }` literals.

use crate::config::ExtractorConfig;
use crate::entity;
use crate::fields::apply_field;
use crate::literal::{find_matching_brace, object_entries};
use crate::types::{Annotation, AnnotationRecord, ExtractWarning, Origin, Provenance};
use once_cell::sync::Lazy;
use regex::Regex;

static OBJECT_START: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"__mm\s*[:=]\s*\{").expect("object pattern is valid"));

pub(crate) fn extract(
    text: &str,
    file_path: &str,
    line_offset: usize,
    config: &ExtractorConfig,
    warnings: &mut Vec<ExtractWarning>,
) -> Vec<AnnotationRecord> {
    let starts = line_starts(text);
    let lines: Vec<&str> = text.lines().collect();
    let mut records = Vec::new();
    let mut resume = 0;

    for m in OBJECT_START.find_iter(text) {
        if m.start() < resume {
            continue;
        }

        let line_idx = line_index(&starts, m.start());
        let prefix = &text[starts[line_idx]..m.start()];
        let lead = prefix.trim_start();
        if lead.starts_with("//") || lead.starts_with('*') || lead.starts_with("/*") {
            continue;
        }

        let line = line_idx + 1 + line_offset;
        let open = m.end() - 1;
        let Some(close) = find_matching_brace(text, open) else {
            warnings.push(ExtractWarning::new(
                Some(line),
                "unterminated __mm object literal",
            ));
            continue;
        };
        resume = close;

        let mut annotation = Annotation::default();
        for (key, raw) in object_entries(&text[open + 1..close]) {
            if !apply_field(&mut annotation, &key, raw) {
                warnings.push(ExtractWarning::new(
                    Some(line),
                    format!("unknown key '{key}' in __mm object"),
                ));
            }
        }

        if annotation.is_empty() {
            warnings.push(ExtractWarning::new(
                Some(line),
                "__mm object has no recognized fields",
            ));
            continue;
        }

        let window_start = line_idx.saturating_sub(config.entity_window_lines);
        let preceding = &lines[window_start..line_idx.min(lines.len())];
        let entity = entity::entity_before(prefix, preceding, config.entity_window_lines)
            .map(str::to_string);

        records.push(AnnotationRecord {
            annotation,
            provenance: Provenance {
                origin: Origin::EmbeddedObject,
                file_path: file_path.to_string(),
                line,
                raw: text[m.start()..=close].to_string(),
                entity,
            },
        });
    }

    log::debug!("{file_path}: {} embedded-object annotation(s)", records.len());
    records
}

fn line_starts(text: &str) -> Vec<usize> {
    std::iter::once(0)
        .chain(text.match_indices('\n').map(|(idx, _)| idx + 1))
        .collect()
}

fn line_index(starts: &[usize], offset: usize) -> usize {
    match starts.binary_search(&offset) {
        Ok(idx) => idx,
        Err(idx) => idx - 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AiMeta, Visibility};
    use pretty_assertions::assert_eq;

    fn run(text: &str) -> (Vec<AnnotationRecord>, Vec<ExtractWarning>) {
        let mut warnings = Vec::new();
        let records = extract(text, "src/w.ts", 0, &ExtractorConfig::default(), &mut warnings);
        (records, warnings)
    }

    #[test]
    fn test_static_class_field() {
        let text = r#"
export class Widget {
  static __mm = {
    id: 'widget',
    desc: "Renders { braces } safely",
    tags: ['ui', 'core'],
    deps: { runtime: ['renderer'], build: ['codegen'] },
    visibility: 'internal',
    ai: { summary: 'Widget root', examples: ['new Widget()'] },
  };
}
"#;
        let (records, warnings) = run(text);
        assert!(warnings.is_empty(), "{warnings:?}");
        assert_eq!(records.len(), 1);

        let record = &records[0];
        assert_eq!(record.id(), Some("widget"));
        assert_eq!(record.entity(), Some("Widget"));
        assert_eq!(record.provenance.line, 3);
        assert_eq!(
            record.annotation.desc.as_deref(),
            Some("Renders { braces } safely")
        );
        assert_eq!(record.annotation.tags, vec!["ui", "core"]);
        assert_eq!(record.annotation.visibility, Some(Visibility::Internal));
        let buckets = record.annotation.dependency_buckets();
        assert_eq!(buckets.runtime, vec!["renderer"]);
        assert_eq!(buckets.build, vec!["codegen"]);
        assert!(matches!(record.annotation.ai, Some(AiMeta::Structured(_))));
    }

    #[test]
    fn test_owner_assignment() {
        let text = "function load() {}\nload.__mm = { id: 'load', phase: 2 };\n";
        let (records, _) = run(text);
        assert_eq!(records[0].entity(), Some("load"));
        assert_eq!(records[0].annotation.phase, Some(2));
    }

    #[test]
    fn test_unterminated_object_warns() {
        let (records, warnings) = run("const x = { __mm: { id: 'a', tags: ['x'\n");
        assert!(records.is_empty());
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].message.contains("unterminated"));
    }

    #[test]
    fn test_commented_out_object_is_ignored() {
        let (records, warnings) = run("// static __mm = { id: 'old' }\n");
        assert!(records.is_empty());
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_unknown_keys_and_empty_objects_warn() {
        let (records, warnings) = run("a.__mm = { owner: 'x' };\nb.__mm = { id: 'b', owner: 'y' };\n");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id(), Some("b"));
        assert_eq!(warnings.len(), 3);
    }
}
