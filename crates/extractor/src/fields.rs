use crate::literal::{scalar_text, Literal};
use crate::types::{
    AiDetails, AiMeta, Annotation, AnnotationField, Dependencies, DependencyBuckets,
    DependencyClass, Status, Visibility,
};

/// Apply one `key = value` pair to an annotation.
///
/// `raw` is the value's source text. Plain-text fields keep it verbatim after
/// quote stripping; structured fields parse it as a literal.
///
/// Returns `false` when the key is not an annotation field. Values that fail
/// their field's parse (bad enum, bad integer) are dropped silently.
pub(crate) fn apply_field(annotation: &mut Annotation, key: &str, raw: &str) -> bool {
    let Some(field) = AnnotationField::parse(key) else {
        return false;
    };

    let value = &Literal::parse(raw);
    match field {
        AnnotationField::Id => annotation.id = non_empty(scalar_text(raw)),
        AnnotationField::Name => annotation.name = non_empty(scalar_text(raw)),
        AnnotationField::Desc => annotation.desc = non_empty(scalar_text(raw)),
        AnnotationField::Version => annotation.version = non_empty(scalar_text(raw)),
        AnnotationField::Tags => {
            for tag in value.as_list() {
                if !annotation.tags.contains(&tag) {
                    annotation.tags.push(tag);
                }
            }
        }
        AnnotationField::Deps => {
            if let Some(deps) = parse_dependencies(value) {
                annotation.deps = Some(match annotation.deps.take() {
                    Some(existing) => existing.extend(deps),
                    None => deps,
                });
            }
        }
        AnnotationField::Ai => apply_ai(annotation, value),
        AnnotationField::Visibility => match Visibility::parse(&value.as_text()) {
            Some(visibility) => annotation.visibility = Some(visibility),
            None => log::debug!("dropping invalid visibility {:?}", value.as_text()),
        },
        AnnotationField::Status => match Status::parse(&value.as_text()) {
            Some(status) => annotation.status = Some(status),
            None => log::debug!("dropping invalid status {:?}", value.as_text()),
        },
        AnnotationField::Phase => match value.as_text().trim().parse::<i64>() {
            Ok(phase) => annotation.phase = Some(phase),
            Err(_) => log::debug!("dropping unparsable phase {:?}", value.as_text()),
        },
    }

    true
}

fn non_empty(text: String) -> Option<String> {
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Flat list, `class:target` entries, or `{ runtime: [...], build: [...] }`
fn parse_dependencies(value: &Literal) -> Option<Dependencies> {
    if let Literal::Object(pairs) = value {
        let mut buckets = DependencyBuckets::default();
        for (key, targets) in pairs {
            let class = DependencyClass::parse(key).unwrap_or(DependencyClass::Runtime);
            for target in targets.as_list() {
                buckets.push(class, target);
            }
        }
        return (!buckets.is_empty()).then_some(Dependencies::Classified(buckets));
    }

    let entries = value.as_list();
    if entries.is_empty() {
        return None;
    }

    if !entries.iter().any(|entry| class_prefix(entry).is_some()) {
        return Some(Dependencies::Flat(entries));
    }

    let mut buckets = DependencyBuckets::default();
    for entry in &entries {
        match class_prefix(entry) {
            Some((prefix, target)) => {
                let class = DependencyClass::parse(prefix).unwrap_or_else(|| {
                    log::debug!("unknown dependency class {prefix:?}, treating as runtime");
                    DependencyClass::Runtime
                });
                buckets.push(class, target);
            }
            None => buckets.push(DependencyClass::Runtime, entry.as_str()),
        }
    }
    Some(Dependencies::Classified(buckets))
}

/// `word:rest` where `word` is a plain identifier and `rest` is non-empty
fn class_prefix(entry: &str) -> Option<(&str, &str)> {
    let (prefix, rest) = entry.split_once(':')?;
    let prefix = prefix.trim();
    let rest = rest.trim();
    let plain = !prefix.is_empty()
        && prefix
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    (plain && !rest.is_empty()).then_some((prefix, rest))
}

fn apply_ai(annotation: &mut Annotation, value: &Literal) {
    if let Literal::Object(pairs) = value {
        let mut details = match annotation.ai.take() {
            Some(AiMeta::Structured(existing)) => existing,
            _ => AiDetails::default(),
        };
        for (key, item) in pairs {
            match key.as_str() {
                "summary" => details.summary = non_empty(item.as_text()),
                "usage" => details.usage = non_empty(item.as_text()),
                "examples" | "example" => details.examples.extend(item.as_list()),
                other => log::debug!("ignoring ai key {other:?}"),
            }
        }
        annotation.ai = Some(AiMeta::Structured(details));
        return;
    }

    let text = value.as_text();
    let text = text.trim();
    if text.is_empty() {
        return;
    }

    if let Some((prefix, rest)) = class_prefix(text) {
        let slot = match prefix.to_ascii_lowercase().as_str() {
            "summary" => Some(AiSlot::Summary),
            "usage" => Some(AiSlot::Usage),
            "example" | "examples" => Some(AiSlot::Example),
            _ => None,
        };
        if let Some(slot) = slot {
            let mut details = match annotation.ai.take() {
                Some(AiMeta::Structured(existing)) => existing,
                _ => AiDetails::default(),
            };
            let rest = rest.to_string();
            match slot {
                AiSlot::Summary => details.summary = Some(rest),
                AiSlot::Usage => details.usage = Some(rest),
                AiSlot::Example => details.examples.push(rest),
            }
            annotation.ai = Some(AiMeta::Structured(details));
            return;
        }
    }

    // A bare value never replaces structured hints
    if !matches!(annotation.ai, Some(AiMeta::Structured(_))) {
        annotation.ai = Some(AiMeta::Text(text.to_string()));
    }
}

enum AiSlot {
    Summary,
    Usage,
    Example,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn apply(annotation: &mut Annotation, key: &str, raw: &str) -> bool {
        apply_field(annotation, key, raw)
    }

    #[test]
    fn test_unknown_key_is_reported() {
        let mut annotation = Annotation::default();
        assert!(!apply(&mut annotation, "owner", "team-a"));
        assert!(annotation.is_empty());
    }

    #[test]
    fn test_invalid_enum_and_phase_are_dropped() {
        let mut annotation = Annotation::default();
        assert!(apply(&mut annotation, "visibility", "secret"));
        assert!(apply(&mut annotation, "status", "wip"));
        assert!(apply(&mut annotation, "phase", "two"));
        assert!(annotation.is_empty());

        apply(&mut annotation, "phase", " 3 ");
        apply(&mut annotation, "status", "'stable'");
        assert_eq!(annotation.phase, Some(3));
        assert_eq!(annotation.status, Some(Status::Stable));
    }

    #[test]
    fn test_plain_text_fields_keep_brackets_and_braces() {
        let mut annotation = Annotation::default();
        apply(&mut annotation, "desc", "{@link Widget}");
        apply(&mut annotation, "version", "'[1.0]'");
        apply(&mut annotation, "name", "[beta]");
        apply(&mut annotation, "id", "\"core.widget\"");
        assert_eq!(annotation.desc.as_deref(), Some("{@link Widget}"));
        assert_eq!(annotation.version.as_deref(), Some("[1.0]"));
        assert_eq!(annotation.name.as_deref(), Some("[beta]"));
        assert_eq!(annotation.id.as_deref(), Some("core.widget"));
    }

    #[test]
    fn test_tags_bracket_wrapped_or_plain() {
        let mut annotation = Annotation::default();
        apply(&mut annotation, "tags", "[core, ui]");
        apply(&mut annotation, "tags", "ui, net");
        assert_eq!(annotation.tags, vec!["core", "ui", "net"]);
    }

    #[test]
    fn test_flat_dependencies() {
        let mut annotation = Annotation::default();
        apply(&mut annotation, "deps", "a, b");
        assert_eq!(
            annotation.deps,
            Some(Dependencies::Flat(vec!["a".into(), "b".into()]))
        );
    }

    #[test]
    fn test_classified_dependencies_with_unknown_prefix() {
        let mut annotation = Annotation::default();
        apply(&mut annotation, "deps", "runtime:a, build:b, dev:c, d");
        let buckets = annotation.dependency_buckets();
        assert_eq!(buckets.runtime, vec!["a", "c", "d"]);
        assert_eq!(buckets.build, vec!["b"]);
        assert!(buckets.optional.is_empty());
    }

    #[test]
    fn test_object_dependencies() {
        let mut annotation = Annotation::default();
        apply(
            &mut annotation,
            "deps",
            "{ runtime: ['a'], optional: ['telemetry'] }",
        );
        let buckets = annotation.dependency_buckets();
        assert_eq!(buckets.runtime, vec!["a"]);
        assert_eq!(buckets.optional, vec!["telemetry"]);
    }

    #[test]
    fn test_ai_summary_prefix_builds_structured_value() {
        let mut annotation = Annotation::default();
        apply(&mut annotation, "ai", "summary: Parses configs");
        apply(&mut annotation, "ai", "usage: call load()");
        apply(&mut annotation, "ai", "plain text afterwards");

        let Some(AiMeta::Structured(details)) = &annotation.ai else {
            panic!("expected structured ai, got {:?}", annotation.ai);
        };
        assert_eq!(details.summary.as_deref(), Some("Parses configs"));
        assert_eq!(details.usage.as_deref(), Some("call load()"));
    }

    #[test]
    fn test_ai_bare_value() {
        let mut annotation = Annotation::default();
        apply(&mut annotation, "ai", "Handles retries");
        assert_eq!(annotation.ai, Some(AiMeta::Text("Handles retries".into())));
    }
}
