use crate::types::{AiMeta, Annotation, Dependencies};

/// Render an annotation as a `/** @mm:... */` block that the
/// structured-comment pass parses back to the same fields.
///
/// Multi-line values are folded onto one line.
pub fn render_comment_block(annotation: &Annotation) -> String {
    let mut lines = Vec::new();
    let mut push = |key: &str, value: &str| {
        let value = value.split_whitespace().collect::<Vec<_>>().join(" ");
        lines.push(format!(" * @mm:{key}={value}"));
    };

    if let Some(id) = &annotation.id {
        push("id", id);
    }
    if let Some(name) = &annotation.name {
        push("name", name);
    }
    if let Some(desc) = &annotation.desc {
        push("desc", desc);
    }
    if !annotation.tags.is_empty() {
        push("tags", &annotation.tags.join(", "));
    }
    match &annotation.deps {
        Some(Dependencies::Flat(targets)) if !targets.is_empty() => {
            push("deps", &targets.join(", "));
        }
        Some(Dependencies::Classified(buckets)) if !buckets.is_empty() => {
            let entries: Vec<String> = buckets
                .iter()
                .map(|(class, target)| format!("{}:{target}", class.as_str()))
                .collect();
            push("deps", &entries.join(", "));
        }
        _ => {}
    }
    match &annotation.ai {
        Some(AiMeta::Text(text)) => push("ai", text),
        Some(AiMeta::Structured(details)) => {
            if let Some(summary) = &details.summary {
                push("ai", &format!("summary:{summary}"));
            }
            if let Some(usage) = &details.usage {
                push("ai", &format!("usage:{usage}"));
            }
            for example in &details.examples {
                push("ai", &format!("example:{example}"));
            }
        }
        None => {}
    }
    if let Some(visibility) = annotation.visibility {
        push("visibility", visibility.as_str());
    }
    if let Some(version) = &annotation.version {
        push("version", version);
    }
    if let Some(phase) = annotation.phase {
        push("phase", &phase.to_string());
    }
    if let Some(status) = annotation.status {
        push("status", status.as_str());
    }

    format!("/**\n{}\n */", lines.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DependencyBuckets, DependencyClass, Status};
    use crate::Extractor;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_render_reparses_to_same_fields() {
        let mut buckets = DependencyBuckets::default();
        buckets.push(DependencyClass::Runtime, "http");
        buckets.push(DependencyClass::Optional, "cache");
        let annotation = Annotation {
            id: Some("api-client".into()),
            desc: Some("Talks to the\n   backend".into()),
            tags: vec!["net".into(), "api".into()],
            deps: Some(Dependencies::Classified(buckets)),
            phase: Some(2),
            status: Some(Status::Experimental),
            version: Some("1.2.0".into()),
            ..Default::default()
        };

        let block = render_comment_block(&annotation);
        let text = format!("{block}\nexport class ApiClient {{}}\n");
        let extraction = Extractor::default().extract_str(&text, "api.ts");
        assert_eq!(extraction.records.len(), 1);

        let parsed = &extraction.records[0].annotation;
        assert_eq!(parsed.id, annotation.id);
        assert_eq!(parsed.desc.as_deref(), Some("Talks to the backend"));
        assert_eq!(parsed.tags, annotation.tags);
        assert_eq!(parsed.dependency_buckets(), annotation.dependency_buckets());
        assert_eq!(parsed.phase, Some(2));
        assert_eq!(parsed.status, Some(Status::Experimental));
        assert_eq!(parsed.version.as_deref(), Some("1.2.0"));
    }
}
