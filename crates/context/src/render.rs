use crate::error::Result;
use crate::templates::{RenderFormat, Template};
use metamark_extractor::{AiMeta, AnnotationField, DependencyClass};
use metamark_graph::CompiledEntry;
use serde_json::{Map, Value};

/// Approximate token count: one token per four characters, rounded up
#[must_use]
pub fn estimate_tokens(text: &str) -> usize {
    text.chars().count().div_ceil(4)
}

/// Render the full prompt for `entries`
pub(crate) fn render_prompt(
    template: &Template,
    entries: &[&CompiledEntry],
    format: RenderFormat,
) -> Result<String> {
    let body = match format {
        RenderFormat::Structured => entries
            .iter()
            .map(|entry| structured_block(entry, template.fields))
            .collect::<Vec<_>>()
            .join("\n\n"),
        RenderFormat::Json => {
            let items = entries
                .iter()
                .map(|entry| json_item(entry, template.fields))
                .collect::<Result<Vec<_>>>()?;
            format!("```json\n{}\n```", serde_json::to_string_pretty(&items)?)
        }
        RenderFormat::Summary => entries
            .iter()
            .map(|entry| summary_line(entry))
            .collect::<Vec<_>>()
            .join("\n"),
    };

    Ok(format!(
        "{}\n\n{}\n\n{}",
        template.preamble, body, template.instruction
    ))
}

fn structured_block(entry: &CompiledEntry, fields: &[AnnotationField]) -> String {
    let mut lines = vec![format!("## {}", entry.id)];
    for field in fields {
        if *field == AnnotationField::Id {
            continue;
        }
        if let Some(value) = field_text(entry, *field) {
            lines.push(format!("- {}: {value}", field.as_str()));
        }
    }
    lines.join("\n")
}

fn summary_line(entry: &CompiledEntry) -> String {
    let text = entry
        .desc
        .as_deref()
        .or_else(|| entry.ai.as_ref().and_then(AiMeta::summary))
        .unwrap_or("(no description)");
    format!("- {}: {text}", entry.id)
}

fn json_item(entry: &CompiledEntry, fields: &[AnnotationField]) -> Result<Value> {
    let full = serde_json::to_value(entry)?;
    let mut object = Map::new();
    object.insert("id".into(), Value::String(entry.id.clone()));
    for field in fields {
        if let Some(value) = full.get(field.as_str()) {
            object.insert(field.as_str().into(), value.clone());
        }
    }
    Ok(Value::Object(object))
}

fn field_text(entry: &CompiledEntry, field: AnnotationField) -> Option<String> {
    match field {
        AnnotationField::Id => Some(entry.id.clone()),
        AnnotationField::Name => entry.name.clone(),
        AnnotationField::Desc => entry.desc.clone(),
        AnnotationField::Tags => (!entry.tags.is_empty()).then(|| entry.tags.join(", ")),
        AnnotationField::Deps => {
            let parts: Vec<String> = DependencyClass::ALL
                .into_iter()
                .filter_map(|class| {
                    let targets = entry.deps_of(class);
                    (!targets.is_empty())
                        .then(|| format!("{} [{}]", class.as_str(), targets.join(", ")))
                })
                .collect();
            (!parts.is_empty()).then(|| parts.join("; "))
        }
        AnnotationField::Ai => entry.ai.as_ref().map(|ai| match ai {
            AiMeta::Text(text) => text.clone(),
            AiMeta::Structured(details) => {
                let mut parts = Vec::new();
                if let Some(summary) = &details.summary {
                    parts.push(summary.clone());
                }
                if let Some(usage) = &details.usage {
                    parts.push(format!("usage: {usage}"));
                }
                for example in &details.examples {
                    parts.push(format!("example: {example}"));
                }
                parts.join("; ")
            }
        }),
        AnnotationField::Visibility => Some(entry.effective_visibility().as_str().to_string()),
        AnnotationField::Version => entry.version.clone(),
        AnnotationField::Phase => entry.phase.map(|phase| phase.to_string()),
        AnnotationField::Status => entry.status.map(|status| status.as_str().to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_estimate_rounds_up() {
        assert_eq!(estimate_tokens(""), 0);
        assert_eq!(estimate_tokens("abc"), 1);
        assert_eq!(estimate_tokens("abcd"), 1);
        assert_eq!(estimate_tokens("abcde"), 2);
        assert_eq!(estimate_tokens("ééééé"), 2);
    }
}
