use crate::error::Result;
use crate::types::{CompiledEntry, Database};
use metamark_extractor::{AnnotationField, DependencyClass, Visibility};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::fmt::Write as _;

const DEFAULT_LLM_FIELDS: [AnnotationField; 6] = [
    AnnotationField::Id,
    AnnotationField::Desc,
    AnnotationField::Tags,
    AnnotationField::Deps,
    AnnotationField::Ai,
    AnnotationField::Status,
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmExportMode {
    /// One line per entry
    #[default]
    Compact,
    /// JSON array of entry objects
    Full,
}

/// Options for [`Database::export_for_llm`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LlmExportOptions {
    /// Id prefix, tag or file-path substring
    pub scope: Option<String>,
    /// Fields to include; defaults to id, desc, tags, deps, ai, status
    pub fields: Option<Vec<AnnotationField>>,
    pub limit: Option<usize>,
    pub mode: LlmExportMode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GraphFormat {
    Json,
    Dot,
}

impl Database {
    /// Render selected entries for a language model prompt
    pub fn export_for_llm(&self, options: &LlmExportOptions) -> Result<String> {
        let fields = options.fields.as_deref().unwrap_or(&DEFAULT_LLM_FIELDS);
        let selected: Vec<&CompiledEntry> = self
            .iter()
            .filter(|entry| {
                options
                    .scope
                    .as_deref()
                    .map_or(true, |scope| in_scope(entry, scope))
            })
            .take(options.limit.unwrap_or(usize::MAX))
            .collect();

        log::debug!("Exporting {} entries for LLM", selected.len());

        match options.mode {
            LlmExportMode::Compact => Ok(selected
                .iter()
                .map(|entry| compact_line(entry, fields))
                .collect::<Vec<_>>()
                .join("\n")),
            LlmExportMode::Full => {
                let values = selected
                    .iter()
                    .map(|entry| entry_fields(entry, fields))
                    .collect::<Result<Vec<Value>>>()?;
                Ok(serde_json::to_string_pretty(&values)?)
            }
        }
    }

    /// Render the dependency graph, optionally limited to one edge class
    pub fn export_graph(&self, format: GraphFormat, class: Option<DependencyClass>) -> Result<String> {
        let edges: Vec<_> = self
            .graph
            .edges
            .iter()
            .filter(|edge| class.map_or(true, |c| edge.class == c))
            .collect();

        match format {
            GraphFormat::Json => {
                let value = json!({
                    "nodes": self.ids,
                    "edges": edges,
                });
                Ok(serde_json::to_string_pretty(&value)?)
            }
            GraphFormat::Dot => {
                let mut dot = String::from("digraph metamark {\n    rankdir=LR;\n");
                for entry in self.iter() {
                    let shape = match entry.effective_visibility() {
                        Visibility::Public => "box",
                        Visibility::Internal => "ellipse",
                    };
                    let _ = writeln!(dot, "    {} [shape={shape}];", quote(&entry.id));
                }
                for edge in edges {
                    let style = match edge.class {
                        DependencyClass::Runtime => "solid",
                        DependencyClass::Build => "dashed",
                        DependencyClass::Optional => "dotted",
                    };
                    let _ = writeln!(
                        dot,
                        "    {} -> {} [style={style}];",
                        quote(&edge.from),
                        quote(&edge.to)
                    );
                }
                dot.push('}');
                Ok(dot)
            }
        }
    }
}

fn in_scope(entry: &CompiledEntry, scope: &str) -> bool {
    entry.id.starts_with(scope)
        || entry.tags.iter().any(|tag| tag == scope)
        || entry
            .file_path
            .as_deref()
            .is_some_and(|path| path.contains(scope))
}

fn quote(id: &str) -> String {
    format!("\"{}\"", id.replace('"', "\\\""))
}

fn compact_line(entry: &CompiledEntry, fields: &[AnnotationField]) -> String {
    let mut parts = Vec::new();
    for field in fields {
        let part = match field {
            AnnotationField::Id => continue,
            AnnotationField::Name => entry.name.clone(),
            AnnotationField::Desc => entry.desc.clone(),
            AnnotationField::Tags => {
                (!entry.tags.is_empty()).then(|| format!("tags: {}", entry.tags.join(", ")))
            }
            AnnotationField::Deps => entry.deps.as_ref().filter(|d| !d.is_empty()).map(|deps| {
                let targets: Vec<String> = deps
                    .iter()
                    .map(|(class, target)| match class {
                        DependencyClass::Runtime => target.to_string(),
                        other => format!("{}:{target}", other.as_str()),
                    })
                    .collect();
                format!("deps: {}", targets.join(", "))
            }),
            AnnotationField::Ai => entry
                .ai
                .as_ref()
                .and_then(|ai| ai.summary())
                .map(|summary| format!("ai: {summary}")),
            AnnotationField::Visibility => entry
                .visibility
                .map(|v| format!("visibility: {}", v.as_str())),
            AnnotationField::Version => entry.version.as_ref().map(|v| format!("version: {v}")),
            AnnotationField::Phase => entry.phase.map(|p| format!("phase: {p}")),
            AnnotationField::Status => entry.status.map(|s| format!("status: {}", s.as_str())),
        };
        parts.extend(part);
    }

    if parts.is_empty() {
        entry.id.clone()
    } else {
        format!("{}: {}", entry.id, parts.join(" | "))
    }
}

/// JSON object with only the requested fields
fn entry_fields(entry: &CompiledEntry, fields: &[AnnotationField]) -> Result<Value> {
    let mut object = Map::new();
    object.insert("id".into(), Value::String(entry.id.clone()));
    let full = serde_json::to_value(entry)?;
    for field in fields {
        if let Some(value) = full.get(field.as_str()) {
            object.insert(field.as_str().into(), value.clone());
        }
    }
    Ok(Value::Object(object))
}
