use metamark_extractor::{render_comment_block, Annotation, Status};
use metamark_graph::Database;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Directory keyword → tag
const DIRECTORY_TAGS: &[(&str, &str)] = &[
    ("components", "ui"),
    ("ui", "ui"),
    ("api", "api"),
    ("server", "server"),
    ("utils", "utility"),
    ("lib", "utility"),
    ("hooks", "hooks"),
    ("services", "service"),
    ("store", "state"),
    ("state", "state"),
    ("tests", "test"),
    ("core", "core"),
    ("render", "rendering"),
    ("graphics", "rendering"),
    ("net", "network"),
    ("network", "network"),
];

/// Draft annotation proposed for an unannotated file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Suggestion {
    pub file_path: String,
    pub annotation: Annotation,
    /// Ready-to-paste comment block
    pub block: String,
}

/// Propose a draft annotation for `path`.
///
/// Phase is copied from an existing entry in the same directory.
pub fn suggest_annotation(path: &str, db: &Database) -> Suggestion {
    let normalized = normalize(path);
    let file = Path::new(&normalized);
    let stem = file
        .file_stem()
        .map(|stem| stem.to_string_lossy().to_string())
        .unwrap_or_default();
    let id = sanitize_id(&stem);

    let mut tags: Vec<String> = Vec::new();
    if let Some(parent) = file.parent() {
        for component in parent.components() {
            let name = component.as_os_str().to_string_lossy().to_ascii_lowercase();
            for (keyword, tag) in DIRECTORY_TAGS {
                if name == *keyword && !tags.iter().any(|t| t == tag) {
                    tags.push((*tag).to_string());
                }
            }
        }
    }

    let parent = file.parent();
    let phase = db
        .iter()
        .filter(|entry| {
            entry
                .file_path
                .as_deref()
                .is_some_and(|sibling| Path::new(sibling).parent() == parent)
        })
        .find_map(|entry| entry.phase);

    let annotation = Annotation {
        desc: Some(format!("Describe what {id} does")),
        id: Some(id),
        tags,
        phase,
        status: Some(Status::Draft),
        ..Default::default()
    };
    let block = render_comment_block(&annotation);

    Suggestion {
        file_path: normalized,
        annotation,
        block,
    }
}

/// Forward slashes, no leading `./`
pub(crate) fn normalize(path: &str) -> String {
    let path = path.replace('\\', "/");
    match path.strip_prefix("./") {
        Some(rest) => rest.to_string(),
        None => path,
    }
}

/// Lowercase kebab-case id from a file stem (`SaveButton` → `save-button`)
fn sanitize_id(stem: &str) -> String {
    let mut id = String::with_capacity(stem.len() + 4);
    let mut prev_lower = false;
    for c in stem.chars() {
        if c.is_ascii_alphanumeric() {
            if c.is_ascii_uppercase() && prev_lower {
                id.push('-');
            }
            id.push(c.to_ascii_lowercase());
            prev_lower = c.is_ascii_lowercase() || c.is_ascii_digit();
        } else {
            if !id.is_empty() && !id.ends_with('-') {
                id.push('-');
            }
            prev_lower = false;
        }
    }
    let id = id.trim_end_matches('-').to_string();
    if id.is_empty() {
        "unnamed".to_string()
    } else {
        id
    }
}
