use crate::error::Result;
use metamark_extractor::{
    AiMeta, Annotation, AnnotationRecord, Dependencies, DependencyBuckets, DependencyClass, Origin,
    Status, Visibility,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One compiled annotation, keyed by its id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompiledEntry {
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,

    /// Normalized dependencies; `None` when nothing was declared
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deps: Option<DependencyBuckets>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai: Option<AiMeta>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<Visibility>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,

    /// Path relative to the project root
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<Origin>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity: Option<String>,
}

impl CompiledEntry {
    /// Convert an id-bearing record; `None` for records without an id
    pub fn from_record(record: AnnotationRecord, file_path: String) -> Option<Self> {
        let AnnotationRecord {
            annotation,
            provenance,
        } = record;
        let id = annotation.id?;
        let deps = annotation
            .deps
            .map(|deps| deps.to_buckets())
            .filter(|buckets| !buckets.is_empty());

        Some(Self {
            id,
            name: annotation.name,
            desc: annotation.desc,
            tags: annotation.tags,
            deps,
            ai: annotation.ai,
            visibility: annotation.visibility,
            version: annotation.version,
            phase: annotation.phase,
            status: annotation.status,
            file_path: Some(file_path),
            line: Some(provenance.line),
            origin: Some(provenance.origin),
            entity: provenance.entity,
        })
    }

    /// Annotation fields of this entry, without provenance
    #[must_use]
    pub fn to_annotation(&self) -> Annotation {
        Annotation {
            id: Some(self.id.clone()),
            name: self.name.clone(),
            desc: self.desc.clone(),
            tags: self.tags.clone(),
            deps: self.deps.clone().map(Dependencies::Classified),
            ai: self.ai.clone(),
            visibility: self.visibility,
            version: self.version.clone(),
            phase: self.phase,
            status: self.status,
        }
    }

    #[must_use]
    pub fn effective_visibility(&self) -> Visibility {
        self.visibility.unwrap_or_default()
    }

    #[must_use]
    pub fn is_internal(&self) -> bool {
        self.effective_visibility() == Visibility::Internal
    }

    /// Targets of one dependency class
    #[must_use]
    pub fn deps_of(&self, class: DependencyClass) -> &[String] {
        self.deps.as_ref().map_or(&[][..], |deps| deps.get(class))
    }

    /// All declared targets with their class
    pub fn dependency_edges(&self) -> impl Iterator<Item = (DependencyClass, &str)> + '_ {
        self.deps.iter().flat_map(DependencyBuckets::iter)
    }
}

/// Node in the dependency graph
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    pub runtime: Vec<String>,
    pub build: Vec<String>,
    pub optional: Vec<String>,

    /// Ids with an edge pointing at this node
    pub dependents: Vec<String>,
}

/// Typed dependency edge
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub from: String,
    pub to: String,
    pub class: DependencyClass,
}

/// Dependency graph over compiled ids
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyGraph {
    pub nodes: BTreeMap<String, Node>,
    pub edges: Vec<Edge>,
}

impl DependencyGraph {
    /// Build the graph, visiting entries in `order`.
    ///
    /// Edges to unknown targets are kept but never populate `dependents`.
    pub fn build(entries: &BTreeMap<String, CompiledEntry>, order: &[String]) -> Self {
        Self::build_filtered(entries, order, |_| true)
    }

    /// Build the graph keeping only edges whose target is a known entry
    pub fn build_closed(entries: &BTreeMap<String, CompiledEntry>, order: &[String]) -> Self {
        Self::build_filtered(entries, order, |target| entries.contains_key(target))
    }

    fn build_filtered(
        entries: &BTreeMap<String, CompiledEntry>,
        order: &[String],
        keep: impl Fn(&str) -> bool,
    ) -> Self {
        let mut graph = Self::default();

        for id in order {
            let Some(entry) = entries.get(id) else {
                continue;
            };
            let mut node = Node {
                id: id.clone(),
                ..Default::default()
            };
            for (class, target) in entry.dependency_edges().filter(|&(_, t)| keep(t)) {
                let bucket = match class {
                    DependencyClass::Runtime => &mut node.runtime,
                    DependencyClass::Build => &mut node.build,
                    DependencyClass::Optional => &mut node.optional,
                };
                bucket.push(target.to_string());
                graph.edges.push(Edge {
                    from: id.clone(),
                    to: target.to_string(),
                    class,
                });
            }
            graph.nodes.insert(id.clone(), node);
        }

        for edge in &graph.edges {
            if let Some(target) = graph.nodes.get_mut(&edge.to) {
                if !target.dependents.contains(&edge.from) {
                    target.dependents.push(edge.from.clone());
                }
            }
        }

        graph
    }
}

/// One row of the most-depended ranking
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependedCount {
    pub id: String,
    pub count: usize,
}

/// Aggregate statistics over a compiled database
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub total_annotations: usize,
    pub total_edges: usize,
    pub by_status: BTreeMap<String, usize>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub by_visibility: Option<BTreeMap<String, usize>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub by_phase: Option<BTreeMap<i64, usize>>,

    pub by_tag: BTreeMap<String, usize>,
    pub most_depended: Vec<DependedCount>,
    pub unresolved: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildFormat {
    Development,
    Production,
}

/// Build metadata attached to every database document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildInfo {
    /// Unix milliseconds; absent on production builds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<u64>,
    pub version: String,
    pub source_files: usize,
    pub format: BuildFormat,
}

/// Compiled annotation database
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Database {
    pub entries: BTreeMap<String, CompiledEntry>,

    /// Ids in indexing order
    pub ids: Vec<String>,
    pub graph: DependencyGraph,
    pub stats: Stats,
    pub build_info: BuildInfo,
}

impl Database {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Entries in indexing order
    pub fn iter(&self) -> impl Iterator<Item = &CompiledEntry> + '_ {
        self.ids.iter().filter_map(|id| self.entries.get(id))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use metamark_extractor::Provenance;
    use pretty_assertions::assert_eq;

    fn entry(id: &str, runtime: &[&str]) -> CompiledEntry {
        let mut deps = DependencyBuckets::default();
        for target in runtime {
            deps.push(DependencyClass::Runtime, *target);
        }
        CompiledEntry {
            id: id.into(),
            name: None,
            desc: None,
            tags: Vec::new(),
            deps: (!deps.is_empty()).then_some(deps),
            ai: None,
            visibility: None,
            version: None,
            phase: None,
            status: None,
            file_path: None,
            line: None,
            origin: None,
            entity: None,
        }
    }

    #[test]
    fn test_from_record_requires_id() {
        let record = AnnotationRecord {
            annotation: Annotation {
                desc: Some("anonymous".into()),
                deps: Some(Dependencies::Flat(Vec::new())),
                ..Default::default()
            },
            provenance: Provenance {
                origin: Origin::StructuredComment,
                file_path: "a.js".into(),
                line: 2,
                raw: String::new(),
                entity: None,
            },
        };
        assert!(CompiledEntry::from_record(record.clone(), "a.js".into()).is_none());

        let mut with_id = record;
        with_id.annotation.id = Some("a".into());
        let compiled = CompiledEntry::from_record(with_id, "a.js".into()).unwrap();
        assert_eq!(compiled.deps, None);
        assert_eq!(compiled.line, Some(2));
    }

    #[test]
    fn test_graph_dependents_only_for_known_targets() {
        let mut entries = BTreeMap::new();
        entries.insert("a".to_string(), entry("a", &["b", "ghost"]));
        entries.insert("b".to_string(), entry("b", &[]));
        let order = vec!["a".to_string(), "b".to_string()];

        let graph = DependencyGraph::build(&entries, &order);
        assert_eq!(graph.edges.len(), 2);
        assert_eq!(graph.nodes["b"].dependents, vec!["a"]);
        assert!(!graph.nodes.contains_key("ghost"));

        let closed = DependencyGraph::build_closed(&entries, &order);
        assert_eq!(closed.edges.len(), 1);
        assert_eq!(closed.nodes["a"].runtime, vec!["b"]);
    }

    #[test]
    fn test_duplicate_edges_record_dependent_once() {
        let mut a = entry("a", &["b"]);
        if let Some(deps) = a.deps.as_mut() {
            deps.push(DependencyClass::Build, "b");
        }
        let mut entries = BTreeMap::new();
        entries.insert("a".to_string(), a);
        entries.insert("b".to_string(), entry("b", &[]));

        let graph = DependencyGraph::build(&entries, &["a".to_string(), "b".to_string()]);
        assert_eq!(graph.edges.len(), 2);
        assert_eq!(graph.nodes["b"].dependents, vec!["a"]);
    }
}
