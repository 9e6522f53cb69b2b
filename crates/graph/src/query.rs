use crate::cycles;
use crate::error::{GraphError, Result};
use crate::report::{Issue, Report};
use crate::types::{CompiledEntry, Database};
use metamark_extractor::{DependencyClass, Status, Visibility};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::Bfs;
use std::collections::{HashMap, HashSet};

/// Conjunctive entry filter; `tags` matches when any listed tag is present
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryFilter {
    pub status: Option<Status>,
    pub visibility: Option<Visibility>,
    pub phase: Option<i64>,
    pub tags: Vec<String>,
}

impl EntryFilter {
    #[must_use]
    pub fn matches(&self, entry: &CompiledEntry) -> bool {
        self.status.map_or(true, |status| entry.status == Some(status))
            && self
                .visibility
                .map_or(true, |visibility| entry.effective_visibility() == visibility)
            && self.phase.map_or(true, |phase| entry.phase == Some(phase))
            && (self.tags.is_empty() || self.tags.iter().any(|tag| entry.tags.contains(tag)))
    }
}

impl Database {
    #[must_use]
    pub fn find_by_id(&self, id: &str) -> Option<&CompiledEntry> {
        self.entries.get(id)
    }

    /// Entries matching `filter`, in indexing order
    pub fn find_all(&self, filter: &EntryFilter) -> Vec<&CompiledEntry> {
        self.iter().filter(|entry| filter.matches(entry)).collect()
    }

    /// Dependency targets of `id` restricted to `classes` (all classes when
    /// empty). With `recursive`, returns the transitive closure in
    /// breadth-first order; cycles are visited once.
    pub fn dependencies(
        &self,
        id: &str,
        classes: &[DependencyClass],
        recursive: bool,
    ) -> Result<Vec<String>> {
        let entry = self
            .find_by_id(id)
            .ok_or_else(|| GraphError::NodeNotFound(id.to_string()))?;
        let wanted = |class: DependencyClass| classes.is_empty() || classes.contains(&class);

        if !recursive {
            let mut seen = HashSet::new();
            return Ok(entry
                .dependency_edges()
                .filter(|(class, _)| wanted(*class))
                .filter(|(_, target)| seen.insert(*target))
                .map(|(_, target)| target.to_string())
                .collect());
        }

        let mut graph: DiGraph<&str, DependencyClass> = DiGraph::new();
        let mut index: HashMap<&str, NodeIndex> = HashMap::new();
        let start = graph.add_node(id);
        index.insert(id, start);
        for edge in self.graph.edges.iter().filter(|edge| wanted(edge.class)) {
            let from = *index
                .entry(edge.from.as_str())
                .or_insert_with(|| graph.add_node(edge.from.as_str()));
            let to = *index
                .entry(edge.to.as_str())
                .or_insert_with(|| graph.add_node(edge.to.as_str()));
            graph.add_edge(from, to, edge.class);
        }

        let mut closure = Vec::new();
        let mut bfs = Bfs::new(&graph, start);
        while let Some(node) = bfs.next(&graph) {
            if node != start {
                closure.push(graph[node].to_string());
            }
        }
        Ok(closure)
    }

    /// Ids that depend on `id`
    pub fn dependents(&self, id: &str) -> Result<&[String]> {
        self.graph
            .nodes
            .get(id)
            .map(|node| node.dependents.as_slice())
            .ok_or_else(|| GraphError::NodeNotFound(id.to_string()))
    }

    /// Runtime edges per id, in indexing order
    pub fn runtime_adjacency(&self) -> Vec<(&str, Vec<&str>)> {
        self.ids
            .iter()
            .filter_map(|id| self.graph.nodes.get(id))
            .map(|node| {
                (
                    node.id.as_str(),
                    node.runtime.iter().map(String::as_str).collect(),
                )
            })
            .collect()
    }

    /// Every distinct runtime cycle
    pub fn find_all_cycles(&self) -> Vec<Vec<String>> {
        cycles::find_cycles(&self.runtime_adjacency())
    }

    /// First runtime cycle that passes through `id`
    pub fn detect_cycle(&self, id: &str) -> Option<Vec<String>> {
        self.find_all_cycles()
            .into_iter()
            .find(|cycle| cycle.iter().any(|member| member == id))
    }

    #[must_use]
    pub fn is_in_cycle(&self, id: &str) -> bool {
        cycles::is_in_cycle(&self.runtime_adjacency(), id)
    }

    /// Quick development check: unresolved targets and missing descriptions
    /// are warnings, runtime cycles are errors.
    pub fn validate(&self) -> Report {
        let mut issues = Vec::new();

        for entry in self.iter() {
            for (class, target) in entry.dependency_edges() {
                if !self.entries.contains_key(target) {
                    issues.push(
                        Issue::warning(
                            "unresolved-dependency",
                            format!(
                                "'{}' has {} dependency on unknown '{target}'",
                                entry.id,
                                class.as_str()
                            ),
                        )
                        .with_annotation(&entry.id),
                    );
                }
            }
            if entry.desc.as_deref().map_or(true, |desc| desc.trim().is_empty()) {
                issues.push(
                    Issue::warning(
                        "missing-description",
                        format!("'{}' has no description", entry.id),
                    )
                    .with_annotation(&entry.id),
                );
            }
        }

        for cycle in self.find_all_cycles() {
            issues.push(
                Issue::error(
                    "circular-dependency",
                    format!("Runtime cycle: {}", cycle.join(" -> ")),
                )
                .with_annotation(&cycle[0]),
            );
        }

        let report = Report::from_issues(issues);
        log::debug!(
            "Database check: {} errors, {} warnings",
            report.errors.len(),
            report.warnings.len()
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Compiler;
    use metamark_extractor::Extractor;
    use pretty_assertions::assert_eq;

    fn compile(code: &str) -> Database {
        let extraction = Extractor::default().extract_str(code, "src/mod.js");
        Compiler::default().compile_at(&[extraction], None)
    }

    const CHAIN: &str = r"
// @mm:id=app
// @mm:desc=Entry point
// @mm:deps=runtime:router, build:bundler
// @mm:tags=top
// @mm:status=stable
function app() {}

// @mm:id=router
// @mm:desc=Routes
// @mm:deps=store, optional:analytics
// @mm:tags=nav, top
function router() {}

// @mm:id=store
// @mm:visibility=internal
function store() {}
";

    #[test]
    fn test_find_all_filters() {
        let db = compile(CHAIN);
        let ids = |filter: EntryFilter| {
            db.find_all(&filter)
                .iter()
                .map(|e| e.id.clone())
                .collect::<Vec<_>>()
        };

        assert_eq!(ids(EntryFilter::default()), vec!["app", "router", "store"]);
        assert_eq!(
            ids(EntryFilter {
                tags: vec!["nav".into(), "missing".into()],
                ..Default::default()
            }),
            vec!["router"]
        );
        assert_eq!(
            ids(EntryFilter {
                visibility: Some(Visibility::Public),
                tags: vec!["top".into()],
                status: Some(Status::Stable),
                ..Default::default()
            }),
            vec!["app"]
        );
    }

    #[test]
    fn test_direct_and_recursive_dependencies() {
        let db = compile(CHAIN);
        assert_eq!(
            db.dependencies("app", &[], false).unwrap(),
            vec!["router", "bundler"]
        );
        assert_eq!(
            db.dependencies("app", &[DependencyClass::Runtime], true)
                .unwrap(),
            vec!["router", "store"]
        );
        assert_eq!(
            db.dependencies("app", &[], true).unwrap().len(),
            4,
            "router, bundler, store, analytics"
        );
        assert!(matches!(
            db.dependencies("nope", &[], false),
            Err(GraphError::NodeNotFound(_))
        ));
    }

    #[test]
    fn test_recursive_closure_survives_cycles() {
        let db = compile("// @mm:id=a\n// @mm:deps=b\nfunction a() {}\n// @mm:id=b\n// @mm:deps=a\nfunction b() {}\n");
        assert_eq!(db.dependencies("a", &[], true).unwrap(), vec!["b"]);
        assert!(db.is_in_cycle("a"));
        let cycles = db.find_all_cycles();
        assert_eq!(cycles.len(), 1);
        assert!(cycles[0].contains(&"a".to_string()) && cycles[0].contains(&"b".to_string()));
        assert_eq!(db.detect_cycle("b"), Some(cycles[0].clone()));
    }

    #[test]
    fn test_dependents_lookup() {
        let db = compile(CHAIN);
        assert_eq!(db.dependents("store").unwrap(), ["router".to_string()]);
        assert!(db.dependents("app").unwrap().is_empty());
        assert!(db.dependents("bundler").is_err());
    }

    #[test]
    fn test_database_check() {
        let db = compile(CHAIN);
        let report = db.validate();
        assert!(report.passed);
        let rules: Vec<_> = report.warnings.iter().map(|i| i.rule.as_str()).collect();
        assert_eq!(
            rules,
            vec![
                "unresolved-dependency",
                "unresolved-dependency",
                "missing-description"
            ]
        );

        let cyclic = compile("// @mm:id=a\n// @mm:desc=A\n// @mm:deps=a\nfunction a() {}\n");
        let report = cyclic.validate();
        assert!(!report.passed);
        assert_eq!(report.errors[0].rule, "circular-dependency");
    }
}
