use crate::types::{CompiledEntry, DependedCount, DependencyGraph, Stats};
use std::collections::{BTreeMap, HashSet};

const MOST_DEPENDED_LIMIT: usize = 10;
const UNSPECIFIED_STATUS: &str = "unspecified";

/// Compute aggregate statistics. `entries` must be in indexing order.
///
/// With `breakdown` unset, the per-visibility and per-phase maps are omitted.
pub(crate) fn compute(entries: &[&CompiledEntry], graph: &DependencyGraph, breakdown: bool) -> Stats {
    let mut by_status = BTreeMap::new();
    let mut by_visibility = BTreeMap::new();
    let mut by_phase = BTreeMap::new();
    let mut by_tag = BTreeMap::new();

    for entry in entries {
        let status = entry.status.map_or(UNSPECIFIED_STATUS, |s| s.as_str());
        *by_status.entry(status.to_string()).or_insert(0) += 1;
        *by_visibility
            .entry(entry.effective_visibility().as_str().to_string())
            .or_insert(0) += 1;
        if let Some(phase) = entry.phase {
            *by_phase.entry(phase).or_insert(0) += 1;
        }
        for tag in &entry.tags {
            *by_tag.entry(tag.clone()).or_insert(0) += 1;
        }
    }

    let mut most_depended: Vec<DependedCount> = entries
        .iter()
        .filter_map(|entry| graph.nodes.get(&entry.id))
        .filter(|node| !node.dependents.is_empty())
        .map(|node| DependedCount {
            id: node.id.clone(),
            count: node.dependents.len(),
        })
        .collect();
    // stable: ties keep indexing order
    most_depended.sort_by(|a, b| b.count.cmp(&a.count));
    most_depended.truncate(MOST_DEPENDED_LIMIT);

    let mut seen = HashSet::new();
    let unresolved = graph
        .edges
        .iter()
        .filter(|edge| !graph.nodes.contains_key(&edge.to))
        .filter(|edge| seen.insert(edge.to.as_str()))
        .map(|edge| edge.to.clone())
        .collect();

    Stats {
        total_annotations: entries.len(),
        total_edges: graph.edges.len(),
        by_status,
        by_visibility: breakdown.then_some(by_visibility),
        by_phase: breakdown.then_some(by_phase),
        by_tag,
        most_depended,
        unresolved,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Compiler;
    use metamark_extractor::Extractor;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_counts_and_ranking() {
        let code = r"
// @mm:id=core
// @mm:status=stable
// @mm:tags=base
function core() {}

// @mm:id=ui
// @mm:deps=core, ghost
// @mm:tags=base, view
// @mm:phase=2
function ui() {}

// @mm:id=api
// @mm:deps=core, ui, ghost
// @mm:visibility=internal
function api() {}
";
        let extraction = Extractor::default().extract_str(code, "lib.js");
        let db = Compiler::default().compile_at(&[extraction], None);
        let stats = &db.stats;

        assert_eq!(stats.total_annotations, 3);
        assert_eq!(stats.total_edges, 5);
        assert_eq!(stats.by_status["stable"], 1);
        assert_eq!(stats.by_status["unspecified"], 2);
        assert_eq!(stats.by_visibility.as_ref().unwrap()["public"], 2);
        assert_eq!(stats.by_phase.as_ref().unwrap()[&2], 1);
        assert_eq!(stats.by_tag["base"], 2);
        assert_eq!(
            stats.most_depended,
            vec![
                DependedCount { id: "core".into(), count: 2 },
                DependedCount { id: "ui".into(), count: 1 },
            ]
        );
        assert_eq!(stats.unresolved, vec!["ghost"]);
    }
}
