use metamark_extractor::Extractor;
use metamark_graph::{optimize, Compiler};
use pretty_assertions::assert_eq;

#[test]
fn internal_entries_are_removed_with_their_edges() {
    let code = r"
// @mm:id=api
// @mm:desc=Public API
// @mm:deps=pool
function api() {}

// @mm:id=client
// @mm:deps=api
function client() {}

// @mm:id=cli
// @mm:deps=client, api
function cli() {}

// @mm:id=pool
// @mm:visibility=internal
function pool() {}

// @mm:id=metrics
// @mm:visibility=internal
// @mm:deps=pool
function metrics() {}
";
    let extraction = Extractor::default().extract_str(code, "src/service.js");
    let dev = Compiler::default().compile(&[extraction]);
    assert_eq!(dev.len(), 5);

    let build = optimize(&dev).unwrap();
    let prod = &build.database;

    assert_eq!(prod.entries.len(), 3);
    for removed in ["pool", "metrics"] {
        assert!(!prod.entries.contains_key(removed));
        assert!(prod
            .graph
            .edges
            .iter()
            .all(|edge| edge.from != removed && edge.to != removed));
    }
    assert_eq!(build.report.internal_entries_removed, 2);
    assert_eq!(build.report.dev_entries, 5);
    assert_eq!(build.report.prod_entries, 3);
    assert!(prod.entries["api"].deps.is_none());
    assert_eq!(prod.graph.nodes["api"].dependents, vec!["client", "cli"]);
    assert_eq!(prod.build_info.timestamp, None);
}
