use metamark_extractor::{Extractor, FileExtraction};
use metamark_graph::Severity;
use metamark_validation::{Rule, ValidationConfig, ValidationEngine};
use pretty_assertions::assert_eq;

fn extract(path: &str, code: &str) -> FileExtraction {
    Extractor::default().extract_str(code, path)
}

#[test]
fn public_depending_on_internal_warns_once() {
    let corpus = [
        extract(
            "src/pub.ts",
            r"
/**
 * @mm:id=pub
 * @mm:desc=Public surface
 * @mm:deps=int
 */
export function pub() {}
",
        ),
        extract(
            "src/int.ts",
            r"
/**
 * @mm:id=int
 * @mm:desc=Internal helper
 * @mm:visibility=internal
 */
export function int() {}
",
        ),
    ];

    let report = ValidationEngine::default().validate(&corpus);
    assert!(report.passed);
    assert_eq!(report.warnings.len(), 1);

    let warning = &report.warnings[0];
    assert_eq!(warning.rule, "visibility-consistency");
    assert!(warning.message.contains("pub"));
    assert!(warning.message.contains("int"));
    assert_eq!(warning.file_path.as_deref(), Some("src/pub.ts"));
}

#[test]
fn cycles_and_duplicates_fail_validation() {
    let corpus = [
        extract(
            "a.js",
            "// @mm:id=a\n// @mm:desc=A\n// @mm:deps=b\nfunction a() {}\n",
        ),
        extract(
            "b.js",
            "// @mm:id=b\n// @mm:desc=B\n// @mm:deps=a\nfunction b() {}\n\n// @mm:id=a\n// @mm:desc=Again\nfunction again() {}\n",
        ),
    ];

    let report = ValidationEngine::default().validate(&corpus);
    assert!(!report.passed);
    let rules: Vec<_> = report.errors.iter().map(|i| i.rule.as_str()).collect();
    assert_eq!(rules, vec!["id-uniqueness", "no-circular-runtime-deps"]);
    assert!(report.errors.iter().all(|i| i.severity == Severity::Error));
}

#[test]
fn selected_rules_only() {
    let corpus = [extract("x.js", "// @mm:tags=orphan\nfunction x() {}\n")];
    let engine = ValidationEngine::new(ValidationConfig {
        rules: vec![Rule::IdUniqueness, Rule::DepsMustExist],
        ..Default::default()
    })
    .unwrap();
    assert!(engine.validate(&corpus).passed);

    let report = ValidationEngine::default().validate(&corpus);
    assert_eq!(report.errors.len(), 2, "missing id and desc");
}

#[test]
fn empty_corpus_passes() {
    let report = ValidationEngine::default().validate(&[]);
    assert!(report.passed);
    assert!(report.errors.is_empty() && report.warnings.is_empty());
}
