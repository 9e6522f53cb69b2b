use crate::stats;
use crate::types::{BuildFormat, BuildInfo, CompiledEntry, Database, DependencyGraph};
use metamark_extractor::{merge_records, AnnotationRecord, FileExtraction};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

/// Compiler settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerConfig {
    /// Root that compiled file paths are made relative to
    pub project_root: Option<PathBuf>,
}

/// Turns per-file extraction results into a [`Database`]
#[derive(Debug, Clone, Default)]
pub struct Compiler {
    config: CompilerConfig,
}

impl Compiler {
    pub fn new(config: CompilerConfig) -> Self {
        Self { config }
    }

    /// Compile a development database stamped with the current time
    pub fn compile(&self, corpus: &[FileExtraction]) -> Database {
        self.compile_at(corpus, Some(current_unix_ms()))
    }

    /// Compile with an explicit build timestamp
    pub fn compile_at(&self, corpus: &[FileExtraction], timestamp: Option<u64>) -> Database {
        let indexed = index_records(corpus);

        let mut entries = BTreeMap::new();
        let mut ids: Vec<String> = Vec::new();
        for record in indexed {
            let file_path = self.relative_path(&record.provenance.file_path);
            let Some(entry) = CompiledEntry::from_record(record, file_path) else {
                continue;
            };
            // Duplicate ids: last wins, first position is kept
            if entries.insert(entry.id.clone(), entry.clone()).is_none() {
                ids.push(entry.id);
            }
        }

        let graph = DependencyGraph::build(&entries, &ids);
        let ordered: Vec<&CompiledEntry> = ids.iter().filter_map(|id| entries.get(id)).collect();
        let stats = stats::compute(&ordered, &graph, true);

        log::info!(
            "Compiled {} annotations ({} edges) from {} files",
            stats.total_annotations,
            stats.total_edges,
            corpus.len()
        );
        if !stats.unresolved.is_empty() {
            log::debug!("Unresolved dependency targets: {}", stats.unresolved.join(", "));
        }

        Database {
            entries,
            ids,
            graph,
            stats,
            build_info: BuildInfo {
                timestamp,
                version: env!("CARGO_PKG_VERSION").to_string(),
                source_files: corpus.len(),
                format: BuildFormat::Development,
            },
        }
    }

    /// Normalize `path` relative to the project root with forward slashes
    fn relative_path(&self, path: &str) -> String {
        let relative = match &self.config.project_root {
            Some(root) => Path::new(path).strip_prefix(root).unwrap_or(Path::new(path)),
            None => Path::new(path),
        };
        let mut normalized = relative.to_string_lossy().to_string();
        if normalized.contains('\\') {
            normalized = normalized.replace('\\', "/");
        }
        match normalized.strip_prefix("./") {
            Some(rest) => rest.to_string(),
            None => normalized,
        }
    }
}

/// Deduplicate records per logical entity in first-seen order.
///
/// Key preference: id, then `basename#entity`, then `basename@line`.
fn index_records(corpus: &[FileExtraction]) -> Vec<AnnotationRecord> {
    let mut slots: HashMap<String, usize> = HashMap::new();
    let mut indexed: Vec<AnnotationRecord> = Vec::new();

    for file in corpus {
        for record in &file.records {
            let key = index_key(record);
            match slots.get(&key) {
                Some(&slot) => {
                    log::debug!("Merging duplicate annotation {}", record.label());
                    indexed[slot] = merge_records(indexed[slot].clone(), record.clone());
                }
                None => {
                    slots.insert(key, indexed.len());
                    indexed.push(record.clone());
                }
            }
        }
    }

    indexed
}

fn index_key(record: &AnnotationRecord) -> String {
    if let Some(id) = record.id() {
        return id.to_string();
    }
    let basename = Path::new(&record.provenance.file_path)
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_default();
    match record.entity() {
        Some(entity) => format!("{basename}#{entity}"),
        None => format!("{basename}@{}", record.provenance.line),
    }
}

fn current_unix_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .ok()
        .and_then(|dur| u64::try_from(dur.as_millis()).ok())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use metamark_extractor::Extractor;
    use pretty_assertions::assert_eq;

    fn extract(code: &str, path: &str) -> FileExtraction {
        Extractor::default().extract_str(code, path)
    }

    #[test]
    fn test_basic_compile() {
        let corpus = [extract(
            "/**\n * @mm:id=a\n * @mm:desc=Alpha\n */\nexport function Alpha() {}\n",
            "src/alpha.js",
        )];
        let db = Compiler::default().compile(&corpus);

        assert_eq!(db.entries["a"].desc.as_deref(), Some("Alpha"));
        assert_eq!(db.ids, vec!["a"]);
        assert_eq!(db.stats.total_annotations, 1);
        assert_eq!(db.build_info.format, BuildFormat::Development);
        assert!(db.build_info.timestamp.is_some());
    }

    #[test]
    fn test_empty_corpus_is_valid() {
        let db = Compiler::default().compile(&[]);
        assert!(db.is_empty());
        assert!(db.graph.nodes.is_empty());
        assert_eq!(db.stats.total_edges, 0);
    }

    #[test]
    fn test_id_less_records_are_excluded() {
        let corpus = [extract("// @mm:desc=nobody\nfunction anon() {}\n", "a.js")];
        let db = Compiler::default().compile_at(&corpus, None);
        assert!(db.is_empty());
    }

    #[test]
    fn test_duplicate_ids_resolve_last_wins() {
        let corpus = [
            extract("// @mm:id=dup\n// @mm:desc=first\nfunction one() {}\n", "one.js"),
            extract("// @mm:id=dup\n// @mm:desc=second\nfunction two() {}\n", "two.js"),
        ];
        let db = Compiler::default().compile_at(&corpus, None);
        assert_eq!(db.ids, vec!["dup"]);
        assert_eq!(db.entries["dup"].desc.as_deref(), Some("second"));
        assert_eq!(db.entries["dup"].file_path.as_deref(), Some("two.js"));
    }

    #[test]
    fn test_paths_relative_to_project_root() {
        let corpus = [extract("// @mm:id=a\nfunction a() {}\n", "/work/app/src/a.js")];
        let compiler = Compiler::new(CompilerConfig {
            project_root: Some(PathBuf::from("/work/app")),
        });
        let db = compiler.compile_at(&corpus, None);
        assert_eq!(db.entries["a"].file_path.as_deref(), Some("src/a.js"));

        let dotted = Compiler::default().relative_path("./lib\\b.js");
        assert_eq!(dotted, "lib/b.js");
    }

    #[test]
    fn test_recompile_is_identical() {
        let corpus = [extract(
            "// @mm:id=a\n// @mm:deps=b\nfunction a() {}\n// @mm:id=b\nfunction b() {}\n",
            "ab.js",
        )];
        let compiler = Compiler::default();
        let first = compiler.compile_at(&corpus, Some(1));
        let second = compiler.compile_at(&corpus, Some(1));
        assert_eq!(first.to_json().unwrap(), second.to_json().unwrap());
    }
}
