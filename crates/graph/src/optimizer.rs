use crate::error::Result;
use crate::stats;
use crate::types::{BuildFormat, BuildInfo, CompiledEntry, Database, DependencyGraph};
use metamark_extractor::AiMeta;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// Serialized size comparison between the two builds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SizeReport {
    pub dev_bytes: usize,
    pub prod_bytes: usize,
    pub saved_bytes: usize,
    pub saved_percent: f64,
    pub dev_entries: usize,
    pub prod_entries: usize,
    pub internal_entries_removed: usize,
}

#[derive(Debug, Clone)]
pub struct ProductionBuild {
    pub database: Database,
    pub report: SizeReport,
}

/// Strip a development database down to its public surface.
///
/// Output carries no timestamp, so identical inputs serialize identically.
pub fn optimize(dev: &Database) -> Result<ProductionBuild> {
    let removed: HashSet<&str> = dev
        .iter()
        .filter(|entry| entry.is_internal())
        .map(|entry| entry.id.as_str())
        .collect();

    let mut entries = BTreeMap::new();
    let mut ids = Vec::new();
    for entry in dev.iter().filter(|entry| !entry.is_internal()) {
        let stripped = strip_entry(entry, &removed);
        ids.push(stripped.id.clone());
        entries.insert(stripped.id.clone(), stripped);
    }

    let graph = DependencyGraph::build_closed(&entries, &ids);
    let ordered: Vec<&CompiledEntry> = ids.iter().filter_map(|id| entries.get(id)).collect();
    let stats = stats::compute(&ordered, &graph, false);

    let database = Database {
        entries,
        ids,
        graph,
        stats,
        build_info: BuildInfo {
            timestamp: None,
            version: dev.build_info.version.clone(),
            source_files: dev.build_info.source_files,
            format: BuildFormat::Production,
        },
    };

    let dev_bytes = serde_json::to_vec(dev)?.len();
    let prod_bytes = serde_json::to_vec(&database)?.len();
    let saved_bytes = dev_bytes.saturating_sub(prod_bytes);
    let report = SizeReport {
        dev_bytes,
        prod_bytes,
        saved_bytes,
        saved_percent: if dev_bytes == 0 {
            0.0
        } else {
            (saved_bytes as f64 / dev_bytes as f64 * 1000.0).round() / 10.0
        },
        dev_entries: dev.len(),
        prod_entries: database.len(),
        internal_entries_removed: removed.len(),
    };

    log::info!(
        "Production build: {} entries ({} internal removed), {} -> {} bytes",
        report.prod_entries,
        report.internal_entries_removed,
        report.dev_bytes,
        report.prod_bytes
    );

    Ok(ProductionBuild { database, report })
}

/// Keep identity, display and dependency fields only
fn strip_entry(entry: &CompiledEntry, removed: &HashSet<&str>) -> CompiledEntry {
    let deps = entry
        .deps
        .clone()
        .map(|deps| deps.retain(|target| !removed.contains(target)))
        .filter(|deps| !deps.is_empty());
    let ai = entry.ai.as_ref().and_then(|ai| match ai {
        AiMeta::Text(text) => Some(AiMeta::Text(text.clone())),
        AiMeta::Structured(details) => details.summary.clone().map(AiMeta::Text),
    });

    CompiledEntry {
        id: entry.id.clone(),
        name: entry.name.clone(),
        desc: entry.desc.clone(),
        tags: entry.tags.clone(),
        deps,
        ai,
        visibility: None,
        version: entry.version.clone(),
        phase: entry.phase,
        status: entry.status,
        file_path: None,
        line: None,
        origin: None,
        entity: None,
    }
}
