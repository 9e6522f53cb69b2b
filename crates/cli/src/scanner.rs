use crate::config::ScanConfig;
use anyhow::{bail, Result};
use ignore::WalkBuilder;
use metamark_extractor::{Extractor, FileExtraction};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Per-file extraction results for one project tree
#[derive(Debug, Default)]
pub struct ScanOutput {
    /// Files with at least one record or warning
    pub files: Vec<FileExtraction>,
    /// Source files read, including those without annotations
    pub files_scanned: usize,
}

/// Walks a project tree (.gitignore aware) and extracts every source file
pub struct Scanner<'a> {
    root: PathBuf,
    config: &'a ScanConfig,
    extractor: &'a Extractor,
}

impl<'a> Scanner<'a> {
    pub fn new(root: impl AsRef<Path>, config: &'a ScanConfig, extractor: &'a Extractor) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            config,
            extractor,
        }
    }

    pub fn scan(&self) -> Result<ScanOutput> {
        if !self.root.is_dir() {
            bail!("Project root {} does not exist", self.root.display());
        }

        let excluded: HashSet<String> = self
            .config
            .exclude
            .iter()
            .map(|name| name.to_lowercase())
            .collect();
        let root = self.root.clone();

        let mut builder = WalkBuilder::new(&self.root);
        builder
            .hidden(!self.config.include_hidden)
            .git_ignore(true)
            .git_global(true)
            .git_exclude(true)
            .require_git(false)
            .max_depth(self.config.max_depth)
            .sort_by_file_path(|a, b| a.cmp(b));
        builder.filter_entry(move |entry| !is_excluded(entry.path(), &root, &excluded));

        let mut output = ScanOutput::default();
        for result in builder.build() {
            let entry = match result {
                Ok(entry) => entry,
                Err(e) => {
                    log::warn!("Failed to read entry: {e}");
                    continue;
                }
            };
            if !entry.file_type().is_some_and(|kind| kind.is_file()) {
                continue;
            }

            let path = entry.path();
            if !self.has_source_extension(path) {
                continue;
            }

            let logical = normalize_path(&self.root, path);
            output.files_scanned += 1;
            let extraction = match fs::read(path) {
                Ok(bytes) => self.extractor.extract_bytes(&bytes, &logical),
                Err(e) => Extractor::unreadable(&logical, e),
            };
            log::debug!(
                "{logical}: {} records, {} warnings",
                extraction.records.len(),
                extraction.warnings.len()
            );
            if !extraction.is_empty() {
                output.files.push(extraction);
            }
        }

        log::info!(
            "Scanned {} source files, {} with annotations or warnings",
            output.files_scanned,
            output.files.len()
        );
        Ok(output)
    }

    fn has_source_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| {
                self.config
                    .extensions
                    .iter()
                    .any(|candidate| candidate.eq_ignore_ascii_case(ext))
            })
    }
}

fn is_excluded(path: &Path, root: &Path, excluded: &HashSet<String>) -> bool {
    path.strip_prefix(root).is_ok_and(|relative| {
        relative.components().any(|component| match component {
            std::path::Component::Normal(name) => {
                excluded.contains(&name.to_string_lossy().to_lowercase())
            }
            _ => false,
        })
    })
}

/// Root-relative path with forward slashes
fn normalize_path(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/")
}
