pub mod assist;
pub mod compile;
pub mod context;
pub mod optimize;
pub mod query;
pub mod validate;

use crate::config::CliConfig;
use crate::scanner::{ScanOutput, Scanner};
use crate::SourceArgs;
use anyhow::{Context, Result};
use metamark_extractor::Extractor;
use metamark_graph::{Compiler, Database, Report};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Project root plus the config that applies to it
pub struct Session {
    pub root: PathBuf,
    pub config: CliConfig,
}

impl Session {
    pub fn open(root: &Path, config_path: Option<&Path>) -> Result<Self> {
        let config = CliConfig::load(config_path, root)?;
        Ok(Self {
            root: root.to_path_buf(),
            config,
        })
    }

    /// Extract every source file below the root; extraction warnings are logged
    pub fn scan(&self) -> Result<ScanOutput> {
        let extractor = Extractor::new(self.config.extract.clone())?;
        let output = Scanner::new(&self.root, &self.config.scan, &extractor).scan()?;
        for file in &output.files {
            for warning in &file.warnings {
                match warning.line {
                    Some(line) => log::warn!("{}:{}: {}", file.file_path, line, warning.message),
                    None => log::warn!("{}: {}", file.file_path, warning.message),
                }
            }
        }
        Ok(output)
    }

    pub fn compile(&self, timestamp: bool) -> Result<Database> {
        let output = self.scan()?;
        let compiler = Compiler::default();
        Ok(if timestamp {
            compiler.compile(&output.files)
        } else {
            compiler.compile_at(&output.files, None)
        })
    }
}

/// Load the database named by `--db`, or compile the `--root` tree
pub fn load_database(source: &SourceArgs, config_path: Option<&Path>) -> Result<Database> {
    if let Some(path) = &source.db {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read database {}", path.display()))?;
        let db = Database::from_json(&raw)
            .with_context(|| format!("Invalid database {}", path.display()))?;
        log::debug!("Loaded {} entries from {}", db.len(), path.display());
        return Ok(db);
    }
    Session::open(&source.root, config_path)?.compile(true)
}

/// Write `contents` to `path`, or to stdout when the path is `-`
pub fn write_output(path: &Path, contents: &str) -> Result<()> {
    if path == Path::new("-") {
        let mut stdout = std::io::stdout().lock();
        stdout.write_all(contents.as_bytes())?;
        stdout.write_all(b"\n")?;
        return Ok(());
    }
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, contents).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

/// Print a report in text form: errors to stdout, warnings to stderr
pub fn print_report(report: &Report) {
    for issue in &report.errors {
        println!("{}", format_issue(issue));
    }
    for issue in &report.warnings {
        eprintln!("{}", format_issue(issue));
    }
    let verdict = if report.passed { "passed" } else { "failed" };
    eprintln!(
        "Validation {verdict}: {} errors, {} warnings",
        report.errors.len(),
        report.warnings.len()
    );
}

fn format_issue(issue: &metamark_graph::Issue) -> String {
    let location = match (&issue.file_path, issue.line) {
        (Some(file), Some(line)) => format!("{file}:{line}: "),
        (Some(file), None) => format!("{file}: "),
        _ => String::new(),
    };
    format!(
        "{location}{} [{}] {}",
        issue.severity.as_str(),
        issue.rule,
        issue.message
    )
}
