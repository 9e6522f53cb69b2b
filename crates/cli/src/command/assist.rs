use super::load_database;
use crate::{PrecommitArgs, SuggestArgs};
use anyhow::Result;
use metamark_context::{precommit_check, suggest_annotation};
use std::path::Path;

pub fn run_suggest(args: SuggestArgs, config_path: Option<&Path>) -> Result<()> {
    let db = load_database(&args.source, config_path)?;
    let suggestion = suggest_annotation(&args.file, &db);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&suggestion)?);
    } else {
        println!("{}", suggestion.block);
    }
    Ok(())
}

/// Advisory only: always exits successfully
pub fn run_precommit(args: PrecommitArgs, config_path: Option<&Path>) -> Result<()> {
    let db = load_database(&args.source, config_path)?;
    let report = precommit_check(args.files.as_slice(), &db);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    if report.is_clean() {
        eprintln!("All {} staged source files are annotated", report.checked);
        return Ok(());
    }
    eprintln!(
        "{} of {} staged source files have no annotation:",
        report.unannotated.len(),
        report.checked
    );
    for suggestion in &report.unannotated {
        println!("\n{}:\n{}", suggestion.file_path, suggestion.block);
    }
    Ok(())
}
