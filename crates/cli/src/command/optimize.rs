use super::{load_database, write_output};
use crate::config::CliConfig;
use crate::OptimizeArgs;
use anyhow::Result;
use metamark_graph::optimize;
use std::path::Path;

pub fn run(args: OptimizeArgs, config_path: Option<&Path>) -> Result<()> {
    let dev = load_database(&args.source, config_path)?;
    let build = optimize(&dev)?;

    let output = match args.output {
        Some(path) => path,
        None => {
            let config = CliConfig::load(config_path, &args.source.root)?;
            args.source.root.join(config.compile.production_output)
        }
    };
    write_output(&output, &build.database.to_json()?)?;

    let report = &build.report;
    if args.json {
        println!("{}", serde_json::to_string_pretty(report)?);
    } else {
        eprintln!(
            "Production build: {} -> {} bytes (saved {} bytes, {:.1}%)",
            report.dev_bytes, report.prod_bytes, report.saved_bytes, report.saved_percent
        );
        eprintln!(
            "Entries: {} -> {} ({} internal removed)",
            report.dev_entries, report.prod_entries, report.internal_entries_removed
        );
    }
    Ok(())
}
