use super::{print_report, Session};
use crate::ValidateArgs;
use anyhow::{Context, Result};
use metamark_validation::{Rule, ValidationEngine};
use std::path::Path;

pub fn run(args: ValidateArgs, config_path: Option<&Path>) -> Result<()> {
    let session = Session::open(&args.path, config_path)?;
    let mut config = session.config.validation.clone();
    if !args.rules.is_empty() {
        config.rules = args
            .rules
            .iter()
            .map(|name| name.parse::<Rule>())
            .collect::<Result<Vec<_>, _>>()
            .context("Invalid --rule")?;
    }
    let engine = ValidationEngine::new(config)?;

    let scan = session.scan()?;
    let report = engine.validate(&scan.files);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    if args.strict && !report.passed {
        std::process::exit(1);
    }
    Ok(())
}
