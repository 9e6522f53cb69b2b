use super::load_database;
use crate::config::CliConfig;
use crate::ContextArgs;
use anyhow::{anyhow, Result};
use metamark_context::{AgentType, ContextAssembler, ContextRequest, RenderFormat};
use std::path::Path;

pub fn run(args: ContextArgs, config_path: Option<&Path>) -> Result<()> {
    let config = CliConfig::load(config_path, &args.source.root)?;
    let db = load_database(&args.source, config_path)?;

    let mut request = ContextRequest::from_config(&config.context);
    if let Some(agent) = &args.agent {
        request.agent = agent.parse::<AgentType>().map_err(|e| anyhow!(e))?;
    }
    if let Some(format) = &args.format {
        request.format = format.parse::<RenderFormat>().map_err(|e| anyhow!(e))?;
    }
    request.ids = args.ids;
    request.tags = args.tags;
    request.file_pattern = args.file;
    if args.no_deps {
        request.include_dependencies = false;
    }
    if args.max_entries.is_some() {
        request.max_entries = args.max_entries;
    }
    if let Some(budget) = args.budget {
        request.token_budget = budget;
    }

    let context = ContextAssembler::new(&db).assemble(&request)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&context)?);
    } else {
        println!("{}", context.prompt);
        eprintln!(
            "{} entries, ~{} tokens (budget {}){}",
            context.entries.len(),
            context.token_count,
            context.stats.token_budget,
            if context.was_trimmed { ", trimmed" } else { "" }
        );
    }
    Ok(())
}
