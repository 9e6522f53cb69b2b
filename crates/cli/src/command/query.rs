use super::{load_database, print_report};
use crate::{QueryArgs, QueryCommand};
use anyhow::{anyhow, bail, Result};
use metamark_extractor::{AnnotationField, DependencyClass, Status, Visibility};
use metamark_graph::{EntryFilter, GraphFormat, LlmExportMode, LlmExportOptions};
use std::path::Path;

pub fn run(args: QueryArgs, config_path: Option<&Path>) -> Result<()> {
    let db = load_database(&args.source, config_path)?;

    match args.query {
        QueryCommand::Get { id } => {
            let entry = db
                .find_by_id(&id)
                .ok_or_else(|| anyhow!("Annotation not found: {id}"))?;
            println!("{}", serde_json::to_string_pretty(entry)?);
        }
        QueryCommand::List {
            status,
            visibility,
            phase,
            tags,
        } => {
            let filter = EntryFilter {
                status: status.as_deref().map(parse_status).transpose()?,
                visibility: visibility.as_deref().map(parse_visibility).transpose()?,
                phase,
                tags,
            };
            for entry in db.find_all(&filter) {
                match &entry.desc {
                    Some(desc) => println!("{}: {desc}", entry.id),
                    None => println!("{}", entry.id),
                }
            }
        }
        QueryCommand::Deps {
            id,
            classes,
            recursive,
        } => {
            let classes = classes
                .iter()
                .map(|name| parse_class(name))
                .collect::<Result<Vec<_>>>()?;
            for target in db.dependencies(&id, &classes, recursive)? {
                println!("{target}");
            }
        }
        QueryCommand::Dependents { id } => {
            for dependent in db.dependents(&id)? {
                println!("{dependent}");
            }
        }
        QueryCommand::Cycles { id } => {
            let cycles: Vec<Vec<String>> = match id {
                Some(id) => db.detect_cycle(&id).into_iter().collect(),
                None => db.find_all_cycles(),
            };
            if cycles.is_empty() {
                eprintln!("No runtime dependency cycles");
            }
            for cycle in cycles {
                println!("{}", cycle.join(" -> "));
            }
        }
        QueryCommand::Check { strict } => {
            let report = db.validate();
            print_report(&report);
            if strict && !report.passed {
                std::process::exit(1);
            }
        }
        QueryCommand::ExportLlm {
            scope,
            fields,
            limit,
            full,
        } => {
            let fields = if fields.is_empty() {
                None
            } else {
                Some(
                    fields
                        .iter()
                        .map(|name| {
                            AnnotationField::parse(name.trim())
                                .ok_or_else(|| anyhow!("unknown field '{name}'"))
                        })
                        .collect::<Result<Vec<_>>>()?,
                )
            };
            let options = LlmExportOptions {
                scope,
                fields,
                limit,
                mode: if full {
                    LlmExportMode::Full
                } else {
                    LlmExportMode::Compact
                },
            };
            println!("{}", db.export_for_llm(&options)?);
        }
        QueryCommand::ExportGraph { format, class } => {
            let format = match format.to_ascii_lowercase().as_str() {
                "json" => GraphFormat::Json,
                "dot" => GraphFormat::Dot,
                other => bail!("unknown graph format '{other}' (expected json or dot)"),
            };
            let class = class.as_deref().map(parse_class).transpose()?;
            println!("{}", db.export_graph(format, class)?);
        }
    }
    Ok(())
}

fn parse_class(name: &str) -> Result<DependencyClass> {
    DependencyClass::parse(name.trim())
        .ok_or_else(|| anyhow!("unknown dependency class '{name}' (expected runtime, build or optional)"))
}

fn parse_status(name: &str) -> Result<Status> {
    Status::parse(name).ok_or_else(|| anyhow!("unknown status '{name}'"))
}

fn parse_visibility(name: &str) -> Result<Visibility> {
    Visibility::parse(name).ok_or_else(|| anyhow!("unknown visibility '{name}'"))
}
