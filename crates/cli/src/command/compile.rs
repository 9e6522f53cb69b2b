use super::{write_output, Session};
use crate::CompileArgs;
use anyhow::Result;
use std::path::Path;

pub fn run(args: CompileArgs, config_path: Option<&Path>) -> Result<()> {
    let session = Session::open(&args.path, config_path)?;
    let db = session.compile(!args.reproducible)?;

    let output = args
        .output
        .unwrap_or_else(|| session.root.join(&session.config.compile.output));
    write_output(&output, &db.to_json()?)?;

    if output != Path::new("-") {
        eprintln!(
            "Compiled {} annotations ({} edges) into {}",
            db.stats.total_annotations,
            db.stats.total_edges,
            output.display()
        );
    }
    Ok(())
}
