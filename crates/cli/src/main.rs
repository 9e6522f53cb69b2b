use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

mod command;
mod config;
mod scanner;

#[derive(Parser)]
#[command(name = "metamark")]
#[command(about = "Compile @mm annotations into a queryable dependency database", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Only log warnings and errors
    #[arg(long, global = true)]
    quiet: bool,

    /// Config file (defaults to metamark.toml in the project root)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan a project and write the development database
    Compile(CompileArgs),

    /// Check annotations against the configured rules
    Validate(ValidateArgs),

    /// Strip internal entries and write the production database
    Optimize(OptimizeArgs),

    /// Assemble a token-budgeted prompt for an AI agent
    Context(ContextArgs),

    /// Look up entries and relationships in the database
    Query(QueryArgs),

    /// Propose an annotation block for a file
    Suggest(SuggestArgs),

    /// Report staged source files without annotations (advisory)
    Precommit(PrecommitArgs),
}

/// Where the database comes from: a compiled JSON file or a fresh scan
#[derive(Args, Clone)]
pub struct SourceArgs {
    /// Project root to scan
    #[arg(long, default_value = ".")]
    pub root: PathBuf,

    /// Read a previously compiled database instead of scanning
    #[arg(long)]
    pub db: Option<PathBuf>,
}

#[derive(Args)]
pub struct CompileArgs {
    /// Project root to scan
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Output file ("-" for stdout; defaults to compile.output from config)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Omit the build timestamp so identical trees give identical output
    #[arg(long)]
    pub reproducible: bool,
}

#[derive(Args)]
pub struct ValidateArgs {
    /// Project root to scan
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Exit with a non-zero status when errors are found
    #[arg(long)]
    pub strict: bool,

    /// Run only these rules (repeatable)
    #[arg(long = "rule")]
    pub rules: Vec<String>,

    /// Output the report as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct OptimizeArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Output file ("-" for stdout; defaults to compile.production_output)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Output the size report as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct ContextArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Agent template (codegen, refactor, docgen, review, generic)
    #[arg(long)]
    pub agent: Option<String>,

    /// Explicit annotation ids (comma separated or repeated)
    #[arg(long = "id", value_delimiter = ',')]
    pub ids: Vec<String>,

    /// Select entries carrying any of these tags
    #[arg(long = "tag", value_delimiter = ',')]
    pub tags: Vec<String>,

    /// Select entries whose file path contains this text
    #[arg(long)]
    pub file: Option<String>,

    /// Do not follow runtime dependencies
    #[arg(long)]
    pub no_deps: bool,

    #[arg(long)]
    pub max_entries: Option<usize>,

    /// Token budget for the rendered prompt
    #[arg(long)]
    pub budget: Option<usize>,

    /// Prompt layout (structured, json, summary)
    #[arg(long)]
    pub format: Option<String>,

    /// Output the assembled context as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct QueryArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    #[command(subcommand)]
    pub query: QueryCommand,
}

#[derive(Subcommand)]
pub enum QueryCommand {
    /// Show one entry
    Get { id: String },

    /// List entries matching every given filter
    List {
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        visibility: Option<String>,
        #[arg(long)]
        phase: Option<i64>,
        #[arg(long = "tag", value_delimiter = ',')]
        tags: Vec<String>,
    },

    /// Dependencies of an entry
    Deps {
        id: String,
        /// Restrict to these classes (runtime, build, optional)
        #[arg(long = "class", value_delimiter = ',')]
        classes: Vec<String>,
        /// Follow dependencies transitively
        #[arg(long)]
        recursive: bool,
    },

    /// Entries that depend on an entry
    Dependents { id: String },

    /// Runtime dependency cycles, or the cycle through one entry
    Cycles { id: Option<String> },

    /// Structural checks on the compiled database
    Check {
        /// Exit with a non-zero status when errors are found
        #[arg(long)]
        strict: bool,
    },

    /// Render entries for a language model prompt
    ExportLlm {
        /// Id prefix, tag or path substring
        #[arg(long)]
        scope: Option<String>,
        #[arg(long, value_delimiter = ',')]
        fields: Vec<String>,
        #[arg(long)]
        limit: Option<usize>,
        /// JSON objects instead of one line per entry
        #[arg(long)]
        full: bool,
    },

    /// Render the dependency graph
    ExportGraph {
        /// json or dot
        #[arg(long, default_value = "json")]
        format: String,
        /// Only edges of this class
        #[arg(long)]
        class: Option<String>,
    },
}

#[derive(Args)]
pub struct SuggestArgs {
    /// File to annotate, relative to the project root
    pub file: String,

    #[command(flatten)]
    pub source: SourceArgs,

    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct PrecommitArgs {
    /// Staged files, relative to the project root
    pub files: Vec<String>,

    #[command(flatten)]
    pub source: SourceArgs,

    #[arg(long)]
    pub json: bool,
}

fn main() -> Result<()> {
    let mut cli = Cli::parse();

    // Keep stderr quiet when stdout carries JSON for another tool
    let json_output = match &cli.command {
        Commands::Validate(args) => args.json,
        Commands::Optimize(args) => args.json,
        Commands::Context(args) => args.json,
        Commands::Suggest(args) => args.json,
        Commands::Precommit(args) => args.json,
        _ => false,
    };
    if json_output && !cli.verbose {
        cli.quiet = true;
    }

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();

    let config = cli.config.as_deref();
    match cli.command {
        Commands::Compile(args) => command::compile::run(args, config)?,
        Commands::Validate(args) => command::validate::run(args, config)?,
        Commands::Optimize(args) => command::optimize::run(args, config)?,
        Commands::Context(args) => command::context::run(args, config)?,
        Commands::Query(args) => command::query::run(args, config)?,
        Commands::Suggest(args) => command::assist::run_suggest(args, config)?,
        Commands::Precommit(args) => command::assist::run_precommit(args, config)?,
    }

    Ok(())
}
