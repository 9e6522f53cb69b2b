//! # Metamark Graph
//!
//! Compiles extracted annotation records into one dependency-aware database
//! and serves read-only queries over it.
//!
//! ## Architecture
//!
//! ```text
//! FileExtraction[]
//!     │
//!     ├──> Compiler
//!     │      ├─ Index records per logical entity (merge / last-wins)
//!     │      ├─ Convert to CompiledEntry (3-bucket deps, relative paths)
//!     │      ├─ Build DependencyGraph (typed edges + dependents)
//!     │      └─ Compute Stats
//!     │
//!     ├──> Database (development document, timestamped)
//!     │      ├─ Query API (lookup, filters, traversal, cycles)
//!     │      └─ Export (LLM text/JSON, graph JSON/DOT)
//!     │
//!     └──> Optimizer
//!            └─ Production Database (public only, reproducible)
//! ```

mod compiler;
mod cycles;
mod error;
mod export;
mod optimizer;
mod query;
mod report;
mod stats;
mod types;

pub use compiler::{Compiler, CompilerConfig};
pub use cycles::{find_cycles, is_in_cycle};
pub use error::{GraphError, Result};
pub use export::{GraphFormat, LlmExportMode, LlmExportOptions};
pub use optimizer::{optimize, ProductionBuild, SizeReport};
pub use query::EntryFilter;
pub use report::{Issue, Report, Severity};
pub use types::{
    BuildFormat, BuildInfo, CompiledEntry, Database, DependedCount, DependencyGraph, Edge, Node,
    Stats,
};
