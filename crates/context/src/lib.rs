//! # Metamark Context
//!
//! Consumers of a compiled [`Database`](metamark_graph::Database) that help
//! AI agents and contributors:
//!
//! - [`ContextAssembler`]: selects entries, follows runtime dependencies and
//!   renders a prompt that fits a token budget
//! - [`suggest_annotation`]: drafts an annotation block for a new file
//! - [`precommit_check`]: lists staged source files that lack annotations

mod assembler;
mod error;
mod precommit;
mod render;
mod suggest;
mod templates;

pub use assembler::{AssembledContext, ContextAssembler, ContextConfig, ContextRequest, ContextStats};
pub use error::{ContextError, Result};
pub use precommit::{precommit_check, PrecommitReport};
pub use render::estimate_tokens;
pub use suggest::{suggest_annotation, Suggestion};
pub use templates::{AgentType, RenderFormat, Template};
