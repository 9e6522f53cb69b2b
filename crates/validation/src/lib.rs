//! # Metamark Validation
//!
//! Semantic checks over raw extraction output. Each rule is a
//! [`ValidationRule`]; the [`ValidationEngine`] runs the configured set,
//! applies warn-only overrides and partitions the findings into a
//! [`Report`](metamark_graph::Report).
//!
//! ```
//! use metamark_extractor::Extractor;
//! use metamark_validation::ValidationEngine;
//!
//! let file = Extractor::default().extract_str("// @mm:id=a\n// @mm:desc=A\nfn a() {}\n", "a.rs");
//! let report = ValidationEngine::default().validate(&[file]);
//! assert!(report.passed);
//! ```

mod config;
mod engine;
mod error;
mod resolve;
mod rules;

pub use config::{Rule, TargetMatching, ValidationConfig};
pub use engine::ValidationEngine;
pub use error::{Result, ValidationError};
pub use rules::{
    rule_for, DepsMustExist, IdUniqueness, NoCircularRuntimeDeps, RequiredFieldsPresent,
    RuleContext, ValidationRule, VisibilityConsistency,
};
