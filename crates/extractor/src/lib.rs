//! # Metamark Extractor
//!
//! Pulls machine-readable annotations out of source text.
//!
//! Two surface syntaxes coexist and are handled by independent passes:
//!
//! ```text
//! Source Text
//!     │
//!     ├──> Document Detection (composite markup → <script> regions)
//!     │
//!     ├──> Structured-comment pass
//!     │    └─> /** @mm:id=auth-service
//!     │         *  @mm:deps=runtime:http-client */
//!     │
//!     ├──> Embedded-object pass
//!     │    └─> static __mm = { id: 'auth-service', tags: ['auth'] }
//!     │
//!     └──> Merge (embedded-object wins field-by-field per owning entity)
//!          └─> FileExtraction { records, warnings }
//! ```
//!
//! Extraction never fails: malformed values are dropped and structural
//! problems are reported as warnings on the file result.
//!
//! ## Example
//!
//! ```rust
//! use metamark_extractor::Extractor;
//!
//! let source = r#"
//! /**
//!  * @mm:id=alpha
//!  * @mm:desc=Alpha
//!  */
//! function Alpha() {}
//! "#;
//!
//! let extraction = Extractor::default().extract_str(source, "src/alpha.js");
//! assert_eq!(extraction.records.len(), 1);
//! assert_eq!(extraction.records[0].annotation.desc.as_deref(), Some("Alpha"));
//! ```

mod comment;
mod config;
mod document;
mod embedded;
mod entity;
mod error;
mod extractor;
mod fields;
mod literal;
mod merge;
mod render;
mod types;

pub use config::ExtractorConfig;
pub use document::{is_source_path, DocumentKind, SOURCE_EXTENSIONS};
pub use error::{ExtractError, Result};
pub use extractor::Extractor;
pub use merge::merge_records;
pub use render::render_comment_block;
pub use types::{
    AiDetails, AiMeta, Annotation, AnnotationField, AnnotationRecord, Dependencies,
    DependencyBuckets, DependencyClass, ExtractWarning, FileExtraction, Origin, Provenance,
    Status, Visibility,
};
