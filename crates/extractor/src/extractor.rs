use crate::config::ExtractorConfig;
use crate::document::{regions, DocumentKind};
use crate::error::{ExtractError, Result};
use crate::merge::merge_origins;
use crate::types::{ExtractWarning, FileExtraction};
use crate::{comment, embedded};
use std::fmt::Display;

/// Main extractor interface for turning file text into annotation records
#[derive(Debug, Clone, Default)]
pub struct Extractor {
    config: ExtractorConfig,
}

impl Extractor {
    /// Create a new extractor with configuration
    pub fn new(config: ExtractorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    #[must_use]
    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Extract annotations from file text. `file_path` is the logical path
    /// recorded in provenance.
    pub fn extract_str(&self, text: &str, file_path: &str) -> FileExtraction {
        let mut result = FileExtraction::new(file_path);
        let kind = DocumentKind::from_path(file_path);

        for region in regions(text, kind) {
            let structured = if self.config.structured_comments {
                comment::extract(
                    region.text,
                    file_path,
                    region.line_offset,
                    &self.config,
                    &mut result.warnings,
                )
            } else {
                Vec::new()
            };

            let objects = if self.config.embedded_objects {
                embedded::extract(
                    region.text,
                    file_path,
                    region.line_offset,
                    &self.config,
                    &mut result.warnings,
                )
            } else {
                Vec::new()
            };

            result.records.extend(merge_origins(structured, objects));
        }

        result.warnings.sort_by_key(|warning| warning.line);
        if !result.warnings.is_empty() {
            log::debug!("{file_path}: {} warning(s)", result.warnings.len());
        }
        result
    }

    /// Extract from raw bytes; invalid UTF-8 yields a single warning
    pub fn extract_bytes(&self, bytes: &[u8], file_path: &str) -> FileExtraction {
        match std::str::from_utf8(bytes).map_err(ExtractError::from) {
            Ok(text) => self.extract_str(text, file_path),
            Err(err) => Self::unreadable(file_path, err),
        }
    }

    /// Result for a file that could not be read at all
    pub fn unreadable(file_path: &str, err: impl Display) -> FileExtraction {
        log::warn!("{file_path}: unreadable ({err})");
        FileExtraction {
            file_path: file_path.to_string(),
            records: Vec::new(),
            warnings: vec![ExtractWarning::new(None, format!("unreadable file: {err}"))],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Origin;

    #[test]
    fn test_invalid_config_rejected() {
        let config = ExtractorConfig {
            structured_comments: false,
            embedded_objects: false,
            ..Default::default()
        };
        assert!(Extractor::new(config).is_err());
    }

    #[test]
    fn test_disabled_pass_is_skipped() {
        let text = "// @mm:id=a\nconst b = { __mm: { id: 'b' } };\n";
        let comments = Extractor::new(ExtractorConfig::comments_only()).unwrap();
        let objects = Extractor::new(ExtractorConfig::objects_only()).unwrap();

        let only_comments = comments.extract_str(text, "x.js");
        assert_eq!(only_comments.records.len(), 1);
        assert_eq!(only_comments.records[0].provenance.origin, Origin::StructuredComment);

        let only_objects = objects.extract_str(text, "x.js");
        assert_eq!(only_objects.records.len(), 1);
        assert_eq!(only_objects.records[0].id(), Some("b"));
    }

    #[test]
    fn test_invalid_utf8_yields_one_warning() {
        let result = Extractor::default().extract_bytes(&[0xff, 0xfe, 0x00], "bin.js");
        assert!(result.records.is_empty());
        assert_eq!(result.warnings.len(), 1);
        assert!(result.warnings[0].message.contains("unreadable"));
    }

    #[test]
    fn test_plain_file_is_empty() {
        let result = Extractor::default().extract_str("fn main() {}\n", "main.rs");
        assert!(result.is_empty());
        assert_eq!(result.file_path, "main.rs");
    }
}
