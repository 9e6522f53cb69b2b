use crate::error::{ExtractError, Result};
use serde::{Deserialize, Serialize};

/// Configuration for annotation extraction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Run the `@mm:key=value` comment pass
    pub structured_comments: bool,

    /// Run the `__mm = { ... }` object-literal pass
    pub embedded_objects: bool,

    /// Non-blank lines inspected after a comment block when looking for the
    /// declaration it documents
    pub entity_lookahead_lines: usize,

    /// Lines inspected before an `__mm` object when looking for its owner
    pub entity_window_lines: usize,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            structured_comments: true,
            embedded_objects: true,
            entity_lookahead_lines: 3,
            entity_window_lines: 5,
        }
    }
}

impl ExtractorConfig {
    /// Config that only reads comment annotations
    pub fn comments_only() -> Self {
        Self {
            embedded_objects: false,
            ..Default::default()
        }
    }

    /// Config that only reads embedded objects
    pub fn objects_only() -> Self {
        Self {
            structured_comments: false,
            ..Default::default()
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if !self.structured_comments && !self.embedded_objects {
            return Err(ExtractError::invalid_config(
                "at least one of structured_comments / embedded_objects must be enabled",
            ));
        }

        if self.entity_lookahead_lines == 0 {
            return Err(ExtractError::invalid_config(
                "entity_lookahead_lines must be > 0",
            ));
        }

        if self.entity_window_lines == 0 {
            return Err(ExtractError::invalid_config(
                "entity_window_lines must be > 0",
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_valid() {
        assert!(ExtractorConfig::default().validate().is_ok());
    }

    #[test]
    fn test_preset_configs_valid() {
        assert!(ExtractorConfig::comments_only().validate().is_ok());
        assert!(ExtractorConfig::objects_only().validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = ExtractorConfig {
            structured_comments: false,
            embedded_objects: false,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        config.structured_comments = true;
        config.entity_lookahead_lines = 0;
        assert!(config.validate().is_err());

        config.entity_lookahead_lines = 2;
        config.entity_window_lines = 0;
        assert!(config.validate().is_err());

        config.entity_window_lines = 4;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: ExtractorConfig =
            serde_json::from_str(r#"{"embedded_objects": false}"#).unwrap();
        assert!(config.structured_comments);
        assert!(!config.embedded_objects);
        assert_eq!(config.entity_lookahead_lines, 3);
    }
}
