use anyhow::{Context, Result};
use metamark_context::ContextConfig;
use metamark_extractor::{ExtractorConfig, SOURCE_EXTENSIONS};
use metamark_validation::ValidationConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// File picked up from the working directory when `--config` is absent
pub const DEFAULT_CONFIG_FILE: &str = "metamark.toml";

/// Contents of `metamark.toml`; every section is optional
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    pub scan: ScanConfig,
    pub extract: ExtractorConfig,
    pub compile: CompileConfig,
    pub validation: ValidationConfig,
    pub context: ContextConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Extensions (without the dot) that are fed to the extractor
    pub extensions: Vec<String>,
    /// Directory or file names skipped anywhere below the root
    pub exclude: Vec<String>,
    pub max_depth: Option<usize>,
    /// Descend into dot-directories and read dot-files
    pub include_hidden: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            extensions: SOURCE_EXTENSIONS.iter().map(|ext| (*ext).to_string()).collect(),
            exclude: ["node_modules", "dist", "build", "target", "coverage", "vendor"]
                .into_iter()
                .map(String::from)
                .collect(),
            max_depth: None,
            include_hidden: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompileConfig {
    /// Development database written by `compile`
    pub output: PathBuf,
    /// Production database written by `optimize`
    pub production_output: PathBuf,
}

impl Default for CompileConfig {
    fn default() -> Self {
        Self {
            output: PathBuf::from("metamark.json"),
            production_output: PathBuf::from("metamark.prod.json"),
        }
    }
}

impl CliConfig {
    /// Load `explicit` if given (must exist), else `metamark.toml` under `dir`
    /// if present, else defaults.
    pub fn load(explicit: Option<&Path>, dir: &Path) -> Result<Self> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let candidate = dir.join(DEFAULT_CONFIG_FILE);
                if !candidate.is_file() {
                    log::debug!("No {DEFAULT_CONFIG_FILE} found, using defaults");
                    return Ok(Self::default());
                }
                candidate
            }
        };

        let raw = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config = Self::parse(&raw)
            .with_context(|| format!("Invalid config {}", path.display()))?;
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn parse(raw: &str) -> Result<Self> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.scan.extensions.is_empty() {
            anyhow::bail!("scan.extensions must not be empty");
        }
        self.extract.validate()?;
        self.validation.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use metamark_validation::Rule;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = CliConfig::parse(
            r#"
[scan]
exclude = ["generated"]
max_depth = 4

[validation]
rules = ["id-uniqueness", "deps-must-exist"]

[context]
token_budget = 1200
"#,
        )
        .unwrap();

        assert_eq!(config.scan.exclude, vec!["generated"]);
        assert_eq!(config.scan.max_depth, Some(4));
        assert_eq!(config.scan.extensions, ScanConfig::default().extensions);
        assert_eq!(
            config.validation.rules,
            vec![Rule::IdUniqueness, Rule::DepsMustExist]
        );
        assert_eq!(config.context.token_budget, 1200);
        assert_eq!(config.compile, CompileConfig::default());
    }

    #[test]
    fn test_rejects_invalid_sections() {
        assert!(CliConfig::parse("[scan]\nextensions = []\n").is_err());
        assert!(CliConfig::parse("[validation]\nrules = []\n").is_err());
        assert!(CliConfig::parse("[validation]\nrules = [\"no-such-rule\"]\n").is_err());
    }

    #[test]
    fn test_load_falls_back_to_defaults() {
        let dir = tempdir().unwrap();
        let config = CliConfig::load(None, dir.path()).unwrap();
        assert_eq!(config, CliConfig::default());

        fs::write(dir.path().join(DEFAULT_CONFIG_FILE), "[scan]\nmax_depth = 1\n").unwrap();
        let config = CliConfig::load(None, dir.path()).unwrap();
        assert_eq!(config.scan.max_depth, Some(1));

        assert!(CliConfig::load(Some(&dir.path().join("missing.toml")), dir.path()).is_err());
    }
}
