// Template configuration: `<root>/.rulebridge.toml`.

use std::path::{Path, PathBuf};

use rulebridge_common::aggregate::OutputTarget;
use serde::Deserialize;

pub const CONFIG_FILE_NAME: &str = ".rulebridge.toml";

/// Path to the config file for a template root.
pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE_NAME)
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Canonical rules directory, relative to the template root.
    pub rules_dir: PathBuf,
    /// Editor-side directories (by name) never imported back by `pull`.
    pub skip_dirs: Vec<String>,
    pub single_file: SingleFileConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rules_dir: PathBuf::from("rules"),
            skip_dirs: vec!["project".to_string()],
            single_file: SingleFileConfig::default(),
        }
    }
}

impl Config {
    /// Load `<root>/.rulebridge.toml`. A missing file yields defaults.
    pub fn load(root: &Path) -> Result<Self, ConfigError> {
        let path = config_path(root);
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
        toml::from_str(&contents).map_err(ConfigError::Parse)
    }

    pub fn rules_root(&self, template_root: &Path) -> PathBuf {
        template_root.join(&self.rules_dir)
    }

    /// Configured targets, optionally narrowed to the given file names.
    pub fn targets(&self, only: &[String]) -> Vec<OutputTarget> {
        self.single_file
            .targets
            .iter()
            .filter(|target| only.is_empty() || only.contains(&target.file_name))
            .cloned()
            .collect()
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct SingleFileConfig {
    pub targets: Vec<OutputTarget>,
}

impl Default for SingleFileConfig {
    fn default() -> Self {
        Self { targets: OutputTarget::defaults() }
    }
}

// ── Errors ─────────────────────────────────────────────────────────

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "config I/O error: {e}"),
            Self::Parse(e) => write!(f, "config parse error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}
