use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::cli::args::ValidateArgs;

const MAX_CONCURRENCY: usize = 64;

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
pub struct PipelintConfig {
    #[serde(default)]
    pub output: OutputConfig,

    #[serde(default)]
    pub discovery: DiscoveryConfig,

    #[serde(default)]
    pub run: RunConfig,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct OutputConfig {
    /// One of "text", "json" or "sarif"
    #[serde(default = "default_format")]
    pub format: String,

    /// Write the report here instead of stdout
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct DiscoveryConfig {
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    /// Path substrings to skip
    #[serde(default)]
    pub exclude: Vec<String>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct RunConfig {
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Fail the run on warnings as well as errors
    #[serde(default)]
    pub strict: bool,
}

fn default_format() -> String {
    "text".to_string()
}

fn default_extensions() -> Vec<String> {
    vec!["yaml".to_string(), "yml".to_string()]
}

fn default_concurrency() -> usize {
    4
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: default_format(),
            path: None,
        }
    }
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            extensions: default_extensions(),
            exclude: Vec::new(),
        }
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            strict: false,
        }
    }
}

/// One config file as written. Only keys present in the file are `Some`.
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub struct ConfigLayer {
    #[serde(default)]
    pub output: OutputLayer,

    #[serde(default)]
    pub discovery: DiscoveryLayer,

    #[serde(default)]
    pub run: RunLayer,
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub struct OutputLayer {
    pub format: Option<String>,
    pub path: Option<PathBuf>,
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub struct DiscoveryLayer {
    pub extensions: Option<Vec<String>>,
    pub exclude: Option<Vec<String>>,
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub struct RunLayer {
    pub concurrency: Option<usize>,
    pub strict: Option<bool>,
}

impl ConfigLayer {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let layer: ConfigLayer = toml::from_str(&content)?;
        Ok(layer)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Sarif,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Text => "text",
            OutputFormat::Json => "json",
            OutputFormat::Sarif => "sarif",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "sarif" => Ok(OutputFormat::Sarif),
            _ => Err(ConfigError::InvalidValue {
                field: "output.format".to_string(),
                value: s.to_string(),
                expected: "text, json or sarif".to_string(),
            }),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value in {field}: {value} (expected {expected})")]
    InvalidValue {
        field: String,
        value: String,
        expected: String,
    },

    #[error("Invalid range in {field}: {value} (valid range: {valid_range})")]
    InvalidRange {
        field: String,
        value: usize,
        valid_range: String,
    },

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("TOML serialization error: {0}")]
    TomlSerializeError(#[from] toml::ser::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl PipelintConfig {
    /// Apply every value a layer sets explicitly; unset values keep what lower layers chose.
    pub fn merge(&mut self, layer: &ConfigLayer) {
        if let Some(ref format) = layer.output.format {
            self.output.format = format.clone();
        }
        if let Some(ref path) = layer.output.path {
            self.output.path = Some(path.clone());
        }

        if let Some(ref extensions) = layer.discovery.extensions {
            self.discovery.extensions = extensions.clone();
        }
        if let Some(ref exclude) = layer.discovery.exclude {
            self.discovery.exclude = exclude.clone();
        }

        if let Some(concurrency) = layer.run.concurrency {
            self.run.concurrency = concurrency;
        }
        if let Some(strict) = layer.run.strict {
            self.run.strict = strict;
        }
    }

    pub fn generate_default_config() -> Result<String, ConfigError> {
        let body = toml::to_string_pretty(&Self::default())?;
        Ok(format!(
            "# pipelint configuration\n# Precedence: this file < PIPELINT_* environment variables < command line flags\n\n{}",
            body
        ))
    }

    /// Get the user config file path (~/.config/pipelint/config.toml)
    pub fn get_user_config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".config/pipelint/config.toml"))
    }

    /// Get the current directory config file path (./pipelint.toml)
    pub fn get_current_config_path() -> PathBuf {
        PathBuf::from("./pipelint.toml")
    }

    /// Load and merge configs from all sources with priority:
    /// 1. User config (~/.config/pipelint/config.toml) - lowest priority
    /// 2. Current directory (./pipelint.toml)
    pub fn load_with_merged_configs() -> Self {
        let mut config = Self::default();

        let candidates = Self::get_user_config_path()
            .into_iter()
            .chain(std::iter::once(Self::get_current_config_path()));

        for path in candidates {
            if !path.exists() {
                continue;
            }
            match ConfigLayer::load_from_file(&path) {
                Ok(loaded) => {
                    config.merge(&loaded);
                    tracing::debug!("Loaded config from: {}", path.display());
                }
                Err(e) => {
                    tracing::warn!("Ignoring unreadable config {}: {}", path.display(), e);
                }
            }
        }

        config
    }

    pub fn apply_env_vars(&mut self, env_vars: &HashMap<String, String>) -> Result<()> {
        for (key, value) in env_vars {
            if let Some(config_key) = key.strip_prefix("PIPELINT_") {
                match config_key {
                    "OUTPUT_FORMAT" => self.output.format = value.clone(),
                    "OUTPUT_PATH" => self.output.path = Some(PathBuf::from(value)),
                    "DISCOVERY_EXTENSIONS" => self.discovery.extensions = split_list(value),
                    "DISCOVERY_EXCLUDE" => self.discovery.exclude = split_list(value),
                    "RUN_CONCURRENCY" => {
                        self.run.concurrency = value
                            .parse()
                            .map_err(|_| anyhow!("Invalid concurrency value: {}", value))?;
                    }
                    "RUN_STRICT" => {
                        self.run.strict = value
                            .parse()
                            .map_err(|_| anyhow!("Invalid strict value: {}", value))?;
                    }
                    _ => {}
                }
            }
        }
        Ok(())
    }

    pub fn apply_validate_args(&mut self, args: &ValidateArgs) {
        if let Some(format) = args.format {
            self.output.format = format.as_str().to_string();
        }
        if let Some(ref output) = args.output {
            self.output.path = Some(output.clone());
        }
        if let Some(concurrency) = args.concurrency {
            self.run.concurrency = concurrency;
        }
        if args.strict {
            self.run.strict = true;
        }
    }

    /// Load configuration with full precedence chain:
    /// 1. Default values (lowest)
    /// 2. User config (~/.config/pipelint/config.toml)
    /// 3. Current directory (./pipelint.toml)
    /// 4. Explicit --config file
    /// 5. Environment variables (PIPELINT_*)
    /// 6. CLI arguments (highest)
    pub fn load_with_precedence(
        config_path: Option<&Path>,
        cli_args: &ValidateArgs,
        env_vars: &HashMap<String, String>,
    ) -> Result<Self> {
        let mut config = Self::load_with_merged_configs();

        if let Some(path) = config_path {
            let explicit_config = ConfigLayer::load_from_file(path)
                .map_err(|e| anyhow!("Failed to load config file {}: {}", path.display(), e))?;
            config.merge(&explicit_config);
        }

        config.apply_env_vars(env_vars)?;
        config.apply_validate_args(cli_args);
        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.output_format()?;

        if self.run.concurrency == 0 || self.run.concurrency > MAX_CONCURRENCY {
            return Err(ConfigError::InvalidRange {
                field: "run.concurrency".to_string(),
                value: self.run.concurrency,
                valid_range: format!("1-{}", MAX_CONCURRENCY),
            });
        }

        if self.discovery.extensions.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "discovery.extensions".to_string(),
                value: "[]".to_string(),
                expected: "at least one extension".to_string(),
            });
        }

        Ok(())
    }

    pub fn output_format(&self) -> Result<OutputFormat, ConfigError> {
        self.output.format.parse()
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
