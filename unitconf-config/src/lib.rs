//! Shared configuration loader for the unitconf tools.
//!
//! `defaults/unitconf.default.toml` is embedded into every binary so that docs and
//! runtime behavior stay in sync. Applications layer user-specific files on top
//! of those defaults via [`Loader`] before deserializing into [`UnitConfig`].

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat, ValueKind};
use serde::Deserialize;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;
use unitconf_analysis::FoldingOptions;
use unitconf_parser::Dialect;

const DEFAULT_TOML: &str = include_str!("../defaults/unitconf.default.toml");

/// Top-level configuration consumed by unitconf applications.
#[derive(Debug, Clone, Deserialize)]
pub struct UnitConfig {
    pub tokenizer: TokenizerConfig,
    pub folding: FoldingOptions,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenizerConfig {
    pub dialect: DialectSetting,
}

/// Dialect choice; `auto` defers to the file path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DialectSetting {
    #[default]
    Auto,
    Systemd,
    Mkosi,
}

impl DialectSetting {
    pub fn resolve(self, path: &Path) -> Dialect {
        match self {
            DialectSetting::Auto => Dialect::detect(path),
            DialectSetting::Systemd => Dialect::Systemd,
            DialectSetting::Mkosi => Dialect::Mkosi,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub pretty: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputFormat {
    Tokens,
    TokenSimple,
    Directives,
    Folding,
    Context,
}

impl OutputFormat {
    pub const ALL: [OutputFormat; 5] = [
        OutputFormat::Tokens,
        OutputFormat::TokenSimple,
        OutputFormat::Directives,
        OutputFormat::Folding,
        OutputFormat::Context,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            OutputFormat::Tokens => "tokens",
            OutputFormat::TokenSimple => "token-simple",
            OutputFormat::Directives => "directives",
            OutputFormat::Folding => "folding",
            OutputFormat::Context => "context",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown output format '{0}'")]
pub struct UnknownOutputFormat(pub String);

impl FromStr for OutputFormat {
    type Err = UnknownOutputFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OutputFormat::ALL
            .into_iter()
            .find(|format| format.as_str() == s)
            .ok_or_else(|| UnknownOutputFormat(s.to_string()))
    }
}

/// Helper for layering user overrides over the built-in defaults.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    /// Start a loader seeded with the embedded defaults.
    pub fn new() -> Self {
        let builder = Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml));
        Self { builder }
    }

    /// Layer a configuration file. Missing files trigger an error.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(true);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Layer an optional configuration file (ignored if the file is absent).
    pub fn with_optional_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(false);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Apply a single key/value override (useful for CLI settings).
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    /// Finalize the builder and deserialize the resulting configuration.
    pub fn build(self) -> Result<UnitConfig, ConfigError> {
        self.builder.build()?.try_deserialize()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience helper for callers that only need the defaults.
pub fn load_defaults() -> Result<UnitConfig, ConfigError> {
    Loader::new().build()
}
