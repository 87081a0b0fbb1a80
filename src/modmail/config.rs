//! Layered configuration.
//!
//! `defaults/modmail.default.toml` is embedded into the crate so documented defaults and
//! runtime behavior stay in sync. Callers layer user files and single-key overrides on top
//! through [`Loader`] before deserializing into [`Settings`].

use crate::modmail::dialect::Dialect;
use crate::modmail::error::Error;
use crate::modmail::token::TokenKind;
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat, ValueKind};
use serde::{Deserialize, Deserializer};
use std::path::Path;

const DEFAULT_TOML: &str = include_str!("../../defaults/modmail.default.toml");

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub markdown: MarkdownSettings,
    pub transcript: TranscriptSettings,
    pub logging: LoggingSettings,
}

/// Which token kinds the transcript dialect recognizes
#[derive(Debug, Clone, Deserialize)]
pub struct MarkdownSettings {
    /// Decode one level of upstream entity escaping before parsing
    pub input_escaped: bool,
    /// Kind names removed from the extended dialect
    #[serde(deserialize_with = "kind_names")]
    pub disable: Vec<String>,
    /// Kind names added after the removals
    #[serde(deserialize_with = "kind_names")]
    pub enable: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TranscriptSettings {
    pub timestamp_format: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    pub filter: String,
}

impl Settings {
    /// Resolve the kind lists into an immutable dialect.
    ///
    /// Starts from the extended dialect, applies `disable`, then `enable`. Structural kinds
    /// cannot be disabled and are silently kept.
    pub fn dialect(&self) -> Result<Dialect, Error> {
        let disable = parse_kinds(&self.markdown.disable)?;
        let enable = parse_kinds(&self.markdown.enable)?;
        let dialect = disable.into_iter().fold(Dialect::extended(), Dialect::without);
        Ok(enable.into_iter().fold(dialect, Dialect::with))
    }
}

fn parse_kinds(names: &[String]) -> Result<Vec<TokenKind>, Error> {
    names.iter().map(|name| name.parse()).collect()
}

/// Lists may be given as arrays or, from the command line, as comma-separated strings.
fn kind_names<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Names {
        List(Vec<String>),
        Joined(String),
    }

    Ok(match Names::deserialize(deserializer)? {
        Names::List(names) => names,
        Names::Joined(joined) => joined
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .collect(),
    })
}

/// Builds [`Settings`] from `modmail.default.toml`, then any `--config` files in order, then
/// `--set` assignments. Later layers win key by key.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    /// Only the built-in transcript defaults so far
    pub fn new() -> Self {
        let builder = Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml));
        Self { builder }
    }

    /// Add a TOML file. `build` fails if it does not exist.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(true);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Add a TOML file that may be absent
    pub fn with_optional_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(false);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Set one dotted key, e.g. `transcript.timestamp_format`
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    /// Apply a `key=value` override as typed on the command line. `true`/`false` become
    /// booleans, anything else stays a string.
    pub fn set_override_str(self, assignment: &str) -> Result<Self, ConfigError> {
        let (key, value) = assignment.split_once('=').ok_or_else(|| {
            ConfigError::Message(format!("override '{assignment}' is not of the form key=value"))
        })?;
        let key = key.trim();
        match value.trim() {
            "true" => self.set_override(key, true),
            "false" => self.set_override(key, false),
            other => self.set_override(key, other),
        }
    }

    /// Merge the layers. Unknown kind names are only caught later, by [`Settings::dialect`].
    pub fn build(self) -> Result<Settings, ConfigError> {
        self.builder.build()?.try_deserialize()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// The settings a run without `--config` or `--set` uses
pub fn load_defaults() -> Result<Settings, ConfigError> {
    Loader::new().build()
}
