//! Crate error type
//!
//! Parsing and rendering never fail: malformed markup degrades to literal text. The variants
//! below cover the ambient edges only (configuration, reading stored documents).

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("unknown token kind '{0}'")]
    UnknownKind(String),

    #[error("invalid timestamp format '{0}'")]
    InvalidTimestampFormat(String),

    #[error("log document not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to read log document: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed JSON log document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("malformed YAML log document: {0}")]
    Yaml(#[from] serde_yaml::Error),
}
