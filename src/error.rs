use std::path::PathBuf;

use thiserror::Error;

/// Failures of the PNG codec and metadata chunk handling.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("PNG decode error: {0}")]
    Decode(#[from] png::DecodingError),
    #[error("PNG encode error: {0}")]
    Encode(#[from] png::EncodingError),
    #[error("not a PNG stream")]
    NotPng,
    #[error("truncated chunk `{0}`")]
    TruncatedChunk(String),
    #[error("unsupported pixel layout: {0}")]
    Unsupported(String),
    #[error("image has no pixels")]
    Empty,
    #[error("metadata is not valid JSON: {0}")]
    Metadata(#[from] serde_json::Error),
}

/// Failures reported by a host shell implementation.
#[derive(Debug, Error)]
pub enum ShellError {
    #[error("could not write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("clipboard unavailable: {0}")]
    Clipboard(String),
    #[error("malformed data URL")]
    DataUrl,
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("no configuration directory on this platform")]
    NoConfigDir,
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// A gesture script line that could not be understood.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("line {line}: {message}")]
pub struct ScriptError {
    pub line: usize,
    pub message: String,
}
