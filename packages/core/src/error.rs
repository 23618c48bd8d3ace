use std::io;

use thiserror::Error;

/// Errors surfaced by logger operations.
///
/// Ordinary logging calls never fail; only flushing and process-wide
/// installation report errors.
#[derive(Error, Debug)]
pub enum LogError {
    #[error("failed to sync log sink: {0}")]
    Sync(#[source] io::Error),

    #[error("global logger already initialized")]
    AlreadyInitialized,

    #[error("failed to install tracing subscriber: {0}")]
    Subscriber(String),
}

/// A level name that is not one of the seven known severities.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unrecognized level: {value:?}")]
pub struct ParseLevelError {
    pub value: String,
}

impl ParseLevelError {
    pub fn new(value: impl Into<String>) -> Self {
        Self { value: value.into() }
    }
}

/// Errors of the `logkit` binary.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Config error: {0}")]
    Config(String),

    #[error("Server error: {0}")]
    Server(#[from] io::Error),

    #[error(transparent)]
    Log(#[from] LogError),
}
