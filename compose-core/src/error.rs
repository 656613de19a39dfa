//! Error types for the compose engine

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid key: {0:?}")]
    InvalidKey(String),

    #[error("Settings parse error: {0}")]
    Settings(#[from] toml::de::Error),

    #[error("Settings write error: {0}")]
    SettingsWrite(#[from] toml::ser::Error),

    #[error("Invalid setting: {0}")]
    InvalidSetting(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Why a sequence entry was refused while building a tree.
///
/// These never abort a load: the offending entry is skipped and reported
/// in the [`LoadReport`](crate::sequence::LoadReport).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    #[error("sequence has no keys")]
    EmptySequence,

    #[error("sequence has an empty output")]
    EmptyOutput,

    #[error("key {position} is an empty string")]
    EmptyKey { position: usize },

    #[error("key {position} is printable text that reads as a virtual key name")]
    AmbiguousKey { position: usize },

    #[error("sequence already defined by entry {first}")]
    Duplicate { first: usize },

    #[error("case-insensitive form already defined by entry {first}")]
    CaseFoldedDuplicate { first: usize },
}

/// Failure reported by an [`Injector`](crate::hook::Injector).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InjectError {
    #[error("only {delivered} of {requested} input events were delivered")]
    Rejected { requested: usize, delivered: usize },

    #[error("injection not supported: {0}")]
    Unsupported(String),

    #[error("platform error: {0}")]
    Platform(String),
}
