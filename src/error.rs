//! Error taxonomy for the resolution pipeline.
//!
//! Parse-time failures (malformed TOML, wrong value types, unknown keys) and
//! validation failures are ordinary `Result` errors. Internal invariant
//! violations — an `auto` value reaching the plan compiler, a consumer
//! reading identity fields before the merger ran — are defects in calling
//! code and panic instead (see [`Setting::expect_resolved`](crate::Setting::expect_resolved)).

use std::path::PathBuf;

use thiserror::Error;

use crate::validate::ValidationReport;

#[derive(Debug, Error)]
pub enum PlanError {
    /// The config file is not well-formed TOML, or a value's type does not
    /// match the field's declared type.
    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// A key in the config file matches no recognized field.
    #[error("Unknown key '{key}' in {path} (line {line})")]
    UnknownKey {
        key: String,
        path: PathBuf,
        line: usize,
    },

    /// One or more unknown keys, reported together.
    #[error("Unknown keys in config file")]
    UnknownKeys(Vec<PlanError>),

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Configuration error: {0}")]
    Config(#[from] confique::Error),

    #[error("Invalid value for '{key}': {reason}")]
    InvalidValue { key: String, reason: String },

    /// `--init` found an existing config file and refused to clobber it.
    #[error("{path} already exists")]
    AlreadyInitialized { path: PathBuf },

    /// Cross-field validation failed. Carries every violation found, not
    /// just the first.
    #[error("Configuration is invalid:\n{0}")]
    Validation(ValidationReport),
}
