//! Error types for provisioning configuration.

use cics_provision_core::ValidationError;
use thiserror::Error;

/// Errors raised while loading, validating or resolving configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File I/O failure.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// YAML parsing or serialization failure.
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// Structural problem found by the renderers.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A value that does not fit its argument type.
    #[error("Invalid argument \"{value}\" for type \"{kind}\".")]
    InvalidArgument { value: String, kind: &'static str },

    /// Neither an explicit name nor a template for a data set.
    #[error("No template or {group} override found for {name}")]
    MissingDataSet { group: &'static str, name: String },

    /// A `<< name >>` placeholder this template cannot fill.
    #[error("Unknown template variable \"{variable}\" in \"{template}\"")]
    UnknownTemplateVariable { variable: String, template: String },

    #[error("Data set: {0} is longer than 44 characters.")]
    DataSetTooLong(String),
}

/// Convenience alias for results with [`ConfigError`].
pub type Result<T> = std::result::Result<T, ConfigError>;
