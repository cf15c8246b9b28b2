//! Error types for configuration loading.

use thiserror::Error;

/// Errors surfaced by the layered loader.
///
/// None of these are fatal to the subsystem: a failed layer leaves the
/// layers already applied intact, and the caller decides whether a bad
/// document should abort startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A document failed to parse as YAML.
    #[error("malformed configuration document: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// A parsed document did not coerce to the configuration schema.
    #[error("configuration document does not match the schema: {0}")]
    Apply(#[from] serde_json::Error),
}
