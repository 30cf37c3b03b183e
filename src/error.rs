use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

/// Fatal to one value type; siblings in the batch keep generating.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    #[error("{value_type}: `{accessor}` matches incompatible shapes: {}", .candidates.join(", "))]
    ClassificationAmbiguity {
        value_type: String,
        accessor: String,
        candidates: Vec<String>,
    },
    #[error("{value_type}: `{first}` and `{second}` both resolve to `{name}`")]
    NamingCollision {
        value_type: String,
        name: String,
        first: String,
        second: String,
    },
}

impl GenerationError {
    pub fn value_type(&self) -> &str {
        match self {
            GenerationError::ClassificationAmbiguity { value_type, .. }
            | GenerationError::NamingCollision { value_type, .. } => value_type,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    UnsupportedTypeParameterUsage,
}

/// Degraded but successful generation for one property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[error("{value_type}: `{accessor}`: {message}")]
pub struct GenerationWarning {
    pub kind: WarningKind,
    pub value_type: String,
    pub accessor: String,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum EmissionError {
    #[error("failed to write {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("output unit {0} was already emitted")]
    Duplicate(String),
    #[error("emission sink is poisoned")]
    Poisoned,
}

#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{}: at JSON path {json_path} → {message}", .path.display())]
    Parse {
        path: PathBuf,
        json_path: String,
        message: String,
    },
    #[error("invalid input pattern `{pattern}`: {message}")]
    Pattern { pattern: String, message: String },
    #[error("glob pattern matched no files: {0}")]
    NoMatch(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("config {}: at JSON path {json_path} → {message}", .path.display())]
    Parse {
        path: PathBuf,
        json_path: String,
        message: String,
    },
    #[error("`{field}` must be empty or a Java identifier fragment, got `{value}`")]
    InvalidIdentifier { field: &'static str, value: String },
    #[error("`prefix` and `suffix` are both empty; subjects would take their value type's name")]
    SubjectShadowsValueType,
}
