use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    #[error("failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported OpenAPI version: {0}")]
    UnsupportedVersion(String),
}

#[derive(Debug, Error)]
pub enum TransformError {
    #[error("unresolved reference: {0}")]
    UnresolvedRef(String),
}

#[derive(Debug, Error)]
pub enum GeneratorError {
    #[error("template error in {template}: {message}")]
    Render { template: String, message: String },
}

/// Failure of a single `SourceFormatter::format` call.
#[derive(Debug, Error)]
pub enum FormatError {
    #[error("unbalanced '{delimiter}' at line {line}")]
    Unbalanced { delimiter: char, line: usize },

    #[error("failed to run formatter `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("formatter `{program}` exited with {status}: {stderr}")]
    Failed {
        program: String,
        status: String,
        stderr: String,
    },

    #[error("formatter output is not valid UTF-8")]
    InvalidOutput,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml_ng::Error,
    },
}
