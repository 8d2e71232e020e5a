use crate::model::DescriptorError;
use std::path::PathBuf;
use thiserror::Error;

/// Everything that can stop a parser run.
///
/// Configuration problems are reported before any descriptor is read;
/// everything else aborts the run without producing a document.
#[derive(Debug, Error)]
pub enum ParserError {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("failed to read {path}: {source}", path = path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid class descriptor {path}: {message}", path = path.display())]
    Descriptor { path: PathBuf, message: String },

    #[error(transparent)]
    Model(#[from] DescriptorError),

    #[error("plugin `{plugin}` must run {relation} `{other}`")]
    PluginOrder {
        plugin: String,
        other: String,
        relation: &'static str,
    },

    #[error("endpoint `{endpoint}` declares overloaded method `{method}`")]
    OverloadedMethod { endpoint: String, method: String },

    #[error("endpoint name `{name}` is used by both {first} and {second}")]
    DuplicateEndpoint {
        name: String,
        first: String,
        second: String,
    },

    #[error("plugin `{plugin}` failed at {location}: {message}")]
    Plugin {
        plugin: &'static str,
        location: String,
        message: String,
    },
}

pub type Result<T, E = ParserError> = std::result::Result<T, E>;
