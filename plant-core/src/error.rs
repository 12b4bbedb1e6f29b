use std::path::PathBuf;

use thiserror::Error;

use crate::types::NodeId;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum TreeError {
    #[error("node {0:?} is not part of the tree")]
    UnknownNode(NodeId),

    #[error("the root node cannot be removed, clear its children instead")]
    RootRemoval,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read species file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid species file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid species value `{field}`: {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}
