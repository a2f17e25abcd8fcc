use std::{io, path::PathBuf};

use telehtml::publish::PublishError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Invalid post file {path}: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Failed to write output: {0}")]
    Output(#[from] serde_yaml::Error),

    #[error(transparent)]
    Publish(#[from] PublishError),
}
