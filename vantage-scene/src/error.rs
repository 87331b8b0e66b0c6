//! Load failures.

use std::path::PathBuf;

use thiserror::Error;
use vantage_data::DecodeError;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot determine the data format of {0}")]
    UnknownFormat(String),
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error("load worker stopped before finishing")]
    Cancelled,
}
