//! Decode failure reasons.

use thiserror::Error;

/// Reasons a byte buffer could not be turned into geometry.
///
/// Every variant means "no result": callers never receive partially decoded data.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DecodeError {
    #[error("buffer too short: need at least {needed} bytes, got {actual}")]
    TooShort { needed: usize, actual: usize },

    #[error("bad signature: expected {expected:?}")]
    BadSignature { expected: &'static str },

    #[error("invalid header: {0}")]
    InvalidHeader(String),

    #[error("no records in buffer")]
    NoRecords,

    #[error("no valid points among {records} records")]
    NoValidPoints { records: usize },

    #[error("not enough values: need at least {needed}, found {found}")]
    NotEnoughValues { needed: usize, found: usize },

    #[error("non-finite coordinate in record {record}")]
    NonFinite { record: usize },

    #[error("mesh import error: {0}")]
    Mesh(String),
}
