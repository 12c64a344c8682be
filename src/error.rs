use thiserror::Error;

use crate::idcache::CacheError;
use crate::parse::ParseError;
use crate::types::GenerateError;

/// Unified error type covering parsing, generation, cache handling, and I/O.
///
/// Returned by the orchestration entry points
/// ([`Generator::generate()`](crate::Generator::generate) and friends); the
/// per-stage errors stay available for callers that match on them.
#[derive(Debug, Error)]
pub enum FormgenError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Generate(#[from] GenerateError),

    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("invalid field-data file: {0}")]
    FieldData(#[from] serde_json::Error),
}
