//! Unified error type definition
//!
//! Rule functions never fail; these errors only arise when converting caller input
//! (type mnemonics, DoH answers, option files) into engine types.

use serde::Serialize;
use thiserror::Error;

/// Validator error type
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "code", content = "details")]
pub enum ValidatorError {
    /// Record type mnemonic not known to the engine
    #[error("Unsupported DNS record type: {0}")]
    UnsupportedRecordType(String),

    /// Numeric record type code not known to the engine
    #[error("Unknown DNS record type code: {0}")]
    UnknownTypeCode(u16),

    /// Malformed DNS-over-HTTPS answer
    #[error("Invalid DNS answer: {0}")]
    InvalidAnswer(String),

    /// Malformed validator options
    #[error("Invalid validator options: {0}")]
    InvalidOptions(String),
}

/// Validator Result type alias
pub type ValidatorResult<T> = std::result::Result<T, ValidatorError>;
