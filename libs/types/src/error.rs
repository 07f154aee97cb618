//! Errors for protocol-level interpretation of decoded messages
//!
//! Decoding a message never fails on an unknown enum code; the raw integer
//! is kept and only the typed accessors report it.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ProtocolError {
    /// Integer field holds a value outside the protocol enum
    #[error("Unknown {kind} code {value}")]
    UnknownCode { kind: &'static str, value: i64 },
}

impl ProtocolError {
    pub fn unknown_code(kind: &'static str, value: impl Into<i64>) -> Self {
        Self::UnknownCode {
            kind,
            value: value.into(),
        }
    }
}

pub type ProtocolResult<T> = std::result::Result<T, ProtocolError>;
