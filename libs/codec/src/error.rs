//! Codec-level errors for PDU encoding and decoding
//!
//! Every variant carries enough context (field path, offset, buffer size) to
//! diagnose a failing message without re-running it under a debugger. Decode
//! errors abort the whole decode; no partially-populated struct is ever
//! returned alongside one.

use thiserror::Error;

/// PDU codec errors with diagnostic context
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PduError {
    /// Metadata header missing, truncated or internally inconsistent
    #[error("Corrupt PDU metadata: {reason} (buffer: {buffer_size} bytes)")]
    CorruptMetadata { reason: String, buffer_size: usize },

    /// A field read or write would leave the buffer
    #[error("Out of bounds access for field '{field}': need {need} bytes at offset {offset}, buffer has {got}")]
    OutOfBounds {
        field: String,
        offset: usize,
        need: usize,
        got: usize,
    },

    /// Primitive value does not fit the declared width
    #[error("Invalid width for field '{field}' ({kind}): expected {expected} bytes, got {got}")]
    InvalidWidth {
        field: String,
        kind: String,
        expected: usize,
        got: usize,
    },

    /// Primitive kind tag or name not known to the codec
    #[error("Unknown primitive kind '{kind}'")]
    UnknownKind { kind: String },

    /// Rust field type disagrees with the schema descriptor
    #[error("Schema mismatch for field '{field}': schema declares {expected}, value is {actual}")]
    SchemaMismatch {
        field: String,
        expected: String,
        actual: String,
    },

    /// String payload is not valid UTF-8
    #[error("Invalid string in field '{field}': {reason}")]
    InvalidString { field: String, reason: String },

    /// Caller-supplied output buffer cannot hold the encoded PDU
    #[error("Output buffer too small: need {need} bytes, got {got}")]
    BufferTooSmall { need: usize, got: usize },

    /// Encoded PDU exceeds the configured or representable limit
    #[error("PDU too large: {size} bytes exceeds limit {limit}")]
    PduTooLarge { size: usize, limit: usize },

    /// Registry has no schema under this name
    #[error("Unknown PDU type '{name}'")]
    UnknownType { name: String },

    /// Schema descriptor is malformed or could not be loaded
    #[error("Invalid schema: {0}")]
    InvalidSchema(String),
}

impl PduError {
    pub fn corrupt_metadata(reason: impl Into<String>, buffer_size: usize) -> Self {
        Self::CorruptMetadata {
            reason: reason.into(),
            buffer_size,
        }
    }

    pub fn out_of_bounds(field: impl Into<String>, offset: usize, need: usize, got: usize) -> Self {
        Self::OutOfBounds {
            field: field.into(),
            offset,
            need,
            got,
        }
    }

    pub fn invalid_width(
        field: impl Into<String>,
        kind: impl Into<String>,
        expected: usize,
        got: usize,
    ) -> Self {
        Self::InvalidWidth {
            field: field.into(),
            kind: kind.into(),
            expected,
            got,
        }
    }

    pub fn schema_mismatch(
        field: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self::SchemaMismatch {
            field: field.into(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    pub fn invalid_string(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidString {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Attach a field path to errors raised below the field level
    ///
    /// Primitive and bounds helpers do not know which field they serve; the
    /// struct codec labels their errors on the way up. Nested structs prepend
    /// their own name, producing paths like `header.service_name`.
    pub fn with_field(self, name: &str) -> Self {
        fn join(name: &str, inner: String) -> String {
            if inner.is_empty() {
                name.to_string()
            } else {
                format!("{name}.{inner}")
            }
        }

        match self {
            Self::OutOfBounds {
                field,
                offset,
                need,
                got,
            } => Self::OutOfBounds {
                field: join(name, field),
                offset,
                need,
                got,
            },
            Self::InvalidWidth {
                field,
                kind,
                expected,
                got,
            } => Self::InvalidWidth {
                field: join(name, field),
                kind,
                expected,
                got,
            },
            Self::SchemaMismatch {
                field,
                expected,
                actual,
            } => Self::SchemaMismatch {
                field: join(name, field),
                expected,
                actual,
            },
            Self::InvalidString { field, reason } => Self::InvalidString {
                field: join(name, field),
                reason,
            },
            other => other,
        }
    }

    /// True for errors caused by the bytes on the wire rather than the caller
    pub fn is_data_error(&self) -> bool {
        matches!(
            self,
            Self::CorruptMetadata { .. } | Self::OutOfBounds { .. } | Self::InvalidString { .. }
        )
    }
}

/// Result type for codec operations
pub type PduResult<T> = std::result::Result<T, PduError>;
