//! # Schema Descriptors - Field Layout as Data
//!
//! ## Purpose
//!
//! A [`StructSchema`] is the field-offset table of one message type: ordered
//! fields, each with a name, a [`FieldKind`] and a byte offset relative to the
//! start of the struct. The struct codec never hard-codes a layout; typed
//! structs build their schema through `define_pdu!`, runtime schemas arrive as
//! JSON through the registry.
//!
//! ## Base Footprint per Kind
//!
//! | Kind | Bytes in base region |
//! |------|----------------------|
//! | `Primitive` | kind width (`bool` = 4) |
//! | `FixedString { capacity }` | `capacity` |
//! | `Array { kind, len }` | `width * len` |
//! | `String`, `Sequence` | 8 (`offset: u32`, `length: u32` into the heap) |
//! | `Struct` | nested schema `size` |

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::constants::HEAP_REF_SIZE;
use crate::error::{PduError, PduResult};
use crate::primitive::PrimitiveKind;

/// Storage class of one field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldKind {
    /// Fixed-width scalar in the base region
    Primitive { kind: PrimitiveKind },
    /// NUL-terminated text in `capacity` base bytes
    FixedString { capacity: usize },
    /// `len` scalars stored inline
    Array { kind: PrimitiveKind, len: usize },
    /// UTF-8 text in the heap
    String,
    /// Scalars in the heap
    Sequence { kind: PrimitiveKind },
    /// Fixed-size nested struct at parent offset + field offset
    Struct { schema: Arc<StructSchema> },
}

impl FieldKind {
    pub fn primitive(kind: PrimitiveKind) -> Self {
        Self::Primitive { kind }
    }

    /// Bytes this field occupies in the base region
    ///
    /// Saturates at `usize::MAX` for arrays too large to address.
    pub fn base_size(&self) -> usize {
        match self {
            Self::Primitive { kind } => kind.width().unwrap_or(0),
            Self::FixedString { capacity } => *capacity,
            Self::Array { kind, len } => kind.width().unwrap_or(0).saturating_mul(*len),
            Self::String | Self::Sequence { .. } => HEAP_REF_SIZE,
            Self::Struct { schema } => schema.size,
        }
    }

    /// True when the payload lives in the heap region
    pub fn is_variable(&self) -> bool {
        matches!(self, Self::String | Self::Sequence { .. })
    }

    /// Short human-readable form used in errors and layout tables
    pub fn describe(&self) -> String {
        match self {
            Self::Primitive { kind } => kind.name().to_string(),
            Self::FixedString { capacity } => format!("string[{capacity}]"),
            Self::Array { kind, len } => format!("{kind}[{len}]"),
            Self::String => "string".to_string(),
            Self::Sequence { kind } => format!("{kind}[]"),
            Self::Struct { schema } => schema.name.clone(),
        }
    }
}

/// One named field at a fixed offset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    pub name: String,
    pub kind: FieldKind,
    pub offset: usize,
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>, kind: FieldKind, offset: usize) -> Self {
        Self {
            name: name.into(),
            kind,
            offset,
        }
    }

    /// First byte past this field in the base region, saturating
    pub fn end(&self) -> usize {
        self.offset.saturating_add(self.kind.base_size())
    }
}

/// Field-offset table of one message type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructSchema {
    /// Fully qualified type name, e.g. `hako_srv_msgs/GetEventRequest`
    pub name: String,
    /// Fixed encoded size of the struct in the base region
    pub size: usize,
    /// Fields in schema-declared order
    pub fields: Vec<FieldDescriptor>,
}

impl StructSchema {
    pub fn new(name: impl Into<String>, size: usize, fields: Vec<FieldDescriptor>) -> Self {
        Self {
            name: name.into(),
            size,
            fields,
        }
    }

    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// True if any field, at any depth, stores data in the heap
    pub fn has_heap_fields(&self) -> bool {
        self.fields.iter().any(|f| match &f.kind {
            FieldKind::Struct { schema } => schema.has_heap_fields(),
            kind => kind.is_variable(),
        })
    }

    /// Check the table for layout mistakes
    ///
    /// Rejects sizes beyond the `u32` wire range, duplicate names, fields
    /// that overrun `size`, overlapping fields, scalars of caller-sized kind,
    /// and zero-length arrays or strings. Nested schemas are validated
    /// recursively.
    pub fn validate(&self) -> PduResult<()> {
        let fail = |msg: String| Err(PduError::InvalidSchema(format!("{}: {msg}", self.name)));

        if u32::try_from(self.size).is_err() {
            return fail(format!("size {} exceeds the u32 wire range", self.size));
        }

        let mut names = HashSet::new();
        for field in &self.fields {
            if !names.insert(field.name.as_str()) {
                return fail(format!("duplicate field '{}'", field.name));
            }

            match &field.kind {
                FieldKind::Primitive { kind } | FieldKind::Array { kind, .. }
                | FieldKind::Sequence { kind }
                    if kind.width().is_none() =>
                {
                    return fail(format!(
                        "field '{}' uses caller-sized kind {kind}; use a fixed string",
                        field.name
                    ));
                }
                FieldKind::Array { len: 0, .. } | FieldKind::FixedString { capacity: 0 } => {
                    return fail(format!("field '{}' has zero length", field.name));
                }
                FieldKind::Struct { schema } => schema.validate()?,
                _ => {}
            }

            if field.end() > self.size {
                return fail(format!(
                    "field '{}' ends at {} past struct size {}",
                    field.name,
                    field.end(),
                    self.size
                ));
            }
        }

        let mut spans: Vec<_> = self.fields.iter().map(|f| (f.offset, f.end(), &f.name)).collect();
        spans.sort_by_key(|&(start, _, _)| start);
        for pair in spans.windows(2) {
            let (_, prev_end, prev) = pair[0];
            let (start, _, next) = pair[1];
            if start < prev_end {
                return fail(format!("fields '{prev}' and '{next}' overlap"));
            }
        }

        Ok(())
    }
}

impl fmt::Display for StructSchema {
    /// Layout table, one row per field
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} ({} bytes)", self.name, self.size)?;
        for field in &self.fields {
            writeln!(
                f,
                "  {:>5}  {:<28} {}",
                field.offset,
                field.name,
                field.kind.describe()
            )?;
        }
        Ok(())
    }
}
