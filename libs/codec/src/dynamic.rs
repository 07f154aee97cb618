//! # Dynamic Codec - Runtime Schemas
//!
//! Encodes and decodes PDUs whose layout is only known at runtime, e.g. a
//! [`StructSchema`] loaded from JSON. Values are an owned tree of
//! [`PduValue`]s keyed by field name.
//!
//! The walk is the same one the typed codec performs (same allocators, same
//! field order, same heap references), so a typed value and its dynamic
//! mirror encode to identical bytes.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::allocator::{DynamicAllocator, HeapAllocator};
use crate::builder::assemble_pdu;
use crate::config::CodecConfig;
use crate::error::{PduError, PduResult};
use crate::parser::{check_base_region, parse_metadata_with};
use crate::primitive::{self, Primitive, PrimitiveKind, PrimitiveValue};
use crate::schema::{FieldKind, StructSchema};
use crate::structs::{
    decode_fixed_string, decode_utf8, encode_fixed_string, StructDecoder, StructEncoder,
};

/// Value of one field in a runtime-typed struct
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PduValue {
    Primitive(PrimitiveValue),
    FixedString(String),
    String(String),
    Array(Vec<PrimitiveValue>),
    Sequence(Vec<PrimitiveValue>),
    Struct(DynamicStruct),
}

impl PduValue {
    pub fn primitive<T: Primitive>(value: T) -> Self {
        Self::Primitive(value.into_value())
    }

    /// Scalar of type `T`, if this is a primitive of that kind
    pub fn as_primitive<T: Primitive>(&self) -> Option<T> {
        match self {
            Self::Primitive(value) => T::from_value(value),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::FixedString(text) | Self::String(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_struct(&self) -> Option<&DynamicStruct> {
        match self {
            Self::Struct(value) => Some(value),
            _ => None,
        }
    }

    /// Short form used in mismatch errors
    pub fn describe(&self) -> String {
        match self {
            Self::Primitive(value) => value.kind().to_string(),
            Self::FixedString(_) => "fixed string".to_string(),
            Self::String(_) => "string".to_string(),
            Self::Array(items) => format!("array of {}", items.len()),
            Self::Sequence(items) => format!("sequence of {}", items.len()),
            Self::Struct(value) => format!("struct {}", value.type_name),
        }
    }
}

/// Runtime-typed struct: type name plus fields in declared order
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DynamicStruct {
    pub type_name: String,
    pub fields: Vec<(String, PduValue)>,
}

impl DynamicStruct {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            fields: Vec::new(),
        }
    }

    /// Builder-style field insert; replaces an existing field of that name
    pub fn with(mut self, name: impl Into<String>, value: PduValue) -> Self {
        self.set(name, value);
        self
    }

    pub fn set(&mut self, name: impl Into<String>, value: PduValue) {
        let name = name.into();
        match self.fields.iter_mut().find(|(n, _)| *n == name) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&PduValue> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }
}

/// Encode a runtime-typed struct against `schema` with default limits
pub fn encode_dynamic(schema: &StructSchema, value: &DynamicStruct) -> PduResult<Vec<u8>> {
    encode_dynamic_with(schema, value, &CodecConfig::default())
}

/// Encode against `schema` after validating it
pub fn encode_dynamic_with(
    schema: &StructSchema,
    value: &DynamicStruct,
    config: &CodecConfig,
) -> PduResult<Vec<u8>> {
    schema.validate()?;
    if schema.size > config.max_pdu_size {
        return Err(PduError::PduTooLarge {
            size: schema.size,
            limit: config.max_pdu_size,
        });
    }

    let mut base = DynamicAllocator::with_capacity(schema.size);
    let mut heap = HeapAllocator::new();

    encode_struct(schema, value, &mut StructEncoder::new(&mut base, &mut heap), 0)?;

    assemble_pdu(&schema.name, schema.size, base, heap, config)
}

/// Decode a PDU into a runtime-typed struct with default limits
pub fn decode_dynamic(schema: &StructSchema, data: &[u8]) -> PduResult<DynamicStruct> {
    decode_dynamic_with(schema, data, &CodecConfig::default())
}

/// Decode against `schema` after validating it
pub fn decode_dynamic_with(
    schema: &StructSchema,
    data: &[u8],
    config: &CodecConfig,
) -> PduResult<DynamicStruct> {
    schema.validate()?;
    let meta = parse_metadata_with(data, config)?;
    check_base_region(&meta, schema.size, data.len())?;

    let decoder = StructDecoder::new(&meta, data);
    let value = decode_struct(schema, &decoder, meta.base_off())?;

    debug!(
        "Decoded {} PDU dynamically: {} bytes ({} heap)",
        schema.name,
        meta.total_size(),
        meta.heap_size()
    );
    Ok(value)
}

fn encode_struct(
    schema: &StructSchema,
    value: &DynamicStruct,
    enc: &mut StructEncoder<'_>,
    base: usize,
) -> PduResult<()> {
    if !value.type_name.is_empty() && value.type_name != schema.name {
        return Err(PduError::schema_mismatch(
            "",
            schema.name.as_str(),
            value.type_name.as_str(),
        ));
    }

    if let Some((name, _)) = value.fields.iter().find(|(n, _)| schema.field(n).is_none()) {
        return Err(PduError::schema_mismatch(name.as_str(), "no such field", "value"));
    }

    for field in &schema.fields {
        let field_value = value
            .get(&field.name)
            .ok_or_else(|| PduError::schema_mismatch("", field.kind.describe(), "missing"))
            .and_then(|v| encode_value(&field.kind, v, enc, base + field.offset));
        field_value.map_err(|e| e.with_field(&field.name))?;
    }
    Ok(())
}

fn encode_value(
    kind: &FieldKind,
    value: &PduValue,
    enc: &mut StructEncoder<'_>,
    offset: usize,
) -> PduResult<()> {
    match (kind, value) {
        (FieldKind::Primitive { kind }, PduValue::Primitive(scalar)) => {
            enc.put_bytes(offset, &encode_scalar(*kind, scalar)?);
        }
        (FieldKind::FixedString { capacity }, PduValue::FixedString(text)) => {
            enc.put_bytes(offset, &encode_fixed_string(text, *capacity)?);
        }
        (FieldKind::Array { kind, len }, PduValue::Array(items)) => {
            if items.len() != *len {
                return Err(PduError::schema_mismatch(
                    "",
                    format!("{kind}[{len}]"),
                    format!("{kind}[{}]", items.len()),
                ));
            }
            enc.put_bytes(offset, &encode_scalars(*kind, items)?);
        }
        (FieldKind::String, PduValue::String(text)) => {
            enc.put_heap(offset, text.as_bytes())?;
        }
        (FieldKind::Sequence { kind }, PduValue::Sequence(items)) => {
            enc.put_heap(offset, &encode_scalars(*kind, items)?)?;
        }
        (FieldKind::Struct { schema }, PduValue::Struct(inner)) => {
            encode_struct(schema, inner, enc, offset)?;
        }
        (kind, value) => {
            return Err(PduError::schema_mismatch("", kind.describe(), value.describe()));
        }
    }
    Ok(())
}

fn encode_scalar(kind: PrimitiveKind, value: &PrimitiveValue) -> PduResult<Vec<u8>> {
    if value.kind() != kind {
        return Err(PduError::schema_mismatch("", kind.name(), value.kind().name()));
    }
    primitive::encode(kind, value, scalar_width(kind)?)
}

fn encode_scalars(kind: PrimitiveKind, items: &[PrimitiveValue]) -> PduResult<Vec<u8>> {
    let mut out = Vec::with_capacity(items.len() * scalar_width(kind)?);
    for item in items {
        out.extend_from_slice(&encode_scalar(kind, item)?);
    }
    Ok(out)
}

fn scalar_width(kind: PrimitiveKind) -> PduResult<usize> {
    kind.width().ok_or_else(|| PduError::UnknownKind {
        kind: format!("{kind} (no fixed width)"),
    })
}

fn decode_struct(
    schema: &StructSchema,
    dec: &StructDecoder<'_>,
    base: usize,
) -> PduResult<DynamicStruct> {
    let mut value = DynamicStruct::new(schema.name.as_str());
    for field in &schema.fields {
        let field_value = decode_value(&field.kind, dec, base + field.offset)
            .map_err(|e| e.with_field(&field.name))?;
        value.fields.push((field.name.clone(), field_value));
    }
    Ok(value)
}

fn decode_value(kind: &FieldKind, dec: &StructDecoder<'_>, offset: usize) -> PduResult<PduValue> {
    let value = match kind {
        FieldKind::Primitive { kind } => {
            let width = scalar_width(*kind)?;
            PduValue::Primitive(primitive::decode(*kind, dec.bytes(offset, width)?)?)
        }
        FieldKind::FixedString { capacity } => {
            PduValue::FixedString(decode_fixed_string(dec.bytes(offset, *capacity)?)?)
        }
        FieldKind::Array { kind, len } => {
            let width = scalar_width(*kind)?;
            let size = width.checked_mul(*len).ok_or_else(|| {
                PduError::InvalidSchema(format!("array {kind}[{len}] overflows address space"))
            })?;
            PduValue::Array(decode_scalars(*kind, dec.bytes(offset, size)?)?)
        }
        FieldKind::String => PduValue::String(decode_utf8(dec.heap_payload(offset)?)?),
        FieldKind::Sequence { kind } => {
            PduValue::Sequence(decode_scalars(*kind, dec.heap_payload(offset)?)?)
        }
        FieldKind::Struct { schema } => PduValue::Struct(decode_struct(schema, dec, offset)?),
    };
    Ok(value)
}

fn decode_scalars(kind: PrimitiveKind, payload: &[u8]) -> PduResult<Vec<PrimitiveValue>> {
    let width = scalar_width(kind)?;
    if payload.len() % width != 0 {
        return Err(PduError::invalid_width(
            "",
            format!("{kind}[]"),
            width,
            payload.len() % width,
        ));
    }
    payload
        .chunks_exact(width)
        .map(|chunk| primitive::decode(kind, chunk))
        .collect()
}
