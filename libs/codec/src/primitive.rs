//! # Primitive Codec - Scalar Wire Encoding
//!
//! ## Purpose
//!
//! Converts between Rust scalar values and their fixed-width little-endian
//! wire images. Two entry points share the same byte layout:
//!
//! - **Dynamic**: [`decode`] / [`encode`] over [`PrimitiveKind`] + [`PrimitiveValue`],
//!   used when the schema is only known at runtime
//! - **Typed**: the [`Primitive`] trait on `u8..u64`, `i8..i64`, `bool`, `f32`, `f64`,
//!   used by structs declared with `define_pdu!`
//!
//! ## Wire Rules
//!
//! - Little-endian for every multi-byte value
//! - `bool` occupies 4 bytes: 0 = false, anything else = true, written as 1
//! - `Bytes` is a fixed-length byte string; shorter values are zero padded

use std::fmt;
use std::str::FromStr;

use byteorder::{ByteOrder, LittleEndian};
use num_enum::{IntoPrimitive, TryFromPrimitive};
use serde::{Deserialize, Serialize};

use crate::bounds::safe_slice;
use crate::error::{PduError, PduResult};

/// Scalar kinds understood by the codec
///
/// The `u8` tag is stable and may be used by runtime schema sources.
#[repr(u8)]
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    TryFromPrimitive,
    IntoPrimitive,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum PrimitiveKind {
    #[serde(alias = "byte")]
    Uint8 = 1,
    Uint16 = 2,
    Uint32 = 3,
    Uint64 = 4,
    #[serde(alias = "char")]
    Int8 = 5,
    Int16 = 6,
    Int32 = 7,
    Int64 = 8,
    Bool = 9,
    Float32 = 10,
    Float64 = 11,
    /// Fixed-length byte string; width comes from the field
    Bytes = 12,
}

impl PrimitiveKind {
    /// Wire width in bytes, `None` for caller-sized `Bytes`
    pub const fn width(self) -> Option<usize> {
        match self {
            Self::Uint8 | Self::Int8 => Some(1),
            Self::Uint16 | Self::Int16 => Some(2),
            Self::Uint32 | Self::Int32 | Self::Bool | Self::Float32 => Some(4),
            Self::Uint64 | Self::Int64 | Self::Float64 => Some(8),
            Self::Bytes => None,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Uint8 => "uint8",
            Self::Uint16 => "uint16",
            Self::Uint32 => "uint32",
            Self::Uint64 => "uint64",
            Self::Int8 => "int8",
            Self::Int16 => "int16",
            Self::Int32 => "int32",
            Self::Int64 => "int64",
            Self::Bool => "bool",
            Self::Float32 => "float32",
            Self::Float64 => "float64",
            Self::Bytes => "bytes",
        }
    }

    /// Resolve a wire tag, failing with `UnknownKind`
    pub fn from_tag(tag: u8) -> PduResult<Self> {
        Self::try_from(tag).map_err(|_| PduError::UnknownKind {
            kind: format!("tag {tag}"),
        })
    }

    /// Width check shared by encode and decode
    fn check_width(self, width: usize) -> PduResult<()> {
        match self.width() {
            Some(expected) if expected != width => {
                Err(PduError::invalid_width("", self.name(), expected, width))
            }
            _ => Ok(()),
        }
    }
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PrimitiveKind {
    type Err = PduError;

    /// Accepts schema type names, including the ROS `byte`/`char` aliases
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let kind = match s {
            "uint8" | "byte" => Self::Uint8,
            "uint16" => Self::Uint16,
            "uint32" => Self::Uint32,
            "uint64" => Self::Uint64,
            "int8" | "char" => Self::Int8,
            "int16" => Self::Int16,
            "int32" => Self::Int32,
            "int64" => Self::Int64,
            "bool" => Self::Bool,
            "float32" => Self::Float32,
            "float64" => Self::Float64,
            "bytes" => Self::Bytes,
            other => {
                return Err(PduError::UnknownKind {
                    kind: other.to_string(),
                })
            }
        };
        Ok(kind)
    }
}

/// Dynamically typed scalar value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PrimitiveValue {
    Uint8(u8),
    Uint16(u16),
    Uint32(u32),
    Uint64(u64),
    Int8(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    Bool(bool),
    Float32(f32),
    Float64(f64),
    Bytes(Vec<u8>),
}

impl PrimitiveValue {
    pub fn kind(&self) -> PrimitiveKind {
        match self {
            Self::Uint8(_) => PrimitiveKind::Uint8,
            Self::Uint16(_) => PrimitiveKind::Uint16,
            Self::Uint32(_) => PrimitiveKind::Uint32,
            Self::Uint64(_) => PrimitiveKind::Uint64,
            Self::Int8(_) => PrimitiveKind::Int8,
            Self::Int16(_) => PrimitiveKind::Int16,
            Self::Int32(_) => PrimitiveKind::Int32,
            Self::Int64(_) => PrimitiveKind::Int64,
            Self::Bool(_) => PrimitiveKind::Bool,
            Self::Float32(_) => PrimitiveKind::Float32,
            Self::Float64(_) => PrimitiveKind::Float64,
            Self::Bytes(_) => PrimitiveKind::Bytes,
        }
    }
}

/// Decode one value from an exactly-sized slice
///
/// `bytes.len()` must equal the kind's width; `Bytes` takes the whole slice.
pub fn decode(kind: PrimitiveKind, bytes: &[u8]) -> PduResult<PrimitiveValue> {
    kind.check_width(bytes.len())?;
    let value = match kind {
        PrimitiveKind::Uint8 => PrimitiveValue::Uint8(bytes[0]),
        PrimitiveKind::Uint16 => PrimitiveValue::Uint16(LittleEndian::read_u16(bytes)),
        PrimitiveKind::Uint32 => PrimitiveValue::Uint32(LittleEndian::read_u32(bytes)),
        PrimitiveKind::Uint64 => PrimitiveValue::Uint64(LittleEndian::read_u64(bytes)),
        PrimitiveKind::Int8 => PrimitiveValue::Int8(bytes[0] as i8),
        PrimitiveKind::Int16 => PrimitiveValue::Int16(LittleEndian::read_i16(bytes)),
        PrimitiveKind::Int32 => PrimitiveValue::Int32(LittleEndian::read_i32(bytes)),
        PrimitiveKind::Int64 => PrimitiveValue::Int64(LittleEndian::read_i64(bytes)),
        PrimitiveKind::Bool => PrimitiveValue::Bool(LittleEndian::read_u32(bytes) != 0),
        PrimitiveKind::Float32 => PrimitiveValue::Float32(LittleEndian::read_f32(bytes)),
        PrimitiveKind::Float64 => PrimitiveValue::Float64(LittleEndian::read_f64(bytes)),
        PrimitiveKind::Bytes => PrimitiveValue::Bytes(bytes.to_vec()),
    };
    Ok(value)
}

/// Bounds-checked decode of `width` bytes at `offset`
pub fn decode_at(
    kind: PrimitiveKind,
    buffer: &[u8],
    offset: usize,
    width: usize,
) -> PduResult<PrimitiveValue> {
    decode(kind, safe_slice(buffer, offset, width)?)
}

/// Encode one value into exactly `width` bytes
pub fn encode(kind: PrimitiveKind, value: &PrimitiveValue, width: usize) -> PduResult<Vec<u8>> {
    kind.check_width(width)?;
    if value.kind() != kind {
        return Err(PduError::invalid_width(
            "",
            format!("{} (value is {})", kind, value.kind()),
            width,
            value_width(value),
        ));
    }

    let mut out = vec![0u8; width];
    match value {
        PrimitiveValue::Uint8(v) => v.write_le(&mut out),
        PrimitiveValue::Uint16(v) => v.write_le(&mut out),
        PrimitiveValue::Uint32(v) => v.write_le(&mut out),
        PrimitiveValue::Uint64(v) => v.write_le(&mut out),
        PrimitiveValue::Int8(v) => v.write_le(&mut out),
        PrimitiveValue::Int16(v) => v.write_le(&mut out),
        PrimitiveValue::Int32(v) => v.write_le(&mut out),
        PrimitiveValue::Int64(v) => v.write_le(&mut out),
        PrimitiveValue::Bool(v) => v.write_le(&mut out),
        PrimitiveValue::Float32(v) => v.write_le(&mut out),
        PrimitiveValue::Float64(v) => v.write_le(&mut out),
        PrimitiveValue::Bytes(bytes) => {
            if bytes.len() > width {
                return Err(PduError::invalid_width("", kind.name(), width, bytes.len()));
            }
            out[..bytes.len()].copy_from_slice(bytes);
        }
    }
    Ok(out)
}

fn value_width(value: &PrimitiveValue) -> usize {
    match value {
        PrimitiveValue::Bytes(bytes) => bytes.len(),
        other => other.kind().width().unwrap_or(0),
    }
}

/// Rust scalar types with a fixed wire image
pub trait Primitive: Copy + Sized {
    const KIND: PrimitiveKind;
    /// Width in bytes on the wire
    const WIDTH: usize;

    /// Read from a slice of exactly `WIDTH` bytes
    fn read_le(bytes: &[u8]) -> Self;
    /// Write into a slice of exactly `WIDTH` bytes
    fn write_le(self, out: &mut [u8]);

    fn into_value(self) -> PrimitiveValue;
    fn from_value(value: &PrimitiveValue) -> Option<Self>;
}

macro_rules! impl_primitive {
    ($ty:ty, $kind:ident, $width:expr, $read:expr, $write:expr) => {
        impl Primitive for $ty {
            const KIND: PrimitiveKind = PrimitiveKind::$kind;
            const WIDTH: usize = $width;

            #[inline]
            fn read_le(bytes: &[u8]) -> Self {
                $read(bytes)
            }

            #[inline]
            fn write_le(self, out: &mut [u8]) {
                $write(out, self)
            }

            fn into_value(self) -> PrimitiveValue {
                PrimitiveValue::$kind(self)
            }

            fn from_value(value: &PrimitiveValue) -> Option<Self> {
                match value {
                    PrimitiveValue::$kind(v) => Some(*v),
                    _ => None,
                }
            }
        }
    };
}

impl_primitive!(u8, Uint8, 1, |b: &[u8]| b[0], |o: &mut [u8], v: u8| o[0] = v);
impl_primitive!(i8, Int8, 1, |b: &[u8]| b[0] as i8, |o: &mut [u8], v: i8| o[0] = v as u8);
impl_primitive!(u16, Uint16, 2, LittleEndian::read_u16, LittleEndian::write_u16);
impl_primitive!(u32, Uint32, 4, LittleEndian::read_u32, LittleEndian::write_u32);
impl_primitive!(u64, Uint64, 8, LittleEndian::read_u64, LittleEndian::write_u64);
impl_primitive!(i16, Int16, 2, LittleEndian::read_i16, LittleEndian::write_i16);
impl_primitive!(i32, Int32, 4, LittleEndian::read_i32, LittleEndian::write_i32);
impl_primitive!(i64, Int64, 8, LittleEndian::read_i64, LittleEndian::write_i64);
impl_primitive!(f32, Float32, 4, LittleEndian::read_f32, LittleEndian::write_f32);
impl_primitive!(f64, Float64, 8, LittleEndian::read_f64, LittleEndian::write_f64);
impl_primitive!(
    bool,
    Bool,
    4,
    |b: &[u8]| LittleEndian::read_u32(b) != 0,
    |o: &mut [u8], v: bool| LittleEndian::write_u32(o, v as u32)
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_little_endian_layout() {
        let bytes = encode(PrimitiveKind::Uint32, &PrimitiveValue::Uint32(0x0102_0304), 4).unwrap();
        assert_eq!(bytes, vec![0x04, 0x03, 0x02, 0x01]);

        let bytes = encode(PrimitiveKind::Int16, &PrimitiveValue::Int16(-2), 2).unwrap();
        assert_eq!(bytes, vec![0xFE, 0xFF]);
    }

    #[test]
    fn test_bool_is_four_bytes() {
        let bytes = encode(PrimitiveKind::Bool, &PrimitiveValue::Bool(true), 4).unwrap();
        assert_eq!(bytes, vec![1, 0, 0, 0]);

        // Any nonzero word reads as true
        assert_eq!(
            decode(PrimitiveKind::Bool, &[0, 0, 2, 0]).unwrap(),
            PrimitiveValue::Bool(true)
        );
        assert_eq!(
            decode(PrimitiveKind::Bool, &[0, 0, 0, 0]).unwrap(),
            PrimitiveValue::Bool(false)
        );
    }

    #[test]
    fn test_width_mismatch_is_rejected() {
        let err = encode(PrimitiveKind::Uint32, &PrimitiveValue::Uint32(1), 8).unwrap_err();
        assert!(matches!(err, PduError::InvalidWidth { expected: 4, got: 8, .. }));

        let err = decode(PrimitiveKind::Float64, &[0u8; 4]).unwrap_err();
        assert!(matches!(err, PduError::InvalidWidth { expected: 8, got: 4, .. }));

        // Value of another kind is a contract violation too
        assert!(encode(PrimitiveKind::Uint32, &PrimitiveValue::Int32(1), 4).is_err());
    }

    #[test]
    fn test_decode_at_never_reads_past_buffer() {
        let buf = [0u8; 6];
        let err = decode_at(PrimitiveKind::Uint64, &buf, 2, 8).unwrap_err();
        assert!(matches!(err, PduError::OutOfBounds { offset: 2, need: 8, got: 6, .. }));
        assert_eq!(
            decode_at(PrimitiveKind::Uint32, &buf, 2, 4).unwrap(),
            PrimitiveValue::Uint32(0)
        );
    }

    #[test]
    fn test_fixed_bytes_are_zero_padded() {
        let value = PrimitiveValue::Bytes(b"abc".to_vec());
        let bytes = encode(PrimitiveKind::Bytes, &value, 5).unwrap();
        assert_eq!(bytes, b"abc\0\0".to_vec());
        assert!(encode(PrimitiveKind::Bytes, &value, 2).is_err());
    }

    #[test]
    fn test_kind_names_and_tags() {
        assert_eq!("uint32".parse::<PrimitiveKind>().unwrap(), PrimitiveKind::Uint32);
        assert_eq!("byte".parse::<PrimitiveKind>().unwrap(), PrimitiveKind::Uint8);
        assert!(matches!(
            "uint128".parse::<PrimitiveKind>(),
            Err(PduError::UnknownKind { .. })
        ));

        assert_eq!(PrimitiveKind::from_tag(9).unwrap(), PrimitiveKind::Bool);
        assert!(matches!(PrimitiveKind::from_tag(0), Err(PduError::UnknownKind { .. })));
        assert_eq!(u8::from(PrimitiveKind::Float64), 11);
    }

    #[test]
    fn test_json_names_match_parser() {
        for name in ["uint8", "byte", "int8", "char", "float64"] {
            let from_json: PrimitiveKind = serde_json::from_str(&format!("\"{name}\"")).unwrap();
            assert_eq!(from_json, name.parse().unwrap(), "{name}");
        }
        assert_eq!(serde_json::to_string(&PrimitiveKind::Uint8).unwrap(), "\"uint8\"");
    }

    #[test]
    fn test_typed_matches_dynamic() {
        let mut typed = [0u8; 8];
        (-123456789i64).write_le(&mut typed);
        let dynamic = encode(PrimitiveKind::Int64, &PrimitiveValue::Int64(-123456789), 8).unwrap();
        assert_eq!(typed.to_vec(), dynamic);
        assert_eq!(i64::read_le(&typed), -123456789);
        assert_eq!(<f32 as Primitive>::WIDTH, 4);
        assert_eq!(bool::from_value(&PrimitiveValue::Bool(true)), Some(true));
        assert_eq!(bool::from_value(&PrimitiveValue::Uint8(1)), None);
    }
}
