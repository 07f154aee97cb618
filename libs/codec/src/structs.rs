//! # Recursive Struct Codec
//!
//! ## Purpose
//!
//! The one read/write contract every message type goes through. A struct is
//! encoded by walking its fields in declared order:
//!
//! - **primitive / fixed string / array** → bytes into the base region at
//!   `parent offset + field offset`
//! - **nested struct** → recurse with `parent offset + field offset`
//! - **string / sequence** → payload appended to the heap, `(offset, length)`
//!   written into the base region
//!
//! Decoding mirrors this, with offsets absolute in the received buffer and
//! heap references resolved against `heap_off` from the metadata.
//!
//! ## Declaring Types
//!
//! Per-type code is schema data only. [`define_pdu!`](crate::define_pdu)
//! takes the field-offset table and generates the struct, its
//! [`StructSchema`] and the [`PduStruct`] impl:
//!
//! ```rust
//! use pdu_codec::{define_pdu, encode_pdu, decode_pdu};
//!
//! define_pdu! {
//!     /// Event lookup by sensor name
//!     pub struct EventQuery("demo/EventQuery", 12) {
//!         [0] pub name: String,
//!         [8] pub code: u32,
//!     }
//! }
//!
//! let query = EventQuery { name: "sensor1".into(), code: 7 };
//! let bytes = encode_pdu(&query).unwrap();
//! assert_eq!(decode_pdu::<EventQuery>(&bytes).unwrap(), query);
//! ```

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::trace;

use crate::allocator::{DynamicAllocator, HeapAllocator};
use crate::bounds::{safe_slice, SafeConvert};
use crate::constants::HEAP_REF_SIZE;
use crate::error::{PduError, PduResult};
use crate::metadata::PduMetadata;
use crate::primitive::Primitive;
use crate::schema::{FieldKind, StructSchema};

/// Writer side of one encode call
///
/// Borrows the allocator pair for the duration of the walk; offsets are
/// relative to the start of the base region.
pub struct StructEncoder<'a> {
    base: &'a mut DynamicAllocator,
    heap: &'a mut HeapAllocator,
}

impl<'a> StructEncoder<'a> {
    pub fn new(base: &'a mut DynamicAllocator, heap: &'a mut HeapAllocator) -> Self {
        Self { base, heap }
    }

    /// Fixed-size bytes into the base region
    pub fn put_bytes(&mut self, offset: usize, bytes: &[u8]) {
        self.base.add(bytes, offset);
    }

    pub fn put_primitive<T: Primitive>(&mut self, offset: usize, value: T) {
        let mut buf = [0u8; 8];
        value.write_le(&mut buf[..T::WIDTH]);
        self.base.add(&buf[..T::WIDTH], offset);
    }

    /// Payload into the heap, `(offset, length)` into the base region
    pub fn put_heap(&mut self, offset: usize, payload: &[u8]) -> PduResult<()> {
        let length: u32 = payload.len().safe_convert()?;
        let heap_offset: u32 = self.heap.add(payload).safe_convert()?;
        trace!("heap payload of {} bytes at heap offset {}", length, heap_offset);

        let mut reference = [0u8; HEAP_REF_SIZE];
        heap_offset.write_le(&mut reference[..4]);
        length.write_le(&mut reference[4..]);
        self.base.add(&reference, offset);
        Ok(())
    }
}

/// Reader side of one decode call
///
/// The buffer is cut to `total_size`, so no read can reach bytes that follow
/// the PDU in a larger transport buffer.
pub struct StructDecoder<'a> {
    meta: &'a PduMetadata,
    buffer: &'a [u8],
}

impl<'a> StructDecoder<'a> {
    /// `buffer` must be the one `meta` was parsed from
    pub fn new(meta: &'a PduMetadata, buffer: &'a [u8]) -> Self {
        let end = meta.total_size().min(buffer.len());
        Self {
            meta,
            buffer: &buffer[..end],
        }
    }

    pub fn meta(&self) -> &PduMetadata {
        self.meta
    }

    pub fn bytes(&self, offset: usize, len: usize) -> PduResult<&'a [u8]> {
        safe_slice(self.buffer, offset, len)
    }

    pub fn primitive<T: Primitive>(&self, offset: usize) -> PduResult<T> {
        Ok(T::read_le(self.bytes(offset, T::WIDTH)?))
    }

    /// Follow the `(offset, length)` pair at `offset` into the heap region
    pub fn heap_payload(&self, offset: usize) -> PduResult<&'a [u8]> {
        let heap_offset: u32 = self.primitive(offset)?;
        let length: u32 = self.primitive(offset + 4)?;
        let start = self.meta.heap_off().saturating_add(heap_offset as usize);
        self.bytes(start, length as usize)
    }
}

/// A Rust type that can occupy one schema field
pub trait PduField: Sized {
    /// Storage class this type maps to
    fn field_kind() -> FieldKind;

    fn encode_field(&self, enc: &mut StructEncoder<'_>, offset: usize) -> PduResult<()>;

    fn decode_field(dec: &StructDecoder<'_>, offset: usize) -> PduResult<Self>;
}

/// A message type with a fixed base-region layout
pub trait PduStruct: Sized + 'static {
    /// Field-offset table; identical for every instance
    fn schema() -> Arc<StructSchema>;

    /// Encode every field, with `base` the struct's offset in the base region
    fn encode_fields(&self, enc: &mut StructEncoder<'_>, base: usize) -> PduResult<()>;

    /// Decode every field, with `base` the struct's absolute offset in the buffer
    fn decode_fields(dec: &StructDecoder<'_>, base: usize) -> PduResult<Self>;
}

macro_rules! impl_primitive_field {
    ($($ty:ty),*) => {
        $(
            impl PduField for $ty {
                fn field_kind() -> FieldKind {
                    FieldKind::primitive(<$ty as Primitive>::KIND)
                }

                fn encode_field(&self, enc: &mut StructEncoder<'_>, offset: usize) -> PduResult<()> {
                    enc.put_primitive(offset, *self);
                    Ok(())
                }

                fn decode_field(dec: &StructDecoder<'_>, offset: usize) -> PduResult<Self> {
                    dec.primitive(offset)
                }
            }
        )*
    };
}

impl_primitive_field!(u8, u16, u32, u64, i8, i16, i32, i64, bool, f32, f64);

impl PduField for String {
    fn field_kind() -> FieldKind {
        FieldKind::String
    }

    fn encode_field(&self, enc: &mut StructEncoder<'_>, offset: usize) -> PduResult<()> {
        enc.put_heap(offset, self.as_bytes())
    }

    fn decode_field(dec: &StructDecoder<'_>, offset: usize) -> PduResult<Self> {
        decode_utf8(dec.heap_payload(offset)?)
    }
}

impl<T: Primitive> PduField for Vec<T> {
    fn field_kind() -> FieldKind {
        FieldKind::Sequence { kind: T::KIND }
    }

    fn encode_field(&self, enc: &mut StructEncoder<'_>, offset: usize) -> PduResult<()> {
        let mut payload = vec![0u8; self.len() * T::WIDTH];
        for (value, chunk) in self.iter().zip(payload.chunks_exact_mut(T::WIDTH)) {
            value.write_le(chunk);
        }
        enc.put_heap(offset, &payload)
    }

    fn decode_field(dec: &StructDecoder<'_>, offset: usize) -> PduResult<Self> {
        let payload = dec.heap_payload(offset)?;
        if payload.len() % T::WIDTH != 0 {
            return Err(PduError::invalid_width(
                "",
                format!("{}[]", T::KIND),
                T::WIDTH,
                payload.len() % T::WIDTH,
            ));
        }
        Ok(payload.chunks_exact(T::WIDTH).map(T::read_le).collect())
    }
}

impl<T: Primitive + Default, const N: usize> PduField for [T; N] {
    fn field_kind() -> FieldKind {
        FieldKind::Array { kind: T::KIND, len: N }
    }

    fn encode_field(&self, enc: &mut StructEncoder<'_>, offset: usize) -> PduResult<()> {
        let mut image = vec![0u8; N * T::WIDTH];
        for (value, chunk) in self.iter().zip(image.chunks_exact_mut(T::WIDTH)) {
            value.write_le(chunk);
        }
        enc.put_bytes(offset, &image);
        Ok(())
    }

    fn decode_field(dec: &StructDecoder<'_>, offset: usize) -> PduResult<Self> {
        let image = dec.bytes(offset, N * T::WIDTH)?;
        let mut out = [T::default(); N];
        for (slot, chunk) in out.iter_mut().zip(image.chunks_exact(T::WIDTH)) {
            *slot = T::read_le(chunk);
        }
        Ok(out)
    }
}

/// Text stored NUL-terminated in `N` bytes of the base region
///
/// At most `N - 1` bytes of UTF-8 fit; longer text fails with `InvalidWidth`
/// on encode instead of being truncated.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct FixedString<const N: usize>(String);

impl<const N: usize> FixedString<N> {
    pub const CAPACITY: usize = N;

    pub fn new(text: impl Into<String>) -> PduResult<Self> {
        let text = text.into();
        check_fixed_text(&text, N)?;
        Ok(Self(text))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl<const N: usize> From<&str> for FixedString<N> {
    /// Unchecked; an over-long value is reported when it is encoded
    fn from(text: &str) -> Self {
        Self(text.to_string())
    }
}

impl<const N: usize> fmt::Display for FixedString<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<const N: usize> Serialize for FixedString<N> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de, const N: usize> Deserialize<'de> for FixedString<N> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Self::new(text).map_err(serde::de::Error::custom)
    }
}

impl<const N: usize> PduField for FixedString<N> {
    fn field_kind() -> FieldKind {
        FieldKind::FixedString { capacity: N }
    }

    fn encode_field(&self, enc: &mut StructEncoder<'_>, offset: usize) -> PduResult<()> {
        enc.put_bytes(offset, &encode_fixed_string(&self.0, N)?);
        Ok(())
    }

    fn decode_field(dec: &StructDecoder<'_>, offset: usize) -> PduResult<Self> {
        Ok(Self(decode_fixed_string(dec.bytes(offset, N)?)?))
    }
}

fn check_fixed_text(text: &str, capacity: usize) -> PduResult<()> {
    if capacity == 0 {
        return Err(PduError::InvalidSchema("string[0] has no room for its terminator".into()));
    }
    if text.len() >= capacity {
        return Err(PduError::invalid_width(
            "",
            format!("string[{capacity}]"),
            capacity - 1,
            text.len(),
        ));
    }
    if text.as_bytes().contains(&0) {
        return Err(PduError::invalid_string("", "embedded NUL byte"));
    }
    Ok(())
}

/// Zero-padded image of `text` in `capacity` bytes
pub fn encode_fixed_string(text: &str, capacity: usize) -> PduResult<Vec<u8>> {
    check_fixed_text(text, capacity)?;
    let mut image = vec![0u8; capacity];
    image[..text.len()].copy_from_slice(text.as_bytes());
    Ok(image)
}

/// Text up to the first NUL of a fixed string image
pub fn decode_fixed_string(image: &[u8]) -> PduResult<String> {
    let end = image.iter().position(|&b| b == 0).unwrap_or(image.len());
    decode_utf8(&image[..end])
}

pub(crate) fn decode_utf8(bytes: &[u8]) -> PduResult<String> {
    String::from_utf8(bytes.to_vec()).map_err(|e| PduError::invalid_string("", e.to_string()))
}

/// Declare a PDU struct from its field-offset table
///
/// Each field is written `[offset] vis name: Type`. The struct size is the
/// fixed base-region size including any trailing padding. Field types map to
/// storage classes through [`PduField`]: scalars, `FixedString<N>`, `[T; N]`,
/// `String` and `Vec<T>` (heap), or another `define_pdu!` struct.
#[macro_export]
macro_rules! define_pdu {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident ($type_name:literal, $size:expr) {
            $(
                $(#[$fmeta:meta])*
                [$offset:expr] $fvis:vis $field:ident : $fty:ty
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Default)]
        $vis struct $name {
            $(
                $(#[$fmeta])*
                $fvis $field: $fty,
            )*
        }

        impl $name {
            /// Fixed encoded size in the base region
            pub const SIZE: usize = $size;
            /// Fully qualified schema type name
            pub const TYPE_NAME: &'static str = $type_name;
        }

        impl $crate::PduStruct for $name {
            fn schema() -> ::std::sync::Arc<$crate::StructSchema> {
                static SCHEMA: $crate::__private::Lazy<::std::sync::Arc<$crate::StructSchema>> =
                    $crate::__private::Lazy::new(|| {
                        ::std::sync::Arc::new($crate::StructSchema::new(
                            $type_name,
                            $size,
                            ::std::vec![
                                $(
                                    $crate::FieldDescriptor::new(
                                        stringify!($field),
                                        <$fty as $crate::PduField>::field_kind(),
                                        $offset,
                                    ),
                                )*
                            ],
                        ))
                    });
                ::std::sync::Arc::clone(&SCHEMA)
            }

            fn encode_fields(
                &self,
                enc: &mut $crate::StructEncoder<'_>,
                base: usize,
            ) -> $crate::PduResult<()> {
                $(
                    $crate::PduField::encode_field(&self.$field, enc, base + $offset)
                        .map_err(|e| e.with_field(stringify!($field)))?;
                )*
                Ok(())
            }

            fn decode_fields(
                dec: &$crate::StructDecoder<'_>,
                base: usize,
            ) -> $crate::PduResult<Self> {
                Ok(Self {
                    $(
                        $field: <$fty as $crate::PduField>::decode_field(dec, base + $offset)
                            .map_err(|e| e.with_field(stringify!($field)))?,
                    )*
                })
            }
        }

        impl $crate::PduField for $name {
            fn field_kind() -> $crate::FieldKind {
                $crate::FieldKind::Struct {
                    schema: <$name as $crate::PduStruct>::schema(),
                }
            }

            fn encode_field(
                &self,
                enc: &mut $crate::StructEncoder<'_>,
                offset: usize,
            ) -> $crate::PduResult<()> {
                <$name as $crate::PduStruct>::encode_fields(self, enc, offset)
            }

            fn decode_field(dec: &$crate::StructDecoder<'_>, offset: usize) -> $crate::PduResult<Self> {
                <$name as $crate::PduStruct>::decode_fields(dec, offset)
            }
        }
    };
}
