//! # PDU Codec - Binary Message Substrate
//!
//! ## Purpose
//!
//! Schema-agnostic encode/decode of PDU (Protocol Data Unit) messages shared
//! between simulation engines and language runtimes. Every message uses one
//! wire layout:
//!
//! ```text
//! [0 .. 24)                  Metadata { magicno, version, base_off, heap_off, total_size, reserved }
//! [base_off .. heap_off)     Base region: fixed-offset scalars and nested structs
//! [heap_off .. total_size)   Heap region: variable-length strings and sequences
//! ```
//!
//! All integers are little-endian. Heap-backed fields store an
//! `(offset: u32, length: u32)` pair in the base region, with the offset
//! relative to `heap_off` and the length in bytes.
//!
//! ## Architecture Role
//!
//! ```text
//! schema table ──► define_pdu! ──► PduStruct impl ──┐
//!                                                   ├──► builder ──► Vec<u8>
//! JSON schema ───► SchemaRegistry ──► dynamic ──────┘
//!                                                        parser ◄── &[u8]
//! ```
//!
//! ## What This Crate Contains
//! - **Primitive codec**: scalar kinds to fixed-width LE bytes
//! - **Allocators**: base-region writer and append-only heap writer
//! - **Metadata + parser**: header layout, validation with diagnostics
//! - **Recursive struct codec**: `PduField`/`PduStruct` and `define_pdu!`
//! - **Packet composer**: header + body at a fixed body offset
//! - **Dynamic codec + registry**: runtime schemas loaded from JSON
//!
//! ## What This Crate Does NOT Contain
//! - Message catalogs (belong in `pdu-types`)
//! - Transport, polling loops or request/response correlation

pub mod allocator;
pub mod bounds;
pub mod builder;
pub mod codec;
pub mod config;
pub mod constants;
pub mod dynamic;
pub mod error;
pub mod metadata;
pub mod packet;
pub mod parser;
pub mod primitive;
pub mod registry;
pub mod schema;
pub mod structs;

pub use allocator::{DynamicAllocator, HeapAllocator};
pub use builder::{encode_pdu, encode_pdu_into, encode_pdu_into_with, encode_pdu_with};
pub use codec::PduCodec;
pub use config::CodecConfig;
pub use constants::*;
pub use dynamic::{decode_dynamic, encode_dynamic, DynamicStruct, PduValue};
pub use error::{PduError, PduResult};
pub use metadata::PduMetadata;
pub use packet::{packet_schema, Packet, PacketHeader};
pub use parser::{decode_pdu, decode_pdu_with, parse_metadata, parse_metadata_with, pdu_size};
pub use primitive::{Primitive, PrimitiveKind, PrimitiveValue};
pub use registry::SchemaRegistry;
pub use schema::{FieldDescriptor, FieldKind, StructSchema};
pub use structs::{FixedString, PduField, PduStruct, StructDecoder, StructEncoder};

#[doc(hidden)]
pub mod __private {
    pub use once_cell::sync::Lazy;
}
