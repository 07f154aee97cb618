//! Packet Composer
//!
//! A packet is a service header followed by a message body, encoded as one
//! PDU. The body starts at a fixed offset that belongs to the header type:
//!
//! ```text
//! base region
//! ┌──────────────────────────────┬──────────────────────┐
//! │ header (H::schema().size)    │ body                 │
//! └──────────────────────────────┴──────────────────────┘
//!  0                              H::BODY_OFFSET
//! ```
//!
//! The offset is schema data and is never derived from header contents.

use std::any::TypeId;
use std::sync::Arc;

use dashmap::DashMap;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::error::PduResult;
use crate::schema::{FieldDescriptor, FieldKind, StructSchema};
use crate::structs::{PduStruct, StructDecoder, StructEncoder};

/// Composed schemas keyed by (header, body) type
static PACKET_SCHEMAS: Lazy<DashMap<(TypeId, TypeId), Arc<StructSchema>>> = Lazy::new(DashMap::new);

/// Header types that can open a packet
pub trait PacketHeader: PduStruct {
    /// Byte offset of the body relative to the packet start
    const BODY_OFFSET: usize;
}

/// Header + body pair encoded as a single PDU
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Packet<H, B> {
    pub header: H,
    pub body: B,
}

impl<H: PacketHeader, B: PduStruct> Packet<H, B> {
    pub const BODY_OFFSET: usize = H::BODY_OFFSET;

    pub fn new(header: H, body: B) -> Self {
        Self { header, body }
    }

    pub fn encode(&self) -> PduResult<Vec<u8>> {
        crate::builder::encode_pdu(self)
    }

    pub fn decode(buffer: &[u8]) -> PduResult<Self> {
        crate::parser::decode_pdu(buffer)
    }

    pub fn into_parts(self) -> (H, B) {
        (self.header, self.body)
    }
}

impl<H: PacketHeader, B: PduStruct> PduStruct for Packet<H, B> {
    fn schema() -> Arc<StructSchema> {
        let key = (TypeId::of::<H>(), TypeId::of::<B>());
        if let Some(schema) = PACKET_SCHEMAS.get(&key) {
            return Arc::clone(&schema);
        }
        // Built outside the map lock; nested packets look up their own entry
        let built = Arc::new(packet_schema(H::schema(), B::schema(), H::BODY_OFFSET));
        Arc::clone(PACKET_SCHEMAS.entry(key).or_insert(built).value())
    }

    fn encode_fields(&self, enc: &mut StructEncoder<'_>, base: usize) -> PduResult<()> {
        self.header
            .encode_fields(enc, base)
            .map_err(|e| e.with_field("header"))?;
        self.body
            .encode_fields(enc, base + H::BODY_OFFSET)
            .map_err(|e| e.with_field("body"))
    }

    fn decode_fields(dec: &StructDecoder<'_>, base: usize) -> PduResult<Self> {
        let header = H::decode_fields(dec, base).map_err(|e| e.with_field("header"))?;
        let body =
            B::decode_fields(dec, base + H::BODY_OFFSET).map_err(|e| e.with_field("body"))?;
        Ok(Self { header, body })
    }
}

/// Schema of a header/body packet, named `<body name>Packet`
///
/// Usable with the dynamic codec for packets whose body type is only known
/// at runtime.
pub fn packet_schema(
    header: Arc<StructSchema>,
    body: Arc<StructSchema>,
    body_offset: usize,
) -> StructSchema {
    let name = format!("{}Packet", body.name);
    let size = body_offset + body.size;
    StructSchema::new(
        name,
        size,
        vec![
            FieldDescriptor::new("header", FieldKind::Struct { schema: header }, 0),
            FieldDescriptor::new("body", FieldKind::Struct { schema: body }, body_offset),
        ],
    )
}
