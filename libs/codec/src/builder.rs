//! # PDU Builder - Encode Pipeline
//!
//! ## Purpose
//!
//! Runs the struct encoder over a fresh allocator pair and stitches the
//! result into one contiguous buffer:
//!
//! ```text
//! value ──► StructEncoder ──► DynamicAllocator (base) ─┐
//!                        └──► HeapAllocator (heap) ────┤
//!                                                      ▼
//!              [Metadata][base region][heap region]  Vec<u8>
//! ```
//!
//! Nothing is returned until the walk has finished without error, so a
//! half-written allocator can never escape as a finished PDU.

use tracing::debug;

use crate::allocator::{DynamicAllocator, HeapAllocator};
use crate::config::CodecConfig;
use crate::error::{PduError, PduResult};
use crate::metadata::PduMetadata;
use crate::structs::{PduStruct, StructEncoder};

/// Encode a struct into a new PDU buffer with default limits
pub fn encode_pdu<T: PduStruct>(value: &T) -> PduResult<Vec<u8>> {
    encode_pdu_with(value, &CodecConfig::default())
}

/// Encode a struct into a new PDU buffer
pub fn encode_pdu_with<T: PduStruct>(value: &T, config: &CodecConfig) -> PduResult<Vec<u8>> {
    let schema = T::schema();
    let mut base = DynamicAllocator::with_capacity(schema.size);
    let mut heap = HeapAllocator::new();

    value.encode_fields(&mut StructEncoder::new(&mut base, &mut heap), 0)?;

    assemble_pdu(&schema.name, schema.size, base, heap, config)
}

/// Encode into a caller-supplied buffer, returning the encoded length
///
/// Fails with `BufferTooSmall` and leaves `out` untouched when the PDU does
/// not fit.
pub fn encode_pdu_into<T: PduStruct>(value: &T, out: &mut [u8]) -> PduResult<usize> {
    encode_pdu_into_with(value, out, &CodecConfig::default())
}

pub fn encode_pdu_into_with<T: PduStruct>(
    value: &T,
    out: &mut [u8],
    config: &CodecConfig,
) -> PduResult<usize> {
    let pdu = encode_pdu_with(value, config)?;
    if pdu.len() > out.len() {
        return Err(PduError::BufferTooSmall {
            need: pdu.len(),
            got: out.len(),
        });
    }
    out[..pdu.len()].copy_from_slice(&pdu);
    Ok(pdu.len())
}

/// Stitch metadata, base region and heap region into one buffer
///
/// `base_size` is the declared fixed size of the top-level struct; the base
/// region is zero-extended to it. A walk that wrote past it means the schema
/// table is wrong.
pub fn assemble_pdu(
    type_name: &str,
    base_size: usize,
    mut base: DynamicAllocator,
    heap: HeapAllocator,
    config: &CodecConfig,
) -> PduResult<Vec<u8>> {
    if base.size() > base_size {
        return Err(PduError::InvalidSchema(format!(
            "{type_name}: fields wrote {} bytes into a {base_size}-byte base region",
            base.size()
        )));
    }
    base.reserve_to(base_size);

    let meta = PduMetadata::for_regions(base.size(), heap.size())?;
    if meta.total_size() > config.max_pdu_size {
        return Err(PduError::PduTooLarge {
            size: meta.total_size(),
            limit: config.max_pdu_size,
        });
    }

    let mut pdu = vec![0u8; meta.total_size()];
    meta.write_to(&mut pdu);
    pdu[meta.base_off()..meta.heap_off()].copy_from_slice(base.as_bytes());
    pdu[meta.heap_off()..].copy_from_slice(heap.as_bytes());

    debug!(
        "Encoded {} PDU: base {} bytes, heap {} bytes, total {} bytes",
        type_name,
        meta.base_size(),
        meta.heap_size(),
        meta.total_size()
    );
    Ok(pdu)
}
