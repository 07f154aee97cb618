//! # PDU Parser - Metadata Validation and Decode Entry
//!
//! ## Purpose
//!
//! Every decode starts here. [`parse_metadata`] validates the 24-byte header
//! before any field is touched; a header that is short, zeroed, from another
//! protocol, or internally inconsistent fails with `CorruptMetadata`. There is
//! no "not found" sentinel: callers always get either a usable header or an
//! error.
//!
//! ## Checks
//!
//! 1. buffer holds at least `PDU_META_DATA_SIZE` bytes
//! 2. magic number matches
//! 3. version matches (unless disabled in config)
//! 4. `PDU_META_DATA_SIZE <= base_off <= heap_off <= total_size <= buffer length`
//! 5. `total_size` within the configured maximum (and equal to the buffer
//!    length when exact framing is required)

use tracing::{debug, warn};
use zerocopy::FromBytes;

use crate::config::CodecConfig;
use crate::constants::{PDU_META_DATA_MAGICNO, PDU_META_DATA_SIZE, PDU_META_DATA_VERSION};
use crate::error::{PduError, PduResult};
use crate::metadata::{PduMetadata, PduMetadataWire};
use crate::structs::{PduStruct, StructDecoder};

/// Parse and validate the metadata header with default limits
pub fn parse_metadata(data: &[u8]) -> PduResult<PduMetadata> {
    parse_metadata_with(data, &CodecConfig::default())
}

/// Parse and validate the metadata header
pub fn parse_metadata_with(data: &[u8], config: &CodecConfig) -> PduResult<PduMetadata> {
    let reject = |reason: String| {
        let shown = data.len().min(PDU_META_DATA_SIZE);
        warn!(
            "Rejected PDU metadata: {} (header bytes: {})",
            reason,
            hex::encode(&data[..shown])
        );
        PduError::corrupt_metadata(reason, data.len())
    };

    if data.len() < PDU_META_DATA_SIZE {
        return Err(reject(format!(
            "buffer shorter than metadata header ({} < {})",
            data.len(),
            PDU_META_DATA_SIZE
        )));
    }

    let wire = PduMetadataWire::read_from_prefix(data)
        .ok_or_else(|| reject("metadata header unreadable".to_string()))?;
    let meta = PduMetadata::from_wire(&wire);

    if meta.magicno() != PDU_META_DATA_MAGICNO {
        return Err(reject(format!(
            "invalid magic {:#010x}, expected {:#010x} ({})",
            meta.magicno(),
            PDU_META_DATA_MAGICNO,
            diagnose_magic(meta.magicno())
        )));
    }

    if config.verify_version && meta.version() != PDU_META_DATA_VERSION {
        return Err(reject(format!(
            "unsupported version {}, expected {}",
            meta.version(),
            PDU_META_DATA_VERSION
        )));
    }

    if meta.base_off() < PDU_META_DATA_SIZE {
        return Err(reject(format!(
            "base_off {} overlaps metadata header",
            meta.base_off()
        )));
    }

    if meta.base_off() > meta.heap_off() || meta.heap_off() > meta.total_size() {
        return Err(reject(format!(
            "region offsets not monotonic (base_off {}, heap_off {}, total_size {})",
            meta.base_off(),
            meta.heap_off(),
            meta.total_size()
        )));
    }

    if meta.total_size() > data.len() {
        return Err(reject(format!(
            "total_size {} exceeds buffer length",
            meta.total_size()
        )));
    }

    if config.require_exact_length && meta.total_size() != data.len() {
        return Err(reject(format!(
            "total_size {} differs from buffer length",
            meta.total_size()
        )));
    }

    if meta.total_size() > config.max_pdu_size {
        return Err(reject(format!(
            "total_size {} exceeds limit {}",
            meta.total_size(),
            config.max_pdu_size
        )));
    }

    Ok(meta)
}

fn diagnose_magic(actual: u32) -> &'static str {
    match actual {
        0x0000_0000 => "uninitialized buffer",
        0xFFFF_FFFF => "corrupted buffer",
        _ if actual.swap_bytes() == PDU_META_DATA_MAGICNO => "byte order (endianness) mismatch",
        _ => "not a PDU or data corruption",
    }
}

/// Total encoded size declared by a valid header
pub fn pdu_size(data: &[u8]) -> PduResult<usize> {
    Ok(parse_metadata(data)?.total_size())
}

/// Decode a struct from a PDU buffer with default limits
pub fn decode_pdu<T: PduStruct>(data: &[u8]) -> PduResult<T> {
    decode_pdu_with(data, &CodecConfig::default())
}

/// Decode a struct from a PDU buffer
///
/// Fails closed: any error aborts the decode and no partial value is
/// returned.
pub fn decode_pdu_with<T: PduStruct>(data: &[u8], config: &CodecConfig) -> PduResult<T> {
    let meta = parse_metadata_with(data, config)?;
    let schema = T::schema();
    check_base_region(&meta, schema.size, data.len())?;

    let decoder = StructDecoder::new(&meta, data);
    let value = T::decode_fields(&decoder, meta.base_off())?;

    debug!(
        "Decoded {} PDU: {} bytes ({} heap)",
        schema.name,
        meta.total_size(),
        meta.heap_size()
    );
    Ok(value)
}

/// Base region must hold the whole fixed-size struct
pub(crate) fn check_base_region(
    meta: &PduMetadata,
    struct_size: usize,
    buffer_size: usize,
) -> PduResult<()> {
    if meta.base_size() < struct_size {
        return Err(PduError::corrupt_metadata(
            format!(
                "base region holds {} bytes, struct needs {}",
                meta.base_size(),
                struct_size
            ),
            buffer_size,
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(base_off: u32, heap_off: u32, total_size: u32) -> Vec<u8> {
        let mut data = Vec::new();
        for word in [PDU_META_DATA_MAGICNO, PDU_META_DATA_VERSION, base_off, heap_off, total_size, 0] {
            data.extend_from_slice(&word.to_le_bytes());
        }
        data.resize(total_size.max(24) as usize, 0);
        data
    }

    #[test]
    fn test_valid_header() {
        let data = header(24, 32, 40);
        let meta = parse_metadata(&data).unwrap();
        assert_eq!(meta.base_size(), 8);
        assert_eq!(meta.heap_size(), 8);
        assert_eq!(pdu_size(&data).unwrap(), 40);
    }

    #[test]
    fn test_short_buffer() {
        for len in [0, 1, 23] {
            let data = vec![0u8; len];
            assert!(matches!(
                parse_metadata(&data),
                Err(PduError::CorruptMetadata { buffer_size, .. }) if buffer_size == len
            ));
        }
    }

    #[test]
    fn test_zeroed_header() {
        let data = vec![0u8; 64];
        let err = parse_metadata(&data).unwrap_err();
        assert!(err.to_string().contains("uninitialized buffer"), "{err}");
    }

    #[test]
    fn test_byte_swapped_magic() {
        let mut data = header(24, 24, 24);
        data[..4].copy_from_slice(&PDU_META_DATA_MAGICNO.to_be_bytes());
        let err = parse_metadata(&data).unwrap_err();
        assert!(err.to_string().contains("endianness"), "{err}");
    }

    #[test]
    fn test_inconsistent_offsets() {
        assert!(parse_metadata(&header(8, 24, 24)).is_err()); // base inside header
        assert!(parse_metadata(&header(32, 24, 40)).is_err()); // base > heap
        assert!(parse_metadata(&header(24, 48, 40)).is_err()); // heap > total

        let mut data = header(24, 32, 40);
        data.truncate(36);
        assert!(parse_metadata(&data).is_err()); // total > len
    }

    #[test]
    fn test_version_check_is_configurable() {
        let mut data = header(24, 24, 24);
        data[4] = 1;
        assert!(parse_metadata(&data).is_err());
        assert!(parse_metadata_with(&data, &CodecConfig::relaxed()).is_ok());
    }

    #[test]
    fn test_exact_length() {
        let mut data = header(24, 24, 24);
        data.extend_from_slice(&[0; 8]);
        assert!(parse_metadata(&data).is_ok());
        assert!(parse_metadata_with(&data, &CodecConfig::strict()).is_err());
    }
}
