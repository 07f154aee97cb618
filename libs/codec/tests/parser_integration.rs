//! # Parser Integration Tests
//!
//! Damaged buffers must fail with a typed error and never panic.

use pdu_codec::{
    decode_pdu, define_pdu, encode_pdu, parse_metadata, parse_metadata_with, pdu_size,
    CodecConfig, PduError, PDU_META_DATA_SIZE,
};
use tracing_subscriber::EnvFilter;

/// Rejections are logged at warn; `RUST_LOG=pdu_codec=warn` shows them
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

define_pdu! {
    pub struct Report("demo/Report", 24) {
        [0] pub source: String,
        [8] pub samples: Vec<u16>,
        [16] pub seq: u64,
    }
}

fn report_bytes() -> Vec<u8> {
    encode_pdu(&Report {
        source: "lidar".into(),
        samples: vec![1, 2, 3, 4],
        seq: 77,
    })
    .unwrap()
}

#[test]
fn test_truncation_below_header() {
    let bytes = report_bytes();
    for len in 0..PDU_META_DATA_SIZE {
        assert!(matches!(
            decode_pdu::<Report>(&bytes[..len]),
            Err(PduError::CorruptMetadata { .. })
        ));
    }
}

#[test]
fn test_every_truncation_fails_closed() {
    let bytes = report_bytes();
    for len in 0..bytes.len() {
        assert!(decode_pdu::<Report>(&bytes[..len]).is_err(), "len {len} decoded");
    }
    assert!(decode_pdu::<Report>(&bytes).is_ok());
}

#[test]
fn test_zeroed_metadata() {
    init_tracing();
    let mut bytes = report_bytes();
    bytes[..PDU_META_DATA_SIZE].fill(0);
    match parse_metadata(&bytes).unwrap_err() {
        PduError::CorruptMetadata { reason, buffer_size } => {
            assert!(reason.contains("magic"));
            assert_eq!(buffer_size, bytes.len());
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_single_byte_corruption_never_panics() {
    init_tracing();
    let clean = report_bytes();
    for pos in 0..clean.len() {
        for pattern in [0x00, 0xFF, 0x7F] {
            let mut bytes = clean.clone();
            bytes[pos] = pattern;
            let _ = decode_pdu::<Report>(&bytes);
        }
    }
}

#[test]
fn test_heap_reference_outside_heap() {
    let mut bytes = report_bytes();
    // source offset -> far past the heap
    bytes[PDU_META_DATA_SIZE..PDU_META_DATA_SIZE + 4].copy_from_slice(&0xFFFF_FFF0u32.to_le_bytes());
    match decode_pdu::<Report>(&bytes).unwrap_err() {
        PduError::OutOfBounds { field, .. } => assert_eq!(field, "source"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_base_region_smaller_than_struct() {
    let mut bytes = report_bytes();
    // heap_off -> base_off + 8, shrinking the declared base region
    bytes[12..16].copy_from_slice(&32u32.to_le_bytes());
    assert!(matches!(
        decode_pdu::<Report>(&bytes),
        Err(PduError::CorruptMetadata { .. })
    ));
}

#[test]
fn test_trailing_bytes_depend_on_config() {
    let mut bytes = report_bytes();
    let size = bytes.len();
    bytes.extend_from_slice(&[0xAB; 16]);

    assert_eq!(pdu_size(&bytes).unwrap(), size);
    assert!(decode_pdu::<Report>(&bytes).is_ok());
    assert!(parse_metadata_with(&bytes, &CodecConfig::strict()).is_err());
}
