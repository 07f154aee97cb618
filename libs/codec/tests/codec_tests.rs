//! # PDU Codec Integration Tests
//!
//! Exercises the public API the way downstream crates use it:
//! - golden wire images for typed messages
//! - nested structs, fixed strings and heap fields end to end
//! - typed and dynamic paths agreeing byte for byte
//! - concurrent encode/decode over shared static schemas

use hex_literal::hex;
use pdu_codec::{
    decode_dynamic, decode_pdu, define_pdu, encode_dynamic, encode_pdu, parse_metadata,
    FixedString, PduCodec, PduError, PduStruct, PduValue, SchemaRegistry, PDU_META_DATA_MAGICNO,
    PDU_META_DATA_SIZE, PDU_META_DATA_VERSION,
};

define_pdu! {
    pub struct Event("demo/Event", 12) {
        [0] pub name: String,
        [8] pub code: u32,
    }
}

define_pdu! {
    pub struct Pose("demo/Pose", 16) {
        [0] pub x: f32,
        [4] pub y: f32,
        [8] pub heading: f64,
    }
}

define_pdu! {
    pub struct Vehicle("demo/Vehicle", 80) {
        [0] pub id: u32,
        [4] pub armed: bool,
        [8] pub pose: Pose,
        [24] pub callsign: FixedString<16>,
        [40] pub waypoints: Vec<f64>,
        [48] pub owner: String,
        [56] pub wheels: [u8; 4],
        [64] pub stamp: i64,
    }
}

fn vehicle() -> Vehicle {
    Vehicle {
        id: 42,
        armed: true,
        pose: Pose { x: 1.0, y: -1.0, heading: 3.25 },
        callsign: FixedString::new("rover-1").unwrap(),
        waypoints: vec![0.0, 10.5, -3.0],
        owner: "hakoniwa".into(),
        wheels: [1, 2, 3, 4],
        stamp: 1_700_000_000_000,
    }
}

#[test]
fn test_golden_wire_image() {
    let bytes = encode_pdu(&Event { name: "sensor1".into(), code: 0x0A0B_0C0D }).unwrap();
    let expected = hex!(
        "78563412 02000000 18000000 24000000 2b000000 00000000"
        "00000000 07000000 0d0c0b0a"
        "73656e736f7231"
    );
    assert_eq!(bytes, expected.to_vec());
}

#[test]
fn test_constants() {
    assert_eq!(PDU_META_DATA_SIZE, 24);
    assert_eq!(PDU_META_DATA_MAGICNO, 0x1234_5678);
    assert_eq!(PDU_META_DATA_VERSION, 2);
}

#[test]
fn test_nested_round_trip() {
    let value = vehicle();
    let bytes = encode_pdu(&value).unwrap();

    let meta = parse_metadata(&bytes).unwrap();
    assert_eq!(meta.base_off(), PDU_META_DATA_SIZE);
    assert_eq!(meta.base_size(), Vehicle::SIZE);
    assert_eq!(meta.heap_size(), 3 * 8 + "hakoniwa".len());
    assert_eq!(meta.total_size(), bytes.len());

    assert_eq!(decode_pdu::<Vehicle>(&bytes).unwrap(), value);
}

#[test]
fn test_empty_heap_fields() {
    let value = Vehicle::default();
    let bytes = encode_pdu(&value).unwrap();
    assert_eq!(bytes.len(), PDU_META_DATA_SIZE + Vehicle::SIZE);
    assert_eq!(decode_pdu::<Vehicle>(&bytes).unwrap(), value);
}

#[test]
fn test_bool_reads_any_nonzero_word() {
    let mut bytes = encode_pdu(&vehicle()).unwrap();
    let armed = PDU_META_DATA_SIZE + 4;
    assert_eq!(&bytes[armed..armed + 4], &[1, 0, 0, 0]);

    bytes[armed..armed + 4].copy_from_slice(&[0, 0, 0x80, 0]);
    assert!(decode_pdu::<Vehicle>(&bytes).unwrap().armed);

    bytes[armed..armed + 4].copy_from_slice(&[0; 4]);
    assert!(!decode_pdu::<Vehicle>(&bytes).unwrap().armed);
}

#[test]
fn test_encoding_is_deterministic() {
    let first = encode_pdu(&vehicle()).unwrap();
    for _ in 0..10 {
        assert_eq!(encode_pdu(&vehicle()).unwrap(), first);
    }
}

#[test]
fn test_typed_and_dynamic_agree() {
    let typed = encode_pdu(&vehicle()).unwrap();
    let schema = Vehicle::schema();

    let value = decode_dynamic(&schema, &typed).unwrap();
    let pose = value.get("pose").and_then(PduValue::as_struct).unwrap();
    assert_eq!(pose.get("heading").and_then(PduValue::as_primitive::<f64>), Some(3.25));
    assert_eq!(value.get("callsign").and_then(PduValue::as_str), Some("rover-1"));

    assert_eq!(encode_dynamic(&schema, &value).unwrap(), typed);
}

#[test]
fn test_registry_with_compiled_types() {
    let mut registry = SchemaRegistry::new();
    registry.register_type::<Vehicle>().unwrap();
    registry.register_type::<Event>().unwrap();
    assert_eq!(
        registry.names().collect::<Vec<_>>(),
        vec!["demo/Event", "demo/Vehicle"]
    );

    let reloaded = {
        let mut r = SchemaRegistry::new();
        r.load_json(&registry.to_json().unwrap()).unwrap();
        r
    };
    reloaded.verify_type::<Vehicle>().unwrap();

    let bytes = encode_pdu(&vehicle()).unwrap();
    let value = reloaded.decode_dynamic("demo/Vehicle", &bytes).unwrap();
    assert_eq!(reloaded.encode_dynamic(&value).unwrap(), bytes);
}

#[test]
fn test_layout_table() {
    let table = Vehicle::schema().to_string();
    assert!(table.starts_with("demo/Vehicle (80 bytes)"));
    assert!(table.contains("demo/Pose"));
    assert!(table.contains("string[16]"));
    assert!(table.contains("float64[]"));
}

#[test]
fn test_errors_name_the_failing_field() {
    let mut value = vehicle();
    value.callsign = FixedString::from("callsign-that-is-too-long");
    match encode_pdu(&value).unwrap_err() {
        PduError::InvalidWidth { field, expected, .. } => {
            assert_eq!(field, "callsign");
            assert_eq!(expected, 15);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_concurrent_codec_use() {
    let codec = PduCodec::default();
    std::thread::scope(|s| {
        for worker in 0..8u32 {
            let codec = &codec;
            s.spawn(move || {
                for i in 0..200u32 {
                    let value = Event { name: format!("sensor{worker}-{i}"), code: worker * 1000 + i };
                    let bytes = codec.encode(&value).unwrap();
                    assert_eq!(codec.decode::<Event>(&bytes).unwrap(), value);
                }
            });
        }
    });
}
