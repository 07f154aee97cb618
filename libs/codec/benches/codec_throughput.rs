//! Encode/decode throughput for small and heap-heavy messages

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use pdu_codec::{decode_pdu, define_pdu, encode_pdu, parse_metadata, FixedString};

define_pdu! {
    pub struct Header("bench/Header", 268) {
        [0] pub request_id: u32,
        [4] pub service_name: FixedString<128>,
        [132] pub client_name: FixedString<128>,
        [260] pub opcode: u32,
        [264] pub poll_msec: i32,
    }
}

define_pdu! {
    pub struct Frame("bench/Frame", 288) {
        [0] pub header: Header,
        [268] pub name: String,
        [276] pub samples: Vec<f64>,
        [284] pub code: u32,
    }
}

fn frame(samples: usize) -> Frame {
    Frame {
        header: Header {
            request_id: 1,
            service_name: FixedString::from("HakoRemoteApi/GetEvent"),
            client_name: FixedString::from("bench-client"),
            opcode: 0,
            poll_msec: 10,
        },
        name: "sensor1".into(),
        samples: (0..samples).map(|i| i as f64).collect(),
        code: 7,
    }
}

fn bench_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode");
    for samples in [0, 64, 4096] {
        let value = frame(samples);
        group.throughput(Throughput::Bytes(encode_pdu(&value).unwrap_or_default().len() as u64));
        group.bench_function(format!("frame_{samples}"), |b| {
            b.iter(|| encode_pdu(black_box(&value)))
        });
    }
    group.finish();
}

fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode");
    for samples in [0, 64, 4096] {
        let bytes = encode_pdu(&frame(samples)).unwrap_or_default();
        group.throughput(Throughput::Bytes(bytes.len() as u64));
        group.bench_function(format!("frame_{samples}"), |b| {
            b.iter(|| decode_pdu::<Frame>(black_box(&bytes)))
        });
    }
    group.bench_function("metadata_only", |b| {
        let bytes = encode_pdu(&frame(0)).unwrap_or_default();
        b.iter(|| parse_metadata(black_box(&bytes)))
    });
    group.finish();
}

criterion_group!(benches, bench_encode, bench_decode);
criterion_main!(benches);
