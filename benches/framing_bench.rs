use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use std::hint::black_box;
use std::io::Cursor;
use std::time::Duration;

use serde_json::json;

use hil_cosim::protocol::framing;
use hil_cosim::protocol::message::{CommandMessage, Envelope, TelemetryMessage};

fn framing_bench(c: &mut Criterion) {
    let mut group = c.benchmark_group("framing");
    group.measurement_time(Duration::from_secs(2));
    group.sample_size(50);

    let command = Envelope::Command(CommandMessage {
        step_id: 1234,
        timestamp_ns: 987_654_321,
        cmd: json!({"value": 123.4}),
    });

    let mut payload = serde_json::Map::new();
    payload.insert("result".into(), json!(123.4));
    payload.insert("state".into(), json!({"sum": 123.4}));
    let telemetry = Envelope::Telemetry(TelemetryMessage {
        step_id: 1234,
        t_act_recv_ns: 111_111,
        t_act_send_ns: 222_222,
        missing_cmd: false,
        note: "addition_processed".into(),
        payload,
    });

    group.bench_function("encode_command", |b| {
        b.iter(|| framing::encode(black_box(&command)).unwrap())
    });

    let telemetry_frame = framing::encode(&telemetry).unwrap();
    group.bench_function("decode_telemetry", |b| {
        b.iter_batched(
            || Cursor::new(telemetry_frame.clone()),
            |mut cursor| black_box(framing::decode_one(&mut cursor).unwrap()),
            BatchSize::SmallInput,
        )
    });

    group.bench_function("roundtrip_command", |b| {
        b.iter(|| {
            let frame = framing::encode(black_box(&command)).unwrap();
            framing::decode_one(&mut Cursor::new(frame)).unwrap()
        })
    });

    group.finish();
}

criterion_group!(benches, framing_bench);
criterion_main!(benches);
