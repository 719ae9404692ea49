use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use std::hint::black_box;
use std::io::Cursor;
use std::time::Duration;

use hil_cosim::protocol::framing;
use hil_cosim::protocol::message::{Envelope, TelemetryMessage};
use hil_cosim::sim::rx_queue::RxQueue;
use hil_cosim::utils::clock::MonotonicClock;

const FRAMES: u64 = 1024;

fn telemetry_stream() -> Vec<u8> {
    let mut bytes = Vec::new();
    for step_id in 0..FRAMES {
        let frame = framing::encode(&Envelope::Telemetry(TelemetryMessage {
            step_id,
            t_act_recv_ns: step_id * 10,
            t_act_send_ns: step_id * 10 + 3,
            missing_cmd: false,
            note: String::new(),
            payload: serde_json::Map::new(),
        }))
        .unwrap();
        bytes.extend_from_slice(&frame);
    }
    bytes
}

fn rx_queue_bench(c: &mut Criterion) {
    let mut group = c.benchmark_group("rx_queue");
    group.measurement_time(Duration::from_secs(2));
    group.sample_size(50);

    let stream = telemetry_stream();

    // Full ingest: reader thread decodes and enqueues 1024 frames, consumer
    // drains them. Measures the whole decoupled receive path.
    group.bench_function("ingest_and_drain_1024", |b| {
        b.iter_batched(
            || stream.clone(),
            |bytes| {
                let rx = RxQueue::spawn(Cursor::new(bytes), MonotonicClock::new());
                let mut drained = 0u64;
                while drained < FRAMES {
                    if let Some(arrival) = rx.try_pop() {
                        black_box(arrival.telemetry.step_id);
                        drained += 1;
                    } else if rx.is_closed() && rx.is_empty() {
                        break;
                    }
                }
                drained
            },
            BatchSize::SmallInput,
        )
    });

    // Overflow path: capacity far below the frame count forces drop-oldest
    // eviction on nearly every push.
    group.bench_function("overflow_drop_oldest", |b| {
        b.iter_batched(
            || stream.clone(),
            |bytes| {
                let rx = RxQueue::with_capacity(Cursor::new(bytes), MonotonicClock::new(), 64);
                while !rx.is_closed() {
                    std::hint::spin_loop();
                }
                black_box(rx.evicted())
            },
            BatchSize::SmallInput,
        )
    });

    group.finish();
}

criterion_group!(benches, rx_queue_bench);
criterion_main!(benches);
