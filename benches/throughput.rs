use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use tsb_core::{DataRing, DescRing};

const BYTES_PER_ITER: u64 = 64 << 20; // 64 MiB of payload per iteration
const COMPONENT_SIZE: u64 = 8 << 10; // 8 KiB microslice component

fn bench_data_ring_reserve_write(c: &mut Criterion) {
    let mut group = c.benchmark_group("data_ring");
    group.throughput(Throughput::Bytes(BYTES_PER_ITER));

    group.bench_function("reserve_write_commit", |b| {
        let ring = DataRing::new(24); // 16 MiB, big enough that ack never blocks
        let payload = vec![0xabu8; COMPONENT_SIZE as usize];
        let mut ack = 0u64;
        b.iter(|| {
            let mut written = 0u64;
            while written < BYTES_PER_ITER {
                let skip = ring.skip_required(COMPONENT_SIZE);
                match ring.reserve(ack, skip, COMPONENT_SIZE) {
                    Some(r) => {
                        r.write(black_box(&payload));
                        written += skip + COMPONENT_SIZE;
                    }
                    None => {
                        // Advance ack to simulate the consumer keeping up;
                        // a real benchmark of backpressure would instead
                        // drive this from a second thread.
                        ack = ring.write_pos();
                    }
                }
            }
        });
    });

    group.finish();
}

fn bench_desc_ring_reserve_commit(c: &mut Criterion) {
    let mut group = c.benchmark_group("desc_ring");
    const ENTRIES_PER_ITER: u64 = 1_000_000;
    group.throughput(Throughput::Elements(ENTRIES_PER_ITER));

    group.bench_function("reserve_write_commit", |b| {
        let ring = DescRing::new(20); // ~1M entries
        let entry = [0x11u8; tsb_core::DESC_ENTRY_BYTES as usize];
        let mut ack = 0u64;
        b.iter(|| {
            let mut written = 0u64;
            while written < ENTRIES_PER_ITER {
                match ring.reserve(ack, 1) {
                    Some(r) => {
                        r.write_entry(0, black_box(&entry));
                        r.commit();
                        written += 1;
                    }
                    None => ack = ring.write_pos(),
                }
            }
        });
    });

    group.finish();
}

fn bench_skip_required(c: &mut Criterion) {
    c.bench_with_input(
        BenchmarkId::new("data_ring", "skip_required"),
        &COMPONENT_SIZE,
        |b, &len| {
            let ring = DataRing::new(16);
            b.iter(|| black_box(ring.skip_required(len)));
        },
    );
}

criterion_group!(
    benches,
    bench_data_ring_reserve_write,
    bench_desc_ring_reserve_commit,
    bench_skip_required
);
criterion_main!(benches);
