//! Benchmark for the proof-of-work search

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use powallet_core::ProofOfWork;

fn bench_digest(c: &mut Criterion) {
    let pow = ProofOfWork::new(b"benchmark seed for powallet proof-of-work");

    c.bench_function("pow_digest", |b| {
        let mut nonce: u64 = 0;
        b.iter(|| {
            nonce = nonce.wrapping_add(1);
            pow.digest(black_box(nonce))
        })
    });
}

fn bench_find(c: &mut Criterion) {
    let pow = ProofOfWork::new(b"hello world");

    c.bench_function("pow_find_difficulty_3", |b| {
        b.iter(|| pow.find(black_box(3)))
    });

    #[cfg(feature = "parallel")]
    c.bench_function("pow_find_parallel_difficulty_3", |b| {
        b.iter(|| pow.find_parallel(black_box(3)))
    });
}

criterion_group!(benches, bench_digest, bench_find);
criterion_main!(benches);
