use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use multilife::{Board, Display, EngineConfig, SimulationEngine};

const SEED: u64 = 42;
const SIDE: usize = 256;

fn bench_generations(c: &mut Criterion) {
    let mut group = c.benchmark_group("generation");
    group.throughput(Throughput::Elements((SIDE * SIDE) as u64));

    let board = Board::random(SIDE, SIDE, 0.35, Some(SEED)).unwrap();
    for &workers in &[1, 2, 4, 8] {
        let config = EngineConfig {
            workers,
            display: Display::Off,
        };
        let mut engine = SimulationEngine::new(board.clone(), config).unwrap();
        group.bench_with_input(BenchmarkId::new("step", workers), &workers, |b, _| {
            b.iter(|| engine.step().unwrap());
        });
        engine.shutdown().unwrap();
    }

    group.finish();
}

criterion_group!(benches, bench_generations);
criterion_main!(benches);
