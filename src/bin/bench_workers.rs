use multilife::*;

const SEED: u64 = 42;
const GENERATIONS: u32 = 50;

fn main() {
    // same board for every pool size, so the times are comparable
    let board = Board::random(512, 512, 0.35, Some(SEED)).unwrap();
    let max_workers = std::thread::available_parallelism().map_or(4, |n| n.get());
    let mut reference = None;

    let mut workers = 1;
    while workers <= max_workers {
        let config = EngineConfig {
            workers,
            display: Display::Off,
        };
        let mut engine = SimulationEngine::new(board.clone(), config).unwrap();

        let timer = std::time::Instant::now();
        engine.run(GENERATIONS).unwrap();
        let elapsed = timer.elapsed();
        let jobs = engine.tile_summary().unwrap();
        println!(
            "workers={}\ttime={:.3}\tmean_gen_us={:.1}\tmean_job_us={:.1}",
            workers,
            elapsed.as_secs_f64(),
            engine.generation_summary().unwrap().mean,
            jobs.mean
        );

        let result = engine.current_board().clone();
        match &reference {
            None => reference = Some(result),
            Some(expected) => assert_eq!(&result, expected, "result depends on worker count"),
        }
        engine.shutdown().unwrap();
        workers *= 2;
    }
}
