use crate::util::{parse_size, print_population, print_timing, BoardSize};
use anyhow::{anyhow, Result};
use clap::Args;
use multilife::{Board, Display, EngineConfig, SimulationEngine};

#[derive(Args, Debug)]
pub(super) struct RunArgs {
    /// Path to the file containing the board; `.gz` files are decompressed
    #[arg(required_unless_present = "random")]
    board: Option<String>,

    /// Start from a random board of size HEIGHTxWIDTH instead of a file
    #[arg(short, long, value_parser = parse_size, conflicts_with = "board")]
    random: Option<BoardSize>,

    /// Probability of a cell being alive on a random board
    #[arg(short, long, default_value_t = 0.3)]
    density: f64,

    /// Seed of the random board; random if omitted
    #[arg(long)]
    seed: Option<u64>,

    /// The number of generations to simulate
    #[arg(short, long, default_value_t = 100)]
    generations: u32,

    /// The number of worker threads, the number of CPUs by default;
    /// never more than the board height are started
    #[arg(short, long)]
    workers: Option<usize>,

    /// Print the board after every generation
    #[arg(short, long)]
    print: bool,

    /// Animate the board in place; implies --print
    #[arg(short, long)]
    interactive: bool,

    /// Path to the file where the resulting board will be saved
    #[arg(short, long)]
    output: Option<String>,

    /// Print timing statistics of jobs and generations
    #[arg(short, long)]
    stats: bool,

    /// Count population of the resulting board
    #[arg(long)]
    population: bool,
}

pub(super) fn run_simulation(args: RunArgs) -> Result<()> {
    let timer = std::time::Instant::now();
    let board = match (&args.board, args.random) {
        (Some(path), _) => Board::from_file(path)?,
        (None, Some(size)) => Board::random(size.height, size.width, args.density, args.seed)?,
        (None, None) => return Err(anyhow!("Either a board file or --random is required")),
    };
    let display = if args.interactive {
        Display::Interactive
    } else if args.print {
        Display::Print
    } else {
        Display::Off
    };
    let mut config = EngineConfig {
        display,
        ..Default::default()
    };
    if let Some(workers) = args.workers {
        config.workers = workers;
    }
    let mut engine = SimulationEngine::new(board, config)?;
    println!(
        "Loaded {}x{} board and started {} workers in {:.1} secs",
        engine.current_board().height(),
        engine.current_board().width(),
        engine.worker_count(),
        timer.elapsed().as_secs_f64()
    );

    let timer = std::time::Instant::now();
    engine.run(args.generations)?;
    println!(
        "Simulated {} generations in {:.3} secs",
        args.generations,
        timer.elapsed().as_secs_f64()
    );

    if args.population {
        print_population(engine.current_board());
    }
    if args.stats {
        print_timing("Jobs", engine.tile_summary());
        print_timing("Generations", engine.generation_summary());
    }
    if let Some(output) = &args.output {
        engine.current_board().to_file(output)?;
    }
    engine.shutdown()
}
