use crate::util::{parse_size, print_population, BoardSize};
use anyhow::Result;
use clap::Args;
use multilife::Board;

#[derive(Args, Debug)]
pub(super) struct GenerateArgs {
    /// Size of the board as HEIGHTxWIDTH, e.g. 64x128
    #[arg(value_parser = parse_size)]
    size: BoardSize,

    /// Path to the file where the board will be saved; `.gz` files are compressed
    #[arg(short, long)]
    output: String,

    /// Probability of a cell being alive
    #[arg(short, long, default_value_t = 0.3)]
    density: f64,

    /// Seed of the random generator; random if omitted
    #[arg(short, long)]
    seed: Option<u64>,

    /// Count population of the generated board
    #[arg(short, long)]
    population: bool,
}

pub(super) fn run_generate(args: GenerateArgs) -> Result<()> {
    let board = Board::random(args.size.height, args.size.width, args.density, args.seed)?;
    if args.population {
        print_population(&board);
    }
    board.to_file(&args.output)
}
