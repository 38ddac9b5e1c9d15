use anyhow::{anyhow, Result};
use multilife::{Board, TimingSummary, SPECIES_COUNT};
use num_format::{CustomFormat, Grouping, ToFormattedString};

/// Height and width of a board given as `HxW`, e.g. `64x128`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) struct BoardSize {
    pub(super) height: usize,
    pub(super) width: usize,
}

pub(super) fn parse_size(s: &str) -> Result<BoardSize> {
    let (h, w) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| anyhow!("Expected HEIGHTxWIDTH, got {:?}", s))?;
    Ok(BoardSize {
        height: h.trim().parse()?,
        width: w.trim().parse()?,
    })
}

fn formatter() -> CustomFormat {
    CustomFormat::builder()
        .grouping(Grouping::Standard)
        .separator("_")
        .build()
        .unwrap()
}

pub(super) fn print_population(board: &Board) {
    let fmt = formatter();
    println!(
        "Population: {} of {}",
        board.population().to_formatted_string(&fmt),
        (board.height() * board.width()).to_formatted_string(&fmt)
    );
    let census = board.species_census();
    for species in 1..=SPECIES_COUNT as usize {
        if census[species] != 0 {
            println!(
                "  species {} -> {}",
                species,
                census[species].to_formatted_string(&fmt)
            );
        }
    }
}

pub(super) fn print_timing(name: &str, summary: Option<TimingSummary>) {
    let Some(s) = summary else {
        println!("{}: no samples", name);
        return;
    };
    let fmt = formatter();
    println!(
        "{}: {} samples, total {} us, mean {:.1} us, min {:.1} us, max {:.1} us",
        name,
        s.count.to_formatted_string(&fmt),
        (s.total as u64).to_formatted_string(&fmt),
        s.mean,
        s.min,
        s.max
    );
}
