use broadside::{
    init_logging, place_interactively, print_player_view, read_target, Difficulty, GameConfig,
    Intel, Match, Phase, ShipType, TerminalObserver, DEFAULT_COLUMNS, DEFAULT_ROWS,
};
use clap::Parser;
use log::LevelFilter;
use rand::rngs::SmallRng;
use rand::SeedableRng;

/// Battleship against the computer.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// easy, medium, hard or cheater.
    #[arg(long, default_value = "easy")]
    difficulty: Difficulty,
    #[arg(long, default_value_t = DEFAULT_ROWS)]
    rows: usize,
    #[arg(long, default_value_t = DEFAULT_COLUMNS)]
    columns: usize,
    /// Comma separated ship types, e.g. `battleship,destroyer,destroyer`.
    #[arg(long, value_delimiter = ',')]
    roster: Option<Vec<ShipType>>,
    /// Let the hard and cheater computer see every ship cell from the start.
    #[arg(long)]
    reveal_all: bool,
    /// Place ships by hand instead of at random.
    #[arg(long)]
    manual: bool,
    #[arg(long, help = "Fix RNG seed for reproducible games (e.g., --seed 12345)")]
    seed: Option<u64>,
}

fn main() -> anyhow::Result<()> {
    init_logging(LevelFilter::Warn);
    let cli = Cli::parse();

    let mut config = GameConfig::default()
        .with_difficulty(cli.difficulty)
        .with_dimensions(cli.rows, cli.columns);
    if let Some(roster) = cli.roster {
        config = config.with_roster(roster);
    }
    if cli.reveal_all {
        config = config.with_intel(Intel::FullReveal);
    }

    let rng = if let Some(s) = cli.seed {
        println!("Using fixed seed: {} (game will be reproducible)", s);
        SmallRng::seed_from_u64(s)
    } else {
        let mut seed_rng = rand::rng();
        SmallRng::from_rng(&mut seed_rng)
    };

    let mut game = Match::new(config, rng)?;
    game.set_observer(Box::new(TerminalObserver));
    println!("Difficulty: {}", cli.difficulty.name().to_uppercase());

    if cli.manual {
        place_interactively(&mut game)?;
    } else {
        game.auto_place_player_ships()?;
    }
    game.start_battle()?;

    while game.phase() == Phase::Firing {
        println!();
        print_player_view(&game);
        let cell = read_target(&game)?;
        game.submit_player_shot(cell)?;
    }

    println!();
    print_player_view(&game);
    Ok(())
}
