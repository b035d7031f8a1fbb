use broadside::{select_easy, Difficulty, GameConfig, Match, Phase, Side};
use rand::{rngs::SmallRng, SeedableRng};
use serde_json::json;

// Plays a random-shooting stand-in for the human against the computer and
// prints a JSON summary.
fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();
    if args.len() != 3 {
        eprintln!("Usage: {} <seed> <difficulty>", args[0]);
        std::process::exit(1);
    }
    let seed: u64 = args[1].parse()?;
    let difficulty: Difficulty = args[2].parse()?;

    let config = GameConfig::default().with_difficulty(difficulty);
    let mut game = Match::from_seed(config, seed)?;
    let mut shooter = SmallRng::seed_from_u64(seed.wrapping_add(1));

    game.auto_place_player_ships()?;
    game.start_battle()?;

    let mut turns = 0usize;
    while game.phase() == Phase::Firing {
        let cell = select_easy(game.opponent_board(), &mut shooter)
            .ok_or_else(|| anyhow::anyhow!("no cell left to fire at"))?;
        game.submit_player_shot(cell)?;
        turns += 1;
    }

    let summary = game
        .summary()
        .ok_or_else(|| anyhow::anyhow!("match ended without a summary"))?;
    let winner = match summary.winner {
        Side::Player => "player",
        Side::Opponent => "computer",
    };
    let result = json!({
        "difficulty": difficulty,
        "winner": winner,
        "turns": turns,
        "player": {"score": summary.score_player, "shots": summary.shots_player},
        "computer": {"score": summary.score_opponent, "shots": summary.shots_opponent},
    });

    println!("{}", serde_json::to_string(&result)?);
    Ok(())
}
