use broadside::{
    select_easy, Difficulty, GameConfig, Intel, Match, MatchEvent, Phase, ShipType, Side,
    HIT_SCORE, MISS_PENALTY,
};
use rand::rngs::SmallRng;
use rand::SeedableRng;

fn expected_score(hits: usize, fired: usize) -> i32 {
    hits as i32 * HIT_SCORE - (fired - hits) as i32 * MISS_PENALTY
}

fn play_out(config: GameConfig, seed: u64) -> Match {
    let mut game = Match::from_seed(config, seed).unwrap();
    let mut shooter = SmallRng::seed_from_u64(seed ^ 0xdead_beef);
    game.auto_place_player_ships().unwrap();
    game.start_battle().unwrap();

    let cells = game.config().rows * game.config().columns;
    let mut turns = 0;
    while game.phase() == Phase::Firing {
        let target = select_easy(game.opponent_board(), &mut shooter).unwrap();
        game.submit_player_shot(target).unwrap();
        turns += 1;
        if turns > cells {
            panic!("game took too many turns");
        }
    }
    game
}

fn check_finished(game: &Match) {
    let summary = *game.summary().unwrap();
    match summary.winner {
        Side::Player => assert!(game.opponent_fleet().all_destroyed()),
        Side::Opponent => assert!(game.player_fleet().all_destroyed()),
    }

    let player_hits = game.opponent_board().hits().count_ones();
    let player_fired = game.opponent_board().fired().count_ones();
    let computer_hits = game.player_board().hits().count_ones();
    let computer_fired = game.player_board().fired().count_ones();
    assert_eq!(summary.score_player, expected_score(player_hits, player_fired));
    assert_eq!(summary.score_opponent, expected_score(computer_hits, computer_fired));
    assert_eq!(summary.shots_player, player_fired);
    assert_eq!(summary.shots_opponent, computer_fired);

    let shots = game
        .history()
        .iter()
        .filter(|e| matches!(e, MatchEvent::ShotResolved(_)))
        .count();
    assert_eq!(shots, player_fired + computer_fired);
}

#[test]
fn test_every_difficulty_finishes() {
    for difficulty in Difficulty::ALL {
        for seed in 0..5 {
            let config = GameConfig::default().with_difficulty(difficulty);
            let game = play_out(config, seed);
            assert_eq!(game.phase(), Phase::Finished, "{} seed {}", difficulty, seed);
            check_finished(&game);
        }
    }
}

#[test]
fn test_full_reveal_games_finish() {
    for difficulty in [Difficulty::Hard, Difficulty::Cheater] {
        let config = GameConfig::default()
            .with_difficulty(difficulty)
            .with_intel(Intel::FullReveal);
        let game = play_out(config, 77);
        check_finished(&game);
    }
}

#[test]
fn test_cramped_board_finishes() {
    let config = GameConfig::default()
        .with_dimensions(5, 5)
        .with_roster(vec![ShipType::Battleship; 5])
        .with_difficulty(Difficulty::Cheater);
    let game = play_out(config, 4);
    check_finished(&game);
    assert_eq!(game.player_board().occupied_count(), 25);
}

#[test]
fn test_same_seed_same_game() {
    let config = GameConfig::default().with_difficulty(Difficulty::Hard);
    let a = play_out(config.clone(), 2024);
    let b = play_out(config, 2024);
    assert_eq!(a.history(), b.history());
}
