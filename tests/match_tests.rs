use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use broadside::{
    Attacker, Board, BoardError, Cell, Difficulty, Direction, GameConfig, ManualClock, Match,
    MatchError, MatchEvent, MatchObserver, MatchSummary, Phase, ShotEvent, ShotOutcome, Side,
    TurnControl,
};
use rand::rngs::SmallRng;

fn cell(row: usize, column: usize) -> Cell {
    Cell::new(row, column)
}

/// Fires at a fixed list of cells.
struct Scripted {
    cells: VecDeque<Cell>,
}

impl Scripted {
    fn boxed(cells: impl IntoIterator<Item = Cell>) -> Box<Self> {
        Box::new(Self {
            cells: cells.into_iter().collect(),
        })
    }
}

impl Attacker for Scripted {
    fn select_target(&mut self, _rng: &mut SmallRng, _board: &Board) -> Option<Cell> {
        self.cells.pop_front()
    }
}

#[derive(Default)]
struct Recorder {
    shots: Vec<ShotEvent>,
    scores: Vec<(Side, i32)>,
    finished: Option<MatchSummary>,
}

struct SharedRecorder(Arc<Mutex<Recorder>>);

impl MatchObserver for SharedRecorder {
    fn on_shot_resolved(&mut self, event: &ShotEvent) {
        self.0.lock().unwrap().shots.push(*event);
    }

    fn on_score_changed(&mut self, side: Side, score: i32) {
        self.0.lock().unwrap().scores.push((side, score));
    }

    fn on_match_finished(&mut self, summary: &MatchSummary) {
        self.0.lock().unwrap().finished = Some(*summary);
    }
}

/// Player ships laid out in rows 0, 2 and 4, starting at column 0.
fn player_cells() -> Vec<Cell> {
    let mut cells: Vec<Cell> = (0..5).map(|c| cell(0, c)).collect();
    cells.extend((0..4).map(|c| cell(2, c)));
    cells.extend((0..4).map(|c| cell(4, c)));
    cells
}

fn new_match(difficulty: Difficulty) -> Match {
    let config = GameConfig::default().with_difficulty(difficulty);
    let mut game = Match::from_seed(config, 99).unwrap();
    let ids = game.unplaced_ships();
    for (id, row) in ids.into_iter().zip([0, 2, 4]) {
        assert!(game.set_ship_direction(id, Direction::Horizontal).unwrap());
        assert!(game.place_ship(id, cell(row, 0)).unwrap());
    }
    game
}

fn started_match() -> Match {
    let mut game = new_match(Difficulty::Easy);
    game.start_battle().unwrap();
    game
}

fn opponent_miss(game: &Match, nth: usize) -> Cell {
    let board = game.opponent_board();
    board
        .cells()
        .filter(|c| board.occupant(*c).is_none())
        .nth(nth)
        .unwrap()
}

fn opponent_ship_cells(game: &Match) -> Vec<Cell> {
    let board = game.opponent_board();
    board.cells().filter(|c| board.occupant(*c).is_some()).collect()
}

#[test]
fn test_placement_then_battle() {
    let mut game = Match::from_seed(GameConfig::default(), 5).unwrap();
    assert_eq!(game.phase(), Phase::Placing);
    assert_eq!(game.unplaced_ships().len(), 3);
    assert_eq!(game.opponent_board().occupied_count(), 13);

    assert_eq!(
        game.submit_player_shot(cell(0, 0)).unwrap_err(),
        MatchError::WrongPhase {
            expected: Phase::Firing,
            actual: Phase::Placing
        }
    );
    assert_eq!(game.start_battle().unwrap_err(), MatchError::ShipsUnplaced(3));

    game.auto_place_player_ships().unwrap();
    assert!(game.unplaced_ships().is_empty());
    game.start_battle().unwrap();
    assert_eq!(game.phase(), Phase::Firing);
    assert_eq!(game.turn(), Side::Player);
    assert!(game.player_board().is_finalized());

    let id = game.player_fleet().ships()[0].id();
    assert!(matches!(
        game.place_ship(id, cell(9, 0)),
        Err(MatchError::WrongPhase { .. })
    ));
    assert!(matches!(
        game.start_battle(),
        Err(MatchError::WrongPhase { .. })
    ));
}

#[test]
fn test_placement_helpers() {
    let mut game = Match::from_seed(GameConfig::default(), 6).unwrap();
    let ids = game.unplaced_ships();
    let (battleship, destroyer) = (ids[0], ids[1]);

    assert_eq!(game.compute_fit(battleship, cell(6, 0)).unwrap(), None);
    assert_eq!(game.compute_fit(battleship, cell(5, 0)).unwrap().unwrap().len(), 5);

    game.select_ship(battleship).unwrap();
    assert_eq!(game.selected_ship(), Some(battleship));
    assert!(game.place_selected(cell(0, 0)).unwrap());
    assert_eq!(game.selected_ship(), None);
    assert!(!game.place_selected(cell(0, 5)).unwrap());

    // the vertical battleship blocks column 0
    assert!(!game.place_ship(destroyer, cell(1, 0)).unwrap());
    assert!(game.place_ship(destroyer, cell(0, 1)).unwrap());

    // rotating in place would cross the destroyer
    assert!(!game.rotate_ship(battleship).unwrap());
    assert_eq!(
        game.player_fleet().get(battleship).unwrap().direction(),
        Direction::Vertical
    );
    game.pick_up_ship(destroyer).unwrap();
    assert!(game.rotate_ship(battleship).unwrap());
    assert_eq!(game.unplaced_ships(), vec![destroyer, ids[2]]);
}

#[test]
fn test_miss_costs_ten_and_hit_earns_fifty() {
    let mut game = started_match();
    game.set_attacker(Scripted::boxed([cell(9, 9)]));

    let miss = opponent_miss(&game, 0);
    let report = game.submit_player_shot(miss).unwrap();
    assert!(!report.player_shot.outcome.was_hit);
    assert_eq!(game.score(Side::Player), -10);
    assert_eq!(report.opponent_shots.len(), 1);
    assert_eq!(game.score(Side::Opponent), -10);
    assert_eq!(game.turn(), Side::Player);

    let hit = opponent_ship_cells(&game)[0];
    let report = game.submit_player_shot(hit).unwrap();
    assert!(report.player_shot.outcome.was_hit);
    assert!(report.opponent_shots.is_empty());
    assert_eq!(game.score(Side::Player), 40);
    assert_eq!(game.turn(), Side::Player);
}

#[test]
fn test_computer_keeps_turn_while_hitting() {
    let mut game = started_match();
    game.set_attacker(Scripted::boxed([cell(0, 0), cell(0, 1), cell(9, 9), cell(9, 8)]));

    let report = game.submit_player_shot(opponent_miss(&game, 0)).unwrap();
    let fired: Vec<Cell> = report.opponent_shots.iter().map(|s| s.cell).collect();
    assert_eq!(fired, vec![cell(0, 0), cell(0, 1), cell(9, 9)]);
    assert!(report.opponent_shots.iter().all(|s| s.attacker == Side::Opponent));
    assert_eq!(game.score(Side::Opponent), 50 + 50 - 10);
    assert_eq!(game.turn(), Side::Player);
    assert!(!game.player_board().is_fired(cell(9, 8)));
}

#[test]
fn test_refire_is_free_and_keeps_turn() {
    let mut game = started_match();
    game.set_attacker(Scripted::boxed([cell(9, 9)]));
    let miss = opponent_miss(&game, 0);
    game.submit_player_shot(miss).unwrap();
    let score = game.score(Side::Player);
    let events = game.history().len();

    let report = game.submit_player_shot(miss).unwrap();
    assert!(report.player_shot.outcome.repeated);
    assert!(report.opponent_shots.is_empty());
    assert_eq!(game.score(Side::Player), score);
    assert_eq!(game.history().len(), events);
    assert_eq!(game.turn(), Side::Player);
}

#[test]
fn test_out_of_bounds_shot_is_an_error() {
    let mut game = started_match();
    let err = game.submit_player_shot(cell(10, 0)).unwrap_err();
    assert!(matches!(
        err,
        MatchError::Board(BoardError::OutOfBounds { .. })
    ));
    assert_eq!(game.score(Side::Player), 0);
    assert_eq!(game.opponent_board().fired().count_ones(), 0);
}

#[test]
fn test_player_wins() {
    let clock = ManualClock::new(1_000);
    let mut game = new_match(Difficulty::Easy);
    game.set_clock(Box::new(clock.clone()));
    game.start_battle().unwrap();
    assert_eq!(game.battle_started_at(), Some(1_000));

    let targets = opponent_ship_cells(&game);
    let (last, rest) = targets.split_last().unwrap();
    for target in rest {
        let report = game.submit_player_shot(*target).unwrap();
        assert_eq!(report.phase, Phase::Firing);
    }
    clock.advance(2_500);
    assert_eq!(game.elapsed_ms(), Some(2_500));
    let report = game.submit_player_shot(*last).unwrap();
    assert!(report.player_shot.outcome.sank());
    assert_eq!(report.phase, Phase::Finished);
    assert!(game.opponent_fleet().all_destroyed());

    let summary = *game.summary().unwrap();
    assert_eq!(summary.winner, Side::Player);
    assert_eq!(summary.elapsed_ms, 2_500);
    assert_eq!(summary.score_player, 13 * 50);
    assert_eq!(summary.shots_player, 13);
    assert_eq!(summary.shots_opponent, 0);

    clock.advance(10_000);
    assert_eq!(game.elapsed_ms(), Some(2_500));
    assert!(matches!(
        game.submit_player_shot(opponent_miss(&game, 0)),
        Err(MatchError::WrongPhase { .. })
    ));
    assert!(matches!(
        game.history().last(),
        Some(MatchEvent::MatchFinished(s)) if s.winner == Side::Player
    ));
}

#[test]
fn test_computer_wins() {
    let mut game = started_match();
    game.set_attacker(Scripted::boxed(player_cells()));

    let report = game.submit_player_shot(opponent_miss(&game, 0)).unwrap();
    assert_eq!(report.opponent_shots.len(), 13);
    assert!(report.opponent_shots.last().unwrap().outcome.sank());
    assert_eq!(report.phase, Phase::Finished);
    assert!(game.player_fleet().all_destroyed());

    let summary = game.summary().unwrap();
    assert_eq!(summary.winner, Side::Opponent);
    assert_eq!(summary.score_opponent, 13 * 50);
    assert_eq!(summary.score_player, -10);
}

#[test]
fn test_observer_sees_every_shot() {
    let recorder = Arc::new(Mutex::new(Recorder::default()));
    let mut game = new_match(Difficulty::Medium);
    game.set_observer(Box::new(SharedRecorder(recorder.clone())));
    game.start_battle().unwrap();

    let mut guard = 0;
    while game.phase() == Phase::Firing {
        let target = game.opponent_board().unfired_cells().next().unwrap();
        game.submit_player_shot(target).unwrap();
        guard += 1;
        assert!(guard <= 100);
    }

    let recorded = recorder.lock().unwrap();
    let history_shots: Vec<ShotEvent> = game
        .history()
        .iter()
        .filter_map(|e| match e {
            MatchEvent::ShotResolved(shot) => Some(*shot),
            _ => None,
        })
        .collect();
    assert_eq!(recorded.shots, history_shots);
    assert_eq!(recorded.scores.len(), recorded.shots.len());
    assert_eq!(recorded.finished.as_ref(), game.summary());
    assert!(matches!(game.history()[0], MatchEvent::BattleStarted { .. }));

    let last_player = recorded
        .scores
        .iter()
        .rev()
        .find(|(side, _)| *side == Side::Player)
        .map(|(_, score)| *score);
    assert_eq!(last_player, Some(game.score(Side::Player)));
}

#[test]
fn test_shot_log_format() {
    let mut game = started_match();
    game.set_attacker(Scripted::boxed([cell(9, 9)]));
    let miss = opponent_miss(&game, 0);
    let report = game.submit_player_shot(miss).unwrap();
    assert_eq!(
        report.player_shot.to_string(),
        format!("Player shoots to [{},{}]....... Missed!", miss.row, miss.column)
    );
    assert_eq!(
        report.opponent_shots[0].to_string(),
        "Enemy shoots to [9,9]....... Missed!"
    );
}

/// Fires through its script and never yields on a miss.
struct Relentless {
    cells: VecDeque<Cell>,
}

impl Attacker for Relentless {
    fn select_target(&mut self, _rng: &mut SmallRng, _board: &Board) -> Option<Cell> {
        self.cells.pop_front()
    }

    fn handle_shot_result(
        &mut self,
        _rng: &mut SmallRng,
        _cell: Cell,
        _outcome: &ShotOutcome,
    ) -> TurnControl {
        TurnControl::Continue
    }
}

#[test]
fn test_computer_may_keep_firing_after_misses() {
    let mut game = started_match();
    game.set_attacker(Box::new(Relentless {
        cells: [cell(9, 9), cell(9, 8), cell(9, 7)].into_iter().collect(),
    }));

    let report = game.submit_player_shot(opponent_miss(&game, 0)).unwrap();
    assert_eq!(report.opponent_shots.len(), 3);
    assert!(report.opponent_shots.iter().all(|s| !s.outcome.was_hit));
    assert_eq!(game.score(Side::Opponent), -30);
    assert_eq!(game.turn(), Side::Player);
}

#[test]
fn test_turn_returns_to_player_when_computer_shot_fails() {
    let mut game = started_match();
    game.set_attacker(Box::new(Relentless {
        cells: [cell(9, 9), cell(20, 20)].into_iter().collect(),
    }));

    let err = game.submit_player_shot(opponent_miss(&game, 0)).unwrap_err();
    assert!(matches!(
        err,
        MatchError::Board(BoardError::OutOfBounds { .. })
    ));
    assert_eq!(game.turn(), Side::Player);
    assert!(game.player_board().is_fired(cell(9, 9)));
    assert!(game.submit_player_shot(opponent_miss(&game, 1)).is_ok());
}

#[test]
fn test_cheater_fires_through_missed_rounds() {
    let mut game = new_match(Difficulty::Cheater);
    game.start_battle().unwrap();

    let mut longest_miss_streak = 0;
    for n in 0..40 {
        if game.phase() != Phase::Firing {
            break;
        }
        let report = game.submit_player_shot(opponent_miss(&game, n)).unwrap();
        let misses = report
            .opponent_shots
            .iter()
            .filter(|s| !s.outcome.was_hit)
            .count();
        longest_miss_streak = longest_miss_streak.max(misses);
        if report.phase == Phase::Firing {
            assert_eq!(game.turn(), Side::Player);
            // the burst ends on a miss
            assert!(!report.opponent_shots.last().unwrap().outcome.was_hit);
        }
    }
    assert!(longest_miss_streak > 1, "no burst went past one round");
}
