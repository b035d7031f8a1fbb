use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt;
use log::{debug, info};
use rand::rngs::SmallRng;
use rand::SeedableRng;

use crate::{
    board::Board,
    clock::Clock,
    common::{BoardError, Cell, Side, ShotOutcome},
    config::{ConfigError, GameConfig},
    fleet::{Fleet, ShipCatalog},
    player::{Attacker, ComputerPlayer, TurnControl},
    ship::{Direction, ShipId},
};

/// Lifecycle of a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub enum Phase {
    Placing,
    Firing,
    Finished,
}

/// Errors from match operations. These signal misuse of the API.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MatchError {
    #[error("operation needs the {expected:?} phase but the match is {actual:?}")]
    WrongPhase { expected: Phase, actual: Phase },
    #[error("{0} ship(s) still waiting to be placed")]
    ShipsUnplaced(usize),
    #[error("it is not the {0}'s turn")]
    NotYourTurn(Side),
    #[error(transparent)]
    Board(#[from] BoardError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// A resolved shot, as reported to observers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub struct ShotEvent {
    pub attacker: Side,
    pub cell: Cell,
    pub outcome: ShotOutcome,
}

impl fmt::Display for ShotEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} shoots to [{},{}]....... {}",
            self.attacker,
            self.cell.row,
            self.cell.column,
            if self.outcome.was_hit { "Hit!" } else { "Missed!" }
        )?;
        if self.outcome.sank() {
            write!(f, " Ship destroyed!")?;
        }
        Ok(())
    }
}

/// Final result of a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub struct MatchSummary {
    pub winner: Side,
    pub elapsed_ms: u64,
    pub score_player: i32,
    pub score_opponent: i32,
    pub shots_player: usize,
    pub shots_opponent: usize,
}

/// Everything the match reports, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub enum MatchEvent {
    BattleStarted { at_ms: u64 },
    ShotResolved(ShotEvent),
    ScoreChanged { side: Side, score: i32 },
    MatchFinished(MatchSummary),
}

/// Presentation hooks. The match never waits on them.
pub trait MatchObserver: Send {
    fn on_shot_resolved(&mut self, _event: &ShotEvent) {}
    fn on_score_changed(&mut self, _side: Side, _score: i32) {}
    fn on_match_finished(&mut self, _summary: &MatchSummary) {}
}

/// Observer that ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullObserver;

impl MatchObserver for NullObserver {}

/// Shots produced by one player action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnReport {
    /// The player's own shot.
    pub player_shot: ShotEvent,
    /// Shots the computer fired in reply, in order. Empty when the player hit
    /// (and keeps the turn) or won.
    pub opponent_shots: Vec<ShotEvent>,
    /// Phase after the whole exchange.
    pub phase: Phase,
}

/// A human versus computer match: both boards and fleets, scores, turn
/// order and the computer attacker.
pub struct Match {
    config: GameConfig,
    phase: Phase,
    turn: Side,
    player_board: Board,
    player_fleet: Fleet,
    opponent_board: Board,
    opponent_fleet: Fleet,
    score_player: i32,
    score_opponent: i32,
    attacker: Box<dyn Attacker>,
    observer: Box<dyn MatchObserver>,
    clock: Box<dyn Clock>,
    rng: SmallRng,
    battle_started_at: Option<u64>,
    summary: Option<MatchSummary>,
    history: Vec<MatchEvent>,
}

#[cfg(feature = "std")]
fn default_clock() -> Box<dyn Clock> {
    Box::new(crate::clock::SystemClock)
}

#[cfg(not(feature = "std"))]
fn default_clock() -> Box<dyn Clock> {
    Box::new(crate::clock::ManualClock::default())
}

impl Match {
    /// Validate `config`, build both fleets and lay out the computer's ships.
    pub fn new(config: GameConfig, mut rng: SmallRng) -> Result<Self, MatchError> {
        config.validate()?;
        let mut catalog = ShipCatalog::new(config.roster.clone());
        let player_fleet = catalog.build_fleet(Side::Player);
        let mut opponent_fleet = catalog.build_fleet(Side::Opponent);
        let player_board = Board::from_config(&config)?;
        let mut opponent_board = Board::from_config(&config)?;
        opponent_board.place_all_automatically(opponent_fleet.ships_mut(), &mut rng)?;
        debug!(
            "new {}x{} match, {} ships per side, difficulty {}",
            config.rows,
            config.columns,
            config.roster.len(),
            config.difficulty
        );
        Ok(Self {
            attacker: Box::new(ComputerPlayer::new(player_board.difficulty())),
            config,
            phase: Phase::Placing,
            turn: Side::Player,
            player_board,
            player_fleet,
            opponent_board,
            opponent_fleet,
            score_player: 0,
            score_opponent: 0,
            observer: Box::new(NullObserver),
            clock: default_clock(),
            rng,
            battle_started_at: None,
            summary: None,
            history: Vec::new(),
        })
    }

    /// Same as [`Match::new`] with a `SmallRng` seeded from `seed`.
    pub fn from_seed(config: GameConfig, seed: u64) -> Result<Self, MatchError> {
        Self::new(config, SmallRng::seed_from_u64(seed))
    }

    pub fn set_observer(&mut self, observer: Box<dyn MatchObserver>) {
        self.observer = observer;
    }

    /// Replace the computer's targeting.
    pub fn set_attacker(&mut self, attacker: Box<dyn Attacker>) {
        self.attacker = attacker;
    }

    pub fn set_clock(&mut self, clock: Box<dyn Clock>) {
        self.clock = clock;
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Side expected to act next. The computer's turn runs inside
    /// [`Match::submit_player_shot`], so between calls this is the player
    /// unless the match is over.
    pub fn turn(&self) -> Side {
        self.turn
    }

    pub fn player_board(&self) -> &Board {
        &self.player_board
    }

    pub fn opponent_board(&self) -> &Board {
        &self.opponent_board
    }

    pub fn player_fleet(&self) -> &Fleet {
        &self.player_fleet
    }

    pub fn opponent_fleet(&self) -> &Fleet {
        &self.opponent_fleet
    }

    pub fn score(&self, side: Side) -> i32 {
        match side {
            Side::Player => self.score_player,
            Side::Opponent => self.score_opponent,
        }
    }

    pub fn battle_started_at(&self) -> Option<u64> {
        self.battle_started_at
    }

    /// Milliseconds since the battle started, frozen once it is over.
    pub fn elapsed_ms(&self) -> Option<u64> {
        match (self.summary, self.battle_started_at) {
            (Some(summary), _) => Some(summary.elapsed_ms),
            (None, Some(start)) => Some(self.clock.now_ms().saturating_sub(start)),
            (None, None) => None,
        }
    }

    pub fn summary(&self) -> Option<&MatchSummary> {
        self.summary.as_ref()
    }

    pub fn history(&self) -> &[MatchEvent] {
        &self.history
    }

    fn ensure_phase(&self, expected: Phase) -> Result<(), MatchError> {
        if self.phase == expected {
            Ok(())
        } else {
            Err(MatchError::WrongPhase {
                expected,
                actual: self.phase,
            })
        }
    }

    // ---- placement -------------------------------------------------------

    /// Player ships not on the board yet, in roster order.
    pub fn unplaced_ships(&self) -> Vec<ShipId> {
        self.player_fleet
            .ids()
            .filter(|id| !self.player_board.is_placed(*id))
            .collect()
    }

    /// Cells the player's ship would occupy at `start`, without placing it.
    pub fn compute_fit(&self, ship: ShipId, start: Cell) -> Result<Option<Vec<Cell>>, MatchError> {
        let ship = self
            .player_fleet
            .get(ship)
            .ok_or(BoardError::UnknownShip(ship))?;
        Ok(self.player_board.compute_fit(start, ship))
    }

    /// Point a player ship in `direction`. For a placed ship this is a
    /// rotation in place, see [`Match::rotate_ship`].
    pub fn set_ship_direction(&mut self, ship: ShipId, direction: Direction) -> Result<bool, MatchError> {
        self.ensure_phase(Phase::Placing)?;
        let current = self
            .player_fleet
            .get(ship)
            .ok_or(BoardError::UnknownShip(ship))?
            .direction();
        if current == direction {
            return Ok(true);
        }
        self.rotate_ship(ship)
    }

    /// Place one of the player's ships. `Ok(false)` when it does not fit.
    pub fn place_ship(&mut self, ship: ShipId, start: Cell) -> Result<bool, MatchError> {
        self.ensure_phase(Phase::Placing)?;
        let ship = self
            .player_fleet
            .get(ship)
            .ok_or(BoardError::UnknownShip(ship))?;
        Ok(self.player_board.place(start, ship)?)
    }

    /// Select a ship for positioning; [`Match::place_selected`] commits it.
    pub fn select_ship(&mut self, ship: ShipId) -> Result<(), MatchError> {
        self.ensure_phase(Phase::Placing)?;
        let ship = self
            .player_fleet
            .get(ship)
            .ok_or(BoardError::UnknownShip(ship))?;
        Ok(self.player_board.prepare(ship)?)
    }

    pub fn selected_ship(&self) -> Option<ShipId> {
        self.player_board.pending_ship()
    }

    pub fn cancel_selection(&mut self) {
        self.player_board.cancel_pending();
    }

    /// Place the selected ship at `start`. `Ok(false)` when nothing is
    /// selected or it does not fit.
    pub fn place_selected(&mut self, start: Cell) -> Result<bool, MatchError> {
        match self.player_board.pending_ship() {
            Some(ship) => self.place_ship(ship, start),
            None => Ok(false),
        }
    }

    /// Take a placed ship back off the board.
    pub fn pick_up_ship(&mut self, ship: ShipId) -> Result<(), MatchError> {
        self.ensure_phase(Phase::Placing)?;
        let ship = self
            .player_fleet
            .get(ship)
            .ok_or(BoardError::UnknownShip(ship))?;
        Ok(self.player_board.delete_ship(ship)?)
    }

    /// Rotate a player ship. A placed ship is re-validated in place and keeps
    /// its old direction when the rotation does not fit.
    pub fn rotate_ship(&mut self, ship: ShipId) -> Result<bool, MatchError> {
        self.ensure_phase(Phase::Placing)?;
        let placed = self.player_board.is_placed(ship);
        let ship = self
            .player_fleet
            .get_mut(ship)
            .ok_or(BoardError::UnknownShip(ship))?;
        if placed {
            Ok(self.player_board.rotate_placed(ship)?)
        } else {
            ship.rotate();
            Ok(true)
        }
    }

    /// Lay out the whole player fleet at random.
    pub fn auto_place_player_ships(&mut self) -> Result<(), MatchError> {
        self.ensure_phase(Phase::Placing)?;
        self.player_board
            .place_all_automatically(self.player_fleet.ships_mut(), &mut self.rng)?;
        Ok(())
    }

    /// Freeze both layouts and start the battle. Every player ship must be
    /// placed.
    pub fn start_battle(&mut self) -> Result<(), MatchError> {
        self.ensure_phase(Phase::Placing)?;
        let unplaced = self.unplaced_ships().len();
        if unplaced > 0 {
            return Err(MatchError::ShipsUnplaced(unplaced));
        }
        self.player_board.finalize_placement()?;
        self.opponent_board.finalize_placement()?;
        let now = self.clock.now_ms();
        self.battle_started_at = Some(now);
        self.phase = Phase::Firing;
        self.turn = Side::Player;
        self.history.push(MatchEvent::BattleStarted { at_ms: now });
        info!("battle started");
        Ok(())
    }

    // ---- firing ----------------------------------------------------------

    /// Fire at `cell` on the computer's board. When the player misses, the
    /// computer takes its whole turn before this returns.
    pub fn submit_player_shot(&mut self, cell: Cell) -> Result<TurnReport, MatchError> {
        self.ensure_phase(Phase::Firing)?;
        if self.turn != Side::Player {
            return Err(MatchError::NotYourTurn(Side::Player));
        }
        let player_shot = self.fire(Side::Player, cell)?;
        let opponent_shots = if self.phase == Phase::Firing && self.turn == Side::Opponent {
            self.play_opponent_turn()?
        } else {
            Vec::new()
        };
        Ok(TurnReport {
            player_shot,
            opponent_shots,
            phase: self.phase,
        })
    }

    /// Runs until the attacker yields. Misses never end the turn on their
    /// own; a cheater burst keeps firing through missed rounds. The turn
    /// returns to the player even when a shot fails.
    fn play_opponent_turn(&mut self) -> Result<Vec<ShotEvent>, MatchError> {
        let mut shots = Vec::new();
        let volley = self.opponent_volley(&mut shots);
        if self.phase == Phase::Firing {
            self.turn = Side::Player;
        }
        volley.map(|()| shots)
    }

    fn opponent_volley(&mut self, shots: &mut Vec<ShotEvent>) -> Result<(), MatchError> {
        self.attacker.begin_turn(&mut self.rng);
        while self.phase == Phase::Firing {
            let Some(cell) = self.attacker.select_target(&mut self.rng, &self.player_board) else {
                debug!("no cell left to fire at");
                break;
            };
            let event = self.fire(Side::Opponent, cell)?;
            shots.push(event);
            if event.outcome.repeated {
                break;
            }
            let control = self
                .attacker
                .handle_shot_result(&mut self.rng, cell, &event.outcome);
            if control == TurnControl::Yield {
                break;
            }
        }
        Ok(())
    }

    /// Resolve one shot by `side` and apply score, turn and end-of-game
    /// rules. Repeated cells change nothing. A player miss hands the turn
    /// over; the computer's turn ends in [`Match::play_opponent_turn`].
    fn fire(&mut self, side: Side, cell: Cell) -> Result<ShotEvent, MatchError> {
        let outcome = {
            let (board, fleet) = match side {
                Side::Player => (&mut self.opponent_board, &mut self.opponent_fleet),
                Side::Opponent => (&mut self.player_board, &mut self.player_fleet),
            };
            board.resolve_shot(cell, fleet)?
        };
        let event = ShotEvent {
            attacker: side,
            cell,
            outcome,
        };
        if outcome.repeated {
            debug!("{} fired at {} again, ignored", side, cell);
            return Ok(event);
        }

        info!("{}", event);
        self.observer.on_shot_resolved(&event);
        self.history.push(MatchEvent::ShotResolved(event));

        let score = match side {
            Side::Player => &mut self.score_player,
            Side::Opponent => &mut self.score_opponent,
        };
        *score += outcome.score_delta();
        let score = *score;
        self.observer.on_score_changed(side, score);
        self.history.push(MatchEvent::ScoreChanged { side, score });

        if outcome.was_hit {
            let defeated = match side {
                Side::Player => self.opponent_fleet.all_destroyed(),
                Side::Opponent => self.player_fleet.all_destroyed(),
            };
            if defeated {
                self.finish(side);
            }
        } else if side == Side::Player {
            self.turn = Side::Opponent;
        }
        Ok(event)
    }

    fn finish(&mut self, winner: Side) {
        let now = self.clock.now_ms();
        let summary = MatchSummary {
            winner,
            elapsed_ms: now.saturating_sub(self.battle_started_at.unwrap_or(now)),
            score_player: self.score_player,
            score_opponent: self.score_opponent,
            shots_player: self.opponent_board.fired().count_ones(),
            shots_opponent: self.player_board.fired().count_ones(),
        };
        self.phase = Phase::Finished;
        self.summary = Some(summary);
        info!(
            "{} wins after {} ms ({} to {})",
            winner, summary.elapsed_ms, summary.score_player, summary.score_opponent
        );
        self.observer.on_match_finished(&summary);
        self.history.push(MatchEvent::MatchFinished(summary));
    }
}

impl fmt::Debug for Match {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Match")
            .field("phase", &self.phase)
            .field("turn", &self.turn)
            .field("score_player", &self.score_player)
            .field("score_opponent", &self.score_opponent)
            .field("player_board", &self.player_board)
            .field("opponent_board", &self.opponent_board)
            .finish()
    }
}
