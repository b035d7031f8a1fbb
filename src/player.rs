use log::debug;
use rand::rngs::SmallRng;

use crate::{
    ai::{self, Tier},
    board::{Board, LastShot},
    common::{Cell, ShotOutcome},
    config::Difficulty,
};

/// What the attacker wants after a shot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnControl {
    /// Fire again.
    Continue,
    /// Hand the turn to the other side.
    Yield,
}

/// Interface implemented by automated attackers.
///
/// The match calls [`Attacker::begin_turn`] once, then alternates
/// `select_target` and `handle_shot_result` until the attacker yields, the
/// board runs out of cells or the defending fleet is sunk.
pub trait Attacker: Send {
    /// Called when the attacker's turn starts.
    fn begin_turn(&mut self, _rng: &mut SmallRng) {}

    /// Choose the next cell to fire at on `board`.
    fn select_target(&mut self, rng: &mut SmallRng, board: &Board) -> Option<Cell>;

    /// Inform the attacker of the result of its last shot. By default a hit
    /// keeps the turn and anything else yields it.
    fn handle_shot_result(
        &mut self,
        _rng: &mut SmallRng,
        _cell: Cell,
        outcome: &ShotOutcome,
    ) -> TurnControl {
        if outcome.was_hit && !outcome.repeated {
            TurnControl::Continue
        } else {
            TurnControl::Yield
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Burst {
    rounds_left: u32,
    tier: Tier,
}

/// The computer opponent. It remembers its own last shot against the board
/// it attacks and picks cells according to its difficulty.
#[derive(Debug, Clone)]
pub struct ComputerPlayer {
    difficulty: Difficulty,
    last_shot: Option<LastShot>,
    burst: Option<Burst>,
}

impl ComputerPlayer {
    pub fn new(difficulty: Difficulty) -> Self {
        Self {
            difficulty,
            last_shot: None,
            burst: None,
        }
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn last_shot(&self) -> Option<LastShot> {
        self.last_shot
    }

    /// Rounds left in the current cheater burst, counting the running one.
    pub fn burst_rounds_left(&self) -> Option<u32> {
        self.burst.map(|b| b.rounds_left)
    }

    fn start_burst(&mut self, rng: &mut SmallRng) -> Burst {
        let burst = Burst {
            rounds_left: ai::roll_burst(rng),
            tier: ai::roll_tier(rng),
        };
        debug!(
            "cheater burst of {} rounds, opening with {:?}",
            burst.rounds_left, burst.tier
        );
        self.burst = Some(burst);
        burst
    }
}

impl Attacker for ComputerPlayer {
    fn begin_turn(&mut self, rng: &mut SmallRng) {
        if self.difficulty == Difficulty::Cheater {
            self.start_burst(rng);
        }
    }

    fn select_target(&mut self, rng: &mut SmallRng, board: &Board) -> Option<Cell> {
        let tier = match Tier::for_difficulty(self.difficulty) {
            Some(tier) => tier,
            None => match self.burst {
                Some(burst) => burst.tier,
                None => self.start_burst(rng).tier,
            },
        };
        ai::select_target(tier, board, self.last_shot, rng)
    }

    fn handle_shot_result(
        &mut self,
        rng: &mut SmallRng,
        cell: Cell,
        outcome: &ShotOutcome,
    ) -> TurnControl {
        if outcome.repeated {
            return TurnControl::Yield;
        }
        self.last_shot = Some(LastShot {
            cell,
            was_hit: outcome.was_hit,
        });
        if outcome.was_hit {
            return TurnControl::Continue;
        }
        match self.burst.as_mut() {
            Some(burst) if burst.rounds_left > 1 => {
                burst.rounds_left -= 1;
                burst.tier = ai::roll_tier(rng);
                debug!(
                    "cheater round over, {} left, next with {:?}",
                    burst.rounds_left, burst.tier
                );
                TurnControl::Continue
            }
            _ => {
                self.burst = None;
                TurnControl::Yield
            }
        }
    }
}
