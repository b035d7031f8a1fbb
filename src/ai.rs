// Target selection for the computer, one function per difficulty tier.
// Selection only reads the opposing board's public state (fired cells, hits
// and the known-cell indices) plus the attacker's memory of its last shot.

use crate::{
    board::{Board, LastShot},
    common::{Cell, Heading},
    config::Difficulty,
};
use rand::seq::SliceRandom;
use rand::Rng;

/// Probability that the hard tier ignores its known-ship index and shoots
/// at random when it is not hunting.
pub const HARD_RANDOM_CHANCE: f64 = 0.4;

/// Upper bound on the number of rounds in a cheater burst.
pub const MAX_BURST_ROUNDS: u32 = 10;

/// A concrete selection tier. The cheater difficulty is a sequence of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    Easy,
    Medium,
    Hard,
}

impl Tier {
    pub const ALL: [Tier; 3] = [Tier::Easy, Tier::Medium, Tier::Hard];

    /// The tier a fixed difficulty always uses; `None` for cheater.
    pub fn for_difficulty(difficulty: Difficulty) -> Option<Tier> {
        match difficulty {
            Difficulty::Easy => Some(Tier::Easy),
            Difficulty::Medium => Some(Tier::Medium),
            Difficulty::Hard => Some(Tier::Hard),
            Difficulty::Cheater => None,
        }
    }
}

/// Pick the next cell to fire at with `tier`. Returns `None` only when every
/// cell of `board` has been fired at.
pub fn select_target<R: Rng + ?Sized>(
    tier: Tier,
    board: &Board,
    last: Option<LastShot>,
    rng: &mut R,
) -> Option<Cell> {
    match tier {
        Tier::Easy => select_easy(board, rng),
        Tier::Medium => select_medium(board, last, rng),
        Tier::Hard => select_hard(board, last, rng),
    }
}

/// Uniformly random unfired cell.
pub fn select_easy<R: Rng + ?Sized>(board: &Board, rng: &mut R) -> Option<Cell> {
    random_unfired(board, rng)
}

/// Hunt around the last hit, otherwise random.
pub fn select_medium<R: Rng + ?Sized>(
    board: &Board,
    last: Option<LastShot>,
    rng: &mut R,
) -> Option<Cell> {
    match last {
        Some(shot) if shot.was_hit => {
            hunt(board, shot.cell, rng).or_else(|| random_unfired(board, rng))
        }
        _ => random_unfired(board, rng),
    }
}

/// Hunt around the last hit; otherwise lean on the known-ship index.
pub fn select_hard<R: Rng + ?Sized>(
    board: &Board,
    last: Option<LastShot>,
    rng: &mut R,
) -> Option<Cell> {
    if let Some(shot) = last.filter(|s| s.was_hit) {
        return hunt(board, shot.cell, rng).or_else(|| random_unfired(board, rng));
    }
    if rng.random_bool(HARD_RANDOM_CHANCE) {
        random_unfired(board, rng)
    } else {
        random_known_ship_cell(board, rng).or_else(|| random_unfired(board, rng))
    }
}

/// Try the four orthogonal neighbours of `from` in random order and return
/// the first one still unfired.
pub fn hunt<R: Rng + ?Sized>(board: &Board, from: Cell, rng: &mut R) -> Option<Cell> {
    let mut headings = Heading::ALL;
    headings.shuffle(rng);
    headings
        .into_iter()
        .filter_map(|h| from.neighbour(h, board.rows(), board.columns()))
        .find(|c| !board.is_fired(*c))
}

pub fn random_unfired<R: Rng + ?Sized>(board: &Board, rng: &mut R) -> Option<Cell> {
    let n = board.unfired_count();
    if n == 0 {
        return None;
    }
    board.unfired_cells().nth(rng.random_range(0..n))
}

pub fn random_known_ship_cell<R: Rng + ?Sized>(board: &Board, rng: &mut R) -> Option<Cell> {
    let known = board.known_ship_cells();
    if known.is_empty() {
        return None;
    }
    known.iter().nth(rng.random_range(0..known.len())).copied()
}

/// Number of rounds in a cheater burst, 1 to [`MAX_BURST_ROUNDS`].
pub fn roll_burst<R: Rng + ?Sized>(rng: &mut R) -> u32 {
    rng.random_range(1..=MAX_BURST_ROUNDS)
}

/// Tier used by one round of a cheater burst.
pub fn roll_tier<R: Rng + ?Sized>(rng: &mut R) -> Tier {
    Tier::ALL[rng.random_range(0..Tier::ALL.len())]
}
