//! Common types for Broadside: cells, sides, shot outcomes and board errors.

use core::fmt;
use core::str::FromStr;

use crate::bitboard::BitBoardError;
use crate::config::{HIT_SCORE, MISS_PENALTY};
use crate::ship::ShipId;

/// A (row, column) position on a board, 0-indexed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub struct Cell {
    pub row: usize,
    pub column: usize,
}

impl Cell {
    pub const fn new(row: usize, column: usize) -> Self {
        Self { row, column }
    }

    /// The orthogonal neighbour in `heading`, or `None` when it would fall
    /// off a `rows`×`columns` grid.
    pub fn neighbour(self, heading: Heading, rows: usize, columns: usize) -> Option<Cell> {
        let (row, column) = match heading {
            Heading::Up => (self.row.checked_sub(1)?, self.column),
            Heading::Down => (self.row + 1, self.column),
            Heading::Left => (self.row, self.column.checked_sub(1)?),
            Heading::Right => (self.row, self.column + 1),
        };
        if row < rows && column < columns {
            Some(Cell::new(row, column))
        } else {
            None
        }
    }
}

impl From<(usize, usize)> for Cell {
    fn from((row, column): (usize, usize)) -> Self {
        Cell::new(row, column)
    }
}

/// Renders as `row|column`.
impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}|{}", self.row, self.column)
    }
}

/// Error parsing a `row|column` cell key.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("malformed cell key, expected `row|column`")]
pub struct ParseCellError;

impl FromStr for Cell {
    type Err = ParseCellError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (row, column) = s.split_once('|').ok_or(ParseCellError)?;
        let row = row.trim().parse().map_err(|_| ParseCellError)?;
        let column = column.trim().parse().map_err(|_| ParseCellError)?;
        Ok(Cell::new(row, column))
    }
}

/// Orthogonal step directions used when hunting around a hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Heading {
    Up,
    Down,
    Left,
    Right,
}

impl Heading {
    pub const ALL: [Heading; 4] = [Heading::Up, Heading::Down, Heading::Left, Heading::Right];
}

/// The two sides of a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub enum Side {
    /// The human player.
    Player,
    /// The computer.
    Opponent,
}

impl Side {
    pub fn other(self) -> Side {
        match self {
            Side::Player => Side::Opponent,
            Side::Opponent => Side::Player,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Player => f.write_str("Player"),
            Side::Opponent => f.write_str("Enemy"),
        }
    }
}

/// Result of resolving a shot against a board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub struct ShotOutcome {
    /// The cell held a ship.
    pub was_hit: bool,
    /// `Some(destroyed)` for a fresh hit, `None` for misses and repeats.
    pub ship_destroyed: Option<bool>,
    /// The ship that was struck, if any.
    pub ship: Option<ShipId>,
    /// The cell had already been fired at; nothing changed.
    pub repeated: bool,
}

impl ShotOutcome {
    pub fn hit(ship: ShipId, destroyed: bool) -> Self {
        Self {
            was_hit: true,
            ship_destroyed: Some(destroyed),
            ship: Some(ship),
            repeated: false,
        }
    }

    pub fn miss() -> Self {
        Self {
            was_hit: false,
            ship_destroyed: None,
            ship: None,
            repeated: false,
        }
    }

    /// Outcome of firing at an already fired cell.
    pub fn repeat(was_hit: bool) -> Self {
        Self {
            was_hit,
            ship_destroyed: None,
            ship: None,
            repeated: true,
        }
    }

    /// `true` when the shot sank a ship.
    pub fn sank(&self) -> bool {
        self.ship_destroyed == Some(true)
    }

    /// Score change for the attacking side.
    pub fn score_delta(&self) -> i32 {
        if self.repeated {
            0
        } else if self.was_hit {
            HIT_SCORE
        } else {
            -MISS_PENALTY
        }
    }
}

/// Errors returned by Board operations. These signal API misuse, never a
/// rule outcome.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BoardError {
    /// Underlying bitboard error.
    #[error("bitboard error: {0}")]
    BitBoard(#[from] BitBoardError),
    /// Cell outside the grid.
    #[error("cell {cell} is outside the {rows}x{columns} board")]
    OutOfBounds {
        cell: Cell,
        rows: usize,
        columns: usize,
    },
    /// Placement was already finalized; the layout is frozen.
    #[error("ship placement is already finalized")]
    PlacementFinalized,
    /// Shots are only resolved once placement is finalized.
    #[error("ship placement has not been finalized yet")]
    PlacementOpen,
    /// Ship id not present in the fleet.
    #[error("ship {0} is not part of this fleet")]
    UnknownShip(ShipId),
    /// Ship is not on the board.
    #[error("ship {0} is not placed on the board")]
    ShipNotPlaced(ShipId),
    /// Automatic placement found no room for the ship.
    #[error("unable to place ship {0}")]
    UnableToPlaceShip(ShipId),
}
