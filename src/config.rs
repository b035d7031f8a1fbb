//! Game configuration: dimensions, roster, difficulty and scoring constants.

use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt;
use core::str::FromStr;

use crate::ship::{InvalidShipType, ShipType};

pub const DEFAULT_ROWS: usize = 10;
pub const DEFAULT_COLUMNS: usize = 10;
pub const DEFAULT_ROSTER: [ShipType; 3] = [
    ShipType::Battleship,
    ShipType::Destroyer,
    ShipType::Destroyer,
];

/// Points gained by the attacker for a hit.
pub const HIT_SCORE: i32 = 50;
/// Points lost by the attacker for a miss.
pub const MISS_PENALTY: i32 = 10;

/// How hard the computer plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "std", serde(rename_all = "lowercase"))]
pub enum Difficulty {
    #[default]
    Easy,
    Medium,
    Hard,
    Cheater,
}

impl Difficulty {
    pub const ALL: [Difficulty; 4] = [
        Difficulty::Easy,
        Difficulty::Medium,
        Difficulty::Hard,
        Difficulty::Cheater,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
            Difficulty::Cheater => "cheater",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Difficulty {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Difficulty::ALL
            .into_iter()
            .find(|d| d.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ConfigError::UnknownDifficulty(wanted.to_string()))
    }
}

/// What the known-ship index of a board reveals to the computer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub enum Intel {
    /// Only cells of ships that have already been struck once.
    #[default]
    StruckShips,
    /// Every ship cell from the moment placement ends.
    FullReveal,
}

/// Errors detected while validating a configuration. All of them are fatal
/// for match construction.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("unknown difficulty `{0}` (expected easy, medium, hard or cheater)")]
    UnknownDifficulty(String),
    #[error(transparent)]
    UnknownShipType(#[from] InvalidShipType),
    #[error("board dimensions must be positive, got {rows}x{columns}")]
    InvalidDimensions { rows: usize, columns: usize },
    #[error("the ship roster is empty")]
    EmptyRoster,
    #[error("{ship_type} of length {length} is longer than the longest board axis ({longest_axis})")]
    ShipTooLong {
        ship_type: ShipType,
        length: usize,
        longest_axis: usize,
    },
    #[error("fleet needs {needed} cells but the board only has {available}")]
    FleetTooLarge { needed: usize, available: usize },
}

/// Everything needed to set up a match.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub struct GameConfig {
    pub rows: usize,
    pub columns: usize,
    pub roster: Vec<ShipType>,
    pub difficulty: Difficulty,
    pub intel: Intel,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            rows: DEFAULT_ROWS,
            columns: DEFAULT_COLUMNS,
            roster: DEFAULT_ROSTER.to_vec(),
            difficulty: Difficulty::default(),
            intel: Intel::default(),
        }
    }
}

impl GameConfig {
    pub fn with_difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty = difficulty;
        self
    }

    pub fn with_dimensions(mut self, rows: usize, columns: usize) -> Self {
        self.rows = rows;
        self.columns = columns;
        self
    }

    pub fn with_roster(mut self, roster: Vec<ShipType>) -> Self {
        self.roster = roster;
        self
    }

    pub fn with_intel(mut self, intel: Intel) -> Self {
        self.intel = intel;
        self
    }

    /// Reject configurations that can never produce a playable layout, so
    /// automatic placement is never asked to do the impossible.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rows == 0 || self.columns == 0 {
            return Err(ConfigError::InvalidDimensions {
                rows: self.rows,
                columns: self.columns,
            });
        }
        if self.roster.is_empty() {
            return Err(ConfigError::EmptyRoster);
        }
        let longest_axis = self.rows.max(self.columns);
        if let Some(ship_type) = self.roster.iter().find(|t| t.length() > longest_axis) {
            return Err(ConfigError::ShipTooLong {
                ship_type: *ship_type,
                length: ship_type.length(),
                longest_axis,
            });
        }
        let needed: usize = self.roster.iter().map(|t| t.length()).sum();
        let available = self.rows * self.columns;
        if needed > available {
            return Err(ConfigError::FleetTooLarge { needed, available });
        }
        Ok(())
    }
}

/// Parse a comma separated roster such as `battleship,destroyer,destroyer`.
pub fn parse_roster(s: &str) -> Result<Vec<ShipType>, ConfigError> {
    s.split(',')
        .filter(|part| !part.trim().is_empty())
        .map(|part| part.parse::<ShipType>().map_err(ConfigError::from))
        .collect()
}
