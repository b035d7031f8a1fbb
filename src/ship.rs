//! Ship definitions: types, orientation and damage tracking.

use alloc::collections::BTreeSet;
use alloc::string::{String, ToString};
use core::fmt;
use core::str::FromStr;

use crate::common::Cell;

/// Stable identity of a ship instance, unique across both fleets of a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub struct ShipId(pub u32);

impl fmt::Display for ShipId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Orientation of a ship on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub enum Direction {
    Horizontal,
    #[default]
    Vertical,
}

impl Direction {
    pub fn flipped(self) -> Direction {
        match self {
            Direction::Horizontal => Direction::Vertical,
            Direction::Vertical => Direction::Horizontal,
        }
    }
}

/// The ship classes a fleet is built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub enum ShipType {
    Battleship,
    Destroyer,
}

impl ShipType {
    pub const ALL: [ShipType; 2] = [ShipType::Battleship, ShipType::Destroyer];

    /// Canonical length of the class.
    pub const fn length(self) -> usize {
        match self {
            ShipType::Battleship => 5,
            ShipType::Destroyer => 4,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            ShipType::Battleship => "battleship",
            ShipType::Destroyer => "destroyer",
        }
    }
}

impl fmt::Display for ShipType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A ship type name that is not in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown ship type `{0}`")]
pub struct InvalidShipType(pub String);

impl FromStr for ShipType {
    type Err = InvalidShipType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        ShipType::ALL
            .into_iter()
            .find(|t| t.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| InvalidShipType(wanted.to_string()))
    }
}

/// A ship instance with its current orientation and the cells it has been
/// hit in. Placement lives on the `Board`; the ship only knows its own
/// damage.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub struct Ship {
    id: ShipId,
    ship_type: ShipType,
    direction: Direction,
    damages: BTreeSet<Cell>,
}

impl Ship {
    /// New undamaged ship, oriented vertically.
    pub fn new(id: ShipId, ship_type: ShipType) -> Self {
        Ship {
            id,
            ship_type,
            direction: Direction::default(),
            damages: BTreeSet::new(),
        }
    }

    /// Build a ship from a type name such as `"destroyer"`.
    pub fn create(id: ShipId, type_name: &str) -> Result<Self, InvalidShipType> {
        Ok(Ship::new(id, type_name.parse()?))
    }

    pub fn id(&self) -> ShipId {
        self.id
    }

    pub fn ship_type(&self) -> ShipType {
        self.ship_type
    }

    pub fn length(&self) -> usize {
        self.ship_type.length()
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn set_direction(&mut self, direction: Direction) {
        self.direction = direction;
    }

    /// Flip between horizontal and vertical. Callers must re-validate the
    /// placement afterwards.
    pub fn rotate(&mut self) {
        self.direction = self.direction.flipped();
    }

    /// Record damage at `cell`. Returns `false` if the cell was already
    /// damaged.
    pub fn add_damage(&mut self, cell: Cell) -> bool {
        self.damages.insert(cell)
    }

    pub fn damages(&self) -> impl Iterator<Item = Cell> + '_ {
        self.damages.iter().copied()
    }

    pub fn damage_count(&self) -> usize {
        self.damages.len()
    }

    /// Check if the ship is destroyed (every segment hit).
    pub fn is_destroyed(&self) -> bool {
        self.damages.len() == self.length()
    }
}
