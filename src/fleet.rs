//! Ship roster factory and per-side fleet bookkeeping.

use alloc::vec::Vec;

use crate::common::Side;
use crate::config::DEFAULT_ROSTER;
use crate::ship::{Ship, ShipId, ShipType};

/// Builds fleets from a fixed roster. Ids are handed out from one counter,
/// so fleets built by the same catalog never share an id.
#[derive(Debug, Clone)]
pub struct ShipCatalog {
    roster: Vec<ShipType>,
    next_id: u32,
}

impl ShipCatalog {
    pub fn new(roster: Vec<ShipType>) -> Self {
        Self { roster, next_id: 0 }
    }

    /// One battleship and two destroyers.
    pub fn standard() -> Self {
        Self::new(DEFAULT_ROSTER.to_vec())
    }

    pub fn roster(&self) -> &[ShipType] {
        &self.roster
    }

    /// Fresh, unplaced ships for `side`, in roster order.
    pub fn build_fleet(&mut self, side: Side) -> Fleet {
        let ships = self
            .roster
            .iter()
            .map(|ship_type| {
                let id = ShipId(self.next_id);
                self.next_id += 1;
                Ship::new(id, *ship_type)
            })
            .collect();
        Fleet { side, ships }
    }
}

impl Default for ShipCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

/// The ships owned by one side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fleet {
    side: Side,
    ships: Vec<Ship>,
}

impl Fleet {
    pub fn side(&self) -> Side {
        self.side
    }

    pub fn len(&self) -> usize {
        self.ships.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ships.is_empty()
    }

    pub fn ships(&self) -> &[Ship] {
        &self.ships
    }

    pub fn ships_mut(&mut self) -> &mut [Ship] {
        &mut self.ships
    }

    pub fn ids(&self) -> impl Iterator<Item = ShipId> + '_ {
        self.ships.iter().map(Ship::id)
    }

    pub fn get(&self, id: ShipId) -> Option<&Ship> {
        self.ships.iter().find(|s| s.id() == id)
    }

    pub fn get_mut(&mut self, id: ShipId) -> Option<&mut Ship> {
        self.ships.iter_mut().find(|s| s.id() == id)
    }

    /// Ships still afloat.
    pub fn remaining(&self) -> impl Iterator<Item = &Ship> + '_ {
        self.ships.iter().filter(|s| !s.is_destroyed())
    }

    pub fn destroyed(&self) -> impl Iterator<Item = &Ship> + '_ {
        self.ships.iter().filter(|s| s.is_destroyed())
    }

    /// Returns `true` when every ship is sunk.
    pub fn all_destroyed(&self) -> bool {
        self.ships.iter().all(Ship::is_destroyed)
    }
}
