//! Board state: ship placement, shot resolution and the targeting indices.

use alloc::collections::{BTreeMap, BTreeSet};
use alloc::vec::Vec;
use log::debug;
use rand::seq::IndexedRandom;
use rand::Rng;

use crate::bitboard::BitBoard;
use crate::common::{BoardError, Cell, ShotOutcome};
use crate::config::{ConfigError, Difficulty, GameConfig, Intel};
use crate::fleet::Fleet;
use crate::ship::{Direction, Ship, ShipId};

/// Full-fleet retries before automatic placement gives up on a layout.
pub const MAX_LAYOUT_ATTEMPTS: usize = 100;

/// One cell of a placed ship and whether it has been hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShipCell {
    pub cell: Cell,
    pub hit: bool,
}

/// The most recent shot resolved on a board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub struct LastShot {
    pub cell: Cell,
    pub was_hit: bool,
}

/// One side's grid.
///
/// `occupancy` and `ship_cells` are two views of the same layout and are only
/// written together. `fired` and `hit` only grow. The known-ship and
/// known-empty indices are built by [`Board::finalize_placement`] and
/// together cover exactly the unfired cells from then on.
#[derive(Debug, Clone)]
pub struct Board {
    rows: usize,
    columns: usize,
    difficulty: Difficulty,
    intel: Intel,
    occupancy: BTreeMap<Cell, ShipId>,
    ship_cells: BTreeMap<ShipId, Vec<ShipCell>>,
    fired: BitBoard,
    hit: BitBoard,
    known_ship_cells: BTreeSet<Cell>,
    known_empty_cells: BTreeSet<Cell>,
    pending_ship: Option<ShipId>,
    last_shot: Option<LastShot>,
    finalized: bool,
}

impl Board {
    /// Create an empty board (no ships placed).
    pub fn new(rows: usize, columns: usize, difficulty: Difficulty) -> Result<Self, ConfigError> {
        let invalid = |_| ConfigError::InvalidDimensions { rows, columns };
        let empty = BitBoard::try_new(rows, columns).map_err(invalid)?;
        Ok(Board {
            rows,
            columns,
            difficulty,
            intel: Intel::default(),
            occupancy: BTreeMap::new(),
            ship_cells: BTreeMap::new(),
            fired: empty.clone(),
            hit: empty,
            known_ship_cells: BTreeSet::new(),
            known_empty_cells: BTreeSet::new(),
            pending_ship: None,
            last_shot: None,
            finalized: false,
        })
    }

    pub fn from_config(config: &GameConfig) -> Result<Self, ConfigError> {
        Ok(Self::new(config.rows, config.columns, config.difficulty)?.with_intel(config.intel))
    }

    pub fn with_intel(mut self, intel: Intel) -> Self {
        self.intel = intel;
        self
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn intel(&self) -> Intel {
        self.intel
    }

    pub fn in_bounds(&self, cell: Cell) -> bool {
        cell.row < self.rows && cell.column < self.columns
    }

    fn check_bounds(&self, cell: Cell) -> Result<(), BoardError> {
        if self.in_bounds(cell) {
            Ok(())
        } else {
            Err(BoardError::OutOfBounds {
                cell,
                rows: self.rows,
                columns: self.columns,
            })
        }
    }

    fn ensure_open(&self) -> Result<(), BoardError> {
        if self.finalized {
            Err(BoardError::PlacementFinalized)
        } else {
            Ok(())
        }
    }

    /// Every cell of the grid in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = Cell> + '_ {
        (0..self.rows).flat_map(move |r| (0..self.columns).map(move |c| Cell::new(r, c)))
    }

    // ---- placement -------------------------------------------------------

    /// Cells `ship` would occupy starting at `start` with its current
    /// direction, or `None` when the run leaves the grid or crosses another
    /// ship. The ship's own cells count as free.
    pub fn compute_fit(&self, start: Cell, ship: &Ship) -> Option<Vec<Cell>> {
        self.fit_cells(start, ship.id(), ship.length(), ship.direction())
    }

    fn fit_cells(
        &self,
        start: Cell,
        id: ShipId,
        length: usize,
        direction: Direction,
    ) -> Option<Vec<Cell>> {
        if !self.in_bounds(start) {
            return None;
        }
        let (end, limit) = match direction {
            Direction::Horizontal => (start.column + length, self.columns),
            Direction::Vertical => (start.row + length, self.rows),
        };
        if end > limit {
            return None;
        }
        let cells: Vec<Cell> = (0..length)
            .map(|i| match direction {
                Direction::Horizontal => Cell::new(start.row, start.column + i),
                Direction::Vertical => Cell::new(start.row + i, start.column),
            })
            .collect();
        let blocked = cells
            .iter()
            .any(|c| matches!(self.occupancy.get(c), Some(owner) if *owner != id));
        if blocked {
            None
        } else {
            Some(cells)
        }
    }

    /// Place `ship` at `start`. Returns `Ok(false)` without touching the
    /// board when it does not fit.
    pub fn place(&mut self, start: Cell, ship: &Ship) -> Result<bool, BoardError> {
        self.ensure_open()?;
        match self.compute_fit(start, ship) {
            Some(cells) => {
                self.commit(ship.id(), cells);
                debug!(
                    "placed {} {} at {} {:?}",
                    ship.ship_type(),
                    ship.id(),
                    start,
                    ship.direction()
                );
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn commit(&mut self, id: ShipId, cells: Vec<Cell>) {
        self.release(id);
        let entries = self.ship_cells.entry(id).or_default();
        for cell in cells {
            self.occupancy.insert(cell, id);
            entries.push(ShipCell { cell, hit: false });
        }
        if self.pending_ship == Some(id) {
            self.pending_ship = None;
        }
    }

    fn release(&mut self, id: ShipId) {
        if let Some(entries) = self.ship_cells.remove(&id) {
            for entry in entries {
                self.occupancy.remove(&entry.cell);
            }
        }
    }

    /// Lift a placed ship off the board so it can be repositioned.
    pub fn delete_ship(&mut self, ship: &Ship) -> Result<(), BoardError> {
        self.ensure_open()?;
        self.release(ship.id());
        Ok(())
    }

    /// Mark `ship` as the one currently being positioned.
    pub fn prepare(&mut self, ship: &Ship) -> Result<(), BoardError> {
        self.ensure_open()?;
        self.pending_ship = Some(ship.id());
        Ok(())
    }

    pub fn cancel_pending(&mut self) {
        self.pending_ship = None;
    }

    pub fn pending_ship(&self) -> Option<ShipId> {
        self.pending_ship
    }

    /// Rotate a placed ship around its origin. When the rotated ship does not
    /// fit, the direction is restored and `Ok(false)` returned.
    pub fn rotate_placed(&mut self, ship: &mut Ship) -> Result<bool, BoardError> {
        self.ensure_open()?;
        let origin = self
            .placed_origin(ship.id())
            .ok_or(BoardError::ShipNotPlaced(ship.id()))?;
        ship.rotate();
        match self.compute_fit(origin, ship) {
            Some(cells) => {
                self.commit(ship.id(), cells);
                Ok(true)
            }
            None => {
                ship.rotate();
                Ok(false)
            }
        }
    }

    /// Lay out every ship in `ships` at random.
    ///
    /// Each ship draws random start cells and directions; after a bounded
    /// number of misses it picks uniformly among the placements that still
    /// fit. A layout that dead-ends is restarted, up to
    /// [`MAX_LAYOUT_ATTEMPTS`] times.
    pub fn place_all_automatically<R: Rng + ?Sized>(
        &mut self,
        ships: &mut [Ship],
        rng: &mut R,
    ) -> Result<(), BoardError> {
        self.ensure_open()?;
        let mut stuck = None;
        for attempt in 0..MAX_LAYOUT_ATTEMPTS {
            for ship in ships.iter() {
                self.release(ship.id());
            }
            stuck = None;
            for ship in ships.iter_mut() {
                if !self.place_randomly(ship, rng) {
                    stuck = Some(ship.id());
                    break;
                }
            }
            match stuck {
                None => return Ok(()),
                Some(id) => debug!("layout attempt {} stuck on ship {}", attempt + 1, id),
            }
        }
        for ship in ships.iter() {
            self.release(ship.id());
        }
        Err(BoardError::UnableToPlaceShip(stuck.unwrap_or(ShipId(0))))
    }

    fn place_randomly<R: Rng + ?Sized>(&mut self, ship: &mut Ship, rng: &mut R) -> bool {
        for _ in 0..self.rows * self.columns * 2 {
            let start = Cell::new(
                rng.random_range(0..self.rows),
                rng.random_range(0..self.columns),
            );
            ship.set_direction(if rng.random() {
                Direction::Horizontal
            } else {
                Direction::Vertical
            });
            if let Some(cells) = self.compute_fit(start, ship) {
                self.commit(ship.id(), cells);
                return true;
            }
        }
        let candidates = self.valid_placements(ship);
        match candidates.choose(rng) {
            Some(&(start, direction)) => {
                ship.set_direction(direction);
                match self.compute_fit(start, ship) {
                    Some(cells) => {
                        self.commit(ship.id(), cells);
                        true
                    }
                    None => false,
                }
            }
            None => false,
        }
    }

    /// Every (start, direction) pair at which `ship` would currently fit.
    pub fn valid_placements(&self, ship: &Ship) -> Vec<(Cell, Direction)> {
        self.cells()
            .flat_map(|start| {
                [Direction::Horizontal, Direction::Vertical]
                    .into_iter()
                    .map(move |direction| (start, direction))
            })
            .filter(|&(start, direction)| {
                self.fit_cells(start, ship.id(), ship.length(), direction)
                    .is_some()
            })
            .collect()
    }

    /// Freeze the layout and build the targeting indices. Must be called
    /// exactly once, when the battle starts.
    pub fn finalize_placement(&mut self) -> Result<(), BoardError> {
        self.ensure_open()?;
        self.finalized = true;
        self.pending_ship = None;
        self.known_ship_cells = match self.intel {
            Intel::FullReveal => self.occupancy.keys().copied().collect(),
            Intel::StruckShips => BTreeSet::new(),
        };
        let known_ships = &self.known_ship_cells;
        self.known_empty_cells = (0..self.rows)
            .flat_map(|r| (0..self.columns).map(move |c| Cell::new(r, c)))
            .filter(|c| !known_ships.contains(c))
            .collect();
        debug!(
            "placement finalized: {} known ship cells, {} known empty cells",
            self.known_ship_cells.len(),
            self.known_empty_cells.len()
        );
        Ok(())
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    // ---- firing ----------------------------------------------------------

    /// Resolve a shot at `cell`, damaging the struck ship in `fleet`.
    ///
    /// Firing at a cell twice is a no-op that reports the first result with
    /// `repeated` set.
    pub fn resolve_shot(&mut self, cell: Cell, fleet: &mut Fleet) -> Result<ShotOutcome, BoardError> {
        self.check_bounds(cell)?;
        if !self.finalized {
            return Err(BoardError::PlacementOpen);
        }
        if self.fired.contains(cell) {
            return Ok(ShotOutcome::repeat(self.hit.contains(cell)));
        }

        let outcome = match self.occupancy.get(&cell).copied() {
            Some(id) => {
                let ship = fleet.get_mut(id).ok_or(BoardError::UnknownShip(id))?;
                self.fired.set(cell.row, cell.column)?;
                self.hit.set(cell.row, cell.column)?;
                let mut first_strike = true;
                if let Some(entries) = self.ship_cells.get_mut(&id) {
                    first_strike = !entries.iter().any(|e| e.hit);
                    for entry in entries.iter_mut().filter(|e| e.cell == cell) {
                        entry.hit = true;
                    }
                }
                if first_strike && self.intel == Intel::StruckShips {
                    self.reveal_ship(id);
                }
                ship.add_damage(cell);
                ShotOutcome::hit(id, ship.is_destroyed())
            }
            None => {
                self.fired.set(cell.row, cell.column)?;
                ShotOutcome::miss()
            }
        };
        self.known_ship_cells.remove(&cell);
        self.known_empty_cells.remove(&cell);
        self.last_shot = Some(LastShot {
            cell,
            was_hit: outcome.was_hit,
        });
        Ok(outcome)
    }

    /// Move the unfired cells of a freshly struck ship into the known-ship
    /// index.
    fn reveal_ship(&mut self, id: ShipId) {
        let Some(entries) = self.ship_cells.get(&id) else {
            return;
        };
        for entry in entries.iter().filter(|e| !self.fired.contains(e.cell)) {
            self.known_empty_cells.remove(&entry.cell);
            self.known_ship_cells.insert(entry.cell);
        }
    }

    // ---- queries ---------------------------------------------------------

    pub fn fired(&self) -> &BitBoard {
        &self.fired
    }

    pub fn hits(&self) -> &BitBoard {
        &self.hit
    }

    pub fn is_fired(&self, cell: Cell) -> bool {
        self.fired.contains(cell)
    }

    pub fn is_hit(&self, cell: Cell) -> bool {
        self.hit.contains(cell)
    }

    /// Cells not fired at yet, row-major.
    pub fn unfired_cells(&self) -> impl Iterator<Item = Cell> + '_ {
        self.cells().filter(move |c| !self.fired.contains(*c))
    }

    pub fn unfired_count(&self) -> usize {
        self.rows * self.columns - self.fired.count_ones()
    }

    /// Ship occupying `cell`, if any.
    pub fn occupant(&self, cell: Cell) -> Option<ShipId> {
        self.occupancy.get(&cell).copied()
    }

    pub fn occupied_count(&self) -> usize {
        self.occupancy.len()
    }

    /// Cells of a placed ship in placement order.
    pub fn ship_cells(&self, id: ShipId) -> Option<&[ShipCell]> {
        self.ship_cells.get(&id).map(Vec::as_slice)
    }

    pub fn is_placed(&self, id: ShipId) -> bool {
        self.ship_cells.contains_key(&id)
    }

    pub fn placed_ships(&self) -> impl Iterator<Item = ShipId> + '_ {
        self.ship_cells.keys().copied()
    }

    /// First cell of a placed ship.
    pub fn placed_origin(&self, id: ShipId) -> Option<Cell> {
        self.ship_cells.get(&id)?.first().map(|e| e.cell)
    }

    pub fn known_ship_cells(&self) -> &BTreeSet<Cell> {
        &self.known_ship_cells
    }

    pub fn known_empty_cells(&self) -> &BTreeSet<Cell> {
        &self.known_empty_cells
    }

    pub fn last_shot(&self) -> Option<LastShot> {
        self.last_shot
    }
}
