//! A rows×columns bitboard sized at runtime.
//!
//! Cells are packed row-major into `u64` words. Boards are used for the
//! fired and hit sets, which only ever grow, so there is no clearing API
//! beyond what tests need.

use alloc::vec;
use alloc::vec::Vec;
use core::fmt;

use crate::common::Cell;

const WORD_BITS: usize = u64::BITS as usize;

/// Errors returned by bitboard operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BitBoardError {
    /// A board must have at least one row and one column.
    #[error("EmptyDimensions: rows={rows}, columns={columns}")]
    EmptyDimensions { rows: usize, columns: usize },
    /// Row or column index is out of bounds.
    #[error("IndexOutOfBounds: row={row}, col={col}")]
    IndexOutOfBounds { row: usize, col: usize },
}

/// A set of cells over a fixed grid.
#[derive(Clone, PartialEq, Eq)]
pub struct BitBoard {
    rows: usize,
    columns: usize,
    words: Vec<u64>,
}

impl BitBoard {
    /// Fallible constructor: returns `Err(EmptyDimensions)` for a zero axis.
    pub fn try_new(rows: usize, columns: usize) -> Result<Self, BitBoardError> {
        if rows == 0 || columns == 0 {
            return Err(BitBoardError::EmptyDimensions { rows, columns });
        }
        let words = (rows * columns).div_ceil(WORD_BITS);
        Ok(BitBoard {
            rows,
            columns,
            words: vec![0; words],
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    /// Returns the number of set bits.
    pub fn count_ones(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Returns true if no bits are set.
    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|w| *w == 0)
    }

    /// Gets the bit at (row, col).
    pub fn get(&self, row: usize, col: usize) -> Result<bool, BitBoardError> {
        let (word, bit) = self.locate(row, col)?;
        Ok(self.words[word] & (1 << bit) != 0)
    }

    /// Sets the bit at (row, col) to 1.
    pub fn set(&mut self, row: usize, col: usize) -> Result<(), BitBoardError> {
        let (word, bit) = self.locate(row, col)?;
        self.words[word] |= 1 << bit;
        Ok(())
    }

    /// Clears the bit at (row, col) to 0.
    pub fn clear(&mut self, row: usize, col: usize) -> Result<(), BitBoardError> {
        let (word, bit) = self.locate(row, col)?;
        self.words[word] &= !(1 << bit);
        Ok(())
    }

    /// Membership test for a cell; out-of-bounds cells are never members.
    pub fn contains(&self, cell: Cell) -> bool {
        self.get(cell.row, cell.column).unwrap_or(false)
    }

    #[inline]
    fn locate(&self, row: usize, col: usize) -> Result<(usize, usize), BitBoardError> {
        if row >= self.rows || col >= self.columns {
            return Err(BitBoardError::IndexOutOfBounds { row, col });
        }
        let idx = row * self.columns + col;
        Ok((idx / WORD_BITS, idx % WORD_BITS))
    }

    /// Creates a bitboard from an iterator over `(row, col)` positions.
    pub fn from_iter<I>(rows: usize, columns: usize, iter: I) -> Result<Self, BitBoardError>
    where
        I: IntoIterator<Item = (usize, usize)>,
    {
        let mut board = Self::try_new(rows, columns)?;
        for (r, c) in iter {
            board.set(r, c)?;
        }
        Ok(board)
    }

    /// Iterator over the set cells in row-major order.
    pub fn iter_set_bits(&self) -> SetBits<'_> {
        SetBits {
            board: self,
            idx: 0,
        }
    }
}

impl fmt::Debug for BitBoard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "BitBoard<{}x{}>:", self.rows, self.columns)?;
        fmt::Display::fmt(self, f)?;
        writeln!(f)
    }
}

impl fmt::Display for BitBoard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for r in 0..self.rows {
            for c in 0..self.columns {
                let bit = if self.get(r, c).unwrap_or(false) {
                    '■'
                } else {
                    '□'
                };
                write!(f, "{} ", bit)?;
            }
            if r + 1 < self.rows {
                writeln!(f)?;
            }
        }
        Ok(())
    }
}

/// Iterator over the set cells of a bitboard.
#[derive(Clone, Copy)]
pub struct SetBits<'a> {
    board: &'a BitBoard,
    idx: usize,
}

impl Iterator for SetBits<'_> {
    type Item = Cell;

    fn next(&mut self) -> Option<Self::Item> {
        let total = self.board.rows * self.board.columns;
        while self.idx < total {
            let idx = self.idx;
            self.idx += 1;
            if self.board.words[idx / WORD_BITS] & (1 << (idx % WORD_BITS)) != 0 {
                return Some(Cell::new(idx / self.board.columns, idx % self.board.columns));
            }
        }
        None
    }
}
