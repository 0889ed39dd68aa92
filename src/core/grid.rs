//! # Toroidal grid of cells.
//!
//! [`Grid`] stores one generation as one byte per cell, row-major, using the
//! same encoding as the image collaborator: `255` alive, `0` dead.
//!
//! ## Rules
//! - Lookups wrap on both axes: `(x, y)` is read at `(x mod W, y mod H)` with a
//!   non-negative remainder, so the grid has no edge cells.
//! - [`Grid::next_state`] is a pure function of this generation; the next
//!   generation is always written to a different buffer.

use crate::error::EngineError;

/// Byte value of an alive cell.
pub const ALIVE: u8 = 255;
/// Byte value of a dead cell.
pub const DEAD: u8 = 0;

/// Position of a cell: `x` is the column, `y` the row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Cell {
    pub x: usize,
    pub y: usize,
}

impl Cell {
    #[inline]
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

/// Game of Life rule: survival on 2 or 3 neighbours, birth on exactly 3.
#[inline]
pub fn rule(alive: bool, neighbours: u8) -> bool {
    match (alive, neighbours) {
        (true, 2) | (true, 3) => true, // survival
        (false, 3) => true,            // birth
        _ => false,                    // death or stays dead
    }
}

/// One generation of a fixed-size toroidal grid.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<u8>,
}

impl Grid {
    /// Creates an all-dead grid.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![DEAD; width * height],
        }
    }

    /// Builds a grid from row-major image bytes.
    ///
    /// Fails with [`EngineError::Io`] when `bytes` is not exactly `width * height`
    /// long and with [`EngineError::InvalidPixel`] on any value other than 0 or 255.
    pub fn from_bytes(width: usize, height: usize, bytes: Vec<u8>) -> Result<Self, EngineError> {
        let expected = width * height;
        if bytes.len() != expected {
            return Err(EngineError::io(format!(
                "expected {expected} bytes for {width}x{height}, got {}",
                bytes.len()
            )));
        }
        if let Some(i) = bytes.iter().position(|&b| b != ALIVE && b != DEAD) {
            return Err(EngineError::InvalidPixel {
                x: i % width,
                y: i / width,
                value: bytes[i],
            });
        }
        Ok(Self {
            width,
            height,
            cells: bytes,
        })
    }

    /// Builds a grid with exactly the given cells alive.
    ///
    /// Coordinates are wrapped onto the grid.
    pub fn from_cells(width: usize, height: usize, alive: &[Cell]) -> Self {
        let mut grid = Self::new(width, height);
        for c in alive {
            grid.set(c.x, c.y, true);
        }
        grid
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Wraps signed coordinates onto the torus.
    #[inline]
    pub fn wrap(&self, x: isize, y: isize) -> (usize, usize) {
        (
            x.rem_euclid(self.width as isize) as usize,
            y.rem_euclid(self.height as isize) as usize,
        )
    }

    /// Returns whether the cell at `(x, y)` is alive, wrapping both coordinates.
    #[inline]
    pub fn alive(&self, x: isize, y: isize) -> bool {
        let (x, y) = self.wrap(x, y);
        self.cells[y * self.width + x] == ALIVE
    }

    /// Counts the alive cells among the 8 Moore neighbours of `(x, y)`.
    pub fn neighbour_count(&self, x: isize, y: isize) -> u8 {
        let mut count = 0;
        for dy in -1..=1 {
            for dx in -1..=1 {
                if (dx, dy) != (0, 0) && self.alive(x + dx, y + dy) {
                    count += 1;
                }
            }
        }
        count
    }

    /// State of `(x, y)` in the next generation.
    #[inline]
    pub fn next_state(&self, x: usize, y: usize) -> bool {
        let (x, y) = (x as isize, y as isize);
        rule(self.alive(x, y), self.neighbour_count(x, y))
    }

    /// Sets a cell, wrapping the coordinates.
    pub fn set(&mut self, x: usize, y: usize, alive: bool) {
        let (x, y) = (x % self.width, y % self.height);
        self.cells[y * self.width + x] = if alive { ALIVE } else { DEAD };
    }

    /// Row-major cell bytes.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.cells
    }

    /// Mutable bytes of rows `[start, end)`.
    #[inline]
    pub(crate) fn rows_mut(&mut self, start: usize, end: usize) -> &mut [u8] {
        &mut self.cells[start * self.width..end * self.width]
    }

    /// Number of alive cells.
    pub fn alive_count(&self) -> usize {
        self.cells.iter().filter(|&&b| b == ALIVE).count()
    }

    /// Every alive cell in row-major order.
    pub fn alive_cells(&self) -> Vec<Cell> {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, b)| **b == ALIVE)
            .map(|(i, _)| Cell::new(i % self.width, i / self.width))
            .collect()
    }
}
