//! # Step worker: next generation of one band.
//!
//! [`step_band`] is the whole of a worker's computation. It reads the prior
//! generation (including the halo rows just outside the band, through the
//! grid's toroidal lookup) and produces an owned buffer for the band's rows.
//!
//! ## Rules
//! - Pure: reads only the shared prior generation, never writes it.
//! - Stateless: nothing survives between calls.
//! - The result carries its [`Band`], so results can be placed in any arrival order.

use super::grid::{ALIVE, Cell, DEAD, Grid};
use super::region::Band;

/// Output of one worker for one turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BandResult {
    /// Rows this result covers.
    pub band: Band,
    /// Turn being computed (the turn number after commit).
    pub turn: u32,
    /// Next-generation bytes for rows `[band.start, band.end)`, row-major.
    pub cells: Vec<u8>,
    /// Cells whose state differs from the prior generation, row-major.
    pub flips: Vec<Cell>,
}

impl BandResult {
    /// Net change in alive cells caused by the flips of this band.
    pub fn alive_delta(&self, prior: &Grid) -> isize {
        self.flips
            .iter()
            .map(|c| if prior.alive(c.x as isize, c.y as isize) { -1 } else { 1 })
            .sum()
    }
}

/// Computes the next generation of `band` from `grid`.
pub fn step_band(grid: &Grid, band: Band, turn: u32) -> BandResult {
    let width = grid.width();
    let mut cells = Vec::with_capacity(band.len() * width);
    let mut flips = Vec::new();

    for y in band.start..band.end {
        for x in 0..width {
            let next = grid.next_state(x, y);
            if next != grid.alive(x as isize, y as isize) {
                flips.push(Cell::new(x, y));
            }
            cells.push(if next { ALIVE } else { DEAD });
        }
    }

    BandResult {
        band,
        turn,
        cells,
        flips,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::region::partition;

    #[test]
    fn test_empty_band_is_noop() {
        let grid = Grid::from_cells(4, 2, &[Cell::new(0, 0)]);
        let band = Band { index: 3, start: 2, end: 2 };
        let res = step_band(&grid, band, 1);
        assert!(res.cells.is_empty());
        assert!(res.flips.is_empty());
        assert_eq!(res.band, band);
    }

    #[test]
    fn test_band_reads_halo_from_neighbour_band() {
        // Blinker straddling the boundary between bands [0,3) and [3,6).
        let grid = Grid::from_cells(6, 6, &[Cell::new(2, 2), Cell::new(2, 3), Cell::new(2, 4)]);
        let bands = partition(6, 2);

        let top = step_band(&grid, bands[0], 1);
        let bottom = step_band(&grid, bands[1], 1);

        assert_eq!(top.flips, vec![Cell::new(2, 2)]);
        assert_eq!(
            bottom.flips,
            vec![Cell::new(1, 3), Cell::new(3, 3), Cell::new(2, 4)]
        );
        assert_eq!(top.alive_delta(&grid) + bottom.alive_delta(&grid), 0);
    }

    #[test]
    fn test_cells_match_next_state() {
        let grid = Grid::from_cells(5, 5, &[Cell::new(1, 1), Cell::new(2, 1), Cell::new(1, 2)]);
        let band = Band { index: 0, start: 1, end: 3 };
        let res = step_band(&grid, band, 4);
        assert_eq!(res.turn, 4);
        for (i, byte) in res.cells.iter().enumerate() {
            let (x, y) = (i % 5, band.start + i / 5);
            assert_eq!(*byte == ALIVE, grid.next_state(x, y), "cell ({x}, {y})");
        }
    }
}
