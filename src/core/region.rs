//! # Row-band partitioning.
//!
//! Splits the grid height into one contiguous [`Band`] per worker.
//!
//! ```text
//! height = 10, workers = 4
//!
//!   rows 0..3  ─► band 0   (extra row)
//!   rows 3..6  ─► band 1   (extra row)
//!   rows 6..8  ─► band 2
//!   rows 8..10 ─► band 3
//! ```
//!
//! ## Rules
//! - Exactly `workers` bands (clamped to at least 1), ordered by index.
//! - Bands are disjoint and their union is `[0, height)`.
//! - Sizes differ by at most one row; the first `height % workers` bands get the extra row.
//! - With more workers than rows the trailing bands are empty.

/// Contiguous half-open row range `[start, end)` assigned to one worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Band {
    /// Position of this band in the partition (also the worker it runs on).
    pub index: usize,
    pub start: usize,
    pub end: usize,
}

impl Band {
    /// Number of rows owned by the band.
    #[inline]
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Row read above the band, wrapped onto the torus. `None` for an empty band.
    pub fn halo_above(&self, height: usize) -> Option<usize> {
        (!self.is_empty()).then(|| (self.start + height - 1) % height)
    }

    /// Row read below the band, wrapped onto the torus. `None` for an empty band.
    pub fn halo_below(&self, height: usize) -> Option<usize> {
        (!self.is_empty()).then(|| self.end % height)
    }
}

/// Splits `height` rows into `workers` balanced bands.
pub fn partition(height: usize, workers: usize) -> Vec<Band> {
    let workers = workers.max(1);
    let base = height / workers;
    let extra = height % workers;

    let mut bands = Vec::with_capacity(workers);
    let mut start = 0;
    for index in 0..workers {
        let len = base + usize::from(index < extra);
        bands.push(Band {
            index,
            start,
            end: start + len,
        });
        start += len;
    }
    bands
}
