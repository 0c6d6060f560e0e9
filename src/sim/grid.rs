//! Occupancy grid for O(1) headway lookup
//!
//! One entry per cell of the track. `cells[i]` holds the index (into the
//! track's vehicle list) of the vehicle whose head rounds down to cell `i`.
//! The grid is rebuilt from scratch every tick, never patched.

/// Cell-indexed vehicle lookup
#[derive(Debug, Clone)]
pub struct OccupancyGrid {
    cells: Vec<Option<usize>>,
}

impl OccupancyGrid {
    /// Create an empty grid. `cell_count` is validated by the owning track.
    pub fn new(cell_count: usize) -> Self {
        Self {
            cells: vec![None; cell_count],
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Mark every cell empty
    pub fn reset(&mut self) {
        self.cells.fill(None);
    }

    /// Record every position in order; later vehicles overwrite earlier ones
    /// that discretize to the same cell.
    pub fn populate<I>(&mut self, positions: I)
    where
        I: IntoIterator<Item = f32>,
    {
        let len = self.cells.len();
        if len == 0 {
            return;
        }
        for (index, pos) in positions.into_iter().enumerate() {
            let cell = (pos.floor() as i64).rem_euclid(len as i64) as usize;
            self.cells[cell] = Some(index);
        }
    }

    /// Occupant of `cell`, or `None` when empty or out of range
    #[inline]
    pub fn query(&self, cell: usize) -> Option<usize> {
        self.cells.get(cell).copied().flatten()
    }

    /// Number of occupied cells
    pub fn occupied(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }
}
