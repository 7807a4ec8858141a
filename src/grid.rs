//! The schedule grid: GPUs on the rows, timesteps on the columns.
//!
//! Every mutation returns a fresh `Grid` so the rest of the application can
//! treat the current grid as an immutable snapshot and recompute derived
//! views (occupancy, flow edges) without stale-reference hazards.

/// Direction of a pipeline pass through a cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Pass {
    Forward,
    Backward,
}

impl Pass {
    pub fn label(self) -> &'static str {
        match self {
            Pass::Forward => "forward",
            Pass::Backward => "backward",
        }
    }
}

/// A single grid slot. A cell either is a bubble (idle GPU time) or carries
/// both a batch id and a pass direction; there is no half-populated state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Cell {
    #[default]
    Empty,
    Filled {
        batch: u32,
        pass: Pass,
    },
}

impl Cell {
    pub fn filled(batch: u32, pass: Pass) -> Self {
        Cell::Filled { batch, pass }
    }

    pub fn is_empty(self) -> bool {
        matches!(self, Cell::Empty)
    }
}

/// Upper bound on the GPU axis; callers clamp before constructing a grid.
pub const MAX_GPUS: usize = 50;
/// Upper bound on the timestep axis; callers clamp before constructing a grid.
pub const MAX_TIMESTEPS: usize = 100;

/// Interpret free-text cell input as an optional batch id.
///
/// Batch ids are positive integers; anything else (garbage, blanks, zero,
/// negatives) means "empty cell" rather than an error.
pub fn parse_batch(text: &str) -> Option<u32> {
    text.trim().parse::<u32>().ok().filter(|&batch| batch > 0)
}

/// Row-major grid of cells, indexed by `(gpu, time)`.
///
/// All rows have the same length. `num_gpus` rows by `num_timesteps` columns.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    cells: Vec<Vec<Cell>>,
}

impl Grid {
    /// An all-empty grid of the given dimensions.
    pub fn empty(num_gpus: usize, num_timesteps: usize) -> Self {
        Self {
            cells: vec![vec![Cell::Empty; num_timesteps]; num_gpus],
        }
    }

    /// The canonical pipeline-bubble demonstration pattern: two forward
    /// diagonals (batches 1 and 2) descending through the GPUs, then two
    /// backward diagonals climbing back up once the last GPU has finished.
    ///
    /// Diagonals that would run off the grid are shortened, so small grids
    /// get a truncated but valid pattern.
    pub fn pipeline_demo(num_gpus: usize, num_timesteps: usize) -> Self {
        let mut grid = Self::empty(num_gpus, num_timesteps);

        for (batch, start) in [(1u32, 0usize), (2, 1)] {
            let len = num_gpus.min(num_timesteps.saturating_sub(start));
            for step in 0..len {
                grid.cells[step][start + step] = Cell::filled(batch, Pass::Forward);
            }
        }

        for (batch, start) in [(1u32, num_gpus + 1), (2, num_gpus + 2)] {
            let len = num_gpus.min(num_timesteps.saturating_sub(start));
            for step in 0..len {
                grid.cells[num_gpus - 1 - step][start + step] =
                    Cell::filled(batch, Pass::Backward);
            }
        }

        grid
    }

    pub fn num_gpus(&self) -> usize {
        self.cells.len()
    }

    pub fn num_timesteps(&self) -> usize {
        self.cells.first().map_or(0, Vec::len)
    }

    pub fn cell(&self, gpu: usize, time: usize) -> Cell {
        self.cells[gpu][time]
    }

    /// Iterate rows in GPU order; each row is one GPU's timeline.
    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.cells.iter().map(Vec::as_slice)
    }

    /// Iterate every `(gpu, time, cell)` triple in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, Cell)> + '_ {
        self.cells.iter().enumerate().flat_map(|(gpu, row)| {
            row.iter()
                .enumerate()
                .map(move |(time, &cell)| (gpu, time, cell))
        })
    }

    /// A resized copy: cells inside both the old and new bounds survive,
    /// everything else starts empty. Never fails.
    pub fn resized(&self, num_gpus: usize, num_timesteps: usize) -> Self {
        let mut next = Self::empty(num_gpus, num_timesteps);
        for gpu in 0..num_gpus.min(self.num_gpus()) {
            for time in 0..num_timesteps.min(self.num_timesteps()) {
                next.cells[gpu][time] = self.cells[gpu][time];
            }
        }
        next
    }

    /// A copy with exactly one cell replaced.
    pub fn with_cell(&self, gpu: usize, time: usize, cell: Cell) -> Self {
        let mut next = self.clone();
        next.cells[gpu][time] = cell;
        next
    }

    /// Number of bubbles (empty cells) in the schedule.
    pub fn count_empty(&self) -> usize {
        self.cells
            .iter()
            .flatten()
            .filter(|cell| cell.is_empty())
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_grid_has_requested_shape() {
        let grid = Grid::empty(3, 7);
        assert_eq!(grid.num_gpus(), 3);
        assert_eq!(grid.num_timesteps(), 7);
        assert!(grid.iter().all(|(_, _, cell)| cell.is_empty()));
        assert_eq!(grid.count_empty(), 21);
    }

    #[test]
    fn rows_stay_equal_length_after_edits() {
        let grid = Grid::pipeline_demo(4, 10)
            .with_cell(2, 5, Cell::filled(9, Pass::Forward))
            .resized(6, 8);
        assert!(grid.rows().all(|row| row.len() == 8));
    }

    #[test]
    fn resize_preserves_overlap_and_pads_with_empty() {
        let grid = Grid::empty(2, 3).with_cell(1, 2, Cell::filled(5, Pass::Backward));

        let grown = grid.resized(4, 5);
        assert_eq!(grown.cell(1, 2), Cell::filled(5, Pass::Backward));
        assert_eq!(grown.cell(3, 4), Cell::Empty);

        let shrunk = grid.resized(1, 2);
        assert_eq!(shrunk.num_gpus(), 1);
        assert_eq!(shrunk.num_timesteps(), 2);
        assert_eq!(shrunk.count_empty(), 2);
    }

    #[test]
    fn with_cell_replaces_a_single_cell() {
        let grid = Grid::empty(2, 2).with_cell(0, 1, Cell::filled(3, Pass::Forward));
        assert_eq!(grid.cell(0, 1), Cell::filled(3, Pass::Forward));
        assert_eq!(grid.count_empty(), 3);

        let cleared = grid.with_cell(0, 1, Cell::Empty);
        assert_eq!(cleared.cell(0, 1), Cell::Empty);
        assert_eq!(cleared.count_empty(), 4);
    }

    #[test]
    fn with_cell_leaves_the_original_untouched() {
        let grid = Grid::empty(2, 2);
        let _edited = grid.with_cell(0, 0, Cell::filled(1, Pass::Forward));
        assert_eq!(grid.count_empty(), 4);
    }

    #[test]
    fn parse_batch_accepts_positive_integers_only() {
        assert_eq!(parse_batch("7"), Some(7));
        assert_eq!(parse_batch("  3 "), Some(3));
        assert_eq!(parse_batch(""), None);
        assert_eq!(parse_batch("abc"), None);
        assert_eq!(parse_batch("1.5"), None);
        assert_eq!(parse_batch("0"), None);
        assert_eq!(parse_batch("-2"), None);
    }

    #[test]
    fn demo_pattern_places_forward_diagonals() {
        let grid = Grid::pipeline_demo(4, 10);
        for step in 0..4 {
            assert_eq!(grid.cell(step, step), Cell::filled(1, Pass::Forward));
            assert_eq!(grid.cell(step, step + 1), Cell::filled(2, Pass::Forward));
        }
    }

    #[test]
    fn demo_pattern_places_backward_diagonals_after_the_pipeline_fills() {
        let grid = Grid::pipeline_demo(4, 10);
        // Backward diagonals start at num_gpus + 1 and num_gpus + 2,
        // descending from the last GPU.
        for step in 0..4 {
            assert_eq!(
                grid.cell(3 - step, 5 + step),
                Cell::filled(1, Pass::Backward)
            );
            assert_eq!(
                grid.cell(3 - step, 6 + step),
                Cell::filled(2, Pass::Backward)
            );
        }
    }

    #[test]
    fn demo_pattern_truncates_on_small_grids() {
        let grid = Grid::pipeline_demo(4, 3);
        assert_eq!(grid.cell(0, 0), Cell::filled(1, Pass::Forward));
        assert_eq!(grid.cell(2, 2), Cell::filled(1, Pass::Forward));
        // No room for the backward diagonals at all.
        assert!(grid
            .iter()
            .all(|(_, _, cell)| !matches!(cell, Cell::Filled { pass: Pass::Backward, .. })));

        let tiny = Grid::pipeline_demo(1, 1);
        assert_eq!(tiny.cell(0, 0), Cell::filled(1, Pass::Forward));
    }
}
