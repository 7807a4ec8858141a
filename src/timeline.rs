//! Per-GPU memory occupancy, derived by replaying the schedule.
//!
//! A forward pass admits a batch's activations into the GPU's memory, the
//! matching backward pass releases them. Occupancy is just the size of that
//! resident set after each timestep's event; GPUs never interact here.

use std::collections::BTreeSet;

use crate::grid::{Cell, Grid, Pass};

/// Occupancy counts indexed `[gpu][time]`.
///
/// Recorded after applying the event at each timestep: a forward at `t`
/// already counts at `t`, a backward at `t` is already gone at `t`.
pub fn occupancy(grid: &Grid) -> Vec<Vec<usize>> {
    grid.rows()
        .map(|row| {
            let mut resident: BTreeSet<u32> = BTreeSet::new();
            row.iter()
                .map(|&cell| {
                    if let Cell::Filled { batch, pass } = cell {
                        match pass {
                            Pass::Forward => {
                                resident.insert(batch);
                            }
                            Pass::Backward => {
                                resident.remove(&batch);
                            }
                        }
                    }
                    resident.len()
                })
                .collect()
        })
        .collect()
}

/// Largest occupancy anywhere in the table; used for chart scaling.
pub fn peak(table: &[Vec<usize>]) -> usize {
    table.iter().flatten().copied().max().unwrap_or(0)
}
