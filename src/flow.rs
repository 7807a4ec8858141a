//! Flow edges: the arrows connecting a batch's occurrences through time.
//!
//! Cells sharing a batch id form one chronological chain regardless of pass
//! direction; each adjacent pair in the chain becomes a directed edge.

use std::collections::BTreeMap;

use crate::grid::{Cell, Grid, Pass};

/// A directed edge between two consecutive occurrences of one batch.
///
/// `pass` is taken from the source (earlier) occurrence, which is what the
/// renderer colors the arrow by.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FlowEdge {
    pub from_gpu: usize,
    pub from_time: usize,
    pub to_gpu: usize,
    pub to_time: usize,
    pub batch: u32,
    pub pass: Pass,
}

/// Derive all flow edges from the grid.
///
/// Occurrences are grouped by batch id, sorted by `(time, gpu)`, and linked
/// pairwise; a batch seen N times yields N-1 edges. Output is deterministic:
/// ascending batch id, then chain order.
pub fn flow_edges(grid: &Grid) -> Vec<FlowEdge> {
    let mut groups: BTreeMap<u32, Vec<(usize, usize, Pass)>> = BTreeMap::new();
    for (gpu, time, cell) in grid.iter() {
        if let Cell::Filled { batch, pass } = cell {
            groups.entry(batch).or_default().push((gpu, time, pass));
        }
    }

    let mut edges = Vec::new();
    for (batch, mut chain) in groups {
        chain.sort_by_key(|&(gpu, time, _)| (time, gpu));
        for pair in chain.windows(2) {
            let (from_gpu, from_time, pass) = pair[0];
            let (to_gpu, to_time, _) = pair[1];
            edges.push(FlowEdge {
                from_gpu,
                from_time,
                to_gpu,
                to_time,
                batch,
                pass,
            });
        }
    }
    edges
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn consecutive_occurrences_are_linked_in_order() {
        let grid = Grid::empty(2, 6)
            .with_cell(0, 0, Cell::filled(3, Pass::Forward))
            .with_cell(1, 1, Cell::filled(3, Pass::Forward))
            .with_cell(1, 5, Cell::filled(3, Pass::Backward));

        let edges = flow_edges(&grid);
        assert_eq!(
            edges,
            vec![
                FlowEdge {
                    from_gpu: 0,
                    from_time: 0,
                    to_gpu: 1,
                    to_time: 1,
                    batch: 3,
                    pass: Pass::Forward,
                },
                FlowEdge {
                    from_gpu: 1,
                    from_time: 1,
                    to_gpu: 1,
                    to_time: 5,
                    batch: 3,
                    pass: Pass::Forward,
                },
            ]
        );
    }

    #[test]
    fn same_timestep_ties_break_on_gpu_index() {
        let grid = Grid::empty(3, 1)
            .with_cell(2, 0, Cell::filled(1, Pass::Forward))
            .with_cell(0, 0, Cell::filled(1, Pass::Forward));

        let edges = flow_edges(&grid);
        assert_eq!(edges.len(), 1);
        assert_eq!((edges[0].from_gpu, edges[0].to_gpu), (0, 2));
    }

    #[test]
    fn singletons_and_empty_grids_yield_no_edges() {
        assert!(flow_edges(&Grid::empty(4, 4)).is_empty());
        let one = Grid::empty(4, 4).with_cell(2, 2, Cell::filled(7, Pass::Forward));
        assert!(flow_edges(&one).is_empty());
    }

    #[test]
    fn edge_pass_comes_from_the_source_occurrence() {
        let grid = Grid::empty(1, 3)
            .with_cell(0, 0, Cell::filled(4, Pass::Backward))
            .with_cell(0, 2, Cell::filled(4, Pass::Forward));
        let edges = flow_edges(&grid);
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].pass, Pass::Backward);
    }

    #[test]
    fn batches_are_emitted_in_ascending_id_order() {
        let grid = Grid::empty(1, 4)
            .with_cell(0, 0, Cell::filled(9, Pass::Forward))
            .with_cell(0, 1, Cell::filled(9, Pass::Forward))
            .with_cell(0, 2, Cell::filled(2, Pass::Forward))
            .with_cell(0, 3, Cell::filled(2, Pass::Forward));
        let batches: Vec<u32> = flow_edges(&grid).iter().map(|edge| edge.batch).collect();
        assert_eq!(batches, vec![2, 9]);
    }

    #[test]
    fn demo_pipeline_chains_each_batch_end_to_end() {
        let grid = Grid::pipeline_demo(4, 10);
        let edges = flow_edges(&grid);
        // Each batch occurs 8 times (4 forward + 4 backward) -> 7 edges.
        assert_eq!(edges.len(), 14);
        assert!(edges
            .iter()
            .zip(edges.iter().skip(1))
            .filter(|(a, b)| a.batch == b.batch)
            .all(|(a, b)| (a.to_time, a.to_gpu) == (b.from_time, b.from_gpu)));
    }
}
