//! Refinement and coarsening of the flow graph.

use super::flow_graph::{FlowGraph, Side};
use crate::debug_invariants::DebugInvariants;
use crate::flow::FlowClassifier;

/// Run `iterations` refinement levels: split every edge piece of a Morse set,
/// recompute the Morse sets and, when `prune` is set, drop nodes that are
/// neither in nor next to a Morse set.
pub fn refine<C: FlowClassifier>(graph: &mut FlowGraph<C>, iterations: usize, prune: bool) {
    for level in 1..=iterations {
        let before = (graph.node_count(), graph.arc_count());
        graph.subdivide_morse_nodes();
        let split = (graph.node_count(), graph.arc_count());
        let sets = graph.compute_morse_sets();
        if prune {
            graph.remove_all_non_morse();
        }
        log::info!(
            "level {level}: {}/{} -> {}/{} -> {}/{} nodes/arcs, {sets} Morse sets",
            before.0,
            before.1,
            split.0,
            split.1,
            graph.node_count(),
            graph.arc_count()
        );
    }
}

/// Merge neighboring edge pieces of the same Morse set across unlocked ends
/// until none are left. Returns the number of merges.
pub fn coarsen_morse_sets<C: FlowClassifier>(graph: &mut FlowGraph<C>) -> usize {
    let mut merges = 0;
    loop {
        let mut merged = false;
        let ids: Vec<_> = graph.arena().node_ids().collect();
        for id in ids {
            for side in [Side::Left, Side::Right] {
                let arena = graph.arena();
                let Some(node) = arena.get(id) else {
                    break;
                };
                let Some(set) = node.morse_set() else {
                    break;
                };
                let neighbor = match side {
                    Side::Left => node.left(),
                    Side::Right => node.right(),
                };
                let same = neighbor.is_some_and(|n| arena.node(n).morse_set() == Some(set));
                if same && graph.merge(id, side).is_some() {
                    merged = true;
                    merges += 1;
                }
            }
        }
        if !merged {
            break;
        }
    }
    log::debug!("coarsening merged {merges} edge pieces");
    graph.debug_assert_invariants();
    merges
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flow::{ClassifierOptions, FieldSamples, PiecewiseConstant};
    use crate::geometry::SurfaceMesh;
    use crate::topology::CellComplex;

    fn fan() -> FlowGraph<PiecewiseConstant> {
        // square split along its diagonal, field running right and slightly up
        let c = CellComplex::from_polygons([[0, 1, 2], [0, 2, 3]]).unwrap();
        let s = SurfaceMesh::new(
            c,
            vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 1.0, 0.0], [0.0, 1.0, 0.0]],
        )
        .unwrap();
        let field = FieldSamples::PerFace(vec![[1.0, 0.2, 0.0], [1.0, 0.2, 0.0]]);
        FlowGraph::new(PiecewiseConstant::new(s, field, ClassifierOptions::default()).unwrap())
    }

    #[test]
    fn refinement_keeps_morse_sets() {
        let mut g = fan();
        let coarse = g.compute_morse_sets();
        refine(&mut g, 3, true);
        coarsen_morse_sets(&mut g);
        assert_eq!(g.compute_morse_sets(), coarse);
        g.validate_invariants().unwrap();
    }

    #[test]
    fn coarsening_leaves_pieces_outside_morse_sets() {
        let mut g = fan();
        g.subdivide_all();
        g.compute_morse_sets();
        let pieces = |g: &FlowGraph<PiecewiseConstant>| -> usize {
            (0..g.complex().num_edges())
                .map(|e| g.edge_pieces(e).len())
                .sum()
        };
        assert_eq!(pieces(&g), 10);
        // the field has no recurrent edge flow, so no piece is in a Morse set
        assert_eq!(coarsen_morse_sets(&mut g), 0);
        assert_eq!(pieces(&g), 10);
    }
}
