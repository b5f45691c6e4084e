//! Morse connection graph extraction.
//!
//! Before connections are read off the flow graph, the channels leaving and
//! entering every saddle-like Morse set are refined: a forward and a backward
//! traversal from the set subdivide every reached edge piece longer than a
//! level threshold, first at `min_level`, then, if another saddle-like set is
//! reachable, at `max_level`. The traversed pieces are merged back together
//! and their border to the untraversed part of the graph is locked.

use super::arena::NodeId;
use super::connection_graph::ConnectionGraph;
use super::flow_graph::{FlowGraph, Side};
use super::morse_type::MorseSetType;
use crate::debug_invariants::DebugInvariants;
use crate::flow::FlowClassifier;
use crate::mesh_error::MeshMorseError;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Direction {
    Forward,
    Backward,
}

/// Largest span a reached piece may keep at `level`.
fn span_threshold(level: u32) -> f64 {
    1.01 * 0.5f64.powi(level as i32)
}

fn neighbors<C: FlowClassifier>(graph: &FlowGraph<C>, id: NodeId, dir: Direction) -> Vec<NodeId> {
    let arena = graph.arena();
    match dir {
        Direction::Forward => arena.successors(id).collect(),
        Direction::Backward => arena.predecessors(id).collect(),
    }
}

/// Refine the connecting channels of every saddle-like Morse set.
///
/// `types` must describe the current Morse sets of `graph`.
pub fn prepare_for_mcg<C: FlowClassifier>(
    graph: &mut FlowGraph<C>,
    types: &[MorseSetType],
    min_level: u32,
    max_level: u32,
) -> Result<(), MeshMorseError> {
    if min_level > max_level {
        return Err(MeshMorseError::InvalidParameter {
            name: "min_level",
            reason: format!("{min_level} exceeds max_level {max_level}"),
        });
    }
    let mut done = vec![false; types.len()];
    let mut starts = Vec::new();
    for (id, node) in graph.arena().nodes() {
        let Some(s) = node.morse_set() else {
            continue;
        };
        if !done[s] && types[s].is_saddle_like() {
            done[s] = true;
            starts.push(id);
        }
    }
    log::info!("preparing {} Morse sets for MCG extraction", starts.len());

    for (count, &start) in starts.iter().enumerate() {
        log::debug!("channels of Morse set {}/{}", count + 1, starts.len());
        traverse_and_subdivide(graph, types, start, min_level, max_level, Direction::Forward);
        traverse_and_subdivide(graph, types, start, min_level, max_level, Direction::Backward);
    }
    graph.debug_assert_invariants();
    Ok(())
}

fn traverse_and_subdivide<C: FlowClassifier>(
    graph: &mut FlowGraph<C>,
    types: &[MorseSetType],
    start: NodeId,
    min_level: u32,
    max_level: u32,
    dir: Direction,
) {
    let start_set = graph.arena().node(start).morse_set();
    let mut span = span_threshold(min_level);
    let mut fine = false;
    let mut traversed: Vec<NodeId> = Vec::new();

    loop {
        traversed.clear();
        let mut found = false;
        let mut new_nodes = Vec::new();
        let mut stack = vec![start];
        graph.arena_mut().node_mut(start).status.visited = true;

        while let Some(cn) = stack.pop() {
            if let Some(s) = graph.arena().node(cn).morse_set()
                && Some(s) != start_set
                && types[s].is_saddle_like()
            {
                found = true;
            }
            traversed.push(cn);

            for m in neighbors(graph, cn, dir) {
                let node = graph.arena().node(m);
                let status = node.status();
                let split = node.is_edge_piece()
                    && node.morse_set().is_none()
                    && node.span() > span
                    && !status.settled
                    && !status.visited;
                if !split {
                    continue;
                }
                graph.arena_mut().node_mut(m).status.settled = true;
                if let Some(r) = graph.subdivide(m) {
                    graph.arena_mut().node_mut(m).status.settled = true;
                    graph.arena_mut().node_mut(r).status.settled = true;
                    new_nodes.push(m);
                    new_nodes.push(r);
                }
            }

            for m in neighbors(graph, cn, dir) {
                let status = &mut graph.arena_mut().node_mut(m).status;
                if !status.visited {
                    status.visited = true;
                    stack.push(m);
                }
            }
        }

        for &id in &new_nodes {
            graph.arena_mut().node_mut(id).status.settled = false;
        }
        if fine && (!found || new_nodes.is_empty()) {
            break;
        }
        if !fine && new_nodes.is_empty() {
            if !found {
                break;
            }
            fine = true;
            span = span_threshold(max_level);
        }
        for &id in &traversed {
            graph.arena_mut().node_mut(id).status.visited = false;
        }
    }

    // merge the traversed pieces and lock their border
    for cn in traversed.iter().copied() {
        let Some(node) = graph.arena().get(cn) else {
            // merged into an earlier piece
            continue;
        };
        if node.morse_set().is_some() {
            continue;
        }
        graph.arena_mut().node_mut(cn).status.settled = true;
        for side in [Side::Left, Side::Right] {
            let node = graph.arena().node(cn);
            let (neighbor, locked) = match side {
                Side::Left => (node.left(), node.status().lock_left),
                Side::Right => (node.right(), node.status().lock_right),
            };
            let mergeable = !locked
                && neighbor.is_some_and(|n| graph.arena().node(n).status().settled);
            if mergeable && graph.merge(cn, side).is_some() {
                let status = &mut graph.arena_mut().node_mut(cn).status;
                status.visited = true;
                status.settled = true;
            }
        }
        let node = graph.arena().node(cn);
        let outside = |n: Option<NodeId>| n.is_some_and(|n| !graph.arena().node(n).status().visited);
        let (lock_right, lock_left) = (outside(node.right()), outside(node.left()));
        if lock_right {
            graph.arena_mut().lock_right(cn);
        }
        if lock_left {
            graph.arena_mut().lock_left(cn);
        }
    }

    graph.arena_mut().clear_marks();
}

/// Read the connection graph off the flow graph.
///
/// From one node of every Morse set (non-trivial ones only unless
/// `include_trivial` is set) a forward traversal records every other such
/// Morse set it reaches; edges implied by two-step paths are then removed.
pub fn connection_graph<C: FlowClassifier>(
    graph: &FlowGraph<C>,
    types: &[MorseSetType],
    include_trivial: bool,
) -> ConnectionGraph {
    let arena = graph.arena();
    let mut mcg = ConnectionGraph::new(types.to_vec());
    let retained = |s: usize| include_trivial || !types[s].is_trivial();
    let mut done = vec![false; types.len()];
    let mut seen = vec![false; arena.slot_count()];
    let mut added = vec![false; types.len()];

    for (id, node) in arena.nodes() {
        let Some(s) = node.morse_set() else {
            continue;
        };
        if done[s] || !retained(s) {
            continue;
        }
        done[s] = true;
        seen.fill(false);
        added.fill(false);

        let mut stack = vec![id];
        while let Some(cn) = stack.pop() {
            if seen[cn.index()] {
                continue;
            }
            seen[cn.index()] = true;
            if let Some(t) = arena.node(cn).morse_set()
                && t != s
                && !added[t]
                && retained(t)
            {
                mcg.add_edge(s, t);
                added[t] = true;
            }
            stack.extend(arena.successors(cn).filter(|m| !seen[m.index()]));
        }
    }

    mcg.remove_redundant_edges();
    log::info!(
        "MCG: {} nodes with connections, {} edges",
        mcg.active_nodes().count(),
        mcg.edge_count()
    );
    mcg
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thresholds_halve_per_level() {
        assert!((span_threshold(0) - 1.01).abs() < 1e-12);
        assert!((span_threshold(3) - 1.01 / 8.0).abs() < 1e-12);
        // level 0 keeps whole edges, level 1 splits them once
        assert!(1.0 < span_threshold(0));
        assert!(1.0 > span_threshold(1));
        assert!(0.5 < span_threshold(1));
    }
}
