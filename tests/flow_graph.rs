mod util;

use mesh_morse::DebugInvariants;
use mesh_morse::algs::{FlowGraph, NodeId, Side, strongly_connected_components};
use mesh_morse::flow::{
    ClassifierOptions, EdgeFlow, FlowClassifier, PiecewiseConstant, StabilityRadius, SupportHull,
};
use proptest::prelude::*;

fn sorted(it: impl Iterator<Item = NodeId>) -> Vec<NodeId> {
    let mut v: Vec<_> = it.collect();
    v.sort();
    v
}

#[test]
fn octahedron_has_a_sink_and_a_source() {
    let mut g = FlowGraph::new(util::exact(util::octahedron(), [0.0, 0.0, 1.0]));
    assert_eq!(g.node_count(), 12 + 6);
    assert_eq!(g.compute_morse_sets(), 2);
    let north = g.vertex_node(4).unwrap();
    let south = g.vertex_node(5).unwrap();
    assert!(g.arena().has_self_loop(north));
    assert!(g.arena().has_self_loop(south));
    let members = g.morse_set_members();
    assert!(members.iter().all(|m| m.len() == 1));
    assert_ne!(
        g.arena().node(north).morse_set(),
        g.arena().node(south).morse_set()
    );
    g.validate_invariants().unwrap();
}

#[test]
fn morse_sets_are_stable_under_recomputation() {
    let mut g = FlowGraph::new(util::exact(util::split_square(), [1.0, 0.2, 0.0]));
    let n = g.compute_morse_sets();
    let first: Vec<_> = g.arena().nodes().map(|(id, n)| (id, n.morse_set())).collect();
    assert_eq!(g.compute_morse_sets(), n);
    let second: Vec<_> = g.arena().nodes().map(|(id, n)| (id, n.morse_set())).collect();
    assert_eq!(first, second);
}

#[test]
fn components_cover_every_node_once() {
    let g = FlowGraph::new(util::exact(util::octahedron(), [0.2, 0.1, 1.0]));
    let comps = strongly_connected_components(g.arena());
    let mut all: Vec<NodeId> = comps.into_iter().flatten().collect();
    all.sort();
    assert_eq!(all, sorted(g.arena().node_ids()));
}

#[test]
fn pruning_keeps_morse_sets_and_their_neighbors() {
    let mut g = FlowGraph::new(util::exact(util::octahedron(), [0.0, 0.0, 1.0]));
    g.compute_morse_sets();
    g.subdivide_all();
    g.compute_morse_sets();
    let before = g.node_count();
    let removed = g.remove_all_non_morse();
    assert!(removed > 0);
    assert_eq!(g.node_count(), before - removed);
    let arena = g.arena();
    for (id, node) in arena.nodes() {
        let near = node.morse_set().is_some()
            || arena
                .predecessors(id)
                .chain(arena.successors(id))
                .any(|m| arena.node(m).morse_set().is_some());
        assert!(near, "{id:?} survived pruning");
    }
    g.validate_invariants().unwrap();
}

#[test]
fn subdivision_covers_the_edge() {
    let mut g = FlowGraph::new(util::exact(util::split_square(), [1.0, 0.2, 0.0]));
    g.subdivide_all();
    g.subdivide_all();
    for e in 0..g.complex().num_edges() {
        let pieces = g.edge_pieces(e);
        assert_eq!(pieces.len(), 4);
        let mut at = 0.0;
        for (k, &p) in pieces.iter().enumerate() {
            let node = g.arena().node(p);
            assert_eq!(node.range().start, at);
            assert!((node.span() - 0.25).abs() < 1e-12);
            at = node.range().end;
            assert_eq!(node.left(), k.checked_sub(1).map(|j| pieces[j]));
            assert_eq!(node.right(), pieces.get(k + 1).copied());
        }
        assert_eq!(at, 1.0);
    }
    g.validate_invariants().unwrap();
}

fn direction() -> impl Strategy<Value = [f64; 3]> {
    (-1.0f64..1.0, -1.0f64..1.0, -1.0f64..1.0)
        .prop_map(|(x, y, z)| [x, y, z])
        .prop_filter("non-zero", |v| v.iter().map(|c| c * c).sum::<f64>() > 0.01)
}

/// Subdivide the first piece of `edge`, merge the halves back and compare
/// the graph with its state before the split.
fn subdivide_and_merge<C: FlowClassifier>(
    classifier: C,
    edge: usize,
) -> Result<(), TestCaseError> {
    let mut g = FlowGraph::new(classifier);
    let id = g.edge_pieces(edge)[0];
    let counts = (g.node_count(), g.arc_count());
    let succ = sorted(g.arena().successors(id));
    let pred = sorted(g.arena().predecessors(id));

    let rid = g.subdivide(id).unwrap();
    prop_assert_eq!(g.node_count(), counts.0 + 1);
    prop_assert!(g.arena().contains(rid));
    prop_assert_eq!(g.merge(id, Side::Right), Some(id));

    prop_assert_eq!((g.node_count(), g.arc_count()), counts);
    prop_assert_eq!(sorted(g.arena().successors(id)), succ);
    prop_assert_eq!(sorted(g.arena().predecessors(id)), pred);
    prop_assert!(!g.arena().has_self_loop(id));
    prop_assert!(g.validate_invariants().is_ok());
    Ok(())
}

#[test]
fn two_way_edge_round_trips_without_a_self_loop() {
    let s = util::unit_quad();
    let field = util::uniform(&s, [1.0, 0.0, 0.0]);
    let stable = StabilityRadius::new(s, field, 0.1, ClassifierOptions::default()).unwrap();
    let edge = (0..stable.complex().num_edges())
        .find(|&e| stable.edge_flow(e) == EdgeFlow::BOTH)
        .expect("an edge flowing both ways");

    let mut g = FlowGraph::new(stable);
    let id = g.edge_pieces(edge)[0];
    let before = (g.arc_count(), sorted(g.arena().successors(id)));
    let rid = g.subdivide(id).unwrap();
    // the halves flow into each other
    assert!(g.arena().successors(id).any(|n| n == rid));
    assert!(g.arena().successors(rid).any(|n| n == id));
    g.merge(id, Side::Right).unwrap();
    assert_eq!((g.arc_count(), sorted(g.arena().successors(id))), before);
    assert!(!g.arena().has_self_loop(id));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn subdivide_then_merge_restores_the_graph(
        f in direction(),
        edge in 0usize..12,
        radius in 0.0f64..0.5,
        weight in 0.0f64..1.0,
    ) {
        let s = util::octahedron();
        let field = util::uniform(&s, f);
        let options = ClassifierOptions::default();
        subdivide_and_merge(PiecewiseConstant::new(s.clone(), field.clone(), options).unwrap(), edge)?;
        subdivide_and_merge(StabilityRadius::new(s.clone(), field.clone(), radius, options).unwrap(), edge)?;
        subdivide_and_merge(SupportHull::new(s, field, weight, options).unwrap(), edge)?;
    }
}
