//! Flow graph over vertices and edge pieces.
//!
//! Every vertex is a node, and every edge starts as one node spanning its whole
//! parameter range. Arcs record where flow can go next:
//! - a stationary vertex loops onto itself;
//! - flow sliding along an edge runs from the lower vertex into the edge and
//!   from the edge into the higher vertex (or the reverse when it slides down);
//! - a spiral vertex and its first incident edge are linked both ways;
//! - inside a face, a repelling boundary element is linked to every
//!   non-adjacent attracting element the face's flow can carry it to.
//!
//! Subdivision splits an edge piece at its midpoint and re-derives the
//! affected arcs; merge joins two adjacent pieces of one edge again. Both keep
//! the left/right chains of the edge pieces consistent.

use hashbrown::HashSet;

use super::arena::{ArcEnd, Carrier, GraphArena, Node, NodeId};
use super::scc;
use crate::debug_invariants::DebugInvariants;
use crate::flow::{FlowClassifier, ParamRange};
use crate::mesh_error::MeshMorseError;
use crate::topology::{CellComplex, CellDim, CellId};

/// End of an edge piece.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Side {
    Left,
    Right,
}

pub struct FlowGraph<C> {
    classifier: C,
    arena: GraphArena,
    morse_sets: usize,
}

impl<C: FlowClassifier> FlowGraph<C> {
    /// Build the coarse graph: one node per edge (ids `0..E`) followed by one
    /// node per vertex (ids `E..E+V`).
    pub fn new(classifier: C) -> Self {
        let mut arena = GraphArena::default();
        let complex = classifier.complex();
        let num_edges = complex.num_edges();
        let edge_node = |e: usize| NodeId::from_index(e);
        let vertex_node = |v: usize| NodeId::from_index(num_edges + v);
        let node_of = |c: CellId| match c.dim() {
            CellDim::Vertex => vertex_node(c.index()),
            CellDim::Edge => edge_node(c.index()),
            CellDim::Face => unreachable!("faces have no graph node"),
        };

        for e in 0..num_edges {
            arena.insert_node(Node::piece(CellId::edge(e), ParamRange::FULL, None, None));
        }
        for v in 0..complex.num_vertices() {
            arena.insert_node(Node::vertex(v));
        }

        for v in 0..complex.num_vertices() {
            if classifier.is_stationary(v) {
                arena.add_arc(vertex_node(v), vertex_node(v), Carrier::Vertex(v));
            }
        }

        for e in 0..num_edges {
            let (lo, hi) = complex.edge_endpoints(e);
            let flow = classifier.edge_flow(e);
            if flow.up {
                arena.add_arc(edge_node(e), vertex_node(hi), Carrier::Edge(e));
                arena.add_arc(vertex_node(lo), edge_node(e), Carrier::Edge(e));
            }
            if flow.down {
                arena.add_arc(edge_node(e), vertex_node(lo), Carrier::Edge(e));
                arena.add_arc(vertex_node(hi), edge_node(e), Carrier::Edge(e));
            }
        }

        for face in 0..complex.num_faces() {
            let boundary = complex.face(face).faces();
            let len = boundary.len();
            for from_pos in 0..len {
                if !classifier.repels(face, from_pos) {
                    continue;
                }
                for to_pos in 0..len {
                    // the element itself and its two neighbors share a point
                    if to_pos == from_pos
                        || to_pos == (from_pos + 1) % len
                        || to_pos == (from_pos + len - 1) % len
                    {
                        continue;
                    }
                    if classifier.attracts(face, to_pos)
                        && classifier.connects(
                            face,
                            from_pos,
                            to_pos,
                            ParamRange::FULL,
                            ParamRange::FULL,
                        )
                    {
                        arena.add_arc(
                            node_of(boundary[from_pos]),
                            node_of(boundary[to_pos]),
                            Carrier::Face {
                                face,
                                from_pos,
                                to_pos,
                            },
                        );
                    }
                }
            }
        }

        for v in 0..complex.num_vertices() {
            if !classifier.is_spiral(v) {
                continue;
            }
            let Some(&edge) = complex.vertex(v).cofaces().first() else {
                continue;
            };
            let e = edge.index();
            arena.add_arc(edge_node(e), vertex_node(v), Carrier::Edge(e));
            arena.add_arc(vertex_node(v), edge_node(e), Carrier::Edge(e));
        }

        log::debug!(
            "flow graph: {} nodes, {} arcs",
            arena.node_count(),
            arena.arc_count()
        );
        let graph = FlowGraph {
            classifier,
            arena,
            morse_sets: 0,
        };
        graph.debug_assert_invariants();
        graph
    }

    pub fn classifier(&self) -> &C {
        &self.classifier
    }

    pub fn complex(&self) -> &CellComplex {
        self.classifier.complex()
    }

    pub fn arena(&self) -> &GraphArena {
        &self.arena
    }

    pub(crate) fn arena_mut(&mut self) -> &mut GraphArena {
        &mut self.arena
    }

    pub fn node_count(&self) -> usize {
        self.arena.node_count()
    }

    pub fn arc_count(&self) -> usize {
        self.arena.arc_count()
    }

    /// Number of Morse sets found by the last [`compute_morse_sets`](Self::compute_morse_sets).
    pub fn morse_set_count(&self) -> usize {
        self.morse_sets
    }

    /// Node of vertex `v`, unless it has been pruned.
    pub fn vertex_node(&self, v: usize) -> Option<NodeId> {
        let id = NodeId::from_index(self.complex().num_edges() + v);
        self.arena
            .get(id)
            .filter(|n| n.owner() == CellId::vertex(v))
            .map(|_| id)
    }

    /// Pieces of `edge` ordered along the edge.
    pub fn edge_pieces(&self, edge: usize) -> Vec<NodeId> {
        let owner = CellId::edge(edge);
        let mut pieces: Vec<(f64, NodeId)> = self
            .arena
            .nodes()
            .filter(|(_, n)| n.owner() == owner)
            .map(|(id, n)| (n.range().start, id))
            .collect();
        pieces.sort_by(|a, b| a.0.total_cmp(&b.0));
        pieces.into_iter().map(|(_, id)| id).collect()
    }

    /// Nodes of each Morse set, indexed by Morse set id.
    pub fn morse_set_members(&self) -> Vec<Vec<NodeId>> {
        let mut members = vec![Vec::new(); self.morse_sets];
        for (id, node) in self.arena.nodes() {
            if let Some(s) = node.morse_set() {
                members[s].push(id);
            }
        }
        members
    }

    /// Recompute strongly connected components and number the Morse sets.
    pub fn compute_morse_sets(&mut self) -> usize {
        let classifier = &self.classifier;
        self.morse_sets =
            scc::assign_morse_sets(&mut self.arena, |v| classifier.is_stationary(v));
        self.morse_sets
    }

    /// Split the edge piece `id` at its midpoint.
    ///
    /// The left half keeps `id`; the id of the right half is returned. Returns
    /// `None` when `id` is not a live edge piece.
    pub fn subdivide(&mut self, id: NodeId) -> Option<NodeId> {
        let node = self.arena.get(id)?;
        if !node.is_edge_piece() {
            return None;
        }
        let owner = node.owner();
        let edge = owner.index();
        let (incoming, outgoing) = self.arena.arc_ends(id);
        let parent = self.arena.take_node(id);
        let (lower, upper) = parent.range().bisect();

        let mut left = Node::piece(owner, lower, parent.left(), None);
        left.status.lock_left = parent.status().lock_left;
        self.arena.place_node(id, left);
        let mut right = Node::piece(owner, upper, Some(id), parent.right());
        right.status.lock_right = parent.status().lock_right;
        let rid = self.arena.insert_node(right);
        self.arena.set_right(id, Some(rid));
        self.arena.relink(id);
        self.arena.relink(rid);

        let flow = self.classifier.edge_flow(edge);
        if flow.up {
            self.arena.add_arc(id, rid, Carrier::Edge(edge));
        }
        if flow.down {
            self.arena.add_arc(rid, id, Carrier::Edge(edge));
        }

        for end in incoming {
            if end.other == id {
                // a self-loop is covered by the arcs between the halves
                continue;
            }
            for child in self.children_reached(end, edge, [id, rid], true) {
                self.arena.add_arc(end.other, child, end.carrier);
            }
        }
        for end in outgoing {
            if end.other == id {
                continue;
            }
            for child in self.children_reached(end, edge, [id, rid], false) {
                self.arena.add_arc(child, end.other, end.carrier);
            }
        }
        Some(rid)
    }

    /// Halves that inherit an arc of their parent. `incoming` tells whether
    /// `end.other` is the source of the arc.
    fn children_reached(
        &self,
        end: ArcEnd,
        edge: usize,
        children: [NodeId; 2],
        incoming: bool,
    ) -> Vec<NodeId> {
        let other = self.arena.node(end.other);
        match end.carrier {
            Carrier::Edge(_) => {
                if other.is_vertex() {
                    let (lo, _) = self.complex().edge_endpoints(edge);
                    if other.owner().index() == lo {
                        debug_assert_eq!(self.arena.node(children[0]).range().start, 0.0);
                        vec![children[0]]
                    } else {
                        debug_assert_eq!(self.arena.node(children[1]).range().end, 1.0);
                        vec![children[1]]
                    }
                } else {
                    let range = other.range();
                    let child = children
                        .into_iter()
                        .find(|&c| self.arena.node(c).range().touches(&range));
                    match child {
                        Some(c) => vec![c],
                        None => panic!(
                            "edge-carried arc from a piece of edge {edge} that touches neither half"
                        ),
                    }
                }
            }
            Carrier::Face {
                face,
                from_pos,
                to_pos,
            } => children
                .into_iter()
                .filter(|&c| {
                    let child_range = self.arena.node(c).range();
                    let (from_range, to_range) = if incoming {
                        (other.range(), child_range)
                    } else {
                        (child_range, other.range())
                    };
                    self.classifier
                        .connects(face, from_pos, to_pos, from_range, to_range)
                })
                .collect(),
            Carrier::Vertex(v) => unreachable!("vertex-carried arc at edge piece of vertex {v}"),
        }
    }

    /// Merge the edge piece `id` with its neighbor on `side`.
    ///
    /// The merged node keeps `id`, the Morse set and traversal marks of `id`,
    /// and the locks of the two outer ends. Arcs of both pieces are united,
    /// one per (neighbor, carrier), and arcs between the two pieces are
    /// dropped. Returns `None` when there is no neighbor on that side or that
    /// side is locked.
    pub fn merge(&mut self, id: NodeId, side: Side) -> Option<NodeId> {
        let node = self.arena.get(id)?;
        let status = node.status();
        let (j, locked) = match side {
            Side::Left => (node.left()?, status.lock_left),
            Side::Right => (node.right()?, status.lock_right),
        };
        if locked {
            return None;
        }
        let other = self.arena.node(j);
        let (range, left, right, lock_left, lock_right) = match side {
            Side::Left => (
                ParamRange::new(other.range().start, node.range().end),
                other.left(),
                node.right(),
                other.status().lock_left,
                status.lock_right,
            ),
            Side::Right => (
                ParamRange::new(node.range().start, other.range().end),
                node.left(),
                other.right(),
                status.lock_left,
                other.status().lock_right,
            ),
        };
        let owner = node.owner();
        let morse_set = node.morse_set();

        let mut incoming = Vec::new();
        let mut outgoing = Vec::new();
        let mut seen_in = HashSet::new();
        let mut seen_out = HashSet::new();
        for piece in [id, j] {
            let (ins, outs) = self.arena.arc_ends(piece);
            incoming.extend(
                ins.into_iter()
                    .filter(|e| e.other != id && e.other != j && seen_in.insert(*e)),
            );
            outgoing.extend(
                outs.into_iter()
                    .filter(|e| e.other != id && e.other != j && seen_out.insert(*e)),
            );
        }

        self.arena.take_node(id);
        self.arena.remove_node(j);
        let mut merged = Node::piece(owner, range, left, right);
        merged.morse_set = morse_set;
        merged.status = status;
        merged.status.lock_left = lock_left;
        merged.status.lock_right = lock_right;
        self.arena.place_node(id, merged);
        self.arena.relink(id);

        for e in incoming {
            self.arena.add_arc(e.other, id, e.carrier);
        }
        for e in outgoing {
            self.arena.add_arc(id, e.other, e.carrier);
        }
        Some(id)
    }

    /// Subdivide every edge piece once.
    pub fn subdivide_all(&mut self) {
        let pieces: Vec<NodeId> = self
            .arena
            .nodes()
            .filter(|(_, n)| n.is_edge_piece())
            .map(|(id, _)| id)
            .collect();
        for id in pieces {
            self.subdivide(id);
        }
        self.debug_assert_invariants();
    }

    /// Subdivide every edge piece that belongs to a Morse set.
    pub fn subdivide_morse_nodes(&mut self) {
        let pieces: Vec<NodeId> = self
            .arena
            .nodes()
            .filter(|(_, n)| n.is_edge_piece() && n.morse_set().is_some())
            .map(|(id, _)| id)
            .collect();
        for id in pieces {
            self.subdivide(id);
        }
        self.debug_assert_invariants();
    }

    /// Remove nodes outside every Morse set whose graph neighbors are all
    /// outside every Morse set too. Returns the number of removed nodes.
    pub fn remove_all_non_morse(&mut self) -> usize {
        let arena = &self.arena;
        let doomed: Vec<NodeId> = arena
            .nodes()
            .filter(|(id, n)| {
                n.morse_set().is_none()
                    && arena
                        .predecessors(*id)
                        .chain(arena.successors(*id))
                        .all(|m| arena.node(m).morse_set().is_none())
            })
            .map(|(id, _)| id)
            .collect();
        for &id in &doomed {
            self.arena.remove_node(id);
        }
        self.debug_assert_invariants();
        doomed.len()
    }
}

impl<C: FlowClassifier> DebugInvariants for FlowGraph<C> {
    fn debug_assert_invariants(&self) {
        crate::debug_invariants!(self.validate_invariants(), "FlowGraph");
    }

    fn validate_invariants(&self) -> Result<(), MeshMorseError> {
        let arena = &self.arena;
        for (id, node) in arena.nodes() {
            for &a in node.outgoing() {
                let arc = arena.arc(a);
                if arc.from() != id || !arena.contains(arc.to()) {
                    return Err(MeshMorseError::InvariantViolation(format!(
                        "arc {a:?} listed as outgoing at {id:?} runs {:?} -> {:?}",
                        arc.from(),
                        arc.to()
                    )));
                }
                let mirrored = arena.node(arc.to()).incoming().iter().filter(|&&b| b == a).count();
                if mirrored != 1 {
                    return Err(MeshMorseError::InvariantViolation(format!(
                        "arc {a:?} appears {mirrored} times in the incoming list of {:?}",
                        arc.to()
                    )));
                }
            }
            for &a in node.incoming() {
                if arena.arc(a).to() != id {
                    return Err(MeshMorseError::InvariantViolation(format!(
                        "arc {a:?} listed as incoming at {id:?} ends elsewhere"
                    )));
                }
            }
            if let Some(r) = node.right() {
                let right = arena.get(r).ok_or_else(|| {
                    MeshMorseError::InvariantViolation(format!("{id:?} has a dead right neighbor"))
                })?;
                if right.left() != Some(id)
                    || right.owner() != node.owner()
                    || right.range().start != node.range().end
                {
                    return Err(MeshMorseError::InvariantViolation(format!(
                        "pieces {id:?} and {r:?} are not adjacent"
                    )));
                }
                if right.status().lock_left != node.status().lock_right {
                    return Err(MeshMorseError::InvariantViolation(format!(
                        "lock between {id:?} and {r:?} is one-sided"
                    )));
                }
            }
            if let Some(l) = node.left()
                && arena.get(l).and_then(|n| n.right()) != Some(id)
            {
                return Err(MeshMorseError::InvariantViolation(format!(
                    "left neighbor of {id:?} does not point back"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flow::{ClassifierOptions, FieldSamples, PiecewiseConstant};
    use crate::geometry::SurfaceMesh;

    fn square(f: [f64; 3]) -> FlowGraph<PiecewiseConstant> {
        let c = CellComplex::from_polygons([[0, 1, 2, 3]]).unwrap();
        let s = SurfaceMesh::new(
            c,
            vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 1.0, 0.0], [0.0, 1.0, 0.0]],
        )
        .unwrap();
        let pc =
            PiecewiseConstant::new(s, FieldSamples::PerFace(vec![f]), ClassifierOptions::default())
                .unwrap();
        FlowGraph::new(pc)
    }

    #[test]
    fn coarse_graph_of_the_square() {
        let g = square([1.0, 0.0, 0.0]);
        assert_eq!(g.node_count(), 8);
        // v1 sinks, v3 sources: one self-loop each
        let v1 = g.vertex_node(1).unwrap();
        let v3 = g.vertex_node(3).unwrap();
        assert!(g.arena().has_self_loop(v1));
        assert!(g.arena().has_self_loop(v3));
        assert!(!g.arena().has_self_loop(g.vertex_node(0).unwrap()));
        g.validate_invariants().unwrap();
    }

    #[test]
    fn subdivide_links_halves() {
        let mut g = square([1.0, 0.0, 0.0]);
        let id = g.edge_pieces(0)[0];
        let rid = g.subdivide(id).unwrap();
        assert_eq!(g.arena().node(id).right(), Some(rid));
        assert_eq!(g.arena().node(rid).left(), Some(id));
        assert_eq!(g.arena().node(rid).range(), ParamRange::new(0.5, 1.0));
        // edge (0, 1) slides up, so the lower half feeds the upper one
        assert!(g.arena().successors(id).any(|s| s == rid));
        assert_eq!(g.edge_pieces(0), vec![id, rid]);
        g.validate_invariants().unwrap();
    }

    #[test]
    fn merge_respects_locks() {
        let mut g = square([1.0, 0.0, 0.0]);
        let id = g.edge_pieces(0)[0];
        let rid = g.subdivide(id).unwrap();
        g.arena_mut().lock_right(id);
        assert!(g.merge(id, Side::Right).is_none());
        assert!(g.merge(rid, Side::Left).is_none());
        assert!(g.merge(id, Side::Left).is_none());
    }
}
