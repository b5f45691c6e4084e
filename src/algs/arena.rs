//! Index arena for flow-graph nodes and arcs.
//!
//! Nodes and arcs live in slot vectors addressed by [`NodeId`] and
//! [`ArcId`]. Removing an element leaves a tombstone whose slot is recycled by
//! the next insertion, so identifiers of live elements never move. Every arc
//! is listed exactly once in its source's outgoing list and once in its
//! target's incoming list; removing a node removes all of its arcs and
//! detaches it from its interval neighbors.

use std::fmt;

use crate::flow::ParamRange;
use crate::topology::{CellDim, CellId};

#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    pub(crate) fn from_index(index: usize) -> Self {
        NodeId(u32::try_from(index).expect("node index exceeds u32 range"))
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("NodeId").field(&self.0).finish()
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ArcId(u32);

impl ArcId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    fn from_index(index: usize) -> Self {
        ArcId(u32::try_from(index).expect("arc index exceeds u32 range"))
    }
}

/// The cell through which an arc's flow connection runs.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Carrier {
    /// Self-loop of a stationary vertex.
    Vertex(usize),
    /// Sliding flow along an edge, or the link of a spiral vertex.
    Edge(usize),
    /// Flow across a face between the boundary elements at two positions.
    Face {
        face: usize,
        from_pos: usize,
        to_pos: usize,
    },
}

impl Carrier {
    pub fn cell(&self) -> CellId {
        match *self {
            Carrier::Vertex(v) => CellId::vertex(v),
            Carrier::Edge(e) => CellId::edge(e),
            Carrier::Face { face, .. } => CellId::face(face),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Arc {
    from: NodeId,
    to: NodeId,
    carrier: Carrier,
}

impl Arc {
    #[inline]
    pub fn from(&self) -> NodeId {
        self.from
    }

    #[inline]
    pub fn to(&self) -> NodeId {
        self.to
    }

    #[inline]
    pub fn carrier(&self) -> Carrier {
        self.carrier
    }
}

/// Lock and traversal marks of a node.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct NodeStatus {
    /// Merging across the left end is forbidden.
    pub lock_left: bool,
    /// Merging across the right end is forbidden.
    pub lock_right: bool,
    /// Reached by the current traversal.
    pub visited: bool,
    /// Already handled by the current traversal pass.
    pub settled: bool,
}

#[derive(Clone, Debug)]
pub struct Node {
    owner: CellId,
    range: ParamRange,
    left: Option<NodeId>,
    right: Option<NodeId>,
    pub(crate) morse_set: Option<usize>,
    pub(crate) status: NodeStatus,
    incoming: Vec<ArcId>,
    outgoing: Vec<ArcId>,
}

impl Node {
    pub(crate) fn vertex(vertex: usize) -> Self {
        Self::piece(CellId::vertex(vertex), ParamRange::FULL, None, None)
    }

    pub(crate) fn piece(
        owner: CellId,
        range: ParamRange,
        left: Option<NodeId>,
        right: Option<NodeId>,
    ) -> Self {
        Node {
            owner,
            range,
            left,
            right,
            morse_set: None,
            status: NodeStatus::default(),
            incoming: Vec::new(),
            outgoing: Vec::new(),
        }
    }

    /// The vertex or edge this node represents (a part of).
    #[inline]
    pub fn owner(&self) -> CellId {
        self.owner
    }

    #[inline]
    pub fn range(&self) -> ParamRange {
        self.range
    }

    #[inline]
    pub fn span(&self) -> f64 {
        self.range.span()
    }

    #[inline]
    pub fn is_edge_piece(&self) -> bool {
        self.owner.dim() == CellDim::Edge
    }

    #[inline]
    pub fn is_vertex(&self) -> bool {
        self.owner.dim() == CellDim::Vertex
    }

    /// Neighboring piece of the same edge towards parameter 0.
    #[inline]
    pub fn left(&self) -> Option<NodeId> {
        self.left
    }

    /// Neighboring piece of the same edge towards parameter 1.
    #[inline]
    pub fn right(&self) -> Option<NodeId> {
        self.right
    }

    /// Morse set this node belongs to, if any.
    #[inline]
    pub fn morse_set(&self) -> Option<usize> {
        self.morse_set
    }

    #[inline]
    pub fn status(&self) -> NodeStatus {
        self.status
    }

    pub fn incoming(&self) -> &[ArcId] {
        &self.incoming
    }

    pub fn outgoing(&self) -> &[ArcId] {
        &self.outgoing
    }
}

/// An endpoint seen from a node: the other node and the carrier.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub(crate) struct ArcEnd {
    pub other: NodeId,
    pub carrier: Carrier,
}

#[derive(Clone, Debug, Default)]
pub struct GraphArena {
    nodes: Vec<Option<Node>>,
    free_nodes: Vec<NodeId>,
    arcs: Vec<Option<Arc>>,
    free_arcs: Vec<ArcId>,
    live_nodes: usize,
    live_arcs: usize,
}

impl GraphArena {
    /// Live node.
    ///
    /// # Panics
    ///
    /// Panics on a removed or unknown id.
    pub fn node(&self, id: NodeId) -> &Node {
        self.get(id).expect("stale node id")
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index()).and_then(Option::as_ref)
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node {
        self.nodes[id.index()].as_mut().expect("stale node id")
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    pub fn arc(&self, id: ArcId) -> &Arc {
        self.arcs[id.index()].as_ref().expect("stale arc id")
    }

    pub fn node_count(&self) -> usize {
        self.live_nodes
    }

    pub fn arc_count(&self) -> usize {
        self.live_arcs
    }

    /// Upper bound of node indices, live or not.
    pub fn slot_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| n.is_some())
            .map(|(i, _)| NodeId::from_index(i))
    }

    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &Node)> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter_map(|(i, n)| n.as_ref().map(|n| (NodeId::from_index(i), n)))
    }

    pub fn arcs(&self) -> impl Iterator<Item = &Arc> + '_ {
        self.arcs.iter().filter_map(Option::as_ref)
    }

    pub fn out_arcs(&self, id: NodeId) -> impl Iterator<Item = &Arc> + '_ {
        self.node(id).outgoing.iter().map(|&a| self.arc(a))
    }

    pub fn in_arcs(&self, id: NodeId) -> impl Iterator<Item = &Arc> + '_ {
        self.node(id).incoming.iter().map(|&a| self.arc(a))
    }

    pub fn successors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.out_arcs(id).map(Arc::to)
    }

    pub fn predecessors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.in_arcs(id).map(Arc::from)
    }

    pub fn has_self_loop(&self, id: NodeId) -> bool {
        self.successors(id).any(|s| s == id)
    }

    pub(crate) fn insert_node(&mut self, node: Node) -> NodeId {
        self.live_nodes += 1;
        match self.free_nodes.pop() {
            Some(id) => {
                self.nodes[id.index()] = Some(node);
                id
            }
            None => {
                self.nodes.push(Some(node));
                NodeId::from_index(self.nodes.len() - 1)
            }
        }
    }

    /// Put `node` into the vacated slot `id`, which must have been taken with
    /// [`take_node`](Self::take_node) and not released.
    pub(crate) fn place_node(&mut self, id: NodeId, node: Node) {
        let slot = &mut self.nodes[id.index()];
        assert!(slot.is_none(), "slot {id:?} is occupied");
        *slot = Some(node);
        self.live_nodes += 1;
    }

    pub(crate) fn add_arc(&mut self, from: NodeId, to: NodeId, carrier: Carrier) -> ArcId {
        let arc = Arc { from, to, carrier };
        let id = match self.free_arcs.pop() {
            Some(id) => {
                self.arcs[id.index()] = Some(arc);
                id
            }
            None => {
                self.arcs.push(Some(arc));
                ArcId::from_index(self.arcs.len() - 1)
            }
        };
        self.live_arcs += 1;
        self.node_mut(from).outgoing.push(id);
        self.node_mut(to).incoming.push(id);
        id
    }

    pub(crate) fn remove_arc(&mut self, id: ArcId) {
        let arc = self.arcs[id.index()].take().expect("stale arc id");
        self.free_arcs.push(id);
        self.live_arcs -= 1;
        if let Some(Some(n)) = self.nodes.get_mut(arc.from.index()) {
            detach(&mut n.outgoing, id);
        }
        if let Some(Some(n)) = self.nodes.get_mut(arc.to.index()) {
            detach(&mut n.incoming, id);
        }
    }

    /// Incoming and outgoing arcs of `id` as (other end, carrier) pairs.
    pub(crate) fn arc_ends(&self, id: NodeId) -> (Vec<ArcEnd>, Vec<ArcEnd>) {
        let incoming = self
            .in_arcs(id)
            .map(|a| ArcEnd {
                other: a.from,
                carrier: a.carrier,
            })
            .collect();
        let outgoing = self
            .out_arcs(id)
            .map(|a| ArcEnd {
                other: a.to,
                carrier: a.carrier,
            })
            .collect();
        (incoming, outgoing)
    }

    /// Vacate slot `id`: remove the node's arcs, detach it from its interval
    /// neighbors and return it. The slot is not recycled until
    /// [`release`](Self::release).
    pub(crate) fn take_node(&mut self, id: NodeId) -> Node {
        let arcs: Vec<ArcId> = {
            let n = self.node(id);
            n.incoming.iter().chain(n.outgoing.iter()).copied().collect()
        };
        for a in arcs {
            if self.arcs[a.index()].is_some() {
                self.remove_arc(a);
            }
        }
        let node = self.nodes[id.index()].take().expect("stale node id");
        self.live_nodes -= 1;
        if let Some(l) = node.left {
            self.node_mut(l).right = None;
        }
        if let Some(r) = node.right {
            self.node_mut(r).left = None;
        }
        node
    }

    pub(crate) fn release(&mut self, id: NodeId) {
        debug_assert!(self.nodes[id.index()].is_none());
        self.free_nodes.push(id);
    }

    pub(crate) fn remove_node(&mut self, id: NodeId) -> Node {
        let node = self.take_node(id);
        self.release(id);
        node
    }

    /// Point the neighbors of `id` back at it.
    pub(crate) fn relink(&mut self, id: NodeId) {
        let (left, right) = {
            let n = self.node(id);
            (n.left, n.right)
        };
        if let Some(l) = left {
            self.node_mut(l).right = Some(id);
        }
        if let Some(r) = right {
            self.node_mut(r).left = Some(id);
        }
    }

    pub(crate) fn set_right(&mut self, id: NodeId, right: Option<NodeId>) {
        self.node_mut(id).right = right;
    }

    /// Forbid merging across the left end of `id`, on both sides of the cut.
    pub(crate) fn lock_left(&mut self, id: NodeId) {
        let left = {
            let n = self.node_mut(id);
            n.status.lock_left = true;
            n.left
        };
        if let Some(l) = left {
            self.node_mut(l).status.lock_right = true;
        }
    }

    /// Forbid merging across the right end of `id`, on both sides of the cut.
    pub(crate) fn lock_right(&mut self, id: NodeId) {
        let right = {
            let n = self.node_mut(id);
            n.status.lock_right = true;
            n.right
        };
        if let Some(r) = right {
            self.node_mut(r).status.lock_left = true;
        }
    }

    pub(crate) fn clear_marks(&mut self) {
        for n in self.nodes.iter_mut().flatten() {
            n.status.visited = false;
            n.status.settled = false;
        }
    }
}

fn detach(list: &mut Vec<ArcId>, id: ArcId) {
    if let Some(pos) = list.iter().position(|&a| a == id) {
        list.swap_remove(pos);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn removing_a_node_drops_its_arcs() {
        let mut arena = GraphArena::default();
        let a = arena.insert_node(Node::vertex(0));
        let b = arena.insert_node(Node::vertex(1));
        arena.add_arc(a, b, Carrier::Edge(0));
        arena.add_arc(b, b, Carrier::Vertex(1));
        assert_eq!(arena.arc_count(), 2);
        assert!(arena.has_self_loop(b));

        arena.remove_node(b);
        assert_eq!(arena.arc_count(), 0);
        assert!(arena.node(a).outgoing().is_empty());
        // the slot is recycled
        let c = arena.insert_node(Node::vertex(2));
        assert_eq!(c, b);
        assert_eq!(arena.node_count(), 2);
    }

    #[test]
    fn locks_are_symmetric() {
        let mut arena = GraphArena::default();
        let l = arena.insert_node(Node::piece(
            CellId::edge(0),
            ParamRange::new(0.0, 0.5),
            None,
            None,
        ));
        let r = arena.insert_node(Node::piece(
            CellId::edge(0),
            ParamRange::new(0.5, 1.0),
            Some(l),
            None,
        ));
        arena.relink(r);
        arena.lock_right(l);
        assert!(arena.node(r).status().lock_left);
        arena.take_node(l);
        assert_eq!(arena.node(r).left(), None);
    }
}
