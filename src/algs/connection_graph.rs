//! Morse connection graph.
//!
//! One node per Morse set and a directed edge wherever flow from one Morse set
//! reaches another. Edges implied by a two-step path are dropped. An edge is
//! *certain* when both ends are non-trivial and the edge ends in a node
//! without outgoing edges or starts in a node without incoming ones; any other
//! edge may be an artifact of insufficient refinement.

use serde::{Deserialize, Serialize};

use super::morse_type::MorseSetType;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Connection {
    pub from: usize,
    pub to: usize,
    pub certain: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConnectionGraph {
    types: Vec<MorseSetType>,
    incoming: Vec<Vec<usize>>,
    outgoing: Vec<Vec<usize>>,
}

impl ConnectionGraph {
    /// Edgeless graph over Morse sets of the given types.
    pub fn new(types: Vec<MorseSetType>) -> Self {
        let n = types.len();
        ConnectionGraph {
            types,
            incoming: vec![Vec::new(); n],
            outgoing: vec![Vec::new(); n],
        }
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn morse_type(&self, set: usize) -> &MorseSetType {
        &self.types[set]
    }

    pub fn successors(&self, set: usize) -> &[usize] {
        &self.outgoing[set]
    }

    pub fn predecessors(&self, set: usize) -> &[usize] {
        &self.incoming[set]
    }

    pub fn has_edge(&self, from: usize, to: usize) -> bool {
        self.outgoing[from].contains(&to)
    }

    pub fn edge_count(&self) -> usize {
        self.outgoing.iter().map(Vec::len).sum()
    }

    /// Add `from -> to` unless it exists or is a loop.
    pub fn add_edge(&mut self, from: usize, to: usize) {
        if from == to || self.has_edge(from, to) {
            return;
        }
        self.outgoing[from].push(to);
        self.incoming[to].push(from);
    }

    pub fn remove_edge(&mut self, from: usize, to: usize) {
        self.outgoing[from].retain(|&t| t != to);
        self.incoming[to].retain(|&f| f != from);
    }

    /// Drop every `i -> k` for which some `i -> j -> k` exists. All two-step
    /// paths are collected before anything is removed.
    pub fn remove_redundant_edges(&mut self) {
        let mut implied = Vec::new();
        for (i, succ) in self.outgoing.iter().enumerate() {
            for &j in succ {
                implied.extend(self.outgoing[j].iter().map(|&k| (i, k)));
            }
        }
        for (i, k) in implied {
            self.remove_edge(i, k);
        }
    }

    /// Whether the edge `from -> to` reflects a connection that further
    /// refinement cannot remove.
    pub fn is_certain(&self, from: usize, to: usize) -> bool {
        self.types[from].is_nontrivial()
            && self.types[to].is_nontrivial()
            && (self.outgoing[to].is_empty() || self.incoming[from].is_empty())
    }

    /// Every edge, grouped by source.
    pub fn connections(&self) -> Vec<Connection> {
        self.outgoing
            .iter()
            .enumerate()
            .flat_map(|(from, succ)| {
                succ.iter().map(move |&to| Connection {
                    from,
                    to,
                    certain: self.is_certain(from, to),
                })
            })
            .collect()
    }

    /// Morse sets with at least one edge.
    pub fn active_nodes(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.len()).filter(|&i| !self.incoming[i].is_empty() || !self.outgoing[i].is_empty())
    }
}
