//! Morse set typing and statistics.
//!
//! A Morse set is typed by its node count, the summed indices of the vertices
//! it contains, whether it touches the mesh boundary and its stability: arcs
//! entering it from outside make it attracting, arcs leaving it make it
//! repelling, both make it a saddle.

use std::collections::BTreeMap;
use std::fmt;
use std::ops::{BitOr, BitOrAssign};

use serde::{Deserialize, Serialize};

use super::flow_graph::FlowGraph;
use crate::flow::FlowClassifier;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stability {
    /// No arc crosses the set boundary.
    #[default]
    Unknown,
    /// Flow only enters.
    Attracting,
    /// Flow only leaves.
    Repelling,
    /// Flow enters and leaves.
    Saddle,
}

impl Stability {
    /// Numeric code used by the binary record format.
    pub fn code(self) -> u8 {
        match self {
            Stability::Unknown => 0,
            Stability::Attracting => 1,
            Stability::Repelling => 2,
            Stability::Saddle => 3,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Stability::Unknown),
            1 => Some(Stability::Attracting),
            2 => Some(Stability::Repelling),
            3 => Some(Stability::Saddle),
            _ => None,
        }
    }
}

impl BitOr for Stability {
    type Output = Stability;

    fn bitor(self, rhs: Stability) -> Stability {
        match self.code() | rhs.code() {
            0 => Stability::Unknown,
            1 => Stability::Attracting,
            2 => Stability::Repelling,
            _ => Stability::Saddle,
        }
    }
}

impl BitOrAssign for Stability {
    fn bitor_assign(&mut self, rhs: Stability) {
        *self = *self | rhs;
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MorseSetType {
    /// Number of graph nodes.
    pub size: usize,
    pub index: i32,
    pub index2: i32,
    pub stability: Stability,
    /// Contains a boundary vertex.
    pub boundary: bool,
}

impl MorseSetType {
    pub fn is_trivial(&self) -> bool {
        self.stability == Stability::Saddle && self.index == 0 && self.index2 == 0
    }

    pub fn is_nontrivial(&self) -> bool {
        !self.is_trivial()
    }

    pub fn is_saddle(&self) -> bool {
        self.stability == Stability::Saddle && self.index == -1 && self.index2 == -1
    }

    pub fn is_sink(&self) -> bool {
        self.stability == Stability::Attracting && self.index == 1 && self.index2 == 1
    }

    pub fn is_source(&self) -> bool {
        self.stability == Stability::Repelling && self.index == 1 && self.index2 == 1
    }

    /// Attracting periodic orbit.
    pub fn is_apo(&self) -> bool {
        self.stability == Stability::Attracting && self.index == 0 && self.index2 == 0
    }

    /// Repelling periodic orbit.
    pub fn is_rpo(&self) -> bool {
        self.stability == Stability::Repelling && self.index == 0 && self.index2 == 0
    }

    pub fn is_attracting(&self) -> bool {
        self.stability == Stability::Attracting
    }

    pub fn is_repelling(&self) -> bool {
        self.stability == Stability::Repelling
    }

    /// Neither trivial nor purely attracting or repelling. Channels of such
    /// sets are what the connection graph and the separatrices follow.
    pub fn is_saddle_like(&self) -> bool {
        !self.is_trivial() && !self.is_attracting() && !self.is_repelling()
    }

    pub fn kind(&self) -> MorseSetKind {
        use MorseSetKind::*;
        use Stability::{Attracting as A, Repelling as R, Saddle as S};
        let key = (self.index, self.index2, self.stability);
        if self.boundary {
            match key {
                (1, 0, A) => BoundarySink,
                (0, 1, R) => BoundarySource,
                (0, -1, S) => ConvergingHalfSaddle,
                (-1, 0, S) => DivergingHalfSaddle,
                (0, 0, S) => BoundaryTrivial,
                (0, 0, R) => BoundaryRpo,
                (0, 0, A) => BoundaryApo,
                _ => BoundaryOther,
            }
        } else {
            match key {
                (0, 0, A) => Apo,
                (0, 0, R) => Rpo,
                (-1, -1, S) => Saddle,
                (1, 1, A) => Sink,
                (1, 1, R) => Source,
                (0, 0, S) => Trivial,
                _ => Other,
            }
        }
    }
}

/// Named classes of Morse sets, split by whether they touch the boundary.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MorseSetKind {
    Apo,
    Rpo,
    Saddle,
    Sink,
    Source,
    Trivial,
    Other,
    BoundarySink,
    BoundarySource,
    ConvergingHalfSaddle,
    DivergingHalfSaddle,
    BoundaryTrivial,
    BoundaryRpo,
    BoundaryApo,
    BoundaryOther,
}

impl MorseSetKind {
    pub fn is_boundary(self) -> bool {
        self >= MorseSetKind::BoundarySink
    }

    pub fn label(self) -> &'static str {
        match self {
            MorseSetKind::Apo => "attracting periodic trajectories",
            MorseSetKind::Rpo => "repelling periodic trajectories",
            MorseSetKind::Saddle => "saddles",
            MorseSetKind::Sink => "sinks",
            MorseSetKind::Source => "sources",
            MorseSetKind::Trivial => "trivial",
            MorseSetKind::Other => "other",
            MorseSetKind::BoundarySink => "simple boundary sinks",
            MorseSetKind::BoundarySource => "simple boundary sources",
            MorseSetKind::ConvergingHalfSaddle => "converging half-saddles",
            MorseSetKind::DivergingHalfSaddle => "diverging half-saddles",
            MorseSetKind::BoundaryTrivial => "trivial",
            MorseSetKind::BoundaryRpo => "repelling periodic orbits",
            MorseSetKind::BoundaryApo => "attracting periodic orbits",
            MorseSetKind::BoundaryOther => "other",
        }
    }
}

impl fmt::Display for MorseSetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Type of every Morse set of `graph`, indexed by Morse set id.
///
/// Uses the Morse set numbering of the last
/// [`FlowGraph::compute_morse_sets`].
pub fn morse_set_types<C: FlowClassifier>(graph: &FlowGraph<C>) -> Vec<MorseSetType> {
    let arena = graph.arena();
    let classifier = graph.classifier();
    let mut types = vec![MorseSetType::default(); graph.morse_set_count()];
    for (id, node) in arena.nodes() {
        let Some(s) = node.morse_set() else {
            continue;
        };
        let t = &mut types[s];
        t.size += 1;
        if node.is_vertex() {
            let v = node.owner().index();
            let class = classifier.vertex_class(v);
            t.index += class.index;
            t.index2 += class.index2;
            if graph.complex().vertex(v).is_boundary() {
                t.boundary = true;
            }
        }
        if arena
            .predecessors(id)
            .any(|p| arena.node(p).morse_set() != Some(s))
        {
            t.stability |= Stability::Attracting;
        }
        if arena
            .successors(id)
            .any(|q| arena.node(q).morse_set() != Some(s))
        {
            t.stability |= Stability::Repelling;
        }
    }
    types
}

/// Counts of Morse sets per kind and the summed indices.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MorseStatistics {
    pub counts: BTreeMap<MorseSetKind, usize>,
    pub total_index: i32,
    pub total_index2: i32,
}

impl MorseStatistics {
    pub fn from_types(types: &[MorseSetType]) -> Self {
        let mut stats = MorseStatistics::default();
        for t in types {
            *stats.counts.entry(t.kind()).or_default() += 1;
            stats.total_index += t.index;
            stats.total_index2 += t.index2;
        }
        stats
    }

    pub fn count(&self, kind: MorseSetKind) -> usize {
        self.counts.get(&kind).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    pub fn log(&self) {
        log::info!(
            "{} Morse sets, total index {} {}",
            self.total(),
            self.total_index,
            self.total_index2
        );
        for (kind, n) in self.counts.iter().filter(|(k, _)| !k.is_boundary()) {
            log::info!("  {kind}: {n}");
        }
        if self.counts.keys().any(|k| k.is_boundary()) {
            log::info!("Morse sets touching the boundary:");
            for (kind, n) in self.counts.iter().filter(|(k, _)| k.is_boundary()) {
                log::info!("    {kind}: {n}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ty(index: i32, index2: i32, stability: Stability, boundary: bool) -> MorseSetType {
        MorseSetType {
            size: 1,
            index,
            index2,
            stability,
            boundary,
        }
    }

    #[test]
    fn stability_combines_like_flags() {
        let mut s = Stability::Unknown;
        s |= Stability::Attracting;
        assert_eq!(s, Stability::Attracting);
        s |= Stability::Repelling;
        assert_eq!(s, Stability::Saddle);
        assert_eq!(Stability::from_code(s.code()), Some(s));
        assert_eq!(Stability::from_code(7), None);
    }

    #[test]
    fn interior_kinds() {
        assert_eq!(ty(1, 1, Stability::Attracting, false).kind(), MorseSetKind::Sink);
        assert_eq!(ty(1, 1, Stability::Repelling, false).kind(), MorseSetKind::Source);
        assert_eq!(ty(-1, -1, Stability::Saddle, false).kind(), MorseSetKind::Saddle);
        assert_eq!(ty(0, 0, Stability::Attracting, false).kind(), MorseSetKind::Apo);
        assert!(ty(0, 0, Stability::Saddle, false).is_trivial());
        assert_eq!(ty(2, 2, Stability::Saddle, false).kind(), MorseSetKind::Other);
    }

    #[test]
    fn boundary_kinds() {
        assert_eq!(
            ty(1, 0, Stability::Attracting, true).kind(),
            MorseSetKind::BoundarySink
        );
        assert_eq!(
            ty(0, -1, Stability::Saddle, true).kind(),
            MorseSetKind::ConvergingHalfSaddle
        );
        assert!(MorseSetKind::BoundaryApo.is_boundary());
        assert!(!MorseSetKind::Other.is_boundary());
    }

    #[test]
    fn statistics_sum_indices() {
        let types = [
            ty(1, 1, Stability::Attracting, false),
            ty(1, 1, Stability::Repelling, false),
            ty(-1, -1, Stability::Saddle, false),
        ];
        let stats = MorseStatistics::from_types(&types);
        assert_eq!(stats.total(), 3);
        assert_eq!(stats.total_index, 1);
        assert_eq!(stats.count(MorseSetKind::Sink), 1);
        assert_eq!(stats.count(MorseSetKind::Apo), 0);
    }
}
