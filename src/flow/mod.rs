//! Flow classification of piecewise-constant vector fields.
//!
//! A classifier answers, for every face, which boundary elements the flow
//! leaves through (`attracts`) and enters through (`repels`); for every edge,
//! whether flow slides along it towards its higher (`flow_up`) or lower
//! (`flow_down`) vertex; for every vertex, its discrete Poincaré index and
//! whether it must be treated as a fixed point. The `connects` predicate
//! decides whether flow inside a face can carry a sub-range of one boundary
//! element onto a sub-range of another.
//!
//! Four strategies implement [`FlowClassifier`]:
//! - [`PiecewiseConstant`], one exact vector per face;
//! - [`StabilityRadius`], every vector within a radius of the nominal one;
//! - [`SupportHull`], the convex hull of neighboring face vectors;
//! - [`SupportHull::envelope`], the convex hull of a face's vertex vectors.

pub mod cone;
pub mod exact;
pub mod field;
pub mod hull;
pub mod sectors;
pub mod stable;

pub use exact::{ClassifierOptions, PiecewiseConstant};
pub use field::{FieldSampling, FieldSamples};
pub use hull::SupportHull;
pub use stable::StabilityRadius;

use serde::{Deserialize, Serialize};

use crate::geometry::{SurfaceMesh, Vec3};
use crate::topology::CellComplex;

/// How flow behaves at the mesh boundary.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BoundaryMode {
    /// Flow cannot cross the boundary; it slides along boundary edges.
    #[default]
    Closed,
    /// Flow may leave or enter the domain across boundary edges.
    Open,
}

/// Sliding directions along an edge.
///
/// `up` runs from the lower to the higher vertex index, `down` the other way.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct EdgeFlow {
    pub up: bool,
    pub down: bool,
}

impl EdgeFlow {
    pub const NONE: EdgeFlow = EdgeFlow {
        up: false,
        down: false,
    };
    pub const UP: EdgeFlow = EdgeFlow {
        up: true,
        down: false,
    };
    pub const DOWN: EdgeFlow = EdgeFlow {
        up: false,
        down: true,
    };
    pub const BOTH: EdgeFlow = EdgeFlow {
        up: true,
        down: true,
    };

    #[inline]
    pub fn union(self, other: EdgeFlow) -> EdgeFlow {
        EdgeFlow {
            up: self.up || other.up,
            down: self.down || other.down,
        }
    }

    #[inline]
    pub fn is_none(self) -> bool {
        !self.up && !self.down
    }
}

/// Index and fixed-point status of a vertex.
///
/// `index2` differs from `index` only at boundary vertices of a closed
/// system, where the two values correspond to boundary flow converging into
/// or diverging out of the domain.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct VertexClass {
    pub index: i32,
    pub index2: i32,
    pub stationary: bool,
    pub spiral: bool,
}

/// Parameter sub-interval of an edge, in the edge's lower-to-higher direction.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParamRange {
    pub start: f64,
    pub end: f64,
}

impl ParamRange {
    /// The whole edge.
    pub const FULL: ParamRange = ParamRange {
        start: 0.0,
        end: 1.0,
    };

    pub fn new(start: f64, end: f64) -> Self {
        ParamRange { start, end }
    }

    #[inline]
    pub fn span(&self) -> f64 {
        self.end - self.start
    }

    /// Halves at the midpoint.
    pub fn bisect(&self) -> (ParamRange, ParamRange) {
        let mid = self.start + 0.5 * (self.end - self.start);
        (
            ParamRange::new(self.start, mid),
            ParamRange::new(mid, self.end),
        )
    }

    /// Whether the two ranges share an endpoint.
    pub fn touches(&self, other: &ParamRange) -> bool {
        self.end == other.start || self.start == other.end
    }
}

/// Attract/repel flags, edge flows and vertex classes of one field model.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FlowFlags {
    pub(crate) attracts: Vec<Vec<bool>>,
    pub(crate) repels: Vec<Vec<bool>>,
    pub(crate) edge_flow: Vec<EdgeFlow>,
    pub(crate) vertices: Vec<VertexClass>,
}

impl FlowFlags {
    #[inline]
    pub fn attracts(&self, face: usize, pos: usize) -> bool {
        self.attracts[face][pos]
    }

    #[inline]
    pub fn repels(&self, face: usize, pos: usize) -> bool {
        self.repels[face][pos]
    }

    #[inline]
    pub fn edge_flow(&self, edge: usize) -> EdgeFlow {
        self.edge_flow[edge]
    }

    #[inline]
    pub fn vertex(&self, vertex: usize) -> VertexClass {
        self.vertices[vertex]
    }

    /// Recompute corner positions of `face`: a corner attracts (repels) when
    /// both sides meeting there do.
    pub(crate) fn derive_corners(&mut self, face: usize) {
        derive_corner_flags(&mut self.attracts[face]);
        derive_corner_flags(&mut self.repels[face]);
    }
}

pub(crate) fn derive_corner_flags(flags: &mut [bool]) {
    let len = flags.len();
    for j in (1..len).step_by(2) {
        flags[j] = flags[j - 1] && flags[(j + 1) % len];
    }
}

/// Contract shared by every field model.
///
/// Positions index the boundary list of a face: even positions are edges,
/// odd positions are corners.
pub trait FlowClassifier {
    fn surface(&self) -> &SurfaceMesh;

    fn flags(&self) -> &FlowFlags;

    /// Nominal tangential vector of a face.
    fn face_vector(&self, face: usize) -> Vec3;

    /// Whether the admissible vectors of a face include zero.
    fn is_face_stationary(&self, face: usize) -> bool {
        let _ = face;
        false
    }

    /// Can flow inside `face` carry `from_range` of the element at `from_pos`
    /// onto `to_range` of the element at `to_pos`? Ranges of corners are ignored.
    fn connects(
        &self,
        face: usize,
        from_pos: usize,
        to_pos: usize,
        from_range: ParamRange,
        to_range: ParamRange,
    ) -> bool;

    fn complex(&self) -> &CellComplex {
        self.surface().complex()
    }

    fn attracts(&self, face: usize, pos: usize) -> bool {
        self.flags().attracts(face, pos)
    }

    fn repels(&self, face: usize, pos: usize) -> bool {
        self.flags().repels(face, pos)
    }

    fn edge_flow(&self, edge: usize) -> EdgeFlow {
        self.flags().edge_flow(edge)
    }

    fn flow_up(&self, edge: usize) -> bool {
        self.edge_flow(edge).up
    }

    fn flow_down(&self, edge: usize) -> bool {
        self.edge_flow(edge).down
    }

    fn vertex_class(&self, vertex: usize) -> VertexClass {
        self.flags().vertex(vertex)
    }

    fn index(&self, vertex: usize) -> i32 {
        self.vertex_class(vertex).index
    }

    fn index2(&self, vertex: usize) -> i32 {
        self.vertex_class(vertex).index2
    }

    fn is_stationary(&self, vertex: usize) -> bool {
        self.vertex_class(vertex).stationary
    }

    fn is_spiral(&self, vertex: usize) -> bool {
        self.vertex_class(vertex).spiral
    }
}

impl<T: FlowClassifier + ?Sized> FlowClassifier for Box<T> {
    fn surface(&self) -> &SurfaceMesh {
        (**self).surface()
    }

    fn flags(&self) -> &FlowFlags {
        (**self).flags()
    }

    fn face_vector(&self, face: usize) -> Vec3 {
        (**self).face_vector(face)
    }

    fn is_face_stationary(&self, face: usize) -> bool {
        (**self).is_face_stationary(face)
    }

    fn connects(
        &self,
        face: usize,
        from_pos: usize,
        to_pos: usize,
        from_range: ParamRange,
        to_range: ParamRange,
    ) -> bool {
        (**self).connects(face, from_pos, to_pos, from_range, to_range)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corners_need_both_sides() {
        let mut flags = vec![true, false, true, false, false, false];
        derive_corner_flags(&mut flags);
        assert_eq!(flags, vec![true, true, true, false, false, false]);
    }

    #[test]
    fn bisect_is_exact() {
        let (l, r) = ParamRange::FULL.bisect();
        assert_eq!(l, ParamRange::new(0.0, 0.5));
        assert_eq!(r, ParamRange::new(0.5, 1.0));
        assert!(l.touches(&r));
        assert!(r.touches(&l));
        assert_eq!(EdgeFlow::UP.union(EdgeFlow::DOWN), EdgeFlow::BOTH);
    }
}
