//! Reachability through a cone of admissible directions.
//!
//! When a face admits a whole set of vectors, flow from a point can reach
//! anything inside the cone spanned by the two extreme admissible directions.
//! The cone is stored as two separating directions, each perpendicular to one
//! extreme vector and pointing away from the other one; a displacement lies in
//! the cone when it makes a non-positive dot product with both.

use crate::geometry::vec3::{self, Vec3};
use crate::geometry::SurfaceMesh;
use crate::topology::is_corner_position;

use super::ParamRange;

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SeparatingPair {
    first: Vec3,
    second: Vec3,
}

impl SeparatingPair {
    /// Separators of the cone spanned by `v` and `w` in the plane of unit
    /// normal `n`.
    pub fn from_extremes(v: Vec3, w: Vec3, n: Vec3) -> Self {
        let mut first = vec3::cross(v, n);
        let mut second = vec3::cross(w, n);
        if vec3::dot(first, w) > 0.0 {
            first = vec3::neg(first);
        }
        if vec3::dot(second, v) > 0.0 {
            second = vec3::neg(second);
        }
        SeparatingPair { first, second }
    }

    pub fn first(&self) -> Vec3 {
        self.first
    }

    pub fn second(&self) -> Vec3 {
        self.second
    }

    /// Whether `d` lies inside the cone.
    pub fn contains(&self, d: Vec3) -> bool {
        vec3::dot(d, self.first) <= 0.0 && vec3::dot(d, self.second) <= 0.0
    }

    /// Whether some displacement of the set may lie inside the cone: false
    /// only when all of them sit on the outer side of one separator.
    fn may_reach(&self, displacements: &[Vec3]) -> bool {
        let outside = |t: Vec3| displacements.iter().all(|&d| vec3::dot(d, t) >= 0.0);
        !(outside(self.first) || outside(self.second))
    }
}

/// Points of a boundary element: one corner, or the two ends of an edge range.
fn element_points(surface: &SurfaceMesh, face: usize, pos: usize, range: ParamRange) -> Vec<Vec3> {
    if is_corner_position(pos) {
        vec![surface.corner_position(face, pos)]
    } else {
        let edge = surface.complex().face(face).faces()[pos].index();
        vec![surface.edge_point(edge, range.start), surface.edge_point(edge, range.end)]
    }
}

/// The `connects` test of the robust models.
pub(crate) fn cone_connects(
    surface: &SurfaceMesh,
    pair: &SeparatingPair,
    face: usize,
    from_pos: usize,
    to_pos: usize,
    from_range: ParamRange,
    to_range: ParamRange,
) -> bool {
    let sources = element_points(surface, face, from_pos, from_range);
    let targets = element_points(surface, face, to_pos, to_range);
    let displacements: Vec<Vec3> = targets
        .iter()
        .flat_map(|&t| sources.iter().map(move |&s| vec3::sub(t, s)))
        .collect();
    match (is_corner_position(from_pos), is_corner_position(to_pos)) {
        (true, true) => pair.contains(displacements[0]),
        (true, false) | (false, true) | (false, false) => pair.may_reach(&displacements),
    }
}
