//! Support-hull classifier and its per-vertex envelope variant.
//!
//! Each face admits the convex hull of a set of reference vectors blended
//! towards its own vector: `F = f + w (F0 - f)` for every reference `F0`,
//! projected onto the face. The references are the vectors of the
//! edge-adjacent faces plus the face's own vector, or, for the envelope
//! variant, the field samples at the face's corners. A side attracts
//! (repels) when some hull vertex leaves (enters) across it, a face whose
//! hull contains zero is stationary, and reachability uses the cone spanned
//! by the two extreme hull vectors.

use super::cone::{SeparatingPair, cone_connects};
use super::exact::{ClassifierOptions, PiecewiseConstant};
use super::field::{self, FieldSamples};
use super::{BoundaryMode, EdgeFlow, FlowClassifier, FlowFlags, ParamRange};
use crate::geometry::vec3::{self, Vec3};
use crate::geometry::SurfaceMesh;
use crate::mesh_error::MeshMorseError;

#[derive(Clone, Debug)]
pub struct SupportHull {
    exact: PiecewiseConstant,
    weight: f64,
    hulls: Vec<Vec<Vec3>>,
    flags: FlowFlags,
    stationary_faces: Vec<bool>,
    separators: Vec<Option<SeparatingPair>>,
}

impl SupportHull {
    /// Hulls of the edge-adjacent face vectors.
    pub fn new(
        surface: SurfaceMesh,
        samples: FieldSamples,
        weight: f64,
        options: ClassifierOptions,
    ) -> Result<Self, MeshMorseError> {
        check_weight(weight)?;
        let exact = PiecewiseConstant::new(surface, samples, options)?;
        let references = neighbor_references(&exact);
        Ok(Self::from_references(exact, weight, references))
    }

    /// Hulls of the per-vertex samples at each face's corners.
    pub fn envelope(
        surface: SurfaceMesh,
        samples: FieldSamples,
        weight: f64,
        options: ClassifierOptions,
    ) -> Result<Self, MeshMorseError> {
        check_weight(weight)?;
        if !matches!(samples, FieldSamples::PerVertex(_)) {
            return Err(MeshMorseError::EnvelopeRequiresVertexField);
        }
        let exact = PiecewiseConstant::new(surface, samples, options)?;
        let references = match exact.vertex_vectors() {
            Some(v) => field::corner_vectors(exact.surface(), v),
            None => return Err(MeshMorseError::EnvelopeRequiresVertexField),
        };
        Ok(Self::from_references(exact, weight, references))
    }

    fn from_references(exact: PiecewiseConstant, weight: f64, references: Vec<Vec<Vec3>>) -> Self {
        let surface = exact.surface();
        let vectors = exact.vectors();
        let hulls: Vec<Vec<Vec3>> = references
            .iter()
            .enumerate()
            .map(|(face, refs)| {
                let f = vectors[face];
                let n = surface.normal(face);
                refs.iter()
                    .map(|&r| {
                        let blended = vec3::add(f, vec3::scale(vec3::sub(r, f), weight));
                        vec3::project_onto_plane(blended, n)
                    })
                    .collect()
            })
            .collect();
        let stationary_faces: Vec<bool> = hulls
            .iter()
            .enumerate()
            .map(|(face, h)| zero_in_hull(surface.normal(face), h))
            .collect();

        let mut flags = exact.flags().clone();
        for (face, hull) in hulls.iter().enumerate() {
            let stat = stationary_faces[face];
            let len = flags.attracts[face].len();
            for pos in (0..len).step_by(2) {
                let ei = surface.inward_conormal(face, pos);
                flags.attracts[face][pos] |= stat || any_dot(ei, hull, |d| d <= 0.0);
                flags.repels[face][pos] |= stat || any_dot(ei, hull, |d| d >= 0.0);
            }
            flags.derive_corners(face);
        }

        let boundary = exact.options().boundary;
        for edge in 0..exact.complex().num_edges() {
            let widened = hull_edge_flow(surface, &hulls, &stationary_faces, edge, boundary);
            flags.edge_flow[edge] = flags.edge_flow[edge].union(widened);
        }

        let separators = hulls
            .iter()
            .enumerate()
            .map(|(face, hull)| {
                if stationary_faces[face] {
                    return None;
                }
                let n = surface.normal(face);
                let (v, w) = extreme_pair(n, hull);
                Some(SeparatingPair::from_extremes(v, w, n))
            })
            .collect();

        SupportHull {
            exact,
            weight,
            hulls,
            flags,
            stationary_faces,
            separators,
        }
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    /// Admissible hull vertices of a face.
    pub fn hull(&self, face: usize) -> &[Vec3] {
        &self.hulls[face]
    }

    pub fn exact(&self) -> &PiecewiseConstant {
        &self.exact
    }
}

impl FlowClassifier for SupportHull {
    fn surface(&self) -> &SurfaceMesh {
        self.exact.surface()
    }

    fn flags(&self) -> &FlowFlags {
        &self.flags
    }

    fn face_vector(&self, face: usize) -> Vec3 {
        self.exact.face_vector(face)
    }

    fn is_face_stationary(&self, face: usize) -> bool {
        self.stationary_faces[face]
    }

    fn connects(
        &self,
        face: usize,
        from_pos: usize,
        to_pos: usize,
        from_range: ParamRange,
        to_range: ParamRange,
    ) -> bool {
        match &self.separators[face] {
            None => false,
            Some(pair) => cone_connects(
                self.surface(),
                pair,
                face,
                from_pos,
                to_pos,
                from_range,
                to_range,
            ),
        }
    }
}

fn check_weight(weight: f64) -> Result<(), MeshMorseError> {
    if (0.0..=1.0).contains(&weight) {
        Ok(())
    } else {
        Err(MeshMorseError::InvalidParameter {
            name: "weight",
            reason: format!("expected a value in [0, 1], got {weight}"),
        })
    }
}

/// Neighbor vectors across interior sides, projected onto the face, then the
/// face's own vector.
fn neighbor_references(exact: &PiecewiseConstant) -> Vec<Vec<Vec3>> {
    let surface = exact.surface();
    let complex = surface.complex();
    let vectors = exact.vectors();
    (0..complex.num_faces())
        .map(|face| {
            let n = surface.normal(face);
            let mut refs: Vec<Vec3> = complex
                .face(face)
                .faces()
                .iter()
                .step_by(2)
                .filter_map(|e| match *complex.edge(e.index()).cofaces() {
                    [a, b] => {
                        let other = if a.index() == face { b } else { a };
                        Some(vec3::project_onto_plane(vectors[other.index()], n))
                    }
                    _ => None,
                })
                .collect();
            refs.push(vectors[face]);
            refs
        })
        .collect()
}

fn any_dot(v: Vec3, set: &[Vec3], pred: impl Fn(f64) -> bool) -> bool {
    set.iter().any(|&s| pred(vec3::dot(v, s)))
}

/// Whether the origin lies in the triangle `a, b, c` of the plane with
/// normal `n` (boundary included).
fn zero_in_triangle(n: Vec3, a: Vec3, b: Vec3, c: Vec3) -> bool {
    let side = |p: Vec3, q: Vec3| vec3::dot(vec3::neg(p), vec3::cross(vec3::sub(q, p), n));
    let (ab, bc, ca) = (side(a, b), side(b, c), side(c, a));
    (ab >= 0.0 && bc >= 0.0 && ca >= 0.0) || (ab <= 0.0 && bc <= 0.0 && ca <= 0.0)
}

/// Whether zero lies in the convex hull of `set`, tested over every triple.
fn zero_in_hull(n: Vec3, set: &[Vec3]) -> bool {
    let len = set.len();
    (0..len).any(|i| {
        (i + 1..len).any(|j| (j + 1..len).any(|k| zero_in_triangle(n, set[i], set[j], set[k])))
    })
}

/// The two hull vectors bounding the angular spread: the one with the most
/// others on its left and the one with the fewest.
fn extreme_pair(n: Vec3, set: &[Vec3]) -> (Vec3, Vec3) {
    let counts: Vec<usize> = set
        .iter()
        .enumerate()
        .map(|(i, &s)| {
            let left = vec3::cross(n, s);
            set.iter()
                .enumerate()
                .filter(|&(j, &t)| j != i && vec3::dot(left, t) >= 0.0)
                .count()
        })
        .collect();
    let (mut max, mut min) = (0, 0);
    for i in 1..counts.len() {
        if counts[i] > counts[max] {
            max = i;
        }
        if counts[i] < counts[min] {
            min = i;
        }
    }
    (set[max], set[min])
}

fn hull_edge_flow(
    surface: &SurfaceMesh,
    hulls: &[Vec<Vec3>],
    stationary_faces: &[bool],
    edge: usize,
    boundary: BoundaryMode,
) -> EdgeFlow {
    let complex = surface.complex();
    let ev = surface.edge_vector(edge);
    match *complex.edge(edge).cofaces() {
        [c0] => {
            if boundary == BoundaryMode::Open {
                return EdgeFlow::NONE;
            }
            let face = c0.index();
            let stat = stationary_faces[face];
            EdgeFlow {
                up: stat || any_dot(ev, &hulls[face], |d| d >= 0.0),
                down: stat || any_dot(ev, &hulls[face], |d| d <= 0.0),
            }
        }
        [c0, c1] => {
            let (f0, f1) = (c0.index(), c1.index());
            if stationary_faces[f0] || stationary_faces[f1] {
                return EdgeFlow::BOTH;
            }
            match vec3::normalize(vec3::add(surface.normal(f0), surface.normal(f1))) {
                Some(an) => sliding_directions(ev, an, &hulls[f0], &hulls[f1]),
                None => EdgeFlow::BOTH,
            }
        }
        _ => unreachable!("edge {edge} has more than two cofaces"),
    }
}

/// Sliding directions from every pair of hull vectors on opposite sides of
/// the edge: the segment joining them meets the edge line, in the averaged
/// plane with normal `an`, where flow slides.
fn sliding_directions(ev: Vec3, an: Vec3, s0: &[Vec3], s1: &[Vec3]) -> EdgeFlow {
    let across = vec3::cross(ev, an);
    let coords = |s: &[Vec3]| -> Vec<(f64, f64)> {
        s.iter()
            .map(|&v| {
                let p = vec3::project_onto_plane(v, an);
                (vec3::dot(ev, p), vec3::dot(across, p))
            })
            .collect()
    };
    let (p0, p1) = (coords(s0), coords(s1));
    let mut flow = EdgeFlow::NONE;
    for &(x0, y0) in &p0 {
        for &(x1, y1) in &p1 {
            if y0 * y1 <= 0.0 {
                let xis = y1.abs() * x0 + y0.abs() * x1;
                flow.up |= xis >= 0.0;
                flow.down |= xis <= 0.0;
            }
        }
    }
    flow
}

#[cfg(test)]
mod tests {
    use super::*;

    const N: Vec3 = [0.0, 0.0, 1.0];

    #[test]
    fn hull_around_origin_is_stationary() {
        let set = [[1.0, 0.0, 0.0], [-1.0, 1.0, 0.0], [-1.0, -1.0, 0.0]];
        assert!(zero_in_hull(N, &set));
        let shifted = [[1.0, 0.0, 0.0], [2.0, 1.0, 0.0], [2.0, -1.0, 0.0]];
        assert!(!zero_in_hull(N, &shifted));
    }

    #[test]
    fn extremes_bound_the_fan() {
        let set = [[1.0, 0.0, 0.0], [1.0, 1.0, 0.0], [1.0, -1.0, 0.0]];
        let (v, w) = extreme_pair(N, &set);
        assert_eq!(v, [1.0, -1.0, 0.0]);
        assert_eq!(w, [1.0, 1.0, 0.0]);
    }

    #[test]
    fn opposite_pushes_slide_along_their_mean() {
        let ev = [1.0, 0.0, 0.0];
        let flow = sliding_directions(ev, N, &[[1.0, 1.0, 0.0]], &[[1.0, -1.0, 0.0]]);
        assert_eq!(flow, EdgeFlow::UP);
    }
}
