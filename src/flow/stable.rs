//! Stability-radius classifier.
//!
//! Every vector within distance `R` of a face's nominal vector is admissible,
//! so a side attracts (repels) when some admissible vector leaves (enters)
//! across it, and a face whose nominal vector is shorter than `R` admits the
//! zero vector and becomes stationary. A decomposition computed under this
//! model stays valid for every field within `R` of the input. Vertex indices
//! are those of the nominal field.
//!
//! A radius of zero admits only the nominal vectors and reproduces the exact
//! model.

use super::cone::{SeparatingPair, cone_connects};
use super::exact::{ClassifierOptions, PiecewiseConstant};
use super::field::FieldSamples;
use super::{BoundaryMode, EdgeFlow, FlowClassifier, FlowFlags, ParamRange};
use crate::geometry::vec3::{self, Vec3};
use crate::geometry::SurfaceMesh;
use crate::mesh_error::MeshMorseError;

/// Smallest cosine used when opening the cone of admissible directions.
const MIN_COS: f64 = 1e-8;

#[derive(Clone, Debug)]
pub struct StabilityRadius {
    exact: PiecewiseConstant,
    radius: f64,
    flags: FlowFlags,
    stationary_faces: Vec<bool>,
    separators: Vec<Option<SeparatingPair>>,
}

impl StabilityRadius {
    pub fn new(
        surface: SurfaceMesh,
        samples: FieldSamples,
        radius: f64,
        options: ClassifierOptions,
    ) -> Result<Self, MeshMorseError> {
        check_radius(radius)?;
        let exact = PiecewiseConstant::new(surface, samples, options)?;
        Self::from_exact(exact, radius)
    }

    /// Widen an exact classification by `radius`.
    pub fn from_exact(exact: PiecewiseConstant, radius: f64) -> Result<Self, MeshMorseError> {
        check_radius(radius)?;
        let nfaces = exact.complex().num_faces();
        let mut flags = exact.flags().clone();
        if radius == 0.0 {
            return Ok(StabilityRadius {
                exact,
                radius,
                flags,
                stationary_faces: vec![false; nfaces],
                separators: vec![None; nfaces],
            });
        }

        let surface = exact.surface();
        let vectors = exact.vectors();
        let stationary_faces: Vec<bool> = vectors.iter().map(|&f| vec3::norm(f) <= radius).collect();

        for face in 0..nfaces {
            let f = vectors[face];
            let stat = stationary_faces[face];
            let len = flags.attracts[face].len();
            for pos in (0..len).step_by(2) {
                let d = vec3::dot(surface.inward_conormal(face, pos), f);
                flags.attracts[face][pos] |= stat || d <= radius;
                flags.repels[face][pos] |= stat || d >= -radius;
            }
            flags.derive_corners(face);
        }

        let boundary = exact.options().boundary;
        for edge in 0..exact.complex().num_edges() {
            let widened = widened_edge_flow(surface, vectors, &stationary_faces, edge, radius, boundary);
            flags.edge_flow[edge] = flags.edge_flow[edge].union(widened);
        }

        let separators = vectors
            .iter()
            .enumerate()
            .map(|(face, &f)| {
                (!stationary_faces[face]).then(|| radius_cone(f, surface.normal(face), radius))
            })
            .collect();

        Ok(StabilityRadius {
            exact,
            radius,
            flags,
            stationary_faces,
            separators,
        })
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// The underlying nominal classification.
    pub fn exact(&self) -> &PiecewiseConstant {
        &self.exact
    }
}

impl FlowClassifier for StabilityRadius {
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
        if self.radius == 0.0 {
            return self.exact.connects(face, from_pos, to_pos, from_range, to_range);
        }
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

fn check_radius(radius: f64) -> Result<(), MeshMorseError> {
    if radius.is_finite() && radius >= 0.0 {
        Ok(())
    } else {
        Err(MeshMorseError::InvalidParameter {
            name: "radius",
            reason: format!("expected a finite non-negative value, got {radius}"),
        })
    }
}

/// Cone of directions within `radius` of `f`.
fn radius_cone(f: Vec3, n: Vec3, radius: f64) -> SeparatingPair {
    let sin = (radius / vec3::norm(f)).min(1.0);
    let cos = (1.0 - sin * sin).sqrt().max(MIN_COS);
    let tan = sin / cos;
    let side = vec3::scale(vec3::cross(n, f), tan);
    SeparatingPair::from_extremes(vec3::add(f, side), vec3::sub(f, side), n)
}

/// Directions in which some admissible vector slides along an edge.
fn widened_edge_flow(
    surface: &SurfaceMesh,
    vectors: &[Vec3],
    stationary_faces: &[bool],
    edge: usize,
    radius: f64,
    boundary: BoundaryMode,
) -> EdgeFlow {
    let complex = surface.complex();
    let Some(ev) = vec3::normalize(surface.edge_vector(edge)) else {
        return EdgeFlow::BOTH;
    };
    match *complex.edge(edge).cofaces() {
        [c0] => {
            if boundary == BoundaryMode::Open {
                return EdgeFlow::NONE;
            }
            let face = c0.index();
            let d = vec3::dot(ev, vectors[face]);
            let stat = stationary_faces[face];
            EdgeFlow {
                up: stat || d >= -radius,
                down: stat || d <= radius,
            }
        }
        [c0, c1] => {
            let (f0, f1) = (c0.index(), c1.index());
            if stationary_faces[f0] || stationary_faces[f1] {
                return EdgeFlow::BOTH;
            }
            let sum = vec3::add(surface.normal(f0), surface.normal(f1));
            let shrink = vec3::norm(sum) / 2.0;
            let Some(an) = vec3::normalize(sum) else {
                return EdgeFlow::BOTH;
            };
            let g0 = vec3::project_onto_plane(vectors[f0], an);
            let g1 = vec3::project_onto_plane(vectors[f1], an);
            let pp = vec3::cross(ev, an);
            let p0 = (vec3::dot(g0, ev), vec3::dot(g0, pp) / shrink);
            let p1 = (vec3::dot(g1, ev), vec3::dot(g1, pp) / shrink);
            disk_band_flow(p0, p1, radius)
        }
        _ => unreachable!("edge {edge} has more than two cofaces"),
    }
}

/// Sliding directions reachable from the union of two disks of `radius`
/// around `p0` and `p1` and the band joining them, in edge coordinates
/// (x along the edge, y across it). Sliding happens where the set meets the
/// x-axis.
fn disk_band_flow(p0: (f64, f64), p1: (f64, f64), radius: f64) -> EdgeFlow {
    let mut flow = EdgeFlow::NONE;
    let mut hit = |x: f64| {
        flow.down |= x <= 0.0;
        flow.up |= x >= 0.0;
    };

    let mut disks = 0;
    for (x, y) in [p0, p1] {
        if y.abs() <= radius {
            let delta = (radius * radius - y * y).sqrt();
            hit(x - delta);
            hit(x + delta);
            disks += 1;
        }
    }
    if disks == 2 || (disks == 0 && p0.1 * p1.1 > 0.0) {
        return flow;
    }

    let (dx, dy) = (p1.0 - p0.0, p1.1 - p0.1);
    let len = (dx * dx + dy * dy).sqrt();
    if len == 0.0 {
        return flow;
    }
    let (ox, oy) = (-dy * radius / len, dx * radius / len);
    for sign in [1.0, -1.0] {
        let (a, b) = (p0.0 + sign * ox, p0.1 + sign * oy);
        let (c, d) = (p1.0 + sign * ox, p1.1 + sign * oy);
        if b * d < 0.0 {
            hit(b.abs() * c + d.abs() * a);
        }
    }
    flow
}
