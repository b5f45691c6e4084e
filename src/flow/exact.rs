//! Exact classifier for one constant vector per face.
//!
//! A side of a face attracts when the face vector points out of the face
//! across it (its inward conormal makes a negative dot product with the
//! vector) and repels otherwise. For a constant vector on a convex polygon
//! the sides split into one attracting run and one repelling run, so the
//! flags switch exactly twice around the boundary. Faces that violate this
//! (a zero vector, a non-convex polygon) are nudged by a tiny seeded random
//! vector until they comply.
//!
//! Reachability inside a face follows the flow lines: every point moves along
//! the face vector, so two boundary pieces are connected exactly when their
//! projections onto the direction perpendicular to the vector overlap.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use super::field::{self, FieldSamples};
use super::{
    BoundaryMode, EdgeFlow, FlowClassifier, FlowFlags, ParamRange, derive_corner_flags, sectors,
};
use crate::geometry::vec3::{self, Vec3};
use crate::geometry::SurfaceMesh;
use crate::mesh_error::MeshMorseError;
use crate::topology::is_corner_position;

/// Magnitude of the random nudge applied to degenerate faces.
const PERTURBATION: f64 = 1e-6;

/// Options shared by every field model.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierOptions {
    /// Whether flow may cross the mesh boundary.
    pub boundary: BoundaryMode,
    /// Seed of the generator used to nudge degenerate faces.
    pub perturbation_seed: u64,
    /// Nudges tried per face before giving up.
    pub max_perturbations: usize,
}

impl Default for ClassifierOptions {
    fn default() -> Self {
        ClassifierOptions {
            boundary: BoundaryMode::Closed,
            perturbation_seed: 0x5eed,
            max_perturbations: 64,
        }
    }
}

/// The exact piecewise-constant model.
#[derive(Clone, Debug)]
pub struct PiecewiseConstant {
    surface: SurfaceMesh,
    vectors: Vec<Vec3>,
    vertex_vectors: Option<Vec<Vec3>>,
    flags: FlowFlags,
    /// Per face, projection of each corner (boundary position `2k + 1`).
    corner_proj: Vec<Vec<f64>>,
    /// Per face, projections of the lower and higher endpoint of the edge at
    /// boundary position `2k`.
    edge_proj: Vec<Vec<[f64; 2]>>,
    options: ClassifierOptions,
}

impl PiecewiseConstant {
    pub fn new(
        surface: SurfaceMesh,
        samples: FieldSamples,
        options: ClassifierOptions,
    ) -> Result<Self, MeshMorseError> {
        let mut vectors = field::tangential_face_vectors(&surface, &samples)?;
        let vertex_vectors = match samples {
            FieldSamples::PerVertex(v) => Some(v),
            FieldSamples::PerFace(_) => None,
        };
        let complex = surface.complex();
        let mut rng = SmallRng::seed_from_u64(options.perturbation_seed);

        let mut attracts = Vec::with_capacity(complex.num_faces());
        for (face, f) in vectors.iter_mut().enumerate() {
            attracts.push(classify_sides(&surface, face, f, &mut rng, options.max_perturbations)?);
        }
        let repels: Vec<Vec<bool>> = attracts
            .iter()
            .map(|a| {
                let mut r: Vec<bool> = a.iter().map(|&x| !x).collect();
                derive_corner_flags(&mut r);
                r
            })
            .collect();
        for a in attracts.iter_mut() {
            derive_corner_flags(a);
        }

        let edge_flow: Vec<EdgeFlow> = (0..complex.num_edges())
            .map(|edge| exact_edge_flow(&surface, &vectors, &attracts, edge, options.boundary))
            .collect();

        let mut corner_proj = Vec::with_capacity(complex.num_faces());
        let mut edge_proj = Vec::with_capacity(complex.num_faces());
        for face in 0..complex.num_faces() {
            let (corners, edges) = face_projections(&surface, face, vectors[face]);
            if !check_projections(&attracts[face], &corners) {
                return Err(MeshMorseError::InconsistentProjection { face });
            }
            corner_proj.push(corners);
            edge_proj.push(edges);
        }

        let vertices = (0..complex.num_vertices())
            .map(|v| sectors::classify_vertex(complex, &attracts, &edge_flow, v, options.boundary))
            .collect();

        Ok(PiecewiseConstant {
            surface,
            vectors,
            vertex_vectors,
            flags: FlowFlags {
                attracts,
                repels,
                edge_flow,
                vertices,
            },
            corner_proj,
            edge_proj,
            options,
        })
    }

    pub fn options(&self) -> &ClassifierOptions {
        &self.options
    }

    /// Tangential face vectors after any degeneracy nudges.
    pub fn vectors(&self) -> &[Vec3] {
        &self.vectors
    }

    /// The raw per-vertex samples, when the field was given per vertex.
    pub fn vertex_vectors(&self) -> Option<&[Vec3]> {
        self.vertex_vectors.as_deref()
    }

    pub(crate) fn into_surface(self) -> SurfaceMesh {
        self.surface
    }

    /// Projected interval of `range` of the edge at `pos`, sorted.
    fn edge_interval(&self, face: usize, pos: usize, range: ParamRange) -> (f64, f64) {
        let [a, b] = self.edge_proj[face][pos / 2];
        let s = (1.0 - range.start) * a + range.start * b;
        let e = (1.0 - range.end) * a + range.end * b;
        if s <= e { (s, e) } else { (e, s) }
    }
}

impl FlowClassifier for PiecewiseConstant {
    fn surface(&self) -> &SurfaceMesh {
        &self.surface
    }

    fn flags(&self) -> &FlowFlags {
        &self.flags
    }

    fn face_vector(&self, face: usize) -> Vec3 {
        self.vectors[face]
    }

    fn connects(
        &self,
        face: usize,
        from_pos: usize,
        to_pos: usize,
        from_range: ParamRange,
        to_range: ParamRange,
    ) -> bool {
        let corner = |pos: usize| self.corner_proj[face][pos / 2];
        match (is_corner_position(from_pos), is_corner_position(to_pos)) {
            (true, true) => corner(from_pos) == corner(to_pos),
            (true, false) => {
                let (s, e) = self.edge_interval(face, to_pos, to_range);
                let p = corner(from_pos);
                s <= p && p <= e
            }
            (false, true) => {
                let (s, e) = self.edge_interval(face, from_pos, from_range);
                let p = corner(to_pos);
                s <= p && p <= e
            }
            (false, false) => {
                let (s1, e1) = self.edge_interval(face, from_pos, from_range);
                let (s2, e2) = self.edge_interval(face, to_pos, to_range);
                !(e1 < s2 || e2 < s1)
            }
        }
    }
}

/// Attract flags of the sides of `face` (even positions only; corners are
/// derived later). Nudges `f` until the flags switch exactly twice.
fn classify_sides(
    surface: &SurfaceMesh,
    face: usize,
    f: &mut Vec3,
    rng: &mut SmallRng,
    max_perturbations: usize,
) -> Result<Vec<bool>, MeshMorseError> {
    let len = surface.complex().face(face).faces().len();
    let n = surface.normal(face);
    let mut flags = vec![false; len];
    let mut attempts = 0;
    loop {
        for pos in (0..len).step_by(2) {
            flags[pos] = vec3::dot(surface.inward_conormal(face, pos), *f) < 0.0;
        }
        let switches = (0..len)
            .step_by(2)
            .filter(|&pos| flags[pos] != flags[(pos + len - 2) % len])
            .count();
        if switches == 2 {
            return Ok(flags);
        }
        if attempts == max_perturbations {
            return Err(MeshMorseError::UnresolvedDegeneracy {
                face,
                switches,
                attempts,
            });
        }
        attempts += 1;
        log::warn!("face {face} has {switches} attract/repel switches; perturbing its vector");
        let nudge = [
            rng.gen_range(-1.0..=1.0),
            rng.gen_range(-1.0..=1.0),
            rng.gen_range(-1.0..=1.0),
        ];
        *f = vec3::project_onto_plane(vec3::add(*f, vec3::scale(nudge, PERTURBATION)), n);
    }
}

/// Sliding direction along an edge for one vector per face.
fn exact_edge_flow(
    surface: &SurfaceMesh,
    vectors: &[Vec3],
    attracts: &[Vec<bool>],
    edge: usize,
    boundary: BoundaryMode,
) -> EdgeFlow {
    let complex = surface.complex();
    let ev = surface.edge_vector(edge);
    match *complex.edge(edge).cofaces() {
        [c0] => match boundary {
            BoundaryMode::Open => EdgeFlow::NONE,
            BoundaryMode::Closed => {
                if vec3::dot(ev, vectors[c0.index()]) > 0.0 {
                    EdgeFlow::UP
                } else {
                    EdgeFlow::DOWN
                }
            }
        },
        [c0, c1] => {
            let (f0, f1) = (c0.index(), c1.index());
            let a0 = attracts[f0][complex.edge_position(f0, edge)];
            let a1 = attracts[f1][complex.edge_position(f1, edge)];
            if a0 != a1 {
                // flow crosses the edge
                return EdgeFlow::NONE;
            }
            let Some(an) = vec3::normalize(vec3::add(surface.normal(f0), surface.normal(f1))) else {
                return EdgeFlow::BOTH;
            };
            let g0 = vec3::project_onto_plane(vectors[f0], an);
            let g1 = vec3::project_onto_plane(vectors[f1], an);
            let pp = vec3::cross(ev, an);
            let w0 = vec3::dot(g1, pp);
            let w1 = vec3::dot(g0, pp);
            debug_assert!(w0 * w1 <= 0.0, "both faces push across edge {edge} the same way");
            let slide = vec3::add(vec3::scale(g0, w0.abs()), vec3::scale(g1, w1.abs()));
            if vec3::dot(slide, ev) > 0.0 {
                EdgeFlow::UP
            } else {
                EdgeFlow::DOWN
            }
        }
        _ => unreachable!("edge {edge} has more than two cofaces"),
    }
}

/// Projections of corners and edge endpoints onto `f × n`, relative to the
/// face centroid.
fn face_projections(surface: &SurfaceMesh, face: usize, f: Vec3) -> (Vec<f64>, Vec<[f64; 2]>) {
    let complex = surface.complex();
    let perp = vec3::cross(f, surface.normal(face));
    let c = surface.centroid(face);
    let proj = |v: usize| vec3::dot(perp, vec3::sub(surface.position(v), c));
    let corners = complex.face_corners(face).map(proj).collect();
    let edges = complex
        .face(face)
        .faces()
        .iter()
        .step_by(2)
        .map(|e| {
            let (a, b) = complex.edge_endpoints(e.index());
            [proj(a), proj(b)]
        })
        .collect();
    (corners, edges)
}

/// Attracting sides must all run one way along the projection axis and
/// repelling sides the other way.
fn check_projections(attracts: &[bool], corners: &[f64]) -> bool {
    let k = corners.len();
    // seen[attracting][decreasing]
    let mut seen = [[false; 2]; 2];
    for side in 0..k {
        let from = corners[(side + k - 1) % k];
        let to = corners[side];
        let attracting = attracts[2 * side];
        seen[usize::from(!attracting)][usize::from(to < from)] = true;
    }
    let count = |a: bool, b: bool| usize::from(a) + usize::from(b);
    count(seen[0][0], seen[1][0]) == 1
        && count(seen[1][0], seen[1][1]) == 1
        && count(seen[0][1], seen[1][1]) == 1
}
