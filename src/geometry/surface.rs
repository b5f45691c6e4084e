//! A cell complex embedded in 3D.
//!
//! [`SurfaceMesh`] attaches vertex coordinates to a [`CellComplex`] and
//! caches, per face, the unit normal and the unit inward conormal of every
//! boundary edge. Both are needed by every flow classifier.

use super::vec3::{self, Vec3};
use crate::mesh_error::MeshMorseError;
use crate::topology::CellComplex;

#[derive(Clone, Debug)]
pub struct SurfaceMesh {
    complex: CellComplex,
    coords: Vec<Vec3>,
    normals: Vec<Vec3>,
    /// `inward[face][k]` belongs to the edge at boundary position `2k`.
    inward: Vec<Vec<Vec3>>,
}

impl SurfaceMesh {
    /// Attach coordinates to `complex`.
    ///
    /// Surplus coordinates are dropped with a warning; missing ones are an
    /// error. Faces without a well-defined normal or with collinear
    /// consecutive sides are rejected.
    pub fn new(complex: CellComplex, mut coords: Vec<Vec3>) -> Result<Self, MeshMorseError> {
        let expected = complex.num_vertices();
        if coords.len() < expected {
            return Err(MeshMorseError::CoordinateCountMismatch {
                expected,
                found: coords.len(),
            });
        }
        if coords.len() > expected {
            log::warn!(
                "{} coordinates given for {expected} vertices; unused vertices dropped",
                coords.len()
            );
            coords.truncate(expected);
        }

        let mut normals = Vec::with_capacity(complex.num_faces());
        let mut inward = Vec::with_capacity(complex.num_faces());
        for face in 0..complex.num_faces() {
            let corners: Vec<Vec3> = complex.face_corners(face).map(|v| coords[v]).collect();
            let n = face_normal(&corners).ok_or(MeshMorseError::DegenerateFace { face })?;
            inward.push(inward_conormals(&corners, n).ok_or(MeshMorseError::DegenerateFace { face })?);
            normals.push(n);
        }
        Ok(SurfaceMesh {
            complex,
            coords,
            normals,
            inward,
        })
    }

    #[inline]
    pub fn complex(&self) -> &CellComplex {
        &self.complex
    }

    #[inline]
    pub fn position(&self, vertex: usize) -> Vec3 {
        self.coords[vertex]
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.coords
    }

    /// Unit normal of a face, oriented by its counter-clockwise loop.
    #[inline]
    pub fn normal(&self, face: usize) -> Vec3 {
        self.normals[face]
    }

    /// Unit conormal of the edge at boundary position `pos` (even), pointing
    /// into the face.
    #[inline]
    pub fn inward_conormal(&self, face: usize, pos: usize) -> Vec3 {
        self.inward[face][pos / 2]
    }

    /// Position of the boundary cell at `pos` of `face` when it is a corner.
    pub fn corner_position(&self, face: usize, pos: usize) -> Vec3 {
        self.coords[self.complex.face(face).faces()[pos].index()]
    }

    /// Point at parameter `t` along an edge, from its lower to its higher vertex.
    pub fn edge_point(&self, edge: usize, t: f64) -> Vec3 {
        let (a, b) = self.complex.edge_endpoints(edge);
        vec3::lerp(self.coords[a], self.coords[b], t)
    }

    /// Direction of an edge from its lower to its higher vertex.
    pub fn edge_vector(&self, edge: usize) -> Vec3 {
        let (a, b) = self.complex.edge_endpoints(edge);
        vec3::sub(self.coords[b], self.coords[a])
    }

    pub fn centroid(&self, face: usize) -> Vec3 {
        let mut c = [0.0; 3];
        let mut n = 0;
        for v in self.complex.face_corners(face) {
            c = vec3::add(c, self.coords[v]);
            n += 1;
        }
        vec3::scale(c, 1.0 / n as f64)
    }
}

/// Normalized sum of the cross products of consecutive corner triples.
fn face_normal(corners: &[Vec3]) -> Option<Vec3> {
    let mut n = [0.0; 3];
    for w in corners.windows(3) {
        n = vec3::add(n, vec3::cross(vec3::sub(w[1], w[0]), vec3::sub(w[2], w[0])));
    }
    vec3::normalize(n)
}

/// Inward unit conormals per side, in boundary order.
///
/// Corner `k` closes side `k`, so side `k` runs from corner `k - 1` to
/// corner `k`; the following corner decides which side is inside.
fn inward_conormals(corners: &[Vec3], n: Vec3) -> Option<Vec<Vec3>> {
    let len = corners.len();
    (0..len)
        .map(|k| {
            let start = corners[(k + len - 1) % len];
            let end = corners[k];
            let next = corners[(k + 1) % len];
            let mut ei = vec3::cross(n, vec3::sub(end, start));
            let side = vec3::dot(ei, vec3::sub(next, end));
            if side == 0.0 {
                return None;
            }
            if side < 0.0 {
                ei = vec3::neg(ei);
            }
            vec3::normalize(ei)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_square() -> SurfaceMesh {
        let c = CellComplex::from_polygons([[0, 1, 2, 3]]).unwrap();
        SurfaceMesh::new(
            c,
            vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 1.0, 0.0], [0.0, 1.0, 0.0]],
        )
        .unwrap()
    }

    #[test]
    fn normal_and_conormals() {
        let s = unit_square();
        assert_eq!(s.normal(0), [0.0, 0.0, 1.0]);
        // side 0 runs 0 -> 1 along y = 0; inside is +y
        let ei = s.inward_conormal(0, 0);
        assert!((ei[1] - 1.0).abs() < 1e-12);
        // side 1 runs 1 -> 2 along x = 1; inside is -x
        assert!((s.inward_conormal(0, 2)[0] + 1.0).abs() < 1e-12);
    }

    #[test]
    fn edge_point_interpolates() {
        let s = unit_square();
        let p = s.edge_point(0, 0.25);
        assert_eq!(p, [0.25, 0.0, 0.0]);
        assert_eq!(s.centroid(0), [0.5, 0.5, 0.0]);
    }

    #[test]
    fn missing_coordinates_rejected() {
        let c = CellComplex::from_polygons([[0, 1, 2]]).unwrap();
        let err = SurfaceMesh::new(c, vec![[0.0; 3]; 2]).unwrap_err();
        assert_eq!(err, MeshMorseError::CoordinateCountMismatch { expected: 3, found: 2 });
    }
}
