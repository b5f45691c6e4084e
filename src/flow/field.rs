//! Vector field input and its tangential projection.

use serde::{Deserialize, Serialize};

use crate::geometry::vec3::{self, Vec3};
use crate::geometry::SurfaceMesh;
use crate::mesh_error::MeshMorseError;

/// Where field samples live.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldSampling {
    #[default]
    PerFace,
    PerVertex,
}

/// Raw field samples, one vector per face or per vertex.
#[derive(Clone, Debug, PartialEq)]
pub enum FieldSamples {
    PerFace(Vec<Vec3>),
    PerVertex(Vec<Vec3>),
}

impl FieldSamples {
    pub fn sampling(&self) -> FieldSampling {
        match self {
            FieldSamples::PerFace(_) => FieldSampling::PerFace,
            FieldSamples::PerVertex(_) => FieldSampling::PerVertex,
        }
    }

    pub fn vectors(&self) -> &[Vec3] {
        match self {
            FieldSamples::PerFace(v) | FieldSamples::PerVertex(v) => v,
        }
    }
}

/// One tangential vector per face.
///
/// Per-vertex samples are averaged over each face's corners first. Every
/// vector is then projected onto its face plane.
pub fn tangential_face_vectors(
    surface: &SurfaceMesh,
    samples: &FieldSamples,
) -> Result<Vec<Vec3>, MeshMorseError> {
    let complex = surface.complex();
    let expected = match samples {
        FieldSamples::PerFace(_) => complex.num_faces(),
        FieldSamples::PerVertex(_) => complex.num_vertices(),
    };
    let given = samples.vectors();
    if given.len() < expected {
        return Err(MeshMorseError::PrematureEndOfField {
            expected,
            found: given.len(),
        });
    }
    if given.len() > expected {
        log::warn!("{} field samples given, {expected} used", given.len());
    }

    let vectors = (0..complex.num_faces())
        .map(|face| {
            let raw = match samples {
                FieldSamples::PerFace(v) => v[face],
                FieldSamples::PerVertex(v) => {
                    let mut sum = [0.0; 3];
                    let mut n = 0;
                    for corner in complex.face_corners(face) {
                        sum = vec3::add(sum, v[corner]);
                        n += 1;
                    }
                    vec3::scale(sum, 1.0 / n as f64)
                }
            };
            vec3::project_onto_plane(raw, surface.normal(face))
        })
        .collect();
    Ok(vectors)
}

/// Per-face corner vectors of a per-vertex field, projected onto the face,
/// in boundary order.
pub(crate) fn corner_vectors(surface: &SurfaceMesh, vertex_vectors: &[Vec3]) -> Vec<Vec<Vec3>> {
    let complex = surface.complex();
    (0..complex.num_faces())
        .map(|face| {
            let n = surface.normal(face);
            complex
                .face_corners(face)
                .map(|v| vec3::project_onto_plane(vertex_vectors[v], n))
                .collect()
        })
        .collect()
}
