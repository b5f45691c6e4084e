//! Geometry utilities for mesh-morse.
//!
//! Small `[f64; 3]` helpers and the embedded surface that attaches
//! coordinates, face normals and inward edge conormals to a cell complex.

pub mod surface;
pub mod vec3;

pub use surface::SurfaceMesh;
pub use vec3::Vec3;
