//! Mesh and result I/O for mesh-morse.
//!
//! - [`MeshTextReader`] parses the whitespace-separated mesh and field format
//! - [`Primitive`] records carry Morse sets and separatrices as little-endian
//!   binary geometry
//! - [`write_dot`] renders a Morse connection graph in Graphviz syntax

pub mod dot;
pub mod mesh_text;
pub mod morse_sets;
pub mod primitive;

use std::io::Read;

use crate::flow::FieldSamples;
use crate::geometry::SurfaceMesh;
use crate::mesh_error::MeshMorseError;

pub use dot::write_dot;
pub use mesh_text::MeshTextReader;
pub use morse_sets::{morse_set_primitives, separatrix_primitives};
pub use primitive::{Primitive, RecordTag, read_primitives, write_primitives};

/// A surface together with the field sampled on it.
#[derive(Clone, Debug)]
pub struct MeshInput {
    pub surface: SurfaceMesh,
    pub field: FieldSamples,
}

/// Trait for readers that produce a surface and its vector field.
pub trait MeshReader {
    /// Parse mesh and field data from a reader.
    fn read<R: Read>(&self, reader: R) -> Result<MeshInput, MeshMorseError>;
}
