//! `CellId`: a dimension-tagged handle for cells of a 2D complex
//!
//! Every face, edge and vertex of a [`CellComplex`](super::complex::CellComplex)
//! is addressed by its dimension plus a dense index within that dimension.
//! Faces are numbered in input order, edges in sorted (min, max) vertex order
//! and vertices by their index in the input polygons.
//!
//! This module provides:
//! - [`CellDim`], the dimension tag (vertex, edge, face).
//! - [`CellId`], a packed `(dim, index)` pair that fits in eight bytes.
//! - Formatting (`Debug` as `Edge(3)`, `Display` as `e3`) so ids print well
//!   in diagnostics.

use std::fmt;

/// Dimension of a cell in a surface complex.
#[derive(
    Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
#[repr(u8)]
pub enum CellDim {
    Vertex = 0,
    Edge = 1,
    Face = 2,
}

impl CellDim {
    /// Topological dimension as an integer.
    #[inline]
    pub const fn get(self) -> u8 {
        self as u8
    }
}

/// Handle of a vertex, edge or face.
///
/// Ordering is by dimension first, then by index.
#[derive(
    Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
pub struct CellId {
    dim: CellDim,
    index: u32,
}

impl CellId {
    /// Creates a handle for the cell `index` of dimension `dim`.
    ///
    /// # Panics
    ///
    /// Panics if `index` does not fit in a `u32`.
    #[inline]
    pub fn new(dim: CellDim, index: usize) -> Self {
        let index = u32::try_from(index).expect("cell index exceeds u32 range");
        CellId { dim, index }
    }

    #[inline]
    pub fn vertex(index: usize) -> Self {
        Self::new(CellDim::Vertex, index)
    }

    #[inline]
    pub fn edge(index: usize) -> Self {
        Self::new(CellDim::Edge, index)
    }

    #[inline]
    pub fn face(index: usize) -> Self {
        Self::new(CellDim::Face, index)
    }

    #[inline]
    pub const fn dim(self) -> CellDim {
        self.dim
    }

    /// Dense index within the cell's dimension.
    #[inline]
    pub const fn index(self) -> usize {
        self.index as usize
    }

    #[inline]
    pub fn is_vertex(self) -> bool {
        self.dim == CellDim::Vertex
    }

    #[inline]
    pub fn is_edge(self) -> bool {
        self.dim == CellDim::Edge
    }

    #[inline]
    pub fn is_face(self) -> bool {
        self.dim == CellDim::Face
    }
}

// -----------------------------------------------------------------------------
// Formatting traits
// -----------------------------------------------------------------------------

impl fmt::Debug for CellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self.dim {
            CellDim::Vertex => "Vertex",
            CellDim::Edge => "Edge",
            CellDim::Face => "Face",
        };
        f.debug_tuple(name).field(&self.index).finish()
    }
}

impl fmt::Display for CellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.dim {
            CellDim::Vertex => 'v',
            CellDim::Edge => 'e',
            CellDim::Face => 'f',
        };
        write!(f, "{tag}{}", self.index)
    }
}

// -----------------------------------------------------------------------------
// Testing and assertions
// -----------------------------------------------------------------------------

#[cfg(test)]
mod layout_tests {
    use super::*;
    use static_assertions::assert_eq_size;

    assert_eq_size!(CellId, u64);
    assert_eq_size!(CellDim, u8);
}
