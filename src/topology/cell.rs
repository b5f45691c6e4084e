//! Cells of a surface complex with their boundary and coboundary lists.
//!
//! A face lists `2n` boundary cells alternating edge and vertex in
//! counter-clockwise order: position `2j` holds edge `j` (from corner `j` to
//! corner `j + 1`) and position `2j + 1` holds corner `j + 1`, the vertex
//! shared by edges `j` and `j + 1`. An edge lists its two endpoints in
//! ascending vertex order. Vertices have no boundary cells.
//!
//! Cofaces are the cells a cell bounds. Edges have one (boundary) or two
//! (interior) incident faces. A vertex lists its incident edges and faces
//! alternately, walked around the vertex: `[e, f, e, f, ...]` for an interior
//! vertex and `[e, f, ..., f, e]` for a boundary vertex.

use super::point::{CellDim, CellId};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Cell {
    id: CellId,
    faces: Vec<CellId>,
    cofaces: Vec<CellId>,
}

impl Cell {
    pub(crate) fn new(id: CellId, faces: Vec<CellId>, cofaces: Vec<CellId>) -> Self {
        Cell { id, faces, cofaces }
    }

    #[inline]
    pub fn id(&self) -> CellId {
        self.id
    }

    #[inline]
    pub fn dim(&self) -> CellDim {
        self.id.dim()
    }

    /// Bounding cells in canonical order.
    #[inline]
    pub fn faces(&self) -> &[CellId] {
        &self.faces
    }

    /// Incident higher-dimensional cells in canonical order.
    #[inline]
    pub fn cofaces(&self) -> &[CellId] {
        &self.cofaces
    }

    /// Whether an edge or vertex lies on the mesh boundary.
    ///
    /// An edge is on the boundary when one face uses it; a vertex when its
    /// coface walk is open, which makes the list odd-length. Faces are never
    /// boundary cells.
    pub fn is_boundary(&self) -> bool {
        match self.dim() {
            CellDim::Edge => self.cofaces.len() == 1,
            CellDim::Vertex => self.cofaces.len() % 2 == 1,
            CellDim::Face => false,
        }
    }

    /// A vertex index referenced by no polygon.
    pub fn is_isolated_vertex(&self) -> bool {
        self.dim() == CellDim::Vertex && self.cofaces.is_empty()
    }

    /// Position of `cell` in this cell's boundary list.
    pub fn position_of(&self, cell: CellId) -> Option<usize> {
        self.faces.iter().position(|&c| c == cell)
    }

    /// Number of corners of a face (half its boundary length).
    pub fn corner_count(&self) -> usize {
        self.faces.len() / 2
    }
}

/// Whether boundary position `pos` of a face holds a vertex.
#[inline]
pub fn is_corner_position(pos: usize) -> bool {
    pos % 2 == 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundary_status_by_dimension() {
        let interior_edge = Cell::new(
            CellId::edge(0),
            vec![CellId::vertex(0), CellId::vertex(1)],
            vec![CellId::face(0), CellId::face(1)],
        );
        let boundary_vertex = Cell::new(
            CellId::vertex(0),
            vec![],
            vec![CellId::edge(0), CellId::face(0), CellId::edge(1)],
        );
        assert!(!interior_edge.is_boundary());
        assert!(boundary_vertex.is_boundary());
        assert_eq!(interior_edge.position_of(CellId::vertex(1)), Some(1));
        assert_eq!(interior_edge.position_of(CellId::vertex(4)), None);
    }
}
