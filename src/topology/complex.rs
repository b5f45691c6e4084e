//! Oriented surface cell complex built from polygon loops.
//!
//! [`CellComplex::from_polygons`] turns a list of counter-clockwise vertex
//! loops into faces, edges and vertices with mutual face/coface adjacency:
//!
//! 1. every polygon side becomes a half-edge keyed by its sorted endpoints;
//! 2. sorting the keys groups the half-edges of each edge, so one group is one
//!    edge (a single member is a boundary edge, two an interior edge and more
//!    is a non-manifold error);
//! 3. each vertex chains its incident (edge, face, edge) sectors through
//!    predecessor/successor links and emits them in walk order, closed for an
//!    interior vertex and open for a boundary vertex.
//!
//! Any manifold violation is reported as an error; the complex is immutable
//! once built.

use itertools::Itertools;

use super::cell::Cell;
use super::point::{CellDim, CellId};
use crate::debug_invariants::DebugInvariants;
use crate::mesh_error::MeshMorseError;

/// Faces, edges and vertices of an oriented polygon surface.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CellComplex {
    faces: Vec<Cell>,
    edges: Vec<Cell>,
    vertices: Vec<Cell>,
}

/// One polygon side, keyed by its sorted endpoints.
#[derive(Copy, Clone, Debug)]
struct HalfEdge {
    lo: usize,
    hi: usize,
    forward: bool,
    face: usize,
    pos: usize,
}

/// Unset slot in the per-edge sector chains.
const NONE: usize = usize::MAX;

impl CellComplex {
    /// Build the complex from counter-clockwise vertex loops.
    ///
    /// The vertex count is one more than the largest referenced index; indices
    /// no polygon uses become isolated vertices.
    pub fn from_polygons<I, P>(polygons: I) -> Result<Self, MeshMorseError>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<[usize]>,
    {
        let polygons: Vec<Vec<usize>> = polygons
            .into_iter()
            .map(|p| p.as_ref().to_vec())
            .collect();

        let mut vertex_count = 0;
        let mut half_edges = Vec::with_capacity(polygons.iter().map(Vec::len).sum());
        for (face, poly) in polygons.iter().enumerate() {
            if poly.len() < 3 {
                return Err(MeshMorseError::DegeneratePolygon {
                    face,
                    len: poly.len(),
                });
            }
            for (pos, (&a, &b)) in poly.iter().circular_tuple_windows().enumerate() {
                if a == b {
                    return Err(MeshMorseError::RepeatedVertex { face, vertex: a });
                }
                vertex_count = vertex_count.max(a + 1);
                half_edges.push(HalfEdge {
                    lo: a.min(b),
                    hi: a.max(b),
                    forward: a < b,
                    face,
                    pos,
                });
            }
        }
        half_edges.sort_unstable_by_key(|h| (h.lo, h.hi, h.face, h.pos));

        // edge_at[face][pos] is the edge along side `pos` of polygon `face`
        let mut edge_at: Vec<Vec<usize>> = polygons.iter().map(|p| vec![NONE; p.len()]).collect();
        let mut edges = Vec::new();
        for group in half_edges.chunk_by(|a, b| (a.lo, a.hi) == (b.lo, b.hi)) {
            let first = group[0];
            if group.len() > 2 {
                return Err(MeshMorseError::NonManifoldEdge {
                    v0: first.lo,
                    v1: first.hi,
                    count: group.len(),
                });
            }
            if group.len() == 2 && group[0].forward == group[1].forward {
                return Err(MeshMorseError::InconsistentOrientation {
                    v0: first.lo,
                    v1: first.hi,
                });
            }
            let index = edges.len();
            for h in group {
                edge_at[h.face][h.pos] = index;
            }
            edges.push(Cell::new(
                CellId::edge(index),
                vec![CellId::vertex(first.lo), CellId::vertex(first.hi)],
                group.iter().map(|h| CellId::face(h.face)).collect(),
            ));
        }

        let faces: Vec<Cell> = polygons
            .iter()
            .enumerate()
            .map(|(face, poly)| {
                let n = poly.len();
                let boundary = (0..n)
                    .flat_map(|j| {
                        [
                            CellId::edge(edge_at[face][j]),
                            CellId::vertex(poly[(j + 1) % n]),
                        ]
                    })
                    .collect();
                Cell::new(CellId::face(face), boundary, Vec::new())
            })
            .collect();

        let vertices = vertex_cofaces(&polygons, &edge_at, edges.len(), vertex_count)?;

        let complex = CellComplex {
            faces,
            edges,
            vertices,
        };
        crate::debug_invariants!(complex.validate_invariants(), "CellComplex::from_polygons");
        Ok(complex)
    }

    #[inline]
    pub fn num_faces(&self) -> usize {
        self.faces.len()
    }

    #[inline]
    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    #[inline]
    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    #[inline]
    pub fn face(&self, index: usize) -> &Cell {
        &self.faces[index]
    }

    #[inline]
    pub fn edge(&self, index: usize) -> &Cell {
        &self.edges[index]
    }

    #[inline]
    pub fn vertex(&self, index: usize) -> &Cell {
        &self.vertices[index]
    }

    pub fn cell(&self, id: CellId) -> &Cell {
        match id.dim() {
            CellDim::Face => &self.faces[id.index()],
            CellDim::Edge => &self.edges[id.index()],
            CellDim::Vertex => &self.vertices[id.index()],
        }
    }

    pub fn faces(&self) -> &[Cell] {
        &self.faces
    }

    pub fn edges(&self) -> &[Cell] {
        &self.edges
    }

    pub fn vertices(&self) -> &[Cell] {
        &self.vertices
    }

    /// All cells: faces, then edges, then vertices.
    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.faces
            .iter()
            .chain(self.edges.iter())
            .chain(self.vertices.iter())
    }

    /// Endpoints of an edge in ascending vertex order.
    pub fn edge_endpoints(&self, edge: usize) -> (usize, usize) {
        let faces = self.edges[edge].faces();
        (faces[0].index(), faces[1].index())
    }

    /// Corner vertices of a face in boundary order, starting at position 1.
    pub fn face_corners(&self, face: usize) -> impl Iterator<Item = usize> + '_ {
        self.faces[face]
            .faces()
            .iter()
            .skip(1)
            .step_by(2)
            .map(|c| c.index())
    }

    /// Position of `edge` in the boundary list of `face`.
    ///
    /// # Panics
    ///
    /// Panics if `face` is not a coface of `edge`.
    pub fn edge_position(&self, face: usize, edge: usize) -> usize {
        self.faces[face]
            .position_of(CellId::edge(edge))
            .expect("edge missing from the boundary of its coface")
    }

    pub fn boundary_edges(&self) -> impl Iterator<Item = usize> + '_ {
        self.edges
            .iter()
            .enumerate()
            .filter(|(_, e)| e.is_boundary())
            .map(|(i, _)| i)
    }

    /// Whether every edge has two incident faces.
    pub fn is_closed(&self) -> bool {
        self.edges.iter().all(|e| !e.is_boundary())
    }
}

/// Walk the sectors around every vertex and emit its coface list.
fn vertex_cofaces(
    polygons: &[Vec<usize>],
    edge_at: &[Vec<usize>],
    edge_count: usize,
    vertex_count: usize,
) -> Result<Vec<Cell>, MeshMorseError> {
    // (edge entering the corner, face, edge leaving the corner)
    let mut sectors: Vec<Vec<(usize, usize, usize)>> = vec![Vec::new(); vertex_count];
    for (face, poly) in polygons.iter().enumerate() {
        let n = poly.len();
        for j in 0..n {
            sectors[poly[(j + 1) % n]].push((edge_at[face][j], face, edge_at[face][(j + 1) % n]));
        }
    }

    let mut pred = vec![NONE; edge_count];
    let mut succ = vec![NONE; edge_count];
    let mut sector_face = vec![NONE; edge_count];
    let mut vertices = Vec::with_capacity(vertex_count);

    for (vertex, fan) in sectors.iter().enumerate() {
        let id = CellId::vertex(vertex);
        let Some(&(_, _, last)) = fan.last() else {
            log::warn!("vertex {vertex} is not used by any polygon");
            vertices.push(Cell::new(id, Vec::new(), Vec::new()));
            continue;
        };
        for &(a, f, c) in fan {
            if pred[c] != NONE || succ[a] != NONE {
                return Err(MeshMorseError::NonManifoldVertex { vertex });
            }
            pred[c] = a;
            succ[a] = c;
            sector_face[a] = f;
        }

        let mut start = last;
        while pred[start] != NONE {
            start = pred[start];
            if start == last {
                break;
            }
        }
        let closed = pred[start] != NONE;

        let mut cofaces = Vec::with_capacity(2 * fan.len() + 1);
        let mut cur = start;
        for step in 0..fan.len() {
            if (step > 0 && cur == start) || sector_face[cur] == NONE {
                return Err(MeshMorseError::NonManifoldVertex { vertex });
            }
            cofaces.push(CellId::edge(cur));
            cofaces.push(CellId::face(sector_face[cur]));
            cur = succ[cur];
        }
        if closed {
            if cur != start {
                return Err(MeshMorseError::NonManifoldVertex { vertex });
            }
        } else {
            cofaces.push(CellId::edge(cur));
        }

        for &(a, _, c) in fan {
            pred[c] = NONE;
            succ[a] = NONE;
            sector_face[a] = NONE;
        }
        vertices.push(Cell::new(id, Vec::new(), cofaces));
    }
    Ok(vertices)
}

impl DebugInvariants for CellComplex {
    fn debug_assert_invariants(&self) {
        crate::debug_invariants!(self.validate_invariants(), "CellComplex");
    }

    fn validate_invariants(&self) -> Result<(), MeshMorseError> {
        for edge in &self.edges {
            let n = edge.cofaces().len();
            if n == 0 || n > 2 {
                return Err(MeshMorseError::InvariantViolation(format!(
                    "edge {} has {n} cofaces",
                    edge.id()
                )));
            }
            for &f in edge.cofaces() {
                if self.cell(f).position_of(edge.id()).is_none() {
                    return Err(MeshMorseError::InvariantViolation(format!(
                        "edge {} lists coface {f} that does not contain it",
                        edge.id()
                    )));
                }
            }
        }
        for face in &self.faces {
            for (pos, c) in face.faces().iter().enumerate() {
                let expected = if pos % 2 == 0 {
                    CellDim::Edge
                } else {
                    CellDim::Vertex
                };
                if c.dim() != expected {
                    return Err(MeshMorseError::InvariantViolation(format!(
                        "face {} holds {c} at position {pos}",
                        face.id()
                    )));
                }
            }
        }
        for vertex in &self.vertices {
            for (j, c) in vertex.cofaces().iter().enumerate() {
                let expected = if j % 2 == 0 {
                    CellDim::Edge
                } else {
                    CellDim::Face
                };
                if c.dim() != expected {
                    return Err(MeshMorseError::InvariantViolation(format!(
                        "vertex {} holds {c} at coface slot {j}",
                        vertex.id()
                    )));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square_as_triangles() -> CellComplex {
        CellComplex::from_polygons([[0, 1, 2], [0, 2, 3]]).unwrap()
    }

    #[test]
    fn counts_and_boundary() {
        let c = square_as_triangles();
        assert_eq!(c.num_faces(), 2);
        assert_eq!(c.num_edges(), 5);
        assert_eq!(c.num_vertices(), 4);
        assert_eq!(c.boundary_edges().count(), 4);
        assert!(!c.is_closed());
        c.validate_invariants().unwrap();
    }

    #[test]
    fn face_boundary_alternates_edge_and_corner() {
        let c = square_as_triangles();
        let f0 = c.face(0);
        assert_eq!(f0.faces().len(), 6);
        // corner after side 0 (0 -> 1) is vertex 1
        assert_eq!(f0.faces()[1], CellId::vertex(1));
        assert_eq!(c.face_corners(0).collect::<Vec<_>>(), vec![1, 2, 0]);
        let e = f0.faces()[0].index();
        assert_eq!(c.edge_endpoints(e), (0, 1));
    }

    #[test]
    fn boundary_vertex_walk_is_open() {
        let c = square_as_triangles();
        // vertex 0 touches both triangles: [e, f, e, f, e]
        let v0 = c.vertex(0);
        assert_eq!(v0.cofaces().len(), 5);
        assert!(v0.is_boundary());
        // vertex 1 touches only the first triangle
        assert_eq!(c.vertex(1).cofaces().len(), 3);
    }

    #[test]
    fn rejects_third_face_on_edge() {
        let err = CellComplex::from_polygons([[0, 1, 2], [1, 0, 3], [0, 1, 4]]).unwrap_err();
        assert!(matches!(err, MeshMorseError::NonManifoldEdge { v0: 0, v1: 1, count: 3 }));
    }

    #[test]
    fn rejects_flipped_neighbor() {
        let err = CellComplex::from_polygons([[0, 1, 2], [0, 1, 3]]).unwrap_err();
        assert!(matches!(err, MeshMorseError::InconsistentOrientation { .. }));
    }

    #[test]
    fn rejects_short_polygon() {
        let err = CellComplex::from_polygons([vec![0, 1]]).unwrap_err();
        assert_eq!(err, MeshMorseError::DegeneratePolygon { face: 0, len: 2 });
    }
}
