mod util;

use mesh_morse::DebugInvariants;
use mesh_morse::mesh_error::MeshMorseError;
use mesh_morse::topology::{CellComplex, CellDim, CellId, is_corner_position};

#[test]
fn octahedron_is_closed_and_manifold() {
    let s = util::octahedron();
    let c = s.complex();
    assert_eq!((c.num_faces(), c.num_edges(), c.num_vertices()), (8, 12, 6));
    assert!(c.is_closed());
    assert_eq!(c.boundary_edges().count(), 0);
    for v in 0..6 {
        let cell = c.vertex(v);
        assert_eq!(cell.cofaces().len(), 8, "vertex {v}");
        assert!(!cell.is_boundary());
        // walk alternates edge, face
        for (j, cf) in cell.cofaces().iter().enumerate() {
            let want = if j % 2 == 0 { CellDim::Edge } else { CellDim::Face };
            assert_eq!(cf.dim(), want);
        }
    }
    for e in 0..12 {
        assert_eq!(c.edge(e).cofaces().len(), 2);
        let (lo, hi) = c.edge_endpoints(e);
        assert!(lo < hi);
    }
    c.validate_invariants().unwrap();
}

#[test]
fn consecutive_cofaces_share_their_edge() {
    let s = util::octahedron();
    let c = s.complex();
    for v in 0..c.num_vertices() {
        let cofaces = c.vertex(v).cofaces();
        let len = cofaces.len();
        for j in (1..len).step_by(2) {
            let face = c.cell(cofaces[j]);
            assert!(face.faces().contains(&cofaces[j - 1]));
            assert!(face.faces().contains(&cofaces[(j + 1) % len]));
            assert!(face.faces().contains(&CellId::vertex(v)));
        }
    }
}

#[test]
fn mixed_polygons() {
    // a quad with a triangle on its top side
    let c = CellComplex::from_polygons(vec![vec![0, 1, 2, 3], vec![3, 2, 4]]).unwrap();
    assert_eq!(c.num_edges(), 6);
    assert_eq!(c.face(0).faces().len(), 8);
    assert_eq!(c.face(1).faces().len(), 6);
    assert_eq!(c.face(0).corner_count(), 4);
    for (pos, cell) in c.face(0).faces().iter().enumerate() {
        assert_eq!(cell.is_vertex(), is_corner_position(pos));
    }
    let shared = c
        .face(1)
        .faces()
        .iter()
        .find(|cell| cell.is_edge() && c.edge_endpoints(cell.index()) == (2, 3))
        .copied()
        .unwrap();
    assert_eq!(c.edge(shared.index()).cofaces().len(), 2);
    assert_eq!(c.edge_position(0, shared.index()), 4);
    assert_eq!(c.boundary_edges().count(), 5);
    // vertex 4 only sees the triangle
    assert_eq!(c.vertex(4).cofaces().len(), 3);
    assert!(c.vertex(4).is_boundary());
}

#[test]
fn unused_vertex_is_isolated() {
    let c = CellComplex::from_polygons([[0, 1, 3]]).unwrap();
    assert_eq!(c.num_vertices(), 4);
    assert!(c.vertex(2).cofaces().is_empty());
    assert!(c.vertex(2).is_isolated_vertex());
}

#[test]
fn bowtie_is_rejected() {
    let err = CellComplex::from_polygons([[0, 1, 2], [0, 3, 4]]).unwrap_err();
    assert_eq!(err, MeshMorseError::NonManifoldVertex { vertex: 0 });
}

#[test]
fn repeated_corner_is_rejected() {
    let err = CellComplex::from_polygons([vec![0, 1, 1, 2]]).unwrap_err();
    assert_eq!(err, MeshMorseError::RepeatedVertex { face: 0, vertex: 1 });
}
