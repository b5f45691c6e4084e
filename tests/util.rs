#![allow(dead_code)]
use mesh_morse::flow::{ClassifierOptions, FieldSamples, FlowClassifier, PiecewiseConstant};
use mesh_morse::geometry::{SurfaceMesh, Vec3};
use mesh_morse::topology::CellComplex;

/// Octahedron with vertices on the axes: 0 +x, 1 +y, 2 -x, 3 -y, 4 +z, 5 -z.
pub fn octahedron() -> SurfaceMesh {
    let c = CellComplex::from_polygons([
        [0, 1, 4],
        [1, 2, 4],
        [2, 3, 4],
        [3, 0, 4],
        [1, 0, 5],
        [2, 1, 5],
        [3, 2, 5],
        [0, 3, 5],
    ])
    .unwrap();
    SurfaceMesh::new(
        c,
        vec![
            [1.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
            [-1.0, 0.0, 0.0],
            [0.0, -1.0, 0.0],
            [0.0, 0.0, 1.0],
            [0.0, 0.0, -1.0],
        ],
    )
    .unwrap()
}

/// Unit square split along the diagonal from 0 to 2.
pub fn split_square() -> SurfaceMesh {
    let c = CellComplex::from_polygons([[0, 1, 2], [0, 2, 3]]).unwrap();
    SurfaceMesh::new(
        c,
        vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 1.0, 0.0], [0.0, 1.0, 0.0]],
    )
    .unwrap()
}

/// Unit square as a single quad.
pub fn unit_quad() -> SurfaceMesh {
    let c = CellComplex::from_polygons([[0, 1, 2, 3]]).unwrap();
    SurfaceMesh::new(
        c,
        vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 1.0, 0.0], [0.0, 1.0, 0.0]],
    )
    .unwrap()
}

/// Regular hexagon as a single face.
pub fn hexagon() -> SurfaceMesh {
    let c = CellComplex::from_polygons([[0, 1, 2, 3, 4, 5]]).unwrap();
    let coords = (0..6)
        .map(|k| {
            let a = std::f64::consts::FRAC_PI_3 * k as f64;
            [a.cos(), a.sin(), 0.0]
        })
        .collect();
    SurfaceMesh::new(c, coords).unwrap()
}

pub fn uniform(surface: &SurfaceMesh, f: Vec3) -> FieldSamples {
    FieldSamples::PerFace(vec![f; surface.complex().num_faces()])
}

pub fn exact(surface: SurfaceMesh, f: Vec3) -> PiecewiseConstant {
    let field = uniform(&surface, f);
    PiecewiseConstant::new(surface, field, ClassifierOptions::default()).unwrap()
}

/// Number of attract/repel changes around the sides of `face`.
pub fn side_switches<C: FlowClassifier>(c: &C, face: usize) -> usize {
    let len = c.complex().face(face).faces().len();
    let sides: Vec<bool> = (0..len).step_by(2).map(|pos| c.attracts(face, pos)).collect();
    (0..sides.len())
        .filter(|&k| sides[k] != sides[(k + 1) % sides.len()])
        .count()
}
