mod util;

use mesh_morse::flow::{
    BoundaryMode, ClassifierOptions, EdgeFlow, FieldSamples, FlowClassifier, ParamRange,
    PiecewiseConstant, StabilityRadius, SupportHull,
};
use mesh_morse::mesh_error::MeshMorseError;
use proptest::prelude::*;

#[test]
fn octahedron_lifts_towards_the_north_pole() {
    let pc = util::exact(util::octahedron(), [0.0, 0.0, 1.0]);
    let c = pc.complex();
    for e in 0..c.num_edges() {
        let (lo, hi) = c.edge_endpoints(e);
        let want = match (lo, hi) {
            (_, 4) => EdgeFlow::UP,
            (_, 5) => EdgeFlow::DOWN,
            _ => EdgeFlow::NONE,
        };
        assert_eq!(pc.edge_flow(e), want, "edge ({lo}, {hi})");
    }
    assert!(pc.is_stationary(4));
    assert!(pc.is_stationary(5));
    assert_eq!((pc.index(4), pc.index(5)), (1, 1));
    for v in 0..4 {
        assert!(!pc.is_stationary(v));
        assert_eq!(pc.index(v), 0);
    }
    // every face switches between attracting and repelling sides twice
    for f in 0..c.num_faces() {
        assert_eq!(util::side_switches(&pc, f), 2);
    }
}

#[test]
fn closed_boundary_slides_and_open_boundary_does_not() {
    let s = util::split_square();
    let field = util::uniform(&s, [1.0, 0.2, 0.0]);
    let closed = PiecewiseConstant::new(s.clone(), field.clone(), ClassifierOptions::default()).unwrap();
    let open = PiecewiseConstant::new(
        s,
        field,
        ClassifierOptions {
            boundary: BoundaryMode::Open,
            ..ClassifierOptions::default()
        },
    )
    .unwrap();
    let c = closed.complex();
    for e in c.boundary_edges() {
        assert!(!closed.edge_flow(e).is_none());
        assert!(open.edge_flow(e).is_none());
    }
    // boundary source at 0 and boundary sink at 2
    let v0 = closed.vertex_class(0);
    let v2 = closed.vertex_class(2);
    assert!(v0.stationary && v2.stationary);
    assert_eq!((v0.index, v0.index2), (0, 1));
    assert_eq!((v2.index, v2.index2), (1, 0));
    assert!(!closed.is_stationary(1));
    assert!(!closed.is_stationary(3));
}

#[test]
fn zero_radius_matches_exact() {
    let s = util::octahedron();
    let field = util::uniform(&s, [0.3, -0.2, 1.0]);
    let exact = PiecewiseConstant::new(s.clone(), field.clone(), ClassifierOptions::default()).unwrap();
    let stable = StabilityRadius::new(s, field, 0.0, ClassifierOptions::default()).unwrap();
    assert_eq!(stable.flags(), exact.flags());
    let c = exact.complex();
    for f in 0..c.num_faces() {
        let len = c.face(f).faces().len();
        for a in 0..len {
            for b in 0..len {
                assert_eq!(
                    stable.connects(f, a, b, ParamRange::FULL, ParamRange::FULL),
                    exact.connects(f, a, b, ParamRange::FULL, ParamRange::FULL)
                );
            }
        }
    }
}

#[test]
fn large_radius_makes_faces_stationary() {
    let s = util::octahedron();
    let field = util::uniform(&s, [0.0, 0.0, 1.0]);
    let stable = StabilityRadius::new(s, field, 10.0, ClassifierOptions::default()).unwrap();
    for f in 0..stable.complex().num_faces() {
        assert!(stable.is_face_stationary(f));
        let len = stable.complex().face(f).faces().len();
        assert!((0..len).all(|p| stable.attracts(f, p) && stable.repels(f, p)));
    }
}

#[test]
fn parameters_are_checked() {
    let s = util::octahedron();
    let field = util::uniform(&s, [0.0, 0.0, 1.0]);
    let err = StabilityRadius::new(s.clone(), field.clone(), -1.0, ClassifierOptions::default())
        .unwrap_err();
    assert!(matches!(err, MeshMorseError::InvalidParameter { name: "radius", .. }));
    let err = SupportHull::new(s.clone(), field.clone(), 1.5, ClassifierOptions::default())
        .unwrap_err();
    assert!(matches!(err, MeshMorseError::InvalidParameter { name: "weight", .. }));
    let err = SupportHull::envelope(s, field, 0.5, ClassifierOptions::default()).unwrap_err();
    assert_eq!(err, MeshMorseError::EnvelopeRequiresVertexField);
}

#[test]
fn short_field_is_rejected() {
    let s = util::octahedron();
    let err = PiecewiseConstant::new(
        s,
        FieldSamples::PerFace(vec![[0.0, 0.0, 1.0]; 3]),
        ClassifierOptions::default(),
    )
    .unwrap_err();
    assert_eq!(
        err,
        MeshMorseError::PrematureEndOfField {
            expected: 8,
            found: 3
        }
    );
}

#[test]
fn envelope_accepts_vertex_samples() {
    let s = util::octahedron();
    let field = FieldSamples::PerVertex(vec![[0.0, 0.0, 1.0]; 6]);
    let hull = SupportHull::envelope(s, field, 0.5, ClassifierOptions::default()).unwrap();
    for f in 0..hull.complex().num_faces() {
        assert!(!hull.hull(f).is_empty());
    }
}

fn direction() -> impl Strategy<Value = [f64; 3]> {
    (-1.0f64..1.0, -1.0f64..1.0, -1.0f64..1.0)
        .prop_map(|(x, y, z)| [x, y, z])
        .prop_filter("non-zero", |v| v.iter().map(|c| c * c).sum::<f64>() > 0.01)
}

proptest! {
    #[test]
    fn exact_faces_switch_twice(f in direction()) {
        let s = util::hexagon();
        let field = util::uniform(&s, f);
        let planar = f[0].abs() + f[1].abs() > 1e-3;
        prop_assume!(planar);
        let pc = PiecewiseConstant::new(s, field, ClassifierOptions::default()).unwrap();
        prop_assert_eq!(util::side_switches(&pc, 0), 2);
        for pos in (0..12).step_by(2) {
            prop_assert_ne!(pc.attracts(0, pos), pc.repels(0, pos));
        }
    }

    #[test]
    fn widened_models_only_add_flags(f in direction(), radius in 0.0f64..0.5, weight in 0.0f64..1.0) {
        let s = util::octahedron();
        let field = util::uniform(&s, f);
        let exact = PiecewiseConstant::new(s.clone(), field.clone(), ClassifierOptions::default()).unwrap();
        let stable = StabilityRadius::new(s.clone(), field.clone(), radius, ClassifierOptions::default()).unwrap();
        let hull = SupportHull::new(s, field, weight, ClassifierOptions::default()).unwrap();
        let c = exact.complex();
        for face in 0..c.num_faces() {
            for pos in 0..c.face(face).faces().len() {
                if exact.attracts(face, pos) {
                    prop_assert!(stable.attracts(face, pos) && hull.attracts(face, pos));
                }
                if exact.repels(face, pos) {
                    prop_assert!(stable.repels(face, pos) && hull.repels(face, pos));
                }
            }
        }
        for e in 0..c.num_edges() {
            let x = exact.edge_flow(e);
            prop_assert_eq!(stable.edge_flow(e).union(x), stable.edge_flow(e));
            prop_assert_eq!(hull.edge_flow(e).union(x), hull.edge_flow(e));
        }
    }
}
