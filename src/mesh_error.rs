//! MeshMorseError: Unified error type for mesh-morse public APIs
//!
//! Construction of the cell complex, flow classification, parsing and the
//! decomposition pipeline all report failures through this one enum so that
//! callers can propagate them with `?`.

use thiserror::Error;

/// Unified error type for mesh-morse operations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum MeshMorseError {
    /// A polygon with fewer than three corners.
    #[error("polygon {face} has {len} corners; at least 3 are required")]
    DegeneratePolygon { face: usize, len: usize },
    /// A polygon lists the same vertex on two consecutive corners.
    #[error("polygon {face} repeats vertex {vertex} on consecutive corners")]
    RepeatedVertex { face: usize, vertex: usize },
    /// An edge shared by three or more polygons.
    #[error("non-manifold mesh: edge ({v0}, {v1}) is shared by {count} polygons")]
    NonManifoldEdge { v0: usize, v1: usize, count: usize },
    /// Two polygons traverse a shared edge in the same direction.
    #[error("inconsistent orientation: edge ({v0}, {v1}) is traversed twice in the same direction")]
    InconsistentOrientation { v0: usize, v1: usize },
    /// The polygons around a vertex do not form a single fan.
    #[error("non-manifold mesh around vertex {vertex}")]
    NonManifoldVertex { vertex: usize },
    /// Fewer coordinates than vertices referenced by the polygons.
    #[error("expected {expected} vertex coordinates, found {found}")]
    CoordinateCountMismatch { expected: usize, found: usize },
    /// A face whose geometry admits no normal or no inward conormal.
    #[error("face {face} is geometrically degenerate")]
    DegenerateFace { face: usize },
    /// The perturbation loop could not separate a tangential configuration.
    #[error(
        "face {face} still shows {switches} attract/repel switches after {attempts} perturbations"
    )]
    UnresolvedDegeneracy {
        face: usize,
        switches: usize,
        attempts: usize,
    },
    /// Corner projections along the field disagree with the attract/repel pattern.
    #[error("projections along the field on face {face} are inconsistent with its flow pattern")]
    InconsistentProjection { face: usize },
    /// The vector field ended before every face or vertex received a vector.
    #[error("premature end of vector field: expected {expected} vectors, found {found}")]
    PrematureEndOfField { expected: usize, found: usize },
    /// A numeric parameter outside its admissible range.
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },
    /// The envelope model was requested for a per-face field.
    #[error("the envelope model requires a per-vertex vector field")]
    EnvelopeRequiresVertexField,
    /// Malformed mesh, field or record data.
    #[error("mesh parse error: {0}")]
    MeshIoParse(String),
    /// Underlying reader or writer failure.
    #[error("I/O error: {0}")]
    Io(String),
    /// A structural invariant check failed.
    #[error("invariant violated: {0}")]
    InvariantViolation(String),
}

impl From<std::io::Error> for MeshMorseError {
    fn from(err: std::io::Error) -> Self {
        MeshMorseError::Io(err.to_string())
    }
}
