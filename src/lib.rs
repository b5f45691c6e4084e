#![cfg_attr(docsrs, feature(doc_cfg))]
//! # mesh-morse
//!
//! mesh-morse computes combinatorial Morse decompositions of piecewise-constant
//! vector fields on polygonal surface meshes. The field is never integrated:
//! each face's flow is classified exactly on its boundary, the classification
//! becomes a directed graph over vertices and edge pieces, and the strongly
//! connected components of that graph are the Morse sets. Adaptive
//! subdivision of edge pieces tightens the decomposition, and the Morse
//! connection graph (MCG) records which Morse sets flow into which.
//!
//! ## Features
//! - Oriented cell complex from arbitrary polygon loops with manifold checks
//! - Exact, stability-radius, support-hull and envelope field models behind
//!   one [`FlowClassifier`](flow::FlowClassifier) trait
//! - Index-arena flow graph with subdivision, merge, pruning and iterative SCC
//! - Morse set typing, statistics and MCG extraction with certainty marks
//! - Text mesh input, binary primitive output and DOT output of the MCG
//!
//! ## Determinism
//!
//! All randomized decisions use `SmallRng` seeds drawn from configuration so runs are
//! reproducible. Unit tests fix seeds explicitly to ensure deterministic behavior.
//!
//! ## Usage
//!
//! ```no_run
//! use mesh_morse::prelude::*;
//!
//! # fn main() -> Result<(), MeshMorseError> {
//! let text = std::fs::read_to_string("bunny.txt")?;
//! let input = MeshTextReader::new(FieldSampling::PerFace).read(text.as_bytes())?;
//! let options = DecompositionOptions {
//!     mcg: Some(McgOptions::default()),
//!     ..DecompositionOptions::default()
//! };
//! let md = MorseDecomposition::compute(input.surface, input.field, &options)?;
//! println!("{} Morse sets", md.morse_set_count());
//! # Ok(())
//! # }
//! ```

pub mod algs;
pub mod debug_invariants;
pub mod flow;
pub mod geometry;
pub mod io;
pub mod mesh_error;
pub mod topology;

pub use debug_invariants::DebugInvariants;

/// A convenient prelude to import the most-used traits & types:
pub mod prelude {
    pub use crate::algs::{
        ConnectionGraph, DecompositionOptions, FieldModel, FlowGraph, McgOptions,
        MorseDecomposition, MorseSetKind, MorseSetType, MorseStatistics, NodeId, Stability,
    };
    pub use crate::debug_invariants::DebugInvariants;
    pub use crate::flow::{
        BoundaryMode, ClassifierOptions, FieldSampling, FieldSamples, FlowClassifier,
        ParamRange, PiecewiseConstant, StabilityRadius, SupportHull,
    };
    pub use crate::geometry::{SurfaceMesh, Vec3};
    pub use crate::io::{MeshInput, MeshReader, MeshTextReader, Primitive, RecordTag};
    pub use crate::mesh_error::MeshMorseError;
    pub use crate::topology::{CellComplex, CellDim, CellId};
}
