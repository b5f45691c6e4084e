//! Graph algorithms of the decomposition.
//!
//! The flow graph and its arena, strongly connected components, refinement
//! and coarsening, Morse set typing, connection graph extraction and the
//! end-to-end pipeline.

pub mod arena;
pub mod connection_graph;
pub mod decomposition;
pub mod flow_graph;
pub mod mcg;
pub mod morse_type;
pub mod refine;
pub mod scc;

pub use arena::{Arc, ArcId, Carrier, GraphArena, Node, NodeId, NodeStatus};
pub use connection_graph::{Connection, ConnectionGraph};
pub use decomposition::{
    DecompositionOptions, FieldModel, McgOptions, MorseDecomposition, build_classifier,
};
pub use flow_graph::{FlowGraph, Side};
pub use mcg::{connection_graph, prepare_for_mcg};
pub use morse_type::{MorseSetKind, MorseSetType, MorseStatistics, Stability, morse_set_types};
pub use refine::{coarsen_morse_sets, refine};
pub use scc::strongly_connected_components;
