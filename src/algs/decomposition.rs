//! End-to-end Morse decomposition.
//!
//! [`MorseDecomposition::compute`] classifies the field under the requested
//! model, builds the flow graph, refines it for the requested number of
//! levels, coarsens the Morse sets, types them and optionally extracts the
//! Morse connection graph.

use serde::{Deserialize, Serialize};

use super::connection_graph::ConnectionGraph;
use super::flow_graph::FlowGraph;
use super::mcg;
use super::morse_type::{self, MorseSetType, MorseStatistics};
use super::refine;
use crate::flow::{
    ClassifierOptions, FieldSamples, FlowClassifier, PiecewiseConstant, StabilityRadius,
    SupportHull,
};
use crate::geometry::SurfaceMesh;
use crate::mesh_error::MeshMorseError;

/// Which vectors each face admits.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldModel {
    /// The face vector only.
    #[default]
    Exact,
    /// Every vector within `radius` of the face vector.
    StabilityRadius { radius: f64 },
    /// Hull of the neighboring face vectors blended by `weight`.
    SupportHull { weight: f64 },
    /// Hull of the face's vertex vectors blended by `weight`.
    Envelope { weight: f64 },
}

/// Refinement levels of the MCG channel pass.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct McgOptions {
    pub min_level: u32,
    pub max_level: u32,
    /// Keep trivial Morse sets as MCG nodes.
    pub include_trivial: bool,
}

impl Default for McgOptions {
    fn default() -> Self {
        McgOptions {
            min_level: 2,
            max_level: 6,
            include_trivial: false,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecompositionOptions {
    pub model: FieldModel,
    pub classifier: ClassifierOptions,
    /// Refinement levels applied to the Morse sets.
    pub iterations: usize,
    /// Extract the connection graph; also disables pruning during refinement.
    pub mcg: Option<McgOptions>,
}

impl Default for DecompositionOptions {
    fn default() -> Self {
        DecompositionOptions {
            model: FieldModel::Exact,
            classifier: ClassifierOptions::default(),
            iterations: 4,
            mcg: None,
        }
    }
}

/// Classifier for `model`, boxed so the pipeline can pick it at run time.
pub fn build_classifier(
    surface: SurfaceMesh,
    samples: FieldSamples,
    model: FieldModel,
    options: ClassifierOptions,
) -> Result<Box<dyn FlowClassifier>, MeshMorseError> {
    Ok(match model {
        FieldModel::Exact => Box::new(PiecewiseConstant::new(surface, samples, options)?),
        FieldModel::StabilityRadius { radius } => {
            Box::new(StabilityRadius::new(surface, samples, radius, options)?)
        }
        FieldModel::SupportHull { weight } => {
            Box::new(SupportHull::new(surface, samples, weight, options)?)
        }
        FieldModel::Envelope { weight } => {
            Box::new(SupportHull::envelope(surface, samples, weight, options)?)
        }
    })
}

pub struct MorseDecomposition<C = Box<dyn FlowClassifier>> {
    graph: FlowGraph<C>,
    types: Vec<MorseSetType>,
    statistics: MorseStatistics,
    connections: Option<ConnectionGraph>,
}

impl MorseDecomposition {
    pub fn compute(
        surface: SurfaceMesh,
        samples: FieldSamples,
        options: &DecompositionOptions,
    ) -> Result<Self, MeshMorseError> {
        let classifier = build_classifier(surface, samples, options.model, options.classifier)?;
        Self::from_classifier(classifier, options.iterations, options.mcg.as_ref())
    }
}

impl<C: FlowClassifier> MorseDecomposition<C> {
    /// Run the pipeline on an already built classifier.
    pub fn from_classifier(
        classifier: C,
        iterations: usize,
        mcg_options: Option<&McgOptions>,
    ) -> Result<Self, MeshMorseError> {
        if let Some(o) = mcg_options
            && o.min_level > o.max_level
        {
            return Err(MeshMorseError::InvalidParameter {
                name: "min_level",
                reason: format!("{} exceeds max_level {}", o.min_level, o.max_level),
            });
        }

        let mut graph = FlowGraph::new(classifier);
        graph.compute_morse_sets();
        refine::refine(&mut graph, iterations, mcg_options.is_none());
        refine::coarsen_morse_sets(&mut graph);
        graph.compute_morse_sets();

        let types = morse_type::morse_set_types(&graph);
        let statistics = MorseStatistics::from_types(&types);
        statistics.log();

        let connections = match mcg_options {
            Some(o) => {
                mcg::prepare_for_mcg(&mut graph, &types, o.min_level, o.max_level)?;
                Some(mcg::connection_graph(&graph, &types, o.include_trivial))
            }
            None => None,
        };

        Ok(MorseDecomposition {
            graph,
            types,
            statistics,
            connections,
        })
    }

    pub fn graph(&self) -> &FlowGraph<C> {
        &self.graph
    }

    pub fn classifier(&self) -> &C {
        self.graph.classifier()
    }

    pub fn morse_set_count(&self) -> usize {
        self.types.len()
    }

    /// Types indexed by Morse set id.
    pub fn types(&self) -> &[MorseSetType] {
        &self.types
    }

    pub fn statistics(&self) -> &MorseStatistics {
        &self.statistics
    }

    /// The MCG, when it was requested.
    pub fn connection_graph(&self) -> Option<&ConnectionGraph> {
        self.connections.as_ref()
    }

    pub fn into_graph(self) -> FlowGraph<C> {
        self.graph
    }
}
