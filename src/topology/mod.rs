//! Top-level module for the surface cell complex.
//!
//! This module provides the combinatorial side of the decomposition:
//! - [`CellId`] handles for vertices, edges and faces
//! - [`Cell`] with ordered boundary and coboundary lists
//! - [`CellComplex`], built from polygon loops with manifold checks
//!
//! Every later stage indexes boundary sectors through the canonical orders
//! established here.

pub mod cell;
pub mod complex;
pub mod point;

pub use cell::{Cell, is_corner_position};
pub use complex::CellComplex;
pub use point::{CellDim, CellId};
