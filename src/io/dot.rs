//! Graphviz output of the Morse connection graph.
//!
//! Nodes are colored by Morse set kind: saddles blue, sinks and attracting
//! orbits green, sources and repelling orbits red (orbits with rounded
//! boxes), trivial sets magenta and anything else grey. Nodes without edges
//! are left out. Edges that further refinement might remove are dotted.

use std::io::Write;

use crate::algs::{ConnectionGraph, MorseSetType};
use crate::mesh_error::MeshMorseError;

fn color(t: &MorseSetType) -> &'static str {
    if t.is_saddle() {
        "blue"
    } else if t.is_sink() {
        "green"
    } else if t.is_apo() {
        "green, style = rounded"
    } else if t.is_source() {
        "red"
    } else if t.is_rpo() {
        "red, style = rounded"
    } else if t.is_trivial() {
        "magenta"
    } else {
        "grey"
    }
}

/// Write `mcg` in DOT syntax.
pub fn write_dot<W: Write>(mcg: &ConnectionGraph, mut writer: W) -> Result<(), MeshMorseError> {
    writeln!(writer, "digraph G {{")?;
    writeln!(writer, "node [ fontsize = 40, color = black, shape = box]")?;
    for i in mcg.active_nodes() {
        writeln!(writer, "{i} [ color = {} ]", color(mcg.morse_type(i)))?;
    }
    for c in mcg.connections() {
        if c.certain {
            writeln!(writer, "{}->{}", c.from, c.to)?;
        } else {
            writeln!(writer, "{}->{} [style=dotted]", c.from, c.to)?;
        }
    }
    writeln!(writer, "}}")?;
    writer.flush()?;
    Ok(())
}
