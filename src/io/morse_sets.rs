//! Geometry of Morse sets and separatrices as [`Primitive`] records.
//!
//! A vertex node becomes a point and an edge piece a segment. An arc carried
//! by a face becomes the region of the face it sweeps: a segment between two
//! vertices, a triangle between a piece and a vertex, or a quad between two
//! pieces, oriented along the face normal.

use super::primitive::{Primitive, RecordTag};
use crate::algs::{Arc, Carrier, FlowGraph, GraphArena, MorseSetType, NodeId};
use crate::flow::FlowClassifier;
use crate::geometry::{SurfaceMesh, Vec3};
use crate::topology::CellDim;

const FORWARD: u8 = 1;
const BACKWARD: u8 = 2;

enum End {
    Vertex(Vec3),
    Piece(Vec3, Vec3),
}

fn end(surface: &SurfaceMesh, arena: &GraphArena, id: NodeId) -> End {
    let node = arena.node(id);
    let owner = node.owner();
    if node.is_vertex() {
        End::Vertex(surface.position(owner.index()))
    } else {
        let r = node.range();
        End::Piece(
            surface.edge_point(owner.index(), r.start),
            surface.edge_point(owner.index(), r.end),
        )
    }
}

/// Region swept by a face-carried arc, `None` for other carriers.
fn arc_primitive(
    surface: &SurfaceMesh,
    arena: &GraphArena,
    arc: &Arc,
    tag: RecordTag,
) -> Option<Primitive> {
    let Carrier::Face { face, .. } = arc.carrier() else {
        return None;
    };
    let n = surface.normal(face);
    let mut p = match (end(surface, arena, arc.from()), end(surface, arena, arc.to())) {
        (End::Vertex(a), End::Vertex(b)) => return Some(Primitive::segment(tag, a, b)),
        (End::Piece(s, e), End::Vertex(v)) | (End::Vertex(v), End::Piece(s, e)) => {
            Primitive::triangle(tag, s, e, v)
        }
        (End::Piece(fs, fe), End::Piece(ts, te)) => Primitive::quad(tag, ts, te, fs, fe),
    };
    p.orient(n);
    Some(p)
}

fn tag_of(types: &[MorseSetType], set: usize) -> RecordTag {
    let t = &types[set];
    RecordTag {
        id: set as i32,
        index: t.index,
        index2: t.index2,
        stability: t.stability.code(),
        boundary: t.boundary,
    }
}

/// Records covering every Morse set of `graph`.
///
/// `types` must describe the current Morse sets. Stationary faces next to an
/// edge piece of a Morse set are filled with a triangle fan, once per face.
pub fn morse_set_primitives<C: FlowClassifier>(
    graph: &FlowGraph<C>,
    types: &[MorseSetType],
) -> Vec<Primitive> {
    let classifier = graph.classifier();
    let surface = classifier.surface();
    let complex = surface.complex();
    let arena = graph.arena();
    let mut filled = vec![false; complex.num_faces()];
    let mut out = Vec::new();

    for (id, node) in arena.nodes() {
        let Some(set) = node.morse_set() else {
            continue;
        };
        let tag = tag_of(types, set);
        let owner = node.owner();
        match owner.dim() {
            CellDim::Vertex => out.push(Primitive::point(tag, surface.position(owner.index()))),
            CellDim::Edge => {
                for f in complex.edge(owner.index()).cofaces() {
                    let face = f.index();
                    if filled[face] || !classifier.is_face_stationary(face) {
                        continue;
                    }
                    filled[face] = true;
                    let b = complex.face(face).faces();
                    let apex = surface.position(b[1].index());
                    for k in (5..b.len()).step_by(2) {
                        out.push(Primitive::triangle(
                            tag,
                            apex,
                            surface.position(b[k].index()),
                            surface.position(b[k - 2].index()),
                        ));
                    }
                }
                let r = node.range();
                out.push(Primitive::segment(
                    tag,
                    surface.edge_point(owner.index(), r.start),
                    surface.edge_point(owner.index(), r.end),
                ));
            }
            CellDim::Face => continue,
        }

        for arc in arena.out_arcs(id) {
            if arena.node(arc.to()).morse_set() != Some(set) {
                continue;
            }
            out.extend(arc_primitive(surface, arena, arc, tag));
        }
    }
    log::debug!("{} Morse set records", out.len());
    out
}

fn mark(arena: &GraphArena, marks: &mut [u8], start: NodeId, bit: u8) {
    let mut stack = vec![start];
    while let Some(cn) = stack.pop() {
        if marks[cn.index()] & bit != 0 {
            continue;
        }
        marks[cn.index()] |= bit;
        if bit == FORWARD {
            stack.extend(arena.successors(cn));
        } else {
            stack.extend(arena.predecessors(cn));
        }
    }
}

/// Records of the flow leaving and entering saddle-like Morse sets.
///
/// Every node reachable forward or backward from such a set is marked. Marked
/// edge pieces outside all Morse sets become segments, and face-carried arcs
/// between nodes marked in the same direction become swept regions. All
/// records use [`RecordTag::SEPARATRIX`].
pub fn separatrix_primitives<C: FlowClassifier>(
    graph: &FlowGraph<C>,
    types: &[MorseSetType],
) -> Vec<Primitive> {
    let surface = graph.classifier().surface();
    let arena = graph.arena();
    let mut marks = vec![0u8; arena.slot_count()];
    for (id, node) in arena.nodes() {
        if node.morse_set().is_some_and(|s| types[s].is_saddle_like()) {
            mark(arena, &mut marks, id, FORWARD);
            mark(arena, &mut marks, id, BACKWARD);
        }
    }

    let tag = RecordTag::SEPARATRIX;
    let mut out = Vec::new();
    for (id, node) in arena.nodes() {
        let m = marks[id.index()];
        if m == 0 {
            continue;
        }
        if node.is_edge_piece() && node.morse_set().is_none() {
            let (e, r) = (node.owner().index(), node.range());
            out.push(Primitive::segment(
                tag,
                surface.edge_point(e, r.start),
                surface.edge_point(e, r.end),
            ));
        }
        for arc in arena.out_arcs(id) {
            let to = arena.node(arc.to()).morse_set();
            if node.morse_set().is_some() && node.morse_set() == to {
                continue;
            }
            if m & marks[arc.to().index()] == 0 {
                continue;
            }
            out.extend(arc_primitive(surface, arena, arc, tag));
        }
    }
    log::debug!("{} separatrix records", out.len());
    out
}
