//! Discrete Poincaré index of a vertex from its sector pattern.
//!
//! Each coface of a vertex gets a code: an edge is unstable when flow slides
//! away from the vertex and stable when it slides towards it; a face is
//! unstable when it repels both sides meeting at the vertex and stable when
//! it attracts both. Mixed faces and edges without sliding flow carry no
//! direction. Walking the cofaces, each change between unstable and stable
//! opens a new sector and is hyperbolic or elliptic depending on the face
//! preceding the change. A regular vertex shows exactly one stable sector,
//! one unstable sector and two hyperbolic changes.

use super::{BoundaryMode, EdgeFlow, VertexClass};
use crate::topology::{CellComplex, CellId};

const UNSTABLE: u8 = 1;
const STABLE: u8 = 2;

#[derive(Copy, Clone, Debug, Default)]
struct SectorCounts {
    stable: i32,
    unstable: i32,
    hyperbolic: i32,
    elliptic: i32,
}

impl SectorCounts {
    fn index(&self) -> i32 {
        1 + (self.elliptic - self.hyperbolic) / 2
    }

    fn is_regular(&self) -> bool {
        self.elliptic == 0 && self.stable == 1 && self.unstable == 1 && self.hyperbolic == 2
    }
}

/// Direction code of an edge relative to `vertex`: `UNSTABLE` when flow
/// leaves the vertex, `STABLE` when it arrives, `0` for none or both.
fn edge_code(complex: &CellComplex, edge: usize, vertex: CellId, flow: EdgeFlow) -> u8 {
    let away = u8::from(flow.up) | u8::from(flow.down) << 1;
    let code = if complex.edge(edge).faces()[0] == vertex {
        away
    } else {
        away ^ 3
    };
    if code == 3 { 0 } else { code }
}

/// Classify `vertex` from the attract flags of its faces and the sliding
/// flow of its edges.
pub(crate) fn classify_vertex(
    complex: &CellComplex,
    attracts: &[Vec<bool>],
    edge_flow: &[EdgeFlow],
    vertex: usize,
    boundary: BoundaryMode,
) -> VertexClass {
    let cell = complex.vertex(vertex);
    let cofaces = cell.cofaces();
    let len = cofaces.len();
    if len == 0 {
        return VertexClass::default();
    }
    let on_boundary = cell.is_boundary();

    // face code: bit 0 attracts the preceding edge, bit 1 the following one
    let codes: Vec<u8> = cofaces
        .iter()
        .enumerate()
        .map(|(j, &c)| {
            if j % 2 == 1 {
                let face = c.index();
                let before = complex.edge_position(face, cofaces[j - 1].index());
                let after = complex.edge_position(face, cofaces[(j + 1) % len].index());
                u8::from(attracts[face][before]) | u8::from(attracts[face][after]) << 1
            } else {
                edge_code(complex, c.index(), cell.id(), edge_flow[c.index()])
            }
        })
        .collect();

    let mut counts = SectorCounts::default();
    let mut first_dir = 0u8;
    let mut last_dir = 0u8;
    for (j, &code) in codes.iter().enumerate() {
        let dir = if j % 2 == 0 {
            if code == 0 {
                continue;
            }
            code
        } else {
            if code == 1 || code == 2 {
                continue;
            }
            if code == 3 { STABLE } else { UNSTABLE }
        };
        if first_dir == 0 {
            first_dir = dir;
            last_dir = dir;
            continue;
        }
        if dir == last_dir {
            continue;
        }
        // changes inside a face are always hyperbolic
        let elliptic = j % 2 == 0 && {
            let preceding_attracts_edge = codes[j - 1] >> 1 != 0;
            preceding_attracts_edge == (last_dir == UNSTABLE)
        };
        if last_dir == UNSTABLE {
            counts.unstable += 1;
        } else {
            counts.stable += 1;
        }
        if elliptic {
            counts.elliptic += 1;
        } else {
            counts.hyperbolic += 1;
        }
        last_dir = dir;
    }

    if first_dir == 0 && (boundary == BoundaryMode::Closed || !on_boundary) {
        return VertexClass {
            index: 1,
            index2: 1,
            stationary: true,
            spiral: true,
        };
    }

    if on_boundary {
        if boundary == BoundaryMode::Open {
            return VertexClass::default();
        }
        if last_dir == UNSTABLE {
            counts.unstable += 1;
        } else {
            counts.stable += 1;
        }
        let mut alt = counts;
        let mut forced = false;
        match (codes[0], codes[len - 1]) {
            (UNSTABLE, UNSTABLE) => {
                counts.hyperbolic += 2;
                counts.stable += 1;
                alt.unstable = (alt.unstable - 1).max(1);
                forced = true;
            }
            (UNSTABLE, STABLE) | (STABLE, UNSTABLE) => {
                counts.hyperbolic += 1;
                alt.hyperbolic += 1;
            }
            (STABLE, STABLE) => {
                counts.stable = (counts.stable - 1).max(1);
                alt.hyperbolic += 2;
                alt.unstable += 1;
                forced = true;
            }
            (first, last) => unreachable!(
                "boundary edges of vertex {vertex} carry no sliding flow ({first}, {last})"
            ),
        }
        VertexClass {
            index: counts.index(),
            index2: alt.index(),
            stationary: forced || !counts.is_regular() || !alt.is_regular(),
            spiral: false,
        }
    } else {
        let closing_attracts = codes[len - 1] >> 1 != 0;
        if last_dir != first_dir {
            if first_dir == UNSTABLE {
                counts.stable += 1;
                if closing_attracts {
                    counts.hyperbolic += 1;
                } else {
                    counts.elliptic += 1;
                }
            } else {
                counts.unstable += 1;
                if closing_attracts {
                    counts.elliptic += 1;
                } else {
                    counts.hyperbolic += 1;
                }
            }
        } else if counts.stable == 0 && counts.unstable == 0 {
            if last_dir == STABLE {
                counts.stable += 1;
            } else {
                counts.unstable += 1;
            }
        }
        let index = counts.index();
        VertexClass {
            index,
            index2: index,
            stationary: !counts.is_regular(),
            spiral: false,
        }
    }
}
