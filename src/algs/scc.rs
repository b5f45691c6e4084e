//! Strongly connected components of the flow graph.
//!
//! Tarjan's algorithm driven by an explicit stack of (node, next arc) frames,
//! so deep graphs on fine meshes cannot overflow the call stack.

use super::arena::{GraphArena, NodeId};

const UNVISITED: u32 = u32::MAX;

/// Components in the order Tarjan completes them: every component comes
/// before the components that reach it.
pub fn strongly_connected_components(arena: &GraphArena) -> Vec<Vec<NodeId>> {
    let slots = arena.slot_count();
    let mut index = vec![UNVISITED; slots];
    let mut low = vec![0u32; slots];
    let mut on_stack = vec![false; slots];
    let mut stack: Vec<NodeId> = Vec::new();
    let mut frames: Vec<(NodeId, usize)> = Vec::new();
    let mut components = Vec::new();
    let mut next = 0u32;

    for root in arena.node_ids() {
        if index[root.index()] != UNVISITED {
            continue;
        }
        index[root.index()] = next;
        low[root.index()] = next;
        next += 1;
        stack.push(root);
        on_stack[root.index()] = true;
        frames.push((root, 0));

        while let Some((v, i)) = frames.pop() {
            let vi = v.index();
            if let Some(&a) = arena.node(v).outgoing().get(i) {
                frames.push((v, i + 1));
                let w = arena.arc(a).to();
                let wi = w.index();
                if index[wi] == UNVISITED {
                    index[wi] = next;
                    low[wi] = next;
                    next += 1;
                    stack.push(w);
                    on_stack[wi] = true;
                    frames.push((w, 0));
                } else if on_stack[wi] {
                    low[vi] = low[vi].min(index[wi]);
                }
                continue;
            }

            if let Some(&(parent, _)) = frames.last() {
                let pi = parent.index();
                low[pi] = low[pi].min(low[vi]);
            }
            if low[vi] == index[vi] {
                let mut component = Vec::new();
                while let Some(w) = stack.pop() {
                    on_stack[w.index()] = false;
                    component.push(w);
                    if w == v {
                        break;
                    }
                }
                components.push(component);
            }
        }
    }
    components
}

/// Number the Morse sets: components with more than one node, or a single
/// vertex node for which `stationary` holds. Every other node is cleared.
/// Returns the count.
pub(crate) fn assign_morse_sets(
    arena: &mut GraphArena,
    stationary: impl Fn(usize) -> bool,
) -> usize {
    let components = strongly_connected_components(arena);
    let ids: Vec<NodeId> = arena.node_ids().collect();
    for id in ids {
        arena.node_mut(id).morse_set = None;
    }
    let mut count = 0;
    for component in components {
        let recurrent = component.len() > 1 || {
            let node = arena.node(component[0]);
            node.is_vertex() && stationary(node.owner().index())
        };
        if !recurrent {
            continue;
        }
        for &id in &component {
            arena.node_mut(id).morse_set = Some(count);
        }
        count += 1;
    }
    log::debug!("{count} Morse sets");
    count
}
