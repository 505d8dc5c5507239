//! Face and connectivity algorithms over a [`Graph`] embedding.

use super::{AdjId, Graph, NodeId};
use std::collections::VecDeque;

/// The face traversed by `start`, following `succ(twin(adj))` until it closes.
pub fn face_cycle(g: &Graph, start: AdjId) -> Vec<AdjId> {
    let mut out = vec![start];
    let mut cur = g.face_cycle_succ(start);
    while cur != start {
        out.push(cur);
        cur = g.face_cycle_succ(cur);
    }
    out
}

/// All faces of the embedding. Isolated nodes have no adjacency entries and contribute no cycle.
pub fn faces(g: &Graph) -> Vec<Vec<AdjId>> {
    let mut seen = vec![false; g.adj_capacity()];
    let mut out: Vec<Vec<AdjId>> = Vec::new();
    for e in g.edges() {
        for start in [g.adj_source(e), g.adj_target(e)] {
            if seen[start.index()] {
                continue;
            }
            let cycle = face_cycle(g, start);
            for adj in &cycle {
                seen[adj.index()] = true;
            }
            out.push(cycle);
        }
    }
    out
}

pub fn connected_components(g: &Graph) -> Vec<Vec<NodeId>> {
    let mut seen = vec![false; g.node_capacity()];
    let mut out: Vec<Vec<NodeId>> = Vec::new();
    for root in g.nodes() {
        if seen[root.index()] {
            continue;
        }
        seen[root.index()] = true;
        let mut component = Vec::new();
        let mut queue: VecDeque<NodeId> = VecDeque::from([root]);
        while let Some(v) = queue.pop_front() {
            component.push(v);
            for adj in g.adj_entries(v) {
                let w = g.twin_node(adj);
                if !seen[w.index()] {
                    seen[w.index()] = true;
                    queue.push_back(w);
                }
            }
        }
        component.sort();
        out.push(component);
    }
    out
}

/// Whether the rotation system is internally consistent and describes a planar embedding.
///
/// Planarity is checked with Euler's formula, `V - E + F = 2` for every connected component,
/// counting one face for each isolated node.
pub fn represents_comb_embedding(g: &Graph) -> bool {
    if !is_consistent(g) {
        return false;
    }

    let isolated = g.nodes().filter(|&v| g.degree(v) == 0).count();
    let faces = faces(g).len() + isolated;
    let components = connected_components(g).len();

    let euler = g.node_count() as i64 - g.edge_count() as i64 + faces as i64;
    euler == 2 * components as i64
}

fn is_consistent(g: &Graph) -> bool {
    for e in g.edges() {
        let (src, tgt) = (g.adj_source(e), g.adj_target(e));
        if g.twin(src) != tgt || g.twin(tgt) != src {
            return false;
        }
        if g.edge_of(src) != e || g.edge_of(tgt) != e {
            return false;
        }
        if g.node_of(src) != g.source(e) || g.node_of(tgt) != g.target(e) {
            return false;
        }
        if !g.contains_node(g.source(e)) || !g.contains_node(g.target(e)) {
            return false;
        }
    }

    for v in g.nodes() {
        let mut count = 0usize;
        for adj in g.adj_entries(v) {
            count += 1;
            if count > g.degree(v) {
                return false;
            }
            if g.node_of(adj) != v || g.pred(g.succ(adj)) != adj || !g.contains_adj(adj) {
                return false;
            }
        }
        if count != g.degree(v) {
            return false;
        }
    }
    true
}
