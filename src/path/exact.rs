//! Exact shortest-path oracle over the taxonomy viewed as an undirected
//! graph.
//!
//! Distance between concepts ignores edge orientation (paths may climb
//! and descend), so the engine materializes an undirected unit-weight
//! view once and runs Dijkstra per query with early exit at the target.
//! This is the O(V + E) reference that
//! [`crate::path::AncSplEngine`] is benchmarked against; it is not meant
//! for million-pair workloads.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use petgraph::graph::{NodeIndex, UnGraph};

use crate::cancel::CancelToken;
use crate::error::Result;
use crate::taxonomy::{Taxonomy, VertexId};

/// Exact shortest-path-length engine.
///
/// Works on any built taxonomy; no cache passes required.
#[derive(Debug, Clone)]
pub struct ExactPathEngine<'a> {
    tax: &'a Taxonomy,
    graph: UnGraph<(), ()>,
}

impl<'a> ExactPathEngine<'a> {
    /// Build the undirected view of a taxonomy.
    ///
    /// Node indices coincide with vertex positions; each parent-child arc
    /// becomes one undirected unit edge.
    pub fn new(tax: &'a Taxonomy) -> Self {
        let n = tax.len();
        let mut graph = UnGraph::with_capacity(n, n);
        for _ in 0..n {
            graph.add_node(());
        }
        for (pos, rec) in tax.verts.iter().enumerate() {
            for &p in &rec.parents {
                graph.add_edge(NodeIndex::new(p as usize), NodeIndex::new(pos), ());
            }
        }
        Self { tax, graph }
    }

    /// Exact shortest path length between two vertices, in edges.
    ///
    /// Returns `f64::INFINITY` when the vertices lie in different weakly
    /// connected components. The cancellation token is checked once per
    /// settled vertex.
    pub fn distance(&self, u: VertexId, v: VertexId, cancel: &CancelToken) -> Result<f64> {
        let (up, vp) = (self.tax.pos(u)?, self.tax.pos(v)?);
        if up == vp {
            return Ok(0.0);
        }

        let mut dist = vec![u32::MAX; self.graph.node_count()];
        let mut heap = BinaryHeap::new();
        dist[up] = 0;
        heap.push(Reverse((0u32, up)));

        while let Some(Reverse((d, pos))) = heap.pop() {
            cancel.check()?;
            if pos == vp {
                return Ok(d as f64);
            }
            if d > dist[pos] {
                continue; // stale heap entry
            }
            for adj in self.graph.neighbors(NodeIndex::new(pos)) {
                let next = adj.index();
                let nd = d + 1;
                if nd < dist[next] {
                    dist[next] = nd;
                    heap.push(Reverse((nd, next)));
                }
            }
        }

        Ok(f64::INFINITY)
    }

    /// Evaluate a batch of pairs against the oracle.
    pub fn distances(
        &self,
        pairs: &[(VertexId, VertexId)],
        cancel: &CancelToken,
    ) -> Result<Vec<f64>> {
        pairs
            .iter()
            .map(|&(u, v)| self.distance(u, v, cancel))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn diamond() -> Taxonomy {
        let mut tax = Taxonomy::new();
        tax.add_vertex(0, &[]).unwrap();
        tax.add_vertex(1, &[0]).unwrap();
        tax.add_vertex(2, &[0]).unwrap();
        tax.add_vertex(3, &[1, 2]).unwrap();
        tax
    }

    #[test]
    fn test_diamond_distances() {
        let tax = diamond();
        let engine = ExactPathEngine::new(&tax);
        let token = CancelToken::new();

        assert_eq!(engine.distance(1, 1, &token).unwrap(), 0.0);
        // A -> R -> B (or A -> C -> B): two edges either way.
        assert_eq!(engine.distance(1, 2, &token).unwrap(), 2.0);
        assert_eq!(engine.distance(0, 3, &token).unwrap(), 2.0);
        assert_eq!(engine.distance(0, 1, &token).unwrap(), 1.0);
    }

    #[test]
    fn test_multi_inheritance_shortcut_is_seen() {
        // Chain 0 -> 1 -> 2 -> 3 plus a direct edge 0 -> 3: the undirected
        // search finds the one-edge route.
        let mut tax = Taxonomy::new();
        tax.add_vertex(0, &[]).unwrap();
        tax.add_vertex(1, &[0]).unwrap();
        tax.add_vertex(2, &[1]).unwrap();
        tax.add_vertex(3, &[2, 0]).unwrap();

        let engine = ExactPathEngine::new(&tax);
        let token = CancelToken::new();
        assert_eq!(engine.distance(0, 3, &token).unwrap(), 1.0);
        assert_eq!(engine.distance(1, 3, &token).unwrap(), 2.0);
    }

    #[test]
    fn test_disconnected_components_are_infinitely_far() {
        let mut tax = Taxonomy::new();
        tax.add_vertex(1, &[]).unwrap();
        tax.add_vertex(2, &[]).unwrap();
        let engine = ExactPathEngine::new(&tax);
        let token = CancelToken::new();
        assert_eq!(engine.distance(1, 2, &token).unwrap(), f64::INFINITY);
    }

    #[test]
    fn test_cancellation_propagates() {
        let tax = diamond();
        let engine = ExactPathEngine::new(&tax);
        let token = CancelToken::new();
        token.cancel();
        assert_eq!(engine.distance(1, 2, &token), Err(Error::Cancelled));
    }
}
