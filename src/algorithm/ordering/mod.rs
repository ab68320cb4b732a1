//! Vertex elimination orderings.
//!
//! All engines share one contract: given the preprocessed neighbor lists they
//! append a full permutation of the live vertices and report the bag-size
//! upper bound the ordering requires — the largest closed neighborhood met at
//! any elimination step.  The only nondeterminism is the uniform tie-break
//! draw from the per-instance random source; with a fixed seed the output is
//! reproducible.
//!
//! Engines cannot fail.  They observe the cooperative cancellation flag on
//! the outer per-vertex loop and bail out by completing the permutation with
//! the remaining vertices in working-set order.

mod min_degree;
pub use self::min_degree::*;
mod min_fill;
pub use self::min_fill::*;
mod advanced_min_fill;
pub use self::advanced_min_fill::*;

use crate::context::Context;
use crate::graph::{PreprocessedGraph, VertexId};
use ahash::RandomState;
use std::collections::HashMap;

/// An elimination ordering together with the bag size it requires.
///
/// The bound is `max_i (1 + |{u ∈ N_i(v_i) : π⁻¹(u) > i}|)` where `N_i` is
/// the neighborhood at elimination step `i`; bucket elimination driven by
/// this ordering produces no larger bag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VertexOrdering {
    sequence: Vec<VertexId>,
    required_bag_size: usize,
}

impl VertexOrdering {
    pub fn new(sequence: Vec<VertexId>, required_bag_size: usize) -> Self {
        Self {
            sequence,
            required_bag_size,
        }
    }

    pub fn sequence(&self) -> &[VertexId] {
        &self.sequence
    }

    pub fn required_bag_size(&self) -> usize {
        self.required_bag_size
    }

    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }
}

/// The contract every ordering engine satisfies.
pub trait OrderingAlgorithm {
    /// The library instance this algorithm belongs to.
    fn context(&self) -> &Context;

    /// Append a full elimination ordering to `target` and return the
    /// required bag size.
    fn write_ordering_to(
        &self,
        preprocessed: &PreprocessedGraph,
        target: &mut Vec<VertexId>,
    ) -> usize;

    fn compute_ordering(&self, preprocessed: &PreprocessedGraph) -> VertexOrdering {
        let mut sequence = Vec::with_capacity(preprocessed.vertex_size());
        let required_bag_size = self.write_ordering_to(preprocessed, &mut sequence);
        VertexOrdering::new(sequence, required_bag_size)
    }

    /// Retry with fresh tie-break draws until the required bag size fits.
    ///
    /// Returns the best ordering seen together with the number of draws
    /// used.  A result with `required_bag_size > max_bag_size` signals that
    /// no fitting ordering was found within `max_iterations`.
    fn compute_ordering_with_bound(
        &self,
        preprocessed: &PreprocessedGraph,
        max_bag_size: usize,
        max_iterations: usize,
    ) -> (VertexOrdering, usize) {
        let mut best: Option<VertexOrdering> = None;
        let mut iterations = 0;
        loop {
            iterations += 1;
            let ordering = self.compute_ordering(preprocessed);
            let improved = best
                .as_ref()
                .map(|b| ordering.required_bag_size() < b.required_bag_size())
                .unwrap_or(true);
            if improved {
                best = Some(ordering);
            }
            let current = best.as_ref().unwrap();
            if current.required_bag_size() <= max_bag_size
                || iterations >= max_iterations
                || self.context().is_terminated()
            {
                return (best.unwrap(), iterations);
            }
        }
    }
}

/// Number of edges among `vertices`, read off their sorted closed
/// neighborhoods.
///
/// For each member only the pairs with later members are counted, so every
/// edge contributes exactly once.
pub(crate) fn edge_count_among(
    neighborhoods: &HashMap<VertexId, Vec<VertexId>, RandomState>,
    vertices: &[VertexId],
) -> usize {
    let mut res = 0;
    for (idx, v) in vertices.iter().enumerate() {
        let neighborhood = &neighborhoods[v];
        let later = &vertices[idx + 1..];
        let above = neighborhood.partition_point(|x| x <= v);
        res += crate::sets::intersection_size(later, &neighborhood[above..]);
    }
    res
}

/// The fill value of a vertex: non-edges among its closed neighborhood.
pub(crate) fn fill_value(
    neighborhoods: &HashMap<VertexId, Vec<VertexId>, RandomState>,
    closed_neighborhood: &[VertexId],
) -> usize {
    let size = closed_neighborhood.len();
    size * (size.saturating_sub(1)) / 2 - edge_count_among(neighborhoods, closed_neighborhood)
}

/// Append `remaining` to `target`, in the given order, and fold their
/// step-wise closed-neighborhood sizes into the running bag-size bound.
pub(crate) fn append_tail(
    neighborhoods: &HashMap<VertexId, Vec<VertexId>, RandomState>,
    remaining: impl Iterator<Item = VertexId>,
    target: &mut Vec<VertexId>,
    mut required: usize,
) -> usize {
    let mut appended: std::collections::HashSet<VertexId, RandomState> =
        std::collections::HashSet::with_hasher(RandomState::new());
    for v in remaining {
        let contribution = match neighborhoods.get(&v) {
            Some(neighborhood) => neighborhood.iter().filter(|u| !appended.contains(u)).count(),
            None => 1,
        };
        required = required.max(contribution);
        appended.insert(v);
        target.push(v);
    }
    required
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::graph::*;

    /// Simulate bucket elimination over `ordering` and return the largest
    /// closed neighborhood met, computed the slow way.
    pub(crate) fn naive_required_bag_size(graph: &MultiHypergraph, ordering: &[VertexId]) -> usize {
        let pre = PreprocessedGraph::new(graph);
        let mut neighborhoods: HashMap<VertexId, Vec<VertexId>, RandomState> =
            HashMap::with_hasher(RandomState::new());
        for v in graph.iter_vertices() {
            neighborhoods.insert(v, pre.closed_neighborhood(&v).to_vec());
        }
        let mut required = 0;
        for s in ordering {
            let selected = neighborhoods.remove(s).unwrap();
            required = required.max(selected.len());
            for u in selected.iter().filter(|u| *u != s) {
                let mut merged = crate::sets::union(&neighborhoods[u], &selected);
                let pos = merged.binary_search(s).unwrap();
                merged.remove(pos);
                neighborhoods.insert(*u, merged);
            }
        }
        required
    }

    pub(crate) fn assert_is_permutation(graph: &MultiHypergraph, ordering: &VertexOrdering) {
        let mut seen: Vec<VertexId> = ordering.sequence().to_vec();
        seen.sort_unstable();
        let mut expected: Vec<VertexId> = graph.iter_vertices().collect();
        expected.sort_unstable();
        assert_eq!(seen, expected);
    }

    #[test]
    fn edge_count_among_counts_each_edge_once() {
        let mut g = MultiHypergraph::new();
        let vs = g.add_vertices(4);
        g.add_hyperedge(vec![vs[0], vs[1]]).unwrap();
        g.add_hyperedge(vec![vs[1], vs[2]]).unwrap();
        g.add_hyperedge(vec![vs[0], vs[2]]).unwrap();
        let pre = PreprocessedGraph::new(&g);
        let mut neighborhoods = HashMap::with_hasher(RandomState::new());
        for v in g.iter_vertices() {
            neighborhoods.insert(v, pre.closed_neighborhood(&v).to_vec());
        }
        assert_eq!(edge_count_among(&neighborhoods, &[vs[0], vs[1], vs[2]]), 3);
        assert_eq!(edge_count_among(&neighborhoods, &[vs[0], vs[1], vs[3]]), 1);
        assert_eq!(fill_value(&neighborhoods, &[vs[0], vs[1], vs[2]]), 0);
    }
}
