use crate::graph::*;
use std::sync::Arc;

/// A trait for growable multi-hypergraphs.
pub trait GrowableHypergraph {
    /// Generate a new and empty hypergraph.
    fn new() -> Self;
    /// Add a new vertex into the hypergraph.
    fn add_vertex(&mut self) -> VertexId;
    /// Add `count` new vertices into the hypergraph.
    fn add_vertices(&mut self, count: usize) -> Vec<VertexId>;
    /// Add a new hyperedge over the given endpoints.
    ///
    /// The endpoint order is preserved as supplied; duplicates are permitted.
    /// If any endpoint is not a live vertex, nothing is changed and the error
    /// names the offending vertex.
    fn add_hyperedge(&mut self, elements: Vec<VertexId>) -> Result<EdgeId, crate::DecompositionError>;
}

/// A trait for hypergraphs whose edges can be removed.
pub trait EdgeShrinkableHypergraph {
    /// Remove a hyperedge from the hypergraph.
    ///
    /// If the edge ID is not in the hypergraph, `None` is returned;
    /// otherwise, it returns the complete removed hyperedge.
    fn remove_hyperedge(&mut self, edge: &EdgeId) -> Option<Hyperedge>;
}

/// A trait for hypergraphs whose vertices can be removed.
pub trait VertexShrinkableHypergraph: EdgeShrinkableHypergraph {
    /// Remove a vertex from the hypergraph and all hyperedges incident to it.
    ///
    /// It returns an iterator over all removed hyperedges; each occurs
    /// exactly once, regardless of endpoint multiplicity.
    ///
    /// If the vertex is not in the hypergraph, it returns an empty iterator.
    fn remove_vertex(&mut self, vertex: &VertexId) -> Box<dyn Iterator<Item = Hyperedge> + 'static>;
}

/// A trait for querying vertices and hyperedges of multi-hypergraphs.
///
/// This is the read-only view the decomposition engine works against.
/// Implementations must stay referentially transparent for the duration of a
/// decomposition call.
pub trait QueryableHypergraph {
    /// Number of vertices in the hypergraph.
    fn vertex_size(&self) -> usize;
    /// Iteration over all vertices in the hypergraph.
    fn iter_vertices(&self) -> Box<dyn Iterator<Item = VertexId> + '_>;
    /// Whether a vertex is in the hypergraph or not.
    fn contains_vertex(&self, v: &VertexId) -> bool;

    /// Number of hyperedges in the hypergraph.
    fn edge_size(&self) -> usize;
    /// Iteration over all hyperedges in the hypergraph.
    fn iter_hyperedges(&self) -> Box<dyn Iterator<Item = &Hyperedge> + '_>;
    /// Iteration over all hyperedges incident to the vertex `v`.
    fn incident_hyperedges(&self, v: &VertexId) -> Box<dyn Iterator<Item = &Hyperedge> + '_>;
    /// Number of hyperedges incident to the vertex `v`.
    fn incident_edge_size(&self, v: &VertexId) -> usize;

    /// Whether some hyperedge contains both `u` and `v`.
    fn is_edge(&self, u: &VertexId, v: &VertexId) -> bool;
    /// Number of distinct neighbors of `v`, excluding `v` itself.
    fn neighbor_size(&self, v: &VertexId) -> usize;
    /// Append the neighbors of `v` to `out`, sorted ascending, excluding `v`.
    fn copy_neighbors_into(&self, v: &VertexId, out: &mut Vec<VertexId>);

    /// A shared snapshot of all hyperedges, in ascending id order.
    ///
    /// The snapshot backs [FilteredHyperedgeCollection](super::FilteredHyperedgeCollection)
    /// instances, which all restrict the same immutable vector.
    fn hyperedge_snapshot(&self) -> Arc<Vec<Hyperedge>>;
}
