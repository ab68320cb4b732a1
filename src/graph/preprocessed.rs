use crate::graph::*;
use ahash::RandomState;
use std::collections::HashMap;

/// Per-vertex sorted neighbor lists, materialised once per ordering call.
///
/// Every list is the *closed* neighborhood: sorted ascending, deduplicated,
/// with the vertex itself inserted at its sorted position.  That makes the
/// list directly usable as the initial bucket of bucket elimination and as
/// the working neighborhood the ordering engines copy and then mutate.
///
/// Construction is $O(\|V\| + \sum_v \deg(v))$; the result is immutable.
pub struct PreprocessedGraph {
    vertices: Vec<VertexId>,
    closed_neighborhoods: HashMap<VertexId, Vec<VertexId>, RandomState>,
}

impl PreprocessedGraph {
    pub fn new<G: QueryableHypergraph>(graph: &G) -> Self {
        let vertices: Vec<VertexId> = graph.iter_vertices().collect();
        let mut closed_neighborhoods =
            HashMap::with_capacity_and_hasher(vertices.len(), RandomState::new());
        for v in vertices.iter() {
            let mut neighborhood = Vec::with_capacity(graph.neighbor_size(v) + 1);
            graph.copy_neighbors_into(v, &mut neighborhood);
            let position = neighborhood.binary_search(v).unwrap_or_else(|pos| pos);
            neighborhood.insert(position, *v);
            closed_neighborhoods.insert(*v, neighborhood);
        }
        Self {
            vertices,
            closed_neighborhoods,
        }
    }

    pub fn vertex_size(&self) -> usize {
        self.vertices.len()
    }

    pub fn vertices(&self) -> &[VertexId] {
        &self.vertices
    }

    /// The sorted neighborhood of `v` including `v` itself.
    pub fn closed_neighborhood(&self, v: &VertexId) -> &[VertexId] {
        &self.closed_neighborhoods[v]
    }
}
