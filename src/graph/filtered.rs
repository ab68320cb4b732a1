use crate::graph::*;
use std::sync::Arc;

/// An immutable hyperedge snapshot behind a composable bag restriction.
///
/// All collections derived from the same graph share one `Arc` snapshot; a
/// collection itself only stores the indices of the hyperedges that survive
/// its restriction.  [restrict_to](FilteredHyperedgeCollection::restrict_to)
/// composes: an edge survives only if it already survived *and* all its
/// endpoints lie in the new vertex set.
#[derive(Clone)]
pub struct FilteredHyperedgeCollection {
    hyperedges: Arc<Vec<Hyperedge>>,
    selected: Vec<usize>,
}

impl FilteredHyperedgeCollection {
    /// A collection over `hyperedges` with nothing filtered out yet.
    pub fn new(hyperedges: Arc<Vec<Hyperedge>>) -> Self {
        let selected = (0..hyperedges.len()).collect();
        Self {
            hyperedges,
            selected,
        }
    }

    /// An empty collection sharing no snapshot.
    pub fn empty() -> Self {
        Self {
            hyperedges: Arc::new(vec![]),
            selected: vec![],
        }
    }

    pub fn from_graph<G: QueryableHypergraph>(graph: &G) -> Self {
        Self::new(graph.hyperedge_snapshot())
    }

    /// Keep only hyperedges whose endpoints all lie in `allowed`.
    ///
    /// `allowed` must be sorted ascending.
    pub fn restrict_to(&mut self, allowed: &[VertexId]) {
        debug_assert!(allowed.windows(2).all(|w| w[0] < w[1]));
        let hyperedges = &self.hyperedges;
        self.selected
            .retain(|idx| hyperedges[*idx].is_within(allowed));
    }

    /// A copy of this collection restricted to `allowed` (sorted ascending).
    pub fn restricted_to(&self, allowed: &[VertexId]) -> Self {
        let mut res = self.clone();
        res.restrict_to(allowed);
        res
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Hyperedge> + '_ {
        self.selected.iter().map(|idx| &self.hyperedges[*idx])
    }

    pub fn edge_ids(&self) -> Vec<EdgeId> {
        self.iter().map(|e| e.id()).collect()
    }

    pub fn contains(&self, eid: &EdgeId) -> bool {
        self.iter().any(|e| e.id() == *eid)
    }
}

impl std::fmt::Debug for FilteredHyperedgeCollection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.iter().map(|e| (e.id(), e.elements())))
            .finish()
    }
}
