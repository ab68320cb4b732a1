use crate::graph::*;
use crate::DecompositionError;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

/// A mutable multi-hypergraph with balanced computational complexity.
///
/// |                       | Complexity                                                            |
/// | --------------------- | --------------------------------------------------------------------- |
/// | `add_vertex`          | $O(\log \|V\|)$                                                       |
/// | `add_hyperedge`       | $O(k \log \|V\| + k \log \|E\|)$ for an edge of arity $k$             |
/// | `remove_hyperedge`    | $O(k \log \|E\|)$                                                     |
/// | `remove_vertex`       | $O(\log \|V\| + \sum_k)$ over the arities of its incident edges       |
/// | `contains_vertex`     | $O(\log \|V\|)$                                                       |
/// | `is_edge`             | $O(\min(d_u, d_v) \cdot \log \max(d_u, d_v))$ over incidence degrees  |
/// | `copy_neighbors_into` | $O(\sum_k + n \log n)$ over the incident arities                      |
///
/// Duplicate endpoints and parallel edges are permitted; the endpoint order
/// of every hyperedge is preserved as supplied.
#[derive(Clone)]
pub struct MultiHypergraph {
    vid_factory: VertexIdFactory,
    eid_factory: EdgeIdFactory,
    vertices: BTreeSet<VertexId>,
    hyperedges: BTreeMap<EdgeId, Hyperedge>,
    incidences: BTreeMap<VertexId, BTreeSet<EdgeId>>,
}

impl std::fmt::Debug for MultiHypergraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "MultiHypergraph {{")?;
        for v in self.vertices.iter() {
            writeln!(f, "{:?}:", v)?;
            for e in self.incident_hyperedges(v) {
                writeln!(f, "  in {:?} {:?}", e.id(), e.elements())?;
            }
        }
        writeln!(f, "}}")?;
        Ok(())
    }
}

impl GrowableHypergraph for MultiHypergraph {
    fn new() -> Self {
        Self {
            vid_factory: VertexIdFactory::new(),
            eid_factory: EdgeIdFactory::new(),
            vertices: BTreeSet::new(),
            hyperedges: BTreeMap::new(),
            incidences: BTreeMap::new(),
        }
    }

    fn add_vertex(&mut self) -> VertexId {
        let vid = self.vid_factory.one_more();
        self.vertices.insert(vid);
        self.incidences.insert(vid, BTreeSet::new());
        vid
    }

    fn add_vertices(&mut self, count: usize) -> Vec<VertexId> {
        (0..count).map(|_| self.add_vertex()).collect()
    }

    fn add_hyperedge(&mut self, elements: Vec<VertexId>) -> Result<EdgeId, DecompositionError> {
        if let Some(missing) = elements.iter().find(|v| !self.vertices.contains(v)) {
            return Err(DecompositionError::UnknownVertex(*missing));
        }
        let eid = self.eid_factory.one_more();
        let edge = Hyperedge::new(eid, elements);
        for v in edge.sorted_elements() {
            self.incidences.get_mut(v).unwrap().insert(eid);
        }
        self.hyperedges.insert(eid, edge);
        Ok(eid)
    }
}

impl EdgeShrinkableHypergraph for MultiHypergraph {
    fn remove_hyperedge(&mut self, edge: &EdgeId) -> Option<Hyperedge> {
        let removed = self.hyperedges.remove(edge)?;
        for v in removed.sorted_elements() {
            if let Some(incident) = self.incidences.get_mut(v) {
                incident.remove(edge);
            }
        }
        Some(removed)
    }
}

impl VertexShrinkableHypergraph for MultiHypergraph {
    fn remove_vertex(&mut self, vertex: &VertexId) -> Box<dyn Iterator<Item = Hyperedge> + 'static> {
        if !self.vertices.remove(vertex) {
            return Box::new(std::iter::empty());
        }
        let incident = self.incidences.remove(vertex).unwrap_or_default();
        let removed: Vec<Hyperedge> = incident
            .iter()
            .filter_map(|eid| self.remove_hyperedge(eid))
            .collect();
        Box::new(removed.into_iter())
    }
}

impl QueryableHypergraph for MultiHypergraph {
    fn vertex_size(&self) -> usize {
        self.vertices.len()
    }

    fn iter_vertices(&self) -> Box<dyn Iterator<Item = VertexId> + '_> {
        Box::new(self.vertices.iter().copied())
    }

    fn contains_vertex(&self, v: &VertexId) -> bool {
        self.vertices.contains(v)
    }

    fn edge_size(&self) -> usize {
        self.hyperedges.len()
    }

    fn iter_hyperedges(&self) -> Box<dyn Iterator<Item = &Hyperedge> + '_> {
        Box::new(self.hyperedges.values())
    }

    fn incident_hyperedges(&self, v: &VertexId) -> Box<dyn Iterator<Item = &Hyperedge> + '_> {
        match self.incidences.get(v) {
            Some(incident) => Box::new(incident.iter().map(|eid| &self.hyperedges[eid])),
            None => Box::new(std::iter::empty()),
        }
    }

    fn incident_edge_size(&self, v: &VertexId) -> usize {
        self.incidences.get(v).map(|s| s.len()).unwrap_or(0)
    }

    fn is_edge(&self, u: &VertexId, v: &VertexId) -> bool {
        let (a, b) = match (self.incidences.get(u), self.incidences.get(v)) {
            (Some(a), Some(b)) => (a, b),
            _ => return false,
        };
        let (small, large) = if a.len() <= b.len() { (a, b) } else { (b, a) };
        small.iter().any(|eid| large.contains(eid))
    }

    fn neighbor_size(&self, v: &VertexId) -> usize {
        let mut neighbors = vec![];
        self.copy_neighbors_into(v, &mut neighbors);
        neighbors.len()
    }

    fn copy_neighbors_into(&self, v: &VertexId, out: &mut Vec<VertexId>) {
        let incident = match self.incidences.get(v) {
            Some(incident) => incident,
            None => return,
        };
        let start = out.len();
        for eid in incident.iter() {
            out.extend(
                self.hyperedges[eid]
                    .sorted_elements()
                    .iter()
                    .filter(|u| *u != v),
            );
        }
        out[start..].sort_unstable();
        out.dedup();
    }

    fn hyperedge_snapshot(&self) -> Arc<Vec<Hyperedge>> {
        Arc::new(self.hyperedges.values().cloned().collect())
    }
}
