use crate::algorithm::BucketEliminationAlgorithm;
use crate::context::Context;
use crate::decomposition::{Label, TreeDecomposition, COVERING_EDGES_LABEL};
use crate::graph::*;
use crate::sets;
use crate::DecompositionError;
use std::rc::Rc;

/// Hypertree decompositions: a tree decomposition whose nodes additionally
/// carry a set of hyperedges covering their bag.
///
/// Covers are built greedily — the hyperedge covering the most still-exposed
/// bag vertices is taken first, smallest id winning ties — and stored under
/// [COVERING_EDGES_LABEL].  The hypertree width is the largest cover size.
pub struct HypertreeDecompositionAlgorithm {
    base: BucketEliminationAlgorithm,
}

impl HypertreeDecompositionAlgorithm {
    pub fn new(ctx: Rc<Context>) -> Self {
        Self {
            base: BucketEliminationAlgorithm::new(ctx),
        }
    }

    pub fn context(&self) -> &Context {
        self.base.context()
    }

    pub fn base_mut(&mut self) -> &mut BucketEliminationAlgorithm {
        &mut self.base
    }

    pub fn compute_decomposition<G: QueryableHypergraph>(
        &self,
        graph: &G,
    ) -> Result<TreeDecomposition, DecompositionError> {
        let mut decomposition = self.base.compute_decomposition(graph)?;
        for node in decomposition.iter_nodes() {
            if self.context().is_terminated() {
                return Err(DecompositionError::Interrupted);
            }
            let bag = decomposition.bag(&node)?.to_vec();
            let cover = greedy_cover(graph, &bag);
            decomposition.set_label(&node, COVERING_EDGES_LABEL, Label::EdgeSet(cover))?;
        }
        Ok(decomposition)
    }
}

/// The largest covering-edge set attached to any node.
pub fn hypertree_width(decomposition: &TreeDecomposition) -> usize {
    decomposition
        .iter_nodes()
        .filter_map(|n| match decomposition.labels(&n).unwrap().get(COVERING_EDGES_LABEL) {
            Some(Label::EdgeSet(edges)) => Some(edges.len()),
            _ => None,
        })
        .max()
        .unwrap_or(0)
}

/// Greedy set cover of `bag` by hyperedge endpoint sets.
///
/// Bag vertices incident to no hyperedge cannot be covered and are skipped.
fn greedy_cover<G: QueryableHypergraph>(graph: &G, bag: &[VertexId]) -> Vec<EdgeId> {
    let mut exposed: Vec<VertexId> = bag
        .iter()
        .filter(|v| graph.incident_edge_size(v) > 0)
        .copied()
        .collect();
    let mut cover = vec![];
    while !exposed.is_empty() {
        let mut best: Option<(usize, EdgeId, &Hyperedge)> = None;
        for e in graph.iter_hyperedges() {
            let gain = sets::intersection_size(e.sorted_elements(), &exposed);
            let better = match best {
                None => gain > 0,
                Some((best_gain, best_id, _)) => {
                    gain > best_gain || (gain == best_gain && e.id() < best_id)
                }
            };
            if better {
                best = Some((gain, e.id(), e));
            }
        }
        match best {
            None => break,
            Some((_, id, e)) => {
                cover.push(id);
                exposed = sets::difference(&exposed, e.sorted_elements());
            }
        }
    }
    cover
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decomposition::verify;

    #[test]
    fn every_bag_is_covered_by_its_edges() {
        let mut g = MultiHypergraph::new();
        let vs = g.add_vertices(5);
        g.add_hyperedge(vec![vs[0], vs[1], vs[2]]).unwrap();
        g.add_hyperedge(vec![vs[2], vs[3]]).unwrap();
        g.add_hyperedge(vec![vs[3], vs[4]]).unwrap();
        let algorithm = HypertreeDecompositionAlgorithm::new(Rc::new(Context::with_seed(3)));
        let decomposition = algorithm.compute_decomposition(&g).unwrap();
        assert_eq!(verify(&g, &decomposition, true), vec![]);
        for node in decomposition.iter_nodes() {
            let bag = decomposition.bag(&node).unwrap().to_vec();
            let cover = match decomposition
                .labels(&node)
                .unwrap()
                .get(COVERING_EDGES_LABEL)
            {
                Some(Label::EdgeSet(edges)) => edges.clone(),
                other => panic!("missing cover label: {:?}", other),
            };
            let mut covered: Vec<VertexId> = vec![];
            for id in cover {
                let edge = g.iter_hyperedges().find(|e| e.id() == id).unwrap();
                covered = sets::union(&covered, edge.sorted_elements());
            }
            for v in bag {
                assert!(covered.binary_search(&v).is_ok());
            }
        }
        assert!(hypertree_width(&decomposition) >= 1);
    }

    #[test]
    fn a_single_hyperedge_covers_its_whole_bag() {
        let mut g = MultiHypergraph::new();
        let vs = g.add_vertices(4);
        g.add_hyperedge(vec![vs[0], vs[1], vs[2], vs[3]]).unwrap();
        let algorithm = HypertreeDecompositionAlgorithm::new(Rc::new(Context::with_seed(4)));
        let decomposition = algorithm.compute_decomposition(&g).unwrap();
        assert_eq!(hypertree_width(&decomposition), 1);
    }
}
