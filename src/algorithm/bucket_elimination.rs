use crate::algorithm::ordering::*;
use crate::context::Context;
use crate::decomposition::{LabelingFunction, NodeId, TreeDecomposition};
use crate::graph::*;
use crate::operation::{CompressionOperation, ManipulationOperation};
use crate::sets;
use crate::DecompositionError;
use ahash::RandomState;
use std::collections::HashMap;
use std::rc::Rc;

/// Turns an elimination ordering into a rooted tree decomposition by bucket
/// elimination.
///
/// Every vertex starts with its closed neighborhood as its bucket.  Walking
/// the ordering, the later-ranked part of a vertex's bucket is merged into
/// the bucket of its lowest-ranked member, which also becomes the vertex's
/// tree parent; the vertex's bag is snapshotted at that moment.  Component
/// roots fall out where the later-ranked part is empty; several roots are
/// collected under one fresh empty-bag root, so the result is always a
/// single rooted tree.
///
/// The algorithm owns an ordering engine (advanced min-fill unless replaced),
/// a list of manipulation operations applied to every decomposition it
/// produces, and the labeling functions handed to those operations.
pub struct BucketEliminationAlgorithm {
    ctx: Rc<Context>,
    ordering: Box<dyn OrderingAlgorithm>,
    operations: Vec<Box<dyn ManipulationOperation>>,
    labelings: Vec<Box<dyn LabelingFunction>>,
    compute_induced_edges: bool,
    compression: bool,
}

impl BucketEliminationAlgorithm {
    pub fn new(ctx: Rc<Context>) -> Self {
        let ordering = Box::new(AdvancedMinFillOrderingAlgorithm::new(ctx.clone()));
        Self {
            ctx,
            ordering,
            operations: vec![],
            labelings: vec![],
            compute_induced_edges: true,
            compression: true,
        }
    }

    pub fn context(&self) -> &Context {
        &self.ctx
    }

    /// Replace the ordering engine; the algorithm takes ownership.
    pub fn set_ordering_algorithm(&mut self, ordering: Box<dyn OrderingAlgorithm>) {
        self.ordering = ordering;
    }

    /// Append an operation applied to every decomposition produced; the
    /// algorithm takes ownership.
    pub fn add_operation(&mut self, operation: Box<dyn ManipulationOperation>) {
        self.operations.push(operation);
    }

    pub fn add_operations(&mut self, operations: Vec<Box<dyn ManipulationOperation>>) {
        self.operations.extend(operations);
    }

    pub fn set_operations(&mut self, operations: Vec<Box<dyn ManipulationOperation>>) {
        self.operations = operations;
    }

    /// Register a labeling function handed to every applied operation.
    pub fn add_labeling(&mut self, labeling: Box<dyn LabelingFunction>) {
        self.labelings.push(labeling);
    }

    pub fn is_compute_induced_edges_enabled(&self) -> bool {
        self.compute_induced_edges
    }

    pub fn set_compute_induced_edges_enabled(&mut self, enabled: bool) {
        self.compute_induced_edges = enabled;
    }

    /// Whether produced decompositions keep only subset-maximal bags.
    pub fn is_compression_enabled(&self) -> bool {
        self.compression
    }

    pub fn set_compression_enabled(&mut self, enabled: bool) {
        self.compression = enabled;
    }

    pub fn compute_decomposition<G: QueryableHypergraph>(
        &self,
        graph: &G,
    ) -> Result<TreeDecomposition, DecompositionError> {
        let preprocessed = PreprocessedGraph::new(graph);
        self.compute_decomposition_from(graph, &preprocessed)
    }

    pub fn compute_decomposition_from<G: QueryableHypergraph>(
        &self,
        graph: &G,
        preprocessed: &PreprocessedGraph,
    ) -> Result<TreeDecomposition, DecompositionError> {
        let ordering = self.ordering.compute_ordering(preprocessed);
        let mut decomposition = self.build(graph, preprocessed, &ordering)?;
        self.apply_operations(graph, &mut decomposition)?;
        Ok(decomposition)
    }

    /// The width-bounded retry loop.
    ///
    /// Draws fresh orderings and rebuilds until the maximum bag size
    /// *before* manipulations fits into `max_bag_size`; gives up after
    /// `max_iterations` attempts and reports the failure as an absent
    /// decomposition together with the iterations used.  Manipulation
    /// operations are applied only to the winner.
    pub fn compute_decomposition_with_bound<G: QueryableHypergraph>(
        &self,
        graph: &G,
        max_bag_size: usize,
        max_iterations: usize,
    ) -> Result<(Option<TreeDecomposition>, usize), DecompositionError> {
        let preprocessed = PreprocessedGraph::new(graph);
        let mut iterations = 0;
        while iterations < max_iterations {
            let (ordering, used) =
                self.ordering
                    .compute_ordering_with_bound(&preprocessed, max_bag_size, 1);
            iterations += used;
            if ordering.required_bag_size() > max_bag_size {
                if self.ctx.is_terminated() {
                    return Err(DecompositionError::Interrupted);
                }
                continue;
            }
            let mut decomposition = self.build(graph, &preprocessed, &ordering)?;
            if decomposition.maximum_bag_size() > max_bag_size {
                continue;
            }
            self.apply_operations(graph, &mut decomposition)?;
            return Ok((Some(decomposition), iterations));
        }
        tracing::debug!(
            max_bag_size,
            iterations,
            "no decomposition within the bag-size bound"
        );
        Ok((None, iterations))
    }

    fn build<G: QueryableHypergraph>(
        &self,
        graph: &G,
        preprocessed: &PreprocessedGraph,
        ordering: &VertexOrdering,
    ) -> Result<TreeDecomposition, DecompositionError> {
        let size = ordering.len();
        let mut rank: HashMap<VertexId, usize, RandomState> =
            HashMap::with_capacity_and_hasher(size, RandomState::new());
        for (position, v) in ordering.sequence().iter().enumerate() {
            rank.insert(*v, position);
        }

        let mut buckets: HashMap<VertexId, Vec<VertexId>, RandomState> =
            HashMap::with_capacity_and_hasher(size, RandomState::new());
        for v in ordering.sequence() {
            buckets.insert(*v, preprocessed.closed_neighborhood(v).to_vec());
        }

        let mut bags: HashMap<VertexId, Vec<VertexId>, RandomState> =
            HashMap::with_capacity_and_hasher(size, RandomState::new());
        let mut children: HashMap<VertexId, Vec<VertexId>, RandomState> =
            HashMap::with_capacity_and_hasher(size, RandomState::new());
        let mut roots: Vec<VertexId> = vec![];

        for (position, v) in ordering.sequence().iter().enumerate() {
            if self.ctx.is_terminated() {
                return Err(DecompositionError::Interrupted);
            }
            let bucket = buckets.remove(v).unwrap();
            let relevant: Vec<VertexId> = bucket
                .iter()
                .filter(|u| rank[*u] > position)
                .copied()
                .collect();
            let mut bag = relevant.clone();
            let slot = bag.binary_search(v).unwrap_err();
            bag.insert(slot, *v);
            bags.insert(*v, bag);
            match relevant.iter().min_by_key(|u| rank[*u]) {
                None => roots.push(*v),
                Some(next) => {
                    children.entry(*next).or_default().push(*v);
                    let target = buckets.get_mut(next).unwrap();
                    let merged = sets::union(target, &relevant);
                    *target = merged;
                }
            }
        }

        let snapshot = graph.hyperedge_snapshot();
        let induced_for = |bag: &[VertexId]| {
            if self.compute_induced_edges {
                FilteredHyperedgeCollection::new(snapshot.clone()).restricted_to(bag)
            } else {
                FilteredHyperedgeCollection::empty()
            }
        };

        // Assemble the store top-down.  A unique component root becomes the
        // tree root directly; several components hang under a fresh
        // empty-bag root, as does the empty graph's single node.
        let mut decomposition = TreeDecomposition::new();
        let mut node_of: HashMap<VertexId, NodeId, RandomState> =
            HashMap::with_capacity_and_hasher(size, RandomState::new());
        let mut pending: Vec<VertexId> = vec![];
        match roots.as_slice() {
            [] => {
                decomposition.add_root(vec![], induced_for(&[]));
            }
            [single] => {
                let node = decomposition.add_root(bags[single].clone(), induced_for(&bags[single]));
                node_of.insert(*single, node);
                pending.push(*single);
            }
            several => {
                let fresh = decomposition.add_root(vec![], induced_for(&[]));
                for root in several {
                    let node = decomposition.add_child(
                        &fresh,
                        bags[root].clone(),
                        induced_for(&bags[root]),
                    )?;
                    node_of.insert(*root, node);
                    pending.push(*root);
                }
            }
        }
        while let Some(v) = pending.pop() {
            if self.ctx.is_terminated() {
                return Err(DecompositionError::Interrupted);
            }
            let node = node_of[&v];
            for child in children.get(&v).into_iter().flatten() {
                let fresh =
                    decomposition.add_child(&node, bags[child].clone(), induced_for(&bags[child]))?;
                node_of.insert(*child, fresh);
                pending.push(*child);
            }
        }

        if self.compression {
            let compression = CompressionOperation::new(self.ctx.clone());
            let (mut created, mut removed) = (vec![], vec![]);
            compression.apply(
                graph as &dyn QueryableHypergraph,
                &mut decomposition,
                None,
                &[],
                &mut created,
                &mut removed,
            )?;
        }

        tracing::debug!(
            nodes = decomposition.node_size(),
            width = decomposition.width(),
            "bucket elimination finished"
        );
        Ok(decomposition)
    }

    fn apply_operations<G: QueryableHypergraph>(
        &self,
        graph: &G,
        decomposition: &mut TreeDecomposition,
    ) -> Result<(), DecompositionError> {
        for operation in self.operations.iter() {
            let mut created = vec![];
            let mut removed = vec![];
            operation.apply(
                graph,
                decomposition,
                None,
                &self.labelings,
                &mut created,
                &mut removed,
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decomposition::{verify, Label, LabelMap};
    use crate::operation::*;

    fn algorithm(seed: u64) -> BucketEliminationAlgorithm {
        BucketEliminationAlgorithm::new(Rc::new(Context::with_seed(seed)))
    }

    #[test]
    fn empty_graph_gives_a_single_empty_bag() {
        let g = MultiHypergraph::new();
        let decomposition = algorithm(0).compute_decomposition(&g).unwrap();
        assert_eq!(decomposition.node_size(), 1);
        assert_eq!(decomposition.link_size(), 0);
        let root = decomposition.root().unwrap();
        assert_eq!(decomposition.bag(&root).unwrap(), &[]);
    }

    #[test]
    fn isolated_vertices_are_covered_by_singleton_leaves() {
        let mut g = MultiHypergraph::new();
        g.add_vertices(3);
        let decomposition = algorithm(1).compute_decomposition(&g).unwrap();
        assert_eq!(verify(&g, &decomposition, true), vec![]);
        let leaves = decomposition.leaves();
        assert!(!leaves.is_empty());
        for leaf in leaves {
            assert_eq!(decomposition.bag(&leaf).unwrap().len(), 1);
        }
    }

    #[test]
    fn a_single_vertex_gives_a_singleton_bag() {
        let mut g = MultiHypergraph::new();
        let v = g.add_vertex();
        let decomposition = algorithm(11).compute_decomposition(&g).unwrap();
        assert_eq!(decomposition.node_size(), 1);
        let root = decomposition.root().unwrap();
        assert_eq!(decomposition.bag(&root).unwrap(), &[v]);
    }

    #[test]
    fn limiting_introductions_on_a_path_caps_every_non_leaf_at_one() {
        let mut g = MultiHypergraph::new();
        let vs = g.add_vertices(5);
        for w in vs.windows(2) {
            g.add_hyperedge(vec![w[0], w[1]]).unwrap();
        }
        let ctx = Rc::new(Context::with_seed(12));
        let mut algorithm = BucketEliminationAlgorithm::new(ctx.clone());
        algorithm.add_operation(Box::new(LimitMaximumIntroducedVertexCountOperation::new(
            ctx, 1, false,
        )));
        let decomposition = algorithm.compute_decomposition(&g).unwrap();
        assert_eq!(verify(&g, &decomposition, true), vec![]);
        for node in decomposition.iter_nodes() {
            if decomposition.child_size(&node).unwrap() > 0 {
                assert!(decomposition.introduced_vertices(&node).unwrap().len() <= 1);
            }
        }
    }

    #[test]
    fn a_path_decomposes_with_maximum_bag_two() {
        let mut g = MultiHypergraph::new();
        let vs = g.add_vertices(3);
        g.add_hyperedge(vec![vs[0], vs[1]]).unwrap();
        g.add_hyperedge(vec![vs[1], vs[2]]).unwrap();
        let decomposition = algorithm(2).compute_decomposition(&g).unwrap();
        assert_eq!(verify(&g, &decomposition, true), vec![]);
        assert_eq!(decomposition.maximum_bag_size(), 2);
        let has_bag = |want: &[VertexId]| {
            decomposition
                .iter_nodes()
                .any(|n| decomposition.bag(&n).unwrap() == want)
        };
        assert!(has_bag(&[vs[0], vs[1]]));
        assert!(has_bag(&[vs[1], vs[2]]));
    }

    #[test]
    fn a_clique_compresses_to_a_single_node() {
        let mut g = MultiHypergraph::new();
        let vs = g.add_vertices(5);
        for i in 0..5 {
            for j in i + 1..5 {
                g.add_hyperedge(vec![vs[i], vs[j]]).unwrap();
            }
        }
        let mut algorithm = algorithm(3);
        algorithm.set_compression_enabled(true);
        let decomposition = algorithm.compute_decomposition(&g).unwrap();
        assert_eq!(verify(&g, &decomposition, true), vec![]);
        assert_eq!(decomposition.node_size(), 1);
        assert_eq!(decomposition.link_size(), 0);
        let root = decomposition.root().unwrap();
        assert_eq!(decomposition.bag(&root).unwrap(), vs.as_slice());
    }

    #[test]
    fn a_repeated_endpoint_hyperedge_behaves_as_its_set() {
        let mut g = MultiHypergraph::new();
        let vs = g.add_vertices(3);
        g.add_hyperedge(vec![
            vs[2], vs[2], vs[1], vs[0], vs[1], vs[2], vs[2],
        ])
        .unwrap();
        let mut algorithm = algorithm(4);
        algorithm.set_compute_induced_edges_enabled(false);
        algorithm.set_compression_enabled(true);
        let decomposition = algorithm.compute_decomposition(&g).unwrap();
        assert_eq!(verify(&g, &decomposition, false), vec![]);
        assert_eq!(decomposition.minimum_bag_size(), 3);
        assert_eq!(decomposition.maximum_bag_size(), 3);
    }

    #[test]
    fn disconnected_components_meet_under_an_empty_root() {
        let mut g = MultiHypergraph::new();
        let vs = g.add_vertices(4);
        g.add_hyperedge(vec![vs[0], vs[1]]).unwrap();
        g.add_hyperedge(vec![vs[2], vs[3]]).unwrap();
        let mut algorithm = algorithm(5);
        algorithm.set_compression_enabled(false);
        let decomposition = algorithm.compute_decomposition(&g).unwrap();
        assert_eq!(verify(&g, &decomposition, true), vec![]);
        let root = decomposition.root().unwrap();
        assert_eq!(decomposition.bag(&root).unwrap(), &[]);
        assert!(decomposition.child_size(&root).unwrap() >= 2);
    }

    #[test]
    fn the_bounded_loop_reports_unreachable_bounds() {
        let mut g = MultiHypergraph::new();
        let vs = g.add_vertices(4);
        for i in 0..4 {
            for j in i + 1..4 {
                g.add_hyperedge(vec![vs[i], vs[j]]).unwrap();
            }
        }
        let (decomposition, iterations) = algorithm(6)
            .compute_decomposition_with_bound(&g, 2, 7)
            .unwrap();
        assert!(decomposition.is_none());
        assert_eq!(iterations, 7);
    }

    #[test]
    fn the_bounded_loop_returns_a_fitting_decomposition() {
        let mut g = MultiHypergraph::new();
        let vs = g.add_vertices(6);
        for w in vs.windows(2) {
            g.add_hyperedge(vec![w[0], w[1]]).unwrap();
        }
        let (decomposition, iterations) = algorithm(7)
            .compute_decomposition_with_bound(&g, 2, 10)
            .unwrap();
        let decomposition = decomposition.unwrap();
        assert!(iterations >= 1);
        assert!(decomposition.maximum_bag_size() <= 2);
        assert_eq!(verify(&g, &decomposition, true), vec![]);
    }

    struct BagSizeLabeling;

    impl LabelingFunction for BagSizeLabeling {
        fn name(&self) -> &str {
            "BAG_SIZE"
        }

        fn compute_label(&self, bag: &[VertexId], _existing: &LabelMap) -> Label {
            Label::Size(bag.len())
        }
    }

    #[test]
    fn operations_and_labelings_run_on_the_result() {
        let mut g = MultiHypergraph::new();
        let vs = g.add_vertices(4);
        g.add_hyperedge(vec![vs[0], vs[1]]).unwrap();
        g.add_hyperedge(vec![vs[1], vs[2]]).unwrap();
        g.add_hyperedge(vec![vs[2], vs[3]]).unwrap();
        let ctx = Rc::new(Context::with_seed(8));
        let mut algorithm = BucketEliminationAlgorithm::new(ctx.clone());
        algorithm.add_operation(Box::new(ExchangeNodeReplacementOperation::new(ctx.clone())));
        algorithm.add_operation(Box::new(InducedSubgraphLabelingOperation::new(ctx.clone())));
        algorithm.add_labeling(Box::new(BagSizeLabeling));
        let decomposition = algorithm.compute_decomposition(&g).unwrap();
        assert_eq!(verify(&g, &decomposition, true), vec![]);
        assert_eq!(decomposition.exchange_nodes(), vec![]);
        // The labeling operation touched every node, so the labeling
        // function ran everywhere too.
        for node in decomposition.iter_nodes() {
            let labels = decomposition.labels(&node).unwrap();
            assert_eq!(
                labels.get("BAG_SIZE"),
                Some(&Label::Size(decomposition.bag(&node).unwrap().len()))
            );
            assert!(labels.contains(crate::decomposition::INDUCED_SUBGRAPH_LABEL));
        }
    }

    #[test]
    fn cancellation_interrupts_the_build() {
        let mut g = MultiHypergraph::new();
        let vs = g.add_vertices(6);
        for w in vs.windows(2) {
            g.add_hyperedge(vec![w[0], w[1]]).unwrap();
        }
        let ctx = Rc::new(Context::with_seed(9));
        ctx.termination_handle().terminate();
        let algorithm = BucketEliminationAlgorithm::new(ctx);
        let err = algorithm.compute_decomposition(&g).unwrap_err();
        assert_eq!(err, DecompositionError::Interrupted);
    }

    #[quickcheck_macros::quickcheck]
    fn every_decomposition_is_valid(ops: Ops) {
        let g = ops.build();
        let mut algorithm = algorithm(10);
        algorithm.set_compression_enabled(true);
        let decomposition = algorithm.compute_decomposition(&g).unwrap();
        assert_eq!(verify(&g, &decomposition, true), vec![]);
    }
}
