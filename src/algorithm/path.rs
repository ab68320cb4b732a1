use crate::algorithm::BucketEliminationAlgorithm;
use crate::context::Context;
use crate::decomposition::{LabelingFunction, TreeDecomposition};
use crate::graph::*;
use crate::operation::ManipulationOperation;
use crate::DecompositionError;
use ahash::RandomState;
use std::collections::HashMap;
use std::rc::Rc;

/// Path decompositions by post-processing a tree decomposition.
///
/// The underlying tree decomposition is laid out in depth-first preorder and
/// every bag is widened by the vertices that occur both earlier and later in
/// the layout, which restores the running intersection property on the
/// resulting chain.  The algorithm's own manipulation operations are applied
/// after linearization.
pub struct PostProcessingPathDecompositionAlgorithm {
    ctx: Rc<Context>,
    base: BucketEliminationAlgorithm,
    operations: Vec<Box<dyn ManipulationOperation>>,
    labelings: Vec<Box<dyn LabelingFunction>>,
}

impl PostProcessingPathDecompositionAlgorithm {
    pub fn new(ctx: Rc<Context>) -> Self {
        let base = BucketEliminationAlgorithm::new(ctx.clone());
        Self {
            ctx,
            base,
            operations: vec![],
            labelings: vec![],
        }
    }

    pub fn context(&self) -> &Context {
        &self.ctx
    }

    pub fn add_operation(&mut self, operation: Box<dyn ManipulationOperation>) {
        self.operations.push(operation);
    }

    pub fn add_labeling(&mut self, labeling: Box<dyn LabelingFunction>) {
        self.labelings.push(labeling);
    }

    pub fn compute_decomposition<G: QueryableHypergraph>(
        &self,
        graph: &G,
    ) -> Result<TreeDecomposition, DecompositionError> {
        let tree = self.base.compute_decomposition(graph)?;
        let mut path = self.linearize(graph, &tree)?;
        for operation in self.operations.iter() {
            let mut created = vec![];
            let mut removed = vec![];
            operation.apply(
                graph as &dyn QueryableHypergraph,
                &mut path,
                None,
                &self.labelings,
                &mut created,
                &mut removed,
            )?;
        }
        Ok(path)
    }

    fn linearize<G: QueryableHypergraph>(
        &self,
        graph: &G,
        tree: &TreeDecomposition,
    ) -> Result<TreeDecomposition, DecompositionError> {
        let layout = tree.dfs_preorder();
        let mut first_occurrence: HashMap<VertexId, usize, RandomState> =
            HashMap::with_hasher(RandomState::new());
        let mut last_occurrence: HashMap<VertexId, usize, RandomState> =
            HashMap::with_hasher(RandomState::new());
        for (position, node) in layout.iter().enumerate() {
            for v in tree.bag(node)? {
                first_occurrence.entry(*v).or_insert(position);
                last_occurrence.insert(*v, position);
            }
        }

        let snapshot = graph.hyperedge_snapshot();
        let mut path = TreeDecomposition::new();
        let mut previous = None;
        for position in 0..layout.len() {
            if self.ctx.is_terminated() {
                return Err(DecompositionError::Interrupted);
            }
            let mut bag: Vec<VertexId> = first_occurrence
                .iter()
                .filter(|(v, first)| **first <= position && position <= last_occurrence[*v])
                .map(|(v, _)| *v)
                .collect();
            bag.sort_unstable();
            let induced = if self.base.is_compute_induced_edges_enabled() {
                FilteredHyperedgeCollection::new(snapshot.clone()).restricted_to(&bag)
            } else {
                FilteredHyperedgeCollection::empty()
            };
            previous = Some(match previous {
                None => path.add_root(bag, induced),
                Some(prev) => path.add_child(&prev, bag, induced)?,
            });
        }
        if path.is_empty() {
            path.add_root(vec![], FilteredHyperedgeCollection::empty());
        }
        Ok(path)
    }
}
