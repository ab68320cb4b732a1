use crate::context::Context;
use crate::decomposition::{Label, LabelingFunction, NodeId, TreeDecomposition, INDUCED_SUBGRAPH_LABEL};
use crate::graph::QueryableHypergraph;
use crate::operation::*;
use crate::sets;
use crate::DecompositionError;
use std::rc::Rc;

/// Attaches to every node the label [INDUCED_SUBGRAPH_LABEL] holding the ids
/// of the hyperedges whose endpoints all lie in the node's bag.
pub struct InducedSubgraphLabelingOperation {
    ctx: Rc<Context>,
}

impl InducedSubgraphLabelingOperation {
    pub fn new(ctx: Rc<Context>) -> Self {
        Self { ctx }
    }
}

impl ManipulationOperation for InducedSubgraphLabelingOperation {
    fn context(&self) -> &Context {
        &self.ctx
    }

    fn is_local(&self) -> bool {
        true
    }

    fn creates_nodes(&self) -> bool {
        false
    }

    fn removes_nodes(&self) -> bool {
        false
    }

    fn modifies_bag_contents(&self) -> bool {
        false
    }

    fn creates_subset_maximal_bags(&self) -> bool {
        false
    }

    fn creates_location_dependent_labels(&self) -> bool {
        true
    }

    fn clone_box(&self) -> Box<dyn ManipulationOperation> {
        Box::new(Self {
            ctx: self.ctx.clone(),
        })
    }

    fn apply(
        &self,
        graph: &dyn QueryableHypergraph,
        decomposition: &mut TreeDecomposition,
        scope: Option<&[NodeId]>,
        labelings: &[Box<dyn LabelingFunction>],
        _created: &mut Vec<NodeId>,
        _removed: &mut Vec<NodeId>,
    ) -> Result<(), DecompositionError> {
        for node in decomposition.iter_nodes() {
            if self.ctx.is_terminated() {
                break;
            }
            if !in_scope(scope, &node) {
                continue;
            }
            let bag = decomposition.bag(&node)?;
            let edges: Vec<_> = graph
                .iter_hyperedges()
                .filter(|e| sets::is_subset(e.sorted_elements(), bag))
                .map(|e| e.id())
                .collect();
            decomposition.set_label(&node, INDUCED_SUBGRAPH_LABEL, Label::EdgeSet(edges))?;
            apply_labelings(decomposition, &node, labelings)?;
        }
        Ok(())
    }
}
