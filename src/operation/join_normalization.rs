use crate::context::Context;
use crate::decomposition::{LabelingFunction, NodeId, TreeDecomposition};
use crate::graph::QueryableHypergraph;
use crate::operation::*;
use crate::DecompositionError;
use std::rc::Rc;

/// Normalizes join nodes: between a join node and every child whose bag
/// differs from its own, a copy of the join bag is inserted.
///
/// Afterwards join nodes neither introduce nor forget vertices, which is
/// what the introduce/forget limit operations rely on.
pub struct JoinNodeNormalizationOperation {
    ctx: Rc<Context>,
}

impl JoinNodeNormalizationOperation {
    pub fn new(ctx: Rc<Context>) -> Self {
        Self { ctx }
    }
}

impl ManipulationOperation for JoinNodeNormalizationOperation {
    fn context(&self) -> &Context {
        &self.ctx
    }

    fn is_local(&self) -> bool {
        true
    }

    fn creates_nodes(&self) -> bool {
        true
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
        false
    }

    fn clone_box(&self) -> Box<dyn ManipulationOperation> {
        Box::new(Self {
            ctx: self.ctx.clone(),
        })
    }

    fn apply(
        &self,
        _graph: &dyn QueryableHypergraph,
        decomposition: &mut TreeDecomposition,
        scope: Option<&[NodeId]>,
        labelings: &[Box<dyn LabelingFunction>],
        created: &mut Vec<NodeId>,
        _removed: &mut Vec<NodeId>,
    ) -> Result<(), DecompositionError> {
        for node in decomposition.join_nodes() {
            if self.ctx.is_terminated() {
                break;
            }
            if !in_scope(scope, &node) {
                continue;
            }
            let bag = decomposition.bag(&node)?.to_vec();
            let induced = decomposition.induced_hyperedges(&node)?.clone();
            for child in decomposition.children(&node)? {
                if decomposition.bag(&child)? == bag.as_slice() {
                    continue;
                }
                let fresh = decomposition.add_parent(&child, bag.clone(), induced.clone())?;
                apply_labelings(decomposition, &fresh, labelings)?;
                created.push(fresh);
            }
        }
        Ok(())
    }
}
