use crate::context::Context;
use crate::decomposition::{LabelingFunction, NodeId, TreeDecomposition};
use crate::graph::QueryableHypergraph;
use crate::operation::*;
use crate::sets;
use crate::DecompositionError;
use std::rc::Rc;

/// Enforces subset-maximal bags.
///
/// A node whose bag is contained in its parent's bag is spliced away; a node
/// whose bag contains its parent's bag absorbs the parent.  Passes repeat
/// until nothing changes.
pub struct CompressionOperation {
    ctx: Rc<Context>,
}

impl CompressionOperation {
    pub fn new(ctx: Rc<Context>) -> Self {
        Self { ctx }
    }
}

impl ManipulationOperation for CompressionOperation {
    fn context(&self) -> &Context {
        &self.ctx
    }

    fn is_local(&self) -> bool {
        false
    }

    fn creates_nodes(&self) -> bool {
        false
    }

    fn removes_nodes(&self) -> bool {
        true
    }

    fn modifies_bag_contents(&self) -> bool {
        false
    }

    fn creates_subset_maximal_bags(&self) -> bool {
        true
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
        _labelings: &[Box<dyn LabelingFunction>],
        _created: &mut Vec<NodeId>,
        removed: &mut Vec<NodeId>,
    ) -> Result<(), DecompositionError> {
        loop {
            let mut changed = false;
            for node in decomposition.iter_nodes() {
                if self.ctx.is_terminated() {
                    return Ok(());
                }
                if !decomposition.contains_node(&node) || !in_scope(scope, &node) {
                    continue;
                }
                let parent = match decomposition.parent(&node)? {
                    Some(parent) => parent,
                    None => continue,
                };
                let bag = decomposition.bag(&node)?;
                let parent_bag = decomposition.bag(&parent)?;
                if sets::is_subset(bag, parent_bag) {
                    decomposition.remove_node(&node)?;
                    removed.push(node);
                    changed = true;
                } else if sets::is_subset(parent_bag, bag) {
                    // The node must take the parent's position, otherwise
                    // vertices shared between the parent and its other
                    // children lose their connecting bag.
                    decomposition.swap_with_parent(&node)?;
                    decomposition.remove_node(&parent)?;
                    removed.push(parent);
                    changed = true;
                }
            }
            if !changed {
                break;
            }
        }
        Ok(())
    }
}
