use crate::context::Context;
use crate::decomposition::{LabelingFunction, NodeId, TreeDecomposition};
use crate::graph::QueryableHypergraph;
use crate::operation::*;
use crate::sets;
use crate::DecompositionError;
use std::rc::Rc;

/// Caps the number of vertices any node may introduce.
///
/// A node introducing more than `limit` vertices gets a chain of
/// `⌈count/limit⌉ − 1` fresh nodes between itself and its child, built by
/// cumulative union from the child bag; the first link takes the remainder
/// chunk so every later link introduces exactly `limit` vertices.  Childless
/// nodes grow the same chain downward when `treat_leaves_as_introduce` is
/// set.
///
/// Meeting a node with several children and too many introduced vertices
/// means the pipeline was assembled in the wrong order; the operation then
/// fails before mutating anything.
pub struct LimitMaximumIntroducedVertexCountOperation {
    ctx: Rc<Context>,
    limit: usize,
    treat_leaves_as_introduce: bool,
}

impl LimitMaximumIntroducedVertexCountOperation {
    pub fn new(ctx: Rc<Context>, limit: usize, treat_leaves_as_introduce: bool) -> Self {
        Self {
            ctx,
            limit,
            treat_leaves_as_introduce,
        }
    }

    /// First chunk length and total number of fresh nodes for `count`
    /// introduced vertices.
    fn chunking(&self, count: usize) -> (usize, usize) {
        let remainder = count % self.limit;
        let first = if remainder > 0 { remainder } else { self.limit };
        let fresh = (count + self.limit - 1) / self.limit - 1;
        (first, fresh)
    }
}

impl ManipulationOperation for LimitMaximumIntroducedVertexCountOperation {
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
            limit: self.limit,
            treat_leaves_as_introduce: self.treat_leaves_as_introduce,
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
        if self.limit == 0 {
            return Err(DecompositionError::InvalidLimit);
        }
        let nodes: Vec<NodeId> = decomposition
            .introduce_nodes(self.treat_leaves_as_introduce)
            .into_iter()
            .filter(|n| in_scope(scope, n))
            .collect();
        // Structural pre-condition, checked before any mutation.
        for node in nodes.iter() {
            if decomposition.child_size(node)? > 1
                && decomposition.introduced_vertices(node)?.len() > self.limit
            {
                return Err(DecompositionError::UnexpectedJoinNode {
                    node: *node,
                    child_count: decomposition.child_size(node)?,
                });
            }
        }

        for node in nodes {
            if self.ctx.is_terminated() {
                break;
            }
            let introduced = decomposition.introduced_vertices(&node)?;
            if introduced.len() <= self.limit {
                continue;
            }
            let (first, fresh_count) = self.chunking(introduced.len());
            let children = decomposition.children(&node)?;
            let base_induced = decomposition.induced_hyperedges(&node)?.clone();
            match children.as_slice() {
                [] => {
                    // Grow the chain downward, bags being prefixes of the
                    // introduced vertices.
                    let mut finish = first;
                    let mut current = decomposition.add_child(
                        &node,
                        introduced[..finish].to_vec(),
                        base_induced.restricted_to(&introduced[..finish]),
                    )?;
                    apply_labelings(decomposition, &current, labelings)?;
                    created.push(current);
                    for _ in 0..fresh_count.saturating_sub(1) {
                        finish += self.limit;
                        current = decomposition.add_parent(
                            &current,
                            introduced[..finish].to_vec(),
                            base_induced.restricted_to(&introduced[..finish]),
                        )?;
                        apply_labelings(decomposition, &current, labelings)?;
                        created.push(current);
                    }
                }
                [child] => {
                    let child_bag = decomposition.bag(child)?.to_vec();
                    let mut finish = first;
                    let mut content = sets::union(&child_bag, &introduced[..finish]);
                    let mut current = decomposition.add_parent(
                        child,
                        content.clone(),
                        base_induced.restricted_to(&content),
                    )?;
                    apply_labelings(decomposition, &current, labelings)?;
                    created.push(current);
                    for _ in 0..fresh_count.saturating_sub(1) {
                        let start = finish;
                        finish += self.limit;
                        content = sets::union(&content, &introduced[start..finish]);
                        current = decomposition.add_parent(
                            &current,
                            content.clone(),
                            base_induced.restricted_to(&content),
                        )?;
                        apply_labelings(decomposition, &current, labelings)?;
                        created.push(current);
                    }
                }
                _ => unreachable!("checked above"),
            }
        }
        Ok(())
    }
}
