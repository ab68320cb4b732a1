use crate::context::Context;
use crate::decomposition::{LabelingFunction, NodeId, TreeDecomposition};
use crate::graph::QueryableHypergraph;
use crate::operation::*;
use crate::sets;
use crate::DecompositionError;
use std::rc::Rc;

/// Caps the number of vertices any node may forget, mirroring
/// [LimitMaximumIntroducedVertexCountOperation].
///
/// A node forgetting more than `limit` vertices of its child's bag gets a
/// chain of fresh nodes between the two whose bags shrink from the child bag
/// chunk by chunk; the link closest to the child drops the remainder chunk.
pub struct LimitMaximumForgottenVertexCountOperation {
    ctx: Rc<Context>,
    limit: usize,
}

impl LimitMaximumForgottenVertexCountOperation {
    pub fn new(ctx: Rc<Context>, limit: usize) -> Self {
        Self { ctx, limit }
    }

    fn chunking(&self, count: usize) -> (usize, usize) {
        let remainder = count % self.limit;
        let first = if remainder > 0 { remainder } else { self.limit };
        let fresh = (count + self.limit - 1) / self.limit - 1;
        (first, fresh)
    }
}

impl ManipulationOperation for LimitMaximumForgottenVertexCountOperation {
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
            .forget_nodes()
            .into_iter()
            .filter(|n| in_scope(scope, n))
            .collect();
        // Structural pre-condition, checked before any mutation.
        for node in nodes.iter() {
            if decomposition.child_size(node)? > 1
                && decomposition.forgotten_vertices(node)?.len() > self.limit
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
            let forgotten = decomposition.forgotten_vertices(&node)?;
            if forgotten.len() <= self.limit {
                continue;
            }
            let (first, fresh_count) = self.chunking(forgotten.len());
            let child = decomposition.children(&node)?[0];
            let base_induced = decomposition.induced_hyperedges(&child)?.clone();
            let mut finish = first;
            let mut content = sets::difference(decomposition.bag(&child)?, &forgotten[..finish]);
            let mut current = decomposition.add_parent(
                &child,
                content.clone(),
                base_induced.restricted_to(&content),
            )?;
            apply_labelings(decomposition, &current, labelings)?;
            created.push(current);
            for _ in 0..fresh_count.saturating_sub(1) {
                let start = finish;
                finish += self.limit;
                content = sets::difference(&content, &forgotten[start..finish]);
                current = decomposition.add_parent(
                    &current,
                    content.clone(),
                    base_induced.restricted_to(&content),
                )?;
                apply_labelings(decomposition, &current, labelings)?;
                created.push(current);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::*;

    fn forgetting_tree(points: usize) -> (MultiHypergraph, TreeDecomposition) {
        let mut g = MultiHypergraph::new();
        let vs = g.add_vertices(points + 1);
        for p in 1..=points {
            g.add_hyperedge(vec![vs[0], vs[p]]).unwrap();
        }
        let mut t = TreeDecomposition::new();
        let root = t.add_root(
            vec![vs[0]],
            FilteredHyperedgeCollection::from_graph(&g).restricted_to(&[vs[0]]),
        );
        t.add_child(&root, vs.clone(), FilteredHyperedgeCollection::from_graph(&g))
            .unwrap();
        (g, t)
    }

    #[test]
    fn every_node_forgets_at_most_the_limit() {
        let (g, mut t) = forgetting_tree(5);
        let op =
            LimitMaximumForgottenVertexCountOperation::new(Rc::new(Context::with_seed(0)), 2);
        let (mut created, mut removed) = (vec![], vec![]);
        op.apply(&g, &mut t, None, &[], &mut created, &mut removed)
            .unwrap();
        assert_eq!(created.len(), 2);
        for node in t.iter_nodes() {
            assert!(t.forgotten_vertices(&node).unwrap().len() <= 2);
        }
        assert_eq!(crate::decomposition::verify(&g, &t, true), vec![]);
    }

    #[test]
    fn reapplication_is_a_fixed_point() {
        let (g, mut t) = forgetting_tree(7);
        let op =
            LimitMaximumForgottenVertexCountOperation::new(Rc::new(Context::with_seed(0)), 3);
        let (mut created, mut removed) = (vec![], vec![]);
        op.apply(&g, &mut t, None, &[], &mut created, &mut removed)
            .unwrap();
        let size_after_first = t.node_size();
        created.clear();
        op.apply(&g, &mut t, None, &[], &mut created, &mut removed)
            .unwrap();
        assert_eq!(t.node_size(), size_after_first);
        assert_eq!(created, vec![]);
    }
}
