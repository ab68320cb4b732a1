use crate::context::Context;
use crate::decomposition::{LabelingFunction, NodeId, TreeDecomposition};
use crate::graph::QueryableHypergraph;
use crate::operation::*;
use crate::sets;
use crate::DecompositionError;
use std::rc::Rc;

/// Eliminates exchange nodes: between every node and a child whose bag is
/// incomparable with its own, a node carrying the intersection of the two
/// bags is inserted.
///
/// Afterwards no node both introduces and forgets vertices; applying the
/// operation a second time changes nothing.
pub struct ExchangeNodeReplacementOperation {
    ctx: Rc<Context>,
}

impl ExchangeNodeReplacementOperation {
    pub fn new(ctx: Rc<Context>) -> Self {
        Self { ctx }
    }
}

impl ManipulationOperation for ExchangeNodeReplacementOperation {
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
        for node in decomposition.exchange_nodes() {
            if self.ctx.is_terminated() {
                break;
            }
            if !in_scope(scope, &node) {
                continue;
            }
            let child = decomposition.children(&node)?[0];
            let bag = sets::intersection(decomposition.bag(&node)?, decomposition.bag(&child)?);
            let induced = decomposition.induced_hyperedges(&node)?.restricted_to(&bag);
            let fresh = decomposition.add_parent(&child, bag, induced)?;
            apply_labelings(decomposition, &fresh, labelings)?;
            created.push(fresh);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decomposition::NodeKind;
    use crate::graph::*;

    fn exchange_tree() -> (MultiHypergraph, TreeDecomposition) {
        let mut g = MultiHypergraph::new();
        let vs = g.add_vertices(4);
        g.add_hyperedge(vec![vs[0], vs[1]]).unwrap();
        g.add_hyperedge(vec![vs[1], vs[2]]).unwrap();
        g.add_hyperedge(vec![vs[2], vs[3]]).unwrap();
        let mut t = TreeDecomposition::new();
        let root = t.add_root(
            vec![vs[0], vs[1]],
            FilteredHyperedgeCollection::from_graph(&g).restricted_to(&[vs[0], vs[1]]),
        );
        let mid = t
            .add_child(
                &root,
                vec![vs[1], vs[2]],
                FilteredHyperedgeCollection::from_graph(&g).restricted_to(&[vs[1], vs[2]]),
            )
            .unwrap();
        t.add_child(
            &mid,
            vec![vs[2], vs[3]],
            FilteredHyperedgeCollection::from_graph(&g).restricted_to(&[vs[2], vs[3]]),
        )
        .unwrap();
        (g, t)
    }

    #[test]
    fn no_exchange_nodes_remain() {
        let (g, mut t) = exchange_tree();
        let op = ExchangeNodeReplacementOperation::new(Rc::new(Context::with_seed(0)));
        let (mut created, mut removed) = (vec![], vec![]);
        op.apply(&g, &mut t, None, &[], &mut created, &mut removed)
            .unwrap();
        assert_eq!(t.exchange_nodes(), vec![]);
        assert_eq!(created.len(), 2);
        assert_eq!(removed, vec![]);
        assert_eq!(crate::decomposition::verify(&g, &t, true), vec![]);
        for node in created.iter() {
            assert!(matches!(
                t.kind(node).unwrap(),
                NodeKind::Forget | NodeKind::Introduce
            ));
        }
    }

    #[test]
    fn a_second_application_is_a_fixed_point() {
        let (g, mut t) = exchange_tree();
        let op = ExchangeNodeReplacementOperation::new(Rc::new(Context::with_seed(0)));
        let (mut created, mut removed) = (vec![], vec![]);
        op.apply(&g, &mut t, None, &[], &mut created, &mut removed)
            .unwrap();
        let nodes_after_first = t.node_size();
        created.clear();
        op.apply(&g, &mut t, None, &[], &mut created, &mut removed)
            .unwrap();
        assert_eq!(t.node_size(), nodes_after_first);
        assert_eq!(created, vec![]);
    }

    #[test]
    fn scope_limits_the_rewrite() {
        let (g, mut t) = exchange_tree();
        let op = ExchangeNodeReplacementOperation::new(Rc::new(Context::with_seed(0)));
        let (mut created, mut removed) = (vec![], vec![]);
        let untouched: Vec<NodeId> = vec![];
        op.apply(
            &g,
            &mut t,
            Some(&untouched),
            &[],
            &mut created,
            &mut removed,
        )
        .unwrap();
        assert_eq!(created, vec![]);
        assert_eq!(t.exchange_nodes().len(), 2);
    }
}
