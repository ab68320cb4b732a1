//! In-place rewriting of decompositions into shape normal forms.
//!
//! A manipulation operation is a typed transformation over a
//! [TreeDecomposition](crate::decomposition::TreeDecomposition) declaring its
//! capabilities ahead of time: whether it creates or removes nodes, touches
//! bag contents, keeps bags subset-maximal, and whether labels it produces
//! depend on node locations.  Operations are owned by the algorithm they are
//! handed to and applied in sequence; each re-invokes the supplied labeling
//! functions on every node it creates or modifies.
//!
//! The `scope` parameter restricts an operation to a subset of the current
//! nodes; integrators chaining operations are responsible for threading the
//! created/removed lists from one application into the scope of the next.
//!
//! Every operation observes the cooperative cancellation flag between nodes
//! and bails out early, leaving the decomposition valid.

mod exchange_replacement;
pub use self::exchange_replacement::*;
mod limit_introduced;
pub use self::limit_introduced::*;
mod limit_forgotten;
pub use self::limit_forgotten::*;
mod join_normalization;
pub use self::join_normalization::*;
mod compression;
pub use self::compression::*;
mod induced_subgraph;
pub use self::induced_subgraph::*;

use crate::context::Context;
use crate::decomposition::{LabelingFunction, NodeId, TreeDecomposition};
use crate::graph::QueryableHypergraph;
use crate::DecompositionError;

/// A transformation applied in place to a decomposition.
pub trait ManipulationOperation {
    /// The library instance this operation belongs to.
    fn context(&self) -> &Context;

    /// Whether the transformation only inspects nodes it rewrites.
    fn is_local(&self) -> bool;
    fn creates_nodes(&self) -> bool;
    fn removes_nodes(&self) -> bool;
    fn modifies_bag_contents(&self) -> bool;
    /// Whether every bag this operation creates is subset-maximal.
    fn creates_subset_maximal_bags(&self) -> bool;
    /// Whether labels written by this operation stop being valid when nodes
    /// move; if so, integrators must re-derive labels after later
    /// transformations.
    fn creates_location_dependent_labels(&self) -> bool;

    /// An independent copy of this operation.
    fn clone_box(&self) -> Box<dyn ManipulationOperation>;

    /// Rewrite `decomposition`.
    ///
    /// `scope` limits the rewrite to the listed nodes (`None` means the
    /// whole tree).  Created and removed node ids are appended to the two
    /// output lists.
    fn apply(
        &self,
        graph: &dyn QueryableHypergraph,
        decomposition: &mut TreeDecomposition,
        scope: Option<&[NodeId]>,
        labelings: &[Box<dyn LabelingFunction>],
        created: &mut Vec<NodeId>,
        removed: &mut Vec<NodeId>,
    ) -> Result<(), DecompositionError>;
}

impl Clone for Box<dyn ManipulationOperation> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

pub(crate) fn in_scope(scope: Option<&[NodeId]>, node: &NodeId) -> bool {
    scope.map(|nodes| nodes.contains(node)).unwrap_or(true)
}

/// Recompute every listed labeling on `node` and store the results.
pub(crate) fn apply_labelings(
    decomposition: &mut TreeDecomposition,
    node: &NodeId,
    labelings: &[Box<dyn LabelingFunction>],
) -> Result<(), DecompositionError> {
    for labeling in labelings {
        let label = labeling.compute_label(decomposition.bag(node)?, decomposition.labels(node)?);
        decomposition.set_label(node, labeling.name(), label)?;
    }
    Ok(())
}
