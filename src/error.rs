use crate::decomposition::NodeId;
use crate::graph::VertexId;
use thiserror::Error;

/// Errors surfaced by the decomposition engine.
///
/// Two of the three failure classes show up here: pre-condition violations
/// (unknown ids, reserved label names, zero limits) and structural violations
/// inside manipulation operations (a limit operation meeting a multi-child
/// node).  Both indicate caller bugs; the offending call returns without
/// mutating its target.  Failing to reach a requested bag size within the
/// iteration budget is *not* an error — the retry loops report it as an
/// absent decomposition together with the iteration count.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecompositionError {
    #[error("vertex {0:?} is not part of the graph")]
    UnknownVertex(VertexId),
    #[error("node {0:?} is not part of the decomposition")]
    UnknownNode(NodeId),
    #[error("node {0:?} has no parent")]
    MissingParent(NodeId),
    #[error("label name `{0}` is reserved")]
    ReservedLabelName(String),
    #[error("node {node:?} has {child_count} children but the operation requires at most one; run join-node normalization first")]
    UnexpectedJoinNode { node: NodeId, child_count: usize },
    #[error("the limit must be positive")]
    InvalidLimit,
    #[error("the computation was cancelled")]
    Interrupted,
}
