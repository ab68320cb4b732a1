use crate::graph::{EdgeId, VertexId};
use crate::DecompositionError;
use std::collections::BTreeMap;

/// Name of the label slot under which bag contents would live; user labels
/// may not shadow it.
pub const BAG_LABEL: &str = "Bag";

/// Name of the label attached by
/// [InducedSubgraphLabelingOperation](crate::operation::InducedSubgraphLabelingOperation).
pub const INDUCED_SUBGRAPH_LABEL: &str = "Induced Subgraph";

/// Name of the label attached by
/// [HypertreeDecompositionAlgorithm](crate::algorithm::HypertreeDecompositionAlgorithm).
pub const COVERING_EDGES_LABEL: &str = "Covering Edges";

/// A value attachable to a decomposition node under a name.
///
/// The engine never interprets label values; it only stores, copies, swaps,
/// and transfers them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Label {
    Size(usize),
    VertexSet(Vec<VertexId>),
    EdgeSet(Vec<EdgeId>),
}

/// The name-keyed labels of one decomposition node.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelMap {
    labels: BTreeMap<String, Label>,
}

impl LabelMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&Label> {
        self.labels.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.labels.contains_key(name)
    }

    /// Store `label` under `name`, replacing any previous value.
    ///
    /// Storing under a reserved name is a pre-condition violation and leaves
    /// the map untouched.
    pub fn set(&mut self, name: &str, label: Label) -> Result<(), DecompositionError> {
        if name == BAG_LABEL {
            return Err(DecompositionError::ReservedLabelName(name.to_owned()));
        }
        self.labels.insert(name.to_owned(), label);
        Ok(())
    }

    pub fn remove(&mut self, name: &str) -> Option<Label> {
        self.labels.remove(name)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Label)> + '_ {
        self.labels.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// A pure function deriving a label from a bag and the labels already
/// present on a node.
///
/// Manipulation operations re-invoke every listed labeling function on every
/// node they create or modify and store the result under
/// [name](LabelingFunction::name).
pub trait LabelingFunction {
    fn name(&self) -> &str;
    fn compute_label(&self, bag: &[VertexId], existing: &LabelMap) -> Label;
}
