use crate::decomposition::*;
use crate::graph::{FilteredHyperedgeCollection, VertexId};
use crate::sets;
use crate::DecompositionError;
use ahash::RandomState;
use bimap::BiHashMap;
use petgraph::stable_graph::{NodeIndex, StableDiGraph};
use petgraph::visit::EdgeRef;
use petgraph::Direction;

type Arena = StableDiGraph<NodeData, (), usize>;
type ArenaIndex = NodeIndex<usize>;

struct NodeData {
    bag: Vec<VertexId>,
    induced: FilteredHyperedgeCollection,
    labels: LabelMap,
}

/// A mutable rooted tree of bags.
///
/// The tree structure lives in a petgraph arena whose edges run from parent
/// to child.  The arena recycles its indices after removal, so nodes are
/// addressed through [NodeId]s mapped over a bimap; a `NodeId` is never
/// reused, which keeps the created/removed bookkeeping of the manipulation
/// pipeline unambiguous.
///
/// Bags are sorted ascending.  Every method that takes a node returns
/// [DecompositionError::UnknownNode] when the id is not (or no longer) part
/// of the tree.
pub struct TreeDecomposition {
    arena: Arena,
    ids: BiHashMap<NodeId, ArenaIndex, RandomState, RandomState>,
    id_factory: NodeIdFactory,
    root: Option<NodeId>,
}

impl Default for TreeDecomposition {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeDecomposition {
    pub fn new() -> Self {
        Self {
            arena: Arena::with_capacity(0, 0),
            ids: BiHashMap::with_hashers(RandomState::new(), RandomState::new()),
            id_factory: NodeIdFactory::new(),
            root: None,
        }
    }

    fn index_of(&self, node: &NodeId) -> Result<ArenaIndex, DecompositionError> {
        self.ids
            .get_by_left(node)
            .copied()
            .ok_or(DecompositionError::UnknownNode(*node))
    }

    fn id_of(&self, index: ArenaIndex) -> NodeId {
        *self.ids.get_by_right(&index).unwrap()
    }

    fn insert_data(&mut self, data: NodeData) -> NodeId {
        let id = self.id_factory.one_more();
        let index = self.arena.add_node(data);
        self.ids.insert(id, index);
        id
    }

    pub fn node_size(&self) -> usize {
        self.arena.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.node_count() == 0
    }

    pub fn contains_node(&self, node: &NodeId) -> bool {
        self.ids.contains_left(node)
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// Iteration over all nodes, ascending by id.
    ///
    /// The ids are snapshotted, so the tree may be mutated while iterating;
    /// callers working on a mutating tree should re-check
    /// [contains_node](TreeDecomposition::contains_node).
    pub fn iter_nodes(&self) -> Box<dyn Iterator<Item = NodeId> + 'static> {
        let mut nodes: Vec<NodeId> = self.ids.left_values().copied().collect();
        nodes.sort_unstable();
        Box::new(nodes.into_iter())
    }

    pub fn parent(&self, node: &NodeId) -> Result<Option<NodeId>, DecompositionError> {
        let index = self.index_of(node)?;
        Ok(self
            .arena
            .neighbors_directed(index, Direction::Incoming)
            .next()
            .map(|p| self.id_of(p)))
    }

    /// The children of `node`, ascending by id.
    pub fn children(&self, node: &NodeId) -> Result<Vec<NodeId>, DecompositionError> {
        let index = self.index_of(node)?;
        let mut res: Vec<NodeId> = self
            .arena
            .neighbors_directed(index, Direction::Outgoing)
            .map(|c| self.id_of(c))
            .collect();
        res.sort_unstable();
        Ok(res)
    }

    pub fn child_size(&self, node: &NodeId) -> Result<usize, DecompositionError> {
        let index = self.index_of(node)?;
        Ok(self
            .arena
            .neighbors_directed(index, Direction::Outgoing)
            .count())
    }

    /// Add a node above the current root (or as the first node).
    ///
    /// The new node becomes the root; a previous root becomes its only
    /// child.
    pub fn add_root(&mut self, bag: Vec<VertexId>, induced: FilteredHyperedgeCollection) -> NodeId {
        debug_assert!(bag.windows(2).all(|w| w[0] < w[1]));
        let id = self.insert_data(NodeData {
            bag,
            induced,
            labels: LabelMap::new(),
        });
        if let Some(old_root) = self.root {
            let new_index = self.index_of(&id).unwrap();
            let old_index = self.index_of(&old_root).unwrap();
            self.arena.add_edge(new_index, old_index, ());
        }
        self.root = Some(id);
        id
    }

    /// Add a fresh leaf below `node`.
    pub fn add_child(
        &mut self,
        node: &NodeId,
        bag: Vec<VertexId>,
        induced: FilteredHyperedgeCollection,
    ) -> Result<NodeId, DecompositionError> {
        debug_assert!(bag.windows(2).all(|w| w[0] < w[1]));
        let parent_index = self.index_of(node)?;
        let id = self.insert_data(NodeData {
            bag,
            induced,
            labels: LabelMap::new(),
        });
        let child_index = self.index_of(&id).unwrap();
        self.arena.add_edge(parent_index, child_index, ());
        Ok(id)
    }

    /// Splice a fresh node between `node` and its parent.
    ///
    /// If `node` is the root, the new node becomes the root.
    pub fn add_parent(
        &mut self,
        node: &NodeId,
        bag: Vec<VertexId>,
        induced: FilteredHyperedgeCollection,
    ) -> Result<NodeId, DecompositionError> {
        debug_assert!(bag.windows(2).all(|w| w[0] < w[1]));
        let node_index = self.index_of(node)?;
        let id = self.insert_data(NodeData {
            bag,
            induced,
            labels: LabelMap::new(),
        });
        let new_index = self.index_of(&id).unwrap();
        if let Some(edge) = self
            .arena
            .edges_directed(node_index, Direction::Incoming)
            .map(|e| e.id())
            .next()
        {
            let (parent_index, _) = self.arena.edge_endpoints(edge).unwrap();
            self.arena.remove_edge(edge);
            self.arena.add_edge(parent_index, new_index, ());
        } else {
            self.root = Some(id);
        }
        self.arena.add_edge(new_index, node_index, ());
        Ok(id)
    }

    /// Remove `node`, splicing its children to its parent.
    ///
    /// Removing the root promotes its first child (by id) to the root and
    /// attaches the remaining children below it.  Removing the only node
    /// empties the tree.
    pub fn remove_node(&mut self, node: &NodeId) -> Result<(), DecompositionError> {
        let index = self.index_of(node)?;
        let parent = self
            .arena
            .neighbors_directed(index, Direction::Incoming)
            .next();
        let children = self.children(node)?;
        match parent {
            Some(parent_index) => {
                for child in children.iter() {
                    let child_index = self.index_of(child).unwrap();
                    self.arena.add_edge(parent_index, child_index, ());
                }
            }
            None => match children.split_first() {
                Some((first, rest)) => {
                    let first_index = self.index_of(first).unwrap();
                    for child in rest.iter() {
                        let child_index = self.index_of(child).unwrap();
                        self.arena.add_edge(first_index, child_index, ());
                    }
                    self.root = Some(*first);
                }
                None => {
                    self.root = None;
                }
            },
        }
        self.arena.remove_node(index);
        self.ids.remove_by_left(node);
        Ok(())
    }

    /// Remove `node` and everything below it; returns the removed ids.
    pub fn remove_subtree(&mut self, node: &NodeId) -> Result<Vec<NodeId>, DecompositionError> {
        self.index_of(node)?;
        let mut removed = vec![];
        let mut stack = vec![*node];
        while let Some(cur) = stack.pop() {
            stack.extend(self.children(&cur)?);
            removed.push(cur);
        }
        for id in removed.iter() {
            let index = self.index_of(id).unwrap();
            self.arena.remove_node(index);
            self.ids.remove_by_left(id);
        }
        if Some(*node) == self.root {
            self.root = None;
        }
        Ok(removed)
    }

    /// Exchange the positions of `node` and its parent.
    ///
    /// Nodes whose parent was one of the two now hang below the other; bag,
    /// induced edges, and labels travel with their node.  A root `node` is a
    /// pre-condition violation.
    pub fn swap_with_parent(&mut self, node: &NodeId) -> Result<(), DecompositionError> {
        let node_index = self.index_of(node)?;
        let parent_index = self
            .arena
            .neighbors_directed(node_index, Direction::Incoming)
            .next()
            .ok_or(DecompositionError::MissingParent(*node))?;
        let grand = self
            .arena
            .neighbors_directed(parent_index, Direction::Incoming)
            .next();
        let node_children: Vec<ArenaIndex> = self
            .arena
            .neighbors_directed(node_index, Direction::Outgoing)
            .collect();
        let sibling_children: Vec<ArenaIndex> = self
            .arena
            .neighbors_directed(parent_index, Direction::Outgoing)
            .filter(|c| *c != node_index)
            .collect();
        let edges: Vec<_> = self
            .arena
            .edges_directed(node_index, Direction::Incoming)
            .chain(self.arena.edges_directed(node_index, Direction::Outgoing))
            .chain(self.arena.edges_directed(parent_index, Direction::Incoming))
            .chain(self.arena.edges_directed(parent_index, Direction::Outgoing))
            .map(|e| e.id())
            .collect::<std::collections::BTreeSet<_>>()
            .into_iter()
            .collect();
        for edge in edges {
            self.arena.remove_edge(edge);
        }
        if let Some(grand_index) = grand {
            self.arena.add_edge(grand_index, node_index, ());
        } else {
            self.root = Some(*node);
        }
        self.arena.add_edge(node_index, parent_index, ());
        for child in sibling_children {
            self.arena.add_edge(node_index, child, ());
        }
        for child in node_children {
            self.arena.add_edge(parent_index, child, ());
        }
        Ok(())
    }

    pub fn bag(&self, node: &NodeId) -> Result<&[VertexId], DecompositionError> {
        let index = self.index_of(node)?;
        Ok(&self.arena[index].bag)
    }

    /// Mutable bag access; callers must keep the bag sorted ascending.
    pub fn bag_mut(&mut self, node: &NodeId) -> Result<&mut Vec<VertexId>, DecompositionError> {
        let index = self.index_of(node)?;
        Ok(&mut self.arena[index].bag)
    }

    pub fn induced_hyperedges(
        &self,
        node: &NodeId,
    ) -> Result<&FilteredHyperedgeCollection, DecompositionError> {
        let index = self.index_of(node)?;
        Ok(&self.arena[index].induced)
    }

    pub fn induced_hyperedges_mut(
        &mut self,
        node: &NodeId,
    ) -> Result<&mut FilteredHyperedgeCollection, DecompositionError> {
        let index = self.index_of(node)?;
        Ok(&mut self.arena[index].induced)
    }

    pub fn labels(&self, node: &NodeId) -> Result<&LabelMap, DecompositionError> {
        let index = self.index_of(node)?;
        Ok(&self.arena[index].labels)
    }

    pub fn set_label(
        &mut self,
        node: &NodeId,
        name: &str,
        label: Label,
    ) -> Result<(), DecompositionError> {
        let index = self.index_of(node)?;
        self.arena[index].labels.set(name, label)
    }

    pub fn remove_label(
        &mut self,
        node: &NodeId,
        name: &str,
    ) -> Result<Option<Label>, DecompositionError> {
        let index = self.index_of(node)?;
        Ok(self.arena[index].labels.remove(name))
    }

    /// Exchange the whole label maps of two nodes.
    pub fn swap_labels(&mut self, a: &NodeId, b: &NodeId) -> Result<(), DecompositionError> {
        let index_a = self.index_of(a)?;
        let index_b = self.index_of(b)?;
        if index_a == index_b {
            return Ok(());
        }
        let labels_a = std::mem::take(&mut self.arena[index_a].labels);
        let labels_b = std::mem::replace(&mut self.arena[index_b].labels, labels_a);
        self.arena[index_a].labels = labels_b;
        Ok(())
    }

    /// Move the label stored under `name` from one node to another.
    ///
    /// Nothing happens when `from` carries no such label.
    pub fn transfer_label(
        &mut self,
        name: &str,
        from: &NodeId,
        to: &NodeId,
    ) -> Result<(), DecompositionError> {
        self.index_of(to)?;
        if let Some(label) = self.remove_label(from, name)? {
            self.set_label(to, name, label)?;
        }
        Ok(())
    }

    /// The union of all children's bags, sorted ascending.
    pub fn children_bag_union(&self, node: &NodeId) -> Result<Vec<VertexId>, DecompositionError> {
        let mut res: Vec<VertexId> = vec![];
        for child in self.children(node)? {
            res = sets::union(&res, self.bag(&child)?);
        }
        Ok(res)
    }

    /// The vertices of `node`'s bag not present in any child bag.
    ///
    /// For leaves this is the whole bag.
    pub fn introduced_vertices(&self, node: &NodeId) -> Result<Vec<VertexId>, DecompositionError> {
        let below = self.children_bag_union(node)?;
        Ok(sets::difference(self.bag(node)?, &below))
    }

    /// The vertices present in some child bag but not in `node`'s bag.
    pub fn forgotten_vertices(&self, node: &NodeId) -> Result<Vec<VertexId>, DecompositionError> {
        let below = self.children_bag_union(node)?;
        Ok(sets::difference(&below, self.bag(node)?))
    }

    pub fn kind(&self, node: &NodeId) -> Result<NodeKind, DecompositionError> {
        let children = self.children(node)?;
        Ok(match children.as_slice() {
            [] => NodeKind::Leaf,
            [child] => {
                let bag = self.bag(node)?;
                let child_bag = self.bag(child)?;
                if sets::is_subset(child_bag, bag) {
                    NodeKind::Introduce
                } else if sets::is_subset(bag, child_bag) {
                    NodeKind::Forget
                } else {
                    NodeKind::Exchange
                }
            }
            _ => NodeKind::Join,
        })
    }

    fn nodes_of_kind(&self, kind: NodeKind) -> Vec<NodeId> {
        self.iter_nodes()
            .filter(|n| self.kind(n).unwrap() == kind)
            .collect()
    }

    pub fn leaves(&self) -> Vec<NodeId> {
        self.nodes_of_kind(NodeKind::Leaf)
    }

    pub fn exchange_nodes(&self) -> Vec<NodeId> {
        self.nodes_of_kind(NodeKind::Exchange)
    }

    pub fn join_nodes(&self) -> Vec<NodeId> {
        self.nodes_of_kind(NodeKind::Join)
    }

    /// Nodes with at least one introduced vertex, plus (optionally) leaves.
    pub fn introduce_nodes(&self, include_leaves: bool) -> Vec<NodeId> {
        self.iter_nodes()
            .filter(|n| {
                if !include_leaves && self.child_size(n).unwrap() == 0 {
                    return false;
                }
                !self.introduced_vertices(n).unwrap().is_empty()
            })
            .collect()
    }

    /// Nodes with at least one forgotten vertex.
    pub fn forget_nodes(&self) -> Vec<NodeId> {
        self.iter_nodes()
            .filter(|n| !self.forgotten_vertices(n).unwrap().is_empty())
            .collect()
    }

    pub fn maximum_bag_size(&self) -> usize {
        self.iter_nodes()
            .map(|n| self.bag(&n).unwrap().len())
            .max()
            .unwrap_or(0)
    }

    pub fn minimum_bag_size(&self) -> usize {
        self.iter_nodes()
            .map(|n| self.bag(&n).unwrap().len())
            .min()
            .unwrap_or(0)
    }

    /// `max |bag| - 1`, the quality metric of the decomposition.
    pub fn width(&self) -> usize {
        self.maximum_bag_size().saturating_sub(1)
    }

    /// Whether every node has at most one child.
    pub fn is_path(&self) -> bool {
        self.iter_nodes().all(|n| self.child_size(&n).unwrap() <= 1)
    }

    /// All nodes in depth-first preorder from the root, children visited
    /// ascending by id.
    pub fn dfs_preorder(&self) -> Vec<NodeId> {
        let mut res = vec![];
        let mut stack: Vec<NodeId> = self.root.into_iter().collect();
        while let Some(cur) = stack.pop() {
            res.push(cur);
            let mut children = self.children(&cur).unwrap();
            children.reverse();
            stack.extend(children);
        }
        res
    }

    /// Number of parent/child links; a rooted tree has `node_size() - 1`.
    pub fn link_size(&self) -> usize {
        self.arena.edge_count()
    }
}

impl std::fmt::Debug for TreeDecomposition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "TreeDecomposition {{")?;
        for node in self.dfs_preorder() {
            let depth = {
                let mut d = 0;
                let mut cur = node;
                while let Some(p) = self.parent(&cur).unwrap() {
                    d += 1;
                    cur = p;
                }
                d
            };
            for _ in 0..depth * 2 {
                write!(f, " ")?;
            }
            writeln!(f, "{:?}: {:?}", node, self.bag(&node).unwrap())?;
        }
        writeln!(f, "}}")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::FilteredHyperedgeCollection;

    fn vids(xs: &[usize]) -> Vec<VertexId> {
        xs.iter().map(|x| VertexId::new(*x)).collect()
    }

    fn empty() -> FilteredHyperedgeCollection {
        FilteredHyperedgeCollection::empty()
    }

    #[test]
    fn add_parent_splices_between() {
        let mut t = TreeDecomposition::new();
        let root = t.add_root(vids(&[1, 2]), empty());
        let leaf = t.add_child(&root, vids(&[2, 3]), empty()).unwrap();
        let mid = t.add_parent(&leaf, vids(&[2]), empty()).unwrap();
        assert_eq!(t.parent(&mid).unwrap(), Some(root));
        assert_eq!(t.parent(&leaf).unwrap(), Some(mid));
        assert_eq!(t.children(&root).unwrap(), vec![mid]);
        assert_eq!(t.link_size(), t.node_size() - 1);
    }

    #[test]
    fn add_parent_of_root_becomes_root() {
        let mut t = TreeDecomposition::new();
        let old = t.add_root(vids(&[1]), empty());
        let new = t.add_parent(&old, vids(&[]), empty()).unwrap();
        assert_eq!(t.root(), Some(new));
        assert_eq!(t.parent(&old).unwrap(), Some(new));
    }

    #[test]
    fn remove_node_splices_children_up() {
        let mut t = TreeDecomposition::new();
        let root = t.add_root(vids(&[1]), empty());
        let mid = t.add_child(&root, vids(&[1, 2]), empty()).unwrap();
        let a = t.add_child(&mid, vids(&[2]), empty()).unwrap();
        let b = t.add_child(&mid, vids(&[2, 3]), empty()).unwrap();
        t.remove_node(&mid).unwrap();
        assert!(!t.contains_node(&mid));
        assert_eq!(t.children(&root).unwrap(), vec![a, b]);
        assert_eq!(t.link_size(), t.node_size() - 1);
    }

    #[test]
    fn removing_the_root_promotes_the_first_child() {
        let mut t = TreeDecomposition::new();
        let root = t.add_root(vids(&[]), empty());
        let a = t.add_child(&root, vids(&[1]), empty()).unwrap();
        let b = t.add_child(&root, vids(&[2]), empty()).unwrap();
        t.remove_node(&root).unwrap();
        assert_eq!(t.root(), Some(a));
        assert_eq!(t.children(&a).unwrap(), vec![b]);
    }

    #[test]
    fn node_ids_are_not_recycled() {
        let mut t = TreeDecomposition::new();
        let root = t.add_root(vids(&[1]), empty());
        let child = t.add_child(&root, vids(&[1, 2]), empty()).unwrap();
        t.remove_node(&child).unwrap();
        let again = t.add_child(&root, vids(&[1, 3]), empty()).unwrap();
        assert!(child < again);
        assert!(!t.contains_node(&child));
    }

    #[test]
    fn classification_follows_bag_relations() {
        let mut t = TreeDecomposition::new();
        let root = t.add_root(vids(&[1, 2, 3]), empty());
        let forget = t.add_child(&root, vids(&[2]), empty()).unwrap();
        let exchange = t.add_child(&forget, vids(&[2, 4]), empty()).unwrap();
        let leaf = t.add_child(&exchange, vids(&[4, 5]), empty()).unwrap();
        assert_eq!(t.kind(&root).unwrap(), NodeKind::Introduce);
        assert_eq!(t.kind(&forget).unwrap(), NodeKind::Forget);
        assert_eq!(t.kind(&exchange).unwrap(), NodeKind::Exchange);
        assert_eq!(t.kind(&leaf).unwrap(), NodeKind::Leaf);
        assert_eq!(t.introduced_vertices(&root).unwrap(), vids(&[1, 3]));
        assert_eq!(t.forgotten_vertices(&forget).unwrap(), vids(&[4]));
        let second = t.add_child(&root, vids(&[3]), empty()).unwrap();
        assert_eq!(t.kind(&root).unwrap(), NodeKind::Join);
        let _ = second;
    }

    #[test]
    fn swap_with_parent_exchanges_positions() {
        let mut t = TreeDecomposition::new();
        let root = t.add_root(vids(&[1]), empty());
        let mid = t.add_child(&root, vids(&[2]), empty()).unwrap();
        let sibling = t.add_child(&root, vids(&[3]), empty()).unwrap();
        let leaf = t.add_child(&mid, vids(&[4]), empty()).unwrap();
        t.swap_with_parent(&mid).unwrap();
        assert_eq!(t.root(), Some(mid));
        assert_eq!(t.parent(&root).unwrap(), Some(mid));
        assert_eq!(t.parent(&sibling).unwrap(), Some(mid));
        assert_eq!(t.parent(&leaf).unwrap(), Some(root));
        assert_eq!(t.link_size(), t.node_size() - 1);
    }

    #[test]
    fn label_transfer_preserves_the_value() {
        let mut t = TreeDecomposition::new();
        let root = t.add_root(vids(&[1]), empty());
        let child = t.add_child(&root, vids(&[1, 2]), empty()).unwrap();
        t.set_label(&root, "width", Label::Size(7)).unwrap();
        t.transfer_label("width", &root, &child).unwrap();
        assert_eq!(t.labels(&root).unwrap().get("width"), None);
        assert_eq!(
            t.labels(&child).unwrap().get("width"),
            Some(&Label::Size(7))
        );
    }

    #[test]
    fn reserved_label_name_is_rejected_through_the_store() {
        let mut t = TreeDecomposition::new();
        let root = t.add_root(vids(&[1]), empty());
        let err = t.set_label(&root, BAG_LABEL, Label::Size(1)).unwrap_err();
        assert!(matches!(err, DecompositionError::ReservedLabelName(_)));
    }

    #[test]
    fn unknown_node_is_reported() {
        let t = TreeDecomposition::new();
        let err = t.bag(&NodeId::new(9)).unwrap_err();
        assert!(matches!(err, DecompositionError::UnknownNode(_)));
    }

    #[test]
    fn remove_subtree_drops_descendants_only() {
        let mut t = TreeDecomposition::new();
        let root = t.add_root(vids(&[1]), empty());
        let mid = t.add_child(&root, vids(&[2]), empty()).unwrap();
        let leaf = t.add_child(&mid, vids(&[3]), empty()).unwrap();
        let keep = t.add_child(&root, vids(&[4]), empty()).unwrap();
        let mut removed = t.remove_subtree(&mid).unwrap();
        removed.sort_unstable();
        assert_eq!(removed, vec![mid, leaf]);
        assert!(t.contains_node(&keep));
        assert_eq!(t.node_size(), 2);
    }
}
