use crate::decomposition::*;
use crate::graph::*;
use crate::sets;
use ahash::RandomState;
use std::collections::{HashMap, HashSet};

/// A violated decomposition invariant, found by [verify].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    /// A graph vertex missing from every bag.
    UncoveredVertex(VertexId),
    /// A hyperedge whose endpoints share no bag.
    UncoveredHyperedge(EdgeId),
    /// A vertex whose bags do not induce a connected subtree.
    DisconnectedVertex(VertexId),
    /// The node graph is not a single rooted tree.
    NotATree,
    /// A node whose induced-edge set disagrees with its bag.
    WrongInducedEdges(NodeId),
}

/// Check a decomposition against a graph.
///
/// Covers the universal invariants: coverage, edge coverage, the running
/// intersection property, rooted-tree shape, and (when `check_induced` is
/// set) agreement of every node's induced-edge set with its bag.  Returns
/// all violations found; an empty vector means the decomposition is valid.
pub fn verify<G: QueryableHypergraph>(
    graph: &G,
    decomposition: &TreeDecomposition,
    check_induced: bool,
) -> Vec<Violation> {
    let mut violations = vec![];

    let nodes: Vec<NodeId> = decomposition.iter_nodes().collect();

    // Rooted-tree shape: one root, every other node exactly one parent, and
    // exactly `n - 1` links.
    let roots = nodes
        .iter()
        .filter(|n| decomposition.parent(n).unwrap().is_none())
        .count();
    let expected_roots = usize::from(!nodes.is_empty());
    if roots != expected_roots
        || decomposition.link_size() != nodes.len().saturating_sub(1)
        || decomposition.root().is_none() && !nodes.is_empty()
    {
        violations.push(Violation::NotATree);
    }

    let mut covered: HashMap<VertexId, Vec<NodeId>, RandomState> =
        HashMap::with_hasher(RandomState::new());
    for n in nodes.iter() {
        for v in decomposition.bag(n).unwrap() {
            covered.entry(*v).or_default().push(*n);
        }
    }

    for v in graph.iter_vertices() {
        if !covered.contains_key(&v) {
            violations.push(Violation::UncoveredVertex(v));
        }
    }

    for e in graph.iter_hyperedges() {
        let in_some_bag = nodes
            .iter()
            .any(|n| e.is_within(decomposition.bag(n).unwrap()));
        if !in_some_bag {
            violations.push(Violation::UncoveredHyperedge(e.id()));
        }
    }

    // Running intersection: the nodes holding a vertex must stay connected
    // when walking only among themselves.
    for (v, holders) in covered.iter() {
        let holder_set: HashSet<NodeId, RandomState> = holders.iter().copied().collect();
        let mut seen: HashSet<NodeId, RandomState> = HashSet::with_hasher(RandomState::new());
        let mut stack = vec![holders[0]];
        seen.insert(holders[0]);
        while let Some(cur) = stack.pop() {
            let mut adjacent = decomposition.children(&cur).unwrap();
            adjacent.extend(decomposition.parent(&cur).unwrap());
            for next in adjacent {
                if holder_set.contains(&next) && seen.insert(next) {
                    stack.push(next);
                }
            }
        }
        if seen.len() != holder_set.len() {
            violations.push(Violation::DisconnectedVertex(*v));
        }
    }

    if check_induced {
        for n in nodes.iter() {
            let bag = decomposition.bag(n).unwrap();
            let expected: Vec<EdgeId> = graph
                .iter_hyperedges()
                .filter(|e| sets::is_subset(e.sorted_elements(), bag))
                .map(|e| e.id())
                .collect();
            let mut actual = decomposition.induced_hyperedges(n).unwrap().edge_ids();
            actual.sort_unstable();
            let mut expected = expected;
            expected.sort_unstable();
            if actual != expected {
                violations.push(Violation::WrongInducedEdges(*n));
            }
        }
    }

    violations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::FilteredHyperedgeCollection;

    #[test]
    fn a_valid_path_decomposition_passes() {
        let mut g = MultiHypergraph::new();
        let vs = g.add_vertices(3);
        g.add_hyperedge(vec![vs[0], vs[1]]).unwrap();
        g.add_hyperedge(vec![vs[1], vs[2]]).unwrap();
        let mut t = TreeDecomposition::new();
        let root = t.add_root(
            vec![vs[1], vs[2]],
            FilteredHyperedgeCollection::from_graph(&g).restricted_to(&[vs[1], vs[2]]),
        );
        t.add_child(
            &root,
            vec![vs[0], vs[1]],
            FilteredHyperedgeCollection::from_graph(&g).restricted_to(&[vs[0], vs[1]]),
        )
        .unwrap();
        assert_eq!(verify(&g, &t, true), vec![]);
    }

    #[test]
    fn missing_vertex_and_edge_are_reported() {
        let mut g = MultiHypergraph::new();
        let vs = g.add_vertices(2);
        let e = g.add_hyperedge(vec![vs[0], vs[1]]).unwrap();
        let mut t = TreeDecomposition::new();
        t.add_root(vec![vs[0]], FilteredHyperedgeCollection::empty());
        let violations = verify(&g, &t, false);
        assert!(violations.contains(&Violation::UncoveredVertex(vs[1])));
        assert!(violations.contains(&Violation::UncoveredHyperedge(e)));
    }

    #[test]
    fn a_torn_vertex_breaks_the_running_intersection() {
        let mut g = MultiHypergraph::new();
        let vs = g.add_vertices(2);
        let mut t = TreeDecomposition::new();
        let root = t.add_root(vec![vs[0], vs[1]], FilteredHyperedgeCollection::empty());
        let mid = t
            .add_child(&root, vec![vs[1]], FilteredHyperedgeCollection::empty())
            .unwrap();
        t.add_child(&mid, vec![vs[0]], FilteredHyperedgeCollection::empty())
            .unwrap();
        let violations = verify(&g, &t, false);
        assert_eq!(violations, vec![Violation::DisconnectedVertex(vs[0])]);
    }
}
