use crate::algorithm::ordering::*;
use crate::context::Context;
use crate::graph::{PreprocessedGraph, VertexId};
use crate::sets;
use ahash::RandomState;
use std::collections::{BTreeSet, HashMap};
use std::rc::Rc;

/// The state of a vertex relative to the most recent elimination.
///
/// `Adjacent` marks direct neighbors of the eliminated vertex, `Affected`
/// marks second-neighborhood vertices whose fill can change because one of
/// their neighbors acquired new neighbors, and `AdjacentAffected` marks
/// vertices that are both.  States fold back to `Settled` once a vertex's
/// fill value has been brought up to date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum UpdateState {
    Settled,
    Adjacent,
    Affected,
    AdjacentAffected,
    Eliminated,
}

impl UpdateState {
    fn mark_adjacent(self) -> Self {
        match self {
            Self::Settled | Self::Adjacent => Self::Adjacent,
            Self::Affected | Self::AdjacentAffected => Self::AdjacentAffected,
            Self::Eliminated => Self::Eliminated,
        }
    }

    fn mark_affected(self) -> Self {
        match self {
            Self::Settled | Self::Affected => Self::Affected,
            Self::Adjacent | Self::AdjacentAffected => Self::AdjacentAffected,
            Self::Eliminated => Self::Eliminated,
        }
    }

    fn settle_adjacent(self) -> Self {
        match self {
            Self::Adjacent => Self::Settled,
            Self::AdjacentAffected => Self::Affected,
            other => other,
        }
    }

    /// Whether the fill of this vertex may still have to be brought up to
    /// date by the second-neighborhood pass.
    fn update_pending(self) -> bool {
        matches!(self, Self::Affected | Self::AdjacentAffected)
    }
}

/// The primary engine: min-fill with incremental fill maintenance.
///
/// Per vertex it tracks the sorted closed neighborhood, the fill value, the
/// degree, and an [UpdateState]; globally the running total fill, the
/// current `(min_fill, min_degree)` minima, and the pool of candidates
/// matching both.  Elimination partitions each neighbor's neighborhood into
/// *existing*, *additional*, and *unaffected* vertices relative to the
/// eliminated one and re-derives every touched fill value from the partition
/// counts, so no quadratic rescan is needed.  The engine stops eliminating
/// once the total fill reaches zero — the remaining graph is a disjoint
/// union of cliques — and appends the remainder in working-set order.
pub struct AdvancedMinFillOrderingAlgorithm {
    ctx: Rc<Context>,
}

fn offer(
    pool: &mut BTreeSet<VertexId>,
    min_fill: &mut usize,
    min_degree: &mut usize,
    vertex: VertexId,
    fill: usize,
    degree: usize,
) {
    if fill <= *min_fill {
        if fill < *min_fill {
            *min_fill = fill;
            *min_degree = degree;
            pool.clear();
        }
        if degree <= *min_degree {
            if degree < *min_degree {
                *min_degree = degree;
                pool.clear();
            }
            pool.insert(vertex);
        }
    }
}

/// Split `neighborhood` against `selected_neighborhood`, skipping `selected`
/// on both sides: members of the selected neighborhood that are new to the
/// vertex (*additional*), members it loses nothing by (*unaffected*), and
/// the common part (*existing*).
fn decompose_sets(
    selected_neighborhood: &[VertexId],
    neighborhood: &[VertexId],
    selected: VertexId,
) -> (Vec<VertexId>, Vec<VertexId>, Vec<VertexId>) {
    let mut additional = vec![];
    let mut unaffected = vec![];
    let mut existing = vec![];
    let (mut i, mut j) = (0, 0);
    while i < selected_neighborhood.len() || j < neighborhood.len() {
        if i < selected_neighborhood.len() && selected_neighborhood[i] == selected {
            i += 1;
            continue;
        }
        if j < neighborhood.len() && neighborhood[j] == selected {
            j += 1;
            continue;
        }
        if i >= selected_neighborhood.len() {
            unaffected.push(neighborhood[j]);
            j += 1;
        } else if j >= neighborhood.len() {
            additional.push(selected_neighborhood[i]);
            i += 1;
        } else {
            match selected_neighborhood[i].cmp(&neighborhood[j]) {
                std::cmp::Ordering::Less => {
                    additional.push(selected_neighborhood[i]);
                    i += 1;
                }
                std::cmp::Ordering::Greater => {
                    unaffected.push(neighborhood[j]);
                    j += 1;
                }
                std::cmp::Ordering::Equal => {
                    existing.push(neighborhood[j]);
                    i += 1;
                    j += 1;
                }
            }
        }
    }
    (additional, unaffected, existing)
}

/// `neighborhood := (neighborhood ∪ additional) \ {selected}`, with fast
/// paths for zero or one additional vertex.
fn merge_additional(neighborhood: &mut Vec<VertexId>, additional: &[VertexId], selected: VertexId) {
    match additional.len() {
        0 => {
            let position = neighborhood.binary_search(&selected).unwrap();
            neighborhood.remove(position);
        }
        1 => {
            let position = neighborhood.binary_search(&selected).unwrap();
            neighborhood.remove(position);
            let new_vertex = additional[0];
            let position = neighborhood.binary_search(&new_vertex).unwrap_err();
            neighborhood.insert(position, new_vertex);
        }
        _ => {
            let mut merged = Vec::with_capacity(neighborhood.len() + additional.len());
            let (mut i, mut j) = (0, 0);
            while i < neighborhood.len() || j < additional.len() {
                if i < neighborhood.len() && neighborhood[i] == selected {
                    i += 1;
                    continue;
                }
                if i >= neighborhood.len() {
                    merged.push(additional[j]);
                    j += 1;
                } else if j >= additional.len() {
                    merged.push(neighborhood[i]);
                    i += 1;
                } else {
                    match neighborhood[i].cmp(&additional[j]) {
                        std::cmp::Ordering::Less => {
                            merged.push(neighborhood[i]);
                            i += 1;
                        }
                        std::cmp::Ordering::Greater => {
                            merged.push(additional[j]);
                            j += 1;
                        }
                        std::cmp::Ordering::Equal => {
                            merged.push(neighborhood[i]);
                            i += 1;
                            j += 1;
                        }
                    }
                }
            }
            *neighborhood = merged;
        }
    }
}

/// New edges among `relevant` created by the elimination: pairs of common
/// neighbors where the later one is among the earlier one's additional
/// vertices.
fn created_edge_reductions(
    relevant: &[VertexId],
    additional: &HashMap<VertexId, Vec<VertexId>, RandomState>,
    mut keep_scanning: impl FnMut(usize) -> bool,
) -> usize {
    let mut total = 0;
    for (idx, v2) in relevant.iter().enumerate() {
        if !keep_scanning(total) {
            break;
        }
        let additional2 = &additional[v2];
        let above = additional2.partition_point(|x| x <= v2);
        total += sets::intersection_size(&relevant[idx + 1..], &additional2[above..]);
    }
    total
}

impl AdvancedMinFillOrderingAlgorithm {
    pub fn new(ctx: Rc<Context>) -> Self {
        Self { ctx }
    }
}

impl OrderingAlgorithm for AdvancedMinFillOrderingAlgorithm {
    fn context(&self) -> &Context {
        &self.ctx
    }

    fn write_ordering_to(
        &self,
        preprocessed: &PreprocessedGraph,
        target: &mut Vec<VertexId>,
    ) -> usize {
        let size = preprocessed.vertex_size();
        let hasher = RandomState::new;

        let mut vertices: BTreeSet<VertexId> = preprocessed.vertices().iter().copied().collect();
        let mut neighborhood: HashMap<VertexId, Vec<VertexId>, RandomState> =
            HashMap::with_capacity_and_hasher(size, hasher());
        let mut fill: HashMap<VertexId, usize, RandomState> =
            HashMap::with_capacity_and_hasher(size, hasher());
        let mut state: HashMap<VertexId, UpdateState, RandomState> =
            HashMap::with_capacity_and_hasher(size, hasher());
        let mut additional: HashMap<VertexId, Vec<VertexId>, RandomState> =
            HashMap::with_capacity_and_hasher(size, hasher());
        let mut unaffected: HashMap<VertexId, Vec<VertexId>, RandomState> =
            HashMap::with_capacity_and_hasher(size, hasher());
        let mut existing: HashMap<VertexId, Vec<VertexId>, RandomState> =
            HashMap::with_capacity_and_hasher(size, hasher());

        for v in vertices.iter() {
            neighborhood.insert(*v, preprocessed.closed_neighborhood(v).to_vec());
            state.insert(*v, UpdateState::Settled);
        }

        let mut min_fill = usize::MAX;
        let mut min_degree = usize::MAX;
        let mut pool: BTreeSet<VertexId> = BTreeSet::new();
        let mut total_fill: usize = 0;

        for v in vertices.iter() {
            let closed = &neighborhood[v];
            let fill_v = fill_value(&neighborhood, closed);
            offer(
                &mut pool,
                &mut min_fill,
                &mut min_degree,
                *v,
                fill_v,
                closed.len() - 1,
            );
            fill.insert(*v, fill_v);
            total_fill += fill_v;
        }

        tracing::debug!(
            vertices = size,
            total_fill,
            "advanced min-fill ordering started"
        );

        let mut affected: Vec<VertexId> = Vec::with_capacity(size);
        let mut required = 0;

        while total_fill > 0 && !self.ctx.is_terminated() {
            if pool.is_empty() {
                min_fill = usize::MAX;
                min_degree = usize::MAX;
                for v in vertices.iter() {
                    offer(
                        &mut pool,
                        &mut min_fill,
                        &mut min_degree,
                        *v,
                        fill[v],
                        neighborhood[v].len() - 1,
                    );
                }
            }

            let selected = {
                let idx = self.ctx.draw_index(pool.len());
                *pool.iter().nth(idx).unwrap()
            };
            pool.remove(&selected);
            state.insert(selected, UpdateState::Eliminated);
            affected.clear();

            let selected_neighborhood = neighborhood.remove(&selected).unwrap();
            let selected_fill = fill[&selected];
            total_fill -= selected_fill;
            required = required.max(selected_neighborhood.len());

            if selected_fill == 0 {
                // Simplicial: the neighbors stay pairwise adjacent and only
                // lose the selected vertex.
                for u in selected_neighborhood.iter().filter(|u| **u != selected) {
                    let current = neighborhood.get_mut(u).unwrap();
                    let reduction = sets::difference_size(current, &selected_neighborhood);
                    *fill.get_mut(u).unwrap() -= reduction;
                    total_fill -= reduction;
                    let position = current.binary_search(&selected).unwrap();
                    current.remove(position);
                }
            } else {
                // Partition every neighbor's neighborhood and mark the
                // second neighborhood.
                for u in selected_neighborhood.iter().filter(|u| **u != selected) {
                    if state[u] == UpdateState::Settled {
                        let parts = decompose_sets(&selected_neighborhood, &neighborhood[u], selected);
                        additional.insert(*u, parts.0);
                        unaffected.insert(*u, parts.1);
                        existing.insert(*u, parts.2);
                    }
                    state.insert(*u, state[u].mark_adjacent());
                    for w in neighborhood[u].iter() {
                        let w_state = state[w];
                        if matches!(w_state, UpdateState::Settled | UpdateState::Adjacent) {
                            if w_state == UpdateState::Settled {
                                let parts =
                                    decompose_sets(&selected_neighborhood, &neighborhood[w], selected);
                                additional.insert(*w, parts.0);
                                unaffected.insert(*w, parts.1);
                                existing.insert(*w, parts.2);
                            }
                            affected.push(*w);
                            state.insert(*w, w_state.mark_affected());
                        }
                    }
                }

                // Merge the additional vertices into every neighbor and
                // settle the neighbor fills from the partition counts.
                for u in selected_neighborhood.iter().filter(|u| **u != selected) {
                    let additional_u = additional[u].clone();
                    let current = neighborhood.get_mut(u).unwrap();
                    merge_additional(current, &additional_u, selected);
                    let degree = current.len() - 1;

                    let mut tmp = fill[u];
                    if !additional_u.is_empty() || tmp > 0 {
                        let unaffected_count = unaffected[u].len();
                        if unaffected_count > 0 {
                            if additional_u.is_empty() {
                                // No new neighbors: the vertex loses its
                                // non-edges towards the selected vertex and
                                // the edges just created among its common
                                // neighbors.
                                let relevant = &existing[u];
                                let reduction = created_edge_reductions(relevant, &additional, |acc| {
                                    tmp - acc > unaffected_count
                                });
                                tmp -= reduction;
                                total_fill -= reduction;
                                tmp -= unaffected_count;
                                total_fill -= unaffected_count;
                                state.insert(*u, UpdateState::Settled);
                                offer(&mut pool, &mut min_fill, &mut min_degree, *u, tmp, degree);
                            } else {
                                let mut fill_delta: isize = 0;
                                for x in unaffected[u].iter() {
                                    fill_delta +=
                                        sets::difference_size(&additional_u, &existing[x]) as isize - 1;
                                }
                                if fill_delta != 0 {
                                    pool.remove(u);
                                    if fill_delta > 0 {
                                        tmp += fill_delta as usize;
                                        total_fill += fill_delta as usize;
                                    } else {
                                        tmp -= (-fill_delta) as usize;
                                        total_fill -= (-fill_delta) as usize;
                                    }
                                }
                                state.insert(*u, state[u].settle_adjacent());
                                if state[u] == UpdateState::Settled {
                                    offer(&mut pool, &mut min_fill, &mut min_degree, *u, tmp, degree);
                                }
                            }
                        } else {
                            // Every remaining neighbor is shared with the
                            // selected vertex, so the neighborhood is now a
                            // clique.
                            total_fill -= tmp;
                            tmp = 0;
                            state.insert(*u, UpdateState::Settled);
                            offer(&mut pool, &mut min_fill, &mut min_degree, *u, tmp, degree);
                        }
                        fill.insert(*u, tmp);
                    } else {
                        state.insert(*u, UpdateState::Settled);
                    }
                }

                // Second neighborhood: account for the edges created among
                // their neighbors.
                for w in affected.iter() {
                    if state[w] != UpdateState::Affected {
                        continue;
                    }
                    let mut tmp = fill[w];
                    if !unaffected[w].is_empty() && tmp > 0 {
                        let relevant = &existing[w];
                        let reduction =
                            created_edge_reductions(relevant, &additional, |acc| tmp - acc > 0);
                        tmp -= reduction;
                        total_fill -= reduction;
                    } else {
                        total_fill -= tmp;
                        tmp = 0;
                    }
                    offer(
                        &mut pool,
                        &mut min_fill,
                        &mut min_degree,
                        *w,
                        tmp,
                        neighborhood[w].len() - 1,
                    );
                    fill.insert(*w, tmp);
                }

                for u in selected_neighborhood.iter().filter(|u| **u != selected) {
                    additional.remove(u);
                    unaffected.remove(u);
                    existing.remove(u);
                }
                for w in affected.iter() {
                    if state[w].update_pending() {
                        additional.remove(w);
                        unaffected.remove(w);
                        existing.remove(w);
                        state.insert(*w, UpdateState::Settled);
                    }
                }
            }

            vertices.remove(&selected);
            target.push(selected);
        }

        // The remaining graph is a disjoint union of cliques (or the run
        // was cancelled); append it in working-set order.
        let tail: Vec<VertexId> = vertices.iter().copied().collect();
        let required = append_tail(&neighborhood, tail.into_iter(), target, required);
        tracing::debug!(required_bag_size = required, "ordering finished");
        required
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithm::ordering::tests::*;
    use crate::graph::*;

    #[test]
    fn decompose_sets_partitions_around_the_selected_vertex() {
        let v = |x: usize| VertexId::new(x);
        let selected_neighborhood = [v(1), v(2), v(4), v(6)];
        let neighborhood = [v(2), v(3), v(5), v(6)];
        let (additional, unaffected, existing) =
            decompose_sets(&selected_neighborhood, &neighborhood, v(2));
        assert_eq!(additional, vec![v(1), v(4)]);
        assert_eq!(unaffected, vec![v(3), v(5)]);
        assert_eq!(existing, vec![v(6)]);
    }

    #[test]
    fn merge_additional_fast_paths_match_the_general_merge() {
        let v = |x: usize| VertexId::new(x);
        let base = vec![v(1), v(3), v(5), v(7)];
        let mut zero = base.clone();
        merge_additional(&mut zero, &[], v(5));
        assert_eq!(zero, vec![v(1), v(3), v(7)]);
        let mut one = base.clone();
        merge_additional(&mut one, &[v(4)], v(5));
        assert_eq!(one, vec![v(1), v(3), v(4), v(7)]);
        let mut many = base;
        merge_additional(&mut many, &[v(2), v(8)], v(5));
        assert_eq!(many, vec![v(1), v(2), v(3), v(7), v(8)]);
    }

    #[test]
    fn clique_is_appended_without_elimination() {
        let mut g = MultiHypergraph::new();
        let vs = g.add_vertices(5);
        for i in 0..5 {
            for j in i + 1..5 {
                g.add_hyperedge(vec![vs[i], vs[j]]).unwrap();
            }
        }
        let pre = PreprocessedGraph::new(&g);
        let algorithm = AdvancedMinFillOrderingAlgorithm::new(Rc::new(Context::with_seed(1)));
        let ordering = algorithm.compute_ordering(&pre);
        assert_is_permutation(&g, &ordering);
        assert_eq!(ordering.required_bag_size(), 5);
    }

    #[test]
    fn identical_seeds_give_identical_orderings() {
        let ops_graph = {
            let mut g = MultiHypergraph::new();
            let vs = g.add_vertices(10);
            for i in 0..10 {
                g.add_hyperedge(vec![vs[i], vs[(i + 1) % 10]]).unwrap();
                g.add_hyperedge(vec![vs[i], vs[(i + 3) % 10]]).unwrap();
            }
            g
        };
        let pre = PreprocessedGraph::new(&ops_graph);
        let a = AdvancedMinFillOrderingAlgorithm::new(Rc::new(Context::with_seed(13)));
        let b = AdvancedMinFillOrderingAlgorithm::new(Rc::new(Context::with_seed(13)));
        assert_eq!(a.compute_ordering(&pre), b.compute_ordering(&pre));
    }

    #[quickcheck_macros::quickcheck]
    fn bound_matches_the_naive_simulation(ops: Ops) {
        let g = ops.build();
        let pre = PreprocessedGraph::new(&g);
        let algorithm = AdvancedMinFillOrderingAlgorithm::new(Rc::new(Context::with_seed(17)));
        let ordering = algorithm.compute_ordering(&pre);
        assert_is_permutation(&g, &ordering);
        assert_eq!(
            ordering.required_bag_size(),
            naive_required_bag_size(&g, ordering.sequence())
        );
    }

    #[quickcheck_macros::quickcheck]
    fn agrees_with_plain_min_fill_on_the_bound_class(ops: Ops) {
        // Both engines drive bucket elimination; their outputs must both be
        // valid permutations with bounds the naive simulation reproduces.
        let g = ops.build();
        let pre = PreprocessedGraph::new(&g);
        let plain = MinFillOrderingAlgorithm::new(Rc::new(Context::with_seed(19)));
        let ordering = plain.compute_ordering(&pre);
        assert_is_permutation(&g, &ordering);
        assert_eq!(
            ordering.required_bag_size(),
            naive_required_bag_size(&g, ordering.sequence())
        );
    }
}
