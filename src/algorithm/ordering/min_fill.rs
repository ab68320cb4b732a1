use crate::algorithm::ordering::*;
use crate::context::Context;
use crate::graph::{PreprocessedGraph, VertexId};
use crate::sets;
use ahash::RandomState;
use std::collections::{BTreeSet, HashMap};
use std::rc::Rc;

/// The plain min-fill engine: eliminate a vertex whose elimination adds the
/// fewest edges, drawn uniformly among the ties.
///
/// After every elimination the fill values of the distance-two neighborhood
/// of the eliminated vertex are recomputed from scratch; the advanced engine
/// replaces that rescan with incremental maintenance.
pub struct MinFillOrderingAlgorithm {
    ctx: Rc<Context>,
}

impl MinFillOrderingAlgorithm {
    pub fn new(ctx: Rc<Context>) -> Self {
        Self { ctx }
    }
}

impl OrderingAlgorithm for MinFillOrderingAlgorithm {
    fn context(&self) -> &Context {
        &self.ctx
    }

    fn write_ordering_to(
        &self,
        preprocessed: &PreprocessedGraph,
        target: &mut Vec<VertexId>,
    ) -> usize {
        let size = preprocessed.vertex_size();
        let mut remaining: BTreeSet<VertexId> = preprocessed.vertices().iter().copied().collect();
        let mut neighborhood: HashMap<VertexId, Vec<VertexId>, RandomState> =
            HashMap::with_capacity_and_hasher(size, RandomState::new());
        for v in remaining.iter() {
            neighborhood.insert(*v, preprocessed.closed_neighborhood(v).to_vec());
        }
        let mut fill: HashMap<VertexId, usize, RandomState> =
            HashMap::with_capacity_and_hasher(size, RandomState::new());
        for v in remaining.iter() {
            fill.insert(*v, fill_value(&neighborhood, &neighborhood[v]));
        }

        let mut required = 0;
        while !remaining.is_empty() {
            if self.ctx.is_terminated() {
                break;
            }
            let min_fill = remaining.iter().map(|v| fill[v]).min().unwrap();
            let pool: Vec<VertexId> = remaining
                .iter()
                .filter(|v| fill[*v] == min_fill)
                .copied()
                .collect();
            let selected = pool[self.ctx.draw_index(pool.len())];

            let selected_neighborhood = neighborhood.remove(&selected).unwrap();
            remaining.remove(&selected);
            fill.remove(&selected);
            required = required.max(selected_neighborhood.len());

            let mut dirty: BTreeSet<VertexId> = BTreeSet::new();
            for u in selected_neighborhood.iter().filter(|u| **u != selected) {
                let mut merged = sets::union(&neighborhood[u], &selected_neighborhood);
                let position = merged.binary_search(&selected).unwrap();
                merged.remove(position);
                dirty.extend(merged.iter().copied());
                neighborhood.insert(*u, merged);
            }
            for w in dirty {
                if remaining.contains(&w) {
                    fill.insert(w, fill_value(&neighborhood, &neighborhood[&w]));
                }
            }
            target.push(selected);
        }

        let tail: Vec<VertexId> = remaining.iter().copied().collect();
        append_tail(&neighborhood, tail.into_iter(), target, required)
    }
}
