use crate::algorithm::ordering::*;
use crate::context::Context;
use crate::graph::{PreprocessedGraph, VertexId};
use crate::sets;
use ahash::RandomState;
use keyed_priority_queue::KeyedPriorityQueue;
use std::cmp::Reverse;
use std::collections::HashMap;
use std::rc::Rc;

/// The min-degree baseline: eliminate a vertex of minimum current degree,
/// drawn uniformly at random among the ties, and make its neighbors pairwise
/// adjacent.
pub struct MinDegreeOrderingAlgorithm {
    ctx: Rc<Context>,
}

impl MinDegreeOrderingAlgorithm {
    pub fn new(ctx: Rc<Context>) -> Self {
        Self { ctx }
    }
}

impl OrderingAlgorithm for MinDegreeOrderingAlgorithm {
    fn context(&self) -> &Context {
        &self.ctx
    }

    fn write_ordering_to(
        &self,
        preprocessed: &PreprocessedGraph,
        target: &mut Vec<VertexId>,
    ) -> usize {
        let size = preprocessed.vertex_size();
        let mut neighborhood: HashMap<VertexId, Vec<VertexId>, RandomState> =
            HashMap::with_capacity_and_hasher(size, RandomState::new());
        let mut degree_queue: KeyedPriorityQueue<VertexId, Reverse<usize>, RandomState> =
            KeyedPriorityQueue::with_capacity_and_hasher(size, RandomState::new());
        for v in preprocessed.vertices() {
            let closed = preprocessed.closed_neighborhood(v).to_vec();
            degree_queue.push(*v, Reverse(closed.len() - 1));
            neighborhood.insert(*v, closed);
        }

        let mut required = 0;
        while !degree_queue.is_empty() {
            if self.ctx.is_terminated() {
                break;
            }
            // Pop the whole tie pool, draw one uniformly, put the rest back.
            let (first, priority) = degree_queue.pop().unwrap();
            let mut pool = vec![first];
            while degree_queue
                .peek()
                .map(|(_, p)| *p == priority)
                .unwrap_or(false)
            {
                pool.push(degree_queue.pop().unwrap().0);
            }
            pool.sort_unstable();
            let selected = pool.swap_remove(self.ctx.draw_index(pool.len()));
            for v in pool {
                degree_queue.push(v, priority);
            }

            let selected_neighborhood = neighborhood.remove(&selected).unwrap();
            required = required.max(selected_neighborhood.len());
            for u in selected_neighborhood.iter().filter(|u| **u != selected) {
                let mut merged = sets::union(&neighborhood[u], &selected_neighborhood);
                let position = merged.binary_search(&selected).unwrap();
                merged.remove(position);
                degree_queue.set_priority(u, Reverse(merged.len() - 1)).unwrap();
                neighborhood.insert(*u, merged);
            }
            target.push(selected);
        }

        // Cancellation path: complete the permutation with whatever is left.
        let mut remaining: Vec<VertexId> = neighborhood.keys().copied().collect();
        remaining.sort_unstable();
        append_tail(&neighborhood, remaining.into_iter(), target, required)
    }
}
