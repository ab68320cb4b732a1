use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::cell::RefCell;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// The per-instance state shared by every algorithm of one library instance.
///
/// A context bundles the tie-break random source and the cooperative
/// cancellation flag.  Algorithms on the same instance share it through
/// [std::rc::Rc]; independent decompositions running in parallel each need
/// their own context, graph, and algorithm objects.
///
/// The random source is the sole source of nondeterminism in the engine;
/// with a fixed seed and fixed cancellation timing every observable state is
/// deterministic.
pub struct Context {
    rng: RefCell<StdRng>,
    terminated: Arc<AtomicBool>,
}

/// A `Send` handle that cancels the context it was taken from.
///
/// Cancellation is advisory: the in-flight call observes the flag at its
/// next per-vertex or per-node check and returns valid output (or reports
/// interruption); callers must not touch in-flight data until then.
#[derive(Clone)]
pub struct TerminationHandle(Arc<AtomicBool>);

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

impl Context {
    pub fn new() -> Self {
        Self {
            rng: RefCell::new(StdRng::from_entropy()),
            terminated: Arc::new(AtomicBool::new(false)),
        }
    }

    /// A context whose tie-break draws are reproducible.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: RefCell::new(StdRng::seed_from_u64(seed)),
            terminated: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Reset the random source to a fresh seed.
    pub fn reseed(&self, seed: u64) {
        *self.rng.borrow_mut() = StdRng::seed_from_u64(seed);
    }

    /// Draw a uniform index below `bound`.  `bound` must be positive.
    pub fn draw_index(&self, bound: usize) -> usize {
        debug_assert!(bound > 0);
        self.rng.borrow_mut().gen_range(0..bound)
    }

    pub fn is_terminated(&self) -> bool {
        self.terminated.load(Ordering::Relaxed)
    }

    pub fn termination_handle(&self) -> TerminationHandle {
        TerminationHandle(self.terminated.clone())
    }

    /// Clear the cancellation flag so the instance can be reused.
    pub fn reset_termination(&self) {
        self.terminated.store(false, Ordering::Relaxed);
    }
}

impl TerminationHandle {
    pub fn terminate(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_terminated(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_contexts_draw_identically() {
        let a = Context::with_seed(42);
        let b = Context::with_seed(42);
        let xs: Vec<_> = (0..32).map(|_| a.draw_index(1000)).collect();
        let ys: Vec<_> = (0..32).map(|_| b.draw_index(1000)).collect();
        assert_eq!(xs, ys);
    }

    #[test]
    fn termination_handle_crosses_threads() {
        let ctx = Context::new();
        let handle = ctx.termination_handle();
        assert!(!ctx.is_terminated());
        std::thread::spawn(move || handle.terminate())
            .join()
            .unwrap();
        assert!(ctx.is_terminated());
        ctx.reset_termination();
        assert!(!ctx.is_terminated());
    }
}
