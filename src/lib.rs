//! Tree, path, and hypertree decompositions of multi-hypergraphs.
//!
//! A *tree decomposition* of a graph is a tree of *bags* — vertex subsets —
//! such that every vertex appears in a bag, every hyperedge fits into a bag,
//! and the bags holding any fixed vertex form a connected subtree.  Finding
//! decompositions of minimum *width* (largest bag minus one) is NP-hard, so
//! this crate drives bucket elimination with heuristic elimination
//! orderings: min-degree, min-fill, and an incremental advanced min-fill.
//!
//! # Pipeline
//!
//! A [MultiHypergraph](graph::MultiHypergraph) (or any
//! [QueryableHypergraph](graph::QueryableHypergraph)) is preprocessed into
//! sorted neighbor lists, an ordering engine produces a vertex permutation,
//! [BucketEliminationAlgorithm](algorithm::BucketEliminationAlgorithm) turns
//! it into a rooted [TreeDecomposition](decomposition::TreeDecomposition),
//! and the [operation](crate::operation) pipeline rewrites the result in
//! place into shape normal forms while keeping it valid.
//!
//! ```
//! use std::rc::Rc;
//! use treedec::algorithm::BucketEliminationAlgorithm;
//! use treedec::graph::{GrowableHypergraph, MultiHypergraph};
//! use treedec::Context;
//!
//! let mut graph = MultiHypergraph::new();
//! let vs = graph.add_vertices(3);
//! graph.add_hyperedge(vec![vs[0], vs[1]]).unwrap();
//! graph.add_hyperedge(vec![vs[1], vs[2]]).unwrap();
//!
//! let algorithm = BucketEliminationAlgorithm::new(Rc::new(Context::with_seed(42)));
//! let decomposition = algorithm.compute_decomposition(&graph).unwrap();
//! assert_eq!(decomposition.width(), 1);
//! ```
//!
//! # Instances and cancellation
//!
//! Every algorithm object belongs to a [Context] — the library instance
//! holding the seedable tie-break random source and the cooperative
//! cancellation flag.  Independent decompositions may run in parallel as
//! long as each has its own context, graph, and algorithm objects; a
//! [TerminationHandle] can cancel an in-flight computation from another
//! thread.

pub mod algorithm;
pub mod decomposition;
pub mod graph;
pub mod operation;

mod context;
pub use self::context::*;
mod error;
pub use self::error::*;
pub(crate) mod sets;
