//! Multi-hypergraphs and the read-only views the decomposition engine
//! consumes.
//!
//! # Low-level ids
//!
//! Vertices and hyperedges are lightweight ID's, essentially `usize`, with
//! `0` reserved as the unknown value.  Algorithm code may feel free to copy
//! and store these ID's; they stay stable for the lifetime of a graph and
//! are never recycled after removal.
//!
//! # Views
//!
//! [QueryableHypergraph] is the read contract every graph supplier must
//! satisfy: vertex and incidence enumeration, membership tests, and a
//! neighbor-copy method producing a sorted ascending list.  [MultiHypergraph]
//! is the bundled implementation.  [PreprocessedGraph] materialises the
//! per-vertex sorted neighbor lists the ordering engines start from, and
//! [FilteredHyperedgeCollection] is the restrictable hyperedge snapshot that
//! decomposition nodes carry as their induced-edge sets.

mod vertex;
pub use self::vertex::*;
mod edge;
pub use self::edge::*;
mod r#trait;
pub use self::r#trait::*;
mod multi_hypergraph;
pub use self::multi_hypergraph::*;
mod preprocessed;
pub use self::preprocessed::*;
mod filtered;
pub use self::filtered::*;

#[cfg(test)]
pub use self::tests::*;
