//! The mutable decomposition store and its bag-level vocabulary.
//!
//! A decomposition is a rooted tree of *bags* — sorted vertex subsets — where
//! every node also carries its induced hyperedges and a name-keyed label map.
//! [TreeDecomposition] is the store the bucket-elimination builder produces
//! and the manipulation pipeline rewrites in place; a path decomposition is
//! the same store constrained to at most one child per node
//! ([TreeDecomposition::is_path]).
//!
//! [verify] checks the universal invariants (coverage, edge coverage, the
//! running intersection property, tree shape, induced-edge agreement) and is
//! the backbone of the test suite.

mod node;
pub use self::node::*;
mod label;
pub use self::label::*;
mod tree;
pub use self::tree::*;
mod verifier;
pub use self::verifier::*;
mod graphviz;
pub use self::graphviz::*;
