//! Decomposition algorithms: elimination orderings, the bucket-elimination
//! builder, and the path/hypertree post-processing algorithms.
pub mod ordering;
pub use self::ordering::*;
mod bucket_elimination;
pub use self::bucket_elimination::*;
mod path;
pub use self::path::*;
mod hypertree;
pub use self::hypertree::*;
