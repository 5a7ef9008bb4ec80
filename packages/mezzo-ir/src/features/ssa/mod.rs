//! SSA feature - conversion into and out of static single assignment form
//!
//! to-SSA places phis on dominance frontiers and renames along the
//! immediate-dominator tree (classical, non-pruned SSA in the style of
//! Cytron et al.); from-SSA lowers phis to copies in predecessors and
//! cleans up with trivial DCE.

pub mod infrastructure;

pub use infrastructure::*;
