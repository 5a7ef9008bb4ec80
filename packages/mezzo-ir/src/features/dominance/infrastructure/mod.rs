//! Dominance infrastructure

pub mod dominators;
pub mod errors;
pub mod frontier;
pub mod idom_tree;

pub use dominators::*;
pub use errors::*;
pub use frontier::*;
pub use idom_tree::*;
