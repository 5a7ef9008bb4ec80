//! SSA infrastructure

pub mod errors;
pub mod from_ssa;
pub mod to_ssa;

pub use errors::*;
pub use from_ssa::*;
pub use to_ssa::*;
