//! Data Flow feature - generic worklist fixpoint solver plus the stock
//! analyses (reaching definitions, live variables, constant propagation)
//!
//! The solver is parameterized by a `Lattice` capability set; concrete
//! analyses are independent implementers, never subclasses sharing state.

pub mod domain;
pub mod infrastructure;
pub mod ports;

pub use domain::*;
pub use infrastructure::*;
pub use ports::*;
