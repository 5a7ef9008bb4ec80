//! Data Flow ports

pub mod lattice;

pub use lattice::*;
