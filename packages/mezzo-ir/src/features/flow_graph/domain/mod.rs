//! Flow Graph domain model

pub mod cfg;

pub use cfg::*;
