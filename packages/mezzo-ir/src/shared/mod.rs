//! Shared models and utilities

pub mod constants;
pub mod models;
