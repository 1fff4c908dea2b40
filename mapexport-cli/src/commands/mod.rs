//! CLI command implementations.

pub mod common;
pub mod export;
pub mod sources;
