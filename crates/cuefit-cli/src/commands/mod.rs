//! CLI command implementations

pub mod fit;
