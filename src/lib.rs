//! Batch driver for the gene-expression hardware.
//!
//! Loads a genome and instruction set, builds one machine per organism and
//! runs them side by side, reporting divides, outputs and a state hash.

pub mod model;

pub use model::config::AppConfig;
pub use model::world::World;
