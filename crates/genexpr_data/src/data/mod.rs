//! Core data structures for the gene-expression hardware.

pub mod cpu;
pub mod genome;
pub mod label;
pub mod snapshot;
