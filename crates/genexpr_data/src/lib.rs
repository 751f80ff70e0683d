//! # Genexpr Data
//!
//! Plain data shared by the gene-expression hardware and its driver:
//! instructions and genomes, code labels, register and head identifiers,
//! programid capability flags, and serializable machine snapshots.

pub mod data;

pub use data::cpu::{Capabilities, HeadKind, Register, NUM_HEADS, NUM_REGISTERS};
pub use data::genome::{Genome, Instruction};
pub use data::label::{CodeLabel, MAX_LABEL_SIZE, NUM_NOPS};
pub use data::snapshot::{HardwareSnapshot, HardwareStats, HeadSnapshot, ProgramidSnapshot};
