use super::cpu::Capabilities;
use super::genome::Genome;
use super::label::CodeLabel;
use serde::{Deserialize, Serialize};

/// Position of one head: the programid it rests on and the offset there.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeadSnapshot {
    pub space: usize,
    pub position: usize,
}

/// Serializable view of a single programid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgramidSnapshot {
    pub index: usize,
    pub unique_id: u32,
    pub capabilities: Capabilities,
    pub contacts: usize,
    pub cycles_used: u32,
    pub registers: Vec<i32>,
    pub stack: Vec<i32>,
    pub heads: Vec<HeadSnapshot>,
    pub terminator: CodeLabel,
    pub memory: Genome,
}

/// Cumulative counters kept by a machine across cycles.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HardwareStats {
    pub cycles: u64,
    pub instructions: u64,
    pub failures: u64,
    pub cost_paid: u64,
    pub allocations: u64,
    pub evictions: u64,
    pub binds: u64,
    pub disassociations: u64,
    pub divides: u64,
    pub age_outs: u64,
    pub injections: u64,
}

/// Serializable view of a whole gene-expression machine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HardwareSnapshot {
    pub genome_size: usize,
    pub next_unique_id: u32,
    pub current: Option<usize>,
    pub programids: Vec<ProgramidSnapshot>,
    pub stats: HardwareStats,
}
