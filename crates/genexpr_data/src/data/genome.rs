use serde::{Deserialize, Serialize};
use std::ops::{Index, IndexMut};

/// A single genome symbol: an opcode indexing the active instruction set.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Instruction(pub u8);

impl Instruction {
    #[must_use]
    pub const fn new(op: u8) -> Self {
        Self(op)
    }

    /// Opcode as an index into the instruction set.
    #[must_use]
    pub const fn op(self) -> usize {
        self.0 as usize
    }
}

impl From<u8> for Instruction {
    fn from(op: u8) -> Self {
        Self(op)
    }
}

/// An ordered instruction sequence: an organism genome or a fragment of one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Genome {
    instructions: Vec<Instruction>,
}

impl Genome {
    #[must_use]
    pub fn new(instructions: Vec<Instruction>) -> Self {
        Self { instructions }
    }

    /// Builds a genome from raw opcodes.
    #[must_use]
    pub fn from_ops(ops: &[u8]) -> Self {
        Self {
            instructions: ops.iter().copied().map(Instruction).collect(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    pub fn push(&mut self, inst: Instruction) {
        self.instructions.push(inst);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Instruction> {
        self.instructions.iter()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Instruction] {
        &self.instructions
    }

    /// Encodes the genome as one hex byte per instruction.
    #[must_use]
    pub fn to_hex(&self) -> String {
        let bytes: Vec<u8> = self.instructions.iter().map(|i| i.0).collect();
        hex::encode(bytes)
    }

    pub fn from_hex(hex_str: &str) -> anyhow::Result<Self> {
        let bytes =
            hex::decode(hex_str.trim()).map_err(|e| anyhow::anyhow!("Invalid hex encoding: {}", e))?;
        if bytes.is_empty() {
            return Err(anyhow::anyhow!("Empty hex string"));
        }
        Ok(Self::from_ops(&bytes))
    }
}

impl Index<usize> for Genome {
    type Output = Instruction;

    fn index(&self, index: usize) -> &Self::Output {
        &self.instructions[index]
    }
}

impl IndexMut<usize> for Genome {
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        &mut self.instructions[index]
    }
}

impl FromIterator<Instruction> for Genome {
    fn from_iter<T: IntoIterator<Item = Instruction>>(iter: T) -> Self {
        Self {
            instructions: iter.into_iter().collect(),
        }
    }
}

impl From<Vec<Instruction>> for Genome {
    fn from(instructions: Vec<Instruction>) -> Self {
        Self { instructions }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_genome_hex_roundtrip() {
        let genome = Genome::from_ops(&[0, 1, 2, 17, 255]);
        let hex = genome.to_hex();
        assert_eq!(hex, "00010211ff");
        assert_eq!(Genome::from_hex(&hex).unwrap(), genome);
    }

    #[test]
    fn test_from_hex_rejects_garbage() {
        assert!(Genome::from_hex("zz").is_err());
        assert!(Genome::from_hex("").is_err());
    }

    #[test]
    fn test_genome_serializes_as_opcode_list() {
        let genome = Genome::from_ops(&[3, 4]);
        let json = serde_json::to_string(&genome).unwrap();
        assert_eq!(json, "[3,4]");
    }
}
