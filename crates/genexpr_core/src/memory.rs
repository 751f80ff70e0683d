//! A programid's mutable instruction buffer.
//!
//! Every cell carries its instruction plus the copied, executed and injected
//! flags used by divide viability checks. Reads and writes index directly;
//! heads are responsible for wrapping positions into range.

use crate::error::{HardwareError, Result};
use crate::inst_set::InstSet;
use genexpr_data::{Genome, Instruction};
use rand::Rng;
use std::ops::Range;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cell {
    pub inst: Instruction,
    pub copied: bool,
    pub executed: bool,
    pub injected: bool,
}

impl Cell {
    fn fresh(inst: Instruction) -> Self {
        Self {
            inst,
            ..Self::default()
        }
    }

    fn clear_flags(&mut self) {
        self.copied = false;
        self.executed = false;
        self.injected = false;
    }
}

#[derive(Debug, Clone)]
pub struct MemorySpace {
    /// Live cells are `cells[..len]`; anything past `len` is necrotic remnant.
    cells: Vec<Cell>,
    len: usize,
    max_size: usize,
}

impl MemorySpace {
    /// Creates a memory holding `genome`. An empty genome yields a single
    /// default instruction so heads always have somewhere to rest.
    #[must_use]
    pub fn new(genome: &Genome, max_size: usize) -> Self {
        let mut cells: Vec<Cell> = genome.iter().copied().map(Cell::fresh).collect();
        if cells.is_empty() {
            cells.push(Cell::default());
        }
        let len = cells.len();
        Self {
            cells,
            len,
            max_size: max_size.max(len),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[must_use]
    pub fn max_size(&self) -> usize {
        self.max_size
    }

    #[must_use]
    pub fn read(&self, pos: usize) -> Instruction {
        self.live()[pos].inst
    }

    pub fn write(&mut self, pos: usize, inst: Instruction) {
        self.live_mut()[pos].inst = inst;
    }

    #[must_use]
    pub fn cell(&self, pos: usize) -> &Cell {
        &self.live()[pos]
    }

    pub fn mark_copied(&mut self, pos: usize) {
        self.live_mut()[pos].copied = true;
    }

    pub fn mark_executed(&mut self, pos: usize) {
        self.live_mut()[pos].executed = true;
    }

    pub fn mark_injected(&mut self, pos: usize) {
        self.live_mut()[pos].injected = true;
    }

    #[must_use]
    pub fn is_copied(&self, pos: usize) -> bool {
        self.live()[pos].copied
    }

    #[must_use]
    pub fn is_executed(&self, pos: usize) -> bool {
        self.live()[pos].executed
    }

    #[must_use]
    pub fn is_injected(&self, pos: usize) -> bool {
        self.live()[pos].injected
    }

    /// Number of copied cells in `range`.
    #[must_use]
    pub fn copied_count(&self, range: Range<usize>) -> usize {
        self.live()[range].iter().filter(|c| c.copied).count()
    }

    /// Number of executed cells in `range`.
    #[must_use]
    pub fn executed_count(&self, range: Range<usize>) -> usize {
        self.live()[range].iter().filter(|c| c.executed).count()
    }

    fn check_size(&self, new_size: usize) -> Result<()> {
        if new_size == 0 || new_size > self.max_size {
            return Err(HardwareError::MemoryBound {
                requested: new_size,
                max: self.max_size,
            });
        }
        Ok(())
    }

    /// Resizes, filling any new cells with the default instruction.
    pub fn resize(&mut self, new_size: usize) -> Result<()> {
        self.check_size(new_size)?;
        let old = self.len;
        self.cells.truncate(old.max(new_size));
        self.cells.resize(new_size.max(old), Cell::default());
        for cell in self.cells.iter_mut().take(new_size).skip(old) {
            *cell = Cell::default();
        }
        self.len = new_size;
        Ok(())
    }

    /// Resizes, re-exposing whatever the buffer held past the old end.
    /// Flags on the re-exposed cells are cleared.
    pub fn resize_necrotic(&mut self, new_size: usize) -> Result<()> {
        self.check_size(new_size)?;
        let old = self.len;
        if new_size > self.cells.len() {
            self.cells.resize(new_size, Cell::default());
        }
        for cell in self.cells.iter_mut().take(new_size).skip(old) {
            cell.clear_flags();
        }
        self.len = new_size;
        Ok(())
    }

    /// Resizes, filling new cells with random instructions from `inst_set`.
    pub fn resize_random<R: Rng + ?Sized>(
        &mut self,
        new_size: usize,
        inst_set: &InstSet,
        rng: &mut R,
    ) -> Result<()> {
        let old = self.len;
        self.resize(new_size)?;
        for pos in old..new_size {
            self.cells[pos] = Cell::fresh(inst_set.random_inst(rng));
        }
        Ok(())
    }

    /// Inserts `genome` before `pos`, keeping the inserted cells' flags clear.
    pub fn insert(&mut self, pos: usize, genome: &Genome) -> Result<()> {
        let new_size = self.len + genome.len();
        self.check_size(new_size)?;
        self.cells.truncate(self.len);
        let tail = self.cells.split_off(pos);
        self.cells.extend(genome.iter().copied().map(Cell::fresh));
        self.cells.extend(tail);
        self.len = new_size;
        Ok(())
    }

    /// Removes `count` cells starting at `pos`.
    pub fn remove(&mut self, pos: usize, count: usize) -> Result<()> {
        let end = (pos + count).min(self.len);
        self.check_size(self.len - (end - pos))?;
        self.cells.truncate(self.len);
        self.cells.drain(pos..end);
        self.len = self.cells.len();
        Ok(())
    }

    /// Copies the instructions in `range` out as a genome.
    #[must_use]
    pub fn crop(&self, range: Range<usize>) -> Genome {
        self.live()[range].iter().map(|c| c.inst).collect()
    }

    #[must_use]
    pub fn to_genome(&self) -> Genome {
        self.crop(0..self.len)
    }

    /// Clears every flag on the live cells.
    pub fn clear_flags(&mut self) {
        for cell in self.live_mut() {
            cell.clear_flags();
        }
    }

    fn live(&self) -> &[Cell] {
        &self.cells[..self.len]
    }

    fn live_mut(&mut self) -> &mut [Cell] {
        let len = self.len;
        &mut self.cells[..len]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memory(ops: &[u8]) -> MemorySpace {
        MemorySpace::new(&Genome::from_ops(ops), 16)
    }

    #[test]
    fn test_empty_genome_gets_one_cell() {
        let mem = MemorySpace::new(&Genome::default(), 16);
        assert_eq!(mem.len(), 1);
        assert_eq!(mem.read(0), Instruction::default());
    }

    #[test]
    fn test_resize_default_fills_with_default() {
        let mut mem = memory(&[5, 6, 7]);
        mem.resize(1).unwrap();
        mem.resize(3).unwrap();
        assert_eq!(mem.to_genome(), Genome::from_ops(&[5, 0, 0]));
    }

    #[test]
    fn test_resize_necrotic_reexposes_remnant() {
        let mut mem = memory(&[5, 6, 7]);
        mem.mark_copied(2);
        mem.resize(1).unwrap();
        mem.resize_necrotic(4).unwrap();
        assert_eq!(mem.to_genome(), Genome::from_ops(&[5, 6, 7, 0]));
        assert!(!mem.is_copied(2));
    }

    #[test]
    fn test_resize_respects_bounds() {
        let mut mem = memory(&[1, 2]);
        assert!(matches!(
            mem.resize(17),
            Err(HardwareError::MemoryBound { requested: 17, .. })
        ));
        assert!(mem.resize(0).is_err());
        assert_eq!(mem.len(), 2);
    }

    #[test]
    fn test_insert_and_remove() {
        let mut mem = memory(&[1, 2, 3]);
        mem.insert(1, &Genome::from_ops(&[9, 9])).unwrap();
        assert_eq!(mem.to_genome(), Genome::from_ops(&[1, 9, 9, 2, 3]));
        mem.remove(1, 2).unwrap();
        assert_eq!(mem.to_genome(), Genome::from_ops(&[1, 2, 3]));
    }

    #[test]
    fn test_flag_counts() {
        let mut mem = memory(&[1, 2, 3, 4]);
        mem.mark_copied(0);
        mem.mark_copied(3);
        mem.mark_executed(1);
        assert_eq!(mem.copied_count(0..4), 2);
        assert_eq!(mem.copied_count(1..3), 0);
        assert_eq!(mem.executed_count(0..4), 1);
        mem.clear_flags();
        assert_eq!(mem.copied_count(0..4), 0);
    }
}
