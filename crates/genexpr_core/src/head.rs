//! Heads: cursors that may rest in another programid's memory.
//!
//! A head names programids by index. `owner` is the programid the head
//! belongs to; `space` is the programid whose memory it currently rests on.
//! When `space != owner` the head is in contact with a foreign programid and
//! that programid's contact counter must include it. Heads never touch the
//! counters themselves: every rebinding returns a [`Rebind`] the machine
//! applies.

use crate::inst_set::InstSet;
use crate::memory::MemorySpace;
use genexpr_data::CodeLabel;

/// Search direction for label lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

/// Contact changes caused by moving a head to another memory space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rebind {
    /// Foreign programid the head stopped touching.
    pub released: Option<usize>,
    /// Foreign programid the head started touching.
    pub contacted: Option<usize>,
}

impl Rebind {
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.released.is_none() && self.contacted.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Head {
    owner: usize,
    space: usize,
    position: usize,
}

impl Head {
    /// A head resting at position 0 of its owner's memory.
    #[must_use]
    pub fn new(owner: usize) -> Self {
        Self {
            owner,
            space: owner,
            position: 0,
        }
    }

    #[must_use]
    pub fn owner(&self) -> usize {
        self.owner
    }

    #[must_use]
    pub fn space(&self) -> usize {
        self.space
    }

    #[must_use]
    pub fn position(&self) -> usize {
        self.position
    }

    /// True while the head rests on a programid other than its owner.
    #[must_use]
    pub fn is_foreign(&self) -> bool {
        self.space != self.owner
    }

    /// Wraps the position into a memory of `len` cells.
    pub fn adjust(&mut self, len: usize) {
        if len > 0 {
            self.position %= len;
        } else {
            self.position = 0;
        }
    }

    pub fn advance(&mut self, len: usize) {
        self.advance_by(1, len);
    }

    pub fn advance_by(&mut self, n: usize, len: usize) {
        self.position = self.position.wrapping_add(n);
        self.adjust(len);
    }

    /// Moves by a signed offset, wrapping in either direction.
    pub fn jump_by(&mut self, offset: i32, len: usize) {
        self.adjust(len);
        if len == 0 {
            return;
        }
        let len_i = len as i64;
        let pos = (self.position as i64 + i64::from(offset)).rem_euclid(len_i);
        self.position = pos as usize;
    }

    /// Sets an absolute position, wrapping negative and oversized values.
    pub fn set(&mut self, position: i32, len: usize) {
        self.position = 0;
        self.jump_by(position, len);
    }

    /// Moves within the current space without changing contact.
    pub fn set_position(&mut self, position: usize, len: usize) {
        self.position = position;
        self.adjust(len);
    }

    /// Finds the first exact occurrence of `label` after the head, wrapping at
    /// most once. Returns the position of the label's last symbol.
    #[must_use]
    pub fn find_label(
        &self,
        label: &CodeLabel,
        direction: Direction,
        memory: &MemorySpace,
        inst_set: &InstSet,
    ) -> Option<usize> {
        let len = memory.len();
        let size = label.len();
        if size == 0 || size > len {
            return None;
        }
        let start = self.position % len;
        (1..=len)
            .map(|k| match direction {
                Direction::Forward => (start + k) % len,
                Direction::Backward => (start + len - k % len) % len,
            })
            .find(|&p| label_at(memory, inst_set, p, label))
            .map(|p| p + size - 1)
    }

    /// Moves to the end of the next occurrence of `label`; stays put if none.
    pub fn jump(
        &mut self,
        label: &CodeLabel,
        direction: Direction,
        memory: &MemorySpace,
        inst_set: &InstSet,
    ) -> bool {
        match self.find_label(label, direction, memory, inst_set) {
            Some(pos) => {
                self.position = pos;
                true
            }
            None => false,
        }
    }

    /// Rests the head on `space` at `position`.
    pub fn bind_to(&mut self, space: usize, position: usize) -> Rebind {
        let previous = self.space;
        self.space = space;
        self.position = position;
        if previous == space {
            return Rebind::default();
        }
        Rebind {
            released: (previous != self.owner).then_some(previous),
            contacted: (space != self.owner).then_some(space),
        }
    }

    /// Returns the head to position 0 of its owner's memory.
    pub fn reset(&mut self) -> Rebind {
        let owner = self.owner;
        self.bind_to(owner, 0)
    }

    /// Compacts indices after programid `removed` left the collection.
    ///
    /// Heads must already have been moved off `removed`.
    pub fn reindex(&mut self, removed: usize) {
        debug_assert!(self.owner != removed && self.space != removed);
        if self.owner > removed {
            self.owner -= 1;
        }
        if self.space > removed {
            self.space -= 1;
        }
    }
}

/// True when the `label.len()` cells starting at `pos` are nops spelling `label`.
pub(crate) fn label_at(
    memory: &MemorySpace,
    inst_set: &InstSet,
    pos: usize,
    label: &CodeLabel,
) -> bool {
    if pos + label.len() > memory.len() {
        return false;
    }
    label
        .nops()
        .iter()
        .enumerate()
        .all(|(i, &nop)| inst_set.nop_mod(memory.read(pos + i)) == Some(nop))
}

#[cfg(test)]
mod tests {
    use super::*;
    use genexpr_data::Genome;

    fn memory(names: &str) -> (MemorySpace, std::sync::Arc<InstSet>) {
        let set = InstSet::default_gx();
        let genome: Genome = set.parse_genome(names).unwrap();
        (MemorySpace::new(&genome, 64), set)
    }

    #[test]
    fn test_advance_wraps() {
        let mut head = Head::new(0);
        head.advance_by(4, 5);
        head.advance(5);
        assert_eq!(head.position(), 0);
        head.jump_by(-1, 5);
        assert_eq!(head.position(), 4);
        head.set(-7, 5);
        assert_eq!(head.position(), 3);
    }

    #[test]
    fn test_find_label_forward_and_backward() {
        let (mem, set) = memory("nop-A nop-B inc nop-A nop-B dec");
        let label = CodeLabel::from_nops(&[0, 1]);
        let mut head = Head::new(0);
        head.set_position(1, mem.len());
        assert_eq!(
            head.find_label(&label, Direction::Forward, &mem, &set),
            Some(4)
        );
        head.set_position(3, mem.len());
        assert_eq!(
            head.find_label(&label, Direction::Backward, &mem, &set),
            Some(1)
        );
    }

    #[test]
    fn test_find_label_wraps_once() {
        let (mem, set) = memory("nop-C inc dec inc");
        let mut head = Head::new(0);
        head.set_position(2, mem.len());
        assert!(head.jump(&CodeLabel::from_nops(&[2]), Direction::Forward, &mem, &set));
        assert_eq!(head.position(), 0);
    }

    #[test]
    fn test_failed_jump_leaves_head_unmoved() {
        let (mem, set) = memory("nop-A inc dec inc");
        let mut head = Head::new(0);
        head.set_position(2, mem.len());
        assert!(!head.jump(&CodeLabel::from_nops(&[1, 1]), Direction::Forward, &mem, &set));
        assert_eq!(head.position(), 2);
        assert!(!head.jump(&CodeLabel::new(), Direction::Backward, &mem, &set));
        assert_eq!(head.position(), 2);
    }

    #[test]
    fn test_bind_to_reports_contacts() {
        let mut head = Head::new(1);
        assert!(head.bind_to(1, 3).is_noop());

        let first = head.bind_to(2, 0);
        assert_eq!(first.released, None);
        assert_eq!(first.contacted, Some(2));

        assert!(head.bind_to(2, 5).is_noop());

        let moved = head.bind_to(0, 0);
        assert_eq!(moved.released, Some(2));
        assert_eq!(moved.contacted, Some(0));

        let back = head.reset();
        assert_eq!(back.released, Some(0));
        assert_eq!(back.contacted, None);
        assert_eq!((head.space(), head.position()), (1, 0));
    }

    #[test]
    fn test_reindex_compacts() {
        let mut head = Head::new(3);
        head.bind_to(5, 2);
        head.reindex(1);
        assert_eq!((head.owner(), head.space()), (2, 4));
        head.reindex(4 + 1);
        assert_eq!((head.owner(), head.space()), (2, 4));
    }
}
