//! Programids: independently executing fragments of an organism's genome.
//!
//! Each programid owns a memory space, registers, a stack and a full set of
//! heads. Its heads may rest on other programids' memories, and other
//! programids' heads may rest on it; `contacts` counts the latter. A
//! programid with any foreign head on it is paused.

use crate::head::{label_at, Head, Rebind};
use crate::inst_set::InstSet;
use crate::memory::MemorySpace;
use crate::stack::CpuStack;
use genexpr_data::{
    Capabilities, CodeLabel, Genome, HeadKind, HeadSnapshot, ProgramidSnapshot, Register,
    NUM_HEADS, NUM_REGISTERS,
};

/// Where a label matched inside a programid's memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchSite {
    pub programid: usize,
    /// First symbol of the matching site.
    pub position: usize,
    /// The site's own label, the complement of the label searched for.
    pub label: CodeLabel,
}

#[derive(Debug, Clone)]
pub struct Programid {
    index: usize,
    unique_id: u32,
    capabilities: Capabilities,
    contacts: usize,
    cycles_used: u32,
    heads: [Head; NUM_HEADS],
    pub registers: [i32; NUM_REGISTERS],
    pub stack: CpuStack,
    pub memory: MemorySpace,
    /// A `site` instruction was just copied; following nops form `copying_label`.
    pub copying_site: bool,
    pub copying_label: CodeLabel,
    /// Site label that ends the current copy when copied again.
    pub terminator_label: CodeLabel,
    /// Label read by the most recent label-reading instruction.
    pub next_label: CodeLabel,
    /// Nops passed over by `h-read`.
    pub read_label: CodeLabel,
}

impl Programid {
    #[must_use]
    pub fn new(
        index: usize,
        unique_id: u32,
        capabilities: Capabilities,
        genome: &Genome,
        max_size: usize,
    ) -> Self {
        Self {
            index,
            unique_id,
            capabilities,
            contacts: 0,
            cycles_used: 0,
            heads: [Head::new(index); NUM_HEADS],
            registers: [0; NUM_REGISTERS],
            stack: CpuStack::new(),
            memory: MemorySpace::new(genome, max_size),
            copying_site: false,
            copying_label: CodeLabel::new(),
            terminator_label: CodeLabel::new(),
            next_label: CodeLabel::new(),
            read_label: CodeLabel::new(),
        }
    }

    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    #[must_use]
    pub fn unique_id(&self) -> u32 {
        self.unique_id
    }

    #[must_use]
    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    #[must_use]
    pub fn is_executable(&self) -> bool {
        self.capabilities.executable
    }

    #[must_use]
    pub fn is_bindable(&self) -> bool {
        self.capabilities.bindable
    }

    #[must_use]
    pub fn is_readable(&self) -> bool {
        self.capabilities.readable
    }

    /// Foreign heads currently resting on this programid.
    #[must_use]
    pub fn contacts(&self) -> usize {
        self.contacts
    }

    #[must_use]
    pub fn cycles_used(&self) -> u32 {
        self.cycles_used
    }

    pub fn increment_cycles(&mut self) {
        self.cycles_used = self.cycles_used.saturating_add(1);
    }

    /// Runs this cycle only if executable and untouched by foreign heads.
    #[must_use]
    pub fn can_execute(&self) -> bool {
        self.capabilities.executable && self.contacts == 0
    }

    #[must_use]
    pub fn head(&self, kind: HeadKind) -> &Head {
        &self.heads[kind.index()]
    }

    /// Mutable head access. Moving a head to another space must go through
    /// [`Head::bind_to`] with the returned [`Rebind`] applied.
    pub(crate) fn head_mut(&mut self, kind: HeadKind) -> &mut Head {
        &mut self.heads[kind.index()]
    }

    #[must_use]
    pub fn heads(&self) -> &[Head; NUM_HEADS] {
        &self.heads
    }

    pub(crate) fn heads_mut(&mut self) -> &mut [Head; NUM_HEADS] {
        &mut self.heads
    }

    #[must_use]
    pub fn register(&self, reg: Register) -> i32 {
        self.registers[reg.index()]
    }

    pub fn set_register(&mut self, reg: Register, value: i32) {
        self.registers[reg.index()] = value;
    }

    /// Every position whose nops spell the complement of `label`.
    #[must_use]
    pub fn sites(&self, label: &CodeLabel, inst_set: &InstSet) -> Vec<MatchSite> {
        if label.is_empty() || label.len() > self.memory.len() {
            return Vec::new();
        }
        let target = label.complement();
        (0..=self.memory.len() - target.len())
            .filter(|&p| label_at(&self.memory, inst_set, p, &target))
            .map(|position| MatchSite {
                programid: self.index,
                position,
                label: target.clone(),
            })
            .collect()
    }

    /// Rests the head of `kind` on `site`, arming the terminator.
    pub fn bind(&mut self, kind: HeadKind, site: &MatchSite) -> Rebind {
        self.terminator_label = site.label.clone();
        self.copying_site = false;
        self.copying_label.clear();
        self.heads[kind.index()].bind_to(site.programid, site.position)
    }

    /// Ends the current copy and returns READ home. WRITE stays put.
    pub fn release_read(&mut self) -> Rebind {
        self.terminator_label.clear();
        self.copying_site = false;
        self.copying_label.clear();
        self.heads[HeadKind::Read.index()].reset()
    }

    /// Returns READ and WRITE to this programid's memory, ending any copy.
    pub fn disassociate(&mut self) -> [Rebind; 2] {
        [
            self.release_read(),
            self.heads[HeadKind::Write.index()].reset(),
        ]
    }

    /// Re-anchors every head at position 0 of this programid.
    pub fn reset_heads(&mut self) -> Vec<Rebind> {
        self.heads.iter_mut().map(Head::reset).collect()
    }

    /// Counts a head of `owner` that came to rest here.
    pub fn add_contacting_head(&mut self, owner: usize) {
        if owner == self.index {
            return;
        }
        self.contacts += 1;
    }

    /// Uncounts a head of `owner` that left.
    ///
    /// # Panics
    /// When no foreign head was counted.
    pub fn remove_contacting_head(&mut self, owner: usize) {
        if owner == self.index {
            return;
        }
        assert!(
            self.contacts > 0,
            "contact counter of programid {} would go negative",
            self.index
        );
        self.contacts -= 1;
    }

    /// Compacts indices after programid `removed` left the collection.
    pub(crate) fn reindex(&mut self, removed: usize) {
        if self.index > removed {
            self.index -= 1;
        }
        for head in &mut self.heads {
            head.reindex(removed);
        }
    }

    #[must_use]
    pub fn snapshot(&self) -> ProgramidSnapshot {
        ProgramidSnapshot {
            index: self.index,
            unique_id: self.unique_id,
            capabilities: self.capabilities,
            contacts: self.contacts,
            cycles_used: self.cycles_used,
            registers: self.registers.to_vec(),
            stack: self.stack.to_vec(),
            heads: self
                .heads
                .iter()
                .map(|h| HeadSnapshot {
                    space: h.space(),
                    position: h.position(),
                })
                .collect(),
            terminator: self.terminator_label.clone(),
            memory: self.memory.to_genome(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn programid(index: usize, names: &str) -> Programid {
        let set = InstSet::default_gx();
        let genome = set.parse_genome(names).unwrap();
        Programid::new(index, index as u32, Capabilities::ORIGIN, &genome, 64)
    }

    #[test]
    fn test_sites_match_complement() {
        let set = InstSet::default_gx();
        // complement of A B is B C
        let p = programid(1, "site nop-B nop-C inc site nop-B nop-C nop-A");
        let sites = p.sites(&CodeLabel::from_nops(&[0, 1]), &set);
        let positions: Vec<usize> = sites.iter().map(|s| s.position).collect();
        assert_eq!(positions, vec![1, 5]);
        assert!(sites.iter().all(|s| s.programid == 1));
        assert_eq!(sites[0].label, CodeLabel::from_nops(&[1, 2]));
    }

    #[test]
    fn test_sites_absent() {
        let set = InstSet::default_gx();
        let p = programid(0, "site nop-A nop-A inc");
        assert!(p.sites(&CodeLabel::from_nops(&[0, 1]), &set).is_empty());
        assert!(p.sites(&CodeLabel::new(), &set).is_empty());
    }

    #[test]
    fn test_bind_and_disassociate() {
        let set = InstSet::default_gx();
        let target = programid(1, "site nop-B nop-C inc");
        let site = target.sites(&CodeLabel::from_nops(&[0, 1]), &set).remove(0);

        let mut p = programid(0, "bind nop-A nop-B");
        let rebind = p.bind(HeadKind::Read, &site);
        assert_eq!(rebind.contacted, Some(1));
        assert_eq!(p.head(HeadKind::Read).position(), 1);
        assert_eq!(p.terminator_label, site.label);

        let [read, write] = p.disassociate();
        assert_eq!(read.released, Some(1));
        assert!(write.is_noop());
        assert!(p.terminator_label.is_empty());
        assert!(!p.head(HeadKind::Read).is_foreign());
    }

    #[test]
    fn test_release_read_keeps_write() {
        let set = InstSet::default_gx();
        let target = programid(1, "site nop-B nop-C inc");
        let site = target.sites(&CodeLabel::from_nops(&[0, 1]), &set).remove(0);

        let mut p = programid(0, "bind nop-A nop-B");
        let _ = p.bind(HeadKind::Read, &site);
        let _ = p.head_mut(HeadKind::Write).bind_to(2, 0);
        let rebind = p.release_read();
        assert_eq!(rebind.released, Some(1));
        assert!(p.terminator_label.is_empty());
        assert_eq!(p.head(HeadKind::Write).space(), 2);
    }

    #[test]
    fn test_self_contact_ignored() {
        let mut p = programid(2, "inc");
        p.add_contacting_head(2);
        assert_eq!(p.contacts(), 0);
        p.add_contacting_head(0);
        assert!(!p.can_execute());
        p.remove_contacting_head(0);
        assert!(p.can_execute());
    }

    #[test]
    #[should_panic(expected = "would go negative")]
    fn test_contact_underflow_panics() {
        let mut p = programid(0, "inc");
        p.remove_contacting_head(1);
    }
}
