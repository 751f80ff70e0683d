//! Creating, evicting and removing programids.

use super::{GxHardware, Step};
use crate::config::ReplacementPolicy;
use crate::programid::Programid;
use genexpr_data::{Capabilities, Genome, HeadKind};
use tracing::debug;

impl GxHardware {
    /// Appends a programid holding `genome` and returns its index.
    pub(super) fn add_programid(&mut self, capabilities: Capabilities, genome: &Genome) -> usize {
        let index = self.programids.len();
        let unique_id = self.next_unique_id;
        self.next_unique_id += 1;
        self.programids.push(Programid::new(
            index,
            unique_id,
            capabilities,
            genome,
            self.config.genome.max_size,
        ));
        index
    }

    /// Frees a slot when the collection is full, per the replacement policy.
    fn make_room(&mut self) -> bool {
        if self.programids.len() < self.config.programids.max_programids {
            return true;
        }
        match self.config.programids.replacement {
            ReplacementPolicy::Reject => false,
            ReplacementPolicy::EvictHighestUsage => {
                let Some(victim) = self.eviction_victim() else {
                    return false;
                };
                debug!(
                    victim,
                    cycles_used = self.programids[victim].cycles_used(),
                    "Evicting programid"
                );
                self.remove_programid(victim);
                self.stats.evictions += 1;
                true
            }
        }
    }

    /// The non-current programid with the most cycles used, first on ties.
    fn eviction_victim(&self) -> Option<usize> {
        let mut victim: Option<usize> = None;
        for (i, prog) in self.programids.iter().enumerate() {
            if Some(i) == self.current {
                continue;
            }
            match victim {
                Some(v) if self.programids[v].cycles_used() >= prog.cycles_used() => {}
                _ => victim = Some(i),
            }
        }
        victim
    }

    /// Allocates an empty programid and rests the current programid's WRITE
    /// head on it. Returns `None` when the collection is full.
    pub fn new_programid(&mut self, capabilities: Capabilities) -> Option<usize> {
        if !self.make_room() {
            return None;
        }
        let index = self.add_programid(capabilities, &Genome::default());
        if let Some(owner) = self.current {
            self.move_head(owner, HeadKind::Write, index, 0);
        }
        self.stats.allocations += 1;
        Some(index)
    }

    /// Adds a programid holding `genome` without touching any head. Subject
    /// to the same capacity policy as the allocation instructions.
    pub fn spawn_programid(
        &mut self,
        capabilities: Capabilities,
        genome: &Genome,
    ) -> Option<usize> {
        if !self.make_room() {
            return None;
        }
        let index = self.add_programid(capabilities, genome);
        debug!(index, size = genome.len(), "Spawned programid");
        Some(index)
    }

    pub(super) fn inst_new_programid(&mut self, capabilities: Capabilities) -> Step {
        Step::from_bool(self.new_programid(capabilities).is_some())
    }

    /// Removes a programid, redirecting every head that touched it and
    /// compacting the indices above it.
    pub fn remove_programid(&mut self, index: usize) {
        if index >= self.programids.len() {
            return;
        }

        // Its own foreign heads release their targets.
        let foreign: Vec<usize> = self.programids[index]
            .heads()
            .iter()
            .filter(|h| h.is_foreign())
            .map(|h| h.space())
            .collect();
        for space in foreign {
            self.programids[space].remove_contacting_head(index);
        }

        // Heads resting on it go home, ending whatever copy they were part of.
        for (i, prog) in self.programids.iter_mut().enumerate() {
            if i == index {
                continue;
            }
            let mut touched = false;
            for head in prog.heads_mut().iter_mut() {
                if head.space() == index {
                    let _ = head.reset();
                    touched = true;
                }
            }
            if touched {
                prog.terminator_label.clear();
                prog.copying_site = false;
                prog.copying_label.clear();
            }
        }

        self.programids.remove(index);
        for prog in &mut self.programids {
            prog.reindex(index);
        }
        self.current = match self.current {
            Some(c) if c == index => None,
            Some(c) if c > index => Some(c - 1),
            other => other,
        };
    }

    /// Removes every programid that has reached the age bound.
    pub(super) fn age_out(&mut self) {
        let max_age = self.config.programids.max_age;
        let mut i = 0;
        while i < self.programids.len() {
            if self.programids[i].cycles_used() >= max_age {
                debug!(
                    programid = i,
                    unique_id = self.programids[i].unique_id(),
                    "Programid aged out"
                );
                self.remove_programid(i);
                self.stats.age_outs += 1;
            } else {
                i += 1;
            }
        }
    }
}
