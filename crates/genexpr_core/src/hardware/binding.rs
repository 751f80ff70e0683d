//! Gene expression: binding to sites, copying between programids and
//! dividing a copied genome off as offspring.
//!
//! A programid binds its READ head to a site in another programid whose nops
//! spell the complement of the label after `bind`. The site label becomes its
//! terminator. `p-copy` then moves code from READ to WRITE (which
//! `new-*-programid` left on a fresh programid) until the terminator is
//! copied again. A finished protein is released by both heads and, no longer
//! touched, starts running. A finished genomic copy stays under WRITE so
//! `p-divide` can hand it to the organism as offspring.

use super::{GxHardware, Step};
use crate::interface::ExecContext;
use crate::inst_set::Op;
use crate::programid::MatchSite;
use genexpr_data::{CodeLabel, HeadKind, Register};
use rand::Rng;
use tracing::debug;

impl GxHardware {
    /// Sites for `label` in every bindable programid except the current one.
    fn candidate_sites(&self, label: &CodeLabel) -> Vec<MatchSite> {
        let c = self.cur();
        self.programids
            .iter()
            .filter(|p| p.index() != c && p.is_bindable())
            .flat_map(|p| p.sites(label, &self.inst_set))
            .collect()
    }

    /// Binds READ to a uniformly chosen site for the following label.
    fn bind_read_head(&mut self, ctx: &mut ExecContext<'_>) -> bool {
        let label = self.read_label();
        if label.is_empty() {
            return false;
        }
        let sites = self.candidate_sites(&label);
        if sites.is_empty() {
            return false;
        }
        let site = &sites[ctx.rng.gen_range(0..sites.len())];
        let c = self.cur();
        let rebind = self.programids[c].bind(HeadKind::Read, site);
        self.apply_rebind(c, rebind);
        self.stats.binds += 1;
        debug!(
            programid = c,
            target = site.programid,
            position = site.position,
            "Bound read head"
        );
        true
    }

    pub(super) fn inst_bind(&mut self, ctx: &mut ExecContext<'_>) -> Step {
        Step::from_bool(self.bind_read_head(ctx))
    }

    /// Executes the next instruction only if the bind succeeds.
    pub(super) fn inst_if_bind(&mut self, ctx: &mut ExecContext<'_>) -> Step {
        if !self.bind_read_head(ctx) {
            self.advance_ip();
        }
        Step::DONE
    }

    /// BX = number of sites the following label could bind.
    pub(super) fn inst_num_sites(&mut self) -> Step {
        let label = self.read_label();
        let count = self.candidate_sites(&label).len();
        self.set_reg(Register::Bx, count as i32);
        Step::DONE
    }

    /// Returns a programid's READ and WRITE heads home. A trailing cell the
    /// copy never reached is trimmed off the write target.
    pub(super) fn disassociate_programid(&mut self, index: usize) {
        let write = *self.programids[index].head(HeadKind::Write);
        if write.is_foreign() {
            let memory = &mut self.programids[write.space()].memory;
            let last = memory.len() - 1;
            if last > 0 && !memory.is_copied(last) {
                let _ = memory.resize(last);
            }
        }
        let rebinds = self.programids[index].disassociate();
        for rebind in rebinds {
            self.apply_rebind(index, rebind);
        }
        self.stats.disassociations += 1;
    }

    /// Copies one instruction from READ to WRITE. Both heads must rest on
    /// two different foreign programids, and a cell is never copied over.
    pub(super) fn inst_programid_copy(&mut self) -> Step {
        let c = self.cur();
        let (read, write) = (self.head(HeadKind::Read), self.head(HeadKind::Write));
        if !read.is_foreign() || !write.is_foreign() || read.space() == write.space() {
            return Step::FAILED;
        }
        let (src, from) = self.locate(HeadKind::Read);
        let (dst, to) = self.locate(HeadKind::Write);
        if !self.programids[src].is_readable() || self.programids[dst].memory.is_copied(to) {
            return Step::FAILED;
        }

        let inst = self.programids[src].memory.read(from);
        self.programids[src].memory.mark_copied(from);
        {
            let target = &mut self.programids[dst].memory;
            target.write(to, inst);
            target.mark_copied(to);
            if to + 1 == target.len() {
                let _ = target.resize(to + 2);
            }
        }

        let op = self.inst_set.op(inst);
        let nop = self.inst_set.nop_mod(inst);
        let finished = {
            let prog = &mut self.programids[c];
            if op == Some(Op::Site) {
                prog.copying_site = true;
                prog.copying_label.clear();
            } else if prog.copying_site {
                match nop {
                    Some(nop) => prog.copying_label.push(nop),
                    None => {
                        prog.copying_site = false;
                        prog.copying_label.clear();
                    }
                }
            }
            prog.copying_site
                && !prog.terminator_label.is_empty()
                && prog.copying_label == prog.terminator_label
        };

        self.advance_head(HeadKind::Read);
        self.advance_head(HeadKind::Write);
        if finished {
            debug!(programid = c, target = dst, "Copy reached terminator");
            if self.programids[dst].is_executable() {
                self.disassociate_programid(c);
            } else {
                // a finished genomic copy stays under WRITE for p-divide
                let rebind = self.programids[c].release_read();
                self.apply_rebind(c, rebind);
            }
        }
        Step::DONE
    }

    /// Offers the programid under WRITE as offspring and removes it.
    pub(super) fn inst_programid_divide(&mut self, ctx: &mut ExecContext<'_>) -> Step {
        let write = self.head(HeadKind::Write);
        if !write.is_foreign() {
            return Step::FAILED;
        }
        let target = write.space();
        let memory = &self.programids[target].memory;
        let mut size = memory.len();
        if size > 1 && !memory.is_copied(size - 1) {
            size -= 1;
        }

        let (min, max) = self.offspring_bounds();
        if !(min..=max).contains(&size) {
            return Step::FAILED;
        }
        let copied = memory.copied_count(0..size);
        if (copied as f64) < self.config.genome.min_copied_lines * size as f64 {
            return Step::FAILED;
        }
        let child = memory.crop(0..size);
        if !ctx.organism.divide(&child) {
            return Step::FAILED;
        }

        let c = self.cur();
        self.disassociate_programid(c);
        self.remove_programid(target);
        self.finish_divide(size);
        Step::DONE
    }
}
