//! Instructions that read and rewrite the programid's own code, allocate
//! memory, divide, and act on the organism.

use super::{GxHardware, Step};
use crate::config::AllocMethod;
use crate::interface::ExecContext;
use genexpr_data::{CodeLabel, HeadKind, Instruction, Register, NUM_NOPS};
use rand::Rng;
use std::sync::Arc;
use tracing::info;

impl GxHardware {
    /// Size bounds every offspring must fall within.
    pub(super) fn offspring_bounds(&self) -> (usize, usize) {
        let limits = &self.config.genome;
        let size = self.genome.len() as f64;
        let min = limits
            .min_size
            .max((size / limits.offspring_size_range) as usize);
        let max = limits
            .max_size
            .min((size * limits.offspring_size_range) as usize);
        (min, max)
    }

    pub(super) fn finish_divide(&mut self, child_size: usize) {
        self.just_divided = true;
        self.allocation_active = false;
        self.stats.divides += 1;
        info!(
            child_size,
            divides = self.stats.divides,
            cycle = self.stats.cycles,
            "Divide"
        );
    }

    fn own_cell(&self, offset: i32) -> (usize, Instruction) {
        let pos = self.wrap_own(offset);
        (pos, self.prog().memory.read(pos))
    }

    fn write_own(&mut self, pos: usize, inst: Instruction) {
        let memory = &mut self.prog_mut().memory;
        memory.write(pos, inst);
        memory.mark_copied(pos);
    }

    /// Opcode to write, reduced into the instruction set.
    fn wrap_inst(&self, value: i32) -> Instruction {
        let len = self.inst_set.len().max(1) as i32;
        Instruction(value.rem_euclid(len) as u8)
    }

    /// `mem[AX + BX] = mem[BX]`.
    pub(super) fn inst_copy(&mut self) -> Step {
        let (ax, bx) = (self.reg(Register::Ax), self.reg(Register::Bx));
        let (_, inst) = self.own_cell(bx);
        let to = self.wrap_own(ax.wrapping_add(bx));
        self.write_own(to, inst);
        Step::DONE
    }

    pub(super) fn inst_read_inst(&mut self) -> Step {
        let dst = self.find_modified_register(Register::Cx);
        let (_, inst) = self.own_cell(self.reg(Register::Bx));
        self.set_reg(dst, inst.op() as i32);
        Step::DONE
    }

    pub(super) fn inst_write_inst(&mut self) -> Step {
        let src = self.find_modified_register(Register::Cx);
        let to = self.wrap_own(self.reg(Register::Ax).wrapping_add(self.reg(Register::Bx)));
        let inst = self.wrap_inst(self.reg(src));
        self.write_own(to, inst);
        Step::DONE
    }

    pub(super) fn inst_stack_read_inst(&mut self) -> Step {
        let reg = self.find_modified_register(Register::Cx);
        let (_, inst) = self.own_cell(self.reg(reg));
        self.stack_push(inst.op() as i32);
        Step::DONE
    }

    pub(super) fn inst_stack_write_inst(&mut self) -> Step {
        let reg = self.find_modified_register(Register::Ax);
        let to = self.wrap_own(self.reg(reg).wrapping_add(self.reg(Register::Bx)));
        let Some(value) = self.stack_pop() else {
            return Step::FAILED;
        };
        let inst = self.wrap_inst(value);
        self.write_own(to, inst);
        Step::DONE
    }

    pub(super) fn inst_compare(&mut self) -> Step {
        let dst = self.find_modified_register(Register::Cx);
        let (ax, bx) = (self.reg(Register::Ax), self.reg(Register::Bx));
        let (_, from) = self.own_cell(bx);
        let (_, to) = self.own_cell(ax.wrapping_add(bx));
        self.set_reg(dst, from.op() as i32 - to.op() as i32);
        Step::DONE
    }

    /// Executes the next instruction only if `mem[BX]` and `mem[AX + BX]` differ.
    pub(super) fn inst_if_n_cpy(&mut self) -> Step {
        let (ax, bx) = (self.reg(Register::Ax), self.reg(Register::Bx));
        let (_, from) = self.own_cell(bx);
        let (_, to) = self.own_cell(ax.wrapping_add(bx));
        if from == to {
            self.advance_ip();
        }
        Step::DONE
    }

    /// Grows the current memory by `allocated` cells using the configured
    /// fill method.
    pub(super) fn allocate_main(&mut self, ctx: &mut ExecContext<'_>, allocated: i32) -> bool {
        if self.config.alloc.require_allocate && self.allocation_active {
            return false;
        }
        if allocated < 1 {
            return false;
        }
        let allocated = allocated as usize;
        let old = self.prog().memory.len();
        let new = old + allocated;
        if new > self.config.genome.max_size {
            return false;
        }
        let range = self.config.genome.child_size_range;
        if allocated as f64 > old as f64 * range || old as f64 > allocated as f64 * range {
            return false;
        }

        let set = Arc::clone(&self.inst_set);
        let method = self.config.alloc.method;
        let memory = &mut self.prog_mut().memory;
        let resized = match method {
            AllocMethod::Default => memory.resize(new),
            AllocMethod::Necrotic => memory.resize_necrotic(new),
            AllocMethod::Random => memory.resize_random(new, &set, &mut *ctx.rng),
        };
        if resized.is_err() {
            return false;
        }
        self.allocation_active = true;
        true
    }

    /// Allocates BX cells; AX receives the old size.
    pub(super) fn inst_allocate(&mut self, ctx: &mut ExecContext<'_>) -> Step {
        let old = self.prog().memory.len();
        let size = self.reg(Register::Bx);
        if !self.allocate_main(ctx, size) {
            return Step::FAILED;
        }
        self.set_reg(Register::Ax, old as i32);
        Step::DONE
    }

    /// Doubles the memory.
    pub(super) fn inst_c_alloc(&mut self, ctx: &mut ExecContext<'_>) -> Step {
        let old = self.prog().memory.len();
        Step::from_bool(self.allocate_main(ctx, old as i32))
    }

    /// Grows as far as the child size range and the size bound allow.
    pub(super) fn inst_max_alloc(&mut self, ctx: &mut ExecContext<'_>) -> Step {
        let old = self.prog().memory.len();
        let target = ((old as f64 * self.config.genome.child_size_range) as usize)
            .min(self.config.genome.max_size);
        if target <= old || !self.allocate_main(ctx, (target - old) as i32) {
            return Step::FAILED;
        }
        self.set_reg(Register::Ax, old as i32);
        Step::DONE
    }

    /// Splits `mem[READ..WRITE]` off as offspring; WRITE at 0 means the end.
    pub(super) fn inst_head_divide(&mut self, ctx: &mut ExecContext<'_>) -> Step {
        if self.head(HeadKind::Read).is_foreign() || self.head(HeadKind::Write).is_foreign() {
            return Step::FAILED;
        }
        let (_, divide_pos) = self.locate(HeadKind::Read);
        let (_, write) = self.locate(HeadKind::Write);
        let child_end = if write == 0 {
            self.prog().memory.len()
        } else {
            write
        };
        if child_end <= divide_pos {
            return Step::FAILED;
        }
        self.divide_main(ctx, divide_pos, child_end)
    }

    fn divide_main(
        &mut self,
        ctx: &mut ExecContext<'_>,
        divide_pos: usize,
        child_end: usize,
    ) -> Step {
        let (min, max) = self.offspring_bounds();
        let parent_size = divide_pos;
        let child_size = child_end - divide_pos;
        if !(min..=max).contains(&parent_size) || !(min..=max).contains(&child_size) {
            return Step::FAILED;
        }
        let limits = &self.config.genome;
        let memory = &self.prog().memory;
        let executed = memory.executed_count(0..parent_size);
        if (executed as f64) < limits.min_exe_lines * parent_size as f64 {
            return Step::FAILED;
        }
        let copied = memory.copied_count(divide_pos..child_end);
        if (copied as f64) < limits.min_copied_lines * child_size as f64 {
            return Step::FAILED;
        }
        let child = memory.crop(divide_pos..child_end);
        if !ctx.organism.divide(&child) {
            return Step::FAILED;
        }

        let prog = self.prog_mut();
        if prog.memory.resize(parent_size).is_err() {
            return Step::FAILED;
        }
        prog.memory.clear_flags();
        for kind in [HeadKind::Read, HeadKind::Write, HeadKind::Flow] {
            prog.head_mut(kind).set_position(0, parent_size);
        }
        prog.head_mut(HeadKind::Ip).adjust(parent_size);
        self.finish_divide(child_size);
        Step::DONE
    }

    /// Sends `mem[READ..WRITE]` to a neighbor as a parasite, tagged with the
    /// complement of the following label.
    pub(super) fn inst_inject(&mut self, ctx: &mut ExecContext<'_>) -> Step {
        let label = self.read_label().complement();
        self.inject_code(ctx, &label)
    }

    /// `inject` tagged with a random three-nop label instead.
    pub(super) fn inst_inject_rand(&mut self, ctx: &mut ExecContext<'_>) -> Step {
        let nops: Vec<u8> = (0..3)
            .map(|_| ctx.rng.gen_range(0..NUM_NOPS as u8))
            .collect();
        self.inject_code(ctx, &CodeLabel::from_nops(&nops))
    }

    fn inject_code(&mut self, ctx: &mut ExecContext<'_>, label: &CodeLabel) -> Step {
        if self.head(HeadKind::Read).is_foreign() || self.head(HeadKind::Write).is_foreign() {
            return Step::FAILED;
        }
        let (_, start) = self.locate(HeadKind::Read);
        let (_, end) = self.locate(HeadKind::Write);
        let len = self.prog().memory.len();
        if end <= start || end - start >= len {
            return Step::FAILED;
        }
        if ctx.organism.num_neighbors() == 0 {
            return Step::FAILED;
        }
        let code = self.prog().memory.crop(start..end);
        if !ctx.organism.inject_parasite(label, &code) {
            return Step::FAILED;
        }
        let c = self.cur();
        Step::from_bool(self.remove_code(c, start, end - start))
    }

    /// Explodes with probability `(reg mod 100) / 100` (default AX).
    pub(super) fn inst_kazi(&mut self, ctx: &mut ExecContext<'_>) -> Step {
        let reg = self.find_modified_register(Register::Ax);
        let chance = f64::from(self.reg(reg).rem_euclid(100)) / 100.0;
        if ctx.rng.gen_bool(chance) {
            ctx.organism.kaboom(0);
        }
        Step::DONE
    }

    /// Explodes unconditionally, reaching as far as a register (default AX).
    pub(super) fn inst_kazi5(&mut self, ctx: &mut ExecContext<'_>) -> Step {
        let reg = self.find_modified_register(Register::Ax);
        ctx.organism.kaboom(self.reg(reg));
        Step::DONE
    }
}
