//! The gene-expression machine.
//!
//! A [`GxHardware`] holds an ordered collection of programids. Each CPU cycle
//! every programid that is executable and free of foreign heads executes one
//! instruction, in index order. Programids are created by the
//! `new-*-programid` instructions, pattern-match onto one another with
//! `bind`, copy code across with `p-copy`, and are removed when they age out,
//! are evicted, or are divided off as offspring.
//!
//! Heads address memory spaces by programid index. Removing a programid
//! redirects every head that rested on it and compacts all higher indices,
//! so indices stay dense and equal to positions.
//!
//! Instruction handlers live in submodules by family and all return a
//! [`Step`]. A failed step is local to the instruction.

mod binding;
mod bio;
mod flow;
mod heads;
mod io;
mod lifecycle;
mod math;

use crate::config::HardwareConfig;
use crate::error::{HardwareError, Result};
use crate::head::{Head, Rebind};
use crate::inst_set::{InstSet, Op};
use crate::interface::ExecContext;
use crate::programid::Programid;
use genexpr_data::{
    Capabilities, CodeLabel, Genome, HardwareSnapshot, HardwareStats, HeadKind, Instruction,
    Register, MAX_LABEL_SIZE, NUM_HEADS,
};
use std::sync::Arc;
use tracing::{debug, warn};

/// Outcome of one instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    pub success: bool,
    /// Move the IP past the instruction afterwards.
    pub advance_ip: bool,
}

impl Step {
    pub const DONE: Step = Step {
        success: true,
        advance_ip: true,
    };
    pub const FAILED: Step = Step {
        success: false,
        advance_ip: true,
    };
    /// Succeeded and already placed the IP.
    pub const JUMPED: Step = Step {
        success: true,
        advance_ip: false,
    };

    #[must_use]
    pub fn from_bool(success: bool) -> Self {
        Self {
            success,
            advance_ip: true,
        }
    }
}

pub struct GxHardware {
    config: HardwareConfig,
    inst_set: Arc<InstSet>,
    /// Organism genome the origin programid is built from.
    genome: Genome,
    programids: Vec<Programid>,
    current: Option<usize>,
    next_unique_id: u32,
    allocation_active: bool,
    just_divided: bool,
    executed_match_strings: bool,
    stats: HardwareStats,
}

impl GxHardware {
    /// Builds a machine whose origin programid holds `genome`.
    #[must_use]
    pub fn new(config: HardwareConfig, inst_set: Arc<InstSet>, genome: Genome) -> Self {
        let mut hardware = Self {
            programids: Vec::with_capacity(config.programids.max_programids),
            config,
            inst_set,
            genome,
            current: None,
            next_unique_id: 0,
            allocation_active: false,
            just_divided: false,
            executed_match_strings: false,
            stats: HardwareStats::default(),
        };
        hardware.reset();
        hardware
    }

    /// Discards every programid and rebuilds the origin from the genome.
    pub fn reset(&mut self) {
        self.programids.clear();
        self.current = None;
        self.next_unique_id = 0;
        self.allocation_active = false;
        self.just_divided = false;
        self.executed_match_strings = false;
        self.stats = HardwareStats::default();
        let genome = self.genome.clone();
        self.add_programid(Capabilities::ORIGIN, &genome);
    }

    #[must_use]
    pub fn config(&self) -> &HardwareConfig {
        &self.config
    }

    #[must_use]
    pub fn inst_set(&self) -> &Arc<InstSet> {
        &self.inst_set
    }

    #[must_use]
    pub fn genome(&self) -> &Genome {
        &self.genome
    }

    #[must_use]
    pub fn programids(&self) -> &[Programid] {
        &self.programids
    }

    #[must_use]
    pub fn programid(&self, index: usize) -> Option<&Programid> {
        self.programids.get(index)
    }

    #[must_use]
    pub fn num_programids(&self) -> usize {
        self.programids.len()
    }

    #[must_use]
    pub fn current(&self) -> Option<usize> {
        self.current
    }

    #[must_use]
    pub fn stats(&self) -> &HardwareStats {
        &self.stats
    }

    #[must_use]
    pub fn allocation_active(&self) -> bool {
        self.allocation_active
    }

    #[must_use]
    pub fn just_divided(&self) -> bool {
        self.just_divided
    }

    /// Runs one CPU cycle.
    pub fn single_process(&mut self, ctx: &mut ExecContext<'_>) {
        self.stats.cycles += 1;
        self.allocation_active = false;
        self.just_divided = false;
        self.executed_match_strings = false;

        let mut i = 0;
        while i < self.programids.len() {
            if !self.programids[i].can_execute() {
                i += 1;
                continue;
            }
            self.current = Some(i);
            self.execute_current(ctx);
            if self.just_divided {
                break;
            }
            i = self.current.unwrap_or(i) + 1;
        }
        self.current = None;

        self.age_out();
        if self.programids.is_empty() {
            warn!(cycle = self.stats.cycles, "All programids gone, organism dies");
            ctx.organism.die();
        }
    }

    /// Executes `inst` on behalf of the current programid, or the first one
    /// between cycles, without moving its IP.
    pub fn process_bonus_inst(&mut self, ctx: &mut ExecContext<'_>, inst: Instruction) -> bool {
        if self.programids.is_empty() {
            return false;
        }
        let outside_cycle = self.current.is_none();
        if outside_cycle {
            self.current = Some(0);
        }
        self.stats.cost_paid += u64::from(self.inst_set.cost(inst));
        self.stats.instructions += 1;
        let step = self.dispatch(ctx, inst);
        self.record(step, inst);
        if outside_cycle {
            self.current = None;
        }
        step.success
    }

    fn execute_current(&mut self, ctx: &mut ExecContext<'_>) {
        let c = self.cur();
        let (pos, inst) = {
            let prog = &mut self.programids[c];
            let len = prog.memory.len();
            let ip = prog.head_mut(HeadKind::Ip);
            ip.adjust(len);
            let pos = ip.position();
            (pos, prog.memory.read(pos))
        };
        self.programids[c].memory.mark_executed(pos);
        self.stats.cost_paid += u64::from(self.inst_set.cost(inst));
        self.stats.instructions += 1;

        let step = self.dispatch(ctx, inst);
        self.record(step, inst);

        if step.advance_ip {
            self.advance_ip();
        }
        let c = self.cur();
        self.programids[c].increment_cycles();
    }

    fn record(&mut self, step: Step, inst: Instruction) {
        if !step.success {
            self.stats.failures += 1;
            debug!(
                programid = self.cur(),
                inst = self.inst_set.name(inst),
                "Instruction failed"
            );
        }
    }

    fn dispatch(&mut self, ctx: &mut ExecContext<'_>, inst: Instruction) -> Step {
        let Some(op) = self.inst_set.op(inst) else {
            return Step::FAILED;
        };
        match op {
            Op::NopA | Op::NopB | Op::NopC => Step::DONE,

            Op::If0 => self.if_zero(|v| v == 0),
            Op::IfNot0 => self.if_zero(|v| v != 0),
            Op::IfGr0 => self.if_zero(|v| v > 0),
            Op::IfGrEqu0 => self.if_zero(|v| v >= 0),
            Op::IfLess0 => self.if_zero(|v| v < 0),
            Op::IfLsEqu0 => self.if_zero(|v| v <= 0),
            Op::IfEqu => self.if_compare(|a, b| a == b),
            Op::IfNEqu => self.if_compare(|a, b| a != b),
            Op::IfGr => self.if_compare(|a, b| a > b),
            Op::IfGrEqu => self.if_compare(|a, b| a >= b),
            Op::IfLess => self.if_compare(|a, b| a < b),
            Op::IfLsEqu => self.if_compare(|a, b| a <= b),
            Op::IfBit1 => self.if_zero(|v| v & 1 == 1),
            Op::IfANotEqB => self.if_pair(Register::Ax, Register::Bx),
            Op::IfBNotEqC => self.if_pair(Register::Bx, Register::Cx),
            Op::IfANotEqC => self.if_pair(Register::Ax, Register::Cx),
            Op::JumpF => self.inst_jump(crate::head::Direction::Forward),
            Op::JumpB => self.inst_jump(crate::head::Direction::Backward),
            Op::Call => self.inst_call(),
            Op::Return => self.inst_return(),
            Op::Throw => self.jump_to_marker(Op::Catch),
            Op::ThrowIf0 => self.jump_to_marker_if(Op::Catch, true),
            Op::ThrowIfNot0 => self.jump_to_marker_if(Op::Catch, false),
            Op::Goto => self.jump_to_marker(Op::Label),
            Op::GotoIf0 => self.jump_to_marker_if(Op::Label, true),
            Op::GotoIfNot0 => self.jump_to_marker_if(Op::Label, false),
            Op::Catch | Op::Label | Op::Site => {
                self.read_label();
                Step::DONE
            }
            Op::Skip => {
                self.advance_ip();
                Step::DONE
            }

            Op::Pop => self.inst_pop(None),
            Op::PopA => self.inst_pop(Some(Register::Ax)),
            Op::PopB => self.inst_pop(Some(Register::Bx)),
            Op::PopC => self.inst_pop(Some(Register::Cx)),
            Op::Push => self.inst_push(None),
            Op::PushA => self.inst_push(Some(Register::Ax)),
            Op::PushB => self.inst_push(Some(Register::Bx)),
            Op::PushC => self.inst_push(Some(Register::Cx)),
            Op::HeadPop => self.inst_head_pop(),
            Op::HeadPush => self.inst_head_push(),
            Op::SwitchStack => Step::DONE,
            Op::FlipStack => {
                self.prog_mut().stack.flip();
                Step::DONE
            }
            Op::Swap => self.inst_swap(None),
            Op::SwapAB => self.inst_swap(Some((Register::Ax, Register::Bx))),
            Op::SwapBC => self.inst_swap(Some((Register::Bx, Register::Cx))),
            Op::SwapAC => self.inst_swap(Some((Register::Ax, Register::Cx))),
            Op::CopyReg => self.inst_copy_reg(None),
            Op::CopyRegAB => self.inst_copy_reg(Some((Register::Ax, Register::Bx))),
            Op::CopyRegAC => self.inst_copy_reg(Some((Register::Ax, Register::Cx))),
            Op::CopyRegBA => self.inst_copy_reg(Some((Register::Bx, Register::Ax))),
            Op::CopyRegBC => self.inst_copy_reg(Some((Register::Bx, Register::Cx))),
            Op::CopyRegCA => self.inst_copy_reg(Some((Register::Cx, Register::Ax))),
            Op::CopyRegCB => self.inst_copy_reg(Some((Register::Cx, Register::Bx))),
            Op::Reset => self.inst_reset(),

            Op::ShiftR => self.unary(|v| Some(v >> 1)),
            Op::ShiftL => self.unary(|v| Some(v.wrapping_shl(1))),
            Op::Bit1 => self.unary(|v| Some(v | 1)),
            Op::Inc => self.unary(|v| Some(v.wrapping_add(1))),
            Op::Dec => self.unary(|v| Some(v.wrapping_sub(1))),
            Op::Zero => self.unary(|_| Some(0)),
            Op::Not => self.unary(|v| Some(!v)),
            Op::Neg => self.unary(|v| Some(v.wrapping_neg())),
            Op::Square => self.unary(|v| Some(v.wrapping_mul(v))),
            Op::Sqrt => self.unary(|v| math::non_negative(v, 2, f64::sqrt)),
            Op::Log => self.unary(|v| math::non_negative(v, 1, f64::ln)),
            Op::Log10 => self.unary(|v| math::non_negative(v, 1, f64::log10)),
            Op::Minus17 => self.unary(|v| Some(v.wrapping_sub(17))),
            Op::SetNum => self.label_value(|l| l.as_int(genexpr_data::NUM_NOPS)),
            Op::ValGrey => self.label_value(|l| l.as_int_grey_code(genexpr_data::NUM_NOPS)),
            Op::ValDir => self.label_value(|l| l.as_int_direct(genexpr_data::NUM_NOPS)),
            Op::ValAddP => self.label_value(CodeLabel::as_int_additive_polynomial),
            Op::ValFib => self.label_value(|l| l.as_int_fib(genexpr_data::NUM_NOPS)),
            Op::ValPolyC => self.label_value(CodeLabel::as_int_polynomial_coefficient),

            Op::Add => self.binary(|b, c| Some(b.wrapping_add(c))),
            Op::Sub => self.binary(|b, c| Some(b.wrapping_sub(c))),
            Op::Mult => self.binary(|b, c| Some(b.wrapping_mul(c))),
            Op::Div => self.binary(|b, c| (c != 0).then(|| b.wrapping_div(c))),
            Op::Mod => self.binary(|b, c| (c != 0).then(|| b.wrapping_rem(c))),
            Op::Nand => self.binary(|b, c| Some(!(b & c))),
            Op::Nor => self.binary(|b, c| Some(!(b | c))),
            Op::And => self.binary(|b, c| Some(b & c)),
            Op::Xor => self.binary(|b, c| Some(b ^ c)),
            Op::Order => self.inst_order(),

            Op::Copy => self.inst_copy(),
            Op::ReadInst => self.inst_read_inst(),
            Op::WriteInst => self.inst_write_inst(),
            Op::StackReadInst => self.inst_stack_read_inst(),
            Op::StackWriteInst => self.inst_stack_write_inst(),
            Op::Compare => self.inst_compare(),
            Op::IfNCpy => self.inst_if_n_cpy(),
            Op::Allocate => self.inst_allocate(ctx),
            Op::CAlloc => self.inst_c_alloc(ctx),
            Op::MaxAlloc => self.inst_max_alloc(ctx),
            Op::Inject => self.inst_inject(ctx),
            Op::InjectRand => self.inst_inject_rand(ctx),
            Op::Kazi => self.inst_kazi(ctx),
            Op::Kazi5 => self.inst_kazi5(ctx),
            Op::Die => {
                ctx.organism.die();
                Step::DONE
            }

            Op::TaskGet => self.inst_task_get(ctx),
            Op::TaskGet2 => self.inst_task_get2(ctx),
            Op::TaskPut => self.inst_task_put(ctx),
            Op::TaskPutResetInputs => self.inst_task_put_reset(ctx),
            Op::TaskIO => self.inst_task_io(ctx),
            Op::TaskIOFeedback => self.inst_task_io_feedback(ctx),
            Op::TaskStackGet => self.inst_task_stack_get(ctx, 1),
            Op::TaskStackLoad => self.inst_task_stack_get(ctx, 3),
            Op::MatchStrings => self.inst_match_strings(ctx),
            Op::Send => self.inst_send(ctx),
            Op::Receive => self.inst_receive(ctx),
            Op::SenseLog2 => self.do_sense(ctx, io::SenseMode::Log, 2.0),
            Op::SenseUnit => self.do_sense(ctx, io::SenseMode::Sum, 1.0),
            Op::SenseMult100 => self.do_sense(ctx, io::SenseMode::Sum, 100.0),
            Op::SearchF => self.inst_search(crate::head::Direction::Forward),
            Op::SearchB => self.inst_search(crate::head::Direction::Backward),
            Op::MemSize => self.inst_mem_size(),
            Op::RotateL => {
                ctx.organism.rotate(-1);
                Step::DONE
            }
            Op::RotateR => {
                ctx.organism.rotate(1);
                Step::DONE
            }

            Op::AdvanceHead => self.inst_advance_head(),
            Op::MoveHead => self.inst_move_head(),
            Op::JumpHead => self.inst_jump_head(),
            Op::GetHead => self.inst_get_head(),
            Op::IfLabel => self.inst_if_label(),
            Op::IfLabel2 => self.inst_if_label2(),
            Op::HeadDivide => self.inst_head_divide(ctx),
            Op::HeadRead => self.inst_head_read(),
            Op::HeadWrite => self.inst_head_write(),
            Op::HeadCopy => self.inst_head_copy(),
            Op::HeadCopyN(times) => self.inst_head_copy_n(times),
            Op::HeadSearch => self.inst_head_search(),
            Op::SetFlow => self.inst_set_flow(),

            Op::NewExecutableProgramid => self.inst_new_programid(Capabilities::PROTEIN),
            Op::NewGenomeProgramid => self.inst_new_programid(Capabilities::GENOMIC),
            Op::Bind => self.inst_bind(ctx),
            Op::IfBind => self.inst_if_bind(ctx),
            Op::NumSites => self.inst_num_sites(),
            Op::ProgramidCopy => self.inst_programid_copy(),
            Op::ProgramidDivide => self.inst_programid_divide(ctx),
        }
    }

    // Current programid access.

    fn cur(&self) -> usize {
        self.current.unwrap_or(0)
    }

    fn prog(&self) -> &Programid {
        &self.programids[self.cur()]
    }

    fn prog_mut(&mut self) -> &mut Programid {
        let c = self.cur();
        &mut self.programids[c]
    }

    fn reg(&self, reg: Register) -> i32 {
        self.prog().register(reg)
    }

    fn set_reg(&mut self, reg: Register, value: i32) {
        self.prog_mut().set_register(reg, value);
    }

    fn ip_position(&self) -> usize {
        self.prog().head(HeadKind::Ip).position()
    }

    fn advance_ip(&mut self) {
        let prog = self.prog_mut();
        let len = prog.memory.len();
        prog.head_mut(HeadKind::Ip).advance(len);
    }

    /// Moves the IP to `pos` within its own memory.
    fn set_ip(&mut self, pos: usize) {
        let prog = self.prog_mut();
        let len = prog.memory.len();
        prog.head_mut(HeadKind::Ip).set_position(pos, len);
    }

    /// Nop symbol right after the IP, if that cell is a nop.
    fn peek_nop(&self) -> Option<u8> {
        let prog = self.prog();
        let len = prog.memory.len();
        let next = (prog.head(HeadKind::Ip).position() + 1) % len;
        self.inst_set.nop_mod(prog.memory.read(next))
    }

    /// Steps the IP onto a following nop and returns its symbol.
    fn consume_nop(&mut self) -> Option<u8> {
        let nop = self.peek_nop()?;
        self.advance_ip();
        let pos = self.ip_position();
        self.prog_mut().memory.mark_executed(pos);
        Some(nop)
    }

    fn find_modified_register(&mut self, default: Register) -> Register {
        self.consume_nop().map_or(default, Register::from_nop)
    }

    fn find_modified_head(&mut self, default: HeadKind) -> HeadKind {
        self.consume_nop().map_or(default, HeadKind::from_nop)
    }

    fn read_label(&mut self) -> CodeLabel {
        self.read_label_max(MAX_LABEL_SIZE)
    }

    /// Reads the nops following the IP into `next_label`, moving the IP onto
    /// the last one. Only the first few are marked executed.
    fn read_label_max(&mut self, max: usize) -> CodeLabel {
        let exe_limit = self.config.max_label_exe_size;
        let mut label = CodeLabel::new();
        while label.len() < max {
            let Some(nop) = self.peek_nop() else { break };
            self.advance_ip();
            if label.len() < exe_limit {
                let pos = self.ip_position();
                self.prog_mut().memory.mark_executed(pos);
            }
            label.push(nop);
        }
        self.prog_mut().next_label = label.clone();
        label
    }

    fn stack_push(&mut self, value: i32) {
        self.prog_mut().stack.push(value);
    }

    fn stack_pop(&mut self) -> Option<i32> {
        self.prog_mut().stack.pop()
    }

    // Heads of the current programid.

    fn head(&self, kind: HeadKind) -> Head {
        *self.prog().head(kind)
    }

    /// Wraps a head into its space and returns `(space, position)`.
    fn locate(&mut self, kind: HeadKind) -> (usize, usize) {
        let c = self.cur();
        let space = self.programids[c].head(kind).space();
        let len = self.programids[space].memory.len();
        let head = self.programids[c].head_mut(kind);
        head.adjust(len);
        (space, head.position())
    }

    fn head_inst(&mut self, kind: HeadKind) -> Instruction {
        let (space, pos) = self.locate(kind);
        self.programids[space].memory.read(pos)
    }

    fn advance_head(&mut self, kind: HeadKind) {
        let c = self.cur();
        let space = self.programids[c].head(kind).space();
        let len = self.programids[space].memory.len();
        self.programids[c].head_mut(kind).advance(len);
    }

    /// Rests `owner`'s head on `space` and settles the contact counters.
    fn move_head(&mut self, owner: usize, kind: HeadKind, space: usize, pos: usize) {
        let rebind = self.programids[owner].head_mut(kind).bind_to(space, pos);
        self.apply_rebind(owner, rebind);
    }

    fn apply_rebind(&mut self, owner: usize, rebind: Rebind) {
        if let Some(released) = rebind.released {
            self.programids[released].remove_contacting_head(owner);
        }
        if let Some(contacted) = rebind.contacted {
            self.programids[contacted].add_contacting_head(owner);
        }
    }

    /// The current programid may read from `space`.
    fn can_read(&self, space: usize) -> bool {
        space == self.cur() || self.programids[space].is_readable()
    }

    /// Own-memory position `offset` cells from the start, wrapped.
    fn wrap_own(&self, offset: i32) -> usize {
        let len = self.prog().memory.len() as i64;
        i64::from(offset).rem_euclid(len) as usize
    }

    /// Inserts `code` into `space` before `pos`, shifting heads behind it.
    fn insert_code(&mut self, space: usize, pos: usize, code: &Genome) -> bool {
        if self.programids[space].memory.insert(pos, code).is_err() {
            return false;
        }
        for offset in 0..code.len() {
            self.programids[space].memory.mark_injected(pos + offset);
        }
        let len = self.programids[space].memory.len();
        for prog in &mut self.programids {
            for head in prog.heads_mut().iter_mut() {
                if head.space() == space && head.position() >= pos {
                    let moved = head.position() + code.len();
                    head.set_position(moved, len);
                }
            }
        }
        true
    }

    /// Removes `count` cells of `space` at `pos`, pulling heads back.
    fn remove_code(&mut self, space: usize, pos: usize, count: usize) -> bool {
        if self.programids[space].memory.remove(pos, count).is_err() {
            return false;
        }
        let len = self.programids[space].memory.len();
        for prog in &mut self.programids {
            for head in prog.heads_mut().iter_mut() {
                if head.space() != space || head.position() < pos {
                    continue;
                }
                let moved = if head.position() >= pos + count {
                    head.position() - count
                } else {
                    pos
                };
                head.set_position(moved, len);
            }
        }
        true
    }

    /// Inserts `code` after the first full occurrence of `label` in any
    /// readable programid.
    pub fn inject_host(&mut self, label: &CodeLabel, code: &Genome) -> bool {
        if label.is_empty() {
            return false;
        }
        let found = self.programids.iter().enumerate().find_map(|(i, prog)| {
            if !prog.is_readable() || prog.memory.len() < label.len() {
                return None;
            }
            (0..=prog.memory.len() - label.len())
                .find(|&p| crate::head::label_at(&prog.memory, &self.inst_set, p, label))
                .map(|p| (i, p + label.len()))
        });
        let Some((space, pos)) = found else {
            return false;
        };
        if !self.insert_code(space, pos, code) {
            return false;
        }
        self.stats.injections += 1;
        true
    }

    /// Verifies every structural invariant of the collection.
    pub fn check_consistency(&self) -> Result<()> {
        let live = self.programids.len();
        let max = self.config.programids.max_programids;
        if live > max {
            return Err(HardwareError::CapacityExceeded { live, max });
        }
        let mut resting = vec![0usize; live];
        for (position, prog) in self.programids.iter().enumerate() {
            if prog.index() != position {
                return Err(HardwareError::IndexMismatch {
                    position,
                    stored: prog.index(),
                });
            }
            for (head, h) in prog.heads().iter().enumerate() {
                if h.owner() != position {
                    return Err(HardwareError::IndexMismatch {
                        position,
                        stored: h.owner(),
                    });
                }
                if h.space() >= live {
                    return Err(HardwareError::DanglingHead {
                        owner: position,
                        head,
                        space: h.space(),
                    });
                }
                if h.is_foreign() {
                    resting[h.space()] += 1;
                }
            }
        }
        for (index, (prog, &actual)) in self.programids.iter().zip(&resting).enumerate() {
            if prog.contacts() != actual {
                return Err(HardwareError::ContactMismatch {
                    index,
                    counted: prog.contacts(),
                    actual,
                });
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.check_consistency().is_ok()
    }

    /// Writes a human-readable dump of every programid.
    pub fn print_status<W: std::io::Write>(&self, out: &mut W) -> std::io::Result<()> {
        writeln!(
            out,
            "GX hardware: {} / {} programids, cycle {}, next id {}",
            self.programids.len(),
            self.config.programids.max_programids,
            self.stats.cycles,
            self.next_unique_id
        )?;
        for prog in &self.programids {
            let caps = prog.capabilities();
            writeln!(
                out,
                "  [{}] id {} {}{}{} contacts {} cycles {} size {}",
                prog.index(),
                prog.unique_id(),
                if caps.executable { 'x' } else { '-' },
                if caps.bindable { 'b' } else { '-' },
                if caps.readable { 'r' } else { '-' },
                prog.contacts(),
                prog.cycles_used(),
                prog.memory.len()
            )?;
            writeln!(
                out,
                "      AX {:>11} BX {:>11} CX {:>11} stack {:?}",
                prog.registers[0],
                prog.registers[1],
                prog.registers[2],
                prog.stack.to_vec()
            )?;
            let heads: Vec<String> = HeadKind::ALL
                .iter()
                .take(NUM_HEADS)
                .map(|&k| {
                    let h = prog.head(k);
                    format!("{k:?}={}:{}", h.space(), h.position())
                })
                .collect();
            let ip = prog.head(HeadKind::Ip).position() % prog.memory.len();
            writeln!(
                out,
                "      {} next {} terminator {} label {}",
                heads.join(" "),
                self.inst_set.name(prog.memory.read(ip)),
                prog.terminator_label,
                prog.next_label
            )?;
        }
        Ok(())
    }

    #[must_use]
    pub fn snapshot(&self) -> HardwareSnapshot {
        HardwareSnapshot {
            genome_size: self.genome.len(),
            next_unique_id: self.next_unique_id,
            current: self.current,
            programids: self.programids.iter().map(Programid::snapshot).collect(),
            stats: self.stats.clone(),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::interface::RecordingOrganism;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    pub(crate) fn hardware(names: &str) -> GxHardware {
        hardware_with(names, HardwareConfig::default())
    }

    pub(crate) fn hardware_with(names: &str, config: HardwareConfig) -> GxHardware {
        let set = InstSet::default_gx();
        let genome = set.parse_genome(names).unwrap();
        GxHardware::new(config, set, genome)
    }

    pub(crate) fn run(hw: &mut GxHardware, org: &mut RecordingOrganism, cycles: usize) {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        for _ in 0..cycles {
            let mut ctx = ExecContext::new(&mut rng, org);
            hw.single_process(&mut ctx);
        }
    }

    #[test]
    fn test_reset_builds_origin() {
        let hw = hardware("inc inc");
        assert_eq!(hw.num_programids(), 1);
        let origin = &hw.programids()[0];
        assert_eq!(origin.capabilities(), Capabilities::ORIGIN);
        assert_eq!(origin.memory.len(), 2);
        assert!(hw.is_consistent());
    }

    #[test]
    fn test_single_process_executes_and_ages() {
        let mut hw = hardware("inc nop-A");
        let mut org = RecordingOrganism::new();
        run(&mut hw, &mut org, 3);
        // inc AX consumes its nop, so each cycle is one increment
        assert_eq!(hw.programids()[0].register(Register::Ax), 3);
        assert_eq!(hw.programids()[0].cycles_used(), 3);
        assert_eq!(hw.stats().instructions, 3);
        assert!(hw.current().is_none());
    }

    #[test]
    fn test_failures_are_local() {
        let mut hw = hardware("div inc");
        let mut org = RecordingOrganism::new();
        run(&mut hw, &mut org, 2);
        assert_eq!(hw.stats().failures, 1);
        assert_eq!(hw.programids()[0].register(Register::Bx), 1);
    }

    #[test]
    fn test_bonus_instruction_leaves_ip() {
        let mut hw = hardware("dec dec");
        let mut org = RecordingOrganism::new();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let inc = hw.inst_set().inst("inc").unwrap();
        let mut ctx = ExecContext::new(&mut rng, &mut org);
        assert!(hw.process_bonus_inst(&mut ctx, inc));
        assert_eq!(hw.programids()[0].register(Register::Bx), 1);
        assert_eq!(hw.programids()[0].head(HeadKind::Ip).position(), 0);
        assert!(hw.current().is_none());
    }

    #[test]
    fn test_inject_host_shifts_heads() {
        let mut hw = hardware("nop-A nop-B inc dec");
        hw.programids[0].head_mut(HeadKind::Read).set_position(3, 4);
        let code = Genome::from_ops(&[5, 5]);
        assert!(hw.inject_host(&CodeLabel::from_nops(&[0, 1]), &code));
        let origin = &hw.programids()[0];
        assert_eq!(origin.memory.len(), 6);
        assert!(origin.memory.is_injected(2));
        assert!(origin.memory.is_injected(3));
        assert_eq!(origin.head(HeadKind::Read).position(), 5);
        assert_eq!(origin.head(HeadKind::Ip).position(), 0);
        assert!(!hw.inject_host(&CodeLabel::from_nops(&[2, 2]), &code));
    }

    #[test]
    fn test_snapshot_serializes() {
        let hw = hardware("site nop-A inc");
        let snap = hw.snapshot();
        let json = serde_json::to_string(&snap).unwrap();
        let back: HardwareSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back, snap);
        assert_eq!(back.programids[0].memory.len(), 3);
    }

    #[test]
    fn test_print_status_lists_programids() {
        let hw = hardware("inc");
        let mut out = Vec::new();
        hw.print_status(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("1 / 32 programids"));
        assert!(text.contains("[0] id 0 xbr"));
    }
}
