//! Head movement and head-relative copying.
//!
//! READ, WRITE and FLOW may rest on other programids. The IP never leaves its
//! own memory, so moves that would carry it elsewhere fail. Reading through a
//! head that rests on another programid requires that programid to be
//! readable.

use super::{GxHardware, Step};
use crate::head::Direction;
use genexpr_data::{HeadKind, Instruction, Register};

impl GxHardware {
    /// Collects read nops into `read_label`; anything else clears it.
    fn track_read(&mut self, inst: Instruction) {
        let nop = self.inst_set.nop_mod(inst);
        let read_label = &mut self.prog_mut().read_label;
        match nop {
            Some(nop) => read_label.push(nop),
            None => read_label.clear(),
        }
    }

    /// Advances a head (default WRITE) by one.
    pub(super) fn inst_advance_head(&mut self) -> Step {
        let kind = self.find_modified_head(HeadKind::Write);
        if kind == HeadKind::Ip {
            self.advance_ip();
            return Step::DONE;
        }
        self.advance_head(kind);
        Step::DONE
    }

    /// Moves a head (default IP) onto the flow head.
    pub(super) fn inst_move_head(&mut self) -> Step {
        let kind = self.find_modified_head(HeadKind::Ip);
        let flow = self.head(HeadKind::Flow);
        if kind == HeadKind::Ip {
            if flow.is_foreign() {
                return Step::FAILED;
            }
            self.set_ip(flow.position());
            return Step::JUMPED;
        }
        let c = self.cur();
        self.move_head(c, kind, flow.space(), flow.position());
        Step::DONE
    }

    /// Moves a head (default IP) by CX.
    pub(super) fn inst_jump_head(&mut self) -> Step {
        let kind = self.find_modified_head(HeadKind::Ip);
        let offset = self.reg(Register::Cx);
        let (space, _) = self.locate(kind);
        let len = self.programids[space].memory.len();
        self.prog_mut().head_mut(kind).jump_by(offset, len);
        Step::DONE
    }

    /// Writes a head's position (default IP) to CX.
    pub(super) fn inst_get_head(&mut self) -> Step {
        let kind = self.find_modified_head(HeadKind::Ip);
        let (_, pos) = self.locate(kind);
        self.set_reg(Register::Cx, pos as i32);
        Step::DONE
    }

    /// Executes the next instruction only if the last nops read spell the
    /// complement of the following label.
    pub(super) fn inst_if_label(&mut self) -> Step {
        let label = self.read_label().complement();
        if label != self.prog().read_label {
            self.advance_ip();
        }
        Step::DONE
    }

    /// `if-label` that, when it skips, also steps over a nop modifying the
    /// skipped instruction.
    pub(super) fn inst_if_label2(&mut self) -> Step {
        let label = self.read_label().complement();
        if label != self.prog().read_label {
            self.advance_ip();
            if self.peek_nop().is_some() {
                self.advance_ip();
            }
        }
        Step::DONE
    }

    /// BX = instruction under a head (default READ), then advance it.
    pub(super) fn inst_head_read(&mut self) -> Step {
        let kind = self.find_modified_head(HeadKind::Read);
        let (space, _) = self.locate(kind);
        if !self.can_read(space) {
            return Step::FAILED;
        }
        let inst = self.head_inst(kind);
        self.set_reg(Register::Bx, inst.op() as i32);
        self.track_read(inst);
        self.advance_head(kind);
        Step::DONE
    }

    /// Writes BX under a head (default WRITE), then advance it.
    pub(super) fn inst_head_write(&mut self) -> Step {
        let kind = self.find_modified_head(HeadKind::Write);
        let (space, pos) = self.locate(kind);
        let value = self.reg(Register::Bx);
        let op = if value < 0 || value as usize >= self.inst_set.len() {
            0
        } else {
            value as u8
        };
        let memory = &mut self.programids[space].memory;
        memory.write(pos, Instruction(op));
        memory.mark_copied(pos);
        self.advance_head(kind);
        Step::DONE
    }

    /// Copies the instruction under READ to WRITE and advances both.
    pub(super) fn inst_head_copy(&mut self) -> Step {
        let (src, from) = self.locate(HeadKind::Read);
        let (dst, to) = self.locate(HeadKind::Write);
        if !self.can_read(src) {
            return Step::FAILED;
        }
        let inst = self.programids[src].memory.read(from);
        self.track_read(inst);
        let memory = &mut self.programids[dst].memory;
        memory.write(to, inst);
        memory.mark_copied(to);
        self.advance_head(HeadKind::Read);
        self.advance_head(HeadKind::Write);
        Step::DONE
    }

    /// `h-copy` several times over; stops at the first failed copy.
    pub(super) fn inst_head_copy_n(&mut self, times: u8) -> Step {
        for _ in 0..times {
            if !self.inst_head_copy().success {
                return Step::FAILED;
            }
        }
        Step::DONE
    }

    /// Like `search-f`, and also places the flow head just past the match.
    pub(super) fn inst_head_search(&mut self) -> Step {
        let label = self.read_label().complement();
        let distance = self.search_distance(&label, Direction::Forward);
        self.set_reg(Register::Bx, distance);
        self.set_reg(Register::Cx, label.len() as i32);

        let c = self.cur();
        let len = self.prog().memory.len();
        let here = self.ip_position() as i64;
        let target = (here + i64::from(distance) + 1).rem_euclid(len as i64) as usize;
        self.move_head(c, HeadKind::Flow, c, target);
        Step::DONE
    }

    /// Places the flow head at CX (or the modified register) within its space.
    pub(super) fn inst_set_flow(&mut self) -> Step {
        let reg = self.find_modified_register(Register::Cx);
        let value = self.reg(reg);
        let (space, _) = self.locate(HeadKind::Flow);
        let len = self.programids[space].memory.len();
        self.prog_mut().head_mut(HeadKind::Flow).set(value, len);
        Step::DONE
    }
}
