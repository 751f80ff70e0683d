//! Stack, register and arithmetic instructions.
//!
//! Arithmetic wraps on overflow. Operations that are undefined for their
//! input (division by zero, square root of a negative) fail and leave the
//! destination untouched.

use super::{GxHardware, Step};
use genexpr_data::{CodeLabel, HeadKind, Register};

/// Applies `f` to values from `from` up. Smaller non-negative values are
/// kept as they are; negatives fail.
pub(super) fn non_negative(v: i32, from: i32, f: fn(f64) -> f64) -> Option<i32> {
    if v < 0 {
        None
    } else if v < from {
        Some(v)
    } else {
        Some(f(f64::from(v)) as i32)
    }
}

impl GxHardware {
    /// Pops into `fixed`, or into the modified register (default BX).
    pub(super) fn inst_pop(&mut self, fixed: Option<Register>) -> Step {
        let reg = fixed.unwrap_or_else(|| self.find_modified_register(Register::Bx));
        match self.stack_pop() {
            Some(value) => {
                self.set_reg(reg, value);
                Step::DONE
            }
            None => Step::FAILED,
        }
    }

    pub(super) fn inst_push(&mut self, fixed: Option<Register>) -> Step {
        let reg = fixed.unwrap_or_else(|| self.find_modified_register(Register::Bx));
        let value = self.reg(reg);
        self.stack_push(value);
        Step::DONE
    }

    /// Pops a position for a head (default IP) within its current space.
    pub(super) fn inst_head_pop(&mut self) -> Step {
        let kind = self.find_modified_head(HeadKind::Ip);
        let Some(value) = self.stack_pop() else {
            return Step::FAILED;
        };
        let (space, _) = self.locate(kind);
        let len = self.programids[space].memory.len();
        self.prog_mut().head_mut(kind).set(value, len);
        Step::DONE
    }

    /// Pushes a head's position. Pushing the IP also sends it to the flow head.
    pub(super) fn inst_head_push(&mut self) -> Step {
        let kind = self.find_modified_head(HeadKind::Ip);
        let (_, pos) = self.locate(kind);
        if kind == HeadKind::Ip {
            let flow = self.head(HeadKind::Flow);
            if flow.is_foreign() {
                return Step::FAILED;
            }
            self.stack_push(pos as i32);
            self.set_ip(flow.position());
            return Step::JUMPED;
        }
        self.stack_push(pos as i32);
        Step::DONE
    }

    /// Swaps a register pair; the modified register (default BX) and the
    /// one after it when no pair is fixed.
    pub(super) fn inst_swap(&mut self, fixed: Option<(Register, Register)>) -> Step {
        let (a, b) = fixed.unwrap_or_else(|| {
            let a = self.find_modified_register(Register::Bx);
            (a, a.next())
        });
        let prog = self.prog_mut();
        prog.registers.swap(a.index(), b.index());
        Step::DONE
    }

    /// Copies into the first register of the pair from the second.
    pub(super) fn inst_copy_reg(&mut self, fixed: Option<(Register, Register)>) -> Step {
        let (dst, src) = fixed.unwrap_or_else(|| {
            let src = self.find_modified_register(Register::Bx);
            (src.next(), src)
        });
        let value = self.reg(src);
        self.set_reg(dst, value);
        Step::DONE
    }

    pub(super) fn inst_reset(&mut self) -> Step {
        let prog = self.prog_mut();
        prog.registers = [0; genexpr_data::NUM_REGISTERS];
        prog.stack.clear();
        Step::DONE
    }

    /// Applies `op` to the modified register (default BX) in place.
    pub(super) fn unary(&mut self, op: impl Fn(i32) -> Option<i32>) -> Step {
        let reg = self.find_modified_register(Register::Bx);
        match op(self.reg(reg)) {
            Some(value) => {
                self.set_reg(reg, value);
                Step::DONE
            }
            None => Step::FAILED,
        }
    }

    /// Combines BX and CX into the modified register (default BX).
    pub(super) fn binary(&mut self, op: impl Fn(i32, i32) -> Option<i32>) -> Step {
        let dst = self.find_modified_register(Register::Bx);
        match op(self.reg(Register::Bx), self.reg(Register::Cx)) {
            Some(value) => {
                self.set_reg(dst, value);
                Step::DONE
            }
            None => Step::FAILED,
        }
    }

    /// Reads the following label and stores its value in BX.
    pub(super) fn label_value(&mut self, value: impl Fn(&CodeLabel) -> i32) -> Step {
        let label = self.read_label();
        self.set_reg(Register::Bx, value(&label));
        Step::DONE
    }

    /// Puts the modified register (default BX) and the next in ascending order.
    pub(super) fn inst_order(&mut self) -> Step {
        let a = self.find_modified_register(Register::Bx);
        let b = a.next();
        if self.reg(a) > self.reg(b) {
            self.prog_mut().registers.swap(a.index(), b.index());
        }
        Step::DONE
    }
}
