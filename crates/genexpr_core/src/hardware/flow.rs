//! Conditionals, calls and label jumps.
//!
//! Conditionals execute the next instruction only when their test holds;
//! otherwise the IP steps over it.

use super::{GxHardware, Step};
use crate::head::Direction;
use crate::inst_set::Op;
use genexpr_data::{HeadKind, Register};

impl GxHardware {
    /// Tests one register (default BX).
    pub(super) fn if_zero(&mut self, test: impl Fn(i32) -> bool) -> Step {
        let reg = self.find_modified_register(Register::Bx);
        if !test(self.reg(reg)) {
            self.advance_ip();
        }
        Step::DONE
    }

    /// Compares a register (default BX) with the one after it.
    pub(super) fn if_compare(&mut self, test: impl Fn(i32, i32) -> bool) -> Step {
        let first = self.find_modified_register(Register::Bx);
        let second = first.next();
        if !test(self.reg(first), self.reg(second)) {
            self.advance_ip();
        }
        Step::DONE
    }

    /// Executes the next instruction only if the two registers differ.
    pub(super) fn if_pair(&mut self, a: Register, b: Register) -> Step {
        if self.reg(a) == self.reg(b) {
            self.advance_ip();
        }
        Step::DONE
    }

    /// Pushes the return position and jumps to the complement of the label
    /// that follows, or by BX when no label follows.
    pub(super) fn inst_call(&mut self) -> Step {
        let label = self.read_label();
        let here = self.ip_position();
        self.stack_push(here as i32);
        if label.is_empty() {
            let offset = self.reg(Register::Bx);
            let prog = self.prog_mut();
            let len = prog.memory.len();
            prog.head_mut(HeadKind::Ip).jump_by(offset, len);
            return Step::DONE;
        }
        let target = label.complement();
        let prog = self.prog();
        let found = prog.head(HeadKind::Ip).find_label(
            &target,
            Direction::Forward,
            &prog.memory,
            &self.inst_set,
        );
        match found {
            Some(pos) => {
                self.set_ip(pos);
                Step::DONE
            }
            None => Step::FAILED,
        }
    }

    /// Moves the IP onto the complement of the following label, searching
    /// in `direction`. Without a label the IP moves by BX that way instead.
    pub(super) fn inst_jump(&mut self, direction: Direction) -> Step {
        let label = self.read_label();
        if label.is_empty() {
            let bx = self.reg(Register::Bx);
            let offset = match direction {
                Direction::Forward => bx,
                Direction::Backward => bx.wrapping_neg(),
            };
            let prog = self.prog_mut();
            let len = prog.memory.len();
            prog.head_mut(HeadKind::Ip).jump_by(offset, len);
            return Step::DONE;
        }
        let target = label.complement();
        let mut ip = self.head(HeadKind::Ip);
        if !ip.jump(&target, direction, &self.prog().memory, &self.inst_set) {
            return Step::FAILED;
        }
        self.set_ip(ip.position());
        Step::DONE
    }

    pub(super) fn inst_return(&mut self) -> Step {
        match self.stack_pop() {
            Some(pos) => {
                let offset = self.wrap_own(pos);
                self.set_ip(offset);
                Step::DONE
            }
            None => Step::FAILED,
        }
    }

    /// Moves the IP onto the first `marker` instruction after it whose
    /// following nops begin with the label read here.
    pub(super) fn jump_to_marker(&mut self, marker: Op) -> Step {
        let label = self.read_label();
        let prog = self.prog();
        let len = prog.memory.len();
        let start = prog.head(HeadKind::Ip).position();
        let found = (1..len).map(|k| (start + k) % len).find(|&pos| {
            if self.inst_set.op(prog.memory.read(pos)) != Some(marker) {
                return false;
            }
            label.nops().iter().enumerate().all(|(i, &nop)| {
                let at = (pos + 1 + i) % len;
                self.inst_set.nop_mod(prog.memory.read(at)) == Some(nop)
            })
        });
        match found {
            Some(pos) => {
                self.set_ip(pos);
                Step::JUMPED
            }
            None => Step::FAILED,
        }
    }

    /// `jump_to_marker` taken only when BX is zero (`when_zero`) or nonzero.
    pub(super) fn jump_to_marker_if(&mut self, marker: Op, when_zero: bool) -> Step {
        if (self.reg(Register::Bx) == 0) != when_zero {
            return Step::FAILED;
        }
        self.jump_to_marker(marker)
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::{hardware, run};
    use crate::interface::RecordingOrganism;
    use genexpr_data::{HeadKind, Register};

    #[test]
    fn test_if_zero_skips_when_nonzero() {
        // BX = 1, so the inc is skipped; its modifier runs as a plain nop
        let mut hw = hardware("inc if-0 inc nop-A dec nop-C");
        let mut org = RecordingOrganism::new();
        run(&mut hw, &mut org, 4);
        let origin = &hw.programids()[0];
        assert_eq!(origin.register(Register::Ax), 0);
        assert_eq!(origin.register(Register::Cx), -1);
    }

    #[test]
    fn test_if_compare_uses_next_register() {
        // BX == CX == 0, if-equ holds
        let mut hw = hardware("if-equ inc");
        let mut org = RecordingOrganism::new();
        run(&mut hw, &mut org, 2);
        assert_eq!(hw.programids()[0].register(Register::Bx), 1);
    }

    #[test]
    fn test_call_and_return() {
        let mut hw = hardware("call nop-A inc nop-B return");
        let mut org = RecordingOrganism::new();
        run(&mut hw, &mut org, 1);
        // jumped onto the complement label nop-B, then stepped past it
        assert_eq!(hw.programids()[0].head(HeadKind::Ip).position(), 4);
        run(&mut hw, &mut org, 1);
        // return lands on the call label, then steps past it
        assert_eq!(hw.programids()[0].head(HeadKind::Ip).position(), 2);
    }

    #[test]
    fn test_jump_forward_skips_to_complement() {
        let mut hw = hardware("jump-f nop-A inc nop-B dec");
        let mut org = RecordingOrganism::new();
        run(&mut hw, &mut org, 1);
        // onto nop-B, then past it
        assert_eq!(hw.programids()[0].head(HeadKind::Ip).position(), 4);
        run(&mut hw, &mut org, 1);
        assert_eq!(hw.programids()[0].register(Register::Bx), -1);
    }

    #[test]
    fn test_jump_backward_loops() {
        let mut hw = hardware("nop-B dec jump-b nop-A inc");
        let mut org = RecordingOrganism::new();
        run(&mut hw, &mut org, 4);
        // nop-B, dec, jump-b, dec: the inc is never reached
        assert_eq!(hw.programids()[0].register(Register::Bx), -2);
        assert_eq!(hw.programids()[0].head(HeadKind::Ip).position(), 2);
    }

    #[test]
    fn test_jump_without_match_fails_in_place() {
        let mut hw = hardware("jump-f nop-A inc inc");
        let mut org = RecordingOrganism::new();
        run(&mut hw, &mut org, 1);
        assert_eq!(hw.stats().failures, 1);
        assert_eq!(hw.programids()[0].head(HeadKind::Ip).position(), 2);
    }

    #[test]
    fn test_jump_without_label_moves_by_bx() {
        let mut hw = hardware("inc inc jump-b dec dec");
        let mut org = RecordingOrganism::new();
        run(&mut hw, &mut org, 3);
        // BX = 2: back from 2 to 0, then one step on
        assert_eq!(hw.programids()[0].head(HeadKind::Ip).position(), 1);
    }

    #[test]
    fn test_goto_label_lands_on_marker() {
        let mut hw = hardware("goto nop-A inc label nop-A nop-B dec");
        let mut org = RecordingOrganism::new();
        run(&mut hw, &mut org, 1);
        assert_eq!(hw.programids()[0].head(HeadKind::Ip).position(), 3);
        assert_eq!(hw.stats().failures, 0);
    }

    #[test]
    fn test_conditional_throw_not_taken() {
        let mut hw = hardware("inc throw-if=0 nop-A catch nop-A");
        let mut org = RecordingOrganism::new();
        run(&mut hw, &mut org, 2);
        assert_eq!(hw.stats().failures, 1);
    }
}
