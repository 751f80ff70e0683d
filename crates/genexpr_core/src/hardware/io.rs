//! Input, output, messaging and environment sensing.

use super::{GxHardware, Step};
use crate::head::Direction;
use crate::interface::ExecContext;
use genexpr_data::{CodeLabel, HeadKind, Register, NUM_NOPS};

/// Value `match-strings` emits, the bit pattern 0101...01.
const MATCH_STRING_OUTPUT: i32 = 357_913_941;

/// How sensed resource levels become a register value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum SenseMode {
    /// Logarithm of the summed levels.
    Log,
    /// Sum of each level scaled by the base.
    Sum,
}

impl GxHardware {
    pub(super) fn inst_task_get(&mut self, ctx: &mut ExecContext<'_>) -> Step {
        let reg = self.find_modified_register(Register::Cx);
        let value = ctx.organism.get_input();
        self.set_reg(reg, value);
        Step::DONE
    }

    /// Redraws the inputs, then reads two of them into a register (default
    /// BX) and the one after it.
    pub(super) fn inst_task_get2(&mut self, ctx: &mut ExecContext<'_>) -> Step {
        ctx.organism.reset_inputs(ctx.rng);
        let first = self.find_modified_register(Register::Bx);
        for reg in [first, first.next()] {
            let value = ctx.organism.get_input();
            self.set_reg(reg, value);
        }
        Step::DONE
    }

    pub(super) fn inst_task_put(&mut self, ctx: &mut ExecContext<'_>) -> Step {
        let reg = self.find_modified_register(Register::Bx);
        let value = self.reg(reg);
        self.set_reg(reg, 0);
        ctx.organism.do_output(value);
        Step::DONE
    }

    /// `put`, after which the organism sees a fresh set of inputs.
    pub(super) fn inst_task_put_reset(&mut self, ctx: &mut ExecContext<'_>) -> Step {
        let step = self.inst_task_put(ctx);
        ctx.organism.reset_inputs(ctx.rng);
        step
    }

    /// Outputs a register (default BX), then refills it from the input.
    pub(super) fn inst_task_io(&mut self, ctx: &mut ExecContext<'_>) -> Step {
        let reg = self.find_modified_register(Register::Bx);
        ctx.organism.do_output(self.reg(reg));
        let value = ctx.organism.get_input();
        self.set_reg(reg, value);
        Step::DONE
    }

    /// `IO` that also pushes the sign of the bonus change the output caused.
    pub(super) fn inst_task_io_feedback(&mut self, ctx: &mut ExecContext<'_>) -> Step {
        let reg = self.find_modified_register(Register::Bx);
        let before = ctx.organism.current_bonus();
        ctx.organism.do_output(self.reg(reg));
        let after = ctx.organism.current_bonus();
        let feedback = match after.partial_cmp(&before) {
            Some(std::cmp::Ordering::Greater) => 1,
            Some(std::cmp::Ordering::Less) => -1,
            _ => 0,
        };
        self.stack_push(feedback);
        let value = ctx.organism.get_input();
        self.set_reg(reg, value);
        Step::DONE
    }

    pub(super) fn inst_task_stack_get(&mut self, ctx: &mut ExecContext<'_>, count: usize) -> Step {
        for _ in 0..count {
            let value = ctx.organism.get_input();
            self.stack_push(value);
        }
        Step::DONE
    }

    /// Emits the match-string pattern at most once per cycle.
    pub(super) fn inst_match_strings(&mut self, ctx: &mut ExecContext<'_>) -> Step {
        if self.executed_match_strings {
            return Step::FAILED;
        }
        ctx.organism.do_output(MATCH_STRING_OUTPUT);
        self.executed_match_strings = true;
        Step::DONE
    }

    pub(super) fn inst_send(&mut self, ctx: &mut ExecContext<'_>) -> Step {
        let reg = self.find_modified_register(Register::Bx);
        if !ctx.organism.send_message(self.reg(reg)) {
            return Step::FAILED;
        }
        self.set_reg(reg, 0);
        Step::DONE
    }

    pub(super) fn inst_receive(&mut self, ctx: &mut ExecContext<'_>) -> Step {
        let reg = self.find_modified_register(Register::Bx);
        match ctx.organism.receive_value() {
            Some(value) => {
                self.set_reg(reg, value);
                Step::DONE
            }
            None => Step::FAILED,
        }
    }

    /// Writes the level of the resources named by the following label to BX.
    ///
    /// A label shorter than needed to name one resource names every resource
    /// it is a prefix of, and their levels are combined.
    pub(super) fn do_sense(&mut self, ctx: &mut ExecContext<'_>, mode: SenseMode, base: f64) -> Step {
        let levels = ctx.organism.resources();
        if levels.is_empty() {
            return Step::FAILED;
        }
        let full_length = if levels.len() <= 1 {
            0
        } else {
            ((levels.len() as f64).ln() / (NUM_NOPS as f64).ln()).ceil() as usize
        };
        let label = self.read_label_max(full_length);

        let mut start = label.clone();
        let mut end = label;
        while start.len() < full_length {
            start.push(0);
            end.push((NUM_NOPS - 1) as u8);
        }
        let first = start.as_int(NUM_NOPS).max(0) as usize;
        let last = end.as_int(NUM_NOPS).max(0) as usize;
        if first >= levels.len() {
            return Step::FAILED;
        }
        let chosen = &levels[first..=last.min(levels.len() - 1)];

        let value = match mode {
            SenseMode::Log => {
                let total: f64 = chosen.iter().sum();
                if total == 0.0 {
                    i32::MIN
                } else {
                    (total.ln() / base.ln()) as i32
                }
            }
            SenseMode::Sum => chosen
                .iter()
                .fold(0i32, |acc, level| acc.saturating_add((level * base) as i32)),
        };
        self.set_reg(Register::Bx, value);
        Step::DONE
    }

    /// Distance to the complement of the following label: BX gets the
    /// distance, CX the label size. A miss reports distance 0.
    pub(super) fn inst_search(&mut self, direction: Direction) -> Step {
        let label = self.read_label().complement();
        let size = label.len() as i32;
        let distance = self.search_distance(&label, direction);
        self.set_reg(Register::Bx, distance);
        self.set_reg(Register::Cx, size);
        Step::DONE
    }

    /// Signed offset from the IP to the end of `label`, measured in the
    /// search direction; 0 when the label is absent.
    pub(super) fn search_distance(&self, label: &CodeLabel, direction: Direction) -> i32 {
        let prog = self.prog();
        let ip = prog.head(HeadKind::Ip);
        let here = ip.position() as i32;
        match ip.find_label(label, direction, &prog.memory, &self.inst_set) {
            Some(found) => match direction {
                Direction::Forward => found as i32 - here,
                Direction::Backward => here - found as i32,
            },
            None => 0,
        }
    }

    pub(super) fn inst_mem_size(&mut self) -> Step {
        let reg = self.find_modified_register(Register::Bx);
        let size = self.prog().memory.len() as i32;
        self.set_reg(reg, size);
        Step::DONE
    }
}
