//! The organism as seen from its hardware.
//!
//! The machine never owns or references its organism. Every call that may
//! reach outside the CPU receives an [`ExecContext`] carrying the organism
//! and the random source for that call.

use genexpr_data::{CodeLabel, Genome};
use rand::Rng;
use rand_chacha::ChaCha8Rng;

/// Services the surrounding organism provides to its hardware.
///
/// Calls are synchronous. A `false` return turns the calling instruction
/// into a local failure.
pub trait OrganismInterface {
    /// Offers an offspring genome. `false` means the organism refused it.
    fn divide(&mut self, child: &Genome) -> bool;

    fn num_neighbors(&self) -> usize;

    /// Turns the organism; negative is left, positive is right.
    fn rotate(&mut self, direction: i32);

    fn get_input(&mut self) -> i32;

    /// Draws a fresh set of inputs and restarts reading from the first.
    fn reset_inputs(&mut self, rng: &mut ChaCha8Rng);

    fn do_output(&mut self, value: i32);

    /// Bonus the organism has earned so far from its outputs.
    fn current_bonus(&self) -> f64;

    fn send_message(&mut self, value: i32) -> bool;

    /// Next received value, `None` when nothing is waiting.
    fn receive_value(&mut self) -> Option<i32>;

    fn update_merit(&mut self, merit: f64) -> bool;

    fn die(&mut self);

    /// Explodes, killing neighbors within `distance`.
    fn kaboom(&mut self, distance: i32);

    /// Sends code to a neighbor, to be inserted after `label`.
    fn inject_parasite(&mut self, label: &CodeLabel, code: &Genome) -> bool;

    /// Resource levels available to the organism.
    fn resources(&self) -> Vec<f64>;

    fn update_resources(&mut self, change: &[f64]);
}

/// Per-call execution context.
pub struct ExecContext<'a> {
    pub rng: &'a mut ChaCha8Rng,
    pub organism: &'a mut dyn OrganismInterface,
}

impl<'a> ExecContext<'a> {
    pub fn new(rng: &'a mut ChaCha8Rng, organism: &'a mut dyn OrganismInterface) -> Self {
        Self { rng, organism }
    }
}

/// An organism living alone that records everything its hardware asks of it.
///
/// Inputs cycle through `inputs`; every other service succeeds unless its
/// switch is turned off. Each output adds `output_reward` to `bonus`.
#[derive(Debug, Clone)]
pub struct RecordingOrganism {
    pub inputs: Vec<i32>,
    pub input_cursor: usize,
    pub input_resets: usize,
    pub outputs: Vec<i32>,
    pub bonus: f64,
    pub output_reward: f64,
    pub offspring: Vec<Genome>,
    pub accept_divide: bool,
    pub neighbors: usize,
    pub facing: i32,
    pub messages: Vec<i32>,
    pub inbox: Vec<i32>,
    pub merit: f64,
    pub injected: Vec<(CodeLabel, Genome)>,
    pub resource_levels: Vec<f64>,
    pub dead: bool,
    pub exploded: Option<i32>,
}

impl Default for RecordingOrganism {
    fn default() -> Self {
        Self {
            inputs: vec![0x0f13_149f, 0x3308_e53e, 0x5577_5cd8],
            input_cursor: 0,
            input_resets: 0,
            outputs: Vec::new(),
            bonus: 1.0,
            output_reward: 0.0,
            offspring: Vec::new(),
            accept_divide: true,
            neighbors: 0,
            facing: 0,
            messages: Vec::new(),
            inbox: Vec::new(),
            merit: 1.0,
            injected: Vec::new(),
            resource_levels: Vec::new(),
            dead: false,
            exploded: None,
        }
    }
}

impl RecordingOrganism {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl OrganismInterface for RecordingOrganism {
    fn divide(&mut self, child: &Genome) -> bool {
        if self.accept_divide {
            self.offspring.push(child.clone());
        }
        self.accept_divide
    }

    fn num_neighbors(&self) -> usize {
        self.neighbors
    }

    fn rotate(&mut self, direction: i32) {
        self.facing = self.facing.wrapping_add(direction);
    }

    fn get_input(&mut self) -> i32 {
        if self.inputs.is_empty() {
            return 0;
        }
        let value = self.inputs[self.input_cursor % self.inputs.len()];
        self.input_cursor += 1;
        value
    }

    fn reset_inputs(&mut self, rng: &mut ChaCha8Rng) {
        for input in &mut self.inputs {
            *input = 0x0f00_0000 | (rng.gen::<i32>() & 0x00ff_ffff);
        }
        self.input_cursor = 0;
        self.input_resets += 1;
    }

    fn do_output(&mut self, value: i32) {
        self.outputs.push(value);
        self.bonus += self.output_reward;
    }

    fn current_bonus(&self) -> f64 {
        self.bonus
    }

    fn send_message(&mut self, value: i32) -> bool {
        if self.neighbors == 0 {
            return false;
        }
        self.messages.push(value);
        true
    }

    fn receive_value(&mut self) -> Option<i32> {
        if self.inbox.is_empty() {
            None
        } else {
            Some(self.inbox.remove(0))
        }
    }

    fn update_merit(&mut self, merit: f64) -> bool {
        self.merit = merit;
        true
    }

    fn die(&mut self) {
        self.dead = true;
    }

    fn kaboom(&mut self, distance: i32) {
        self.exploded = Some(distance);
        self.dead = true;
    }

    fn inject_parasite(&mut self, label: &CodeLabel, code: &Genome) -> bool {
        if self.neighbors == 0 {
            return false;
        }
        self.injected.push((label.clone(), code.clone()));
        true
    }

    fn resources(&self) -> Vec<f64> {
        self.resource_levels.clone()
    }

    fn update_resources(&mut self, change: &[f64]) {
        if self.resource_levels.len() < change.len() {
            self.resource_levels.resize(change.len(), 0.0);
        }
        for (level, delta) in self.resource_levels.iter_mut().zip(change) {
            *level += delta;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_inputs_cycle() {
        let mut org = RecordingOrganism {
            inputs: vec![1, 2],
            ..Default::default()
        };
        assert_eq!(
            (org.get_input(), org.get_input(), org.get_input()),
            (1, 2, 1)
        );
    }

    #[test]
    fn test_reset_inputs_restarts_cursor() {
        let mut org = RecordingOrganism::new();
        let old = org.inputs.clone();
        org.get_input();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        org.reset_inputs(&mut rng);
        assert_eq!(org.input_cursor, 0);
        assert_eq!(org.input_resets, 1);
        assert_eq!(org.inputs.len(), old.len());
        assert_ne!(org.inputs, old);
        assert_eq!(org.get_input(), org.inputs[0]);
    }

    #[test]
    fn test_refused_divide_is_not_recorded() {
        let mut org = RecordingOrganism {
            accept_divide: false,
            ..Default::default()
        };
        assert!(!org.divide(&Genome::from_ops(&[1, 2, 3])));
        assert!(org.offspring.is_empty());
    }

    #[test]
    fn test_lonely_organism_cannot_send() {
        let mut org = RecordingOrganism::new();
        assert!(!org.send_message(5));
        org.neighbors = 1;
        assert!(org.send_message(5));
        assert_eq!(org.messages, vec![5]);
    }
}
