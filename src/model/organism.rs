use genexpr_core::OrganismInterface;
use genexpr_data::{CodeLabel, Genome};
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Inputs carry a fixed high nibble over 24 random bits.
const INPUT_MASK: i32 = 0x00ff_ffff;
const INPUT_TAG: i32 = 0x0f00_0000;

fn fresh_inputs<R: Rng + ?Sized>(rng: &mut R, count: usize) -> Vec<i32> {
    (0..count)
        .map(|_| INPUT_TAG | (rng.gen::<i32>() & INPUT_MASK))
        .collect()
}

/// An organism with no neighbors, collecting its own offspring.
///
/// Messaging and parasite injection need a neighbor and always fail here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SoloOrganism {
    pub inputs: Vec<i32>,
    input_cursor: usize,
    /// Values written with `put` and its relatives; only the latest is kept.
    pub output_count: usize,
    pub last_output: Option<i32>,
    pub offspring: Vec<Genome>,
    /// Offspring beyond this many are refused; 0 accepts all.
    pub max_offspring: usize,
    pub merit: f64,
    pub resources: Vec<f64>,
    pub facing: i32,
    pub alive: bool,
}

impl SoloOrganism {
    pub fn new<R: Rng + ?Sized>(
        rng: &mut R,
        input_count: usize,
        resources: Vec<f64>,
        max_offspring: usize,
    ) -> Self {
        Self {
            inputs: fresh_inputs(rng, input_count),
            input_cursor: 0,
            output_count: 0,
            last_output: None,
            offspring: Vec::new(),
            max_offspring,
            merit: 1.0,
            resources,
            facing: 0,
            alive: true,
        }
    }

    /// Refuses further offspring once the configured count is reached.
    pub fn is_saturated(&self) -> bool {
        self.max_offspring > 0 && self.offspring.len() >= self.max_offspring
    }
}

impl OrganismInterface for SoloOrganism {
    fn divide(&mut self, child: &Genome) -> bool {
        if !self.alive || self.is_saturated() {
            return false;
        }
        tracing::debug!(size = child.len(), "Offspring accepted");
        self.offspring.push(child.clone());
        true
    }

    fn num_neighbors(&self) -> usize {
        0
    }

    fn rotate(&mut self, direction: i32) {
        self.facing = self.facing.wrapping_add(direction.signum());
    }

    fn get_input(&mut self) -> i32 {
        if self.inputs.is_empty() {
            return 0;
        }
        let value = self.inputs[self.input_cursor % self.inputs.len()];
        self.input_cursor = (self.input_cursor + 1) % self.inputs.len();
        value
    }

    fn reset_inputs(&mut self, rng: &mut ChaCha8Rng) {
        self.inputs = fresh_inputs(rng, self.inputs.len());
        self.input_cursor = 0;
    }

    fn do_output(&mut self, value: i32) {
        self.output_count += 1;
        self.last_output = Some(value);
    }

    /// Outputs are not scored in isolation; merit stands in for the bonus.
    fn current_bonus(&self) -> f64 {
        self.merit
    }

    fn send_message(&mut self, _value: i32) -> bool {
        false
    }

    fn receive_value(&mut self) -> Option<i32> {
        None
    }

    fn update_merit(&mut self, merit: f64) -> bool {
        if !merit.is_finite() || merit < 0.0 {
            return false;
        }
        self.merit = merit;
        true
    }

    fn die(&mut self) {
        self.alive = false;
    }

    fn kaboom(&mut self, _distance: i32) {
        self.alive = false;
    }

    fn inject_parasite(&mut self, _label: &CodeLabel, _code: &Genome) -> bool {
        false
    }

    fn resources(&self) -> Vec<f64> {
        self.resources.clone()
    }

    fn update_resources(&mut self, change: &[f64]) {
        for (level, delta) in self.resources.iter_mut().zip(change) {
            *level = (*level + delta).max(0.0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn organism(max_offspring: usize) -> SoloOrganism {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        SoloOrganism::new(&mut rng, 3, vec![1.0, 2.0], max_offspring)
    }

    #[test]
    fn test_inputs_are_tagged_and_cycle() {
        let mut org = organism(0);
        let first: Vec<i32> = (0..3).map(|_| org.get_input()).collect();
        assert!(first.iter().all(|v| v & !INPUT_MASK == INPUT_TAG));
        assert_eq!(org.get_input(), first[0]);
    }

    #[test]
    fn test_outputs_are_counted_not_stored() {
        let mut org = organism(0);
        for value in 0..1000 {
            org.do_output(value);
        }
        assert_eq!(org.output_count, 1000);
        assert_eq!(org.last_output, Some(999));
    }

    #[test]
    fn test_reset_inputs_draws_new_values() {
        let mut org = organism(0);
        let old = org.inputs.clone();
        org.get_input();
        let mut rng = ChaCha8Rng::seed_from_u64(99);
        org.reset_inputs(&mut rng);
        assert_eq!(org.inputs.len(), 3);
        assert_ne!(org.inputs, old);
        assert!(org.inputs.iter().all(|v| v & !INPUT_MASK == INPUT_TAG));
        assert_eq!(org.get_input(), org.inputs[0]);
    }

    #[test]
    fn test_offspring_limit() {
        let mut org = organism(1);
        assert!(org.divide(&Genome::from_ops(&[1, 2])));
        assert!(!org.divide(&Genome::from_ops(&[3])));
        assert_eq!(org.offspring.len(), 1);
    }

    #[test]
    fn test_dead_organism_refuses_offspring() {
        let mut org = organism(0);
        org.die();
        assert!(!org.divide(&Genome::from_ops(&[1])));
    }

    #[test]
    fn test_resources_never_go_negative() {
        let mut org = organism(0);
        org.update_resources(&[-5.0, 1.0]);
        assert_eq!(org.resources(), vec![0.0, 3.0]);
    }
}
